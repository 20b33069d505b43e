//! Listener session
//!
//! A [`Session`] owns the receive side of the radio, both clocks, the
//! record sink and the last reading seen. Nothing is held at process
//! scope; the supervisor drives the session through [`Listen`].

use core::time::Duration;

use voltwatch_hal::link::MAX_PAYLOAD_SIZE;
use voltwatch_hal::RadioRx;

use crate::config::ListenerConfig;
use crate::record::{decode_reading, Reading, Record};
use crate::traits::{Clock, RecordSink, WallClock};

use super::liveness::LivenessWindow;
use super::machine::{ListenEvent, ListenState};

/// Outcome of one listen invocation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ListenReport {
    /// Records handed to the sink successfully
    pub committed: u32,
    /// Transport errors while waiting or reading
    pub read_errors: u32,
    /// Payloads that failed to decode
    pub rejected: u32,
    /// Records the sink failed to store
    pub commit_failures: u32,
    /// Most recent record built during this invocation
    pub last: Option<Record>,
    /// Silence that ended the invocation
    pub window: Duration,
}

impl ListenReport {
    /// Check if any payload arrived during this invocation
    pub fn received_any(&self) -> bool {
        self.committed > 0 || self.commit_failures > 0
    }
}

/// Anything that can run one listen invocation to its timeout
pub trait Listen {
    /// Listen until the liveness window expires
    fn listen(&mut self) -> ListenReport;
}

/// Receiver session
pub struct Session<R, C, W, S> {
    radio: R,
    clock: C,
    wall: W,
    sink: S,
    config: ListenerConfig,
    state: ListenState,
    last_reading: Option<Reading>,
}

impl<R, C, W, S> Session<R, C, W, S> {
    /// Create a new session
    ///
    /// The radio must already be configured and listening.
    pub fn new(radio: R, clock: C, wall: W, sink: S, config: ListenerConfig) -> Self {
        Self {
            radio,
            clock,
            wall,
            sink,
            config,
            state: ListenState::Listening,
            last_reading: None,
        }
    }

    /// Current listener state
    pub fn state(&self) -> ListenState {
        self.state
    }

    /// Last reading received by any invocation
    pub fn last_reading(&self) -> Option<Reading> {
        self.last_reading
    }

    /// Listener configuration
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Record sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Radio receive side
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Consume the session and return its parts
    pub fn into_parts(self) -> (R, C, W, S) {
        (self.radio, self.clock, self.wall, self.sink)
    }
}

impl<R, C, W, S> Session<R, C, W, S>
where
    R: RadioRx,
    C: Clock,
    W: WallClock,
    S: RecordSink,
{
    /// Read, decode and commit the pending payload
    fn receive(&mut self, buf: &mut [u8], report: &mut ListenReport) -> ListenEvent {
        let size = (self.radio.payload_size() as usize).min(buf.len());

        let len = match self.radio.read_payload(&mut buf[..size]) {
            Ok(len) => len.min(size),
            Err(_) => {
                report.read_errors = report.read_errors.saturating_add(1);
                return ListenEvent::PayloadRejected;
            }
        };

        let reading = match decode_reading(&buf[..len]) {
            Ok(reading) => reading,
            Err(_) => {
                report.rejected = report.rejected.saturating_add(1);
                return ListenEvent::PayloadRejected;
            }
        };

        let record = Record::from_reading(reading, self.wall.wall_time(), &self.config.calibration);
        self.last_reading = Some(reading);
        report.last = Some(record);

        match self.sink.commit(&record) {
            Ok(()) => report.committed = report.committed.saturating_add(1),
            Err(_) => report.commit_failures = report.commit_failures.saturating_add(1),
        }

        // The sender is alive even if the store is not
        ListenEvent::PayloadAccepted
    }
}

impl<R, C, W, S> Listen for Session<R, C, W, S>
where
    R: RadioRx,
    C: Clock,
    W: WallClock,
    S: RecordSink,
{
    fn listen(&mut self) -> ListenReport {
        self.state = self.state.transition(ListenEvent::Rearm);

        let mut window = LivenessWindow::armed(self.config.timeout(), self.clock.now());
        let mut report = ListenReport {
            window: window.timeout(),
            ..ListenReport::default()
        };
        let mut buf = [0u8; MAX_PAYLOAD_SIZE as usize];

        loop {
            let now = self.clock.now();
            if window.is_expired(now) {
                self.state = self.state.transition(ListenEvent::DeadlineElapsed);
                return report;
            }

            let errors = report.read_errors;
            let event = match self.radio.wait_available(window.remaining(now)) {
                Ok(Some(_pipe)) => self.receive(&mut buf, &mut report),
                Ok(None) => continue,
                Err(_) => {
                    report.read_errors = report.read_errors.saturating_add(1);
                    ListenEvent::PayloadRejected
                }
            };

            if event.refreshes_deadline() {
                window.refresh(self.clock.now());
            } else if report.read_errors != errors {
                let remaining = window.remaining(self.clock.now());
                self.radio.idle(self.config.error_idle().min(remaining));
            }
            self.state = self.state.transition(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Calibration;
    use crate::record::{encode_reading, WallTime};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use voltwatch_hal::Pipe;

    /// Shared fake monotonic clock
    #[derive(Clone, Default)]
    struct FakeClock(Rc<Cell<Duration>>);

    impl FakeClock {
        fn set(&self, at: Duration) {
            self.0.set(at);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Duration {
            self.0.get()
        }
    }

    /// Wall clock derived from the fake clock
    struct FakeWall(FakeClock);

    impl WallClock for FakeWall {
        fn wall_time(&self) -> WallTime {
            let secs = self.0.now().as_secs();
            WallTime::new(14, ((secs / 60) % 60) as u8, (secs % 60) as u8).unwrap()
        }
    }

    #[derive(Debug, Clone)]
    enum Delivery {
        Payload([u8; 4]),
        ReadError,
        WaitError,
    }

    #[derive(Debug)]
    struct FakeRadioError;

    /// Radio that replays a script of timed deliveries
    ///
    /// Waiting advances the shared clock either to the next delivery or
    /// to the end of the wait.
    struct ScriptedRadio {
        clock: FakeClock,
        script: VecDeque<(Duration, Delivery)>,
        pending: Option<Delivery>,
    }

    impl ScriptedRadio {
        fn new(clock: FakeClock, script: Vec<(Duration, Delivery)>) -> Self {
            Self {
                clock,
                script: script.into(),
                pending: None,
            }
        }
    }

    impl RadioRx for ScriptedRadio {
        type Error = FakeRadioError;

        fn available(&mut self) -> Result<Option<Pipe>, Self::Error> {
            self.wait_available(Duration::ZERO)
        }

        fn wait_available(&mut self, timeout: Duration) -> Result<Option<Pipe>, Self::Error> {
            let now = self.clock.now();
            let until = now + timeout;

            match self.script.front() {
                Some((at, _)) if *at <= until => {
                    let (at, delivery) = self.script.pop_front().unwrap();
                    self.clock.set(at.max(now));
                    match delivery {
                        Delivery::WaitError => Err(FakeRadioError),
                        other => {
                            self.pending = Some(other);
                            Ok(Pipe::new(1))
                        }
                    }
                }
                _ => {
                    self.clock.set(until);
                    Ok(None)
                }
            }
        }

        fn read_payload(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            match self.pending.take() {
                Some(Delivery::Payload(bytes)) => {
                    buf[..4].copy_from_slice(&bytes);
                    Ok(4)
                }
                _ => Err(FakeRadioError),
            }
        }

        fn payload_size(&self) -> u8 {
            4
        }
    }

    /// In-memory sink with overwrite semantics
    #[derive(Default)]
    struct MemorySink {
        current: Option<Record>,
        commits: Vec<Record>,
        failures_left: u32,
    }

    impl RecordSink for MemorySink {
        type Error = ();

        fn commit(&mut self, record: &Record) -> Result<(), ()> {
            if self.failures_left > 0 {
                self.failures_left -= 1;
                return Err(());
            }
            self.current = Some(*record);
            self.commits.push(*record);
            Ok(())
        }
    }

    type TestSession = Session<ScriptedRadio, FakeClock, FakeWall, MemorySink>;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn volts(v: f32) -> Delivery {
        Delivery::Payload(encode_reading(Reading::new(v).unwrap()).unwrap())
    }

    fn session(timeout_s: u32, script: Vec<(Duration, Delivery)>) -> (TestSession, FakeClock) {
        let clock = FakeClock::default();
        let radio = ScriptedRadio::new(clock.clone(), script);
        let config = ListenerConfig::minimal().with_timeout_ms(timeout_s * 1000);
        let session = Session::new(
            radio,
            clock.clone(),
            FakeWall(clock.clone()),
            MemorySink::default(),
            config,
        );
        (session, clock)
    }

    #[test]
    fn test_silence_times_out_at_window() {
        let (mut session, clock) = session(6, vec![]);

        let report = session.listen();

        assert_eq!(clock.now(), secs(6));
        assert_eq!(report.committed, 0);
        assert_eq!(report.window, secs(6));
        assert!(!report.received_any());
        assert!(session.sink().current.is_none());
        assert_eq!(session.state(), ListenState::TimedOut);
    }

    #[test]
    fn test_single_reading_extends_window() {
        let (mut session, clock) = session(6, vec![(secs(1), volts(8.6))]);

        let report = session.listen();

        assert_eq!(clock.now(), secs(7));
        assert_eq!(report.committed, 1);
        let record = report.last.unwrap();
        assert_eq!(record.voltage, 8.6);
        assert!((record.percent - 21.57).abs() < 0.01);
        assert_eq!(record.time, WallTime::new(14, 0, 1).unwrap());
        assert_eq!(session.sink().current, Some(record));
        assert_eq!(session.last_reading().map(|r| r.volts()), Some(8.6));
    }

    #[test]
    fn test_steady_stream_never_times_out_early() {
        let script = (1..=10).map(|i| (secs(i * 5), volts(11.0))).collect();
        let (mut session, clock) = session(6, script);

        let report = session.listen();

        assert_eq!(report.committed, 10);
        assert_eq!(clock.now(), secs(56));
    }

    #[test]
    fn test_sink_holds_only_latest_record() {
        let script = vec![
            (secs(1), volts(12.6)),
            (secs(2), volts(10.05)),
            (secs(3), volts(8.6)),
        ];
        let (mut session, _clock) = session(6, script);

        let report = session.listen();

        let sink = session.sink();
        assert_eq!(sink.commits.len(), 3);
        assert_eq!(sink.current, report.last);
        assert_eq!(sink.current.map(|r| r.voltage), Some(8.6));
    }

    #[test]
    fn test_transport_errors_do_not_refresh() {
        let script = vec![
            (secs(1), Delivery::WaitError),
            (secs(2), Delivery::ReadError),
            (secs(5), Delivery::WaitError),
        ];
        let (mut session, clock) = session(6, script);

        let report = session.listen();

        assert_eq!(clock.now(), secs(6));
        assert_eq!(report.read_errors, 3);
        assert_eq!(report.committed, 0);
    }

    /// Radio whose every wait fails
    struct DeadRadio {
        clock: FakeClock,
        waits: u32,
        idles: Vec<Duration>,
    }

    impl RadioRx for DeadRadio {
        type Error = FakeRadioError;

        fn available(&mut self) -> Result<Option<Pipe>, Self::Error> {
            Err(FakeRadioError)
        }

        fn wait_available(&mut self, _timeout: Duration) -> Result<Option<Pipe>, Self::Error> {
            self.waits += 1;
            self.clock.set(self.clock.now() + Duration::from_micros(10));
            Err(FakeRadioError)
        }

        fn idle(&mut self, duration: Duration) {
            self.idles.push(duration);
            self.clock.set(self.clock.now() + duration);
        }

        fn read_payload(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
            Err(FakeRadioError)
        }

        fn payload_size(&self) -> u8 {
            4
        }
    }

    #[test]
    fn test_dead_radio_idles_between_errors() {
        let clock = FakeClock::default();
        let radio = DeadRadio {
            clock: clock.clone(),
            waits: 0,
            idles: Vec::new(),
        };
        let config = ListenerConfig::minimal();
        let mut session = Session::new(radio, clock.clone(), FakeWall(clock.clone()), MemorySink::default(), config);

        let report = session.listen();

        assert_eq!(clock.now(), secs(6));
        assert_eq!(session.state(), ListenState::TimedOut);
        let (radio, _, _, _) = session.into_parts();
        // 6 s at one wait per 10 ms idle
        assert!(radio.waits <= 600, "{} waits", radio.waits);
        assert!(radio.waits >= 590, "{} waits", radio.waits);
        assert_eq!(report.read_errors, radio.waits);
        assert_eq!(radio.idles.len() as u32, radio.waits);
        assert!(radio.idles.iter().all(|d| *d <= Duration::from_millis(10)));
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let script = vec![(secs(3), Delivery::Payload(f32::NAN.to_le_bytes()))];
        let (mut session, clock) = session(6, script);

        let report = session.listen();

        assert_eq!(clock.now(), secs(6));
        assert_eq!(report.rejected, 1);
        assert!(session.last_reading().is_none());
    }

    #[test]
    fn test_commit_failure_keeps_listening() {
        let script = vec![(secs(1), volts(9.0)), (secs(4), volts(9.5))];
        let (mut session, clock) = session(6, script);
        session.sink.failures_left = 1;

        let report = session.listen();

        assert_eq!(report.commit_failures, 1);
        assert_eq!(report.committed, 1);
        assert!(report.received_any());
        assert_eq!(clock.now(), secs(10));
        assert_eq!(session.sink().current.map(|r| r.voltage), Some(9.5));
    }

    #[test]
    fn test_rearm_after_timeout() {
        let script = vec![(secs(8), volts(12.0))];
        let (mut session, clock) = session(6, script);

        let first = session.listen();
        assert_eq!(first.committed, 0);
        assert_eq!(session.state(), ListenState::TimedOut);

        let second = session.listen();
        assert_eq!(second.committed, 1);
        assert_eq!(clock.now(), secs(14));
        assert_eq!(session.state(), ListenState::TimedOut);
    }

    #[test]
    fn test_custom_calibration_applies() {
        let clock = FakeClock::default();
        let radio = ScriptedRadio::new(clock.clone(), vec![(secs(1), volts(4.0))]);
        let mut config = ListenerConfig::minimal();
        config.calibration = Calibration {
            empty_volts: 3.0,
            span_volts: 1.2,
        };
        let mut session = Session::new(radio, clock.clone(), FakeWall(clock), MemorySink::default(), config);

        let report = session.listen();

        let percent = report.last.unwrap().percent;
        assert!((percent - 83.33).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn prop_spaced_readings_never_time_out(gaps in proptest::collection::vec(1u64..6, 1..20)) {
            let mut at = 0;
            let mut script = Vec::new();
            for gap in &gaps {
                at += gap;
                script.push((secs(at), volts(10.0)));
            }
            let (mut session, clock) = session(6, script);

            let report = session.listen();

            prop_assert_eq!(report.committed as usize, gaps.len());
            prop_assert_eq!(clock.now(), secs(at + 6));
        }
    }
}
