//! Voltwatch - nRF24 battery monitor receiver
//!
//! Listens on a point-to-point nRF24L01 link for the battery voltage a
//! remote sensor node sends, and keeps the latest reading in a status
//! file as `H:M:S, voltage, percent`.
//!
//! Silence is a liveness signal rather than an error: the minimal listener
//! stops after one window, the hardened one re-arms straight away.

use std::io;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};

use voltwatch_core::{
    ListenReport, ListenerConfig, ListenerMode, Reading, Record, RecordSink, Session,
    Supervisor, WallClock,
};
use voltwatch_hal::{LinkConfig, RadioSetup};

mod cli;
mod clock;
mod config;
mod hardware;
mod prompt;
mod store;

use crate::cli::{Cli, Command};
use crate::clock::{LocalWallClock, MonotonicClock};
use crate::config::ReceiverConfig;
use crate::prompt::prompt_pa_level;
use crate::store::Store;

fn main() {
    let cli = Cli::parse();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(cli.log_filter()));

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let mut config = ReceiverConfig::load(cli.config.as_deref())?;
    config.apply_cli(&cli)?;
    debug!("Configuration: {:?}", config);

    let listener = config.listener_config()?;
    let store = Store::new(&config.store.path, config.store.echo_only);

    match cli.command.unwrap_or(Command::Listen) {
        Command::Listen => listen(&config, listener, store),
        Command::Write { voltage } => write_once(voltage, &listener, store),
    }
}

/// Commit a single record without the radio
fn write_once(voltage: f32, listener: &ListenerConfig, mut store: Store) -> Result<()> {
    let reading = Reading::new(voltage).ok_or_else(|| anyhow!("voltage must be a finite number"))?;
    let record = Record::from_reading(reading, LocalWallClock.wall_time(), &listener.calibration);

    store.commit(&record).context("cannot write status file")
}

/// Bring up the radio and listen under the configured restart policy
fn listen(config: &ReceiverConfig, listener: ListenerConfig, store: Store) -> Result<()> {
    let pa_level = match config.radio.pa_level {
        Some(level) => level,
        None => prompt_pa_level(io::stdin().lock(), io::stdout()).context("cannot read PA level")?,
    };
    let link = config.link_config(pa_level)?;

    let mut radio = hardware::open_radio(&config.radio)?;
    radio
        .configure(&link)
        .map_err(|e| anyhow!("cannot configure radio: {e:?}"))?;
    radio
        .start_listening()
        .map_err(|e| anyhow!("cannot start listening: {e:?}"))?;
    log_link(&link, config.listener.mode, &listener);

    let mode = config.listener.mode;
    let supervisor = Supervisor::new(listener.restart);
    let mut session = Session::new(radio, MonotonicClock::new(), LocalWallClock, store, listener);

    let totals = supervisor.run(&mut session, |report| log_timeout(mode, report));
    info!(
        "Stopped after {} listen window(s), {} record(s) stored",
        totals.invocations, totals.committed
    );
    Ok(())
}

fn log_link(link: &LinkConfig, mode: ListenerMode, listener: &ListenerConfig) {
    info!(
        "Listening on channel {} at PA level {}, peer address {:?}",
        link.channel,
        link.pa_level.label(),
        core::str::from_utf8(link.rx_address.as_bytes()).unwrap_or("?")
    );
    info!(
        "{:?} listener, {} s window",
        mode,
        listener.timeout().as_secs()
    );
}

/// Liveness-lost notification
fn log_timeout(mode: ListenerMode, report: &ListenReport) {
    if report.read_errors > 0 || report.rejected > 0 {
        warn!(
            "{} read error(s) and {} malformed payload(s) in the last window",
            report.read_errors, report.rejected
        );
    }
    if report.commit_failures > 0 {
        warn!("{} record(s) could not be stored", report.commit_failures);
    }

    let secs = report.window.as_secs();
    match mode {
        ListenerMode::Minimal => info!("Nothing received in {} seconds.", secs),
        ListenerMode::Hardened => {
            info!("Nothing received in {} seconds, still listening.", secs)
        }
    }
}
