//! Command line interface

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use voltwatch_core::ListenerMode;

/// Voltwatch battery receiver
#[derive(Parser, Debug)]
#[command(version, about = "Receive battery voltages over nRF24L01 and keep the latest in a file", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Listener variant
    #[arg(long, value_enum, global = true)]
    pub mode: Option<ModeArg>,

    /// Liveness window in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u32>,

    /// PA level (0 = MIN, 1 = LOW, 2 = HIGH, 3 = MAX); prompts when unset
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=3), global = true)]
    pub pa_level: Option<u8>,

    /// Which of the two node addresses this receiver transmits from
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=1), global = true)]
    pub radio_number: Option<u8>,

    /// Status file path
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Print readings without writing the status file
    #[arg(long, global = true)]
    pub echo_only: bool,

    /// More output (debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Less output (warnings only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Listen for readings (default)
    Listen,

    /// Commit one record to the store without touching the radio
    Write {
        /// Battery voltage to record
        #[arg(long)]
        voltage: f32,
    },
}

/// Listener variant as given on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// 6 second window, no restart
    Minimal,
    /// 120 second window, restart forever
    Hardened,
}

impl From<ModeArg> for ListenerMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Minimal => ListenerMode::Minimal,
            ModeArg::Hardened => ListenerMode::Hardened,
        }
    }
}

impl Cli {
    /// Log filter implied by `-v` / `-q`
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }
}
