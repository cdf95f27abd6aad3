//! # CLI Interface
//!
//! Defines the command-line argument structure for the `merit` binary
//! using `clap` derive.

use clap::{Parser, Subcommand};

use crate::logging::LogFormat;

/// Merit student achievement ledger.
///
/// An in-process deployment of the platform's three contracts: the reward
/// token ledger, the soulbound credential registry, and the reward system
/// that orchestrates them.
#[derive(Parser, Debug)]
#[command(
    name = "merit",
    about = "Merit student achievement ledger",
    version,
    propagate_version = true
)]
pub struct MeritCli {
    /// Log output format.
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the merit binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the contracts, run a scripted walkthrough, and print the
    /// resulting student summary and leaderboard as JSON.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Address that owns all three contracts.
    #[arg(long, env = "MERIT_OWNER", default_value = "0xOwner456")]
    pub owner: String,

    /// Address of the student the walkthrough rewards.
    #[arg(long, env = "MERIT_STUDENT", default_value = "0xStudent123")]
    pub student: String,

    /// Maximum number of leaderboard rows to print.
    #[arg(long, default_value_t = 10)]
    pub leaderboard_limit: usize,
}
