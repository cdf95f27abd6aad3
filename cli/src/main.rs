//! # Merit CLI
//!
//! Entry point for the `merit` binary. Parses CLI arguments, initializes
//! logging, and runs the selected subcommand.
//!
//! The `demo` subcommand plays the role of the deployment script: it
//! stands up the three contracts under one owner, grants the platform's
//! `REWARD_SYSTEM` identifier minter and issuer rights on the sub-ledgers,
//! then walks through a sample event end to end.

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parking_lot::RwLock;

use merit_contracts::credential_nft::CredentialRegistry;
use merit_contracts::reward_system::RewardSystem;
use merit_contracts::reward_token::{RewardToken, TOKEN_NAME, TOKEN_SYMBOL};

use cli::{Commands, MeritCli};

/// Identifier under which the platform itself holds minter and issuer
/// rights, so server-side workflows can mint without a human caller.
const REWARD_SYSTEM_IDENTITY: &str = "REWARD_SYSTEM";

fn main() -> Result<()> {
    let cli = MeritCli::parse();
    logging::init_logging("merit_cli=info,merit_contracts=info", cli.log_format);

    match cli.command {
        Commands::Demo(args) => run_demo(args),
        Commands::Version => {
            println!("merit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Deploys the contracts and runs the scripted walkthrough: one workshop
/// event, one recorded attendance, then the student summary and the
/// leaderboard printed as JSON.
fn run_demo(args: cli::DemoArgs) -> Result<()> {
    let owner = args.owner.as_str();
    let student = args.student.as_str();

    tracing::info!(owner, "deploying contracts");
    let token = Arc::new(RwLock::new(RewardToken::new(owner)));
    tracing::info!(name = TOKEN_NAME, symbol = TOKEN_SYMBOL, "reward token deployed");

    let credentials = Arc::new(RwLock::new(CredentialRegistry::new(owner)));
    tracing::info!("credential registry deployed");

    let system = RewardSystem::new(owner, Arc::clone(&token), Arc::clone(&credentials));
    tracing::info!("reward system deployed");

    // Bootstrap wiring: the platform identity gets standing rights on
    // both sub-ledgers.
    token
        .write()
        .add_minter(owner, REWARD_SYSTEM_IDENTITY)
        .context("failed to authorize the platform as a minter")?;
    credentials
        .write()
        .add_issuer(owner, REWARD_SYSTEM_IDENTITY)
        .context("failed to authorize the platform as an issuer")?;
    tracing::info!(identity = REWARD_SYSTEM_IDENTITY, "platform rights granted");

    // --- Sample event ---
    let event_id = system
        .create_event(
            owner,
            "Introduction to Blockchain Workshop",
            "workshop_attendance",
            "A hands-on workshop covering blockchain fundamentals",
            50,
            true,
        )
        .context("failed to create the sample event")?;
    tracing::info!(event_id, "sample event created");

    let receipt = system
        .record_attendance(owner, event_id, student)
        .context("failed to record attendance")?;
    tracing::info!(
        student,
        tokens_earned = receipt.tokens_earned,
        certificate_id = receipt.certificate_id,
        "attendance recorded"
    );

    // --- Output ---
    let summary = system.get_student_summary(student);
    let leaderboard = system.get_leaderboard(args.leaderboard_limit);

    let output = serde_json::json!({
        "student_summary": summary,
        "leaderboard": leaderboard,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    if let Some(certificate_id) = receipt.certificate_id {
        let uri = credentials
            .read()
            .token_uri(certificate_id)
            .context("failed to render the certificate document")?;
        tracing::info!(certificate_id, document = %uri, "certificate issued");
    }

    Ok(())
}
