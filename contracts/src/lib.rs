//! # Merit Ledger Contracts
//!
//! In-process ledgers for a student achievement platform. Three contracts
//! cooperate to turn event participation into durable rewards:
//!
//! - **Reward Token** — an ERC-20-shaped fungible balance ledger with
//!   owner-gated minting, spending allowances, and delegated transfers.
//! - **Credential Registry** — soulbound certificates and badges: minted,
//!   never transferred, revocable without deletion.
//! - **Reward System** — role-based orchestration that records event
//!   attendance and drives both ledgers, keeping an append-only history
//!   per student.
//!
//! ## Design Principles
//!
//! 1. Guards before mutations: every operation validates completely before
//!    touching state, so a failure never leaves a half-applied change.
//! 2. Caller identity is an explicit argument on every privileged
//!    operation — there is no ambient "current user".
//! 3. Supply arithmetic is overflow-checked; balances can never go
//!    negative because the guards reject the operation first.
//! 4. Every public record type is serializable (serde) so credentials and
//!    summaries can be handed to external consumers as JSON.

pub mod credential_nft;
pub mod metadata;
pub mod reward_system;
pub mod reward_token;

/// An opaque account identifier — participant, issuer, or contract
/// address. The platform treats it as a trusted input string; no
/// structure is assumed and no signatures are verified.
pub type Address = String;
