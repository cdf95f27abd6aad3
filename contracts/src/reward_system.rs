//! # Reward System Contract
//!
//! Orchestration layer that ties event participation to the two ledgers:
//! organizers create events, record attendance, and the system mints
//! reward tokens and participation certificates in response, keeping an
//! append-only history per student.
//!
//! ## Security Model
//!
//! - **Roles**: a single owner, an admin set (owner always included), and
//!   an event-organizer set. Each operation names the roles it accepts.
//! - **No privilege lending**: mints run under the *caller's* identity.
//!   An organizer recording attendance must independently hold minter
//!   rights on the token ledger and issuer rights on the credential
//!   registry — the system checks those rights up front and never grants
//!   them on the caller's behalf.
//! - **Serialization of cross-ledger work**: all orchestrator operations
//!   run under one mutex, so attendance is all-or-nothing as observed by
//!   any other caller. Lock order: system state, then token, then
//!   credentials.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

use crate::credential_nft::{CredentialError, CredentialId, CredentialRegistry};
use crate::metadata::Metadata;
use crate::reward_token::{RewardToken, TokenError};
use crate::Address;

/// Unique identifier for an event, allocated sequentially starting at 1.
pub type EventId = u64;

/// Default reward amounts per event type. Advisory: event creators see
/// these as suggestions, nothing enforces them against an event's actual
/// reward amount.
const DEFAULT_REWARD_CONFIGS: &[(&str, u64)] = &[
    ("workshop_attendance", 10),
    ("competition_participation", 25),
    ("competition_win", 100),
    ("club_contribution", 15),
    ("volunteer_work", 20),
    ("hackathon_participation", 50),
    ("hackathon_win", 200),
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during reward system operations.
#[derive(Debug, Error)]
pub enum RewardError {
    /// The caller does not hold the role this operation requires.
    #[error("unauthorized: {caller} is not {required}")]
    Unauthorized {
        /// The account that attempted the operation.
        caller: Address,
        /// Human-readable description of the required role.
        required: &'static str,
    },

    /// The referenced event does not exist.
    #[error("event not found: {event_id}")]
    EventNotFound {
        /// The unknown event id.
        event_id: EventId,
    },

    /// The event has been closed — attendance can no longer be recorded.
    #[error("event {event_id} is closed")]
    EventClosed {
        /// The closed event's id.
        event_id: EventId,
    },

    /// The student is already recorded as a participant of this event.
    #[error("student {student} already recorded for event {event_id}")]
    DuplicateParticipant {
        /// The event in question.
        event_id: EventId,
        /// The already-recorded student.
        student: Address,
    },

    /// A token ledger operation failed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// A credential registry operation failed.
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An organizer-defined activity that pays out on recorded attendance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Sequential identifier, unique for the system's lifetime.
    pub id: EventId,
    /// Event name, e.g. `"Introduction to Blockchain Workshop"`.
    pub name: String,
    /// Free-form category, e.g. `"workshop_attendance"`. Also used as the
    /// credential type for issued certificates.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Longer description of the event.
    pub description: String,
    /// The account that created the event.
    pub organizer: Address,
    /// Tokens minted per recorded attendance. Zero is legal — the event
    /// may be certificate-only.
    pub reward_amount: u64,
    /// Whether attendance also mints a participation certificate.
    pub issue_certificate: bool,
    /// Timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// Recorded participants in attendance order. Never contains
    /// duplicates.
    pub participants: Vec<Address>,
    /// Whether attendance can still be recorded. One-way: events close
    /// and never reopen.
    pub active: bool,
    /// Timestamp of closure, if the event has been closed.
    pub closed_at: Option<DateTime<Utc>>,
}

/// One append-only record of a reward-granting action for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The event that triggered the reward, or `None` for direct rewards.
    pub event_id: Option<EventId>,
    /// Name of the event, or `"Direct Reward"`.
    pub event_name: String,
    /// Event type, or `"direct_reward"`.
    pub event_type: String,
    /// Tokens minted by this action.
    pub tokens_earned: u64,
    /// Certificate minted by this action, if any.
    pub certificate_id: Option<CredentialId>,
    /// Free-form justification, recorded for direct rewards.
    pub reason: Option<String>,
    /// Timestamp of the action.
    pub timestamp: DateTime<Utc>,
}

/// What a student received for one recorded attendance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttendanceReceipt {
    /// Tokens minted to the student.
    pub tokens_earned: u64,
    /// Certificate minted to the student, if the event issues one.
    pub certificate_id: Option<CredentialId>,
}

/// Aggregated view of a student's standing across all three ledgers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    /// The student's address.
    pub address: Address,
    /// Current reward token balance.
    pub total_tokens: u64,
    /// Ids of every credential ever minted to the student.
    pub credentials: Vec<CredentialId>,
    /// Full reward history, oldest first.
    pub event_history: Vec<HistoryEntry>,
    /// Number of history entries.
    pub total_events: usize,
}

/// One row of the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// The account's address.
    pub address: Address,
    /// Current reward token balance.
    pub tokens: u64,
    /// Number of reward history entries for this account.
    pub events_participated: usize,
}

/// Role sets, events, and history — everything the orchestrator owns
/// directly, guarded by a single mutex.
#[derive(Debug)]
struct SystemState {
    /// The system owner. Set at construction, never changes.
    owner: Address,
    /// Accounts with the admin role. Always contains the owner.
    admins: HashSet<Address>,
    /// Accounts with the event-organizer role.
    event_organizers: HashSet<Address>,
    /// All events ever created, keyed by id.
    events: BTreeMap<EventId, Event>,
    /// Monotonic event id counter. Ids are never reused.
    event_counter: EventId,
    /// Append-only reward history per student.
    student_history: HashMap<Address, Vec<HistoryEntry>>,
    /// Advisory default reward amounts per event type.
    reward_configs: HashMap<String, u64>,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// The reward system — drives attendance-to-reward-to-credential workflows
/// over a [`RewardToken`] and a [`CredentialRegistry`] it holds for its
/// entire lifetime.
///
/// The system calls the ledgers' public operations only; direct token
/// transfers and credential queries go through the shared handles
/// ([`token`](Self::token), [`credentials`](Self::credentials)).
pub struct RewardSystem {
    token: Arc<RwLock<RewardToken>>,
    credentials: Arc<RwLock<CredentialRegistry>>,
    state: Mutex<SystemState>,
}

impl RewardSystem {
    /// Creates the reward system with the given owner and ledger handles.
    ///
    /// The owner is seeded as the sole admin, and the reward-config table
    /// starts with the platform defaults. Construction is the one-time
    /// initialization step.
    pub fn new(
        owner: impl Into<Address>,
        token: Arc<RwLock<RewardToken>>,
        credentials: Arc<RwLock<CredentialRegistry>>,
    ) -> Self {
        let owner = owner.into();
        let mut admins = HashSet::new();
        admins.insert(owner.clone());

        let reward_configs = DEFAULT_REWARD_CONFIGS
            .iter()
            .map(|(ty, amount)| (ty.to_string(), *amount))
            .collect();

        Self {
            token,
            credentials,
            state: Mutex::new(SystemState {
                owner,
                admins,
                event_organizers: HashSet::new(),
                events: BTreeMap::new(),
                event_counter: 0,
                student_history: HashMap::new(),
                reward_configs,
            }),
        }
    }

    /// Returns a shared handle to the underlying token ledger.
    pub fn token(&self) -> Arc<RwLock<RewardToken>> {
        Arc::clone(&self.token)
    }

    /// Returns a shared handle to the underlying credential registry.
    pub fn credentials(&self) -> Arc<RwLock<CredentialRegistry>> {
        Arc::clone(&self.credentials)
    }

    /// Creates a new event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `organizer` holds the
    /// organizer or admin role.
    pub fn create_event(
        &self,
        organizer: &str,
        name: &str,
        event_type: &str,
        description: &str,
        reward_amount: u64,
        issue_certificate: bool,
    ) -> Result<EventId, RewardError> {
        let mut state = self.state.lock();
        if !state.event_organizers.contains(organizer) && !state.admins.contains(organizer) {
            return Err(RewardError::Unauthorized {
                caller: organizer.to_string(),
                required: "an event organizer or admin",
            });
        }

        state.event_counter += 1;
        let id = state.event_counter;
        state.events.insert(
            id,
            Event {
                id,
                name: name.to_string(),
                event_type: event_type.to_string(),
                description: description.to_string(),
                organizer: organizer.to_string(),
                reward_amount,
                issue_certificate,
                created_at: Utc::now(),
                participants: Vec::new(),
                active: true,
                closed_at: None,
            },
        );

        Ok(id)
    }

    /// Records `student`'s attendance at an event, minting the event's
    /// reward and, if configured, a participation certificate.
    ///
    /// Both mints run under the *caller's* identity, so the caller must
    /// hold minter rights (when the event pays tokens) and issuer rights
    /// (when it issues certificates). Those rights are verified before any
    /// state is touched: a caller missing either one gets an error and no
    /// partial payout.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::EventNotFound`] if the event is unknown.
    /// Returns [`RewardError::Unauthorized`] unless the caller is the
    /// event's organizer or an admin, or if the caller lacks the required
    /// sub-ledger rights.
    /// Returns [`RewardError::EventClosed`] if the event is closed.
    /// Returns [`RewardError::DuplicateParticipant`] if the student is
    /// already recorded.
    pub fn record_attendance(
        &self,
        caller: &str,
        event_id: EventId,
        student: &str,
    ) -> Result<AttendanceReceipt, RewardError> {
        let mut state = self.state.lock();

        let event = state
            .events
            .get(&event_id)
            .ok_or(RewardError::EventNotFound { event_id })?;
        if caller != event.organizer && !state.admins.contains(caller) {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "the event's organizer or an admin",
            });
        }
        if !event.active {
            return Err(RewardError::EventClosed { event_id });
        }
        if event.participants.iter().any(|p| p == student) {
            return Err(RewardError::DuplicateParticipant {
                event_id,
                student: student.to_string(),
            });
        }

        let reward_amount = event.reward_amount;
        let issue_certificate = event.issue_certificate;
        let event_name = event.name.clone();
        let event_type = event.event_type.clone();

        // Lock order: state, then token, then credentials.
        let mut token = self.token.write();
        let mut credentials = self.credentials.write();

        // Verify the caller's sub-ledger rights before mutating anything,
        // so a missing right cannot leave tokens minted without the
        // matching certificate.
        if reward_amount > 0 && !token.is_minter(caller) {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "an authorized token minter",
            });
        }
        if issue_certificate && !credentials.is_issuer(caller) {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "an authorized credential issuer",
            });
        }

        if reward_amount > 0 {
            token.mint(caller, student, reward_amount)?;
        }

        let certificate_id = if issue_certificate {
            let mut metadata = Metadata::new();
            metadata.insert("event_id".into(), event_id.into());
            metadata.insert("event_name".into(), event_name.as_str().into());
            metadata.insert("event_type".into(), event_type.as_str().into());

            Some(credentials.mint(
                caller,
                student,
                &event_type,
                &format!("{} - Certificate of Participation", event_name),
                &format!("Awarded for participation in {}", event_name),
                Some(metadata),
            )?)
        } else {
            None
        };

        drop(credentials);
        drop(token);

        let event = state
            .events
            .get_mut(&event_id)
            .ok_or(RewardError::EventNotFound { event_id })?;
        event.participants.push(student.to_string());

        state
            .student_history
            .entry(student.to_string())
            .or_default()
            .push(HistoryEntry {
                event_id: Some(event_id),
                event_name,
                event_type,
                tokens_earned: reward_amount,
                certificate_id,
                reason: None,
                timestamp: Utc::now(),
            });

        Ok(AttendanceReceipt {
            tokens_earned: reward_amount,
            certificate_id,
        })
    }

    /// Mints `amount` tokens straight to a student, outside any event.
    ///
    /// The mint runs under the issuer's identity — the issuer must hold
    /// minter rights on the token ledger.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `issuer` is an admin.
    /// Propagates [`TokenError`] from the mint (unauthorized minter,
    /// zero amount).
    pub fn issue_direct_reward(
        &self,
        issuer: &str,
        student: &str,
        amount: u64,
        reason: &str,
    ) -> Result<(), RewardError> {
        let mut state = self.state.lock();
        if !state.admins.contains(issuer) {
            return Err(RewardError::Unauthorized {
                caller: issuer.to_string(),
                required: "an admin",
            });
        }

        self.token.write().mint(issuer, student, amount)?;

        state
            .student_history
            .entry(student.to_string())
            .or_default()
            .push(HistoryEntry {
                event_id: None,
                event_name: "Direct Reward".to_string(),
                event_type: "direct_reward".to_string(),
                tokens_earned: amount,
                certificate_id: None,
                reason: Some(reason.to_string()),
                timestamp: Utc::now(),
            });

        Ok(())
    }

    /// Mints a credential straight to a student, outside any event.
    ///
    /// The mint runs under the issuer's identity — an admin who is not
    /// also a registry issuer will be rejected by the registry itself.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `issuer` is an admin
    /// or a registry issuer. Propagates [`CredentialError`] from the mint.
    pub fn issue_credential(
        &self,
        issuer: &str,
        student: &str,
        credential_type: &str,
        title: &str,
        description: &str,
        metadata: Option<Metadata>,
    ) -> Result<CredentialId, RewardError> {
        let state = self.state.lock();
        let mut credentials = self.credentials.write();
        if !state.admins.contains(issuer) && !credentials.is_issuer(issuer) {
            return Err(RewardError::Unauthorized {
                caller: issuer.to_string(),
                required: "an admin or credential issuer",
            });
        }

        let id = credentials.mint(
            issuer,
            student,
            credential_type,
            title,
            description,
            metadata,
        )?;
        Ok(id)
    }

    /// Aggregates a student's balance, credentials, and history. Pure
    /// read; unknown students yield an empty summary.
    pub fn get_student_summary(&self, student: &str) -> StudentSummary {
        let state = self.state.lock();
        let total_tokens = self.token.read().balance_of(student);
        let credentials = self.credentials.read().tokens_of_owner(student).to_vec();
        let event_history = state
            .student_history
            .get(student)
            .cloned()
            .unwrap_or_default();

        StudentSummary {
            address: student.to_string(),
            total_tokens,
            total_events: event_history.len(),
            credentials,
            event_history,
        }
    }

    /// Returns the top `limit` accounts by token balance.
    ///
    /// Ties break by ascending address order, so the result is
    /// deterministic regardless of map iteration order.
    pub fn get_leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let state = self.state.lock();
        let token = self.token.read();

        let mut entries: Vec<LeaderboardEntry> = token
            .balances()
            .map(|(address, tokens)| LeaderboardEntry {
                address: address.to_string(),
                tokens,
                events_participated: state
                    .student_history
                    .get(address)
                    .map(Vec::len)
                    .unwrap_or(0),
            })
            .collect();

        entries.sort_by(|a, b| {
            b.tokens
                .cmp(&a.tokens)
                .then_with(|| a.address.cmp(&b.address))
        });
        entries.truncate(limit);
        entries
    }

    /// Returns a snapshot of the event with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::EventNotFound`] if the event is unknown.
    pub fn get_event(&self, event_id: EventId) -> Result<Event, RewardError> {
        self.state
            .lock()
            .events
            .get(&event_id)
            .cloned()
            .ok_or(RewardError::EventNotFound { event_id })
    }

    /// Returns snapshots of all events still accepting attendance, in
    /// ascending id order.
    pub fn get_active_events(&self) -> Vec<Event> {
        self.state
            .lock()
            .events
            .values()
            .filter(|e| e.active)
            .cloned()
            .collect()
    }

    /// Closes an event. One-way: closed events never reopen.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::EventNotFound`] if the event is unknown.
    /// Returns [`RewardError::Unauthorized`] unless the caller is the
    /// event's organizer or an admin.
    pub fn close_event(&self, caller: &str, event_id: EventId) -> Result<(), RewardError> {
        let mut state = self.state.lock();
        let is_admin = state.admins.contains(caller);
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or(RewardError::EventNotFound { event_id })?;

        if caller != event.organizer && !is_admin {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "the event's organizer or an admin",
            });
        }

        event.active = false;
        event.closed_at = Some(Utc::now());
        Ok(())
    }

    /// Grants the admin role. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `caller` is the owner.
    pub fn add_admin(&self, caller: &str, new_admin: &str) -> Result<(), RewardError> {
        let mut state = self.state.lock();
        if caller != state.owner {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "the owner",
            });
        }
        state.admins.insert(new_admin.to_string());
        Ok(())
    }

    /// Grants the event-organizer role. Admin only.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `caller` is an admin.
    pub fn add_event_organizer(&self, caller: &str, organizer: &str) -> Result<(), RewardError> {
        let mut state = self.state.lock();
        if !state.admins.contains(caller) {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "an admin",
            });
        }
        state.event_organizers.insert(organizer.to_string());
        Ok(())
    }

    /// Overwrites the advisory default reward for an event type. Admin
    /// only. Nothing reads this table to auto-populate events.
    ///
    /// # Errors
    ///
    /// Returns [`RewardError::Unauthorized`] unless `caller` is an admin.
    pub fn update_reward_config(
        &self,
        caller: &str,
        event_type: &str,
        amount: u64,
    ) -> Result<(), RewardError> {
        let mut state = self.state.lock();
        if !state.admins.contains(caller) {
            return Err(RewardError::Unauthorized {
                caller: caller.to_string(),
                required: "an admin",
            });
        }
        state
            .reward_configs
            .insert(event_type.to_string(), amount);
        Ok(())
    }

    /// Returns the advisory default reward for an event type, if one is
    /// configured.
    pub fn reward_config(&self, event_type: &str) -> Option<u64> {
        self.state.lock().reward_configs.get(event_type).copied()
    }
}
