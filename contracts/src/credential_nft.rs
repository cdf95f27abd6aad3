//! # Credential Registry Contract
//!
//! Soulbound achievement credentials — certificates, badges, and awards
//! minted to students by authorized issuers. Unlike the reward token,
//! nothing here is fungible or transferable: once a credential is minted
//! to a recipient, ownership never changes. Revocation flips a status
//! flag; it never deletes the record.
//!
//! ## Security Model
//!
//! - **Issuer gating**: only accounts in the owner-managed issuer set may
//!   mint. The registry owner is always an issuer and cannot be removed.
//! - **Revocation**: only the credential's original issuer or the registry
//!   owner may revoke. Revoked records stay queryable with `revoked=true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

use crate::metadata::Metadata;
use crate::Address;

/// Display name of the credential collection.
pub const CREDENTIAL_NAME: &str = "Student Credential";

/// Ticker symbol of the credential collection.
pub const CREDENTIAL_SYMBOL: &str = "CRED";

/// Unique identifier for a credential, allocated sequentially starting at 1.
pub type CredentialId = u64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during credential registry operations.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The caller is not authorized for this operation.
    #[error("unauthorized: {account} may not issue or revoke this credential")]
    Unauthorized {
        /// The account that attempted the operation.
        account: Address,
    },

    /// The caller is not the registry owner.
    #[error("unauthorized: only the owner can manage issuers, not {caller}")]
    NotOwner {
        /// The account that attempted the owner-only operation.
        caller: Address,
    },

    /// The referenced credential does not exist.
    #[error("credential not found: {id}")]
    NotFound {
        /// The unknown credential id.
        id: CredentialId,
    },

    /// The owner must always remain an issuer.
    #[error("cannot remove owner as issuer")]
    OwnerIsIssuer,

    /// The credential record could not be rendered as a JSON document.
    #[error("credential serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An immutable credential record.
///
/// `issuer` and `recipient` are fixed at mint time — there is no transfer
/// operation anywhere in the registry, which is what makes the credential
/// soulbound. Revocation only touches `revoked` and `revoked_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Sequential identifier, unique for the registry's lifetime.
    pub id: CredentialId,
    /// Free-form category, e.g. `"workshop_attendance"`.
    #[serde(rename = "type")]
    pub credential_type: String,
    /// Human-readable title.
    pub title: String,
    /// Longer description of what the credential attests.
    pub description: String,
    /// The account that minted the credential.
    pub issuer: Address,
    /// The account the credential was minted to. Never changes.
    pub recipient: Address,
    /// Timestamp of issuance.
    pub issued_at: DateTime<Utc>,
    /// Issuer-supplied document (event ids, placements, grades, ...).
    pub metadata: Metadata,
    /// Always `true`: credentials are non-transferable by construction.
    pub soulbound: bool,
    /// Whether the credential has been revoked.
    pub revoked: bool,
    /// Timestamp of the most recent revocation, if any.
    pub revoked_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

/// The credential registry — records, the per-owner index, and the
/// authorized-issuer set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRegistry {
    /// The registry owner. Set at construction, never changes.
    owner: Address,
    /// Accounts permitted to mint credentials.
    authorized_issuers: HashSet<Address>,
    /// Monotonic id counter. Starts at 0; ids are never reused.
    credential_counter: CredentialId,
    /// All credentials ever minted, keyed by id.
    credentials: BTreeMap<CredentialId, Credential>,
    /// Per-recipient credential ids in mint order. Derived from
    /// `credentials` at mint time, never mutated independently.
    owner_index: HashMap<Address, Vec<CredentialId>>,
}

impl CredentialRegistry {
    /// Creates the registry with the given owner, seeded as the sole
    /// authorized issuer. Construction is the one-time initialization step.
    pub fn new(owner: impl Into<Address>) -> Self {
        let owner = owner.into();
        let mut authorized_issuers = HashSet::new();
        authorized_issuers.insert(owner.clone());
        Self {
            owner,
            authorized_issuers,
            credential_counter: 0,
            credentials: BTreeMap::new(),
            owner_index: HashMap::new(),
        }
    }

    /// Returns the registry owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Mints a new soulbound credential to `recipient` and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Unauthorized`] if `issuer` is not in the
    /// authorized-issuer set.
    pub fn mint(
        &mut self,
        issuer: &str,
        recipient: &str,
        credential_type: &str,
        title: &str,
        description: &str,
        metadata: Option<Metadata>,
    ) -> Result<CredentialId, CredentialError> {
        if !self.authorized_issuers.contains(issuer) {
            return Err(CredentialError::Unauthorized {
                account: issuer.to_string(),
            });
        }

        self.credential_counter += 1;
        let id = self.credential_counter;

        let credential = Credential {
            id,
            credential_type: credential_type.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            issuer: issuer.to_string(),
            recipient: recipient.to_string(),
            issued_at: Utc::now(),
            metadata: metadata.unwrap_or_default(),
            soulbound: true,
            revoked: false,
            revoked_at: None,
        };

        self.credentials.insert(id, credential);
        self.owner_index
            .entry(recipient.to_string())
            .or_default()
            .push(id);

        Ok(id)
    }

    /// Returns the recipient of credential `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if `id` is unknown.
    pub fn owner_of(&self, id: CredentialId) -> Result<&str, CredentialError> {
        self.credentials
            .get(&id)
            .map(|c| c.recipient.as_str())
            .ok_or(CredentialError::NotFound { id })
    }

    /// Returns the full record for credential `id`. Revoked credentials
    /// are still returned, with `revoked = true`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if `id` is unknown.
    pub fn get_credential(&self, id: CredentialId) -> Result<&Credential, CredentialError> {
        self.credentials
            .get(&id)
            .ok_or(CredentialError::NotFound { id })
    }

    /// Renders credential `id` as a JSON document — the registry's
    /// `token_uri` equivalent for external consumers.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if `id` is unknown.
    pub fn token_uri(&self, id: CredentialId) -> Result<String, CredentialError> {
        let credential = self.get_credential(id)?;
        Ok(serde_json::to_string(credential)?)
    }

    /// Returns the ids of every credential ever minted to `account`, in
    /// mint order. Empty for unknown accounts. Revoked ids are included.
    pub fn tokens_of_owner(&self, account: &str) -> &[CredentialId] {
        self.owner_index
            .get(account)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns whether credential `id` exists and belongs to
    /// `claimed_owner`. Unknown ids yield `false`, not an error — this is
    /// the verification predicate, and verification of a nonexistent
    /// credential simply fails.
    pub fn verify_credential(&self, id: CredentialId, claimed_owner: &str) -> bool {
        self.credentials
            .get(&id)
            .is_some_and(|c| c.recipient == claimed_owner)
    }

    /// Marks credential `id` as revoked and stamps `revoked_at`.
    ///
    /// Revocation never removes the record. Revoking an already-revoked
    /// credential is allowed and simply refreshes the timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if `id` is unknown.
    /// Returns [`CredentialError::Unauthorized`] unless `caller` is the
    /// credential's issuer or the registry owner.
    pub fn revoke(&mut self, caller: &str, id: CredentialId) -> Result<(), CredentialError> {
        let is_owner = caller == self.owner;
        let credential = self
            .credentials
            .get_mut(&id)
            .ok_or(CredentialError::NotFound { id })?;

        if caller != credential.issuer && !is_owner {
            return Err(CredentialError::Unauthorized {
                account: caller.to_string(),
            });
        }

        credential.revoked = true;
        credential.revoked_at = Some(Utc::now());
        Ok(())
    }

    /// Returns whether credential `id` is revoked.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotFound`] if `id` is unknown.
    pub fn is_revoked(&self, id: CredentialId) -> Result<bool, CredentialError> {
        self.credentials
            .get(&id)
            .map(|c| c.revoked)
            .ok_or(CredentialError::NotFound { id })
    }

    /// Adds `new_issuer` to the authorized-issuer set. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotOwner`] if `caller` is not the owner.
    pub fn add_issuer(&mut self, caller: &str, new_issuer: &str) -> Result<(), CredentialError> {
        if caller != self.owner {
            return Err(CredentialError::NotOwner {
                caller: caller.to_string(),
            });
        }
        self.authorized_issuers.insert(new_issuer.to_string());
        Ok(())
    }

    /// Removes `issuer` from the authorized-issuer set. Owner only.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::NotOwner`] if `caller` is not the owner.
    /// Returns [`CredentialError::OwnerIsIssuer`] if `issuer` is the owner.
    pub fn remove_issuer(&mut self, caller: &str, issuer: &str) -> Result<(), CredentialError> {
        if caller != self.owner {
            return Err(CredentialError::NotOwner {
                caller: caller.to_string(),
            });
        }
        if issuer == self.owner {
            return Err(CredentialError::OwnerIsIssuer);
        }
        self.authorized_issuers.remove(issuer);
        Ok(())
    }

    /// Returns whether `account` is an authorized issuer. Never errors.
    pub fn is_issuer(&self, account: &str) -> bool {
        self.authorized_issuers.contains(account)
    }

    /// Returns the total number of credentials ever minted. Revocation
    /// does not decrease this.
    pub fn total_supply(&self) -> u64 {
        self.credential_counter
    }

    /// Returns `account`'s non-revoked credentials of the given type, as
    /// full records in mint order.
    pub fn credentials_by_type(&self, account: &str, credential_type: &str) -> Vec<&Credential> {
        self.tokens_of_owner(account)
            .iter()
            .filter_map(|id| self.credentials.get(id))
            .filter(|c| c.credential_type == credential_type && !c.revoked)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_credential() -> (CredentialRegistry, CredentialId) {
        let mut registry = CredentialRegistry::new("owner");
        let id = registry
            .mint(
                "owner",
                "alice",
                "workshop_attendance",
                "Rust Workshop - Certificate of Participation",
                "Awarded for participation in Rust Workshop",
                None,
            )
            .unwrap();
        (registry, id)
    }

    #[test]
    fn mint_allocates_sequential_ids() {
        let mut registry = CredentialRegistry::new("owner");
        let a = registry
            .mint("owner", "alice", "badge", "A", "first", None)
            .unwrap();
        let b = registry
            .mint("owner", "bob", "badge", "B", "second", None)
            .unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(registry.total_supply(), 2);
    }

    #[test]
    fn mint_by_non_issuer_rejected() {
        let mut registry = CredentialRegistry::new("owner");
        let result = registry.mint("mallory", "mallory", "badge", "X", "forged", None);
        assert!(matches!(result, Err(CredentialError::Unauthorized { .. })));
        assert_eq!(registry.total_supply(), 0);
    }

    #[test]
    fn owner_of_unknown_id_errors() {
        let registry = CredentialRegistry::new("owner");
        assert!(matches!(
            registry.owner_of(99),
            Err(CredentialError::NotFound { id: 99 })
        ));
    }

    #[test]
    fn verify_unknown_id_is_false_not_error() {
        let registry = CredentialRegistry::new("owner");
        assert!(!registry.verify_credential(99, "anyone"));
    }

    #[test]
    fn verify_checks_claimed_owner() {
        let (registry, id) = registry_with_credential();
        assert!(registry.verify_credential(id, "alice"));
        assert!(!registry.verify_credential(id, "bob"));
    }

    #[test]
    fn ownership_survives_revocation() {
        let (mut registry, id) = registry_with_credential();
        registry.revoke("owner", id).unwrap();
        assert_eq!(registry.owner_of(id).unwrap(), "alice");
        assert_eq!(registry.tokens_of_owner("alice"), &[id]);
    }

    #[test]
    fn revoke_marks_but_does_not_delete() {
        let (mut registry, id) = registry_with_credential();
        registry.revoke("owner", id).unwrap();

        assert!(registry.is_revoked(id).unwrap());
        let record = registry.get_credential(id).unwrap();
        assert!(record.revoked);
        assert!(record.revoked_at.is_some());
    }

    #[test]
    fn revoke_by_unrelated_account_rejected() {
        let (mut registry, id) = registry_with_credential();
        let result = registry.revoke("mallory", id);
        assert!(matches!(result, Err(CredentialError::Unauthorized { .. })));
        assert!(!registry.is_revoked(id).unwrap());
    }

    #[test]
    fn issuer_of_record_can_revoke() {
        let mut registry = CredentialRegistry::new("owner");
        registry.add_issuer("owner", "teacher").unwrap();
        let id = registry
            .mint("teacher", "alice", "badge", "T", "taught", None)
            .unwrap();
        registry.revoke("teacher", id).unwrap();
        assert!(registry.is_revoked(id).unwrap());
    }

    #[test]
    fn double_revoke_is_idempotent() {
        let (mut registry, id) = registry_with_credential();
        registry.revoke("owner", id).unwrap();
        let first = registry.get_credential(id).unwrap().revoked_at;
        registry.revoke("owner", id).unwrap();
        assert!(registry.is_revoked(id).unwrap());
        assert!(registry.get_credential(id).unwrap().revoked_at >= first);
    }

    #[test]
    fn credentials_by_type_excludes_revoked_and_other_types() {
        let mut registry = CredentialRegistry::new("owner");
        let keep = registry
            .mint("owner", "alice", "badge", "Keep", "", None)
            .unwrap();
        let revoked = registry
            .mint("owner", "alice", "badge", "Gone", "", None)
            .unwrap();
        registry
            .mint("owner", "alice", "certificate", "Other", "", None)
            .unwrap();
        registry.revoke("owner", revoked).unwrap();

        let badges = registry.credentials_by_type("alice", "badge");
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].id, keep);
    }

    #[test]
    fn owner_cannot_be_removed_as_issuer() {
        let mut registry = CredentialRegistry::new("owner");
        let result = registry.remove_issuer("owner", "owner");
        assert!(matches!(result, Err(CredentialError::OwnerIsIssuer)));
        assert!(registry.is_issuer("owner"));
    }

    #[test]
    fn token_uri_is_a_json_document_with_core_fields() {
        let (registry, id) = registry_with_credential();
        let uri = registry.token_uri(id).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&uri).unwrap();

        assert_eq!(doc["id"], 1);
        assert_eq!(doc["type"], "workshop_attendance");
        assert_eq!(doc["issuer"], "owner");
        assert_eq!(doc["recipient"], "alice");
        assert_eq!(doc["soulbound"], true);
        assert_eq!(doc["revoked"], false);
        assert!(doc["revoked_at"].is_null());
    }

    #[test]
    fn token_uri_unknown_id_errors() {
        let registry = CredentialRegistry::new("owner");
        assert!(matches!(
            registry.token_uri(1),
            Err(CredentialError::NotFound { id: 1 })
        ));
    }
}
