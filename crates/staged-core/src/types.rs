//! Domain types for rollout selection.
//!
//! These types mirror the persisted rollout document: a domain maps each
//! rollout name to its version records, newest version first. Field names
//! are camelCase on the wire so existing JSON documents load unchanged.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of a rollout list inside a domain (e.g. `"_site"`, `"@scope/pkg"`).
pub type RolloutName = String;

/// Semantic version string of a rollout record.
pub type RolloutVersion = String;

/// Epoch milliseconds.
pub type Timestamp = i64;

// ── Context ───────────────────────────────────────────────────────

/// Identity used to bucket a caller.
///
/// Fields are consulted in priority order: `user_id`, `session_id`,
/// `remote_address`. Only the first non-empty one is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Context {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_address: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_remote_address(mut self, remote_address: impl Into<String>) -> Self {
        self.remote_address = Some(remote_address.into());
        self
    }

    /// First present, non-empty identity field in priority order.
    pub fn stable_identity(&self) -> Option<&str> {
        [&self.user_id, &self.session_id, &self.remote_address]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|value| !value.is_empty())
    }

    /// Identity to hash for this context.
    ///
    /// Falls back to a fresh random value when no identity field is set,
    /// so bucketing an anonymous context is not repeatable.
    pub fn identity(&self) -> Cow<'_, str> {
        match self.stable_identity() {
            Some(id) => Cow::Borrowed(id),
            None => Cow::Owned(rand::random::<f64>().to_string()),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────

/// One version's rollout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloutRecord {
    pub version: RolloutVersion,
    /// Share of bucketed identities, 0-100. Zero disables the record
    /// except as the list fallback.
    pub percentage: f64,
    /// Discriminator mixed into the hash key.
    #[serde(default)]
    pub prefix: String,
    /// Set once when the record is first created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// Set on every mutation, including creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl RolloutRecord {
    /// A record without timestamps, as found in hand-written documents.
    pub fn new(version: impl Into<String>, percentage: f64, prefix: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            percentage,
            prefix: prefix.into(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Hash key for `identity`: `{version}:{prefix}:{identity}`.
    pub fn bucket_key(&self, identity: &str) -> String {
        format!("{}:{}:{}", self.version, self.prefix, identity)
    }
}

/// Create-or-update request for one version of a rollout list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutPatch {
    pub version: RolloutVersion,
    pub percentage: f64,
    pub prefix: String,
}

impl RolloutPatch {
    pub fn new(version: impl Into<String>, percentage: f64, prefix: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            percentage,
            prefix: prefix.into(),
        }
    }
}

// ── Domain ────────────────────────────────────────────────────────

/// Persisted rollout state: rollout name → records, newest version first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutDomain {
    /// Missing in some older documents; loads as empty.
    #[serde(default)]
    pub records: BTreeMap<RolloutName, Vec<RolloutRecord>>,
}

impl RolloutDomain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records for `name`, if the list exists.
    pub fn get(&self, name: &str) -> Option<&[RolloutRecord]> {
        self.records.get(name).map(Vec::as_slice)
    }

    /// Mutable list for `name`, created empty on first access.
    pub fn list_mut(&mut self, name: &str) -> &mut Vec<RolloutRecord> {
        self.records.entry(name.to_string()).or_default()
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
