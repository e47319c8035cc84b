//! rollouts.toml manifest — declarative patches for a rollout domain.
//!
//! ```toml
//! [[rollout]]
//! name = "_site"
//! version = "0.1.1"
//! percentage = 10
//! prefix = "package"
//! ```

use std::path::Path;
use std::str::FromStr;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use staged_core::{
    Clock, RolloutDomain, RolloutName, RolloutPatch, RolloutVersion, SemverComparator, Timestamp,
};
use tracing::info;

use crate::patch::DomainMutator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RolloutManifest {
    #[serde(default, rename = "rollout")]
    pub rollouts: Vec<ManifestEntry>,
}

/// One `[[rollout]]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: RolloutName,
    pub version: RolloutVersion,
    pub percentage: f64,
    #[serde(default)]
    pub prefix: String,
    /// Overrides the clock for this entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl ManifestEntry {
    pub fn patch(&self) -> RolloutPatch {
        RolloutPatch::new(self.version.clone(), self.percentage, self.prefix.clone())
    }
}

impl RolloutManifest {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        content
            .parse()
            .with_context(|| format!("parsing {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply every entry in order. Returns the number of entries applied.
    ///
    /// Entries before a failing one stay applied.
    pub fn apply(&self, domain: &mut RolloutDomain, clock: &impl Clock) -> anyhow::Result<usize> {
        let mutator = DomainMutator::<SemverComparator>::default();
        let now = clock.now_millis();
        for (index, entry) in self.rollouts.iter().enumerate() {
            let timestamp = entry.timestamp.unwrap_or(now);
            mutator
                .patch_at(domain, &entry.name, &entry.patch(), timestamp)
                .with_context(|| format!("rollout entry {index} ({:?})", entry.name))?;
        }
        info!(entries = self.rollouts.len(), "applied rollout manifest");
        Ok(self.rollouts.len())
    }
}

impl FromStr for RolloutManifest {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}
