//! Staged rollouts — deterministic percentage-based version selection.
//!
//! A caller's identity is hashed together with each record's version and
//! prefix into a bucket in `1..=100`; the first record (newest version
//! first) whose percentage covers the bucket wins, else the last record.
//! The same identity resolves to the same version on every evaluation, so
//! canary and beta releases can be staged without a decision server.
//!
//! # Components
//!
//! - **`bucket`** — key → bucket in `1..=100`
//! - **`evaluate`** — per-list selection and whole-domain evaluation
//! - **`patch`** — create/update a version's percentage, keep lists sorted
//! - **`engine`** — evaluator and mutator with swappable hasher/comparator
//! - **`manifest`** — apply a `rollouts.toml` of patches to a domain
//!
//! ```
//! use staged_rollout::*;
//!
//! let mut domain = RolloutDomain::new();
//! let beta = RolloutPatch::new("0.2.0-beta.1", 10.0, "app");
//! let stable = RolloutPatch::new("0.1.0", 100.0, "app");
//! patch_rollouts_at(&mut domain, "_site", &beta, 1_700_000_000_000).unwrap();
//! patch_rollouts_at(&mut domain, "_site", &stable, 1_700_000_000_000).unwrap();
//!
//! let context = Context::new().with_user_id("user-123");
//! let selected = calculate_rollouts_for_domain(&context, &domain);
//! assert!(selected.contains_key("_site"));
//! ```

pub mod bucket;
pub mod engine;
pub mod evaluate;
pub mod manifest;
pub mod patch;

pub use bucket::{Bucketer, bucket};
pub use engine::RolloutEngine;
pub use evaluate::{
    RolloutEvaluator, calculate_rollout, calculate_rollouts_for_domain, normalized_value,
};
pub use manifest::{ManifestEntry, RolloutManifest};
pub use patch::{DomainMutator, patch_rollouts, patch_rollouts_at};
pub use staged_core::*;
