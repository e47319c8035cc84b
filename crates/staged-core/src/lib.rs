//! staged-core — shared types and collaborators for Staged rollouts.
//!
//! Holds the persisted data model ([`RolloutDomain`] and its
//! [`RolloutRecord`]s), the request [`Context`], the error type, and the
//! three seams the rollout engine depends on:
//!
//! - **`hash`** — 32-bit key hashing (MurmurHash3 x86_32, seed 0)
//! - **`version`** — semantic-version validity and precedence
//! - **`clock`** — the current timestamp for domain mutations
//!
//! All types serialize to the JSON document format used for persisted
//! rollout domains (`records`, `createdAt`, `updatedAt`, ...).

pub mod clock;
pub mod error;
pub mod hash;
pub mod types;
pub mod version;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{RolloutError, RolloutResult, ValidationField};
pub use hash::{KeyHasher, Murmur3, code_unit_bytes, murmur3_32};
pub use types::*;
pub use version::{SemverComparator, VersionComparator};
