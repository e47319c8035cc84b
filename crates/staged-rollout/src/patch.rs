//! Domain mutation — create or update one version of a rollout list.
//!
//! A patch is validated in full before the domain is touched. On success
//! the matching record (by exact version string) is created or updated and
//! the list is re-sorted newest version first.

use staged_core::{
    Clock, RolloutDomain, RolloutError, RolloutPatch, RolloutRecord, RolloutResult,
    SemverComparator, Timestamp, VersionComparator,
};
use tracing::{debug, warn};

/// Apply `patch` to `domain[rollout_name]`, stamped with the clock's time.
pub fn patch_rollouts<'d>(
    domain: &'d mut RolloutDomain,
    rollout_name: &str,
    patch: &RolloutPatch,
    clock: &impl Clock,
) -> RolloutResult<&'d mut RolloutDomain> {
    DomainMutator::<SemverComparator>::default().patch(domain, rollout_name, patch, clock)
}

/// Apply `patch` to `domain[rollout_name]` with an explicit timestamp.
pub fn patch_rollouts_at<'d>(
    domain: &'d mut RolloutDomain,
    rollout_name: &str,
    patch: &RolloutPatch,
    timestamp: Timestamp,
) -> RolloutResult<&'d mut RolloutDomain> {
    DomainMutator::<SemverComparator>::default().patch_at(domain, rollout_name, patch, timestamp)
}

/// Sole writer of a [`RolloutDomain`].
///
/// Holds no lock: callers sharing a domain must serialize patches.
#[derive(Debug, Clone, Default)]
pub struct DomainMutator<V = SemverComparator> {
    comparator: V,
}

impl<V: VersionComparator> DomainMutator<V> {
    pub fn new(comparator: V) -> Self {
        Self { comparator }
    }

    /// Patch using `clock` for the timestamp. The clock is read once.
    pub fn patch<'d>(
        &self,
        domain: &'d mut RolloutDomain,
        rollout_name: &str,
        patch: &RolloutPatch,
        clock: &impl Clock,
    ) -> RolloutResult<&'d mut RolloutDomain> {
        self.patch_at(domain, rollout_name, patch, clock.now_millis())
    }

    pub fn patch_at<'d>(
        &self,
        domain: &'d mut RolloutDomain,
        rollout_name: &str,
        patch: &RolloutPatch,
        timestamp: Timestamp,
    ) -> RolloutResult<&'d mut RolloutDomain> {
        self.validate(rollout_name, patch, timestamp)
            .inspect_err(|err| warn!(rollout = rollout_name, %err, "rejected rollout patch"))?;

        let list = domain.list_mut(rollout_name);
        let index = match list.iter().position(|r| r.version == patch.version) {
            Some(index) => {
                debug!(
                    rollout = rollout_name,
                    version = %patch.version,
                    percentage = patch.percentage,
                    "updating rollout record"
                );
                index
            }
            None => {
                debug!(
                    rollout = rollout_name,
                    version = %patch.version,
                    percentage = patch.percentage,
                    "creating rollout record"
                );
                list.push(RolloutRecord {
                    version: patch.version.clone(),
                    percentage: patch.percentage.trunc(),
                    prefix: patch.prefix.clone(),
                    created_at: Some(timestamp),
                    updated_at: None,
                });
                list.len() - 1
            }
        };

        // Raw percentage, replacing the truncated value set on creation.
        let record = &mut list[index];
        record.percentage = patch.percentage;
        record.updated_at = Some(timestamp);

        list.sort_by(|a, b| self.comparator.compare(&b.version, &a.version));

        Ok(domain)
    }

    /// Checks run in order: name, version, percentage, timestamp.
    fn validate(
        &self,
        rollout_name: &str,
        patch: &RolloutPatch,
        timestamp: Timestamp,
    ) -> RolloutResult<()> {
        if rollout_name.is_empty() {
            return Err(RolloutError::invalid_rollout_name(rollout_name));
        }
        if patch.version.is_empty() || !self.comparator.is_valid(&patch.version) {
            return Err(RolloutError::invalid_version(&patch.version));
        }
        // NaN fails the range check.
        if !(0.0..=100.0).contains(&patch.percentage) {
            return Err(RolloutError::invalid_percentage(patch.percentage));
        }
        if timestamp <= 0 {
            return Err(RolloutError::invalid_timestamp(timestamp));
        }
        Ok(())
    }
}
