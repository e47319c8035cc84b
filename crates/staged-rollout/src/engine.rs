//! Rollout engine — evaluator and mutator sharing one set of collaborators.
//!
//! The free functions in [`crate::evaluate`] and [`crate::patch`] use the
//! default hasher and comparator. A `RolloutEngine` lets a caller swap
//! either one and still reach every operation from a single value.

use std::collections::BTreeMap;

use staged_core::{
    Clock, Context, KeyHasher, Murmur3, RolloutDomain, RolloutName, RolloutPatch, RolloutRecord,
    RolloutResult, SemverComparator, Timestamp, VersionComparator,
};

use crate::evaluate::RolloutEvaluator;
use crate::patch::DomainMutator;

#[derive(Debug, Clone, Default)]
pub struct RolloutEngine<H = Murmur3, V = SemverComparator> {
    evaluator: RolloutEvaluator<H>,
    mutator: DomainMutator<V>,
}

impl<H: KeyHasher, V: VersionComparator> RolloutEngine<H, V> {
    pub fn new(hasher: H, comparator: V) -> Self {
        Self {
            evaluator: RolloutEvaluator::new(hasher),
            mutator: DomainMutator::new(comparator),
        }
    }

    pub fn evaluator(&self) -> &RolloutEvaluator<H> {
        &self.evaluator
    }

    pub fn mutator(&self) -> &DomainMutator<V> {
        &self.mutator
    }

    pub fn normalized_value(&self, context: &Context, record: &RolloutRecord) -> u8 {
        self.evaluator.normalized_value(context, record)
    }

    pub fn calculate_rollout<'r>(
        &self,
        context: &Context,
        records: &'r [RolloutRecord],
    ) -> RolloutResult<&'r RolloutRecord> {
        self.evaluator.calculate_rollout(context, records)
    }

    pub fn calculate_rollouts_for_domain(
        &self,
        context: &Context,
        domain: &RolloutDomain,
    ) -> BTreeMap<RolloutName, RolloutRecord> {
        self.evaluator.calculate_rollouts_for_domain(context, domain)
    }

    pub fn patch_rollouts<'d>(
        &self,
        domain: &'d mut RolloutDomain,
        rollout_name: &str,
        patch: &RolloutPatch,
        clock: &impl Clock,
    ) -> RolloutResult<&'d mut RolloutDomain> {
        self.mutator.patch(domain, rollout_name, patch, clock)
    }

    pub fn patch_rollouts_at<'d>(
        &self,
        domain: &'d mut RolloutDomain,
        rollout_name: &str,
        patch: &RolloutPatch,
        timestamp: Timestamp,
    ) -> RolloutResult<&'d mut RolloutDomain> {
        self.mutator.patch_at(domain, rollout_name, patch, timestamp)
    }
}
