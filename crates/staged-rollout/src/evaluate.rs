//! Rollout evaluation — pick one record per rollout list for a context.
//!
//! Records are tried in the order given; the first record with a positive
//! percentage whose bucket falls at or under that percentage wins. When no
//! record matches, the last record is returned. Callers keep lists sorted
//! newest version first so the newest matching version wins.

use std::collections::BTreeMap;

use staged_core::{
    Context, KeyHasher, Murmur3, RolloutDomain, RolloutError, RolloutName, RolloutRecord,
    RolloutResult,
};
use tracing::{debug, trace};

use crate::bucket::Bucketer;

/// Normalized value in `1..=100` for `context` against `record`.
///
/// Stable for contexts with an identity; random otherwise.
pub fn normalized_value(context: &Context, record: &RolloutRecord) -> u8 {
    RolloutEvaluator::<Murmur3>::default().normalized_value(context, record)
}

/// Select the record `context` resolves to. Fails only on an empty list.
pub fn calculate_rollout<'r>(
    context: &Context,
    records: &'r [RolloutRecord],
) -> RolloutResult<&'r RolloutRecord> {
    RolloutEvaluator::<Murmur3>::default().calculate_rollout(context, records)
}

/// Select a record for every non-empty rollout list in `domain`.
pub fn calculate_rollouts_for_domain(
    context: &Context,
    domain: &RolloutDomain,
) -> BTreeMap<RolloutName, RolloutRecord> {
    RolloutEvaluator::<Murmur3>::default().calculate_rollouts_for_domain(context, domain)
}

/// Read-only evaluator over rollout records.
#[derive(Debug, Clone, Default)]
pub struct RolloutEvaluator<H = Murmur3> {
    bucketer: Bucketer<H>,
}

impl<H: KeyHasher> RolloutEvaluator<H> {
    pub fn new(hasher: H) -> Self {
        Self {
            bucketer: Bucketer::new(hasher),
        }
    }

    pub fn normalized_value(&self, context: &Context, record: &RolloutRecord) -> u8 {
        let identity = context.identity();
        self.bucketer.bucket(&record.bucket_key(&identity))
    }

    pub fn calculate_rollout<'r>(
        &self,
        context: &Context,
        records: &'r [RolloutRecord],
    ) -> RolloutResult<&'r RolloutRecord> {
        let Some(last) = records.last() else {
            return Err(RolloutError::EmptyInput);
        };

        for record in records {
            let value = self.normalized_value(context, record);
            trace!(
                version = %record.version,
                prefix = %record.prefix,
                percentage = record.percentage,
                value,
                "bucketed rollout record"
            );
            if record.percentage > 0.0 && f64::from(value) <= record.percentage {
                return Ok(record);
            }
        }

        trace!(version = %last.version, "no record matched, falling back to last");
        Ok(last)
    }

    /// Lists that are empty produce no entry; this never fails.
    pub fn calculate_rollouts_for_domain(
        &self,
        context: &Context,
        domain: &RolloutDomain,
    ) -> BTreeMap<RolloutName, RolloutRecord> {
        let results: BTreeMap<_, _> = domain
            .records
            .iter()
            .filter_map(|(name, records)| {
                self.calculate_rollout(context, records)
                    .ok()
                    .map(|record| (name.clone(), record.clone()))
            })
            .collect();
        debug!(
            lists = domain.records.len(),
            results = results.len(),
            "evaluated rollout domain"
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_record(percentage: f64) -> RolloutRecord {
        RolloutRecord::new("", percentage, "")
    }

    fn test_record(version: &str, percentage: f64) -> RolloutRecord {
        RolloutRecord::new(version, percentage, "package")
    }

    /// Hashes every key to the same value.
    struct ConstHasher(u32);

    impl KeyHasher for ConstHasher {
        fn hash32(&self, _key: &str) -> u32 {
            self.0
        }
    }

    #[test]
    fn deterministic_for_user_id() {
        let record = bare_record(0.0);
        let a1 = normalized_value(&Context::new().with_user_id("a"), &record);
        let a2 = normalized_value(&Context::new().with_user_id("a"), &record);
        let b1 = normalized_value(&Context::new().with_user_id("b"), &record);
        assert_eq!(a1, a2);
        assert_ne!(a1, b1);
        assert_eq!(a1, 63);
        assert_eq!(b1, 88);
    }

    #[test]
    fn deterministic_for_session_id() {
        let record = bare_record(0.0);
        let a1 = normalized_value(&Context::new().with_session_id("a"), &record);
        let a2 = normalized_value(&Context::new().with_session_id("a"), &record);
        let b1 = normalized_value(&Context::new().with_session_id("b"), &record);
        assert_eq!(a1, a2);
        assert_ne!(a1, b1);
    }

    #[test]
    fn deterministic_for_remote_address() {
        let record = bare_record(0.0);
        let a1 = normalized_value(&Context::new().with_remote_address("a"), &record);
        let a2 = normalized_value(&Context::new().with_remote_address("a"), &record);
        let b1 = normalized_value(&Context::new().with_remote_address("b"), &record);
        assert_eq!(a1, a2);
        assert_ne!(a1, b1);
    }

    #[test]
    fn identity_fields_hash_the_same_way() {
        let record = test_record("0.1.1", 0.0);
        let by_user = normalized_value(&Context::new().with_user_id("user-1"), &record);
        let by_session = normalized_value(&Context::new().with_session_id("user-1"), &record);
        assert_eq!(by_user, 93);
        assert_eq!(by_user, by_session);
    }

    #[test]
    fn non_ascii_identity_matches_javascript_buckets() {
        let record = test_record("0.1.1", 0.0);
        assert_eq!(normalized_value(&Context::new().with_user_id("josé"), &record), 91);
        assert_eq!(normalized_value(&Context::new().with_user_id("用户"), &record), 84);
    }

    #[test]
    fn empty_context_is_not_deterministic() {
        let record = bare_record(0.0);
        let values: Vec<u8> = (0..20)
            .map(|_| normalized_value(&Context::new(), &record))
            .collect();
        assert!(values.iter().any(|v| *v != values[0]));
    }

    #[test]
    fn empty_rollouts_fail() {
        assert_eq!(
            calculate_rollout(&Context::new(), &[]),
            Err(RolloutError::EmptyInput)
        );
    }

    #[test]
    fn single_record_always_selected() {
        for percentage in [0.0, 1.0, 100.0] {
            let records = [bare_record(percentage)];
            let selected = calculate_rollout(&Context::new(), &records).unwrap();
            assert_eq!(selected, &records[0]);
        }
    }

    #[test]
    fn first_matching_record_wins() {
        // user-1 buckets to 93 against 0.1.1/package.
        let ctx = Context::new().with_user_id("user-1");
        let records = [test_record("0.1.1", 95.0), test_record("0.1.0", 100.0)];
        let selected = calculate_rollout(&ctx, &records).unwrap();
        assert_eq!(selected.version, "0.1.1");
    }

    #[test]
    fn bucket_above_percentage_skips_record() {
        // user-2 buckets to 96 against 0.1.1/package.
        let ctx = Context::new().with_user_id("user-2");
        let records = [test_record("0.1.1", 95.0), test_record("0.1.0", 100.0)];
        let selected = calculate_rollout(&ctx, &records).unwrap();
        assert_eq!(selected.version, "0.1.0");
    }

    #[test]
    fn bucket_equal_to_percentage_matches() {
        let ctx = Context::new().with_user_id("user-1");
        let records = [test_record("0.1.1", 93.0), test_record("0.1.0", 0.0)];
        let selected = calculate_rollout(&ctx, &records).unwrap();
        assert_eq!(selected.version, "0.1.1");
    }

    #[test]
    fn zero_percentage_never_matches_before_fallback() {
        // Bucket 1 would match any positive percentage.
        let evaluator = RolloutEvaluator::new(ConstHasher(0));
        let ctx = Context::new().with_user_id("u");
        let records = [test_record("2.0.0", 0.0), test_record("1.0.0", 1.0)];
        let selected = evaluator.calculate_rollout(&ctx, &records).unwrap();
        assert_eq!(selected.version, "1.0.0");
    }

    #[test]
    fn falls_back_to_last_when_nothing_matches() {
        let evaluator = RolloutEvaluator::new(ConstHasher(99));
        let ctx = Context::new().with_user_id("u");
        let records = [
            test_record("3.0.0", 50.0),
            test_record("2.0.0", 99.0),
            test_record("1.0.0", 0.0),
        ];
        let selected = evaluator.calculate_rollout(&ctx, &records).unwrap();
        assert_eq!(selected.version, "1.0.0");
    }

    #[test]
    fn all_zero_falls_back_to_last() {
        let records = [test_record("2.0.0", 0.0), test_record("1.0.0", 0.0)];
        for i in 0..50 {
            let ctx = Context::new().with_user_id(format!("user-{i}"));
            let selected = calculate_rollout(&ctx, &records).unwrap();
            assert_eq!(selected.version, "1.0.0");
        }
    }

    #[test]
    fn fractional_percentage_compares_as_number() {
        let evaluator = RolloutEvaluator::new(ConstHasher(9)); // bucket 10
        let ctx = Context::new().with_user_id("u");
        let below = [test_record("1.0.0", 9.5), test_record("0.9.0", 0.0)];
        assert_eq!(
            evaluator.calculate_rollout(&ctx, &below).unwrap().version,
            "0.9.0"
        );
        let above = [test_record("1.0.0", 10.5), test_record("0.9.0", 0.0)];
        assert_eq!(
            evaluator.calculate_rollout(&ctx, &above).unwrap().version,
            "1.0.0"
        );
    }

    #[test]
    fn half_rollout_splits_users() {
        let records = [test_record("2.0.0", 50.0), test_record("1.0.0", 0.0)];
        let on_new = (0..1000)
            .filter(|i| {
                let ctx = Context::new().with_user_id(format!("user-{i}"));
                calculate_rollout(&ctx, &records).unwrap().version == "2.0.0"
            })
            .count();
        assert!((400..=600).contains(&on_new), "got {on_new}");
    }

    #[test]
    fn domain_without_records_is_empty() {
        let domain = RolloutDomain::new();
        assert!(calculate_rollouts_for_domain(&Context::new(), &domain).is_empty());
    }

    #[test]
    fn domain_skips_empty_lists() {
        let mut domain = RolloutDomain::new();
        domain.list_mut("_site");
        domain.list_mut("@a/a").push(test_record("3.1.2", 100.0));

        let results = calculate_rollouts_for_domain(&Context::new(), &domain);
        assert_eq!(results.len(), 1);
        assert!(!results.contains_key("_site"));
        assert_eq!(results["@a/a"].version, "3.1.2");
    }

    #[test]
    fn domain_evaluates_every_list() {
        let mut domain = RolloutDomain::new();
        domain
            .list_mut("_site")
            .extend([test_record("0.1.2", 100.0), test_record("0.1.1", 10.0)]);
        domain.list_mut("@a/a").push(test_record("3.1.2", 0.0));

        let results = calculate_rollouts_for_domain(&Context::new(), &domain);
        assert_eq!(results.len(), 2);
        assert_eq!(results["_site"].version, "0.1.2");
        assert_eq!(results["@a/a"].version, "3.1.2");
    }
}
