// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Joint selection across several regions.
//
// For K regions the pools are row-aligned: row j of every pool belongs to the same reference
// record.  For each eligible row j the per-region similarities s_1(j), ..., s_K(j) are computed
// and combined as c(j) = sum_k w_k s_k(j).  One row j* maximizing c is chosen and every
// reported per-region similarity is s_k(j*).  The per-region values are therefore never the
// independent maxima of each region; a row that is mediocre in every region can beat rows that
// are excellent in only one.

use crate::cosine::{cosine_with_norms, norm};
use crate::defs::{is_cdr3, Identity, PartitionMode};
use crate::errors::ScoreError;
use crate::nearest::{QueryKey, ReferencePool};
use crate::observer::ScoreObserver;
use ndarray::Array1;

#[derive(Clone, Debug, PartialEq)]
pub struct JointMatch {
    pub row: usize,              // row of the pools
    pub reference: Identity,     // identity of the reference at that row
    pub composite: f64,          // weighted sum at that row
    pub unweighted: f64,         // plain sum at the same row
    pub similarities: Vec<f64>,  // per-region similarities at that row
}

#[derive(Clone, Debug, PartialEq)]
pub enum JointOutcome {
    Matched(JointMatch),
    NoEligibleReference,
    Invalid,
}

impl JointOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, JointOutcome::Matched(_))
    }

    pub fn status(&self) -> &'static str {
        match self {
            JointOutcome::Matched(_) => "matched",
            JointOutcome::NoEligibleReference => "no_eligible_reference",
            JointOutcome::Invalid => "invalid",
        }
    }
}

// Weights for a list of regions.  Small plans are unweighted; larger ones weight the CDR3
// regions by cdr3_weight.

pub fn default_weights(regions: &[String], cdr3_weight: f64) -> Vec<f64> {
    if regions.len() <= 2 {
        return vec![1.0; regions.len()];
    }
    regions
        .iter()
        .map(|r| if is_cdr3(r) { cdr3_weight } else { 1.0 })
        .collect()
}

// Check that every pool lists the same (identity, partition) sequence as the first.

pub fn check_alignment(pools: &[ReferencePool]) -> Result<(), ScoreError> {
    let Some(first) = pools.first() else {
        return Err(ScoreError::NoRegions);
    };
    for pool in &pools[1..] {
        let n = first.len().max(pool.len());
        for j in 0..n {
            let expected = (j < first.len()).then(|| (first.identity(j), first.partition(j)));
            let found = (j < pool.len()).then(|| (pool.identity(j), pool.partition(j)));
            if expected != found {
                return Err(ScoreError::MisalignedPool {
                    region: pool.region().to_string(),
                    row: j,
                    expected: expected.map(|x| x.0),
                    found: found.map(|x| x.0),
                });
            }
        }
    }
    Ok(())
}

pub struct JointSelector<'a> {
    pools: &'a [ReferencePool],
    weights: Vec<f64>,
    mode: PartitionMode,
}

impl<'a> JointSelector<'a> {
    pub fn new(
        pools: &'a [ReferencePool],
        weights: Vec<f64>,
        mode: PartitionMode,
    ) -> Result<JointSelector<'a>, ScoreError> {
        if pools.is_empty() {
            return Err(ScoreError::NoRegions);
        }
        if weights.len() != pools.len() {
            return Err(ScoreError::WeightCount {
                regions: pools.len(),
                weights: weights.len(),
            });
        }
        check_alignment(pools)?;
        Ok(JointSelector {
            pools,
            weights,
            mode,
        })
    }

    pub fn unweighted(
        pools: &'a [ReferencePool],
        mode: PartitionMode,
    ) -> Result<JointSelector<'a>, ScoreError> {
        JointSelector::new(pools, vec![1.0; pools.len()], mode)
    }

    pub fn regions(&self) -> usize {
        self.pools.len()
    }

    pub fn references(&self) -> usize {
        self.pools[0].len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    // Find the row maximizing the weighted sum for one query.  The query supplies one vector
    // per region, in pool order.

    pub fn select(
        &self,
        key: &QueryKey,
        query: &[Array1<f64>],
        job: &str,
        observer: &dyn ScoreObserver,
    ) -> Result<JointOutcome, ScoreError> {
        let k = self.pools.len();
        if query.len() != k {
            return Err(ScoreError::RegionCount {
                expected: k,
                found: query.len(),
            });
        }
        for (q, pool) in query.iter().zip(self.pools.iter()) {
            if !pool.is_empty() && q.len() != pool.dim() {
                return Err(ScoreError::DimensionMismatch {
                    left: q.len(),
                    right: pool.dim(),
                });
            }
        }
        let first = &self.pools[0];
        let eligible = (0..first.len())
            .filter(|&j| first.eligible(j, key, self.mode))
            .collect::<Vec<usize>>();
        if eligible.is_empty() {
            return Ok(JointOutcome::NoEligibleReference);
        }
        let qnorms = query.iter().map(|q| norm(q.view())).collect::<Vec<f64>>();
        if qnorms.iter().any(|&n| n == 0.0) {
            return Ok(JointOutcome::Invalid);
        }
        let mut best: Option<JointMatch> = None;
        let mut sims = vec![0.0; k];
        'rows: for j in eligible {
            for m in 0..k {
                let pool = &self.pools[m];
                match cosine_with_norms(query[m].view(), qnorms[m], pool.vector(j), pool.norm(j)) {
                    Ok(s) => sims[m] = s,
                    Err(e) => {
                        observer.comparison_skipped(job, key.identity, pool.identity(j), &e);
                        continue 'rows;
                    }
                }
            }
            let composite = sims
                .iter()
                .zip(self.weights.iter())
                .map(|(s, w)| s * w)
                .sum::<f64>();
            if composite.is_nan() {
                continue;
            }
            if best.as_ref().map_or(true, |b| composite > b.composite) {
                best = Some(JointMatch {
                    row: j,
                    reference: first.identity(j),
                    composite,
                    unweighted: sims.iter().sum(),
                    similarities: sims.clone(),
                });
            }
        }
        Ok(match best {
            Some(m) => JointOutcome::Matched(m),
            None => JointOutcome::Invalid,
        })
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Scored queries.

#[derive(Clone, Debug)]
pub struct Query {
    pub key: QueryKey,
    pub binder: bool,
    pub vectors: Vec<Array1<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompositeScoreRecord {
    pub identity: Identity,
    pub partition: i64,
    pub binder: bool,
    pub outcome: JointOutcome,
}

// A column of a score table that can be fed to the AUC computation.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreColumn {
    Weighted,
    Unweighted,
    Region(usize),
}

impl CompositeScoreRecord {
    pub fn value(&self, column: ScoreColumn) -> Option<f64> {
        match &self.outcome {
            JointOutcome::Matched(m) => match column {
                ScoreColumn::Weighted => Some(m.composite),
                ScoreColumn::Unweighted => Some(m.unweighted),
                ScoreColumn::Region(i) => m.similarities.get(i).copied(),
            },
            _ => None,
        }
    }

    pub fn match_identity(&self) -> Option<Identity> {
        match &self.outcome {
            JointOutcome::Matched(m) => Some(m.reference),
            _ => None,
        }
    }
}

// Score every query, in the given order.

pub fn score_queries(
    selector: &JointSelector,
    queries: &[Query],
    job: &str,
    observer: &dyn ScoreObserver,
) -> Result<Vec<CompositeScoreRecord>, ScoreError> {
    observer.job_started(job, queries.len(), selector.references());
    let mut records = Vec::with_capacity(queries.len());
    for q in queries {
        let outcome = selector.select(&q.key, &q.vectors, job, observer)?;
        observer.query_scored(job, q.key.identity, &outcome);
        records.push(CompositeScoreRecord {
            identity: q.key.identity,
            partition: q.key.partition,
            binder: q.binder,
            outcome,
        });
    }
    let matched = records.iter().filter(|r| r.outcome.is_matched()).count();
    observer.job_finished(job, matched, records.len() - matched);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::NullObserver;
    use ndarray::array;
    use pretty_trace::PrettyTrace;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(identity: Identity) -> QueryKey {
        QueryKey {
            identity,
            partition: 0,
        }
    }

    // Region A alone prefers row 0, region B alone prefers row 1, but the sum is largest at
    // row 2.

    fn two_region_pools() -> Vec<ReferencePool> {
        let h = 0.5f64.sqrt();
        let a = ReferencePool::new(
            "CDR3a",
            vec![
                (1, 0, array![1.0, 0.0]),
                (2, 0, array![-1.0, 0.0]),
                (3, 0, array![h, h]),
            ],
        )
        .unwrap();
        let b = ReferencePool::new(
            "CDR3b",
            vec![
                (1, 0, array![-1.0, 0.0]),
                (2, 0, array![1.0, 0.0]),
                (3, 0, array![h, h]),
            ],
        )
        .unwrap();
        vec![a, b]
    }

    #[test]
    fn test_joint_argmax_is_shared() {
        PrettyTrace::new().on();
        let pools = two_region_pools();
        let sel = JointSelector::unweighted(&pools, PartitionMode::SamePartition).unwrap();
        let q = vec![array![1.0, 0.0], array![1.0, 0.0]];
        let out = sel.select(&key(10), &q, "test", &NullObserver).unwrap();
        let m = match out {
            JointOutcome::Matched(m) => m,
            _ => panic!("expected a match"),
        };
        assert_eq!(m.row, 2);
        assert_eq!(m.reference, 3);
        let h = 0.5f64.sqrt();
        assert!((m.similarities[0] - h).abs() < 1e-12);
        assert!((m.similarities[1] - h).abs() < 1e-12);
        assert!((m.composite - 2.0 * h).abs() < 1e-12);

        // The sum of the independent maxima would be 2, which the joint value never reaches.

        assert!(m.composite < 2.0);
    }

    #[test]
    fn test_weights_change_the_choice() {
        PrettyTrace::new().on();
        let pools = two_region_pools();
        let q = vec![array![1.0, 0.0], array![1.0, 0.0]];

        // With B weighted by 4, row 2 still wins (5 * 0.707 versus 4 - 1 at row 1).  At weight 8
        // row 1 wins (8 - 1 versus 9 * 0.707).

        let sel = JointSelector::new(&pools, vec![1.0, 4.0], PartitionMode::SamePartition)
            .unwrap();
        let out = sel.select(&key(10), &q, "test", &NullObserver).unwrap();
        match out {
            JointOutcome::Matched(m) => {
                assert_eq!(m.row, 2);
                assert!((m.composite - 5.0 * 0.5f64.sqrt()).abs() < 1e-12);
                assert!((m.unweighted - 2.0 * 0.5f64.sqrt()).abs() < 1e-12);
            }
            _ => panic!("expected a match"),
        }
        let sel = JointSelector::new(&pools, vec![1.0, 8.0], PartitionMode::SamePartition)
            .unwrap();
        let out = sel.select(&key(10), &q, "test", &NullObserver).unwrap();
        match out {
            JointOutcome::Matched(m) => {
                assert_eq!(m.row, 1);
                assert_eq!(m.reference, 2);
                assert!((m.composite - 7.0).abs() < 1e-12);

                // The unweighted sum is reported at the weighted choice.

                assert!(m.unweighted.abs() < 1e-12);
                assert_eq!(m.similarities, vec![-1.0, 1.0]);
            }
            _ => panic!("expected a match"),
        }
    }

    #[test]
    fn test_misaligned_pools() {
        PrettyTrace::new().on();
        let a = ReferencePool::new("CDR3a", vec![(1, 0, array![1.0]), (2, 0, array![1.0])])
            .unwrap();
        let b = ReferencePool::new("CDR3b", vec![(1, 0, array![1.0]), (4, 0, array![1.0])])
            .unwrap();
        let c = ReferencePool::new("CDR1a", vec![(1, 0, array![1.0])]).unwrap();
        let pools = vec![a.clone(), b];
        assert_eq!(
            JointSelector::unweighted(&pools, PartitionMode::SamePartition).err(),
            Some(ScoreError::MisalignedPool {
                region: "CDR3b".to_string(),
                row: 1,
                expected: Some(2),
                found: Some(4),
            })
        );
        let pools = vec![a, c];
        assert_eq!(
            check_alignment(&pools),
            Err(ScoreError::MisalignedPool {
                region: "CDR1a".to_string(),
                row: 1,
                expected: Some(2),
                found: None,
            })
        );
    }

    #[test]
    fn test_selector_errors() {
        PrettyTrace::new().on();
        let pools = two_region_pools();
        assert_eq!(
            JointSelector::new(&[], vec![], PartitionMode::SamePartition).err(),
            Some(ScoreError::NoRegions)
        );
        assert_eq!(
            JointSelector::new(&pools, vec![1.0], PartitionMode::SamePartition).err(),
            Some(ScoreError::WeightCount {
                regions: 2,
                weights: 1
            })
        );
        let sel = JointSelector::unweighted(&pools, PartitionMode::SamePartition).unwrap();
        assert_eq!(
            sel.select(&key(10), &[array![1.0, 0.0]], "test", &NullObserver),
            Err(ScoreError::RegionCount {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_default_weights() {
        PrettyTrace::new().on();
        let two = vec!["CDR3a".to_string(), "CDR3b".to_string()];
        assert_eq!(default_weights(&two, 4.0), vec![1.0, 1.0]);
        let six = ["CDR1a", "CDR1b", "CDR2a", "CDR2b", "CDR3a", "CDR3b"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>();
        assert_eq!(default_weights(&six, 4.0), vec![1.0, 1.0, 1.0, 1.0, 4.0, 4.0]);
    }

    struct Counter {
        skipped: AtomicUsize,
        finished: AtomicUsize,
    }

    impl ScoreObserver for Counter {
        fn comparison_skipped(&self, _: &str, _: Identity, _: Identity, _: &ScoreError) {
            self.skipped.fetch_add(1, Ordering::SeqCst);
        }
        fn job_finished(&self, _: &str, matched: usize, unmatched: usize) {
            self.finished.store(matched * 100 + unmatched, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_score_queries() {
        PrettyTrace::new().on();
        let pool = ReferencePool::new(
            "CDR3b",
            vec![(1, 0, array![1.0, 0.0]), (2, 0, array![0.0, 0.0]), (3, 1, array![0.0, 1.0])],
        )
        .unwrap();
        let pools = vec![pool];
        let sel = JointSelector::unweighted(&pools, PartitionMode::SamePartition).unwrap();
        let queries = vec![
            Query {
                key: QueryKey {
                    identity: 1,
                    partition: 0,
                },
                binder: true,
                vectors: vec![array![1.0, 1.0]],
            },
            Query {
                key: QueryKey {
                    identity: 7,
                    partition: 0,
                },
                binder: false,
                vectors: vec![array![1.0, 1.0]],
            },
            Query {
                key: QueryKey {
                    identity: 3,
                    partition: 1,
                },
                binder: true,
                vectors: vec![array![1.0, 1.0]],
            },
        ];
        let obs = Counter {
            skipped: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        };
        let recs = score_queries(&sel, &queries, "test", &obs).unwrap();
        assert_eq!(recs.len(), 3);

        // Query 1 sees only the zero vector 2.

        assert_eq!(recs[0].outcome, JointOutcome::Invalid);
        assert_eq!(recs[0].value(ScoreColumn::Weighted), None);
        assert_eq!(recs[1].match_identity(), Some(1));
        assert!((recs[1].value(ScoreColumn::Region(0)).unwrap() - 0.5f64.sqrt()).abs() < 1e-12);
        assert_eq!(recs[2].outcome, JointOutcome::NoEligibleReference);
        assert_eq!(recs[2].outcome.status(), "no_eligible_reference");
        assert_eq!(obs.skipped.load(Ordering::SeqCst), 2);
        assert_eq!(obs.finished.load(Ordering::SeqCst), 102);
    }
}
