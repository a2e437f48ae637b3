// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Reference pools and the single-region nearest neighbor search.
//
// A query is only ever compared with a reference row that (a) is not the query itself and
// (b) lies in the query's partition, unless partitions are ignored.  Rows are held in
// ascending identity order and the scan keeps the first strict maximum, so when two rows tie
// the one with the lower identity is reported.

use crate::cosine::norm;
use crate::defs::{Identity, PartitionMode};
use crate::errors::ScoreError;
use crate::joint::{JointOutcome, JointSelector};
use crate::observer::ScoreObserver;
use ndarray::{Array1, ArrayView1};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryKey {
    pub identity: Identity,
    pub partition: i64,
}

#[derive(Clone, Debug)]
pub struct ReferencePool {
    region: String,
    identities: Vec<Identity>,
    partitions: Vec<i64>,
    vectors: Vec<Array1<f64>>,
    norms: Vec<f64>,
    dim: usize,
}

impl ReferencePool {
    // Build a pool from (identity, partition, vector) rows.  All vectors must have the same
    // length.

    pub fn new(
        region: &str,
        mut rows: Vec<(Identity, i64, Array1<f64>)>,
    ) -> Result<ReferencePool, ScoreError> {
        rows.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        let dim = rows.first().map_or(0, |r| r.2.len());
        let mut pool = ReferencePool {
            region: region.to_string(),
            identities: Vec::with_capacity(rows.len()),
            partitions: Vec::with_capacity(rows.len()),
            vectors: Vec::with_capacity(rows.len()),
            norms: Vec::with_capacity(rows.len()),
            dim,
        };
        for (identity, partition, v) in rows {
            if v.len() != dim {
                return Err(ScoreError::DimensionMismatch {
                    left: dim,
                    right: v.len(),
                });
            }
            pool.norms.push(norm(v.view()));
            pool.identities.push(identity);
            pool.partitions.push(partition);
            pool.vectors.push(v);
        }
        Ok(pool)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn identity(&self, j: usize) -> Identity {
        self.identities[j]
    }

    pub fn partition(&self, j: usize) -> i64 {
        self.partitions[j]
    }

    pub fn vector(&self, j: usize) -> ArrayView1<f64> {
        self.vectors[j].view()
    }

    pub fn norm(&self, j: usize) -> f64 {
        self.norms[j]
    }

    pub fn eligible(&self, j: usize, key: &QueryKey, mode: PartitionMode) -> bool {
        if self.identities[j] == key.identity {
            return false;
        }
        mode == PartitionMode::Ignore || self.partitions[j] == key.partition
    }
}

// Result of a single-region search.

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Match {
    Matched { similarity: f64, reference: Identity },
    NoEligibleReference,
    Invalid,
}

// Best similarity of one query vector against one pool.  This is the one-region case of the
// joint selector.

pub fn best_match(
    query: &Array1<f64>,
    key: &QueryKey,
    pool: &ReferencePool,
    mode: PartitionMode,
    job: &str,
    observer: &dyn ScoreObserver,
) -> Result<Match, ScoreError> {
    let selector = JointSelector::unweighted(std::slice::from_ref(pool), mode)?;
    let outcome = selector.select(key, std::slice::from_ref(query), job, observer)?;
    Ok(match outcome {
        JointOutcome::Matched(m) => Match::Matched {
            similarity: m.similarities[0],
            reference: m.reference,
        },
        JointOutcome::NoEligibleReference => Match::NoEligibleReference,
        JointOutcome::Invalid => Match::Invalid,
    })
}
