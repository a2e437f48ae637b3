// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.
//
// Observer passed into every scoring job.  Jobs run on a worker pool, so observers must be Sync,
// and they never influence the scores.  Every event carries the job label (peptide/plan).

use crate::defs::Identity;
use crate::errors::ScoreError;
use crate::joint::JointOutcome;
use log::{debug, info, warn};

pub trait ScoreObserver: Sync {
    fn job_started(&self, _job: &str, _queries: usize, _references: usize) {}

    // A record could not be turned into query vectors (region missing, empty slice, ...).
    fn record_skipped(&self, _job: &str, _identity: Identity, _cause: &str) {}

    // One pairwise comparison was dropped, e.g. a zero-norm reference vector.
    fn comparison_skipped(
        &self,
        _job: &str,
        _query: Identity,
        _reference: Identity,
        _err: &ScoreError,
    ) {
    }

    fn query_scored(&self, _job: &str, _query: Identity, _outcome: &JointOutcome) {}

    fn job_finished(&self, _job: &str, _matched: usize, _unmatched: usize) {}
}

// Observer that ignores everything.

pub struct NullObserver;

impl ScoreObserver for NullObserver {}

// Observer that forwards to the log facade.

pub struct LogObserver;

impl ScoreObserver for LogObserver {
    fn job_started(&self, job: &str, queries: usize, references: usize) {
        info!("{job}: scoring {queries} queries against {references} references");
    }

    fn record_skipped(&self, job: &str, identity: Identity, cause: &str) {
        warn!("{job}: record {identity} skipped: {cause}");
    }

    fn comparison_skipped(
        &self,
        job: &str,
        query: Identity,
        reference: Identity,
        err: &ScoreError,
    ) {
        debug!("{job}: comparison {query} versus {reference} skipped: {err}");
    }

    fn query_scored(&self, job: &str, query: Identity, outcome: &JointOutcome) {
        match outcome {
            JointOutcome::Matched(m) => {
                debug!(
                    "{job}: query {query} best match {} composite {:.6}",
                    m.reference, m.composite
                );
            }
            JointOutcome::NoEligibleReference => {
                warn!("{job}: query {query} has no eligible reference");
            }
            JointOutcome::Invalid => {
                warn!("{job}: query {query} could not be compared with any reference");
            }
        }
    }

    fn job_finished(&self, job: &str, matched: usize, unmatched: usize) {
        info!("{job}: done, {matched} matched, {unmatched} without a match");
    }
}
