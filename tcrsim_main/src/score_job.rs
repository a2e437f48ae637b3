// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// One scoring job: a peptide and a plan.  Jobs share nothing mutable and may run in any order.

use crate::plans::ScoringPlan;
use tcrsim_args::pools::build_pools;
use tcrsim_args::read_emb::EmbeddingStore;
use tcrsim_core::defs::{ScoreControl, SequenceRecord};
use tcrsim_core::joint::{score_queries, CompositeScoreRecord, JointSelector};
use tcrsim_core::observer::ScoreObserver;

#[derive(Clone, Debug)]
pub struct JobResult {
    pub peptide: String,
    pub plan: String,
    pub regions: Vec<String>,
    pub records: Vec<CompositeScoreRecord>,
}

pub fn job_label(peptide: &str, plan: &str) -> String {
    format!("{}/{}", peptide, plan)
}

pub fn run_job(
    peptide: &str,
    records: &[&SequenceRecord],
    plan: &ScoringPlan,
    ctl: &ScoreControl,
    store: &EmbeddingStore,
    observer: &dyn ScoreObserver,
) -> Result<JobResult, String> {
    let job = job_label(peptide, &plan.name);
    let rp = build_pools(
        records,
        &plan.regions,
        plan.reduction,
        store,
        ctl.input_opt.token_offset,
        &job,
        observer,
    )?;
    let selector = JointSelector::new(&rp.pools, plan.weights.clone(), ctl.alg_opt.partition_mode)
        .map_err(|e| format!("{}: {}", job, e))?;
    let scored = score_queries(&selector, &rp.queries, &job, observer)
        .map_err(|e| format!("{}: {}", job, e))?;
    Ok(JobResult {
        peptide: peptide.to_string(),
        plan: plan.name.clone(),
        regions: rp.regions,
        records: scored,
    })
}
