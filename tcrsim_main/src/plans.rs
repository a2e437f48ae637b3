// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Scoring plans and AUC configurations.
//
// A plan is a list of regions scored jointly, with one weight per region and a reduction.
// A configuration picks one column of a plan's score table for the AUC summary.

use tcrsim_core::defs::{parent_source, AlgOpt, Reduction, CDR_REGIONS};
use tcrsim_core::joint::{default_weights, ScoreColumn};

#[derive(Clone, Debug, PartialEq)]
pub struct ScoringPlan {
    pub name: String,
    pub regions: Vec<String>,
    pub weights: Vec<f64>,
    pub reduction: Reduction,
}

impl ScoringPlan {
    fn new(name: &str, regions: &[&str], reduction: Reduction, cdr3_weight: f64) -> ScoringPlan {
        let regions = regions.iter().map(|r| r.to_string()).collect::<Vec<String>>();
        ScoringPlan {
            name: name.to_string(),
            weights: default_weights(&regions, cdr3_weight),
            regions,
            reduction,
        }
    }

    // Parent sources whose embeddings the plan needs.

    pub fn sources(&self) -> Vec<&'static str> {
        let mut s = Vec::new();
        for r in self.regions.iter() {
            if let Some(p) = parent_source(r) {
                if !s.contains(&p) {
                    s.push(p);
                }
            }
        }
        s
    }
}

pub fn standard_plans(alg: &AlgOpt) -> Vec<ScoringPlan> {
    let (red, w) = (alg.reduction, alg.cdr3_weight);
    vec![
        ScoringPlan::new("CDR3a", &["CDR3a"], red, w),
        ScoringPlan::new("CDR3b", &["CDR3b"], red, w),
        ScoringPlan::new("CDR3", &["CDR3a", "CDR3b"], Reduction::Sum, w),
        ScoringPlan::new("CDR3_mean", &["CDR3a", "CDR3b"], Reduction::Mean, w),
        ScoringPlan::new("all_CDR", &CDR_REGIONS, red, w),
        ScoringPlan::new("TCRa", &["TCRa"], red, w),
        ScoringPlan::new("TCRb", &["TCRb"], red, w),
        ScoringPlan::new("full", &["tcr_full"], red, w),
    ]
}

// The standard plans, restricted to the requested names if any were given.

pub fn select_plans(alg: &AlgOpt) -> Result<Vec<ScoringPlan>, String> {
    let all = standard_plans(alg);
    if alg.plans.is_empty() {
        return Ok(all);
    }
    for p in alg.plans.iter() {
        if !all.iter().any(|x| &x.name == p) {
            return Err(format!(
                "\nUnknown scoring plan {}.  The plans are {}.\n",
                p,
                all.iter().map(|x| x.name.as_str()).collect::<Vec<_>>().join(", ")
            ));
        }
    }
    Ok(all
        .into_iter()
        .filter(|x| alg.plans.contains(&x.name))
        .collect())
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[derive(Clone, Debug, PartialEq)]
pub struct AucConfig {
    pub name: String,
    pub plan: String,
    pub column: ScoreColumn,
}

fn config(name: &str, plan: &str, column: ScoreColumn) -> AucConfig {
    AucConfig {
        name: name.to_string(),
        plan: plan.to_string(),
        column,
    }
}

pub fn standard_configs() -> Vec<AucConfig> {
    let mut c = vec![
        config("Individual_CDR3a", "CDR3a", ScoreColumn::Weighted),
        config("Individual_CDR3b", "CDR3b", ScoreColumn::Weighted),
        config("Combined_CDR3", "CDR3", ScoreColumn::Weighted),
        config("Combined_CDR3_Mean", "CDR3_mean", ScoreColumn::Weighted),
        config("All_CDR_Weighted", "all_CDR", ScoreColumn::Weighted),
        config("All_CDR_Unweighted", "all_CDR", ScoreColumn::Unweighted),
    ];
    for (i, r) in CDR_REGIONS.iter().enumerate() {
        c.push(config(
            &format!("From_All_{}", r),
            "all_CDR",
            ScoreColumn::Region(i),
        ));
    }
    c.push(config("TCRa", "TCRa", ScoreColumn::Weighted));
    c.push(config("TCRb", "TCRb", ScoreColumn::Weighted));
    c.push(config("Full", "full", ScoreColumn::Weighted));
    c
}

// Configuration names used by baseline score files, and the configurations they correspond
// to.  Other baseline names are kept as they are.

const BASELINE_NAMES: [(&str, &str); 5] = [
    ("weighted", "All_CDR_Weighted"),
    ("unweighted", "All_CDR_Unweighted"),
    ("CDR3", "Combined_CDR3"),
    ("CDR3_A", "Individual_CDR3a"),
    ("CDR3_B", "Individual_CDR3b"),
];

pub fn baseline_configuration(name: &str) -> String {
    match BASELINE_NAMES.iter().find(|x| x.0 == name) {
        Some(x) => x.1.to_string(),
        None => name.to_string(),
    }
}
