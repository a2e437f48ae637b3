// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

use perf_stats::elapsed;
use std::collections::HashMap;
use std::time::Instant;

// Stable key of a sequence record across every derived file ("raw index").

pub type Identity = u64;

// The six CDR loops, in the order used for all-CDR scoring.

pub const CDR_REGIONS: [&str; 6] = ["CDR1a", "CDR1b", "CDR2a", "CDR2b", "CDR3a", "CDR3b"];

// Parent sequences that embeddings are computed for.

pub const PARENT_SOURCES: [&str; 3] = ["TCRa", "TCRb", "tcr_full"];

// Map a region name to the parent sequence column it is located in.  Whole chains are their
// own parent.

pub fn parent_source(region: &str) -> Option<&'static str> {
    match region {
        "CDR1a" | "CDR2a" | "CDR3a" | "TCRa" => Some("TCRa"),
        "CDR1b" | "CDR2b" | "CDR3b" | "TCRb" => Some("TCRb"),
        "tcr_full" => Some("tcr_full"),
        _ => None,
    }
}

pub fn is_cdr3(region: &str) -> bool {
    region.starts_with("CDR3")
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// One row of the master sequence table.  Sequences are keyed by column name (TCRa, CDR3b, ...);
// absent or empty columns are simply not present in the map.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SequenceRecord {
    pub identity: Identity,
    pub peptide: String,
    pub partition: i64,
    pub binder: bool,
    pub seqs: HashMap<String, String>,
}

impl SequenceRecord {
    pub fn seq(&self, column: &str) -> Option<&str> {
        self.seqs.get(column).map(|s| s.as_str())
    }
}

// How a per-residue embedding matrix is collapsed to one vector.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Reduction {
    #[default]
    Sum,
    Mean,
}

impl Reduction {
    pub fn name(&self) -> &'static str {
        match self {
            Reduction::Sum => "sum",
            Reduction::Mean => "mean",
        }
    }

    pub fn from_name(s: &str) -> Option<Reduction> {
        match s {
            "sum" => Some(Reduction::Sum),
            "mean" => Some(Reduction::Mean),
            _ => None,
        }
    }
}

// Which reference rows a query may be compared with.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionMode {
    #[default]
    SamePartition,
    Ignore,
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Input options.

#[derive(Default, PartialEq)]
pub struct InputOpt {
    pub table: String,                     // master sequence table
    pub embeddings: Vec<(String, String)>, // (parent source, embedding file)
    pub peptides: Vec<String>,             // peptide contexts to score, empty = all
    pub token_offset: usize,               // leading special tokens per parent embedding
    pub model: String,                     // name of the embedding model in the outputs
    pub baseline: String,                  // baseline score directory, empty = none
    pub baseline_model: String,            // name of the baseline model in the outputs
}

// Algorithmic options.

#[derive(Default, PartialEq)]
pub struct AlgOpt {
    pub reduction: Reduction,          // default reduction for plans that don't pin one
    pub partition_mode: PartitionMode, // same-partition constraint on or off
    pub cdr3_weight: f64,              // weight of CDR3-type regions in weighted plans
    pub max_fpr: f64,                  // upper false positive rate for partial AUC
    pub plans: Vec<String>,            // scoring plans to run, empty = all
}

// Output options.

#[derive(Default, PartialEq)]
pub struct OutputOpt {
    pub out_dir: String, // directory receiving all output files
    pub svg: bool,       // also draw the AUC bar charts
    pub compare: String, // configuration charted when comparing models
}

// Computational performance options.

#[derive(Default, PartialEq)]
pub struct PerfOpt {
    pub comp: bool,             // print time used per stage
    pub threads: Option<usize>, // worker pool size
}

// Set up control datastructure (ScoreControl).  This is stuff that is constant for a given
// run of tcrsim.

#[derive(Default)]
pub struct ScoreControl {
    pub start_time: Option<Instant>, // tcrsim start time
    pub input_opt: InputOpt,         // input options
    pub alg_opt: AlgOpt,             // algorithmic options
    pub output_opt: OutputOpt,       // output options
    pub perf_opt: PerfOpt,           // computational performance options
}

impl ScoreControl {
    pub fn perf_stats(&self, t: &Instant, msg: &str) {
        if self.perf_opt.comp {
            let used = format!("{:.2}", elapsed(t));
            if used != "0.00" {
                println!("used {} seconds {}", used, msg);
            }
        }
    }
}
