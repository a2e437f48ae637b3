// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// AUC summary: one entry per (model, peptide, configuration), plus the mean over peptides of
// each (model, configuration) under the peptide label AVERAGED.  The model is the embedding
// model scored here, or a baseline model whose scores were read from files.

use io_utils::fwriteln;
use itertools::Itertools;
use std::fs::write;
use std::io::Write;
use string_utils::strme;
use tcrsim_core::errors::ScoreError;
use tcrsim_core::joint::{CompositeScoreRecord, ScoreColumn};
use tcrsim_core::roc::roc_curve;

pub const AVERAGED: &str = "AVERAGED";

#[derive(Clone, Debug, PartialEq)]
pub struct AucEntry {
    pub model: String,
    pub peptide: String,
    pub configuration: String,
    pub auc: f64,
    pub auc_partial: f64,
    pub n: usize, // scored queries, or peptides for an average
}

// AUC and partial AUC of labeled scores.

pub fn auc_entry(
    model: &str,
    peptide: &str,
    configuration: &str,
    labels: &[bool],
    scores: &[f64],
    max_fpr: f64,
) -> Result<AucEntry, ScoreError> {
    let curve = roc_curve(labels, scores)?;
    Ok(AucEntry {
        model: model.to_string(),
        peptide: peptide.to_string(),
        configuration: configuration.to_string(),
        auc: curve.auc(),
        auc_partial: curve.partial_auc(max_fpr)?,
        n: labels.len(),
    })
}

// AUC and partial AUC of one score column, using the matched queries only.

pub fn score_configuration(
    model: &str,
    peptide: &str,
    configuration: &str,
    records: &[CompositeScoreRecord],
    column: ScoreColumn,
    max_fpr: f64,
) -> Result<AucEntry, ScoreError> {
    let (mut labels, mut scores) = (Vec::new(), Vec::new());
    for rec in records.iter() {
        if let Some(x) = rec.value(column) {
            labels.push(rec.binder);
            scores.push(x);
        }
    }
    auc_entry(model, peptide, configuration, &labels, &scores, max_fpr)
}

// Append one AVERAGED entry per (model, configuration), in order of first appearance.
// Configurations missing for some peptide are averaged over the peptides that have them.

pub fn append_averages(entries: &mut Vec<AucEntry>) {
    let keys = entries
        .iter()
        .filter(|e| e.peptide != AVERAGED)
        .map(|e| (e.model.clone(), e.configuration.clone()))
        .unique()
        .collect::<Vec<(String, String)>>();
    for (model, c) in keys {
        let x = entries
            .iter()
            .filter(|e| e.peptide != AVERAGED && e.model == model && e.configuration == c)
            .map(|e| (e.auc, e.auc_partial))
            .collect::<Vec<_>>();
        let n = x.len();
        let auc = x.iter().map(|v| v.0).sum::<f64>() / n as f64;
        let auc_partial = x.iter().map(|v| v.1).sum::<f64>() / n as f64;
        entries.push(AucEntry {
            model,
            peptide: AVERAGED.to_string(),
            configuration: c,
            auc,
            auc_partial,
            n,
        });
    }
}

pub fn format_auc_table(entries: &[AucEntry]) -> String {
    let mut log = Vec::<u8>::new();
    fwriteln!(log, "model,peptide,configuration,auc,auc_partial,n");
    for e in entries.iter() {
        fwriteln!(
            log,
            "{},{},{},{:.6},{:.6},{}",
            e.model,
            e.peptide,
            e.configuration,
            e.auc,
            e.auc_partial,
            e.n
        );
    }
    strme(&log).to_string()
}

pub fn write_auc_table(path: &str, entries: &[AucEntry]) -> Result<(), String> {
    write(path, format_auc_table(entries))
        .map_err(|e| format!("\nCould not write\n{}\n{}\n", path, e))
}
