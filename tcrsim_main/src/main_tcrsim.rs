// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Driver.  Parse arguments, load the sequence table and embeddings, run every (peptide, plan)
// job on a worker pool, then write the score tables, the AUC summary and optional charts.
// A failed job, an unreadable embedding file or an unreadable baseline file is reported and
// skipped; it does not stop its siblings.

use crate::plans::{baseline_configuration, select_plans, standard_configs};
use crate::score_job::{job_label, run_job, JobResult};
use io_utils::fwriteln;
use log::{error, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::fs::write;
use std::io::Write;
use std::time::Instant;
use string_utils::{add_commas, strme};
use tcrsim_args::proc_args::proc_args;
use tcrsim_args::read_baseline::{baseline_files, read_baseline_scores};
use tcrsim_args::read_emb::EmbeddingStore;
use tcrsim_args::read_table::{peptides, read_table, records_for};
use tcrsim_core::defs::ScoreControl;
use tcrsim_core::observer::LogObserver;
use tcrsim_tail::bar_chart::{
    auc_value, bar_chart, configuration_series, model_series, partial_auc_value,
};
use tcrsim_tail::print_summary::format_summary;
use tcrsim_tail::score_table::write_score_table;
use tcrsim_tail::summary::{
    append_averages, auc_entry, score_configuration, write_auc_table, AucEntry,
};

fn write_text(path: &str, text: &str) -> Result<(), String> {
    write(path, text).map_err(|e| format!("\nCould not write\n{}\n{}\n", path, e))
}

fn one_line(msg: &str) -> String {
    msg.split_whitespace().collect::<Vec<&str>>().join(" ")
}

// AUC values of the baseline model, from its score files.

fn baseline_entries(
    ctl: &ScoreControl,
    peps: &[String],
    failures: &mut Vec<String>,
) -> Vec<AucEntry> {
    let mut entries = Vec::new();
    let files = match baseline_files(&ctl.input_opt.baseline, peps) {
        Ok(f) => f,
        Err(e) => {
            warn!("{}", one_line(&e));
            failures.push(format!("{}: {}", ctl.input_opt.baseline_model, one_line(&e)));
            return entries;
        }
    };
    let model = &ctl.input_opt.baseline_model;
    for f in files.iter() {
        let config = baseline_configuration(&f.configuration);
        let label = format!("{}/{}/{}", model, f.peptide, config);
        let result = read_baseline_scores(&f.path).and_then(|(labels, scores)| {
            auc_entry(model, &f.peptide, &config, &labels, &scores, ctl.alg_opt.max_fpr)
                .map_err(|e| e.to_string())
        });
        match result {
            Ok(e) => entries.push(e),
            Err(e) => {
                warn!("{}: {}", label, one_line(&e));
                failures.push(format!("{}: {}", label, one_line(&e)));
            }
        }
    }
    info!("read {} baseline AUC values", entries.len());
    entries
}

// Draw an AUC chart and its partial AUC companion.

fn write_charts(
    entries: &[AucEntry],
    series: fn(&AucEntry) -> &str,
    name: &str,
    title: &str,
    ctl: &ScoreControl,
) -> Result<(), String> {
    let out = &ctl.output_opt.out_dir;
    let mut svg = String::new();
    bar_chart(entries, series, auc_value, title, "AUC", &mut svg)?;
    write_text(&format!("{}/{}.svg", out, name), &svg)?;
    let mut svg = String::new();
    let title = format!("{}, partial AUC at FPR <= {}", title, ctl.alg_opt.max_fpr);
    bar_chart(entries, series, partial_auc_value, &title, "partial AUC", &mut svg)?;
    write_text(&format!("{}/{}_partial.svg", out, name), &svg)
}

pub fn main_tcrsim(args: &[String]) -> Result<(), String> {
    let tall = Instant::now();
    let mut ctl = ScoreControl::default();
    proc_args(&mut ctl, args)?;
    let plans = select_plans(&ctl.alg_opt)?;
    if !standard_configs().iter().any(|c| c.name == ctl.output_opt.compare) {
        return Err(format!(
            "\nUnknown configuration {} given by COMPARE.\n",
            ctl.output_opt.compare
        ));
    }

    // Load inputs.

    let t = Instant::now();
    let records = read_table(&ctl.input_opt.table)?;
    info!("read {} sequence records", add_commas(records.len()));
    let (store, mut failures) = EmbeddingStore::load(&ctl.input_opt.embeddings);
    ctl.perf_stats(&t, "loading inputs");
    let all_peptides = peptides(&records);
    let peps = if ctl.input_opt.peptides.is_empty() {
        all_peptides
    } else {
        for p in ctl.input_opt.peptides.iter() {
            if !all_peptides.contains(p) {
                return Err(format!(
                    "\nThe peptide {} does not appear in the sequence table.\n",
                    p
                ));
            }
        }
        ctl.input_opt.peptides.clone()
    };

    // Define jobs.  A plan needing embeddings that were not loaded is skipped outright.

    let mut results = Vec::<(String, usize, Result<JobResult, String>)>::new();
    for p in peps.iter() {
        for (i, plan) in plans.iter().enumerate() {
            if let Some(s) = plan.sources().iter().find(|s| !store.has_source(s)) {
                failures.push(format!(
                    "{}: no {} embeddings were loaded",
                    job_label(p, &plan.name),
                    s
                ));
                continue;
            }
            results.push((p.clone(), i, Err(String::new())));
        }
    }

    // Run jobs.

    let t = Instant::now();
    let observer = LogObserver;
    let run = |results: &mut Vec<(String, usize, Result<JobResult, String>)>| {
        results.par_iter_mut().for_each(|res| {
            let recs = records_for(&records, &res.0);
            res.2 = run_job(&res.0, &recs, &plans[res.1], &ctl, &store, &observer);
        });
    };
    match ctl.perf_opt.threads {
        Some(n) => {
            let pool = ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| format!("\nCould not start {} threads: {}\n", n, e))?;
            pool.install(|| run(&mut results));
        }
        None => run(&mut results),
    }
    ctl.perf_stats(&t, "scoring");

    // Write score tables.

    let out = &ctl.output_opt.out_dir;
    let mut done = Vec::<JobResult>::new();
    for (_, _, r) in results {
        match r {
            Ok(r) => {
                let path = format!("{}/{}_{}_scores.csv", out, r.peptide, r.plan);
                write_score_table(&path, &r.regions, &r.records)?;
                done.push(r);
            }
            Err(e) => {
                error!("{}", e);
                failures.push(e);
            }
        }
    }

    // Compute AUC values.

    let t = Instant::now();
    let mut entries = Vec::<AucEntry>::new();
    for p in peps.iter() {
        for c in standard_configs().iter() {
            let Some(r) = done.iter().find(|r| &r.peptide == p && r.plan == c.plan) else {
                continue;
            };
            let (model, max_fpr) = (&ctl.input_opt.model, ctl.alg_opt.max_fpr);
            match score_configuration(model, p, &c.name, &r.records, c.column, max_fpr) {
                Ok(e) => entries.push(e),
                Err(e) => {
                    warn!("{}/{}: {}", p, c.name, e);
                    failures.push(format!("{}/{}: {}", p, c.name, e));
                }
            }
        }
    }
    if !ctl.input_opt.baseline.is_empty() {
        entries.append(&mut baseline_entries(&ctl, &peps, &mut failures));
    }
    append_averages(&mut entries);
    ctl.perf_stats(&t, "computing AUC");

    // Write summary files.

    write_auc_table(&format!("{}/auc_scores.csv", out), &entries)?;
    let mut log = Vec::<u8>::new();
    for f in failures.iter() {
        fwriteln!(log, "{}", f);
    }
    write_text(&format!("{}/failures.txt", out), strme(&log))?;
    if ctl.output_opt.svg {
        let ours = entries
            .iter()
            .filter(|e| e.model == ctl.input_opt.model)
            .cloned()
            .collect::<Vec<AucEntry>>();
        if !ours.is_empty() {
            write_charts(&ours, configuration_series, "auc", "ROC AUC", &ctl)?;
        }
        let compared = entries
            .iter()
            .filter(|e| e.configuration == ctl.output_opt.compare)
            .cloned()
            .collect::<Vec<AucEntry>>();
        if compared.iter().any(|e| e.model != ctl.input_opt.model)
            && compared.iter().any(|e| e.model == ctl.input_opt.model)
        {
            let title = format!("model comparison, {}", ctl.output_opt.compare);
            write_charts(&compared, model_series, "model_comparison", &title, &ctl)?;
        }
    }
    if !entries.is_empty() {
        print!("{}", format_summary(&entries, ctl.alg_opt.max_fpr));
    }
    info!(
        "{} jobs succeeded, {} failures recorded",
        done.len(),
        failures.len()
    );
    ctl.perf_stats(&tall, "total");
    if done.is_empty() {
        return Err(format!(
            "\nNo scoring job succeeded.  See\n{}/failures.txt\n",
            out
        ));
    }
    Ok(())
}
