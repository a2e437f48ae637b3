// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

use crate::proc_args2::{is_f64_arg, is_simple_arg, is_string_arg, is_usize_arg, test_writeable};
use io_utils::path_exists;
use log::debug;
use std::fs::create_dir_all;
use std::time::Instant;
use string_utils::TextUtils;
use tcrsim_core::defs::{PartitionMode, Reduction, ScoreControl, PARENT_SOURCES};

// Argument naming the embedding file of a parent source, e.g. EMB_TCR_FULL for tcr_full.

pub fn emb_arg(source: &str) -> String {
    format!("EMB_{}", source.to_uppercase())
}

fn split_list(x: &str) -> Vec<String> {
    x.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Process arguments.  The first argument is the program name.

pub fn proc_args(ctl: &mut ScoreControl, args: &[String]) -> Result<(), String> {
    ctl.start_time = Some(Instant::now());

    // Defaults.

    ctl.alg_opt.reduction = Reduction::Sum;
    ctl.alg_opt.partition_mode = PartitionMode::SamePartition;
    ctl.alg_opt.cdr3_weight = 4.0;
    ctl.alg_opt.max_fpr = 0.1;
    ctl.input_opt.token_offset = 1;
    ctl.input_opt.model = "embedding".to_string();
    ctl.input_opt.baseline_model = "baseline".to_string();
    ctl.output_opt.compare = "All_CDR_Weighted".to_string();

    // Traverse arguments.

    'args_loop: for arg in args.iter().skip(1) {
        debug!("processing arg = {}", arg);
        if arg.is_empty() {
            return Err("\nYou've passed a null argument to tcrsim.\n".to_string());
        }

        // Flags.

        let mut set_true: Vec<(&str, &mut bool)> = vec![
            ("COMP", &mut ctl.perf_opt.comp),
            ("SVG", &mut ctl.output_opt.svg),
        ];
        for j in 0..set_true.len() {
            if is_simple_arg(arg, set_true[j].0)? {
                *(set_true[j].1) = true;
                continue 'args_loop;
            }
        }
        if is_simple_arg(arg, "NO_PARTITION")? {
            ctl.alg_opt.partition_mode = PartitionMode::Ignore;
            continue;
        }

        // Numbers.

        if is_usize_arg(arg, "TOKEN_OFFSET")? {
            ctl.input_opt.token_offset = arg.after("TOKEN_OFFSET=").force_usize();
            continue;
        }
        if is_usize_arg(arg, "THREADS")? {
            let n = arg.after("THREADS=").force_usize();
            if n == 0 {
                return Err("\nTHREADS must be positive.\n".to_string());
            }
            ctl.perf_opt.threads = Some(n);
            continue;
        }
        if is_f64_arg(arg, "CDR3_WEIGHT")? {
            ctl.alg_opt.cdr3_weight = arg.after("CDR3_WEIGHT=").force_f64();
            continue;
        }
        if is_f64_arg(arg, "MAX_FPR")? {
            let x = arg.after("MAX_FPR=").force_f64();
            if !(x > 0.0 && x <= 1.0) {
                return Err(format!(
                    "\nThe value of MAX_FPR must be in (0, 1], but you've specified {}.\n",
                    x
                ));
            }
            ctl.alg_opt.max_fpr = x;
            continue;
        }

        // Strings.

        if is_string_arg(arg, "REDUCE")? {
            let x = arg.after("REDUCE=");
            ctl.alg_opt.reduction = Reduction::from_name(x).ok_or_else(|| {
                format!(
                    "\nThe value of REDUCE must be sum or mean, but you've specified {}.\n",
                    x
                )
            })?;
            continue;
        }
        if is_string_arg(arg, "PEPTIDES")? {
            ctl.input_opt.peptides = split_list(arg.after("PEPTIDES="));
            continue;
        }
        if is_string_arg(arg, "PLANS")? {
            ctl.alg_opt.plans = split_list(arg.after("PLANS="));
            continue;
        }
        let mut set_string: Vec<(&str, &mut String)> = vec![
            ("TABLE", &mut ctl.input_opt.table),
            ("OUT", &mut ctl.output_opt.out_dir),
            ("MODEL", &mut ctl.input_opt.model),
            ("BASELINE", &mut ctl.input_opt.baseline),
            ("BASELINE_MODEL", &mut ctl.input_opt.baseline_model),
            ("COMPARE", &mut ctl.output_opt.compare),
        ];
        for j in 0..set_string.len() {
            if is_string_arg(arg, set_string[j].0)? {
                *(set_string[j].1) = arg.after(&format!("{}=", set_string[j].0)).to_string();
                continue 'args_loop;
            }
        }
        for source in PARENT_SOURCES.iter() {
            let key = emb_arg(source);
            if is_string_arg(arg, &key)? {
                let path = arg.after(&format!("{}=", key)).to_string();
                ctl.input_opt.embeddings.retain(|(s, _)| s != source);
                ctl.input_opt.embeddings.push((source.to_string(), path));
                continue 'args_loop;
            }
        }
        return Err(format!(
            "\nUnrecognized argument {}.  Known arguments are\nTABLE, OUT, {}, PEPTIDES, \
             PLANS, MODEL, BASELINE, BASELINE_MODEL, COMPARE, REDUCE, CDR3_WEIGHT, \
             NO_PARTITION, TOKEN_OFFSET, MAX_FPR, SVG, THREADS and COMP.\n",
            arg,
            PARENT_SOURCES
                .iter()
                .map(|s| emb_arg(s))
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    check_args(ctl)
}

// Check that required arguments are present and that files can be read and written.

fn check_args(ctl: &ScoreControl) -> Result<(), String> {
    if ctl.input_opt.table.is_empty() {
        return Err("\nYou need to specify the sequence table with TABLE=path.\n".to_string());
    }
    if !path_exists(&ctl.input_opt.table) {
        return Err(format!(
            "\nThe sequence table\n{}\ndoes not exist.\n",
            ctl.input_opt.table
        ));
    }
    if ctl.input_opt.embeddings.is_empty() {
        return Err(format!(
            "\nYou need to specify at least one embedding file, using {}.\n",
            PARENT_SOURCES
                .iter()
                .map(|s| format!("{}=path", emb_arg(s)))
                .collect::<Vec<_>>()
                .join(" or ")
        ));
    }
    for m in [&ctl.input_opt.model, &ctl.input_opt.baseline_model] {
        if m.contains(',') {
            return Err(format!("\nThe model name {} may not contain a comma.\n", m));
        }
    }
    if ctl.input_opt.model == ctl.input_opt.baseline_model {
        return Err("\nMODEL and BASELINE_MODEL must be different.\n".to_string());
    }
    let out = &ctl.output_opt.out_dir;
    if out.is_empty() {
        return Err("\nYou need to specify the output directory with OUT=dir.\n".to_string());
    }
    create_dir_all(out)
        .map_err(|e| format!("\nCould not create output directory\n{}\n{}\n", out, e))?;
    test_writeable(&format!("{}/failures.txt", out))
}
