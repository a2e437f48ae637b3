// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Read scores of a baseline model, for comparison with the embedding scores.  A baseline
// directory holds one file per (peptide, configuration), named
//
// <peptide>_<configuration>[_score_binder_only][.ext]
//
// with one whitespace-separated "label score" pair per line, the label being 1 for a binder
// and 0 otherwise.

use crate::read_table::parse_binder;
use io_utils::{dir_list, path_exists};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const BINDER_ONLY_SUFFIX: &str = "_score_binder_only";

#[derive(Clone, Debug, PartialEq)]
pub struct BaselineFile {
    pub peptide: String,
    pub configuration: String,
    pub path: String,
}

// Files in dir that belong to one of the given peptides, sorted by (peptide, configuration).
// When peptide names are prefixes of each other, the longest match wins.

pub fn baseline_files(dir: &str, peptides: &[String]) -> Result<Vec<BaselineFile>, String> {
    if !Path::new(dir).is_dir() {
        return Err(format!("\nThe baseline directory\n{}\ndoes not exist.\n", dir));
    }
    let mut files = Vec::new();
    for f in dir_list(dir) {
        let stem = match Path::new(&f).file_stem().and_then(|s| s.to_str()) {
            Some(s) => s.to_string(),
            None => continue,
        };
        let peptide = peptides
            .iter()
            .filter(|p| stem.starts_with(&format!("{}_", p)))
            .max_by_key(|p| p.len());
        if let Some(p) = peptide {
            let rest = &stem[p.len() + 1..];
            let config = rest.strip_suffix(BINDER_ONLY_SUFFIX).unwrap_or(rest);
            if !config.is_empty() {
                files.push(BaselineFile {
                    peptide: p.clone(),
                    configuration: config.to_string(),
                    path: format!("{}/{}", dir, f),
                });
            }
        }
    }
    files.sort_by(|a, b| (&a.peptide, &a.configuration).cmp(&(&b.peptide, &b.configuration)));
    Ok(files)
}

pub fn parse_baseline_scores(
    lines: &[String],
    path: &str,
) -> Result<(Vec<bool>, Vec<f64>), String> {
    let (mut labels, mut scores) = (Vec::new(), Vec::new());
    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields = line.split_whitespace().collect::<Vec<&str>>();
        let bad = || {
            format!(
                "\nLine {} of the baseline score file\n{}\nshould be \"label score\", but is\n{}\n",
                i + 1,
                path,
                line
            )
        };
        if fields.len() != 2 {
            return Err(bad());
        }
        let label = parse_binder(fields[0]).ok_or_else(bad)?;
        let score = fields[1].parse::<f64>().map_err(|_| bad())?;
        if !score.is_finite() {
            return Err(bad());
        }
        labels.push(label);
        scores.push(score);
    }
    Ok((labels, scores))
}

pub fn read_baseline_scores(path: &str) -> Result<(Vec<bool>, Vec<f64>), String> {
    if !path_exists(path) {
        return Err(format!("\nThe baseline score file\n{}\ndoes not exist.\n", path));
    }
    let f = File::open(path)
        .map_err(|e| format!("\nCould not open the baseline score file\n{}\n{}\n", path, e))?;
    let mut lines = Vec::<String>::new();
    for line in BufReader::new(f).lines() {
        lines.push(line.map_err(|e| format!("\nError reading\n{}\n{}\n", path, e))?);
    }
    parse_baseline_scores(&lines, path)
}
