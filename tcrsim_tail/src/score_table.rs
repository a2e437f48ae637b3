// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Composite score tables, one per (peptide, plan):
//
// raw_index,partition,binder,status,match_raw_index,weighted_sum,unweighted_sum,
// max_similarity_<region>,...
//
// Queries without a match keep their row, with the score fields empty.

use io_utils::{fwriteln, path_exists};
use std::fs::{read_to_string, write};
use std::io::Write;
use string_utils::{parse_csv, strme};
use tcrsim_core::defs::Identity;
use tcrsim_core::joint::{CompositeScoreRecord, JointOutcome};

pub fn score_header(regions: &[String]) -> Vec<String> {
    let mut h = [
        "raw_index",
        "partition",
        "binder",
        "status",
        "match_raw_index",
        "weighted_sum",
        "unweighted_sum",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect::<Vec<String>>();
    for r in regions.iter() {
        h.push(format!("max_similarity_{}", r));
    }
    h
}

pub fn format_score_table(regions: &[String], records: &[CompositeScoreRecord]) -> String {
    let mut log = Vec::<u8>::new();
    fwriteln!(log, "{}", score_header(regions).join(","));
    for rec in records.iter() {
        let mut fields = vec![
            rec.identity.to_string(),
            rec.partition.to_string(),
            (rec.binder as u8).to_string(),
            rec.outcome.status().to_string(),
        ];
        match &rec.outcome {
            JointOutcome::Matched(m) => {
                fields.push(m.reference.to_string());
                fields.push(m.composite.to_string());
                fields.push(m.unweighted.to_string());
                fields.extend(m.similarities.iter().map(|s| s.to_string()));
            }
            _ => fields.extend(vec![String::new(); 3 + regions.len()]),
        }
        fwriteln!(log, "{}", fields.join(","));
    }
    strme(&log).to_string()
}

pub fn write_score_table(
    path: &str,
    regions: &[String],
    records: &[CompositeScoreRecord],
) -> Result<(), String> {
    write(path, format_score_table(regions, records))
        .map_err(|e| format!("\nCould not write\n{}\n{}\n", path, e))
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Reading a score table back, for downstream reporting.

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreRow {
    pub identity: Identity,
    pub partition: i64,
    pub binder: bool,
    pub status: String,
    pub match_identity: Option<Identity>,
    pub weighted: Option<f64>,
    pub unweighted: Option<f64>,
    pub similarities: Vec<Option<f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoreTable {
    pub regions: Vec<String>,
    pub rows: Vec<ScoreRow>,
}

fn opt<T: std::str::FromStr>(x: &str) -> Result<Option<T>, ()> {
    if x.is_empty() {
        Ok(None)
    } else {
        x.parse::<T>().map(Some).map_err(|_| ())
    }
}

pub fn parse_score_table(text: &str, path: &str) -> Result<ScoreTable, String> {
    let mut lines = text.lines();
    let header = parse_csv(lines.next().unwrap_or_default());
    let fixed = score_header(&[]);
    if header.len() < fixed.len() || header[..fixed.len()] != fixed[..] {
        return Err(format!("\nThe file\n{}\nis not a score table.\n", path));
    }
    let regions = header[fixed.len()..]
        .iter()
        .map(|h| h.trim_start_matches("max_similarity_").to_string())
        .collect::<Vec<String>>();
    let mut rows = Vec::new();
    for (j, line) in lines.enumerate() {
        let f = parse_csv(line);
        let bad = || format!("\nThe score table\n{}\nis malformed at line {}.\n", path, j + 2);
        if f.len() != header.len() {
            return Err(bad());
        }
        let mut similarities = Vec::with_capacity(regions.len());
        for x in f[fixed.len()..].iter() {
            similarities.push(opt::<f64>(x).map_err(|_| bad())?);
        }
        rows.push(ScoreRow {
            identity: f[0].parse::<Identity>().map_err(|_| bad())?,
            partition: f[1].parse::<i64>().map_err(|_| bad())?,
            binder: f[2] == "1",
            status: f[3].clone(),
            match_identity: opt::<Identity>(&f[4]).map_err(|_| bad())?,
            weighted: opt::<f64>(&f[5]).map_err(|_| bad())?,
            unweighted: opt::<f64>(&f[6]).map_err(|_| bad())?,
            similarities,
        });
    }
    Ok(ScoreTable { regions, rows })
}

pub fn read_score_table(path: &str) -> Result<ScoreTable, String> {
    if !path_exists(path) {
        return Err(format!("\nThe score table\n{}\ndoes not exist.\n", path));
    }
    let text =
        read_to_string(path).map_err(|e| format!("\nCould not read\n{}\n{}\n", path, e))?;
    parse_score_table(&text, path)
}
