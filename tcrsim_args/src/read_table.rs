// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Read the master sequence table.  One row per (peptide, TCR) observation:
//
// raw_index,peptide,partition,binder,TCRa,TCRb,tcr_full,CDR1a,CDR2a,CDR3a,CDR1b,CDR2b,CDR3b
//
// Only the first four columns are required.  The peptide column may also be called peptide_x.
// Lines beginning with # are ignored.

use io_utils::path_exists;
use itertools::Itertools;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use string_utils::parse_csv;
use tcrsim_core::defs::{Identity, SequenceRecord, CDR_REGIONS, PARENT_SOURCES};
use vector_utils::unique_sort;

pub(crate) fn parse_binder(x: &str) -> Option<bool> {
    match x {
        "1" | "true" | "True" | "TRUE" | "1.0" => Some(true),
        "0" | "false" | "False" | "FALSE" | "0.0" => Some(false),
        _ => None,
    }
}

pub fn read_table(path: &str) -> Result<Vec<SequenceRecord>, String> {
    if !path_exists(path) {
        return Err(format!("\nThe sequence table\n{}\ndoes not exist.\n", path));
    }
    let f = File::open(path)
        .map_err(|e| format!("\nCould not open the sequence table\n{}\n{}\n", path, e))?;
    let mut lines = Vec::<String>::new();
    for line in BufReader::new(f).lines() {
        let s = line.map_err(|e| format!("\nError reading\n{}\n{}\n", path, e))?;
        if !s.starts_with('#') && !s.trim().is_empty() {
            lines.push(s);
        }
    }
    parse_table(&lines, path)
}

// Parse table lines (header first).  The path is only used in messages.

pub fn parse_table(lines: &[String], path: &str) -> Result<Vec<SequenceRecord>, String> {
    if lines.is_empty() {
        return Err(format!("\nThe sequence table\n{}\nis empty.\n", path));
    }
    let header = parse_csv(&lines[0]);
    let mut tof = HashMap::<String, usize>::new();
    for (i, h) in header.iter().enumerate() {
        tof.insert(h.trim().to_string(), i);
    }
    if !tof.contains_key("peptide") {
        if let Some(&i) = tof.get("peptide_x") {
            tof.insert("peptide".to_string(), i);
        }
    }
    for c in ["raw_index", "peptide", "partition", "binder"] {
        if !tof.contains_key(c) {
            return Err(format!(
                "\nThe sequence table\n{}\nlacks the required column {}.\n",
                path, c
            ));
        }
    }
    let seq_cols = PARENT_SOURCES
        .iter()
        .chain(CDR_REGIONS.iter())
        .filter(|c| tof.contains_key(**c))
        .map(|c| c.to_string())
        .collect::<Vec<String>>();
    let mut records = Vec::<SequenceRecord>::new();
    let mut seen = HashSet::<(String, Identity)>::new();
    for (j, line) in lines.iter().enumerate().skip(1) {
        let fields = parse_csv(line);
        if fields.len() != header.len() {
            return Err(format!(
                "\nSomething appears to be wrong with the sequence table\n{}:\n\
                 line {} has {} fields but the header has {}.\n",
                path,
                j + 1,
                fields.len(),
                header.len()
            ));
        }
        let field = |c: &str| fields[tof[c]].trim();
        let bad = |c: &str| {
            format!(
                "\nSomething appears to be wrong with the sequence table\n{}:\n\
                 line {} has the illegal {} value \"{}\".\n",
                path,
                j + 1,
                c,
                field(c)
            )
        };
        let identity = field("raw_index")
            .parse::<Identity>()
            .map_err(|_| bad("raw_index"))?;
        let partition = field("partition")
            .parse::<i64>()
            .map_err(|_| bad("partition"))?;
        let binder = parse_binder(field("binder")).ok_or_else(|| bad("binder"))?;
        let peptide = field("peptide").to_string();
        if peptide.is_empty() {
            return Err(bad("peptide"));
        }
        if !seen.insert((peptide.clone(), identity)) {
            return Err(format!(
                "\nThe sequence table\n{}\nlists raw_index {} more than once for peptide {}.\n",
                path, identity, peptide
            ));
        }
        let mut seqs = HashMap::new();
        for c in seq_cols.iter() {
            let s = field(c.as_str());
            if !s.is_empty() {
                seqs.insert(c.clone(), s.to_string());
            }
        }
        records.push(SequenceRecord {
            identity,
            peptide,
            partition,
            binder,
            seqs,
        });
    }
    Ok(records)
}

// Sorted list of the distinct peptides in the table.

pub fn peptides(records: &[SequenceRecord]) -> Vec<String> {
    let mut p = records.iter().map(|r| r.peptide.clone()).collect::<Vec<_>>();
    unique_sort(&mut p);
    p
}

// Records of one peptide, in identity order.

pub fn records_for<'a>(records: &'a [SequenceRecord], peptide: &str) -> Vec<&'a SequenceRecord> {
    records
        .iter()
        .filter(|r| r.peptide == peptide)
        .sorted_by_key(|r| r.identity)
        .collect()
}
