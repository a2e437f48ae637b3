// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Console report of the AUC summary.  Peptides are rows, and each (model, configuration)
// contributes an AUC column and a partial AUC column.  Models are named in the header only when
// there is more than one.

use crate::summary::{AucEntry, AVERAGED};
use itertools::Itertools;
use string_utils::strme;
use tables::print_tabular;

pub fn format_summary(entries: &[AucEntry], max_fpr: f64) -> String {
    let peptides = entries
        .iter()
        .map(|e| e.peptide.clone())
        .unique()
        .sorted_by_key(|p| p == AVERAGED)
        .collect::<Vec<String>>();
    let configs = entries
        .iter()
        .map(|e| (e.model.clone(), e.configuration.clone()))
        .unique()
        .collect::<Vec<(String, String)>>();
    let models = configs.iter().map(|c| &c.0).unique().count();
    let mut rows = Vec::<Vec<String>>::new();
    let mut row = vec!["peptide".to_string()];
    for (m, c) in configs.iter() {
        if models > 1 {
            row.push(format!("{}:{} auc", m, c));
        } else {
            row.push(format!("{} auc", c));
        }
        row.push(format!("auc@{}", max_fpr));
    }
    rows.push(row);
    for p in peptides.iter() {
        let mut row = vec![p.clone()];
        for (m, c) in configs.iter() {
            match entries
                .iter()
                .find(|e| &e.peptide == p && &e.model == m && &e.configuration == c)
            {
                Some(e) => {
                    row.push(format!("{:.3}", e.auc));
                    row.push(format!("{:.3}", e.auc_partial));
                }
                None => {
                    row.push("-".to_string());
                    row.push("-".to_string());
                }
            }
        }
        rows.push(row);
    }
    let mut justify = vec![b'l'];
    justify.extend(vec![b'r'; 2 * configs.len()]);
    let mut log = Vec::<u8>::new();
    print_tabular(&mut log, &rows, 2, Some(justify));
    strme(&log).to_string()
}
