// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// End-to-end tests: write a small sequence table and embedding file, run tcrsim, and check the
// files it produces.
//
// Each peptide has three binders whose CDR3b embeddings point near (1, 0) and three non-binders
// pointing near (0, 1), so every non-binder scores below every binder.

use flate2::write::GzEncoder;
use flate2::Compression;
use io_utils::path_exists;
use pretty_trace::PrettyTrace;
use serde_json::json;
use std::fs::{create_dir_all, read_to_string, remove_dir_all, write, File};
use std::io::Write;
use std::process::{Command, Output};
use string_utils::strme;
use tcrsim_tail::score_table::read_score_table;

const PEPTIDES: [(&str, u64); 2] = [("GILGFVFTL", 100), ("NLVPMVATV", 200)];

fn directions() -> Vec<(bool, [f64; 2])> {
    vec![
        (true, [1.0, 0.1]),
        (true, [1.0, 0.2]),
        (true, [1.0, 0.15]),
        (false, [0.0, 1.0]),
        (false, [0.1, 1.0]),
        (false, [0.2, 1.0]),
    ]
}

// Build the fixture in a fresh directory and return its path.

fn fixture(name: &str) -> String {
    let dir = format!("{}/tcrsim_test_{}", std::env::temp_dir().display(), name);
    let _ = remove_dir_all(&dir);
    create_dir_all(&dir).unwrap();
    let mut table = String::from("# test table\nraw_index,peptide,partition,binder,TCRb,CDR3b\n");
    let mut emb = Vec::new();
    for (peptide, base) in PEPTIDES {
        for (i, (binder, dir)) in directions().into_iter().enumerate() {
            let id = base + i as u64;
            table += &format!("{},{},0,{},MKCASS,CASS\n", id, peptide, binder as u8);

            // Leading token, six residues, trailing token.

            let rows = vec![dir.to_vec(); 8];
            emb.push(json!({"raw_index": id, "embedding": rows}));
        }
    }
    write(format!("{}/table.csv", dir), table).unwrap();
    let f = File::create(format!("{}/tcrb.json.gz", dir)).unwrap();
    let mut gz = GzEncoder::new(f, Compression::default());
    gz.write_all(serde_json::to_string(&emb).unwrap().as_bytes())
        .unwrap();
    gz.finish().unwrap();
    dir
}

fn run(dir: &str, extra: &[&str]) -> Output {
    let mut args = vec![
        format!("TABLE={}/table.csv", dir),
        format!("EMB_TCRB={}/tcrb.json.gz", dir),
        format!("OUT={}/out", dir),
    ];
    args.extend(extra.iter().map(|s| s.to_string()));
    run_args(&args)
}

fn run_args(args: &[String]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tcrsim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .unwrap()
}

// Rows of auc_scores.csv without the header.  Fields are
// model,peptide,configuration,auc,auc_partial,n.

fn auc_lines(dir: &str) -> Vec<Vec<String>> {
    read_to_string(format!("{}/out/auc_scores.csv", dir))
        .unwrap()
        .lines()
        .skip(1)
        .map(|l| l.split(',').map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn test_separable_peptides() {
    PrettyTrace::new().on();
    let dir = fixture("separable");
    let out = run(&dir, &["PLANS=CDR3b", "SVG"]);
    assert!(out.status.success(), "{}", strme(&out.stderr));
    let lines = auc_lines(&dir);
    assert_eq!(lines.len(), 3);
    for (i, p) in ["GILGFVFTL", "NLVPMVATV", "AVERAGED"].iter().enumerate() {
        assert_eq!(lines[i][0], "embedding");
        assert_eq!(lines[i][1], *p);
        assert_eq!(lines[i][2], "Individual_CDR3b");
        assert_eq!(lines[i][3], "1.000000");
        assert_eq!(lines[i][4], "1.000000");
    }
    assert_eq!(lines[0][5], "6");
    assert_eq!(lines[2][5], "2");

    let t = read_score_table(&format!("{}/out/GILGFVFTL_CDR3b_scores.csv", dir)).unwrap();
    assert_eq!(t.regions, vec!["CDR3b"]);
    assert_eq!(t.rows.len(), 6);
    for r in t.rows.iter() {
        assert_eq!(r.status, "matched");
        let m = r.match_identity.unwrap();
        assert_ne!(m, r.identity);
        assert!((100..103).contains(&m));
    }
    assert!(path_exists(&format!("{}/out/auc.svg", dir)));
    assert!(path_exists(&format!("{}/out/auc_partial.svg", dir)));
    assert!(!path_exists(&format!("{}/out/model_comparison.svg", dir)));
    assert!(strme(&out.stdout).contains("Individual_CDR3b"));
}

#[test]
fn test_missing_sources_are_recorded() {
    PrettyTrace::new().on();
    let dir = fixture("missing");
    let out = run(&dir, &["PEPTIDES=GILGFVFTL"]);
    assert!(out.status.success(), "{}", strme(&out.stderr));
    let configs = auc_lines(&dir)
        .iter()
        .filter(|l| l[1] == "GILGFVFTL")
        .map(|l| l[2].clone())
        .collect::<Vec<_>>();
    assert_eq!(configs, vec!["Individual_CDR3b", "TCRb"]);
    let failures = read_to_string(format!("{}/out/failures.txt", dir)).unwrap();
    assert!(failures.contains("GILGFVFTL/CDR3a: no TCRa embeddings were loaded"));
    assert!(failures.contains("GILGFVFTL/full: no tcr_full embeddings were loaded"));
    assert!(!failures.contains("NLVPMVATV"));
    assert!(!path_exists(&format!("{}/out/auc.svg", dir)));
}

#[test]
fn test_bad_arguments() {
    PrettyTrace::new().on();
    let dir = fixture("bad_args");
    let out = run(&dir, &["PLANS=CDR4"]);
    assert!(!out.status.success());
    assert!(strme(&out.stderr).contains("Unknown scoring plan"));

    // The error is printed once, and nothing else is.

    assert!(strme(&out.stderr).trim_start().starts_with("Unknown scoring plan"));
    assert_eq!(strme(&out.stderr).matches("scoring plan").count(), 1);
    let out = run(&dir, &["PEPTIDES=AAAAAAAAA"]);
    assert!(!out.status.success());
    let out = run(&dir, &["FROB=1"]);
    assert!(!out.status.success());
    assert!(strme(&out.stderr).contains("Unrecognized argument"));
    let out = run(&dir, &["COMPARE=Best"]);
    assert!(!out.status.success());
    assert!(strme(&out.stderr).contains("Unknown configuration"));
}

// An unreadable embedding file for one source only removes the plans that need it.

#[test]
fn test_bad_embedding_file() {
    PrettyTrace::new().on();
    let dir = fixture("bad_embedding");
    write(format!("{}/tcra.json", dir), "{ not json").unwrap();
    let args = vec![
        format!("TABLE={}/table.csv", dir),
        format!("EMB_TCRA={}/tcra.json", dir),
        format!("EMB_TCRB={}/tcrb.json.gz", dir),
        format!("OUT={}/out", dir),
        "PLANS=CDR3b,TCRa".to_string(),
    ];
    let out = run_args(&args);
    assert!(out.status.success(), "{}", strme(&out.stderr));
    let lines = auc_lines(&dir);
    assert!(lines
        .iter()
        .any(|l| l[1] == "GILGFVFTL" && l[2] == "Individual_CDR3b" && l[3] == "1.000000"));
    assert!(!lines.iter().any(|l| l[2] == "TCRa"));
    let failures = read_to_string(format!("{}/out/failures.txt", dir)).unwrap();
    let first = failures.lines().next().unwrap();
    assert!(first.starts_with("TCRa: The embedding file"));
    assert!(first.contains("could not be parsed as JSON"));
    assert!(failures.contains("GILGFVFTL/TCRa: no TCRa embeddings were loaded"));
    assert!(failures.contains("NLVPMVATV/TCRa: no TCRa embeddings were loaded"));
}

// Baseline score files are summarized beside the embedding scores, with configuration names
// translated, and drawn in a model comparison chart.

#[test]
fn test_baseline_comparison() {
    PrettyTrace::new().on();
    let dir = fixture("baseline");
    let base = format!("{}/tbcralign", dir);
    create_dir_all(&base).unwrap();
    let files = [
        ("GILGFVFTL_CDR3_B_score_binder_only.csv", "1 0.9\n1 0.8\n0 0.3\n0 0.85\n"),
        ("NLVPMVATV_CDR3_B_score_binder_only.csv", "1 0.9\n0 0.1\n"),
        ("GILGFVFTL_weighted_score_binder_only.csv", "1 0.7\n0 0.2\n"),
        ("NLVPMVATV_CDR3.txt", "x y\n"),
        ("README", "scores from TBCRalign\n"),
    ];
    for (f, text) in files {
        write(format!("{}/{}", base, f), text).unwrap();
    }
    let out = run(
        &dir,
        &[
            "PLANS=CDR3b",
            "SVG",
            "MODEL=ESM2",
            &format!("BASELINE={}", base),
            "BASELINE_MODEL=TBCRalign",
            "COMPARE=Individual_CDR3b",
        ],
    );
    assert!(out.status.success(), "{}", strme(&out.stderr));
    let lines = auc_lines(&dir);
    let find = |m: &str, p: &str, c: &str| {
        lines
            .iter()
            .find(|l| l[0] == m && l[1] == p && l[2] == c)
            .cloned()
            .unwrap()
    };
    let g = find("TBCRalign", "GILGFVFTL", "Individual_CDR3b");
    assert_eq!(&g[3..], &["0.750000", "0.500000", "4"]);
    let a = find("TBCRalign", "AVERAGED", "Individual_CDR3b");
    assert_eq!(&a[3..], &["0.875000", "0.750000", "2"]);
    let w = find("TBCRalign", "AVERAGED", "All_CDR_Weighted");
    assert_eq!(w[5], "1");
    let e = find("ESM2", "AVERAGED", "Individual_CDR3b");
    assert_eq!(e[3], "1.000000");
    let failures = read_to_string(format!("{}/out/failures.txt", dir)).unwrap();
    assert!(failures.contains("TBCRalign/NLVPMVATV/Combined_CDR3: Line 1"));
    let svg = read_to_string(format!("{}/out/model_comparison.svg", dir)).unwrap();
    assert!(svg.contains("ESM2"));
    assert!(svg.contains("TBCRalign"));
    assert!(path_exists(&format!("{}/out/model_comparison_partial.svg", dir)));
    assert!(strme(&out.stdout).contains("TBCRalign:Individual_CDR3b auc"));
}
