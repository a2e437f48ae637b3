// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Load per-residue embeddings.  There is one file per parent sequence source (TCRa, TCRb,
// tcr_full), holding a JSON array
//
// [{"raw_index": 17, "embedding": [[f64; D]; L]}, ...]
//
// where L counts the language model's special tokens as well as the residues.  Files ending in
// .gz are decompressed on the fly.

use flate2::read::MultiGzDecoder;
use io_utils::path_exists;
use itertools::Itertools;
use log::{info, warn};
use ndarray::Array2;
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use tcrsim_core::defs::Identity;

#[derive(Deserialize)]
struct EmbeddingEntry {
    raw_index: Identity,
    embedding: Vec<Vec<f64>>,
}

pub type EmbeddingSet = HashMap<Identity, Array2<f64>>;

// Convert parsed entries to matrices, requiring one width D for the whole source.

fn to_matrices(entries: Vec<EmbeddingEntry>, path: &str) -> Result<EmbeddingSet, String> {
    let mut set = EmbeddingSet::new();
    let mut width = None;
    for e in entries {
        let rows = e.embedding.len();
        if rows == 0 {
            return Err(format!(
                "\nIn the embedding file\n{}\nthe embedding of raw_index {} is empty.\n",
                path, e.raw_index
            ));
        }
        let d = e.embedding[0].len();
        if *width.get_or_insert(d) != d || e.embedding.iter().any(|r| r.len() != d) {
            return Err(format!(
                "\nIn the embedding file\n{}\nthe embedding of raw_index {} has rows of \
                 inconsistent width.\n",
                path, e.raw_index
            ));
        }
        let flat = e.embedding.into_iter().flatten().collect::<Vec<f64>>();
        let m = Array2::from_shape_vec((rows, d), flat).map_err(|e| e.to_string())?;
        if set.insert(e.raw_index, m).is_some() {
            return Err(format!(
                "\nThe embedding file\n{}\ncontains raw_index {} more than once.\n",
                path, e.raw_index
            ));
        }
    }
    Ok(set)
}

pub fn parse_embeddings<R: Read>(r: R, path: &str) -> Result<EmbeddingSet, String> {
    let entries: Vec<EmbeddingEntry> = serde_json::from_reader(r).map_err(|e| {
        format!(
            "\nThe embedding file\n{}\ncould not be parsed as JSON: {}\n",
            path, e
        )
    })?;
    to_matrices(entries, path)
}

pub fn read_embeddings(path: &str) -> Result<EmbeddingSet, String> {
    if !path_exists(path) {
        return Err(format!("\nThe embedding file\n{}\ndoes not exist.\n", path));
    }
    let f = File::open(path)
        .map_err(|e| format!("\nCould not open the embedding file\n{}\n{}\n", path, e))?;
    if path.ends_with(".gz") {
        parse_embeddings(BufReader::new(MultiGzDecoder::new(f)), path)
    } else {
        parse_embeddings(BufReader::new(f), path)
    }
}

// Embeddings of every loaded source.

#[derive(Default)]
pub struct EmbeddingStore {
    sources: HashMap<String, EmbeddingSet>,
}

impl EmbeddingStore {
    // Load (source, path) pairs.  A source whose file can't be read is left out of the store,
    // and "<source>: <cause>" is returned for it.

    pub fn load(files: &[(String, String)]) -> (EmbeddingStore, Vec<String>) {
        let mut store = EmbeddingStore::default();
        let mut failures = Vec::new();
        for (source, path) in files.iter() {
            match read_embeddings(path) {
                Ok(set) => {
                    info!("loaded {} {} embeddings from {}", set.len(), source, path);
                    store.insert(source, set);
                }
                Err(e) => {
                    let cause = e.split_whitespace().join(" ");
                    warn!("{}: {}", source, cause);
                    failures.push(format!("{}: {}", source, cause));
                }
            }
        }
        (store, failures)
    }

    pub fn insert(&mut self, source: &str, set: EmbeddingSet) {
        self.sources.insert(source.to_string(), set);
    }

    pub fn has_source(&self, source: &str) -> bool {
        self.sources.contains_key(source)
    }

    pub fn get(&self, source: &str, identity: Identity) -> Option<&Array2<f64>> {
        self.sources.get(source).and_then(|s| s.get(&identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_trace::PrettyTrace;

    #[test]
    fn test_parse_embeddings() {
        PrettyTrace::new().on();
        let json = r#"[{"raw_index": 4, "embedding": [[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]},
                       {"raw_index": 9, "embedding": [[1.5, -1.5]]}]"#;
        let set = parse_embeddings(json.as_bytes(), "x.json").unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[&4].dim(), (3, 2));
        assert_eq!(set[&4][[2, 1]], 5.0);
        assert_eq!(set[&9][[0, 1]], -1.5);
        let mut store = EmbeddingStore::default();
        store.insert("TCRb", set);
        assert!(store.has_source("TCRb"));
        assert!(!store.has_source("TCRa"));
        assert!(store.get("TCRb", 9).is_some());
        assert!(store.get("TCRb", 10).is_none());
    }

    #[test]
    fn test_embedding_errors() {
        PrettyTrace::new().on();
        let ragged = r#"[{"raw_index": 4, "embedding": [[0.0, 1.0], [2.0]]}]"#;
        assert!(parse_embeddings(ragged.as_bytes(), "x")
            .unwrap_err()
            .contains("inconsistent width"));
        let widths = r#"[{"raw_index": 4, "embedding": [[0.0, 1.0]]},
                         {"raw_index": 5, "embedding": [[0.0, 1.0, 2.0]]}]"#;
        assert!(parse_embeddings(widths.as_bytes(), "x").is_err());
        let dup = r#"[{"raw_index": 4, "embedding": [[0.0]]},
                      {"raw_index": 4, "embedding": [[1.0]]}]"#;
        assert!(parse_embeddings(dup.as_bytes(), "x")
            .unwrap_err()
            .contains("more than once"));
        assert!(parse_embeddings("{".as_bytes(), "x").is_err());
        assert!(read_embeddings("/no/such/file.json").is_err());
    }

    #[test]
    fn test_load_skips_bad_sources() {
        PrettyTrace::new().on();
        let dir = format!("{}/tcrsim_read_emb_load", std::env::temp_dir().display());
        std::fs::create_dir_all(&dir).unwrap();
        let good = format!("{}/tcrb.json", dir);
        let bad = format!("{}/tcra.json", dir);
        std::fs::write(&good, r#"[{"raw_index": 1, "embedding": [[1.0, 0.0]]}]"#).unwrap();
        std::fs::write(&bad, "{ not json").unwrap();
        let files = vec![
            ("TCRa".to_string(), bad),
            ("TCRb".to_string(), good),
            ("tcr_full".to_string(), format!("{}/missing.json", dir)),
        ];
        let (store, failures) = EmbeddingStore::load(&files);
        assert!(store.has_source("TCRb"));
        assert!(!store.has_source("TCRa"));
        assert!(!store.has_source("tcr_full"));
        assert_eq!(failures.len(), 2);
        assert!(failures[0].starts_with("TCRa: The embedding file"));
        assert!(failures[0].contains("could not be parsed as JSON"));
        assert!(!failures[0].contains('\n'));
        assert!(failures[1].starts_with("tcr_full: "));
        assert!(failures[1].contains("does not exist"));
    }
}
