// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Locate a region inside its parent chain and cut the region's rows out of the parent
// embedding.
//
// Embeddings are computed for whole parent sequences only.  Row i + offset of a parent
// embedding belongs to residue i, where offset counts the leading special tokens.  A CDR is
// found by exact substring search (first occurrence) and covers rows
// [start + offset, end + offset).

use ndarray::{s, Array2, ArrayView2};
use tcrsim_core::defs::{parent_source, SequenceRecord};

use crate::read_emb::EmbeddingStore;

// Residue span [start, end) of region within parent.

pub fn locate_region(parent: &str, region: &str) -> Option<(usize, usize)> {
    if region.is_empty() {
        return None;
    }
    parent.find(region).map(|start| (start, start + region.len()))
}

pub fn region_slice<'a>(
    emb: &'a Array2<f64>,
    span: (usize, usize),
    offset: usize,
) -> Result<ArrayView2<'a, f64>, String> {
    let (start, stop) = (span.0 + offset, span.1 + offset);
    if stop > emb.nrows() {
        return Err(format!(
            "residues {}..{} with token offset {} exceed the {} embedding rows",
            span.0,
            span.1,
            offset,
            emb.nrows()
        ));
    }
    Ok(emb.slice(s![start..stop, ..]))
}

// Per-residue embedding of a named region for one record.  The error is a short cause, to be
// reported per record.

pub fn region_embedding<'a>(
    rec: &SequenceRecord,
    region: &str,
    store: &'a EmbeddingStore,
    offset: usize,
) -> Result<ArrayView2<'a, f64>, String> {
    let source = parent_source(region).ok_or_else(|| format!("unknown region {}", region))?;
    let parent = rec
        .seq(source)
        .ok_or_else(|| format!("no {} sequence", source))?;
    let emb = store
        .get(source, rec.identity)
        .ok_or_else(|| format!("no {} embedding", source))?;
    let span = if region == source {
        (0, parent.len())
    } else {
        let seq = rec.seq(region).ok_or_else(|| format!("no {} sequence", region))?;
        locate_region(parent, seq)
            .ok_or_else(|| format!("{} {} not found in {}", region, seq, source))?
    };
    region_slice(emb, span, offset).map_err(|e| format!("{}: {}", region, e))
}
