// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Build the query set and the per-region reference pools for one peptide and one list of
// regions.
//
// The query set is every record of the peptide that has all of the regions, in identity order.
// The reference pool of each region holds the binders of the query set, so row j of every pool
// is the same record.

use crate::read_emb::EmbeddingStore;
use crate::regions::region_embedding;
use ndarray::Array1;
use tcrsim_core::defs::{Identity, Reduction, SequenceRecord};
use tcrsim_core::joint::Query;
use tcrsim_core::nearest::{QueryKey, ReferencePool};
use tcrsim_core::observer::ScoreObserver;
use tcrsim_core::reduce::reduce;

pub struct RegionPools {
    pub regions: Vec<String>,
    pub queries: Vec<Query>,
    pub pools: Vec<ReferencePool>,
}

// Reduced vectors of every region for one record, or the reason there are none.

pub fn record_vectors(
    rec: &SequenceRecord,
    regions: &[String],
    reduction: Reduction,
    store: &EmbeddingStore,
    token_offset: usize,
) -> Result<Vec<Array1<f64>>, String> {
    let mut vectors = Vec::with_capacity(regions.len());
    for region in regions.iter() {
        let emb = region_embedding(rec, region, store, token_offset)?;
        let v = reduce(emb, reduction).map_err(|e| format!("{}: {}", region, e))?;
        vectors.push(v);
    }
    Ok(vectors)
}

pub fn build_pools(
    records: &[&SequenceRecord],
    regions: &[String],
    reduction: Reduction,
    store: &EmbeddingStore,
    token_offset: usize,
    job: &str,
    observer: &dyn ScoreObserver,
) -> Result<RegionPools, String> {
    let mut recs = records.to_vec();
    recs.sort_by_key(|r| r.identity);
    let mut queries = Vec::<Query>::new();
    let mut refs = vec![Vec::<(Identity, i64, Array1<f64>)>::new(); regions.len()];
    for rec in recs {
        let vectors = match record_vectors(rec, regions, reduction, store, token_offset) {
            Ok(v) => v,
            Err(cause) => {
                observer.record_skipped(job, rec.identity, &cause);
                continue;
            }
        };
        if rec.binder {
            for (k, v) in vectors.iter().enumerate() {
                refs[k].push((rec.identity, rec.partition, v.clone()));
            }
        }
        queries.push(Query {
            key: QueryKey {
                identity: rec.identity,
                partition: rec.partition,
            },
            binder: rec.binder,
            vectors,
        });
    }
    if queries.is_empty() {
        return Err(format!(
            "{}: no record has all of the regions {}",
            job,
            regions.join(",")
        ));
    }
    if refs[0].is_empty() {
        return Err(format!("{}: no binder has all of the regions", job));
    }
    let mut pools = Vec::with_capacity(regions.len());
    for (region, rows) in regions.iter().zip(refs.into_iter()) {
        pools.push(ReferencePool::new(region, rows).map_err(|e| format!("{}: {}", job, e))?);
    }
    Ok(RegionPools {
        regions: regions.to_vec(),
        queries,
        pools,
    })
}
