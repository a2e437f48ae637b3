// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Collapse an L x D per-residue embedding to a single vector of length D, by summing or
// averaging over the residue axis.

use crate::defs::Reduction;
use crate::errors::ScoreError;
use ndarray::{Array1, ArrayView2, Axis};

pub fn reduce(emb: ArrayView2<f64>, mode: Reduction) -> Result<Array1<f64>, ScoreError> {
    if emb.nrows() == 0 {
        return Err(ScoreError::EmptySequence);
    }
    match mode {
        Reduction::Sum => Ok(emb.sum_axis(Axis(0))),
        Reduction::Mean => emb.mean_axis(Axis(0)).ok_or(ScoreError::EmptySequence),
    }
}
