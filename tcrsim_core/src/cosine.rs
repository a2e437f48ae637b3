// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

use crate::errors::ScoreError;
use ndarray::ArrayView1;

// Cosine similarity dot(a,b) / (|a| |b|).  Undefined if either vector has zero norm.

pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> Result<f64, ScoreError> {
    if a.len() != b.len() {
        return Err(ScoreError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    cosine_with_norms(a, norm(a), b, norm(b))
}

pub fn norm(a: ArrayView1<f64>) -> f64 {
    a.dot(&a).sqrt()
}

// Same, with norms computed ahead of time.  The scorers compute each vector's norm once,
// rather than once per pair.  Lengths must already agree.

pub fn cosine_with_norms(
    a: ArrayView1<f64>,
    norm_a: f64,
    b: ArrayView1<f64>,
    norm_b: f64,
) -> Result<f64, ScoreError> {
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(ScoreError::ZeroVector);
    }
    Ok(a.dot(&b) / (norm_a * norm_b))
}
