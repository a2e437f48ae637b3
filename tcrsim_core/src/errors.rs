// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.
//
// Errors raised by the scoring engine.  Input and file errors live one layer up and are carried
// as strings; these are the numerical and structural failures of the engine itself.

use crate::defs::Identity;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScoreError {
    #[error("embedding has no rows, so it cannot be reduced to a vector")]
    EmptySequence,

    #[error("vector has zero norm, so cosine similarity is undefined")]
    ZeroVector,

    #[error("vector lengths differ ({left} versus {right})")]
    DimensionMismatch { left: usize, right: usize },

    #[error(
        "reference pools are not aligned: region {region} row {row} has identity \
         {found:?} but the first region has {expected:?}"
    )]
    MisalignedPool {
        region: String,
        row: usize,
        expected: Option<Identity>,
        found: Option<Identity>,
    },

    #[error("query supplies {found} region vectors but {expected} regions are being scored")]
    RegionCount { expected: usize, found: usize },

    #[error("{weights} weights were given for {regions} regions")]
    WeightCount { regions: usize, weights: usize },

    #[error("at least one region is required")]
    NoRegions,

    #[error(
        "AUC is undefined with {positives} positive and {negatives} negative examples"
    )]
    DegenerateLabels { positives: usize, negatives: usize },

    #[error("false positive rate bound {0} is not in (0, 1]")]
    InvalidFpr(f64),
}
