// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

pub mod cosine;
pub mod defs;
pub mod errors;
pub mod joint;
pub mod nearest;
pub mod observer;
pub mod reduce;
pub mod roc;
