// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

pub mod main_tcrsim;
pub mod plans;
pub mod score_job;
