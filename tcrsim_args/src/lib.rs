// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

pub mod pools;
pub mod proc_args;
pub mod proc_args2;
pub mod read_baseline;
pub mod read_emb;
pub mod read_table;
pub mod regions;
