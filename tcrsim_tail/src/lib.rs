// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

pub mod bar_chart;
pub mod print_summary;
pub mod score_table;
pub mod summary;
