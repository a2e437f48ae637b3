// Copyright (c) 2022 10X Genomics, Inc. All rights reserved.

// Score TCR sequences against peptide binders by nearest neighbor cosine similarity of
// language model embeddings, and report ROC AUC per peptide.  Arguments are KEY=VALUE pairs;
// see tcrsim_args::proc_args.  Logging goes to stderr and is controlled by RUST_LOG.

use pretty_trace::PrettyTrace;
use std::env;
use tcrsim_main::main_tcrsim::main_tcrsim;

fn main() {
    PrettyTrace::new().on();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = env::args().collect();
    if let Err(err) = main_tcrsim(&args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
