//! Run the default reservoir hyperparameter optimization.
//!
//! Prints one line per epoch to stdout and writes `data.json` and
//! `loss.svg` to the working directory. Diagnostics go to stderr, filtered
//! by `RUST_LOG` (default `info`).
use std::{io::IsTerminal, process::ExitCode};

use esn_hyperopt::training::optimize;
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).init();
}

fn main() -> ExitCode {
    init_tracing();
    match optimize() {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "optimization aborted");
            ExitCode::FAILURE
        }
    }
}
