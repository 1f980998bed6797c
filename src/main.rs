//! Entry point for cribl-session.
use std::{io, process::ExitCode};

use clap::Parser;
use cribl_session::{
    cli::RunArgs,
    lib::telemetry,
    session::{config::EnvSource, runtime},
};

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = telemetry::init_tracing() {
        eprintln!("{err:?}");
    }
    let profile = RunArgs::parse().into_profile();

    let mut stdout = io::stdout().lock();
    runtime::run(profile, EnvSource::Process, &mut stdout).await
}
