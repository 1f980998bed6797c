use std::net::TcpListener;

use cribl_session::{
    api::Product,
    cli::{ListCommand, RunProfile, WorkerGroupsArgs},
    session::{config::EnvSource, runtime},
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_cribl-session");

/// Environment for an on-prem run against `server_url`.
pub fn onprem_env(server_url: &str, extra: &[(&str, &str)]) -> EnvSource {
    let mut pairs = vec![
        ("CRIBL_DEPLOYMENT".to_string(), "on-prem".to_string()),
        ("CRIBL_SERVER_URL".to_string(), server_url.to_string()),
    ];
    pairs.extend(
        extra
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string())),
    );
    EnvSource::from_pairs(pairs)
}

pub fn worker_groups_profile() -> RunProfile {
    RunProfile {
        command: ListCommand::WorkerGroups(WorkerGroupsArgs {
            product: Product::Stream,
        }),
        deployment_override: None,
        env_file: None,
        strict_exit: false,
    }
}

/// Run one listing in-process and capture what it printed.
pub async fn run_captured(profile: RunProfile, source: EnvSource) -> String {
    let mut out = Vec::new();
    runtime::run(profile, source, &mut out).await;
    String::from_utf8(out).expect("output is utf-8")
}

/// A local port with nothing listening on it.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("can bind an ephemeral port");
    listener
        .local_addr()
        .expect("bound listener has an address")
        .port()
}
