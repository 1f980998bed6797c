//! Telemetry initialization and bootstrap span helpers.

use std::time::Instant;

use anyhow::Result;
use tracing::{field, info, info_span, warn, Span};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use uuid::Uuid;

/// HTTP client internals are noisy at `debug`; keep them at `warn` unless
/// `RUST_LOG` says otherwise.
const DEFAULT_FILTER: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn";

/// Initialize `tracing` and format developer logs on stderr.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span covering one credential-resolution-to-listing run.
pub struct BootstrapSpan {
    span: Span,
    started_at: Instant,
    run_id: Uuid,
}

impl BootstrapSpan {
    /// Start a run span. The deployment is recorded once it is resolved.
    pub fn start(command: &'static str) -> Self {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            target: "cribl_session::runtime",
            "bootstrap",
            %run_id,
            command,
            deployment = field::Empty
        );
        Self {
            span,
            started_at: Instant::now(),
            run_id,
        }
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn record_deployment(&self, deployment: &'static str) {
        self.span.record("deployment", deployment);
    }

    /// Close the span while recording the outcome.
    pub fn finish(self, status: &'static str, error_code: Option<&'static str>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "cribl_session::runtime",
            run_id = %self.run_id,
            status,
            error_code,
            elapsed_ms,
            "Completed run"
        );
    }
}

/// Loud record of the insecure TLS opt-in.
pub fn warn_insecure_tls(target: &Url) {
    warn!(
        target: "cribl_session::transport",
        url = %target,
        env = "CRIBL_INSECURE_TLS",
        "TLS certificate verification is DISABLED; self-signed certificates will be accepted"
    );
}

/// Emit the established session to `tracing`.
pub fn emit_session_ready(strategy: &str, base_url: &Url, insecure_tls: bool) {
    info!(
        target: "cribl_session::auth",
        strategy,
        base_url = %base_url,
        insecure_tls,
        "Authenticated session established"
    );
}
