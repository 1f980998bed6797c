use std::{io::Write, process::ExitCode};

use tracing::{error, info, warn, Instrument};

use crate::{
    api::{list_worker_groups, list_workspaces, render_listing},
    cli::{prepare_env_source, resolve_deployment, ListCommand, RunProfile},
    lib::{
        errors::{ConfigError, Diagnostic, SessionError},
        telemetry::BootstrapSpan,
    },
    session::{
        auth::AuthStrategy,
        config::{Credentials, DeploymentMode, EnvSource, RawCriblEnv},
    },
};

/// Bundles a failed run's diagnostic with the exit policy.
#[derive(Debug)]
pub struct RunExit {
    diagnostic: Diagnostic,
    strict: bool,
}

impl RunExit {
    pub fn new(diagnostic: Diagnostic, strict: bool) -> Self {
        Self { diagnostic, strict }
    }

    /// Print the diagnostic to `out`. Failures exit 0 unless `--strict-exit` was given.
    pub fn report<W: Write>(self, out: &mut W) -> ExitCode {
        let written = out
            .write_all(self.diagnostic.render().as_bytes())
            .and_then(|()| out.flush());
        if let Err(err) = written {
            warn!(
                target: "cribl_session::runtime",
                code = self.diagnostic.code(),
                error = %err,
                "Failed to print diagnostic"
            );
        }
        self.exit_code()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.strict {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

/// Run one listing and write everything user-facing to `out`.
pub async fn run<W: Write>(profile: RunProfile, source: EnvSource, out: &mut W) -> ExitCode {
    let bootstrap = BootstrapSpan::start(profile.command.name());
    let span = bootstrap.span().clone();
    let strict = profile.strict_exit;

    let result = execute(profile, source, out, &bootstrap)
        .instrument(span)
        .await;

    match result {
        Ok(()) => {
            bootstrap.finish("ok", None);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let diagnostic = err.diagnostic();
            error!(
                target: "cribl_session::runtime",
                run_id = %bootstrap.run_id(),
                code = diagnostic.code(),
                error = %err,
                "Run failed"
            );
            bootstrap.finish("failed", Some(diagnostic.code()));
            RunExit::new(diagnostic, strict).report(out)
        }
    }
}

async fn execute<W: Write>(
    profile: RunProfile,
    source: EnvSource,
    out: &mut W,
    bootstrap: &BootstrapSpan,
) -> Result<(), SessionError> {
    let source = prepare_env_source(source, profile.env_file.as_deref())?;
    let raw = RawCriblEnv::load(source)?;
    let (deployment, deployment_source) = resolve_deployment(profile.deployment_override, &raw)?;
    bootstrap.record_deployment(deployment.as_str());
    info!(
        target: "cribl_session::runtime",
        command = profile.command.name(),
        deployment = deployment.as_str(),
        deployment_source = deployment_source.as_str(),
        "Resolved deployment"
    );

    write_banner(out, &profile.command, deployment)?;

    let credentials = Credentials::resolve(&raw, deployment)?;
    let strategy = AuthStrategy::select(credentials, profile.command.plane())?;

    let exchanges_token = matches!(strategy, AuthStrategy::BearerTokenExchange(_));
    if let AuthStrategy::BearerTokenExchange(onprem) = &strategy {
        writeln!(out, "Connecting to: {}", onprem.api_base_url)?;
        if strategy.tls_policy().is_insecure() {
            writeln!(out, "Accepting self-signed certificates (insecure mode)")?;
        }
        writeln!(out, "Authenticating with username/password...")?;
        out.flush()?;
    }

    let session = strategy.establish().await?;
    if exchanges_token {
        writeln!(out, "Authenticated with on-prem server")?;
    }

    let listing = match &profile.command {
        ListCommand::WorkerGroups(args) => {
            writeln!(out, "Fetching worker groups...")?;
            out.flush()?;
            render_listing(&list_worker_groups(&session, args.product).await?)
        }
        ListCommand::Workspaces => {
            let org_id = strategy
                .organization_id()
                .ok_or(ConfigError::UnsupportedPlane)?;
            writeln!(out, "Fetching workspaces...")?;
            out.flush()?;
            render_listing(&list_workspaces(&session, org_id).await?)
        }
    };

    out.write_all(listing.as_bytes())?;
    out.flush()?;
    Ok(())
}

fn write_banner<W: Write>(
    out: &mut W,
    command: &ListCommand,
    deployment: DeploymentMode,
) -> Result<(), SessionError> {
    let title = match (command, deployment) {
        (ListCommand::WorkerGroups(_), DeploymentMode::Cloud) => "Listing Cribl Worker Groups",
        (ListCommand::WorkerGroups(_), DeploymentMode::OnPrem) => {
            "Listing On-Premise Cribl Worker Groups"
        }
        (ListCommand::Workspaces, _) => "Listing Cribl Workspaces",
    };
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))?;
    Ok(())
}
