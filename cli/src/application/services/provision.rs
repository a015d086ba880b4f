//! Application service: the provisioning sequence.
//!
//! Every step is check → skip if satisfied → act → verify. Steps run in
//! [`StepId::ORDER`]; a fatal failure returns immediately so no later step
//! executes. Imports only from `crate::domain` and `crate::application`.

use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::Instrument;

use crate::application::ports::{LocalFiles, ProgressReporter, RemoteHost, ShellExecutor};
use crate::application::services::atomic_write;
use crate::application::services::chain::{Alternative, run_chain};
use crate::application::services::remote;
use crate::domain::artifacts::{self, Artifact, ArtifactKind, BUILD_DEFINITIONS};
use crate::domain::report::{AttemptRecord, PlanReport, RunReport, StepRecord, ToleratedFailure};
use crate::domain::secret::generate_secret;
use crate::domain::shell::{self as cmd, BASELINE_BINARIES, COMPOSE_VERSION};
use crate::domain::{
    CommandResult, DeployParams, FaultPolicy, OsFamily, StepId, StepOutcome, StepStatus,
};

pub struct ProvisionOptions<'a, R: ProgressReporter> {
    pub reporter: &'a R,
    pub deploy: &'a DeployParams,
    /// `user@host:port`, recorded in the report.
    pub target: &'a str,
}

/// Facts probed once per run and handed to every step.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub deploy: &'a DeployParams,
    pub os: OsFamily,
}

/// What sits at the deploy path before the source step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoState {
    Repository,
    /// Something exists there but it is not a git checkout.
    NotRepository,
    Absent,
}

type StepResult = (StepOutcome, Vec<AttemptRecord>);

// ── Probes ───────────────────────────────────────────────────────────────────

/// Read `/etc/os-release` and classify the host.
///
/// # Errors
///
/// Returns an error only on transport failure; an unreadable file yields
/// [`OsFamily::Unknown`].
pub async fn probe_os(shell: &impl ShellExecutor) -> Result<OsFamily> {
    let result = shell.exec(&cmd::os_release()).await?;
    let os = if result.success() {
        OsFamily::from_os_release(&result.stdout)
    } else {
        tracing::warn!(exit_code = result.exit_code, "could not read /etc/os-release");
        OsFamily::Unknown
    };
    tracing::info!(%os, "detected os family");
    Ok(os)
}

/// The compose invocation the host answers to, plugin form first.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn detect_compose(shell: &impl ShellExecutor) -> Result<Option<&'static str>> {
    if remote::probe(shell, &cmd::compose_plugin_version()).await? {
        return Ok(Some("docker compose"));
    }
    if remote::probe(shell, &cmd::compose_standalone_version()).await? {
        return Ok(Some("docker-compose"));
    }
    Ok(None)
}

/// Whether the package baseline is complete: every binary on `PATH` and the
/// certbot nginx plugin loadable. `Err(reason)` names what is missing.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn baseline_state(shell: &impl ShellExecutor) -> Result<Result<(), &'static str>> {
    if !remote::probe(shell, &cmd::binaries_present(BASELINE_BINARIES)).await? {
        return Ok(Err("baseline binaries missing"));
    }
    if !remote::probe(shell, &cmd::certbot_nginx_plugin_present()).await? {
        return Ok(Err("certbot nginx plugin missing"));
    }
    Ok(Ok(()))
}

/// # Errors
///
/// Returns an error only on transport failure.
pub async fn repo_state(shell: &impl ShellExecutor, path: &str) -> Result<RepoState> {
    if remote::probe(shell, &cmd::is_dir(&format!("{path}/.git"))).await? {
        Ok(RepoState::Repository)
    } else if remote::probe(shell, &cmd::exists(path)).await? {
        Ok(RepoState::NotRepository)
    } else {
        Ok(RepoState::Absent)
    }
}

/// Evaluate the precondition of `step` without changing the host.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn check(
    shell: &impl ShellExecutor,
    ctx: &StepContext<'_>,
    step: StepId,
) -> Result<StepStatus> {
    let deploy = ctx.deploy;
    let status = match step {
        StepId::Packages => match baseline_state(shell).await? {
            Ok(()) => StepStatus::Satisfied(format!(
                "{} and the certbot nginx plugin present",
                BASELINE_BINARIES.join(", ")
            )),
            Err(missing) => StepStatus::Pending(missing.to_string()),
        },
        StepId::Docker => {
            if !remote::probe(shell, &cmd::docker_present()).await? {
                StepStatus::Pending("docker not installed".to_string())
            } else if !remote::probe(shell, &cmd::docker_ready()).await? {
                StepStatus::Pending("docker installed but the daemon is not answering".to_string())
            } else {
                StepStatus::Satisfied("docker running".to_string())
            }
        }
        StepId::Compose => match detect_compose(shell).await? {
            Some(compose) => StepStatus::Satisfied(format!("`{compose}` available")),
            None => StepStatus::Pending("no compose command found".to_string()),
        },
        StepId::Source => StepStatus::Pending(match repo_state(shell, &deploy.path).await? {
            RepoState::Repository => format!("{} is a checkout; will update", deploy.path),
            RepoState::NotRepository => {
                format!("{} exists but is not a checkout; will replace", deploy.path)
            }
            RepoState::Absent => format!("will clone into {}", deploy.path),
        }),
        StepId::Artifacts | StepId::Proxy | StepId::Services => {
            StepStatus::Pending("always applied".to_string())
        }
        StepId::Certificate => {
            if remote::probe(shell, &cmd::certificate_present(&deploy.domain)).await? {
                StepStatus::Pending("certificate exists; renewed only when expiring".to_string())
            } else {
                StepStatus::Pending("no certificate issued yet".to_string())
            }
        }
    };
    tracing::debug!(%step, ?status, "precondition checked");
    Ok(status)
}

// ── Sequencer ────────────────────────────────────────────────────────────────

/// Run the whole sequence against one host.
///
/// # Errors
///
/// Returns the first fatal failure; nothing after the failing step runs.
pub async fn provision(
    host: &impl RemoteHost,
    local: &impl LocalFiles,
    opts: ProvisionOptions<'_, impl ProgressReporter>,
) -> Result<RunReport> {
    let ProvisionOptions {
        reporter,
        deploy,
        target,
    } = opts;

    let os = probe_os(host).await?;
    reporter.success(&format!("connected to {target} ({os})"));

    let mut run = Run {
        host,
        local,
        reporter,
        ctx: StepContext { deploy, os },
        report: RunReport::new(target, &deploy.domain),
    };
    run.report.os = Some(os);

    for step in StepId::ORDER {
        run.run_step(step)
            .instrument(tracing::info_span!("step", %step))
            .await?;
    }
    Ok(run.report)
}

/// Check every step's precondition and report, changing nothing.
///
/// # Errors
///
/// Returns an error only on transport failure.
pub async fn plan(
    shell: &impl ShellExecutor,
    deploy: &DeployParams,
    target: &str,
) -> Result<PlanReport> {
    let os = probe_os(shell).await?;
    let ctx = StepContext { deploy, os };
    let mut steps = Vec::with_capacity(StepId::ORDER.len());
    for step in StepId::ORDER {
        steps.push((step, check(shell, &ctx, step).await?));
    }
    Ok(PlanReport {
        host: target.to_string(),
        os,
        steps,
    })
}

struct Run<'a, H, L, R> {
    host: &'a H,
    local: &'a L,
    reporter: &'a R,
    ctx: StepContext<'a>,
    report: RunReport,
}

impl<H: RemoteHost, L: LocalFiles, R: ProgressReporter> Run<'_, H, L, R> {
    async fn run_step(&mut self, step: StepId) -> Result<()> {
        self.reporter.step(step.describe());
        let status = check(self.host, &self.ctx, step).await?;

        let (outcome, attempts) = if status.is_satisfied() {
            (StepOutcome::Skipped(status.detail().to_string()), Vec::new())
        } else {
            self.apply(step).await?
        };

        match &outcome {
            StepOutcome::Skipped(detail) => {
                self.reporter.success(&format!("{step}: already satisfied ({detail})"));
            }
            StepOutcome::Applied(detail) => self.reporter.success(&format!("{step}: {detail}")),
            StepOutcome::Degraded(detail) => self.reporter.warn(&format!("{step}: {detail}")),
        }
        tracing::info!(%step, ?outcome, "step finished");
        self.report.steps.push(StepRecord {
            step,
            outcome,
            attempts,
        });
        Ok(())
    }

    async fn apply(&mut self, step: StepId) -> Result<StepResult> {
        match step {
            StepId::Packages => self.install_packages().await,
            StepId::Docker => self.ensure_docker().await,
            StepId::Compose => self.ensure_compose().await,
            StepId::Source => self.sync_source().await,
            StepId::Artifacts => self.write_artifacts().await,
            StepId::Proxy => {
                let site = artifacts::proxy_artifact(&self.ctx.deploy.domain);
                let tolerated = apply_proxy_config(self.host, &site).await?;
                self.report.tolerated.extend(tolerated);
                Ok((StepOutcome::Applied(format!("{} active", site.path)), Vec::new()))
            }
            StepId::Services => self.start_services().await,
            StepId::Certificate => self.request_certificate().await,
        }
    }

    fn tolerate(&mut self, step: StepId, result: &CommandResult) {
        self.report.tolerated.push(remote::tolerated(step, result));
    }

    async fn install_packages(&mut self) -> Result<StepResult> {
        let mut attempts = Vec::new();
        for group in cmd::baseline_install(self.ctx.os) {
            let alternatives: Vec<_> = group
                .into_iter()
                .map(|(label, command)| Alternative::new(label, command))
                .collect();
            let outcome = run_chain(self.host, StepId::Packages, &alternatives).await?;
            if let Some(failure) = &outcome.last_failure {
                self.tolerate(StepId::Packages, failure);
            }
            attempts.extend(outcome.attempts);
        }

        let outcome = match baseline_state(self.host).await? {
            Ok(()) => StepOutcome::Applied("baseline installed".to_string()),
            Err(missing) => StepOutcome::Degraded(format!("{missing} after install")),
        };
        Ok((outcome, attempts))
    }

    async fn ensure_docker(&mut self) -> Result<StepResult> {
        let installed = if remote::probe(self.host, &cmd::docker_present()).await? {
            false
        } else {
            remote::execute(self.host, StepId::Docker, &cmd::install_docker(), FaultPolicy::Fatal)
                .await?;
            true
        };

        let enable = remote::execute(
            self.host,
            StepId::Docker,
            &cmd::enable_service("docker"),
            FaultPolicy::Tolerated,
        )
        .await?;
        if !enable.success() {
            self.tolerate(StepId::Docker, &enable);
        }

        remote::execute(self.host, StepId::Docker, &cmd::docker_ready(), FaultPolicy::Fatal).await?;
        let detail = if installed {
            "docker installed and running"
        } else {
            "docker daemon started"
        };
        Ok((StepOutcome::Applied(detail.to_string()), Vec::new()))
    }

    async fn ensure_compose(&mut self) -> Result<StepResult> {
        let mut alternatives: Vec<_> = cmd::install_compose_plugin(self.ctx.os)
            .into_iter()
            .map(|(label, install)| {
                Alternative::new(label, install).verified_by(cmd::compose_plugin_version())
            })
            .collect();
        alternatives.push(
            Alternative::new(
                format!("static binary {COMPOSE_VERSION}"),
                cmd::install_compose_binary(),
            )
            .verified_by(cmd::compose_standalone_version()),
        );

        let outcome = run_chain(self.host, StepId::Compose, &alternatives).await?;
        match outcome.winner.clone() {
            Some(winner) => Ok((
                StepOutcome::Applied(format!("installed via {winner}")),
                outcome.attempts,
            )),
            None => Err(outcome.into_fatal(StepId::Compose).into()),
        }
    }

    async fn sync_source(&mut self) -> Result<StepResult> {
        let DeployParams {
            repo, path, branch, ..
        } = self.ctx.deploy;
        let step = StepId::Source;

        match repo_state(self.host, path).await? {
            RepoState::Repository => {
                let alternatives = [
                    Alternative::new("fetch and reset", cmd::git_fetch_reset(path, branch)),
                    Alternative::new("pull --rebase", cmd::git_pull_rebase(path)),
                ];
                let outcome = run_chain(self.host, step, &alternatives).await?;
                let Some(winner) = outcome.winner.clone() else {
                    return Err(outcome.into_fatal(step).into());
                };
                Ok((
                    StepOutcome::Applied(format!("updated {path} via {winner}")),
                    outcome.attempts,
                ))
            }
            RepoState::NotRepository => {
                tracing::warn!(path = %path, "deploy path is not a checkout; replacing it");
                remote::execute(self.host, step, &cmd::remove_tree(path), FaultPolicy::Fatal)
                    .await?;
                remote::execute(self.host, step, &cmd::make_dir(path), FaultPolicy::Fatal).await?;
                remote::execute(
                    self.host,
                    step,
                    &cmd::git_clone(repo, branch, path),
                    FaultPolicy::Fatal,
                )
                .await?;
                Ok((
                    StepOutcome::Applied(format!("replaced {path} with a fresh clone")),
                    Vec::new(),
                ))
            }
            RepoState::Absent => {
                remote::execute(
                    self.host,
                    step,
                    &cmd::make_dir(cmd::parent_dir(path)),
                    FaultPolicy::Fatal,
                )
                .await?;
                remote::execute(
                    self.host,
                    step,
                    &cmd::git_clone(repo, branch, path),
                    FaultPolicy::Fatal,
                )
                .await?;
                Ok((StepOutcome::Applied(format!("cloned into {path}")), Vec::new()))
            }
        }
    }

    async fn write_artifacts(&mut self) -> Result<StepResult> {
        let deploy = self.ctx.deploy;
        let secret = generate_secret();
        let mut written = 0usize;

        for artifact in artifacts::project_artifacts(&deploy.path, &deploy.domain, &secret) {
            if artifact.kind == ArtifactKind::ComposeManifest {
                for definition in self.missing_build_definitions().await? {
                    place(self.host, StepId::Artifacts, &definition).await?;
                    written += 1;
                }
            }
            place(self.host, StepId::Artifacts, &artifact).await?;
            written += 1;
        }
        Ok((StepOutcome::Applied(format!("{written} files written")), Vec::new()))
    }

    /// Build definitions absent on the host that the local checkout can supply.
    async fn missing_build_definitions(&self) -> Result<Vec<Artifact>> {
        let deploy = self.ctx.deploy;
        let root = deploy.local_root.as_deref().unwrap_or(Path::new("."));
        let mut found = Vec::new();

        for rel in BUILD_DEFINITIONS {
            let remote_path = format!("{}/{rel}", deploy.path);
            if remote::probe(self.host, &cmd::is_file(&remote_path)).await? {
                continue;
            }
            let local_path = root.join(rel);
            match self.local.read_optional(&local_path).await? {
                Some(content) => found.push(Artifact {
                    kind: ArtifactKind::BuildDefinition,
                    path: remote_path,
                    content,
                    mode: 0o644,
                }),
                None => {
                    tracing::warn!(rel, local = %local_path.display(), "build definition unavailable");
                    self.reporter.warn(&format!(
                        "{rel} is missing on the host and not found at {}",
                        local_path.display()
                    ));
                }
            }
        }
        Ok(found)
    }

    async fn start_services(&mut self) -> Result<StepResult> {
        let path = &self.ctx.deploy.path;
        let Some(compose) = detect_compose(self.host).await? else {
            bail!("step 'services': no docker compose command available");
        };
        remote::execute(
            self.host,
            StepId::Services,
            &cmd::compose_up(compose, path),
            FaultPolicy::Fatal,
        )
        .await?;
        let ps = remote::execute(
            self.host,
            StepId::Services,
            &cmd::compose_ps(compose, path),
            FaultPolicy::Fatal,
        )
        .await?;
        tracing::info!(status = %ps.stdout.trim_end(), "service status");
        self.report.service_status = Some(ps.stdout);
        Ok((
            StepOutcome::Applied(format!("stack started with `{compose}`")),
            Vec::new(),
        ))
    }

    async fn request_certificate(&mut self) -> Result<StepResult> {
        let DeployParams { domain, email, .. } = self.ctx.deploy;
        let result = remote::execute(
            self.host,
            StepId::Certificate,
            &cmd::certbot(domain, email),
            FaultPolicy::Tolerated,
        )
        .await?;
        if result.success() {
            return Ok((
                StepOutcome::Applied(format!("certificate valid for {domain}")),
                Vec::new(),
            ));
        }
        self.tolerate(StepId::Certificate, &result);
        self.report.manual_followup = Some(cmd::certbot_manual(domain, email));
        Ok((
            StepOutcome::Degraded(
                "certbot failed; rerun it once DNS points at this host".to_string(),
            ),
            Vec::new(),
        ))
    }
}

/// Create the parent directory and write `artifact` atomically.
async fn place(host: &impl RemoteHost, step: StepId, artifact: &Artifact) -> Result<()> {
    remote::execute(
        host,
        step,
        &cmd::make_dir(cmd::parent_dir(&artifact.path)),
        FaultPolicy::Fatal,
    )
    .await?;
    atomic_write::write_file(host, artifact.content.as_bytes(), &artifact.path, artifact.mode)
        .await
        .with_context(|| format!("step '{step}': writing {} to {}", artifact.kind, artifact.path))?;
    tracing::info!(%step, kind = %artifact.kind, path = %artifact.path, "artifact written");
    Ok(())
}

/// Install the nginx site and restart nginx.
///
/// The config is linted before upload and `nginx -t` must pass before the
/// restart; either failure leaves the running nginx untouched.
///
/// # Errors
///
/// Returns an error if the lint, the write, `nginx -t` or the restart fails.
pub async fn apply_proxy_config(
    host: &impl RemoteHost,
    site: &Artifact,
) -> Result<Vec<ToleratedFailure>> {
    artifacts::lint_nginx(&site.content)
        .with_context(|| format!("nginx site for {} failed validation", site.path))?;
    place(host, StepId::Proxy, site).await?;

    let mut tolerated = Vec::new();
    let removed = remote::execute(
        host,
        StepId::Proxy,
        &cmd::remove_default_site(),
        FaultPolicy::Tolerated,
    )
    .await?;
    if !removed.success() {
        tolerated.push(remote::tolerated(StepId::Proxy, &removed));
    }

    remote::execute(host, StepId::Proxy, &cmd::nginx_test(), FaultPolicy::Fatal).await?;
    remote::execute(host, StepId::Proxy, &cmd::nginx_restart(), FaultPolicy::Fatal).await?;
    Ok(tolerated)
}
