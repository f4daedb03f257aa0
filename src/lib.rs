// src/lib.rs

pub mod cli;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod payload;
pub mod projects;
pub mod protocol;
pub mod stream;
pub mod transport;
pub mod types;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::config::{ConfigFile, ProjectConfig};
use crate::confirm::ConfirmationPrompt;
use crate::engine::{SessionEvent, WorkflowSession};
use crate::payload::{PayloadSources, resolve_payload};
use crate::projects::{InMemoryCatalog, ProjectCatalog, ProjectRecord};
use crate::protocol::{RUN_WORKFLOW_PATH, RunPayload, endpoint_url};
use crate::stream::SentinelClassifier;
use crate::transport::{HttpTransport, HttpTransportOptions, WorkflowTransport};
use crate::types::RunPhase;

/// Entry point used by `main.rs`: resolve the project and payload from
/// config and flags, then follow one run against the HTTP service.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone();
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;
    let catalog = InMemoryCatalog::from_config(&cfg);

    if args.list_projects {
        print_projects(&catalog);
        return Ok(());
    }

    let project_id = select_project(&cfg, args.project.as_deref())?;
    let record = catalog.fetch(&project_id)?;
    let project_cfg = cfg
        .project
        .get(&project_id)
        .with_context(|| format!("project '{project_id}' missing from config"))?;

    let base_dir = config_root_dir(&config_path);
    let dsl_override = args.dsl.as_deref().map(Path::new);
    let screw_holes_override = args.screw_holes.as_deref().map(Path::new);
    let payload = resolve_payload(PayloadSources {
        dsl_override,
        screw_holes_override,
        project: project_cfg,
        record: &record,
        base_dir: &base_dir,
    })?;

    let endpoint = args
        .endpoint
        .clone()
        .unwrap_or_else(|| record.api_url.clone());
    let policy = args.answer_policy().unwrap_or(cfg.confirm.policy);

    if args.dry_run {
        print_dry_run(&record, project_cfg, &endpoint, &payload)?;
        return Ok(());
    }

    let transport =
        HttpTransport::with_options(endpoint.as_str(), HttpTransportOptions::from(&cfg.service))?;
    let classifier = SentinelClassifier::with_prefix(cfg.protocol.sentinel_prefix.clone());
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<SessionEvent>();
    let mut session = WorkflowSession::with_classifier(transport, classifier).with_event_sink(event_tx);

    // Ctrl-C → cooperative cancellation of the active run.
    {
        let token = session.cancel_token();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    info!(project = %record.id, %endpoint, ?policy, "starting workflow");
    let mut prompt = ConfirmationPrompt::new(policy, BufReader::new(tokio::io::stdin()));
    let outcome = drive_session(&mut session, payload, &mut prompt, &mut event_rx).await;
    print_events(&mut event_rx);

    match outcome? {
        RunPhase::Completed => {
            info!("workflow completed");
            Ok(())
        }
        RunPhase::Cancelled => {
            info!("workflow cancelled");
            Ok(())
        }
        other => bail!("workflow ended in unexpected phase {other}"),
    }
}

/// Run one workflow to a terminal phase, answering confirmation requests
/// through `prompt`.
///
/// Input ending before a decision is given abandons the run.
pub async fn drive_session<T, R>(
    session: &mut WorkflowSession<T>,
    payload: RunPayload,
    prompt: &mut ConfirmationPrompt<R>,
    events: &mut mpsc::UnboundedReceiver<SessionEvent>,
) -> errors::Result<RunPhase>
where
    T: WorkflowTransport,
    R: AsyncBufRead + Unpin,
{
    session.start(payload).await?;
    let token = session.cancel_token();

    loop {
        let phase = session.pump().await?;
        print_events(events);

        if phase != RunPhase::AwaitingConfirmation {
            return Ok(phase);
        }

        let Some(request) = session.pending_confirmation().cloned() else {
            return Err(errors::RunnerError::ProtocolViolation(
                "paused without a pending confirmation".to_string(),
            ));
        };

        let decision = tokio::select! {
            _ = token.cancelled() => None,
            decision = prompt.decide(&request) => decision?,
        };

        match decision {
            Some(decision) => session.resolve_confirmation(decision).await?,
            None => session.cancel()?,
        }
        print_events(events);
    }
}

/// Write newly appended log lines to stdout.
fn print_events(events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            SessionEvent::LogLine { line, .. } => println!("{line}"),
            SessionEvent::PhaseChanged { run_id, from, to } => {
                debug!(%run_id, %from, %to, "run phase changed");
            }
            SessionEvent::ConfirmationRequested { request, .. } => {
                debug!(description = %request.description, "confirmation requested");
            }
        }
    }
}

/// Pick the project named on the CLI, or the only configured one.
fn select_project(cfg: &ConfigFile, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(id) => Ok(id.to_string()),
        None => match cfg.sole_project() {
            Some(id) => Ok(id.to_string()),
            None => {
                let ids: Vec<&str> = cfg.project.keys().map(String::as_str).collect();
                bail!("several projects configured ({}); pass --project", ids.join(", "))
            }
        },
    }
}

/// Project-relative paths resolve against the config file's directory, or
/// the working directory for a bare file name.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

fn print_projects(catalog: &InMemoryCatalog) {
    println!("projects ({}):", catalog.len());
    for project in catalog.list() {
        println!("  - {} ({})", project.id, project.name);
        println!("      api: {}", project.api_url);
        println!("      sim: {}", project.sim_feed_url());
    }
}

/// Print where the request would go and what it would carry.
fn print_dry_run(
    record: &ProjectRecord,
    project: &ProjectConfig,
    endpoint: &str,
    payload: &RunPayload,
) -> Result<()> {
    println!("runwatch dry-run");
    println!("  project: {} ({})", record.id, record.name);
    println!("  POST {}", endpoint_url(endpoint, RUN_WORKFLOW_PATH));
    if let Some(path) = project.dsl_path.as_ref() {
        println!("  dsl_path: {}", path.display());
    }
    println!("  sim feed: {}", record.sim_feed_url());
    println!();
    println!("{}", serde_json::to_string_pretty(payload)?);

    debug!("dry-run complete (no request sent)");
    Ok(())
}
