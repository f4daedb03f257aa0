// src/payload.rs

//! Assemble the `run_workflow` body from its sources.
//!
//! DSL text comes from, in order: an explicit file, the project's
//! `dsl_path`, the project's `dsl_config` seed. Auxiliary `screwHoles` data
//! is optional and comes from an explicit file or the project's
//! `screw_holes_path`.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::config::ProjectConfig;
use crate::errors::{Result, RunnerError};
use crate::projects::ProjectRecord;
use crate::protocol::RunPayload;

/// Where each part of the payload should come from.
#[derive(Debug, Clone, Copy)]
pub struct PayloadSources<'a> {
    /// `--dsl`, relative to the working directory.
    pub dsl_override: Option<&'a Path>,
    /// `--screw-holes`, relative to the working directory.
    pub screw_holes_override: Option<&'a Path>,
    pub project: &'a ProjectConfig,
    pub record: &'a ProjectRecord,
    /// Directory that project-relative paths are resolved against.
    pub base_dir: &'a Path,
}

pub fn resolve_payload(sources: PayloadSources<'_>) -> Result<RunPayload> {
    let dsl = resolve_dsl(&sources)?;
    let mut payload = RunPayload::new(dsl);

    let screw_holes_path = match sources.screw_holes_override {
        Some(path) => Some(path.to_path_buf()),
        None => sources
            .project
            .screw_holes_path
            .as_deref()
            .map(|p| project_path(sources.base_dir, p)),
    };
    if let Some(path) = screw_holes_path {
        payload = payload.with_screw_holes(load_screw_holes(&path)?);
    }

    Ok(payload)
}

fn resolve_dsl(sources: &PayloadSources<'_>) -> Result<String> {
    if let Some(path) = sources.dsl_override {
        return load_dsl(path);
    }
    if let Some(path) = sources.project.dsl_path.as_deref() {
        return load_dsl(&project_path(sources.base_dir, path));
    }
    sources.record.initial_dsl().ok_or_else(|| {
        RunnerError::Config(format!(
            "project '{}' has no DSL: pass --dsl or set `dsl_path` / `dsl_config`",
            sources.record.id
        ))
    })
}

pub fn load_dsl(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)?;
    debug!(path = %path.display(), len = text.len(), "loaded DSL");
    Ok(text)
}

pub fn load_screw_holes(path: &Path) -> Result<Value> {
    let contents = fs::read_to_string(path)?;
    let value = serde_json::from_str(&contents)?;
    debug!(path = %path.display(), "loaded screw holes");
    Ok(value)
}

fn project_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
