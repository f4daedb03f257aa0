use crate::config::model::{ConfigFile, ProjectConfig, RawConfigFile};
use crate::errors::{Result, RunnerError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = RunnerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_projects(cfg)?;
    validate_service(cfg)?;
    validate_protocol(cfg)?;
    for (id, project) in cfg.project.iter() {
        validate_project(id, project)?;
    }
    Ok(())
}

fn ensure_has_projects(cfg: &RawConfigFile) -> Result<()> {
    if cfg.project.is_empty() {
        return Err(RunnerError::Config(
            "config must contain at least one [project.<id>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_service(cfg: &RawConfigFile) -> Result<()> {
    if cfg.service.connect_timeout_ms == Some(0) {
        return Err(RunnerError::Config(
            "[service].connect_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_protocol(cfg: &RawConfigFile) -> Result<()> {
    if cfg.protocol.sentinel_prefix.is_empty() {
        return Err(RunnerError::Config(
            "[protocol].sentinel_prefix must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_project(id: &str, project: &ProjectConfig) -> Result<()> {
    validate_url(id, "api_url", &project.api_url)?;
    validate_url(id, "sim_url", &project.sim_url)?;

    if let Some(name) = project.name.as_deref() {
        if name.trim().is_empty() {
            return Err(RunnerError::Config(format!(
                "project '{id}' has an empty `name`"
            )));
        }
    }
    Ok(())
}

/// Require a non-empty `http://` or `https://` URL.
pub fn validate_url(project: &str, field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RunnerError::Config(format!(
            "project '{project}' is missing `{field}`"
        )));
    }
    let has_host = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(RunnerError::Config(format!(
            "project '{project}' has invalid `{field}` '{value}' (expected http:// or https:// URL)"
        )));
    }
    Ok(())
}
