use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::protocol::CONFIRM_SENTINEL;
use crate::types::AnswerPolicy;

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [service]
/// connect_timeout_ms = 5000
///
/// [confirm]
/// policy = "ask"
///
/// [project.assembly]
/// api_url = "http://localhost:8000"
/// sim_url = "http://localhost:8080"
/// dsl_path = "flows/assembly.dsl"
/// ```
///
/// All sections except `[project.<id>]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub confirm: ConfirmSection,

    #[serde(default)]
    pub protocol: ProtocolSection,

    /// Keys are project ids.
    #[serde(default)]
    pub project: BTreeMap<String, ProjectConfig>,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub service: ServiceSection,
    pub confirm: ConfirmSection,
    pub protocol: ProtocolSection,
    pub project: BTreeMap<String, ProjectConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            service: raw.service,
            confirm: raw.confirm,
            protocol: raw.protocol,
            project: raw.project,
        }
    }

    /// The only project, when exactly one is configured.
    pub fn sole_project(&self) -> Option<&str> {
        if self.project.len() == 1 {
            self.project.keys().next().map(String::as_str)
        } else {
            None
        }
    }
}

/// `[service]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceSection {
    /// Upper bound for establishing a connection. Streams themselves are
    /// never timed out.
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
}

/// `[confirm]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmSection {
    #[serde(default)]
    pub policy: AnswerPolicy,
}

/// `[protocol]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProtocolSection {
    #[serde(default = "default_sentinel_prefix")]
    pub sentinel_prefix: String,
}

fn default_sentinel_prefix() -> String {
    CONFIRM_SENTINEL.to_string()
}

impl Default for ProtocolSection {
    fn default() -> Self {
        Self {
            sentinel_prefix: default_sentinel_prefix(),
        }
    }
}

/// `[project.<id>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectConfig {
    /// Display name; the table key is used when absent.
    #[serde(default)]
    pub name: Option<String>,

    /// Base URL of the execution service.
    pub api_url: String,

    /// Base URL of the simulation camera server.
    pub sim_url: String,

    /// DSL file submitted by default. Relative paths are resolved against
    /// the config file's directory.
    #[serde(default)]
    pub dsl_path: Option<PathBuf>,

    /// Auxiliary `screwHoles` JSON file.
    #[serde(default)]
    pub screw_holes_path: Option<PathBuf>,

    /// Structured seed for the DSL text, rendered as pretty JSON when no
    /// DSL file is given.
    #[serde(default)]
    pub dsl_config: Option<Value>,
}
