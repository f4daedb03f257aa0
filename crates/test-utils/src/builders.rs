#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use runwatch::config::{
    ConfigFile, ConfirmSection, ProjectConfig, ProtocolSection, RawConfigFile, ServiceSection,
};
use runwatch::types::AnswerPolicy;
use serde_json::Value;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                service: ServiceSection::default(),
                confirm: ConfirmSection::default(),
                protocol: ProtocolSection::default(),
                project: BTreeMap::new(),
            },
        }
    }

    pub fn with_project(mut self, id: &str, project: ProjectConfig) -> Self {
        self.config.project.insert(id.to_string(), project);
        self
    }

    pub fn with_policy(mut self, policy: AnswerPolicy) -> Self {
        self.config.confirm.policy = policy;
        self
    }

    pub fn with_sentinel_prefix(mut self, prefix: &str) -> Self {
        self.config.protocol.sentinel_prefix = prefix.to_string();
        self
    }

    pub fn with_connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.service.connect_timeout_ms = Some(ms);
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProjectConfig`.
pub struct ProjectConfigBuilder {
    project: ProjectConfig,
}

impl ProjectConfigBuilder {
    pub fn new(api_url: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: None,
                api_url: api_url.to_string(),
                sim_url: "http://localhost:8080".to_string(),
                dsl_path: None,
                screw_holes_path: None,
                dsl_config: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.project.name = Some(name.to_string());
        self
    }

    pub fn sim_url(mut self, url: &str) -> Self {
        self.project.sim_url = url.to_string();
        self
    }

    pub fn dsl_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project.dsl_path = Some(path.into());
        self
    }

    pub fn screw_holes_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project.screw_holes_path = Some(path.into());
        self
    }

    pub fn dsl_config(mut self, value: Value) -> Self {
        self.project.dsl_config = Some(value);
        self
    }

    pub fn build(self) -> ProjectConfig {
        self.project
    }
}
