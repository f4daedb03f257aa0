// src/projects/mod.rs

//! Project records: where a workflow is sent and what it starts from.
//!
//! The session never touches these; they only supply the target endpoint
//! and the initial DSL text before a run starts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::Result;

pub mod memory;

pub use memory::InMemoryCatalog;

/// Topic of the simulation camera feed.
pub const SIM_FEED_TOPIC: &str = "/gui_camera/image_raw";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub api_url: String,
    pub sim_url: String,
    pub dsl_config: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// `dsl_config` rendered as the editor would show it (pretty JSON).
    pub fn initial_dsl(&self) -> Option<String> {
        self.dsl_config
            .as_ref()
            .and_then(|cfg| serde_json::to_string_pretty(cfg).ok())
    }

    /// URL of the live camera stream of the simulation.
    pub fn sim_feed_url(&self) -> String {
        format!(
            "{}/stream?topic={}",
            self.sim_url.trim_end_matches('/'),
            SIM_FEED_TOPIC
        )
    }
}

/// Fields required to create a project.
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub api_url: String,
    pub sim_url: String,
    pub dsl_config: Option<Value>,
}

/// Storage of project records.
pub trait ProjectCatalog {
    /// `ProjectNotFound` when `id` is unknown.
    fn fetch(&self, id: &str) -> Result<ProjectRecord>;

    /// All projects, newest first.
    fn list(&self) -> Vec<ProjectRecord>;

    /// Name, API URL and sim URL are required.
    fn create(&mut self, project: NewProject) -> Result<ProjectRecord>;

    fn delete(&mut self, id: &str) -> Result<()>;
}
