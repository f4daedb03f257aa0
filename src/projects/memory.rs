use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::config::ConfigFile;
use crate::errors::{Result, RunnerError};
use crate::projects::{NewProject, ProjectCatalog, ProjectRecord};

/// Process-local catalog, seeded from the config file's projects.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: HashMap<String, ProjectRecord>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: &ConfigFile) -> Self {
        let seeded_at = Utc::now();
        let records = cfg
            .project
            .iter()
            .map(|(id, project)| {
                let record = ProjectRecord {
                    id: id.clone(),
                    name: project.name.clone().unwrap_or_else(|| id.clone()),
                    api_url: project.api_url.clone(),
                    sim_url: project.sim_url.clone(),
                    dsl_config: project.dsl_config.clone(),
                    created_at: seeded_at,
                };
                (id.clone(), record)
            })
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ProjectCatalog for InMemoryCatalog {
    fn fetch(&self, id: &str) -> Result<ProjectRecord> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| RunnerError::ProjectNotFound(id.to_string()))
    }

    fn list(&self) -> Vec<ProjectRecord> {
        let mut all: Vec<ProjectRecord> = self.records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        all
    }

    fn create(&mut self, project: NewProject) -> Result<ProjectRecord> {
        let required = [&project.name, &project.api_url, &project.sim_url];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(RunnerError::Config(
                "name, API URL and sim URL are required".to_string(),
            ));
        }

        let record = ProjectRecord {
            id: Uuid::new_v4().simple().to_string(),
            name: project.name,
            api_url: project.api_url,
            sim_url: project.sim_url,
            dsl_config: project.dsl_config,
            created_at: Utc::now(),
        };
        debug!(id = %record.id, name = %record.name, "project created");
        self.records.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        match self.records.remove(id) {
            Some(_) => {
                debug!(%id, "project deleted");
                Ok(())
            }
            None => Err(RunnerError::ProjectNotFound(id.to_string())),
        }
    }
}
