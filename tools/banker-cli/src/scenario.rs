//! Scenario files
//!
//! A scenario is an `[initial]` table holding the ledger inputs followed by
//! any number of `[[requests]]` entries, processed in file order.

use std::path::Path;

use anyhow::{Context, Result};
use banker_session::banker_core::{InitialState, ProcessId, Units};
use serde::Deserialize;

/// One request line
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScenarioRequest {
    /// Requesting process id
    pub process: usize,
    /// Units requested per resource type
    pub vector: Vec<Units>,
}

impl ScenarioRequest {
    pub fn pid(&self) -> ProcessId {
        ProcessId(self.process)
    }
}

/// Parsed scenario file
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    pub initial: InitialState,
    #[serde(default)]
    pub requests: Vec<ScenarioRequest>,
}

impl Scenario {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }
}
