use inscribe_render_lopdf::DEFAULT_MEMORY_BUDGET;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Jobs in flight by default: twice the available cores, within 4..=8.
pub fn default_concurrency() -> usize {
    (num_cpus::get() * 2).clamp(4, 8)
}

fn default_memory_budget() -> usize {
    DEFAULT_MEMORY_BUDGET
}

fn default_system_fonts() -> bool {
    true
}

/// Batch settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchConfig {
    /// Maximum number of render jobs in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-job memory budget in bytes.
    #[serde(default = "default_memory_budget")]
    pub job_memory_budget: usize,
    /// Whether installed system fonts are searched.
    #[serde(default = "default_system_fonts")]
    pub system_fonts: bool,
    /// Extra directories scanned for font files.
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            job_memory_budget: default_memory_budget(),
            system_fonts: default_system_fonts(),
            font_dirs: Vec::new(),
        }
    }
}

impl BatchConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
