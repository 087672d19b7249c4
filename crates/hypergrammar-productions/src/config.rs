//! Configuration for assembling the standard production set.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::boundary_propagation::Prod10;
use crate::error::GrammarResult;
use crate::hexagon_marking::Prod9;
use crate::pattern::CycleSearch;
use crate::production::Production;
use crate::quad_marking::Prod0;

/// Tunables for the built-in productions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarConfig {
    /// Boundary search used by Prod0.
    #[serde(default = "default_prod0_search")]
    pub prod0_search: CycleSearch,
    /// Boundary search used by Prod10.
    #[serde(default = "default_prod10_search")]
    pub prod10_search: CycleSearch,
}

fn default_prod0_search() -> CycleSearch {
    CycleSearch::CanonicalRotation
}

fn default_prod10_search() -> CycleSearch {
    CycleSearch::Exhaustive
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            prod0_search: default_prod0_search(),
            prod10_search: default_prod10_search(),
        }
    }
}

impl GrammarConfig {
    /// Use the canonical-rotation reduction everywhere.
    pub fn fast() -> Self {
        Self {
            prod0_search: CycleSearch::CanonicalRotation,
            prod10_search: CycleSearch::CanonicalRotation,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> GrammarResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), ?config, "grammar_config_loaded");
        Ok(config)
    }

    /// Build `[Prod0, Prod9, Prod10]` with these settings.
    pub fn productions(&self) -> Vec<Arc<dyn Production>> {
        let prod0: Arc<dyn Production> = Arc::new(Prod0::new().with_search(self.prod0_search));
        let prod9: Arc<dyn Production> = Arc::new(Prod9::new());
        let prod10: Arc<dyn Production> =
            Arc::new(Prod10::new().with_search(self.prod10_search));
        vec![prod0, prod9, prod10]
    }
}
