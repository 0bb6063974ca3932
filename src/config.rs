// Copyright 2024 MiniPy Analyzer Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analyzer::AnalyzerConfig;
use crate::error::{AnalysisError, Result};

/// Default bound on submitted source text
pub const DEFAULT_MAX_SOURCE_BYTES: usize = 64 * 1024;

/// Configuration options for the analysis engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Names used by the semantic check battery
    pub analyzer: AnalyzerConfig,
    /// Largest accepted source in bytes; `None` disables the bound
    pub max_source_bytes: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            max_source_bytes: Some(DEFAULT_MAX_SOURCE_BYTES),
        }
    }
}

impl EngineConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| AnalysisError::config(e.to_string()))
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| AnalysisError::config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&contents)
    }

    /// Set the analyzer configuration
    pub fn with_analyzer(mut self, analyzer: AnalyzerConfig) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set or clear the source size bound
    pub fn with_max_source_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_source_bytes = limit;
        self
    }
}
