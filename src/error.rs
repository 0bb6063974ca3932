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

//! Error types for input rejection and configuration
//!
//! The analysis pipeline itself never fails. These errors cover what happens
//! before it runs: a malformed request, empty or oversized source, or a
//! configuration file that cannot be loaded.

use thiserror::Error;

use crate::report::RejectionResponse;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Reasons to refuse running the pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Request body is not a valid JSON request
    #[error("invalid JSON: {0}")]
    InvalidRequest(#[from] serde_json::Error),

    /// Request carried no source text
    #[error("code must not be empty")]
    EmptySource,

    /// Source text exceeds the configured bound
    #[error("code is {len} bytes, which exceeds the limit of {limit} bytes")]
    SourceTooLarge {
        /// Size of the submitted source
        len: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Configuration could not be read or parsed
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable cause
        message: String,
    },
}

impl AnalysisError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Response body sent instead of a report
    pub fn rejection(&self) -> RejectionResponse {
        RejectionResponse::new(self.to_string())
    }
}
