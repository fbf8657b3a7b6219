// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI configuration loaded from environment variables.

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Log filter directive for `tracing-subscriber`.
    pub log_filter: String,
    /// Pretty-print the JSON report.
    pub pretty_json: bool,
}

impl Config {
    pub const DEFAULT_LOG_FILTER: &'static str = "info,dynmod_engine=debug";

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            log_filter: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| Self::DEFAULT_LOG_FILTER.into()),
            pretty_json: std::env::var("DYNMOD_PRETTY_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(true),
        }
    }
}
