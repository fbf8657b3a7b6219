// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Engine configuration.

/// Tunables shared by the tools and the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelerConfig {
    /// Distance below which merged points are considered coincident.
    /// `0.0` merges exact duplicates only.
    pub merge_tolerance: f64,
    /// Arm length of generated angles and size of generated planes.
    pub handle_length: f64,
    /// Upper bound on notification rounds per dispatch.
    pub max_dispatch_rounds: usize,
}

impl ModelerConfig {
    pub const DEFAULT_MERGE_TOLERANCE: f64 = 0.0;
    pub const DEFAULT_HANDLE_LENGTH: f64 = 50.0;
    pub const DEFAULT_MAX_DISPATCH_ROUNDS: usize = 16;

    /// Load configuration from environment variables, falling back to the
    /// defaults for unset or unparsable values.
    pub fn from_env() -> Self {
        Self {
            merge_tolerance: std::env::var("DYNMOD_MERGE_TOLERANCE")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(Self::DEFAULT_MERGE_TOLERANCE),
            handle_length: std::env::var("DYNMOD_HANDLE_LENGTH")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(Self::DEFAULT_HANDLE_LENGTH),
            max_dispatch_rounds: std::env::var("DYNMOD_MAX_DISPATCH_ROUNDS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(Self::DEFAULT_MAX_DISPATCH_ROUNDS),
        }
    }
}

impl Default for ModelerConfig {
    fn default() -> Self {
        Self {
            merge_tolerance: Self::DEFAULT_MERGE_TOLERANCE,
            handle_length: Self::DEFAULT_HANDLE_LENGTH,
            max_dispatch_rounds: Self::DEFAULT_MAX_DISPATCH_ROUNDS,
        }
    }
}
