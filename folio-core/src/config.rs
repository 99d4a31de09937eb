//! Run configuration handed to the pipeline at construction time

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Everything one extraction run needs to know up front.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// PDF to read
    pub document_path: PathBuf,
    /// JSON file written on success
    pub output_path: PathBuf,
    /// Upper bound on a single extraction request; `None` waits indefinitely
    pub page_timeout: Option<Duration>,
    /// Model service credential
    pub credential: Credential,
    /// How the aggregator treats header values from later pages
    pub header_policy: HeaderPolicy,
}

/// API key or token. Never printed.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("Credential(<empty>)")
        } else {
            f.write_str("Credential(<redacted>)")
        }
    }
}

/// Header handling across pages. Both policies keep the header of the first
/// page that parses; they differ only in whether later disagreement is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeaderPolicy {
    #[default]
    FirstSuccess,
    WarnOnConflict,
}

impl fmt::Display for HeaderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderPolicy::FirstSuccess => f.write_str("first-success"),
            HeaderPolicy::WarnOnConflict => f.write_str("warn-on-conflict"),
        }
    }
}
