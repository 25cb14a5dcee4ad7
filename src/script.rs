use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

/// A SQL script submitted for conversion.
///
/// Read-only for the engine; created by the caller per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceScript {
    /// Script identifier, usually the file name
    pub name:    Option<String>,
    pub text:    String,
    pub dialect: Dialect
}

impl SourceScript {
    pub fn new(text: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            name: None,
            text: text.into(),
            dialect
        }
    }

    pub fn named(name: impl Into<String>, text: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            name: Some(name.into()),
            text: text.into(),
            dialect
        }
    }

    /// Identifier used in batch summaries; `script-<n>` when unnamed
    pub fn id(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("script-{}", index + 1))
    }
}
