//! Logical identifiers for stack resources.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Identifier of a resource inside one stack.
///
/// Logical ids are alphanumeric only; anything else a caller hands in is
/// folded into PascalCase words (`"data/{schemaId}"` → `"DataSchemaId"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Build an id from free-form name parts.
    pub fn from_parts<S: AsRef<str>>(parts: &[S]) -> Self {
        let mut out = String::new();
        for part in parts {
            for word in part.as_ref().split(|c: char| !c.is_ascii_alphanumeric()) {
                let mut chars = word.chars();
                if let Some(first) = chars.next() {
                    out.push(first.to_ascii_uppercase());
                    out.extend(chars);
                }
            }
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Same id with a numeric disambiguation suffix.
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}{}", self.0, n))
    }
}

impl core::fmt::Display for LogicalId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LogicalId {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = Self::from_parts(&[s]);
        if id.is_empty() {
            return Err(BuildError::configuration(format!(
                "logical id must contain at least one alphanumeric character: {s:?}"
            )));
        }
        Ok(id)
    }
}

impl From<&str> for LogicalId {
    fn from(value: &str) -> Self {
        Self::from_parts(&[value])
    }
}

impl From<String> for LogicalId {
    fn from(value: String) -> Self {
        Self::from_parts(&[value])
    }
}
