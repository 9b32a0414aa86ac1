//! Header document parsing.
//!
//! The header is the optional first of two documents in a file. It exists
//! only during the two-pass rendering of that file: its values feed the
//! body's variable environment, and its exclude flag can skip the file
//! entirely.

use serde::Deserialize;

use crate::error::ParseError;
use crate::vars::VarMap;

/// Decoded header document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    /// Variables declared for templating the body.
    #[serde(default)]
    pub values: VarMap,

    /// Whether the whole file should be excluded from processing.
    #[serde(default)]
    pub exclude: bool,
}

impl Header {
    /// Parse a rendered header document.
    ///
    /// An empty document decodes to the zero value; that is not an error.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown top-level fields.
    pub fn parse(data: &str, file: &str) -> Result<Self, ParseError> {
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(data).map_err(|source| ParseError::InvalidDocument {
            file: file.to_string(),
            source,
        })
    }
}
