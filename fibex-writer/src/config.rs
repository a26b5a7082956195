//! Writer configuration types
//!
//! With the defaults, generated elements land in their containers in the same
//! order as in previously generated databases.

use serde::{Deserialize, Serialize};

/// Where generated fragments land inside their container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentOrder {
    /// Insert each fragment at the head of its container (reverse model order)
    #[default]
    Prepend,
    /// Append each fragment to its container (model order)
    Append,
}

/// Configuration for the FIBEX writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Placement of generated fragments inside their containers
    #[serde(default)]
    pub document_order: DocumentOrder,

    /// Check that every `ID-REF` resolves before the document is serialized
    #[serde(default = "default_true")]
    pub verify_references: bool,

    /// Name of the template-only node holding controller defaults
    #[serde(default = "default_scaffold_element")]
    pub scaffold_element: String,
}

fn default_true() -> bool {
    true
}

fn default_scaffold_element() -> String {
    "xls2fbx".to_string()
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            document_order: DocumentOrder::default(),
            verify_references: default_true(),
            scaffold_element: default_scaffold_element(),
        }
    }
}

impl WriterConfig {
    /// Create a new writer configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set fragment placement
    pub fn with_document_order(mut self, order: DocumentOrder) -> Self {
        self.document_order = order;
        self
    }

    /// Builder method: enable or disable the reference check
    pub fn with_reference_check(mut self, enabled: bool) -> Self {
        self.verify_references = enabled;
        self
    }

    /// Builder method: rename the template scaffold node
    pub fn with_scaffold_element(mut self, name: impl Into<String>) -> Self {
        self.scaffold_element = name.into();
        self
    }
}
