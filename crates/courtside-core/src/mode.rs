// Import mode shared by configuration and the import operation.

use serde::{Deserialize, Serialize};

/// How an import combines with the records already loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Discard the current records and keep only the imported ones.
    #[default]
    Replace,
    /// Keep the current records and add the imported ones after them.
    Append,
}

impl ImportMode {
    pub fn label(self) -> &'static str {
        match self {
            ImportMode::Replace => "replace",
            ImportMode::Append => "append",
        }
    }
}
