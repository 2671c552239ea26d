//! Provenance context tokens carried by rows.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque provenance token attached to every row.
///
/// Carries the identity of the producing stage and the chain of predecessor
/// identities. There is no ordering contract and no equality contract beyond
/// identity comparison; every stage that does not explicitly fork a context
/// passes it through unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataContext {
    pub id: String,
    #[serde(default)]
    pub predecessors: Vec<String>,
}

impl DataContext {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            predecessors: Vec::new(),
        }
    }

    /// Generates a fresh context with a timestamp-sortable identity.
    pub fn generate() -> Self {
        Self::new(Uuid::now_v7().to_string())
    }

    /// Forks this context: the child records the parent chain.
    pub fn branch(&self, id: impl Into<String>) -> Self {
        let mut predecessors = self.predecessors.clone();
        predecessors.push(self.id.clone());
        Self {
            id: id.into(),
            predecessors,
        }
    }
}

impl Default for DataContext {
    fn default() -> Self {
        Self::generate()
    }
}
