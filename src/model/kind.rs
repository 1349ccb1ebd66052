//! Model kinds a spec can be generated for

use serde::{Deserialize, Serialize};
use std::fmt;

/// The four management models expanded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Standalone,
    Profile,
    Domain,
    Host,
}

impl ModelKind {
    /// Expansion order. A later kind may resolve specs and capabilities
    /// registered by an earlier one, never the reverse.
    pub const EXPANSION_ORDER: [ModelKind; 4] = [
        ModelKind::Standalone,
        ModelKind::Profile,
        ModelKind::Domain,
        ModelKind::Host,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Standalone => "standalone",
            ModelKind::Profile => "profile",
            ModelKind::Domain => "domain",
            ModelKind::Host => "host",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
