//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::GenerationError;

/// Map generation errors to a string for CLI output.
pub fn map_error(e: &GenerationError) -> String {
    match e {
        GenerationError::Conflict(_) => format!("{} (rerun without --strict to overwrite)", e),
        _ => e.to_string(),
    }
}
