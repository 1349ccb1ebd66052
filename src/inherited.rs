//! Inherited spec discovery
//!
//! Specs already supplied by a base feature pack are not regenerated. Besides
//! names listed explicitly in configuration, a feature pack directory can be
//! scanned: every directory holding a `spec.json` or `spec.xml` file names an
//! inherited spec.

use crate::error::StorageError;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

const SPEC_FILES: [&str; 2] = ["spec.json", "spec.xml"];

/// Collect the spec names provided by the feature pack at `root`.
pub fn scan_feature_pack(root: &Path) -> Result<BTreeSet<String>, StorageError> {
    let mut names = BTreeSet::new();
    if !root.is_dir() {
        warn!(path = %root.display(), "Feature pack directory not found");
        return Ok(names);
    }

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to walk feature pack {:?}: {}", root, e),
            ))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_spec = entry
            .file_name()
            .to_str()
            .map(|name| SPEC_FILES.contains(&name))
            .unwrap_or(false);
        if !is_spec {
            continue;
        }
        let spec_name = entry
            .path()
            .parent()
            .filter(|dir| *dir != root)
            .and_then(|dir| dir.file_name())
            .and_then(|name| name.to_str());
        if let Some(spec_name) = spec_name {
            names.insert(spec_name.to_string());
        }
    }

    debug!(path = %root.display(), specs = names.len(), "Scanned feature pack");
    Ok(names)
}

/// Union of explicit names and the specs of every listed feature pack.
pub fn collect_inherited<P: AsRef<Path>>(
    explicit: &[String],
    feature_packs: &[P],
) -> Result<BTreeSet<String>, StorageError> {
    let mut names: BTreeSet<String> = explicit.iter().cloned().collect();
    for pack in feature_packs {
        names.extend(scan_feature_pack(pack.as_ref())?);
    }
    Ok(names)
}
