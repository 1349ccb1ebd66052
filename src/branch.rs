//! Branch grouping for spec names
//!
//! Spec names are dot-delimited lineages such as `subsystem.logging.logger`.
//! The branch id truncates a name to a coarser prefix, which is the scope in
//! which structurally identical specs are shared.

/// Return the prefix of `name` ending just before its `(dots + 1)`-th dot,
/// or `name` itself when it has no more than `dots` dots.
///
/// The search always advances past at least one dot, so `dots == 0` yields
/// the first segment.
pub fn branch_id(name: &str, dots: usize) -> &str {
    let mut seen = 0;
    for (index, ch) in name.char_indices() {
        // A leading dot is not a separator
        if ch != '.' || index == 0 {
            continue;
        }
        if seen == dots {
            return &name[..index];
        }
        seen += 1;
    }
    name
}
