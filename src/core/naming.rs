/*
 * Naming rules for context items: the marker prefix carried by generated
 * cold items, unique-name generation, and disambiguation of dropped paths by
 * their surrounding directories. All prefix handling goes through this module
 * so the marker is never applied twice.
 */
use super::models::ContextItem;
use std::path::Path;

pub const NAME_MARKER: &str = "📎 ";

pub fn has_marker(name: &str) -> bool {
    name.starts_with(NAME_MARKER)
}

fn strip_markers(name: &str) -> &str {
    let mut rest = name.trim_start();
    while let Some(stripped) = rest.strip_prefix(NAME_MARKER.trim_end()) {
        rest = stripped.trim_start();
    }
    rest
}

/// Prepends the marker exactly once.
pub fn with_marker(name: &str) -> String {
    format!("{NAME_MARKER}{}", strip_markers(name))
}

/// Prefix handed to `unique_name` for generated items, e.g. `"📎 clipboard-"`.
pub fn marked_prefix(base: &str) -> String {
    format!("{NAME_MARKER}{base}-")
}

/*
 * Computes the name an item should get when renamed to `requested`.
 * Items whose current name carries the marker keep it; others take the
 * trimmed request verbatim. Returns `None` for an effectively empty name.
 */
pub fn normalize_rename(current_name: &str, requested: &str) -> Option<String> {
    let trimmed = requested.trim();
    if strip_markers(trimmed).is_empty() {
        return None;
    }
    if has_marker(current_name) {
        Some(with_marker(trimmed))
    } else {
        Some(trimmed.to_string())
    }
}

/*
 * Returns `"{prefix}{n}"` where `n` starts at one more than the number of
 * items whose name begins with `prefix` and is bumped while the candidate is
 * already taken (gaps left by removals can make the first guess collide).
 * Does not modify anything.
 */
pub fn unique_name(items: &[ContextItem], prefix: &str) -> String {
    let mut count = items
        .iter()
        .filter(|item| item.name.starts_with(prefix))
        .count()
        + 1;
    let mut candidate = format!("{prefix}{count}");
    while items.iter().any(|item| item.name == candidate) {
        count += 1;
        candidate = format!("{prefix}{count}");
    }
    candidate
}

/// Base name of a dropped file: the file name without its extension.
pub fn file_base_name(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Base name of a dropped folder.
pub fn folder_base_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/*
 * Candidate names for a dropped path, from shortest to longest: the base
 * name, then the base name followed by each enclosing directory name walking
 * upward (`main`, `main-src`, `main-src-project`, ...).
 */
pub fn disambiguation_candidates(base: &str, path: &Path) -> Vec<String> {
    let mut candidates = vec![base.to_string()];
    let mut current = base.to_string();
    let Some(parent) = path.parent() else {
        return candidates;
    };
    for ancestor in parent.ancestors() {
        let Some(dir_name) = ancestor.file_name() else {
            continue;
        };
        current = format!("{current}-{}", dir_name.to_string_lossy());
        candidates.push(current.clone());
    }
    candidates
}
