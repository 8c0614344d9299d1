/*
 * Flattens every text file below a folder into one document. Each matching
 * file contributes a header line with its path relative to the folder (behind
 * the item marker) followed by its content in a fenced block:
 *
 *   📎 src/app.js
 *   ```
 *   ...
 *   ```
 *
 * Subtrees whose relative path starts with a blocked prefix are not entered.
 * Files are visited in file-name order so the output is stable.
 */
use super::file_reader::read_text_or_placeholder;
use super::naming::NAME_MARKER;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const FENCE: &str = "```";

pub fn flatten_text_files(
    root_path: &Path,
    allowed_extensions: &[String],
    blocked_prefixes: &[String],
) -> Option<String> {
    let allowed: Vec<String> = allowed_extensions
        .iter()
        .map(|ext| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect();
    let blocked = blocked_prefix_paths(blocked_prefixes);

    log::debug!(
        "Flatten: Walking {root_path:?} for extensions {allowed:?}, blocking {blocked:?}."
    );

    let walker = WalkDir::new(root_path)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_blocked(root_path, entry.path(), &blocked));

    let mut sections = Vec::new();
    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Flatten: Skipping unreadable entry under {root_path:?}: {e}");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().to_lowercase();
        if !allowed.iter().any(|ext| file_name.ends_with(ext.as_str())) {
            continue;
        }
        let relative = entry.path().strip_prefix(root_path).unwrap_or(entry.path());
        let content = read_text_or_placeholder(entry.path());
        sections.push(format!(
            "{NAME_MARKER}{}\n{FENCE}\n{content}\n{FENCE}",
            display_relative(relative)
        ));
    }

    if sections.is_empty() {
        log::info!("Flatten: No matching files found under {root_path:?}.");
        None
    } else {
        log::debug!("Flatten: Collected {} files from {root_path:?}.", sections.len());
        Some(sections.join("\n\n"))
    }
}

/// Parses configured prefixes such as `"src/locale"` into relative paths; blanks are dropped.
pub fn blocked_prefix_paths(blocked_prefixes: &[String]) -> Vec<PathBuf> {
    blocked_prefixes
        .iter()
        .map(|prefix| prefix.trim().trim_matches('/'))
        .filter(|prefix| !prefix.is_empty())
        .map(PathBuf::from)
        .collect()
}

// Component-wise: `src/locale` blocks `src/locale/en.js` but not `src/locale.js`.
pub fn is_blocked_relative(relative: &Path, blocked: &[PathBuf]) -> bool {
    blocked.iter().any(|prefix| relative.starts_with(prefix))
}

fn is_blocked(root_path: &Path, candidate: &Path, blocked: &[PathBuf]) -> bool {
    let Ok(relative) = candidate.strip_prefix(root_path) else {
        return false;
    };
    is_blocked_relative(relative, blocked)
}

// Forward slashes regardless of platform.
fn display_relative(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn setup_fixture(base: &Path) -> io::Result<()> {
        fs::create_dir_all(base.join("src/locale/en"))?;
        fs::create_dir_all(base.join("src/components"))?;
        fs::write(base.join("README.md"), "readme")?;
        fs::write(base.join("src/app.js"), "console.log('app');")?;
        fs::write(base.join("src/components/Button.JS"), "export default 1;")?;
        fs::write(base.join("src/locale/en/strings.js"), "SECRET_LOCALE")?;
        fs::write(base.join("src/locale.js"), "not blocked")?;
        fs::write(base.join("src/data.json"), "{}")?;
        Ok(())
    }

    #[test]
    fn test_blocked_prefix_content_never_included() -> io::Result<()> {
        let dir = tempdir()?;
        setup_fixture(dir.path())?;

        let flattened = flatten_text_files(
            dir.path(),
            &strings(&[".js", ".md"]),
            &strings(&["src/locale"]),
        )
        .expect("fixture contains matching files");

        assert!(!flattened.contains("SECRET_LOCALE"));
        assert!(!flattened.contains("strings.js"));
        assert!(flattened.contains("📎 src/locale.js"), "prefix match is per component");
        Ok(())
    }

    #[test]
    fn test_flatten_formats_sections_in_name_order() -> io::Result<()> {
        let dir = tempdir()?;
        setup_fixture(dir.path())?;

        let flattened = flatten_text_files(
            dir.path(),
            &strings(&[".js", ".md"]),
            &strings(&["src/locale"]),
        )
        .unwrap();

        let expected = [
            "📎 README.md\n```\nreadme\n```",
            "📎 src/app.js\n```\nconsole.log('app');\n```",
            "📎 src/components/Button.JS\n```\nexport default 1;\n```",
            "📎 src/locale.js\n```\nnot blocked\n```",
        ]
        .join("\n\n");
        assert_eq!(flattened, expected);
        assert!(!flattened.contains("data.json"));
        Ok(())
    }

    #[test]
    fn test_flatten_returns_none_without_matches() -> io::Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("image.png"), [0u8, 1, 2])?;
        assert!(flatten_text_files(dir.path(), &strings(&[".md"]), &[]).is_none());
        Ok(())
    }

    #[test]
    fn test_flatten_fully_blocked_tree_returns_none() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("src/locale"))?;
        fs::write(dir.path().join("src/locale/a.md"), "x")?;
        assert!(
            flatten_text_files(dir.path(), &strings(&[".md"]), &strings(&["src/locale"]))
                .is_none()
        );
        Ok(())
    }
}
