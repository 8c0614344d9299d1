/*
 * Renders a directory as an indented text tree, the way `tree` prints it:
 *
 *   project/
 *   ├── src/
 *   │   └── main.rs
 *   └── README.md
 *
 * Directories come before files at every level and both groups are sorted by
 * name, so the same directory state always renders the same string. Direct
 * children of the root are depth 0 and directories are expanded while their
 * depth is below `max_depth`, so `max_depth + 1` levels are listed.
 * Directories named in `excluded_dir_names` are listed but not descended
 * into. Entries whose path relative to the root starts with a blocked prefix
 * are left out entirely. A subdirectory that cannot be read is silently left
 * empty.
 */
use super::flatten::{blocked_prefix_paths, is_blocked_relative};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

struct TreeEntry {
    name: String,
    is_dir: bool,
}

struct TreeRules<'a> {
    max_depth: usize,
    excluded_dir_names: &'a [String],
    blocked: Vec<PathBuf>,
}

pub fn render_tree(
    root_path: &Path,
    max_depth: usize,
    excluded_dir_names: &[String],
    blocked_prefixes: &[String],
) -> String {
    log::debug!("DirTree: Rendering {root_path:?} to depth {max_depth}.");
    let rules = TreeRules {
        max_depth,
        excluded_dir_names,
        blocked: blocked_prefix_paths(blocked_prefixes),
    };
    let mut lines = vec![root_label(root_path)];
    append_level(root_path, Path::new(""), "", 0, &rules, &mut lines);
    lines.join("\n")
}

fn root_label(root_path: &Path) -> String {
    let name = root_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root_path.to_string_lossy().into_owned());
    if name.ends_with('/') || name.ends_with('\\') {
        name
    } else {
        format!("{name}/")
    }
}

fn append_level(
    dir: &Path,
    relative_dir: &Path,
    prefix: &str,
    depth: usize,
    rules: &TreeRules,
    lines: &mut Vec<String>,
) {
    if depth > rules.max_depth {
        return;
    }
    let mut entries = match list_sorted_entries(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("DirTree: Omitting unreadable directory {dir:?}: {e}");
            return;
        }
    };
    entries.retain(|entry| {
        let blocked = is_blocked_relative(&relative_dir.join(&entry.name), &rules.blocked);
        if blocked {
            log::trace!("DirTree: Leaving out blocked entry {:?}.", relative_dir.join(&entry.name));
        }
        !blocked
    });

    let count = entries.len();
    for (index, entry) in entries.iter().enumerate() {
        let is_last = index + 1 == count;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        if !entry.is_dir {
            lines.push(format!("{prefix}{connector}{}", entry.name));
            continue;
        }
        lines.push(format!("{prefix}{connector}{}/", entry.name));
        if depth >= rules.max_depth || rules.excluded_dir_names.iter().any(|ex| ex == &entry.name)
        {
            continue;
        }
        let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { PIPE });
        append_level(
            &dir.join(&entry.name),
            &relative_dir.join(&entry.name),
            &child_prefix,
            depth + 1,
            rules,
            lines,
        );
    }
}

// Directories first, then files, each alphabetical. Entries that are neither
// (dangling symlinks, sockets) are dropped.
fn list_sorted_entries(dir: &Path) -> io::Result<Vec<TreeEntry>> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry_result in fs::read_dir(dir)? {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                log::trace!("DirTree: Skipping unreadable entry in {dir:?}: {e}");
                continue;
            }
        };
        let name = entry.file_name().to_string_lossy().into_owned();
        match fs::metadata(entry.path()) {
            Ok(meta) if meta.is_dir() => dirs.push(name),
            Ok(meta) if meta.is_file() => files.push(name),
            Ok(_) => {}
            Err(e) => log::trace!("DirTree: Skipping {name:?} in {dir:?}: {e}"),
        }
    }
    dirs.sort();
    files.sort();
    Ok(dirs
        .into_iter()
        .map(|name| TreeEntry { name, is_dir: true })
        .chain(files.into_iter().map(|name| TreeEntry {
            name,
            is_dir: false,
        }))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::DEFAULT_MAX_TREE_DEPTH;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn setup_fixture(base: &Path) -> io::Result<()> {
        fs::create_dir_all(base.join("src/core/deep"))?;
        fs::create_dir_all(base.join("docs"))?;
        fs::create_dir_all(base.join("node_modules/pkg"))?;
        File::create(base.join("README.md"))?;
        File::create(base.join("Cargo.toml"))?;
        File::create(base.join("src/main.rs"))?;
        File::create(base.join("src/core/mod.rs"))?;
        File::create(base.join("src/core/deep/hidden.rs"))?;
        File::create(base.join("docs/guide.md"))?;
        File::create(base.join("node_modules/pkg/index.js"))?;
        Ok(())
    }

    fn excluded() -> Vec<String> {
        vec!["node_modules".to_string()]
    }

    #[test]
    fn test_render_tree_layout_and_depth_bound() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("project");
        fs::create_dir(&root)?;
        setup_fixture(&root)?;

        let rendered = render_tree(&root, 1, &excluded(), &[]);

        let expected = [
            "project/",
            "├── docs/",
            "│   └── guide.md",
            "├── node_modules/",
            "├── src/",
            "│   ├── core/",
            "│   └── main.rs",
            "├── Cargo.toml",
            "└── README.md",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
        assert!(!rendered.contains("mod.rs"), "third level must not appear");
        assert!(!rendered.contains("index.js"), "excluded dir must not be descended");
        Ok(())
    }

    #[test]
    fn test_render_tree_default_depth_lists_four_levels() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("r");
        fs::create_dir_all(root.join("a/b/c/d"))?;
        File::create(root.join("a/b/c/leaf.txt"))?;
        File::create(root.join("a/b/c/d/deeper.txt"))?;

        let rendered = render_tree(&root, DEFAULT_MAX_TREE_DEPTH, &[], &[]);

        let expected = [
            "r/",
            "└── a/",
            "    └── b/",
            "        └── c/",
            "            ├── d/",
            "            └── leaf.txt",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
        Ok(())
    }

    #[test]
    fn test_render_tree_leaves_out_blocked_prefixes() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("web");
        fs::create_dir_all(root.join("src/locale"))?;
        File::create(root.join("src/locale/strings.js"))?;
        File::create(root.join("src/app.js"))?;
        File::create(root.join("src/locale.js"))?;

        let rendered = render_tree(&root, 3, &[], &["src/locale".to_string()]);

        let expected = ["web/", "└── src/", "    ├── app.js", "    └── locale.js"].join("\n");
        assert_eq!(rendered, expected);
        assert!(!rendered.contains("strings.js"));
        Ok(())
    }

    #[test]
    fn test_render_tree_is_deterministic() -> io::Result<()> {
        let dir = tempdir()?;
        setup_fixture(dir.path())?;
        let first = render_tree(dir.path(), 2, &excluded(), &[]);
        let second = render_tree(dir.path(), 2, &excluded(), &[]);
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_render_tree_last_sibling_uses_blank_continuation() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("r");
        fs::create_dir_all(root.join("only/inner"))?;
        File::create(root.join("only/inner/leaf.txt"))?;

        let rendered = render_tree(&root, 5, &[], &[]);

        let expected = ["r/", "└── only/", "    └── inner/", "        └── leaf.txt"].join("\n");
        assert_eq!(rendered, expected);
        Ok(())
    }

    #[test]
    fn test_render_tree_zero_depth_lists_children_unexpanded() -> io::Result<()> {
        let dir = tempdir()?;
        let root = dir.path().join("shallow");
        fs::create_dir_all(root.join("sub"))?;
        File::create(root.join("sub/inner.txt"))?;
        assert_eq!(render_tree(&root, 0, &[], &[]), "shallow/\n└── sub/");
        Ok(())
    }

    #[test]
    fn test_render_tree_missing_root_renders_label_only() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("gone");
        assert_eq!(render_tree(&missing, 3, &[], &[]), "gone/");
    }
}
