/*
 * Turns a dropped file-system path into a new context item. The caller (the
 * item store) owns the collection; this module only decides what the item
 * looks like and, for live links, whether the drop duplicates a link to the
 * same path. Cold copies of files sharing a name are told apart by their
 * enclosing directories.
 *
 * Folder policy: a cold folder drop captures the rendered directory tree. A
 * full text dump of a folder is a separate, explicit action
 * (`build_flattened_item`).
 */
use super::config::YapConfig;
use super::dir_tree::render_tree;
use super::file_reader::read_text_or_placeholder;
use super::flatten::flatten_text_files;
use super::models::ContextItem;
use super::naming::{self, disambiguation_candidates};
use std::fs;
use std::path::{Path, PathBuf};

pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

pub fn build_dropped_item(
    existing: &[ContextItem],
    path: &Path,
    as_link: bool,
    config: &YapConfig,
) -> Option<ContextItem> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            log::warn!("Ingest: Cannot inspect dropped path {path:?}: {e}");
            return None;
        }
    };

    match (metadata.is_dir(), as_link) {
        (true, true) => live_link_item(existing, path, true),
        (true, false) => cold_tree_item(existing, path, config),
        (false, true) => live_link_item(existing, path, false),
        (false, false) => cold_file_item(existing, path),
    }
}

/*
 * Builds the folder-flatten item: every allowed-extension file below `path`
 * concatenated into one cold item. `None` when `path` is not a folder or no
 * file matched.
 */
pub fn build_flattened_item(
    existing: &[ContextItem],
    path: &Path,
    config: &YapConfig,
) -> Option<ContextItem> {
    if !path.is_dir() {
        log::warn!("Ingest: Cannot flatten {path:?}, it is not a directory.");
        return None;
    }
    let content = flatten_text_files(path, &config.text_extensions, &config.blocked_prefixes)?;
    let name = naming::unique_name(
        existing,
        &naming::marked_prefix(&naming::folder_base_name(path)),
    );
    Some(ContextItem::cold_copy(name, content, true))
}

fn live_link_item(existing: &[ContextItem], path: &Path, is_dir: bool) -> Option<ContextItem> {
    let absolute = absolute_path(path);
    let base = if is_dir {
        naming::folder_base_name(&absolute)
    } else {
        naming::file_base_name(&absolute)
    };
    let name = pick_name(existing, &absolute, &base, true, |item| {
        item.link_path() == Some(absolute.as_path())
    })?;
    Some(ContextItem::live_link(name, absolute, is_dir))
}

fn cold_file_item(existing: &[ContextItem], path: &Path) -> Option<ContextItem> {
    let absolute = absolute_path(path);
    let content = read_text_or_placeholder(&absolute);
    let base = naming::file_base_name(&absolute);
    // Cold items keep no source path, so a taken name only means "try the next candidate".
    let name = pick_name(existing, &absolute, &base, false, |_| false)?;
    Some(ContextItem::cold_copy(name, content, false))
}

fn cold_tree_item(existing: &[ContextItem], path: &Path, config: &YapConfig) -> Option<ContextItem> {
    let absolute = absolute_path(path);
    let tree = render_tree(
        &absolute,
        config.max_tree_depth,
        &config.excluded_dir_names,
        &config.blocked_prefixes,
    );
    let name = naming::unique_name(
        existing,
        &naming::marked_prefix(&naming::folder_base_name(&absolute)),
    );
    Some(ContextItem::cold_copy(name, tree, true))
}

/*
 * Walks the disambiguation candidates for `path` and returns the first name
 * whose `(name, is_link)` key is free. Hitting an item that `is_duplicate`
 * recognises as the same source ends the walk with `None`, as does running
 * out of enclosing directories.
 */
fn pick_name(
    existing: &[ContextItem],
    path: &Path,
    base: &str,
    is_link: bool,
    is_duplicate: impl Fn(&ContextItem) -> bool,
) -> Option<String> {
    for candidate in disambiguation_candidates(base, path) {
        match existing.iter().find(|item| item.matches(&candidate, is_link)) {
            None => return Some(candidate),
            Some(item) if is_duplicate(item) => {
                log::info!("Ingest: {path:?} is already present as '{}'.", item.name);
                return None;
            }
            Some(_) => continue,
        }
    }
    log::info!("Ingest: No free name left for {path:?}.");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::tempdir;

    #[test]
    fn test_cold_file_named_by_stem_with_content() -> io::Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("notes.md");
        fs::write(&file, "remember")?;

        let item = build_dropped_item(&[], &file, false, &YapConfig::default()).unwrap();

        assert_eq!(item.name, "notes");
        assert!(!item.is_link());
        assert_eq!(item.stored_content(), Some("remember"));
        Ok(())
    }

    #[test]
    fn test_cold_file_name_collision_appends_parent_dir() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("api"))?;
        let first = dir.path().join("main.rs");
        let second = dir.path().join("api").join("main.rs");
        fs::write(&first, "one")?;
        fs::write(&second, "two")?;
        let config = YapConfig::default();

        let a = build_dropped_item(&[], &first, false, &config).unwrap();
        let b = build_dropped_item(std::slice::from_ref(&a), &second, false, &config).unwrap();

        assert_eq!(a.name, "main");
        assert_eq!(b.name, "main-api");
        Ok(())
    }

    #[test]
    fn test_same_stem_and_content_in_other_folder_is_disambiguated() -> io::Result<()> {
        let dir = tempdir()?;
        fs::create_dir_all(dir.path().join("a"))?;
        fs::create_dir_all(dir.path().join("b"))?;
        let first = dir.path().join("a").join("index.js");
        let second = dir.path().join("b").join("index.js");
        fs::write(&first, "")?;
        fs::write(&second, "")?;
        let config = YapConfig::default();

        let a = build_dropped_item(&[], &first, false, &config).unwrap();
        let b = build_dropped_item(std::slice::from_ref(&a), &second, false, &config).unwrap();

        assert_eq!(a.name, "index");
        assert_eq!(b.name, "index-b");
        assert_eq!(b.stored_content(), Some(""));
        Ok(())
    }

    #[test]
    fn test_cold_file_dropped_again_gets_next_candidate() -> io::Result<()> {
        let dir = tempdir()?;
        let folder = dir.path().join("notes");
        fs::create_dir(&folder)?;
        let file = folder.join("a.txt");
        fs::write(&file, "same")?;
        let config = YapConfig::default();

        let first = build_dropped_item(&[], &file, false, &config).unwrap();
        let second = build_dropped_item(std::slice::from_ref(&first), &file, false, &config)
            .unwrap();

        assert_eq!(first.name, "a");
        assert_eq!(second.name, "a-notes");
        Ok(())
    }

    #[test]
    fn test_live_file_stores_absolute_path_only() -> io::Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("live.js");
        fs::write(&file, "x")?;

        let item = build_dropped_item(&[], &file, true, &YapConfig::default()).unwrap();

        assert_eq!(item.name, "live");
        assert!(item.is_link());
        assert!(!item.is_dir());
        assert_eq!(item.link_path(), Some(absolute_path(&file).as_path()));
        assert_eq!(item.stored_content(), None);
        Ok(())
    }

    #[test]
    fn test_same_live_link_twice_is_rejected() -> io::Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("live.js");
        fs::write(&file, "x")?;
        let config = YapConfig::default();

        let first = build_dropped_item(&[], &file, true, &config).unwrap();
        assert!(build_dropped_item(&[first], &file, true, &config).is_none());
        Ok(())
    }

    #[test]
    fn test_live_and_cold_items_may_share_a_name() -> io::Result<()> {
        let dir = tempdir()?;
        let file = dir.path().join("shared.md");
        fs::write(&file, "x")?;
        let config = YapConfig::default();

        let cold = build_dropped_item(&[], &file, false, &config).unwrap();
        let live = build_dropped_item(std::slice::from_ref(&cold), &file, true, &config).unwrap();

        assert_eq!(cold.name, live.name);
        Ok(())
    }

    #[test]
    fn test_live_folder_marked_as_directory() -> io::Result<()> {
        let dir = tempdir()?;
        let folder = dir.path().join("assets");
        fs::create_dir(&folder)?;

        let item = build_dropped_item(&[], &folder, true, &YapConfig::default()).unwrap();

        assert_eq!(item.name, "assets");
        assert!(item.is_link());
        assert!(item.is_dir());
        Ok(())
    }

    #[test]
    fn test_cold_folder_captures_tree_with_marked_name() -> io::Result<()> {
        let dir = tempdir()?;
        let folder = dir.path().join("web");
        fs::create_dir_all(folder.join("src"))?;
        fs::write(folder.join("src").join("index.js"), "x")?;
        let config = YapConfig::default();

        let first = build_dropped_item(&[], &folder, false, &config).unwrap();
        let second = build_dropped_item(std::slice::from_ref(&first), &folder, false, &config)
            .unwrap();

        assert_eq!(first.name, "📎 web-1");
        assert_eq!(second.name, "📎 web-2");
        assert!(first.is_dir());
        assert_eq!(
            first.stored_content(),
            Some("web/\n└── src/\n    └── index.js")
        );
        Ok(())
    }

    #[test]
    fn test_cold_folder_tree_leaves_out_blocked_prefixes() -> io::Result<()> {
        let dir = tempdir()?;
        let folder = dir.path().join("web");
        fs::create_dir_all(folder.join("src").join("locale"))?;
        fs::write(folder.join("src").join("locale").join("strings.js"), "hola")?;
        fs::write(folder.join("src").join("app.js"), "x")?;

        let item = build_dropped_item(&[], &folder, false, &YapConfig::default()).unwrap();

        let tree = item.stored_content().unwrap();
        assert!(!tree.contains("strings.js"));
        assert!(!tree.contains("locale"));
        assert_eq!(tree, "web/\n└── src/\n    └── app.js");
        Ok(())
    }

    #[test]
    fn test_missing_path_creates_nothing() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        assert!(build_dropped_item(&[], &missing, false, &YapConfig::default()).is_none());
    }

    #[test]
    fn test_flattened_item_and_empty_flatten() -> io::Result<()> {
        let dir = tempdir()?;
        let folder = dir.path().join("site");
        fs::create_dir(&folder)?;
        fs::write(folder.join("a.png"), [1u8])?;
        let config = YapConfig::default();

        assert!(build_flattened_item(&[], &folder, &config).is_none());

        fs::write(folder.join("intro.md"), "hi")?;
        let item = build_flattened_item(&[], &folder, &config).unwrap();
        assert_eq!(item.name, "📎 site-1");
        assert_eq!(item.stored_content(), Some("📎 intro.md\n```\nhi\n```"));
        Ok(())
    }
}
