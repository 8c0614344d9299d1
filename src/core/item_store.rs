/*
 * The ordered collection of context items together with the window state
 * that shares their state record. Every mutating operation rewrites the
 * record through the injected `StateManagerOperations`; a failed write is
 * logged and the in-memory change is kept.
 *
 * Items are addressed by the `(name, is_link)` pair, which the store keeps
 * unique. Operations that cannot apply (unknown key, name collision) are
 * silent no-ops reported through their boolean/`Option` result.
 */
use super::config::YapConfig;
use super::dir_tree::render_tree;
use super::file_reader::read_text_or_placeholder;
use super::flatten::FENCE;
use super::ingest;
use super::models::{ContextItem, ItemPayload, PersistedState, WindowState, clamp_opacity};
use super::naming;
use super::state_manager::StateManagerOperations;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const CLIPBOARD_BASE_NAME: &str = "clipboard";

/*
 * A checked item with its content resolved at the moment of the call: live
 * links are re-read (directories re-rendered), cold items return their
 * stored text.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    pub name: String,
    pub is_link: bool,
    pub is_dir: bool,
    pub path: Option<PathBuf>,
    pub content: String,
}

impl ResolvedItem {
    /// Header line used in the export: the absolute path for live links, the name otherwise.
    pub fn header(&self) -> String {
        match (&self.path, self.is_link) {
            (Some(path), true) => path.to_string_lossy().into_owned(),
            _ => self.name.clone(),
        }
    }
}

pub struct ItemStore {
    items: Vec<ContextItem>,
    window: WindowState,
    config: YapConfig,
    state_manager: Arc<dyn StateManagerOperations>,
}

impl ItemStore {
    /*
     * Loads the persisted record. A load error (other than a missing or
     * corrupt file, which the state manager already turns into defaults) is
     * logged and the store starts empty.
     */
    pub fn open(state_manager: Arc<dyn StateManagerOperations>, config: YapConfig) -> Self {
        let state = match state_manager.load_state() {
            Ok(state) => state,
            Err(e) => {
                log::error!("ItemStore: Failed to load state, starting empty: {e}");
                PersistedState::default()
            }
        };
        let mut store = ItemStore {
            items: Vec::with_capacity(state.items.len()),
            window: WindowState::from_persisted(&state),
            config,
            state_manager,
        };
        for item in state.items {
            if store.find(&item.name, item.is_link()).is_some() {
                log::warn!(
                    "ItemStore: Dropping duplicate item '{}' (is_link: {}) from state record.",
                    item.name,
                    item.is_link()
                );
                continue;
            }
            store.items.push(item);
        }
        log::debug!("ItemStore: Opened with {} items.", store.items.len());
        store
    }

    pub fn items(&self) -> &[ContextItem] {
        &self.items
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn config(&self) -> &YapConfig {
        &self.config
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            items: self.items.clone(),
            opacity: self.window.opacity,
            width: self.window.width,
            height: self.window.persisted_height(),
        }
    }

    fn persist(&self) {
        if let Err(e) = self.state_manager.save_state(&self.snapshot()) {
            log::error!("ItemStore: Failed to save state: {e}");
        }
    }

    fn position(&self, name: &str, is_link: bool) -> Option<usize> {
        self.items.iter().position(|item| item.matches(name, is_link))
    }

    pub fn find(&self, name: &str, is_link: bool) -> Option<&ContextItem> {
        self.items.iter().find(|item| item.matches(name, is_link))
    }

    /*
     * Appends an item. Callers are expected to have picked a free key; an
     * item whose key is already taken is refused so the uniqueness invariant
     * holds regardless.
     */
    pub fn add(&mut self, item: ContextItem) -> bool {
        if self.find(&item.name, item.is_link()).is_some() {
            log::warn!(
                "ItemStore: Refusing to add '{}' (is_link: {}), key already present.",
                item.name,
                item.is_link()
            );
            return false;
        }
        log::debug!("ItemStore: Adding '{}'.", item.name);
        self.items.push(item);
        self.persist();
        true
    }

    pub fn remove(&mut self, name: &str, is_link: bool) -> bool {
        let Some(index) = self.position(name, is_link) else {
            log::debug!("ItemStore: Nothing to remove for '{name}' (is_link: {is_link}).");
            return false;
        };
        self.items.remove(index);
        self.persist();
        true
    }

    pub fn set_checked(&mut self, name: &str, is_link: bool, checked: bool) -> bool {
        let Some(index) = self.position(name, is_link) else {
            log::debug!("ItemStore: Item not found for update: '{name}' (is_link: {is_link}).");
            return false;
        };
        self.items[index].checked = checked;
        self.persist();
        true
    }

    /*
     * Renames an item. The marker prefix is normalized here: an item that
     * carries it keeps exactly one, whatever the caller typed. Fails without
     * changing anything if the item is unknown, the new name is blank, or
     * another item with the same `is_link` already holds the name.
     */
    pub fn rename(&mut self, old_name: &str, is_link: bool, new_name: &str) -> bool {
        let Some(index) = self.position(old_name, is_link) else {
            return false;
        };
        let Some(normalized) = naming::normalize_rename(&self.items[index].name, new_name) else {
            log::debug!("ItemStore: Rejecting blank rename of '{old_name}'.");
            return false;
        };
        let collides = self
            .items
            .iter()
            .enumerate()
            .any(|(i, item)| i != index && item.matches(&normalized, is_link));
        if collides {
            log::debug!("ItemStore: Rename of '{old_name}' to '{normalized}' collides.");
            return false;
        }
        log::debug!("ItemStore: Renaming '{old_name}' to '{normalized}'.");
        self.items[index].name = normalized;
        self.persist();
        true
    }

    pub fn clear_checked(&mut self) {
        for item in self.items.iter_mut() {
            item.checked = false;
        }
        self.persist();
    }

    pub fn generate_unique_name(&self, prefix: &str) -> String {
        naming::unique_name(&self.items, prefix)
    }

    fn resolve(&self, item: &ContextItem) -> ResolvedItem {
        let (path, content) = match &item.payload {
            ItemPayload::LiveLink { path, is_dir: true } => (
                Some(path.clone()),
                render_tree(
                    path,
                    self.config.max_tree_depth,
                    &self.config.excluded_dir_names,
                    &self.config.blocked_prefixes,
                ),
            ),
            ItemPayload::LiveLink {
                path,
                is_dir: false,
            } => (Some(path.clone()), read_text_or_placeholder(path)),
            ItemPayload::ColdCopy { content, .. } => (None, content.clone()),
        };
        ResolvedItem {
            name: item.name.clone(),
            is_link: item.is_link(),
            is_dir: item.is_dir(),
            path,
            content,
        }
    }

    pub fn checked_items(&self) -> Vec<ResolvedItem> {
        self.items
            .iter()
            .filter(|item| item.checked)
            .map(|item| self.resolve(item))
            .collect()
    }

    /*
     * Builds the clipboard payload: for every checked item a header line, the
     * content in a fenced block, and a blank separator line. Empty when
     * nothing is checked.
     */
    pub fn export_text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for item in self.checked_items() {
            lines.push(item.header());
            lines.push(FENCE.to_string());
            lines.push(item.content);
            lines.push(FENCE.to_string());
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Stores clipboard text as a new cold item. Blank text is ignored.
    pub fn capture_text(&mut self, text: &str) -> Option<ContextItem> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            log::debug!("ItemStore: Ignoring empty clipboard capture.");
            return None;
        }
        let name = self.generate_unique_name(&naming::marked_prefix(CLIPBOARD_BASE_NAME));
        let item = ContextItem::cold_copy(name, trimmed, false);
        self.add(item.clone()).then_some(item)
    }

    pub fn ingest_path(&mut self, path: &Path, as_link: bool) -> Option<ContextItem> {
        let item = ingest::build_dropped_item(&self.items, path, as_link, &self.config)?;
        self.add(item.clone()).then_some(item)
    }

    pub fn flatten_folder(&mut self, path: &Path) -> Option<ContextItem> {
        let item = ingest::build_flattened_item(&self.items, path, &self.config)?;
        self.add(item.clone()).then_some(item)
    }

    /*
     * Location "go to directory" should open: a live folder itself, or the
     * folder containing a live file. `None` for cold items and for links
     * whose target no longer exists.
     */
    pub fn directory_target(&self, name: &str, is_link: bool) -> Option<PathBuf> {
        let item = self.find(name, is_link)?;
        let ItemPayload::LiveLink { path, is_dir } = &item.payload else {
            return None;
        };
        if !path.exists() {
            log::debug!("ItemStore: Link target {path:?} no longer exists.");
            return None;
        }
        if *is_dir {
            Some(path.clone())
        } else {
            path.parent().map(Path::to_path_buf)
        }
    }

    /// Returns the opacity actually applied after clamping.
    pub fn set_opacity(&mut self, opacity: f64) -> f64 {
        self.window.opacity = clamp_opacity(opacity);
        self.persist();
        self.window.opacity
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.window.width = width;
        self.window.height = height;
        if !self.window.is_collapsed {
            self.window.previous_height = height;
        }
        self.persist();
    }

    /*
     * Collapsing remembers the current height so it is what gets persisted
     * and restored; expanding brings that height back.
     */
    pub fn set_collapsed(&mut self, collapsed: bool) {
        if collapsed == self.window.is_collapsed {
            return;
        }
        if collapsed {
            self.window.previous_height = self.window.height;
        } else {
            self.window.height = self.window.previous_height;
        }
        self.window.is_collapsed = collapsed;
        self.persist();
    }
}
