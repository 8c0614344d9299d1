use crate::core::{ClipboardOperations, ContextItem, DesktopOperations, ItemStore};
use std::path::PathBuf;
use std::sync::Arc;

/*
 * A discrete user gesture as reported by the presentation layer. Transient
 * interaction state (for example a drag across several checkboxes) stays in
 * the presentation layer; it arrives here as individual `SetChecked` actions.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    DropPaths { paths: Vec<PathBuf>, as_link: bool },
    FlattenFolder(PathBuf),
    CaptureClipboard,
    SetChecked {
        name: String,
        is_link: bool,
        checked: bool,
    },
    Rename {
        old_name: String,
        is_link: bool,
        new_name: String,
    },
    Remove { keys: Vec<(String, bool)> },
    ClearChecked,
    CopyContext,
    GoToDirectory { name: String, is_link: bool },
    SetOpacity(f64),
    Resize { width: u32, height: u32 },
    SetCollapsed(bool),
}

/*
 * What happened in response to a `UserAction`. After anything other than
 * `Ignored` the presentation layer re-reads the store to refresh its view.
 */
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    ItemsAdded(Vec<ContextItem>),
    Updated,
    Copied { item_count: usize, bytes: usize },
    NothingToCopy,
    Opened(PathBuf),
    Failed(String),
    Ignored,
}

/*
 * Controller between the presentation layer and the item store. It owns the
 * store and the platform collaborators (clipboard, file manager), turns each
 * `UserAction` into store calls, and never calls back into the presentation
 * layer.
 */
pub struct ContextYapLogic {
    store: ItemStore,
    clipboard: Arc<dyn ClipboardOperations>,
    desktop: Arc<dyn DesktopOperations>,
}

impl ContextYapLogic {
    pub fn new(
        store: ItemStore,
        clipboard: Arc<dyn ClipboardOperations>,
        desktop: Arc<dyn DesktopOperations>,
    ) -> Self {
        ContextYapLogic {
            store,
            clipboard,
            desktop,
        }
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    pub fn handle(&mut self, action: UserAction) -> ActionOutcome {
        log::debug!("AppLogic: Handling {action:?}");
        match action {
            UserAction::DropPaths { paths, as_link } => self.process_drops(&paths, as_link),
            UserAction::FlattenFolder(path) => match self.store.flatten_folder(&path) {
                Some(item) => ActionOutcome::ItemsAdded(vec![item]),
                None => ActionOutcome::Ignored,
            },
            UserAction::CaptureClipboard => self.add_clipboard_content(),
            UserAction::SetChecked {
                name,
                is_link,
                checked,
            } => updated_if(self.store.set_checked(&name, is_link, checked)),
            UserAction::Rename {
                old_name,
                is_link,
                new_name,
            } => updated_if(self.store.rename(&old_name, is_link, &new_name)),
            UserAction::Remove { keys } => {
                let mut removed_any = false;
                for (name, is_link) in &keys {
                    removed_any |= self.store.remove(name, *is_link);
                }
                updated_if(removed_any)
            }
            UserAction::ClearChecked => {
                self.store.clear_checked();
                ActionOutcome::Updated
            }
            UserAction::CopyContext => self.copy_context(),
            UserAction::GoToDirectory { name, is_link } => self.go_to_directory(&name, is_link),
            UserAction::SetOpacity(opacity) => {
                self.store.set_opacity(opacity);
                ActionOutcome::Updated
            }
            UserAction::Resize { width, height } => {
                self.store.set_size(width, height);
                ActionOutcome::Updated
            }
            UserAction::SetCollapsed(collapsed) => {
                self.store.set_collapsed(collapsed);
                ActionOutcome::Updated
            }
        }
    }

    fn process_drops(&mut self, paths: &[PathBuf], as_link: bool) -> ActionOutcome {
        let added: Vec<ContextItem> = paths
            .iter()
            .filter_map(|path| self.store.ingest_path(path, as_link))
            .collect();
        log::info!(
            "AppLogic: {} of {} dropped paths added (as_link: {as_link}).",
            added.len(),
            paths.len()
        );
        if added.is_empty() {
            ActionOutcome::Ignored
        } else {
            ActionOutcome::ItemsAdded(added)
        }
    }

    fn add_clipboard_content(&mut self) -> ActionOutcome {
        let text = match self.clipboard.get_text() {
            Ok(text) => text,
            Err(e) => {
                log::warn!("AppLogic: Could not read clipboard: {e}");
                return ActionOutcome::Failed(e.to_string());
            }
        };
        match self.store.capture_text(&text) {
            Some(item) => ActionOutcome::ItemsAdded(vec![item]),
            None => ActionOutcome::Ignored,
        }
    }

    /*
     * Writes the export of the checked items to the clipboard. With nothing
     * checked the clipboard is left untouched.
     */
    fn copy_context(&mut self) -> ActionOutcome {
        let item_count = self.store.items().iter().filter(|i| i.checked).count();
        let text = self.store.export_text();
        if text.is_empty() {
            log::info!("AppLogic: No checked items, clipboard left unchanged.");
            return ActionOutcome::NothingToCopy;
        }
        match self.clipboard.set_text(&text) {
            Ok(()) => {
                log::info!(
                    "AppLogic: Copied {item_count} items ({} bytes) to clipboard.",
                    text.len()
                );
                ActionOutcome::Copied {
                    item_count,
                    bytes: text.len(),
                }
            }
            Err(e) => {
                log::error!("AppLogic: Error copying to clipboard: {e}");
                ActionOutcome::Failed(e.to_string())
            }
        }
    }

    fn go_to_directory(&mut self, name: &str, is_link: bool) -> ActionOutcome {
        let Some(target) = self.store.directory_target(name, is_link) else {
            log::debug!("AppLogic: No directory to open for '{name}' (is_link: {is_link}).");
            return ActionOutcome::Ignored;
        };
        match self.desktop.open_path(&target) {
            Ok(()) => ActionOutcome::Opened(target),
            Err(e) => {
                log::warn!("AppLogic: Failed to open {target:?}: {e}");
                ActionOutcome::Ignored
            }
        }
    }
}

fn updated_if(changed: bool) -> ActionOutcome {
    if changed {
        ActionOutcome::Updated
    } else {
        ActionOutcome::Ignored
    }
}
