use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_OPACITY: f64 = 0.85;
pub const MIN_OPACITY: f64 = 0.15;
pub const MAX_OPACITY: f64 = 1.0;
pub const DEFAULT_WIDTH: u32 = 200;
pub const DEFAULT_HEIGHT: u32 = 400;

// Shown for a cold item whose stored record lost its content field.
pub const NO_CONTENT_PLACEHOLDER: &str = "[No content available]";

/*
 * What an item carries. A live link is re-read from disk whenever its content
 * is needed; a cold copy holds the text captured at creation time.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    LiveLink { path: PathBuf, is_dir: bool },
    ColdCopy { content: String, is_dir: bool },
}

impl ItemPayload {
    pub fn is_link(&self) -> bool {
        matches!(self, ItemPayload::LiveLink { .. })
    }

    pub fn is_dir(&self) -> bool {
        match self {
            ItemPayload::LiveLink { is_dir, .. } | ItemPayload::ColdCopy { is_dir, .. } => *is_dir,
        }
    }
}

/*
 * A single entry in the context list. Identity is the `(name, is_link)` pair;
 * the item store guarantees that no two items share it.
 *
 * On disk the payload is flattened into the `is_link`/`is_dir`/`link_path`/
 * `content` fields of the state record, see `StoredItem`.
 */
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredItem", into = "StoredItem")]
pub struct ContextItem {
    pub name: String,
    pub payload: ItemPayload,
    pub checked: bool,
}

impl ContextItem {
    pub fn live_link(name: impl Into<String>, path: PathBuf, is_dir: bool) -> Self {
        ContextItem {
            name: name.into(),
            payload: ItemPayload::LiveLink { path, is_dir },
            checked: false,
        }
    }

    pub fn cold_copy(name: impl Into<String>, content: impl Into<String>, is_dir: bool) -> Self {
        ContextItem {
            name: name.into(),
            payload: ItemPayload::ColdCopy {
                content: content.into(),
                is_dir,
            },
            checked: false,
        }
    }

    pub fn is_link(&self) -> bool {
        self.payload.is_link()
    }

    pub fn is_dir(&self) -> bool {
        self.payload.is_dir()
    }

    pub fn link_path(&self) -> Option<&Path> {
        match &self.payload {
            ItemPayload::LiveLink { path, .. } => Some(path),
            ItemPayload::ColdCopy { .. } => None,
        }
    }

    pub fn stored_content(&self) -> Option<&str> {
        match &self.payload {
            ItemPayload::LiveLink { .. } => None,
            ItemPayload::ColdCopy { content, .. } => Some(content),
        }
    }

    /// True if this item is the one addressed by the composite key.
    pub fn matches(&self, name: &str, is_link: bool) -> bool {
        self.name == name && self.is_link() == is_link
    }
}

// The flat record layout. Every field except `name` may be missing in older files.
#[derive(Debug, Serialize, Deserialize)]
struct StoredItem {
    name: String,
    #[serde(default)]
    is_link: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default)]
    checked: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl From<StoredItem> for ContextItem {
    fn from(stored: StoredItem) -> Self {
        let payload = if stored.is_link {
            if stored.link_path.is_none() {
                log::warn!(
                    "ContextItem: Live item '{}' has no link_path in the state record.",
                    stored.name
                );
            }
            ItemPayload::LiveLink {
                path: stored.link_path.unwrap_or_default(),
                is_dir: stored.is_dir,
            }
        } else {
            ItemPayload::ColdCopy {
                content: stored
                    .content
                    .unwrap_or_else(|| NO_CONTENT_PLACEHOLDER.to_string()),
                is_dir: stored.is_dir,
            }
        };
        ContextItem {
            name: stored.name,
            payload,
            checked: stored.checked,
        }
    }
}

impl From<ContextItem> for StoredItem {
    fn from(item: ContextItem) -> Self {
        let (is_link, is_dir, link_path, content) = match item.payload {
            ItemPayload::LiveLink { path, is_dir } => (true, is_dir, Some(path), None),
            ItemPayload::ColdCopy { content, is_dir } => (false, is_dir, None, Some(content)),
        };
        StoredItem {
            name: item.name,
            is_link,
            is_dir,
            link_path,
            content,
            checked: item.checked,
        }
    }
}

/*
 * The record written to `state.json`. Missing fields fall back to their
 * defaults so that records from older versions (or hand-edited ones) load.
 */
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub items: Vec<ContextItem>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

impl Default for PersistedState {
    fn default() -> Self {
        PersistedState {
            items: Vec::new(),
            opacity: DEFAULT_OPACITY,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

pub fn clamp_opacity(opacity: f64) -> f64 {
    if opacity.is_nan() {
        return DEFAULT_OPACITY;
    }
    opacity.clamp(MIN_OPACITY, MAX_OPACITY)
}

/*
 * Window geometry tracked alongside the items. The collapsed flag lives only
 * in memory; while collapsed, the record stores the pre-collapse height so
 * the window reopens expanded.
 */
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowState {
    pub opacity: f64,
    pub width: u32,
    pub height: u32,
    pub is_collapsed: bool,
    pub previous_height: u32,
}

impl WindowState {
    pub fn from_persisted(state: &PersistedState) -> Self {
        WindowState {
            opacity: clamp_opacity(state.opacity),
            width: state.width,
            height: state.height,
            is_collapsed: false,
            previous_height: state.height,
        }
    }

    /// Height to write to disk.
    pub fn persisted_height(&self) -> u32 {
        if self.is_collapsed {
            self.previous_height
        } else {
            self.height
        }
    }
}

impl Default for WindowState {
    fn default() -> Self {
        WindowState::from_persisted(&PersistedState::default())
    }
}
