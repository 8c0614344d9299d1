/*
 * This module consolidates the core, presentation-agnostic logic of the
 * application: the item model and its store, ingestion of dropped paths
 * (directory-tree rendering and folder flattening), persistence of the state
 * record, configuration, and the platform collaborators (clipboard, file
 * manager) behind the `*Operations` traits.
 */
pub mod clipboard;
pub mod config;
pub mod desktop;
pub mod dir_tree;
pub mod file_reader;
pub mod flatten;
pub mod ingest;
pub mod item_store;
pub mod models;
pub mod naming;
pub mod path_utils;
pub mod state_manager;

pub use models::{ContextItem, ItemPayload, PersistedState, WindowState};

pub use item_store::{ItemStore, ResolvedItem};

pub use state_manager::{CoreStateManager, StateError, StateManagerOperations};

pub use config::{ConfigError, ConfigManagerOperations, CoreConfigManager, YapConfig};

pub use clipboard::{ClipboardError, ClipboardOperations, CoreClipboard};

pub use desktop::{CoreDesktop, DesktopError, DesktopOperations};

pub use dir_tree::render_tree;
pub use flatten::flatten_text_files;
