/*
 * Resolves the per-user directory where ContextYap keeps its state record,
 * configuration and log file, creating it on first use.
 */
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

pub const STATE_FILENAME: &str = "state.json";
pub const LOG_FILENAME: &str = "context_yap.log";

/*
 * Retrieves the application's local (non-roaming) configuration directory,
 * e.g. `~/.config/<app_name>` on Linux or `AppData/Local/<app_name>/config`
 * on Windows. The directory is created if necessary.
 *
 * Returns `None` if the platform offers no home directory or the directory
 * cannot be created.
 */
pub fn get_base_app_config_local_dir(app_name: &str) -> Option<PathBuf> {
    log::trace!("PathUtils: Resolving local config dir for '{app_name}'");
    let proj_dirs = ProjectDirs::from("", "", app_name)?;
    let config_path = proj_dirs.config_local_dir();
    if !config_path.exists() {
        if let Err(e) = fs::create_dir_all(config_path) {
            log::error!("PathUtils: Failed to create config directory {config_path:?}: {e}");
            return None;
        }
        log::debug!("PathUtils: Created config directory {config_path:?}");
    }
    Some(config_path.to_path_buf())
}

pub fn default_state_path(app_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(STATE_FILENAME))
}

pub fn default_log_path(app_name: &str) -> Option<PathBuf> {
    get_base_app_config_local_dir(app_name).map(|dir| dir.join(LOG_FILENAME))
}
