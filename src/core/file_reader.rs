use std::fmt::Display;
use std::fs;
use std::path::Path;

pub fn error_placeholder(error: impl Display) -> String {
    format!("[Error reading file: {error}]")
}

/*
 * Reads a whole file as UTF-8 text. A missing file, a permission problem or
 * invalid UTF-8 does not fail the caller; the error description is returned
 * inline as the content instead.
 */
pub fn read_text_or_placeholder(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            log::warn!("FileReader: Failed to read {path:?}: {e}");
            error_placeholder(e)
        }
    }
}
