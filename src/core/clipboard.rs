/*
 * Access to the system clipboard as plain text. `ClipboardOperations` keeps
 * the logic layer testable; `CoreClipboard` talks to the OS through
 * `arboard`, opening a fresh handle per call.
 */

#[derive(Debug)]
pub enum ClipboardError {
    Unavailable(String),
}

impl From<arboard::Error> for ClipboardError {
    fn from(err: arboard::Error) -> Self {
        ClipboardError::Unavailable(err.to_string())
    }
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

pub type Result<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardOperations: Send + Sync {
    fn get_text(&self) -> Result<String>;
    fn set_text(&self, text: &str) -> Result<()>;
}

#[derive(Default)]
pub struct CoreClipboard {}

impl CoreClipboard {
    pub fn new() -> Self {
        CoreClipboard {}
    }
}

impl ClipboardOperations for CoreClipboard {
    fn get_text(&self) -> Result<String> {
        let mut clipboard = arboard::Clipboard::new()?;
        let text = clipboard.get_text()?;
        log::trace!("CoreClipboard: Read {} bytes.", text.len());
        Ok(text)
    }

    fn set_text(&self, text: &str) -> Result<()> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_owned())?;
        log::trace!("CoreClipboard: Wrote {} bytes.", text.len());
        Ok(())
    }
}
