/*
 * Opens a location in the platform's file manager. Used by "go to
 * directory"; the spawned process is not waited on.
 */
use std::io;
use std::path::Path;
use std::process::Command;

#[derive(Debug)]
pub enum DesktopError {
    Io(io::Error),
}

impl From<io::Error> for DesktopError {
    fn from(err: io::Error) -> Self {
        DesktopError::Io(err)
    }
}

impl std::fmt::Display for DesktopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DesktopError::Io(e) => write!(f, "Failed to launch file manager: {e}"),
        }
    }
}

impl std::error::Error for DesktopError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DesktopError::Io(e) => Some(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, DesktopError>;

pub trait DesktopOperations: Send + Sync {
    fn open_path(&self, path: &Path) -> Result<()>;
}

#[derive(Default)]
pub struct CoreDesktop {}

impl CoreDesktop {
    pub fn new() -> Self {
        CoreDesktop {}
    }
}

#[cfg(target_os = "windows")]
fn opener_command() -> Command {
    Command::new("explorer")
}

#[cfg(target_os = "macos")]
fn opener_command() -> Command {
    Command::new("open")
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn opener_command() -> Command {
    Command::new("xdg-open")
}

impl DesktopOperations for CoreDesktop {
    fn open_path(&self, path: &Path) -> Result<()> {
        log::debug!("CoreDesktop: Opening {path:?} in file manager.");
        opener_command().arg(path).spawn()?;
        Ok(())
    }
}
