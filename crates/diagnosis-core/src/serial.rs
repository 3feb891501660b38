use std::path::PathBuf;

use tracing::warn;

use crate::error::CoreError;

/// Issues `PREFIX-0001`, `PREFIX-0002`, ... backed by a one-integer text file.
///
/// There is no file locking: concurrent processes sharing the counter file may
/// hand out the same serial. Callers inside one process serialize access.
#[derive(Debug, Clone)]
pub struct SerialAllocator {
    path: PathBuf,
    prefix: String,
}

impl SerialAllocator {
    pub fn new(path: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefix: prefix.into(),
        }
    }

    /// Increment the stored counter and return the formatted serial.
    /// The new value is written before the serial is handed out.
    pub fn next_serial(&self) -> Result<String, CoreError> {
        let next = self.current()? + 1;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, next.to_string())?;
        Ok(format!("{}-{next:04}", self.prefix))
    }

    /// Last issued counter value; missing or garbled files read as zero.
    pub fn current(&self) -> Result<u64, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Ok(content.trim().parse().unwrap_or_else(|_| {
                warn!(path = %self.path.display(), "serial counter unreadable, restarting from zero");
                0
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}
