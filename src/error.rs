use std::fmt;
use std::path::PathBuf;

/// The VM's error kinds, matching the exit-code contract in the CLI.
#[derive(Debug)]
pub enum VmError {
    /// An image file could not be opened or read.
    ImageLoad { path: PathBuf, source: std::io::Error },

    /// No image paths were given on the command line.
    Usage,

    /// The process received `SIGINT` while the VM was running.
    Interrupted,
}

impl VmError {
    /// The process exit code this error should be reported with.
    pub fn exit_code(&self) -> i32 {
        match self {
            VmError::ImageLoad { .. } => 1,
            VmError::Usage => 2,
            VmError::Interrupted => 130, // 128 + SIGINT, matching shell convention
        }
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VmError::ImageLoad { path, source } => {
                write!(f, "failed to load image {}: {}", path.display(), source)
            }
            VmError::Usage => write!(f, "usage: lc3vm IMAGE [IMAGE ...]"),
            VmError::Interrupted => write!(f, "interrupted"),
        }
    }
}

impl std::error::Error for VmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VmError::ImageLoad { source, .. } => Some(source),
            VmError::Usage | VmError::Interrupted => None,
        }
    }
}
