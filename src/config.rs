use crate::error::VmError;
use std::path::PathBuf;

/// Parsed command-line configuration: the list of images to load, in order.
#[derive(Debug, PartialEq)]
pub struct Config {
    pub image_paths: Vec<PathBuf>,
}

impl Config {
    /// Builds a `Config` from the image paths already extracted from argv by
    /// the CLI's argument parser. Empty input is a usage error: at least one
    /// image must be given.
    pub fn with(image_paths: Vec<String>) -> Result<Self, VmError> {
        if image_paths.is_empty() {
            return Err(VmError::Usage);
        }

        Ok(Self {
            image_paths: image_paths.into_iter().map(PathBuf::from).collect(),
        })
    }
}
