use crate::common::error::Result;
use std::path::PathBuf;

/// Destination for generated artifacts. A write either fully replaces the
/// named artifact or leaves the previous one untouched.
pub trait ArtifactStore {
    fn write_artifact(&self, name: &str, contents: &[u8]) -> Result<PathBuf>;
}
