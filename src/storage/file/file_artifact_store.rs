use crate::common::error::{DeployError, Result};
use crate::traits::artifact_store::ArtifactStore;
use fs2::FileExt;
use std::{
    fs::{self, OpenOptions, create_dir_all},
    io::Write,
    path::{Path, PathBuf},
};

pub struct FileArtifactStore {
    output_dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_owned(),
        }
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!(".{}.tmp", name))
    }

    fn put_object(&self, tmp: &Path, data: &[u8]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(tmp)?;
        file.lock_exclusive()?;
        file.write_all(data)?;
        file.flush()?;
        file.sync_all()?;
        FileExt::unlock(&file)?;
        Ok(())
    }
}

impl ArtifactStore for FileArtifactStore {
    fn write_artifact(&self, name: &str, contents: &[u8]) -> Result<PathBuf> {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            return Err(DeployError::invalid(format!(
                "artifact name {:?} must be a plain file name",
                name
            )));
        }
        create_dir_all(&self.output_dir).map_err(|e| DeployError::io(&self.output_dir, e))?;

        let target = self.artifact_path(name);
        let tmp = self.temp_path(name);
        let written = self
            .put_object(&tmp, contents)
            .and_then(|()| fs::rename(&tmp, &target));
        if let Err(e) = written {
            log::error!("Failed to write {}: {:?}", target.display(), e);
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::debug!("No temp file to clean at {}: {}", tmp.display(), cleanup);
            }
            return Err(DeployError::io(&target, e));
        }
        log::debug!("Wrote {} bytes to {}", contents.len(), target.display());
        Ok(target)
    }
}
