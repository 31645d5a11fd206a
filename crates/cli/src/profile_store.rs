use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use faceauth_core::shared::constants::{APP_DIR_NAME, PROFILES_FILE_NAME};
use faceauth_core::shared::face_profile::FaceProfile;

#[derive(Error, Debug)]
pub enum ProfileStoreError {
    #[error("failed to read profiles from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt profiles file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode profiles: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write profiles to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine data directory")]
    NoDataDir,
}

pub fn default_path() -> Result<PathBuf, ProfileStoreError> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME).join(PROFILES_FILE_NAME))
        .ok_or(ProfileStoreError::NoDataDir)
}

/// Loads the stored profiles. A missing file is an empty store.
pub fn load(path: &Path) -> Result<Vec<FaceProfile>, ProfileStoreError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No profiles at {}", path.display());
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ProfileStoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&json).map_err(|source| ProfileStoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `profiles` next to `path` and renames over it, so readers never
/// observe a half-written file.
pub fn save(path: &Path, profiles: &[FaceProfile]) -> Result<(), ProfileStoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err(parent))?;
    }

    let json = serde_json::to_string_pretty(profiles).map_err(ProfileStoreError::Encode)?;

    let temp_path = path.with_extension("json.tmp");
    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.sync_all())
        .map_err(write_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, path).map_err(write_err(path))?;
    log::info!("Saved {} profile(s) to {}", profiles.len(), path.display());
    Ok(())
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> ProfileStoreError {
    let path = path.to_path_buf();
    move |source| ProfileStoreError::Write { path, source }
}
