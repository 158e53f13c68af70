use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::info;

use crate::{LexiconError, Result};

/// Artifact names written between pipeline stages.
pub mod names {
    /// Flattened definitions, lemma → joined glosses.
    pub const DEFS_FULL: &str = "defs_full";
    /// Corpus bags in lookup order.
    pub const DEFS_BOW: &str = "defs_bow";
    pub const LOOKUP_WORD: &str = "lookup_word";
    pub const LOOKUP_ID: &str = "lookup_id";
}

/// Directory of named JSON artifacts (`<dir>/<name>.json`).
#[derive(Clone, Debug)]
pub struct Checkpoints {
    dir: PathBuf,
}

impl Checkpoints {
    /// Use `dir`, creating it if needed.
    pub fn create(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|source| LexiconError::Open {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// Use an existing checkpoint directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.is_dir() {
            return Err(LexiconError::Open {
                path: dir,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Write `value` atomically: readers see either the old or the new file.
    pub fn save<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        info!("saving {} to {}", name, path.display());
        let io_err = |source: std::io::Error| LexiconError::Checkpoint {
            name: name.to_string(),
            source,
        };

        let tmp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        let mut writer = BufWriter::new(&tmp);
        serde_json::to_writer(&mut writer, value).map_err(|source| {
            LexiconError::CheckpointJson {
                name: name.to_string(),
                source,
            }
        })?;
        writer.flush().map_err(io_err)?;
        drop(writer);
        tmp.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.path(name);
        info!("loading {} from {}", name, path.display());
        let file = File::open(&path).map_err(|source| LexiconError::Checkpoint {
            name: name.to_string(),
            source,
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            LexiconError::CheckpointJson {
                name: name.to_string(),
                source,
            }
        })
    }
}
