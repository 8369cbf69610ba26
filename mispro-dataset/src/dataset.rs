//! Dense record collection and its binary artifact.

use crate::assemble::DatasetRecord;
use crate::error::{ArtifactError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Records indexed by dense id.
///
/// The id of a record is its position, so ids always run from 0 to
/// `len() - 1` with no gaps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<DatasetRecord>,
}

impl Dataset {
    pub fn from_records(records: Vec<DatasetRecord>) -> Self {
        Self { records }
    }

    pub fn get(&self, id: usize) -> Option<&DatasetRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over `(id, record)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DatasetRecord)> {
        self.records.iter().enumerate()
    }

    /// Encode the dataset into `writer`, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<usize> {
        let size =
            bincode::serde::encode_into_std_write(self, &mut writer, bincode::config::standard())?;
        writer.flush().map_err(ArtifactError::Io)?;
        Ok(size)
    }

    /// Decode a dataset previously written with [`Dataset::write_to`].
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let dataset =
            bincode::serde::decode_from_std_read(&mut reader, bincode::config::standard())?;
        Ok(dataset)
    }

    /// Write the artifact to `path`, creating parent directories as needed.
    ///
    /// The dataset is encoded into a temporary file next to `path` and renamed
    /// over it only once encoding succeeds, so a failed save leaves any
    /// existing artifact untouched.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let path = path.as_ref();
        let size = write_atomic(path, |file| self.write_to(BufWriter::new(file)))?;

        tracing::debug!(path = ?path.display(), bytes = size, "dataset written");

        Ok(size)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(ArtifactError::Io)?;
        Self::read_from(BufReader::new(file))
    }
}

/// Run `write` against a temporary file in the target directory, then move it
/// to `path`. The temporary file is removed if `write` or the rename fails.
fn write_atomic<F>(path: &Path, write: F) -> Result<usize>
where
    F: FnOnce(&mut File) -> Result<usize>,
{
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(ArtifactError::Io)?;
            parent
        }
        None => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(ArtifactError::Io)?;
    let size = write(tmp.as_file_mut())?;
    tmp.as_file().sync_all().map_err(ArtifactError::Io)?;
    tmp.persist(path).map_err(|e| ArtifactError::Io(e.error))?;

    Ok(size)
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = (usize, &'a DatasetRecord);
    type IntoIter = std::iter::Enumerate<std::slice::Iter<'a, DatasetRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter().enumerate()
    }
}
