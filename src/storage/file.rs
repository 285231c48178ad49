use std::{
    fs, io,
    path::{Path, PathBuf},
};

use super::{rle, Snapshot, Storage, StorageError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Rle,
}

/// Keeps the snapshot in a single file, a missing file means nothing was saved.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    format: Format,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>, format: Format) -> Self {
        let path = path.into();
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let payload = match self.format {
            Format::Json => serde_json::to_string(snapshot)?,
            Format::Rle => rle::encode(snapshot)?,
        };
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn restore(&self) -> Result<Option<Snapshot>, StorageError> {
        let payload = match fs::read_to_string(&self.path) {
            Ok(payload) => payload,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };
        let snapshot = match self.format {
            Format::Json => serde_json::from_str(&payload)?,
            Format::Rle => rle::decode(&payload)?,
        };
        Ok(Some(snapshot))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Err(error) if error.kind() != io::ErrorKind::NotFound => Err(error.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use super::*;
    use crate::storage::tests::sample;

    /// removed on drop, even when an assertion fails first.
    struct TempFile(PathBuf);

    impl TempFile {
        fn new(name: &str) -> Self {
            Self(env::temp_dir().join(format!("cellrs-{}-{name}", process::id())))
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    fn round_trip(format: Format, name: &str) {
        let file = TempFile::new(name);
        let mut storage = FileStorage::new(&file.0, format);
        storage.clear().unwrap();
        assert!(storage.restore().unwrap().is_none());

        storage.save(&sample()).unwrap();
        let mut restored = storage.restore().unwrap().unwrap();
        assert_eq!(restored, sample());
        restored.columns_mut()[2][1] = restored.columns()[0][0];
        assert_eq!(restored.columns()[1], sample().columns()[1]);

        storage.clear().unwrap();
        assert!(storage.restore().unwrap().is_none());
        assert!(!storage.path().exists());
    }

    #[test]
    fn json_round_trip() {
        round_trip(Format::Json, "json");
    }

    #[test]
    fn rle_round_trip() {
        round_trip(Format::Rle, "rle");
    }

    #[test]
    fn undecodable_file_is_an_error() {
        let file = TempFile::new("garbage");
        fs::write(&file.0, "3e2").unwrap();
        let storage = FileStorage::new(&file.0, Format::Rle);
        assert!(matches!(storage.restore(), Err(StorageError::Codec(_))));
    }
}
