use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    data::UserSnapshot,
    error::{Result, SocialError},
};

use super::SnapshotStore;

const FILE_SUFFIX: &str = "_data";
const FORMAT_VERSION: u32 = 1;

/// One file per user, named `<username>_data`, inside a single directory.
///
/// Each file starts with a big-endian format version followed by the bincode encoded snapshot.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens the store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| SocialError::io(e, &root))?;
        Ok(DirectoryStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, username: &str) -> PathBuf {
        self.root.join(format!("{}{}", username, FILE_SUFFIX))
    }

    /// Removes every stored user.
    pub fn clear(&mut self) -> Result<()> {
        for username in self.stored_usernames()? {
            self.remove_user(&username)?;
        }
        Ok(())
    }

    fn read_snapshot(path: &Path) -> Result<UserSnapshot> {
        let file = File::open(path).map_err(|e| SocialError::io(e, path))?;
        let mut reader = BufReader::new(file);

        let mut buffer = [0u8; 4];
        reader
            .read_exact(&mut buffer)
            .map_err(|e| SocialError::io(e, path))?;
        let version = u32::from_be_bytes(buffer);
        if version != FORMAT_VERSION {
            return Err(SocialError::io(
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("unsupported snapshot version {}", version),
                ),
                path,
            ));
        }

        Ok(bincode::deserialize_from(reader)?)
    }
}

impl SnapshotStore for DirectoryStore {
    fn enumerate_stored_users(
        &self,
    ) -> Result<Box<dyn Iterator<Item = Result<UserSnapshot>> + '_>> {
        let paths: Vec<PathBuf> = self
            .stored_usernames()?
            .iter()
            .map(|username| self.path_for(username))
            .collect();
        Ok(Box::new(
            paths.into_iter().map(|path| Self::read_snapshot(&path)),
        ))
    }

    fn persist_user(&mut self, snapshot: &UserSnapshot) -> Result<()> {
        let path = self.path_for(&snapshot.username);
        let file = File::create(&path).map_err(|e| SocialError::io(e, &path))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(&FORMAT_VERSION.to_be_bytes())
            .map_err(|e| SocialError::io(e, &path))?;
        bincode::serialize_into(&mut writer, snapshot)?;
        writer.flush().map_err(|e| SocialError::io(e, &path))?;

        debug!(path = %path.display(), "user persisted");
        Ok(())
    }

    fn remove_user(&mut self, username: &str) -> Result<()> {
        let path = self.path_for(username);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SocialError::io(e, path)),
        }
    }

    fn stored_usernames(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| SocialError::io(e, &self.root))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SocialError::io(e, &self.root))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(FILE_SUFFIX))
            {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
