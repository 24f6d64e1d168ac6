use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use rocket::{serde::json::serde_json, tokio::fs};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::Result;

/// A collection persisted as one pretty-printed JSON document, rewritten in
/// full on every save.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            path: dir.join(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document, or `None` if the file does not exist yet.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Overwrite the document. Writes to a sibling temp file first so a crash
    /// never leaves a half-written collection behind.
    pub async fn save<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        debug!("Saved {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::model::candidate::Candidate;

    fn temp_dir() -> PathBuf {
        let random: u32 = rand::random();
        std::env::temp_dir().join(format!("toalha-persist-{random}"))
    }

    #[rocket::async_test]
    async fn missing_file_loads_as_none() {
        let file = JsonFile::new(&temp_dir(), "candidates.json");
        let loaded: Option<Vec<Candidate>> = file.load().await.unwrap();
        assert!(loaded.is_none());
    }

    #[rocket::async_test]
    async fn save_then_load() {
        let dir = temp_dir();
        let file = JsonFile::new(&dir, "candidates.json");
        let candidates = Candidate::seed();

        file.save(&candidates).await.unwrap();
        let loaded: Vec<Candidate> = file.load().await.unwrap().unwrap();
        assert_eq!(loaded, candidates);

        // Saving again replaces the whole collection.
        file.save(&candidates[..1]).await.unwrap();
        let loaded: Vec<Candidate> = file.load().await.unwrap().unwrap();
        assert_eq!(loaded.len(), 1);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[rocket::async_test]
    async fn malformed_file_is_an_error() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("users.json"), "{not json").unwrap();

        let file = JsonFile::new(&dir, "users.json");
        assert!(file.load::<Vec<Candidate>>().await.is_err());

        std::fs::remove_dir_all(dir).unwrap();
    }
}
