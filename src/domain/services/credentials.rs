#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::models::UserProfile;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLogin {
    pub token: String,
    pub profile: Option<UserProfile>,
}

/// Login persisted between runs so `shifu login` only has to happen once.
pub struct Credentials {
    pub cache_dir: path::PathBuf,
}

impl Default for Credentials {
    fn default() -> Credentials {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| return path::PathBuf::from("."))
            .join("shifu");

        return Credentials::new(cache_dir);
    }
}

impl Credentials {
    pub fn new(cache_dir: path::PathBuf) -> Credentials {
        return Credentials { cache_dir };
    }

    pub fn file_path(&self) -> path::PathBuf {
        return self.cache_dir.join("credentials.json");
    }

    pub async fn load(&self) -> Result<Option<SavedLogin>> {
        let file_path = self.file_path();
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path).await?;
        let saved: SavedLogin = serde_json::from_str(&payload)?;
        if saved.token.is_empty() {
            return Ok(None);
        }

        return Ok(Some(saved));
    }

    pub async fn save(&self, saved: &SavedLogin) -> Result<()> {
        if !self.cache_dir.exists() {
            fs::create_dir_all(&self.cache_dir).await?;
        }

        let mut file = fs::File::create(self.file_path()).await?;
        file.write_all(serde_json::to_string_pretty(saved)?.as_bytes())
            .await?;

        tracing::debug!(path = ?self.file_path(), "Saved login");
        return Ok(());
    }

    pub async fn clear(&self) -> Result<()> {
        let file_path = self.file_path();
        if file_path.exists() {
            fs::remove_file(file_path).await?;
        }

        return Ok(());
    }
}
