//! OAuth token cache on disk

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use calpurge_common::auth::{TokenSet, TokenStore};
use tracing::debug;

/// Token cache kept as one JSON document
///
/// Writes go to a sibling temporary file that is then renamed over the
/// cache, so an interrupted write never leaves a truncated cache behind.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<TokenSet>, String> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(format!("cannot read {}: {e}", self.path.display())),
        };

        let tokens = serde_json::from_str(&contents)
            .map_err(|e| format!("cannot parse {}: {e}", self.path.display()))?;
        debug!(path = %self.path.display(), "Token cache loaded");
        Ok(Some(tokens))
    }

    async fn save(&self, tokens: &TokenSet) -> Result<(), String> {
        let json = serde_json::to_string_pretty(tokens).map_err(|e| e.to_string())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, json)
            .await
            .map_err(|e| format!("cannot write {}: {e}", staging.display()))?;
        restrict_permissions(&staging).await?;
        tokio::fs::rename(&staging, &self.path)
            .await
            .map_err(|e| format!("cannot replace {}: {e}", self.path.display()))?;

        debug!(path = %self.path.display(), "Token cache saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), String> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("cannot remove {}: {e}", self.path.display())),
        }
    }
}

/// Owner-only access; the cache holds a refresh token
#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<(), String> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| format!("cannot restrict {}: {e}", path.display()))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<(), String> {
    Ok(())
}
