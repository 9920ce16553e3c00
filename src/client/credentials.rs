use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;

/// What the client keeps between runs: the user it authenticated as and the
/// bearer token to replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user: PublicUser,
    pub token: String,
}

/// Where the session credential lives. File today; the trait keeps the
/// storage medium swappable.
pub trait CredentialCache {
    fn load(&self) -> Result<Option<StoredSession>>;
    fn save(&self, session: &StoredSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

pub struct FileCredentialCache {
    path: PathBuf,
}

impl FileCredentialCache {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn open_default() -> Result<Self> {
        let dir = dirs::config_dir().context("no config directory on this platform")?;
        Ok(Self::new(dir.join("neostock").join("auth.json")))
    }
}

impl CredentialCache for FileCredentialCache {
    fn load(&self) -> Result<Option<StoredSession>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        // An unreadable cache is the same as no cache.
        Ok(serde_json::from_str(&raw).ok())
    }

    fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw).with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_session() -> StoredSession {
        StoredSession {
            user: PublicUser {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            },
            token: "header.payload.signature".into(),
        }
    }

    #[test]
    fn save_load_clear_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCredentialCache::new(dir.path().join("auth.json"));

        assert!(cache.load().expect("load empty").is_none());

        let session = sample_session();
        cache.save(&session).expect("save");
        let loaded = cache.load().expect("load").expect("session present");
        assert_eq!(loaded.user.email, session.user.email);
        assert_eq!(loaded.token, session.token);

        cache.clear().expect("clear");
        assert!(cache.load().expect("load cleared").is_none());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCredentialCache::new(dir.path().join("nested").join("auth.json"));
        cache.save(&sample_session()).expect("save");
        assert!(cache.load().expect("load").is_some());
    }

    #[test]
    fn corrupt_cache_reads_as_logged_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("auth.json");
        fs::write(&path, "not json at all").expect("write");
        let cache = FileCredentialCache::new(path);
        assert!(cache.load().expect("load").is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = FileCredentialCache::new(dir.path().join("auth.json"));
        cache.clear().expect("clear nothing");
        cache.clear().expect("clear again");
    }
}
