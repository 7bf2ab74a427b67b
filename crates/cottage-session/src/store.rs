use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use cottage_protocol::{SessionId, SessionState};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Idle lifetime of a session.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(3600);

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Live state for `session_id`. Unknown and expired sessions are `None`.
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>>;
    /// Persist `state` and push the expiry out to `now + ttl`.
    async fn save(&self, session_id: &SessionId, state: &SessionState) -> Result<()>;
    async fn remove(&self, session_id: &SessionId) -> Result<()>;
    /// Drop every expired session and return how many went.
    async fn purge_expired(&self) -> Result<usize>;
    fn ttl(&self) -> Duration;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    expires_at: DateTime<Utc>,
    state: SessionState,
}

impl StoredSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

fn expiry_from(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    TimeDelta::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[derive(Debug, Clone)]
pub struct InMemorySessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<SessionId, StoredSession>>>,
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>> {
        let now = Utc::now();
        {
            let guard = self.sessions.read().await;
            match guard.get(session_id) {
                None => return Ok(None),
                Some(stored) if !stored.is_expired(now) => return Ok(Some(stored.state.clone())),
                Some(_) => {}
            }
        }

        debug!(session_id = %session_id, "session expired");
        self.sessions.write().await.remove(session_id);
        Ok(None)
    }

    async fn save(&self, session_id: &SessionId, state: &SessionState) -> Result<()> {
        let stored = StoredSession {
            expires_at: expiry_from(Utc::now(), self.ttl),
            state: state.clone(),
        };
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), stored);
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<()> {
        self.sessions.write().await.remove(session_id);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now();
        let mut guard = self.sessions.write().await;
        let before = guard.len();
        guard.retain(|_, stored| !stored.is_expired(now));
        Ok(before - guard.len())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// One JSON file per session under `root`, so sessions survive restarts.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    root: PathBuf,
    ttl: Duration,
}

impl FileSessionStore {
    pub fn new(root: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            root: root.into(),
            ttl,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self, session_id: &SessionId) -> Option<PathBuf> {
        session_id
            .is_well_formed()
            .then(|| self.root.join(format!("{}.json", session_id.as_str())))
    }

    async fn read_stored(path: &Path) -> Result<Option<StoredSession>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Ok(None);
        }

        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed reading session file {path:?}"))?;
        let stored = serde_json::from_str(&raw)
            .with_context(|| format!("failed parsing session file {path:?}"))?;
        Ok(Some(stored))
    }

    async fn remove_file(path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(error) => {
                Err(error).with_context(|| format!("failed removing session file {path:?}"))
            }
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>> {
        let Some(path) = self.session_path(session_id) else {
            return Ok(None);
        };

        match Self::read_stored(&path).await? {
            Some(stored) if !stored.is_expired(Utc::now()) => Ok(Some(stored.state)),
            Some(_) => {
                debug!(session_id = %session_id, "session expired");
                Self::remove_file(&path).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session_id: &SessionId, state: &SessionState) -> Result<()> {
        let Some(path) = self.session_path(session_id) else {
            bail!("refusing to persist malformed session id {session_id:?}");
        };
        fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed creating session dir {:?}", self.root))?;

        let stored = StoredSession {
            expires_at: expiry_from(Utc::now(), self.ttl),
            state: state.clone(),
        };
        let payload = serde_json::to_string_pretty(&stored)?;

        let staging = path.with_extension("json.tmp");
        fs::write(&staging, payload)
            .await
            .with_context(|| format!("failed writing session file {staging:?}"))?;
        fs::rename(&staging, &path)
            .await
            .with_context(|| format!("failed replacing session file {path:?}"))?;
        Ok(())
    }

    async fn remove(&self, session_id: &SessionId) -> Result<()> {
        match self.session_path(session_id) {
            Some(path) => Self::remove_file(&path).await,
            None => Ok(()),
        }
    }

    async fn purge_expired(&self) -> Result<usize> {
        if !fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(0);
        }

        let now = Utc::now();
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            match Self::read_stored(&path).await {
                Ok(Some(stored)) if stored.is_expired(now) => {
                    Self::remove_file(&path).await?;
                    removed += 1;
                }
                Ok(_) => {}
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "unreadable session file removed");
                    Self::remove_file(&path).await?;
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Periodically purge expired sessions until the task is aborted.
pub fn spawn_sweeper(store: Arc<dyn SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.tick().await;
        loop {
            interval.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "expired sessions purged"),
                Err(error) => warn!(%error, "session sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use cottage_protocol::{ClassLabel, InspectionResult};

    use super::*;

    fn unique_test_root(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!("{name}-{nanos}"))
    }

    fn sample_state() -> SessionState {
        let mut state = SessionState::new();
        state.record(InspectionResult::new(
            ClassLabel::Algae,
            "2026-05-05 12:00:00",
        ));
        state
    }

    #[tokio::test]
    async fn memory_store_round_trips_state() -> Result<()> {
        let store = InMemorySessionStore::default();
        let id = SessionId::new_uuid();
        assert!(store.load(&id).await?.is_none());

        store.save(&id, &sample_state()).await?;
        assert_eq!(store.load(&id).await?, Some(sample_state()));

        store.remove(&id).await?;
        assert!(store.load(&id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_expires_sessions() -> Result<()> {
        let store = InMemorySessionStore::new(Duration::ZERO);
        let id = SessionId::new_uuid();
        store.save(&id, &sample_state()).await?;

        assert!(store.load(&id).await?.is_none());
        assert!(store.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_purges_only_expired() -> Result<()> {
        let live = InMemorySessionStore::default();
        live.save(&SessionId::new_uuid(), &sample_state()).await?;
        assert_eq!(live.purge_expired().await?, 0);
        assert_eq!(live.len().await, 1);

        let dead = InMemorySessionStore::new(Duration::ZERO);
        dead.save(&SessionId::new_uuid(), &sample_state()).await?;
        dead.save(&SessionId::new_uuid(), &sample_state()).await?;
        assert_eq!(dead.purge_expired().await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn sessions_are_isolated() -> Result<()> {
        let store = InMemorySessionStore::default();
        let a = SessionId::new_uuid();
        let b = SessionId::new_uuid();
        store.save(&a, &sample_state()).await?;
        store.save(&b, &SessionState::new()).await?;

        assert_eq!(store.load(&a).await?.map(|s| s.history().len()), Some(1));
        assert_eq!(store.load(&b).await?.map(|s| s.history().len()), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn file_store_round_trips_and_removes() -> Result<()> {
        let root = unique_test_root("cottage-session-file");
        let store = FileSessionStore::new(&root, DEFAULT_SESSION_TTL);
        let id = SessionId::new_uuid();

        store.save(&id, &sample_state()).await?;
        assert!(fs::try_exists(root.join(format!("{id}.json"))).await?);
        assert_eq!(store.load(&id).await?, Some(sample_state()));

        let reopened = FileSessionStore::new(&root, DEFAULT_SESSION_TTL);
        assert_eq!(reopened.load(&id).await?, Some(sample_state()));

        store.remove(&id).await?;
        assert!(store.load(&id).await?.is_none());
        store.remove(&id).await?;

        let _ = fs::remove_dir_all(root).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_store_expires_and_purges() -> Result<()> {
        let root = unique_test_root("cottage-session-file-expiry");
        let store = FileSessionStore::new(&root, Duration::ZERO);
        let first = SessionId::new_uuid();
        let second = SessionId::new_uuid();
        store.save(&first, &sample_state()).await?;
        store.save(&second, &sample_state()).await?;

        assert!(store.load(&first).await?.is_none());
        assert_eq!(store.purge_expired().await?, 1);

        let _ = fs::remove_dir_all(root).await;
        Ok(())
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_ids() -> Result<()> {
        let root = unique_test_root("cottage-session-file-ids");
        let store = FileSessionStore::new(&root, DEFAULT_SESSION_TTL);
        let sneaky = SessionId::from_string("../escape");

        assert!(store.save(&sneaky, &sample_state()).await.is_err());
        assert!(store.load(&sneaky).await?.is_none());

        let _ = fs::remove_dir_all(root).await;
        Ok(())
    }

    const SHORT_TTL: Duration = Duration::from_millis(300);

    async fn assert_expiry_slides(store: &dyn SessionStore) -> Result<()> {
        let id = SessionId::new_uuid();
        store.save(&id, &sample_state()).await?;

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = store.load(&id).await?.context("session expired too early")?;
        store.save(&id, &state).await?;

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(store.load(&id).await?, Some(sample_state()));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(store.load(&id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn memory_store_expiry_slides_on_save() -> Result<()> {
        assert_expiry_slides(&InMemorySessionStore::new(SHORT_TTL)).await
    }

    #[tokio::test]
    async fn file_store_expiry_slides_on_save() -> Result<()> {
        let root = unique_test_root("cottage-session-file-sliding");
        let outcome = assert_expiry_slides(&FileSessionStore::new(&root, SHORT_TTL)).await;
        let _ = fs::remove_dir_all(root).await;
        outcome
    }

    #[tokio::test]
    async fn purge_on_missing_root_is_zero() -> Result<()> {
        let store = FileSessionStore::new(unique_test_root("cottage-none"), DEFAULT_SESSION_TTL);
        assert_eq!(store.purge_expired().await?, 0);
        Ok(())
    }
}
