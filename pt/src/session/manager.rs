//! SessionManager - actor that owns every live session
//!
//! Processes commands via channels so handlers never share a lock.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::messages::{SessionCommand, SessionError, SessionResponse};
use super::repository::SessionRepository;
use super::types::{Session, SessionId};

struct Entry {
    session: Session,
    last_access: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.duration_since(self.last_access) > idle_timeout
    }
}

/// Handle to send commands to the session actor
#[derive(Clone)]
pub struct SessionManager {
    tx: mpsc::Sender<SessionCommand>,
}

impl SessionManager {
    /// Spawn the actor; sessions idle longer than `idle_timeout` are treated as gone
    pub fn spawn(idle_timeout: Duration) -> Self {
        debug!(?idle_timeout, "spawn: called");
        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(actor_loop(rx, idle_timeout));

        info!("SessionManager spawned");
        Self { tx }
    }

    /// Spawn the actor plus a background task that purges expired sessions
    ///
    /// The sweeper exits on its own once the actor has shut down.
    pub fn spawn_with_sweeper(idle_timeout: Duration, sweep_interval: Duration) -> Self {
        let manager = Self::spawn(idle_timeout);
        let sweeper = manager.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match sweeper.purge_expired().await {
                    Ok(0) => {}
                    Ok(removed) => debug!(removed, "sweeper: purged expired sessions"),
                    Err(_) => {
                        debug!("sweeper: session actor gone, stopping");
                        break;
                    }
                }
            }
        });
        manager
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> SessionCommand) -> SessionResponse<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| SessionError::ChannelError)?;
        reply_rx.await.map_err(|_| SessionError::ChannelError)
    }

    pub async fn get(&self, id: &SessionId) -> SessionResponse<Option<Session>> {
        debug!(%id, "get: called");
        let id = id.clone();
        self.request(|reply| SessionCommand::Get { id, reply }).await
    }

    pub async fn put(&self, id: &SessionId, session: Session) -> SessionResponse<()> {
        debug!(%id, progress_len = session.progress.len(), "put: called");
        let id = id.clone();
        self.request(|reply| SessionCommand::Put { id, session, reply }).await
    }

    pub async fn record_progress(&self, id: &SessionId, tool: &str, completion: &str) -> SessionResponse<Option<Session>> {
        debug!(%id, %tool, %completion, "record_progress: called");
        let id = id.clone();
        let tool = tool.to_string();
        let completion = completion.to_string();
        self.request(|reply| SessionCommand::RecordProgress {
            id,
            tool,
            completion,
            reply,
        })
        .await
    }

    /// Remove a session, returning whether it existed
    pub async fn clear(&self, id: &SessionId) -> SessionResponse<bool> {
        debug!(%id, "clear: called");
        let id = id.clone();
        self.request(|reply| SessionCommand::Clear { id, reply }).await
    }

    /// Drop every expired session, returning how many were removed
    pub async fn purge_expired(&self) -> SessionResponse<usize> {
        debug!("purge_expired: called");
        self.request(|reply| SessionCommand::PurgeExpired { reply }).await
    }

    /// Number of stored sessions, expired ones included until purged
    pub async fn count(&self) -> SessionResponse<usize> {
        self.request(|reply| SessionCommand::Count { reply }).await
    }

    /// Stop the actor; later calls fail with `ChannelError`
    pub async fn shutdown(&self) -> SessionResponse<()> {
        debug!("shutdown: called");
        self.tx
            .send(SessionCommand::Shutdown)
            .await
            .map_err(|_| SessionError::ChannelError)
    }
}

#[async_trait]
impl SessionRepository for SessionManager {
    async fn get(&self, id: &SessionId) -> SessionResponse<Option<Session>> {
        SessionManager::get(self, id).await
    }

    async fn put(&self, id: &SessionId, session: Session) -> SessionResponse<()> {
        SessionManager::put(self, id, session).await
    }

    async fn record_progress(&self, id: &SessionId, tool: &str, completion: &str) -> SessionResponse<Option<Session>> {
        SessionManager::record_progress(self, id, tool, completion).await
    }

    async fn clear(&self, id: &SessionId) -> SessionResponse<()> {
        SessionManager::clear(self, id).await.map(|_| ())
    }
}

async fn actor_loop(mut rx: mpsc::Receiver<SessionCommand>, idle_timeout: Duration) {
    debug!("SessionManager actor started");
    let mut sessions: HashMap<SessionId, Entry> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Get { id, reply } => {
                let now = Instant::now();
                let result = match sessions.get_mut(&id) {
                    Some(entry) if entry.is_expired(now, idle_timeout) => {
                        debug!(%id, "actor_loop: Get found expired session");
                        sessions.remove(&id);
                        None
                    }
                    Some(entry) => {
                        entry.last_access = now;
                        Some(entry.session.clone())
                    }
                    None => {
                        debug!(%id, "actor_loop: Get unknown session");
                        None
                    }
                };
                let _ = reply.send(result);
            }

            SessionCommand::Put { id, session, reply } => {
                debug!(%id, "actor_loop: Put command");
                sessions.insert(
                    id,
                    Entry {
                        session,
                        last_access: Instant::now(),
                    },
                );
                let _ = reply.send(());
            }

            SessionCommand::RecordProgress {
                id,
                tool,
                completion,
                reply,
            } => {
                let now = Instant::now();
                let result = match sessions.get_mut(&id) {
                    Some(entry) if entry.is_expired(now, idle_timeout) => {
                        debug!(%id, "actor_loop: RecordProgress found expired session");
                        sessions.remove(&id);
                        None
                    }
                    Some(entry) => {
                        let replaced = entry.session.record_progress(tool.as_str(), completion.as_str());
                        debug!(%id, %tool, ?replaced, "actor_loop: RecordProgress command");
                        entry.last_access = now;
                        Some(entry.session.clone())
                    }
                    None => {
                        debug!(%id, "actor_loop: RecordProgress for unknown session");
                        None
                    }
                };
                let _ = reply.send(result);
            }

            SessionCommand::Clear { id, reply } => {
                let existed = sessions.remove(&id).is_some();
                debug!(%id, existed, "actor_loop: Clear command");
                let _ = reply.send(existed);
            }

            SessionCommand::PurgeExpired { reply } => {
                let now = Instant::now();
                let before = sessions.len();
                sessions.retain(|_, entry| !entry.is_expired(now, idle_timeout));
                let removed = before - sessions.len();
                if removed > 0 {
                    info!(removed, remaining = sessions.len(), "Purged expired sessions");
                }
                let _ = reply.send(removed);
            }

            SessionCommand::Count { reply } => {
                let _ = reply.send(sessions.len());
            }

            SessionCommand::Shutdown => {
                info!(live = sessions.len(), "SessionManager shutting down");
                break;
            }
        }
    }

    if !sessions.is_empty() {
        warn!(dropped = sessions.len(), "SessionManager stopped with live sessions");
    }
    debug!("SessionManager actor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_session_manager_put_get_clear() {
        let manager = SessionManager::spawn(LONG);
        let id = SessionId::generate();

        assert!(manager.get(&id).await.unwrap().is_none());

        let mut session = Session::authenticated("devops_learner");
        session.record_progress("docker", "50%");
        manager.put(&id, session.clone()).await.unwrap();

        assert_eq!(manager.get(&id).await.unwrap(), Some(session));
        assert_eq!(manager.count().await.unwrap(), 1);

        assert!(manager.clear(&id).await.unwrap());
        assert!(manager.get(&id).await.unwrap().is_none());
        assert!(!manager.clear(&id).await.unwrap());

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_session_manager_put_replaces() {
        let manager = SessionManager::spawn(LONG);
        let id = SessionId::generate();

        let mut session = Session::authenticated("devops_learner");
        session.record_progress("docker", "50%");
        manager.put(&id, session.clone()).await.unwrap();

        session.record_progress("docker", "100%");
        manager.put(&id, session).await.unwrap();

        let stored = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.progress.get("docker").map(String::as_str), Some("100%"));
        assert_eq!(manager.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_progress_updates_live_session() {
        let manager = SessionManager::spawn(LONG);
        let id = SessionId::generate();
        manager.put(&id, Session::authenticated("devops_learner")).await.unwrap();

        let updated = manager.record_progress(&id, "docker", "50%").await.unwrap().unwrap();
        assert_eq!(updated.progress.get("docker").map(String::as_str), Some("50%"));

        manager.record_progress(&id, "docker", "100%").await.unwrap();
        let stored = manager.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.progress.len(), 1);
        assert_eq!(stored.progress.get("docker").map(String::as_str), Some("100%"));
    }

    #[tokio::test]
    async fn test_record_progress_never_recreates_cleared_session() {
        let manager = SessionManager::spawn(LONG);
        let id = SessionId::generate();
        manager.put(&id, Session::authenticated("devops_learner")).await.unwrap();
        manager.clear(&id).await.unwrap();

        assert!(manager.record_progress(&id, "docker", "50%").await.unwrap().is_none());
        assert!(manager.get(&id).await.unwrap().is_none());
        assert_eq!(manager.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_record_progress_on_expired_session() {
        let manager = SessionManager::spawn(Duration::from_millis(50));
        let id = SessionId::generate();
        manager.put(&id, Session::authenticated("devops_learner")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(manager.record_progress(&id, "docker", "50%").await.unwrap().is_none());
        assert_eq!(manager.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::spawn(LONG);
        let a = SessionId::generate();
        let b = SessionId::generate();

        let mut first = Session::authenticated("devops_learner");
        first.record_progress("docker", "50%");
        manager.put(&a, first).await.unwrap();

        let mut second = Session::authenticated("devops_learner");
        second.record_progress("ansible", "20%");
        manager.put(&b, second).await.unwrap();

        let first = manager.get(&a).await.unwrap().unwrap();
        let second = manager.get(&b).await.unwrap().unwrap();
        assert!(!first.progress.contains_key("ansible"));
        assert!(!second.progress.contains_key("docker"));
    }

    #[tokio::test]
    async fn test_idle_session_expires_on_get() {
        let manager = SessionManager::spawn(Duration::from_millis(50));
        let id = SessionId::generate();
        manager.put(&id, Session::authenticated("devops_learner")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(manager.get(&id).await.unwrap().is_none());
        assert_eq!(manager.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_fresh_sessions() {
        let manager = SessionManager::spawn(Duration::from_millis(100));
        let stale = SessionId::generate();
        let fresh = SessionId::generate();

        manager.put(&stale, Session::authenticated("a")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        manager.put(&fresh, Session::authenticated("b")).await.unwrap();

        assert_eq!(manager.purge_expired().await.unwrap(), 1);
        assert_eq!(manager.count().await.unwrap(), 1);
        assert!(manager.get(&fresh).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sweeper_purges_in_background() {
        let manager = SessionManager::spawn_with_sweeper(Duration::from_millis(50), Duration::from_millis(50));
        let id = SessionId::generate();
        manager.put(&id, Session::authenticated("devops_learner")).await.unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(manager.count().await.unwrap(), 0);
        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_calls_after_shutdown_fail() {
        let manager = SessionManager::spawn(LONG);
        manager.shutdown().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let result = manager.get(&SessionId::generate()).await;
        assert!(matches!(result, Err(SessionError::ChannelError)));
    }

    #[tokio::test]
    async fn test_usable_through_repository_trait() {
        let manager = SessionManager::spawn(LONG);
        let repo: &dyn SessionRepository = &manager;
        let id = SessionId::generate();

        repo.put(&id, Session::authenticated("devops_learner")).await.unwrap();
        assert!(repo.get(&id).await.unwrap().is_some());
        repo.clear(&id).await.unwrap();
        repo.clear(&id).await.unwrap();
        assert!(repo.get(&id).await.unwrap().is_none());
    }
}
