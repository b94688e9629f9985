//! In-memory message and actor store, optionally backed by a JSON file.
//!
//! The file holds `{ "messages": [...], "actors": [...] }`. When a path is
//! configured every write flushes the whole snapshot back to disk. Writes are
//! serialized so the last flush always carries the latest state.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use trait_options_domain::{ActorId, CheckMessage, MessageId};

use crate::infrastructure::ports::{ActorRecord, ActorRepo, ChatMessageRepo, RepoError};

/// On-disk layout of the message file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageFile {
    #[serde(default)]
    pub messages: Vec<CheckMessage>,
    #[serde(default)]
    pub actors: Vec<ActorRecord>,
}

pub struct InMemoryStore {
    messages: RwLock<HashMap<MessageId, CheckMessage>>,
    actors: RwLock<HashMap<ActorId, ActorRecord>>,
    path: Option<PathBuf>,
    writes: Mutex<()>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            messages: RwLock::new(HashMap::new()),
            actors: RwLock::new(HashMap::new()),
            path: None,
            writes: Mutex::new(()),
        }
    }

    pub fn with_message(mut self, message: CheckMessage) -> Self {
        self.messages.get_mut().insert(message.id(), message);
        self
    }

    pub fn with_actor(mut self, actor: ActorRecord) -> Self {
        self.actors.get_mut().insert(actor.id, actor);
        self
    }

    /// Load a message file. A missing file starts an empty store at that path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref().to_path_buf();
        let file = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<MessageFile>(&raw).map_err(RepoError::serialization)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Message file not found, starting empty");
                MessageFile::default()
            }
            Err(e) => return Err(RepoError::storage("open", e)),
        };

        tracing::debug!(
            path = %path.display(),
            messages = file.messages.len(),
            actors = file.actors.len(),
            "Loaded message file"
        );

        let mut store = Self::new();
        store.path = Some(path);
        for message in file.messages {
            store = store.with_message(message);
        }
        for actor in file.actors {
            store = store.with_actor(actor);
        }
        Ok(store)
    }

    pub async fn snapshot(&self) -> MessageFile {
        let mut messages: Vec<CheckMessage> = self.messages.read().await.values().cloned().collect();
        messages.sort_by_key(|m| m.id());
        let mut actors: Vec<ActorRecord> = self.actors.read().await.values().cloned().collect();
        actors.sort_by_key(|a| a.id);
        MessageFile { messages, actors }
    }

    /// Callers must hold `writes`.
    async fn flush(&self) -> Result<(), RepoError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.snapshot().await).map_err(RepoError::serialization)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| RepoError::storage("flush", e))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatMessageRepo for InMemoryStore {
    async fn get(&self, id: MessageId) -> Result<Option<CheckMessage>, RepoError> {
        Ok(self.messages.read().await.get(&id).cloned())
    }

    async fn save(&self, message: &CheckMessage) -> Result<(), RepoError> {
        let _writes = self.writes.lock().await;
        self.messages.write().await.insert(message.id(), message.clone());
        self.flush().await
    }

    async fn list(&self) -> Result<Vec<CheckMessage>, RepoError> {
        Ok(self.snapshot().await.messages)
    }
}

#[async_trait]
impl ActorRepo for InMemoryStore {
    async fn get(&self, id: ActorId) -> Result<Option<ActorRecord>, RepoError> {
        Ok(self.actors.read().await.get(&id).cloned())
    }

    async fn remove_effect(&self, id: ActorId, slug: &str) -> Result<bool, RepoError> {
        let _writes = self.writes.lock().await;
        let removed = {
            let mut actors = self.actors.write().await;
            let actor = actors.get_mut(&id).ok_or_else(|| RepoError::not_found("Actor", id))?;
            match actor.effects.iter().position(|e| e == slug) {
                Some(index) => {
                    actor.effects.remove(index);
                    true
                }
                None => false,
            }
        };
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trait_options_domain::{CheckContext, CheckType, DiceTerm, RollExpression};

    fn message(actor_id: ActorId) -> CheckMessage {
        CheckMessage::check(
            actor_id,
            "strike",
            CheckContext::new(CheckType::AttackRoll),
            RollExpression::check(DiceTerm::d20(12), 5),
        )
    }

    #[tokio::test]
    async fn saves_and_reads_back() {
        let store = InMemoryStore::new();
        let message = message(ActorId::new());
        ChatMessageRepo::save(&store, &message).await.unwrap();

        let loaded = ChatMessageRepo::get(&store, message.id()).await.unwrap();
        assert_eq!(loaded, Some(message));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemoryStore::open(dir.path().join("messages.json")).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_flush_to_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        let actor = ActorRecord::new("Valeros", 5).with_effect("effect-nudge-fate");
        let message = message(actor.id);

        let store = InMemoryStore::open(&path).await.unwrap();
        ChatMessageRepo::save(&store, &message).await.unwrap();

        let reopened = InMemoryStore::open(&path).await.unwrap();
        assert_eq!(ChatMessageRepo::get(&reopened, message.id()).await.unwrap(), Some(message));
        assert!(ActorRepo::get(&reopened, actor.id).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_saves_all_reach_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        let store = Arc::new(InMemoryStore::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let message = message(ActorId::new());
                ChatMessageRepo::save(store.as_ref(), &message).await.unwrap();
                message.id()
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }

        let reopened = InMemoryStore::open(&path).await.unwrap();
        assert_eq!(reopened.list().await.unwrap().len(), ids.len());
        for id in ids {
            assert!(ChatMessageRepo::get(&reopened, id).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn removes_effects_once() {
        let actor = ActorRecord::new("Kyra", 3).with_effect("effect-nudge-fate");
        let id = actor.id;
        let store = InMemoryStore::new().with_actor(actor);

        assert!(store.remove_effect(id, "effect-nudge-fate").await.unwrap());
        assert!(!store.remove_effect(id, "effect-nudge-fate").await.unwrap());
        let err = store.remove_effect(ActorId::new(), "effect-nudge-fate").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn rejects_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            InMemoryStore::open(&path).await,
            Err(RepoError::Serialization(_))
        ));
    }
}
