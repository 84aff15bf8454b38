//! Session persistence abstraction.
//!
//! The engine treats storage as a keyed, last-write-wins snapshot store;
//! no cross-session transactionality is assumed. Production deployments
//! plug in a real backend, tests and single-node setups use the in-memory
//! adapter.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::Session;
use crate::errors::DomainError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find_by_code(&self, code: &str) -> Result<Option<Session>, DomainError>;
    async fn save(&self, session: &Session) -> Result<(), DomainError>;
    async fn delete(&self, code: &str) -> Result<(), DomainError>;
}

/// In-memory adapter: a concurrent map of code -> latest snapshot.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Session>, DomainError> {
        Ok(self.sessions.get(code).map(|entry| entry.clone()))
    }

    async fn save(&self, session: &Session) -> Result<(), DomainError> {
        self.sessions.insert(session.code.clone(), session.clone());
        Ok(())
    }

    async fn delete(&self, code: &str) -> Result<(), DomainError> {
        self.sessions.remove(code);
        Ok(())
    }
}
