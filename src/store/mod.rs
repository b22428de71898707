// src/store/mod.rs
pub mod memory;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Article, Category, User};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage connection failed: {0}")]
    Connection(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("duplicate key: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Server-side window, ordering and limit for article listings, keyed on
/// `published_at`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    #[serde(default)]
    pub sort: SortOrder,
    /// Only articles published within the last `days` days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
}

impl ListQuery {
    pub fn newest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Everything from the last `days` days, newest first.
    pub fn within_days(days: u32) -> Self {
        Self {
            days: Some(days),
            ..Self::default()
        }
    }

    /// Oldest `published_at` still inside the window. `None` when there is no
    /// window or it reaches past the representable range.
    pub fn cutoff(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let days = self.days?;
        now.checked_sub_signed(Duration::days(i64::from(days)))
    }

    /// Window, sort and truncate an already filtered set in place.
    pub(crate) fn apply(&self, articles: &mut Vec<Article>, now: DateTime<Utc>) {
        if let Some(cutoff) = self.cutoff(now) {
            articles.retain(|a| a.published_at >= cutoff);
        }
        match self.sort {
            SortOrder::Newest => articles.sort_by(|a, b| b.published_at.cmp(&a.published_at)),
            SortOrder::Oldest => articles.sort_by(|a, b| a.published_at.cmp(&b.published_at)),
        }
        if let Some(limit) = self.limit {
            articles.truncate(limit);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(Uuid),
    Updated(Uuid),
}

impl UpsertOutcome {
    pub fn id(&self) -> Uuid {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Updated(id) => *id,
        }
    }
}

#[async_trait]
pub trait ArticleStore: Send + Sync {
    async fn list_all(&self, query: ListQuery) -> StoreResult<Vec<Article>>;
    async fn find_by_category(
        &self,
        category: Category,
        query: ListQuery,
    ) -> StoreResult<Vec<Article>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Article>>;
    /// Insert when `(title, published_at)` is absent, otherwise overwrite every
    /// field of the existing record while keeping its id.
    async fn upsert(&self, article: &Article) -> StoreResult<UpsertOutcome>;
    /// Destructive: drops every stored article before inserting `articles`.
    /// Not used by ingestion.
    async fn replace_all(&self, articles: &[Article]) -> StoreResult<usize>;
    async fn count(&self) -> StoreResult<usize>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] when the email is taken.
    async fn create(&self, user: &User) -> StoreResult<()>;
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn list(&self) -> StoreResult<Vec<User>>;
    /// Returns `false` when no such user existed.
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Both store handles, usually backed by the same connection.
#[derive(Clone)]
pub struct Stores {
    pub articles: Arc<dyn ArticleStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            articles: store.clone(),
            users: store,
        }
    }

    /// `memory` selects the in-process store, anything else is handed to SQLite
    /// (`sqlite:news.db`, `sqlite::memory:`).
    pub async fn open(database_url: &str) -> StoreResult<Self> {
        if database_url.trim().eq_ignore_ascii_case("memory") {
            tracing::warn!("using in-memory store; data is lost on restart");
            return Ok(Self::memory());
        }
        let store = Arc::new(SqliteStore::connect(database_url).await?);
        Ok(Self {
            articles: store.clone(),
            users: store,
        })
    }
}
