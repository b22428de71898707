// src/store/memory.rs
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ArticleStore, ListQuery, StoreError, StoreResult, UpsertOutcome, UserStore};
use crate::model::{Article, Category, User};

/// In-process store for tests and local runs. Each upsert holds the write lock,
/// which is the only atomicity unit.
#[derive(Default)]
pub struct MemoryStore {
    articles: RwLock<Vec<Article>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn list_all(&self, query: ListQuery) -> StoreResult<Vec<Article>> {
        let mut out = self.articles.read().await.clone();
        query.apply(&mut out, Utc::now());
        Ok(out)
    }

    async fn find_by_category(
        &self,
        category: Category,
        query: ListQuery,
    ) -> StoreResult<Vec<Article>> {
        let mut out: Vec<Article> = self
            .articles
            .read()
            .await
            .iter()
            .filter(|a| a.category == category)
            .cloned()
            .collect();
        query.apply(&mut out, Utc::now());
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Article>> {
        Ok(self
            .articles
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn upsert(&self, article: &Article) -> StoreResult<UpsertOutcome> {
        let mut guard = self.articles.write().await;
        if let Some(existing) = guard.iter_mut().find(|a| a.key() == article.key()) {
            let id = existing.id;
            *existing = Article {
                id,
                ..article.clone()
            };
            return Ok(UpsertOutcome::Updated(id));
        }
        guard.push(article.clone());
        Ok(UpsertOutcome::Inserted(article.id))
    }

    async fn replace_all(&self, articles: &[Article]) -> StoreResult<usize> {
        let mut guard = self.articles.write().await;
        guard.clear();
        guard.extend_from_slice(articles);
        Ok(guard.len())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.articles.read().await.len())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: &User) -> StoreResult<()> {
        let mut guard = self.users.write().await;
        if guard.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(user.email.clone()));
        }
        guard.push(user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut guard = self.users.write().await;
        let before = guard.len();
        guard.retain(|u| u.id != id);
        Ok(guard.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use chrono::{TimeZone, Utc};

    fn article(title: &str, secs: i64, category: Category) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: title.into(),
            source: "Wire".into(),
            image: None,
            description: Some("first".into()),
            content: None,
            published_at: Utc.timestamp_opt(secs, 0).unwrap(),
            country: None,
            category,
        }
    }

    #[tokio::test]
    async fn upsert_same_key_keeps_one_record_with_latest_fields() {
        let store = MemoryStore::new();
        let first = article("Same", 100, Category::General);
        let mut second = article("Same", 100, Category::General);
        second.description = Some("second".into());

        let o1 = store.upsert(&first).await.unwrap();
        let o2 = store.upsert(&second).await.unwrap();

        assert_eq!(o1, UpsertOutcome::Inserted(first.id));
        assert_eq!(o2, UpsertOutcome::Updated(first.id));
        let all = store.list_all(ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description.as_deref(), Some("second"));
        assert_eq!(all[0].id, first.id);
    }

    #[tokio::test]
    async fn same_title_different_time_is_a_new_record() {
        let store = MemoryStore::new();
        store.upsert(&article("Same", 100, Category::General)).await.unwrap();
        store.upsert(&article("Same", 200, Category::General)).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = MemoryStore::new();
        let u = User {
            id: Uuid::new_v4(),
            email: "x@y.io".into(),
            password_hash: "h".into(),
            role: Role::User,
            created_at: Utc::now(),
        };
        store.create(&u).await.unwrap();
        let dup = User {
            id: Uuid::new_v4(),
            ..u.clone()
        };
        assert!(matches!(
            store.create(&dup).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(store.delete(u.id).await.unwrap());
        assert!(!store.delete(u.id).await.unwrap());
    }
}
