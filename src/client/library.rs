// src/client/library.rs
use std::sync::Arc;

use crate::model::Article;

use super::cache::{CacheError, LocalCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shelf {
    Saved,
    Offline,
}

impl Shelf {
    pub fn key(&self) -> &'static str {
        match self {
            Shelf::Saved => "savedArticles",
            Shelf::Offline => "offlineArticles",
        }
    }
}

/// Saved and offline article lists. Purely local: nothing here talks to the server.
#[derive(Clone)]
pub struct ArticleShelf {
    cache: Arc<dyn LocalCache>,
}

impl ArticleShelf {
    pub fn new(cache: Arc<dyn LocalCache>) -> Self {
        Self { cache }
    }

    /// Unreadable entries read as an empty list.
    pub fn list(&self, shelf: Shelf) -> Vec<Article> {
        let Some(raw) = self.cache.get(shelf.key()) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = shelf.key(), error = %e, "discarding unreadable shelf");
            Vec::new()
        })
    }

    fn store(&self, shelf: Shelf, articles: &[Article]) -> Result<(), CacheError> {
        self.cache.set(shelf.key(), serde_json::to_string(articles)?)
    }

    /// Appends; saving the same article twice keeps two entries.
    pub fn save(&self, shelf: Shelf, article: Article) -> Result<usize, CacheError> {
        let mut articles = self.list(shelf);
        articles.push(article);
        self.store(shelf, &articles)?;
        Ok(articles.len())
    }

    /// Removes the entry at `index`; out-of-range is a no-op returning `None`.
    pub fn remove(&self, shelf: Shelf, index: usize) -> Result<Option<Article>, CacheError> {
        let mut articles = self.list(shelf);
        if index >= articles.len() {
            return Ok(None);
        }
        let removed = articles.remove(index);
        self.store(shelf, &articles)?;
        Ok(Some(removed))
    }
}
