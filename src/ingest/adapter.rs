// src/ingest/adapter.rs
//! Pure mapping from raw provider records to the canonical [`Article`].
//!
//! Fallback order for missing optional fields:
//! - `content` → `description`
//! - `image` (`urlToImage` / `image`) → [`PLACEHOLDER_IMAGE`]
//! - `publishedAt` (absent or unparsable) → `now`
//! - `source.name` → provider display name
//!
//! Only presence is checked: a record without a usable title is dropped.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::ingest::types::{RawProviderArticle, SourceField};
use crate::model::{Article, Category};

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/600x300";

/// NewsAPI keeps deleted stories in results with this literal title.
const REMOVED_MARKER: &str = "[Removed]";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdaptError {
    #[error("article has no title")]
    MissingTitle,
}

struct Fields {
    provider: &'static str,
    source: Option<SourceField>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
}

impl From<RawProviderArticle> for Fields {
    fn from(raw: RawProviderArticle) -> Self {
        match raw {
            RawProviderArticle::NewsApi(a) => Fields {
                provider: "NewsAPI",
                source: a.source,
                title: a.title,
                description: a.description,
                content: a.content,
                image: a.url_to_image,
                published_at: a.published_at,
            },
            RawProviderArticle::GNews(a) => Fields {
                provider: "GNews",
                source: a.source,
                title: a.title,
                description: a.description,
                content: a.content,
                image: a.image,
                published_at: clean(a.published_at).or_else(|| clean(a.published)),
            },
        }
    }
}

fn clean(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_published(raw: Option<&str>, now: DateTime<Utc>) -> DateTime<Utc> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now)
}

pub fn to_article(
    raw: RawProviderArticle,
    category: Category,
    country: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Article, AdaptError> {
    let f = Fields::from(raw);

    let title = clean(f.title)
        .filter(|t| t != REMOVED_MARKER)
        .ok_or(AdaptError::MissingTitle)?;
    let source = f
        .source
        .as_ref()
        .and_then(SourceField::name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(f.provider)
        .to_string();
    let description = clean(f.description);
    let content = clean(f.content).or_else(|| description.clone());
    let image = clean(f.image).unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());

    Ok(Article {
        id: Uuid::new_v4(),
        title,
        source,
        image: Some(image),
        description,
        content,
        published_at: parse_published(f.published_at.as_deref(), now),
        country: country.map(str::to_string),
        category,
    })
}
