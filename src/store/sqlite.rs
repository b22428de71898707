// src/store/sqlite.rs
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;
use uuid::Uuid;

use super::{ArticleStore, ListQuery, SortOrder, StoreError, StoreResult, UpsertOutcome, UserStore};
use crate::model::{Article, Category, Role, User};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        source TEXT NOT NULL,
        image TEXT,
        description TEXT,
        content TEXT,
        published_at TEXT NOT NULL,
        country TEXT,
        category TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS articles_title_published_at
        ON articles (title, published_at)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS articles_category ON articles (category)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

const ARTICLE_COLUMNS: &str =
    "id, title, source, image, description, content, published_at, country, category";

/// SQLite-backed store. The unique index on `(title, published_at)` makes the
/// single-row upsert the atomicity unit.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let in_memory = database_url.contains(":memory:");
        let opts = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database.
        let max = if in_memory { 1 } else { 10 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::Connection(format!("migration {i}: {e}")))?;
        }
        info!(url = %database_url, "sqlite store ready");
        Ok(Self { pool })
    }
}

fn ts(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_ts(s: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StoreError::Read(format!("bad timestamp '{s}': {e}")))
}

fn parse_id(s: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::Read(format!("bad id '{s}': {e}")))
}

fn read_err(e: sqlx::Error) -> StoreError {
    StoreError::Read(e.to_string())
}

fn write_err(e: sqlx::Error) -> StoreError {
    StoreError::Write(e.to_string())
}

/// `WHERE`/`ORDER BY`/`LIMIT` tail for listings, plus the values to bind in
/// order.
fn listing_clause(
    category: Option<Category>,
    query: &ListQuery,
    now: DateTime<Utc>,
) -> (String, Vec<String>) {
    let mut filters = Vec::new();
    let mut binds = Vec::new();
    if let Some(c) = category {
        filters.push("category = ?");
        binds.push(c.as_str().to_string());
    }
    if let Some(cutoff) = query.cutoff(now) {
        // Stored timestamps share one RFC 3339 shape, so text order is time order.
        filters.push("published_at >= ?");
        binds.push(ts(&cutoff));
    }

    let mut sql = String::new();
    if !filters.is_empty() {
        sql.push_str("WHERE ");
        sql.push_str(&filters.join(" AND "));
        sql.push(' ');
    }
    let dir = match query.sort {
        SortOrder::Newest => "DESC",
        SortOrder::Oldest => "ASC",
    };
    sql.push_str(&format!("ORDER BY published_at {dir}"));
    if let Some(n) = query.limit {
        // SQLite integers are signed 64-bit.
        let n = i64::try_from(n).unwrap_or(i64::MAX);
        sql.push_str(&format!(" LIMIT {n}"));
    }
    (sql, binds)
}

async fn fetch_listing(
    pool: &SqlitePool,
    category: Option<Category>,
    query: &ListQuery,
) -> StoreResult<Vec<Article>> {
    let (tail, binds) = listing_clause(category, query, Utc::now());
    let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles {tail}");
    let mut q = sqlx::query(&sql);
    for b in &binds {
        q = q.bind(b.as_str());
    }
    let rows = q.fetch_all(pool).await.map_err(read_err)?;
    rows.iter().map(article_from_row).collect()
}

fn article_from_row(row: &SqliteRow) -> StoreResult<Article> {
    let id: String = row.try_get("id").map_err(read_err)?;
    let published_at: String = row.try_get("published_at").map_err(read_err)?;
    let category: String = row.try_get("category").map_err(read_err)?;
    Ok(Article {
        id: parse_id(&id)?,
        title: row.try_get("title").map_err(read_err)?,
        source: row.try_get("source").map_err(read_err)?,
        image: row.try_get("image").map_err(read_err)?,
        description: row.try_get("description").map_err(read_err)?,
        content: row.try_get("content").map_err(read_err)?,
        published_at: parse_ts(&published_at)?,
        country: row.try_get("country").map_err(read_err)?,
        category: category
            .parse::<Category>()
            .map_err(|e| StoreError::Read(e.to_string()))?,
    })
}

fn user_from_row(row: &SqliteRow) -> StoreResult<User> {
    let id: String = row.try_get("id").map_err(read_err)?;
    let role: String = row.try_get("role").map_err(read_err)?;
    let created_at: String = row.try_get("created_at").map_err(read_err)?;
    Ok(User {
        id: parse_id(&id)?,
        email: row.try_get("email").map_err(read_err)?,
        password_hash: row.try_get("password_hash").map_err(read_err)?,
        role: role.parse::<Role>().map_err(StoreError::Read)?,
        created_at: parse_ts(&created_at)?,
    })
}

const INSERT_ARTICLE: &str = r#"
    INSERT INTO articles
    (id, title, source, image, description, content, published_at, country, category)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

#[async_trait]
impl ArticleStore for SqliteStore {
    async fn list_all(&self, query: ListQuery) -> StoreResult<Vec<Article>> {
        fetch_listing(&self.pool, None, &query).await
    }

    async fn find_by_category(
        &self,
        category: Category,
        query: ListQuery,
    ) -> StoreResult<Vec<Article>> {
        fetch_listing(&self.pool, Some(category), &query).await
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Article>> {
        let sql = format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE id = ?");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(read_err)?;
        row.as_ref().map(article_from_row).transpose()
    }

    async fn upsert(&self, article: &Article) -> StoreResult<UpsertOutcome> {
        let row = sqlx::query(
            r#"
            INSERT INTO articles
            (id, title, source, image, description, content, published_at, country, category)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (title, published_at) DO UPDATE SET
                source = excluded.source,
                image = excluded.image,
                description = excluded.description,
                content = excluded.content,
                country = excluded.country,
                category = excluded.category
            RETURNING id
            "#,
        )
        .bind(article.id.to_string())
        .bind(&article.title)
        .bind(&article.source)
        .bind(article.image.as_deref())
        .bind(article.description.as_deref())
        .bind(article.content.as_deref())
        .bind(ts(&article.published_at))
        .bind(article.country.as_deref())
        .bind(article.category.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        let id: String = row.try_get("id").map_err(read_err)?;
        let id = parse_id(&id)?;
        if id == article.id {
            Ok(UpsertOutcome::Inserted(id))
        } else {
            Ok(UpsertOutcome::Updated(id))
        }
    }

    async fn replace_all(&self, articles: &[Article]) -> StoreResult<usize> {
        let mut tx = self.pool.begin().await.map_err(write_err)?;
        sqlx::query("DELETE FROM articles")
            .execute(&mut *tx)
            .await
            .map_err(write_err)?;
        for a in articles {
            sqlx::query(INSERT_ARTICLE)
                .bind(a.id.to_string())
                .bind(&a.title)
                .bind(&a.source)
                .bind(a.image.as_deref())
                .bind(a.description.as_deref())
                .bind(a.content.as_deref())
                .bind(ts(&a.published_at))
                .bind(a.country.as_deref())
                .bind(a.category.as_str())
                .execute(&mut *tx)
                .await
                .map_err(write_err)?;
        }
        tx.commit().await.map_err(write_err)?;
        Ok(articles.len())
    }

    async fn count(&self) -> StoreResult<usize> {
        let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(read_err)?;
        Ok(n.max(0) as usize)
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn create(&self, user: &User) -> StoreResult<()> {
        let res = sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(ts(&user.created_at))
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::Conflict(user.email.clone()))
            }
            Err(e) => Err(write_err(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(read_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(read_err)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, email, password_hash, role, created_at FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(read_err)?;
        rows.iter().map(user_from_row).collect()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(write_err)?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.expect("memory db")
    }

    fn article(title: &str, secs: i64, category: Category) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: title.into(),
            source: "Wire".into(),
            image: Some("https://img.example/1.png".into()),
            description: Some("first".into()),
            content: None,
            published_at: Utc.timestamp_opt(secs, 0).unwrap(),
            country: None,
            category,
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_title_and_time() {
        let s = store().await;
        let first = article("Headline", 1_700_000_000, Category::Sports);
        let mut second = article("Headline", 1_700_000_000, Category::Sports);
        second.description = Some("second".into());

        assert_eq!(s.upsert(&first).await.unwrap(), UpsertOutcome::Inserted(first.id));
        assert_eq!(s.upsert(&second).await.unwrap(), UpsertOutcome::Updated(first.id));

        let all = s.list_all(ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn category_filter_sort_and_lookup() {
        let s = store().await;
        s.upsert(&article("a", 10, Category::Sports)).await.unwrap();
        s.upsert(&article("b", 30, Category::Sports)).await.unwrap();
        let g = article("c", 20, Category::General);
        s.upsert(&g).await.unwrap();

        let sports = s
            .find_by_category(Category::Sports, ListQuery::default())
            .await
            .unwrap();
        assert_eq!(sports.len(), 2);
        assert!(sports.iter().all(|a| a.category == Category::Sports));
        assert_eq!(sports[0].title, "b");

        let found = ArticleStore::find_by_id(&s, g.id)
            .await
            .unwrap()
            .expect("present");
        assert_eq!(found.title, "c");
        assert!(ArticleStore::find_by_id(&s, Uuid::new_v4())
            .await
            .unwrap()
            .is_none());

        let newest = s.list_all(ListQuery::newest(1)).await.unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].title, "b");
    }

    #[tokio::test]
    async fn replace_all_drops_previous_rows() {
        let s = store().await;
        s.upsert(&article("old", 10, Category::General)).await.unwrap();
        let n = s
            .replace_all(&[article("new", 20, Category::Politics)])
            .await
            .unwrap();
        assert_eq!(n, 1);
        let all = s.list_all(ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "new");
    }

    #[tokio::test]
    async fn users_roundtrip_and_unique_email() {
        let s = store().await;
        let u = User {
            id: Uuid::new_v4(),
            email: "admin@example.com".into(),
            password_hash: "hash".into(),
            role: Role::Admin,
            created_at: Utc::now(),
        };
        s.create(&u).await.unwrap();
        let dup = User {
            id: Uuid::new_v4(),
            ..u.clone()
        };
        assert!(matches!(s.create(&dup).await, Err(StoreError::Conflict(_))));

        let by_email = s.find_by_email("admin@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, u.id);
        assert_eq!(by_email.role, Role::Admin);
        assert_eq!(s.list().await.unwrap().len(), 1);
        assert!(s.delete(u.id).await.unwrap());
        assert!(UserStore::find_by_id(&s, u.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn day_window_filters_in_sql() {
        let s = store().await;
        let now = Utc::now().timestamp();
        s.upsert(&article("fresh", now - 3_600, Category::Sports)).await.unwrap();
        s.upsert(&article("stale", now - 10 * 86_400, Category::Sports)).await.unwrap();
        s.upsert(&article("fresh general", now - 60, Category::General)).await.unwrap();

        let week = s.list_all(ListQuery::within_days(7)).await.unwrap();
        let titles: Vec<_> = week.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["fresh general", "fresh"]);

        let sports = s
            .find_by_category(Category::Sports, ListQuery::within_days(7))
            .await
            .unwrap();
        assert_eq!(sports.len(), 1);
        assert_eq!(sports[0].title, "fresh");
    }

    #[tokio::test]
    async fn oversized_limit_is_clamped() {
        let s = store().await;
        s.upsert(&article("only", 10, Category::General)).await.unwrap();
        let all = s
            .list_all(ListQuery {
                limit: Some(usize::MAX),
                ..ListQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }
}
