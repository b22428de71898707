//! Terminal client for the news aggregator API.
//! Saved/offline shelves and the session token live in a local JSON state file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use news_aggregator::client::{
    api::DEFAULT_BASE_URL, ArticleShelf, FileCache, LocalCache, NewsClient, PageLoader,
    PageState, Session, Shelf,
};
use news_aggregator::model::{Article, Category};
use news_aggregator::store::{ListQuery, SortOrder};

#[derive(Parser, Debug)]
#[command(name = "newsctl", author, version, about)]
struct Cli {
    /// API base URL
    #[arg(long, env = "NEWS_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Local state file (saved articles, session token)
    #[arg(long, env = "NEWSCTL_STATE", default_value = ".newsctl.json")]
    state: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List articles, newest first
    List {
        #[arg(short, long)]
        category: Option<Category>,
        #[arg(short, long)]
        limit: Option<usize>,
        #[arg(long)]
        oldest: bool,
    },
    /// Most recent headlines
    Trending {
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,
    },
    /// Catch up on what was published in the last few days
    Missed {
        #[arg(short, long, default_value_t = DEFAULT_MISSED_DAYS)]
        days: u32,
    },
    /// Print one article
    Show { id: Uuid },
    /// Keep an article on a local shelf
    Save {
        id: Uuid,
        #[arg(long)]
        offline: bool,
    },
    /// List a local shelf
    Saved {
        #[arg(long)]
        offline: bool,
    },
    /// Remove an entry from a local shelf by its position
    Unsave {
        index: usize,
        #[arg(long)]
        offline: bool,
    },
    Signup {
        email: String,
        #[arg(long, env = "NEWSCTL_PASSWORD")]
        password: String,
    },
    Login {
        email: String,
        #[arg(long, env = "NEWSCTL_PASSWORD")]
        password: String,
    },
    Logout,
    Whoami,
    /// Bullet summary of an article
    Summarize { id: Uuid },
    /// Translate an article's text
    Translate {
        id: Uuid,
        #[arg(long, default_value = "es")]
        to: String,
    },
    /// Run the (placeholder) fake-news check on an article
    Check { id: Uuid },
    /// Trigger an ingestion run on the server
    Fetch,
    /// List accounts (admin)
    Users,
    /// Delete an account (admin)
    Ban { user_id: Uuid },
}

const DEFAULT_MISSED_DAYS: u32 = 7;

/// Shelves belong to a signed-in reader; the token is re-checked first.
async fn require_login(session: &mut Session) -> anyhow::Result<()> {
    if session.refresh().await.is_none() {
        bail!("login required: run `newsctl login <email>` first");
    }
    Ok(())
}

fn shelf(offline: bool) -> Shelf {
    if offline {
        Shelf::Offline
    } else {
        Shelf::Saved
    }
}

fn print_list(articles: &[Article]) {
    for (i, a) in articles.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} ({}, {})\n     {}",
            i,
            a.category,
            a.title,
            a.source,
            a.published_at.format("%Y-%m-%d %H:%M"),
            a.id
        );
    }
}

fn print_article(a: &Article) {
    println!("{}\n{} | {} | {}", a.title, a.source, a.category, a.published_at);
    if let Some(img) = &a.image {
        println!("image: {img}");
    }
    if let Some(body) = a.content.as_deref().or(a.description.as_deref()) {
        println!("\n{body}");
    }
}

fn body_of(a: &Article) -> String {
    a.content
        .clone()
        .or_else(|| a.description.clone())
        .unwrap_or_else(|| a.title.clone())
}

fn render(page: &PageLoader<Vec<Article>>) -> anyhow::Result<()> {
    page.with_state(|state| match state {
        PageState::Loading => {
            println!("Loading...");
            Ok(())
        }
        PageState::Ready(list) if list.is_empty() => {
            println!("No articles yet.");
            Ok(())
        }
        PageState::Ready(list) => {
            print_list(list);
            Ok(())
        }
        PageState::Failed(msg) => bail!("Failed to load news: {msg}"),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = NewsClient::new(&cli.api_url)?;
    let cache: Arc<dyn LocalCache> = Arc::new(
        FileCache::open(&cli.state)
            .with_context(|| format!("opening state file {}", cli.state.display()))?,
    );
    let shelves = ArticleShelf::new(Arc::clone(&cache));
    let mut session = Session::new(client.clone(), Arc::clone(&cache));

    match cli.command {
        Command::List {
            category,
            limit,
            oldest,
        } => {
            let query = ListQuery {
                limit,
                sort: if oldest {
                    SortOrder::Oldest
                } else {
                    SortOrder::Newest
                },
                ..ListQuery::default()
            };
            let page = PageLoader::new();
            match category {
                Some(c) => page.load(client.news_by_category(c, query)).await,
                None => page.load(client.news(query)).await,
            };
            render(&page)?;
        }
        Command::Trending { count } => {
            let page = PageLoader::new();
            page.load(client.trending(count)).await;
            render(&page)?;
        }
        Command::Missed { days } => {
            let page = PageLoader::new();
            page.load(client.missed(days)).await;
            render(&page)?;
        }
        Command::Show { id } => print_article(&client.article(id).await?),
        Command::Save { id, offline } => {
            require_login(&mut session).await?;
            let article = client.article(id).await?;
            let n = shelves.save(shelf(offline), article)?;
            println!("saved ({n} on shelf)");
        }
        Command::Saved { offline } => {
            require_login(&mut session).await?;
            let list = shelves.list(shelf(offline));
            if list.is_empty() {
                println!("Shelf is empty.");
            }
            print_list(&list);
        }
        Command::Unsave { index, offline } => {
            require_login(&mut session).await?;
            match shelves.remove(shelf(offline), index)? {
                Some(a) => println!("removed: {}", a.title),
                None => bail!("no entry at position {index}"),
            }
        }
        Command::Signup { email, password } => {
            let user = session.signup(&email, &password).await?;
            println!("signed up as {} ({})", user.email, user.role.as_str());
        }
        Command::Login { email, password } => {
            let user = session.login(&email, &password).await?;
            println!("logged in as {} ({})", user.email, user.role.as_str());
        }
        Command::Logout => {
            session.logout()?;
            println!("logged out");
        }
        Command::Whoami => match session.refresh().await {
            Some(u) => println!("{} ({}) {}", u.email, u.role.as_str(), u.id),
            None => println!("anonymous"),
        },
        Command::Summarize { id } => {
            let a = client.article(id).await?;
            for point in client.summarize(&a.title, &body_of(&a)).await? {
                println!("- {point}");
            }
        }
        Command::Translate { id, to } => {
            let a = client.article(id).await?;
            println!("{}", client.translate(&body_of(&a), &to).await?);
        }
        Command::Check { id } => {
            let a = client.article(id).await?;
            let v = client.detect_fake_news(&body_of(&a)).await?;
            println!("{:?} (confidence {:.2}) [placeholder classifier]", v.label, v.confidence);
        }
        Command::Fetch => {
            let s = client.trigger_fetch().await?;
            println!(
                "{} (inserted {}, updated {}, failed {})",
                s.message, s.inserted, s.updated, s.failed
            );
        }
        Command::Users => {
            let token = session.token().context("not logged in")?;
            for u in client.users(&token).await? {
                println!("{}  {}  {}", u.id, u.role.as_str(), u.email);
            }
        }
        Command::Ban { user_id } => {
            let token = session.token().context("not logged in")?;
            println!("{}", client.ban(&token, user_id).await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_with_category() {
        let cli = Cli::parse_from(["newsctl", "list", "--category", "sports", "-l", "3"]);
        match cli.command {
            Command::List {
                category, limit, ..
            } => {
                assert_eq!(category, Some(Category::Sports));
                assert_eq!(limit, Some(3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missed_defaults_to_one_week() {
        let cli = Cli::parse_from(["newsctl", "missed"]);
        assert!(matches!(cli.command, Command::Missed { days: 7 }));
        let cli = Cli::parse_from(["newsctl", "missed", "--days", "3"]);
        assert!(matches!(cli.command, Command::Missed { days: 3 }));
    }

    #[tokio::test]
    async fn shelves_need_a_live_session() {
        let cache: Arc<dyn LocalCache> = Arc::new(news_aggregator::client::MemoryCache::new());
        // No stored token, so the shelf stays closed without a round trip.
        let client = NewsClient::new("http://127.0.0.1:9").unwrap();
        let mut session = Session::new(client, cache);
        let err = require_login(&mut session).await.unwrap_err();
        assert!(err.to_string().contains("login required"));
    }

    #[test]
    fn unsave_defaults_to_saved_shelf() {
        let cli = Cli::parse_from(["newsctl", "unsave", "2"]);
        assert!(matches!(
            cli.command,
            Command::Unsave {
                index: 2,
                offline: false
            }
        ));
    }
}
