// src/client/mod.rs
//! Client side of the aggregator: typed API access, local article shelves,
//! the session token and per-page loading state.

pub mod api;
pub mod cache;
pub mod library;
pub mod page;
pub mod session;

pub use api::{ClientError, ClientResult, FetchSummary, NewsClient};
pub use cache::{CacheError, FileCache, LocalCache, MemoryCache};
pub use library::{ArticleShelf, Shelf};
pub use page::{PageLoader, PageState, Ticket};
pub use session::Session;
