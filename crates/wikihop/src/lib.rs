//! # wikihop
//!
//! Concurrent search for a chain of hyperlinks connecting two Wikipedia
//! articles, crawling the live link graph instead of materializing it.
//!
//! ## How it works
//!
//! Every newly discovered article is claimed in a shared visited set and
//! explored by its own task. All fetches pass through one process-wide rate
//! gate, so concurrency overlaps parsing and bookkeeping without exceeding
//! Wikipedia's request budget. The first task to reach the target delivers
//! the search's single result; a fatal fetch error or an exhausted frontier
//! ends the search the same way.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use wikihop::search::PathSearch;
//! use wikihop::source::ArticleSource;
//!
//! # tokio_test::block_on(async {
//! let search = PathSearch::new(ArticleSource::new());
//!
//! let found = search.find_path("Coffee", "Special_relativity").await.unwrap();
//! println!("Path: {found}");
//! println!("Length: {}", found.hops());
//! # });
//! ```

pub mod error;
pub mod path;
pub mod rate_limit;
pub mod search;
pub mod source;
pub mod visited;

pub use error::{Error, Result};
pub use search::{FoundPath, PathSearch};
pub use source::{ArticleSource, LinkSource};
