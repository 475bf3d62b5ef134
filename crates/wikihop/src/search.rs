//! Concurrent path search engine
//!
//! The engine launches one task per newly claimed article. Each task fetches
//! that article's outbound links through the shared rate gate, races every
//! link through the visited set, and either reports the target, spawns a
//! child task for a fresh claim, or skips a title some sibling already owns.
//! The first task to deliver a result (the discovered path, or a fatal
//! fetch error) wins; everyone else drains out without touching the result
//! slot.
//!
//! Sibling order and scheduling decide which path is reported first; the
//! engine makes no shortest-path promise.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

use crate::error::{Error, Result};
use crate::path::PathNode;
use crate::rate_limit::{RateLimiter, SpacedRateLimiter};
use crate::source::{LinkSource, ANON_REQUESTS_PER_HOUR};
use crate::visited::{ClaimOutcome, VisitedSet};

/// Default ceiling on simultaneously running fetches.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 64;

/// A discovered chain of article links, start to target inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundPath {
    titles: Vec<String>,
}

impl FoundPath {
    /// The articles on the path, start first.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Number of articles on the path.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.titles.len()
    }

    /// Consume the path, yielding its titles.
    #[must_use]
    pub fn into_titles(self) -> Vec<String> {
        self.titles
    }
}

impl std::fmt::Display for FoundPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.titles.join(" -> "))
    }
}

/// Concurrent link-graph search over a [`LinkSource`].
///
/// # Example
///
/// ```rust,no_run
/// use wikihop::search::PathSearch;
/// use wikihop::source::ArticleSource;
///
/// # async fn example() -> wikihop::Result<()> {
/// let search = PathSearch::builder(ArticleSource::new())
///     .max_concurrent_fetches(16)
///     .build();
///
/// let found = search.find_path("Tea", "General_relativity").await?;
/// println!("{found} ({} articles)", found.hops());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct PathSearch<S> {
    source: Arc<S>,
    limiter: Arc<dyn RateLimiter>,
    max_concurrent_fetches: Option<usize>,
}

impl<S: LinkSource + 'static> PathSearch<S> {
    /// Create a search with default settings over `source`.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::builder(source).build()
    }

    /// Create a builder for `PathSearch` over `source`.
    #[must_use]
    pub fn builder(source: S) -> PathSearchBuilder<S> {
        PathSearchBuilder {
            source,
            rate_limiter: None,
            max_concurrent_fetches: None,
        }
    }

    /// Discover a chain of links connecting `start` to `target`.
    ///
    /// Returns once the first concurrent explorer delivers an outcome:
    /// a found path, a fatal fetch error, or
    /// [`Error::TargetUnreachable`] after the finite reachable graph is
    /// fully explored.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] for empty titles; any [`LinkSource`] error,
    /// propagated untouched; [`Error::TargetUnreachable`] on a dry
    /// frontier.
    pub async fn find_path(&self, start: &str, target: &str) -> Result<FoundPath> {
        if start.is_empty() || target.is_empty() {
            return Err(Error::invalid_input(
                "start and target titles must be non-empty",
            ));
        }
        if start == target {
            return Ok(FoundPath {
                titles: vec![start.to_string()],
            });
        }

        let (results_tx, mut results_rx) = mpsc::channel(1);
        let state = Arc::new(SearchState {
            source: Arc::clone(&self.source),
            limiter: Arc::clone(&self.limiter),
            visited: VisitedSet::new(),
            target: target.to_string(),
            results: results_tx,
            finished: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
            fetch_permits: self
                .max_concurrent_fetches
                .map(|limit| Arc::new(Semaphore::new(limit))),
        });

        state.visited.claim(start);
        spawn_explorer(&state, PathNode::root(start));

        let node = results_rx
            .recv()
            .await
            .ok_or_else(|| Error::internal("search ended without delivering a result"))??;

        Ok(FoundPath {
            titles: node.trace(),
        })
    }
}

/// Builder for [`PathSearch`]
#[derive(Debug)]
pub struct PathSearchBuilder<S> {
    source: S,
    rate_limiter: Option<Arc<dyn RateLimiter>>,
    max_concurrent_fetches: Option<Option<usize>>,
}

impl<S: LinkSource + 'static> PathSearchBuilder<S> {
    /// Gate fetches through `limiter`.
    ///
    /// Default: a [`SpacedRateLimiter`] sized for the anonymous Wikipedia
    /// budget.
    #[must_use]
    pub fn rate_limiter<L: RateLimiter + 'static>(mut self, limiter: L) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    /// Cap the number of simultaneously running fetches.
    ///
    /// Default: [`DEFAULT_MAX_CONCURRENT_FETCHES`]. A cap of zero means
    /// unbounded.
    #[must_use]
    pub fn max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = Some((limit > 0).then_some(limit));
        self
    }

    /// Build the [`PathSearch`]
    #[must_use]
    pub fn build(self) -> PathSearch<S> {
        PathSearch {
            source: Arc::new(self.source),
            limiter: self
                .rate_limiter
                .unwrap_or_else(|| Arc::new(SpacedRateLimiter::per_hour(ANON_REQUESTS_PER_HOUR))),
            max_concurrent_fetches: self
                .max_concurrent_fetches
                .unwrap_or(Some(DEFAULT_MAX_CONCURRENT_FETCHES)),
        }
    }
}

/// State shared by every explorer task of one search.
struct SearchState<S> {
    source: Arc<S>,
    limiter: Arc<dyn RateLimiter>,
    visited: VisitedSet,
    target: String,
    results: mpsc::Sender<Result<Arc<PathNode>>>,
    /// Set by the first delivery; later tasks stop early instead of
    /// running to exhaustion.
    finished: AtomicBool,
    /// Outstanding explorer tasks. Zero with no delivery means the
    /// reachable graph ran dry.
    in_flight: AtomicUsize,
    /// `None` = unbounded fan-out.
    fetch_permits: Option<Arc<Semaphore>>,
}

impl<S> SearchState<S> {
    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Deliver the search outcome. The first caller wins; every later
    /// outcome is discarded without blocking.
    fn deliver(&self, result: Result<Arc<PathNode>>) {
        if self.finished.swap(true, Ordering::AcqRel) {
            return;
        }
        // Capacity-1 channel: the winning send always fits. A closed
        // channel means the caller stopped listening, which is equally
        // final.
        let _ = self.results.try_send(result);
    }
}

fn spawn_explorer<S: LinkSource + 'static>(state: &Arc<SearchState<S>>, node: Arc<PathNode>) {
    // Counted before the spawn, so the frontier can never read as empty
    // while a just-claimed article has yet to start exploring.
    state.in_flight.fetch_add(1, Ordering::AcqRel);
    tokio::spawn(explore(Arc::clone(state), node));
}

fn explore<S: LinkSource + 'static>(
    state: Arc<SearchState<S>>,
    node: Arc<PathNode>,
) -> Pin<Box<dyn Future<Output = ()> + Send>> {
    // Boxed: the task spawns copies of itself, and the indirection keeps
    // the future type finite.
    Box::pin(async move {
        explore_article(&state, &node).await;
        if state.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 && !state.is_finished() {
            let explored = state.visited.len();
            tracing::debug!(explored, "frontier exhausted without finding the target");
            state.deliver(Err(Error::TargetUnreachable {
                target: state.target.clone(),
                explored,
            }));
        }
    })
}

async fn explore_article<S: LinkSource + 'static>(
    state: &Arc<SearchState<S>>,
    node: &Arc<PathNode>,
) {
    if state.is_finished() {
        return;
    }

    // Hold a fetch permit for the duration of the fetch, if bounded.
    let _permit = match &state.fetch_permits {
        Some(semaphore) => match Arc::clone(semaphore).acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(_) => {
                // The semaphore is never closed while a search runs.
                state.deliver(Err(Error::internal("fetch permit semaphore closed")));
                return;
            }
        },
        None => None,
    };

    if state.is_finished() {
        return;
    }

    tracing::debug!(article = %node.title(), depth = node.depth(), "exploring article");

    state.limiter.acquire().await;

    let links = match state.source.outbound_links(node.title()).await {
        Ok(links) => links,
        Err(err) => {
            tracing::error!(article = %node.title(), error = %err, "fetch failed, aborting search");
            state.deliver(Err(err));
            return;
        }
    };

    for title in links {
        if state.is_finished() {
            return;
        }
        // The match check and the claim share one critical section inside
        // `claim_or_match`; its lock is released before anything below
        // runs, so a winning delivery never blocks a racing sibling.
        match state.visited.claim_or_match(&title, &state.target) {
            ClaimOutcome::Matched => {
                let found = PathNode::child(node, title);
                tracing::debug!(hops = found.depth(), "target found");
                state.deliver(Ok(found));
                return;
            }
            ClaimOutcome::Claimed => {
                spawn_explorer(state, PathNode::child(node, title));
            }
            ClaimOutcome::AlreadySeen => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_path_accessors() {
        let found = FoundPath {
            titles: vec!["A".to_string(), "B".to_string()],
        };
        assert_eq!(found.hops(), 2);
        assert_eq!(found.titles(), ["A", "B"]);
        assert_eq!(found.to_string(), "A -> B");
        assert_eq!(found.into_titles(), vec!["A", "B"]);
    }

    #[test]
    fn test_builder_zero_cap_means_unbounded() {
        #[derive(Debug)]
        struct NullSource;

        #[async_trait::async_trait]
        impl LinkSource for NullSource {
            async fn outbound_links(&self, _title: &str) -> Result<Vec<String>> {
                Ok(Vec::new())
            }
        }

        let search = PathSearch::builder(NullSource)
            .max_concurrent_fetches(0)
            .build();
        assert_eq!(search.max_concurrent_fetches, None);

        let bounded = PathSearch::builder(NullSource).build();
        assert_eq!(
            bounded.max_concurrent_fetches,
            Some(DEFAULT_MAX_CONCURRENT_FETCHES)
        );
    }
}
