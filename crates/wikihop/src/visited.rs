//! Shared visited set with atomic claims
//!
//! The visited set is the single synchronization point of a search: every
//! concurrent explorer races its candidate links through it, and whoever
//! inserts a title first gains the exclusive right to explore that article.
//! Entries are only ever added, never removed, for the lifetime of one
//! search.

use std::collections::HashSet;
use std::sync::Mutex;

/// Outcome of screening one candidate link against the target and the
/// visited set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The candidate is the target article. Takes precedence over any claim
    /// state, including titles another task already claimed.
    Matched,
    /// The candidate was unvisited and is now claimed by the caller.
    Claimed,
    /// Some other task already claimed the candidate.
    AlreadySeen,
}

/// Membership table of article titles already claimed by some in-flight or
/// completed exploration.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<String>>,
}

impl VisitedSet {
    /// Create an empty visited set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // A panic while holding the lock leaves the set intact; claims can
        // continue against the same state.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Atomically claim `title`: returns `true` and marks it visited if it
    /// was not already present, `false` otherwise.
    ///
    /// Linearizable across all concurrent callers: for any one title,
    /// exactly one `claim` call ever returns `true`.
    pub fn claim(&self, title: &str) -> bool {
        self.lock().insert(title.to_string())
    }

    /// Screen one candidate link in a single critical section: the
    /// target-match check and the claim are evaluated under the same lock,
    /// match first.
    ///
    /// The two checks cannot be split: a racing sibling may claim a title
    /// in between, and a claimed title that equals the target must still
    /// report [`ClaimOutcome::Matched`]. The lock is released before this
    /// returns, so the caller never delivers a result while holding it.
    pub fn claim_or_match(&self, candidate: &str, target: &str) -> ClaimOutcome {
        let mut seen = self.lock();
        if candidate == target {
            ClaimOutcome::Matched
        } else if seen.insert(candidate.to_string()) {
            ClaimOutcome::Claimed
        } else {
            ClaimOutcome::AlreadySeen
        }
    }

    /// Whether `title` has been claimed.
    #[must_use]
    pub fn contains(&self, title: &str) -> bool {
        self.lock().contains(title)
    }

    /// Number of claimed titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no title has been claimed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_claim_once() {
        let visited = VisitedSet::new();
        assert!(visited.claim("Alpha"));
        assert!(!visited.claim("Alpha"));
        assert!(visited.contains("Alpha"));
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_match_takes_precedence_over_claim() {
        let visited = VisitedSet::new();
        assert_eq!(visited.claim_or_match("End", "End"), ClaimOutcome::Matched);
        // A match never consumes a visited slot.
        assert!(!visited.contains("End"));

        // Even a title already claimed by a sibling still matches.
        assert!(visited.claim("End"));
        assert_eq!(visited.claim_or_match("End", "End"), ClaimOutcome::Matched);
    }

    #[test]
    fn test_claim_or_match_claims_fresh_titles() {
        let visited = VisitedSet::new();
        assert_eq!(
            visited.claim_or_match("Beta", "End"),
            ClaimOutcome::Claimed
        );
        assert_eq!(
            visited.claim_or_match("Beta", "End"),
            ClaimOutcome::AlreadySeen
        );
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_growth_is_monotonic() {
        let visited = VisitedSet::new();
        let mut last = 0;
        for title in ["A", "B", "B", "C", "A", "D"] {
            visited.claim(title);
            let len = visited.len();
            assert!(len >= last);
            last = len;
        }
        assert_eq!(visited.len(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_claim_race_has_one_winner() {
        let visited = Arc::new(VisitedSet::new());
        let winners = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let visited = Arc::clone(&visited);
            let winners = Arc::clone(&winners);
            handles.push(tokio::spawn(async move {
                if visited.claim("Contested") {
                    winners.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.await.expect("claim task panicked");
        }

        assert_eq!(winners.load(Ordering::SeqCst), 1);
        assert_eq!(visited.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_claim_or_match_race_has_one_claimer() {
        let visited = Arc::new(VisitedSet::new());
        let claimed = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..64 {
            let visited = Arc::clone(&visited);
            let claimed = Arc::clone(&claimed);
            handles.push(tokio::spawn(async move {
                match visited.claim_or_match("Contested", "End") {
                    ClaimOutcome::Claimed => {
                        claimed.fetch_add(1, Ordering::SeqCst);
                    }
                    ClaimOutcome::AlreadySeen => {}
                    ClaimOutcome::Matched => unreachable!("'Contested' is not the target"),
                }
            }));
        }
        for handle in handles {
            handle.await.expect("claim task panicked");
        }

        assert_eq!(claimed.load(Ordering::SeqCst), 1);
    }
}
