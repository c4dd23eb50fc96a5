//! Listening to the void
//!
//! The backend can't hand out a random row, so retrieval probes the id space:
//! generate a throwaway id from the same scheme as real ids, read a small
//! batch next to it, and pick among the eligible posts in that batch.
//!
//! Per attempt:
//! 1. Probe `id >= anchor` (ascending). If it has no unseen eligible post,
//!    probe `id < anchor` (descending) so the id space wraps around.
//! 2. Drop the caller's own posts and ids in the seen history.
//! 3. Pick uniformly among what's left.
//!
//! Up to `max_attempts` independent anchors are tried. Eligible posts that
//! were only excluded for being seen are kept as a fallback, so a void with
//! a single other post still answers. Sampling is biased toward ids that sit
//! right after large gaps; that's accepted in exchange for cheap queries.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::consts::{LISTEN_MAX_ATTEMPTS, LISTEN_QUERY_LIMIT};
use crate::history::SeenPostHistory;
use crate::store::{AuthorId, IdRange, Post, StoreError, VoidStore};

/// Result of one listen
#[derive(Debug, Clone, PartialEq)]
pub enum ListenOutcome {
    /// Someone else's thought
    Heard(Post),
    /// Nothing eligible anywhere we looked
    Silent,
}

/// Anchor-probe sampler
#[derive(Debug, Clone, Copy)]
pub struct VoidSampler {
    pub query_limit: usize,
    pub max_attempts: u32,
}

impl Default for VoidSampler {
    fn default() -> Self {
        Self {
            query_limit: LISTEN_QUERY_LIMIT,
            max_attempts: LISTEN_MAX_ATTEMPTS,
        }
    }
}

impl VoidSampler {
    /// Fetch one post by someone other than `listener`, preferring unseen ones
    ///
    /// On success the post id is recorded in `history`.
    pub async fn listen<R: Rng>(
        &self,
        store: &dyn VoidStore,
        listener: &AuthorId,
        history: &mut SeenPostHistory,
        rng: &mut R,
    ) -> Result<ListenOutcome, StoreError> {
        let mut fallback: Vec<Post> = Vec::new();

        for attempt in 1..=self.max_attempts {
            let anchor = store.generate_probe_id();

            let mut fresh = Vec::new();
            for range in [IdRange::AtOrAfter(anchor.clone()), IdRange::Before(anchor)] {
                let batch = store
                    .fetch_posts(range, Some(listener), self.query_limit)
                    .await?;
                for post in batch {
                    if &post.author_id == listener {
                        continue;
                    }
                    if history.contains(&post.id) {
                        if !fallback.iter().any(|p| p.id == post.id) {
                            fallback.push(post);
                        }
                    } else {
                        fresh.push(post);
                    }
                }
                if !fresh.is_empty() {
                    break;
                }
            }

            if let Some(post) = fresh.choose(rng) {
                log::debug!(
                    "Heard post {} on attempt {} ({} candidates)",
                    post.id,
                    attempt,
                    fresh.len()
                );
                history.remember(post.id.clone());
                return Ok(ListenOutcome::Heard(post.clone()));
            }
        }

        match fallback.choose(rng) {
            Some(post) => {
                log::debug!("Only seen posts left; repeating {}", post.id);
                history.remember(post.id.clone());
                Ok(ListenOutcome::Heard(post.clone()))
            }
            None => {
                log::debug!("The void is silent after {} attempts", self.max_attempts);
                Ok(ListenOutcome::Silent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualClock;
    use crate::store::{MemoryStore, PostId};
    use pollster::block_on;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;
    use std::rc::Rc;

    fn store() -> MemoryStore {
        MemoryStore::new(Rc::new(ManualClock::new(0.0)), 77)
    }

    #[test]
    fn test_single_eligible_post_always_returned() {
        let store = store();
        let me = AuthorId::new("me");
        let them = AuthorId::new("them");
        store.insert(&me, "my own thought");
        let only = store.insert(&them, "the only other thought");

        let sampler = VoidSampler::default();
        let mut history = SeenPostHistory::with_capacity(4);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            let outcome = block_on(sampler.listen(&store, &me, &mut history, &mut rng)).unwrap();
            match outcome {
                ListenOutcome::Heard(post) => assert_eq!(post.id, only),
                ListenOutcome::Silent => panic!("void should not be silent"),
            }
            assert!(history.len() <= 4);
        }
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_own_posts_only_is_silent() {
        let store = store();
        let me = AuthorId::new("me");
        for i in 0..5 {
            store.insert(&me, &format!("mine {}", i));
        }
        let mut history = SeenPostHistory::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let outcome =
            block_on(VoidSampler::default().listen(&store, &me, &mut history, &mut rng)).unwrap();
        assert_eq!(outcome, ListenOutcome::Silent);
        assert!(history.is_empty());
    }

    #[test]
    fn test_empty_void_is_silent() {
        let store = store();
        let mut history = SeenPostHistory::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let outcome = block_on(VoidSampler::default().listen(
            &store,
            &AuthorId::new("me"),
            &mut history,
            &mut rng,
        ))
        .unwrap();
        assert_eq!(outcome, ListenOutcome::Silent);
    }

    #[test]
    fn test_prefers_unseen_posts() {
        let store = store();
        let me = AuthorId::new("me");
        let them = AuthorId::new("them");
        let ids: Vec<PostId> = (0..6).map(|i| store.insert(&them, &format!("t{}", i))).collect();

        let sampler = VoidSampler::default();
        let mut history = SeenPostHistory::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut heard = HashSet::new();
        for _ in 0..ids.len() {
            match block_on(sampler.listen(&store, &me, &mut history, &mut rng)).unwrap() {
                ListenOutcome::Heard(post) => {
                    assert!(heard.insert(post.id), "repeated before exhausting unseen posts");
                }
                ListenOutcome::Silent => panic!("unexpected silence"),
            }
        }
        assert_eq!(heard.len(), ids.len());
    }

    #[test]
    fn test_history_stays_bounded() {
        let store = store();
        let them = AuthorId::new("them");
        for i in 0..30 {
            store.insert(&them, &format!("t{}", i));
        }
        let sampler = VoidSampler::default();
        let mut history = SeenPostHistory::with_capacity(5);
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..40 {
            block_on(sampler.listen(&store, &AuthorId::new("me"), &mut history, &mut rng)).unwrap();
            assert!(history.len() <= 5);
        }
    }

    #[test]
    fn test_store_error_propagates() {
        let store = store();
        store.insert(&AuthorId::new("them"), "x");
        store.fail_next_fetch(StoreError::Unavailable("offline".into()));
        let mut history = SeenPostHistory::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let result = block_on(VoidSampler::default().listen(
            &store,
            &AuthorId::new("me"),
            &mut history,
            &mut rng,
        ));
        assert_eq!(result, Err(StoreError::Unavailable("offline".into())));
    }
}
