//! End-to-end tests for the reaction store
//!
//! These run against the in-memory repository, so they need no database:
//!
//! ```bash
//! cargo test -p integration-tests
//! ```

use std::time::Duration;

use futures::future::join_all;

use integration_tests::{reaction_on, seed_messages, unique_id, TestStore};
use reaction_core::Reaction;
use reaction_db::FailPoint;

// ============================================================================
// Save
// ============================================================================

#[tokio::test]
async fn test_save_flags_message() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let before = ctx.message(&posts[0]).await.unwrap();
    assert!(!before.has_reactions);

    let saved = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();

    let after = ctx.message(&posts[0]).await.unwrap();
    assert!(after.has_reactions);
    assert!(after.updated_at > before.updated_at);
    assert!(saved.created_at >= before.updated_at);
}

#[tokio::test]
async fn test_save_is_idempotent() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let reaction = reaction_on(&posts[0], "smile");

    ctx.store.save(reaction.clone()).await.unwrap();
    let flagged = ctx.message(&posts[0]).await.unwrap();

    let again = ctx.store.save(reaction.clone()).await.unwrap();

    assert!(again.same_identity(&reaction));
    assert_eq!(ctx.repo.reactions().await.len(), 1);
    assert_eq!(ctx.message(&posts[0]).await.unwrap(), flagged);
}

#[tokio::test]
async fn test_save_rejects_oversized_emoji() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;

    let err = ctx
        .store
        .save(reaction_on(&posts[0], &"x".repeat(65)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "INVALID_REACTION");
    assert!(ctx.repo.reactions().await.is_empty());
    assert!(!ctx.message(&posts[0]).await.unwrap().has_reactions);
}

#[tokio::test]
async fn test_save_flag_failure_leaves_no_trace() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let before = ctx.message(&posts[0]).await.unwrap();
    ctx.repo.fail(FailPoint::RefreshFlag(posts[0].clone()));

    let err = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap_err();

    assert_eq!(err.code(), "REACTION_FLAG_UPDATE_FAILED");
    assert!(ctx.repo.reactions().await.is_empty());
    assert_eq!(ctx.message(&posts[0]).await.unwrap(), before);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_saves() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let reaction = reaction_on(&posts[0], "party");

    let results = join_all((0..16).map(|_| ctx.store.save(reaction.clone()))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(ctx.repo.reactions().await.len(), 1);
    assert!(ctx.message(&posts[0]).await.unwrap().has_reactions);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_delete_last_reaction_clears_flag() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let first = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();
    let second = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();

    ctx.store.delete(first).await.unwrap();
    let still_flagged = ctx.message(&posts[0]).await.unwrap();
    assert!(still_flagged.has_reactions);

    ctx.store.delete(second).await.unwrap();
    let cleared = ctx.message(&posts[0]).await.unwrap();
    assert!(!cleared.has_reactions);
    assert!(cleared.updated_at > still_flagged.updated_at);
}

#[tokio::test]
async fn test_flag_untouched_while_other_reactions_remain() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let first = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();
    let flagged = ctx.message(&posts[0]).await.unwrap();
    assert!(flagged.has_reactions);

    ctx.store.save(reaction_on(&posts[0], "party")).await.unwrap();
    assert_eq!(ctx.message(&posts[0]).await.unwrap(), flagged);

    ctx.store.delete(first).await.unwrap();
    assert_eq!(ctx.message(&posts[0]).await.unwrap(), flagged);
}

#[tokio::test]
async fn test_delete_missing_reaction_succeeds() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    let before = ctx.message(&posts[0]).await.unwrap();

    let deleted = ctx.store.delete(reaction_on(&posts[0], "smile")).await.unwrap();

    assert_eq!(deleted.post_id, posts[0]);
    assert_eq!(ctx.message(&posts[0]).await.unwrap(), before);
}

// ============================================================================
// GetForPost and caching
// ============================================================================

#[tokio::test]
async fn test_reactions_ordered_by_creation() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;

    let mut saved = Vec::new();
    for emoji in ["one", "two", "three"] {
        saved.push(ctx.store.save(reaction_on(&posts[0], emoji)).await.unwrap());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let reactions = ctx.store.get_for_post(posts[0].as_str(), false).await.unwrap();

    let emojis: Vec<&str> = reactions.iter().map(|r| r.emoji_name.as_str()).collect();
    assert_eq!(emojis, vec!["one", "two", "three"]);
    assert_eq!(reactions.to_vec(), saved);
}

#[tokio::test]
async fn test_unknown_post_has_no_reactions() {
    let ctx = TestStore::new().unwrap();
    let reactions = ctx.store.get_for_post(unique_id("post"), true).await.unwrap();
    assert!(reactions.is_empty());
}

#[tokio::test]
async fn test_cached_read_skips_storage() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();

    let first = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    let second = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ctx.repo.post_reads(), 1);
    assert_eq!(ctx.metrics.misses(), 1);
    assert_eq!(ctx.metrics.hits(), 1);
    assert!((ctx.store.cache_stats().hit_rate() - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_uncached_read_always_queries() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;

    ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    ctx.store.get_for_post(posts[0].as_str(), false).await.unwrap();
    ctx.store.get_for_post(posts[0].as_str(), false).await.unwrap();

    assert_eq!(ctx.repo.post_reads(), 3);
    assert_eq!(ctx.metrics.hits(), 0);
    assert_eq!(ctx.metrics.misses(), 3);

    let stats = ctx.store.cache_stats();
    assert_eq!(stats.hits, ctx.metrics.hits());
    assert_eq!(stats.misses, ctx.metrics.misses());
}

#[tokio::test]
async fn test_write_invalidates_cached_read() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;

    let empty = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    assert!(empty.is_empty());

    let saved = ctx.store.save(reaction_on(&posts[0], "smile")).await.unwrap();
    let after_save = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    assert_eq!(after_save.to_vec(), vec![saved.clone()]);

    ctx.store.delete(saved).await.unwrap();
    let after_delete = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    assert!(after_delete.is_empty());
    assert_eq!(ctx.repo.post_reads(), 3);
}

#[tokio::test]
async fn test_failed_read_leaves_cache_untouched() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    ctx.repo.fail(FailPoint::ReadForPost);

    let err = ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap_err();
    assert_eq!(err.code(), "REACTION_READ_FAILED");
    assert_eq!(ctx.store.cache_stats().entries, 0);

    ctx.repo.clear_failures();
    ctx.store.get_for_post(posts[0].as_str(), true).await.unwrap();
    assert_eq!(ctx.repo.post_reads(), 2);
}

#[tokio::test]
async fn test_manual_invalidation() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 2).await;
    for post_id in &posts {
        ctx.store.get_for_post(post_id.as_str(), true).await.unwrap();
    }
    assert_eq!(ctx.store.cache_stats().entries, 2);

    ctx.store.invalidate_cache_for_post(&posts[0]);
    assert_eq!(ctx.store.cache_stats().entries, 1);

    ctx.store.invalidate_cache();
    assert_eq!(ctx.store.cache_stats().entries, 0);
}

// ============================================================================
// DeleteAllWithEmojiName
// ============================================================================

#[tokio::test]
async fn test_bulk_delete_recomputes_each_message() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 2).await;
    ctx.store.save(reaction_on(&posts[0], "party")).await.unwrap();
    ctx.store.save(reaction_on(&posts[1], "party")).await.unwrap();
    ctx.store.save(reaction_on(&posts[1], "smile")).await.unwrap();
    ctx.store.get_for_post(posts[1].as_str(), true).await.unwrap();

    let report = ctx.store.delete_all_with_emoji_name("party").await.unwrap();

    assert_eq!(report.deleted_rows, 2);
    assert!(report.is_complete());
    assert!(!ctx.message(&posts[0]).await.unwrap().has_reactions);
    assert!(ctx.message(&posts[1]).await.unwrap().has_reactions);

    let remaining = ctx.store.get_for_post(posts[1].as_str(), true).await.unwrap();
    let emojis: Vec<&str> = remaining.iter().map(|r| r.emoji_name.as_str()).collect();
    assert_eq!(emojis, vec!["smile"]);
}

#[tokio::test]
async fn test_bulk_delete_tolerates_flag_failures() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 3).await;
    for post_id in &posts {
        ctx.store.save(reaction_on(post_id, "party")).await.unwrap();
    }
    ctx.repo.fail(FailPoint::RefreshFlag(posts[1].clone()));

    let report = ctx.store.delete_all_with_emoji_name("party").await.unwrap();

    assert_eq!(report.deleted_rows, 3);
    assert_eq!(report.failed_posts, vec![posts[1].clone()]);
    assert!(ctx.repo.reactions().await.is_empty());
    assert!(!ctx.message(&posts[0]).await.unwrap().has_reactions);
    assert!(ctx.message(&posts[1]).await.unwrap().has_reactions);
    assert!(!ctx.message(&posts[2]).await.unwrap().has_reactions);
}

#[tokio::test]
async fn test_bulk_delete_read_failure_changes_nothing() {
    let ctx = TestStore::new().unwrap();
    let posts = seed_messages(&ctx.repo, 1).await;
    ctx.store.save(reaction_on(&posts[0], "party")).await.unwrap();
    ctx.repo.fail(FailPoint::ReadWithEmoji);

    let err = ctx.store.delete_all_with_emoji_name("party").await.unwrap_err();

    assert_eq!(err.code(), "REACTION_READ_FAILED");
    assert_eq!(ctx.repo.reactions().await.len(), 1);
}

// ============================================================================
// Executor
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_operations_with_small_pool() {
    let ctx = TestStore::with_max_in_flight(2).unwrap();
    let posts = seed_messages(&ctx.repo, 4).await;

    let reactions: Vec<Reaction> = posts
        .iter()
        .flat_map(|post_id| (0..5).map(move |i| reaction_on(post_id, &format!("emoji{i}"))))
        .collect();
    let results = join_all(reactions.into_iter().map(|r| ctx.store.save(r))).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(ctx.repo.reactions().await.len(), 20);
    for post_id in &posts {
        assert!(ctx.message(post_id).await.unwrap().has_reactions);
    }
}
