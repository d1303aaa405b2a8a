//! Bulk maintenance: remove an emoji from every message
//!
//! Runs without an enclosing transaction. The collect and purge phases are
//! fatal; flag recomputation afterwards is best effort per message, so one
//! broken message never blocks the removal for the rest.

use std::collections::BTreeSet;
use std::fmt;

use chrono::Utc;
use tracing::{info, warn};

use reaction_core::traits::ReactionRepository;
use reaction_core::{Operation, StoreError, StoreResult};

const OP: Operation = Operation::DeleteAllWithEmojiName;

/// Phases of a bulk emoji deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    /// Read matching reactions and collect the messages they belong to
    Collect,
    /// Delete every matching reaction in one statement
    Purge,
    /// Recompute `has_reactions` of each collected message
    Recompute,
}

impl fmt::Display for BulkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collect => write!(f, "collect"),
            Self::Purge => write!(f, "purge"),
            Self::Recompute => write!(f, "recompute"),
        }
    }
}

/// Outcome of a bulk emoji deletion whose purge phase succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub emoji_name: String,
    /// Rows removed by the purge phase
    pub deleted_rows: u64,
    /// Messages that had at least one matching reaction, sorted
    pub affected_posts: Vec<String>,
    /// Messages whose flag recomputation failed, sorted
    pub failed_posts: Vec<String>,
}

impl BulkDeleteReport {
    /// True when every affected message's flag was recomputed
    pub fn is_complete(&self) -> bool {
        self.failed_posts.is_empty()
    }
}

/// A single bulk deletion, driven phase by phase
pub(crate) struct BulkDeletion<'a, R> {
    repo: &'a R,
    emoji_name: &'a str,
}

impl<'a, R: ReactionRepository> BulkDeletion<'a, R> {
    pub(crate) fn new(repo: &'a R, emoji_name: &'a str) -> Self {
        Self { repo, emoji_name }
    }

    pub(crate) async fn run(self) -> StoreResult<BulkDeleteReport> {
        let affected_posts = self.collect().await?;
        let deleted_rows = self.purge().await?;
        let failed_posts = self.recompute(&affected_posts).await;

        info!(
            emoji_name = %self.emoji_name,
            deleted_rows,
            affected = affected_posts.len(),
            failed = failed_posts.len(),
            "Deleted all reactions with emoji"
        );

        Ok(BulkDeleteReport {
            emoji_name: self.emoji_name.to_string(),
            deleted_rows,
            affected_posts,
            failed_posts,
        })
    }

    async fn collect(&self) -> StoreResult<Vec<String>> {
        let reactions = self
            .repo
            .reactions_with_emoji(self.emoji_name)
            .await
            .map_err(|source| self.fatal(BulkPhase::Collect, StoreError::Read { op: OP, source }))?;

        let posts: BTreeSet<String> = reactions.into_iter().map(|r| r.post_id).collect();
        Ok(posts.into_iter().collect())
    }

    async fn purge(&self) -> StoreResult<u64> {
        self.repo
            .delete_with_emoji(self.emoji_name)
            .await
            .map_err(|source| self.fatal(BulkPhase::Purge, StoreError::Write { op: OP, source }))
    }

    /// Returns the messages whose recomputation failed
    async fn recompute(&self, posts: &[String]) -> Vec<String> {
        let mut failed = Vec::new();

        for post_id in posts {
            if let Err(source) = self.repo.refresh_post_flag(post_id, Utc::now()).await {
                let error = StoreError::FlagRecompute {
                    op: OP,
                    post_id: post_id.clone(),
                    source,
                };
                warn!(
                    phase = %BulkPhase::Recompute,
                    emoji_name = %self.emoji_name,
                    post_id = %post_id,
                    error = %error,
                    "Unable to update has_reactions of message"
                );
                failed.push(post_id.clone());
            }
        }

        failed
    }

    fn fatal(&self, phase: BulkPhase, error: StoreError) -> StoreError {
        warn!(
            phase = %phase,
            emoji_name = %self.emoji_name,
            error = %error,
            "Bulk emoji deletion aborted"
        );
        error
    }
}
