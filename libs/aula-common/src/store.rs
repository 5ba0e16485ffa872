use crate::redis as keys;
use crate::types::{Challenge, Submission};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Persistence seam for graded submissions.
///
/// Submissions are append-only; there is no update operation on purpose.
/// `next_attempt` must return strictly increasing values per
/// (user, challenge) pair even when called concurrently.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn next_attempt(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32>;
    async fn record(&self, submission: &Submission) -> anyhow::Result<()>;
    async fn attempt_count(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32>;
}

/// Read-only access to challenge definitions, which are owned by the
/// course-authoring subsystem.
#[async_trait]
pub trait ChallengeSource: Send + Sync {
    async fn fetch(&self, challenge_id: &Uuid) -> anyhow::Result<Option<Challenge>>;
}

/// Redis-backed store used in production. ConnectionManager multiplexes a
/// single connection and is cheap to clone per call.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Look up a persisted submission record. Records are already redacted
    /// at write time, so they are safe to return as-is.
    pub async fn submission(&self, submission_id: &Uuid) -> anyhow::Result<Option<Submission>> {
        let mut conn = self.conn.clone();
        Ok(keys::get_submission(&mut conn, submission_id).await?)
    }
}

#[async_trait]
impl SubmissionStore for RedisStore {
    async fn next_attempt(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32> {
        let mut conn = self.conn.clone();
        Ok(keys::next_attempt(&mut conn, user_id, challenge_id).await?)
    }

    async fn record(&self, submission: &Submission) -> anyhow::Result<()> {
        let mut conn = self.conn.clone();
        Ok(keys::record_submission(&mut conn, submission).await?)
    }

    async fn attempt_count(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32> {
        let mut conn = self.conn.clone();
        Ok(keys::attempt_count(&mut conn, user_id, challenge_id).await?)
    }
}

#[async_trait]
impl ChallengeSource for RedisStore {
    async fn fetch(&self, challenge_id: &Uuid) -> anyhow::Result<Option<Challenge>> {
        let mut conn = self.conn.clone();
        Ok(keys::get_challenge(&mut conn, challenge_id).await?)
    }
}

/// In-memory store for tests and local development.
#[derive(Default)]
pub struct MemoryStore {
    inner: std::sync::Mutex<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    attempts: std::collections::HashMap<(Uuid, Uuid), u32>,
    submissions: Vec<Submission>,
    challenges: std::collections::HashMap<Uuid, Challenge>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_challenge(&self, challenge: Challenge) {
        let mut inner = self.inner.lock().unwrap();
        inner.challenges.insert(challenge.id, challenge);
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.inner.lock().unwrap().submissions.clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn next_attempt(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32> {
        let mut inner = self.inner.lock().unwrap();
        let counter = inner.attempts.entry((*user_id, *challenge_id)).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    async fn record(&self, submission: &Submission) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.submissions.push(submission.clone());
        Ok(())
    }

    async fn attempt_count(&self, user_id: &Uuid, challenge_id: &Uuid) -> anyhow::Result<u32> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .attempts
            .get(&(*user_id, *challenge_id))
            .copied()
            .unwrap_or(0))
    }
}

#[async_trait]
impl ChallengeSource for MemoryStore {
    async fn fetch(&self, challenge_id: &Uuid) -> anyhow::Result<Option<Challenge>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.challenges.get(challenge_id).cloned())
    }
}
