use crate::types::{Challenge, Submission};
use redis::{AsyncCommands, RedisResult};
use uuid::Uuid;

/// Redis key semantics - defines only semantics, not runtime logic.
/// Keeps the engine and any reporting consumers on the same deterministic
/// key layout.

pub const SUBMISSION_PREFIX: &str = "aula:submission";
pub const SUBMISSION_INDEX_PREFIX: &str = "aula:submissions";
pub const ATTEMPT_PREFIX: &str = "aula:attempts";
pub const CHALLENGE_PREFIX: &str = "aula:challenge";

/// Key holding one persisted submission record.
pub fn submission_key(submission_id: &Uuid) -> String {
    format!("{}:{}", SUBMISSION_PREFIX, submission_id)
}

/// List of submission ids for one (user, challenge) pair, in creation order.
pub fn submission_index_key(user_id: &Uuid, challenge_id: &Uuid) -> String {
    format!("{}:{}:{}", SUBMISSION_INDEX_PREFIX, user_id, challenge_id)
}

/// Monotonic attempt counter for one (user, challenge) pair.
pub fn attempt_key(user_id: &Uuid, challenge_id: &Uuid) -> String {
    format!("{}:{}:{}", ATTEMPT_PREFIX, user_id, challenge_id)
}

/// Challenge document, written by the course-authoring subsystem.
pub fn challenge_key(challenge_id: &Uuid) -> String {
    format!("{}:{}", CHALLENGE_PREFIX, challenge_id)
}

fn serde_err(e: serde_json::Error, what: &'static str) -> redis::RedisError {
    redis::RedisError::from((redis::ErrorKind::TypeError, what, e.to_string()))
}

/// Persist a submission record (append-only) and index it under its
/// (user, challenge) pair. Records are never updated in place.
pub async fn record_submission(
    conn: &mut redis::aio::ConnectionManager,
    submission: &Submission,
) -> RedisResult<()> {
    let payload = serde_json::to_string(submission)
        .map_err(|e| serde_err(e, "submission serialization error"))?;

    let _: () = conn.set(submission_key(&submission.id), payload).await?;
    let _: () = conn
        .rpush(
            submission_index_key(&submission.user_id, &submission.challenge_id),
            submission.id.to_string(),
        )
        .await?;
    Ok(())
}

/// Claim the next attempt number for a (user, challenge) pair.
/// INCR gives strictly increasing values even under concurrent submissions.
pub async fn next_attempt(
    conn: &mut redis::aio::ConnectionManager,
    user_id: &Uuid,
    challenge_id: &Uuid,
) -> RedisResult<u32> {
    let n: u32 = conn.incr(attempt_key(user_id, challenge_id), 1).await?;
    Ok(n)
}

/// Number of graded attempts so far for a (user, challenge) pair.
pub async fn attempt_count(
    conn: &mut redis::aio::ConnectionManager,
    user_id: &Uuid,
    challenge_id: &Uuid,
) -> RedisResult<u32> {
    let n: Option<u32> = conn.get(attempt_key(user_id, challenge_id)).await?;
    Ok(n.unwrap_or(0))
}

/// Fetch a persisted submission record.
pub async fn get_submission(
    conn: &mut redis::aio::ConnectionManager,
    submission_id: &Uuid,
) -> RedisResult<Option<Submission>> {
    let payload: Option<String> = conn.get(submission_key(submission_id)).await?;
    match payload {
        Some(data) => {
            let submission: Submission = serde_json::from_str(&data)
                .map_err(|e| serde_err(e, "submission deserialization error"))?;
            Ok(Some(submission))
        }
        None => Ok(None),
    }
}

/// Fetch a challenge document. The engine only ever reads these.
pub async fn get_challenge(
    conn: &mut redis::aio::ConnectionManager,
    challenge_id: &Uuid,
) -> RedisResult<Option<Challenge>> {
    let payload: Option<String> = conn.get(challenge_key(challenge_id)).await?;
    match payload {
        Some(data) => {
            let challenge: Challenge = serde_json::from_str(&data)
                .map_err(|e| serde_err(e, "challenge deserialization error"))?;
            Ok(Some(challenge))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_key_deterministic() {
        let id = Uuid::new_v4();
        assert_eq!(submission_key(&id), submission_key(&id));
        assert!(submission_key(&id).starts_with("aula:submission:"));
    }

    #[test]
    fn attempt_key_contains_both_ids() {
        let user = Uuid::new_v4();
        let challenge = Uuid::new_v4();
        let key = attempt_key(&user, &challenge);
        assert!(key.starts_with("aula:attempts:"));
        assert!(key.contains(&user.to_string()));
        assert!(key.contains(&challenge.to_string()));
    }

    #[test]
    fn index_key_format() {
        let user = Uuid::new_v4();
        let challenge = Uuid::new_v4();
        let key = submission_index_key(&user, &challenge);
        assert!(key.starts_with("aula:submissions:"));
    }
}
