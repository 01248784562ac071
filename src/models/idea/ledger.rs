//! Per-idea voting ledger.
//!
//! Each voter holds at most one active ballot. Tallies are never stored: they are
//! recomputed from the ballots every time an idea is read, so they cannot drift from
//! the voter set.
//!
//! In the database a ballot is one row of `idea_votes`, keyed by `(idea_id, voter_id)`.
//! `cast` loads the ballots under a row lock on the idea, applies the change to a
//! [`VotingLedger`] and writes the replaced ballot back, all in one transaction.

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{PgConnection, PgExecutor};

use crate::db::decode_text;
use crate::errors::AppError;
use super::types::VoteChoice;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub choice: VoteChoice,
    /// Whether the voter held the founder role when casting this ballot.
    pub board_member: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VoterEntry {
    pub user: i64,
    pub vote: VoteChoice,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingStats {
    pub upvotes: i64,
    pub downvotes: i64,
    pub board_approvals: i64,
    pub voters: Vec<VoterEntry>,
}

/// Ballots in casting order; a re-cast moves the voter to the end.
#[derive(Debug, Clone, Default)]
pub struct VotingLedger {
    ballots: Vec<(i64, Ballot)>,
}

impl VotingLedger {
    pub fn from_ballots<I>(ballots: I) -> Self
    where
        I: IntoIterator<Item = (i64, Ballot)>,
    {
        let mut ledger = VotingLedger::default();
        for (voter, ballot) in ballots {
            ledger.cast(voter, ballot.choice, ballot.board_member);
        }
        ledger
    }

    /// Replace `voter`'s ballot with a new one. Returns the ballot that was withdrawn.
    pub fn cast(&mut self, voter: i64, choice: VoteChoice, board_member: bool) -> Option<Ballot> {
        let previous = self
            .ballots
            .iter()
            .position(|(v, _)| *v == voter)
            .map(|idx| self.ballots.remove(idx).1);
        self.ballots.push((voter, Ballot { choice, board_member }));
        previous
    }

    pub fn ballot_of(&self, voter: i64) -> Option<Ballot> {
        self.ballots
            .iter()
            .find(|(v, _)| *v == voter)
            .map(|(_, b)| *b)
    }

    pub fn len(&self) -> usize {
        self.ballots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ballots.is_empty()
    }

    pub fn stats(&self) -> VotingStats {
        let mut stats = VotingStats::default();
        for (voter, ballot) in &self.ballots {
            match ballot.choice {
                VoteChoice::Upvote => {
                    stats.upvotes += 1;
                    if ballot.board_member {
                        stats.board_approvals += 1;
                    }
                }
                VoteChoice::Downvote => stats.downvotes += 1,
            }
            stats.voters.push(VoterEntry { user: *voter, vote: ballot.choice });
        }
        stats
    }
}

#[derive(sqlx::FromRow)]
struct BallotRow {
    idea_id: i64,
    voter_id: i64,
    choice: String,
    board_member: bool,
}

impl BallotRow {
    fn into_ballot(self) -> Result<(i64, i64, Ballot), AppError> {
        let choice = decode_text("choice", &self.choice)?;
        Ok((self.idea_id, self.voter_id, Ballot { choice, board_member: self.board_member }))
    }
}

const SELECT_BALLOTS: &str = "SELECT idea_id, voter_id, choice, board_member FROM idea_votes";

/// Load the ledger of a single idea.
pub async fn load<'e, E: PgExecutor<'e>>(executor: E, idea_id: i64) -> Result<VotingLedger, AppError> {
    let rows = sqlx::query_as::<_, BallotRow>(&format!(
        "{SELECT_BALLOTS} WHERE idea_id = $1 ORDER BY cast_at, voter_id"
    ))
    .bind(idea_id)
    .fetch_all(executor)
    .await?;

    let mut ballots = Vec::with_capacity(rows.len());
    for row in rows {
        let (_, voter, ballot) = row.into_ballot()?;
        ballots.push((voter, ballot));
    }
    Ok(VotingLedger::from_ballots(ballots))
}

/// Load the ledgers of many ideas in one query. Ideas without ballots get no entry.
pub async fn load_many<'e, E: PgExecutor<'e>>(
    executor: E,
    idea_ids: &[i64],
) -> Result<HashMap<i64, VotingLedger>, AppError> {
    if idea_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = sqlx::query_as::<_, BallotRow>(&format!(
        "{SELECT_BALLOTS} WHERE idea_id = ANY($1) ORDER BY cast_at, voter_id"
    ))
    .bind(idea_ids)
    .fetch_all(executor)
    .await?;

    let mut ledgers: HashMap<i64, VotingLedger> = HashMap::new();
    for row in rows {
        let (idea_id, voter, ballot) = row.into_ballot()?;
        ledgers
            .entry(idea_id)
            .or_default()
            .cast(voter, ballot.choice, ballot.board_member);
    }
    Ok(ledgers)
}

/// Outcome of one cast, for logging and the caller's feedback entry.
#[derive(Debug, Clone, Copy)]
pub struct CastOutcome {
    pub previous: Option<Ballot>,
    pub current: Ballot,
}

/// Apply a ballot inside an open transaction. The caller must already hold the idea's
/// row lock so concurrent casts on the same idea are serialized.
pub async fn cast_locked(
    conn: &mut PgConnection,
    idea_id: i64,
    voter_id: i64,
    choice: VoteChoice,
    board_member: bool,
) -> Result<CastOutcome, AppError> {
    let mut ledger = load(&mut *conn, idea_id).await?;
    let previous = ledger.cast(voter_id, choice, board_member);

    sqlx::query(
        "INSERT INTO idea_votes (idea_id, voter_id, choice, board_member, cast_at) \
         VALUES ($1, $2, $3, $4, clock_timestamp()) \
         ON CONFLICT (idea_id, voter_id) DO UPDATE \
         SET choice = EXCLUDED.choice, board_member = EXCLUDED.board_member, cast_at = EXCLUDED.cast_at",
    )
    .bind(idea_id)
    .bind(voter_id)
    .bind(choice.as_str())
    .bind(board_member)
    .execute(&mut *conn)
    .await?;

    Ok(CastOutcome { previous, current: Ballot { choice, board_member } })
}
