//! Game Sessions
//!
//! The mini-games report a raw score when a session ends. That boundary is
//! where score validation lives: the tier table only ever sees non-negative
//! integers, so a malformed score fails fast here instead of being clamped.

use jiff::{SignedDuration, Timestamp};
use thiserror::Error;

use crate::{
    products::ProductId,
    records::{DiscountRecord, RecordError},
    tiers::TierTable,
};

/// How long an earned discount stays redeemable by default.
pub const DEFAULT_VALIDITY: SignedDuration = SignedDuration::from_hours(24);

/// Errors raised while handling a finished game session.
#[derive(Debug, Error)]
pub enum GameError {
    /// The game layer reported a negative score.
    #[error("game score must not be negative, got {0}")]
    NegativeScore(i64),

    /// The game layer reported a score too large to be real.
    #[error("game score {0} is out of range")]
    ScoreOutOfRange(i64),

    /// Wrapped record creation error.
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// The result of one finished mini-game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    game: String,
    product: ProductId,
    score: u32,
}

impl GameOutcome {
    /// Validate a raw score reported by the game layer.
    ///
    /// # Errors
    ///
    /// Returns a [`GameError`] for a negative or absurdly large score.
    pub fn new(
        game: impl Into<String>,
        product: ProductId,
        score: i64,
    ) -> Result<Self, GameError> {
        if score < 0 {
            return Err(GameError::NegativeScore(score));
        }

        let score = u32::try_from(score).map_err(|_err| GameError::ScoreOutOfRange(score))?;

        Ok(Self {
            game: game.into(),
            product,
            score,
        })
    }

    /// Tag of the mini-game that produced this outcome.
    #[must_use]
    pub fn game(&self) -> &str {
        &self.game
    }

    /// Product the session was played for.
    #[must_use]
    pub fn product(&self) -> &ProductId {
        &self.product
    }

    /// The validated session score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }
}

/// Turn a finished session into an earned discount record.
///
/// Returns `None` when the score maps to 0% — a zero grant is a no-op and is
/// never persisted as an active record.
///
/// # Errors
///
/// Returns a [`GameError`] if record creation fails (for example, a
/// non-positive validity window).
pub fn grant(
    outcome: &GameOutcome,
    table: &TierTable,
    now: Timestamp,
    validity: SignedDuration,
) -> Result<Option<DiscountRecord>, GameError> {
    let percent = table.discount_for(outcome.score);

    if percent.is_zero() {
        return Ok(None);
    }

    let record = DiscountRecord::grant(
        outcome.product.clone(),
        percent,
        outcome.game.clone(),
        now,
        validity,
    )?;

    Ok(Some(record))
}
