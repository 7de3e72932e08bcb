//! Reward Tiers
//!
//! A tier pairs a score threshold with the discount percent it earns. The
//! table is an ordered, immutable sequence so the mapper and the progress
//! advisor walk one shared definition, and adding or changing a tier touches
//! exactly one place.

use thiserror::Error;

use crate::discounts::DiscountPercent;

/// Errors raised while validating a tier table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TierTableError {
    /// The table contained no tiers at all.
    #[error("tier table must contain at least one tier")]
    Empty,

    /// A threshold was zero or did not strictly increase (offending tier index).
    #[error("tier {0}: thresholds must be positive and strictly ascending")]
    ThresholdOrder(usize),

    /// A percent did not strictly increase with its threshold (offending tier index).
    #[error("tier {0}: percents must strictly ascend with their thresholds")]
    PercentOrder(usize),
}

/// A single reward tier: reach `threshold` points to earn `percent` off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    threshold: u32,
    percent: DiscountPercent,
}

impl Tier {
    /// Create a new tier.
    #[must_use]
    pub fn new(threshold: u32, percent: DiscountPercent) -> Self {
        Self { threshold, percent }
    }

    /// Return the score threshold.
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Return the discount percent this tier earns.
    #[must_use]
    pub fn percent(&self) -> DiscountPercent {
        self.percent
    }
}

/// Progress report toward the next unmet tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierProgress {
    /// Threshold of the nearest unmet tier.
    pub threshold: u32,

    /// Points still needed to reach it.
    pub points_needed: u32,

    /// Discount percent that tier earns.
    pub percent: DiscountPercent,
}

/// An ordered table of reward tiers.
///
/// Thresholds are positive and strictly ascending, and percents strictly
/// ascend with them; this is what makes [`TierTable::discount_for`] monotone
/// in the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    /// Create a tier table, validating its ordering invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`TierTableError`] if the table is empty, a threshold is
    /// zero or out of order, or a percent does not strictly ascend.
    pub fn new(tiers: Vec<Tier>) -> Result<Self, TierTableError> {
        if tiers.is_empty() {
            return Err(TierTableError::Empty);
        }

        let mut previous: Option<&Tier> = None;

        for (idx, tier) in tiers.iter().enumerate() {
            if tier.threshold == 0 {
                return Err(TierTableError::ThresholdOrder(idx));
            }

            if let Some(prev) = previous {
                if tier.threshold <= prev.threshold {
                    return Err(TierTableError::ThresholdOrder(idx));
                }

                if tier.percent <= prev.percent {
                    return Err(TierTableError::PercentOrder(idx));
                }
            }

            previous = Some(tier);
        }

        Ok(Self { tiers })
    }

    /// The canonical Caterpillar Ranch tier scheme: 3% at 20 points up to
    /// the 15% cap at 60 points.
    #[must_use]
    pub fn standard() -> Self {
        // Invariants hold by construction, so this skips `new`.
        Self {
            tiers: vec![
                Tier::new(20, DiscountPercent::saturating(3)),
                Tier::new(30, DiscountPercent::saturating(6)),
                Tier::new(40, DiscountPercent::saturating(9)),
                Tier::new(50, DiscountPercent::saturating(12)),
                Tier::new(60, DiscountPercent::saturating(15)),
            ],
        }
    }

    /// Return the tiers in ascending threshold order.
    #[must_use]
    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// Return the highest tier.
    #[must_use]
    pub fn top(&self) -> Option<&Tier> {
        self.tiers.last()
    }

    /// Map a game score to its earned discount percent.
    ///
    /// Scans from the highest threshold down and returns the percent of the
    /// first tier the score meets; scores below every threshold earn 0%.
    /// Scores beyond the top tier stay at the top tier's percent; the
    /// cart-level cap is a separate, later enforcement point.
    #[must_use]
    pub fn discount_for(&self, score: u32) -> DiscountPercent {
        self.tiers
            .iter()
            .rev()
            .find(|tier| tier.threshold <= score)
            .map_or(DiscountPercent::ZERO, Tier::percent)
    }

    /// Report the nearest unmet tier for a score, or `None` once the top
    /// tier is reached. Pure and idempotent; used for progress hints only.
    #[must_use]
    pub fn progress_toward(&self, score: u32) -> Option<TierProgress> {
        self.tiers
            .iter()
            .find(|tier| tier.threshold > score)
            .map(|tier| TierProgress {
                threshold: tier.threshold,
                points_needed: tier.threshold - score,
                percent: tier.percent,
            })
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn percent(points: u8) -> DiscountPercent {
        DiscountPercent::saturating(points)
    }

    #[test]
    fn zero_score_earns_nothing() {
        let table = TierTable::standard();

        assert!(table.discount_for(0).is_zero());
    }

    #[test]
    fn scores_map_to_their_tier() {
        let table = TierTable::standard();

        assert_eq!(table.discount_for(19), percent(0));
        assert_eq!(table.discount_for(20), percent(3));
        assert_eq!(table.discount_for(29), percent(3));
        assert_eq!(table.discount_for(30), percent(6));
        assert_eq!(table.discount_for(45), percent(9));
        assert_eq!(table.discount_for(50), percent(12));
        assert_eq!(table.discount_for(60), percent(15));
    }

    #[test]
    fn scores_beyond_top_tier_stay_at_top_percent() {
        let table = TierTable::standard();

        assert_eq!(table.discount_for(65), percent(15));
        assert_eq!(table.discount_for(u32::MAX), percent(15));
    }

    #[test]
    fn discount_for_is_monotone() {
        let table = TierTable::standard();

        let mut last = DiscountPercent::ZERO;

        for score in 0..=120 {
            let earned = table.discount_for(score);

            assert!(
                earned >= last,
                "discount dropped from {last} to {earned} at score {score}"
            );

            last = earned;
        }
    }

    #[test]
    fn progress_reports_nearest_unmet_tier() {
        let table = TierTable::standard();

        let progress = table.progress_toward(55);

        assert_eq!(
            progress,
            Some(TierProgress {
                threshold: 60,
                points_needed: 5,
                percent: percent(15),
            })
        );
    }

    #[test]
    fn progress_is_none_once_top_tier_is_met() {
        let table = TierTable::standard();

        assert_eq!(table.progress_toward(60), None);
        assert_eq!(table.progress_toward(200), None);
    }

    #[test]
    fn progress_from_zero_points_at_lowest_tier() {
        let table = TierTable::standard();

        let progress = table.progress_toward(0);

        assert_eq!(
            progress,
            Some(TierProgress {
                threshold: 20,
                points_needed: 20,
                percent: percent(3),
            })
        );
    }

    #[test]
    fn new_rejects_empty_table() {
        assert_eq!(TierTable::new(vec![]), Err(TierTableError::Empty));
    }

    #[test]
    fn new_rejects_zero_threshold() {
        let result = TierTable::new(vec![Tier::new(0, percent(3))]);

        assert_eq!(result, Err(TierTableError::ThresholdOrder(0)));
    }

    #[test]
    fn new_rejects_unordered_thresholds() {
        let result = TierTable::new(vec![
            Tier::new(30, percent(3)),
            Tier::new(20, percent(6)),
        ]);

        assert_eq!(result, Err(TierTableError::ThresholdOrder(1)));
    }

    #[test]
    fn new_rejects_non_ascending_percents() {
        let result = TierTable::new(vec![
            Tier::new(20, percent(6)),
            Tier::new(30, percent(6)),
        ]);

        assert_eq!(result, Err(TierTableError::PercentOrder(1)));
    }

    #[test]
    fn custom_table_drives_mapper_and_advisor() -> TestResult {
        // The historical 20-40% scheme still satisfies the same mechanism.
        let table = TierTable::new(vec![
            Tier::new(25, percent(20)),
            Tier::new(50, percent(30)),
            Tier::new(75, percent(40)),
        ])?;

        assert_eq!(table.discount_for(74), percent(30));
        assert_eq!(table.discount_for(75), percent(40));

        let progress = table.progress_toward(70);

        assert_eq!(
            progress,
            Some(TierProgress {
                threshold: 75,
                points_needed: 5,
                percent: percent(40),
            })
        );

        Ok(())
    }

    #[test]
    fn top_returns_highest_tier() {
        let table = TierTable::standard();

        assert_eq!(table.top().map(Tier::threshold), Some(60));
    }
}
