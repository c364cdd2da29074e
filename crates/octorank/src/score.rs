//! Composite score computation.
//!
//! Four signals are normalized against the global maximum across all
//! tracked users, weighted, and collapsed into a single integer score. The
//! continuous-commit streak dominates by design; the other signals break
//! ties and reward breadth.

/// Per-signal weights: streak 95, contributions 4, followers and
/// following 0.5 each.
pub const WEIGHT_COMMIT_DAYS: f64 = 95.0;
pub const WEIGHT_CONTRIBUTION: f64 = 4.0;
pub const WEIGHT_FOLLOWERS: f64 = 0.5;
pub const WEIGHT_FOLLOWING: f64 = 0.5;

const WEIGHT_SUM: f64 =
    WEIGHT_COMMIT_DAYS + WEIGHT_CONTRIBUTION + WEIGHT_FOLLOWERS + WEIGHT_FOLLOWING;

/// One user's raw signal values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreSignals {
    pub continuous_commit_days: i32,
    pub total_contribution: i32,
    pub followers: i32,
    pub following: i32,
}

/// Global maxima per signal, taken over every tracked user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SignalMaxima {
    pub continuous_commit_days: i32,
    pub total_contribution: i32,
    pub followers: i32,
    pub following: i32,
}

/// Normalize one signal to 0..=100 against its global maximum.
///
/// A zero (or negative) maximum contributes nothing instead of dividing by
/// zero.
fn normalized(value: i32, max: i32) -> f64 {
    if max <= 0 {
        0.0
    } else {
        f64::from(value.max(0)) / f64::from(max) * 100.0
    }
}

/// Compute the composite total score.
///
/// Weighted mean of the normalized signals, scaled by 1000 and truncated
/// to an integer. Deterministic: identical signals and maxima always yield
/// the same score.
pub fn total_score(signals: &ScoreSignals, maxima: &SignalMaxima) -> i32 {
    let weighted = normalized(
        signals.continuous_commit_days,
        maxima.continuous_commit_days,
    ) * WEIGHT_COMMIT_DAYS
        + normalized(signals.total_contribution, maxima.total_contribution)
            * WEIGHT_CONTRIBUTION
        + normalized(signals.followers, maxima.followers) * WEIGHT_FOLLOWERS
        + normalized(signals.following, maxima.following) * WEIGHT_FOLLOWING;

    (weighted / WEIGHT_SUM * 1000.0) as i32
}

/// Dense rank of a score among a set of scores: 1 plus the number of
/// strictly greater scores. Ties share the count, so tied users end up on
/// consecutive ranks once persisted - a count-based ordering, not a
/// competition ranking.
pub fn rank_among(score: i32, all_scores: &[i32]) -> i32 {
    let greater = all_scores.iter().filter(|&&s| s > score).count();
    greater as i32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maxima(days: i32, contrib: i32, followers: i32, following: i32) -> SignalMaxima {
        SignalMaxima {
            continuous_commit_days: days,
            total_contribution: contrib,
            followers,
            following,
        }
    }

    #[test]
    fn test_user_at_every_maximum_scores_1000() {
        let signals = ScoreSignals {
            continuous_commit_days: 365,
            total_contribution: 900,
            followers: 40,
            following: 10,
        };
        let score = total_score(&signals, &maxima(365, 900, 40, 10));
        assert_eq!(score, 1000);
    }

    #[test]
    fn test_zero_maximum_contributes_nothing() {
        // Nobody has a streak at all: that signal must not divide by zero.
        let signals = ScoreSignals {
            continuous_commit_days: 0,
            total_contribution: 100,
            followers: 0,
            following: 0,
        };
        let score = total_score(&signals, &maxima(0, 100, 0, 0));
        // Only the contribution signal fires: 100 * 4 / 100 * 1000 = 40.
        assert_eq!(score, 40);
    }

    #[test]
    fn test_streak_dominates_other_signals() {
        let streaker = ScoreSignals {
            continuous_commit_days: 100,
            ..Default::default()
        };
        let social = ScoreSignals {
            followers: 1000,
            following: 1000,
            total_contribution: 0,
            continuous_commit_days: 0,
        };
        let m = maxima(100, 1, 1000, 1000);
        assert!(total_score(&streaker, &m) > total_score(&social, &m));
    }

    #[test]
    fn test_score_is_stable_for_unchanged_inputs() {
        let signals = ScoreSignals {
            continuous_commit_days: 17,
            total_contribution: 230,
            followers: 12,
            following: 34,
        };
        let m = maxima(200, 4000, 900, 700);
        assert_eq!(total_score(&signals, &m), total_score(&signals, &m));
    }

    #[test]
    fn test_score_truncates_instead_of_rounding() {
        // One signal at half its max: 50 * 95 / 100 * 1000 = 475.0 exactly;
        // nudge the value so the fraction is non-integral.
        let signals = ScoreSignals {
            continuous_commit_days: 1,
            ..Default::default()
        };
        let m = maxima(3, 0, 0, 0);
        // 1/3 * 100 * 95 / 100 * 1000 = 316.66.. -> truncated to 316.
        assert_eq!(total_score(&signals, &m), 316);
    }

    #[test]
    fn test_rank_among_is_dense() {
        let scores = [400, 300, 200, 100];
        assert_eq!(rank_among(400, &scores), 1);
        assert_eq!(rank_among(300, &scores), 2);
        assert_eq!(rank_among(200, &scores), 3);
        assert_eq!(rank_among(100, &scores), 4);
    }

    #[test]
    fn test_rank_among_ties_share_the_count() {
        let scores = [300, 200, 200, 100];
        assert_eq!(rank_among(200, &scores), 2);
        assert_eq!(rank_among(100, &scores), 4);
    }
}
