//! Percentile tier bands derived from a user's rank.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Named percentile band, `Iron` (lowest / unranked) through `Challenger`.
///
/// Bands are computed against the maximum rank currently in the store.
/// Every band's upper bound is inclusive, so a rank landing exactly on a
/// boundary line falls into the lower tier - with the single exception of
/// rank 1, which is always `Challenger`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum Tier {
    #[default]
    #[sea_orm(string_value = "iron")]
    Iron,
    #[sea_orm(string_value = "bronze")]
    Bronze,
    #[sea_orm(string_value = "silver")]
    Silver,
    #[sea_orm(string_value = "gold")]
    Gold,
    #[sea_orm(string_value = "platinum")]
    Platinum,
    #[sea_orm(string_value = "diamond")]
    Diamond,
    #[sea_orm(string_value = "master")]
    Master,
    #[sea_orm(string_value = "grandmaster")]
    GrandMaster,
    #[sea_orm(string_value = "challenger")]
    Challenger,
}

impl Tier {
    /// Map a rank to its tier band.
    ///
    /// `max_rank` is the highest (worst) rank currently in the store; when
    /// the computed rank exceeds it (e.g. the very first user in an empty
    /// store) the rank itself is used as the denominator.
    ///
    /// Bands: rank 1 or top 1% -> Challenger, 1-5% -> GrandMaster,
    /// 5-10% -> Master, 10-20% -> Diamond, 20-30% -> Platinum,
    /// 30-50% -> Gold, 50-70% -> Silver, 70-95% -> Bronze, rest -> Iron.
    pub fn from_rank(rank: i32, max_rank: i32) -> Tier {
        if rank <= 0 {
            return Tier::Iron;
        }
        if rank == 1 {
            return Tier::Challenger;
        }

        let max = i32::max(max_rank, rank) as f64;
        let r = rank as f64;

        // The exact 1% line belongs to GrandMaster: beyond rank 1, a rank
        // landing on a band boundary takes the lower tier.
        if r < max * 0.01 {
            Tier::Challenger
        } else if r <= max * 0.05 {
            Tier::GrandMaster
        } else if r <= max * 0.10 {
            Tier::Master
        } else if r <= max * 0.20 {
            Tier::Diamond
        } else if r <= max * 0.30 {
            Tier::Platinum
        } else if r <= max * 0.50 {
            Tier::Gold
        } else if r <= max * 0.70 {
            Tier::Silver
        } else if r <= max * 0.95 {
            Tier::Bronze
        } else {
            Tier::Iron
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Iron => "Iron",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
            Tier::Diamond => "Diamond",
            Tier::Master => "Master",
            Tier::GrandMaster => "GrandMaster",
            Tier::Challenger => "Challenger",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_one_is_always_challenger() {
        assert_eq!(Tier::from_rank(1, 1), Tier::Challenger);
        assert_eq!(Tier::from_rank(1, 1_000_000), Tier::Challenger);
    }

    #[test]
    fn test_exact_one_percent_is_grandmaster() {
        // Rank 2 of 200 sits exactly on the 1% line and must fall into the
        // lower tier, not Challenger.
        assert_eq!(Tier::from_rank(2, 200), Tier::GrandMaster);
    }

    #[test]
    fn test_under_one_percent_is_challenger() {
        assert_eq!(Tier::from_rank(2, 500), Tier::Challenger);
    }

    #[test]
    fn test_band_upper_bounds_are_inclusive() {
        assert_eq!(Tier::from_rank(5, 100), Tier::GrandMaster);
        assert_eq!(Tier::from_rank(10, 100), Tier::Master);
        assert_eq!(Tier::from_rank(20, 100), Tier::Diamond);
        assert_eq!(Tier::from_rank(30, 100), Tier::Platinum);
        assert_eq!(Tier::from_rank(50, 100), Tier::Gold);
        assert_eq!(Tier::from_rank(70, 100), Tier::Silver);
        assert_eq!(Tier::from_rank(95, 100), Tier::Bronze);
        assert_eq!(Tier::from_rank(96, 100), Tier::Iron);
    }

    #[test]
    fn test_band_interiors() {
        assert_eq!(Tier::from_rank(7, 100), Tier::Master);
        assert_eq!(Tier::from_rank(15, 100), Tier::Diamond);
        assert_eq!(Tier::from_rank(40, 100), Tier::Gold);
        assert_eq!(Tier::from_rank(60, 100), Tier::Silver);
        assert_eq!(Tier::from_rank(80, 100), Tier::Bronze);
    }

    #[test]
    fn test_rank_beyond_stored_max_uses_rank_as_denominator() {
        // First user in an empty store: rank 3, no stored max.
        assert_eq!(Tier::from_rank(3, 0), Tier::Iron);
    }

    #[test]
    fn test_non_positive_rank_is_iron() {
        assert_eq!(Tier::from_rank(0, 100), Tier::Iron);
        assert_eq!(Tier::from_rank(-1, 100), Tier::Iron);
    }
}
