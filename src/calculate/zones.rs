//! Promotion and demotion zones.

use crate::models::{LeagueRank, LeagueTier, SubTier, GROUP_SIZE};

/// Promotion/demotion slot counts for an 8-clan group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PromotionZones {
    pub promotion_slots: u32,
    pub demotion_slots: u32,
}

impl PromotionZones {
    pub fn new(promotion_slots: u32, demotion_slots: u32) -> Self {
        Self {
            promotion_slots,
            demotion_slots,
        }
    }

    /// Slots for a league name. Unknown or empty names get no zones.
    pub fn for_league(name: &str) -> Self {
        match LeagueTier::parse(name) {
            Some(tier) => Self::for_tier(&tier),
            None => Self::default(),
        }
    }

    pub fn for_tier(tier: &LeagueTier) -> Self {
        match (tier.rank, tier.sub_tier) {
            // Bottom league: nowhere to be demoted to
            (LeagueRank::Bronze, Some(SubTier::III)) => Self::new(3, 0),
            (LeagueRank::Bronze, Some(_)) => Self::new(3, 2),
            _ if tier.is_top() => Self::new(0, 2),
            _ => Self::new(2, 2),
        }
    }

    pub fn is_promoted(&self, rank: u32) -> bool {
        (1..=self.promotion_slots).contains(&rank)
    }

    pub fn is_demoted(&self, rank: u32) -> bool {
        self.demotion_slots > 0 && rank > GROUP_SIZE.saturating_sub(self.demotion_slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bronze_three_boundary() {
        let zones = PromotionZones::for_league("Bronze League III");
        assert_eq!(zones, PromotionZones::new(3, 0));
        assert!(zones.is_promoted(3));
        assert!(!zones.is_promoted(4));
        assert!((1..=8).all(|rank| !zones.is_demoted(rank)));
    }

    #[test]
    fn test_bronze_upper_tiers() {
        assert_eq!(
            PromotionZones::for_league("Bronze League II"),
            PromotionZones::new(3, 2)
        );
        assert_eq!(
            PromotionZones::for_league("bronze league i"),
            PromotionZones::new(3, 2)
        );
    }

    #[test]
    fn test_champion_one_has_no_promotion() {
        let zones = PromotionZones::for_league("Champion League I");
        assert_eq!(zones, PromotionZones::new(0, 2));
        assert!(!zones.is_promoted(1));
        assert!(zones.is_demoted(7));
        assert!(zones.is_demoted(8));
        assert!(!zones.is_demoted(6));
    }

    #[test]
    fn test_other_leagues() {
        for name in [
            "Silver League I",
            "Gold League II",
            "Crystal League III",
            "Master League I",
            "Champion League II",
            "Champion League III",
        ] {
            assert_eq!(
                PromotionZones::for_league(name),
                PromotionZones::new(2, 2),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_league_without_numeral() {
        // Bare Bronze is not a ranked Bronze sub-tier
        assert_eq!(
            PromotionZones::for_league("Bronze League"),
            PromotionZones::new(2, 2)
        );
        assert_eq!(
            PromotionZones::for_league("Champion League"),
            PromotionZones::new(0, 2)
        );
    }

    #[test]
    fn test_unknown_league_has_no_zones() {
        for name in ["", "Unranked", "Legend League"] {
            let zones = PromotionZones::for_league(name);
            assert_eq!(zones, PromotionZones::default());
            assert!((1..=8).all(|rank| !zones.is_promoted(rank) && !zones.is_demoted(rank)));
        }
    }
}
