//! League medal rewards.

use crate::models::{LeagueRank, LeagueTier, MedalReward, SubTier, GROUP_SIZE};

/// Per-league medal table: medals for 1st place, drop per position below
/// 1st, and medals carried by one bonus award.
struct MedalRow {
    rank: LeagueRank,
    sub_tier: SubTier,
    first_place: u32,
    step: u32,
    bonus: u32,
}

const fn row(
    rank: LeagueRank,
    sub_tier: SubTier,
    first_place: u32,
    step: u32,
    bonus: u32,
) -> MedalRow {
    MedalRow {
        rank,
        sub_tier,
        first_place,
        step,
        bonus,
    }
}

const MEDAL_TABLE: [MedalRow; 18] = [
    row(LeagueRank::Bronze, SubTier::III, 34, 2, 35),
    row(LeagueRank::Bronze, SubTier::II, 46, 2, 40),
    row(LeagueRank::Bronze, SubTier::I, 58, 2, 45),
    row(LeagueRank::Silver, SubTier::III, 76, 3, 50),
    row(LeagueRank::Silver, SubTier::II, 94, 3, 55),
    row(LeagueRank::Silver, SubTier::I, 112, 3, 60),
    row(LeagueRank::Gold, SubTier::III, 136, 4, 65),
    row(LeagueRank::Gold, SubTier::II, 160, 4, 70),
    row(LeagueRank::Gold, SubTier::I, 184, 4, 75),
    row(LeagueRank::Crystal, SubTier::III, 214, 5, 80),
    row(LeagueRank::Crystal, SubTier::II, 244, 5, 85),
    row(LeagueRank::Crystal, SubTier::I, 274, 5, 90),
    row(LeagueRank::Master, SubTier::III, 310, 6, 95),
    row(LeagueRank::Master, SubTier::II, 346, 6, 100),
    row(LeagueRank::Master, SubTier::I, 382, 6, 105),
    row(LeagueRank::Champion, SubTier::III, 424, 7, 110),
    row(LeagueRank::Champion, SubTier::II, 466, 7, 115),
    row(LeagueRank::Champion, SubTier::I, 508, 7, 120),
];

/// Bonus awards every clan gets before counting war wins.
const BASE_BONUS_SLOTS: u32 = 1;

/// Medals earned by each member for a given finishing position.
pub fn medals_for_position(tier: &LeagueTier, position: u32) -> Option<u32> {
    if position == 0 || position > GROUP_SIZE {
        return None;
    }
    let row = lookup(tier)?;
    Some(row.first_place - row.step * (position - 1))
}

/// Full reward for a league name, finishing position and war wins.
///
/// `None` means "no data" (unknown league or position) and must not be
/// shown as zero medals.
pub fn medal_reward(league: &str, position: u32, wins: u32) -> Option<MedalReward> {
    let tier = LeagueTier::parse(league)?;
    let medals_per_member = medals_for_position(&tier, position)?;
    let bonus_medals = lookup(&tier)?.bonus;

    Some(MedalReward {
        medals_per_member,
        bonus_medals,
        bonus_slots: BASE_BONUS_SLOTS + wins,
        total_bonus_medals: bonus_medals * wins,
    })
}

fn lookup(tier: &LeagueTier) -> Option<&'static MedalRow> {
    let sub_tier = tier.sub_tier?;
    MEDAL_TABLE
        .iter()
        .find(|r| r.rank == tier.rank && r.sub_tier == sub_tier)
}
