//! CWL league tiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of clans in every CWL group.
pub const GROUP_SIZE: u32 = 8;

/// Number of rounds (war days) in a CWL season.
pub const CWL_ROUNDS: u8 = 7;

/// League rank word, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LeagueRank {
    Bronze,
    Silver,
    Gold,
    Crystal,
    Master,
    Champion,
}

impl LeagueRank {
    const ALL: [LeagueRank; 6] = [
        LeagueRank::Champion,
        LeagueRank::Master,
        LeagueRank::Crystal,
        LeagueRank::Gold,
        LeagueRank::Silver,
        LeagueRank::Bronze,
    ];

    fn keyword(&self) -> &'static str {
        match self {
            LeagueRank::Bronze => "BRONZE",
            LeagueRank::Silver => "SILVER",
            LeagueRank::Gold => "GOLD",
            LeagueRank::Crystal => "CRYSTAL",
            LeagueRank::Master => "MASTER",
            LeagueRank::Champion => "CHAMPION",
        }
    }
}

impl fmt::Display for LeagueRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LeagueRank::Bronze => "Bronze",
            LeagueRank::Silver => "Silver",
            LeagueRank::Gold => "Gold",
            LeagueRank::Crystal => "Crystal",
            LeagueRank::Master => "Master",
            LeagueRank::Champion => "Champion",
        };
        write!(f, "{}", name)
    }
}

/// Roman-numeral sub-tier. `I` is the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubTier {
    I,
    II,
    III,
}

impl SubTier {
    fn from_numeral(s: &str) -> Option<Self> {
        match s {
            "I" | "1" => Some(SubTier::I),
            "II" | "2" => Some(SubTier::II),
            "III" | "3" => Some(SubTier::III),
            _ => None,
        }
    }
}

impl fmt::Display for SubTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubTier::I => write!(f, "I"),
            SubTier::II => write!(f, "II"),
            SubTier::III => write!(f, "III"),
        }
    }
}

/// A parsed league tier name such as "Gold League II".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeagueTier {
    pub rank: LeagueRank,
    pub sub_tier: Option<SubTier>,
}

impl LeagueTier {
    pub fn new(rank: LeagueRank, sub_tier: SubTier) -> Self {
        Self {
            rank,
            sub_tier: Some(sub_tier),
        }
    }

    /// Parse a league name case-insensitively.
    ///
    /// The rank word may appear anywhere in the name; the sub-tier is the
    /// last whitespace-separated token when it is a numeral.
    pub fn parse(name: &str) -> Option<Self> {
        let upper = name.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }

        let rank = LeagueRank::ALL
            .into_iter()
            .find(|r| upper.contains(r.keyword()))?;

        let sub_tier = upper
            .split_whitespace()
            .next_back()
            .and_then(SubTier::from_numeral);

        Some(Self { rank, sub_tier })
    }

    /// Champion League I, the highest tier.
    pub fn is_top(&self) -> bool {
        self.rank == LeagueRank::Champion && matches!(self.sub_tier, Some(SubTier::I) | None)
    }
}

impl fmt::Display for LeagueTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_tier {
            Some(sub) => write!(f, "{} League {}", self.rank, sub),
            None => write!(f, "{} League", self.rank),
        }
    }
}
