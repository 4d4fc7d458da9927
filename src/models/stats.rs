//! Derived CWL views: leaderboard rows, round stats and member summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BadgeUrls, Tag};

/// Outcome of one war from one side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

impl Outcome {
    /// Higher stars win; a star tie goes to the higher destruction.
    pub fn decide(
        our_stars: u32,
        their_stars: u32,
        our_destruction: f64,
        their_destruction: f64,
    ) -> Self {
        if our_stars != their_stars {
            return if our_stars > their_stars {
                Outcome::Win
            } else {
                Outcome::Loss
            };
        }
        if our_destruction > their_destruction {
            Outcome::Win
        } else if our_destruction < their_destruction {
            Outcome::Loss
        } else {
            Outcome::Tie
        }
    }
}

/// Medal rewards for one clan's finishing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedalReward {
    /// League medals every participating member receives
    pub medals_per_member: u32,

    /// Medals carried by a single bonus award
    pub bonus_medals: u32,

    /// Number of bonus awards the clan may hand out
    pub bonus_slots: u32,

    /// bonus_medals × wars won
    pub total_bonus_medals: u32,
}

/// One row of the group leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub tag: Tag,
    pub name: String,

    #[serde(default)]
    pub badge_urls: BadgeUrls,

    /// 1 = best
    pub rank: u32,

    #[serde(default)]
    pub total_stars: u32,

    /// Destruction points: percentage × team size, summed over wars
    #[serde(default)]
    pub total_destruction: f64,

    #[serde(default)]
    pub average_destruction: f64,

    #[serde(default)]
    pub wars: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub losses: u32,

    #[serde(default)]
    pub is_promoted: bool,
    #[serde(default)]
    pub is_demoted: bool,

    #[serde(default)]
    pub medals_per_member: Option<u32>,
    #[serde(default)]
    pub bonus_medals: Option<u32>,
    #[serde(default)]
    pub total_bonus_medals: Option<u32>,
}

/// Whether a round has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundStatus {
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

/// Round result for our clan. `Pending` renders as "-".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundResult {
    Win,
    Loss,
    Draw,
    #[serde(rename = "-")]
    Pending,
}

impl From<Outcome> for RoundResult {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Win => RoundResult::Win,
            Outcome::Loss => RoundResult::Loss,
            Outcome::Tie => RoundResult::Draw,
        }
    }
}

/// Summary of one CWL round for our clan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub round: u8,
    pub status: RoundStatus,
    pub result: RoundResult,
    pub our_clan_name: String,
    pub opponent_clan_name: String,
    pub our_clan_tag: Option<Tag>,
    pub opponent_clan_tag: Option<Tag>,
    pub our_clan_badge: Option<BadgeUrls>,
    pub opponent_clan_badge: Option<BadgeUrls>,
    pub our_clan_level: u32,
    pub opponent_clan_level: u32,
    pub our_stars: u32,
    pub opponent_stars: u32,
    /// Mean destruction percentage across the round's wars
    pub our_destruction: f64,
    pub opponent_destruction: f64,
}

impl RoundStats {
    /// Placeholder for a round with no war data yet.
    pub fn pending(round: u8) -> Self {
        Self {
            round,
            status: RoundStatus::InProgress,
            result: RoundResult::Pending,
            our_clan_name: String::new(),
            opponent_clan_name: String::new(),
            our_clan_tag: None,
            opponent_clan_tag: None,
            our_clan_badge: None,
            opponent_clan_badge: None,
            our_clan_level: 0,
            opponent_clan_level: 0,
            our_stars: 0,
            opponent_stars: 0,
            our_destruction: 0.0,
            opponent_destruction: 0.0,
        }
    }
}

/// One attack as seen in a member summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackRecord {
    pub order: u32,
    pub defender_tag: Tag,
    pub defender_position: Option<u32>,
    pub stars: u32,
    pub destruction: f64,
    pub is_mirror: bool,
}

/// A member's performance in one round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRoundStats {
    pub stars: u32,
    /// Summed destruction percentage over the round's attacks
    pub destruction: f64,
    pub map_position: u32,
    /// Chronological by attack order
    pub attacks: Vec<AttackRecord>,
}

impl MemberRoundStats {
    pub fn attacked(&self) -> bool {
        !self.attacks.is_empty()
    }

    pub fn has_mirror_attack(&self) -> bool {
        self.attacks.iter().any(|a| a.is_mirror)
    }
}

/// A member's season across all rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberSummary {
    pub tag: Tag,
    pub name: String,
    pub town_hall_level: u32,

    /// Index 0 is round 1; `None` where the member was not on the roster
    pub rounds: Vec<Option<MemberRoundStats>>,

    pub total_stars: u32,
    pub total_destruction: f64,
    pub total_attacks: u32,
    pub rounds_played: u32,

    pub has_mirror_bonus_rule: bool,
    pub is_bonus_eligible: bool,
}

/// Everything the dashboard shows for one clan's CWL season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwlReport {
    pub clan_tag: Tag,
    pub season: Option<String>,
    pub league: Option<String>,
    pub our_rank: Option<u32>,
    pub medals: Option<MedalReward>,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub rounds: Vec<RoundStats>,
    pub members: Vec<MemberSummary>,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_by_stars() {
        assert_eq!(Outcome::decide(6, 5, 10.0, 90.0), Outcome::Win);
        assert_eq!(Outcome::decide(5, 6, 90.0, 10.0), Outcome::Loss);
    }

    #[test]
    fn test_outcome_star_tie_uses_destruction() {
        assert_eq!(Outcome::decide(20, 20, 80.5, 80.0), Outcome::Win);
        assert_eq!(Outcome::decide(20, 20, 79.0, 80.0), Outcome::Loss);
        assert_eq!(Outcome::decide(20, 20, 80.0, 80.0), Outcome::Tie);
    }

    #[test]
    fn test_round_status_serialization() {
        assert_eq!(
            serde_json::to_string(&RoundStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
        assert_eq!(serde_json::to_string(&RoundResult::Pending).unwrap(), "\"-\"");
        assert_eq!(serde_json::to_string(&RoundResult::Draw).unwrap(), "\"Draw\"");
    }

    #[test]
    fn test_pending_round_is_zeroed() {
        let round = RoundStats::pending(3);
        assert_eq!(round.round, 3);
        assert_eq!(round.status, RoundStatus::InProgress);
        assert_eq!(round.result, RoundResult::Pending);
        assert_eq!(round.our_stars, 0);
        assert_eq!(round.our_destruction, 0.0);
    }

    #[test]
    fn test_medals_unknown_serializes_as_null() {
        let entry = LeaderboardEntry {
            tag: Tag::from("2PP"),
            name: "Trinity".to_string(),
            badge_urls: BadgeUrls::default(),
            rank: 1,
            total_stars: 0,
            total_destruction: 0.0,
            average_destruction: 0.0,
            wars: 0,
            wins: 0,
            ties: 0,
            losses: 0,
            is_promoted: false,
            is_demoted: false,
            medals_per_member: None,
            bonus_medals: None,
            total_bonus_medals: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json["medalsPerMember"].is_null());
        assert_eq!(json["tag"], "#2PP");
    }
}
