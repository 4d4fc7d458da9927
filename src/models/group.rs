//! League group and snapshot models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Clan, LeaderboardEntry, Tag, War, UNSCHEDULED_WAR_TAG};

/// One round of a league group: the war tags drawn for that day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRound {
    /// Explicit round number; falls back to list position when absent
    #[serde(default)]
    pub round: Option<u8>,

    #[serde(default)]
    pub war_tags: Vec<String>,
}

/// A CWL group: eight clans and their seven rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueGroup {
    #[serde(default)]
    pub state: Option<String>,

    #[serde(default)]
    pub season: Option<String>,

    #[serde(default)]
    pub clans: Vec<Clan>,

    #[serde(default)]
    pub rounds: Vec<GroupRound>,

    /// Leaderboard pre-computed by the backend, when it provides one
    #[serde(default)]
    pub leaderboard: Option<Vec<LeaderboardEntry>>,
}

impl LeagueGroup {
    /// Scheduled war tags per round number, placeholders dropped.
    pub fn round_war_tags(&self) -> Vec<(u8, Vec<Tag>)> {
        self.rounds
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let number = r.round.unwrap_or((idx + 1) as u8);
                let tags = r
                    .war_tags
                    .iter()
                    .filter(|t| !t.trim().is_empty() && t.trim() != UNSCHEDULED_WAR_TAG)
                    .map(|t| Tag::normalize(t))
                    .collect();
                (number, tags)
            })
            .collect()
    }

    /// Distinct scheduled war tags across all rounds, in round order.
    pub fn all_war_tags(&self) -> Vec<Tag> {
        let mut seen = std::collections::HashSet::new();
        self.round_war_tags()
            .into_iter()
            .flat_map(|(_, tags)| tags)
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    pub fn clan(&self, tag: &Tag) -> Option<&Clan> {
        self.clans.iter().find(|c| c.tag == *tag)
    }
}

/// Everything needed to derive a CWL report, fetched in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwlSnapshot {
    #[serde(default)]
    pub group: LeagueGroup,

    #[serde(default)]
    pub wars: Vec<War>,

    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}
