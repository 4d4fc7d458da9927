//! War records as served by the game API.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Tag;

/// Placeholder war tag used for rounds that have not been drawn yet.
pub const UNSCHEDULED_WAR_TAG: &str = "#0";

/// Parse a timestamp as the API emits it.
///
/// The game API uses a compact form (`20240101T120000.000Z`); RFC 3339 is
/// accepted as well for snapshots written by other tools.
pub fn parse_api_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for format in ["%Y%m%dT%H%M%S%.fZ", "%Y%m%dT%H%M%SZ"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Clan badge images.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BadgeUrls {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

/// League a clan is competing in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarLeague {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
}

/// One attack made during a war.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attack {
    #[serde(default)]
    pub attacker_tag: Option<Tag>,

    #[serde(default)]
    pub defender_tag: Tag,

    #[serde(default)]
    pub stars: u32,

    #[serde(default)]
    pub destruction_percentage: f64,

    /// Global sequence number of the attack within the war
    #[serde(default)]
    pub order: u32,

    #[serde(default)]
    pub duration: Option<u32>,
}

/// A clan member on a war roster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub tag: Tag,

    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "townhallLevel")]
    pub town_hall_level: u32,

    /// 1-based roster rank within this war
    #[serde(default)]
    pub map_position: u32,

    #[serde(default)]
    pub attacks: Vec<Attack>,

    #[serde(default, alias = "opponentAttacks")]
    pub defense_count: u32,
}

/// One side of a war, or a clan entry in a league group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    #[serde(default)]
    pub tag: Tag,

    #[serde(default)]
    pub name: String,

    #[serde(default, alias = "clanLevel")]
    pub level: u32,

    #[serde(default)]
    pub badge_urls: BadgeUrls,

    #[serde(default)]
    pub members: Vec<Member>,

    #[serde(default)]
    pub war_league: Option<WarLeague>,

    /// Stars earned by this side in the war
    #[serde(default)]
    pub stars: u32,

    /// Destruction percentage achieved by this side in the war
    #[serde(default)]
    pub destruction_percentage: f64,

    /// Attacks used by this side in the war
    #[serde(default)]
    pub attacks: u32,
}

impl Clan {
    /// Find a roster member by tag.
    pub fn member(&self, tag: &Tag) -> Option<&Member> {
        self.members.iter().find(|m| m.tag == *tag)
    }

    pub fn league_name(&self) -> Option<&str> {
        self.war_league
            .as_ref()
            .map(|l| l.name.as_str())
            .filter(|n| !n.trim().is_empty())
    }
}

/// War lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarState {
    NotInWar,
    Preparation,
    InWar,
    WarEnded,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single war between two clans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct War {
    #[serde(default)]
    pub clan: Option<Clan>,

    #[serde(default)]
    pub opponent: Option<Clan>,

    #[serde(default)]
    pub team_size: u32,

    #[serde(default)]
    pub state: WarState,

    #[serde(default)]
    pub preparation_start_time: Option<String>,

    #[serde(default)]
    pub start_time: Option<String>,

    #[serde(default)]
    pub end_time: Option<String>,

    #[serde(default, alias = "tag")]
    pub war_tag: Option<String>,
}

impl War {
    /// Both sides, if the record is complete.
    pub fn sides(&self) -> Option<(&Clan, &Clan)> {
        match (&self.clan, &self.opponent) {
            (Some(clan), Some(opponent)) => Some((clan, opponent)),
            _ => None,
        }
    }

    /// Whether the war involves the given clan on either side.
    pub fn involves(&self, tag: &Tag) -> bool {
        self.clan.as_ref().is_some_and(|c| c.tag == *tag)
            || self.opponent.as_ref().is_some_and(|c| c.tag == *tag)
    }

    /// War tag in canonical form, ignoring the unscheduled placeholder.
    pub fn normalized_war_tag(&self) -> Option<Tag> {
        self.war_tag
            .as_deref()
            .filter(|t| !t.trim().is_empty() && t.trim() != UNSCHEDULED_WAR_TAG)
            .map(Tag::normalize)
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_api_time)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_time.as_deref().and_then(parse_api_time)
    }

    /// A war counts as over once the API says so or its end time has passed.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.state == WarState::WarEnded || self.end().is_some_and(|end| end <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_api_time_compact() {
        let t = parse_api_time("20240105T183000.000Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 5, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_api_time_rfc3339() {
        let t = parse_api_time("2024-01-05T18:30:00Z").unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 1, 5, 18, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_api_time_invalid() {
        assert!(parse_api_time("").is_none());
        assert!(parse_api_time("yesterday").is_none());
    }

    #[test]
    fn test_war_deserializes_api_shape() {
        let json = r##"{
            "state": "warEnded",
            "teamSize": 15,
            "startTime": "20240105T183000.000Z",
            "endTime": "20240106T183000.000Z",
            "tag": "#8QU8J9LP",
            "clan": {
                "tag": "#2pp",
                "name": "Trinity",
                "clanLevel": 20,
                "badgeUrls": {"small": "s.png"},
                "stars": 38,
                "destructionPercentage": 91.5,
                "members": [{
                    "tag": "#9Q8",
                    "name": "Ada",
                    "townhallLevel": 16,
                    "mapPosition": 1,
                    "opponentAttacks": 1,
                    "attacks": [{"attackerTag": "#9Q8", "defenderTag": "#LQ2", "stars": 3, "destructionPercentage": 100, "order": 4}]
                }]
            },
            "opponent": {"tag": "#LL0", "name": "Rivals"}
        }"##;

        let war: War = serde_json::from_str(json).unwrap();
        assert_eq!(war.state, WarState::WarEnded);
        assert_eq!(war.normalized_war_tag(), Some(Tag::from("8QU8J9LP")));
        let (clan, opponent) = war.sides().unwrap();
        assert_eq!(clan.tag.as_str(), "2PP");
        assert_eq!(clan.level, 20);
        assert_eq!(clan.members[0].town_hall_level, 16);
        assert_eq!(clan.members[0].defense_count, 1);
        assert_eq!(clan.members[0].attacks[0].defender_tag, Tag::from("LQ2"));
        assert_eq!(opponent.stars, 0);
    }

    #[test]
    fn test_unknown_war_state_tolerated() {
        let war: War = serde_json::from_str(r#"{"state": "somethingNew"}"#).unwrap();
        assert_eq!(war.state, WarState::Unknown);
        assert!(war.sides().is_none());
    }

    #[test]
    fn test_unscheduled_war_tag_ignored() {
        let war = War {
            war_tag: Some("#0".to_string()),
            ..Default::default()
        };
        assert!(war.normalized_war_tag().is_none());
    }

    #[test]
    fn test_has_ended() {
        let now = Utc.with_ymd_and_hms(2024, 1, 7, 0, 0, 0).unwrap();
        let mut war = War {
            state: WarState::InWar,
            end_time: Some("20240106T183000.000Z".to_string()),
            ..Default::default()
        };
        assert!(war.has_ended(now));

        war.end_time = Some("20240108T183000.000Z".to_string());
        assert!(!war.has_ended(now));

        war.state = WarState::WarEnded;
        assert!(war.has_ended(now));
    }
}
