//! Per-round classification for our clan.

use chrono::{DateTime, Utc};

use super::sides::resolve_sides;
use crate::models::{Outcome, RoundResult, RoundStats, RoundStatus, Tag, War};

/// The wars belonging to one CWL round.
#[derive(Debug, Clone, Default)]
pub struct RoundWars<'a> {
    pub round: u8,
    pub wars: Vec<&'a War>,
}

impl<'a> RoundWars<'a> {
    pub fn new(round: u8, wars: Vec<&'a War>) -> Self {
        Self { round, wars }
    }
}

/// Classify one round from our clan's point of view.
///
/// Destruction is the plain mean of the wars' percentages, not weighted by
/// team size. Wars we did not fight in are ignored; a round without any
/// usable war is reported as in progress with zeroed stats.
pub fn classify_round(round: &RoundWars<'_>, our_tag: &Tag, now: DateTime<Utc>) -> RoundStats {
    let oriented: Vec<_> = round
        .wars
        .iter()
        .filter_map(|war| resolve_sides(war, our_tag).map(|sides| (*war, sides)))
        .collect();

    let Some((_, first)) = oriented.first() else {
        return RoundStats::pending(round.round);
    };

    let count = oriented.len() as f64;
    let our_stars: u32 = oriented.iter().map(|(_, s)| s.ours.stars).sum();
    let opponent_stars: u32 = oriented.iter().map(|(_, s)| s.theirs.stars).sum();
    let our_destruction = oriented
        .iter()
        .map(|(_, s)| s.ours.destruction_percentage)
        .sum::<f64>()
        / count;
    let opponent_destruction = oriented
        .iter()
        .map(|(_, s)| s.theirs.destruction_percentage)
        .sum::<f64>()
        / count;

    let completed = oriented.iter().all(|(war, _)| war.has_ended(now));
    let (status, result) = if completed {
        let outcome =
            Outcome::decide(our_stars, opponent_stars, our_destruction, opponent_destruction);
        (RoundStatus::Completed, RoundResult::from(outcome))
    } else {
        (RoundStatus::InProgress, RoundResult::Pending)
    };

    RoundStats {
        round: round.round,
        status,
        result,
        our_clan_name: first.ours.name.clone(),
        opponent_clan_name: first.theirs.name.clone(),
        our_clan_tag: Some(first.ours.tag.clone()),
        opponent_clan_tag: Some(first.theirs.tag.clone()),
        our_clan_badge: Some(first.ours.badge_urls.clone()),
        opponent_clan_badge: Some(first.theirs.badge_urls.clone()),
        our_clan_level: first.ours.level,
        opponent_clan_level: first.theirs.level,
        our_stars,
        opponent_stars,
        our_destruction,
        opponent_destruction,
    }
}
