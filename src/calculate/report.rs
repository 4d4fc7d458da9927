//! Assembling the full CWL report from a snapshot.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::dedup::dedup_wars;
use super::leaderboard::{build_leaderboard, clans_from_wars};
use super::medals::medal_reward;
use super::rounds::{classify_round, RoundWars};
use super::summary::build_member_summaries;
use crate::models::{CwlReport, CwlSnapshot, Provided, Tag, War, CWL_ROUNDS};

/// Group the snapshot's wars by round number.
///
/// Wars are matched to rounds through the group's war tags. Snapshots without
/// a round schedule fall back to ordering our own wars by start time.
pub fn wars_by_round<'a>(snapshot: &'a CwlSnapshot, our_tag: &Tag) -> Vec<RoundWars<'a>> {
    let schedule = snapshot.group.round_war_tags();

    if schedule.is_empty() {
        let mut ours: Vec<&War> = dedup_wars(&snapshot.wars)
            .into_iter()
            .filter(|w| w.involves(our_tag))
            .collect();
        ours.sort_by_key(|w| w.start());
        return ours
            .into_iter()
            .take(CWL_ROUNDS as usize)
            .enumerate()
            .map(|(idx, war)| RoundWars::new(idx as u8 + 1, vec![war]))
            .collect();
    }

    let mut by_tag: HashMap<Tag, &War> = HashMap::new();
    for war in &snapshot.wars {
        if let Some(tag) = war.normalized_war_tag() {
            by_tag.entry(tag).or_insert(war);
        }
    }

    schedule
        .into_iter()
        .map(|(round, tags)| {
            let wars = tags
                .iter()
                .filter_map(|t| {
                    let war = by_tag.get(t).copied();
                    if war.is_none() {
                        debug!("War {} for round {} not in snapshot", t, round);
                    }
                    war
                })
                .collect();
            RoundWars::new(round, wars)
        })
        .collect()
}

/// League name for our clan: explicit override, then group entry, then wars.
fn our_league<'a>(
    snapshot: &'a CwlSnapshot,
    our_tag: &Tag,
    league_override: Option<&'a str>,
) -> Option<&'a str> {
    if let Some(name) = league_override.filter(|n| !n.trim().is_empty()) {
        return Some(name);
    }
    if let Some(name) = snapshot.group.clan(our_tag).and_then(|c| c.league_name()) {
        return Some(name);
    }
    snapshot
        .wars
        .iter()
        .flat_map(|w| [&w.clan, &w.opponent])
        .flatten()
        .find(|c| c.tag == *our_tag)
        .and_then(|c| c.league_name())
}

/// Derive every dashboard view for `our_tag` from one snapshot.
pub fn build_report(
    snapshot: &CwlSnapshot,
    our_tag: &Tag,
    league_override: Option<&str>,
    now: DateTime<Utc>,
) -> CwlReport {
    let league = our_league(snapshot, our_tag, league_override);
    let rounds = wars_by_round(snapshot, our_tag);

    let scheduled: Vec<&War> = rounds.iter().flat_map(|r| r.wars.iter().copied()).collect();
    let unique = if scheduled.is_empty() {
        dedup_wars(&snapshot.wars)
    } else {
        dedup_wars(scheduled)
    };

    let provided: Provided<_> = Provided::from(snapshot.group.leaderboard.clone()).non_empty();
    if provided.is_provided() {
        debug!("Using backend-provided leaderboard");
    }
    let leaderboard = provided.or_compute(|| {
        if snapshot.group.clans.is_empty() {
            let clans = clans_from_wars(unique.iter().copied());
            build_leaderboard(&clans, unique.iter().copied(), league)
        } else {
            build_leaderboard(&snapshot.group.clans, unique.iter().copied(), league)
        }
    });

    let ours = leaderboard.iter().find(|e| e.tag == *our_tag);
    let our_rank = ours.map(|e| e.rank);
    let medals = match (league, ours) {
        (Some(league), Some(entry)) => medal_reward(league, entry.rank, entry.wins),
        _ => None,
    };

    let round_stats = (1..=CWL_ROUNDS)
        .map(|n| match rounds.iter().find(|r| r.round == n) {
            Some(round) => classify_round(round, our_tag, now),
            None => classify_round(&RoundWars::new(n, Vec::new()), our_tag, now),
        })
        .collect();

    let members = build_member_summaries(&rounds, our_tag, medals.map(|m| m.bonus_slots));

    info!(
        "Built CWL report for {}: {} clans, {} rounds scheduled, {} members",
        our_tag,
        leaderboard.len(),
        rounds.iter().filter(|r| !r.wars.is_empty()).count(),
        members.len()
    );

    CwlReport {
        clan_tag: our_tag.clone(),
        season: snapshot.group.season.clone(),
        league: league.map(str::to_string),
        our_rank,
        medals,
        leaderboard,
        rounds: round_stats,
        members,
        generated_at: now,
    }
}
