//! Member season summaries and the mirror bonus rule.
//!
//! A mirror attack hits the defender holding the same roster position on the
//! other side. Members must land at least one mirror attack in every round
//! they attack in to qualify for bonus medals; the qualifying members are
//! then ranked by stars and destruction and the top `bonus_slots` of them
//! are marked eligible.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use super::dedup::dedup_wars;
use super::rounds::RoundWars;
use super::sides::resolve_sides;
use crate::models::{
    Attack, AttackRecord, Clan, Member, MemberRoundStats, MemberSummary, Tag, CWL_ROUNDS,
};

/// Whether `attack`, made from roster position `attacker_position`, hit the
/// opposing member at the same position.
///
/// Position is the identity key; the tag only locates the defender.
pub fn is_mirror_attack(attacker_position: u32, attack: &Attack, opponents: &Clan) -> bool {
    defender_position(attack, opponents).is_some_and(|pos| pos == attacker_position)
}

fn defender_position(attack: &Attack, opponents: &Clan) -> Option<u32> {
    opponents
        .member(&attack.defender_tag)
        .map(|d| d.map_position)
        .filter(|pos| *pos > 0)
}

#[derive(Debug)]
struct MemberAccumulator {
    tag: Tag,
    name: String,
    town_hall_level: u32,
    rounds: Vec<Option<MemberRoundStats>>,
}

impl MemberAccumulator {
    fn new(member: &Member) -> Self {
        Self {
            tag: member.tag.clone(),
            name: member.name.clone(),
            town_hall_level: member.town_hall_level,
            rounds: vec![None; CWL_ROUNDS as usize],
        }
    }

    fn record(&mut self, round: u8, member: &Member, opponents: &Clan) {
        // Later rounds carry fresher names and town hall levels
        if !member.name.is_empty() {
            self.name = member.name.clone();
        }
        self.town_hall_level = self.town_hall_level.max(member.town_hall_level);

        let slot = &mut self.rounds[(round - 1) as usize];
        let stats = slot.get_or_insert_with(|| MemberRoundStats {
            map_position: member.map_position,
            ..Default::default()
        });

        for attack in &member.attacks {
            let defender_position = defender_position(attack, opponents);
            stats.stars += attack.stars;
            stats.destruction += attack.destruction_percentage;
            stats.attacks.push(AttackRecord {
                order: attack.order,
                defender_tag: attack.defender_tag.clone(),
                defender_position,
                stars: attack.stars,
                destruction: attack.destruction_percentage,
                is_mirror: is_mirror_attack(member.map_position, attack, opponents),
            });
        }
        stats.attacks.sort_by_key(|a| a.order);
    }

    fn finish(self) -> MemberSummary {
        let played: Vec<&MemberRoundStats> = self.rounds.iter().flatten().collect();
        let total_stars: u32 = played.iter().map(|r| r.stars).sum();
        let total_destruction: f64 = played.iter().map(|r| r.destruction).sum();
        let total_attacks: u32 = played.iter().map(|r| r.attacks.len() as u32).sum();
        let rounds_played = played.len() as u32;
        let has_mirror_bonus_rule = played
            .iter()
            .filter(|r| r.attacked())
            .all(|r| r.has_mirror_attack());

        MemberSummary {
            tag: self.tag,
            name: self.name,
            town_hall_level: self.town_hall_level,
            rounds: self.rounds,
            total_stars,
            total_destruction,
            total_attacks,
            rounds_played,
            has_mirror_bonus_rule,
            is_bonus_eligible: false,
        }
    }
}

/// Build one summary per member of our clan across all rounds.
///
/// Sorted by total stars, then total destruction, both descending. With
/// `bonus_slots` unknown nobody is marked eligible.
pub fn build_member_summaries(
    rounds: &[RoundWars<'_>],
    our_tag: &Tag,
    bonus_slots: Option<u32>,
) -> Vec<MemberSummary> {
    let mut index: HashMap<Tag, usize> = HashMap::new();
    let mut members: Vec<MemberAccumulator> = Vec::new();

    for round in rounds {
        if round.round == 0 || round.round > CWL_ROUNDS {
            debug!("Ignoring out-of-range round {}", round.round);
            continue;
        }
        for war in dedup_wars(round.wars.iter().copied()) {
            let Some(sides) = resolve_sides(war, our_tag) else {
                continue;
            };
            for member in &sides.ours.members {
                let idx = *index.entry(member.tag.clone()).or_insert_with(|| {
                    members.push(MemberAccumulator::new(member));
                    members.len() - 1
                });
                members[idx].record(round.round, member, sides.theirs);
            }
        }
    }

    let mut summaries: Vec<MemberSummary> =
        members.into_iter().map(MemberAccumulator::finish).collect();
    summaries.sort_by(by_performance);

    if let Some(slots) = bonus_slots {
        mark_bonus_eligible(&mut summaries, slots as usize);
    }

    summaries
}

fn by_performance(a: &MemberSummary, b: &MemberSummary) -> Ordering {
    b.total_stars
        .cmp(&a.total_stars)
        .then_with(|| b.total_destruction.total_cmp(&a.total_destruction))
}

/// Mark the top `slots` rule-abiding members who attacked at least once.
///
/// Exact ties at the cutoff are broken by member tag so the outcome does not
/// depend on roster order.
pub fn mark_bonus_eligible(summaries: &mut [MemberSummary], slots: usize) {
    let mut candidates: Vec<usize> = summaries
        .iter()
        .enumerate()
        .filter(|(_, s)| s.has_mirror_bonus_rule && s.total_attacks > 0)
        .map(|(idx, _)| idx)
        .collect();

    candidates.sort_by(|&a, &b| {
        by_performance(&summaries[a], &summaries[b])
            .then_with(|| summaries[a].tag.cmp(&summaries[b].tag))
    });

    for summary in summaries.iter_mut() {
        summary.is_bonus_eligible = false;
    }
    for idx in candidates.into_iter().take(slots) {
        summaries[idx].is_bonus_eligible = true;
    }
}
