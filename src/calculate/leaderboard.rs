//! Group leaderboard aggregation.

use std::collections::HashMap;

use tracing::debug;

use super::medals::medal_reward;
use super::zones::PromotionZones;
use crate::models::{Clan, LeaderboardEntry, Outcome, Tag, War, WarState};

/// Running totals for one clan.
#[derive(Debug, Default)]
struct ClanTally {
    stars: u32,
    destruction_points: f64,
    wars: u32,
    wins: u32,
    ties: u32,
    losses: u32,
}

impl ClanTally {
    fn record(&mut self, side: &Clan, team_size: u32, outcome: Outcome) {
        self.stars += side.stars;
        self.destruction_points += side.destruction_percentage * team_size as f64;
        self.wars += 1;
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Tie => self.ties += 1,
            Outcome::Loss => self.losses += 1,
        }
    }

    fn average_destruction(&self) -> f64 {
        if self.wars == 0 {
            0.0
        } else {
            self.destruction_points / self.wars as f64
        }
    }
}

/// Fold deduplicated wars into a ranked leaderboard.
///
/// Destruction is counted in points (percentage × team size), so larger wars
/// weigh more. Ranking is by total stars, then average destruction points;
/// clans tied on both keep their group order. Wars still in preparation
/// count for nobody. `league` drives the zone and
/// medal columns; `None` leaves them unset.
pub fn build_leaderboard<'a, I>(
    clans: &[Clan],
    wars: I,
    league: Option<&str>,
) -> Vec<LeaderboardEntry>
where
    I: IntoIterator<Item = &'a War>,
{
    let mut order: Vec<&Clan> = Vec::with_capacity(clans.len());
    let mut tallies: HashMap<Tag, ClanTally> = HashMap::new();
    for clan in clans {
        if tallies.contains_key(&clan.tag) {
            continue;
        }
        tallies.insert(clan.tag.clone(), ClanTally::default());
        order.push(clan);
    }

    for war in wars {
        let Some((clan, opponent)) = war.sides() else {
            debug!("Skipping incomplete war {:?}", war.war_tag);
            continue;
        };
        if matches!(war.state, WarState::Preparation | WarState::NotInWar) {
            debug!("Skipping war {:?} that has not started", war.war_tag);
            continue;
        }

        let outcome = Outcome::decide(
            clan.stars,
            opponent.stars,
            clan.destruction_percentage,
            opponent.destruction_percentage,
        );
        let mirrored = match outcome {
            Outcome::Win => Outcome::Loss,
            Outcome::Loss => Outcome::Win,
            Outcome::Tie => Outcome::Tie,
        };

        if let Some(tally) = tallies.get_mut(&clan.tag) {
            tally.record(clan, war.team_size, outcome);
        }
        if let Some(tally) = tallies.get_mut(&opponent.tag) {
            tally.record(opponent, war.team_size, mirrored);
        }
    }

    let mut rows: Vec<(&Clan, ClanTally)> = order
        .into_iter()
        .map(|clan| {
            let tally = tallies.remove(&clan.tag).unwrap_or_default();
            (clan, tally)
        })
        .collect();

    // Stable: equal rows keep group order
    rows.sort_by(|(_, a), (_, b)| {
        b.stars
            .cmp(&a.stars)
            .then_with(|| b.average_destruction().total_cmp(&a.average_destruction()))
    });

    let zones = league.map(PromotionZones::for_league).unwrap_or_default();

    rows.into_iter()
        .enumerate()
        .map(|(idx, (clan, tally))| {
            let rank = idx as u32 + 1;
            let medals = league.and_then(|l| medal_reward(l, rank, tally.wins));
            LeaderboardEntry {
                tag: clan.tag.clone(),
                name: clan.name.clone(),
                badge_urls: clan.badge_urls.clone(),
                rank,
                total_stars: tally.stars,
                total_destruction: tally.destruction_points,
                average_destruction: tally.average_destruction(),
                wars: tally.wars,
                wins: tally.wins,
                ties: tally.ties,
                losses: tally.losses,
                is_promoted: zones.is_promoted(rank),
                is_demoted: zones.is_demoted(rank),
                medals_per_member: medals.map(|m| m.medals_per_member),
                bonus_medals: medals.map(|m| m.bonus_medals),
                total_bonus_medals: medals.map(|m| m.total_bonus_medals),
            }
        })
        .collect()
}

/// Clans appearing on either side of the given wars, first-seen order.
pub fn clans_from_wars<'a, I>(wars: I) -> Vec<Clan>
where
    I: IntoIterator<Item = &'a War>,
{
    let mut seen = std::collections::HashSet::new();
    let mut clans = Vec::new();
    for war in wars {
        for side in [&war.clan, &war.opponent].into_iter().flatten() {
            if seen.insert(side.tag.clone()) {
                clans.push(Clan {
                    tag: side.tag.clone(),
                    name: side.name.clone(),
                    level: side.level,
                    badge_urls: side.badge_urls.clone(),
                    war_league: side.war_league.clone(),
                    ..Default::default()
                });
            }
        }
    }
    clans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn clan(tag: &str) -> Clan {
        Clan {
            tag: Tag::from(tag),
            name: format!("Clan {}", tag),
            ..Default::default()
        }
    }

    fn side(tag: &str, stars: u32, destruction: f64) -> Clan {
        Clan {
            stars,
            destruction_percentage: destruction,
            ..clan(tag)
        }
    }

    fn war(team_size: u32, a: Clan, b: Clan) -> War {
        War {
            team_size,
            clan: Some(a),
            opponent: Some(b),
            ..Default::default()
        }
    }

    fn group() -> Vec<Clan> {
        ["A", "B", "C", "D", "E", "F", "G", "H"]
            .iter()
            .map(|t| clan(t))
            .collect()
    }

    fn round_robin() -> Vec<War> {
        vec![
            war(15, side("A", 40, 95.0), side("B", 30, 80.0)),
            war(15, side("C", 35, 90.0), side("D", 35, 88.0)),
            war(15, side("E", 20, 60.0), side("F", 20, 60.0)),
            war(15, side("G", 10, 40.0), side("H", 44, 99.0)),
            war(15, side("B", 41, 97.0), side("C", 12, 50.0)),
            war(15, side("A", 33, 85.0), side("H", 33, 86.0)),
        ]
    }

    #[test]
    fn test_ranks_are_one_to_n() {
        let board = build_leaderboard(&group(), &round_robin(), Some("Gold League I"));
        let mut ranks: Vec<u32> = board.iter().map(|e| e.rank).collect();
        ranks.sort_unstable();
        assert_eq!(ranks, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn test_record_adds_up() {
        let wars = round_robin();
        let board = build_leaderboard(&group(), &wars, None);
        for entry in &board {
            let involved = wars.iter().filter(|w| w.involves(&entry.tag)).count() as u32;
            assert_eq!(entry.wins + entry.losses + entry.ties, involved, "{}", entry.tag);
            assert_eq!(entry.wars, involved);
        }
    }

    #[test]
    fn test_each_war_has_one_outcome() {
        let board = build_leaderboard(&group(), &round_robin(), None);
        let wins: u32 = board.iter().map(|e| e.wins).sum();
        let losses: u32 = board.iter().map(|e| e.losses).sum();
        let ties: u32 = board.iter().map(|e| e.ties).sum();
        assert_eq!(wins, losses);
        assert_eq!(ties % 2, 0);
        assert_eq!(wins + ties / 2, 6);
    }

    #[test]
    fn test_star_tie_broken_by_destruction_percentage() {
        let board = build_leaderboard(&group(), &round_robin(), None);
        let c = board.iter().find(|e| e.tag == Tag::from("C")).unwrap();
        let d = board.iter().find(|e| e.tag == Tag::from("D")).unwrap();
        assert_eq!(c.wins, 1);
        assert_eq!(d.losses, 1);

        let e = board.iter().find(|e| e.tag == Tag::from("E")).unwrap();
        assert_eq!(e.ties, 1);
    }

    #[test]
    fn test_destruction_points_scale_with_team_size() {
        let clans = vec![clan("A"), clan("B"), clan("C")];
        let big = vec![war(30, side("A", 0, 50.0), side("B", 0, 0.0))];
        let small = vec![
            war(15, side("C", 0, 50.0), side("B", 0, 0.0)),
            war(15, side("C", 0, 50.0), side("B", 0, 0.0)),
        ];

        let big_board = build_leaderboard(&clans, &big, None);
        let a = &big_board[0];
        let c = build_leaderboard(&clans, &small, None)
            .into_iter()
            .find(|e| e.tag == Tag::from("C"))
            .unwrap();

        assert_eq!(a.total_destruction, 1500.0);
        assert_eq!(c.total_destruction, 1500.0);
    }

    #[test]
    fn test_ordering_by_stars_then_average_destruction() {
        let clans = vec![clan("A"), clan("B"), clan("C")];
        let wars = vec![
            war(10, side("A", 20, 70.0), side("B", 20, 90.0)),
            war(10, side("C", 25, 50.0), side("A", 5, 10.0)),
        ];
        let board = build_leaderboard(&clans, &wars, None);
        let order: Vec<&str> = board.iter().map(|e| e.tag.as_str()).collect();
        // A and C both have 25 stars; C averages 500 points to A's 400
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(board[1].total_stars, 25);
        assert_eq!(board[1].average_destruction, 400.0);
    }

    #[test]
    fn test_full_tie_keeps_group_order() {
        let clans = vec![clan("B"), clan("A")];
        let board = build_leaderboard(&clans, std::iter::empty::<&War>(), None);
        assert_eq!(board[0].tag, Tag::from("B"));
        assert_eq!(board[1].tag, Tag::from("A"));
        assert_eq!(board[0].average_destruction, 0.0);
    }

    #[test]
    fn test_zones_and_medals_attached() {
        let board = build_leaderboard(&group(), &round_robin(), Some("Bronze League III"));
        assert!(board[..3].iter().all(|e| e.is_promoted));
        assert!(board[3..].iter().all(|e| !e.is_promoted));
        assert!(board.iter().all(|e| !e.is_demoted));
        assert_eq!(board[0].medals_per_member, Some(34));

        let unknown = build_leaderboard(&group(), &round_robin(), None);
        assert!(unknown.iter().all(|e| e.medals_per_member.is_none()));
        assert!(unknown.iter().all(|e| !e.is_promoted && !e.is_demoted));
    }

    #[test]
    fn test_incomplete_and_foreign_wars_skipped() {
        let clans = vec![clan("A"), clan("B")];
        let mut broken = war(15, side("A", 30, 90.0), side("B", 0, 0.0));
        broken.opponent = None;
        let foreign = war(15, side("A", 30, 90.0), side("Z", 0, 0.0));

        let board = build_leaderboard(&clans, [&broken, &foreign], None);
        let a = board.iter().find(|e| e.tag == Tag::from("A")).unwrap();
        assert_eq!(a.wars, 1);
        assert_eq!(a.wins, 1);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn test_unstarted_wars_not_counted() {
        let mut prep = war(15, side("A", 0, 0.0), side("B", 0, 0.0));
        prep.state = WarState::Preparation;
        let mut idle = war(15, side("A", 0, 0.0), side("C", 0, 0.0));
        idle.state = WarState::NotInWar;
        let mut played = war(15, side("A", 20, 80.0), side("C", 10, 40.0));
        played.state = WarState::WarEnded;

        let board = build_leaderboard(&group(), [&prep, &idle, &played], None);
        let a = board.iter().find(|e| e.tag == Tag::from("A")).unwrap();
        let b = board.iter().find(|e| e.tag == Tag::from("B")).unwrap();

        assert_eq!((a.wars, a.wins, a.ties, a.losses), (1, 1, 0, 0));
        assert_eq!(a.average_destruction, 1200.0);
        assert_eq!((b.wars, b.ties), (0, 0));
    }

    #[test]
    fn test_clans_from_wars() {
        let clans = clans_from_wars(&round_robin());
        assert_eq!(clans.len(), 8);
        assert_eq!(clans[0].tag, Tag::from("A"));
        assert_eq!(clans[0].stars, 0);
    }
}
