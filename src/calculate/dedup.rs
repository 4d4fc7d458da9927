//! Collapsing wars reported from both sides into one record.

use std::collections::HashSet;

use tracing::debug;

use crate::models::{EntityId, War, WarKey};

/// Dedup key for a war.
///
/// Prefers the war tag; otherwise the sorted pair of clan tags plus the start
/// time; otherwise the start time alone. `None` when nothing identifies it.
pub fn war_key(war: &War) -> Option<WarKey> {
    if let Some(tag) = war.normalized_war_tag() {
        return Some(EntityId::generate(&["tag", tag.as_str()]));
    }

    let start = war.start_time.as_deref().unwrap_or("").trim();

    if let Some((clan, opponent)) = war.sides() {
        let mut pair = [clan.tag.as_str(), opponent.tag.as_str()];
        pair.sort_unstable();
        return Some(EntityId::generate(&["pair", pair[0], pair[1], start]));
    }

    if start.is_empty() {
        None
    } else {
        Some(EntityId::generate(&["start", start]))
    }
}

/// Keep the first war seen for every key.
///
/// Wars with neither side are dropped; wars without any usable key are kept
/// since there is nothing to match them against.
pub fn dedup_wars<'a, I>(wars: I) -> Vec<&'a War>
where
    I: IntoIterator<Item = &'a War>,
{
    let mut seen: HashSet<WarKey> = HashSet::new();
    let mut unique = Vec::new();

    for war in wars {
        if war.clan.is_none() && war.opponent.is_none() {
            debug!("Dropping war with no clan data");
            continue;
        }
        match war_key(war) {
            Some(key) => {
                if seen.insert(key.clone()) {
                    unique.push(war);
                } else {
                    debug!("Dropping duplicate war {}", key);
                }
            }
            None => unique.push(war),
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clan, Tag};

    fn war(clan: &str, opponent: &str, start: &str, war_tag: Option<&str>) -> War {
        War {
            clan: Some(Clan {
                tag: Tag::from(clan),
                ..Default::default()
            }),
            opponent: Some(Clan {
                tag: Tag::from(opponent),
                ..Default::default()
            }),
            start_time: Some(start.to_string()),
            war_tag: war_tag.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_mirrored_pair_collapses() {
        let wars = vec![
            war("#2PP", "#9QQ", "20240101T000000.000Z", None),
            war("#9QQ", "#2PP", "20240101T000000.000Z", None),
        ];
        let unique = dedup_wars(&wars);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].clan.as_ref().unwrap().tag, Tag::from("2PP"));
    }

    #[test]
    fn test_war_tag_wins_over_pair() {
        let wars = vec![
            war("#2PP", "#9QQ", "20240101T000000.000Z", Some("#AAA")),
            war("#2PP", "#9QQ", "20240101T000000.000Z", Some("#BBB")),
            war("#9QQ", "#2PP", "20240102T000000.000Z", Some("#aaa")),
        ];
        assert_eq!(dedup_wars(&wars).len(), 2);
    }

    #[test]
    fn test_same_pair_different_days_kept() {
        let wars = vec![
            war("#2PP", "#9QQ", "20240101T000000.000Z", None),
            war("#2PP", "#9QQ", "20240102T000000.000Z", None),
        ];
        assert_eq!(dedup_wars(&wars).len(), 2);
    }

    #[test]
    fn test_start_time_fallback() {
        let mut a = war("#2PP", "#9QQ", "20240101T000000.000Z", None);
        a.opponent = None;
        let b = a.clone();
        assert_eq!(war_key(&a), war_key(&b));
        assert_eq!(dedup_wars([&a, &b]).len(), 1);
    }

    #[test]
    fn test_empty_wars_dropped() {
        let wars = vec![War::default(), war("#2PP", "#9QQ", "x", None)];
        assert_eq!(dedup_wars(&wars).len(), 1);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let wars = vec![
            war("#2PP", "#9QQ", "20240101T000000.000Z", None),
            war("#9QQ", "#2PP", "20240101T000000.000Z", None),
            war("#2PP", "#LLL", "20240102T000000.000Z", Some("#CCC")),
            war("#LLL", "#2PP", "20240102T000000.000Z", Some("#CCC")),
            war("#9QQ", "#LLL", "20240103T000000.000Z", None),
        ];
        let once = dedup_wars(&wars);
        let twice = dedup_wars(once.iter().copied());

        assert_eq!(once.len(), 3);
        assert_eq!(once.len(), twice.len());
        let keys_once: Vec<_> = once.iter().map(|w| war_key(w)).collect();
        let keys_twice: Vec<_> = twice.iter().map(|w| war_key(w)).collect();
        assert_eq!(keys_once, keys_twice);
    }
}
