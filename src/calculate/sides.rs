//! Resolving which side of a war is ours.

use crate::models::{Clan, Tag, War};

/// Both sides of a war, oriented from one clan's point of view.
#[derive(Debug, Clone, Copy)]
pub struct Sides<'a> {
    pub ours: &'a Clan,
    pub theirs: &'a Clan,
}

/// Orient a war around `our_tag`.
///
/// Returns `None` for incomplete wars and for wars the clan did not fight.
/// The `clan`/`opponent` field positions carry no meaning: the API reports
/// the same war with either clan first.
pub fn resolve_sides<'a>(war: &'a War, our_tag: &Tag) -> Option<Sides<'a>> {
    let (clan, opponent) = war.sides()?;
    if clan.tag == *our_tag {
        Some(Sides {
            ours: clan,
            theirs: opponent,
        })
    } else if opponent.tag == *our_tag {
        Some(Sides {
            ours: opponent,
            theirs: clan,
        })
    } else {
        None
    }
}
