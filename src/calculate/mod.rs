//! CWL aggregation engine.
//!
//! Pure functions that turn raw war records into dashboard views:
//! - War deduplication (same war reported from both sides)
//! - Group leaderboard with promotion/demotion zones and medals
//! - Per-round win/loss classification
//! - Member summaries with mirror bonus rule and bonus eligibility
//!
//! Nothing here does I/O or keeps state between calls; malformed wars are
//! skipped rather than reported.

pub mod dedup;
pub mod leaderboard;
pub mod medals;
pub mod report;
pub mod rounds;
pub mod sides;
pub mod summary;
pub mod zones;

pub use dedup::{dedup_wars, war_key};
pub use leaderboard::build_leaderboard;
pub use medals::medal_reward;
pub use report::{build_report, wars_by_round};
pub use rounds::{classify_round, RoundWars};
pub use sides::{resolve_sides, Sides};
pub use summary::{build_member_summaries, is_mirror_attack, mark_bonus_eligible};
pub use zones::PromotionZones;
