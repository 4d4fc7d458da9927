//! Core data models: API war records, league tiers and derived CWL views.

mod group;
mod ids;
mod league;
mod provided;
mod stats;
mod war;

pub use group::*;
pub use ids::*;
pub use league::*;
pub use provided::*;
pub use stats::*;
pub use war::*;
