use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::build_report;
use crate::models::{CwlReport, LeaderboardEntry, MedalReward, MemberSummary, RoundStats, Tag};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Per-request league, ahead of the server-wide override
    pub league: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardResponse {
    pub clan_tag: Tag,
    pub league: Option<String>,
    pub our_rank: Option<u32>,
    pub medals: Option<MedalReward>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundsResponse {
    pub clan_tag: Tag,
    pub season: Option<String>,
    pub rounds: Vec<RoundStats>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersResponse {
    pub clan_tag: Tag,
    pub bonus_slots: Option<u32>,
    pub members: Vec<MemberSummary>,
}

async fn load_report(
    state: &AppState,
    raw_tag: &str,
    query: &ReportQuery,
) -> Result<CwlReport, ApiError> {
    let tag = Tag::parse(raw_tag).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let snapshot = state.source.snapshot(&tag).await?;
    debug!("Loaded snapshot for {} with {} wars", tag, snapshot.wars.len());

    let league = query
        .league
        .as_deref()
        .or(state.league_override.as_deref());
    Ok(build_report(&snapshot, &tag, league, Utc::now()))
}

pub async fn report(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<CwlReport>, ApiError> {
    Ok(Json(load_report(&state, &tag, &query).await?))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<LeaderboardResponse>, ApiError> {
    let report = load_report(&state, &tag, &query).await?;
    Ok(Json(LeaderboardResponse {
        clan_tag: report.clan_tag,
        league: report.league,
        our_rank: report.our_rank,
        medals: report.medals,
        leaderboard: report.leaderboard,
    }))
}

pub async fn rounds(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<RoundsResponse>, ApiError> {
    let report = load_report(&state, &tag, &query).await?;
    Ok(Json(RoundsResponse {
        clan_tag: report.clan_tag,
        season: report.season,
        rounds: report.rounds,
    }))
}

pub async fn members(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<MembersResponse>, ApiError> {
    let report = load_report(&state, &tag, &query).await?;
    Ok(Json(MembersResponse {
        clan_tag: report.clan_tag,
        bonus_slots: report.medals.map(|m| m.bonus_slots),
        members: report.members,
    }))
}
