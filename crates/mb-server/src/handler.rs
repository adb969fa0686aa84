//! Request handlers.
//!
//! Bodies carry the acting principal explicitly as `caller`; the
//! deployment's perimeter is trusted to have authenticated it before the
//! request reaches this process. Handlers parse and delegate — every rule
//! lives in `mb-ledger`.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use mb_crypto::Attestation;
use mb_events::SnapshotStored;
use mb_types::{
    AccountId, DateKey, PeriodKey, Role, SettlementFields, SettlementRecord, SnapshotPayload,
    SnapshotRecord, StationId,
};

use crate::error::ServerResult;
use crate::router::AppState;

#[derive(Debug, Deserialize)]
pub struct StoreSnapshotRequest {
    pub caller: AccountId,
    pub payload: SnapshotPayload,
    pub attestation: Attestation,
}

#[derive(Debug, Deserialize)]
pub struct StoreSettlementRequest {
    pub caller: AccountId,
    pub station: StationId,
    pub period: PeriodKey,
    #[serde(flatten)]
    pub fields: SettlementFields,
}

#[derive(Debug, Deserialize)]
pub struct AmendSettlementRequest {
    pub caller: AccountId,
    pub reason: String,
    #[serde(flatten)]
    pub fields: SettlementFields,
}

#[derive(Debug, Deserialize)]
pub struct CallerRequest {
    pub caller: AccountId,
}

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    pub caller: AccountId,
    pub account: AccountId,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct RenounceRequest {
    pub caller: AccountId,
    pub role: Role,
}

pub async fn store_snapshot(
    State(state): State<AppState>,
    Json(req): Json<StoreSnapshotRequest>,
) -> ServerResult<Json<SnapshotStored>> {
    let stored = state
        .ledger
        .store_daily_snapshot(req.caller, &req.payload, &req.attestation)?;
    Ok(Json(stored))
}

pub async fn get_snapshot(
    State(state): State<AppState>,
    Path((station, date)): Path<(String, String)>,
) -> ServerResult<Json<SnapshotRecord>> {
    let station = StationId::new(station)?;
    let date = DateKey::new(date)?;
    Ok(Json(state.ledger.snapshot(&station, &date)?))
}

pub async fn store_settlement(
    State(state): State<AppState>,
    Json(req): Json<StoreSettlementRequest>,
) -> ServerResult<Json<SettlementRecord>> {
    let record =
        state
            .ledger
            .store_monthly_settlement(req.caller, req.station, req.period, req.fields)?;
    Ok(Json(record))
}

pub async fn amend_settlement(
    State(state): State<AppState>,
    Path((station, period)): Path<(String, String)>,
    Json(req): Json<AmendSettlementRequest>,
) -> ServerResult<Json<SettlementRecord>> {
    let station = StationId::new(station)?;
    let period = PeriodKey::new(period)?;
    let record =
        state
            .ledger
            .amend_monthly_settlement(req.caller, station, period, req.reason, req.fields)?;
    Ok(Json(record))
}

pub async fn get_effective_settlement(
    State(state): State<AppState>,
    Path((station, period)): Path<(String, String)>,
) -> ServerResult<Json<SettlementRecord>> {
    let station = StationId::new(station)?;
    let period = PeriodKey::new(period)?;
    Ok(Json(state.ledger.effective_settlement(&station, &period)?))
}

pub async fn get_settlement_by_revision(
    State(state): State<AppState>,
    Path((station, period, revision)): Path<(String, String, u16)>,
) -> ServerResult<Json<SettlementRecord>> {
    let station = StationId::new(station)?;
    let period = PeriodKey::new(period)?;
    Ok(Json(
        state
            .ledger
            .settlement_by_revision(&station, &period, revision)?,
    ))
}

pub async fn pause(
    State(state): State<AppState>,
    Json(req): Json<CallerRequest>,
) -> ServerResult<Json<Value>> {
    state.ledger.pause(req.caller)?;
    Ok(Json(json!({ "paused": true })))
}

pub async fn unpause(
    State(state): State<AppState>,
    Json(req): Json<CallerRequest>,
) -> ServerResult<Json<Value>> {
    state.ledger.unpause(req.caller)?;
    Ok(Json(json!({ "paused": false })))
}

pub async fn grant_role(
    State(state): State<AppState>,
    Json(req): Json<RoleChangeRequest>,
) -> ServerResult<Json<Value>> {
    let changed = state.ledger.grant_role(req.caller, req.account, req.role)?;
    Ok(Json(json!({ "changed": changed })))
}

pub async fn revoke_role(
    State(state): State<AppState>,
    Json(req): Json<RoleChangeRequest>,
) -> ServerResult<Json<Value>> {
    let changed = state.ledger.revoke_role(req.caller, req.account, req.role)?;
    Ok(Json(json!({ "changed": changed })))
}

pub async fn renounce_role(
    State(state): State<AppState>,
    Json(req): Json<RenounceRequest>,
) -> ServerResult<Json<Value>> {
    let changed = state.ledger.renounce_role(req.caller, req.role)?;
    Ok(Json(json!({ "changed": changed })))
}

pub async fn get_roles(
    State(state): State<AppState>,
    Path(account): Path<String>,
) -> ServerResult<Json<Value>> {
    let account = AccountId::from_hex(&account)?;
    let roles = state.ledger.roles_of(&account)?;
    Ok(Json(json!({ "account": account, "roles": roles })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn info(State(state): State<AppState>) -> ServerResult<Json<Value>> {
    Ok(Json(json!({
        "name": "mb-server",
        "version": env!("CARGO_PKG_VERSION"),
        "realm": state.ledger.domain().realm(),
        "paused": state.ledger.is_paused()?,
        "snapshots": state.ledger.snapshot_count()?,
        "settlement_periods": state.ledger.settlement_period_count()?,
        "settlement_revisions": state.ledger.settlement_revision_count()?,
        "notices": state.ledger.journal().last_seq(),
    })))
}
