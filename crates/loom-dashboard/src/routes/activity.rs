//! `GET /api/activity?since=ISO`.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use loom_core::enums::EventType;
use loom_query::{activity_feed, ActivityFilter};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityQuery {
    since: Option<DateTime<Utc>>,
    actor: Option<String>,
    event_type: Option<EventType>,
    limit: Option<usize>,
    #[serde(default)]
    offset: usize,
}

pub async fn list(State(state): State<AppState>, Query(q): Query<ActivityQuery>) -> Result<Json<Value>, ApiError> {
    let filter = ActivityFilter {
        since: q.since,
        actor: q.actor,
        event_type: q.event_type,
        limit: q.limit,
        offset: q.offset,
    };
    let events = activity_feed(state.store.as_ref(), &filter)?;
    Ok(Json(json!({ "events": events })))
}
