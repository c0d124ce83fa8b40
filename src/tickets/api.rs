//! Ticket API Endpoints

use crate::api::{ApiError, CreatedResponse};
use crate::app::AppState;
use crate::auth::middleware::CurrentUser;
use crate::tickets::models::{CancelAllResponse, CancelForm, NewTicket, Ticket, TicketId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use axum_extra::extract::WithRejection;
use futures_util::TryStreamExt;
use serde_json::{json, Value};
use uuid::Uuid;

/// Book - POST /api/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    WithRejection(Form(form), _): WithRejection<Form<NewTicket>, ApiError>,
) -> Result<(StatusCode, Json<CreatedResponse<TicketId>>), ApiError> {
    let id = state.tickets.create(owner, form).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// All tickets - GET /api/tickets (public or authenticated per LIST_POLICY)
pub async fn list_tickets(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, ApiError> {
    let tickets: Vec<Ticket> = state.tickets.list().try_collect().await?;
    Ok(Json(tickets))
}

/// Caller's tickets - GET /api/tickets/mine
pub async fn my_tickets(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.tickets.list_by_owner(owner).await?))
}

/// Cancel one ticket - DELETE /api/tickets/:id
pub async fn delete_ticket(
    State(state): State<AppState>,
    CurrentUser(requester): CurrentUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, ApiError>,
) -> Result<StatusCode, ApiError> {
    state.tickets.delete_by_id(TicketId(id), requester).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Cancel by date - POST /api/tickets/cancel
pub async fn cancel_by_date(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
    WithRejection(Form(form), _): WithRejection<Form<CancelForm>, ApiError>,
) -> Result<Json<Value>, ApiError> {
    state
        .tickets
        .cancel_by_departure_date(owner, &form.departure_date)
        .await?;
    Ok(Json(json!({
        "message": format!("Your flight on {} has been cancelled", form.departure_date)
    })))
}

/// Cancel everything - POST /api/tickets/cancel-all
pub async fn cancel_all(
    State(state): State<AppState>,
    CurrentUser(owner): CurrentUser,
) -> Result<Json<CancelAllResponse>, ApiError> {
    let removed = state.tickets.cancel_all(owner).await?;
    Ok(Json(CancelAllResponse { removed }))
}
