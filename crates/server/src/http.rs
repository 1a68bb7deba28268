// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP routes, handlers and the error body.
//!
//! Handlers are thin: they extract the request, lock the store, call the
//! matching `marquee_api` operation at the current instant and map the
//! result onto a status code.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State as AxumState,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use marquee_api::{
    AccountDetailsResponse, AccountInfo, AccountStatsResponse, AdjustTierRequest, ApiError,
    ApiResult, BookingHistoryResponse, BookingInfo, BookingStatsResponse, ChangeRoleRequest,
    CompletePaymentRequest, CreateBookingRequest, CreateEventRequest, DashboardResponse,
    DeleteAccountResponse, EventInfo, ListAccountsQuery, ListAccountsResponse, ListBookingsQuery,
    ListBookingsResponse, ListEventsResponse, LoginRequest, LoginResponse, MyBookingsResponse,
    RegisterRequest, SetTierPriceRequest, TierLevelsResponse, UpdateBookingStatusRequest,
    UpdateEventStatusRequest, VerifyProofRequest, VerifyProofResponse,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, error, info};

use crate::AppState;
use crate::session::SessionAccount;

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always `true`.
    pub error: bool,
    /// Stable machine-readable error kind.
    pub kind: String,
    pub message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl HttpError {
    pub const fn new(status: StatusCode, kind: &'static str, message: String) -> Self {
        Self {
            status,
            kind,
            message,
        }
    }

    const fn invalid_input(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_input", message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: self.kind.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::InvalidInput { .. }
            | ApiError::PasswordPolicyViolation { .. }
            | ApiError::EventNotBookable { .. }
            | ApiError::InsufficientInventory { .. }
            | ApiError::NotCancellable { .. }
            | ApiError::DeadlinePassed { .. }
            | ApiError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            ApiError::EncodingFailure { .. } | ApiError::StoreUnavailable { .. } => {
                error!(kind = err.kind(), error = %err, "Request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.kind(), err.to_string())
    }
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(error = %rejection, "Rejected request body");
        Self::invalid_input(rejection.body_text())
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self::invalid_input(rejection.body_text())
    }
}

type HttpResult<T> = Result<T, HttpError>;

/// Response for the health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Response for a successful logout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub logged_out: bool,
}

/// Locks the store and runs one API operation at the current instant.
async fn with_store<T>(
    app_state: &AppState,
    operation: impl FnOnce(&mut marquee_persistence::Persistence, OffsetDateTime) -> ApiResult<T>,
) -> HttpResult<T> {
    let mut persistence = app_state.persistence.lock().await;
    Ok(operation(&mut persistence, OffsetDateTime::now_utc())?)
}

// ========================================================================
// Health and accounts
// ========================================================================

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<AccountInfo>)> {
    let Json(req) = body?;
    let account: AccountInfo =
        with_store(&app_state, |p, now| marquee_api::register(p, &req, now)).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> HttpResult<Json<LoginResponse>> {
    let Json(req) = body?;
    let response: LoginResponse =
        with_store(&app_state, |p, now| marquee_api::login(p, &req, now)).await?;
    Ok(Json(response))
}

async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> HttpResult<Json<LogoutResponse>> {
    with_store(&app_state, |p, _| marquee_api::logout(p, &session.token)).await?;
    info!(account_id = session.actor.account_id, "Logged out");
    Ok(Json(LogoutResponse { logged_out: true }))
}

async fn handle_whoami(session: SessionAccount) -> Json<AccountInfo> {
    Json(marquee_api::whoami(&session.account))
}

// ========================================================================
// Event catalog
// ========================================================================

async fn handle_list_events(
    AxumState(app_state): AxumState<AppState>,
) -> HttpResult<Json<ListEventsResponse>> {
    let events = with_store(&app_state, |p, _| marquee_api::list_upcoming_events(p)).await?;
    Ok(Json(events))
}

async fn handle_list_featured_events(
    AxumState(app_state): AxumState<AppState>,
) -> HttpResult<Json<ListEventsResponse>> {
    let events = with_store(&app_state, |p, _| marquee_api::list_featured_events(p)).await?;
    Ok(Json(events))
}

async fn handle_get_event(
    AxumState(app_state): AxumState<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> HttpResult<Json<EventInfo>> {
    let Path(event_id) = path?;
    let event = with_store(&app_state, |p, _| marquee_api::get_event(p, event_id)).await?;
    Ok(Json(event))
}

async fn handle_create_event(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    body: Result<Json<CreateEventRequest>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<EventInfo>)> {
    let Json(req) = body?;
    let event = with_store(&app_state, |p, now| {
        marquee_api::create_event(p, req, &session.actor, now)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn handle_update_event_status(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateEventStatusRequest>, JsonRejection>,
) -> HttpResult<Json<EventInfo>> {
    let Path(event_id) = path?;
    let Json(req) = body?;
    let event = with_store(&app_state, |p, now| {
        marquee_api::update_event_status(p, event_id, &req, &session.actor, now)
    })
    .await?;
    Ok(Json(event))
}

async fn handle_cancel_event(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
) -> HttpResult<Json<EventInfo>> {
    let Path(event_id) = path?;
    let event = with_store(&app_state, |p, now| {
        marquee_api::cancel_event(p, event_id, &session.actor, now)
    })
    .await?;
    Ok(Json(event))
}

async fn handle_adjust_tier(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<AdjustTierRequest>, JsonRejection>,
) -> HttpResult<Json<TierLevelsResponse>> {
    let Path(event_id) = path?;
    let Json(req) = body?;
    let levels = with_store(&app_state, |p, _| {
        marquee_api::adjust_tier(p, event_id, &req, &session.actor)
    })
    .await?;
    Ok(Json(levels))
}

async fn handle_set_tier_price(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SetTierPriceRequest>, JsonRejection>,
) -> HttpResult<Json<TierLevelsResponse>> {
    let Path(event_id) = path?;
    let Json(req) = body?;
    let levels = with_store(&app_state, |p, now| {
        marquee_api::set_tier_price(p, event_id, &req, &session.actor, now)
    })
    .await?;
    Ok(Json(levels))
}

// ========================================================================
// Bookings
// ========================================================================

async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> HttpResult<(StatusCode, Json<BookingInfo>)> {
    let Json(req) = body?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::create_booking(p, req, &session.actor, now)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn handle_list_bookings(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    query: Result<Query<ListBookingsQuery>, QueryRejection>,
) -> HttpResult<Json<ListBookingsResponse>> {
    let Query(query) = query?;
    let page = with_store(&app_state, |p, now| {
        marquee_api::list_bookings(p, &query, &session.actor, now)
    })
    .await?;
    Ok(Json(page))
}

async fn handle_my_bookings(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> HttpResult<Json<MyBookingsResponse>> {
    let bookings = with_store(&app_state, |p, now| {
        marquee_api::list_my_bookings(p, &session.actor, now)
    })
    .await?;
    Ok(Json(bookings))
}

async fn handle_booking_stats(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> HttpResult<Json<BookingStatsResponse>> {
    let stats = with_store(&app_state, |p, _| {
        marquee_api::booking_stats(p, &session.actor)
    })
    .await?;
    Ok(Json(stats))
}

async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
) -> HttpResult<Json<BookingInfo>> {
    let Path(booking_id) = path?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::get_booking(p, &booking_id, &session.actor, now)
    })
    .await?;
    Ok(Json(booking))
}

async fn handle_booking_history(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
) -> HttpResult<Json<BookingHistoryResponse>> {
    let Path(booking_id) = path?;
    let history = with_store(&app_state, |p, _| {
        marquee_api::get_booking_history(p, &booking_id, &session.actor)
    })
    .await?;
    Ok(Json(history))
}

async fn handle_cancel_booking(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
) -> HttpResult<Json<BookingInfo>> {
    let Path(booking_id) = path?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::cancel_booking(p, &booking_id, &session.actor, now)
    })
    .await?;
    Ok(Json(booking))
}

async fn handle_complete_payment(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<CompletePaymentRequest>, JsonRejection>,
) -> HttpResult<Json<BookingInfo>> {
    let Path(booking_id) = path?;
    let Json(req) = body?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::complete_payment(p, &booking_id, req, &session.actor, now)
    })
    .await?;
    Ok(Json(booking))
}

async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
) -> HttpResult<Json<BookingInfo>> {
    let Path(booking_id) = path?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::check_in(p, &booking_id, &session.actor, now)
    })
    .await?;
    Ok(Json(booking))
}

async fn handle_update_booking_status(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateBookingStatusRequest>, JsonRejection>,
) -> HttpResult<Json<BookingInfo>> {
    let Path(booking_id) = path?;
    let Json(req) = body?;
    let booking = with_store(&app_state, |p, now| {
        marquee_api::update_booking_status(p, &booking_id, &req, &session.actor, now)
    })
    .await?;
    Ok(Json(booking))
}

async fn handle_verify_proof(
    AxumState(app_state): AxumState<AppState>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<VerifyProofRequest>, JsonRejection>,
) -> HttpResult<Json<VerifyProofResponse>> {
    let Path(booking_id) = path?;
    let Json(req) = body?;
    let response = with_store(&app_state, |p, _| {
        marquee_api::verify_proof(p, &booking_id, &req)
    })
    .await?;
    Ok(Json(response))
}

// ========================================================================
// Accounts
// ========================================================================

async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> HttpResult<Json<DashboardResponse>> {
    let dashboard = with_store(&app_state, |p, now| {
        marquee_api::account_dashboard(p, &session.actor, now)
    })
    .await?;
    Ok(Json(dashboard))
}

async fn handle_list_accounts(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    query: Result<Query<ListAccountsQuery>, QueryRejection>,
) -> HttpResult<Json<ListAccountsResponse>> {
    let Query(query) = query?;
    let page = with_store(&app_state, |p, _| {
        marquee_api::list_accounts(p, &query, &session.actor)
    })
    .await?;
    Ok(Json(page))
}

async fn handle_account_stats(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
) -> HttpResult<Json<AccountStatsResponse>> {
    let stats = with_store(&app_state, |p, now| {
        marquee_api::account_stats(p, &session.actor, now)
    })
    .await?;
    Ok(Json(stats))
}

async fn handle_get_account(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
) -> HttpResult<Json<AccountDetailsResponse>> {
    let Path(account_id) = path?;
    let details = with_store(&app_state, |p, now| {
        marquee_api::get_account(p, account_id, &session.actor, now)
    })
    .await?;
    Ok(Json(details))
}

async fn handle_change_role(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> HttpResult<Json<AccountInfo>> {
    let Path(account_id) = path?;
    let Json(req) = body?;
    let account = with_store(&app_state, |p, _| {
        marquee_api::change_account_role(p, account_id, &req, &session.actor)
    })
    .await?;
    Ok(Json(account))
}

async fn handle_delete_account(
    AxumState(app_state): AxumState<AppState>,
    session: SessionAccount,
    path: Result<Path<i64>, PathRejection>,
) -> HttpResult<Json<DeleteAccountResponse>> {
    let Path(account_id) = path?;
    let response = with_store(&app_state, |p, _| {
        marquee_api::delete_account(p, account_id, &session.actor)
    })
    .await?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_whoami))
        .route("/users", get(handle_list_accounts))
        .route("/users/dashboard", get(handle_dashboard))
        .route("/users/stats/overview", get(handle_account_stats))
        .route(
            "/users/{account_id}",
            get(handle_get_account).delete(handle_delete_account),
        )
        .route("/users/{account_id}/role", patch(handle_change_role))
        .route("/events", get(handle_list_events).post(handle_create_event))
        .route("/events/featured", get(handle_list_featured_events))
        .route("/events/{event_id}", get(handle_get_event))
        .route(
            "/events/{event_id}/status",
            patch(handle_update_event_status),
        )
        .route("/events/{event_id}/cancel", patch(handle_cancel_event))
        .route("/events/{event_id}/tickets", patch(handle_adjust_tier))
        .route(
            "/events/{event_id}/tickets/price",
            patch(handle_set_tier_price),
        )
        .route(
            "/bookings",
            get(handle_list_bookings).post(handle_create_booking),
        )
        .route("/bookings/mine", get(handle_my_bookings))
        .route("/bookings/stats", get(handle_booking_stats))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route(
            "/bookings/{booking_id}/history",
            get(handle_booking_history),
        )
        .route(
            "/bookings/{booking_id}/cancel",
            patch(handle_cancel_booking),
        )
        .route(
            "/bookings/{booking_id}/status",
            patch(handle_update_booking_status),
        )
        .route(
            "/bookings/{booking_id}/payment",
            post(handle_complete_payment),
        )
        .route("/bookings/{booking_id}/check-in", post(handle_check_in))
        .route("/bookings/{booking_id}/verify", post(handle_verify_proof))
        .with_state(app_state)
}
