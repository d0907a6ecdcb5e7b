use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::Caller;
use crate::server::AppState;
use crate::server::dto::{
    CreateAreaRequest, CreatePersonalResponsibleRequest, CreatePositionRequest, OutletListQuery,
};
use crate::server::response::{ApiError, ApiResponse, ServiceResultExt};
use crate::service::{CreateMaintenancePeriod, CreateOutlet};
use crate::types::NewClassification;

pub async fn list_areas(State(state): State<Arc<AppState>>, _caller: Caller) -> impl IntoResponse {
    let areas = state.reference.list_areas().api_err("Failed to list areas")?;
    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully retrieved areas", areas)))
}

pub async fn create_area(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreateAreaRequest>,
) -> impl IntoResponse {
    let area = state
        .reference
        .create_area(&req.area_name)
        .api_err("Failed to create area")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created("Successfully created area", area)),
    ))
}

pub async fn list_outlets(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Query(query): Query<OutletListQuery>,
) -> impl IntoResponse {
    let outlets = state
        .reference
        .list_outlets(query.area_id)
        .api_err("Failed to list outlets")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved outlets",
        outlets,
    )))
}

pub async fn create_outlet(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreateOutlet>,
) -> impl IntoResponse {
    let outlet = state
        .reference
        .create_outlet(&req)
        .api_err("Failed to create outlet")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created("Successfully created outlet", outlet)),
    ))
}

pub async fn list_roles(State(state): State<Arc<AppState>>, _caller: Caller) -> impl IntoResponse {
    let roles = state.reference.list_roles().api_err("Failed to list roles")?;
    Ok::<_, ApiError>(Json(ApiResponse::success("Successfully retrieved roles", roles)))
}

pub async fn list_positions(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> impl IntoResponse {
    let positions = state
        .reference
        .list_positions()
        .api_err("Failed to list positions")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved positions",
        positions,
    )))
}

pub async fn create_position(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreatePositionRequest>,
) -> impl IntoResponse {
    let position = state
        .reference
        .create_position(&req.position_name)
        .api_err("Failed to create position")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created("Successfully created position", position)),
    ))
}

pub async fn list_personal_responsibles(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> impl IntoResponse {
    let people = state
        .reference
        .list_personal_responsibles()
        .api_err("Failed to list personal responsibles")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved personal responsibles",
        people,
    )))
}

pub async fn create_personal_responsible(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreatePersonalResponsibleRequest>,
) -> impl IntoResponse {
    let person = state
        .reference
        .create_personal_responsible(&req.personal_name)
        .api_err("Failed to create personal responsible")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Successfully created personal responsible",
            person,
        )),
    ))
}

pub async fn list_maintenance_periods(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> impl IntoResponse {
    let periods = state
        .reference
        .list_maintenance_periods()
        .api_err("Failed to list maintenance periods")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved maintenance periods",
        periods,
    )))
}

pub async fn create_maintenance_period(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<CreateMaintenancePeriod>,
) -> impl IntoResponse {
    let period = state
        .reference
        .create_maintenance_period(&req)
        .api_err("Failed to create maintenance period")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Successfully created maintenance period",
            period,
        )),
    ))
}

pub async fn list_classifications(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
) -> impl IntoResponse {
    let classifications = state
        .reference
        .list_classifications()
        .api_err("Failed to list classifications")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved classifications",
        classifications,
    )))
}

pub async fn get_classification(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let classification = state
        .reference
        .get_classification(id)
        .api_err("Failed to get classification")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(
        "Successfully retrieved classification",
        classification,
    )))
}

pub async fn create_classification(
    State(state): State<Arc<AppState>>,
    _caller: Caller,
    Json(req): Json<NewClassification>,
) -> impl IntoResponse {
    let classification = state
        .reference
        .create_classification(&req)
        .api_err("Failed to create classification")?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::created(
            "Successfully created classification",
            classification,
        )),
    ))
}
