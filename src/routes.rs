use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    auth::authenticate,
    claims::attempt_claim,
    error::AppError,
    model::{CreateClaim, CreateListing, Listing, ListingStatus},
    state::AppState,
};

pub async fn list_donations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let listings = state.store.available_listings(Utc::now()).await?;

    Ok(Json(json!({
        "success": true,
        "count": listings.len(),
        "data": listings,
    })))
}

pub async fn create_donation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<CreateListing>,
) -> Result<impl IntoResponse, AppError> {
    let donor = authenticate(state.store.as_ref(), &headers).await?;

    let title = payload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::Validation("title is required"))?;
    let expiry_time = payload
        .expiry_time
        .ok_or(AppError::Validation("expiry_time is required"))?;
    let quantity = payload.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::Validation("quantity must be at least 1"));
    }

    let listing = Listing {
        id: Uuid::new_v4(),
        donor_id: donor.id,
        title,
        description: payload.description,
        category: payload.category,
        quantity,
        unit: payload.unit,
        pickup_location: payload.pickup_location,
        expiry_time,
        status: ListingStatus::Available,
        created_at: Utc::now(),
    };

    let listing = state.store.insert_listing(listing).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": listing,
            "message": "Donation created successfully",
        })),
    ))
}

pub async fn claim_donation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<CreateClaim>,
) -> Result<impl IntoResponse, AppError> {
    authenticate(state.store.as_ref(), &headers).await?;

    let listing_id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("Donation"))?;
    let claimer_id = payload
        .claimer_id
        .ok_or(AppError::Validation("claimer_id is required"))?;

    let claim = attempt_claim(
        state.store.as_ref(),
        listing_id,
        claimer_id,
        payload.requested_quantity,
        payload.message,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": claim,
            "message": "Claim created successfully",
        })),
    ))
}

pub async fn donation_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let stats = state.store.stats().await?;

    Ok(Json(json!({ "success": true, "data": stats })))
}

pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Food Donation API is running",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Route not found" })),
    )
}
