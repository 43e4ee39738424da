//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use transactions_core::domain::{TransactionRecord, TranslationResult};
use transactions_core::error::TranslateError;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_inquiry_handler,
        list_transactions_handler,
    ),
    components(
        schemas(InquiryRequest, InquiryResponse, TranslateFailure, TransactionDto)
    ),
    tags(
        (name = "Transactions Dashboard API", description = "API endpoints for the natural-language ledger dashboard.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The request payload carrying one free-text inquiry.
#[derive(Deserialize, ToSchema)]
pub struct InquiryRequest {
    pub inquiry: String,
}

/// The three-section answer for one inquiry. Sections use `<br>` markup for
/// line breaks.
#[derive(Serialize, ToSchema)]
pub struct InquiryResponse {
    pub response: String,
    pub explanation: String,
    pub advice: String,
}

impl From<TranslationResult> for InquiryResponse {
    fn from(result: TranslationResult) -> Self {
        Self {
            response: result.response,
            explanation: result.explanation,
            advice: result.advice,
        }
    }
}

/// An explicit failure indication; the dashboard never renders a blank or
/// partial answer.
#[derive(Serialize, ToSchema)]
pub struct TranslateFailure {
    pub kind: String,
    pub message: String,
}

/// One ledger row as the dashboard's transaction table displays it.
#[derive(Serialize, ToSchema)]
pub struct TransactionDto {
    pub id: i64,
    pub category: String,
    pub customer_name: String,
    pub customer_number: String,
    pub invoice_number: String,
    pub invoice_amount: f64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub forecast_code: String,
    pub forecast_date: NaiveDate,
    pub collector: String,
}

impl From<TransactionRecord> for TransactionDto {
    fn from(record: TransactionRecord) -> Self {
        Self {
            id: record.id,
            category: record.category,
            customer_name: record.customer_name,
            customer_number: record.customer_number,
            invoice_number: record.invoice_number,
            invoice_amount: record.invoice_amount,
            invoice_date: record.invoice_date,
            due_date: record.due_date,
            forecast_code: record.forecast_code,
            forecast_date: record.forecast_date,
            collector: record.collector,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Submit one natural-language inquiry about the ledger.
///
/// The current time is stamped here, zone-qualified (UTC), and passed down
/// so the whole translation shares a single time context.
#[utoipa::path(
    post,
    path = "/inquiries",
    request_body = InquiryRequest,
    responses(
        (status = 200, description = "Inquiry answered", body = InquiryResponse),
        (status = 400, description = "Empty inquiry"),
        (status = 422, description = "The derived query was rejected or failed", body = TranslateFailure),
        (status = 502, description = "The generation backend produced no usable answer", body = TranslateFailure),
        (status = 503, description = "The generation backend could not be reached", body = TranslateFailure)
    )
)]
pub async fn submit_inquiry_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<InquiryRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<TranslateFailure>)> {
    if payload.inquiry.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(TranslateFailure {
                kind: "invalid_inquiry".to_string(),
                message: "Inquiry must not be empty".to_string(),
            }),
        ));
    }

    let now = Utc::now().fixed_offset();
    match app_state.translator.translate(&payload.inquiry, now).await {
        Ok(result) => Ok(Json(InquiryResponse::from(result))),
        Err(e) => {
            error!("Failed to translate inquiry: {:?}", e);
            Err((
                status_for(&e),
                Json(TranslateFailure {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                }),
            ))
        }
    }
}

/// List all ledger transactions, most recent invoice date first.
#[utoipa::path(
    get,
    path = "/transactions",
    responses(
        (status = 200, description = "The full transaction table", body = [TransactionDto]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_transactions_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    match app_state.store.list_transactions().await {
        Ok(records) => {
            let payload: Vec<TransactionDto> =
                records.into_iter().map(TransactionDto::from).collect();
            Ok(Json(payload))
        }
        Err(e) => {
            error!("Failed to list transactions: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to list transactions".to_string(),
            ))
        }
    }
}

fn status_for(e: &TranslateError) -> StatusCode {
    match e {
        TranslateError::QueryExecution(_) => StatusCode::UNPROCESSABLE_ENTITY,
        TranslateError::BackendUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        TranslateError::QueryGeneration(_) | TranslateError::Format(_) => StatusCode::BAD_GATEWAY,
    }
}
