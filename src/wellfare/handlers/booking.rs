//! Booking page and booking submission.

use super::canonical_url;
use crate::{
    clinic::{BookingOutcome, BookingRequest},
    wellfare::{pages, AppState},
};
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, instrument};

// axum handler for the booking page
pub async fn page(state: Extension<Arc<AppState>>) -> Html<String> {
    // The wizard mounts on #booking-wizard and posts JSON back to this path.
    let body = r#"    <main>
      <h1>Book Your Appointment</h1>
      <section id="booking-wizard" data-endpoint="/book">
        <noscript>Online booking needs JavaScript. Please call the clinic to book.</noscript>
      </section>
    </main>"#;

    pages::render(&pages::BOOKING, &canonical_url(&state, "/book"), body)
}

// axum handler for booking submission
#[instrument(skip_all)]
pub async fn submit(
    state: Extension<Arc<AppState>>,
    Json(request): Json<BookingRequest>,
) -> Response {
    if let Err(message) = request.validate() {
        debug!("Booking request failed validation: {}", message);

        return failure(StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR", &message);
    }

    match state.bookings.submit(&request).await {
        Ok(BookingOutcome::Confirmed(confirmation)) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "reference_id": confirmation.reference_id,
                "message": confirmation.message,
            })),
        )
            .into_response(),

        Ok(BookingOutcome::Rejected {
            status,
            code,
            message,
        }) => {
            // Pass client errors through; anything else is the backend misbehaving.
            let status = StatusCode::from_u16(status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY);

            failure(status, &code, &message)
        }

        Err(err) => {
            error!("Booking request failed: {:#}", err);

            failure(
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
                "Booking is temporarily unavailable. Please try again later.",
            )
        }
    }
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": {"code": code, "message": message},
        })),
    )
        .into_response()
}
