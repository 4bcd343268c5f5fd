// HTTP handlers for the checkout and order-event endpoints

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use validator::Validate;

use crate::checkout::discount::RULE_TTL_MINUTES;
use crate::checkout::error::CheckoutError;
use crate::checkout::models::{
    CheckoutOutcome, CheckoutRequest, DiscountCheckoutResponse, OrderCompletedEvent,
    SkuCheckoutResponse,
};

/// Handler for POST /api/checkout
/// Prices the buyer's selection and makes it purchasable in the requested
/// mode, answering with the matching cart-facing shape
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout materialized; SKU-mode body shown, discount mode answers with DiscountCheckoutResponse", body = SkuCheckoutResponse),
        (status = 400, description = "Invalid selection or pricing configuration"),
        (status = 404, description = "Bundle not found"),
        (status = 502, description = "Could not prepare this bundle for checkout")
    ),
    tag = "checkout"
)]
pub async fn checkout_handler(
    State(state): State<crate::AppState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Response, CheckoutError> {
    payload.validate()?;

    let plan = state.service.plan_tier(&payload.shop).await;
    tracing::debug!(
        "checkout request for bundle {} on {} (plan {:?}, mode {:?})",
        payload.bundle_id,
        payload.shop,
        plan,
        payload.mode
    );

    let outcome = state.service.checkout(&payload).await?;
    Ok(match outcome {
        CheckoutOutcome::Sku {
            sku_id,
            total_cents,
            ..
        } => Json(SkuCheckoutResponse { sku_id, total_cents }).into_response(),
        CheckoutOutcome::Discount {
            discount_cents,
            code,
            rule_id,
        } => Json(DiscountCheckoutResponse {
            mode: "discount_code".to_string(),
            discount_cents,
            discount_code: code,
            rule_id,
        })
        .into_response(),
    })
}

/// Handler for POST /api/webhooks/orders/completed
/// Runs the event-triggered discount cleanup for the order's consumed
/// codes; cleanup is best-effort, so the receiver always gets a 200
#[utoipa::path(
    post,
    path = "/api/webhooks/orders/completed",
    request_body = OrderCompletedEvent,
    responses(
        (status = 200, description = "Event accepted")
    ),
    tag = "webhooks"
)]
pub async fn order_completed_handler(
    State(state): State<crate::AppState>,
    Json(event): Json<OrderCompletedEvent>,
) -> Json<serde_json::Value> {
    tracing::info!(
        "order completed on {} with {} applied discount code(s)",
        event.shop,
        event.discount_codes_applied.len()
    );

    state
        .janitor
        .on_order_completed(&event.shop, &event.discount_codes_applied)
        .await;
    // Opportunistic sweep while we are here, to keep stale rules bounded
    state.janitor.sweep(&event.shop, RULE_TTL_MINUTES).await;

    Json(json!({ "status": "ok" }))
}
