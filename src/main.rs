mod bundles;
mod checkout;
mod error;
mod platform;
mod session;
mod validation;

use std::sync::Arc;

use axum::{routing::post, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use bundles::store::{BundleStore, HttpBundleStore};
use checkout::handlers::{checkout_handler, order_completed_handler};
use checkout::janitor::DiscountJanitor;
use checkout::service::CheckoutService;
use platform::client::{CatalogApi, PlatformClient};
use session::{HttpSessionStore, SessionProvider};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        checkout::handlers::checkout_handler,
        checkout::handlers::order_completed_handler,
    ),
    components(
        schemas(
            checkout::models::CheckoutRequest,
            checkout::models::CheckoutMode,
            checkout::models::Selection,
            checkout::models::SelectedItem,
            checkout::models::SkuCheckoutResponse,
            checkout::models::DiscountCheckoutResponse,
            checkout::models::OrderCompletedEvent,
        )
    ),
    tags(
        (name = "checkout", description = "Bundle pricing and checkout materialization"),
        (name = "webhooks", description = "Order event entry points")
    ),
    info(
        title = "Bundle Checkout API",
        version = "1.0.0",
        description = "Prices merchant bundles and materializes the result as a purchasable SKU or a single-use discount code",
        contact(
            name = "API Support",
            email = "support@bundlecheckout.dev"
        )
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: CheckoutService,
    pub janitor: DiscountJanitor,
}

/// Creates and configures the application router
/// Maps the checkout and webhook endpoints and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // The checkout endpoint is called from storefront-origin carts
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // API routes
        .route("/api/checkout", post(checkout_handler))
        .route("/api/webhooks/orders/completed", post(order_completed_handler))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Bundle Checkout API - Starting...");

    // Get configuration from environment variables
    let bundle_store_url =
        std::env::var("BUNDLE_STORE_URL").expect("BUNDLE_STORE_URL must be set in environment");
    let session_store_url =
        std::env::var("SESSION_STORE_URL").unwrap_or_else(|_| bundle_store_url.clone());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // One pooled HTTP client shared by every collaborator
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .connect_timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let sessions: Arc<dyn SessionProvider> =
        Arc::new(HttpSessionStore::new(http.clone(), session_store_url));
    let catalog: Arc<dyn CatalogApi> = Arc::new(PlatformClient::new(http.clone(), sessions));
    let bundle_store: Arc<dyn BundleStore> = Arc::new(HttpBundleStore::new(http, bundle_store_url));

    let state = AppState {
        service: CheckoutService::new(bundle_store, catalog.clone()),
        janitor: DiscountJanitor::new(catalog),
    };

    // Create the application router
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Bundle Checkout API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
