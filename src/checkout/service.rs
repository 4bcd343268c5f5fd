use std::sync::Arc;

use uuid::Uuid;

use crate::bundles::models::{BundleDefinition, PlanTier};
use crate::bundles::store::BundleStore;
use crate::checkout::discount::DiscountIssuer;
use crate::checkout::error::CheckoutError;
use crate::checkout::janitor::DiscountJanitor;
use crate::checkout::materializer::SkuMaterializer;
use crate::checkout::models::{CheckoutMode, CheckoutOutcome, CheckoutRequest, PriceBreakdown};
use crate::checkout::pricing::PricingResolver;
use crate::platform::CatalogApi;

/// Orchestrates one checkout request: load the bundle, resolve the price,
/// and make it purchasable in the requested mode
#[derive(Clone)]
pub struct CheckoutService {
    bundles: Arc<dyn BundleStore>,
    materializer: SkuMaterializer,
    issuer: DiscountIssuer,
}

impl CheckoutService {
    pub fn new(bundles: Arc<dyn BundleStore>, catalog: Arc<dyn CatalogApi>) -> Self {
        let janitor = DiscountJanitor::new(catalog.clone());
        Self {
            bundles,
            materializer: SkuMaterializer::new(catalog.clone()),
            issuer: DiscountIssuer::new(catalog, janitor),
        }
    }

    /// Swap in a materializer with a different poll schedule
    pub fn with_materializer(mut self, materializer: SkuMaterializer) -> Self {
        self.materializer = materializer;
        self
    }

    /// Handle a checkout request end to end
    ///
    /// Pricing errors surface verbatim; a failed discount issuance falls
    /// back to SKU materialization rather than failing the checkout.
    pub async fn checkout(&self, request: &CheckoutRequest) -> Result<CheckoutOutcome, CheckoutError> {
        let correlation_id = Uuid::new_v4();
        let bundle = self.bundles.bundle(&request.bundle_id).await?;
        let breakdown = PricingResolver::resolve(&bundle, &request.selection)?;
        tracing::debug!(
            "checkout {} for {} on {}: subtotal {} discounted {} add-ons {} grand {}",
            correlation_id,
            bundle.id,
            request.shop,
            breakdown.product_subtotal,
            breakdown.discounted_product_total,
            breakdown.add_on_total,
            breakdown.grand_total
        );

        match request.mode {
            CheckoutMode::Sku => self.materialize(&request.shop, &bundle, &breakdown).await,
            CheckoutMode::DiscountCode => {
                match self
                    .issuer
                    .issue(&request.shop, &bundle, &request.selection, &breakdown)
                    .await
                {
                    Ok(issued) => Ok(CheckoutOutcome::Discount {
                        discount_cents: issued.discount_cents,
                        code: issued.code,
                        rule_id: issued.rule_id,
                    }),
                    Err(err) => {
                        tracing::warn!(
                            "discount issuance failed for {} on {}: {}; falling back to SKU mode",
                            bundle.id,
                            request.shop,
                            err
                        );
                        self.materialize(&request.shop, &bundle, &breakdown).await
                    }
                }
            }
        }
    }

    /// Plan tier of the shop, for request telemetry only; the engine
    /// trusts the selection it is given
    pub async fn plan_tier(&self, shop: &str) -> Option<PlanTier> {
        match self.bundles.plan_tier(shop).await {
            Ok(tier) => Some(tier),
            Err(err) => {
                tracing::debug!("plan tier lookup failed for {}: {}", shop, err);
                None
            }
        }
    }

    async fn materialize(
        &self,
        shop: &str,
        bundle: &BundleDefinition,
        breakdown: &PriceBreakdown,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let materialized = self
            .materializer
            .materialize(shop, &bundle.id, &bundle.title, breakdown.grand_total)
            .await?;
        if materialized.used_fallback() {
            tracing::warn!("checkout for {} on {} degraded to a one-off SKU", bundle.id, shop);
        }
        Ok(CheckoutOutcome::Sku {
            sku_id: materialized.sku_id().to_string(),
            total_cents: breakdown.grand_total,
            used_fallback: materialized.used_fallback(),
        })
    }
}
