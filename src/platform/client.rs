// Catalog Resource Client
// Thin wrapper over the platform's admin and storefront APIs. Each method
// is a single network round trip; retry/backoff policy belongs to callers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::platform::error::PlatformError;
use crate::platform::types::{
    CatalogItem, Channel, DiscountRuleSpec, DiscountRuleSummary, InventoryPolicy, ItemSpec, Sku,
};
use crate::session::SessionProvider;

/// Admin API version the client is pinned to
const API_VERSION: &str = "2024-01";

/// Handle of the online storefront sales channel
const ONLINE_CHANNEL_HANDLE: &str = "online-store";

/// Operations the engine needs against the remote platform
///
/// All state lives remotely; implementations are stateless apart from the
/// process-lifetime cache of the online channel id.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn find_item_by_tag(
        &self,
        shop: &str,
        tag: &str,
    ) -> Result<Option<CatalogItem>, PlatformError>;

    async fn create_item(&self, shop: &str, spec: &ItemSpec) -> Result<CatalogItem, PlatformError>;

    async fn create_sku(
        &self,
        shop: &str,
        item_id: &str,
        price_cents: i64,
        inventory_policy: InventoryPolicy,
    ) -> Result<Sku, PlatformError>;

    async fn update_sku_price(
        &self,
        shop: &str,
        sku_id: &str,
        price_cents: i64,
    ) -> Result<(), PlatformError>;

    async fn list_skus(&self, shop: &str, item_id: &str) -> Result<Vec<Sku>, PlatformError>;

    async fn publish_item(
        &self,
        shop: &str,
        item_id: &str,
        channel_id: &str,
    ) -> Result<(), PlatformError>;

    async fn set_inventory(
        &self,
        shop: &str,
        sku_id: &str,
        quantity: i64,
    ) -> Result<(), PlatformError>;

    /// Online sales channel id, cached per shop for the process lifetime
    async fn online_channel_id(&self, shop: &str) -> Result<String, PlatformError>;

    /// Storefront-facing read of a SKU; `Ok(false)` means not yet readable
    async fn read_sku(&self, shop: &str, sku_id: &str) -> Result<bool, PlatformError>;

    async fn create_discount_rule(
        &self,
        shop: &str,
        spec: &DiscountRuleSpec,
    ) -> Result<String, PlatformError>;

    async fn create_discount_code(
        &self,
        shop: &str,
        rule_id: &str,
        code: &str,
    ) -> Result<(), PlatformError>;

    async fn delete_discount_rule(&self, shop: &str, rule_id: &str) -> Result<(), PlatformError>;

    /// Resolve the rule id a discount code belongs to
    async fn lookup_discount_code_rule(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<String, PlatformError>;

    async fn list_discount_rules(
        &self,
        shop: &str,
    ) -> Result<Vec<DiscountRuleSummary>, PlatformError>;
}

/// Production client against the platform's REST APIs
///
/// Admin calls go to `https://<shop>/admin/api/<version>/...` with a bearer
/// token resolved per call from the session provider; the readiness check
/// uses the unauthenticated storefront path instead, because that is the
/// surface the buyer's cart will read.
pub struct PlatformClient {
    http: reqwest::Client,
    sessions: Arc<dyn SessionProvider>,
    channel_cache: Mutex<HashMap<String, String>>,
}

// Wire envelopes for the platform's REST payloads

#[derive(Deserialize)]
struct ItemsEnvelope {
    items: Vec<CatalogItem>,
}

#[derive(Deserialize)]
struct ItemEnvelope {
    item: CatalogItem,
}

#[derive(Serialize)]
struct CreateItemBody<'a> {
    item: &'a ItemSpec,
}

#[derive(Deserialize)]
struct SkuEnvelope {
    sku: Sku,
}

#[derive(Deserialize)]
struct SkusEnvelope {
    skus: Vec<Sku>,
}

#[derive(Serialize)]
struct CreateSkuBody {
    sku: NewSku,
}

#[derive(Serialize)]
struct NewSku {
    price_cents: i64,
    inventory_policy: InventoryPolicy,
}

#[derive(Serialize)]
struct UpdateSkuPriceBody {
    sku: SkuPrice,
}

#[derive(Serialize)]
struct SkuPrice {
    price_cents: i64,
    // Price updates re-assert continue-selling so a reused charge SKU can
    // never read as sold out
    inventory_policy: InventoryPolicy,
}

#[derive(Serialize)]
struct PublicationBody<'a> {
    item_id: &'a str,
    channel_id: &'a str,
}

#[derive(Serialize)]
struct InventoryBody {
    available: i64,
}

#[derive(Deserialize)]
struct ChannelsEnvelope {
    channels: Vec<Channel>,
}

#[derive(Serialize)]
struct CreateRuleBody<'a> {
    price_rule: &'a DiscountRuleSpec,
}

#[derive(Deserialize)]
struct RuleIdEnvelope {
    price_rule: RuleId,
}

#[derive(Deserialize)]
struct RuleId {
    id: String,
}

#[derive(Serialize)]
struct CreateCodeBody<'a> {
    discount_code: CodeValue<'a>,
}

#[derive(Serialize)]
struct CodeValue<'a> {
    code: &'a str,
}

#[derive(Deserialize)]
struct CodeLookupEnvelope {
    discount_code: CodeLookup,
}

#[derive(Deserialize)]
struct CodeLookup {
    price_rule_id: String,
}

#[derive(Deserialize)]
struct RulesEnvelope {
    price_rules: Vec<DiscountRuleSummary>,
}

/// Map a non-success status onto the platform error taxonomy
fn classify_status(status: u16, body: String) -> PlatformError {
    match status {
        401 | 403 => PlatformError::Unauthorized,
        404 => PlatformError::NotFound,
        429 => PlatformError::RateLimited,
        _ => PlatformError::Remote { status, body },
    }
}

impl PlatformClient {
    pub fn new(http: reqwest::Client, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            http,
            sessions,
            channel_cache: Mutex::new(HashMap::new()),
        }
    }

    fn admin_url(shop: &str, path: &str) -> String {
        format!("https://{shop}/admin/api/{API_VERSION}{path}")
    }

    fn storefront_url(shop: &str, path: &str) -> String {
        format!("https://{shop}/storefront/api{path}")
    }

    async fn authed(
        &self,
        shop: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, PlatformError> {
        let token = self.sessions.access_token(shop).await?;
        let response = request.bearer_auth(token).send().await?;
        Self::check(response).await
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, PlatformError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_status(status.as_u16(), body))
    }
}

#[async_trait]
impl CatalogApi for PlatformClient {
    async fn find_item_by_tag(
        &self,
        shop: &str,
        tag: &str,
    ) -> Result<Option<CatalogItem>, PlatformError> {
        let url = Self::admin_url(shop, "/items");
        let response = self
            .authed(shop, self.http.get(&url).query(&[("tag", tag), ("limit", "1")]))
            .await?;
        let envelope = response.json::<ItemsEnvelope>().await?;
        Ok(envelope.items.into_iter().next())
    }

    async fn create_item(&self, shop: &str, spec: &ItemSpec) -> Result<CatalogItem, PlatformError> {
        tracing::debug!("creating catalog item '{}' on {}", spec.title, shop);
        let url = Self::admin_url(shop, "/items");
        let response = self
            .authed(shop, self.http.post(&url).json(&CreateItemBody { item: spec }))
            .await?;
        Ok(response.json::<ItemEnvelope>().await?.item)
    }

    async fn create_sku(
        &self,
        shop: &str,
        item_id: &str,
        price_cents: i64,
        inventory_policy: InventoryPolicy,
    ) -> Result<Sku, PlatformError> {
        let url = Self::admin_url(shop, &format!("/items/{item_id}/skus"));
        let body = CreateSkuBody {
            sku: NewSku {
                price_cents,
                inventory_policy,
            },
        };
        let response = self.authed(shop, self.http.post(&url).json(&body)).await?;
        Ok(response.json::<SkuEnvelope>().await?.sku)
    }

    async fn update_sku_price(
        &self,
        shop: &str,
        sku_id: &str,
        price_cents: i64,
    ) -> Result<(), PlatformError> {
        let url = Self::admin_url(shop, &format!("/skus/{sku_id}"));
        let body = UpdateSkuPriceBody {
            sku: SkuPrice {
                price_cents,
                inventory_policy: InventoryPolicy::Continue,
            },
        };
        self.authed(shop, self.http.put(&url).json(&body)).await?;
        Ok(())
    }

    async fn list_skus(&self, shop: &str, item_id: &str) -> Result<Vec<Sku>, PlatformError> {
        let url = Self::admin_url(shop, &format!("/items/{item_id}/skus"));
        let response = self.authed(shop, self.http.get(&url)).await?;
        Ok(response.json::<SkusEnvelope>().await?.skus)
    }

    async fn publish_item(
        &self,
        shop: &str,
        item_id: &str,
        channel_id: &str,
    ) -> Result<(), PlatformError> {
        let url = Self::admin_url(shop, "/publications");
        let body = PublicationBody { item_id, channel_id };
        self.authed(shop, self.http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn set_inventory(
        &self,
        shop: &str,
        sku_id: &str,
        quantity: i64,
    ) -> Result<(), PlatformError> {
        let url = Self::admin_url(shop, &format!("/skus/{sku_id}/inventory"));
        let body = InventoryBody { available: quantity };
        self.authed(shop, self.http.put(&url).json(&body)).await?;
        Ok(())
    }

    async fn online_channel_id(&self, shop: &str) -> Result<String, PlatformError> {
        if let Some(cached) = self.channel_cache.lock().unwrap().get(shop) {
            return Ok(cached.clone());
        }

        let url = Self::admin_url(shop, "/channels");
        let response = self.authed(shop, self.http.get(&url)).await?;
        let envelope = response.json::<ChannelsEnvelope>().await?;
        let channel = envelope
            .channels
            .into_iter()
            .find(|channel| channel.handle == ONLINE_CHANNEL_HANDLE)
            .ok_or(PlatformError::NotFound)?;

        self.channel_cache
            .lock()
            .unwrap()
            .insert(shop.to_string(), channel.id.clone());
        Ok(channel.id)
    }

    async fn read_sku(&self, shop: &str, sku_id: &str) -> Result<bool, PlatformError> {
        let url = Self::storefront_url(shop, &format!("/skus/{sku_id}"));
        let response = self.http.get(&url).send().await?;
        match response.status().as_u16() {
            404 => Ok(false),
            status if !response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                Err(classify_status(status, body))
            }
            _ => Ok(true),
        }
    }

    async fn create_discount_rule(
        &self,
        shop: &str,
        spec: &DiscountRuleSpec,
    ) -> Result<String, PlatformError> {
        tracing::debug!("creating discount rule '{}' on {}", spec.title, shop);
        let url = Self::admin_url(shop, "/price_rules");
        let response = self
            .authed(shop, self.http.post(&url).json(&CreateRuleBody { price_rule: spec }))
            .await?;
        Ok(response.json::<RuleIdEnvelope>().await?.price_rule.id)
    }

    async fn create_discount_code(
        &self,
        shop: &str,
        rule_id: &str,
        code: &str,
    ) -> Result<(), PlatformError> {
        let url = Self::admin_url(shop, &format!("/price_rules/{rule_id}/discount_codes"));
        let body = CreateCodeBody {
            discount_code: CodeValue { code },
        };
        self.authed(shop, self.http.post(&url).json(&body)).await?;
        Ok(())
    }

    async fn delete_discount_rule(&self, shop: &str, rule_id: &str) -> Result<(), PlatformError> {
        let url = Self::admin_url(shop, &format!("/price_rules/{rule_id}"));
        self.authed(shop, self.http.delete(&url)).await?;
        Ok(())
    }

    async fn lookup_discount_code_rule(
        &self,
        shop: &str,
        code: &str,
    ) -> Result<String, PlatformError> {
        let url = Self::admin_url(shop, "/discount_codes/lookup");
        let response = self
            .authed(shop, self.http.get(&url).query(&[("code", code)]))
            .await?;
        Ok(response
            .json::<CodeLookupEnvelope>()
            .await?
            .discount_code
            .price_rule_id)
    }

    async fn list_discount_rules(
        &self,
        shop: &str,
    ) -> Result<Vec<DiscountRuleSummary>, PlatformError> {
        let url = Self::admin_url(shop, "/price_rules");
        let response = self.authed(shop, self.http.get(&url)).await?;
        Ok(response.json::<RulesEnvelope>().await?.price_rules)
    }
}
