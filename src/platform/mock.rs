// In-memory CatalogApi double for engine tests
// Behaves like a tiny single-shop platform: items, SKUs, publications,
// inventory, and discount rules live behind a mutex, and individual
// operations can be scripted to fail.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::platform::error::PlatformError;
use crate::platform::types::{
    CatalogItem, DiscountRuleSpec, DiscountRuleSummary, InventoryPolicy, ItemSpec, ItemStatus, Sku,
};
use crate::platform::CatalogApi;

#[derive(Debug, Clone)]
pub struct MockRule {
    pub spec: DiscountRuleSpec,
    pub created_at: DateTime<Utc>,
    pub usage_count: u32,
}

#[derive(Default)]
struct MockState {
    items: Vec<CatalogItem>,
    skus: HashMap<String, Vec<Sku>>,
    published: Vec<(String, String)>,
    inventory: HashMap<String, i64>,
    rules: HashMap<String, MockRule>,
    codes: HashMap<String, String>,
    deleted_rules: Vec<String>,
    next_id: u64,
    reads: u32,
    unreadable_reads: u32,
    rate_limited_lookups: u32,
    fail_create_item: bool,
    fail_update_price: bool,
    fail_create_rule: bool,
    fail_create_code: bool,
}

#[derive(Default)]
pub struct MockCatalog {
    state: Mutex<MockState>,
}

fn remote_failure(op: &str) -> PlatformError {
    PlatformError::Remote {
        status: 500,
        body: format!("scripted failure: {op}"),
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(state: &mut MockState, prefix: &str) -> String {
        state.next_id += 1;
        format!("{prefix}-{}", state.next_id)
    }

    // Scripting knobs

    /// First `count` storefront reads report the SKU as not yet visible
    pub fn unreadable_for(&self, count: u32) {
        self.state.lock().unwrap().unreadable_reads = count;
    }

    /// First `count` tag lookups come back rate limited
    pub fn rate_limit_lookups(&self, count: u32) {
        self.state.lock().unwrap().rate_limited_lookups = count;
    }

    pub fn fail_create_item(&self) {
        self.state.lock().unwrap().fail_create_item = true;
    }

    pub fn fail_update_price(&self) {
        self.state.lock().unwrap().fail_update_price = true;
    }

    pub fn fail_create_rule(&self) {
        self.state.lock().unwrap().fail_create_rule = true;
    }

    pub fn fail_create_code(&self) {
        self.state.lock().unwrap().fail_create_code = true;
    }

    // Seeding helpers

    /// Seed a tagged item with one SKU, returning (item_id, sku_id)
    pub fn seed_tagged_item(&self, tag: &str, price_cents: i64) -> (String, String) {
        let mut state = self.state.lock().unwrap();
        let item_id = Self::next_id(&mut state, "item");
        let sku_id = Self::next_id(&mut state, "sku");
        state.items.push(CatalogItem {
            id: item_id.clone(),
            title: format!("seeded {tag}"),
            tags: vec![tag.to_string()],
            status: ItemStatus::Active,
        });
        state.skus.insert(
            item_id.clone(),
            vec![Sku {
                id: sku_id.clone(),
                price_cents,
                inventory_policy: InventoryPolicy::Continue,
            }],
        );
        (item_id, sku_id)
    }

    /// Seed an existing discount rule with an attached code
    pub fn seed_rule(&self, title: &str, code: Option<&str>, age_minutes: i64, usage_count: u32) -> String {
        let mut state = self.state.lock().unwrap();
        let rule_id = Self::next_id(&mut state, "rule");
        let now = Utc::now();
        state.rules.insert(
            rule_id.clone(),
            MockRule {
                spec: DiscountRuleSpec {
                    title: title.to_string(),
                    value_cents: 100,
                    entitled_sku_ids: vec![],
                    usage_limit: 1,
                    once_per_customer: true,
                    starts_at: now - Duration::minutes(age_minutes),
                    ends_at: now - Duration::minutes(age_minutes) + Duration::minutes(10),
                    combines_with_other_discounts: false,
                },
                created_at: now - Duration::minutes(age_minutes),
                usage_count,
            },
        );
        if let Some(code) = code {
            state.codes.insert(code.to_string(), rule_id.clone());
        }
        rule_id
    }

    // Assertions

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().items.len()
    }

    pub fn rule_count(&self) -> usize {
        self.state.lock().unwrap().rules.len()
    }

    pub fn rules(&self) -> Vec<MockRule> {
        self.state.lock().unwrap().rules.values().cloned().collect()
    }

    pub fn deleted_rules(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_rules.clone()
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn sku_price(&self, item_id: &str) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .skus
            .get(item_id)
            .and_then(|skus| skus.first())
            .map(|sku| sku.price_cents)
    }

    pub fn inventory(&self, sku_id: &str) -> Option<i64> {
        self.state.lock().unwrap().inventory.get(sku_id).copied()
    }

    pub fn storefront_reads(&self) -> u32 {
        self.state.lock().unwrap().reads
    }
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn find_item_by_tag(
        &self,
        _shop: &str,
        tag: &str,
    ) -> Result<Option<CatalogItem>, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.rate_limited_lookups > 0 {
            state.rate_limited_lookups -= 1;
            return Err(PlatformError::RateLimited);
        }
        Ok(state
            .items
            .iter()
            .find(|item| item.tags.iter().any(|t| t == tag))
            .cloned())
    }

    async fn create_item(&self, _shop: &str, spec: &ItemSpec) -> Result<CatalogItem, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_item {
            return Err(remote_failure("create_item"));
        }
        let item_id = Self::next_id(&mut state, "item");
        let item = CatalogItem {
            id: item_id.clone(),
            title: spec.title.clone(),
            tags: vec![spec.tag.clone()],
            status: spec.status,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn create_sku(
        &self,
        _shop: &str,
        item_id: &str,
        price_cents: i64,
        inventory_policy: InventoryPolicy,
    ) -> Result<Sku, PlatformError> {
        let mut state = self.state.lock().unwrap();
        let sku_id = Self::next_id(&mut state, "sku");
        let sku = Sku {
            id: sku_id,
            price_cents,
            inventory_policy,
        };
        state
            .skus
            .entry(item_id.to_string())
            .or_default()
            .push(sku.clone());
        Ok(sku)
    }

    async fn update_sku_price(
        &self,
        _shop: &str,
        sku_id: &str,
        price_cents: i64,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_update_price {
            return Err(remote_failure("update_sku_price"));
        }
        for skus in state.skus.values_mut() {
            if let Some(sku) = skus.iter_mut().find(|sku| sku.id == sku_id) {
                sku.price_cents = price_cents;
                sku.inventory_policy = InventoryPolicy::Continue;
                return Ok(());
            }
        }
        Err(PlatformError::NotFound)
    }

    async fn list_skus(&self, _shop: &str, item_id: &str) -> Result<Vec<Sku>, PlatformError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .skus
            .get(item_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn publish_item(
        &self,
        _shop: &str,
        item_id: &str,
        channel_id: &str,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .published
            .push((item_id.to_string(), channel_id.to_string()));
        Ok(())
    }

    async fn set_inventory(
        &self,
        _shop: &str,
        sku_id: &str,
        quantity: i64,
    ) -> Result<(), PlatformError> {
        self.state
            .lock()
            .unwrap()
            .inventory
            .insert(sku_id.to_string(), quantity);
        Ok(())
    }

    async fn online_channel_id(&self, _shop: &str) -> Result<String, PlatformError> {
        Ok("channel-online".to_string())
    }

    async fn read_sku(&self, _shop: &str, _sku_id: &str) -> Result<bool, PlatformError> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.unreadable_reads > 0 {
            state.unreadable_reads -= 1;
            return Ok(false);
        }
        Ok(true)
    }

    async fn create_discount_rule(
        &self,
        _shop: &str,
        spec: &DiscountRuleSpec,
    ) -> Result<String, PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_rule {
            return Err(remote_failure("create_discount_rule"));
        }
        let rule_id = Self::next_id(&mut state, "rule");
        state.rules.insert(
            rule_id.clone(),
            MockRule {
                spec: spec.clone(),
                created_at: Utc::now(),
                usage_count: 0,
            },
        );
        Ok(rule_id)
    }

    async fn create_discount_code(
        &self,
        _shop: &str,
        rule_id: &str,
        code: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_create_code {
            return Err(remote_failure("create_discount_code"));
        }
        if !state.rules.contains_key(rule_id) {
            return Err(PlatformError::NotFound);
        }
        state.codes.insert(code.to_string(), rule_id.to_string());
        Ok(())
    }

    async fn delete_discount_rule(&self, _shop: &str, rule_id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.lock().unwrap();
        if state.rules.remove(rule_id).is_none() {
            return Err(PlatformError::NotFound);
        }
        state.deleted_rules.push(rule_id.to_string());
        Ok(())
    }

    async fn lookup_discount_code_rule(
        &self,
        _shop: &str,
        code: &str,
    ) -> Result<String, PlatformError> {
        self.state
            .lock()
            .unwrap()
            .codes
            .get(code)
            .cloned()
            .ok_or(PlatformError::NotFound)
    }

    async fn list_discount_rules(
        &self,
        _shop: &str,
    ) -> Result<Vec<DiscountRuleSummary>, PlatformError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .rules
            .iter()
            .map(|(id, rule)| DiscountRuleSummary {
                id: id.clone(),
                title: rule.spec.title.clone(),
                created_at: rule.created_at,
                usage_count: rule.usage_count,
                usage_limit: Some(rule.spec.usage_limit),
            })
            .collect())
    }
}
