use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::checkout::discount::{CODE_PREFIX, RULE_TITLE_PREFIX};
use crate::platform::CatalogApi;

/// Deletes spent and stale ephemeral discount rules
///
/// Cleanup is best-effort by design: every failure is logged and swallowed,
/// and each rule is handled independently so one failure never aborts the
/// cleanup of the others.
#[derive(Clone)]
pub struct DiscountJanitor {
    catalog: Arc<dyn CatalogApi>,
}

impl DiscountJanitor {
    pub fn new(catalog: Arc<dyn CatalogApi>) -> Self {
        Self { catalog }
    }

    /// Event-triggered cleanup for codes consumed by a completed order
    ///
    /// A consumed single-use code's rule must not linger; codes without the
    /// engine prefix belong to someone else and are left alone.
    pub async fn on_order_completed(&self, shop: &str, codes: &[String]) {
        for code in codes {
            if !code.starts_with(CODE_PREFIX) {
                continue;
            }
            let rule_id = match self.catalog.lookup_discount_code_rule(shop, code).await {
                Ok(rule_id) => rule_id,
                Err(err) => {
                    tracing::debug!("no rule found for consumed code {} on {}: {}", code, shop, err);
                    continue;
                }
            };
            match self.catalog.delete_discount_rule(shop, &rule_id).await {
                Ok(()) => {
                    tracing::info!("deleted consumed discount rule {} for code {}", rule_id, code);
                }
                Err(err) => {
                    // Deleting an already-deleted rule lands here; ignored
                    tracing::debug!(
                        "could not delete rule {} for consumed code {}: {}",
                        rule_id,
                        code,
                        err
                    );
                }
            }
        }
    }

    /// Age-triggered sweep over all engine-owned rules on the shop
    ///
    /// Deletes rules older than `max_age_minutes` and rules whose usage
    /// already reached its limit.
    pub async fn sweep(&self, shop: &str, max_age_minutes: i64) {
        let rules = match self.catalog.list_discount_rules(shop).await {
            Ok(rules) => rules,
            Err(err) => {
                tracing::debug!("discount rule sweep skipped for {}: {}", shop, err);
                return;
            }
        };

        let cutoff = Utc::now() - Duration::minutes(max_age_minutes);
        for rule in rules {
            if !rule.title.starts_with(RULE_TITLE_PREFIX) {
                continue;
            }
            let spent = rule
                .usage_limit
                .map_or(false, |limit| rule.usage_count >= limit);
            if rule.created_at > cutoff && !spent {
                continue;
            }
            match self.catalog.delete_discount_rule(shop, &rule.id).await {
                Ok(()) => tracing::info!("swept stale discount rule {} on {}", rule.id, shop),
                Err(err) => {
                    tracing::debug!("sweep could not delete rule {} on {}: {}", rule.id, shop, err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockCatalog;

    const SHOP: &str = "demo-store.example-commerce.com";

    #[tokio::test]
    async fn test_consumed_code_rule_is_deleted() {
        let catalog = Arc::new(MockCatalog::new());
        let rule_id = catalog.seed_rule("Bundle checkout BNDL-AAAA1111", Some("BNDL-AAAA1111"), 0, 1);
        let janitor = DiscountJanitor::new(catalog.clone());

        janitor
            .on_order_completed(SHOP, &["BNDL-AAAA1111".to_string()])
            .await;

        assert_eq!(catalog.rule_count(), 0);
        assert_eq!(catalog.deleted_rules(), vec![rule_id]);
    }

    #[tokio::test]
    async fn test_foreign_codes_are_ignored() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.seed_rule("Summer sale", Some("SUMMER10"), 0, 1);
        let janitor = DiscountJanitor::new(catalog.clone());

        janitor
            .on_order_completed(SHOP, &["SUMMER10".to_string()])
            .await;

        assert_eq!(catalog.rule_count(), 1);
    }

    #[tokio::test]
    async fn test_double_cleanup_is_a_no_op() {
        let catalog = Arc::new(MockCatalog::new());
        catalog.seed_rule("Bundle checkout BNDL-BBBB2222", Some("BNDL-BBBB2222"), 0, 1);
        let janitor = DiscountJanitor::new(catalog.clone());
        let codes = vec!["BNDL-BBBB2222".to_string()];

        janitor.on_order_completed(SHOP, &codes).await;
        // Second delivery of the same order event must not raise
        janitor.on_order_completed(SHOP, &codes).await;

        assert_eq!(catalog.rule_count(), 0);
        assert_eq!(catalog.deleted_rules().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_deletes_only_stale_engine_rules() {
        let catalog = Arc::new(MockCatalog::new());
        let stale = catalog.seed_rule("Bundle checkout BNDL-OLD00000", None, 20, 0);
        catalog.seed_rule("Bundle checkout BNDL-NEW00000", None, 1, 0);
        catalog.seed_rule("Summer sale", None, 60, 0);
        let janitor = DiscountJanitor::new(catalog.clone());

        janitor.sweep(SHOP, 10).await;

        let remaining: Vec<String> = catalog.rules().iter().map(|r| r.spec.title.clone()).collect();
        assert_eq!(catalog.deleted_rules(), vec![stale]);
        assert!(remaining.contains(&"Bundle checkout BNDL-NEW00000".to_string()));
        assert!(remaining.contains(&"Summer sale".to_string()));
    }

    #[tokio::test]
    async fn test_sweep_deletes_spent_rules_regardless_of_age() {
        let catalog = Arc::new(MockCatalog::new());
        let spent = catalog.seed_rule("Bundle checkout BNDL-SPENT000", None, 0, 1);
        let janitor = DiscountJanitor::new(catalog.clone());

        janitor.sweep(SHOP, 10).await;

        assert_eq!(catalog.deleted_rules(), vec![spent]);
    }
}
