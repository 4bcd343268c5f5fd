use crate::bundles::models::{AddOnKind, BundleDefinition, PricingMode, TierRule};
use crate::checkout::error::PricingError;
use crate::checkout::models::{PriceBreakdown, Selection};

/// Pure resolver turning a bundle definition and a buyer's selection into a
/// price breakdown. No I/O; deterministic; safe to call repeatedly.
pub struct PricingResolver;

impl PricingResolver {
    /// Resolve the price of a selection against its bundle definition
    ///
    /// Tier rules, when one qualifies, replace the bundle-level mode
    /// entirely; the qualifying tier with the highest `min_quantity` wins,
    /// with the first-declared rule winning ties. Add-on prices are summed
    /// after discounting and never participate in it.
    pub fn resolve(
        bundle: &BundleDefinition,
        selection: &Selection,
    ) -> Result<PriceBreakdown, PricingError> {
        let mut product_subtotal: i64 = 0;
        for selected in &selection.items {
            let item = bundle.item(&selected.item_id).ok_or_else(|| {
                PricingError::InvalidSelection(format!(
                    "item {} is not part of bundle {}",
                    selected.item_id, bundle.id
                ))
            })?;

            let mut line = item.base_price_cents;
            if let Some(variant_id) = &selected.variant_id {
                if !item.variant_prices.is_empty() {
                    // Add only the delta between the variant and the base
                    // price; the base is already on the line
                    let variant_price =
                        item.variant_prices.get(variant_id).ok_or_else(|| {
                            PricingError::InvalidSelection(format!(
                                "variant {} is not offered for item {}",
                                variant_id, selected.item_id
                            ))
                        })?;
                    line += variant_price - item.base_price_cents;
                }
            }
            product_subtotal += line;
        }

        let item_count = selection.items.len() as u32;
        let discounted_product_total = match Self::winning_tier(&bundle.tiers, item_count) {
            Some(tier) => Self::apply_mode(product_subtotal, tier.mode, tier.value)?,
            None => Self::apply_mode(product_subtotal, bundle.mode, bundle.value)?,
        };

        let add_on_total = Self::add_on_total(bundle, selection)?;

        Ok(PriceBreakdown {
            product_subtotal,
            discounted_product_total,
            add_on_total,
            grand_total: discounted_product_total + add_on_total,
        })
    }

    /// The qualifying tier with the highest threshold; first-declared wins
    /// when two tiers share a threshold
    fn winning_tier(tiers: &[TierRule], item_count: u32) -> Option<&TierRule> {
        let mut best: Option<&TierRule> = None;
        for tier in tiers {
            if tier.min_quantity > item_count {
                continue;
            }
            match best {
                Some(current) if tier.min_quantity <= current.min_quantity => {}
                _ => best = Some(tier),
            }
        }
        best
    }

    /// Apply a pricing mode to a base amount
    fn apply_mode(
        base: i64,
        mode: PricingMode,
        value: Option<i64>,
    ) -> Result<i64, PricingError> {
        match mode {
            PricingMode::Sum => Ok(base),
            PricingMode::Fixed => {
                let value = Self::required_value(mode, value)?;
                Ok(value.max(0))
            }
            PricingMode::DiscountPercent => {
                let value = Self::required_value(mode, value)?;
                Ok((base - base * value / 100).max(0))
            }
            PricingMode::DiscountAmount => {
                let value = Self::required_value(mode, value)?;
                Ok((base - value).max(0))
            }
        }
    }

    fn required_value(mode: PricingMode, value: Option<i64>) -> Result<i64, PricingError> {
        value.ok_or_else(|| {
            PricingError::InvalidPricingConfig(format!("{} mode requires a value", mode))
        })
    }

    fn add_on_total(
        bundle: &BundleDefinition,
        selection: &Selection,
    ) -> Result<i64, PricingError> {
        let mut total = 0;
        if let Some(wrap_id) = &selection.wrap_id {
            total += Self::add_on_price(bundle, wrap_id, AddOnKind::Wrap)?;
        }
        if let Some(card_id) = &selection.card_id {
            total += Self::add_on_price(bundle, card_id, AddOnKind::Card)?;
        }
        Ok(total)
    }

    fn add_on_price(
        bundle: &BundleDefinition,
        add_on_id: &str,
        kind: AddOnKind,
    ) -> Result<i64, PricingError> {
        let add_on = bundle.add_on(add_on_id).ok_or_else(|| {
            PricingError::InvalidSelection(format!(
                "add-on {} is not part of bundle {}",
                add_on_id, bundle.id
            ))
        })?;
        if add_on.kind != kind {
            return Err(PricingError::InvalidSelection(format!(
                "add-on {} is not a {}",
                add_on_id, kind
            )));
        }
        Ok(add_on.price_cents)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::bundles::models::{AddOn, BundleItem};
    use crate::checkout::models::SelectedItem;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn discount_mode_strategy() -> impl Strategy<Value = PricingMode> {
        prop_oneof![
            Just(PricingMode::Sum),
            Just(PricingMode::DiscountPercent),
            Just(PricingMode::DiscountAmount),
        ]
    }

    fn bundle_with_prices(prices: &[i64], mode: PricingMode, value: i64) -> BundleDefinition {
        BundleDefinition {
            id: "pb".to_string(),
            title: "Property Bundle".to_string(),
            mode,
            value: Some(value),
            tiers: vec![],
            items: prices
                .iter()
                .enumerate()
                .map(|(index, price)| BundleItem {
                    id: format!("i{index}"),
                    catalog_item_id: format!("c{index}"),
                    variant_id: format!("v{index}"),
                    base_price_cents: *price,
                    min_quantity: 1,
                    max_quantity: 10,
                    variant_prices: HashMap::new(),
                })
                .collect(),
            add_ons: vec![AddOn {
                id: "wrap".to_string(),
                kind: AddOnKind::Wrap,
                price_cents: 300,
            }],
        }
    }

    fn select_all(count: usize, wrap: bool) -> Selection {
        Selection {
            items: (0..count)
                .map(|index| SelectedItem {
                    item_id: format!("i{index}"),
                    variant_id: None,
                })
                .collect(),
            wrap_id: wrap.then(|| "wrap".to_string()),
            card_id: None,
        }
    }

    /// Resolving the same inputs twice yields identical breakdowns
    #[test]
    fn prop_resolution_is_deterministic() {
        proptest!(|(
            prices in prop::collection::vec(1i64..=100_000, 1..=8),
            mode in discount_mode_strategy(),
            value in 0i64..=20_000,
            wrap in any::<bool>()
        )| {
            let bundle = bundle_with_prices(&prices, mode, value);
            let selection = select_all(prices.len(), wrap);
            let first = PricingResolver::resolve(&bundle, &selection).unwrap();
            let second = PricingResolver::resolve(&bundle, &selection).unwrap();
            prop_assert_eq!(first, second);
        });
    }

    /// Discounted totals never go negative, whatever the value
    #[test]
    fn prop_totals_are_non_negative() {
        proptest!(|(
            prices in prop::collection::vec(1i64..=100_000, 1..=8),
            mode in discount_mode_strategy(),
            value in 0i64..=1_000_000
        )| {
            let bundle = bundle_with_prices(&prices, mode, value);
            let selection = select_all(prices.len(), false);
            let breakdown = PricingResolver::resolve(&bundle, &selection).unwrap();
            prop_assert!(breakdown.discounted_product_total >= 0);
            prop_assert!(breakdown.grand_total >= 0);
        });
    }

    /// Discount modes never price above the subtotal
    #[test]
    fn prop_discounts_never_exceed_subtotal() {
        proptest!(|(
            prices in prop::collection::vec(1i64..=100_000, 1..=8),
            mode in prop_oneof![
                Just(PricingMode::DiscountPercent),
                Just(PricingMode::DiscountAmount),
            ],
            value in 0i64..=1_000_000
        )| {
            let bundle = bundle_with_prices(&prices, mode, value);
            let selection = select_all(prices.len(), false);
            let breakdown = PricingResolver::resolve(&bundle, &selection).unwrap();
            prop_assert!(breakdown.discounted_product_total <= breakdown.product_subtotal);
        });
    }

    /// Add-ons sit outside the discount: grand - add-ons == discounted total
    #[test]
    fn prop_add_on_isolation() {
        proptest!(|(
            prices in prop::collection::vec(1i64..=100_000, 1..=8),
            mode in discount_mode_strategy(),
            value in 0i64..=20_000,
            wrap in any::<bool>()
        )| {
            let bundle = bundle_with_prices(&prices, mode, value);
            let selection = select_all(prices.len(), wrap);
            let breakdown = PricingResolver::resolve(&bundle, &selection).unwrap();
            prop_assert_eq!(
                breakdown.grand_total - breakdown.add_on_total,
                breakdown.discounted_product_total
            );
        });
    }
}
