// Validation utilities module
// Provides custom validation functions for domain-specific rules

use validator::ValidationError;

/// Validates that a shop handle looks like a hostname the platform could
/// have issued (e.g. "demo-store.example-commerce.com")
pub fn validate_shop_domain(shop: &str) -> Result<(), ValidationError> {
    if shop.is_empty() || shop.len() > 255 {
        return Err(ValidationError::new("invalid_shop_domain"));
    }
    let charset_ok = shop
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if charset_ok && shop.contains('.') && !shop.starts_with('.') && !shop.ends_with('.') {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_shop_domain"))
    }
}
