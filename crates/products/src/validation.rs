//! Field validation rules for product payloads.
//!
//! Every rule yields at most one fixed message. Messages end with a space so a
//! list of violations can be concatenated into one readable string.

use crate::product::{NewProduct, ProductUpdate};

/// Human-readable violation messages.
pub mod messages {
    pub const NOT_FOUND: &str = "Product with the given ID doesn't exist. ";
    pub const EMPTY_NAME: &str = "Product's name cannot be empty. ";
    pub const EMPTY_IMAGE_URL: &str = "Product's image URL cannot be empty. ";
    pub const NEGATIVE_PRICE: &str = "Product's price must be greater than or equal to zero. ";
    pub const NEGATIVE_QUANTITY: &str = "Product's quantity must be greater than or equal to zero. ";
    pub const NEGATIVE_PAGE: &str = "Page must be greater than or equal to zero. ";
    pub const NON_POSITIVE_PAGE_SIZE: &str = "Page size must be greater than zero. ";
    pub const INTERNAL_ERROR: &str = "Internal error while saving the product update. ";
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check(violations: &mut Vec<String>, ok: bool, message: &str) {
    if !ok {
        violations.push(message.to_string());
    }
}

/// Validate a creation payload: name and image URL required, price and quantity non-negative.
pub fn validate_new(new: &NewProduct) -> Vec<String> {
    let mut violations = Vec::new();
    check(&mut violations, !is_blank(&new.name), messages::EMPTY_NAME);
    check(&mut violations, !is_blank(&new.main_image_url), messages::EMPTY_IMAGE_URL);
    check(&mut violations, new.price >= 0, messages::NEGATIVE_PRICE);
    check(&mut violations, new.quantity >= 0, messages::NEGATIVE_QUANTITY);
    violations
}

/// Validate a partial update. Absent fields are always valid.
pub fn validate_update(update: &ProductUpdate) -> Vec<String> {
    let mut violations = Vec::new();
    check(
        &mut violations,
        update.name.as_deref().is_none_or(|n| !is_blank(n)),
        messages::EMPTY_NAME,
    );
    check(
        &mut violations,
        update.main_image_url.as_deref().is_none_or(|u| !is_blank(u)),
        messages::EMPTY_IMAGE_URL,
    );
    check(&mut violations, update.price.is_none_or(|p| p >= 0), messages::NEGATIVE_PRICE);
    check(&mut violations, update.quantity.is_none_or(|q| q >= 0), messages::NEGATIVE_QUANTITY);
    violations
}

/// Validate that `current + delta` stays non-negative (overflow counts as a violation).
pub fn validate_quantity_delta(current: i64, delta: i64) -> Vec<String> {
    let mut violations = Vec::new();
    check(
        &mut violations,
        current.checked_add(delta).is_some_and(|q| q >= 0),
        messages::NEGATIVE_QUANTITY,
    );
    violations
}

/// Validate paging parameters.
pub fn validate_page(page: i64, page_size: i64) -> Vec<String> {
    let mut violations = Vec::new();
    check(&mut violations, page >= 0, messages::NEGATIVE_PAGE);
    check(&mut violations, page_size > 0, messages::NON_POSITIVE_PAGE_SIZE);
    violations
}

/// Concatenate violation messages into a single string.
pub fn join_errors(violations: &[String]) -> String {
    violations.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Ortega R55".into(),
            main_image_url: "https://example.com/ortega.jpg".into(),
            price: 514_900,
            description: String::new(),
            quantity: 0,
        }
    }

    #[test]
    fn valid_creation_has_no_violations() {
        assert!(validate_new(&new_product()).is_empty());
    }

    #[test]
    fn creation_reports_every_violation_in_rule_order() {
        let new = NewProduct {
            name: "".into(),
            main_image_url: " ".into(),
            price: -5,
            quantity: -1,
            ..new_product()
        };
        assert_eq!(
            validate_new(&new),
            vec![
                messages::EMPTY_NAME.to_string(),
                messages::EMPTY_IMAGE_URL.to_string(),
                messages::NEGATIVE_PRICE.to_string(),
                messages::NEGATIVE_QUANTITY.to_string(),
            ]
        );
    }

    #[test]
    fn absent_update_fields_are_valid() {
        assert!(validate_update(&ProductUpdate::default()).is_empty());
    }

    #[test]
    fn present_update_fields_are_checked() {
        let update = ProductUpdate {
            main_image_url: Some("".into()),
            quantity: Some(-3),
            ..Default::default()
        };
        assert_eq!(
            join_errors(&validate_update(&update)),
            format!("{}{}", messages::EMPTY_IMAGE_URL, messages::NEGATIVE_QUANTITY)
        );
    }

    #[test]
    fn quantity_delta_boundaries() {
        assert!(validate_quantity_delta(50, -50).is_empty());
        assert_eq!(validate_quantity_delta(50, -51), vec![messages::NEGATIVE_QUANTITY.to_string()]);
        assert_eq!(
            validate_quantity_delta(i64::MAX, 1),
            vec![messages::NEGATIVE_QUANTITY.to_string()]
        );
    }

    #[test]
    fn paging_rules() {
        assert!(validate_page(0, 1).is_empty());
        assert_eq!(
            join_errors(&validate_page(-1, 0)),
            format!("{}{}", messages::NEGATIVE_PAGE, messages::NON_POSITIVE_PAGE_SIZE)
        );
    }
}
