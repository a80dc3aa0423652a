use serde::{Deserialize, Serialize};

use eshop_core::{DomainError, DomainResult, ProductId};

use crate::validation;

/// A catalog product with all of its details.
///
/// `name` and `main_image_url` are required; a `quantity` of zero means the
/// product is out of stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub main_image_url: String,
    /// Price in smallest currency unit (e.g., cents).
    pub price: i64,
    pub description: String,
    pub quantity: i64,
}

/// Details of a product to be created (the identifier is assigned by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub main_image_url: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: i64,
}

/// Partial product update: only `Some` fields are written, `None` leaves the
/// current value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub main_image_url: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.main_image_url.is_none()
            && self.price.is_none()
            && self.description.is_none()
            && self.quantity.is_none()
    }
}

impl Product {
    /// Build an entity from creation details and a store-assigned identifier.
    pub fn from_new(id: ProductId, new: NewProduct) -> Self {
        Self {
            id,
            name: new.name,
            main_image_url: new.main_image_url,
            price: new.price,
            description: new.description,
            quantity: new.quantity,
        }
    }

    pub fn in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Overwrite every field that is present in `update`.
    ///
    /// No validation happens here; callers run `validation::validate_update` first.
    pub fn merge(&mut self, update: &ProductUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(url) = &update.main_image_url {
            self.main_image_url = url.clone();
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
    }

    /// Validate and merge in one step. On error the product is left unchanged.
    pub fn try_merge(&mut self, update: &ProductUpdate) -> DomainResult<()> {
        DomainError::from_violations(validation::validate_update(update))?;
        self.merge(update);
        Ok(())
    }

    /// Add `delta` to the stock quantity, rejecting changes that would make it negative.
    pub fn apply_quantity_delta(&mut self, delta: i64) -> DomainResult<()> {
        DomainError::from_violations(validation::validate_quantity_delta(self.quantity, delta))?;
        self.quantity += delta;
        Ok(())
    }
}
