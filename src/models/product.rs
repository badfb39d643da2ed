use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
#[cfg(feature = "postgres")]
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::errors::FieldErrors;

/// Maximum accepted length for a product name.
pub const NAME_MAX_LEN: usize = 255;

/// A catalog product as stored by the repository
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "postgres", derive(FromRow))]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    /// Active flag; inactive products stay listed but are flagged
    pub status: bool,
    #[serde(skip_deserializing)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(skip_deserializing)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Raw create/update payload as received over HTTP.
///
/// Every field is optional at the wire level so that validation can report
/// all missing fields at once instead of failing on the first absent key.
/// [`ProductInput::into_new_product`] enforces the create rules and
/// [`ProductInput::into_patch`] the partial-update rules.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub status: Option<bool>,
}

/// A fully validated create payload
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub status: bool,
}

/// A validated partial update; absent fields keep their stored value
#[derive(Debug, Default, Clone)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub status: Option<bool>,
}

impl ProductInput {
    /// Validate as a create payload. `name`, `description`, `price` and
    /// `stock` are required; `status` defaults to active.
    pub fn into_new_product(self) -> Result<NewProduct, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => {
                if let Some(message) = name_length_error(name) {
                    errors.entry("name".to_string()).or_default().push(message);
                }
                name.to_string()
            }
            _ => {
                errors
                    .entry("name".to_string())
                    .or_default()
                    .push(required_message("name"));
                String::new()
            }
        };

        let description = match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => description.to_string(),
            _ => {
                errors
                    .entry("description".to_string())
                    .or_default()
                    .push(required_message("description"));
                String::new()
            }
        };

        let price = match self.price {
            Some(price) => {
                if let Some(message) = price_error(price) {
                    errors.entry("price".to_string()).or_default().push(message);
                }
                price
            }
            None => {
                errors
                    .entry("price".to_string())
                    .or_default()
                    .push(required_message("price"));
                0.0
            }
        };

        let stock = match self.stock {
            Some(stock) => {
                if let Some(message) = stock_error(stock) {
                    errors.entry("stock".to_string()).or_default().push(message);
                }
                stock
            }
            None => {
                errors
                    .entry("stock".to_string())
                    .or_default()
                    .push(required_message("stock"));
                0
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(NewProduct {
            name,
            description,
            price,
            stock,
            status: self.status.unwrap_or(true),
        })
    }

    /// Validate as a partial update. Only supplied fields are checked; an
    /// empty payload is a valid no-op patch.
    pub fn into_patch(self) -> Result<ProductPatch, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if name.is_empty() => {
                errors
                    .entry("name".to_string())
                    .or_default()
                    .push(required_message("name"));
                None
            }
            Some(name) => {
                if let Some(message) = name_length_error(name) {
                    errors.entry("name".to_string()).or_default().push(message);
                }
                Some(name.to_string())
            }
            None => None,
        };

        let description = match self.description.as_deref().map(str::trim) {
            Some(description) if description.is_empty() => {
                errors
                    .entry("description".to_string())
                    .or_default()
                    .push(required_message("description"));
                None
            }
            Some(description) => Some(description.to_string()),
            None => None,
        };

        if let Some(price) = self.price {
            if let Some(message) = price_error(price) {
                errors.entry("price".to_string()).or_default().push(message);
            }
        }

        if let Some(stock) = self.stock {
            if let Some(message) = stock_error(stock) {
                errors.entry("stock".to_string()).or_default().push(message);
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductPatch {
            name,
            description,
            price: self.price,
            stock: self.stock,
            status: self.status,
        })
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.status.is_none()
    }
}

fn required_message(field: &str) -> String {
    format!("The {} field is required.", field)
}

fn name_length_error(name: &str) -> Option<String> {
    if name.chars().count() > NAME_MAX_LEN {
        Some(format!(
            "The name field must not be greater than {} characters.",
            NAME_MAX_LEN
        ))
    } else {
        None
    }
}

fn price_error(price: f64) -> Option<String> {
    if !price.is_finite() {
        Some("The price field must be a valid number.".to_string())
    } else if price < 0.0 {
        Some("The price field must be at least 0.".to_string())
    } else {
        None
    }
}

fn stock_error(stock: i64) -> Option<String> {
    if stock < 0 {
        Some("The stock field must be at least 0.".to_string())
    } else {
        None
    }
}
