//! Seed records
//!
//! Typed rows for the three store tables. Constructors validate their
//! fields so an invalid record can never reach the seeder.

use crate::error::{Result, SqlChatError};

fn require_text(entity: &'static str, field: &str, value: impl Into<String>) -> Result<String> {
    let value = value.into();
    if value.trim().is_empty() {
        return Err(SqlChatError::InvalidRecord {
            entity,
            message: format!("{} must not be empty", field),
        });
    }
    Ok(value)
}

fn require_id(entity: &'static str, field: &str, id: i64) -> Result<i64> {
    if id < 1 {
        return Err(SqlChatError::InvalidRecord {
            entity,
            message: format!("{} must be a positive id, got {}", field, id),
        });
    }
    Ok(id)
}

/// A row of SUPPLIERS (without its auto-assigned id)
#[derive(Debug, Clone, PartialEq)]
pub struct Supplier {
    pub name: String,
    pub address: String,
    pub contact: String,
}

impl Supplier {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            name: require_text("supplier", "name", name)?,
            address: require_text("supplier", "address", address)?,
            contact: require_text("supplier", "contact", contact)?,
        })
    }
}

/// A row of PRODUCTS (without its auto-assigned id)
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Id of the supplier this product comes from
    pub supplier_id: i64,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        supplier_id: i64,
    ) -> Result<Self> {
        if !price.is_finite() || price <= 0.0 {
            return Err(SqlChatError::InvalidRecord {
                entity: "product",
                message: format!("price must be a positive amount, got {}", price),
            });
        }
        Ok(Self {
            name: require_text("product", "name", name)?,
            description: require_text("product", "description", description)?,
            price,
            supplier_id: require_id("product", "supplier_id", supplier_id)?,
        })
    }
}

/// A row of INVENTORY (without its auto-assigned id)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    /// Id of the stocked product
    pub product_id: i64,
    pub quantity: u32,
    pub min_required: u32,
}

impl Inventory {
    pub fn new(product_id: i64, quantity: u32, min_required: u32) -> Result<Self> {
        Ok(Self {
            product_id: require_id("inventory", "product_id", product_id)?,
            quantity,
            min_required,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supplier_validation() {
        assert!(Supplier::new("Acme", "Somewhere", "555-0100").is_ok());

        let err = Supplier::new("Acme", "  ", "555-0100").unwrap_err();
        assert!(err.to_string().contains("address must not be empty"));
        assert!(Supplier::new("", "Somewhere", "555-0100").is_err());
        assert!(Supplier::new("Acme", "Somewhere", "").is_err());
    }

    #[test]
    fn test_product_price_must_be_positive() {
        assert!(Product::new("Phone", "A phone", 10.0, 1).is_ok());
        assert!(Product::new("Phone", "A phone", 0.0, 1).is_err());
        assert!(Product::new("Phone", "A phone", -5.0, 1).is_err());
        assert!(Product::new("Phone", "A phone", f64::NAN, 1).is_err());
    }

    #[test]
    fn test_references_must_be_positive() {
        assert!(Product::new("Phone", "A phone", 10.0, 0).is_err());
        assert!(Inventory::new(0, 10, 1).is_err());
        assert!(Inventory::new(3, 0, 0).is_ok());
    }
}
