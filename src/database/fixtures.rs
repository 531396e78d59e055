//! Embedded seed dataset
//!
//! Five smartphone suppliers, ten products and one inventory row per product.
//! Product and inventory references are positional: supplier N is the Nth
//! supplier inserted, so it receives id N.

use crate::database::records::{Inventory, Product, Supplier};
use crate::error::{Result, SqlChatError};

const SUPPLIERS: &[(&str, &str, &str)] = &[
    ("Samsung Electronics", "Seoul, South Korea", "800-726-7864"),
    ("Apple Inc.", "Cupertino, California, USA", "800–692–7753"),
    ("OnePlus Technology", "Shenzhen, Guangdong, China", "400-888-1111"),
    ("Google LLC", "Mountain View, California, USA", "855-836-3987"),
    ("Xiaomi Corporation", "Beijing, China", "1800-103-6286"),
];

const PRODUCTS: &[(&str, &str, f64, i64)] = &[
    ("Samsung Galaxy S21", "Samsung flagship smartphone", 799.99, 1),
    ("Samsung Galaxy Note 20", "Samsung premium smartphone with stylus", 999.99, 1),
    ("iPhone 13 Pro", "Apple flagship smartphone", 999.99, 2),
    ("iPhone SE", "Apple budget smartphone", 399.99, 2),
    ("OnePlus 9", "High performance smartphone", 729.00, 3),
    ("OnePlus Nord", "Mid-range smartphone", 499.00, 3),
    ("Google Pixel 6", "Google's latest smartphone", 599.00, 4),
    ("Google Pixel 5a", "Affordable Google smartphone", 449.00, 4),
    ("Xiaomi Mi 11", "Xiaomi high-end smartphone", 749.99, 5),
    ("Xiaomi Redmi Note 10", "Xiaomi budget smartphone", 199.99, 5),
];

const INVENTORY: &[(i64, u32, u32)] = &[
    (1, 150, 30),
    (2, 100, 20),
    (3, 120, 30),
    (4, 80, 15),
    (5, 200, 40),
    (6, 150, 25),
    (7, 100, 20),
    (8, 90, 18),
    (9, 170, 35),
    (10, 220, 45),
];

/// The validated seed dataset, in insertion order
#[derive(Debug, Clone)]
pub struct Dataset {
    pub suppliers: Vec<Supplier>,
    pub products: Vec<Product>,
    pub inventory: Vec<Inventory>,
}

impl Dataset {
    /// Build the embedded dataset, validating every record and reference
    pub fn embedded() -> Result<Self> {
        let suppliers = SUPPLIERS
            .iter()
            .map(|(name, address, contact)| Supplier::new(*name, *address, *contact))
            .collect::<Result<Vec<_>>>()?;
        let products = PRODUCTS
            .iter()
            .map(|(name, description, price, supplier_id)| {
                Product::new(*name, *description, *price, *supplier_id)
            })
            .collect::<Result<Vec<_>>>()?;
        let inventory = INVENTORY
            .iter()
            .map(|(product_id, quantity, min_required)| {
                Inventory::new(*product_id, *quantity, *min_required)
            })
            .collect::<Result<Vec<_>>>()?;

        let dataset = Self {
            suppliers,
            products,
            inventory,
        };
        dataset.check_references()?;
        Ok(dataset)
    }

    /// Every reference must point at an entity inserted earlier
    pub fn check_references(&self) -> Result<()> {
        let supplier_count = self.suppliers.len() as i64;
        if let Some(product) = self
            .products
            .iter()
            .find(|p| p.supplier_id > supplier_count)
        {
            return Err(SqlChatError::InvalidRecord {
                entity: "product",
                message: format!(
                    "'{}' references supplier {} but only {} suppliers exist",
                    product.name, product.supplier_id, supplier_count
                ),
            });
        }

        let product_count = self.products.len() as i64;
        if let Some(row) = self
            .inventory
            .iter()
            .find(|i| i.product_id > product_count)
        {
            return Err(SqlChatError::InvalidRecord {
                entity: "inventory",
                message: format!(
                    "row references product {} but only {} products exist",
                    row.product_id, product_count
                ),
            });
        }
        Ok(())
    }
}
