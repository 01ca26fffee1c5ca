//! # Demo Seed Data
//!
//! Starter inventory and customers written into a fresh local store so a
//! brand-new install opens with something on the shelf. Seeding only happens
//! when the local backend is empty; a configured remote store is never
//! seeded.

use pharmapos_core::{Customer, Product};

/// Demo products for a fresh install.
pub fn demo_products() -> Vec<Product> {
    let rows: [(&str, &str, &str, &str, f64, i64, &str); 5] = [
        ("001", "Paracetamol 500mg", "B123", "2025-12-31", 5.00, 100, "Medicine"),
        ("002", "Amoxicillin 250mg", "B124", "2024-10-20", 12.50, 50, "Antibiotic"),
        ("003", "Vitamin C 1000mg", "B125", "2026-01-15", 8.00, 200, "Supplement"),
        ("004", "Ibuprofen 400mg", "B126", "2025-06-30", 6.50, 80, "Medicine"),
        ("005", "Cetirizine 10mg", "B127", "2025-08-15", 4.00, 120, "Allergy"),
    ];

    rows.iter()
        .map(|&(item_code, name, batch, expiry, price, stock, category)| Product {
            id: String::new(),
            item_code: item_code.to_string(),
            name: name.to_string(),
            batch: batch.to_string(),
            expiry: expiry.to_string(),
            price,
            stock,
            category: category.to_string(),
            reorder_level: 10,
            optimum_level: stock,
        })
        .collect()
}

/// Demo credit customers for a fresh install.
pub fn demo_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: String::new(),
            name: "Dr. Gulam Murtaza".to_string(),
            phone: "0300-1234567".to_string(),
            email: None,
            address: Some("Bismillah Chowk, Gulshan Ravi".to_string()),
            balance: 6070.00,
        },
        Customer {
            id: String::new(),
            name: "Pharmacy One".to_string(),
            phone: "0321-9876543".to_string(),
            email: None,
            address: Some("Main Blvd, Johar Town".to_string()),
            balance: 0.00,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmapos_core::validation::{validate_customer, validate_product};

    #[test]
    fn test_seed_data_passes_validation() {
        for product in demo_products() {
            validate_product(&product).unwrap();
        }
        for customer in demo_customers() {
            validate_customer(&customer).unwrap();
        }
    }
}
