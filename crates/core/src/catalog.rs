//! The fixed product offering.
//!
//! The farm sells a single product in a handful of pack sizes. Order
//! defaults (product name, unit price) come from here so the catalog and
//! the order service never disagree.

use rust_decimal::Decimal;
use serde::Serialize;

/// Name used for line items that omit `productName`.
pub const DEFAULT_PRODUCT_NAME: &str = "Fresh Organic Whole Milk";

const DEFAULT_PRODUCT_DESCRIPTION: &str =
    "Farm-fresh whole milk from grass-fed cows, delivered the morning it is collected.";

/// Selectable quantities, in tenths of a litre.
const QUANTITY_STEPS: [i64; 7] = [5, 10, 15, 20, 30, 50, 100];

/// Unit price used for line items that omit `pricePerLiter`.
#[must_use]
pub fn default_price_per_liter() -> Decimal {
    Decimal::from(70)
}

/// A selectable pack size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityOption {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub label: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// A product as shown to buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_liter: Decimal,
    pub unit: String,
    pub quantity_options: Vec<QuantityOption>,
}

/// "0.5 Litres", "1 Litre", "1.5 Litres", ...
fn quantity_label(value: Decimal) -> String {
    if value == Decimal::ONE {
        format!("{value} Litre")
    } else {
        format!("{value} Litres")
    }
}

/// Every product currently on sale.
#[must_use]
pub fn products() -> Vec<Product> {
    let price_per_liter = default_price_per_liter();

    let quantity_options = QUANTITY_STEPS
        .iter()
        .map(|&tenths| {
            let value = Decimal::new(tenths, 1).normalize();
            QuantityOption {
                value,
                label: quantity_label(value),
                price: (value * price_per_liter).normalize(),
            }
        })
        .collect();

    vec![Product {
        name: DEFAULT_PRODUCT_NAME.to_owned(),
        description: DEFAULT_PRODUCT_DESCRIPTION.to_owned(),
        price_per_liter,
        unit: "litre".to_owned(),
        quantity_options,
    }]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_single_milk_product() {
        let products = products();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, DEFAULT_PRODUCT_NAME);
        assert_eq!(products[0].price_per_liter, Decimal::from(70));
    }

    #[test]
    fn test_quantity_options() {
        let product = &products()[0];
        let labels: Vec<&str> = product
            .quantity_options
            .iter()
            .map(|o| o.label.as_str())
            .collect();
        assert_eq!(
            labels,
            [
                "0.5 Litres",
                "1 Litre",
                "1.5 Litres",
                "2 Litres",
                "3 Litres",
                "5 Litres",
                "10 Litres"
            ]
        );

        for option in &product.quantity_options {
            assert_eq!(option.price, option.value * Decimal::from(70));
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(products()).unwrap();
        let first = &json[0];
        assert_eq!(first["pricePerLiter"].as_f64(), Some(70.0));
        assert_eq!(first["quantityOptions"][0]["value"].as_f64(), Some(0.5));
        assert_eq!(first["quantityOptions"][0]["price"].as_f64(), Some(35.0));
        assert_eq!(first["quantityOptions"][6]["price"].as_f64(), Some(700.0));
    }
}
