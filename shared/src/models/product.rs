//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product record as returned by the catalog search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    /// Unit selling price; a plain JSON number on the wire
    #[serde(with = "rust_decimal::serde::float")]
    pub selling_price: Decimal,
    pub stock: i32,
    pub sku: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_wire_shape_is_camel_case() {
        let json = r#"{"id":42,"name":"Espresso Beans 1kg","sellingPrice":12.5,"stock":7,"sku":"X123"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 42);
        assert_eq!(product.selling_price, Decimal::new(125, 1));
        assert_eq!(product.sku, "X123");

        let back = serde_json::to_string(&product).unwrap();
        assert!(back.contains(r#""sellingPrice":12.5"#));
    }
}
