//! Active order: the register's in-flight cart
//!
//! Scanned products land here. The order itself is settled elsewhere;
//! this component only inserts lines.

use rust_decimal::Decimal;
use shared::models::Product;

/// One cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price: Decimal,
    pub sku: String,
    pub quantity: i32,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// The active order.
///
/// A second insert of the same product merges into the existing line by
/// incrementing its quantity instead of duplicating the line.
#[derive(Debug, Clone, Default)]
pub struct ActiveOrder {
    lines: Vec<OrderLine>,
}

impl ActiveOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `product` at quantity 1, merging with an existing line for
    /// the same product.
    pub fn add_product(&mut self, product: &Product) {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            line.quantity += 1;
            return;
        }
        self.lines.push(OrderLine {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.selling_price,
            sku: product.sku.clone(),
            quantity: 1,
        });
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.lines.iter().map(OrderLine::line_total).sum()
    }
}
