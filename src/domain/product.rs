//! Catalog product as seen by the order core.

use rust_decimal::Decimal;

use super::ProductId;
use crate::error::MarketError;

/// A catalog product.
///
/// Owned by the catalog service; this core reads it (plain or with a row
/// lock) and adjusts `stock_quantity` only at checkout and cancellation.
/// `stock_quantity >= 0` holds at every committed instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Display name, used in error messages shown to buyers.
    pub name: String,
    /// Current catalog price.
    pub price: Decimal,
    /// Units available for sale right now.
    pub stock_quantity: i32,
}

impl Product {
    /// Checks that `requested_total` units can be committed against live
    /// stock.
    ///
    /// # Errors
    ///
    /// Returns [`MarketError::InsufficientStock`] carrying the live stock
    /// count and the product name, so the caller can self-correct.
    pub fn ensure_available(&self, requested_total: i32) -> Result<(), MarketError> {
        if requested_total > self.stock_quantity {
            return Err(MarketError::InsufficientStock {
                available: self.stock_quantity,
                item_name: self.name.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn widget(stock: i32) -> Product {
        Product {
            id: ProductId::new(),
            name: "Widget".to_string(),
            price: Decimal::new(4999, 2),
            stock_quantity: stock,
        }
    }

    #[test]
    fn within_stock_is_available() {
        assert!(widget(5).ensure_available(5).is_ok());
        assert!(widget(5).ensure_available(1).is_ok());
    }

    #[test]
    fn over_stock_reports_available_and_name() {
        let err = widget(2).ensure_available(3);
        let Err(MarketError::InsufficientStock {
            available,
            item_name,
        }) = err
        else {
            panic!("expected InsufficientStock");
        };
        assert_eq!(available, 2);
        assert_eq!(item_name, "Widget");
    }

    #[test]
    fn zero_stock_rejects_any_request() {
        assert!(widget(0).ensure_available(1).is_err());
    }
}
