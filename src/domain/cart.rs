//! Cart lines: a buyer's pending, non-committed intent to purchase.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ProductId, UserId};
use crate::error::MarketError;

/// One line of a buyer's cart, unique per `(buyer_id, product_id)`.
///
/// `quantity >= 1` always; a line that would drop to zero is deleted
/// instead. `price_at_add` is a historical snapshot taken when the line was
/// last added, independent of later catalog price changes. Nothing is
/// physically reserved: stock is only committed at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Owning buyer.
    pub buyer_id: UserId,
    /// Product the line refers to.
    pub product_id: ProductId,
    /// Requested units, at least 1.
    pub quantity: i32,
    /// Catalog price captured when the line was added or last topped up.
    pub price_at_add: Decimal,
    /// When the line was first created.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Returns `price_at_add × quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_at_add * Decimal::from(self.quantity)
    }
}

/// Sums `price_at_add × quantity` over a set of cart lines.
///
/// Recomputed on every view and at checkout; never cached.
#[must_use]
pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// Combines an existing line quantity with a newly requested amount.
///
/// # Errors
///
/// Returns [`MarketError::InvalidInput`] if the combined quantity would
/// overflow.
pub fn combined_quantity(existing: Option<i32>, requested: i32) -> Result<i32, MarketError> {
    match existing {
        None => Ok(requested),
        Some(current) => current
            .checked_add(requested)
            .ok_or_else(|| MarketError::InvalidInput("cart quantity too large".to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn line(quantity: i32, cents: i64) -> CartLine {
        CartLine {
            buyer_id: UserId::new(),
            product_id: ProductId::new(),
            quantity,
            price_at_add: Decimal::new(cents, 2),
            added_at: Utc::now(),
        }
    }

    #[test]
    fn line_total_multiplies_snapshot_price() {
        let l = line(3, 5000);
        assert_eq!(l.line_total(), Decimal::new(15000, 2));
    }

    #[test]
    fn cart_total_sums_lines() {
        let lines = vec![line(3, 5000), line(1, 3000)];
        // 3 × R50.00 + 1 × R30.00
        assert_eq!(cart_total(&lines), Decimal::new(18000, 2));
    }

    #[test]
    fn empty_cart_totals_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn combined_quantity_without_existing_line() {
        assert_eq!(combined_quantity(None, 4).ok(), Some(4));
    }

    #[test]
    fn combined_quantity_adds_to_existing() {
        assert_eq!(combined_quantity(Some(3), 2).ok(), Some(5));
    }

    #[test]
    fn combined_quantity_rejects_overflow() {
        assert!(combined_quantity(Some(i32::MAX), 1).is_err());
    }
}
