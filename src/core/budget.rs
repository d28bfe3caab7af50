//! Budget validation - Checks a request's line items against its declared budget.
//!
//! Two rules apply, in order: no single item's unit price may exceed the budget, and the
//! sum of `quantity * unit_price` over all items may not exceed the budget. Validation is
//! pure and runs before any write on both create and update.

use crate::{
    core::input::ItemInput,
    errors::{Error, Result},
};
use rust_decimal::Decimal;

/// Formats an amount with exactly two decimal places.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// Sums `quantity * unit_price` over all items, or `None` on overflow.
#[must_use]
pub fn items_total(items: &[ItemInput]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
}

/// Validates the per-item cap and the aggregate cap, returning the computed total.
///
/// # Errors
/// - `items.{index}.unit_price` when an item's unit price exceeds the budget
/// - `budget` when the aggregate total exceeds the budget
pub fn validate_budget(budget: Decimal, items: &[ItemInput]) -> Result<Decimal> {
    if budget < Decimal::ZERO {
        return Err(Error::validation("budget", "The budget must be at least 0."));
    }

    for (index, item) in items.iter().enumerate() {
        if item.unit_price > budget {
            return Err(Error::validation(
                format!("items.{index}.unit_price"),
                format!(
                    "Item {} ({}) price must not exceed the budget.",
                    index + 1,
                    item.item_name
                ),
            ));
        }
    }

    let total = items_total(items)
        .ok_or_else(|| Error::validation("budget", "Total item cost is too large."))?;

    if total > budget {
        return Err(Error::validation(
            "budget",
            format!(
                "Total item cost (RM {}) must not exceed the budget (RM {}).",
                format_amount(total),
                format_amount(budget)
            ),
        ));
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_within_budget() {
        let items = vec![
            ItemInput::new("Toner", 3, dec!(10.50)),
            ItemInput::new("Paper", 2, dec!(20)),
        ];
        assert_eq!(validate_budget(dec!(100), &items).unwrap(), dec!(71.50));
    }

    #[test]
    fn test_total_equal_to_budget_passes() {
        let items = vec![ItemInput::new("Chair", 4, dec!(250))];
        assert_eq!(validate_budget(dec!(1000), &items).unwrap(), dec!(1000));
    }

    #[test]
    fn test_item_price_above_budget_reports_index() {
        let items = vec![
            ItemInput::new("Desk", 1, dec!(50)),
            ItemInput::new("Server", 1, dec!(150)),
        ];
        let err = validate_budget(dec!(100), &items).unwrap_err();
        match err {
            Error::Validation { field, message } => {
                assert_eq!(field, "items.1.unit_price");
                assert!(message.contains("Item 2 (Server)"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_per_item_cap_checked_before_total() {
        let items = vec![
            ItemInput::new("Desk", 10, dec!(50)),
            ItemInput::new("Server", 1, dec!(150)),
        ];
        assert!(matches!(
            validate_budget(dec!(100), &items),
            Err(Error::Validation { field, .. }) if field == "items.1.unit_price"
        ));
    }

    #[test]
    fn test_aggregate_above_budget_shows_total() {
        let items = vec![ItemInput::new("Toner", 3, dec!(10.50))];
        let err = validate_budget(dec!(30), &items).unwrap_err();
        match err {
            Error::Validation { field, message } => {
                assert_eq!(field, "budget");
                assert_eq!(
                    message,
                    "Total item cost (RM 31.50) must not exceed the budget (RM 30.00)."
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_budget_allows_free_items() {
        let items = vec![ItemInput::new("Sample", 5, dec!(0))];
        assert_eq!(validate_budget(dec!(0), &items).unwrap(), dec!(0));
    }

    #[test]
    fn test_overflow_is_reported() {
        let items = vec![
            ItemInput::new("Huge", i32::MAX, Decimal::MAX / dec!(2)),
            ItemInput::new("Huge", i32::MAX, Decimal::MAX / dec!(2)),
        ];
        assert!(items_total(&items).is_none());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(31.5)), "31.50");
        assert_eq!(format_amount(dec!(7)), "7.00");
        assert_eq!(format_amount(dec!(1.005)), "1.00");
    }
}
