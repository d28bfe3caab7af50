//! Submission input - canonical request header and line items, plus the boundary form.
//!
//! Older clients send `purpose` instead of `note`, `item` instead of `items`, and item
//! rows keyed `details`/`price` instead of `item_name`/`unit_price`. [`PurchaseRequestForm`]
//! accepts both spellings and [`PurchaseRequestForm::normalize`] collapses them into the
//! canonical [`RequestHeader`] and [`ItemInput`] values the workflow operates on.

use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

const MAX_TITLE_LEN: usize = 255;
const MAX_NOTE_LEN: usize = 1000;
const MAX_ITEM_NAME_LEN: usize = 500;
const MAX_ITEM_PURPOSE_LEN: usize = 500;
const MAX_ITEM_CODE_LEN: usize = 100;
const MAX_UNIT_LEN: usize = 50;

/// Header fields of a purchase request as submitted by the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub title: String,
    pub note: Option<String>,
    pub budget: Decimal,
    pub type_procurement_id: i64,
    pub file_reference_id: i64,
    pub vot_id: i64,
    /// Location scope; `None` keeps the current value (or the owner's default on create)
    pub location_iso_code: Option<String>,
}

/// One proposed line item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemInput {
    pub item_name: String,
    pub item_code: Option<String>,
    pub purpose: Option<String>,
    pub unit: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    /// Explicit override; derived as `quantity * unit_price` when absent
    pub total_price: Option<Decimal>,
}

impl ItemInput {
    /// Convenience constructor for an item without optional details.
    pub fn new(item_name: impl Into<String>, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            item_name: item_name.into(),
            item_code: None,
            purpose: None,
            unit: None,
            quantity,
            unit_price,
            total_price: None,
        }
    }

    /// `quantity * unit_price`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.unit_price)
    }

    /// The total to persist: the explicit override if given, otherwise the line total.
    pub fn resolved_total(&self) -> Option<Decimal> {
        self.total_price.or_else(|| self.line_total())
    }
}

/// Trims and uppercases a location scope tag.
#[must_use]
pub fn normalize_location(code: &str) -> String {
    code.trim().to_uppercase()
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::validation(
            field,
            format!("Must not be longer than {max} characters."),
        ));
    }
    Ok(())
}

fn check_optional_len(field: &str, value: Option<&String>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |value| check_len(field, value, max))
}

/// Validates field shape and limits of a submission. Budget rules live in
/// [`crate::core::budget`].
pub fn validate_submission(header: &RequestHeader, items: &[ItemInput]) -> Result<()> {
    if header.title.trim().is_empty() {
        return Err(Error::validation("title", "The title field is required."));
    }
    check_len("title", &header.title, MAX_TITLE_LEN)?;
    check_optional_len("note", header.note.as_ref(), MAX_NOTE_LEN)?;

    if header.budget < Decimal::ZERO {
        return Err(Error::validation("budget", "The budget must be at least 0."));
    }

    if items.is_empty() {
        return Err(Error::validation("items", "At least one item is required."));
    }

    for (index, item) in items.iter().enumerate() {
        let field = |name: &str| format!("items.{index}.{name}");

        if item.item_name.trim().is_empty() {
            return Err(Error::validation(field("item_name"), "The item name is required."));
        }
        check_len(&field("item_name"), &item.item_name, MAX_ITEM_NAME_LEN)?;
        check_optional_len(&field("item_code"), item.item_code.as_ref(), MAX_ITEM_CODE_LEN)?;
        check_optional_len(&field("purpose"), item.purpose.as_ref(), MAX_ITEM_PURPOSE_LEN)?;
        check_optional_len(&field("unit"), item.unit.as_ref(), MAX_UNIT_LEN)?;

        if item.quantity < 1 {
            return Err(Error::validation(field("quantity"), "The quantity must be at least 1."));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(Error::validation(field("unit_price"), "The price must be at least 0."));
        }
        if item.total_price.is_some_and(|total| total < Decimal::ZERO) {
            return Err(Error::validation(
                field("total_price"),
                "The total price must not be negative.",
            ));
        }
        if item.line_total().is_none() {
            return Err(Error::validation(field("unit_price"), "The item total is too large."));
        }
    }

    Ok(())
}

/// Request form as posted by clients, including legacy field names
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseRequestForm {
    pub title: String,
    pub type_procurement_id: i64,
    pub file_reference_id: i64,
    pub vot_id: i64,
    pub budget: Decimal,
    #[serde(default)]
    pub note: Option<String>,
    /// Legacy name for `note`
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub location_iso_code: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<ItemForm>>,
    /// Legacy name for `items`
    #[serde(default)]
    pub item: Option<Vec<ItemForm>>,
}

/// Item row as posted by clients, including legacy field names
#[derive(Debug, Clone, Deserialize)]
pub struct ItemForm {
    #[serde(default)]
    pub item_name: Option<String>,
    /// Legacy name for `item_name`
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub item_code: Option<String>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    /// Legacy name for `unit_price`
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ItemForm {
    fn normalize(self, index: usize) -> Result<ItemInput> {
        let unit_price = self.unit_price.or(self.price).ok_or_else(|| {
            Error::validation(format!("items.{index}.unit_price"), "The price is required.")
        })?;

        Ok(ItemInput {
            item_name: non_empty(self.item_name.or(self.details)).unwrap_or_default(),
            item_code: non_empty(self.item_code),
            purpose: non_empty(self.purpose),
            unit: non_empty(self.unit),
            quantity: self.quantity,
            unit_price,
            total_price: self.total_price,
        })
    }
}

impl PurchaseRequestForm {
    /// Collapses legacy aliases into canonical fields. The canonical spelling wins when
    /// both are present.
    pub fn normalize(self) -> Result<(RequestHeader, Vec<ItemInput>)> {
        let rows = self.items.or(self.item).unwrap_or_default();
        let items = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| row.normalize(index))
            .collect::<Result<Vec<_>>>()?;

        let header = RequestHeader {
            title: self.title.trim().to_string(),
            note: non_empty(self.note).or_else(|| non_empty(self.purpose)),
            budget: self.budget,
            type_procurement_id: self.type_procurement_id,
            file_reference_id: self.file_reference_id,
            vot_id: self.vot_id,
            location_iso_code: non_empty(self.location_iso_code).map(|c| normalize_location(&c)),
        };

        Ok((header, items))
    }
}
