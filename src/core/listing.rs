//! Paginated request listing for the employee and approver views.

use crate::{
    core::status::RequestStatus,
    entities::{PurchaseRequest, purchase_request},
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate, NaiveTime};
use sea_orm::{Condition, Order, QueryOrder, Select, prelude::*};
use tracing::debug;

pub const DEFAULT_PER_PAGE: u64 = 10;
pub const MAX_PER_PAGE: u64 = 100;

/// Which workflow states to include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    One(RequestStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Budget,
    SubmittedAt,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

/// Filter, sort and page parameters for [`list_purchase_requests`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Restrict to one owner (employee view); `None` lists everyone's requests
    pub owner: Option<i64>,
    pub status: StatusFilter,
    pub search: Option<String>,
    /// Inclusive bounds on the submission date (UTC)
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub sort_by: SortField,
    pub sort_dir: SortDir,
    /// 1-based
    pub page: u64,
    pub per_page: u64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            owner: None,
            status: StatusFilter::One(RequestStatus::Pending),
            search: None,
            from_date: None,
            to_date: None,
            sort_by: SortField::SubmittedAt,
            sort_dir: SortDir::Desc,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    /// Default query scoped to one owner.
    pub fn for_owner(owner_id: i64) -> Self {
        Self {
            owner: Some(owner_id),
            ..Self::default()
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Rows matching the filters across all pages
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    pub const fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page)
    }
}

fn search_condition(term: &str) -> Condition {
    let mut condition = Condition::any()
        .add(purchase_request::Column::Title.contains(term))
        .add(purchase_request::Column::Note.contains(term))
        .add(purchase_request::Column::PurchaseRefNo.contains(term));

    let digits = term.strip_prefix('#').unwrap_or(term);
    if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(id) = digits.parse::<i64>() {
            condition = condition.add(purchase_request::Column::Id.eq(id));
        }
    }
    condition
}

fn build_select(query: &ListQuery) -> Result<Select<PurchaseRequest>> {
    let mut select =
        PurchaseRequest::find().filter(purchase_request::Column::DeletedAt.is_null());

    if let Some(owner) = query.owner {
        select = select.filter(purchase_request::Column::UserId.eq(owner));
    }
    if let StatusFilter::One(status) = query.status {
        select = select.filter(purchase_request::Column::StatusId.eq(status.id()));
    }
    if let Some(term) = query.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        select = select.filter(search_condition(term));
    }

    if let (Some(from), Some(to)) = (query.from_date, query.to_date) {
        if from > to {
            return Err(Error::validation(
                "to_date",
                "The end date must be on or after the start date.",
            ));
        }
    }
    if let Some(from) = query.from_date {
        let start = from.and_time(NaiveTime::MIN).and_utc();
        select = select.filter(purchase_request::Column::SubmittedAt.gte(start));
    }
    if let Some(end) = query.to_date.and_then(|to| to.checked_add_days(Days::new(1))) {
        let end = end.and_time(NaiveTime::MIN).and_utc();
        select = select.filter(purchase_request::Column::SubmittedAt.lt(end));
    }

    let column = match query.sort_by {
        SortField::Id => purchase_request::Column::Id,
        SortField::Title => purchase_request::Column::Title,
        SortField::Budget => purchase_request::Column::Budget,
        SortField::SubmittedAt => purchase_request::Column::SubmittedAt,
        SortField::Status => purchase_request::Column::StatusId,
    };
    let order = match query.sort_dir {
        SortDir::Asc => Order::Asc,
        SortDir::Desc => Order::Desc,
    };
    // Tie-break on id so pages are stable
    Ok(select
        .order_by(column, order.clone())
        .order_by(purchase_request::Column::Id, order))
}

/// Lists live requests matching `query`, one page at a time.
///
/// Out-of-range `page` values return an empty page; `per_page` is clamped to 1..=100.
pub async fn list_purchase_requests(
    db: &DatabaseConnection,
    query: &ListQuery,
) -> Result<Page<purchase_request::Model>> {
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, MAX_PER_PAGE);

    let paginator = build_select(query)?.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;

    debug!(total, page, per_page, "Listed purchase requests");
    Ok(Page {
        items,
        total,
        page,
        per_page,
    })
}
