//! Query translation: raw query-string parameters into a typed
//! filter/sort/projection/pagination specification.
//!
//! Reserved keys (`select`, `sort`, `page`, `limit`, and the reservation
//! date-range pair) never reach the filter set. Everything else becomes a
//! `Filter` with a closed operator enum; store adapters map filter fields to
//! entity columns and drop the ones they do not know.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sea_orm::{ColumnTrait, Condition, Order, Value};
use serde::Serialize;
use uuid::Uuid;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 25;

const RESERVED_KEYS: &[&str] = &["select", "sort", "page", "limit", "startDate", "endDate"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

/// Typed filter value. Raw parameter text is coerced in order: integer,
/// float, boolean, UUID, RFC3339 datetime, else plain text.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Bool(bool),
    Uuid(Uuid),
    DateTime(DateTime<FixedOffset>),
    Text(String),
}

impl Scalar {
    pub fn parse(raw: &str) -> Self {
        if let Ok(v) = raw.parse::<i64>() {
            return Scalar::Int(v);
        }
        if let Ok(v) = raw.parse::<f64>() {
            return Scalar::Float(v);
        }
        if let Ok(v) = raw.parse::<bool>() {
            return Scalar::Bool(v);
        }
        if let Ok(v) = raw.parse::<Uuid>() {
            return Scalar::Uuid(v);
        }
        if let Ok(v) = DateTime::parse_from_rfc3339(raw) {
            return Scalar::DateTime(v);
        }
        Scalar::Text(raw.to_string())
    }

    fn to_value(&self) -> Value {
        match self {
            Scalar::Int(v) => (*v).into(),
            Scalar::Float(v) => (*v).into(),
            Scalar::Bool(v) => (*v).into(),
            Scalar::Uuid(v) => (*v).into(),
            Scalar::DateTime(v) => (*v).into(),
            Scalar::Text(v) => v.clone().into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub values: Vec<Scalar>,
}

/// Parsed list-query specification.
#[derive(Clone, Debug)]
pub struct ListParams {
    pub filters: Vec<Filter>,
    pub select: Option<Vec<String>>,
    pub sort: Vec<(String, Order)>,
    pub page: u64,
    pub limit: u64,
}

impl ListParams {
    pub fn from_query(raw: &HashMap<String, String>) -> Self {
        let mut filters = Vec::new();
        for (key, value) in raw {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let (field, op) = split_operator(key);
            let values = if op == FilterOp::In {
                value.split(',').map(|v| Scalar::parse(v.trim())).collect()
            } else {
                vec![Scalar::parse(value)]
            };
            filters.push(Filter { field, op, values });
        }
        // HashMap iteration order is unstable
        filters.sort_by(|a, b| a.field.cmp(&b.field));

        let select = raw.get("select").map(|s| {
            s.split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect()
        });
        let sort = raw.get("sort").map(|s| parse_sort(s)).unwrap_or_default();
        let page = parse_positive(raw.get("page")).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(raw.get("limit")).unwrap_or(DEFAULT_LIMIT);

        Self { filters, select, sort, page, limit }
    }

    /// Zero-based row offset for the current page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// `price[gte]` -> (`price`, Gte). Unknown bracketed suffixes fall back to
/// equality on the literal key.
fn split_operator(key: &str) -> (String, FilterOp) {
    if let (Some(open), true) = (key.find('['), key.ends_with(']')) {
        let op = match &key[open + 1..key.len() - 1] {
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        };
        if let Some(op) = op {
            return (key[..open].to_string(), op);
        }
    }
    (key.to_string(), FilterOp::Eq)
}

/// `sort=a,-b` -> [(a, Asc), (b, Desc)].
fn parse_sort(raw: &str) -> Vec<(String, Order)> {
    raw.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            match part.strip_prefix('-') {
                Some(field) => Some((field.to_string(), Order::Desc)),
                None => Some((part.to_string(), Order::Asc)),
            }
        })
        .collect()
}

fn parse_positive(raw: Option<&String>) -> Option<u64> {
    raw.and_then(|v| v.parse::<u64>().ok()).filter(|v| *v > 0)
}

/// Turn filters into a sea-orm condition; unknown fields are dropped by the
/// per-entity column mapping.
pub fn build_condition<C: ColumnTrait>(
    filters: &[Filter],
    column_for: impl Fn(&str) -> Option<C>,
) -> Condition {
    let mut cond = Condition::all();
    for filter in filters {
        let Some(col) = column_for(&filter.field) else { continue };
        let Some(first) = filter.values.first() else { continue };
        cond = match filter.op {
            FilterOp::Eq => cond.add(col.eq(first.to_value())),
            FilterOp::Gt => cond.add(col.gt(first.to_value())),
            FilterOp::Gte => cond.add(col.gte(first.to_value())),
            FilterOp::Lt => cond.add(col.lt(first.to_value())),
            FilterOp::Lte => cond.add(col.lte(first.to_value())),
            FilterOp::In => cond.add(col.is_in(filter.values.iter().map(Scalar::to_value))),
        };
    }
    cond
}

/// Inclusive date-range bounds from `startDate`/`endDate`, expressed as
/// filters on the given field. Accepts RFC3339 or `YYYY-MM-DD` (midnight
/// UTC). Admin reservation listing only.
pub fn date_range_filters(
    raw: &HashMap<String, String>,
    field: &str,
) -> Result<Vec<Filter>, String> {
    let mut filters = Vec::new();
    for (key, op) in [("startDate", FilterOp::Gte), ("endDate", FilterOp::Lte)] {
        if let Some(value) = raw.get(key) {
            let bound = parse_date_bound(value).ok_or_else(|| format!("invalid {}", key))?;
            filters.push(Filter {
                field: field.to_string(),
                op,
                values: vec![Scalar::DateTime(bound)],
            });
        }
    }
    Ok(filters)
}

fn parse_date_bound(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let date = raw.parse::<NaiveDate>().ok()?;
    let dt = DateTime::<Utc>::from_naive_utc_and_offset(date.and_hms_opt(0, 0, 0)?, Utc);
    Some(dt.into())
}

/// Field projection on a serialized record; identity is always retained.
pub fn apply_select(record: &mut serde_json::Value, fields: &[String]) {
    if let serde_json::Value::Object(map) = record {
        map.retain(|key, _| key == "id" || fields.iter().any(|f| f == key));
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Pagination links for the response envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PageLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl PageLinks {
    /// `next` exists iff page*limit < total; `prev` iff page > 1.
    pub fn build(page: u64, limit: u64, total: u64) -> Self {
        let next =
            (page * limit < total).then_some(PageRef { page: page + 1, limit });
        let prev = (page > 1).then_some(PageRef { page: page - 1, limit });
        Self { next, prev }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn operator_keys_are_rewritten() {
        let params =
            ListParams::from_query(&raw(&[("price[gte]", "100"), ("price[lte]", "300")]));
        assert_eq!(params.filters.len(), 2);
        assert!(params.filters.iter().all(|f| f.field == "price"));
        let pairs: Vec<_> =
            params.filters.iter().map(|f| (f.op, f.values.clone())).collect();
        assert!(pairs.contains(&(FilterOp::Gte, vec![Scalar::Int(100)])));
        assert!(pairs.contains(&(FilterOp::Lte, vec![Scalar::Int(300)])));
    }

    #[test]
    fn plain_keys_are_equality_filters() {
        let params = ListParams::from_query(&raw(&[("area", "back")]));
        assert_eq!(params.filters.len(), 1);
        assert_eq!(params.filters[0].op, FilterOp::Eq);
        assert_eq!(params.filters[0].values, vec![Scalar::Text("back".into())]);
    }

    #[test]
    fn unknown_operator_suffix_falls_back_to_literal_key() {
        let params = ListParams::from_query(&raw(&[("price[near]", "100")]));
        assert_eq!(params.filters[0].field, "price[near]");
        assert_eq!(params.filters[0].op, FilterOp::Eq);
    }

    #[test]
    fn in_operator_splits_commas() {
        let params = ListParams::from_query(&raw(&[("status[in]", "pending,confirmed")]));
        assert_eq!(params.filters[0].op, FilterOp::In);
        assert_eq!(
            params.filters[0].values,
            vec![Scalar::Text("pending".into()), Scalar::Text("confirmed".into())]
        );
    }

    #[test]
    fn reserved_keys_never_become_filters() {
        let params = ListParams::from_query(&raw(&[
            ("select", "name,price"),
            ("sort", "-price,name"),
            ("page", "2"),
            ("limit", "10"),
            ("startDate", "2026-01-01"),
            ("endDate", "2026-02-01"),
        ]));
        assert!(params.filters.is_empty());
        assert_eq!(params.select, Some(vec!["name".to_string(), "price".to_string()]));
        assert_eq!(
            params.sort,
            vec![("price".to_string(), Order::Desc), ("name".to_string(), Order::Asc)]
        );
        assert_eq!(params.page, 2);
        assert_eq!(params.limit, 10);
        assert_eq!(params.offset(), 10);
    }

    #[test]
    fn malformed_page_and_limit_fall_back_to_defaults() {
        let params = ListParams::from_query(&raw(&[("page", "abc"), ("limit", "0")]));
        assert_eq!(params.page, DEFAULT_PAGE);
        assert_eq!(params.limit, DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn scalar_coercion_order() {
        assert_eq!(Scalar::parse("42"), Scalar::Int(42));
        assert_eq!(Scalar::parse("1.5"), Scalar::Float(1.5));
        assert_eq!(Scalar::parse("true"), Scalar::Bool(true));
        assert!(matches!(Scalar::parse("2026-03-01T10:00:00Z"), Scalar::DateTime(_)));
        let id = Uuid::new_v4();
        assert_eq!(Scalar::parse(&id.to_string()), Scalar::Uuid(id));
        assert_eq!(Scalar::parse("back"), Scalar::Text("back".into()));
    }

    #[test]
    fn date_range_bounds() {
        let filters = date_range_filters(
            &raw(&[("startDate", "2026-01-01"), ("endDate", "2026-02-01T18:30:00Z")]),
            "resvDate",
        )
        .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].op, FilterOp::Gte);
        assert_eq!(filters[1].op, FilterOp::Lte);
        assert!(filters.iter().all(|f| f.field == "resvDate"));

        assert!(date_range_filters(&raw(&[("startDate", "not-a-date")]), "resvDate").is_err());
    }

    #[test]
    fn select_projection_keeps_identity() {
        let mut record = serde_json::json!({
            "id": "abc", "name": "Thai Bliss", "price": 900, "sessions": 2
        });
        apply_select(&mut record, &["name".to_string(), "price".to_string()]);
        assert_eq!(
            record,
            serde_json::json!({"id": "abc", "name": "Thai Bliss", "price": 900})
        );
    }

    #[test]
    fn page_links_boundaries() {
        // 25 records, limit 10: page 1 -> next only, page 2 -> both, page 3 -> prev only
        assert_eq!(
            PageLinks::build(1, 10, 25),
            PageLinks { next: Some(PageRef { page: 2, limit: 10 }), prev: None }
        );
        assert_eq!(
            PageLinks::build(2, 10, 25),
            PageLinks {
                next: Some(PageRef { page: 3, limit: 10 }),
                prev: Some(PageRef { page: 1, limit: 10 })
            }
        );
        assert_eq!(
            PageLinks::build(3, 10, 25),
            PageLinks { next: None, prev: Some(PageRef { page: 2, limit: 10 }) }
        );
        // exactly page*limit == total -> no next
        assert_eq!(PageLinks::build(2, 10, 20).next, None);
    }
}
