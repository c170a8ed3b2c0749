//! Request option types for Knack list operations.
//!
//! # Design
//! Options are transient request-shaping values. `RequestOptions::to_query`
//! flattens them into query pairs; `filters` is JSON-encoded into a single
//! string parameter because query strings cannot carry nested structures.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Direction of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    pub sort_field: String,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationOptions {
    pub rows_per_page: NonZeroU32,
    pub page: NonZeroU32,
}

/// How filter rules combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    And,
    Or,
}

/// A single field/operator/value predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterRule {
    pub field: String,
    pub operator: String,
    pub value: serde_json::Value,
}

impl FilterRule {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(rename = "match")]
    pub match_mode: MatchMode,
    pub rules: Vec<FilterRule>,
}

impl FilterOptions {
    /// Records must satisfy every rule.
    pub fn all(rules: Vec<FilterRule>) -> Self {
        Self {
            match_mode: MatchMode::And,
            rules,
        }
    }

    /// Records must satisfy at least one rule.
    pub fn any(rules: Vec<FilterRule>) -> Self {
        Self {
            match_mode: MatchMode::Or,
            rules,
        }
    }
}

/// Sorting, paging, and filtering for a list request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub sort: Option<SortOptions>,
    pub pagination: Option<PaginationOptions>,
    pub filters: Option<FilterOptions>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some(SortOptions {
            sort_field: field.into(),
            sort_order: order,
        });
        self
    }

    pub fn paginate(mut self, rows_per_page: NonZeroU32, page: NonZeroU32) -> Self {
        self.pagination = Some(PaginationOptions { rows_per_page, page });
        self
    }

    pub fn filters(mut self, filters: FilterOptions) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Query pairs in the order `sort_field`, `sort_order`, `rows_per_page`,
    /// `page`, `filters`. Absent options contribute nothing.
    pub fn to_query(&self) -> Result<Vec<(String, String)>, ApiError> {
        let mut query = Vec::new();
        if let Some(sort) = &self.sort {
            query.push(("sort_field".to_string(), sort.sort_field.clone()));
            query.push(("sort_order".to_string(), sort.sort_order.as_str().to_string()));
        }
        if let Some(pagination) = &self.pagination {
            query.push(("rows_per_page".to_string(), pagination.rows_per_page.to_string()));
            query.push(("page".to_string(), pagination.page.to_string()));
        }
        if let Some(filters) = &self.filters {
            let encoded = serde_json::to_string(filters).map_err(|e| ApiError::Serialization(e.to_string()))?;
            query.push(("filters".to_string(), encoded));
        }
        Ok(query)
    }
}

/// Query pairs for an optional set of list options; `None` yields an empty list.
pub(crate) fn list_query(options: Option<&RequestOptions>) -> Result<Vec<(String, String)>, ApiError> {
    options.map_or_else(|| Ok(Vec::new()), RequestOptions::to_query)
}
