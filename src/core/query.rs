//! Pagination parameters for list endpoints

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

/// A 1-indexed window over an ordered collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    /// Build a page; zero values are raised to 1
    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Number of items before this window
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// False for a page built with a zero `page` or `limit`, which selects nothing
    pub fn is_selectable(&self) -> bool {
        self.page >= 1 && self.limit >= 1
    }
}

impl Default for Page {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Pagination defaults and bounds for list endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_limits"))]
pub struct PaginationConfig {
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    pub default_page: usize,

    #[serde(default = "default_limit")]
    #[validate(range(min = 1))]
    pub default_limit: usize,

    #[serde(default = "default_max_limit")]
    #[validate(range(min = 1))]
    pub max_limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

fn default_max_limit() -> usize {
    100
}

fn validate_limits(config: &PaginationConfig) -> Result<(), ValidationError> {
    if config.default_limit > config.max_limit {
        return Err(ValidationError::new("default_limit_exceeds_max_limit"));
    }
    Ok(())
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: default_page(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl PaginationConfig {
    /// Read `page` and `limit` from query parameters
    ///
    /// Missing, non-numeric or non-positive values fall back to the defaults;
    /// `limit` is clamped to `max_limit`.
    pub fn page_from_query(&self, query: &HashMap<String, String>) -> Page {
        let read = |name: &str, default: usize| {
            query
                .get(name)
                .and_then(|raw| raw.trim().parse::<usize>().ok())
                .filter(|value| *value >= 1)
                .unwrap_or(default)
        };

        let page = read("page", self.default_page);
        let limit = read("limit", self.default_limit).min(self.max_limit);
        Page::new(page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(Page::new(1, 10).offset(), 0);
        assert_eq!(Page::new(3, 5).offset(), 10);
    }

    #[test]
    fn test_page_new_raises_zero() {
        assert_eq!(Page::new(0, 0), Page { page: 1, limit: 1 });
    }

    #[test]
    fn test_zero_page_is_not_selectable() {
        let page = Page { page: 0, limit: 10 };
        assert_eq!(page.offset(), 0);
        assert!(!page.is_selectable());
        assert!(!Page { page: 1, limit: 0 }.is_selectable());
        assert!(Page::default().is_selectable());
    }

    #[test]
    fn test_defaults_when_absent() {
        let config = PaginationConfig::default();
        assert_eq!(config.page_from_query(&query(&[])), Page::default());
    }

    #[test]
    fn test_reads_numeric_values() {
        let config = PaginationConfig::default();
        let page = config.page_from_query(&query(&[("page", "2"), ("limit", "25")]));
        assert_eq!(page, Page::new(2, 25));
    }

    #[test]
    fn test_non_numeric_values_fall_back() {
        let config = PaginationConfig::default();
        let page = config.page_from_query(&query(&[("page", "abc"), ("limit", "1.5")]));
        assert_eq!(page, Page::new(1, 10));

        let page = config.page_from_query(&query(&[("page", "-3"), ("limit", "0")]));
        assert_eq!(page, Page::new(1, 10));
    }

    #[test]
    fn test_limit_is_clamped() {
        let config = PaginationConfig::default();
        let page = config.page_from_query(&query(&[("limit", "5000")]));
        assert_eq!(page.limit, 100);
    }

    #[test]
    fn test_validate_rejects_default_above_max() {
        let config = PaginationConfig {
            default_limit: 500,
            ..PaginationConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(PaginationConfig::default().validate().is_ok());
    }
}
