// src/models/pagination.rs
// DOCUMENTATION: Page-number pagination for list endpoints
// PURPOSE: Parse ?page=&limit= and build {count, next, previous, results}

use serde::Serialize;

use crate::errors::FoodgramError;

pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolved page request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    /// 1-based page number
    pub page: i64,
    pub limit: i64,
}

impl PageQuery {
    /// Read `page` and `limit` from decoded query pairs
    pub fn from_pairs(pairs: &[(String, String)], default_limit: i64) -> Result<Self, FoodgramError> {
        let mut page = 1;
        let mut limit = default_limit;
        for (key, value) in pairs {
            match key.as_str() {
                "page" => {
                    page = value
                        .trim()
                        .parse::<i64>()
                        .ok()
                        .filter(|p| *p >= 1)
                        .ok_or_else(|| FoodgramError::NotFound("Page".to_string()))?;
                }
                "limit" => {
                    if let Ok(l) = value.trim().parse::<i64>() {
                        if l >= 1 {
                            limit = l.min(MAX_PAGE_SIZE);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(PageQuery { page, limit })
    }

    /// Saturates instead of overflowing for absurd page numbers
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Pages after the last one are 404; page 1 of an empty list is fine
    pub fn ensure_in_range(&self, count: i64) -> Result<(), FoodgramError> {
        if self.page > 1 && self.offset() >= count {
            return Err(FoodgramError::NotFound("Page".to_string()));
        }
        Ok(())
    }
}

/// Paginated response body
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of results
    /// DOCUMENTATION: `base_url` is scheme://host/path, `raw_query` the untouched query string
    pub fn new(results: Vec<T>, count: i64, query: PageQuery, base_url: &str, raw_query: &str) -> Self {
        let has_next = query.page.saturating_mul(query.limit) < count;
        let next = has_next.then(|| page_link(base_url, raw_query, Some(query.page + 1)));
        let previous = match query.page {
            1 => None,
            // Page one is linked without a page parameter
            2 => Some(page_link(base_url, raw_query, None)),
            p => Some(page_link(base_url, raw_query, Some(p - 1))),
        };
        Page {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Rebuild the request URL with `page` replaced, keeping every other parameter
pub fn page_link(base_url: &str, raw_query: &str, page: Option<i64>) -> String {
    let mut params: Vec<String> = raw_query
        .split('&')
        .filter(|p| !p.is_empty())
        .filter(|p| p.split('=').next() != Some("page"))
        .map(str::to_string)
        .collect();
    if let Some(page) = page {
        params.push(format!("page={}", page));
    }
    if params.is_empty() {
        base_url.to_string()
    } else {
        format!("{}?{}", base_url, params.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_page_query_defaults_and_cap() {
        let q = PageQuery::from_pairs(&[], 6).unwrap();
        assert_eq!(q, PageQuery { page: 1, limit: 6 });

        let q = PageQuery::from_pairs(&pairs(&[("page", "3"), ("limit", "1000")]), 6).unwrap();
        assert_eq!(q, PageQuery { page: 3, limit: MAX_PAGE_SIZE });
        assert_eq!(q.offset(), 200);

        let q = PageQuery::from_pairs(&pairs(&[("limit", "zero")]), 6).unwrap();
        assert_eq!(q.limit, 6);
    }

    #[test]
    fn test_invalid_page_is_not_found() {
        assert!(PageQuery::from_pairs(&pairs(&[("page", "0")]), 6).is_err());
        assert!(PageQuery::from_pairs(&pairs(&[("page", "last")]), 6).is_err());
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let q = PageQuery::from_pairs(&pairs(&[("page", "9223372036854775807")]), 6).unwrap();
        assert_eq!(q.offset(), i64::MAX);
        assert!(q.ensure_in_range(20).is_err());

        let page: Page<i32> = Page::new(
            vec![],
            20,
            PageQuery { page: i64::MAX / 2, limit: 6 },
            "http://localhost/api/recipes/",
            "",
        );
        assert!(page.next.is_none());
        assert!(page.previous.is_some());
    }

    #[test]
    fn test_page_range() {
        let q = |page| PageQuery { page, limit: 6 };
        assert!(q(1).ensure_in_range(0).is_ok());
        assert!(q(2).ensure_in_range(7).is_ok());
        assert!(q(2).ensure_in_range(6).is_err());
        assert!(q(4).ensure_in_range(7).is_err());
    }

    #[test]
    fn test_links_keep_other_params() {
        let base = "http://localhost/api/recipes/";
        let query = PageQuery { page: 2, limit: 6 };
        let page: Page<i32> = Page::new(
            vec![1, 2, 3, 4, 5, 6],
            20,
            query,
            base,
            "tags=lunch&page=2&tags=dinner&limit=6",
        );

        assert_eq!(page.count, 20);
        assert_eq!(
            page.next.as_deref(),
            Some("http://localhost/api/recipes/?tags=lunch&tags=dinner&limit=6&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://localhost/api/recipes/?tags=lunch&tags=dinner&limit=6")
        );
    }

    #[test]
    fn test_links_at_edges() {
        let base = "http://localhost/api/users/";
        let first: Page<i32> = Page::new(vec![1], 1, PageQuery { page: 1, limit: 6 }, base, "");
        assert!(first.next.is_none());
        assert!(first.previous.is_none());

        let last: Page<i32> = Page::new(vec![1], 13, PageQuery { page: 3, limit: 6 }, base, "page=3");
        assert!(last.next.is_none());
        assert_eq!(last.previous.as_deref(), Some("http://localhost/api/users/?page=2"));
    }
}
