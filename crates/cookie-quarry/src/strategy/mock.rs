//! Fixed-record strategy used in tests and as an embedding seam. The
//! records are filtered with the same wildcard rules as every other
//! strategy.

use crate::types::{CookieQuery, ExportedCookie};
use crate::util::matching::{domain_matches, name_matches};

#[derive(Debug, Clone, Default)]
pub struct MockStrategy {
    pub cookies: Vec<ExportedCookie>,
}

impl MockStrategy {
    pub fn new(cookies: Vec<ExportedCookie>) -> Self {
        Self { cookies }
    }

    pub async fn query_cookies(&self, query: &CookieQuery) -> Vec<ExportedCookie> {
        self.cookies
            .iter()
            .filter(|c| name_matches(&query.name, &c.name))
            .filter(|c| domain_matches(&query.domain, &c.domain))
            .cloned()
            .collect()
    }
}
