//! Parallel fan-out over an ordered list of child strategies. Children
//! run concurrently; results are concatenated in construction order. A
//! child that overruns its timeout contributes nothing.

use std::time::Duration;

use futures::future::join_all;
use tracing::warn;

use crate::chromium::variants::ChromiumVariant;
use crate::types::{CookieQuery, ExportedCookie};

use super::{ChromiumStrategy, FirefoxStrategy, SafariStrategy, Strategy};

pub const DEFAULT_CHILD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct CompositeStrategy {
    children: Vec<Strategy>,
    child_timeout: Duration,
}

impl CompositeStrategy {
    pub fn new(children: Vec<Strategy>) -> Self {
        Self {
            children,
            child_timeout: DEFAULT_CHILD_TIMEOUT,
        }
    }

    pub fn with_child_timeout(mut self, timeout: Duration) -> Self {
        self.child_timeout = timeout;
        self
    }

    /// Every supported browser in deterministic order: the Chromium
    /// family, then Firefox, then Safari.
    pub fn all() -> Self {
        let mut children: Vec<Strategy> = ChromiumVariant::ALL
            .into_iter()
            .map(|variant| Strategy::Chromium(ChromiumStrategy::new(variant)))
            .collect();
        children.push(Strategy::Firefox(FirefoxStrategy::new()));
        children.push(Strategy::Safari(SafariStrategy::new()));
        Self::new(children)
    }

    pub fn children(&self) -> &[Strategy] {
        &self.children
    }

    pub async fn query_cookies(&self, query: &CookieQuery) -> Vec<ExportedCookie> {
        let runs = self.children.iter().enumerate().map(|(index, child)| {
            let timeout = self.child_timeout;
            async move {
                match tokio::time::timeout(timeout, child.query_cookies(query)).await {
                    Ok(cookies) => cookies,
                    Err(_) => {
                        warn!(
                            child = index,
                            ?timeout,
                            "child strategy timed out, discarding its results"
                        );
                        Vec::new()
                    }
                }
            }
        });

        join_all(runs).await.into_iter().flatten().collect()
    }
}
