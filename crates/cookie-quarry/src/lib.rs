pub mod binary;
pub mod chromium;
pub mod error;
pub mod locate;
pub mod query;
pub mod safari;
pub mod sqlite;
pub mod strategy;
pub mod types;
pub mod util;

pub use chromium::variants::ChromiumVariant;
pub use query::{query_cookies, query_with_strategy};
pub use strategy::{
    ChromiumStrategy, CompositeStrategy, FirefoxStrategy, MockStrategy, SafariStrategy, Strategy,
};
pub use types::{
    BrowserTag, CookieFlags, CookieMeta, CookieQuery, CookieSpec, ExportedCookie, Expiry,
    QueryOptions, RawCookie,
};
