//! Offset pagination with total counts and page links.
//!
//! The window is cumulative: page `p` of size `n` asks for
//! `LIMIT n*p OFFSET (p-1)*n`, so page `p` returns up to `n*p` rows.

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{QueryError, QueryResult};
use crate::model::{DataRow, Schema};
use crate::sql::Query;
use crate::store::Store;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 2500;

/// Requested page and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    page: u64,
    per_page: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageParams {
    /// Validate and build; pages start at 1.
    pub fn new(page: u64, per_page: u64) -> QueryResult<Self> {
        if page < 1 {
            return Err(QueryError::InvalidPagination(format!(
                "page must be at least 1, got {}",
                page
            )));
        }
        Ok(Self { page, per_page })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page.saturating_mul(self.page)
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Number of pages for `count` rows. Never less than 1.
    pub fn pages_for(&self, count: u64) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        let quotient = count / self.per_page;
        if count % self.per_page == 0 {
            quotient.max(1)
        } else {
            quotient + 1
        }
    }

    /// `(next_page, previous_page)` links for a result with `pages` pages.
    pub fn links(&self, pages: u64, request_url: &Url) -> (Option<String>, Option<String>) {
        let next = (self.page < pages).then(|| with_page(request_url, self.page + 1));
        let previous = (self.page != 1 && self.page <= pages + 1)
            .then(|| with_page(request_url, self.page - 1));
        (next, previous)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub count: u64,
    pub pages: u64,
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
    pub items: Vec<T>,
}

/// Count the unbounded query, then fetch the window for `params`.
pub fn paginate(
    store: &Store,
    schema: &Schema,
    query: &Query,
    params: &PageParams,
    request_url: &Url,
) -> QueryResult<Page<DataRow>> {
    let count = store.count(&query.unbounded())?;
    let pages = params.pages_for(count);
    let (next_page, previous_page) = params.links(pages, request_url);

    let window = query
        .unbounded()
        .limit(params.limit())
        .offset(params.offset());
    let items = store.fetch_rows(&window, schema)?;

    debug!(
        count,
        pages,
        page = params.page(),
        returned = items.len(),
        "paginated"
    );

    Ok(Page {
        count,
        pages,
        next_page,
        previous_page,
        items,
    })
}

/// `url` with its `page` parameter set to `page`, other parameters kept in
/// place.
fn with_page(url: &Url, page: u64) -> String {
    let page = page.to_string();
    let mut replaced = false;
    let mut pairs: Vec<(String, String)> = Vec::new();

    for (key, value) in url.query_pairs() {
        if key == "page" {
            if !replaced {
                pairs.push(("page".to_string(), page.clone()));
                replaced = true;
            }
        } else {
            pairs.push((key.into_owned(), value.into_owned()));
        }
    }
    if !replaced {
        pairs.push(("page".to_string(), page));
    }

    let mut out = url.clone();
    out.query_pairs_mut().clear().extend_pairs(pairs);
    out.to_string()
}
