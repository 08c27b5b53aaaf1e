//! Page-by-page traversal of listing endpoints.
//!
//! GitLab listings are numbered from page 1 and signal their end with an
//! empty page. The walk never stops on its own otherwise: an endpoint that
//! keeps returning items keeps the walk going.

use std::future::Future;
use std::ops::ControlFlow;
use tracing::trace;

/// Number of results requested per page.
pub const RESULTS_PER_PAGE: u32 = 100;

/// Page selection passed to listing calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
}

impl PageRequest {
    /// First page with the given size.
    #[must_use]
    pub fn first(per_page: u32) -> Self {
        Self { page: 1, per_page }
    }

    /// The page following this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
            ..self
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(RESULTS_PER_PAGE)
    }
}

/// Walks pages until `fetch` returns an empty page or `consume` breaks.
///
/// `fetch` is called with page 1, 2, ... in order. Each non-empty page is
/// handed to `consume`.
///
/// # Errors
///
/// Returns the first error produced by `fetch` or `consume`.
pub async fn walk<T, E, F, Fut, C>(per_page: u32, mut fetch: F, mut consume: C) -> Result<(), E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
    C: FnMut(Vec<T>) -> Result<ControlFlow<()>, E>,
{
    let mut request = PageRequest::first(per_page);

    loop {
        let items = fetch(request).await?;
        trace!(page = request.page, count = items.len(), "Fetched page");

        if items.is_empty() {
            return Ok(());
        }
        if consume(items)?.is_break() {
            return Ok(());
        }
        request = request.next();
    }
}

/// Collects every item of a paginated listing.
///
/// # Errors
///
/// Returns the first error produced by `fetch`.
pub async fn collect_all<T, E, F, Fut>(per_page: u32, fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let mut all = Vec::new();
    walk(per_page, fetch, |items| {
        all.extend(items);
        Ok(ControlFlow::Continue(()))
    })
    .await?;
    Ok(all)
}
