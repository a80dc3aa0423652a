//! Paging metadata headers for list responses.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use eshop_products::Page;

pub const X_PAGE: HeaderName = HeaderName::from_static("x-page");
pub const X_PAGE_SIZE: HeaderName = HeaderName::from_static("x-page-size");
pub const X_TOTAL_PAGES: HeaderName = HeaderName::from_static("x-total-pages");
pub const X_TOTAL_ITEMS: HeaderName = HeaderName::from_static("x-total-items");

/// `X-Page*` / `X-Total-*` headers plus an RFC 8288 `Link` header.
///
/// `path` is the collection path; `in_stock` is repeated in every link so
/// following them keeps the filter.
pub fn headers<T>(page: &Page<T>, path: &str, in_stock: Option<bool>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_PAGE, HeaderValue::from(page.page_number));
    headers.insert(X_PAGE_SIZE, HeaderValue::from(page.page_size));
    headers.insert(X_TOTAL_PAGES, HeaderValue::from(page.total_pages));
    headers.insert(X_TOTAL_ITEMS, HeaderValue::from(page.total_items));

    if let Ok(link) = HeaderValue::from_str(&link_header(page, path, in_stock)) {
        headers.insert(axum::http::header::LINK, link);
    }
    headers
}

fn link_header<T>(page: &Page<T>, path: &str, in_stock: Option<bool>) -> String {
    let href = |number: i64| {
        let filter = in_stock
            .map(|v| format!("in_stock={v}&"))
            .unwrap_or_default();
        format!("{path}?{filter}page={number}&page_size={}", page.page_size)
    };

    let mut links = vec![
        (href(page.page_number), "self"),
        (href(0), "first"),
        (href(page.last_page()), "last"),
    ];
    if page.has_previous() {
        links.push((href(page.page_number.saturating_sub(1)), "prev"));
    }
    if page.has_next() {
        links.push((href(page.page_number.saturating_add(1)), "next"));
    }

    links
        .into_iter()
        .map(|(url, rel)| format!("<{url}>; rel=\"{rel}\""))
        .collect::<Vec<_>>()
        .join(", ")
}
