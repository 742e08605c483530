//! Page-number pagination for the public post listing.

use std::fmt;
use std::num::NonZeroUsize;

/// Link text used when a navigation target does not exist.
pub const PLACEHOLDER_HREF: &str = "#";

/// Where a "previous" or "next" control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Placeholder,
    Page(usize),
}

impl NavTarget {
    pub fn href(&self) -> String {
        match self {
            NavTarget::Placeholder => PLACEHOLDER_HREF.to_string(),
            NavTarget::Page(page) => format!("/?page={page}"),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, NavTarget::Placeholder)
    }
}

impl fmt::Display for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}

/// The visible slice of a collection for one page, plus navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub last: usize,
    pub prev: NavTarget,
    pub next: NavTarget,
}

/// Number of the final page; an empty collection still has one page.
pub fn last_page(total: usize, page_size: NonZeroUsize) -> usize {
    if total == 0 {
        1
    } else {
        total.div_ceil(page_size.get())
    }
}

/// Read the raw `page` query value.
///
/// Anything other than a run of ASCII digits falls back to page 1. Digit
/// strings too large for `usize` saturate and are clamped by the caller.
pub fn parse_page_param(raw: Option<&str>) -> usize {
    let Some(raw) = raw else {
        return 1;
    };
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return 1;
    }
    raw.parse::<usize>().unwrap_or(usize::MAX)
}

/// Compute the page of `items` selected by `raw_page`, clamped into range.
pub fn paginate<'a, T>(
    items: &'a [T],
    page_size: NonZeroUsize,
    raw_page: Option<&str>,
) -> PageWindow<'a, T> {
    let last = last_page(items.len(), page_size);
    let page = parse_page_param(raw_page).clamp(1, last);

    let size = page_size.get();
    let start = (page - 1).saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    let visible = &items[start..end];

    let (prev, next) = if visible.is_empty() {
        (NavTarget::Placeholder, NavTarget::Placeholder)
    } else {
        let prev = if page == 1 {
            NavTarget::Placeholder
        } else {
            NavTarget::Page(page - 1)
        };
        let next = if page == last {
            NavTarget::Placeholder
        } else {
            NavTarget::Page(page + 1)
        };
        (prev, next)
    };

    PageWindow {
        items: visible,
        page,
        last,
        prev,
        next,
    }
}
