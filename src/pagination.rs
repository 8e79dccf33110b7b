//! Page navigation for list views.

use serde::Serialize;

const EDGE_PAGES: usize = 2;
const PAGES_BEFORE_CURRENT: usize = 2;
const PAGES_AFTER_CURRENT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "page", rename_all = "snake_case")]
pub enum PageLink {
    Page(usize),
    /// Elided run of pages.
    Gap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub links: Vec<PageLink>,
    pub previous: Option<usize>,
    pub next: Option<usize>,
}

impl Pager {
    /// Pager for `page` (0 is read as 1) out of `total_pages`.
    pub fn new(page: usize, total_pages: usize) -> Self {
        let page = page.max(1);
        Self {
            page,
            total_pages,
            links: page_links(page, total_pages),
            previous: (page > 1).then(|| page - 1),
            next: (page < total_pages).then(|| page + 1),
        }
    }

    pub fn from_total(page: usize, total_items: usize, per_page: usize) -> Self {
        Self::new(page, total_items.div_ceil(per_page.max(1)))
    }
}

fn page_links(current: usize, last: usize) -> Vec<PageLink> {
    if last == 0 {
        return Vec::new();
    }

    let leading = 1..=EDGE_PAGES.min(last);
    let around = current.saturating_sub(PAGES_BEFORE_CURRENT).max(1)
        ..=(current + PAGES_AFTER_CURRENT).min(last);
    let trailing = last.saturating_sub(EDGE_PAGES - 1).max(1)..=last;

    let mut pages: Vec<usize> = leading.chain(around).chain(trailing).collect();
    pages.sort_unstable();
    pages.dedup();

    let mut links = Vec::with_capacity(pages.len() + 2);
    let mut previous = 0;
    for page in pages {
        if previous != 0 && page > previous + 1 {
            links.push(PageLink::Gap);
        }
        links.push(PageLink::Page(page));
        previous = page;
    }
    links
}
