use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `?page=&page_size=` shared by every listing endpoint. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize, Validate)]
pub struct PageQuery {
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page: Some(page), page_size: Some(page_size) }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: u32,
    pub has_next: bool,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, query: &PageQuery) -> Self {
        let page_size = query.page_size();
        let total = total.max(0);
        let total_pages = ((total + i64::from(page_size) - 1) / i64::from(page_size)) as u32;
        let page = query.page();

        Self { items, page, page_size, total, total_pages, has_next: page < total_pages }
    }

    pub fn empty(query: &PageQuery) -> Self {
        Self::new(Vec::new(), 0, query)
    }
}
