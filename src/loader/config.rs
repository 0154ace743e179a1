//! Loader configuration.

/// Default number of records per page, matching the admin list views.
const DEFAULT_PAGE_SIZE: usize = 20;

/// Configuration for a [`ListLoader`](crate::loader::ListLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Records requested per page. Always at least 1.
    pub page_size: usize,
    /// Whether construction and reset dispatch the first page themselves.
    pub auto_load_first_page: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            auto_load_first_page: true,
        }
    }
}

impl LoaderConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size. A zero page size would never reach the end of
    /// the collection, so it is clamped to 1.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Sets whether the first page loads automatically.
    pub fn with_auto_load(mut self, auto_load_first_page: bool) -> Self {
        self.auto_load_first_page = auto_load_first_page;
        self
    }
}
