/// Effective page window for a request against a known total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    pub page: u64,
    pub page_size: u32,
    pub total_count: u64,
    pub total_pages: u64,
}

impl PageDescriptor {
    /// Clamps `requested` into `[1, total_pages]`. An empty result set is a
    /// single empty page.
    pub fn compute(requested: u64, page_size: u32, total_count: u64) -> Self {
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(u64::from(page_size)).max(1);
        let page = if total_count == 0 {
            1
        } else {
            requested.clamp(1, total_pages)
        };

        Self {
            page,
            page_size,
            total_count,
            total_pages,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn pages(&self) -> Vec<u64> {
        (1..=self.total_pages).collect()
    }
}
