/// One sort criterion, applied against the root entity's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub ascending: bool,
}

/// A bounded-fetch request. Page numbers are 1-based; anything below 1 is
/// clamped so the offset never goes negative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
    pub sort: Option<SortKey>,
}

impl PageRequest {
    pub fn of(number: u32, size: u32, order_by: &str, ascending: bool) -> Self {
        Self {
            number: number.max(1),
            size,
            sort: Some(SortKey { field: order_by.to_string(), ascending }),
        }
    }

    /// Unsorted single-row bound, used for fetch-one semantics.
    pub fn first() -> Self {
        Self { number: 1, size: 1, sort: None }
    }

    pub fn offset(&self) -> usize {
        (self.number.max(1) as usize - 1) * self.size as usize
    }

    pub fn limit(&self) -> usize {
        self.size as usize
    }
}

/// One page of mapped results plus the unbounded total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(self.size as u64)
    }
}
