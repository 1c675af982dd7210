//! Global date filter state

use std::sync::{Arc, RwLock};

use assistant_types::DateRange;

/// What the dashboard's date picker currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub range: DateRange,
    pub preset: Option<String>,
}

/// Shared handle to the date filter. Clones see the same state.
#[derive(Debug, Clone, Default)]
pub struct DateFilterStore {
    inner: Arc<RwLock<Option<DateFilter>>>,
}

impl DateFilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, range: DateRange, preset: Option<String>) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(DateFilter { range, preset });
    }

    pub fn current(&self) -> Option<DateFilter> {
        self.inner
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
