/// Skip/limit options for a paged find.
///
/// Results come back in the collection's natural order. Paging with
/// skip/limit is not cursor-stable: documents inserted or removed between two
/// page fetches shift every later page.
///
/// ```rust,ignore
/// use docshift::collection::FindOptions;
///
/// let options = FindOptions::new().skip(10).limit(20);
/// let third_page = FindOptions::page(2, 1000);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions {
        skip: Some(skip),
        limit: None,
    }
}

/// Creates `FindOptions` that limits the number of results.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions {
        skip: None,
        limit: Some(limit),
    }
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Options selecting page `index` (zero based) of `size` documents.
    pub fn page(index: u64, size: u64) -> FindOptions {
        FindOptions {
            skip: Some(index.saturating_mul(size)),
            limit: Some(size),
        }
    }

    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    pub fn skip_count(&self) -> u64 {
        self.skip.unwrap_or(0)
    }

    /// `None` means unbounded.
    pub fn limit_count(&self) -> Option<u64> {
        self.limit
    }
}
