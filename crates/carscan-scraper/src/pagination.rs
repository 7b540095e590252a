//! Page-number pagination over the seed URL's `page=<n>&perPage=<m>` segment.
//!
//! cars.com search URLs carry the page number and page size as a single
//! contiguous query segment:
//!
//! ```text
//! ...searchresults.action/?mkId=20049&mdId=21088&page=1&perPage=100&rd=25&zc=53715...
//! ```
//!
//! The template abstracts that segment once; every planned URL differs from
//! the others only in the page number, with the page size fixed.

use regex::Regex;

use crate::error::ScrapeError;

/// A seed URL with its `page=<n>&perPage=<m>` segment abstracted out.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    prefix: String,
    suffix: String,
    per_page: u32,
}

impl PageTemplate {
    /// Splits `seed_url` around its page/perPage segment. The page size
    /// encoded in the seed is discarded in favor of `per_page`, which stays
    /// fixed across the whole plan.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidSeedUrl`] if the seed has no
    /// `page=<n>&perPage=<m>` segment.
    pub fn from_seed(seed_url: &str, per_page: u32) -> Result<Self, ScrapeError> {
        let segment = Regex::new(r"page=[0-9]+&perPage=[0-9]+").expect("valid regex");
        let found = segment
            .find(seed_url)
            .ok_or_else(|| ScrapeError::InvalidSeedUrl {
                url: seed_url.to_owned(),
            })?;
        Ok(Self {
            prefix: seed_url[..found.start()].to_owned(),
            suffix: seed_url[found.end()..].to_owned(),
            per_page,
        })
    }

    /// URL for the 1-based `page`.
    #[must_use]
    pub fn page_url(&self, page: u64) -> String {
        format!(
            "{}page={page}&perPage={}{}",
            self.prefix, self.per_page, self.suffix
        )
    }

    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// The full ordered plan for `total_count` results: one URL per page
    /// index `1..=page_count`.
    #[must_use]
    pub fn plan(&self, total_count: u64) -> Vec<String> {
        (1..=page_count(total_count, self.per_page))
            .map(|page| self.page_url(page))
            .collect()
    }
}

/// Number of pages needed for `total_count` results at `per_page` per page.
///
/// A zero total still yields one page: page 1 has already been fetched to
/// learn the count, so the plan is never empty.
#[must_use]
pub fn page_count(total_count: u64, per_page: u32) -> u64 {
    if total_count == 0 {
        return 1;
    }
    total_count.div_ceil(u64::from(per_page))
}
