//! The scrape orchestrator: fetch → parse → validate → merge across the
//! full pagination plan.

use carscan_core::ListingRecord;

use crate::client::ListingClient;
use crate::error::ScrapeError;
use crate::merge::merge_listing;
use crate::pagination::PageTemplate;
use crate::parse::{parse_page, parse_total_count};
use crate::types::PageResult;

/// Scrapes every listing the seed URL's search matches, page by page in
/// plan order.
///
/// Page 1 is fetched once: the same response yields the total result count
/// (which sizes the plan) and the first page's listings. Remaining pages
/// are fetched strictly sequentially. Every page must pass the
/// structured-vs-detail count check before merging; the whole scrape is
/// all-or-nothing, so a failure on any page discards the records
/// accumulated from earlier pages.
///
/// # Errors
///
/// - [`ScrapeError::InvalidSeedUrl`] — seed has no page/perPage segment.
/// - [`ScrapeError::CountMismatch`] — a page's structured entries and
///   detail nodes disagree in length.
/// - Any fetch or parse error from [`ListingClient::fetch_page`] /
///   [`parse_page`], propagated unretried.
pub async fn scrape_listings(
    client: &ListingClient,
    seed_url: &str,
    per_page: u32,
) -> Result<Vec<ListingRecord>, ScrapeError> {
    let template = PageTemplate::from_seed(seed_url, per_page)?;

    let first_url = template.page_url(1);
    let first_html = client.fetch_page(&first_url).await?;
    let total_count = parse_total_count(&first_html)?;
    let plan = template.plan(total_count);
    tracing::info!(
        total_count,
        pages = plan.len(),
        per_page,
        "planned listing scrape"
    );

    // Page 1 was already fetched to learn the count; reuse its parse
    // instead of requesting it again.
    let mut pending_first = Some(parse_page(&first_html)?);

    let mut records = Vec::new();
    for (index, url) in plan.iter().enumerate() {
        let page_number = index as u64 + 1;
        let page = match pending_first.take() {
            Some(first) => first,
            None => {
                let html = client.fetch_page(url).await?;
                parse_page(&html)?
            }
        };
        merge_page(page_number, url, &page, &mut records)?;
    }

    tracing::info!(records = records.len(), "scrape complete");
    Ok(records)
}

/// Validates one page's count consistency and appends its merged records.
///
/// A length mismatch between the structured entries and the detail nodes
/// means the positional join would pair wrong listings; that is fatal for
/// the entire scrape, not just this page.
fn merge_page(
    page_number: u64,
    url: &str,
    page: &PageResult,
    records: &mut Vec<ListingRecord>,
) -> Result<(), ScrapeError> {
    if page.entries.len() != page.details.len() {
        return Err(ScrapeError::CountMismatch {
            page: page_number,
            url: url.to_owned(),
            entries: page.entries.len(),
            details: page.details.len(),
        });
    }

    tracing::debug!(page = page_number, listings = page.entries.len(), "merged page");
    for (entry, detail) in page.entries.iter().zip(&page.details) {
        records.push(merge_listing(entry, detail));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BrandRef, ListingDetail, Offers, SellerEntry, VehicleEntry};
    use carscan_core::Mileage;

    fn make_entry(vin: &str) -> VehicleEntry {
        VehicleEntry {
            name: "2018 Honda Accord Sport".to_owned(),
            brand: BrandRef {
                name: "Honda".to_owned(),
            },
            color: "White".to_owned(),
            offers: Offers {
                price: "25988.00".to_owned(),
                seller: SellerEntry {
                    name: "Example Honda".to_owned(),
                    telephone: None,
                    aggregate_rating: None,
                },
            },
            vin: vin.to_owned(),
        }
    }

    fn make_detail(distance: u32) -> ListingDetail {
        ListingDetail {
            miles: Mileage::Known(10_000),
            distance,
            attributes: vec![],
        }
    }

    #[test]
    fn merge_page_appends_in_page_order() {
        let page = PageResult {
            entries: vec![make_entry("VIN1"), make_entry("VIN2")],
            details: vec![make_detail(1), make_detail(2)],
        };
        let mut records = Vec::new();
        merge_page(1, "https://example.com/page1", &page, &mut records).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vin, "VIN1");
        assert_eq!(records[0].distance, 1);
        assert_eq!(records[1].vin, "VIN2");
        assert_eq!(records[1].distance, 2);
    }

    #[test]
    fn merge_page_reports_mismatched_counts_with_page_context() {
        let page = PageResult {
            entries: vec![make_entry("VIN1"), make_entry("VIN2")],
            details: vec![make_detail(1)],
        };
        let mut records = Vec::new();
        let result = merge_page(3, "https://example.com/page3", &page, &mut records);
        assert!(
            matches!(
                result,
                Err(ScrapeError::CountMismatch {
                    page: 3,
                    entries: 2,
                    details: 1,
                    ..
                })
            ),
            "expected CountMismatch with context, got: {result:?}"
        );
        assert!(records.is_empty());
    }
}
