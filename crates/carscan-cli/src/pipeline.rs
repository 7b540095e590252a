//! End-to-end flow for one maker/model search: resolve ids, build the seed
//! URL, scrape every page, write the CSV, summarize prices.

use std::path::{Path, PathBuf};

use anyhow::Context;

use carscan_core::{csv_header, AppConfig, ListingRecord};
use carscan_scraper::{scrape_listings, ListingClient};

use crate::export::{csv_file_name, write_csv};
use crate::query::{Condition, SearchQuery};
use crate::report::{record_prices, summarize, PriceSummary};
use crate::resolver::ModelCatalog;

/// The user-facing parameters of one search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub maker: String,
    pub model: String,
    pub zipcode: u32,
    pub radius: u32,
    pub condition: Condition,
}

pub struct ScrapeOutcome {
    pub csv_path: PathBuf,
    pub records: Vec<ListingRecord>,
    pub summary: Option<PriceSummary>,
}

/// Runs one search to completion and writes its CSV.
///
/// The CSV is written only after the whole scrape succeeds; a failure on
/// any page leaves no partial output behind.
///
/// # Errors
///
/// Propagates resolution, scrape, and I/O errors with search context
/// attached.
pub async fn scrape_to_csv(
    config: &AppConfig,
    catalog: &ModelCatalog,
    client: &ListingClient,
    request: &SearchRequest,
    output_dir: &Path,
) -> anyhow::Result<ScrapeOutcome> {
    let (maker_id, model_id) = catalog.resolve(&request.maker, &request.model)?;
    let query = SearchQuery {
        maker_id,
        model_id,
        zipcode: request.zipcode,
        radius: request.radius,
        condition: request.condition,
        page: 1,
        per_page: config.per_page,
    };
    let seed_url = query.seed_url();

    tracing::info!(
        maker = %request.maker,
        model = %request.model,
        condition = %request.condition,
        "crawling listings"
    );
    let records = scrape_listings(client, &seed_url, config.per_page)
        .await
        .with_context(|| {
            format!(
                "scraping {} {} ({})",
                request.maker, request.model, request.condition
            )
        })?;

    let header = csv_header(&config.distance_origin);
    let csv_path = output_dir.join(csv_file_name(
        &request.maker,
        &request.model,
        request.zipcode,
        request.radius,
        request.condition,
    ));
    write_csv(&csv_path, &header, &records)
        .with_context(|| format!("writing {}", csv_path.display()))?;
    tracing::info!(
        records = records.len(),
        path = %csv_path.display(),
        "wrote listings CSV"
    );

    let summary = summarize(&record_prices(&records));
    Ok(ScrapeOutcome {
        csv_path,
        records,
        summary,
    })
}
