//! Domain types for scraped vehicle listings.
//!
//! ## Observed shape from live cars.com search result pages
//!
//! ### Prices and ratings
//! The embedded structured-data block carries `offers.price` and
//! `aggregateRating.ratingValue` as decimal strings on some listings and as
//! bare numbers on others. Both are kept as strings end to end and written
//! to CSV verbatim; the price report re-parses them when computing
//! statistics.
//!
//! ### Mileage
//! Certified pre-owned listings frequently omit the mileage element
//! entirely. That case is [`Mileage::Unknown`], which renders as the
//! literal `unknown` in CSV output — never `0`, never an empty column.
//!
//! ### Trim attributes
//! The per-listing metadata list is label-driven ("Exterior Color",
//! "Transmission", ...) and its label set varies from page to page. Records
//! keep the pairs in page order; the CSV header is a separate fixed
//! contract and the writer drops labels the header does not name.

use std::fmt;

use serde::Serialize;

/// Column prefix for the distance-from-search-origin field. The full column
/// name is `distance_from_<origin>`, where the origin label is
/// configuration.
pub const DISTANCE_COLUMN_PREFIX: &str = "distance_from_";

/// Odometer reading for one listing, or the explicit unknown sentinel when
/// the source page publishes none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mileage {
    Known(u32),
    Unknown,
}

impl fmt::Display for Mileage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mileage::Known(miles) => write!(f, "{miles}"),
            Mileage::Unknown => write!(f, "unknown"),
        }
    }
}

/// Aggregate seller rating. The source exposes the rating value and the
/// review count inside one optional sub-record, so a listing carries either
/// both or neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SellerRating {
    /// Rating value as published (e.g. `"4.6"`).
    pub average: String,
    /// Number of reviews behind the rating.
    pub review_count: u64,
}

/// One vehicle-for-sale entry, merged from the page's structured-data block
/// and its HTML detail node. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingRecord {
    pub name: String,
    pub brand: String,
    pub color: String,
    /// Asking price as published (decimal string).
    pub price: String,
    pub seller_name: String,
    pub seller_phone: Option<String>,
    pub seller_rating: Option<SellerRating>,
    pub miles: Mileage,
    /// Distance from the search origin, in miles.
    pub distance: u32,
    /// Label-driven trim attributes in page order (e.g. `("Transmission",
    /// "Automatic")`). Labels absent from the CSV header are dropped at
    /// write time, not here.
    pub attributes: Vec<(String, String)>,
    pub vin: String,
}

impl ListingRecord {
    /// Projects this record onto a named CSV column. Returns `None` for
    /// optional fields that are unset and for attribute labels this listing
    /// does not carry; the writer renders those as empty cells.
    ///
    /// Any column starting with [`DISTANCE_COLUMN_PREFIX`] maps to the
    /// distance field, so the projection works for every configured origin
    /// label.
    #[must_use]
    pub fn column_value(&self, column: &str) -> Option<String> {
        if column.starts_with(DISTANCE_COLUMN_PREFIX) {
            return Some(self.distance.to_string());
        }
        match column {
            "name" => Some(self.name.clone()),
            "brand" => Some(self.brand.clone()),
            "color" => Some(self.color.clone()),
            "price" => Some(self.price.clone()),
            "seller_name" => Some(self.seller_name.clone()),
            "seller_phone" => self.seller_phone.clone(),
            "seller_average_rating" => self.seller_rating.as_ref().map(|r| r.average.clone()),
            "seller_review_count" => self
                .seller_rating
                .as_ref()
                .map(|r| r.review_count.to_string()),
            "miles" => Some(self.miles.to_string()),
            "VIN" => Some(self.vin.clone()),
            label => self
                .attributes
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, v)| v.clone()),
        }
    }
}

/// The fixed, ordered CSV header. Independent of any single record's field
/// set: listings missing an optional column produce an empty cell, and
/// attribute labels not named here are dropped by the writer.
#[must_use]
pub fn csv_header(distance_origin: &str) -> Vec<String> {
    [
        "name",
        "brand",
        "color",
        "price",
        "seller_name",
        "seller_phone",
        "seller_average_rating",
        "seller_review_count",
        "miles",
    ]
    .into_iter()
    .map(str::to_owned)
    .chain(std::iter::once(format!(
        "{DISTANCE_COLUMN_PREFIX}{distance_origin}"
    )))
    .chain(
        [
            "Exterior Color",
            "Interior Color",
            "Transmission",
            "Drivetrain",
            "VIN",
        ]
        .into_iter()
        .map(str::to_owned),
    )
    .collect()
}
