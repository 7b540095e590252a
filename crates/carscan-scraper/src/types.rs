//! Typed views of a cars.com search result page.
//!
//! ## Observed shape of the structured-data block
//!
//! Each result page embeds one or more `<script type="application/ld+json">`
//! blocks; the last one carries a JSON array with one object per listing.
//! Relevant fields per object:
//!
//! - `name`, `color`, `vehicleIdentificationNumber` — plain strings.
//! - `brand.name` — the make, nested one level down.
//! - `offers.price` — a decimal **string** on most listings but a bare
//!   number on some; both forms are accepted and kept as strings.
//! - `offers.seller.telephone` — absent for sellers with no published
//!   phone number.
//! - `offers.seller.aggregateRating` — absent for unrated sellers; when
//!   present it always carries both `ratingValue` (string or number, like
//!   price) and `reviewCount`.
//!
//! The parallel HTML listing nodes carry what the block does not: mileage,
//! distance from the search origin, and the labeled trim attribute list.
//! [`PageResult`] pairs the two arrays; their shared ordering is the join
//! key used by [`crate::merge`].

use serde::{Deserialize, Deserializer};

use carscan_core::Mileage;

/// One listing from the structured-data block.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleEntry {
    /// Display name, e.g. `"2017 Audi Q7 3.0T Premium Plus"`.
    pub name: String,

    pub brand: BrandRef,

    /// Exterior color as published in the structured block.
    pub color: String,

    pub offers: Offers,

    #[serde(rename = "vehicleIdentificationNumber")]
    pub vin: String,
}

/// The `brand` sub-object; only the name is used.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandRef {
    pub name: String,
}

/// The `offers` sub-object carrying price and seller.
#[derive(Debug, Clone, Deserialize)]
pub struct Offers {
    /// Asking price, normalized to a decimal string.
    #[serde(deserialize_with = "decimal_string")]
    pub price: String,

    pub seller: SellerEntry,
}

/// The `offers.seller` sub-object.
#[derive(Debug, Clone, Deserialize)]
pub struct SellerEntry {
    pub name: String,

    /// Absent for sellers without a published phone number.
    #[serde(default)]
    pub telephone: Option<String>,

    /// Absent for unrated sellers.
    #[serde(default, rename = "aggregateRating")]
    pub aggregate_rating: Option<AggregateRatingEntry>,
}

/// The optional `aggregateRating` sub-record. Rating value and review count
/// travel together; a listing has both or neither.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateRatingEntry {
    #[serde(rename = "ratingValue", deserialize_with = "decimal_string")]
    pub rating_value: String,

    #[serde(rename = "reviewCount")]
    pub review_count: u64,
}

/// Per-listing data extracted from one HTML detail node.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    /// Odometer reading, or [`Mileage::Unknown`] when the listing publishes
    /// none.
    pub miles: Mileage,
    /// Distance from the search origin, in miles.
    pub distance: u32,
    /// Labeled trim attributes from the metadata list, in page order.
    pub attributes: Vec<(String, String)>,
}

/// Both extracted views of one result page. The two arrays are expected to
/// be equal-length and order-aligned; the orchestrator enforces the length
/// half of that contract before merging.
#[derive(Debug)]
pub struct PageResult {
    pub entries: Vec<VehicleEntry>,
    pub details: Vec<ListingDetail>,
}

/// Accepts a JSON string or number and yields it as a string, preserving
/// the published text where there is one.
fn decimal_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_deserializes_with_all_optional_fields() {
        let entry: VehicleEntry = serde_json::from_str(
            r#"{
                "name": "2018 Honda Accord Sport",
                "brand": {"name": "Honda"},
                "color": "White",
                "offers": {
                    "price": "25988.00",
                    "seller": {
                        "name": "Example Honda",
                        "telephone": "(608) 555-0171",
                        "aggregateRating": {"ratingValue": "4.8", "reviewCount": 94}
                    }
                },
                "vehicleIdentificationNumber": "1HGCV1F30JA000000"
            }"#,
        )
        .unwrap();
        assert_eq!(entry.brand.name, "Honda");
        assert_eq!(entry.offers.price, "25988.00");
        let rating = entry.offers.seller.aggregate_rating.unwrap();
        assert_eq!(rating.rating_value, "4.8");
        assert_eq!(rating.review_count, 94);
    }

    #[test]
    fn entry_deserializes_without_phone_or_rating() {
        let entry: VehicleEntry = serde_json::from_str(
            r#"{
                "name": "2018 Honda Accord Sport",
                "brand": {"name": "Honda"},
                "color": "White",
                "offers": {"price": 25988, "seller": {"name": "Example Honda"}},
                "vehicleIdentificationNumber": "1HGCV1F30JA000000"
            }"#,
        )
        .unwrap();
        assert!(entry.offers.seller.telephone.is_none());
        assert!(entry.offers.seller.aggregate_rating.is_none());
        // Numeric price is normalized to its string form.
        assert_eq!(entry.offers.price, "25988");
    }

    #[test]
    fn price_rejects_non_scalar_json() {
        let result = serde_json::from_str::<VehicleEntry>(
            r#"{
                "name": "x",
                "brand": {"name": "y"},
                "color": "z",
                "offers": {"price": {"amount": 1}, "seller": {"name": "s"}},
                "vehicleIdentificationNumber": "v"
            }"#,
        );
        assert!(result.is_err());
    }
}
