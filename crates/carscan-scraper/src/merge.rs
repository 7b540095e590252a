//! Merge of one structured entry with its detail node into a
//! [`ListingRecord`].
//!
//! The join is positional: the Nth structured entry belongs to the Nth
//! detail node, with no explicit ID linking them. If the site ever reorders
//! one array relative to the other, merging corrupts data silently; the
//! orchestrator's per-page length check is the only safety net. That risk
//! is accepted — no content-based re-alignment is attempted.

use carscan_core::{ListingRecord, SellerRating};

use crate::types::{ListingDetail, VehicleEntry};

/// Builds the flat record for one listing. Pure and deterministic: the same
/// entry and detail always produce the same record.
///
/// Required fields come from the structured entry; the seller's phone and
/// rating are carried over only when the source has them (rating value and
/// review count travel together, from the one optional sub-record). The
/// detail node contributes mileage (or the unknown sentinel), distance, and
/// the label-driven trim attributes.
#[must_use]
pub fn merge_listing(entry: &VehicleEntry, detail: &ListingDetail) -> ListingRecord {
    let seller = &entry.offers.seller;
    let seller_rating = seller
        .aggregate_rating
        .as_ref()
        .map(|rating| SellerRating {
            average: rating.rating_value.clone(),
            review_count: rating.review_count,
        });

    ListingRecord {
        name: entry.name.clone(),
        brand: entry.brand.name.clone(),
        color: entry.color.clone(),
        price: entry.offers.price.clone(),
        seller_name: seller.name.clone(),
        seller_phone: seller.telephone.clone(),
        seller_rating,
        miles: detail.miles,
        distance: detail.distance,
        attributes: detail.attributes.clone(),
        vin: entry.vin.clone(),
    }
}
