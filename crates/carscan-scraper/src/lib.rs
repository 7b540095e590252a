pub mod client;
pub mod error;
pub mod merge;
pub mod pagination;
pub mod parse;
pub mod scrape;
pub mod types;

pub use client::ListingClient;
pub use error::ScrapeError;
pub use merge::merge_listing;
pub use scrape::scrape_listings;
pub use types::{ListingDetail, PageResult, VehicleEntry};
