//! Price statistics over scraped listings and previously-written CSVs.

use std::fmt;
use std::path::Path;

use carscan_core::ListingRecord;

use crate::query::Condition;

/// Summary statistics over the usable (positive, finite) prices of one
/// search.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSummary {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub max: f64,
    /// Sample standard deviation (n−1 denominator); 0 when fewer than two
    /// prices.
    pub std: f64,
}

impl fmt::Display for PriceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<12} = $ {:.2}", "min price", self.min)?;
        writeln!(f, "{:<12} = $ {:.2}", "mean price", self.mean)?;
        writeln!(f, "{:<12} = $ {:.2}", "median price", self.median)?;
        writeln!(f, "{:<12} = $ {:.2}", "max price", self.max)?;
        write!(f, "{:<12} = $ {:.2}", "std price", self.std)
    }
}

/// Summarizes a price vector, ignoring non-positive and non-finite values.
/// Returns `None` when nothing usable remains.
#[must_use]
pub fn summarize(prices: &[f64]) -> Option<PriceSummary> {
    let mut usable: Vec<f64> = prices
        .iter()
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .collect();
    if usable.is_empty() {
        return None;
    }
    usable.sort_by(f64::total_cmp);

    let count = usable.len();
    let min = usable[0];
    let max = usable[count - 1];
    #[allow(clippy::cast_precision_loss)]
    let mean = usable.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        usable[count / 2]
    } else {
        (usable[count / 2 - 1] + usable[count / 2]) / 2.0
    };
    #[allow(clippy::cast_precision_loss)]
    let std = if count < 2 {
        0.0
    } else {
        (usable.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
    };

    Some(PriceSummary {
        count,
        min,
        mean,
        median,
        max,
        std,
    })
}

/// Numeric prices of freshly-scraped records. Comma grouping is stripped;
/// unparseable prices are skipped.
#[must_use]
pub fn record_prices(records: &[ListingRecord]) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| r.price.replace(',', "").parse().ok())
        .collect()
}

/// Index of a named column in a CSV header.
#[must_use]
pub fn column_index(header: &[String], name: &str) -> Option<usize> {
    header.iter().position(|column| column == name)
}

/// Numeric values of the `price` column of a re-read CSV.
#[must_use]
pub fn row_prices(header: &[String], rows: &[Vec<String>]) -> Vec<f64> {
    let Some(price) = column_index(header, "price") else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| row.get(price))
        .filter_map(|cell| cell.replace(',', "").parse().ok())
        .collect()
}

/// Rows whose price falls inside `[min, max]`, in their original order.
#[must_use]
pub fn rows_in_price_range<'a>(
    header: &[String],
    rows: &'a [Vec<String>],
    min: f64,
    max: f64,
) -> Vec<&'a Vec<String>> {
    let Some(price) = column_index(header, "price") else {
        return Vec::new();
    };
    rows.iter()
        .filter(|row| {
            row.get(price)
                .and_then(|cell| cell.replace(',', "").parse::<f64>().ok())
                .is_some_and(|p| p >= min && p <= max)
        })
        .collect()
}

/// A compact name / price / color listing sorted by ascending price, one
/// row per line.
#[must_use]
pub fn price_sorted_listing(header: &[String], rows: &[&Vec<String>]) -> String {
    let (Some(name), Some(price), Some(color)) = (
        column_index(header, "name"),
        column_index(header, "price"),
        column_index(header, "color"),
    ) else {
        return String::new();
    };

    let mut picked: Vec<(f64, &str, &str, &str)> = rows
        .iter()
        .filter_map(|row| {
            let price_text = row.get(price)?;
            let numeric = price_text.replace(',', "").parse::<f64>().ok()?;
            Some((
                numeric,
                row.get(name).map_or("", String::as_str),
                price_text.as_str(),
                row.get(color).map_or("", String::as_str),
            ))
        })
        .collect();
    picked.sort_by(|a, b| a.0.total_cmp(&b.0));

    picked
        .iter()
        .map(|(_, name, price, color)| format!("{price:>12}  {name} ({color})"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Search parameters recovered from a listings CSV file name of the form
/// `{maker}-{model}-{zip}-{radius}-{condition}.csv`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMeta {
    pub maker: String,
    pub model: String,
    pub zipcode: u32,
    pub radius: u32,
    pub condition: Condition,
}

impl SearchMeta {
    #[must_use]
    pub fn from_csv_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let mut parts = stem.rsplitn(4, '-');
        let condition: Condition = parts.next()?.parse().ok()?;
        let radius: u32 = parts.next()?.parse().ok()?;
        let zipcode: u32 = parts.next()?.parse().ok()?;
        let maker_model = parts.next()?;
        let (maker, model) = maker_model.split_once('-')?;
        Some(Self {
            maker: maker.to_owned(),
            model: model.to_owned(),
            zipcode,
            radius,
            condition,
        })
    }
}
