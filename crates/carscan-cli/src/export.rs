//! CSV export and re-import of listing records.
//!
//! The header is the fixed column contract from `carscan-core`; records are
//! projected onto it column by column, so attribute labels the header does
//! not name are dropped here and optional fields render as empty cells.
//! Quoting follows RFC 4180: fields containing the separator, a quote, or a
//! line break are quoted, with embedded quotes doubled.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use carscan_core::ListingRecord;

use crate::query::Condition;

/// Output file name for one search: `{maker}-{model}-{zip}-{radius}-{condition}.csv`.
#[must_use]
pub fn csv_file_name(
    maker: &str,
    model: &str,
    zipcode: u32,
    radius: u32,
    condition: Condition,
) -> String {
    format!("{maker}-{model}-{zipcode}-{radius}-{condition}.csv")
}

/// Projects one record onto the header, one cell per column.
#[must_use]
pub fn record_row(record: &ListingRecord, header: &[String]) -> Vec<String> {
    header
        .iter()
        .map(|column| record.column_value(column).unwrap_or_default())
        .collect()
}

/// Writes the header and one row per record, replacing any pre-existing
/// file at `path`. The parent directory is created if missing.
///
/// Callers only invoke this with a complete scrape result; a failed scrape
/// never produces a partial CSV.
///
/// # Errors
///
/// Returns any underlying I/O error.
pub fn write_csv(path: &Path, header: &[String], records: &[ListingRecord]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = BufWriter::new(File::create(path)?);
    write_row(&mut out, header)?;
    for record in records {
        write_row(&mut out, &record_row(record, header))?;
    }
    out.flush()
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row to any writer.
fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{escaped}\"")?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Reads a listings CSV back as a header row plus data rows.
///
/// # Errors
///
/// Returns an [`io::ErrorKind::InvalidData`] error when the file has no
/// header row, or any underlying read error.
pub fn read_csv(path: &Path) -> io::Result<(Vec<String>, Vec<Vec<String>>)> {
    let text = fs::read_to_string(path)?;
    let mut rows = parse_rows(&text);
    if rows.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{} has no header row", path.display()),
        ));
    }
    let header = rows.remove(0);
    Ok((header, rows))
}

/// Minimal CSV parser (quotes + CRLF tolerant).
fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row: Vec<String> = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(std::mem::take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush any trailing field/row even without a final newline.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

#[cfg(test)]
mod tests {
    use carscan_core::{csv_header, Mileage, SellerRating};

    use super::*;

    fn record_with_optionals() -> ListingRecord {
        ListingRecord {
            name: "2017 Audi Q7 3.0T Premium Plus".to_owned(),
            brand: "Audi".to_owned(),
            color: "Gray".to_owned(),
            price: "43998.00".to_owned(),
            seller_name: "Example Motors, Inc.".to_owned(),
            seller_phone: Some("(608) 555-0134".to_owned()),
            seller_rating: Some(SellerRating {
                average: "4.6".to_owned(),
                review_count: 212,
            }),
            miles: Mileage::Known(23_405),
            distance: 12,
            attributes: vec![
                ("Exterior Color".to_owned(), "Graphite Gray".to_owned()),
                ("Seating Capacity".to_owned(), "7".to_owned()),
            ],
            vin: "WA1LAAF70HD000000".to_owned(),
        }
    }

    fn bare_record() -> ListingRecord {
        ListingRecord {
            name: "2018 Honda Accord Sport".to_owned(),
            brand: "Honda".to_owned(),
            color: "White".to_owned(),
            price: "25988.00".to_owned(),
            seller_name: "Example Honda".to_owned(),
            seller_phone: None,
            seller_rating: None,
            miles: Mileage::Unknown,
            distance: 3,
            attributes: vec![],
            vin: "1HGCV1F30JA000000".to_owned(),
        }
    }

    #[test]
    fn record_row_projects_onto_the_fixed_header() {
        let header = csv_header("Madison");
        let row = record_row(&record_with_optionals(), &header);
        assert_eq!(row.len(), header.len());
        assert_eq!(row[0], "2017 Audi Q7 3.0T Premium Plus");
        assert_eq!(row[9], "12"); // distance_from_Madison
        assert_eq!(row[10], "Graphite Gray"); // Exterior Color
        assert_eq!(row[14], "WA1LAAF70HD000000");
        // "Seating Capacity" is not in the header and is simply dropped.
        assert!(!row.contains(&"7".to_owned()));
    }

    #[test]
    fn bare_record_row_leaves_optional_cells_empty_and_required_cells_full() {
        let header = csv_header("Madison");
        let row = record_row(&bare_record(), &header);
        // seller_phone, seller_average_rating, seller_review_count, and the
        // attribute columns are empty.
        assert_eq!(row[5], "");
        assert_eq!(row[6], "");
        assert_eq!(row[7], "");
        assert_eq!(row[10], "");
        // Required columns are always populated; unknown mileage is the
        // sentinel, not an empty cell.
        assert_eq!(row[8], "unknown");
        assert!(!row[0].is_empty() && !row[3].is_empty() && !row[14].is_empty());
    }

    #[test]
    fn write_row_quotes_embedded_separators_and_quotes() {
        let mut buf: Vec<u8> = Vec::new();
        write_row(
            &mut buf,
            &[
                "Example Motors, Inc.".to_owned(),
                "plain".to_owned(),
                "say \"hi\"".to_owned(),
            ],
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "\"Example Motors, Inc.\",plain,\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn parse_rows_round_trips_quoted_fields() {
        let rows = parse_rows("a,\"b, with comma\",\"quote \"\"q\"\"\"\r\nc,d,e\n");
        assert_eq!(
            rows,
            vec![
                vec![
                    "a".to_owned(),
                    "b, with comma".to_owned(),
                    "quote \"q\"".to_owned()
                ],
                vec!["c".to_owned(), "d".to_owned(), "e".to_owned()],
            ]
        );
    }

    #[test]
    fn write_csv_overwrites_an_existing_file() {
        let path = std::env::temp_dir().join(format!(
            "carscan-export-test-{}.csv",
            std::process::id()
        ));
        let header = csv_header("Madison");

        write_csv(&path, &header, &[record_with_optionals(), bare_record()]).unwrap();
        write_csv(&path, &header, &[bare_record()]).unwrap();

        let (read_header, rows) = read_csv(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(read_header, header);
        assert_eq!(rows.len(), 1, "second write should replace the first");
        assert_eq!(rows[0][0], "2018 Honda Accord Sport");
        assert_eq!(rows[0][8], "unknown");
    }
}
