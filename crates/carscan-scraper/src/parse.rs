//! Extraction of the two per-page data sources: the structured-data block
//! and the HTML listing detail nodes.
//!
//! The structured block is the **last** `<script type="application/ld+json">`
//! element on the page. Result pages also embed earlier ld+json blocks
//! (site chrome, stale fragments) that must be ignored; taking anything but
//! the last block silently yields the wrong array.
//!
//! Detail nodes are `shop-srp-listings__listing` containers. They nest
//! arbitrary markup, so each container is carved out with a balanced
//! open/close depth scan rather than a single regex.

use regex::Regex;

use carscan_core::Mileage;

use crate::error::ScrapeError;
use crate::types::{ListingDetail, PageResult, VehicleEntry};

/// Parses one search result page into its paired structured entries and
/// detail nodes.
///
/// The two arrays are returned as extracted; validating that their lengths
/// match is the orchestrator's job, since only it knows the page index to
/// report.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingMarker`] when the structured-data block or
/// a required per-listing element is absent, [`ScrapeError::Deserialize`]
/// when the block is not valid listing JSON, and
/// [`ScrapeError::InvalidNumber`] / [`ScrapeError::MalformedAttribute`] for
/// unparseable field text.
pub fn parse_page(html: &str) -> Result<PageResult, ScrapeError> {
    let entries = parse_structured_entries(html)?;
    let details = parse_detail_nodes(html)?;
    Ok(PageResult { entries, details })
}

/// Extracts the total result count from the results-count UI element: the
/// first `matchcount` container's first `count` span, comma-tolerant.
///
/// # Errors
///
/// Returns [`ScrapeError::MissingMarker`] if either element is absent and
/// [`ScrapeError::InvalidNumber`] if the span text is not an integer.
pub fn parse_total_count(html: &str) -> Result<u64, ScrapeError> {
    let matchcount = find_element(html, "div", "matchcount").ok_or(ScrapeError::MissingMarker {
        marker: "matchcount",
    })?;

    let count_re = Regex::new(r#"<span[^>]*class=["'][^"']*count[^"']*["'][^>]*>([^<]*)</span>"#)
        .expect("valid regex");
    let raw = count_re
        .captures(matchcount)
        .and_then(|caps| caps.get(1))
        .ok_or(ScrapeError::MissingMarker { marker: "count" })?
        .as_str()
        .trim();

    raw.replace(',', "")
        .parse()
        .map_err(|_| ScrapeError::InvalidNumber {
            what: "total result count",
            text: raw.to_owned(),
        })
}

fn parse_structured_entries(html: &str) -> Result<Vec<VehicleEntry>, ScrapeError> {
    let script_re = Regex::new(
        r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#,
    )
    .expect("valid regex");

    // Last block wins; earlier ones are stale or unrelated.
    let last = script_re
        .captures_iter(html)
        .last()
        .ok_or(ScrapeError::MissingMarker {
            marker: "application/ld+json",
        })?;
    let json_text = last.get(1).map_or("", |m| m.as_str());

    serde_json::from_str(json_text).map_err(|e| ScrapeError::Deserialize {
        context: "vehicle structured data".to_owned(),
        source: e,
    })
}

fn parse_detail_nodes(html: &str) -> Result<Vec<ListingDetail>, ScrapeError> {
    let open_re =
        Regex::new(r#"<div[^>]*class=["'][^"']*shop-srp-listings__listing[^"']*["'][^>]*>"#)
            .expect("valid regex");

    let mut details = Vec::new();
    for found in open_re.find_iter(html) {
        let block =
            element_block(html, found.start(), "div").ok_or(ScrapeError::MissingMarker {
                marker: "shop-srp-listings__listing",
            })?;
        details.push(parse_detail(block)?);
    }
    Ok(details)
}

fn parse_detail(block: &str) -> Result<ListingDetail, ScrapeError> {
    Ok(ListingDetail {
        miles: parse_mileage(block)?,
        distance: parse_distance(block)?,
        attributes: parse_meta_attributes(block)?,
    })
}

/// Mileage is optional: certified pre-owned listings often publish none, in
/// which case the element is absent and the listing records the unknown
/// sentinel.
fn parse_mileage(block: &str) -> Result<Mileage, ScrapeError> {
    let re = Regex::new(r#"<span[^>]*class=["'][^"']*listing-row__mileage[^"']*["'][^>]*>([^<]*)</span>"#)
        .expect("valid regex");
    let Some(caps) = re.captures(block) else {
        return Ok(Mileage::Unknown);
    };

    let text = caps.get(1).map_or("", |m| m.as_str());
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ScrapeError::InvalidNumber {
            what: "mileage",
            text: text.trim().to_owned(),
        })?;
    let miles = token
        .replace(',', "")
        .parse()
        .map_err(|_| ScrapeError::InvalidNumber {
            what: "mileage",
            text: token.to_owned(),
        })?;
    Ok(Mileage::Known(miles))
}

/// Distance is required. The element text reads like `"15 mi. away"`; the
/// first whitespace token is the number.
fn parse_distance(block: &str) -> Result<u32, ScrapeError> {
    let open_re = Regex::new(
        r#"<div[^>]*class=["'][^"']*listing-row__distance listing-row__distance-mobile[^"']*["'][^>]*>"#,
    )
    .expect("valid regex");
    let found = open_re.find(block).ok_or(ScrapeError::MissingMarker {
        marker: "listing-row__distance",
    })?;
    let element = element_block(block, found.start(), "div").ok_or(ScrapeError::MissingMarker {
        marker: "listing-row__distance",
    })?;

    let text = strip_tags(element);
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| ScrapeError::InvalidNumber {
            what: "distance",
            text: text.trim().to_owned(),
        })?;
    token.parse().map_err(|_| ScrapeError::InvalidNumber {
        what: "distance",
        text: token.to_owned(),
    })
}

/// The metadata list's `<li>` items are `label:  value` pairs split on the
/// colon-double-space delimiter; each label becomes its own field.
fn parse_meta_attributes(block: &str) -> Result<Vec<(String, String)>, ScrapeError> {
    let open_re = Regex::new(r#"<ul[^>]*class=["'][^"']*listing-row__meta[^"']*["'][^>]*>"#)
        .expect("valid regex");
    let found = open_re.find(block).ok_or(ScrapeError::MissingMarker {
        marker: "listing-row__meta",
    })?;
    let element = element_block(block, found.start(), "ul").ok_or(ScrapeError::MissingMarker {
        marker: "listing-row__meta",
    })?;

    let li_re = Regex::new(r"(?is)<li[^>]*>(.*?)</li>").expect("valid regex");
    let mut attributes = Vec::new();
    for caps in li_re.captures_iter(element) {
        let text = strip_tags(caps.get(1).map_or("", |m| m.as_str()));
        let text = text.trim();
        let (label, value) =
            text.split_once(":  ")
                .ok_or_else(|| ScrapeError::MalformedAttribute {
                    text: text.to_owned(),
                })?;
        attributes.push((label.trim().to_owned(), value.trim().to_owned()));
    }
    Ok(attributes)
}

/// First element of `tag` whose class attribute contains `class_marker`,
/// carved out with a balanced depth scan.
fn find_element<'a>(html: &'a str, tag: &str, class_marker: &str) -> Option<&'a str> {
    let open_re = Regex::new(&format!(
        r#"<{tag}[^>]*class=["'][^"']*{class_marker}[^"']*["'][^>]*>"#
    ))
    .expect("valid regex");
    let found = open_re.find(html)?;
    element_block(html, found.start(), tag)
}

/// Carves out the element of `tag` whose open tag starts at `open_start`,
/// tracking nested same-tag elements by depth. Returns `None` when the
/// element is never closed.
fn element_block<'a>(html: &'a str, open_start: usize, tag: &str) -> Option<&'a str> {
    let open_pat = format!("<{tag}");
    let close_pat = format!("</{tag}");

    let mut depth = 0usize;
    let mut pos = open_start;
    loop {
        let rest = &html[pos..];
        let next_open = rest.find(&open_pat);
        let next_close = rest.find(&close_pat)?;

        if next_open.is_some_and(|open| open < next_close) {
            depth += 1;
            pos += next_open.unwrap_or_default() + open_pat.len();
            continue;
        }

        depth = depth.checked_sub(1)?;
        let close_end = pos + next_close + close_pat.len();
        let tag_end = html[close_end..].find('>')? + close_end + 1;
        if depth == 0 {
            return Some(&html[open_start..tag_end]);
        }
        pos = tag_end;
    }
}

/// Flattens element markup to its text content.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One listing detail node in the live page's markup shape. `mileage`
    /// is optional to mirror certified pre-owned listings.
    fn listing_div(mileage: Option<&str>, distance_text: &str, meta_items: &[&str]) -> String {
        let mileage_span = mileage.map_or(String::new(), |m| {
            format!(r#"<span class="listing-row__mileage">{m}</span>"#)
        });
        let items: String = meta_items
            .iter()
            .map(|item| format!("<li>{item}</li>"))
            .collect();
        format!(
            r#"<div class="shop-srp-listings__listing">
                 <div class="listing-row__details">
                   {mileage_span}
                   <div class="listing-row__distance listing-row__distance-mobile">
                     <span>{distance_text}</span>
                   </div>
                   <ul class="listing-row__meta">{items}</ul>
                 </div>
               </div>"#
        )
    }

    fn entry_json(name: &str, vin: &str) -> String {
        format!(
            r#"{{
                "name": "{name}",
                "brand": {{"name": "Audi"}},
                "color": "Gray",
                "offers": {{"price": "43998.00", "seller": {{"name": "Example Motors"}}}},
                "vehicleIdentificationNumber": "{vin}"
            }}"#
        )
    }

    fn result_page(entries: &[String], listings: &[String]) -> String {
        let array = format!("[{}]", entries.join(","));
        let listing_html: String = listings.concat();
        // A stale ld+json block precedes the real one, as on the live site.
        format!(
            r#"<html><head>
               <script type="application/ld+json">{{"@type": "WebSite", "name": "Cars.com"}}</script>
               </head><body>
               <div class="matchcount"><span class="count">1,234</span> matches</div>
               {listing_html}
               <script type="application/ld+json">{array}</script>
               </body></html>"#
        )
    }

    #[test]
    fn total_count_strips_comma_grouping() {
        let page = result_page(&[], &[]);
        assert_eq!(parse_total_count(&page).unwrap(), 1234);
    }

    #[test]
    fn total_count_requires_matchcount_container() {
        let result = parse_total_count("<html><body>no results UI</body></html>");
        assert!(
            matches!(
                result,
                Err(ScrapeError::MissingMarker { marker: "matchcount" })
            ),
            "expected MissingMarker(matchcount), got: {result:?}"
        );
    }

    #[test]
    fn total_count_requires_count_span() {
        let html = r#"<div class="matchcount">1,234 matches</div>"#;
        let result = parse_total_count(html);
        assert!(
            matches!(result, Err(ScrapeError::MissingMarker { marker: "count" })),
            "expected MissingMarker(count), got: {result:?}"
        );
    }

    #[test]
    fn total_count_rejects_non_numeric_text() {
        let html = r#"<div class="matchcount"><span class="count">lots</span></div>"#;
        let result = parse_total_count(html);
        assert!(
            matches!(result, Err(ScrapeError::InvalidNumber { what: "total result count", .. })),
            "expected InvalidNumber, got: {result:?}"
        );
    }

    #[test]
    fn last_structured_block_is_authoritative() {
        let page = result_page(
            &[entry_json("2017 Audi Q7", "WA1LAAF70HD000000")],
            &[listing_div(
                Some("23,405 mi."),
                "12 mi. away",
                &["Exterior Color:  Gray"],
            )],
        );
        let result = parse_page(&page).unwrap();
        // The stale WebSite block before the listing array must be ignored.
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].name, "2017 Audi Q7");
    }

    #[test]
    fn page_without_structured_block_is_missing_marker() {
        let html = r#"<html><body><div class="matchcount"><span class="count">0</span></div></body></html>"#;
        let result = parse_page(html);
        assert!(
            matches!(
                result,
                Err(ScrapeError::MissingMarker {
                    marker: "application/ld+json"
                })
            ),
            "expected MissingMarker(ld+json), got: {result:?}"
        );
    }

    #[test]
    fn malformed_structured_block_is_deserialize_error() {
        let html = r#"<script type="application/ld+json">[{"name": </script>"#;
        let result = parse_page(html);
        assert!(
            matches!(result, Err(ScrapeError::Deserialize { .. })),
            "expected Deserialize, got: {result:?}"
        );
    }

    #[test]
    fn detail_node_parses_mileage_distance_and_attributes() {
        let page = result_page(
            &[entry_json("2017 Audi Q7", "WA1LAAF70HD000000")],
            &[listing_div(
                Some("23,405 mi."),
                "12 mi. away",
                &[
                    "Exterior Color:  Graphite Gray Metallic",
                    "Transmission:  Automatic",
                    "Drivetrain:  AWD",
                ],
            )],
        );
        let result = parse_page(&page).unwrap();
        assert_eq!(result.details.len(), 1);
        let detail = &result.details[0];
        assert_eq!(detail.miles, Mileage::Known(23_405));
        assert_eq!(detail.distance, 12);
        assert_eq!(
            detail.attributes,
            vec![
                (
                    "Exterior Color".to_owned(),
                    "Graphite Gray Metallic".to_owned()
                ),
                ("Transmission".to_owned(), "Automatic".to_owned()),
                ("Drivetrain".to_owned(), "AWD".to_owned()),
            ]
        );
    }

    #[test]
    fn missing_mileage_element_is_unknown_sentinel() {
        let page = result_page(
            &[entry_json("2017 Audi Q7", "WA1LAAF70HD000000")],
            &[listing_div(None, "12 mi. away", &["Transmission:  Automatic"])],
        );
        let result = parse_page(&page).unwrap();
        assert_eq!(result.details[0].miles, Mileage::Unknown);
    }

    #[test]
    fn distance_takes_first_token() {
        // Fixed policy: the number is the first whitespace token of the
        // element text, everything after it is suffix noise.
        let page = result_page(
            &[entry_json("2017 Audi Q7", "WA1LAAF70HD000000")],
            &[listing_div(
                Some("23,405 mi."),
                "37 mi. from your search location",
                &["Transmission:  Automatic"],
            )],
        );
        let result = parse_page(&page).unwrap();
        assert_eq!(result.details[0].distance, 37);
    }

    #[test]
    fn missing_distance_element_fails() {
        let block = r#"<div class="shop-srp-listings__listing">
            <ul class="listing-row__meta"><li>Transmission:  Automatic</li></ul>
        </div>"#;
        let result = parse_page(&format!(
            r#"<script type="application/ld+json">[]</script>{block}"#
        ));
        assert!(
            matches!(
                result,
                Err(ScrapeError::MissingMarker {
                    marker: "listing-row__distance"
                })
            ),
            "expected MissingMarker(distance), got: {result:?}"
        );
    }

    #[test]
    fn meta_item_without_delimiter_fails() {
        let page = result_page(
            &[entry_json("2017 Audi Q7", "WA1LAAF70HD000000")],
            &[listing_div(
                Some("23,405 mi."),
                "12 mi. away",
                &["Certified Pre-Owned"],
            )],
        );
        let result = parse_page(&page);
        assert!(
            matches!(result, Err(ScrapeError::MalformedAttribute { ref text }) if text == "Certified Pre-Owned"),
            "expected MalformedAttribute, got: {result:?}"
        );
    }

    #[test]
    fn nested_divs_inside_listing_do_not_truncate_the_node() {
        // The meta list sits after a nested div; a non-balanced scan would
        // cut the node at the first </div> and lose it.
        let block = r#"<div class="shop-srp-listings__listing">
                 <div class="listing-row__photo"><div class="badge">CPO</div></div>
                 <div class="listing-row__distance listing-row__distance-mobile">5 mi. away</div>
                 <ul class="listing-row__meta"><li>Drivetrain:  FWD</li></ul>
               </div>"#
            .to_owned();
        let page = result_page(&[entry_json("2018 Honda CR-V", "2HKRW2H80JH000000")], &[block]);
        let result = parse_page(&page).unwrap();
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.details[0].distance, 5);
        assert_eq!(
            result.details[0].attributes,
            vec![("Drivetrain".to_owned(), "FWD".to_owned())]
        );
        assert_eq!(result.details[0].miles, Mileage::Unknown);
    }

    #[test]
    fn empty_results_page_parses_to_empty_arrays() {
        let page = result_page(&[], &[]);
        let result = parse_page(&page).unwrap();
        assert!(result.entries.is_empty());
        assert!(result.details.is_empty());
    }

    #[test]
    fn strip_tags_flattens_nested_markup() {
        assert_eq!(
            strip_tags("<div><span>12</span> mi. <b>away</b></div>").trim(),
            "12 mi. away"
        );
    }
}
