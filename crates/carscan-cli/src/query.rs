//! Seed URL construction for a cars.com search.

use std::fmt;
use std::str::FromStr;

/// Inventory condition filter. `used` and `new` map to the site's
/// `stkTypId` stock-type codes; `all` omits the parameter entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Condition {
    New,
    #[value(alias = "old")]
    Used,
    All,
}

impl Condition {
    /// The site's `stkTypId` code, or `None` for an unfiltered search.
    #[must_use]
    pub fn stock_type_code(self) -> Option<u32> {
        match self {
            Condition::New => Some(28880),
            Condition::Used => Some(28881),
            Condition::All => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::New => write!(f, "new"),
            Condition::Used => write!(f, "used"),
            Condition::All => write!(f, "all"),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Condition::New),
            "used" | "old" => Ok(Condition::Used),
            "all" => Ok(Condition::All),
            other => Err(format!("unknown condition \"{other}\"")),
        }
    }
}

/// One fully-resolved search: ids from the model catalog plus the
/// user-supplied location and condition parameters.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub maker_id: u64,
    pub model_id: u64,
    pub zipcode: u32,
    /// Search radius in miles.
    pub radius: u32,
    pub condition: Condition,
    pub page: u64,
    pub per_page: u32,
}

impl SearchQuery {
    /// The seed URL in the site's exact query shape. Parameter order and
    /// the trailing `searchSource=QUICK_FORM` are part of the shape and
    /// must not change.
    #[must_use]
    pub fn seed_url(&self) -> String {
        let Self {
            maker_id,
            model_id,
            zipcode,
            radius,
            page,
            per_page,
            ..
        } = self;
        match self.condition.stock_type_code() {
            Some(code) => format!(
                "https://www.cars.com/for-sale/searchresults.action/?mkId={maker_id}&mdId={model_id}&page={page}&perPage={per_page}&rd={radius}&zc={zipcode}&stkTypId={code}&searchSource=QUICK_FORM"
            ),
            None => format!(
                "https://www.cars.com/for-sale/searchresults.action/?mkId={maker_id}&mdId={model_id}&page={page}&perPage={per_page}&rd={radius}&zc={zipcode}&searchSource=QUICK_FORM"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(condition: Condition) -> SearchQuery {
        SearchQuery {
            maker_id: 20049,
            model_id: 21088,
            zipcode: 53715,
            radius: 25,
            condition,
            page: 1,
            per_page: 100,
        }
    }

    #[test]
    fn used_search_carries_the_used_stock_type_code() {
        assert_eq!(
            query(Condition::Used).seed_url(),
            "https://www.cars.com/for-sale/searchresults.action/?mkId=20049&mdId=21088&page=1&perPage=100&rd=25&zc=53715&stkTypId=28881&searchSource=QUICK_FORM"
        );
    }

    #[test]
    fn new_search_carries_the_new_stock_type_code() {
        assert_eq!(
            query(Condition::New).seed_url(),
            "https://www.cars.com/for-sale/searchresults.action/?mkId=20049&mdId=21088&page=1&perPage=100&rd=25&zc=53715&stkTypId=28880&searchSource=QUICK_FORM"
        );
    }

    #[test]
    fn all_conditions_search_omits_the_stock_type_parameter() {
        let url = query(Condition::All).seed_url();
        assert_eq!(
            url,
            "https://www.cars.com/for-sale/searchresults.action/?mkId=20049&mdId=21088&page=1&perPage=100&rd=25&zc=53715&searchSource=QUICK_FORM"
        );
        assert!(!url.contains("stkTypId"));
    }

    #[test]
    fn condition_parses_aliases() {
        assert_eq!("used".parse::<Condition>().unwrap(), Condition::Used);
        assert_eq!("old".parse::<Condition>().unwrap(), Condition::Used);
        assert_eq!("NEW".parse::<Condition>().unwrap(), Condition::New);
        assert_eq!("all".parse::<Condition>().unwrap(), Condition::All);
        assert!("certified".parse::<Condition>().is_err());
    }
}
