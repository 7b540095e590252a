#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Per-request timeout for page fetches, in seconds.
    pub request_timeout_secs: u64,
    /// User-Agent header sent with every page fetch.
    pub user_agent: String,
    /// Listings requested per result page.
    pub per_page: u32,
    /// Label for the distance CSV column (`distance_from_<origin>`).
    pub distance_origin: String,
    pub log_level: String,
}
