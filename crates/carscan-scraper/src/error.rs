use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("expected page marker \"{marker}\" is missing")]
    MissingMarker { marker: &'static str },

    #[error("could not parse {what} from \"{text}\"")]
    InvalidNumber { what: &'static str, text: String },

    #[error("metadata item \"{text}\" has no \"label:  value\" delimiter")]
    MalformedAttribute { text: String },

    #[error("seed URL has no page=<n>&perPage=<m> segment: {url}")]
    InvalidSeedUrl { url: String },

    #[error(
        "page {page} ({url}) is inconsistent: {entries} structured entries vs {details} detail nodes"
    )]
    CountMismatch {
        page: u64,
        url: String,
        entries: usize,
        details: usize,
    },
}
