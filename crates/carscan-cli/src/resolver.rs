//! Maker/model name resolution against the cars.com make/model id table.
//!
//! The table is a JSON file of the shape
//! `{"all": [{"nm": "Audi", "id": 20049, "md": [{"nm": "Q7", "id": 21088}]}]}`.
//! It is loaded once per run into a [`ModelCatalog`] value and passed
//! explicitly to whatever needs a lookup; there is no process-wide table.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("could not read model codes file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("model codes file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown maker name \"{0}\"")]
    UnknownMaker(String),

    #[error("unknown model name \"{model}\" for maker \"{maker}\"")]
    UnknownModel { maker: String, model: String },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    all: Vec<MakerEntry>,
}

/// One maker in the id table.
#[derive(Debug, Deserialize)]
pub struct MakerEntry {
    pub nm: String,
    pub id: u64,
    #[serde(default)]
    pub md: Vec<ModelEntry>,
}

/// One model under a maker.
#[derive(Debug, Deserialize)]
pub struct ModelEntry {
    pub nm: String,
    pub id: u64,
}

/// The maker/model id table, loaded once per scrape run.
#[derive(Debug)]
pub struct ModelCatalog {
    makers: Vec<MakerEntry>,
}

impl ModelCatalog {
    /// Loads the table from the cars.com make/model JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Io`] / [`ResolveError::Parse`] when the file
    /// cannot be read or is not the expected JSON shape.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        let text = std::fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: CatalogFile =
            serde_json::from_str(&text).map_err(|source| ResolveError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self { makers: file.all })
    }

    #[cfg(test)]
    fn from_makers(makers: Vec<MakerEntry>) -> Self {
        Self { makers }
    }

    #[must_use]
    pub fn makers(&self) -> &[MakerEntry] {
        &self.makers
    }

    /// Resolves a maker and model name to their site ids, applying the
    /// normalization rules from [`normalize_query`] before lookup.
    ///
    /// Catalog model names occasionally carry a leading `-` (sub-model
    /// formatting); it is stripped before comparison.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::UnknownMaker`] / [`ResolveError::UnknownModel`]
    /// when a name has no entry after normalization.
    pub fn resolve(&self, maker: &str, model: &str) -> Result<(u64, u64), ResolveError> {
        let (maker_key, model_key) = normalize_query(maker, model);

        let maker_entry = self
            .makers
            .iter()
            .find(|m| m.nm.trim().to_lowercase() == maker_key)
            .ok_or_else(|| ResolveError::UnknownMaker(maker.to_owned()))?;

        for candidate in &maker_entry.md {
            let mut name = candidate.nm.trim().to_lowercase();
            if let Some(stripped) = name.strip_prefix('-') {
                name = stripped.trim_start().to_owned();
            }
            if name == model_key {
                return Ok((maker_entry.id, candidate.id));
            }
        }

        Err(ResolveError::UnknownModel {
            maker: maker.to_owned(),
            model: model.to_owned(),
        })
    }
}

/// Normalization rules applied to user-supplied names before lookup:
/// Mercedes aliases plus the `-class` model suffix, BMW's `-series`
/// suffix, and Honda's hyphenated crossover names.
fn normalize_query(maker: &str, model: &str) -> (String, String) {
    let mut maker = maker.trim().to_lowercase();
    let mut model = model.trim().to_lowercase();

    if matches!(maker.as_str(), "mb" | "benz" | "mercedes") {
        maker = "mercedes-benz".to_owned();
    }
    if maker == "mercedes-benz"
        && matches!(
            model.as_str(),
            "c" | "e" | "cla" | "cls" | "g" | "gl" | "gla" | "gle" | "glc" | "gls" | "m" | "s"
        )
    {
        model.push_str("-class");
    }

    if maker == "bmw" && matches!(model.as_str(), "2" | "3" | "4" | "5" | "6" | "7") {
        model.push_str("-series");
    }

    if maker == "honda" {
        model = match model.as_str() {
            "crv" => "cr-v".to_owned(),
            "crz" => "cr-z".to_owned(),
            "hrv" => "hr-v".to_owned(),
            _ => model,
        };
    }

    (maker, model)
}
