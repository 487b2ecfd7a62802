// src/country.rs
//! # Country registry
//!
//! Maps the free-text country / economy names used by the four source
//! tables onto one key domain (ISO-3166 alpha-3 + a canonical display name).
//!
//! - Case-insensitive lookup with normalization of punctuation, dashes, etc.
//! - Aliases map alternative spellings ("Viet Nam", "Lao PDR",
//!   "Korea, Rep.") to the canonical entry.
//! - Unknown names are reported with the closest canonical name as a hint
//!   (Jaro-Winkler), never silently dropped.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGEST_MIN_SIMILARITY: f64 = 0.85;

/// One country of the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Country {
    /// ISO-3166 alpha-3.
    pub code: &'static str,
    /// Display name used as the join key after canonicalization.
    pub name: &'static str,
}

/// ASEAN-10, Timor-Leste, and the economies dashboards usually compare against.
const SEED: &[(&str, &str, &[&str])] = &[
    ("BRN", "Brunei", &["brunei darussalam", "negara brunei darussalam"]),
    ("KHM", "Cambodia", &["kingdom of cambodia", "kampuchea"]),
    ("IDN", "Indonesia", &["republic of indonesia"]),
    (
        "LAO",
        "Laos",
        &["lao pdr", "lao p d r", "lao people s democratic republic", "lao"],
    ),
    ("MYS", "Malaysia", &[]),
    ("MMR", "Myanmar", &["burma", "myanmar burma"]),
    ("PHL", "Philippines", &["the philippines", "republic of the philippines"]),
    ("SGP", "Singapore", &["republic of singapore"]),
    ("THA", "Thailand", &["kingdom of thailand"]),
    ("VNM", "Vietnam", &["viet nam", "socialist republic of vietnam"]),
    ("TLS", "Timor-Leste", &["east timor", "timor leste"]),
    ("CHN", "China", &["people s republic of china", "prc"]),
    ("JPN", "Japan", &[]),
    (
        "KOR",
        "South Korea",
        &["korea rep", "korea republic of", "republic of korea", "korea"],
    ),
    ("IND", "India", &[]),
    ("AUS", "Australia", &[]),
    ("HKG", "Hong Kong", &["hong kong sar china", "hong kong sar"]),
    ("TWN", "Taiwan", &["taiwan china", "chinese taipei"]),
];

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-–—_/\\.,'’()]+").expect("separator regex"));

/// Lowercase, turn punctuation/dashes into spaces, collapse whitespace.
pub fn normalize_name(s: &str) -> String {
    let lower = s.trim().to_lowercase();
    SEPARATORS
        .replace_all(&lower, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lookup outcome for one raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Known(Country),
    Unknown { suggestion: Option<&'static str> },
}

#[derive(Debug, Clone)]
pub struct CountryRegistry {
    countries: Vec<Country>,
    /// normalized name or alias → index into `countries`.
    lookup: HashMap<String, usize>,
}

impl Default for CountryRegistry {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CountryRegistry {
    /// Built-in registry.
    pub fn seeded() -> Self {
        let mut countries = Vec::with_capacity(SEED.len());
        let mut lookup = HashMap::new();
        for (i, &(code, name, aliases)) in SEED.iter().enumerate() {
            countries.push(Country { code, name });
            lookup.insert(normalize_name(name), i);
            lookup.insert(code.to_ascii_lowercase(), i);
            for a in aliases {
                lookup.insert(normalize_name(a), i);
            }
        }
        Self { countries, lookup }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn get(&self, raw: &str) -> Option<&Country> {
        self.lookup
            .get(&normalize_name(raw))
            .and_then(|&i| self.countries.get(i))
    }

    pub fn by_code(&self, code: &str) -> Option<&Country> {
        self.countries
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Resolve a raw name, suggesting the closest canonical name when unknown.
    pub fn resolve(&self, raw: &str) -> Resolution {
        if let Some(c) = self.get(raw) {
            return Resolution::Known(c.clone());
        }
        let needle = normalize_name(raw);
        let suggestion = self
            .countries
            .iter()
            .map(|c| (c.name, strsim::jaro_winkler(&needle, &normalize_name(c.name))))
            .filter(|&(_, sim)| sim >= SUGGEST_MIN_SIMILARITY)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(name, _)| name);
        Resolution::Unknown { suggestion }
    }
}
