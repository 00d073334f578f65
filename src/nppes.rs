//! NPPES NPI Registry client
//!
//! The NPI Registry is a free, public database of every US healthcare
//! provider, each with a unique 10-digit NPI number. We look providers up
//! by organization name and state to enrich search results. No API key;
//! the registry allows roughly 100 requests/minute, so results are cached
//! in memory for a day (NPIs rarely change).
//!
//! Lookup failures degrade to `None` - provider search must keep working
//! when the registry is down.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

const NPPES_API_URL: &str = "https://npiregistry.cms.hhs.gov/api/";
const NPPES_VERSION: &str = "2.1";
const CACHE_TTL_HOURS: i64 = 24;
const LOOKUP_TIMEOUT_SECS: u64 = 5;

/// Organization-name suffixes stripped before searching; NPPES entries
/// usually omit them
const NAME_SUFFIXES: &[&str] = &[
    "inc", "llc", "corp", "ltd", "group", "associates", "pc", "pllc",
];

/// Result of an NPI lookup
#[derive(Debug, Clone, Serialize)]
pub struct NpiLookupResult {
    /// The 10-digit NPI
    pub npi: String,
    /// Primary taxonomy description (e.g. "General Acute Care Hospital")
    pub taxonomy: String,
}

#[derive(Debug, Deserialize)]
struct NppesResponse {
    #[serde(default)]
    result_count: u32,
    #[serde(default)]
    results: Vec<NppesResult>,
}

#[derive(Debug, Deserialize)]
struct NppesResult {
    number: String,
    basic: NppesBasic,
    #[serde(default)]
    taxonomies: Vec<NppesTaxonomy>,
}

#[derive(Debug, Deserialize)]
struct NppesBasic {
    #[serde(default)]
    organization_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NppesTaxonomy {
    #[serde(default)]
    desc: Option<String>,
    #[serde(default)]
    primary: bool,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: Option<NpiLookupResult>,
    fetched_at: DateTime<Utc>,
}

/// NPI Registry client with a 24-hour in-memory cache
pub struct NppesClient {
    http: reqwest::Client,
    base_url: String,
    cache: RwLock<HashMap<String, CacheEntry>>,
}

impl NppesClient {
    /// Create a client against the public registry
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(NPPES_API_URL)
    }

    /// Create a client against a custom base URL (tests)
    pub fn with_base_url(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Look up a provider organization's NPI by name and optional state.
    /// Returns the best match, or `None` when nothing matches or the
    /// registry is unreachable.
    pub async fn lookup(&self, provider_name: &str, state: Option<&str>) -> Option<NpiLookupResult> {
        if provider_name.is_empty() || provider_name == "Unknown Provider" {
            return None;
        }

        let cache_key = format!("{}|{}", provider_name, state.unwrap_or("")).to_lowercase();
        if let Some(entry) = self.cached(&cache_key).await {
            return entry;
        }

        let clean_name = clean_provider_name(provider_name);
        let result = match self.fetch(&clean_name, state).await {
            Ok(result) => result,
            Err(err) => {
                // Never break provider search over a registry hiccup
                warn!(error = %err, provider = %provider_name, "NPPES lookup failed");
                return None;
            }
        };

        let mut cache = self.cache.write().await;
        cache.insert(
            cache_key,
            CacheEntry {
                result: result.clone(),
                fetched_at: Utc::now(),
            },
        );
        result
    }

    async fn cached(&self, key: &str) -> Option<Option<NpiLookupResult>> {
        let cache = self.cache.read().await;
        let entry = cache.get(key)?;
        if Utc::now() - entry.fetched_at < Duration::hours(CACHE_TTL_HOURS) {
            debug!(key = %key, "NPI cache hit");
            Some(entry.result.clone())
        } else {
            None
        }
    }

    async fn fetch(
        &self,
        clean_name: &str,
        state: Option<&str>,
    ) -> anyhow::Result<Option<NpiLookupResult>> {
        let mut query: Vec<(&str, String)> = vec![
            ("version", NPPES_VERSION.to_string()),
            ("organization_name", clean_name.to_string()),
            ("limit", "5".to_string()),
        ];
        if let Some(state) = state {
            query.push(("state", state.to_string()));
        }

        let response = self
            .http
            .get(&self.base_url)
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let data: NppesResponse = response.json().await?;
        if data.result_count == 0 || data.results.is_empty() {
            return Ok(None);
        }

        Ok(best_match(&data.results, clean_name))
    }
}

/// Strip common legal suffixes that NPPES entries usually omit
fn clean_provider_name(name: &str) -> String {
    let trimmed = name.trim().trim_end_matches('.');
    if !trimmed.is_ascii() {
        return trimmed.to_string();
    }
    let lower = trimmed.to_lowercase();

    for suffix in NAME_SUFFIXES {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            if stripped.ends_with(' ') || stripped.ends_with(", ") {
                return trimmed[..stripped.len()]
                    .trim_end_matches([' ', ','])
                    .to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Prefer results whose organization name overlaps the query; fall back
/// to the registry's first result
fn best_match(results: &[NppesResult], clean_name: &str) -> Option<NpiLookupResult> {
    let lower_name = clean_name.to_lowercase();

    let matched = results
        .iter()
        .find(|r| {
            r.basic
                .organization_name
                .as_ref()
                .map(|org| {
                    let org = org.to_lowercase();
                    org.contains(&lower_name) || lower_name.contains(&org)
                })
                .unwrap_or(false)
        })
        .or_else(|| results.first())?;

    let taxonomy = matched
        .taxonomies
        .iter()
        .find(|t| t.primary)
        .and_then(|t| t.desc.clone())
        .unwrap_or_default();

    Some(NpiLookupResult {
        npi: matched.number.clone(),
        taxonomy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_provider_name() {
        assert_eq!(clean_provider_name("Mount Sinai Hospital Inc."), "Mount Sinai Hospital");
        assert_eq!(clean_provider_name("Oak Street Health LLC"), "Oak Street Health");
        assert_eq!(clean_provider_name("CityMD"), "CityMD");
        // Suffix must be a separate word
        assert_eq!(clean_provider_name("Princeton"), "Princeton");
    }

    #[test]
    fn test_response_parsing_and_best_match() {
        let json = r#"{
            "result_count": 2,
            "results": [
                {
                    "number": "1111111111",
                    "basic": {"organization_name": "SOMEWHERE ELSE CLINIC", "status": "A"},
                    "taxonomies": []
                },
                {
                    "number": "1234567890",
                    "basic": {"organization_name": "MOUNT SINAI HOSPITAL", "status": "A"},
                    "taxonomies": [
                        {"code": "282N00000X", "desc": "General Acute Care Hospital", "primary": true}
                    ]
                }
            ]
        }"#;

        let parsed: NppesResponse = serde_json::from_str(json).unwrap();
        let result = best_match(&parsed.results, "Mount Sinai Hospital").unwrap();
        assert_eq!(result.npi, "1234567890");
        assert_eq!(result.taxonomy, "General Acute Care Hospital");
    }

    #[test]
    fn test_best_match_falls_back_to_first() {
        let json = r#"{
            "result_count": 1,
            "results": [
                {"number": "2222222222", "basic": {}, "taxonomies": []}
            ]
        }"#;
        let parsed: NppesResponse = serde_json::from_str(json).unwrap();
        let result = best_match(&parsed.results, "No Overlap Name").unwrap();
        assert_eq!(result.npi, "2222222222");
        assert_eq!(result.taxonomy, "");
    }

    #[tokio::test]
    async fn test_lookup_skips_placeholder_names() {
        let client = NppesClient::with_base_url("http://127.0.0.1:1").unwrap();
        assert!(client.lookup("", None).await.is_none());
        assert!(client.lookup("Unknown Provider", None).await.is_none());
    }

    #[tokio::test]
    async fn test_lookup_degrades_on_network_failure() {
        // Nothing listens here; the lookup must return None, not error
        let client = NppesClient::with_base_url("http://127.0.0.1:1").unwrap();
        assert!(client.lookup("Mount Sinai Hospital", Some("NY")).await.is_none());
    }
}
