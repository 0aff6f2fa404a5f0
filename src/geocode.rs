use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::config::EngineSettings;

/// Free-text place → country name. Best effort: any failure is `None`.
pub trait Geocoder: Send + Sync {
    fn country(&self, place: &str) -> Option<String>;
}

/// Used when lookups are switched off; the geocoded tier is then always skipped.
pub struct DisabledGeocoder;

impl Geocoder for DisabledGeocoder {
    fn country(&self, _place: &str) -> Option<String> {
        None
    }
}

/// Nominatim-compatible search endpoint over a blocking client with a hard timeout.
pub struct NominatimGeocoder {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    #[serde(default)]
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    country: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(endpoint: &str, timeout: Duration, user_agent: &str) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(NominatimGeocoder {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn lookup(&self, place: &str) -> reqwest::Result<Option<String>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", place),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
                ("accept-language", "en"),
            ])
            .send()?
            .error_for_status()?;
        let places: Vec<Place> = response.json()?;
        Ok(places
            .into_iter()
            .next()
            .and_then(|p| p.address)
            .and_then(|a| a.country)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()))
    }
}

impl Geocoder for NominatimGeocoder {
    fn country(&self, place: &str) -> Option<String> {
        match self.lookup(place) {
            Ok(Some(country)) => Some(country),
            Ok(None) => {
                debug!(place, "geocode: no result");
                None
            }
            Err(e) => {
                debug!(place, error = %e, "geocode: lookup failed");
                None
            }
        }
    }
}

/// Build the geocoder the settings ask for. A client that fails to build degrades to disabled.
pub fn from_settings(settings: &EngineSettings) -> Box<dyn Geocoder> {
    if !settings.geocode_enabled {
        return Box::new(DisabledGeocoder);
    }
    match NominatimGeocoder::new(
        &settings.geocode_endpoint,
        settings.geocode_timeout(),
        &settings.geocode_user_agent,
    ) {
        Ok(g) => Box::new(g),
        Err(e) => {
            tracing::warn!(error = %e, "geocoder unavailable, country tier disabled");
            Box::new(DisabledGeocoder)
        }
    }
}

/// Read-through cache for one invocation. Misses are cached too.
pub struct GeocodeCache<'a> {
    inner: &'a dyn Geocoder,
    seen: Mutex<HashMap<String, Option<String>>>,
}

impl<'a> GeocodeCache<'a> {
    pub fn new(inner: &'a dyn Geocoder) -> Self {
        GeocodeCache {
            inner,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Distinct places looked up so far, misses included.
    pub(crate) fn len(&self) -> usize {
        self.seen.lock().map(|m| m.len()).unwrap_or(0)
    }
}

impl Geocoder for GeocodeCache<'_> {
    fn country(&self, place: &str) -> Option<String> {
        let key = place.trim().to_lowercase();
        if let Ok(seen) = self.seen.lock() {
            if let Some(hit) = seen.get(&key) {
                return hit.clone();
            }
        }
        // lookup runs unlocked; concurrent misses on one key may both hit the service
        let resolved = self.inner.country(&key);
        if let Ok(mut seen) = self.seen.lock() {
            seen.insert(key, resolved.clone());
        }
        resolved
    }
}

/// Fixed lookup table. Handy for offline runs and tests.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    table: HashMap<String, String>,
}

impl StaticGeocoder {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        StaticGeocoder {
            table: entries
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
        }
    }
}

impl Geocoder for StaticGeocoder {
    fn country(&self, place: &str) -> Option<String> {
        self.table.get(&place.trim().to_lowercase()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Geocoder for Counting {
        fn country(&self, place: &str) -> Option<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (place == "caracas").then(|| "Venezuela".to_string())
        }
    }

    #[test]
    fn cache_reads_through_once() {
        let inner = Counting {
            calls: AtomicUsize::new(0),
        };
        let cache = GeocodeCache::new(&inner);
        assert_eq!(cache.country("Caracas").as_deref(), Some("Venezuela"));
        assert_eq!(cache.country("caracas ").as_deref(), Some("Venezuela"));
        assert_eq!(cache.country("atlantis"), None);
        assert_eq!(cache.country("atlantis"), None);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unreachable_endpoint_degrades_to_none() {
        let g = NominatimGeocoder::new(
            "http://127.0.0.1:9/search",
            Duration::from_millis(200),
            "card_ranker-test",
        )
        .unwrap();
        assert_eq!(g.country("caracas"), None);
    }

    #[test]
    fn disabled_settings_give_disabled_geocoder() {
        let settings = EngineSettings {
            geocode_enabled: false,
            ..EngineSettings::default()
        };
        assert_eq!(from_settings(&settings).country("caracas"), None);
    }

    #[test]
    fn static_table_is_case_insensitive() {
        let g = StaticGeocoder::new([("Caracas, Venezuela", "Venezuela")]);
        assert_eq!(g.country("caracas, venezuela").as_deref(), Some("Venezuela"));
        assert_eq!(g.country("bogota"), None);
    }
}
