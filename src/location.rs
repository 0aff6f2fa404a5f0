use std::fmt;

use similar::TextDiff;
use tracing::debug;

use crate::geocode::Geocoder;

pub const EXACT_POINTS: u32 = 20;
pub const COUNTRY_POINTS: u32 = 15;
pub const FUZZY_POINTS: u32 = 10;

/// Which tier decided a location score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationTier {
    NoFilter,
    Exact,
    Country,
    Fuzzy,
    NoMatch,
}

impl LocationTier {
    pub fn points(&self) -> u32 {
        match self {
            LocationTier::NoFilter | LocationTier::Exact => EXACT_POINTS,
            LocationTier::Country => COUNTRY_POINTS,
            LocationTier::Fuzzy => FUZZY_POINTS,
            LocationTier::NoMatch => 0,
        }
    }
}

impl fmt::Display for LocationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationTier::NoFilter => "no_filter",
            LocationTier::Exact => "exact",
            LocationTier::Country => "country",
            LocationTier::Fuzzy => "fuzzy",
            LocationTier::NoMatch => "none",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch {
    pub points: u32,
    pub tier: LocationTier,
    /// Similarity ratio when the fuzzy tier was evaluated.
    pub similarity: Option<f64>,
}

impl LocationMatch {
    fn at(tier: LocationTier) -> Self {
        LocationMatch {
            points: tier.points(),
            tier,
            similarity: None,
        }
    }
}

pub struct LocationResolver<'a> {
    geocoder: &'a dyn Geocoder,
    fuzzy_threshold: f64,
}

impl<'a> LocationResolver<'a> {
    pub fn new(geocoder: &'a dyn Geocoder, fuzzy_threshold: f64) -> Self {
        LocationResolver {
            geocoder,
            fuzzy_threshold,
        }
    }

    /// Exact substring → same country → fuzzy ratio → nothing.
    pub fn resolve(&self, requested: &str, scraped: &str) -> LocationMatch {
        let requested = requested.trim().to_lowercase();
        let scraped = scraped.trim().to_lowercase();

        let result = self.resolve_normalized(&requested, &scraped);
        debug!(
            requested = %requested,
            scraped = %scraped,
            tier = %result.tier,
            points = result.points,
            "location resolved"
        );
        result
    }

    fn resolve_normalized(&self, requested: &str, scraped: &str) -> LocationMatch {
        if requested.is_empty() || requested == "any" {
            return LocationMatch::at(LocationTier::NoFilter);
        }
        if scraped.contains(requested) || (requested == "remote" && scraped.contains("home")) {
            return LocationMatch::at(LocationTier::Exact);
        }

        if is_known(scraped) {
            if let (Some(want), Some(have)) = (
                self.geocoder.country(requested),
                self.geocoder.country(scraped),
            ) {
                if want.eq_ignore_ascii_case(&have) {
                    return LocationMatch::at(LocationTier::Country);
                }
            }
        }

        // matched characters over total length, 2·M/T
        let ratio = f64::from(TextDiff::from_chars(requested, scraped).ratio());
        let tier = if ratio > self.fuzzy_threshold {
            LocationTier::Fuzzy
        } else {
            LocationTier::NoMatch
        };
        LocationMatch {
            points: tier.points(),
            tier,
            similarity: Some(ratio),
        }
    }
}

fn is_known(scraped: &str) -> bool {
    !scraped.is_empty() && scraped != "n/a"
}
