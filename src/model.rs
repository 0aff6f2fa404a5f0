use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Placeholder used for any field the card did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

/// What the caller is looking for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchProfile {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub min_experience: u32,
}

impl SearchProfile {
    pub fn new(keywords: Vec<String>) -> Self {
        SearchProfile {
            keywords,
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_min_experience(mut self, years: u32) -> Self {
        self.min_experience = years;
        self
    }

    /// A profile must carry at least one non-blank keyword.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(EngineError::NoKeywords);
        }
        Ok(())
    }

    /// All keywords joined by single spaces, as typed by the caller.
    pub fn keyword_phrase(&self) -> String {
        self.keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    /// Link to the person's profile page; its text carries the display name.
    ProfileLink,
    /// Bold/black styled text (the headline).
    Emphasized,
    /// Muted styled text (location and other secondary lines).
    DeEmphasized,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub kind: FragmentKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl Fragment {
    pub fn new(kind: FragmentKind, text: impl Into<String>) -> Self {
        Fragment {
            kind,
            text: text.into(),
            href: None,
        }
    }

    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        Fragment {
            kind: FragmentKind::ProfileLink,
            text: text.into(),
            href: Some(href.into()),
        }
    }
}

/// One card as handed over by the card source. Nothing is interpreted yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCard {
    #[serde(default)]
    pub locator: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

impl RawCard {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty() && self.fragments.is_empty()
    }
}

/// Normalized fields pulled out of one card. Lives for one pipeline pass only.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDraft {
    pub display_name: String,
    pub profile_locator: String,
    /// Lowercased.
    pub headline: String,
    /// Lowercased; `"n/a"` when absent.
    pub location_raw: String,
    /// Lowercased, commas stripped; `"n/a"` when absent.
    pub company_raw: String,
    /// Lowercased headline followed by the whole card text.
    pub full_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Criterion {
    Keywords,
    Location,
    Company,
    Experience,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Keywords,
        Criterion::Location,
        Criterion::Company,
        Criterion::Experience,
    ];

    pub fn max_points(&self) -> u32 {
        match self {
            Criterion::Keywords => 50,
            Criterion::Location => 20,
            Criterion::Company => 20,
            Criterion::Experience => 10,
        }
    }
}

/// Per-criterion points. Serializes as a flat map including `total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub keywords: u32,
    pub location: u32,
    pub company: u32,
    pub experience: u32,
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn new(keywords: u32, location: u32, company: u32, experience: u32) -> Self {
        let sum = (keywords + location + company + experience) as f64;
        let breakdown = ScoreBreakdown {
            keywords,
            location,
            company,
            experience,
            total: round1(sum),
        };
        debug_assert!(
            Criterion::ALL
                .iter()
                .all(|c| breakdown.points(*c) <= c.max_points()),
            "criterion over its maximum: {:?}",
            breakdown
        );
        breakdown
    }

    pub fn points(&self, criterion: Criterion) -> u32 {
        match criterion {
            Criterion::Keywords => self.keywords,
            Criterion::Location => self.location,
            Criterion::Company => self.company,
            Criterion::Experience => self.experience,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    pub name: String,
    pub skills: Vec<String>,
    pub experience_years: u32,
    pub location_display: String,
    pub company: String,
    pub profile_locator: String,
    pub relevance_score: f64,
    pub score_breakdown: ScoreBreakdown,
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Capitalizes the first letter of every alphabetic run: "caracas, venezuela" → "Caracas, Venezuela".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_phrase_joins_with_spaces() {
        let p = SearchProfile::new(vec!["AI".into(), " Engineer ".into(), "".into()]);
        assert_eq!(p.keyword_phrase(), "AI Engineer");
    }

    #[test]
    fn blank_keywords_rejected() {
        assert!(SearchProfile::new(vec![]).validate().is_err());
        assert!(SearchProfile::new(vec!["  ".into()]).validate().is_err());
        assert!(SearchProfile::new(vec!["rust".into()]).validate().is_ok());
    }

    #[test]
    fn breakdown_total_is_sum() {
        let b = ScoreBreakdown::new(50, 20, 20, 5);
        assert_eq!(b.total, 95.0);
        let maxima: u32 = Criterion::ALL.iter().map(|c| c.max_points()).sum();
        assert_eq!(maxima, 100);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "criterion over its maximum")]
    fn breakdown_rejects_points_over_maximum() {
        ScoreBreakdown::new(60, 0, 0, 0);
    }

    #[test]
    fn breakdown_points_by_criterion() {
        let b = ScoreBreakdown::new(25, 15, 10, 5);
        let points: Vec<_> = Criterion::ALL.iter().map(|c| b.points(*c)).collect();
        assert_eq!(points, vec![25, 15, 10, 5]);
    }

    #[test]
    fn breakdown_serializes_as_flat_map() {
        let json = serde_json::to_value(ScoreBreakdown::new(25, 10, 0, 5)).unwrap();
        assert_eq!(json["keywords"], 25);
        assert_eq!(json["location"], 10);
        assert_eq!(json["company"], 0);
        assert_eq!(json["experience"], 5);
        assert_eq!(json["total"], 40.0);
    }

    #[test]
    fn title_case_locations() {
        assert_eq!(title_case("caracas, venezuela"), "Caracas, Venezuela");
        assert_eq!(title_case("n/a"), "N/A");
        assert_eq!(title_case("SAN FRANCISCO bay area"), "San Francisco Bay Area");
    }
}
