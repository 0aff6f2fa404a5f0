//! Relevance scorer: four independent criteria, each with its own fallback tiers.
//!
//! | criterion  | max | tiers                                                        |
//! |------------|-----|--------------------------------------------------------------|
//! | keywords   | 50  | full phrase 50 → any word 25 → 0                             |
//! | location   | 20  | no filter / substring 20 → same country 15 → fuzzy 10 → 0    |
//! | company    | 20  | no filter / substring 20 → substring ignoring spaces 10 → 0  |
//! | experience | 10  | no minimum 5; meets minimum 10 → half or seniority word 5 → 0 |

use tracing::debug;

use crate::experience::{contains_any_word, explicit_years, SENIORITY_WORDS};
use crate::location::{LocationMatch, LocationResolver};
use crate::model::{CandidateDraft, ScoreBreakdown, SearchProfile};

pub const KEYWORD_PHRASE_POINTS: u32 = 50;
pub const KEYWORD_WORD_POINTS: u32 = 25;
pub const COMPANY_EXACT_POINTS: u32 = 20;
pub const COMPANY_SPACELESS_POINTS: u32 = 10;
pub const EXPERIENCE_FULL_POINTS: u32 = 10;
pub const EXPERIENCE_PARTIAL_POINTS: u32 = 5;
/// Credit when the caller set no minimum. Half, not full: unlike the other criteria.
pub const EXPERIENCE_BASELINE_POINTS: u32 = 5;

/// Result of scoring one draft.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    pub breakdown: ScoreBreakdown,
    pub location: LocationMatch,
    /// Estimate after any explicit years mention raised it.
    pub experience_years: u32,
}

pub struct Scorer<'a> {
    resolver: LocationResolver<'a>,
}

impl<'a> Scorer<'a> {
    pub fn new(resolver: LocationResolver<'a>) -> Self {
        Scorer { resolver }
    }

    pub fn score(
        &self,
        draft: &CandidateDraft,
        experience_years: u32,
        profile: &SearchProfile,
    ) -> Scored {
        let keywords = keyword_points(&draft.full_text, &profile.keyword_phrase());
        let location = self.resolver.resolve(&profile.location, &draft.location_raw);
        let company = company_points(&draft.full_text, &profile.company);
        let (experience, experience_years) =
            experience_points(&draft.full_text, experience_years, profile.min_experience);

        let breakdown = ScoreBreakdown::new(keywords, location.points, company, experience);
        debug!(
            candidate = %draft.display_name,
            keywords,
            location = location.points,
            location_tier = %location.tier,
            company,
            experience,
            total = breakdown.total,
            "scored"
        );

        Scored {
            breakdown,
            location,
            experience_years,
        }
    }
}

pub fn keyword_points(full_text: &str, phrase: &str) -> u32 {
    let text = full_text.to_lowercase();
    let phrase = phrase.trim().to_lowercase();
    if phrase.is_empty() {
        return 0;
    }
    if text.contains(&phrase) {
        KEYWORD_PHRASE_POINTS
    } else if phrase.split_whitespace().any(|word| text.contains(word)) {
        KEYWORD_WORD_POINTS
    } else {
        0
    }
}

pub fn company_points(full_text: &str, company: &str) -> u32 {
    let wanted = company.trim().to_lowercase();
    if wanted.is_empty() {
        return COMPANY_EXACT_POINTS;
    }
    let text = full_text.to_lowercase();
    if text.contains(&wanted) {
        return COMPANY_EXACT_POINTS;
    }
    let squash = |s: &str| s.chars().filter(|c| !c.is_whitespace()).collect::<String>();
    if squash(&text).contains(&squash(&wanted)) {
        COMPANY_SPACELESS_POINTS
    } else {
        0
    }
}

/// Returns the points and the (possibly raised) years estimate.
pub fn experience_points(full_text: &str, estimated_years: u32, min_experience: u32) -> (u32, u32) {
    if min_experience == 0 {
        return (EXPERIENCE_BASELINE_POINTS, estimated_years);
    }

    let years = explicit_years(full_text)
        .map_or(estimated_years, |explicit| explicit.max(estimated_years));

    let points = if years >= min_experience {
        EXPERIENCE_FULL_POINTS
    } else if years as f64 >= min_experience as f64 * 0.5
        || contains_any_word(full_text, SENIORITY_WORDS)
    {
        EXPERIENCE_PARTIAL_POINTS
    } else {
        0
    };
    (points, years)
}
