use std::sync::LazyLock;

use regex::Regex;

/// "5 years", "7+ yrs", "3 años". The `+` is dropped, not added.
static YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?|años?|anos?)\b").unwrap()
});

/// Wider form used when checking a minimum: also eats the trailing "experience"/"exp" noun.
static EXPLICIT_YEARS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,2})\s*\+?\s*(?:years?|yrs?|años?|anos?)(?:\s+(?:of\s+)?(?:experience|exp\b\.?|de\s+experiencia))?",
    )
    .unwrap()
});

const SENIOR_WORDS: &[&str] = &["senior", "lead", "principal"];
const MID_WORDS: &[&str] = &["mid", "intermediate"];
const ENTRY_WORDS: &[&str] = &["entry", "junior", "intern"];
const GENERAL_SENIOR_WORDS: &[&str] = &["experienced", "expert"];

/// Words that earn partial experience credit on their own.
pub const SENIORITY_WORDS: &[&str] = &["senior", "lead", "principal", "experienced", "expert"];

const NEUTRAL_DEFAULT_YEARS: u32 = 3;

/// Years-of-experience estimate from a card. First rule that applies wins.
pub fn estimate_experience(headline: &str, text: &str, min_experience: u32) -> u32 {
    let haystack = format!("{} {}", headline, text).to_lowercase();

    if let Some(years) = YEARS_RE
        .captures(&haystack)
        .and_then(|c| c[1].parse::<u32>().ok())
    {
        return years;
    }
    if contains_any_word(&haystack, SENIOR_WORDS) {
        return min_experience.max(7);
    }
    if contains_any_word(&haystack, MID_WORDS) {
        return (min_experience / 2).max(4);
    }
    if contains_any_word(&haystack, ENTRY_WORDS) {
        return 2;
    }
    if contains_any_word(&haystack, GENERAL_SENIOR_WORDS) {
        return min_experience.max(10);
    }
    if min_experience > 0 {
        min_experience
    } else {
        NEUTRAL_DEFAULT_YEARS
    }
}

/// Largest explicit years mention in `text`, if any.
pub fn explicit_years(text: &str) -> Option<u32> {
    EXPLICIT_YEARS_RE
        .captures_iter(text)
        .filter_map(|c| c[1].parse::<u32>().ok())
        .max()
}

/// Whole-word containment, so "intern" does not fire on "international".
pub fn contains_any_word(haystack: &str, words: &[&str]) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .any(|token| words.iter().any(|w| token.eq_ignore_ascii_case(w)))
}
