use std::sync::LazyLock;

use regex::Regex;

use crate::model::{FragmentKind, RawCard};

// "Jane Doe View Jane Doe’s profile", "Jane DoeView profile"; a glued "View" must be capitalized
static VIEW_PROFILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*(?:(?i:\bview)|View)\b(?i:.*\bprofile)\s*$").unwrap());
// "Jane Doe's profile"
static POSSESSIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)['’]s\s+profile\s*$").unwrap());

/// Display name from the first profile link that still has text after cleanup.
pub fn extract(card: &RawCard) -> Option<String> {
    card.fragments
        .iter()
        .filter(|f| f.kind == FragmentKind::ProfileLink)
        .find_map(|f| clean(&f.text))
}

pub fn clean(raw: &str) -> Option<String> {
    let text = VIEW_PROFILE_RE.replace(raw, "");
    let text = POSSESSIVE_RE.replace(&text, "");
    let name = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
