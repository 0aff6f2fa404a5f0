use crate::model::{FragmentKind, RawCard};

/// Separator LinkedIn-style cards put between headline and the rest.
pub const SEPARATOR: char = '·';
const FALLBACK_CHARS: usize = 100;

/// Lowercased headline: first emphasized fragment, else the card text up to the first
/// separator, else its first 100 characters.
pub fn extract(card: &RawCard) -> String {
    if let Some(f) = card
        .fragments
        .iter()
        .find(|f| f.kind == FragmentKind::Emphasized && !f.text.trim().is_empty())
    {
        return normalize(&f.text);
    }

    let head = match card.text.find(SEPARATOR) {
        Some(idx) => card.text[..idx].to_string(),
        None => card.text.chars().take(FALLBACK_CHARS).collect(),
    };
    normalize(&head)
}

/// Lowercased location: first de-emphasized fragment whose text is not the headline.
pub fn location(card: &RawCard, headline: &str) -> Option<String> {
    card.fragments
        .iter()
        .filter(|f| f.kind == FragmentKind::DeEmphasized)
        .map(|f| normalize(&f.text))
        .find(|t| !t.is_empty() && t != headline)
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Fragment;

    fn card(text: &str, fragments: Vec<Fragment>) -> RawCard {
        RawCard {
            locator: String::new(),
            text: text.to_string(),
            fragments,
        }
    }

    #[test]
    fn emphasized_fragment_is_headline() {
        let c = card(
            "whatever",
            vec![
                Fragment::new(FragmentKind::DeEmphasized, "Lima, Peru"),
                Fragment::new(FragmentKind::Emphasized, "  Staff  Engineer at Stripe "),
            ],
        );
        assert_eq!(extract(&c), "staff engineer at stripe");
    }

    #[test]
    fn separator_fallback() {
        let c = card("Data Scientist · Bogotá", vec![]);
        assert_eq!(extract(&c), "data scientist");
    }

    #[test]
    fn truncation_fallback_counts_chars() {
        let text = "é".repeat(150);
        let c = card(&text, vec![]);
        assert_eq!(extract(&c).chars().count(), 100);
    }

    #[test]
    fn location_skips_headline_duplicate() {
        let c = card(
            "",
            vec![
                Fragment::new(FragmentKind::Emphasized, "AI Engineer"),
                Fragment::new(FragmentKind::DeEmphasized, "AI Engineer"),
                Fragment::new(FragmentKind::DeEmphasized, "Caracas, Venezuela"),
            ],
        );
        let h = extract(&c);
        assert_eq!(location(&c, &h).as_deref(), Some("caracas, venezuela"));
    }

    #[test]
    fn no_muted_fragment_means_no_location() {
        let c = card("AI Engineer · Caracas", vec![]);
        assert_eq!(location(&c, "ai engineer"), None);
    }
}
