use crate::model::ScoredCandidate;
use crate::parser::blocks::PROFILE_MARKER;

/// Stable dedup key: the profile path segment after the marker, query string removed.
/// Falls back to `candidate_{position}` when the locator has no profile segment.
pub fn candidate_id(locator: &str, position: usize) -> String {
    locator
        .find(PROFILE_MARKER)
        .map(|idx| &locator[idx + PROFILE_MARKER.len()..])
        .map(|rest| {
            let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
            rest[..end].trim()
        })
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("candidate_{}", position))
}

/// Highest score first. Stable: equal scores keep extraction order.
pub fn rank(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoreBreakdown;

    fn candidate(id: &str, total: u32) -> ScoredCandidate {
        let breakdown = ScoreBreakdown::new(total.min(50), 0, 0, 0);
        ScoredCandidate {
            id: id.to_string(),
            name: id.to_string(),
            skills: vec![],
            experience_years: 0,
            location_display: "N/A".into(),
            company: "n/a".into(),
            profile_locator: String::new(),
            relevance_score: breakdown.total,
            score_breakdown: breakdown,
        }
    }

    #[test]
    fn id_from_profile_path() {
        assert_eq!(
            candidate_id("https://www.linkedin.com/in/jane-doe?miniProfileUrn=abc", 1),
            "jane-doe"
        );
        assert_eq!(candidate_id("https://www.linkedin.com/in/john-smith-42/", 2), "john-smith-42");
        assert_eq!(candidate_id("/in/ana-perez", 3), "ana-perez");
    }

    #[test]
    fn id_fallback_is_positional() {
        assert_eq!(candidate_id("", 4), "candidate_4");
        assert_eq!(candidate_id("https://example.com/people/jane", 2), "candidate_2");
        assert_eq!(candidate_id("https://www.linkedin.com/in/?x=1", 7), "candidate_7");
    }

    #[test]
    fn same_locator_same_id() {
        let url = "https://www.linkedin.com/in/maria-gonzalez?miniProfileUrn=urn";
        assert_eq!(candidate_id(url, 1), candidate_id(url, 9));
    }

    #[test]
    fn rank_descending_and_stable() {
        let mut list = vec![
            candidate("a", 25),
            candidate("b", 50),
            candidate("c", 25),
            candidate("d", 0),
            candidate("e", 50),
        ];
        rank(&mut list);
        let ids: Vec<_> = list.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "e", "a", "c", "d"]);
    }
}
