use super::headline::SEPARATOR;

/// Tried in order; the first one present in the headline wins.
const DELIMITERS: &[&str] = &[" at ", " | ", " · ", "@"];

/// Current company from a (lowercased) headline. The first delimiter kind present wins and
/// the text after its last occurrence is kept, cut at any other delimiter or separator,
/// commas stripped.
pub fn from_headline(headline: &str) -> Option<String> {
    let headline = headline.to_lowercase();
    let (delim, idx) = DELIMITERS
        .iter()
        .find_map(|d| headline.rfind(d).map(|idx| (*d, idx)))?;

    let tail = &headline[idx + delim.len()..];
    let end = DELIMITERS
        .iter()
        .filter_map(|d| tail.find(d))
        .chain(tail.find(SEPARATOR))
        .min()
        .unwrap_or(tail.len());

    let company = tail[..end].replace(',', "").trim().to_string();
    if company.is_empty() {
        None
    } else {
        Some(company)
    }
}
