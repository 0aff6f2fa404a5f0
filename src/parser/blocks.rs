use std::sync::LazyLock;

use regex::Regex;

static SINGLE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[([^\]]*)\]\(([^)]+)\)$").unwrap());
static INLINE_LINKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap());
static CLOSE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\]\(([^)]+)\)(.*)$").unwrap());
static STRONG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\*\*(.+)\*\*|__(.+)__)$").unwrap());
static MUTED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\*([^*].*)\*|_([^_].*)_)$").unwrap());
static RULE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static BLANKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Path segment that marks a link as pointing at a person's profile.
pub const PROFILE_MARKER: &str = "/in/";

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    ProfileLink { text: String, url: String },
    Link { text: String, url: String },
    Strong(String),
    Muted(String),
    Rule,
    Text(String),
    Empty,
}

impl Block {
    /// Visible text of the block, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::ProfileLink { text, .. } | Block::Link { text, .. } => {
                Some(text.as_str()).filter(|t| !t.is_empty())
            }
            Block::Strong(t) | Block::Muted(t) | Block::Text(t) => Some(t.as_str()),
            Block::Rule | Block::Empty => None,
        }
    }
}

pub fn classify_lines(markdown: &str) -> Vec<Block> {
    let markdown = strip_images(markdown);
    if markdown.trim().is_empty() {
        return vec![Block::Empty];
    }

    let lines: Vec<&str> = markdown.lines().collect();
    let mut blocks = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if line.is_empty() {
            blocks.push(Block::Empty);
            i += 1;
            continue;
        }

        // ── Horizontal rule: card separator ──
        if RULE_RE.is_match(line) {
            blocks.push(Block::Rule);
            i += 1;
            continue;
        }

        // ── Multi-line link: "[" on its own, text, then "](url)" ──
        if line == "[" {
            i = consume_multiline_link(&lines, i, &mut blocks);
            continue;
        }

        // ── Stray ](url), possibly followed by another "[" ──
        if line.starts_with("](") {
            if let Some(caps) = CLOSE_LINK_RE.captures(line) {
                emit_link("", &caps[1], &mut blocks);
                if caps[2].trim() == "[" {
                    i = consume_multiline_link(&lines, i + 1, &mut blocks);
                    continue;
                }
            }
            i += 1;
            continue;
        }

        // ── Single link on the line ──
        if let Some(caps) = SINGLE_LINK_RE.captures(line) {
            emit_link(&caps[1], &caps[2], &mut blocks);
            i += 1;
            continue;
        }

        // ── Several inline links, or a line ending in "[" ──
        if line.contains("](") && line.contains('[') {
            let rest = INLINE_LINKS_RE.replace_all(line, "");
            for caps in INLINE_LINKS_RE.captures_iter(line) {
                emit_link(&caps[1], &caps[2], &mut blocks);
            }
            let rest = rest.trim().trim_end_matches('[').trim();
            if !rest.is_empty() {
                blocks.push(Block::Text(rest.to_string()));
            }
            if line.ends_with('[') {
                i = consume_multiline_link(&lines, i + 1, &mut blocks);
                continue;
            }
            i += 1;
            continue;
        }

        // ── Emphasis ──
        if let Some(caps) = STRONG_RE.captures(line) {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str()).trim();
            // "** **" style decoration carries no text
            blocks.push(if inner.is_empty() {
                Block::Empty
            } else {
                Block::Strong(inner.to_string())
            });
            i += 1;
            continue;
        }
        if let Some(caps) = MUTED_RE.captures(line) {
            let inner = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str()).trim();
            blocks.push(if inner.is_empty() {
                Block::Empty
            } else {
                Block::Muted(inner.to_string())
            });
            i += 1;
            continue;
        }

        blocks.push(Block::Text(line.to_string()));
        i += 1;
    }

    blocks
}

/// Consume a multi-line link starting at `start` (a "[" line or the line after a trailing "[").
/// Returns the next line index to process.
fn consume_multiline_link(lines: &[&str], start: usize, blocks: &mut Vec<Block>) -> usize {
    let mut text_parts = Vec::new();
    let mut j = start;

    if j < lines.len() && lines[j].trim() == "[" {
        j += 1;
    }

    while j < lines.len() {
        let l = lines[j].trim();
        if let Some(url_part) = l.strip_prefix("](") {
            let (url, has_trailing_open) = if let Some(end) = url_part.find(')') {
                let rest = url_part[end + 1..].trim();
                (&url_part[..end], rest == "[" || rest.ends_with('['))
            } else {
                (url_part.trim_end_matches(')'), false)
            };

            let text = text_parts.join(" ");
            emit_link(&text, url, blocks);

            if has_trailing_open {
                return consume_multiline_link(lines, j + 1, blocks);
            }
            return j + 1;
        }
        if !l.is_empty() {
            text_parts.push(l);
        }
        j += 1;
    }

    // never closed: keep the words as plain text
    for part in text_parts {
        blocks.push(Block::Text(part.to_string()));
    }
    j
}

fn emit_link(text: &str, url: &str, blocks: &mut Vec<Block>) {
    let text = text.trim().to_string();
    let url = url.trim().to_string();
    if url.contains(PROFILE_MARKER) {
        blocks.push(Block::ProfileLink { text, url });
    } else {
        blocks.push(Block::Link { text, url });
    }
}

/// Remove markdown image syntax and squeeze the blank runs it leaves behind.
fn strip_images(md: &str) -> String {
    let cleaned = IMAGE_RE.replace_all(md, "");
    BLANKS_RE.replace_all(&cleaned, "\n\n").to_string()
}
