//! Bullet Extractor: turns raw job-description text into candidate requirement lines.
//!
//! Headings, blank lines, and bullet glyphs are stripped according to a
//! `BulletPolicy`, which can be tuned per posting style from a JSON file.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HEADINGS: &[&str] = &[
    "Key Responsibilities",
    "Required Skills & Qualifications",
    "Must-Have Skills",
    "Good-to-Have Skills",
    "About the Role",
    "Job Description",
    "Minimum Qualifications",
];

/// Capitalized line of words ending in a colon, e.g. "Nice to Have:".
/// `\s` is Unicode-aware, so pasted non-breaking spaces still match.
pub const DEFAULT_HEADING_PATTERN: &str = r"^[A-Z][A-Za-z0-9\s&/]+:\s*$";

/// Checked in order; only the first match is stripped.
pub const DEFAULT_MARKERS: &[&str] = &["•", "✅", "-", "✔", "▶"];

/// A single candidate requirement taken from one line of the job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    pub text: String,
    /// Zero-based line index in the source text.
    pub line: usize,
}

/// A non-empty, trimmed resume line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeLine {
    pub text: String,
    pub line: usize,
}

/// On-disk shape of a policy file. Missing fields fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletPolicyFile {
    #[serde(default = "default_headings")]
    pub headings: Vec<String>,
    #[serde(default = "default_pattern")]
    pub heading_pattern: String,
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

fn default_headings() -> Vec<String> {
    DEFAULT_HEADINGS.iter().map(|s| s.to_string()).collect()
}

fn default_pattern() -> String {
    DEFAULT_HEADING_PATTERN.to_string()
}

fn default_markers() -> Vec<String> {
    DEFAULT_MARKERS.iter().map(|s| s.to_string()).collect()
}

/// Heading strings, heading-shape pattern, and bullet glyphs used by the extractor.
#[derive(Debug, Clone)]
pub struct BulletPolicy {
    headings: HashSet<String>,
    heading_pattern: Regex,
    markers: Vec<String>,
}

impl BulletPolicy {
    pub fn new(file: BulletPolicyFile) -> Result<Self> {
        let heading_pattern = Regex::new(&file.heading_pattern)
            .with_context(|| format!("Invalid heading pattern '{}'", file.heading_pattern))?;
        Ok(Self {
            headings: file.headings.into_iter().collect(),
            heading_pattern,
            markers: file.markers.into_iter().filter(|m| !m.is_empty()).collect(),
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bullet policy {}", path.display()))?;
        let file: BulletPolicyFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse bullet policy {}", path.display()))?;
        Self::new(file)
    }

    fn is_heading(&self, line: &str) -> bool {
        self.headings.contains(line) || self.heading_pattern.is_match(line)
    }

    fn strip_marker<'a>(&self, line: &'a str) -> &'a str {
        self.markers
            .iter()
            .find_map(|m| line.strip_prefix(m.as_str()))
            .map(str::trim)
            .unwrap_or(line)
    }
}

impl Default for BulletPolicy {
    fn default() -> Self {
        Self {
            headings: default_headings().into_iter().collect(),
            heading_pattern: Regex::new(DEFAULT_HEADING_PATTERN)
                .expect("default heading pattern is valid"),
            markers: default_markers(),
        }
    }
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Splits on every line boundary, not just `\n` and `\r\n`: a lone `\r`,
/// vertical tab, form feed, NEL and the Unicode line/paragraph separators all
/// end a line. `\r\n` counts as one boundary. A trailing break adds no line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' && matches!(chars.peek(), Some((_, '\n'))) {
            chars.next();
            start += 1;
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Extracts candidate requirement bullets in encounter order. Never fails;
/// unrecognizable input just yields fewer bullets.
pub fn extract_bullets(text: &str, policy: &BulletPolicy) -> Vec<Bullet> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .filter_map(|(line, raw)| {
            let s = raw.trim();
            if s.is_empty() || policy.is_heading(s) {
                return None;
            }
            let s = policy.strip_marker(s);
            (!s.is_empty()).then(|| Bullet {
                text: s.to_string(),
                line,
            })
        })
        .collect()
}

/// Splits resume text into trimmed, non-empty lines. No heading or marker handling.
pub fn split_resume_lines(text: &str) -> Vec<ResumeLine> {
    split_lines(text)
        .into_iter()
        .enumerate()
        .filter_map(|(line, raw)| {
            let s = raw.trim();
            (!s.is_empty()).then(|| ResumeLine {
                text: s.to_string(),
                line,
            })
        })
        .collect()
}
