//! Trailing vote annotation parser.
//!
//! Replies may end with a machine-readable tag:
//!
//! ```text
//! ...visible reply text. <META stance=1 proposal="Go nuclear">
//! ```
//!
//! The tag is always removed from the visible text. A missing tag, an
//! unterminated tag or a stance outside `-1..=1` yields a neutral vote.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Trailing `<META ...>` tag, possibly missing its closing bracket. Quoted
/// values may contain `>`; group 2 is set only when the tag is closed.
static TRAILING_TAG: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?is)<\s*META\b((?:"[^"]*"|[^>"])*(?:"[^"]*)?)(>)?\s*$"#).ok()
});

/// Whole integer stance; `1.5` or `1x` do not match.
static STANCE_ATTR: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bstance\s*=\s*["']?([+-]?\d+)(?:["'\s]|$)"#).ok()
});

static PROPOSAL_ATTR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?is)\bproposal\s*=\s*"([^"]*)""#).ok());

/// A structured position extracted from one reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    /// -1 against, 0 neutral, +1 for.
    pub stance: i8,
    pub proposal: String,
}

impl Vote {
    pub fn neutral() -> Self {
        Vote::default()
    }

    pub fn new(stance: i8, proposal: &str) -> Self {
        Vote {
            stance: stance.signum(),
            proposal: proposal.trim().to_string(),
        }
    }

    pub fn has_proposal(&self) -> bool {
        !self.proposal.is_empty()
    }
}

/// Visible reply text plus the vote it carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedReply {
    pub text: String,
    pub vote: Vote,
}

/// Splits a raw reply into visible text and vote.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(tag) = TRAILING_TAG.as_ref() else {
        return ParsedReply {
            text: raw.trim().to_string(),
            vote: Vote::neutral(),
        };
    };

    match tag.captures(raw) {
        Some(caps) => {
            let start = caps.get(0).map(|m| m.start()).unwrap_or(raw.len());
            let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let vote = if caps.get(2).is_some() {
                parse_attrs(attrs)
            } else {
                Vote::neutral()
            };
            ParsedReply {
                text: raw[..start].trim().to_string(),
                vote,
            }
        }
        None => ParsedReply {
            text: raw.trim().to_string(),
            vote: Vote::neutral(),
        },
    }
}

fn parse_attrs(attrs: &str) -> Vote {
    let stance = STANCE_ATTR
        .as_ref()
        .and_then(|re| re.captures(attrs))
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<i32>().ok());

    let stance = match stance {
        Some(s @ -1..=1) => s as i8,
        _ => return Vote::neutral(),
    };

    let proposal = PROPOSAL_ATTR
        .as_ref()
        .and_then(|re| re.captures(attrs))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");

    Vote::new(stance, proposal)
}

/// Grouping key for proposals: trimmed, lower-cased, single-spaced.
pub fn normalize_proposal(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
