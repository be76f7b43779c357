//! Conventional commit parsing
//!
//! Turns raw commit messages into [`CommitRecord`]s. Messages that break the
//! grammar are returned as [`RejectedCommit`]s with a reason code; nothing is
//! dropped, so `records.len() + rejected.len()` always equals the input length.
//!
//! Accepted shape:
//!
//! ```text
//! type(scope)!: subject
//!
//! optional body, lines up to 120 characters
//!
//! Token: value
//! Token #value
//! ```

use crate::domain::{
    CommitRecord, CommitType, Footer, RawCommit, RejectReason, RejectedCommit, Scope,
};
use crate::error::Result;
use regex::Regex;

pub const MAX_HEADER_LEN: usize = 100;
pub const MAX_BODY_LINE_LEN: usize = 120;

/// Records and rejections from one batch, each in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub records: Vec<CommitRecord>,
    pub rejected: Vec<RejectedCommit>,
}

impl ParseOutcome {
    pub fn total(&self) -> usize {
        self.records.len() + self.rejected.len()
    }
}

pub struct CommitParser {
    header: Regex,
    footer: Regex,
}

impl CommitParser {
    pub fn new() -> Result<Self> {
        Ok(CommitParser {
            header: Regex::new(
                r"^(?P<type>\w+)(?:\((?P<scope>[^()\r\n]*)\))?(?P<bang>!)?:(?P<sep> ?)(?P<subject>.*)$",
            )?,
            footer: Regex::new(
                r"^(?P<token>BREAKING CHANGE|BREAKING-CHANGE|[A-Za-z][A-Za-z0-9-]*)(?:: (?P<value>.*)| (?P<hash>#.*))$",
            )?,
        })
    }

    /// Parse a batch, keeping the caller's order
    pub fn parse(&self, raw: &[RawCommit]) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        for commit in raw {
            match self.parse_one(commit) {
                Ok(record) => outcome.records.push(record),
                Err(rejected) => {
                    tracing::warn!(
                        revision = %rejected.revision_id,
                        reason = %rejected.reason,
                        "rejected commit message"
                    );
                    outcome.rejected.push(rejected);
                }
            }
        }
        tracing::debug!(
            accepted = outcome.records.len(),
            rejected = outcome.rejected.len(),
            "parsed commit batch"
        );
        outcome
    }

    pub fn parse_one(&self, raw: &RawCommit) -> std::result::Result<CommitRecord, RejectedCommit> {
        let lines: Vec<&str> = raw.message.lines().map(|l| l.trim_end_matches('\r')).collect();
        let header = lines.first().copied().unwrap_or("");
        let captures = self.header.captures(header);
        let type_token = captures
            .as_ref()
            .and_then(|c| c.name("type"))
            .map(|m| m.as_str().to_string());

        let reject = |reason: RejectReason| RejectedCommit {
            commit_type: type_token.clone(),
            raw: raw.message.clone(),
            revision_id: raw.revision_id.clone(),
            reason,
        };

        if header.chars().count() > MAX_HEADER_LEN {
            return Err(reject(RejectReason::HeaderTooLong));
        }
        let Some(caps) = captures.as_ref() else {
            return Err(reject(RejectReason::InvalidHeader));
        };

        let commit_type = caps
            .name("type")
            .and_then(|m| m.as_str().parse::<CommitType>().ok())
            .ok_or_else(|| reject(RejectReason::UnknownType))?;

        let scope = match caps.name("scope") {
            Some(m) => Some(
                m.as_str()
                    .parse::<Scope>()
                    .map_err(|_| reject(RejectReason::UnknownScope))?,
            ),
            None => None,
        };

        let subject = caps.name("subject").map_or("", |m| m.as_str()).trim_end();
        if subject.trim().is_empty() {
            return Err(reject(RejectReason::EmptySubject));
        }
        if caps.name("sep").map_or(true, |m| m.as_str().is_empty()) || subject.starts_with(' ') {
            return Err(reject(RejectReason::InvalidHeader));
        }
        if subject.ends_with('.') {
            return Err(reject(RejectReason::TrailingPeriod));
        }
        if subject != subject.to_lowercase() {
            return Err(reject(RejectReason::NotLowerCase));
        }

        let rest = trim_trailing_blank(lines.get(1..).unwrap_or(&[]));
        // exactly one blank line between header and body
        let blank = |l: &&str| l.trim().is_empty();
        if rest.first().is_some_and(|l| !blank(l)) || rest.get(1).is_some_and(blank) {
            return Err(reject(RejectReason::MissingBlankLine));
        }

        let paragraphs = split_paragraphs(rest);
        let footer_start = paragraphs
            .iter()
            .rposition(|p| !p.first().is_some_and(|l| self.footer.is_match(l)))
            .map_or(0, |i| i + 1);

        let body_lines: Vec<&str> = paragraphs[..footer_start]
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                let sep: &[&str] = if i == 0 { &[] } else { &[""] };
                sep.iter().chain(p.iter()).copied().collect::<Vec<_>>()
            })
            .collect();
        if body_lines
            .iter()
            .any(|l| l.chars().count() > MAX_BODY_LINE_LEN)
        {
            return Err(reject(RejectReason::BodyLineTooLong));
        }
        let body = if body_lines.is_empty() {
            None
        } else {
            Some(body_lines.join("\n"))
        };

        let footers = self.parse_footers(&paragraphs[footer_start..]);
        let breaking = caps.name("bang").is_some() || footers.iter().any(Footer::is_breaking_change);

        Ok(CommitRecord {
            commit_type,
            scope,
            subject: subject.to_string(),
            body,
            footers,
            breaking,
            revision_id: raw.revision_id.clone(),
            timestamp: raw.timestamp,
        })
    }

    fn parse_footers(&self, paragraphs: &[Vec<&str>]) -> Vec<Footer> {
        let mut footers: Vec<Footer> = Vec::new();
        for line in paragraphs.iter().flatten() {
            if let Some(caps) = self.footer.captures(line) {
                let value = caps
                    .name("value")
                    .or_else(|| caps.name("hash"))
                    .map_or("", |m| m.as_str());
                footers.push(Footer {
                    token: caps["token"].to_string(),
                    value: value.to_string(),
                });
            } else if let Some(last) = footers.last_mut() {
                last.value.push('\n');
                last.value.push_str(line);
            }
        }
        footers
    }
}

fn trim_trailing_blank<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(0, |i| i + 1);
    &lines[..end]
}

/// Group lines into blank-line separated paragraphs
fn split_paragraphs<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut paragraphs = Vec::new();
    let mut current = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(*line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}
