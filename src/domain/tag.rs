use crate::domain::version::SemanticVersion;
use serde::Serialize;

/// A git tag and the revision it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub target: String,
}

impl Tag {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            target: target.into(),
        }
    }
}

/// Tag naming: `{prefix}{version}` (e.g. prefix "v" -> "v1.2.3")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPattern {
    pub prefix: String,
}

impl TagPattern {
    pub fn new(prefix: impl Into<String>) -> Self {
        TagPattern {
            prefix: prefix.into(),
        }
    }

    /// Format a version according to pattern
    pub fn format(&self, version: &SemanticVersion) -> String {
        format!("{}{}", self.prefix, version)
    }

    /// Version encoded in `tag`, or `None` when the tag is not `{prefix}{semver}`
    pub fn parse_version(&self, tag: &str) -> Option<SemanticVersion> {
        tag.strip_prefix(self.prefix.as_str())?.parse().ok()
    }

    /// Does the tag carry this pattern's prefix at all
    pub fn has_prefix(&self, tag: &str) -> bool {
        tag.starts_with(self.prefix.as_str())
    }

    /// Glob selecting every tag with this prefix
    pub fn glob_all(&self) -> String {
        format!("{}*", glob_escape(&self.prefix))
    }

    /// Glob selecting the pre-release tags of `channel` for any core version
    pub fn glob_channel(&self, channel: &str) -> String {
        format!("{}*-{}.*", glob_escape(&self.prefix), glob_escape(channel))
    }
}

fn glob_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '?' | '[' | ']') {
            escaped.push('[');
            escaped.push(c);
            escaped.push(']');
        } else {
            escaped.push(c);
        }
    }
    escaped
}
