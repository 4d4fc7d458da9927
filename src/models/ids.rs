//! Clan/player tags and deterministic content-hash IDs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

/// Characters the game allows in clan and player tags.
const TAG_ALPHABET: &str = "0289PYLQGRJCUV";

/// Errors raised when validating a user-supplied tag.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag is empty")]
    Empty,

    #[error("Tag {tag} contains invalid character '{ch}'")]
    InvalidCharacter { tag: String, ch: char },
}

/// A clan or player tag in canonical form: uppercase, without the leading `#`.
///
/// Tags compare case-insensitively and ignore the `#` prefix because every
/// constructor normalizes. Serialized back out in display form (`#TAG`).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Tag(String);

impl Tag {
    /// Normalize any tag-ish string without validating it.
    ///
    /// Input data from the API is trusted to carry real tags; use
    /// [`Tag::parse`] for anything typed by a user.
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let stripped = trimmed.strip_prefix('#').unwrap_or(trimmed);
        Self(stripped.trim().to_ascii_uppercase())
    }

    /// Normalize and validate against the game's tag alphabet.
    ///
    /// URL-encoded prefixes (`%23`) are accepted since tags arrive in paths.
    pub fn parse(raw: &str) -> Result<Self, TagError> {
        let raw = raw.trim();
        let raw = raw.strip_prefix("%23").unwrap_or(raw);
        let tag = Self::normalize(raw);
        if tag.0.is_empty() {
            return Err(TagError::Empty);
        }
        if let Some(ch) = tag.0.chars().find(|c| !TAG_ALPHABET.contains(*c)) {
            return Err(TagError::InvalidCharacter {
                tag: tag.0.clone(),
                ch,
            });
        }
        Ok(tag)
    }

    /// Canonical form (no `#`).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form used in API paths: `%23TAG`.
    pub fn url_encoded(&self) -> String {
        format!("%23{}", self.0)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self::normalize(&s)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.to_string()
    }
}

/// A deterministic ID derived from content hash.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Generate an EntityId from input fields.
    /// Uses SHA256 and takes the first 16 characters for brevity.
    pub fn generate(fields: &[&str]) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.as_bytes());
        }
        let hash = hex::encode(hasher.finalize());
        Self(hash[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// Dedup key for a war record.
pub type WarKey = EntityId;
