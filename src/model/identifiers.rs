//! Identifier newtypes with smart constructors.
//!
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one countable page: `locale:pageId`, or bare `pageId` when no
/// locale applies.
///
/// Keys for the same page in different locales are distinct and never
/// affect one another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageKey(String);

impl PageKey {
    /// Smart constructor: validates a non-empty page id.
    ///
    /// An empty or missing locale yields the bare page id.
    pub fn new(page_id: &str, locale: Option<&str>) -> Result<Self, InvalidPageKey> {
        if page_id.is_empty() {
            return Err(InvalidPageKey::EmptyPageId);
        }
        match locale.filter(|l| !l.is_empty()) {
            Some(locale) => Ok(Self(format!("{locale}:{page_id}"))),
            None => Ok(Self(page_id.to_string())),
        }
    }

    /// The key as stored in the marker map.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of one visit session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Smart constructor: validates non-empty session ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidSessionId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidSessionId::Empty);
        }
        Ok(Self(raw))
    }

    /// The id as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = InvalidSessionId;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

// ===== Error Types =====

/// Rejected page key input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPageKey {
    /// Page id was empty.
    #[error("Page ID cannot be empty")]
    EmptyPageId,
}

/// Rejected session id input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidSessionId {
    /// Id was empty.
    #[error("Session ID cannot be empty")]
    Empty,
}

// ===== Tests =====
