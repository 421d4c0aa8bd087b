//! Query expressions
//!
//! A [`Query`] is an immutable strategy/value pair. Its [`Confidence`] is a pure
//! function of the expression: an absolute path or an id lookup addresses its
//! target from the document root, everything else needs an enclosing scope.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::{Error, Result};

/// Locator strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Path expression (XPath)
    #[serde(rename = "xpath")]
    XPath,
    /// Element id
    Id,
    /// CSS selector
    Css,
    /// `name` attribute
    Name,
    /// Class name
    ClassName,
    /// Tag name
    TagName,
    /// Exact link text
    LinkText,
    /// Partial link text
    PartialLinkText,
}

impl Strategy {
    /// Strategy name as used on the wire
    pub fn as_w3c(&self) -> &'static str {
        match self {
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::Css => "css selector",
            Strategy::Name => "name",
            Strategy::ClassName => "class name",
            Strategy::TagName => "tag name",
            Strategy::LinkText => "link text",
            Strategy::PartialLinkText => "partial link text",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_w3c())
    }
}

/// Addressing confidence of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    /// Identifies its target from the document root without any ancestor scope
    Confident,
    /// Depends on being evaluated under some scope
    Relative,
}

/// A classified locator value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    strategy: Strategy,
    value: String,
}

impl Query {
    /// Create a query from a strategy and a value
    pub fn new<S: Into<String>>(strategy: Strategy, value: S) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// XPath expression
    pub fn xpath<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Element id lookup
    pub fn id<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// CSS selector
    pub fn css<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// `name` attribute lookup
    pub fn name<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// Class name lookup
    pub fn class_name<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::ClassName, value)
    }

    /// Tag name lookup
    pub fn tag_name<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::TagName, value)
    }

    /// Exact link text lookup
    pub fn link_text<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::LinkText, value)
    }

    /// Partial link text lookup
    pub fn partial_link_text<S: Into<String>>(value: S) -> Self {
        Self::new(Strategy::PartialLinkText, value)
    }

    /// The empty path: the document root itself, no further narrowing
    pub fn empty() -> Self {
        Self::xpath("")
    }

    /// Locator strategy
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Strategy-specific value, as given
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether this is the empty path
    pub fn is_empty(&self) -> bool {
        self.strategy == Strategy::XPath && self.value.trim().is_empty()
    }

    /// Classify the query
    pub fn classify(&self) -> Confidence {
        let confident = match self.strategy {
            Strategy::Id => true,
            Strategy::XPath => self.value.trim_start().trim_start_matches('(').starts_with('/'),
            _ => false,
        };

        if confident {
            Confidence::Confident
        } else {
            Confidence::Relative
        }
    }

    /// Whether the query addresses its target from the document root
    pub fn is_confident(&self) -> bool {
        self.classify() == Confidence::Confident
    }

    /// Whether the query can take part in path concatenation
    pub fn is_path_expressible(&self) -> bool {
        matches!(self.strategy, Strategy::XPath | Strategy::Id)
    }

    /// Path form of the query, if it has one. Surrounding whitespace is
    /// dropped.
    pub fn as_path(&self) -> Option<Cow<'_, str>> {
        match self.strategy {
            Strategy::XPath => Some(Cow::Borrowed(self.value.trim())),
            Strategy::Id => Some(Cow::Owned(format!("//*[@id={}]", xpath_literal(&self.value)))),
            _ => None,
        }
    }

    /// Build the path that finds `other` inside the result of `self`.
    ///
    /// Fails with [`Error::UnsupportedConcatenation`] when either operand has
    /// no path form.
    pub fn concat(&self, other: &Query) -> Result<Query> {
        let prefix = self.as_path().ok_or_else(|| {
            Error::unsupported_concatenation(format!("{} cannot be used as a path prefix", self))
        })?;
        let suffix = other.as_path().ok_or_else(|| {
            Error::unsupported_concatenation(format!("{} cannot be appended to a path", other))
        })?;

        Ok(Query::xpath(format!("{}{}", prefix, path_tail(&suffix))))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy, self.value)
    }
}

/// Rewrite a path so it can be appended to a prefix.
///
/// `.` and `""` contribute nothing, a leading `.` before `/` is dropped, and a
/// bare step gets a child separator.
fn path_tail(path: &str) -> Cow<'_, str> {
    if path.is_empty() || path == "." {
        Cow::Borrowed("")
    } else if let Some(rest) = path.strip_prefix("./") {
        Cow::Owned(format!("/{}", rest))
    } else if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{}", path))
    }
}

/// Quote a string as an XPath literal
fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
