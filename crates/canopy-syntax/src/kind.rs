use std::fmt;

/// Language-assigned tag naming what an element is, e.g. `"ClassDeclaration"`
/// or `"WhitespaceTrivia"`.
///
/// Kinds are opaque to everything downstream of the producer and are only
/// ever compared as strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SyntaxKind(Box<str>);

impl SyntaxKind {
    /// Creates a kind from its tag.
    pub fn new(tag: impl Into<Box<str>>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SyntaxKind {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for SyntaxKind {
    fn from(tag: String) -> Self {
        Self::new(tag)
    }
}

impl PartialEq<str> for SyntaxKind {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for SyntaxKind {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
