//! Tree storage and borrowed element handles.

use std::fmt;

use text_size::TextRange;

use crate::SyntaxKind;

/// Owned syntax tree for a single source text.
pub struct SyntaxTree {
    pub(crate) root: Node,
    pub(crate) text: Box<str>,
}

impl SyntaxTree {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree").field("text_len", &self.text.len()).finish_non_exhaustive()
    }
}

/// Node-or-token wrapper used for node children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            Self::Node(node) => Some(node),
            Self::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            Self::Node(_) => None,
            Self::Token(token) => Some(token),
        }
    }
}

/// Direct child of a node.
pub type Child = NodeOrToken<Node, Token>;

impl Child {
    /// Returns a borrowed element handle for this child.
    #[inline]
    pub fn as_element(&self) -> SyntaxElement<'_> {
        match self {
            Self::Node(node) => SyntaxElement::Node(node),
            Self::Token(token) => SyntaxElement::Token(token),
        }
    }
}

/// Structural element owning an ordered sequence of child nodes and tokens.
#[derive(Debug)]
pub struct Node {
    pub(crate) kind: SyntaxKind,
    pub(crate) children: Vec<Child>,
    pub(crate) span: TextRange,
    pub(crate) full_span: TextRange,
    pub(crate) diagnostics: Vec<String>,
    pub(crate) contains_diagnostics: bool,
}

impl Node {
    /// Returns this node's kind.
    #[inline]
    pub fn kind(&self) -> &SyntaxKind {
        &self.kind
    }

    /// Returns the range covering significant content, trivia excluded.
    #[inline]
    pub fn span(&self) -> TextRange {
        self.span
    }

    /// Returns the range including all attached trivia.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.full_span
    }

    /// Returns the ordered child nodes and tokens.
    #[inline]
    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Returns the diagnostics attached directly to this node.
    #[inline]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Returns `true` if this node or any descendant carries a diagnostic.
    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.contains_diagnostics
    }
}

/// Terminal lexical unit owning its leading and trailing trivia.
#[derive(Debug)]
pub struct Token {
    pub(crate) kind: SyntaxKind,
    pub(crate) text: Box<str>,
    pub(crate) leading: Vec<Trivia>,
    pub(crate) trailing: Vec<Trivia>,
    pub(crate) span: TextRange,
    pub(crate) full_span: TextRange,
    pub(crate) diagnostics: Vec<String>,
    pub(crate) contains_diagnostics: bool,
}

impl Token {
    /// Returns this token's kind.
    #[inline]
    pub fn kind(&self) -> &SyntaxKind {
        &self.kind
    }

    /// Returns the token text, trivia excluded.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the token range, trivia excluded.
    #[inline]
    pub fn span(&self) -> TextRange {
        self.span
    }

    /// Returns the token range including attached trivia.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.full_span
    }

    /// Returns the ordered leading trivia.
    #[inline]
    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading
    }

    /// Returns the ordered trailing trivia.
    #[inline]
    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing
    }

    /// Returns `true` if any trivia is attached to this token.
    #[inline]
    pub fn has_trivia(&self) -> bool {
        !self.leading.is_empty() || !self.trailing.is_empty()
    }

    /// Returns the diagnostics attached directly to this token.
    #[inline]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Returns `true` if this token or its trivia carries a diagnostic.
    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.contains_diagnostics
    }
}

/// Non-semantic text attached to a token.
///
/// A trivia piece may carry a nested structured subtree, e.g. a documentation
/// comment or a preprocessing directive with inner syntax.
#[derive(Debug)]
pub struct Trivia {
    pub(crate) kind: SyntaxKind,
    pub(crate) text: Box<str>,
    pub(crate) span: TextRange,
    pub(crate) structure: Option<Box<Node>>,
    pub(crate) diagnostics: Vec<String>,
    pub(crate) contains_diagnostics: bool,
}

impl Trivia {
    /// Returns this trivia's kind.
    #[inline]
    pub fn kind(&self) -> &SyntaxKind {
        &self.kind
    }

    /// Returns the trivia text.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the trivia range.
    #[inline]
    pub fn span(&self) -> TextRange {
        self.span
    }

    /// Returns the trivia range; equal to [`Self::span`], kept for symmetry
    /// with nodes and tokens.
    #[inline]
    pub fn full_span(&self) -> TextRange {
        self.span
    }

    /// Returns `true` if this trivia carries a structured subtree.
    #[inline]
    pub fn has_structure(&self) -> bool {
        self.structure.is_some()
    }

    /// Returns the structured subtree, if any.
    #[inline]
    pub fn structure(&self) -> Option<&Node> {
        self.structure.as_deref()
    }

    /// Returns the diagnostics attached directly to this trivia.
    #[inline]
    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    /// Returns `true` if this trivia or its structure carries a diagnostic.
    #[inline]
    pub fn contains_diagnostics(&self) -> bool {
        self.contains_diagnostics
    }
}

/// Borrowed handle over any element in the tree.
#[derive(Clone, Copy, Debug)]
pub enum SyntaxElement<'a> {
    Node(&'a Node),
    Token(&'a Token),
    Trivia(&'a Trivia),
}

impl<'a> SyntaxElement<'a> {
    /// Returns the element's kind.
    pub fn kind(self) -> &'a SyntaxKind {
        match self {
            Self::Node(node) => node.kind(),
            Self::Token(token) => token.kind(),
            Self::Trivia(trivia) => trivia.kind(),
        }
    }

    /// Returns the range covering significant content.
    pub fn span(self) -> TextRange {
        match self {
            Self::Node(node) => node.span(),
            Self::Token(token) => token.span(),
            Self::Trivia(trivia) => trivia.span(),
        }
    }

    /// Returns the range including attached trivia.
    pub fn full_span(self) -> TextRange {
        match self {
            Self::Node(node) => node.full_span(),
            Self::Token(token) => token.full_span(),
            Self::Trivia(trivia) => trivia.full_span(),
        }
    }

    /// Returns the diagnostics attached directly to the element.
    pub fn diagnostics(self) -> &'a [String] {
        match self {
            Self::Node(node) => node.diagnostics(),
            Self::Token(token) => token.diagnostics(),
            Self::Trivia(trivia) => trivia.diagnostics(),
        }
    }

    /// Returns `true` if the element or any descendant carries a diagnostic.
    pub fn contains_diagnostics(self) -> bool {
        match self {
            Self::Node(node) => node.contains_diagnostics(),
            Self::Token(token) => token.contains_diagnostics(),
            Self::Trivia(trivia) => trivia.contains_diagnostics(),
        }
    }

    /// Returns the underlying node, if this is one.
    pub fn as_node(self) -> Option<&'a Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the underlying token, if this is one.
    pub fn as_token(self) -> Option<&'a Token> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }

    /// Returns the underlying trivia, if this is one.
    pub fn as_trivia(self) -> Option<&'a Trivia> {
        match self {
            Self::Trivia(trivia) => Some(trivia),
            _ => None,
        }
    }
}
