//! Immutable, full-fidelity syntax tree with attached trivia.
//!
//! The tree is built once through [`Builder`] and then only ever read. Every
//! character of the source text is accounted for: tokens own their leading
//! and trailing trivia, and trivia may itself carry a nested structured
//! subtree.

mod builder;
mod kind;
mod tree;

/// Event-driven constructor for a [`SyntaxTree`].
pub use builder::Builder;
/// String-tagged element kinds.
pub use kind::SyntaxKind;
/// Tree types and borrowed element handles.
pub use tree::{Child, Node, NodeOrToken, SyntaxElement, SyntaxTree, Token, Trivia};
