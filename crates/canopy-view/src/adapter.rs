//! Read-only capability surface over the externally-owned syntax tree.
//!
//! Everything the mirror knows about an element flows through this module;
//! the underlying tree is borrowed, never copied or mutated.

use canopy_syntax::SyntaxElement;
use text_size::TextRange;

/// Which of the three element classes a mirror item reflects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxCategory {
    Node,
    Token,
    Trivia,
}

/// Position of a trivia piece relative to its owning token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriviaSide {
    Leading,
    Trailing,
}

pub(crate) fn category_of(element: SyntaxElement<'_>) -> SyntaxCategory {
    match element {
        SyntaxElement::Node(_) => SyntaxCategory::Node,
        SyntaxElement::Token(_) => SyntaxCategory::Token,
        SyntaxElement::Trivia(_) => SyntaxCategory::Trivia,
    }
}

pub(crate) fn kind_of<'t>(element: SyntaxElement<'t>) -> &'t str {
    element.kind().as_str()
}

pub(crate) fn span_of(element: SyntaxElement<'_>) -> TextRange {
    element.span()
}

pub(crate) fn full_span_of(element: SyntaxElement<'_>) -> TextRange {
    element.full_span()
}

pub(crate) fn contains_diagnostics(element: SyntaxElement<'_>) -> bool {
    element.contains_diagnostics()
}

pub(crate) fn diagnostics_of<'t>(element: SyntaxElement<'t>) -> &'t [String] {
    element.diagnostics()
}

/// Returns `true` if the element has anything to show beneath it: child
/// nodes/tokens for a node, any trivia for a token, a structured subtree for
/// trivia.
pub(crate) fn has_children(element: SyntaxElement<'_>) -> bool {
    match element {
        SyntaxElement::Node(node) => !node.children().is_empty(),
        SyntaxElement::Token(token) => token.has_trivia(),
        SyntaxElement::Trivia(trivia) => trivia.has_structure(),
    }
}

/// Enumerates the element's children in display order, labelling trivia with
/// the side of the token it is attached to.
pub(crate) fn child_elements<'t>(
    element: SyntaxElement<'t>,
) -> Vec<(SyntaxElement<'t>, Option<TriviaSide>)> {
    match element {
        SyntaxElement::Node(node) => {
            node.children().iter().map(|child| (child.as_element(), None)).collect()
        }
        SyntaxElement::Token(token) => {
            let leading = token
                .leading_trivia()
                .iter()
                .map(|trivia| (SyntaxElement::Trivia(trivia), Some(TriviaSide::Leading)));
            let trailing = token
                .trailing_trivia()
                .iter()
                .map(|trivia| (SyntaxElement::Trivia(trivia), Some(TriviaSide::Trailing)));
            leading.chain(trailing).collect()
        }
        SyntaxElement::Trivia(trivia) => match trivia.structure() {
            Some(structure) => vec![(SyntaxElement::Node(structure), None)],
            None => Vec::new(),
        },
    }
}
