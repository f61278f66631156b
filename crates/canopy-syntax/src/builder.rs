//! Event-driven builder for the immutable syntax tree.

use std::mem;

use text_size::{TextLen, TextRange};

use crate::tree::{Child, Node, SyntaxTree, Token, Trivia};
use crate::SyntaxKind;

/// Builds a [`SyntaxTree`] from open/close events.
///
/// Trivia registered with [`Builder::trivia`] becomes the leading trivia of
/// the next token; [`Builder::trailing_trivia`] attaches to the most recently
/// added token of the open node. Spans are assigned from the running text
/// position, so the finished tree is lossless by construction.
pub struct Builder {
    text: String,
    stack: Vec<Frame>,
    pending_leading: Vec<Trivia>,
    root: Option<Node>,
    last_added: LastAdded,
}

enum Frame {
    Node { kind: SyntaxKind, children: Vec<Child> },
    Structure { kind: SyntaxKind, node: Option<Node> },
}

/// Where [`Builder::diagnostic`] attaches its message.
#[derive(Clone, Copy, PartialEq, Eq)]
enum LastAdded {
    None,
    PendingTrivia,
    Child,
    TrailingTrivia,
    Root,
}

impl Drop for Builder {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.stack.is_empty() {
            panic!("you should call `Builder::finish_node()`");
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            text: String::new(),
            stack: Vec::new(),
            pending_leading: Vec::new(),
            root: None,
            last_added: LastAdded::None,
        }
    }

    fn push_text(&mut self, text: &str) -> TextRange {
        let start = self.text.text_len();
        self.text.push_str(text);
        TextRange::new(start, self.text.text_len())
    }

    /// Opens a node; children added until the matching
    /// [`Builder::finish_node`] belong to it.
    pub fn start_node(&mut self, kind: impl Into<SyntaxKind>) {
        self.stack.push(Frame::Node { kind: kind.into(), children: Vec::new() });
    }

    /// Closes the innermost open node, computing its spans from its children.
    pub fn finish_node(&mut self) {
        let Some(Frame::Node { kind, children }) = self.stack.pop() else {
            panic!("unbalanced `Builder::finish_node()`");
        };

        let empty = TextRange::empty(self.text.text_len());
        let full_span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => TextRange::new(
                first.as_element().full_span().start(),
                last.as_element().full_span().end(),
            ),
            _ => empty,
        };
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => {
                TextRange::new(first.as_element().span().start(), last.as_element().span().end())
            }
            _ => empty,
        };

        let node = Node {
            kind,
            children,
            span,
            full_span,
            diagnostics: Vec::new(),
            contains_diagnostics: false,
        };

        match self.stack.last_mut() {
            Some(Frame::Node { children, .. }) => {
                children.push(Child::Node(node));
                self.last_added = LastAdded::Child;
            }
            Some(Frame::Structure { node: slot, .. }) => {
                assert!(slot.is_none(), "structured trivia holds a single node");
                *slot = Some(node);
                self.last_added = LastAdded::Child;
            }
            None => {
                assert!(self.root.is_none(), "a tree has a single root node");
                self.root = Some(node);
                self.last_added = LastAdded::Root;
            }
        }
    }

    /// Adds a token to the open node, consuming any pending leading trivia.
    pub fn token(&mut self, kind: impl Into<SyntaxKind>, text: &str) {
        let leading = mem::take(&mut self.pending_leading);
        let full_start = match leading.first() {
            Some(trivia) => trivia.span.start(),
            None => self.text.text_len(),
        };
        let span = self.push_text(text);
        let token = Token {
            kind: kind.into(),
            text: text.into(),
            leading,
            trailing: Vec::new(),
            span,
            full_span: TextRange::new(full_start, span.end()),
            diagnostics: Vec::new(),
            contains_diagnostics: false,
        };

        match self.stack.last_mut() {
            Some(Frame::Node { children, .. }) => children.push(Child::Token(token)),
            Some(Frame::Structure { .. }) => {
                panic!("structured trivia must contain a single node")
            }
            None => panic!("a token requires an open node"),
        }
        self.last_added = LastAdded::Child;
    }

    /// Registers trivia that becomes leading trivia of the next token.
    pub fn trivia(&mut self, kind: impl Into<SyntaxKind>, text: &str) {
        let span = self.push_text(text);
        self.pending_leading.push(Trivia {
            kind: kind.into(),
            text: text.into(),
            span,
            structure: None,
            diagnostics: Vec::new(),
            contains_diagnostics: false,
        });
        self.last_added = LastAdded::PendingTrivia;
    }

    /// Attaches trailing trivia to the most recently added token of the open
    /// node.
    pub fn trailing_trivia(&mut self, kind: impl Into<SyntaxKind>, text: &str) {
        assert!(
            self.pending_leading.is_empty(),
            "trailing trivia must be attached before new leading trivia"
        );
        let span = self.push_text(text);
        let trivia = Trivia {
            kind: kind.into(),
            text: text.into(),
            span,
            structure: None,
            diagnostics: Vec::new(),
            contains_diagnostics: false,
        };

        let Some(Frame::Node { children, .. }) = self.stack.last_mut() else {
            panic!("no token to attach trailing trivia to");
        };
        let Some(Child::Token(token)) = children.last_mut() else {
            panic!("no token to attach trailing trivia to");
        };
        token.full_span = TextRange::new(token.full_span.start(), span.end());
        token.trailing.push(trivia);
        self.last_added = LastAdded::TrailingTrivia;
    }

    /// Opens a structured trivia region; exactly one node must be built
    /// before the matching [`Builder::finish_structured_trivia`].
    pub fn start_structured_trivia(&mut self, kind: impl Into<SyntaxKind>) {
        self.stack.push(Frame::Structure { kind: kind.into(), node: None });
    }

    /// Closes a structured trivia region. The result becomes leading trivia
    /// of the next token.
    pub fn finish_structured_trivia(&mut self) {
        let Some(Frame::Structure { kind, node }) = self.stack.pop() else {
            panic!("unbalanced `Builder::finish_structured_trivia()`");
        };
        let node = node.expect("structured trivia requires a node");
        let span = node.full_span;
        let text = Box::from(&self.text[span]);
        self.pending_leading.push(Trivia {
            kind,
            text,
            span,
            structure: Some(Box::new(node)),
            diagnostics: Vec::new(),
            contains_diagnostics: false,
        });
        self.last_added = LastAdded::PendingTrivia;
    }

    /// Attaches a diagnostic message to the most recently completed element.
    pub fn diagnostic(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.last_added {
            LastAdded::PendingTrivia => {
                let trivia =
                    self.pending_leading.last_mut().expect("pending trivia tracked as last added");
                trivia.diagnostics.push(message);
            }
            LastAdded::Child => match self.stack.last_mut() {
                Some(Frame::Node { children, .. }) => match children.last_mut() {
                    Some(Child::Node(node)) => node.diagnostics.push(message),
                    Some(Child::Token(token)) => token.diagnostics.push(message),
                    None => panic!("no element to attach a diagnostic to"),
                },
                Some(Frame::Structure { node, .. }) => {
                    let node = node.as_mut().expect("structure node tracked as last added");
                    node.diagnostics.push(message);
                }
                None => panic!("no element to attach a diagnostic to"),
            },
            LastAdded::TrailingTrivia => {
                let Some(Frame::Node { children, .. }) = self.stack.last_mut() else {
                    panic!("no element to attach a diagnostic to");
                };
                let Some(Child::Token(token)) = children.last_mut() else {
                    panic!("no element to attach a diagnostic to");
                };
                let trivia =
                    token.trailing.last_mut().expect("trailing trivia tracked as last added");
                trivia.diagnostics.push(message);
            }
            LastAdded::Root => {
                let root = self.root.as_mut().expect("root tracked as last added");
                root.diagnostics.push(message);
            }
            LastAdded::None => panic!("no element to attach a diagnostic to"),
        }
    }

    /// Finishes the tree, computing the `contains_diagnostics` bit for every
    /// element.
    pub fn finish(mut self) -> SyntaxTree {
        assert!(self.stack.is_empty(), "you should call `Builder::finish_node()`");
        assert!(self.pending_leading.is_empty(), "leading trivia must be followed by a token");

        let mut root = self.root.take().expect("a root node is required");
        seal_node(&mut root);
        SyntaxTree { root, text: mem::take(&mut self.text).into_boxed_str() }
    }
}

fn seal_node(node: &mut Node) -> bool {
    let mut contains = !node.diagnostics.is_empty();
    for child in &mut node.children {
        contains |= match child {
            Child::Node(node) => seal_node(node),
            Child::Token(token) => seal_token(token),
        };
    }
    node.contains_diagnostics = contains;
    contains
}

fn seal_token(token: &mut Token) -> bool {
    let mut contains = !token.diagnostics.is_empty();
    for trivia in token.leading.iter_mut().chain(token.trailing.iter_mut()) {
        contains |= seal_trivia(trivia);
    }
    token.contains_diagnostics = contains;
    contains
}

fn seal_trivia(trivia: &mut Trivia) -> bool {
    let mut contains = !trivia.diagnostics.is_empty();
    if let Some(structure) = trivia.structure.as_deref_mut() {
        contains |= seal_node(structure);
    }
    trivia.contains_diagnostics = contains;
    contains
}
