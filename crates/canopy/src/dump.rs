//! Text format for syntax tree dumps.
//!
//! A dump is one parenthesized form per element:
//!
//! ```text
//! ; a class declaration
//! (node CompilationUnit
//!   (node ClassDeclaration
//!     (token ClassKeyword "class") (trail WhitespaceTrivia " ")
//!     (token IdentifierToken "Widget")))
//! ```
//!
//! `lead` attaches trivia to the next token, `trail` to the previous one,
//! `structured` wraps a node form as leading trivia, and `diag` attaches a
//! diagnostic message to the most recently completed element. Lines starting
//! with `;` are comments.

use std::fmt::Display;
use std::str::Chars;

use annotate_snippets::{Level, Renderer, Snippet};
use canopy_syntax::{Builder, SyntaxTree};
use text_size::{TextLen, TextRange, TextSize};

#[derive(Debug)]
pub(crate) struct ParseError {
    message: String,
    range: TextRange,
}

impl ParseError {
    fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self { message: message.into(), range }
    }

    pub(crate) fn render<'a>(
        &'a self,
        renderer: &'a Renderer,
        path: &'a str,
        text: &'a str,
    ) -> impl Display + 'a {
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(text)
                .origin(path)
                .annotation(Level::Error.span(self.range.into()).label("here"))
                .fold(true),
        );
        renderer.render(message)
    }
}

/// Reads a dump into a syntax tree.
pub(crate) fn parse(text: &str) -> Result<SyntaxTree, ParseError> {
    let mut reader = Reader::new(text)?;

    let start = reader.range;
    let root = reader.form()?;
    if !matches!(root, Form::Node { .. }) {
        return Err(ParseError::new("a dump starts with a node form", start));
    }

    // Diagnostics after the root form attach to the root node itself.
    let mut root_diagnostics = Vec::new();
    while reader.kind == Lexeme::LParen {
        let start = reader.range;
        match reader.form()? {
            Form::Diag { message } => root_diagnostics.push(message),
            _ => {
                return Err(ParseError::new("only diagnostics may follow the root node", start));
            }
        }
    }
    if reader.kind != Lexeme::Eof {
        return Err(ParseError::new("expected end of input", reader.range));
    }

    Ok(build(root, root_diagnostics))
}

enum Form {
    Node { kind: String, forms: Vec<Form> },
    Token { kind: String, text: String },
    Lead { kind: String, text: String },
    Trail { kind: String, text: String },
    Structured { kind: String, node: Box<Form> },
    Diag { message: String },
}

/// Most recent builder-visible element inside a node form; constrains where
/// `trail` and `diag` may appear.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Last {
    None,
    Token,
    Node,
    Lead,
}

fn build(root: Form, root_diagnostics: Vec<String>) -> SyntaxTree {
    let mut builder = Builder::new();
    build_form(&mut builder, root);
    for message in root_diagnostics {
        builder.diagnostic(message);
    }
    builder.finish()
}

fn build_form(builder: &mut Builder, form: Form) {
    match form {
        Form::Node { kind, forms } => {
            builder.start_node(kind);
            for form in forms {
                build_form(builder, form);
            }
            builder.finish_node();
        }
        Form::Token { kind, text } => builder.token(kind, &text),
        Form::Lead { kind, text } => builder.trivia(kind, &text),
        Form::Trail { kind, text } => builder.trailing_trivia(kind, &text),
        Form::Structured { kind, node } => {
            builder.start_structured_trivia(kind);
            build_form(builder, *node);
            builder.finish_structured_trivia();
        }
        Form::Diag { message } => builder.diagnostic(message),
    }
}

const EOF_CHAR: char = '\0';

struct Cursor<'a> {
    chars: Chars<'a>,
    len: TextSize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { chars: text.chars(), len: text.text_len() }
    }

    fn pos(&self) -> TextSize {
        self.len - TextSize::new(self.chars.as_str().len() as u32)
    }

    fn peek(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF_CHAR)
    }

    fn advance(&mut self) -> char {
        self.chars.next().unwrap_or(EOF_CHAR)
    }

    fn advance_while(&mut self, f: impl Fn(char) -> bool + Copy) {
        while self.peek() != EOF_CHAR && f(self.peek()) {
            self.advance();
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Lexeme {
    LParen,
    RParen,
    Atom,
    Str,
    Eof,
}

fn is_atom_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

struct Reader<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    kind: Lexeme,
    range: TextRange,
}

impl<'a> Reader<'a> {
    fn new(text: &'a str) -> Result<Self, ParseError> {
        let mut reader = Self {
            text,
            cursor: Cursor::new(text),
            kind: Lexeme::Eof,
            range: TextRange::empty(0.into()),
        };
        reader.bump()?;
        Ok(reader)
    }

    fn bump(&mut self) -> Result<(), ParseError> {
        self.skip_trivia();
        let start = self.cursor.pos();
        let kind = match self.cursor.peek() {
            EOF_CHAR => Lexeme::Eof,
            '(' => {
                self.cursor.advance();
                Lexeme::LParen
            }
            ')' => {
                self.cursor.advance();
                Lexeme::RParen
            }
            '"' => {
                self.lex_string(start)?;
                Lexeme::Str
            }
            c if is_atom_char(c) => {
                self.cursor.advance_while(is_atom_char);
                Lexeme::Atom
            }
            c => {
                return Err(ParseError::new(
                    format!("unexpected character `{c}`"),
                    TextRange::at(start, c.text_len()),
                ));
            }
        };
        self.kind = kind;
        self.range = TextRange::new(start, self.cursor.pos());
        Ok(())
    }

    fn skip_trivia(&mut self) {
        loop {
            self.cursor.advance_while(char::is_whitespace);
            if self.cursor.peek() == ';' {
                self.cursor.advance_while(|c| c != '\n');
            } else {
                break;
            }
        }
    }

    fn lex_string(&mut self, start: TextSize) -> Result<(), ParseError> {
        self.cursor.advance();
        loop {
            match self.cursor.advance() {
                EOF_CHAR => {
                    return Err(ParseError::new(
                        "unterminated string",
                        TextRange::new(start, self.cursor.pos()),
                    ));
                }
                '"' => return Ok(()),
                '\\' => {
                    self.cursor.advance();
                }
                _ => {}
            }
        }
    }

    fn expect(&mut self, kind: Lexeme, message: &str) -> Result<(), ParseError> {
        if self.kind != kind {
            return Err(ParseError::new(message, self.range));
        }
        self.bump()
    }

    fn expect_atom(&mut self, what: &str) -> Result<String, ParseError> {
        if self.kind != Lexeme::Atom {
            return Err(ParseError::new(format!("expected {what}"), self.range));
        }
        let text = self.text[self.range].to_owned();
        self.bump()?;
        Ok(text)
    }

    fn expect_string(&mut self, what: &str) -> Result<String, ParseError> {
        if self.kind != Lexeme::Str {
            return Err(ParseError::new(format!("expected {what}"), self.range));
        }
        let raw = &self.text[self.range];
        let inner = &raw[1..raw.len() - 1];

        let mut value = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                value.push(c);
                continue;
            }
            match chars.next() {
                Some('n') => value.push('\n'),
                Some('t') => value.push('\t'),
                Some('\\') => value.push('\\'),
                Some('"') => value.push('"'),
                Some(c) => {
                    return Err(ParseError::new(format!("unknown escape `\\{c}`"), self.range));
                }
                None => return Err(ParseError::new("unknown escape", self.range)),
            }
        }
        self.bump()?;
        Ok(value)
    }

    fn form(&mut self) -> Result<Form, ParseError> {
        self.expect(Lexeme::LParen, "expected `(`")?;
        let head_range = self.range;
        let head = self.expect_atom("a form head")?;

        let form = match head.as_str() {
            "node" => {
                let kind = self.expect_atom("a node kind")?;
                let mut forms = Vec::new();
                let mut last = Last::None;
                while self.kind == Lexeme::LParen {
                    let start = self.range;
                    let form = self.form()?;
                    match &form {
                        Form::Node { .. } => last = Last::Node,
                        Form::Token { .. } => last = Last::Token,
                        Form::Lead { .. } | Form::Structured { .. } => last = Last::Lead,
                        Form::Trail { .. } => {
                            if last != Last::Token {
                                return Err(ParseError::new(
                                    "trailing trivia requires a preceding token",
                                    start,
                                ));
                            }
                        }
                        Form::Diag { .. } => {
                            if last == Last::None {
                                return Err(ParseError::new(
                                    "a diagnostic requires a preceding element",
                                    start,
                                ));
                            }
                        }
                    }
                    forms.push(form);
                }
                if last == Last::Lead {
                    return Err(ParseError::new(
                        "leading trivia must be followed by a token",
                        self.range,
                    ));
                }
                Form::Node { kind, forms }
            }
            "token" => {
                let kind = self.expect_atom("a token kind")?;
                let text = self.expect_string("the token text")?;
                Form::Token { kind, text }
            }
            "lead" => {
                let kind = self.expect_atom("a trivia kind")?;
                let text = self.expect_string("the trivia text")?;
                Form::Lead { kind, text }
            }
            "trail" => {
                let kind = self.expect_atom("a trivia kind")?;
                let text = self.expect_string("the trivia text")?;
                Form::Trail { kind, text }
            }
            "structured" => {
                let kind = self.expect_atom("a trivia kind")?;
                let inner_start = self.range;
                let node = self.form()?;
                if !matches!(node, Form::Node { .. }) {
                    return Err(ParseError::new(
                        "structured trivia requires a node form",
                        inner_start,
                    ));
                }
                Form::Structured { kind, node: Box::new(node) }
            }
            "diag" => Form::Diag { message: self.expect_string("a diagnostic message")? },
            _ => return Err(ParseError::new(format!("unknown form `{head}`"), head_range)),
        };

        self.expect(Lexeme::RParen, "expected `)`")?;
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use canopy_view::SyntaxTreeView;
    use expect_test::expect;

    use super::*;

    fn render(text: &str) -> String {
        let tree = parse(text).unwrap();
        let (mut view, _events) = SyntaxTreeView::new();
        view.display_tree(&tree, false);
        view.render()
    }

    fn error(text: &str) -> String {
        let error = parse(text).unwrap_err();
        format!("{:?}: {}", error.range, error.message)
    }

    #[test]
    fn reads_a_full_dump() {
        let dump = r#"
; a class missing its body
(node CompilationUnit
  (node ClassDeclaration
    (token ClassKeyword "class") (trail WhitespaceTrivia " ")
    (token IdentifierToken "C")
    (diag "body expected")))
"#;
        expect![[r#"
            CompilationUnit@0..7 [diagnostics]
              ClassDeclaration@0..7 [diagnostics]
                ClassKeyword@0..5
                  Trail: WhitespaceTrivia@5..6
                IdentifierToken@6..7 [diagnostics]
        "#]]
        .assert_eq(&render(dump));
    }

    #[test]
    fn reads_leading_and_structured_trivia() {
        let dump = r##"
(node CompilationUnit
  (structured DirectiveTrivia
    (node PragmaDirective (token HashToken "#") (token PragmaKeyword "pragma")))
  (lead WhitespaceTrivia "\n")
  (token EndOfFileToken ""))
"##;
        expect![[r#"
            CompilationUnit@8..8
              EndOfFileToken@8..8
                Lead: DirectiveTrivia@0..7
                  PragmaDirective@0..7
                    HashToken@0..1
                    PragmaKeyword@1..7
                Lead: WhitespaceTrivia@7..8
        "#]]
        .assert_eq(&render(dump));
    }

    #[test]
    fn string_escapes_decode() {
        let tree = parse(r#"(node M (token Str "a\"b\\c\n"))"#).unwrap();
        assert_eq!(tree.text(), "a\"b\\c\n");
    }

    #[test]
    fn rejects_misplaced_trivia() {
        assert_eq!(
            error(r#"(node A (trail W " "))"#),
            "8..9: trailing trivia requires a preceding token"
        );
        assert_eq!(
            error(r#"(node A (lead W " "))"#),
            "20..21: leading trivia must be followed by a token"
        );
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(error(r#"(token K "k")"#), "0..1: a dump starts with a node form");
        assert_eq!(error("(node A) (node B)"), "9..10: only diagnostics may follow the root node");
        assert_eq!(error(r#"(node A (token K "k"#), "17..19: unterminated string");
        assert_eq!(error(r#"(thing A)"#), "1..6: unknown form `thing`");
        assert_eq!(error(r#"(node A (diag "d"))"#), "8..9: a diagnostic requires a preceding element");
    }
}
