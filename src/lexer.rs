use tree_sitter::{Node, Parser};

use crate::Language;

/// One lexical token as seen by the operator catalog.
///
/// `kind` is the grammar's node kind (`"+"`, `"identifier"`, `"true"`, ...);
/// `parent_kind` is the kind of the enclosing node, which is how operators tell
/// a binary `+` from a unary one without any cross-file state.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: &'static str,
    pub parent_kind: &'static str,
    pub line: usize,
    pub column: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("grammar rejected the source near line {line}")]
    Syntax { line: usize },
    #[error("parser produced no tree")]
    NoTree,
}

fn grammar(lang: Language) -> tree_sitter::Language {
    match lang {
        Language::Python => tree_sitter_python::LANGUAGE.into(),
        Language::Rust => tree_sitter_rust::LANGUAGE.into(),
        Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

/// Tokenize a source file into a flat stream of leaf tokens with byte ranges.
///
/// A file the grammar cannot parse is a `LexError`, never a panic; the scanner
/// downgrades it to a warning and skips the file.
pub fn tokenize(source: &str, lang: Language) -> Result<Vec<Token>, LexError> {
    let mut parser = Parser::new();
    parser
        .set_language(&grammar(lang))
        .expect("grammar/version mismatch is a build defect");

    let tree = parser.parse(source, None).ok_or(LexError::NoTree)?;
    let root = tree.root_node();
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(0) + 1;
        return Err(LexError::Syntax { line });
    }

    let mut tokens = Vec::new();
    collect_leaves(root, "source", source, &mut tokens);
    Ok(tokens)
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    for i in 0..node.child_count() {
        if let Some(found) = node.child(i).and_then(first_error_line) {
            return Some(found);
        }
    }
    None
}

fn collect_leaves(node: Node, parent_kind: &'static str, source: &str, out: &mut Vec<Token>) {
    if node.kind() == "comment" || node.kind() == "line_comment" || node.kind() == "block_comment" {
        return;
    }
    if node.child_count() == 0 {
        out.push(Token {
            text: node_text(node, source).to_string(),
            kind: node.kind(),
            parent_kind,
            line: node.start_position().row + 1,
            column: node.start_position().column + 1,
            start_byte: node.start_byte(),
            end_byte: node.end_byte(),
        });
        return;
    }
    let kind = node.kind();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            collect_leaves(child, kind, source, out);
        }
    }
}

fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// Fixed-size view over a token stream, centered on one token. Operator
/// matching is a pure function of this window.
#[derive(Debug, Clone, Copy)]
pub struct TokenWindow<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> TokenWindow<'a> {
    pub fn new(tokens: &'a [Token], index: usize) -> Self {
        debug_assert!(index < tokens.len());
        TokenWindow { tokens, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'a Token {
        &self.tokens[self.index]
    }

    pub fn prev(&self) -> Option<&'a Token> {
        self.index.checked_sub(1).map(|i| &self.tokens[i])
    }

    pub fn next(&self) -> Option<&'a Token> {
        self.tokens.get(self.index + 1)
    }
}
