pub mod adapter;
pub mod aggregator;
pub mod coordinator;
pub mod coverage;
pub mod error;
pub mod injector;
pub mod lexer;
pub mod mutable;
pub mod operators;
pub mod output;
pub mod scanner;
pub mod store;
pub mod workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Python,
    Rust,
    JavaScript,
    TypeScript,
    Tsx,
}

pub fn detect_language(path: &camino::Utf8Path) -> Option<Language> {
    match path.extension()? {
        "py" => Some(Language::Python),
        "rs" => Some(Language::Rust),
        "js" | "mjs" | "cjs" | "jsx" => Some(Language::JavaScript),
        "ts" | "mts" | "cts" => Some(Language::TypeScript),
        "tsx" => Some(Language::Tsx),
        _ => None,
    }
}
