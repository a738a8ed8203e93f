//! Source scanner: walks the target tree, tokenizes each supported file, and
//! slides the operator catalog across every token position.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

use crate::detect_language;
use crate::error::{Result, SessionError};
use crate::lexer::{self, TokenWindow};
use crate::mutable::{Mutable, MutableStatus};
use crate::operators;

/// Directory names never descended into during the scan.
const SKIP_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "target",
    "dist",
    "build",
];

/// Exclusions are applied before Mutables are emitted so excluded sites never
/// cost an execution cycle.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// File names or root-relative paths to skip entirely.
    pub files: Vec<String>,
    /// Lines containing this marker are never mutated.
    pub line_marker: Option<String>,
}

impl ExclusionRules {
    fn excludes_file(&self, rel_path: &Utf8Path) -> bool {
        self.files.iter().any(|f| {
            rel_path.as_str() == f.as_str()
                || rel_path.file_name().is_some_and(|name| name == f.as_str())
        })
    }

    fn excludes_line(&self, line_text: &str) -> bool {
        self.line_marker
            .as_deref()
            .is_some_and(|marker| line_text.contains(marker))
    }
}

/// A file that could not be scanned. Local recovery: the file is skipped and
/// the session continues.
#[derive(Debug, Clone)]
pub struct ScanWarning {
    pub file_path: Utf8PathBuf,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScanReport {
    pub mutables: Vec<Mutable>,
    pub warnings: Vec<ScanWarning>,
}

/// Scan every supported file under `source_root`, emitting one Mutable per
/// (token position, matching operator) pair, ordered by path, byte offset,
/// then operator so re-runs are reproducible.
pub fn scan(source_root: &Utf8Path, rules: &ExclusionRules) -> Result<ScanReport> {
    if !source_root.is_dir() {
        return Err(SessionError::config(format!(
            "source directory not found: {source_root}"
        )));
    }

    let mut files = Vec::new();
    collect_source_files(source_root, &mut files)
        .map_err(|e| SessionError::io(source_root.to_owned(), e))?;
    files.sort();

    let mut report = ScanReport::default();
    for path in files {
        let rel = path
            .strip_prefix(source_root)
            .unwrap_or(&path)
            .to_owned();
        if rules.excludes_file(&rel) {
            continue;
        }
        match scan_file(&path, &rel, rules) {
            Ok(mut mutables) => report.mutables.append(&mut mutables),
            Err(message) => report.warnings.push(ScanWarning {
                file_path: rel,
                message,
            }),
        }
    }

    report
        .mutables
        .sort_by(|a, b| {
            (&a.file_path, a.start_byte, a.operator).cmp(&(&b.file_path, b.start_byte, b.operator))
        });
    Ok(report)
}

fn collect_source_files(dir: &Utf8Path, out: &mut Vec<Utf8PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let ft = entry.file_type()?;
        if ft.is_dir() {
            if SKIP_DIRS.iter().any(|s| *s == name_str) {
                continue;
            }
            out.extend(collect_dir(&entry.path())?);
        } else if ft.is_file() {
            if let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) {
                if detect_language(&path).is_some() {
                    out.push(path);
                }
            }
        }
        // Symlinks and special files are ignored.
    }
    Ok(())
}

fn collect_dir(dir: &std::path::Path) -> std::io::Result<Vec<Utf8PathBuf>> {
    let mut nested = Vec::new();
    if let Ok(dir) = Utf8PathBuf::from_path_buf(dir.to_path_buf()) {
        collect_source_files(&dir, &mut nested)?;
    }
    Ok(nested)
}

fn scan_file(
    path: &Utf8Path,
    rel_path: &Utf8Path,
    rules: &ExclusionRules,
) -> std::result::Result<Vec<Mutable>, String> {
    let lang = detect_language(path).expect("only supported files reach scan_file");
    let source =
        fs::read_to_string(path).map_err(|e| format!("failed to read: {e}"))?;
    let tokens =
        lexer::tokenize(&source, lang).map_err(|e| format!("failed to tokenize: {e}"))?;
    let lines: Vec<&str> = source.lines().collect();

    let mut mutables = Vec::new();
    for index in 0..tokens.len() {
        let window = TokenWindow::new(&tokens, index);
        let token = window.current();
        let line_text = lines.get(token.line.saturating_sub(1)).copied().unwrap_or("");
        if rules.excludes_line(line_text) {
            continue;
        }
        for operator in operators::applicable_operators(&window) {
            let replacement = operator
                .transform(&window)
                .expect("applicable operator must transform");
            let (context_before, context_after) = context(&lines, token.line - 1, 2);
            mutables.push(Mutable {
                id: Mutable::stable_id(rel_path.as_str(), token.start_byte, operator),
                file_path: rel_path.to_owned(),
                line: token.line,
                column: token.column,
                token_start: index,
                token_end: index + 1,
                start_byte: token.start_byte,
                end_byte: token.end_byte,
                operator,
                original: token.text.clone(),
                replacement,
                status: MutableStatus::Pending,
                diff: String::new(),
                context_before,
                context_after,
            });
        }
    }
    Ok(mutables)
}

fn context(lines: &[&str], line_idx: usize, range: usize) -> (Vec<String>, Vec<String>) {
    let start = line_idx.saturating_sub(range);
    let end = (line_idx + range + 1).min(lines.len());
    let before = lines[start..line_idx.min(lines.len())]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let after = if line_idx + 1 < end {
        lines[line_idx + 1..end].iter().map(|s| s.to_string()).collect()
    } else {
        vec![]
    };
    (before, after)
}
