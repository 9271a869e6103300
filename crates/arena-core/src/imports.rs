//! `@path.md` import expansion for prompt files.
//!
//! A line consisting only of `@` followed by a `~/`, `./`, `../` or `/` path
//! ending in `.md` is replaced by the trimmed content of that file, itself
//! expanded recursively. Relative paths resolve against the directory of the
//! file that contains the reference.
use std::io;
use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*@((?:~/|\./|\.\./|/)\S*\.md)\s*$").expect("import pattern is valid")
});

/// Filesystem access used by the resolver.
pub trait FileSource {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> io::Result<String>;
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real filesystem. `~` is taken from `HOME` (or `USERPROFILE`).
#[derive(Clone, Copy, Debug, Default)]
pub struct FsSource;

impl FileSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
    }
}

/// Reads `path` and expands its imports. The file itself counts as part of
/// the import chain, so a self-reference is reported as circular.
pub fn resolve_file(path: &Path, source: &dyn FileSource) -> io::Result<String> {
    let content = source.read(path)?;
    let path = normalize(path);
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut chain = vec![path];
    Ok(expand(&content, &base_dir, source, &mut chain))
}

/// Expands imports in `content`, resolving relative references against
/// `base_dir`.
pub fn resolve_imports(content: &str, base_dir: &Path, source: &dyn FileSource) -> String {
    let mut chain = Vec::new();
    expand(content, base_dir, source, &mut chain)
}

fn expand(content: &str, base_dir: &Path, source: &dyn FileSource, chain: &mut Vec<PathBuf>) -> String {
    content
        .split('\n')
        .map(|line| match IMPORT_LINE.captures(line.trim_end_matches('\r')) {
            Some(caps) => import(&caps[1], base_dir, source, chain),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn import(reference: &str, base_dir: &Path, source: &dyn FileSource, chain: &mut Vec<PathBuf>) -> String {
    let Some(path) = resolve_reference(reference, base_dir, source) else {
        warn!(reference, "import needs a home directory but none is set");
        return format!("<!-- Import not found: {reference} -->");
    };
    if chain.contains(&path) {
        warn!(reference, "circular import");
        return format!("<!-- Circular import: {reference} -->");
    }
    if !source.exists(&path) {
        warn!(reference, path = %path.display(), "import not found");
        return format!("<!-- Import not found: {reference} -->");
    }
    let content = match source.read(&path) {
        Ok(content) => content,
        Err(err) => {
            warn!(reference, path = %path.display(), error = %err, "import unreadable");
            return format!("<!-- Failed to import: {reference} -->");
        }
    };
    debug!(reference, path = %path.display(), "inlining import");

    let nested_base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    chain.push(path);
    let expanded = expand(content.trim(), &nested_base, source, chain);
    chain.pop();
    expanded.trim().to_string()
}

fn resolve_reference(reference: &str, base_dir: &Path, source: &dyn FileSource) -> Option<PathBuf> {
    let path = if let Some(rest) = reference.strip_prefix("~/") {
        source.home_dir()?.join(rest)
    } else if reference.starts_with('/') {
        PathBuf::from(reference)
    } else {
        base_dir.join(reference)
    };
    Some(normalize(&path))
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}
