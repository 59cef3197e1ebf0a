//! Path translation between trailarr and Kodi.
//!
//! Trailarr and Kodi often see the same library under different roots
//! (a container mount vs. an SMB share, a Linux box vs. a Windows HTPC).
//! A [`PathMapper`] rewrites path prefixes in both directions and renders
//! remote paths with the host's separator.
//!
//! Paths that no rewrite matches pass through unchanged unless the mapper is
//! strict, in which case [`PathMapper::to_remote_checked`] refuses them.

use crate::models::config::PathMapConfig;
use crate::Result;
use std::cmp::Reverse;
use std::path::{Path, PathBuf};

const ENGINE_SEPARATOR: char = '/';

/// Path convention of a remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathSyntax {
    #[default]
    Posix,
    Windows,
}

impl PathSyntax {
    /// Separator used when rendering paths.
    pub fn separator(self) -> char {
        match self {
            PathSyntax::Posix => '/',
            PathSyntax::Windows => '\\',
        }
    }

    /// Windows accepts both separators.
    pub fn is_separator(self, c: char) -> bool {
        match self {
            PathSyntax::Posix => c == '/',
            PathSyntax::Windows => c == '\\' || c == '/',
        }
    }

    /// Render `path` with this syntax's separator.
    pub fn normalize(self, path: &str) -> String {
        match self {
            PathSyntax::Posix => path.to_string(),
            PathSyntax::Windows => path.replace('/', "\\"),
        }
    }

    /// Final component of `path`.
    pub fn file_name(self, path: &str) -> String {
        let trimmed = path.trim_end_matches(|c: char| self.is_separator(c));
        match trimmed.rfind(|c: char| self.is_separator(c)) {
            Some(idx) => trimmed[idx + 1..].to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Everything before the final component, without a trailing separator
    /// (except for a bare root).
    pub fn parent(self, path: &str) -> String {
        let trimmed = path.trim_end_matches(|c: char| self.is_separator(c));
        match trimmed.rfind(|c: char| self.is_separator(c)) {
            Some(0) => trimmed[..1].to_string(),
            Some(idx) => trimmed[..idx].to_string(),
            None => String::new(),
        }
    }
}

/// One prefix rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathRewrite {
    /// Prefix in trailarr's view.
    pub engine: String,
    /// Prefix in the host's view.
    pub remote: String,
}

impl PathRewrite {
    pub fn new(engine: impl Into<String>, remote: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            remote: remote.into(),
        }
    }
}

impl From<&PathMapConfig> for PathRewrite {
    fn from(config: &PathMapConfig) -> Self {
        Self::new(config.from.clone(), config.to.clone())
    }
}

/// Ordered prefix rewrites bound to a host's path syntax.
#[derive(Debug, Clone, Default)]
pub struct PathMapper {
    rules: Vec<PathRewrite>,
    syntax: PathSyntax,
    strict: bool,
}

impl PathMapper {
    /// Create a pass-through mapper.
    pub fn new(rules: Vec<PathRewrite>, syntax: PathSyntax) -> Self {
        Self {
            rules,
            syntax,
            strict: false,
        }
    }

    /// Refuse unmapped paths in [`Self::to_remote_checked`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn syntax(&self) -> PathSyntax {
        self.syntax
    }

    pub fn rules(&self) -> &[PathRewrite] {
        &self.rules
    }

    /// Translate a local path into the host's view. The first matching rule
    /// wins; unmatched paths are only re-rendered with the host separator.
    pub fn to_remote(&self, path: &Path) -> String {
        self.rewrite_to_remote(path)
            .unwrap_or_else(|| self.syntax.normalize(&path.to_string_lossy()))
    }

    /// Like [`Self::to_remote`], but a strict mapper with rules fails when
    /// none of them matches.
    pub fn to_remote_checked(&self, path: &Path) -> Result<String> {
        match self.rewrite_to_remote(path) {
            Some(remote) => Ok(remote),
            None if self.strict && !self.rules.is_empty() => {
                Err(crate::Error::UnmappedPath(path.display().to_string()))
            }
            None => {
                if !self.rules.is_empty() {
                    tracing::debug!("No path mapping for {:?}, passing through", path);
                }
                Ok(self.syntax.normalize(&path.to_string_lossy()))
            }
        }
    }

    /// Translate a host path back into trailarr's view. The rule with the
    /// longest matching remote prefix wins, so nested remote roots map back
    /// to their own engine root.
    pub fn to_engine(&self, remote: &str) -> PathBuf {
        let syntax = self.syntax;
        let is_sep = |c: char| syntax.is_separator(c);
        let best = self
            .rules
            .iter()
            .filter_map(|rule| {
                let prefix = syntax.normalize(&rule.remote);
                let rest = strip_prefix(remote, &prefix, is_sep)?;
                let depth = prefix.trim_end_matches(is_sep).len();
                Some((rule, rest, depth))
            })
            .min_by_key(|(_, _, depth)| Reverse(*depth));

        match best {
            Some((rule, rest, _)) => {
                let rest: String = rest
                    .chars()
                    .map(|c| if is_sep(c) { ENGINE_SEPARATOR } else { c })
                    .collect();
                PathBuf::from(join_prefix(&rule.engine, &rest, ENGINE_SEPARATOR))
            }
            None => PathBuf::from(remote),
        }
    }

    fn rewrite_to_remote(&self, path: &Path) -> Option<String> {
        let local = path.to_string_lossy();
        self.rules.iter().find_map(|rule| {
            strip_prefix(&local, &rule.engine, |c: char| c == ENGINE_SEPARATOR).map(|rest| {
                let prefix = self.syntax.normalize(&rule.remote);
                let sep = self.syntax.separator();
                self.syntax.normalize(&join_prefix(&prefix, rest, sep))
            })
        })
    }
}

/// Strip `prefix` from `path` only on a component boundary.
fn strip_prefix<'a>(path: &'a str, prefix: &str, is_sep: impl Fn(char) -> bool) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let rest = path.strip_prefix(prefix)?;
    let boundary = rest.is_empty()
        || prefix.ends_with(|c: char| is_sep(c))
        || rest.starts_with(|c: char| is_sep(c));
    boundary.then_some(rest)
}

/// Join a prefix and a remainder with exactly one separator between them.
fn join_prefix(prefix: &str, rest: &str, sep: char) -> String {
    if rest.is_empty() {
        return prefix.to_string();
    }
    let is_sep = |c: char| c == '/' || c == '\\';
    match (prefix.ends_with(is_sep), rest.starts_with(is_sep)) {
        (true, true) => format!("{}{}", prefix, &rest[1..]),
        (false, false) => format!("{}{}{}", prefix, sep, rest),
        _ => format!("{}{}", prefix, rest),
    }
}
