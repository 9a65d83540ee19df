//! Target specifications and their expansion into concrete keys.
//!
//! A target is written `path`, `path:identifier` or `path:pattern`. Both
//! halves may carry shell-style wildcards (`*`, `?`, `[...]`). Wildcards are
//! expanded eagerly, so the registry only ever stores concrete keys.

use std::io;
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use glob::{MatchOptions, Pattern};
use tracing::{debug, warn};
use warden_syntax::ExtractorRegistry;

use crate::content::{decode_source, read_bytes};
use crate::error::{GuardError, TargetError};
use crate::record::TargetKey;
use crate::registry::{ProtectionRegistry, REGISTRY_FILE};

/// Hidden files and directories only match when the pattern spells out
/// their leading dot.
const PATH_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

const IDENTIFIER_MATCH: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Returns whether `text` contains glob metacharacters.
#[must_use]
pub fn is_wildcard(text: &str) -> bool {
    text.contains(['*', '?', '['])
}

/// A parsed target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    raw: String,
    path: String,
    identifier: Option<String>,
}

impl TargetSpec {
    /// Parses `raw` relative to the repository `root`.
    ///
    /// The path ends at the first `:`; an empty identifier part counts as
    /// none. Backslashes become `/`, `.` segments are dropped and absolute
    /// paths under `root` are made relative.
    ///
    /// # Errors
    ///
    /// Returns a [`TargetError`] when the path is empty, escapes the root,
    /// or names the registry file.
    pub fn parse(raw: &str, root: &Utf8Path) -> Result<Self, TargetError> {
        let (raw_path, identifier) = match raw.split_once(':') {
            Some((path, name)) if !name.is_empty() => (path, Some(name.to_owned())),
            Some((path, _)) => (path, None),
            None => (raw, None),
        };
        let path = normalise_path(raw_path, root, raw)?;
        if path == REGISTRY_FILE {
            return Err(TargetError::RegistryFile {
                target: raw.to_owned(),
            });
        }
        Ok(Self {
            raw: raw.to_owned(),
            path,
            identifier,
        })
    }

    /// The target as the caller wrote it.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The normalised, repository-relative path or path pattern.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The identifier or identifier pattern, if any.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Whether either half of the target is a pattern.
    #[must_use]
    pub fn is_pattern(&self) -> bool {
        is_wildcard(&self.path) || self.identifier.as_deref().is_some_and(is_wildcard)
    }

    /// The concrete key this target names when it holds no wildcard.
    #[must_use]
    pub fn literal_key(&self) -> Option<TargetKey> {
        (!self.is_pattern()).then(|| TargetKey::new(self.path.clone(), self.identifier.clone()))
    }

    fn pattern_error(&self, err: &glob::PatternError) -> TargetError {
        TargetError::InvalidPattern {
            target: self.raw.clone(),
            message: err.msg.to_owned(),
        }
    }
}

fn normalise_path(raw_path: &str, root: &Utf8Path, target: &str) -> Result<String, TargetError> {
    let unified = raw_path.replace('\\', "/");
    let root_prefix = format!("{}/", root.as_str().replace('\\', "/").trim_end_matches('/'));
    let relative = unified.strip_prefix(&root_prefix).unwrap_or(&unified);
    let outside = || TargetError::OutsideRoot {
        target: target.to_owned(),
    };
    if relative.starts_with('/') {
        return Err(outside());
    }

    let mut segments = Vec::new();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop().ok_or_else(outside)?;
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(TargetError::EmptyPath {
            target: target.to_owned(),
        });
    }
    Ok(segments.join("/"))
}

/// A failure attributed to a single target, or to one expansion of it.
#[derive(Debug)]
pub struct TargetFailure {
    target: String,
    error: GuardError,
}

impl TargetFailure {
    /// Attributes `error` to `target`.
    #[must_use]
    pub fn new(target: impl Into<String>, error: GuardError) -> Self {
        Self {
            target: target.into(),
            error,
        }
    }

    /// The target, or the concrete expansion of it, that failed.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// What went wrong.
    #[must_use]
    pub const fn error(&self) -> &GuardError {
        &self.error
    }
}

/// The concrete keys a target expanded to, plus the expansions that failed.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Keys in expansion order.
    pub keys: Vec<TargetKey>,
    /// Per-file failures met while expanding identifier patterns.
    pub failures: Vec<TargetFailure>,
}

/// Expands target specifications against the working tree.
#[derive(Debug, Clone, Copy)]
pub struct TargetResolver<'a> {
    root: &'a Utf8Path,
    extractors: &'a ExtractorRegistry,
}

impl<'a> TargetResolver<'a> {
    /// Creates a resolver for the repository at `root`.
    #[must_use]
    pub const fn new(root: &'a Utf8Path, extractors: &'a ExtractorRegistry) -> Self {
        Self { root, extractors }
    }

    /// Expands `spec` against the files on disk.
    ///
    /// Path globs match files only, in sorted order. Identifier patterns
    /// are matched against the names the file's extractor lists, or against
    /// a container's members when the pattern has a literal container.
    /// Literal identifiers are not checked here.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::FileNotFound`] for a literal path that does not
    /// exist and [`GuardError::InvalidTarget`] for a malformed pattern.
    pub fn resolve(&self, spec: &TargetSpec) -> Result<Resolution, GuardError> {
        let paths = if is_wildcard(spec.path()) {
            self.expand_paths(spec)?
        } else {
            self.check_file(spec.path())?;
            vec![spec.path().to_owned()]
        };

        let mut resolution = Resolution::default();
        for path in paths {
            match spec.identifier() {
                None => resolution.keys.push(TargetKey::file(path)),
                Some(name) if !is_wildcard(name) => {
                    resolution.keys.push(TargetKey::identifier(path, name));
                }
                Some(pattern) => match self.expand_identifiers(spec, &path, pattern) {
                    Ok(names) => resolution
                        .keys
                        .extend(names.into_iter().map(|name| TargetKey::identifier(path.clone(), name))),
                    Err(error) => resolution
                        .failures
                        .push(TargetFailure::new(format!("{path}:{pattern}"), error)),
                },
            }
        }
        debug!(
            target_spec = spec.raw(),
            keys = resolution.keys.len(),
            failures = resolution.failures.len(),
            "resolved target"
        );
        Ok(resolution)
    }

    /// Expands `spec` against the records of `registry` without touching the
    /// filesystem.
    ///
    /// A target without wildcards yields its literal key whether or not a
    /// record exists for it; patterns yield the matching record keys in
    /// registry order.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::InvalidPattern`] for a malformed pattern.
    pub fn resolve_registered(
        &self,
        spec: &TargetSpec,
        registry: &ProtectionRegistry,
    ) -> Result<Vec<TargetKey>, TargetError> {
        if let Some(key) = spec.literal_key() {
            return Ok(vec![key]);
        }

        let path_matcher = Matcher::new(spec, spec.path(), PATH_MATCH)?;
        let identifier_matcher = spec
            .identifier()
            .map(|identifier| Matcher::new(spec, identifier, IDENTIFIER_MATCH))
            .transpose()?;

        Ok(registry
            .records()
            .iter()
            .map(|record| record.key())
            .filter(|key| path_matcher.matches(key.path()))
            .filter(|key| match (&identifier_matcher, key.identifier_name()) {
                (Some(matcher), Some(name)) => matcher.matches(name),
                (None, None) => true,
                _ => false,
            })
            .cloned()
            .collect())
    }

    fn check_file(&self, path: &str) -> Result<(), GuardError> {
        let full = self.root.join(path);
        match full.metadata() {
            Ok(metadata) if metadata.is_file() => Ok(()),
            Ok(_) => Err(GuardError::io(
                full,
                io::Error::new(io::ErrorKind::IsADirectory, "target is not a regular file"),
            )),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(GuardError::FileNotFound {
                path: path.to_owned(),
            }),
            Err(err) => Err(GuardError::io(full, err)),
        }
    }

    fn expand_paths(&self, spec: &TargetSpec) -> Result<Vec<String>, GuardError> {
        let pattern = format!("{}/{}", Pattern::escape(self.root.as_str()), spec.path());
        let entries = glob::glob_with(&pattern, PATH_MATCH).map_err(|err| spec.pattern_error(&err))?;

        let mut paths: Vec<String> = entries
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!(error = %err, "skipping unreadable path during glob expansion");
                    None
                }
            })
            .filter(|path| path.is_file())
            .filter_map(|path| self.relative(&path))
            .filter(|path| path != REGISTRY_FILE)
            .collect();
        paths.sort();
        paths.dedup();
        Ok(paths)
    }

    fn relative(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.root).ok()?;
        let utf8 = Utf8PathBuf::from_path_buf(relative.to_path_buf()).ok()?;
        Some(utf8.as_str().replace('\\', "/"))
    }

    fn expand_identifiers(
        &self,
        spec: &TargetSpec,
        path: &str,
        pattern: &str,
    ) -> Result<Vec<String>, GuardError> {
        let matcher = Matcher::new(spec, pattern, IDENTIFIER_MATCH)?;
        let extractor = self
            .extractors
            .for_path(Path::new(path))
            .map_err(|err| GuardError::from_extract(path, err))?;
        let source = decode_source(path, extractor.language(), read_bytes(self.root, path)?)?;

        let candidates = match pattern.rsplit_once(extractor.scope_separator()) {
            Some((container, _)) if !is_wildcard(container) => {
                extractor.members(&source, container)
            }
            _ => extractor.list(&source),
        }
        .map_err(|err| GuardError::from_extract(path, err))?;

        Ok(candidates
            .into_iter()
            .filter(|name| matcher.matches(name))
            .collect())
    }
}

struct Matcher {
    pattern: Pattern,
    options: MatchOptions,
}

impl Matcher {
    fn new(spec: &TargetSpec, pattern: &str, options: MatchOptions) -> Result<Self, TargetError> {
        let compiled = Pattern::new(pattern).map_err(|err| spec.pattern_error(&err))?;
        Ok(Self {
            pattern: compiled,
            options,
        })
    }

    fn matches(&self, candidate: &str) -> bool {
        self.pattern.matches_with(candidate, self.options)
    }
}
