//! Re-deriving fingerprints and classifying drift.

use std::fmt;
use std::fs;
use std::io;

use camino::Utf8Path;
use tracing::{debug, info};
use warden_syntax::ExtractorRegistry;

use crate::content::fingerprint_target;
use crate::error::GuardError;
use crate::record::{ProtectionRecord, TargetKey};
use crate::registry::{ProtectionRegistry, REGISTRY_FILE, self_digest, stored_self_fingerprint};

/// How a protected target has drifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// The content no longer matches the stored fingerprint.
    HashMismatch,
    /// The protected file no longer exists.
    MissingFile,
    /// The file exists but the identifier can no longer be extracted.
    MissingIdentifier,
}

impl ViolationKind {
    /// Human-readable description of the kind.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::HashMismatch => "hash mismatch",
            Self::MissingFile => "file missing",
            Self::MissingIdentifier => "identifier removed or renamed",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A detected violation, with optional detail for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    kind: ViolationKind,
    detail: Option<String>,
}

impl Violation {
    /// Creates a violation of `kind` without detail.
    #[must_use]
    pub const fn new(kind: ViolationKind) -> Self {
        Self { kind, detail: None }
    }

    /// Attaches a detail message.
    #[must_use]
    pub fn with_detail(self, detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
            ..self
        }
    }

    /// The violation kind.
    #[must_use]
    pub const fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Extra context, such as the extractor error behind a missing
    /// identifier.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Verification outcome for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStatus {
    key: TargetKey,
    violation: Option<Violation>,
}

impl RecordStatus {
    const fn intact(key: TargetKey) -> Self {
        Self {
            key,
            violation: None,
        }
    }

    const fn violated(key: TargetKey, violation: Violation) -> Self {
        Self {
            key,
            violation: Some(violation),
        }
    }

    /// The record that was checked.
    #[must_use]
    pub const fn key(&self) -> &TargetKey {
        &self.key
    }

    /// The violation, or `None` when the record is intact.
    #[must_use]
    pub const fn violation(&self) -> Option<&Violation> {
        self.violation.as_ref()
    }

    /// Whether the record is intact.
    #[must_use]
    pub const fn is_intact(&self) -> bool {
        self.violation.is_none()
    }
}

/// Statuses of every checked record, the self record first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    statuses: Vec<RecordStatus>,
}

impl VerifyReport {
    /// Every status in registry order.
    #[must_use]
    pub fn statuses(&self) -> &[RecordStatus] {
        &self.statuses
    }

    /// The statuses that carry a violation.
    pub fn violations(&self) -> impl Iterator<Item = &RecordStatus> {
        self.statuses.iter().filter(|status| !status.is_intact())
    }

    /// Whether no violation was found.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.statuses.iter().all(RecordStatus::is_intact)
    }
}

/// Compares stored fingerprints against the working tree.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'a> {
    root: &'a Utf8Path,
    extractors: &'a ExtractorRegistry,
}

impl<'a> Verifier<'a> {
    /// Creates a verifier for the repository at `root`.
    #[must_use]
    pub const fn new(root: &'a Utf8Path, extractors: &'a ExtractorRegistry) -> Self {
        Self { root, extractors }
    }

    /// Loads the registry from disk and verifies it.
    ///
    /// A registry that cannot be parsed is reported as a hash mismatch on
    /// the registry file itself rather than as an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry cannot be read or a record cannot
    /// be evaluated at all.
    pub fn verify_root(&self) -> Result<VerifyReport, GuardError> {
        match ProtectionRegistry::load(self.root) {
            Ok(registry) => self.verify(&registry),
            Err(GuardError::RegistryFormat(err)) => Ok(VerifyReport {
                statuses: vec![RecordStatus::violated(
                    TargetKey::file(REGISTRY_FILE),
                    Violation::new(ViolationKind::HashMismatch).with_detail(err.to_string()),
                )],
            }),
            Err(err) => Err(err),
        }
    }

    /// Verifies every record of `registry`, the self record first.
    ///
    /// # Errors
    ///
    /// Returns an error for structural problems that prevent evaluation,
    /// such as an identifier record in a language with no extractor.
    pub fn verify(&self, registry: &ProtectionRegistry) -> Result<VerifyReport, GuardError> {
        let mut report = VerifyReport::default();
        if let Some(status) = Self::check_self(registry)? {
            report.statuses.push(status);
        }
        for record in registry.records() {
            report.statuses.push(self.check(record)?);
        }

        let violations = report.violations().count();
        if violations == 0 {
            info!(checked = report.statuses.len(), "all protected targets intact");
        } else {
            info!(checked = report.statuses.len(), violations, "protected targets drifted");
        }
        Ok(report)
    }

    fn check_self(registry: &ProtectionRegistry) -> Result<Option<RecordStatus>, GuardError> {
        let key = TargetKey::file(REGISTRY_FILE);
        let bytes = match fs::read(registry.file_path()) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                let expected = registry.self_fingerprint().is_some() || !registry.is_empty();
                return Ok(expected.then(|| {
                    RecordStatus::violated(key, Violation::new(ViolationKind::MissingFile))
                }));
            }
            Err(err) => return Err(GuardError::io(registry.file_path(), err)),
        };

        let status = match stored_self_fingerprint(&bytes) {
            None => RecordStatus::violated(
                key,
                Violation::new(ViolationKind::HashMismatch)
                    .with_detail("self-protection line missing"),
            ),
            Some(stored) if stored == self_digest(&bytes) => RecordStatus::intact(key),
            Some(_) => RecordStatus::violated(key, Violation::new(ViolationKind::HashMismatch)),
        };
        Ok(Some(status))
    }

    fn check(&self, record: &ProtectionRecord) -> Result<RecordStatus, GuardError> {
        let key = record.key().clone();
        let violation = match fingerprint_target(self.root, self.extractors, &key) {
            Ok(current) if &current == record.fingerprint() => None,
            Ok(_) => Some(Violation::new(ViolationKind::HashMismatch)),
            Err(GuardError::FileNotFound { .. }) => Some(Violation::new(ViolationKind::MissingFile)),
            Err(
                err @ (GuardError::NotFound { .. }
                | GuardError::Parse { .. }
                | GuardError::Ambiguous { .. }),
            ) => Some(Violation::new(ViolationKind::MissingIdentifier).with_detail(err.to_string())),
            Err(err) => return Err(err),
        };
        debug!(target_key = %key, intact = violation.is_none(), "checked record");
        Ok(RecordStatus { key, violation })
    }
}
