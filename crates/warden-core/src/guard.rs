//! The facade the command surface drives.
//!
//! [`Guard`] ties the resolver, the registry and the verifier together for
//! one repository. Every batch operation processes its targets
//! independently: a failure is recorded against the target that caused it
//! and the remaining targets still run. The registry is rewritten once per
//! batch, and only when something changed.

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};
use warden_syntax::ExtractorRegistry;

use crate::content::fingerprint_target;
use crate::error::GuardError;
use crate::record::{ProtectionRecord, TargetKey};
use crate::registry::ProtectionRegistry;
use crate::target::{TargetFailure, TargetResolver, TargetSpec};
use crate::verify::{Verifier, VerifyReport};

/// Result of a batch `add`, `update` or `remove`.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    changed: Vec<ProtectionRecord>,
    failures: Vec<TargetFailure>,
    unmatched: Vec<String>,
}

impl BatchOutcome {
    /// Records written (for add and update) or deleted (for remove), in
    /// processing order.
    #[must_use]
    pub fn changed(&self) -> &[ProtectionRecord] {
        &self.changed
    }

    /// Per-target failures.
    #[must_use]
    pub fn failures(&self) -> &[TargetFailure] {
        &self.failures
    }

    /// Pattern targets that expanded to nothing.
    #[must_use]
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    /// Whether at least one record changed.
    #[must_use]
    pub fn any_changed(&self) -> bool {
        !self.changed.is_empty()
    }

    fn fail(&mut self, target: impl Into<String>, error: GuardError) {
        let failure = TargetFailure::new(target, error);
        debug!(target_spec = failure.target(), error = %failure.error(), "target failed");
        self.failures.push(failure);
    }

    fn nothing_matched(&mut self, target: &str) {
        warn!(target_spec = target, "pattern matched no targets");
        self.unmatched.push(target.to_owned());
    }
}

/// Protection operations over one repository.
#[derive(Debug)]
pub struct Guard<'a> {
    root: Utf8PathBuf,
    extractors: &'a ExtractorRegistry,
    registry: ProtectionRegistry,
}

impl<'a> Guard<'a> {
    /// Opens the repository at `root`, loading its registry.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry exists but cannot be read or
    /// parsed.
    pub fn open(root: impl Into<Utf8PathBuf>, extractors: &'a ExtractorRegistry) -> Result<Self, GuardError> {
        let repository = root.into();
        let registry = ProtectionRegistry::load(&repository)?;
        Ok(Self {
            root: repository,
            extractors,
            registry,
        })
    }

    /// The repository root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The loaded registry.
    #[must_use]
    pub const fn registry(&self) -> &ProtectionRegistry {
        &self.registry
    }

    /// Protects every target, overwriting existing records for the same key.
    ///
    /// # Errors
    ///
    /// Per-target problems are collected in the outcome; an error is
    /// returned only when the registry cannot be written.
    pub fn add<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<BatchOutcome, GuardError> {
        let mut outcome = BatchOutcome::default();
        for target in targets {
            let raw = target.as_ref();
            let resolution = match self.parse(raw).and_then(|spec| {
                TargetResolver::new(&self.root, self.extractors).resolve(&spec)
            }) {
                Ok(resolution) => resolution,
                Err(error) => {
                    outcome.fail(raw, error);
                    continue;
                }
            };

            if resolution.keys.is_empty() && resolution.failures.is_empty() {
                outcome.nothing_matched(raw);
            }
            outcome.failures.extend(resolution.failures);
            for key in resolution.keys {
                match fingerprint_target(&self.root, self.extractors, &key) {
                    Ok(fingerprint) => {
                        let record = ProtectionRecord::new(key, fingerprint);
                        self.registry.upsert(record.clone());
                        outcome.changed.push(record);
                    }
                    Err(error) => outcome.fail(key.to_string(), error),
                }
            }
        }
        self.commit(&outcome)?;
        Ok(outcome)
    }

    /// Re-fingerprints targets that are already protected.
    ///
    /// Targets resolve against existing records; a literal target without a
    /// record fails with [`GuardError::NotProtected`].
    ///
    /// # Errors
    ///
    /// Per-target problems are collected in the outcome; an error is
    /// returned only when the registry cannot be written.
    pub fn update<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<BatchOutcome, GuardError> {
        let mut outcome = BatchOutcome::default();
        for target in targets {
            let raw = target.as_ref();
            let Some(keys) = self.registered_keys(raw, &mut outcome) else {
                continue;
            };
            for key in keys {
                match fingerprint_target(&self.root, self.extractors, &key) {
                    Ok(fingerprint) => {
                        let record = ProtectionRecord::new(key, fingerprint);
                        self.registry.upsert(record.clone());
                        outcome.changed.push(record);
                    }
                    Err(error) => outcome.fail(key.to_string(), error),
                }
            }
        }
        self.commit(&outcome)?;
        Ok(outcome)
    }

    /// Deletes the records matching every target.
    ///
    /// Removal never reads the protected files, so records for deleted
    /// files can still be removed.
    ///
    /// # Errors
    ///
    /// Per-target problems are collected in the outcome; an error is
    /// returned only when the registry cannot be written.
    pub fn remove<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<BatchOutcome, GuardError> {
        let mut outcome = BatchOutcome::default();
        for target in targets {
            let raw = target.as_ref();
            let Some(keys) = self.registered_keys(raw, &mut outcome) else {
                continue;
            };
            for key in keys {
                if let Some(record) = self.registry.remove(&key) {
                    outcome.changed.push(record);
                }
            }
        }
        self.commit(&outcome)?;
        Ok(outcome)
    }

    /// Every record, the self record first.
    #[must_use]
    pub fn list(&self) -> Vec<ProtectionRecord> {
        self.registry.list()
    }

    /// Verifies the loaded registry against the working tree.
    ///
    /// # Errors
    ///
    /// Returns an error for structural problems that prevent evaluation.
    pub fn verify(&self) -> Result<VerifyReport, GuardError> {
        Verifier::new(&self.root, self.extractors).verify(&self.registry)
    }

    fn parse(&self, raw: &str) -> Result<TargetSpec, GuardError> {
        Ok(TargetSpec::parse(raw, &self.root)?)
    }

    /// Resolves `raw` against existing records, reporting failures and
    /// empty expansions into `outcome`.
    fn registered_keys(&self, raw: &str, outcome: &mut BatchOutcome) -> Option<Vec<TargetKey>> {
        let resolved = self.parse(raw).and_then(|spec| {
            let keys = TargetResolver::new(&self.root, self.extractors)
                .resolve_registered(&spec, &self.registry)?;
            Ok((spec.is_pattern(), keys))
        });
        match resolved {
            Err(error) => {
                outcome.fail(raw, error);
                None
            }
            Ok((true, keys)) if keys.is_empty() => {
                outcome.nothing_matched(raw);
                None
            }
            Ok((_, keys)) => {
                let (known, unknown): (Vec<TargetKey>, Vec<TargetKey>) =
                    keys.into_iter().partition(|key| self.registry.contains(key));
                for key in unknown {
                    outcome.fail(raw, GuardError::not_protected(key.to_string()));
                }
                Some(known)
            }
        }
    }

    fn commit(&mut self, outcome: &BatchOutcome) -> Result<(), GuardError> {
        if outcome.any_changed() {
            self.registry.save()?;
        } else {
            debug!("no records changed; registry left untouched");
        }
        Ok(())
    }
}
