//! The persisted protection registry.
//!
//! The registry lives in [`REGISTRY_FILE`] at the repository root. Its first
//! line is the self-protection record, `.warden:<fingerprint>`, whose
//! fingerprint covers every other byte of the file. The remaining lines hold
//! one [`ProtectionRecord`] each, in the order they were first added.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

use crate::error::{GuardError, RegistryFormatError};
use crate::fingerprint::Fingerprint;
use crate::record::{ProtectionRecord, TargetKey};

/// Name of the registry file at the repository root.
pub const REGISTRY_FILE: &str = ".warden";

const SELF_PREFIX: &str = ".warden:";

/// The ordered set of protection records plus the implicit self record.
#[derive(Debug, Clone)]
pub struct ProtectionRegistry {
    path: Utf8PathBuf,
    records: Vec<ProtectionRecord>,
    self_fingerprint: Option<Fingerprint>,
}

impl ProtectionRegistry {
    /// Creates an empty, unsaved registry for the repository at `root`.
    #[must_use]
    pub fn empty(root: &Utf8Path) -> Self {
        Self {
            path: root.join(REGISTRY_FILE),
            records: Vec::new(),
            self_fingerprint: None,
        }
    }

    /// Loads the registry of the repository at `root`.
    ///
    /// A missing registry file yields an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Io`] when the file cannot be read and
    /// [`GuardError::RegistryFormat`] when a line cannot be parsed.
    pub fn load(root: &Utf8Path) -> Result<Self, GuardError> {
        let mut registry = Self::empty(root);
        let bytes = match fs::read(&registry.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %registry.path, "no registry file; starting empty");
                return Ok(registry);
            }
            Err(err) => return Err(GuardError::io(registry.path, err)),
        };
        registry.parse(&bytes)?;
        debug!(
            path = %registry.path,
            records = registry.records.len(),
            "loaded registry"
        );
        Ok(registry)
    }

    fn parse(&mut self, bytes: &[u8]) -> Result<(), RegistryFormatError> {
        let mut seen = HashSet::new();
        for (index, raw) in bytes.split(|byte| *byte == b'\n').enumerate() {
            let line_number = index + 1;
            let line = std::str::from_utf8(raw)
                .map_err(|_| RegistryFormatError::new(line_number, "invalid UTF-8"))?
                .trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            if let Some(hex) = line.strip_prefix(SELF_PREFIX) {
                if self.self_fingerprint.is_some() {
                    return Err(RegistryFormatError::new(
                        line_number,
                        "duplicate self-protection line",
                    ));
                }
                let fingerprint = Fingerprint::parse(hex).ok_or_else(|| {
                    RegistryFormatError::new(line_number, format!("invalid fingerprint '{hex}'"))
                })?;
                self.self_fingerprint = Some(fingerprint);
                continue;
            }

            let record = ProtectionRecord::parse_line(line, line_number)?;
            if seen.insert(record.key().clone()) {
                self.records.push(record);
            } else {
                warn!(
                    target_key = %record.key(),
                    line = line_number,
                    "duplicate registry entry ignored"
                );
            }
        }
        Ok(())
    }

    /// Path of the registry file.
    #[must_use]
    pub fn file_path(&self) -> &Utf8Path {
        &self.path
    }

    /// The user-visible records in persisted order, without the self record.
    #[must_use]
    pub fn records(&self) -> &[ProtectionRecord] {
        &self.records
    }

    /// Whether the registry holds no user records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The self-protection fingerprint stored in the file, if any.
    #[must_use]
    pub const fn self_fingerprint(&self) -> Option<&Fingerprint> {
        self.self_fingerprint.as_ref()
    }

    /// The implicit record protecting the registry file itself.
    #[must_use]
    pub fn self_record(&self) -> Option<ProtectionRecord> {
        self.self_fingerprint
            .clone()
            .map(|fingerprint| ProtectionRecord::new(TargetKey::file(REGISTRY_FILE), fingerprint))
    }

    /// Every record, the self record first.
    #[must_use]
    pub fn list(&self) -> Vec<ProtectionRecord> {
        self.self_record()
            .into_iter()
            .chain(self.records.iter().cloned())
            .collect()
    }

    /// Looks up the record for `key`.
    #[must_use]
    pub fn get(&self, key: &TargetKey) -> Option<&ProtectionRecord> {
        self.records.iter().find(|record| record.key() == key)
    }

    /// Whether a record exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &TargetKey) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `record`, or overwrites the fingerprint of an existing record
    /// with the same key in place. Returns `true` when a record was replaced.
    pub fn upsert(&mut self, record: ProtectionRecord) -> bool {
        if let Some(existing) = self
            .records
            .iter_mut()
            .find(|existing| existing.key() == record.key())
        {
            existing.set_fingerprint(record.fingerprint().clone());
            true
        } else {
            self.records.push(record);
            false
        }
    }

    /// Deletes the record for `key`, returning it.
    pub fn remove(&mut self, key: &TargetKey) -> Option<ProtectionRecord> {
        let position = self.records.iter().position(|record| record.key() == key)?;
        Some(self.records.remove(position))
    }

    /// Renders the file content, self line included.
    #[must_use]
    pub fn render(&self) -> (String, Fingerprint) {
        let body: String = self
            .records
            .iter()
            .map(|record| format!("{}\n", record.to_line()))
            .collect();
        let fingerprint = Fingerprint::of(&body);
        (format!("{SELF_PREFIX}{fingerprint}\n{body}"), fingerprint)
    }

    /// Rewrites the registry file atomically and refreshes the self record.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Io`] when the temporary file cannot be written
    /// or renamed into place.
    pub fn save(&mut self) -> Result<(), GuardError> {
        let (content, fingerprint) = self.render();
        let parent = self.path.parent().unwrap_or_else(|| Utf8Path::new("."));

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)
            .map_err(|err| GuardError::io(self.path.clone(), err))?;
        temp_file
            .write_all(content.as_bytes())
            .map_err(|err| GuardError::io(self.path.clone(), err))?;
        temp_file
            .persist(&self.path)
            .map_err(|err| GuardError::io(self.path.clone(), err.error))?;

        debug!(
            path = %self.path,
            records = self.records.len(),
            fingerprint = fingerprint.short(),
            "registry written"
        );
        self.self_fingerprint = Some(fingerprint);
        Ok(())
    }
}

/// Fingerprint of registry bytes with every self-protection line removed.
#[must_use]
pub fn self_digest(bytes: &[u8]) -> Fingerprint {
    let covered: Vec<u8> = bytes
        .split_inclusive(|byte| *byte == b'\n')
        .filter(|line| !line.starts_with(SELF_PREFIX.as_bytes()))
        .flatten()
        .copied()
        .collect();
    Fingerprint::of(covered)
}

/// The self fingerprint recorded in registry bytes, if a valid one exists.
#[must_use]
pub fn stored_self_fingerprint(bytes: &[u8]) -> Option<Fingerprint> {
    bytes
        .split(|byte| *byte == b'\n')
        .find_map(|line| line.strip_prefix(SELF_PREFIX.as_bytes()))
        .and_then(|hex| std::str::from_utf8(hex).ok())
        .and_then(|hex| Fingerprint::parse(hex.trim_end_matches('\r')))
}
