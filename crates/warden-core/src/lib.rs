//! Protection engine for the Warden toolchain.
//!
//! `warden-core` persists fingerprints of protected code regions and later
//! re-derives them to detect drift. It builds on the span extractors of
//! `warden-syntax`:
//!
//! - [`Fingerprint`] hashes the exact bytes of a file or extracted span.
//! - [`TargetSpec`] and [`TargetResolver`] turn `path[:identifier]` strings,
//!   wildcards included, into concrete [`TargetKey`]s.
//! - [`ProtectionRegistry`] owns the ordered records and the `.warden` file,
//!   including the implicit record that protects the file itself.
//! - [`Verifier`] classifies every record as intact or drifted.
//! - [`Guard`] combines the above into the batch operations a command-line
//!   front end drives.
//!
//! # Example
//!
//! ```no_run
//! use warden_core::Guard;
//! use warden_syntax::ExtractorRegistry;
//!
//! let extractors = ExtractorRegistry::with_defaults();
//! let mut guard = Guard::open("/path/to/repo", &extractors)?;
//! guard.add(&["src/calc.py:calc"])?;
//! assert!(guard.verify()?.is_clean());
//! # Ok::<(), warden_core::GuardError>(())
//! ```

mod content;
mod error;
mod fingerprint;
mod guard;
mod record;
mod registry;
mod target;
mod verify;

pub use error::{GuardError, RegistryFormatError, TargetError};
pub use fingerprint::{FINGERPRINT_LEN, Fingerprint};
pub use guard::{BatchOutcome, Guard};
pub use record::{ProtectionRecord, TargetKey};
pub use registry::{ProtectionRegistry, REGISTRY_FILE, self_digest, stored_self_fingerprint};
pub use target::{Resolution, TargetFailure, TargetResolver, TargetSpec, is_wildcard};
pub use verify::{RecordStatus, VerifyReport, Verifier, Violation, ViolationKind};

#[cfg(test)]
mod tests;
