//! Reading protected content and deriving its fingerprint.

use std::fs;
use std::io;
use std::path::Path;

use camino::Utf8Path;
use warden_syntax::ExtractorRegistry;

use crate::error::GuardError;
use crate::fingerprint::Fingerprint;
use crate::record::TargetKey;

/// Reads the raw bytes of the repository-relative `path`.
pub(crate) fn read_bytes(root: &Utf8Path, path: &str) -> Result<Vec<u8>, GuardError> {
    let full = root.join(path);
    fs::read(&full).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => GuardError::FileNotFound {
            path: path.to_owned(),
        },
        _ => GuardError::io(full, err),
    })
}

/// Decodes file bytes as UTF-8 source text for `language`.
pub(crate) fn decode_source(
    path: &str,
    language: &str,
    bytes: Vec<u8>,
) -> Result<String, GuardError> {
    String::from_utf8(bytes).map_err(|err| GuardError::Parse {
        path: path.to_owned(),
        language: language.to_owned(),
        message: format!("source is not valid UTF-8: {}", err.utf8_error()),
    })
}

/// Computes the current fingerprint of `key`.
///
/// Whole-file keys hash the raw bytes; identifier keys hash the text of the
/// span the registered extractor cuts out. The file is read before an
/// extractor is chosen, so a deleted file always reports
/// [`GuardError::FileNotFound`].
pub(crate) fn fingerprint_target(
    root: &Utf8Path,
    extractors: &ExtractorRegistry,
    key: &TargetKey,
) -> Result<Fingerprint, GuardError> {
    let bytes = read_bytes(root, key.path())?;
    let Some(name) = key.identifier_name() else {
        return Ok(Fingerprint::of(bytes));
    };

    let extractor = extractors
        .for_path(Path::new(key.path()))
        .map_err(|err| GuardError::from_extract(key.path(), err))?;
    let source = decode_source(key.path(), extractor.language(), bytes)?;
    let span = extractor
        .extract(&source, name)
        .map_err(|err| GuardError::from_extract(key.path(), err))?;
    Ok(Fingerprint::of(span.text()))
}
