//! Tests for the batch operations and verification over scratch repositories.

use std::fs;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use warden_syntax::ExtractorRegistry;

use crate::{
    Fingerprint, Guard, GuardError, ProtectionRecord, REGISTRY_FILE, TargetKey, TargetResolver,
    TargetSpec, Verifier, ViolationKind,
};

const CALC_PY: &str = "\
import math


def helper():
    return 0


@cache
def calc(x):
    \"\"\"Compute.\"\"\"
    return math.sqrt(x)
";

const SHAPE_RS: &str = "\
pub struct Shape;

impl Shape {
    pub fn area(&self) -> f64 {
        1.0
    }

    pub fn area_scaled(&self, k: f64) -> f64 {
        k
    }

    pub fn name(&self) -> &str {
        \"shape\"
    }
}
";

struct Repo {
    _dir: TempDir,
    root: Utf8PathBuf,
    extractors: ExtractorRegistry,
}

impl Repo {
    fn write(&self, path: &str, content: &str) {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(full, content).expect("write file");
    }

    fn guard(&self) -> Guard<'_> {
        Guard::open(self.root.clone(), &self.extractors).expect("open guard")
    }

    fn kinds(&self) -> Vec<(String, ViolationKind)> {
        Verifier::new(&self.root, &self.extractors)
            .verify_root()
            .expect("verify")
            .violations()
            .filter_map(|status| {
                status
                    .violation()
                    .map(|violation| (status.key().to_string(), violation.kind()))
            })
            .collect()
    }

    fn keys(&self) -> Vec<String> {
        self.guard()
            .registry()
            .records()
            .iter()
            .map(|record| record.key().to_string())
            .collect()
    }
}

#[fixture]
fn repo() -> Repo {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
    let repo = Repo {
        _dir: dir,
        root,
        extractors: ExtractorRegistry::with_defaults(),
    };
    repo.write("src/calc.py", CALC_PY);
    repo.write("src/shape.rs", SHAPE_RS);
    repo.write("docs/notes.txt", "A");
    repo
}

// =============================================================================
// Adding
// =============================================================================

#[rstest]
fn add_creates_registry_with_self_line(repo: Repo) {
    let outcome = repo.guard().add(&["src/calc.py:calc", "docs/notes.txt"]).expect("add");
    assert_eq!(outcome.changed().len(), 2);

    let text = fs::read_to_string(repo.root.join(REGISTRY_FILE)).expect("registry");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.first().is_some_and(|line| line.starts_with(".warden:")));
    assert!(lines.get(1).is_some_and(|line| line.starts_with("src/calc.py:calc:")));
    assert!(repo.kinds().is_empty());
}

#[rstest]
fn readding_overwrites_instead_of_duplicating(repo: Repo) {
    repo.guard().add(&["docs/notes.txt", "src/calc.py"]).expect("add");
    repo.write("docs/notes.txt", "B");
    repo.guard().add(&["docs/notes.txt"]).expect("re-add");

    assert_eq!(repo.keys(), vec!["docs/notes.txt", "src/calc.py"]);
    assert!(repo.kinds().is_empty());
}

#[rstest]
fn member_patterns_expand_through_the_container(repo: Repo) {
    let outcome = repo.guard().add(&["src/shape.rs:Shape::area*"]).expect("add");
    assert!(outcome.failures().is_empty());
    assert_eq!(
        repo.keys(),
        vec!["src/shape.rs:Shape::area", "src/shape.rs:Shape::area_scaled"]
    );
}

#[rstest]
fn path_globs_expand_to_sorted_files(repo: Repo) {
    repo.write("src/b.py", "b = 1\n");
    repo.write("src/a.py", "a = 1\n");
    repo.guard().add(&["src/*.py"]).expect("add");
    assert_eq!(repo.keys(), vec!["src/a.py", "src/b.py", "src/calc.py"]);
}

#[rstest]
fn one_failing_target_does_not_abort_the_batch(repo: Repo) {
    let outcome = repo
        .guard()
        .add(&["src/missing.py", "src/calc.py:nope", "src/calc.py:helper"])
        .expect("add");

    let failures: Vec<String> = outcome
        .failures()
        .iter()
        .map(|failure| format!("{} -> {}", failure.target(), failure.error()))
        .collect();
    assert_eq!(
        failures,
        vec![
            "src/missing.py -> file not found: 'src/missing.py'",
            "src/calc.py:nope -> identifier 'nope' not found in 'src/calc.py'",
        ]
    );
    assert_eq!(repo.keys(), vec!["src/calc.py:helper"]);
}

#[rstest]
fn empty_expansions_are_reported_not_failed(repo: Repo) {
    let outcome = repo.guard().add(&["src/calc.py:test_*"]).expect("add");
    assert!(outcome.failures().is_empty());
    assert_eq!(outcome.unmatched(), ["src/calc.py:test_*"]);
    assert!(!repo.root.join(REGISTRY_FILE).exists());
}

#[rstest]
fn identifiers_in_unsupported_languages_fail_per_target(repo: Repo) {
    let outcome = repo.guard().add(&["docs/notes.txt:intro"]).expect("add");
    assert!(matches!(
        outcome.failures().first().map(|failure| failure.error()),
        Some(GuardError::UnsupportedLanguage { .. })
    ));
}

// =============================================================================
// Updating and removing
// =============================================================================

#[rstest]
fn update_refreshes_the_stored_fingerprint(repo: Repo) {
    repo.guard().add(&["src/calc.py:calc"]).expect("add");
    repo.write("src/calc.py", &CALC_PY.replace("sqrt", "floor"));
    assert_eq!(
        repo.kinds(),
        vec![("src/calc.py:calc".to_owned(), ViolationKind::HashMismatch)]
    );

    let outcome = repo.guard().update(&["src/calc.py:calc"]).expect("update");
    assert_eq!(outcome.changed().len(), 1);
    assert!(repo.kinds().is_empty());
}

#[rstest]
fn remove_works_for_deleted_files(repo: Repo) {
    repo.guard().add(&["docs/notes.txt", "src/calc.py"]).expect("add");
    fs::remove_file(repo.root.join("docs/notes.txt")).expect("delete");

    let outcome = repo.guard().remove(&["docs/notes.txt"]).expect("remove");
    assert_eq!(outcome.changed().len(), 1);
    assert_eq!(repo.keys(), vec!["src/calc.py"]);
}

#[rstest]
fn remove_patterns_match_registered_records(repo: Repo) {
    repo.guard()
        .add(&["src/shape.rs:Shape::*", "src/calc.py:calc"])
        .expect("add");
    let outcome = repo.guard().remove(&["src/*.rs:Shape::area*"]).expect("remove");
    assert_eq!(outcome.changed().len(), 2);
    assert_eq!(repo.keys(), vec!["src/shape.rs:Shape::name", "src/calc.py:calc"]);
}

#[rstest]
fn remove_of_unknown_target_is_not_protected(repo: Repo) {
    repo.guard().add(&["src/calc.py"]).expect("add");
    let before = fs::read(repo.root.join(REGISTRY_FILE)).expect("registry");

    let outcome = repo.guard().remove(&["src/calc.py:calc"]).expect("remove");
    assert!(matches!(
        outcome.failures().first().map(|failure| failure.error()),
        Some(GuardError::NotProtected { .. })
    ));
    assert_eq!(fs::read(repo.root.join(REGISTRY_FILE)).expect("registry"), before);
}

// =============================================================================
// Verification
// =============================================================================

#[rstest]
fn edits_outside_the_span_keep_the_identifier_intact(repo: Repo) {
    repo.guard().add(&["src/calc.py:calc"]).expect("add");
    repo.write("src/calc.py", &CALC_PY.replace("return 0", "return 42"));
    assert!(repo.kinds().is_empty());
}

#[rstest]
fn deleted_files_are_missing_not_mismatched(repo: Repo) {
    repo.guard().add(&["src/calc.py:calc", "docs/notes.txt"]).expect("add");
    fs::remove_file(repo.root.join("src/calc.py")).expect("delete");
    assert_eq!(
        repo.kinds(),
        vec![("src/calc.py:calc".to_owned(), ViolationKind::MissingFile)]
    );
}

#[rstest]
fn verify_is_idempotent(repo: Repo) {
    repo.guard().add(&["src/calc.py:calc", "docs/notes.txt"]).expect("add");
    repo.write("docs/notes.txt", "B");
    let verifier = Verifier::new(&repo.root, &repo.extractors);
    assert_eq!(
        verifier.verify_root().expect("first"),
        verifier.verify_root().expect("second")
    );
}

#[rstest]
fn malformed_registry_is_reported_as_self_mismatch(repo: Repo) {
    fs::write(repo.root.join(REGISTRY_FILE), "garbage\n").expect("write");
    assert_eq!(
        repo.kinds(),
        vec![(REGISTRY_FILE.to_owned(), ViolationKind::HashMismatch)]
    );
}

#[rstest]
fn registry_without_self_line_is_modified(repo: Repo) {
    let record = ProtectionRecord::new(TargetKey::file("docs/notes.txt"), Fingerprint::of("A"));
    fs::write(repo.root.join(REGISTRY_FILE), format!("{}\n", record.to_line())).expect("write");
    assert_eq!(
        repo.kinds(),
        vec![(REGISTRY_FILE.to_owned(), ViolationKind::HashMismatch)]
    );
}

#[rstest]
fn missing_registry_verifies_clean(repo: Repo) {
    let report = Verifier::new(&repo.root, &repo.extractors)
        .verify_root()
        .expect("verify");
    assert!(report.is_clean());
    assert!(report.statuses().is_empty());
}

#[rstest]
fn unsupported_identifier_records_abort_verification(repo: Repo) {
    let record = ProtectionRecord::new(
        TargetKey::identifier("docs/notes.txt", "intro"),
        Fingerprint::of("A"),
    );
    let mut registry = crate::ProtectionRegistry::empty(&repo.root);
    registry.upsert(record);
    registry.save().expect("save");

    let error = Verifier::new(&repo.root, &repo.extractors)
        .verify_root()
        .expect_err("structural failure");
    assert!(matches!(error, GuardError::UnsupportedLanguage { .. }));
}

// =============================================================================
// Resolution
// =============================================================================

#[rstest]
fn identifier_expansion_is_deterministic(repo: Repo) {
    repo.write(
        "tests/test_props.py",
        "def test_b():\n    pass\n\n\ndef test_a():\n    pass\n",
    );
    let resolver = TargetResolver::new(&repo.root, &repo.extractors);
    let spec = TargetSpec::parse("tests/test_props.py:test_?", &repo.root).expect("spec");

    let first = resolver.resolve(&spec).expect("resolve").keys;
    let second = resolver.resolve(&spec).expect("resolve").keys;
    assert_eq!(first, second);
    assert_eq!(
        first,
        vec![
            TargetKey::identifier("tests/test_props.py", "test_b"),
            TargetKey::identifier("tests/test_props.py", "test_a"),
        ]
    );
}

#[rstest]
fn absolute_targets_under_the_root_are_relative(repo: Repo) {
    let raw = format!("{}:calc", repo.root.join("src/calc.py"));
    let spec = TargetSpec::parse(&raw, &repo.root).expect("spec");
    assert_eq!(spec.path(), "src/calc.py");
    assert_eq!(spec.identifier(), Some("calc"));
}

#[rstest]
fn path_globs_skip_hidden_directories(repo: Repo) {
    repo.write(".venv/lib/site.py", "def site():\n    pass\n");
    repo.write(".git/hooks/x.py", "def x():\n    pass\n");

    repo.guard().add(&["**/*.py"]).expect("add");
    assert_eq!(repo.keys(), vec!["src/calc.py"]);

    repo.guard().add(&[".venv/**/*.py"]).expect("add hidden");
    assert_eq!(repo.keys(), vec!["src/calc.py", ".venv/lib/site.py"]);
}

#[rstest]
fn registered_patterns_skip_hidden_records(repo: Repo) {
    repo.write(".venv/site.py", "def site():\n    pass\n");
    repo.guard().add(&["src/calc.py", ".venv/site.py"]).expect("add");

    let outcome = repo.guard().remove(&["*/*.py"]).expect("remove");
    assert_eq!(outcome.changed().len(), 1);
    assert_eq!(repo.keys(), vec![".venv/site.py"]);

    repo.guard().remove(&[".venv/*.py"]).expect("remove hidden");
    assert!(repo.keys().is_empty());
}

#[rstest]
fn parent_segments_inside_the_root_resolve(repo: Repo) {
    let outcome = repo.guard().add(&["src/../docs/notes.txt"]).expect("add");
    assert!(outcome.failures().is_empty());
    assert_eq!(repo.keys(), vec!["docs/notes.txt"]);
}
