//! Git pre-commit hook installation.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

/// Marker identifying a hook section written by Warden.
const HOOK_MARKER: &str = "# warden pre-commit hook";

const HOOK_SCRIPT: &str = "\
#!/bin/sh
# warden pre-commit hook
# Blocks commits that modify protected code.

warden verify
if [ $? -ne 0 ]; then
    echo \"\"
    echo \"Commit blocked: protected code was modified.\"
    echo \"If the change is intentional, run 'warden update <target>' first.\"
    exit 1
fi
";

/// Errors raised while installing the hook.
#[derive(Debug, Error)]
pub(crate) enum HookError {
    /// The repository has no `.git/hooks` directory.
    #[error(".git/hooks directory not found under '{root}'")]
    MissingHooksDir { root: Utf8PathBuf },
    /// Reading or writing the hook failed.
    #[error("failed to write hook '{path}': {source}")]
    Io { path: Utf8PathBuf, source: io::Error },
}

/// What [`install`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HookOutcome {
    /// A new hook file was created.
    Installed(Utf8PathBuf),
    /// The Warden section was appended to an existing hook.
    Appended(Utf8PathBuf),
    /// The hook already runs Warden.
    AlreadyInstalled(Utf8PathBuf),
}

/// Writes or extends `.git/hooks/pre-commit` under `root`.
pub(crate) fn install(root: &Utf8Path) -> Result<HookOutcome, HookError> {
    let hooks_dir = root.join(".git").join("hooks");
    if !hooks_dir.is_dir() {
        return Err(HookError::MissingHooksDir {
            root: root.to_owned(),
        });
    }
    let hook_path = hooks_dir.join("pre-commit");
    let io_error = |source: io::Error| HookError::Io {
        path: hook_path.clone(),
        source,
    };

    let (content, outcome) = match fs::read_to_string(&hook_path) {
        Ok(existing) if existing.contains(HOOK_MARKER) => {
            debug!(path = %hook_path, "hook already present");
            return Ok(HookOutcome::AlreadyInstalled(hook_path.clone()));
        }
        Ok(existing) => (
            format!("{}\n\n{}", existing.trim_end(), section()),
            HookOutcome::Appended(hook_path.clone()),
        ),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            (HOOK_SCRIPT.to_owned(), HookOutcome::Installed(hook_path.clone()))
        }
        Err(err) => return Err(io_error(err)),
    };

    fs::write(&hook_path, content).map_err(io_error)?;
    make_executable(&hook_path).map_err(io_error)?;
    debug!(path = %hook_path, "hook written");
    Ok(outcome)
}

/// The script without its shebang, for appending to an existing hook.
fn section() -> &'static str {
    HOOK_SCRIPT
        .split_once('\n')
        .map_or(HOOK_SCRIPT, |(_, rest)| rest)
}

#[cfg(unix)]
fn make_executable(path: &Utf8Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Utf8Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Repo {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn repo() -> Repo {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        fs::create_dir_all(root.join(".git/hooks")).expect("hooks dir");
        Repo { _dir: dir, root }
    }

    #[rstest]
    fn installs_fresh_hook(repo: Repo) {
        let outcome = install(&repo.root).expect("install");
        let hook = repo.root.join(".git/hooks/pre-commit");
        assert_eq!(outcome, HookOutcome::Installed(hook.clone()));
        let content = fs::read_to_string(&hook).expect("read hook");
        assert!(content.starts_with("#!/bin/sh\n"));
        assert!(content.contains("warden verify"));
    }

    #[rstest]
    fn appends_to_existing_hook_once(repo: Repo) {
        let hook = repo.root.join(".git/hooks/pre-commit");
        fs::write(&hook, "#!/bin/sh\ncargo fmt --check\n").expect("seed hook");

        assert_eq!(install(&repo.root).expect("append"), HookOutcome::Appended(hook.clone()));
        assert_eq!(
            install(&repo.root).expect("again"),
            HookOutcome::AlreadyInstalled(hook.clone())
        );

        let content = fs::read_to_string(&hook).expect("read hook");
        assert!(content.starts_with("#!/bin/sh\ncargo fmt --check\n\n# warden pre-commit hook"));
        assert_eq!(content.matches("#!/bin/sh").count(), 1);
    }

    #[cfg(unix)]
    #[rstest]
    fn hook_is_executable(repo: Repo) {
        use std::os::unix::fs::PermissionsExt;

        install(&repo.root).expect("install");
        let mode = fs::metadata(repo.root.join(".git/hooks/pre-commit"))
            .expect("metadata")
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn missing_hooks_dir_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        assert!(matches!(install(&root), Err(HookError::MissingHooksDir { .. })));
    }
}
