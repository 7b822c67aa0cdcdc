//! Host platform queries: privilege level, CI detection, PATH lookup.

use std::path::{Path, PathBuf};

/// Check if running in a CI environment.
///
/// Used to force non-interactive output in `main()`.
/// Checks common CI environment variables: `CI`, `GITHUB_ACTIONS`,
/// `GITLAB_CI`, `CIRCLECI`, `TRAVIS`, `JENKINS_URL`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Effective user id of this process.
pub fn effective_uid() -> u32 {
    #[cfg(unix)]
    {
        // SAFETY: geteuid() is a simple syscall that returns the effective user ID
        unsafe { libc::geteuid() }
    }

    #[cfg(not(unix))]
    {
        u32::MAX
    }
}

/// Check if running as root.
pub fn is_elevated() -> bool {
    effective_uid() == 0
}

/// Locate `program` on PATH.
///
/// Names containing a slash are checked as paths directly.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_in_path_locates_sh() {
        let found = find_in_path("sh").expect("sh should be on PATH");
        assert!(found.ends_with("sh"));
    }

    #[test]
    fn find_in_path_misses_unknown_program() {
        assert!(find_in_path("hostprep-definitely-not-a-program").is_none());
    }

    #[test]
    fn find_in_path_accepts_absolute_paths() {
        assert!(find_in_path("/bin/sh").is_some());
        assert!(find_in_path("/nonexistent/bin/tool").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_file_is_not_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("tool");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();
        assert!(find_in_path(file.to_str().unwrap()).is_none());
    }

    #[test]
    fn is_elevated_matches_uid() {
        assert_eq!(is_elevated(), effective_uid() == 0);
    }

    #[test]
    fn is_ci_detects_environment() {
        // Just ensure function doesn't panic
        let _ = is_ci();
    }
}
