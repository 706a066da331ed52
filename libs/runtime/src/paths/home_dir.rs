use std::env;
use std::path::{Path, PathBuf};

/// Errors raised while resolving the application home directory.
#[derive(Debug, thiserror::Error)]
pub enum HomeDirError {
    #[error("cannot determine platform home directory")]
    NoPlatformHome,
    #[error("failed to create '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn platform_home() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    let base = dirs::config_dir();
    #[cfg(not(target_os = "windows"))]
    let base = dirs::home_dir();

    base.filter(|p| !p.as_os_str().is_empty())
        .ok_or(HomeDirError::NoPlatformHome)
}

/// Expand a leading `~` into the platform home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return platform_home();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_home()?.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(p: PathBuf) -> PathBuf {
    if p.is_absolute() {
        return p;
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(p),
        Err(_) => p,
    }
}

/// Resolve the application home directory.
///
/// * `Some(path)` expands `~` and makes the path absolute against the cwd.
/// * `None` falls back to `<platform home>/<default_subdir>`
///   (the user's home on Unix/macOS, `%APPDATA%` on Windows).
///
/// When `create` is true the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let path = match configured {
        Some(raw) => absolutize(expand_tilde(raw.trim())?),
        None => platform_home()?.join(default_subdir),
    };

    if create {
        ensure_dir(&path)?;
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested").join("home");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let resolved = resolve_home_dir(Some("relative/dir".into()), ".x", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn default_lives_under_the_user_home() {
        let home = dirs::home_dir().expect("test host has a home directory");
        let resolved = resolve_home_dir(None, ".consultorio", false).unwrap();
        assert_eq!(resolved, home.join(".consultorio"));

        let tilde = resolve_home_dir(Some("~/clinic".into()), ".x", false).unwrap();
        assert_eq!(tilde, home.join("clinic"));
    }

    #[test]
    fn create_false_does_not_touch_disk() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("never-created");
        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", false).unwrap();
        assert_eq!(resolved, target);
        assert!(!target.exists());
    }
}
