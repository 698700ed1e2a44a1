use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory")]
    NoHome,

    #[error("failed to create home directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Resolve the server home directory into an absolute path.
///
/// - `None` (or blank) selects `<user home>/<default_subdir>`.
/// - A leading `~` is expanded to the user home directory.
/// - Relative paths are anchored at the current working directory.
pub fn resolve_home_dir(
    raw: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match raw.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => dirs::home_dir()
            .ok_or(HomeDirError::NoHome)?
            .join(default_subdir),
        Some(p) => expand(p)?,
    };

    if create {
        std::fs::create_dir_all(&resolved).map_err(|source| HomeDirError::Create {
            path: resolved.clone(),
            source,
        })?;
    }

    Ok(resolved)
}

fn expand(p: &str) -> Result<PathBuf, HomeDirError> {
    if p == "~" {
        return dirs::home_dir().ok_or(HomeDirError::NoHome);
    }
    if let Some(rest) = p.strip_prefix("~/") {
        return Ok(dirs::home_dir().ok_or(HomeDirError::NoHome)?.join(rest));
    }

    let path = Path::new(p);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        let cwd = std::env::current_dir().map_err(|source| HomeDirError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(cwd.join(path))
    }
}
