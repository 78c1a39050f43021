//! Process-wide geospatial environment.
//!
//! PROJ reads `PROJ_DATA` (and the older `PROJ_LIB`) once, when GDAL first
//! builds a transformation. [`configure`] must therefore run before the
//! async runtime starts and before any GDAL call.

use std::path::{Path, PathBuf};

pub const PROJ_ENV_VARS: [&str; 2] = ["PROJ_DATA", "PROJ_LIB"];

/// Usual install locations of `proj.db`.
pub const SYSTEM_PROJ_DIRS: [&str; 3] = ["/usr/share/proj", "/usr/local/share/proj", "/opt/homebrew/share/proj"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjSource {
    Config,
    Environment,
    System,
}

/// Where PROJ resources will be found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoEnv {
    pub proj_data: PathBuf,
    pub source: ProjSource,
}

/// Decide the PROJ directory without touching the environment.
///
/// An explicit directory wins when it exists. Otherwise a value already in
/// the environment is kept, then the first existing candidate is used.
pub fn resolve_proj_dir(
    configured: Option<&Path>,
    env_value: impl Fn(&str) -> Option<String>,
    candidates: &[&str],
) -> Option<GeoEnv> {
    if let Some(dir) = configured.filter(|d| d.is_dir()) {
        return Some(GeoEnv {
            proj_data: dir.to_path_buf(),
            source: ProjSource::Config,
        });
    }
    if let Some(existing) = PROJ_ENV_VARS.iter().find_map(|name| env_value(name)) {
        return Some(GeoEnv {
            proj_data: PathBuf::from(existing),
            source: ProjSource::Environment,
        });
    }
    candidates
        .iter()
        .map(Path::new)
        .find(|p| p.join("proj.db").is_file())
        .map(|p| GeoEnv {
            proj_data: p.to_path_buf(),
            source: ProjSource::System,
        })
}

/// Export the PROJ directory for this process.
///
/// Call from `main` while the process is still single-threaded.
pub fn configure(configured: Option<&Path>) -> Option<GeoEnv> {
    if let Some(dir) = configured.filter(|d| !d.is_dir()) {
        tracing::warn!(path = %dir.display(), "Configured proj_data is not a directory");
    }
    let env = resolve_proj_dir(configured, |name| std::env::var(name).ok(), &SYSTEM_PROJ_DIRS);
    match &env {
        Some(geo) => {
            if geo.source != ProjSource::Environment {
                for name in PROJ_ENV_VARS {
                    std::env::set_var(name, &geo.proj_data);
                }
            }
            tracing::info!(proj_data = %geo.proj_data.display(), source = ?geo.source, "PROJ environment configured");
        }
        None => tracing::warn!("No PROJ data directory found, reprojection may fail"),
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_configured_dir_wins() {
        let dir = tempfile::tempdir().unwrap();
        let env = resolve_proj_dir(Some(dir.path()), |_| Some("/elsewhere".into()), &[]).unwrap();
        assert_eq!(env.source, ProjSource::Config);
        assert_eq!(env.proj_data, dir.path());
    }

    #[test]
    fn test_environment_kept() {
        let env = resolve_proj_dir(
            Some(Path::new("/does/not/exist")),
            |name| (name == "PROJ_LIB").then(|| "/opt/proj".to_string()),
            &[],
        )
        .unwrap();
        assert_eq!(env.source, ProjSource::Environment);
        assert_eq!(env.proj_data, PathBuf::from("/opt/proj"));
    }

    #[test]
    fn test_system_candidate_needs_proj_db() {
        let empty = tempfile::tempdir().unwrap();
        let with_db = tempfile::tempdir().unwrap();
        std::fs::write(with_db.path().join("proj.db"), b"").unwrap();

        let candidates = [
            empty.path().to_str().unwrap(),
            with_db.path().to_str().unwrap(),
        ];
        let env = resolve_proj_dir(None, no_env, &candidates).unwrap();
        assert_eq!(env.source, ProjSource::System);
        assert_eq!(env.proj_data, with_db.path());
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(resolve_proj_dir(None, no_env, &["/does/not/exist"]), None);
    }
}
