use serde::Deserialize;
use std::path::{Path, PathBuf};

use folio_book::{default_jobs, BuildOptions, DiscoverOptions, PlaceholderPolicy};

pub const CONFIG_FILENAME: &str = "folio.toml";

#[derive(Debug, Default, Deserialize)]
struct FolioToml {
    validate: Option<ValidateSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ValidateSection {
    placeholder_policy: Option<PlaceholderPolicy>,
    placeholders: Option<Vec<String>>,
    jobs: Option<usize>,
    extensions: Option<Vec<String>>,
    skip_dirs: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

/// Effective settings for one run: defaults, then `folio.toml`, then flags.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub build: BuildOptions,
    pub discover: DiscoverOptions,
    /// The file the settings came from, if any.
    pub source: Option<PathBuf>,
}

/// Load `folio.toml` from `explicit`, or from the book root when present.
///
/// An explicit path must exist; the implicit one is optional.
pub fn resolve_config(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig, String> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (root.join(CONFIG_FILENAME), false),
    };

    if !path.exists() {
        if required {
            return Err(format!("config file not found: {}", path.display()));
        }
        return Ok(ResolvedConfig {
            build: BuildOptions::default(),
            discover: DiscoverOptions::default(),
            source: None,
        });
    }

    let raw = std::fs::read_to_string(&path)
        .map_err(|err| format!("read {}: {}", path.display(), err))?;
    let parsed: FolioToml =
        toml::from_str(&raw).map_err(|err| format!("parse {}: {}", path.display(), err))?;
    let section = parsed.validate.unwrap_or_default();

    let mut build = BuildOptions::default();
    let mut discover = DiscoverOptions::default();
    if let Some(policy) = section.placeholder_policy {
        build.placeholder_policy = policy;
    }
    if let Some(placeholders) = section.placeholders {
        build.placeholders = placeholders;
    }
    if let Some(jobs) = section.jobs {
        build.jobs = effective_jobs(jobs);
    }
    if let Some(extensions) = section.extensions.filter(|e| !e.is_empty()) {
        discover.extensions = extensions;
    }
    if let Some(skip_dirs) = section.skip_dirs {
        discover.skip_dirs = skip_dirs;
    }
    if let Some(exclude) = section.exclude {
        discover.exclude = exclude;
    }

    tracing::debug!(config = %path.display(), "loaded configuration");
    Ok(ResolvedConfig {
        build,
        discover,
        source: Some(path),
    })
}

/// `0` means "one worker per available core".
pub fn effective_jobs(jobs: usize) -> usize {
    if jobs == 0 {
        default_jobs()
    } else {
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_missing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let resolved = resolve_config(temp.path(), None).expect("resolve");
        assert_eq!(resolved.source, None);
        assert_eq!(resolved.build.placeholder_policy, PlaceholderPolicy::Warn);
        assert_eq!(resolved.build.placeholders, vec!["TBD".to_string()]);
        assert_eq!(resolved.discover, DiscoverOptions::default());
    }

    #[test]
    fn reads_validate_section() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            temp.path().join(CONFIG_FILENAME),
            r#"[validate]
placeholder_policy = "error"
placeholders = ["TBD", "pending"]
jobs = 3
extensions = ["md", "markdown"]
exclude = ["CHANGELOG.md"]
"#,
        )
        .expect("write folio.toml");

        let resolved = resolve_config(temp.path(), None).expect("resolve");
        assert_eq!(resolved.source, Some(temp.path().join(CONFIG_FILENAME)));
        assert_eq!(resolved.build.placeholder_policy, PlaceholderPolicy::Error);
        assert_eq!(resolved.build.placeholders.len(), 2);
        assert_eq!(resolved.build.jobs, 3);
        assert_eq!(resolved.discover.extensions, vec!["md", "markdown"]);
        assert_eq!(resolved.discover.exclude, vec!["CHANGELOG.md"]);
        assert_eq!(
            resolved.discover.skip_dirs,
            DiscoverOptions::default().skip_dirs
        );
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(temp.path().join(CONFIG_FILENAME), "").expect("write folio.toml");
        let resolved = resolve_config(temp.path(), None).expect("resolve");
        assert!(resolved.source.is_some());
        assert_eq!(resolved.build.placeholder_policy, PlaceholderPolicy::Warn);
    }

    #[test]
    fn explicit_path_must_exist() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("nope.toml");
        let err = resolve_config(temp.path(), Some(&missing)).unwrap_err();
        assert!(err.contains("config file not found"), "{err}");
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            temp.path().join(CONFIG_FILENAME),
            "[validate]\nplaceholder_policy = \"shout\"\n",
        )
        .expect("write folio.toml");
        let err = resolve_config(temp.path(), None).unwrap_err();
        assert!(err.starts_with("parse "), "{err}");
    }

    #[test]
    fn zero_jobs_means_auto() {
        assert_eq!(effective_jobs(0), default_jobs());
        assert_eq!(effective_jobs(2), 2);
    }
}
