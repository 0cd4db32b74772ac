//! Library half of the `folio` command: configuration and the validation run.

use std::path::{Path, PathBuf};

use folio_book::{
    build_manifest_with_options, discover_chapters, BookManifest, ErrorKind, PlaceholderPolicy,
    ValidationError,
};

pub mod config;

pub use config::{effective_jobs, resolve_config, ResolvedConfig, CONFIG_FILENAME};

pub const EXIT_OK: i32 = 0;
pub const EXIT_PARSE_ERRORS: i32 = 1;
pub const EXIT_VALIDATION_ERRORS: i32 = 2;
pub const EXIT_OPERATIONAL: i32 = 3;

#[derive(Debug, Clone)]
pub struct ValidateInput {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
    pub placeholder_policy: Option<PlaceholderPolicy>,
    pub jobs: Option<usize>,
}

impl ValidateInput {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: None,
            placeholder_policy: None,
            jobs: None,
        }
    }
}

#[derive(Debug)]
pub struct ValidateOutput {
    pub root: PathBuf,
    pub files_scanned: usize,
    pub config_source: Option<PathBuf>,
    /// Paths inside are relative to `root`.
    pub result: Result<BookManifest, Vec<ValidationError>>,
}

impl ValidateOutput {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }

    /// `0` for a manifest, `1` when any file failed to parse, `2` otherwise.
    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(_) => EXIT_OK,
            Err(errors) => exit_code_for(errors),
        }
    }
}

pub fn exit_code_for(errors: &[ValidationError]) -> i32 {
    if errors.iter().any(|e| e.kind() == ErrorKind::ParseError) {
        EXIT_PARSE_ERRORS
    } else if errors.is_empty() {
        EXIT_OK
    } else {
        EXIT_VALIDATION_ERRORS
    }
}

/// Discover, load and validate every chapter under `input.root`.
///
/// `Err` is reserved for operational failures (bad config, unreadable root);
/// chapter problems come back inside [`ValidateOutput::result`].
pub fn run_validate(input: ValidateInput) -> Result<ValidateOutput, String> {
    let root = input.root.as_path();
    let mut resolved = resolve_config(root, input.config.as_deref())?;
    if let Some(policy) = input.placeholder_policy {
        resolved.build.placeholder_policy = policy;
    }
    if let Some(jobs) = input.jobs {
        resolved.build.jobs = effective_jobs(jobs);
    }

    let paths = discover_chapters(root, &resolved.discover).map_err(|err| err.to_string())?;
    tracing::info!(
        root = %root.display(),
        files = paths.len(),
        jobs = resolved.build.jobs,
        placeholder_policy = resolved.build.placeholder_policy.as_str(),
        "validating chapters"
    );

    let result = build_manifest_with_options(&paths, &resolved.build);
    Ok(ValidateOutput {
        root: input.root.clone(),
        files_scanned: paths.len(),
        config_source: resolved.source,
        result: relativize(result, root),
    })
}

fn relativize(
    result: Result<BookManifest, Vec<ValidationError>>,
    root: &Path,
) -> Result<BookManifest, Vec<ValidationError>> {
    match result {
        Ok(mut manifest) => {
            manifest.relativize(root);
            Ok(manifest)
        }
        Err(mut errors) => {
            for err in &mut errors {
                err.relativize(root);
            }
            Err(errors)
        }
    }
}
