//! shellglob: shell-style glob resolution against a real filesystem tree.
//!
//! Provides:
//! - **glob / glob_with**: resolve a glob pattern (wildcards, character
//!   classes, brace alternation, `**` globstar) to the sorted list of
//!   matching paths
//! - **glob_in**: the same resolution against any [`GlobFs`] implementation
//!   with an explicit working directory
//! - **Matcher / glob_match / expand_braces**: single-component wildcard
//!   matching and brace expansion
//!
//! Resolution is synchronous and single-threaded: one call walks the tree
//! depth-first and blocks until done. Output paths always use `/` as the
//! separator; relative patterns yield relative paths (against the working
//! directory captured at call time), absolute patterns yield absolute paths.
//! A pattern ending in `/` matches directories only, and those matches keep
//! the trailing slash.
//!
//! Not supported by design: symbolic links are never traversed by globstar
//! expansion, matching is exactly as case-sensitive as the underlying
//! filesystem, and leading-`!` negation is ignored (use
//! [`GlobOptions::ignore`] instead).

mod fs;
mod glob;
mod resolve;
mod translate;

pub use fs::{FsError, GlobFs, OsFs};
pub use glob::{contains_glob, expand_braces, glob_match, Matcher};
pub use translate::{translate, PatternError, Segment, Translation};

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors from glob resolution.
///
/// "No match" is never an error: an unmatched pattern yields an empty
/// result. Only an unusable pattern, a missing working directory, or a real
/// I/O failure (permissions, hardware) surfaces here.
#[derive(Debug, Error)]
pub enum GlobError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("cannot determine the working directory")]
    WorkingDir(#[source] std::io::Error),
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: FsError,
    },
}

/// Options for glob resolution.
#[derive(Debug, Clone)]
pub struct GlobOptions {
    /// Let wildcards match entries starting with `.` (default `false`).
    pub dot: bool,
    /// Treat `**` as recursive descent (default `true`). When disabled,
    /// `**` degrades to two ordinary `*` wildcards.
    pub globstar: bool,
    /// Patterns whose matches are removed from the final result. Each
    /// pattern is an independent exclusion.
    pub ignore: Vec<String>,
}

impl Default for GlobOptions {
    fn default() -> Self {
        Self {
            dot: false,
            globstar: true,
            ignore: Vec::new(),
        }
    }
}

/// Resolve a glob pattern against the host filesystem with default options.
///
/// # Errors
/// Returns a [`GlobError`] for an empty pattern, an unavailable working
/// directory, or an I/O failure during the walk.
///
/// # Examples
/// ```no_run
/// let sources = shellglob::glob("src/**/*.rs")?;
/// # Ok::<(), shellglob::GlobError>(())
/// ```
pub fn glob(pattern: &str) -> Result<Vec<String>, GlobError> {
    glob_with(pattern, &GlobOptions::default())
}

/// Resolve a glob pattern against the host filesystem.
///
/// The working directory is captured once, up front; a concurrent `chdir`
/// cannot change the meaning of an in-flight call.
pub fn glob_with(pattern: &str, options: &GlobOptions) -> Result<Vec<String>, GlobError> {
    let cwd = std::env::current_dir().map_err(GlobError::WorkingDir)?;
    glob_in(&OsFs, &cwd, pattern, options)
}

/// Resolve a glob pattern against any [`GlobFs`] with an explicit working
/// directory.
///
/// This is the embeddable entry point: [`glob_with`] is this function
/// applied to [`OsFs`] and the process working directory.
pub fn glob_in<F: GlobFs>(
    fs: &F,
    cwd: &Path,
    pattern: &str,
    options: &GlobOptions,
) -> Result<Vec<String>, GlobError> {
    let translation = translate(pattern, options)?;
    if translation.is_negated {
        // Negation is a documented non-feature; the pattern resolves as if
        // the leading `!` were absent.
        debug!(pattern, "leading '!' observed; negation is not applied");
    }

    let resolver = resolve::Resolver::new(fs, cwd, options);
    let mut results = Vec::new();
    for sequence in &translation.sequences {
        results.extend(resolver.resolve_sequence(sequence)?);
    }
    debug!(pattern, matches = results.len(), "resolved glob pattern");

    if !options.ignore.is_empty() {
        // Ignore patterns always see dotfiles: an explicit `.cache/**`
        // exclusion must work whatever the call's `dot` option says.
        let ignore_options = GlobOptions {
            dot: true,
            ..options.clone()
        };
        for ignore_pattern in &options.ignore {
            let excluded = translate(ignore_pattern, &ignore_options)?;
            results.retain(|path| {
                let components = path_components(path);
                !excluded
                    .sequences
                    .iter()
                    .any(|sequence| translate::sequence_matches(sequence, &components, true))
            });
        }
    }

    results.sort();
    Ok(results)
}

/// Split a result path into components for ignore matching. A directory
/// match's trailing slash is not a component.
fn path_components(path: &str) -> Vec<&str> {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    trimmed.split('/').collect()
}
