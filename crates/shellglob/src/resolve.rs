//! Path resolution: walking segment-sequences against the filesystem.
//!
//! One sequence resolves in two phases. The maximal run of leading literal
//! segments is joined into a plain string path and checked directly; if any
//! wildcard remains, the walk descends one directory level per segment,
//! listing and filtering as it goes. `**` expands to the current prefix plus
//! every reachable descendant, at every depth.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::fs::{FsError, GlobFs};
use crate::translate::Segment;
use crate::{GlobError, GlobOptions};

/// Resolves segment-sequences against a filesystem rooted at an explicit
/// working directory. The working directory is captured once by the caller
/// and threaded through every check; resolution never consults process-wide
/// state.
pub(crate) struct Resolver<'a, F: GlobFs> {
    fs: &'a F,
    cwd: &'a Path,
    options: &'a GlobOptions,
}

impl<'a, F: GlobFs> Resolver<'a, F> {
    pub(crate) fn new(fs: &'a F, cwd: &'a Path, options: &'a GlobOptions) -> Self {
        Self { fs, cwd, options }
    }

    /// Resolve one segment-sequence to the concrete paths matching it.
    ///
    /// An unmatched sequence contributes an empty list, never an error.
    pub(crate) fn resolve_sequence(&self, segments: &[Segment]) -> Result<Vec<String>, GlobError> {
        let wildcard_at = segments
            .iter()
            .position(|segment| !matches!(segment, Segment::Literal(_)))
            .unwrap_or(segments.len());
        let (literals, remainder) = segments.split_at(wildcard_at);

        let texts: Vec<&str> = literals
            .iter()
            .filter_map(|segment| match segment {
                Segment::Literal(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let mut prefix = texts.join("/");

        if remainder.is_empty() {
            // Pure literal path: one exists-check, no listing.
            if prefix.is_empty() {
                // An empty brace alternative; never resolves to the cwd.
                return Ok(Vec::new());
            }
            let absolute = self.resolve(&prefix);
            if !self.fs.exists(&absolute) {
                trace!(path = prefix, "literal path does not exist");
                return Ok(Vec::new());
            }
            if prefix.ends_with('/') && !self.fs.is_dir(&absolute) {
                return Ok(Vec::new());
            }
            return Ok(vec![prefix]);
        }

        // An absolute pattern whose first wildcard follows the root
        // immediately: the literal prefix is the bare root, not the cwd.
        if prefix.is_empty() && !literals.is_empty() {
            prefix = "/".to_string();
        }

        let mut results = Vec::new();
        self.walk(&prefix, remainder, &mut results)?;
        Ok(results)
    }

    /// Descend one directory level, consuming the head segment of
    /// `remainder` against the entries of `prefix`.
    fn walk(
        &self,
        prefix: &str,
        remainder: &[Segment],
        results: &mut Vec<String>,
    ) -> Result<(), GlobError> {
        let absolute = self.resolve(prefix);
        if !self.fs.exists(&absolute) || !self.fs.is_dir(&absolute) {
            trace!(prefix, "pruning dead branch");
            return Ok(());
        }

        let Some((head, rest)) = remainder.split_first() else {
            return Ok(());
        };

        // A trailing slash in the pattern survives translation as a single
        // empty literal; it restricts this level to directories.
        let limit_to_dirs = matches!(rest, [tail] if tail.is_empty_literal());
        let finished = limit_to_dirs || rest.is_empty();

        let candidates = match head {
            Segment::Globstar => {
                let mut candidates = Vec::new();
                self.expand_globstar(prefix, limit_to_dirs, &mut candidates)?;
                if !finished && prefix.is_empty() {
                    // `**` may also consume zero components at the walk
                    // root, so `**/x` can still match a top-level `x`.
                    self.walk(prefix, rest, results)?;
                }
                candidates
            }
            segment => {
                let mut candidates = Vec::new();
                for name in self.list(&absolute)? {
                    if !segment.matches_name(&name, self.options.dot) {
                        continue;
                    }
                    let candidate = join(prefix, &name);
                    if limit_to_dirs && !self.fs.is_dir(&self.resolve(&candidate)) {
                        continue;
                    }
                    candidates.push(candidate);
                }
                candidates
            }
        };

        if finished {
            if limit_to_dirs {
                // Surviving directory matches carry a trailing slash
                results.extend(candidates.into_iter().map(|c| c + "/"));
            } else {
                results.extend(candidates);
            }
        } else {
            for candidate in candidates {
                self.walk(&candidate, rest, results)?;
            }
        }

        Ok(())
    }

    /// Collect `rel` itself (when non-empty) and every path reachable
    /// beneath it, at every depth.
    ///
    /// Symlinked directories are leaves: they are collected but never
    /// descended, so cycles cannot occur. Dot-entries are skipped unless the
    /// `dot` option is set.
    fn expand_globstar(
        &self,
        rel: &str,
        limit_to_dirs: bool,
        results: &mut Vec<String>,
    ) -> Result<(), GlobError> {
        let absolute = self.resolve(rel);
        let is_dir = self.fs.is_dir(&absolute);

        if !rel.is_empty() && (!limit_to_dirs || is_dir) {
            results.push(rel.to_string());
        }

        if is_dir && !self.fs.is_symlink(&absolute) {
            for name in self.list(&absolute)? {
                if !self.options.dot && name.starts_with('.') {
                    continue;
                }
                self.expand_globstar(&join(rel, &name), limit_to_dirs, results)?;
            }
        }

        Ok(())
    }

    /// List a directory, distinguishing lost races from real I/O failures.
    fn list(&self, absolute: &Path) -> Result<Vec<String>, GlobError> {
        match self.fs.list_dir(absolute) {
            Ok(names) => Ok(names),
            // The directory vanished between the is_dir check and the
            // listing: a lost race with a concurrent mutation, not an error.
            Err(FsError::NotFound(_)) | Err(FsError::NotADirectory(_)) => Ok(Vec::new()),
            Err(source) => Err(GlobError::Io {
                path: absolute.to_path_buf(),
                source,
            }),
        }
    }

    /// Resolve a slash-separated path against the working directory.
    fn resolve(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.cwd.to_path_buf()
        } else if rel.starts_with('/') {
            PathBuf::from(rel)
        } else {
            self.cwd.join(rel)
        }
    }
}

/// Join a prefix and an entry name with `/`, preserving relative prefixes
/// as-is (an empty prefix stays implicit).
pub(crate) fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if prefix.ends_with('/') {
        format!("{prefix}{name}")
    } else {
        format!("{prefix}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFs;
    use crate::translate::translate;

    fn sample_fs() -> MemoryFs {
        let mut mem = MemoryFs::new();
        mem.add_file("/src/main.rs");
        mem.add_file("/src/lib.rs");
        mem.add_file("/src/lib/util.rs");
        mem.add_file("/src/.hidden.rs");
        mem.add_file("/README.md");
        mem.add_dir("/empty");
        mem
    }

    fn resolve_all(mem: &MemoryFs, pattern: &str, options: &GlobOptions) -> Vec<String> {
        let translation = translate(pattern, options).unwrap();
        let cwd = PathBuf::from("/");
        let resolver = Resolver::new(mem, &cwd, options);
        let mut results = Vec::new();
        for sequence in &translation.sequences {
            results.extend(resolver.resolve_sequence(sequence).unwrap());
        }
        results.sort();
        results
    }

    #[test]
    fn literal_fast_path() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(resolve_all(&mem, "src/main.rs", &opts), vec!["src/main.rs"]);
        assert_eq!(resolve_all(&mem, "src/missing.rs", &opts), Vec::<String>::new());
    }

    #[test]
    fn literal_trailing_slash_requires_directory() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(resolve_all(&mem, "src/", &opts), vec!["src/"]);
        assert_eq!(resolve_all(&mem, "README.md/", &opts), Vec::<String>::new());
    }

    #[test]
    fn single_level_wildcard() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(
            resolve_all(&mem, "src/*.rs", &opts),
            vec!["src/lib.rs", "src/main.rs"]
        );
    }

    #[test]
    fn wildcard_skips_dotfiles_by_default() {
        let mem = sample_fs();

        let defaults = GlobOptions::default();
        assert_eq!(
            resolve_all(&mem, "src/*", &defaults),
            vec!["src/lib", "src/lib.rs", "src/main.rs"]
        );

        let with_dot = GlobOptions {
            dot: true,
            ..Default::default()
        };
        assert_eq!(
            resolve_all(&mem, "src/*", &with_dot),
            vec!["src/.hidden.rs", "src/lib", "src/lib.rs", "src/main.rs"]
        );
    }

    #[test]
    fn literal_segment_after_wildcard() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(
            resolve_all(&mem, "*/lib/util.rs", &opts),
            vec!["src/lib/util.rs"]
        );
    }

    #[test]
    fn dead_branches_prune_silently() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        // README.md is a file, so descending through it yields nothing
        assert_eq!(resolve_all(&mem, "README.md/*", &opts), Vec::<String>::new());
        assert_eq!(resolve_all(&mem, "missing/*", &opts), Vec::<String>::new());
    }

    #[test]
    fn globstar_includes_prefix_itself() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(
            resolve_all(&mem, "src/**", &opts),
            vec!["src", "src/lib", "src/lib.rs", "src/lib/util.rs", "src/main.rs"]
        );
    }

    #[test]
    fn globstar_zero_components_at_root() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        // `**/x` must also find a top-level x (globstar consumed nothing)
        assert_eq!(
            resolve_all(&mem, "**/README.md", &opts),
            vec!["README.md"]
        );
        assert_eq!(
            resolve_all(&mem, "**/util.rs", &opts),
            vec!["src/lib/util.rs"]
        );
    }

    #[test]
    fn globstar_directories_only() {
        let mem = sample_fs();
        let opts = GlobOptions::default();

        assert_eq!(
            resolve_all(&mem, "**/", &opts),
            vec!["empty/", "src/", "src/lib/"]
        );
    }

    #[test]
    fn globstar_skips_dot_entries() {
        let mut mem = sample_fs();
        mem.add_file("/.cache/entry");

        let defaults = GlobOptions::default();
        let results = resolve_all(&mem, "**", &defaults);
        assert!(!results.iter().any(|p| p.contains(".cache")));
        assert!(!results.iter().any(|p| p.contains(".hidden")));

        let with_dot = GlobOptions {
            dot: true,
            ..Default::default()
        };
        let results = resolve_all(&mem, "**", &with_dot);
        assert!(results.contains(&".cache/entry".to_string()));
        assert!(results.contains(&"src/.hidden.rs".to_string()));
    }

    #[test]
    fn globstar_does_not_descend_symlinks() {
        let mut mem = MemoryFs::new();
        mem.add_file("/real/data.txt");
        mem.add_dir_symlink("/link", "/real");
        let opts = GlobOptions::default();

        let results = resolve_all(&mem, "**", &opts);
        assert!(results.contains(&"link".to_string()));
        assert!(results.contains(&"real/data.txt".to_string()));
        assert!(!results.contains(&"link/data.txt".to_string()));

        // Non-globstar wildcards still see the link as a leaf match
        assert!(resolve_all(&mem, "li*", &opts).contains(&"link".to_string()));
    }

    #[test]
    fn absolute_patterns_stay_absolute() {
        let mem = sample_fs();
        let opts = GlobOptions::default();
        let cwd = PathBuf::from("/somewhere/else");

        let translation = translate("/src/*.rs", &opts).unwrap();
        let resolver = Resolver::new(&mem, &cwd, &opts);
        let mut results = resolver.resolve_sequence(&translation.sequences[0]).unwrap();
        results.sort();
        assert_eq!(results, vec!["/src/lib.rs", "/src/main.rs"]);
    }

    #[test]
    fn permission_errors_surface() {
        let mut mem = sample_fs();
        mem.deny("/src");
        let opts = GlobOptions::default();

        let translation = translate("src/*", &opts).unwrap();
        let cwd = PathBuf::from("/");
        let resolver = Resolver::new(&mem, &cwd, &opts);
        let err = resolver.resolve_sequence(&translation.sequences[0]).unwrap_err();
        assert!(matches!(err, GlobError::Io { .. }));
    }

    #[test]
    fn join_prefixes() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a", "b"), "a/b");
        assert_eq!(join("/", "a"), "/a");
        assert_eq!(join("a/b", "c"), "a/b/c");
    }
}
