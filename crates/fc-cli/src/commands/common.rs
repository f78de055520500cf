//! Shared helpers for CLI commands

use anyhow::{bail, Context, Result};
use fc_core::{resolve_database_url, CaseFile, CoreError, ProjectConfig};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run before the process ends.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing to show the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded case file and where it came from
pub(crate) struct LoadedCase {
    pub path: PathBuf,
    pub case: CaseFile,
}

/// Project settings plus the case files selected on the command line
pub(crate) struct CommandContext {
    pub project: Option<ProjectConfig>,
    pub cases: Vec<LoadedCase>,
}

impl CommandContext {
    /// Load the optional project file and every selected case file
    pub fn load(global: &GlobalArgs, selectors: &[String]) -> Result<Self> {
        let root = Path::new(&global.project_dir);
        let project = match ProjectConfig::load_from_dir(root) {
            Ok(project) => Some(project),
            Err(CoreError::ConfigNotFound { .. }) => None,
            Err(e) => return Err(e).context("Failed to load fetchcheck.yml"),
        };

        let paths = if selectors.is_empty() {
            let Some(project) = &project else {
                bail!(
                    "No case files given and no fetchcheck.yml found in {}",
                    root.display()
                );
            };
            let patterns: Vec<String> = project
                .case_patterns(root)
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            expand_patterns(&patterns)?
        } else {
            resolve_selectors(selectors)?
        };

        let mut cases = Vec::with_capacity(paths.len());
        for path in paths {
            let case = CaseFile::load(&path)
                .with_context(|| format!("Failed to load case file {}", path.display()))?;
            log::debug!("Loaded case {} from {}", case.name, path.display());
            cases.push(LoadedCase { path, case });
        }
        Ok(Self { project, cases })
    }

    /// Connection string: `--database-url`/`DATABASE_URL`, then the
    /// project's, then the built-in default
    pub fn database_url(&self, global: &GlobalArgs) -> String {
        match &global.database_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => resolve_database_url(self.project.as_ref().and_then(|p| p.database_url.as_deref())),
        }
    }
}

/// Turn paths, directories and glob patterns into a sorted list of files
pub(crate) fn resolve_selectors(selectors: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for selector in selectors {
        let path = Path::new(selector);
        if path.is_dir() {
            let patterns = [
                path.join("*.yml").display().to_string(),
                path.join("*.yaml").display().to_string(),
            ];
            files.extend(expand_patterns(&patterns)?);
        } else if selector.contains(['*', '?', '[']) {
            let matched = expand_patterns(std::slice::from_ref(selector))?;
            if matched.is_empty() {
                bail!("No case files match {}", selector);
            }
            files.extend(matched);
        } else if path.is_file() {
            files.push(path.to_path_buf());
        } else {
            bail!("Case file not found: {}", selector);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn expand_patterns(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let entries =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        for entry in entries {
            let path = entry.context("Failed to read glob entry")?;
            if path.is_file() {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASE: &str = r#"
name: widgets
resources:
  widgets:
    table:
      name: widgets
      columns:
        - name: id
          type: big_int
    rows:
      - id: 1
"#;

    fn write_case(dir: &Path, file: &str) {
        std::fs::write(dir.join(file), CASE).unwrap();
    }

    #[test]
    fn test_resolve_directory_and_glob() {
        let temp = tempfile::TempDir::new().unwrap();
        write_case(temp.path(), "b.yml");
        write_case(temp.path(), "a.yaml");
        std::fs::write(temp.path().join("notes.txt"), "ignored").unwrap();

        let dir = temp.path().display().to_string();
        let files = resolve_selectors(&[dir.clone()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.yaml"));

        let glob = format!("{}/*.yml", dir);
        let files = resolve_selectors(&[glob, temp.path().join("b.yml").display().to_string()])
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(resolve_selectors(&["/nonexistent/case.yml".to_string()]).is_err());
    }

    #[test]
    fn test_load_from_project_patterns() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("fetchcheck.yml"), "name: demo\n").unwrap();
        std::fs::create_dir(temp.path().join("cases")).unwrap();
        write_case(&temp.path().join("cases"), "widgets.yml");

        let global = GlobalArgs {
            verbose: false,
            project_dir: temp.path().display().to_string(),
            database_url: Some("duckdb://:memory:".to_string()),
        };
        let ctx = CommandContext::load(&global, &[]).unwrap();
        assert_eq!(ctx.project.as_ref().map(|p| p.name.as_str()), Some("demo"));
        assert_eq!(ctx.cases.len(), 1);
        assert_eq!(ctx.cases[0].case.name, "widgets");
        assert_eq!(ctx.database_url(&global), "duckdb://:memory:");
    }

    #[test]
    fn test_no_project_and_no_cases() {
        let temp = tempfile::TempDir::new().unwrap();
        let global = GlobalArgs {
            verbose: false,
            project_dir: temp.path().display().to_string(),
            database_url: None,
        };
        assert!(CommandContext::load(&global, &[]).is_err());
    }
}
