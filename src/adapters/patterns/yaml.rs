//! YAML pattern loader.
//!
//! One document may carry any of the pattern-table sections
//! (`categories`, `urgency`, `journey`) and a `profiles:` list of routing
//! overrides. Anything left out keeps its built-in value.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::domain::profile::{CompiledPatterns, PatternError, PatternTables, ProfileCatalog};

#[derive(Debug, Error)]
pub enum PatternLoadError {
    #[error("Failed to read pattern file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

/// Compiled tables plus the profile catalog they were loaded with.
#[derive(Debug, Clone)]
pub struct LoadedPatterns {
    pub catalog: ProfileCatalog,
    pub patterns: CompiledPatterns,
}

impl LoadedPatterns {
    pub fn builtin() -> Result<Self, PatternError> {
        Ok(Self {
            catalog: ProfileCatalog::builtin(),
            patterns: CompiledPatterns::builtin()?,
        })
    }
}

/// Loads pattern tables from an optional YAML file.
pub struct YamlPatternLoader {
    path: Option<PathBuf>,
}

impl YamlPatternLoader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// A loader that always yields the built-in tables.
    pub fn builtin() -> Self {
        Self { path: None }
    }

    pub fn from_optional(path: Option<&Path>) -> Self {
        Self {
            path: path.map(Path::to_path_buf),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub async fn load(&self) -> Result<LoadedPatterns, PatternLoadError> {
        let Some(path) = &self.path else {
            return Ok(LoadedPatterns::builtin()?);
        };

        let yaml = fs::read_to_string(path).await.map_err(|source| PatternLoadError::Io {
            path: path.clone(),
            source,
        })?;
        let loaded = Self::parse(&yaml)?;
        info!(path = %path.display(), "Loaded pattern tables");
        Ok(loaded)
    }

    /// Parses and compiles one YAML document.
    pub fn parse(yaml: &str) -> Result<LoadedPatterns, PatternError> {
        let tables = PatternTables::from_yaml_str(yaml)?;
        let catalog = ProfileCatalog::from_yaml_str(yaml)?;
        Ok(LoadedPatterns {
            catalog,
            patterns: tables.compile()?,
        })
    }
}
