use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::{SimpathError, validate_tolerance};

/// Tunables for a seed-selection run.
///
/// Loaded from the `[selection]` table of a TOML file, or built in code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Pruning tolerance: paths whose probability drops below this are cut.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Cap on nodes pushed by a single path enumeration. `None` = unbounded.
    #[serde(default)]
    pub max_steps: Option<u64>,
    /// Candidates revalidated together when the lazy selector recomputes.
    /// One batch shares a single walk per seed.
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
            max_steps: None,
            lookahead: default_lookahead(),
        }
    }
}

impl SelectionConfig {
    /// Config with the given tolerance, no step cap and the default
    /// lookahead.
    #[must_use]
    pub const fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            max_steps: None,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }

    /// Same config with a different lookahead batch size.
    #[must_use]
    pub const fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead;
        self
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// [`SimpathError::InvalidTolerance`] for a tolerance outside `(0, 1)`,
    /// [`SimpathError::InvalidArgument`] for a zero step cap or lookahead.
    pub fn validate(&self) -> Result<(), SimpathError> {
        validate_tolerance(self.tolerance)?;
        if self.max_steps == Some(0) {
            return Err(SimpathError::InvalidArgument(
                "max_steps must be > 0 when set".to_string(),
            ));
        }
        if self.lookahead == 0 {
            return Err(SimpathError::InvalidArgument(
                "lookahead must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    selection: SelectionConfig,
}

const DEFAULT_LOOKAHEAD: usize = 10;

fn default_tolerance() -> f64 {
    1e-3
}

const fn default_lookahead() -> usize {
    DEFAULT_LOOKAHEAD
}

/// Load a [`SelectionConfig`] from a TOML file.
///
/// A missing file yields the defaults. The loaded config is validated.
///
/// ```toml
/// [selection]
/// tolerance = 0.001
/// max_steps = 5000000
/// lookahead = 10
/// ```
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or holds
/// out-of-range values.
pub fn load_config(path: &Path) -> Result<SelectionConfig> {
    if !path.exists() {
        return Ok(SelectionConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let file = toml::from_str::<ConfigFile>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    file.selection
        .validate()
        .with_context(|| format!("Invalid selection config in {}", path.display()))?;

    Ok(file.selection)
}
