use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::foundation::error::{CanvasError, CanvasResult};

/// Name of the scratch subfolder under the output root.
pub const DEFAULT_SUBFOLDER: &str = "web_canvas_pro";
/// How long a run waits for the browser before degrading.
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 300;
/// Side of the square all-zero mask used for absent layer masks.
pub const DEFAULT_PLACEHOLDER_SIZE: usize = 64;

/// Options shared by the node, the artifact publisher and the HTTP surface.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasProOpts {
    /// Host output directory; artifacts live in `output_root/subfolder`.
    pub output_root: PathBuf,
    /// Scratch subfolder name, also used in `/view` URLs.
    pub subfolder: String,
    /// Blocking wait bound for the browser's completion.
    pub wait_timeout_secs: u64,
    /// Placeholder mask side length.
    pub placeholder_size: usize,
    /// Socket address for the HTTP surface.
    pub bind: String,
}

impl Default for CanvasProOpts {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            subfolder: DEFAULT_SUBFOLDER.to_string(),
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            placeholder_size: DEFAULT_PLACEHOLDER_SIZE,
            bind: "127.0.0.1:8188".to_string(),
        }
    }
}

impl CanvasProOpts {
    /// Load options from a JSON file. Missing fields keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> CanvasResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            CanvasError::configuration(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let opts: Self = serde_json::from_reader(BufReader::new(f))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject option values the rest of the crate cannot work with.
    pub fn validate(&self) -> CanvasResult<()> {
        if !is_plain_component(&self.subfolder) {
            return Err(CanvasError::configuration(format!(
                "subfolder must be a single path component, got '{}'",
                self.subfolder
            )));
        }
        if self.placeholder_size == 0 {
            return Err(CanvasError::configuration("placeholder_size must be > 0"));
        }
        Ok(())
    }

    /// Directory holding the current session's artifacts.
    pub fn scratch_dir(&self) -> PathBuf {
        self.output_root.join(&self.subfolder)
    }

    /// [`Self::wait_timeout_secs`] as a [`Duration`].
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }
}

/// A single, non-special path component: no separators, not `.` or `..`.
pub(crate) fn is_plain_component(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
