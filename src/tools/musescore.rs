//! MuseScore CLI wrapper
//!
//! MuseScore is consumed as a black-box converter: `mscore -o out.ext in`
//! converts between notation, MIDI and image formats based on the file
//! extensions. The binary location is resolved once, from the configured
//! override when present, otherwise from the conventional install paths for
//! the host OS and finally from PATH.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use once_cell::sync::Lazy;

use crate::config::EngineConfig;
use crate::error::{ToolError, ToolResult};

use super::{run_with_timeout, NotationRenderer};

/// Conversions below this size are treated as failed: MuseScore sometimes
/// exits zero having written a stub file.
const MIN_OUTPUT_BYTES: u64 = 100;

#[cfg(target_os = "windows")]
const CANDIDATE_PATHS: &[&str] = &[
    r"C:\Program Files\MuseScore 4\bin\MuseScore4.exe",
    r"C:\Program Files (x86)\MuseScore 4\bin\MuseScore4.exe",
    r"C:\Program Files\MuseScore Studio 4\bin\MuseScore4.exe",
];

#[cfg(target_os = "macos")]
const CANDIDATE_PATHS: &[&str] = &[
    "/Applications/MuseScore 4.app/Contents/MacOS/mscore",
    "/Applications/MuseScore Studio 4.app/Contents/MacOS/mscore",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const CANDIDATE_PATHS: &[&str] = &["/usr/bin/mscore", "/usr/local/bin/mscore"];

#[cfg(target_os = "windows")]
const PATH_COMMAND: &str = "MuseScore4.exe";

#[cfg(not(target_os = "windows"))]
const PATH_COMMAND: &str = "mscore";

/// MuseScore location, resolved once per process. The install does not
/// move while we run; re-walking the candidate paths per request would
/// just add noise.
static LOCATED: Lazy<Option<PathBuf>> = Lazy::new(locate_musescore);

/// Locate the MuseScore binary without a configured override.
pub fn locate_musescore() -> Option<PathBuf> {
    CANDIDATE_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
        .or_else(|| which::which(PATH_COMMAND).ok())
}

/// Renderer backed by the MuseScore command-line converter.
#[derive(Debug, Clone)]
pub struct MuseScoreRenderer {
    binary: PathBuf,
    timeout: Duration,
}

impl MuseScoreRenderer {
    /// Resolve the binary from config or conventional locations.
    pub fn from_config(config: &EngineConfig) -> ToolResult<Self> {
        let binary = match &config.musescore_path {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => {
                log::warn!(
                    "configured MuseScore path {} does not exist, searching defaults",
                    path.display()
                );
                LOCATED.clone().ok_or(ToolError::NotFound("MuseScore"))?
            }
            None => LOCATED.clone().ok_or(ToolError::NotFound("MuseScore"))?,
        };
        log::info!("using MuseScore at {}", binary.display());
        Ok(MuseScoreRenderer {
            binary,
            timeout: Duration::from_secs(config.tool_timeout_secs),
        })
    }

    pub fn with_binary(binary: PathBuf) -> Self {
        MuseScoreRenderer {
            binary,
            timeout: Duration::from_secs(120),
        }
    }

    /// Run one `-o` conversion and verify the output file landed.
    ///
    /// MuseScore occasionally writes `name-1.ext` instead of the requested
    /// name (multi-page output); accept that sibling as the result.
    pub fn convert(&self, input: &Path, output: &Path) -> ToolResult<()> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-o").arg(output).arg(input);
        let run = run_with_timeout(&mut cmd, self.timeout, "MuseScore")?;

        if !run.status.success() {
            let detail = String::from_utf8_lossy(&run.stderr).into_owned();
            return Err(ToolError::ExecFailed {
                tool: "MuseScore",
                detail,
            });
        }

        if file_is_usable(output) {
            return Ok(());
        }

        let sibling = numbered_sibling(output);
        if file_is_usable(&sibling) {
            fs::rename(&sibling, output)?;
            return Ok(());
        }

        Err(ToolError::NoOutput { tool: "MuseScore" })
    }

    /// Write `input` bytes to a temp file with the given extension, convert
    /// to the target extension, and read the result back.
    fn convert_bytes(&self, input: &[u8], from_ext: &str, to_ext: &str) -> ToolResult<Vec<u8>> {
        let dir = tempfile::tempdir()?;
        let in_path = dir.path().join(format!("score.{}", from_ext));
        let out_path = dir.path().join(format!("score.{}", to_ext));
        fs::write(&in_path, input)?;
        self.convert(&in_path, &out_path)?;
        Ok(fs::read(&out_path)?)
    }
}

fn file_is_usable(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.len() > MIN_OUTPUT_BYTES)
        .unwrap_or(false)
}

/// `score.png` -> `score-1.png`
fn numbered_sibling(path: &Path) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    let name = if ext.is_empty() {
        format!("{}-1", stem)
    } else {
        format!("{}-1.{}", stem, ext)
    };
    path.with_file_name(name)
}

impl NotationRenderer for MuseScoreRenderer {
    fn render_image(&self, document: &[u8]) -> ToolResult<Vec<u8>> {
        self.convert_bytes(document, "musicxml", "png")
    }

    fn render_performance(&self, document: &[u8]) -> ToolResult<Vec<u8>> {
        self.convert_bytes(document, "musicxml", "mid")
    }

    fn render_performance_image(&self, performance: &[u8]) -> ToolResult<Vec<u8>> {
        self.convert_bytes(performance, "mid", "png")
    }
}
