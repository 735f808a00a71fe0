//! Audiveris OMR wrapper
//!
//! Audiveris is a Java application; its batch mode exports a MusicXML
//! document for an input page image. The install is located once by walking
//! the conventional install roots for `audiveris.jar`; a JRE bundled with
//! the install is preferred over whatever `java` is on PATH.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use walkdir::WalkDir;

use crate::config::EngineConfig;
use crate::error::{ToolError, ToolResult};

use super::prefilter::prefilter_image;
use super::{run_with_timeout, OmrEngine};

#[cfg(target_os = "windows")]
const CLASSPATH_SEPARATOR: &str = ";";

#[cfg(not(target_os = "windows"))]
const CLASSPATH_SEPARATOR: &str = ":";

#[cfg(target_os = "windows")]
fn install_roots() -> Vec<PathBuf> {
    let mut roots = vec![
        PathBuf::from(r"C:\Program Files\Audiveris"),
        PathBuf::from(r"C:\Audiveris"),
    ];
    if let Some(home) = std::env::var_os("USERPROFILE") {
        roots.push(PathBuf::from(home).join(r"AppData\Local\Audiveris"));
    }
    roots
}

#[cfg(not(target_os = "windows"))]
fn install_roots() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/Applications/Audiveris.app"),
        PathBuf::from("/usr/local/share/audiveris"),
        PathBuf::from("/opt/audiveris"),
    ]
}

/// Resolved Audiveris install: the jar, its install root, and the java
/// command to launch it with.
#[derive(Debug, Clone)]
pub struct AudiverisOmr {
    jar: PathBuf,
    root: PathBuf,
    java: PathBuf,
    timeout: Duration,
}

impl AudiverisOmr {
    /// Locate the install, honoring the configured root when present.
    pub fn from_config(config: &EngineConfig) -> ToolResult<Self> {
        let roots: Vec<PathBuf> = config
            .audiveris_root
            .iter()
            .cloned()
            .chain(install_roots())
            .collect();

        for root in &roots {
            if !root.exists() {
                continue;
            }
            if let Some(jar) = find_jar(root) {
                // installs nest the jar one or two levels under the root
                let install_root = jar
                    .parent()
                    .and_then(|p| p.parent())
                    .unwrap_or(root)
                    .to_path_buf();
                let java = bundled_java(&install_root).unwrap_or_else(|| PathBuf::from("java"));
                log::info!("using Audiveris at {}", jar.display());
                return Ok(AudiverisOmr {
                    jar,
                    root: install_root,
                    java,
                    timeout: Duration::from_secs(config.tool_timeout_secs),
                });
            }
        }
        Err(ToolError::NotFound("Audiveris"))
    }

    /// Classpath covering the jar plus the lib/app directories installs
    /// ship their dependencies in.
    fn classpath(&self) -> String {
        let entries = [
            self.jar.display().to_string(),
            self.root.join("lib").join("*").display().to_string(),
            self.root.join("app").join("*").display().to_string(),
            self.root.join("*").display().to_string(),
        ];
        entries.join(CLASSPATH_SEPARATOR)
    }

    /// Run a batch export and return the first notation document produced.
    fn export(&self, image_path: &Path, work_dir: &Path) -> ToolResult<PathBuf> {
        let mut cmd = Command::new(&self.java);
        cmd.arg("-cp")
            .arg(self.classpath())
            .arg("org.audiveris.omr.Main")
            .arg("-batch")
            .arg("-output")
            .arg(work_dir)
            .arg("-export")
            .arg(image_path);
        let output = run_with_timeout(&mut cmd, self.timeout, "Audiveris")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // headless runs complain about JavaFX while still exporting;
            // only treat other stderr noise as a real warning
            if !stderr.contains("JavaFX") {
                log::warn!("Audiveris exited non-zero: {}", stderr.trim());
            }
        }

        find_notation_document(work_dir).ok_or(ToolError::NoOutput { tool: "Audiveris" })
    }
}

/// Recursively find `audiveris.jar` under a root.
fn find_jar(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_name() == "audiveris.jar")
        .map(|entry| entry.into_path())
}

/// Prefer the JRE bundled with the install over the system java.
fn bundled_java(install_root: &Path) -> Option<PathBuf> {
    let exe = if cfg!(target_os = "windows") {
        "java.exe"
    } else {
        "java"
    };
    let candidates = [
        install_root.join("runtime").join("bin").join(exe),
        install_root
            .join("bin")
            .join("runtime")
            .join("bin")
            .join(exe),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

/// Depth-first search for an exported `.musicxml`/`.mxl` under the batch
/// output directory.
fn find_notation_document(dir: &Path) -> Option<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .find(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("musicxml") | Some("mxl")
            )
        })
}

impl OmrEngine for AudiverisOmr {
    fn recognize(&self, image: &[u8]) -> ToolResult<Vec<u8>> {
        let work_dir = tempfile::tempdir()?;
        let image_path = work_dir.path().join("input.png");
        fs::write(&image_path, prefilter_image(image))?;

        let document = self.export(&image_path, work_dir.path())?;
        let bytes = fs::read(&document)?;
        if bytes.is_empty() {
            return Err(ToolError::NoOutput { tool: "Audiveris" });
        }
        Ok(bytes)
    }
}
