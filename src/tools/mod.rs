//! External collaborator interfaces
//!
//! The engine's boundary is the in-memory score model; everything that
//! touches images or notation documents is an external tool consumed as a
//! black box behind one of these traits. Tool locations are resolved once
//! at construction (from `EngineConfig` overrides or conventional install
//! paths) and carried in the wrapper, never looked up ad hoc.
//!
//! Collaborator failures are hard failures of the whole request: without a
//! recognized document there is nothing to arrange. The one exception is
//! rendering, which has a documented two-step fallback because direct
//! document-to-image rendering fails routinely in the wild.

pub mod audiveris;
pub mod musescore;
pub mod prefilter;

pub use audiveris::AudiverisOmr;
pub use musescore::MuseScoreRenderer;
pub use prefilter::prefilter_image;

use std::io::Read;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{ToolError, ToolResult};
use crate::models::Score;

/// Optical music recognition: raw image bytes in, notation document bytes
/// out (MusicXML, to be parsed by the caller's notation library).
pub trait OmrEngine {
    fn recognize(&self, image: &[u8]) -> ToolResult<Vec<u8>>;
}

/// Notation renderer: a notation document in, a page image or a performance
/// (MIDI) file out.
pub trait NotationRenderer {
    /// Render a notation document to a page image (PNG bytes).
    fn render_image(&self, document: &[u8]) -> ToolResult<Vec<u8>>;

    /// Render a notation document to a performance file (MIDI bytes).
    fn render_performance(&self, document: &[u8]) -> ToolResult<Vec<u8>>;

    /// Render an already-produced performance file to a page image.
    fn render_performance_image(&self, performance: &[u8]) -> ToolResult<Vec<u8>>;
}

/// Two-step rendering fallback: try document -> image directly; when that
/// fails, render the document to a performance file and render *that* to an
/// image. Only when both paths fail is the failure surfaced.
pub fn render_image_with_fallback<R: NotationRenderer>(
    renderer: &R,
    document: &[u8],
) -> ToolResult<Vec<u8>> {
    match renderer.render_image(document) {
        Ok(image) => Ok(image),
        Err(direct_err) => {
            log::warn!(
                "direct document-to-image render failed ({}), trying performance route",
                direct_err
            );
            let performance = renderer.render_performance(document)?;
            renderer.render_performance_image(&performance)
        }
    }
}

/// Run an external tool with a wall-clock limit, capturing its output.
/// The child is killed when the deadline passes.
pub(crate) fn run_with_timeout(
    cmd: &mut Command,
    timeout: Duration,
    tool: &'static str,
) -> ToolResult<Output> {
    let mut child = cmd.stdout(Stdio::piped()).stderr(Stdio::piped()).spawn()?;

    // Drain both pipes off-thread while polling: a chatty tool fills the
    // OS pipe buffer long before it exits, and a full pipe blocks it until
    // the deadline turns a successful run into a timeout.
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let stdout_reader = thread::spawn(move || drain_pipe(stdout_pipe));
    let stderr_reader = thread::spawn(move || drain_pipe(stderr_pipe));

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            let stdout = stdout_reader.join().unwrap_or_default();
            let stderr = stderr_reader.join().unwrap_or_default();
            return Ok(Output {
                status,
                stdout,
                stderr,
            });
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            let _ = stdout_reader.join();
            let _ = stderr_reader.join();
            return Err(ToolError::ExecFailed {
                tool,
                detail: format!("timed out after {}s", timeout.as_secs()),
            });
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn drain_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

/// Judge whether OMR output is usable: a recognized score with fewer than
/// `min_notes` events is a quality failure, not a structural one.
pub fn validate_recognition(score: &Score, min_notes: usize) -> ToolResult<()> {
    let found = score.event_count();
    if found < min_notes {
        Err(ToolError::TooLittleContent(found, min_notes))
    } else {
        Ok(())
    }
}
