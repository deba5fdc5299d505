//! Internal utilities for reading command output pipes.
//!
//! stdout is always collected so callers can parse it (e.g., device
//! enumeration over `lsblk`). Streaming the output to the log happens
//! only in verbose mode; in quiet mode nothing is emitted at all.

use std::io::{BufRead, BufReader, Read};

/// Type of output stream for logging purposes.
#[derive(Clone, Copy)]
pub(super) enum StreamType {
    Stdout,
    Stderr,
}

impl std::fmt::Display for StreamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// Extracts a human-readable message from a thread panic.
///
/// The returned `&str` borrows from the panic payload, so it is valid
/// as long as the `err` reference is valid.
pub(super) fn panic_message(err: &(dyn std::any::Any + Send)) -> &str {
    err.downcast_ref::<&str>()
        .copied()
        .or_else(|| err.downcast_ref::<String>().map(|s| s.as_str()))
        .unwrap_or("unknown panic")
}

/// Reads stdout to completion, returning the captured text.
///
/// When `verbose` is set, each line is also logged at INFO level in
/// real-time so users can watch package-manager progress.
/// - Binary data uses lossy UTF-8 conversion
/// - I/O errors stop reading but don't fail command execution
///   (command success is determined by exit status)
/// - `None` pipe logs an error and returns empty output
pub(super) fn read_stdout_pipe<R: Read>(pipe: Option<R>, verbose: bool) -> String {
    let Some(pipe) = pipe else {
        tracing::error!(
            stream = %StreamType::Stdout,
            "pipe was None (unexpected: Stdio::piped() was set), no output will be captured"
        );
        return String::new();
    };

    let mut captured = String::new();
    for_each_line(pipe, StreamType::Stdout, |line| {
        if verbose {
            log_line(line, StreamType::Stdout);
        }
        captured.push_str(&String::from_utf8_lossy(line));
        captured.push('\n');
    });
    captured
}

/// Drains stderr, logging each line at WARN level when `verbose` is set
/// and discarding it entirely otherwise.
pub(super) fn drain_stderr_pipe<R: Read>(pipe: Option<R>, verbose: bool) {
    let Some(pipe) = pipe else {
        tracing::error!(
            stream = %StreamType::Stderr,
            "pipe was None (unexpected: Stdio::piped() was set)"
        );
        return;
    };

    for_each_line(pipe, StreamType::Stderr, |line| {
        if verbose {
            log_line(line, StreamType::Stderr);
        }
    });
}

/// Calls `f` with each line of the pipe (newline stripped) until EOF or
/// an I/O error.
fn for_each_line<R: Read>(pipe: R, stream_type: StreamType, mut f: impl FnMut(&[u8])) {
    let mut reader = BufReader::new(pipe);
    let mut line_buf = Vec::new();

    loop {
        line_buf.clear();
        match reader.read_until(b'\n', &mut line_buf) {
            Ok(0) => break, // EOF
            Ok(_) => {
                let content = line_buf.strip_suffix(b"\n").unwrap_or(&line_buf);
                f(content);
            }
            Err(e) => {
                tracing::error!(stream = %stream_type, error = %e, "I/O error, stopping read");
                break;
            }
        }
    }
}

/// Logs a complete line at the appropriate level.
///
/// Trailing CR is trimmed to handle CRLF line endings.
fn log_line(line: &[u8], stream_type: StreamType) {
    let text = String::from_utf8_lossy(line);
    let trimmed = text.trim_end_matches('\r');
    match stream_type {
        StreamType::Stdout => tracing::info!(stream = %stream_type, "{}", trimmed),
        StreamType::Stderr => tracing::warn!(stream = %stream_type, "{}", trimmed),
    }
}
