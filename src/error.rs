//! Domain-specific error types for eupnea-builder.
//!
//! This module defines `BuilderError`, a `thiserror`-based enum that
//! provides typed error variants for the failure taxonomy of the builder:
//! user-correctable wizard rejections, incompatible configuration choices,
//! and fatal environment errors raised during provisioning. Public API
//! functions return `Result<T, BuilderError>` for programmatic error
//! handling, while trait boundaries continue to use `anyhow::Result`.
//!
//! `BuilderError` implements `Into<anyhow::Error>`, so the `?` operator
//! converts it automatically at trait boundaries that return `anyhow::Result`.

use std::io;

/// Formats an IO error kind into a human-readable message.
///
/// Provides consistent messages for common IO error kinds
/// (e.g., "I/O error: not found") instead of the OS-level messages
/// (e.g., "No such file or directory (os error 2)"). For unrecognized
/// error kinds, falls back to including the OS-level error message.
pub(crate) fn io_error_kind_message(err: &io::Error) -> String {
    match err.kind() {
        io::ErrorKind::NotFound => "I/O error: not found".to_string(),
        io::ErrorKind::PermissionDenied => "I/O error: permission denied".to_string(),
        io::ErrorKind::IsADirectory => "I/O error: is a directory".to_string(),
        _ => format!("I/O error: {}", err),
    }
}

/// Domain-specific error type for eupnea-builder.
///
/// The wizard treats `Validation` and `Incompatible` as re-prompt loops;
/// everything else aborts the run.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuilderError {
    /// A user-supplied value failed a per-field validation constraint.
    /// Always re-prompted, never fatal.
    #[error("{0}")]
    Validation(String),

    /// A value valid in isolation conflicts with an earlier choice
    /// (e.g., a desktop environment unsupported on the chosen distro).
    /// Always re-prompted, never fatal.
    #[error("{0}")]
    Incompatible(String),

    /// A command execution failed (non-zero exit, spawn failure, wait
    /// failure, thread panic, etc.). Fatal: aborts the provisioning run.
    #[error("command execution failed: {command}: {status}")]
    Execution {
        /// The command that was executed.
        command: String,
        /// Human-readable reason for the failure: exit code, signal
        /// information, or a description of the internal error.
        status: String,
    },

    /// A file patch could not find its expected anchor content. Fatal:
    /// the assumption about the target's file layout no longer holds,
    /// and continuing would risk mutating the wrong line.
    #[error("anchor not found in {path}: {anchor:?}")]
    AnchorNotFound {
        /// The file that was being patched.
        path: String,
        /// The anchor substring that was expected but absent.
        anchor: String,
    },

    /// The release catalog could not be loaded or parsed.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// An I/O operation failed with contextual information.
    #[error("{context}: {message}")]
    Io {
        /// What was being done when the error occurred, usually a file
        /// path or an operation description with a path.
        context: String,
        /// Human-readable description of the I/O failure, derived from
        /// [`io_error_kind_message`] for consistent formatting.
        message: String,
        /// The underlying I/O error, preserved for programmatic inspection
        /// (e.g., `source.kind() == ErrorKind::NotFound`).
        #[source]
        source: std::io::Error,
    },
}

impl BuilderError {
    /// Creates an `Io` variant with the `message` field automatically
    /// derived from the `source` via [`io_error_kind_message`].
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            message: io_error_kind_message(&source),
            source,
        }
    }

    /// Returns true for errors the wizard handles by re-prompting.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Incompatible(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display() {
        let err = BuilderError::Validation("Hostname cannot start with a '-'".to_string());
        assert_eq!(err.to_string(), "Hostname cannot start with a '-'");
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_incompatible_display() {
        let err = BuilderError::Incompatible("Deepin is not available for Debian".to_string());
        assert_eq!(err.to_string(), "Deepin is not available for Debian");
        assert!(err.is_user_correctable());
    }

    #[test]
    fn test_execution_display() {
        let err = BuilderError::Execution {
            command: "pacman -Syu --noconfirm".to_string(),
            status: "exit status: 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "command execution failed: pacman -Syu --noconfirm: exit status: 1"
        );
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn test_anchor_not_found_display() {
        let err = BuilderError::AnchorNotFound {
            path: "/mnt/eupnea/etc/pacman.conf".to_string(),
            anchor: "CheckSpace".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "anchor not found in /mnt/eupnea/etc/pacman.conf: \"CheckSpace\""
        );
        assert!(!err.is_user_correctable());
    }

    #[test]
    fn test_io_display() {
        let source = io::Error::new(io::ErrorKind::NotFound, "entity not found");
        let err = BuilderError::io("/mnt/eupnea/etc/os-release", source);
        assert_eq!(err.to_string(), "/mnt/eupnea/etc/os-release: I/O error: not found");
    }

    #[test]
    fn test_io_source_preserved() {
        let source = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = BuilderError::io("/mnt/eupnea/etc/sudoers", source);
        match &err {
            BuilderError::Io { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_io_error_kind_message_other() {
        let err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let msg = io_error_kind_message(&err);
        assert!(msg.starts_with("I/O error: "));
    }

    #[test]
    fn test_into_anyhow_error() {
        let err = BuilderError::Validation("test".to_string());
        let anyhow_err: anyhow::Error = err.into();
        let downcast = anyhow_err.downcast_ref::<BuilderError>();
        assert!(downcast.is_some());
        assert!(matches!(downcast.unwrap(), BuilderError::Validation(_)));
    }
}
