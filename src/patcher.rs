//! Anchor-based patching of configuration files inside the target.
//!
//! Every edit locates its line by a stable anchor substring, never by a
//! numeric line index; upstream releases reshuffle these files too often
//! for positional edits to survive. A missing anchor is a typed
//! [`BuilderError::AnchorNotFound`] so callers can tell "assumption about
//! the file layout broke" apart from an environment problem.
//!
//! A [`TargetFile`] is read once, edited in memory and written back in a
//! single pass; no partial write is ever visible on disk.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::BuilderError;

/// A target configuration file loaded as an ordered sequence of lines.
#[derive(Debug)]
pub struct TargetFile {
    path: Utf8PathBuf,
    lines: Vec<String>,
}

impl TargetFile {
    /// Reads the file at `path` into memory.
    pub fn load(path: impl Into<Utf8PathBuf>) -> Result<Self, BuilderError> {
        let path = path.into();
        let content = fs::read_to_string(&path)
            .map_err(|e| BuilderError::io(path.to_string(), e))?;
        let lines = content.lines().map(str::to_string).collect();
        Ok(Self { path, lines })
    }

    /// The path this file was loaded from.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn anchor_not_found(&self, anchor: &str) -> BuilderError {
        BuilderError::AnchorNotFound {
            path: self.path.to_string(),
            anchor: anchor.to_string(),
        }
    }

    /// Strips one leading `#` (and one following space, if present) from
    /// the first commented line containing `anchor`.
    pub fn uncomment_containing(&mut self, anchor: &str) -> Result<(), BuilderError> {
        let idx = self
            .lines
            .iter()
            .position(|l| l.trim_start().starts_with('#') && l.contains(anchor))
            .ok_or_else(|| self.anchor_not_found(anchor))?;
        self.lines[idx] = uncomment(&self.lines[idx]);
        Ok(())
    }

    /// Uncomments every commented line containing `anchor`. Fails if no
    /// line matched at all.
    pub fn uncomment_all_containing(&mut self, anchor: &str) -> Result<(), BuilderError> {
        let mut found = false;
        for line in &mut self.lines {
            if line.trim_start().starts_with('#') && line.contains(anchor) {
                *line = uncomment(line);
                found = true;
            }
        }
        if !found {
            return Err(self.anchor_not_found(anchor));
        }
        Ok(())
    }

    /// Prefixes `#` to the first active (uncommented) line containing
    /// `anchor`.
    pub fn comment_containing(&mut self, anchor: &str) -> Result<(), BuilderError> {
        let idx = self
            .lines
            .iter()
            .position(|l| !l.trim_start().starts_with('#') && l.contains(anchor))
            .ok_or_else(|| self.anchor_not_found(anchor))?;
        self.lines[idx].insert(0, '#');
        Ok(())
    }

    /// Appends a line at the end of the file.
    pub fn append_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Inserts `suffix` just before the closing quote of the first
    /// `KEY="value"` line for the given key.
    ///
    /// Used for the cosmetic os-release rebranding: amending
    /// `NAME="Arch Linux"` with ` (Eupnea)` yields
    /// `NAME="Arch Linux (Eupnea)"`.
    pub fn amend_quoted_value(&mut self, key: &str, suffix: &str) -> Result<(), BuilderError> {
        let anchor = format!("{}=\"", key);
        let idx = self
            .lines
            .iter()
            .position(|l| l.starts_with(&anchor))
            .ok_or_else(|| self.anchor_not_found(&anchor))?;
        let amended = match self.lines[idx].strip_suffix('"') {
            Some(stripped) => format!("{}{}\"", stripped, suffix),
            None => return Err(self.anchor_not_found(&anchor)),
        };
        self.lines[idx] = amended;
        Ok(())
    }

    /// Writes the edited lines back to the file.
    pub fn write(&self) -> Result<(), BuilderError> {
        let mut content = self.lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content).map_err(|e| BuilderError::io(self.path.to_string(), e))
    }
}

fn uncomment(line: &str) -> String {
    let (indent, rest) = line.split_at(line.len() - line.trim_start().len());
    let rest = rest.strip_prefix('#').unwrap_or(rest);
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    format!("{}{}", indent, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    fn target_file(content: &str) -> (tempfile::TempDir, TargetFile) {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("target.conf"))
            .expect("path should be valid UTF-8");
        fs::write(&path, content).expect("failed to write fixture");
        let file = TargetFile::load(path).expect("load should succeed");
        (dir, file)
    }

    fn written(file: &TargetFile) -> String {
        file.write().expect("write should succeed");
        fs::read_to_string(file.path()).expect("read back should succeed")
    }

    #[test]
    fn uncomment_first_matching_line_only() {
        let (_dir, mut file) = target_file(
            "## Worldwide\n\
             #Server = https://geo.mirror.pkgbuild.com/$repo/os/$arch\n\
             #Server = http://geo.mirror.pkgbuild.com/$repo/os/$arch\n",
        );
        file.uncomment_containing("geo.mirror.pkgbuild.com").unwrap();
        let out = written(&file);
        assert!(out.contains("\nServer = https://geo.mirror.pkgbuild.com/$repo/os/$arch\n"));
        assert!(out.contains("#Server = http://geo.mirror.pkgbuild.com"));
    }

    #[test]
    fn uncomment_strips_comment_space() {
        let (_dir, mut file) = target_file("# %wheel ALL=(ALL:ALL) ALL\n");
        file.uncomment_all_containing("%wheel").unwrap();
        assert_eq!(written(&file), "%wheel ALL=(ALL:ALL) ALL\n");
    }

    #[test]
    fn uncomment_all_hits_every_match() {
        let (_dir, mut file) = target_file(
            "## sudoers\n\
             # %wheel ALL=(ALL:ALL) ALL\n\
             Defaults env_reset\n\
             # %wheel ALL=(ALL:ALL) NOPASSWD: ALL\n",
        );
        file.uncomment_all_containing("%wheel").unwrap();
        let out = written(&file);
        assert!(out.contains("\n%wheel ALL=(ALL:ALL) ALL\n"));
        assert!(out.contains("\n%wheel ALL=(ALL:ALL) NOPASSWD: ALL\n"));
    }

    #[test]
    fn comment_then_uncomment_round_trip() {
        let (_dir, mut file) = target_file("HoldPkg = pacman glibc\nCheckSpace\nColor\n");
        file.comment_containing("CheckSpace").unwrap();
        assert_eq!(written(&file), "HoldPkg = pacman glibc\n#CheckSpace\nColor\n");
        file.uncomment_containing("CheckSpace").unwrap();
        assert_eq!(written(&file), "HoldPkg = pacman glibc\nCheckSpace\nColor\n");
    }

    #[test]
    fn comment_skips_already_commented_lines() {
        let (_dir, mut file) = target_file("#CheckSpace docs\nCheckSpace\n");
        file.comment_containing("CheckSpace").unwrap();
        assert_eq!(written(&file), "#CheckSpace docs\n#CheckSpace\n");
    }

    #[test]
    fn mixed_edits_on_one_file() {
        let (_dir, mut file) = target_file(
            "NAME=\"Arch Linux\"\nCheckSpace\n#Color\n",
        );
        file.comment_containing("CheckSpace").unwrap();
        file.uncomment_containing("Color").unwrap();
        file.amend_quoted_value("NAME", " (Eupnea)").unwrap();
        assert_eq!(
            written(&file),
            "NAME=\"Arch Linux (Eupnea)\"\n#CheckSpace\nColor\n"
        );
    }

    #[test]
    fn missing_anchor_is_typed_error() {
        let (_dir, mut file) = target_file("Color\n");
        let err = file.comment_containing("CheckSpace").unwrap_err();
        assert!(matches!(err, BuilderError::AnchorNotFound { .. }));
        let err = file.uncomment_containing("CheckSpace").unwrap_err();
        assert!(matches!(err, BuilderError::AnchorNotFound { .. }));
        let err = file.uncomment_all_containing("CheckSpace").unwrap_err();
        assert!(matches!(err, BuilderError::AnchorNotFound { .. }));
    }

    #[test]
    fn append_line_lands_at_end() {
        let (_dir, mut file) = target_file("[Seat:*]\n");
        file.append_line("greeter-session=lightdm-deepin-greeter");
        assert_eq!(written(&file), "[Seat:*]\ngreeter-session=lightdm-deepin-greeter\n");
    }

    #[test]
    fn amend_quoted_value_inserts_before_closing_quote() {
        let (_dir, mut file) = target_file(
            "NAME=\"Arch Linux\"\nPRETTY_NAME=\"Arch Linux\"\nID=arch\n",
        );
        file.amend_quoted_value("NAME", " (Eupnea)").unwrap();
        file.amend_quoted_value("PRETTY_NAME", " (Eupnea)").unwrap();
        let out = written(&file);
        assert!(out.starts_with("NAME=\"Arch Linux (Eupnea)\"\n"));
        assert!(out.contains("PRETTY_NAME=\"Arch Linux (Eupnea)\"\n"));
        assert!(out.contains("ID=arch\n"));
    }

    #[test]
    fn amend_quoted_value_matches_exact_key_prefix() {
        let (_dir, mut file) = target_file("PRETTY_NAME=\"Debian GNU/Linux 11 (bullseye)\"\n");
        // "NAME=\"" must not match the PRETTY_NAME line.
        let err = file.amend_quoted_value("NAME", " (Eupnea)").unwrap_err();
        assert!(matches!(err, BuilderError::AnchorNotFound { .. }));
    }

    #[test]
    fn amend_rejects_unquoted_value() {
        let (_dir, mut file) = target_file("NAME=\"Arch Linux\n");
        let err = file.amend_quoted_value("NAME", " (Eupnea)").unwrap_err();
        assert!(matches!(err, BuilderError::AnchorNotFound { .. }));
    }

    #[test]
    fn load_missing_file_is_io_not_found() {
        let err = TargetFile::load("/nonexistent/eupnea/target.conf").unwrap_err();
        match err {
            BuilderError::Io { source, .. } => assert_eq!(source.kind(), ErrorKind::NotFound),
            other => panic!("expected Io error, got {:?}", other),
        }
    }
}
