use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Plain-text transcript of a session, appended as it happens.
///
/// User lines are prefixed with `You: `, narrator replies are written as-is
/// and session events are prefixed with `## `. Every entry is followed by an
/// empty line.
#[derive(Debug, Default)]
pub struct TranscriptLog {
    file_path: Option<PathBuf>,
}

impl TranscriptLog {
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self { file_path }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Open (creating if needed) the file once so a bad path is reported at
    /// startup rather than on the first message.
    pub fn check_access(&self) -> io::Result<()> {
        match &self.file_path {
            Some(path) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map(|_| ()),
            None => Ok(()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn log_user(&self, text: &str) -> io::Result<()> {
        self.write_entry(&format!("You: {text}"))
    }

    pub fn log_assistant(&self, text: &str) -> io::Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.write_entry(text)
    }

    pub fn log_event(&self, text: &str) -> io::Result<()> {
        self.write_entry(&format!("## {text}"))
    }

    fn write_entry(&self, content: &str) -> io::Result<()> {
        let Some(file_path) = &self.file_path else {
            return Ok(());
        };

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;
        let mut writer = BufWriter::new(file);

        for line in content.lines() {
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn entries_are_appended_with_prefixes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.log");
        let log = TranscriptLog::new(Some(path.clone()));

        log.log_event("New dungeon room").unwrap();
        log.log_user("I open the door.").unwrap();
        log.log_assistant("It creaks.\nA bat flies out.").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "## New dungeon room\n\nYou: I open the door.\n\nIt creaks.\nA bat flies out.\n\n"
        );
    }

    #[test]
    fn empty_replies_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.log");
        let log = TranscriptLog::new(Some(path.clone()));

        log.log_assistant("").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn disabled_log_writes_nothing() {
        let log = TranscriptLog::disabled();
        assert!(log.path().is_none());
        assert!(log.log_user("hello").is_ok());
        assert!(log.check_access().is_ok());
    }

    #[test]
    fn check_access_reports_bad_paths() {
        let dir = TempDir::new().unwrap();
        let log = TranscriptLog::new(Some(dir.path().join("missing").join("x.log")));
        assert!(log.check_access().is_err());
    }
}
