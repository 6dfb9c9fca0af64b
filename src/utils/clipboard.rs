use std::collections::VecDeque;
use std::io::Write;
use std::process::{Command, Stdio};

use unicode_segmentation::UnicodeSegmentation;

pub fn copy_to_clipboard(text: &str) -> Result<(), String> {
    #[cfg(target_os = "macos")]
    {
        return run_with_stdin("pbcopy", &[], text);
    }
    #[cfg(target_os = "windows")]
    {
        return run_with_stdin("cmd", &["/C", "clip"], text);
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let candidates: [(&str, &[&str]); 3] = [
            ("wl-copy", &[]),
            ("xclip", &["-selection", "clipboard"]),
            ("xsel", &["--clipboard", "--input"]),
        ];
        for (cmd, args) in candidates {
            if run_with_stdin(cmd, args, text).is_ok() {
                return Ok(());
            }
        }
        Err("No clipboard command found (install wl-copy, xclip, or xsel)".to_string())
    }
}

fn run_with_stdin(cmd: &str, args: &[&str], input: &str) -> Result<(), String> {
    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|_| format!("Clipboard command `{cmd}` not available"))?;

    if let Some(mut stdin) = child.stdin.take() {
        let _ = stdin.write_all(input.as_bytes());
    }
    match child.wait() {
        Ok(status) if status.success() => Ok(()),
        _ => Err(format!("Clipboard command `{cmd}` failed")),
    }
}

/// Split `text` into pieces of at most `max_size` bytes without cutting a
/// grapheme cluster, unless a single cluster is itself larger than the limit
/// (then it is split between characters). A `max_size` below one disables
/// splitting.
pub fn message_chunks(text: &str, max_size: usize) -> Vec<String> {
    if max_size < 1 {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut push_piece = |piece: &str, current: &mut String| {
        if !current.is_empty() && current.len() + piece.len() > max_size {
            chunks.push(std::mem::take(current));
        }
        current.push_str(piece);
    };

    for grapheme in text.graphemes(true) {
        if grapheme.len() <= max_size {
            push_piece(grapheme, &mut current);
        } else {
            for (idx, ch) in grapheme.char_indices() {
                push_piece(&grapheme[idx..idx + ch.len_utf8()], &mut current);
            }
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Successive `copy` commands walk through the parts of the last reply.
#[derive(Debug, Default)]
pub struct ClipboardQueue {
    source: String,
    pending: VecDeque<String>,
}

impl ClipboardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next part of `reply` to copy. Starts over when the reply changed or
    /// every part has been handed out.
    pub fn next_chunk(&mut self, reply: &str, chunk_size: Option<usize>) -> Option<String> {
        if reply.is_empty() {
            self.clear();
            return None;
        }
        if self.source != reply || self.pending.is_empty() {
            self.source = reply.to_string();
            self.pending = match chunk_size {
                Some(size) => message_chunks(reply, size).into(),
                None => VecDeque::from([reply.to_string()]),
            };
        }
        self.pending.pop_front()
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.source.clear();
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_byte_limit() {
        let chunks = message_chunks("The wolf howls at the moon.", 10);
        assert_eq!(chunks, vec!["The wolf h", "owls at th", "e moon."]);
        assert!(chunks.iter().all(|c| c.len() <= 10));
        assert_eq!(chunks.concat(), "The wolf howls at the moon.");
    }

    #[test]
    fn chunks_never_split_graphemes() {
        // "é" as e + combining acute is one cluster of three bytes.
        let text = "ae\u{301}b";
        let chunks = message_chunks(text, 3);
        assert_eq!(chunks, vec!["a", "e\u{301}", "b"]);
    }

    #[test]
    fn oversized_cluster_is_split_between_chars() {
        let chunks = message_chunks("e\u{301}", 1);
        assert_eq!(chunks, vec!["e", "\u{301}"]);
    }

    #[test]
    fn non_positive_size_keeps_text_whole() {
        assert_eq!(message_chunks("whole", 0), vec!["whole"]);
    }

    #[test]
    fn queue_walks_parts_then_restarts() {
        let mut queue = ClipboardQueue::new();
        assert_eq!(queue.next_chunk("abcdef", Some(4)).as_deref(), Some("abcd"));
        assert_eq!(queue.remaining(), 1);
        assert_eq!(queue.next_chunk("abcdef", Some(4)).as_deref(), Some("ef"));
        assert_eq!(queue.remaining(), 0);
        assert_eq!(queue.next_chunk("abcdef", Some(4)).as_deref(), Some("abcd"));
    }

    #[test]
    fn queue_reloads_on_new_reply() {
        let mut queue = ClipboardQueue::new();
        queue.next_chunk("first reply", Some(5));
        assert_eq!(queue.next_chunk("second", None).as_deref(), Some("second"));
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn queue_has_nothing_for_empty_reply() {
        let mut queue = ClipboardQueue::new();
        assert_eq!(queue.next_chunk("", Some(3)), None);
    }
}
