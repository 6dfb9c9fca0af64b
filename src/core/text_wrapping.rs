//! Text wrapping for transcript output
//!
//! Wraps on word boundaries, keeps runs of spaces exactly as written and
//! breaks words that are wider than a whole line. Widths are measured in
//! terminal columns, so double-width characters count twice.

use unicode_width::UnicodeWidthChar;

/// Configuration for text wrapping behavior
#[derive(Debug, Clone)]
pub struct WrapConfig {
    /// Maximum width for text lines; zero disables wrapping
    pub width: usize,
}

impl WrapConfig {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    /// Width used for message text in `show context`: two thirds of the
    /// terminal, leaving room for the label column.
    pub fn for_terminal(terminal_width: usize) -> Self {
        Self::new(terminal_width - terminal_width / 3)
    }
}

/// Text wrapping engine that handles word boundaries while preserving spacing
pub struct TextWrapper;

impl TextWrapper {
    /// Wrap text, inserting `\n` at soft breaks.
    pub fn wrap_text(text: &str, config: &WrapConfig) -> String {
        wrap_segments(text, config)
    }

    /// Wrap text and prefix every continuation line with `indent`.
    pub fn wrap_with_indent(text: &str, config: &WrapConfig, indent: &str) -> String {
        let wrapped = Self::wrap_text(text, config);
        let mut lines = wrapped.split('\n');
        let mut out = lines.next().unwrap_or_default().to_string();
        for line in lines {
            out.push('\n');
            out.push_str(indent);
            out.push_str(line);
        }
        out
    }
}

type Glyph = (char, usize);

#[derive(Debug)]
enum Segment {
    Word { chars: Vec<Glyph>, width: usize },
    Spaces { chars: Vec<Glyph>, width: usize },
    Newline,
}

fn segment(text: &str) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut iter = text.chars().peekable();

    while let Some(ch) = iter.next() {
        if ch == '\n' {
            segments.push(Segment::Newline);
            continue;
        }

        let is_space = ch.is_whitespace();
        let mut chars = vec![(ch, UnicodeWidthChar::width(ch).unwrap_or(0))];
        while let Some(&next_ch) = iter.peek() {
            if next_ch == '\n' || next_ch.is_whitespace() != is_space {
                break;
            }
            iter.next();
            chars.push((next_ch, UnicodeWidthChar::width(next_ch).unwrap_or(0)));
        }
        let width = chars.iter().map(|(_, w)| *w).sum();
        segments.push(if is_space {
            Segment::Spaces { chars, width }
        } else {
            Segment::Word { chars, width }
        });
    }

    segments
}

fn wrap_segments(text: &str, config: &WrapConfig) -> String {
    let segments = segment(text);
    let mut builder = LineBuilder::new(config.width);

    for (i, seg) in segments.iter().enumerate() {
        match seg {
            Segment::Word { chars, width } => {
                if builder.allow_wrap && *width > builder.width {
                    builder.handle_long_word(chars);
                } else {
                    builder.handle_word(chars, *width);
                }
            }
            Segment::Spaces { chars, width } => {
                let next_word_width = segments.get(i + 1).and_then(|next| match next {
                    Segment::Word { width, .. } => Some(*width),
                    _ => None,
                });
                builder.handle_spaces(chars, *width, next_word_width);
            }
            Segment::Newline => builder.hard_break(),
        }
    }

    builder.wrapped
}

#[derive(Debug)]
struct LineBuilder {
    width: usize,
    allow_wrap: bool,
    wrapped: String,
    current_col: usize,
}

impl LineBuilder {
    fn new(width: usize) -> Self {
        Self {
            width,
            allow_wrap: width > 0,
            wrapped: String::new(),
            current_col: 0,
        }
    }

    fn handle_word(&mut self, word: &[Glyph], total_width: usize) {
        if self.needs_break(total_width) {
            self.hard_break();
        }
        for &(ch, width) in word {
            self.push(ch, width);
        }
    }

    fn handle_long_word(&mut self, word: &[Glyph]) {
        for &(ch, width) in word {
            if self.needs_break(width) {
                self.hard_break();
            }
            self.push(ch, width);
        }
    }

    fn handle_spaces(&mut self, spaces: &[Glyph], total_width: usize, next_word: Option<usize>) {
        // A lone space at a break point is swallowed by the break.
        if self.allow_wrap && spaces.len() == 1 && spaces[0].0 == ' ' {
            if let Some(next_width) = next_word {
                if next_width > 0
                    && self.current_col > 0
                    && self.current_col + total_width + next_width > self.width
                {
                    self.hard_break();
                    return;
                }
            }
        }

        for &(ch, width) in spaces {
            if self.allow_wrap && width > 0 && self.current_col + width > self.width {
                self.hard_break();
            }
            self.push(ch, width);
        }
    }

    fn hard_break(&mut self) {
        self.wrapped.push('\n');
        self.current_col = 0;
    }

    fn push(&mut self, ch: char, width: usize) {
        self.wrapped.push(ch);
        self.current_col += width;
    }

    fn needs_break(&self, width: usize) -> bool {
        self.allow_wrap && width > 0 && self.current_col > 0 && self.current_col + width > self.width
    }
}
