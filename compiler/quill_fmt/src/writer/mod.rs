//! Output backend.
//!
//! The renderer drives a [`CodeWriter`]: text, line breaks, indentation
//! levels and alignment columns. Indentation is written lazily, when the
//! first text of a line arrives, so blank lines carry no trailing
//! whitespace.

use quill_ir::Position;

use crate::config::{NewlineMode, RenderConfig};

/// Destination for rendered source.
pub trait CodeWriter {
    /// Write `text`. The first line of `text` is indented if it starts a
    /// line; any further lines in it are written as they are.
    fn write(&mut self, text: &str);

    /// End the current line.
    fn write_line(&mut self);

    /// End the current line `count` times.
    fn write_lines(&mut self, count: u32) {
        for _ in 0..count {
            self.write_line();
        }
    }

    fn begin_indent(&mut self);

    fn end_indent(&mut self);

    /// Start lines at `column` (zero-based) instead of the indentation,
    /// until the matching [`end_alignment`](Self::end_alignment).
    fn begin_alignment(&mut self, column: u32);

    fn end_alignment(&mut self);

    /// One-based position of the next character.
    fn position(&self) -> Position;
}

/// Writer collecting output in a string.
#[derive(Debug)]
pub struct StringWriter {
    buffer: String,
    newline: &'static str,
    indent_width: u32,
    use_tabs: bool,
    indent: u32,
    alignments: Vec<u32>,
    line: u32,
    column: u32,
    at_line_start: bool,
}

impl Default for StringWriter {
    fn default() -> Self {
        Self::new(&RenderConfig::default(), false)
    }
}

impl StringWriter {
    /// Writer for `config`. `source_crlf` resolves [`NewlineMode::Auto`].
    pub fn new(config: &RenderConfig, source_crlf: bool) -> Self {
        StringWriter {
            buffer: String::new(),
            newline: config.newline.resolve(source_crlf).as_str(),
            indent_width: config.indent_width,
            use_tabs: config.use_tabs,
            indent: 0,
            alignments: Vec::new(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Writer with default settings and `\n` line endings.
    pub fn lf() -> Self {
        Self::new(&RenderConfig::default().with_newline(NewlineMode::Lf), false)
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// End non-empty output with a line break.
    pub fn ensure_trailing_newline(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.write_line();
        }
    }

    pub fn output(self) -> String {
        self.buffer
    }

    /// Columns the next line starts at.
    fn line_indent(&self) -> u32 {
        match self.alignments.last() {
            Some(&column) => column,
            None if self.use_tabs => self.indent,
            None => self.indent * self.indent_width,
        }
    }

    fn emit_indentation(&mut self) {
        let columns = self.line_indent();
        let tabs = if self.use_tabs { columns.min(self.indent) } else { 0 };
        for _ in 0..tabs {
            self.buffer.push('\t');
        }
        for _ in tabs..columns {
            self.buffer.push(' ');
        }
        self.column += columns;
        self.at_line_start = false;
    }

    fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.push_str(text);
        self.column += count_columns(text);
        self.at_line_start = false;
    }
}

impl CodeWriter for StringWriter {
    fn write(&mut self, text: &str) {
        let mut lines = text.split('\n');
        let first = lines.next().unwrap_or("");
        let mut rest = lines.peekable();
        let first = if rest.peek().is_some() {
            first.strip_suffix('\r').unwrap_or(first)
        } else {
            first
        };
        if !first.is_empty() {
            if self.at_line_start {
                self.emit_indentation();
            }
            self.push_raw(first);
        }
        while let Some(line) = rest.next() {
            self.write_line();
            let line = if rest.peek().is_some() {
                line.strip_suffix('\r').unwrap_or(line)
            } else {
                line
            };
            self.push_raw(line);
        }
    }

    fn write_line(&mut self) {
        self.buffer.push_str(self.newline);
        self.line += 1;
        self.column = 1;
        self.at_line_start = true;
    }

    fn begin_indent(&mut self) {
        self.indent += 1;
    }

    fn end_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    fn begin_alignment(&mut self, column: u32) {
        self.alignments.push(column);
    }

    fn end_alignment(&mut self) {
        self.alignments.pop();
    }

    fn position(&self) -> Position {
        let column = if self.at_line_start {
            self.column + self.line_indent()
        } else {
            self.column
        };
        Position::new(self.line, column)
    }
}

fn count_columns(text: &str) -> u32 {
    u32::try_from(text.chars().count()).unwrap_or(u32::MAX)
}
