//! Render configuration.

/// Spaces per indentation level.
pub const INDENT_WIDTH: u32 = 4;

/// Line ending written for each line break.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum NewlineMode {
    /// Whatever the parsed source used.
    #[default]
    Auto,
    Lf,
    CrLf,
}

impl NewlineMode {
    /// Resolve `Auto` against the source's line endings.
    #[inline]
    pub fn resolve(self, source_crlf: bool) -> NewlineMode {
        match self {
            NewlineMode::Auto if source_crlf => NewlineMode::CrLf,
            NewlineMode::Auto => NewlineMode::Lf,
            mode => mode,
        }
    }

    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            NewlineMode::CrLf => "\r\n",
            NewlineMode::Lf | NewlineMode::Auto => "\n",
        }
    }
}

/// Configuration for rendering a tree.
///
/// Indentation is regenerated from the tree's structure; everything else
/// about the layout comes from the tree itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    /// Columns per indentation level.
    pub indent_width: u32,
    /// Indent with tabs instead of spaces.
    pub use_tabs: bool,
    pub newline: NewlineMode,
    /// End non-empty output with a line break even if the tree does not
    /// record one.
    pub trailing_newline: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent_width: INDENT_WIDTH,
            use_tabs: false,
            newline: NewlineMode::Auto,
            trailing_newline: false,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent_width(mut self, indent_width: u32) -> Self {
        self.indent_width = indent_width;
        self
    }

    #[must_use]
    pub fn with_tabs(mut self, use_tabs: bool) -> Self {
        self.use_tabs = use_tabs;
        self
    }

    #[must_use]
    pub fn with_newline(mut self, newline: NewlineMode) -> Self {
        self.newline = newline;
        self
    }

    #[must_use]
    pub fn with_trailing_newline(mut self, trailing_newline: bool) -> Self {
        self.trailing_newline = trailing_newline;
        self
    }
}
