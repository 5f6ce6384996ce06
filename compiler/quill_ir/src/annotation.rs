//! Annotations: comments, doc comments, attributes, preprocessor directives
//! and diagnostics hung off a host node.
//!
//! Annotations live in the node arena like any other node so they can sit in
//! a block's child list or the parser's backlog before being attached. Once
//! attached, an annotation's parent is its host and its position flags say
//! where the renderer places it relative to the host.
//!
//! # Newlines
//!
//! A *prefix* annotation's newline count is the gap that follows it (before
//! the next annotation or the host). The host's own newline count is the gap
//! before the whole group. [`Tree::attach_annotation`](crate::Tree::attach_annotation)
//! maintains this by swapping counts on attach.

use bitflags::bitflags;

bitflags! {
    /// Where an attached annotation renders relative to its host.
    ///
    /// No position flag means prefix: before the host.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct AnnotationFlags: u8 {
        /// End-of-line comment after the host's last token.
        const IS_EOL = 1 << 0;
        /// Between the host's header and its body.
        const IS_INFIX = 1 << 1;
        /// After the host (or after its modifiers, in a sandwiched header).
        const IS_POSTFIX = 1 << 2;
        /// Starts its own line in the source.
        const IS_FIRST_ON_LINE = 1 << 3;
    }
}

impl AnnotationFlags {
    /// All position bits.
    pub const POSITION_MASK: Self = Self::from_bits_truncate(
        Self::IS_EOL.bits() | Self::IS_INFIX.bits() | Self::IS_POSTFIX.bits(),
    );
}

/// Requested placement when attaching an annotation.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationPosition {
    Prefix,
    Eol,
    Infix,
    Postfix,
}

impl AnnotationPosition {
    #[inline]
    pub const fn flags(self) -> AnnotationFlags {
        match self {
            AnnotationPosition::Prefix => AnnotationFlags::empty(),
            AnnotationPosition::Eol => AnnotationFlags::IS_EOL,
            AnnotationPosition::Infix => AnnotationFlags::IS_INFIX,
            AnnotationPosition::Postfix => AnnotationFlags::IS_POSTFIX,
        }
    }

    /// Position encoded in `flags`.
    pub const fn from_flags(flags: AnnotationFlags) -> Self {
        if flags.contains(AnnotationFlags::IS_EOL) {
            AnnotationPosition::Eol
        } else if flags.contains(AnnotationFlags::IS_INFIX) {
            AnnotationPosition::Infix
        } else if flags.contains(AnnotationFlags::IS_POSTFIX) {
            AnnotationPosition::Postfix
        } else {
            AnnotationPosition::Prefix
        }
    }
}

/// Comment delimiter style.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CommentStyle {
    /// `// ...` up to the end of the line.
    Line,
    /// `/* ... */`, possibly spanning lines.
    Block,
}

/// Diagnostic severity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Information,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
        }
    }
}

/// Preprocessor directive keyword.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DirectiveKind {
    If,
    Elif,
    Else,
    Endif,
    Define,
    Undef,
    Region,
    EndRegion,
    Pragma,
    Error,
    Warning,
    Line,
    Nullable,
    /// Anything else; the keyword is kept in the argument text.
    Other,
}

impl DirectiveKind {
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "if" => DirectiveKind::If,
            "elif" => DirectiveKind::Elif,
            "else" => DirectiveKind::Else,
            "endif" => DirectiveKind::Endif,
            "define" => DirectiveKind::Define,
            "undef" => DirectiveKind::Undef,
            "region" => DirectiveKind::Region,
            "endregion" => DirectiveKind::EndRegion,
            "pragma" => DirectiveKind::Pragma,
            "error" => DirectiveKind::Error,
            "warning" => DirectiveKind::Warning,
            "line" => DirectiveKind::Line,
            "nullable" => DirectiveKind::Nullable,
            _ => DirectiveKind::Other,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            DirectiveKind::If => "if",
            DirectiveKind::Elif => "elif",
            DirectiveKind::Else => "else",
            DirectiveKind::Endif => "endif",
            DirectiveKind::Define => "define",
            DirectiveKind::Undef => "undef",
            DirectiveKind::Region => "region",
            DirectiveKind::EndRegion => "endregion",
            DirectiveKind::Pragma => "pragma",
            DirectiveKind::Error => "error",
            DirectiveKind::Warning => "warning",
            DirectiveKind::Line => "line",
            DirectiveKind::Nullable => "nullable",
            DirectiveKind::Other => "",
        }
    }

    /// `#if`, `#elif`, `#else` or `#endif`.
    #[inline]
    pub const fn is_conditional(self) -> bool {
        matches!(
            self,
            DirectiveKind::If | DirectiveKind::Elif | DirectiveKind::Else | DirectiveKind::Endif
        )
    }

    /// Directives that open a branch (`#if`, `#elif`, `#else`).
    #[inline]
    pub const fn opens_branch(self) -> bool {
        matches!(
            self,
            DirectiveKind::If | DirectiveKind::Elif | DirectiveKind::Else
        )
    }
}

/// A preprocessor directive line plus the inactive source it guards.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Directive {
    pub kind: DirectiveKind,
    /// Text after the keyword, trimmed.
    pub argument: Box<str>,
    /// Source lines of the inactive branch that follows this directive,
    /// newline-separated, without a trailing newline. `None` when the branch
    /// is active or the directive opens no branch.
    pub skipped: Option<String>,
    /// The branch this directive opens is the one compiled.
    pub taken: bool,
}

impl Directive {
    pub fn new(kind: DirectiveKind, argument: impl Into<Box<str>>) -> Self {
        Directive {
            kind,
            argument: argument.into(),
            skipped: None,
            taken: false,
        }
    }

    /// Directive line as rendered, e.g. `#if DEBUG`.
    pub fn line_text(&self) -> String {
        let keyword = self.kind.keyword();
        let mut text = String::with_capacity(1 + keyword.len() + 1 + self.argument.len());
        text.push('#');
        text.push_str(keyword);
        if !self.argument.is_empty() {
            if !keyword.is_empty() {
                text.push(' ');
            }
            text.push_str(&self.argument);
        }
        text
    }
}

/// A diagnostic attached to the node nearest the problem.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Message {
    pub severity: Severity,
    pub text: Box<str>,
}

/// Annotation payload.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum AnnotationKind {
    /// Raw comment text including its delimiters.
    Comment { text: Box<str>, style: CommentStyle },
    /// Consecutive `///` lines, each kept verbatim.
    DocComment { lines: Vec<Box<str>> },
    /// Raw attribute section, e.g. `[Obsolete("x")]`.
    Attribute { text: Box<str> },
    Directive(Directive),
    /// Never rendered.
    Message(Message),
}

/// An annotation node's data.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub flags: AnnotationFlags,
    /// For postfix directives inside a sandwiched modifier run: how many
    /// modifier tokens render before this directive. For infix annotations
    /// of a `do` statement: 1 if they sit before `while`.
    pub anchor: u8,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Annotation {
            kind,
            flags: AnnotationFlags::empty(),
            anchor: 0,
        }
    }

    pub fn line_comment(text: impl Into<Box<str>>) -> Self {
        Self::new(AnnotationKind::Comment {
            text: text.into(),
            style: CommentStyle::Line,
        })
    }

    pub fn message(severity: Severity, text: impl Into<Box<str>>) -> Self {
        Self::new(AnnotationKind::Message(Message {
            severity,
            text: text.into(),
        }))
    }

    #[inline]
    pub fn position(&self) -> AnnotationPosition {
        AnnotationPosition::from_flags(self.flags)
    }

    /// Comment or doc comment.
    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(
            self.kind,
            AnnotationKind::Comment { .. } | AnnotationKind::DocComment { .. }
        )
    }

    #[inline]
    pub fn is_doc_comment(&self) -> bool {
        matches!(self.kind, AnnotationKind::DocComment { .. })
    }

    #[inline]
    pub fn is_message(&self) -> bool {
        matches!(self.kind, AnnotationKind::Message(_))
    }

    #[inline]
    pub fn directive(&self) -> Option<&Directive> {
        match &self.kind {
            AnnotationKind::Directive(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn directive_mut(&mut self) -> Option<&mut Directive> {
        match &mut self.kind {
            AnnotationKind::Directive(d) => Some(d),
            _ => None,
        }
    }

    /// True if nothing may follow this annotation on the same line.
    pub fn ends_line(&self) -> bool {
        match &self.kind {
            AnnotationKind::Comment { style, .. } => *style == CommentStyle::Line,
            AnnotationKind::DocComment { .. } | AnnotationKind::Directive(_) => true,
            AnnotationKind::Attribute { .. } | AnnotationKind::Message(_) => false,
        }
    }
}
