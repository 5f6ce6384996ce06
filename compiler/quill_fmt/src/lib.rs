//! Quill Renderer
//!
//! Turns a Quill [`Tree`] back into source text.
//!
//! # Architecture
//!
//! The tree already records the layout it was parsed from: newline counts,
//! braces, tight spacing and comment positions. Rendering is a single
//! top-down pass that writes that layout back, regenerating indentation
//! from block depth. An unedited tree of canonically indented source
//! renders byte for byte; edited trees render with the edits in place and
//! everything else untouched.
//!
//! # Modules
//!
//! - [`writer`]: output abstraction ([`CodeWriter`]) and the string backend
//! - [`config`]: indentation and line-ending settings
//! - [`flags`]: per-call options such as description mode

pub mod config;
pub mod flags;
pub mod writer;

mod renderer;

use quill_ir::{NodeId, Position, Tree};

use renderer::Renderer;

pub use config::{NewlineMode, RenderConfig, INDENT_WIDTH};
pub use flags::RenderFlags;
pub use writer::{CodeWriter, StringWriter};

/// Render the whole tree.
pub fn render(tree: &Tree, config: &RenderConfig) -> String {
    let mut writer = StringWriter::new(config, tree.settings().crlf);
    render_node(tree, tree.root(), &mut writer, RenderFlags::empty());
    if config.trailing_newline {
        writer.ensure_trailing_newline();
    }
    let output = writer.output();
    tracing::trace!(nodes = tree.len(), bytes = output.len(), "rendered tree");
    output
}

/// Render `id` and its subtree into `writer`.
///
/// Returns the position each node was written at when `flags` contains
/// [`RenderFlags::UPDATE_POSITION`], and nothing otherwise.
pub fn render_node<W: CodeWriter + ?Sized>(
    tree: &Tree,
    id: NodeId,
    writer: &mut W,
    flags: RenderFlags,
) -> Vec<(NodeId, Position)> {
    let mut renderer = Renderer::new(tree, writer, flags.for_children());
    renderer.node(id, flags);
    renderer.into_positions()
}

/// Render the whole tree and store each node's output position on it.
pub fn render_tree_mut(tree: &mut Tree, config: &RenderConfig) -> String {
    let mut writer = StringWriter::new(config, tree.settings().crlf);
    let root = tree.root();
    let positions = render_node(tree, root, &mut writer, RenderFlags::UPDATE_POSITION);
    for (id, pos) in positions {
        tree.set_pos(id, pos);
    }
    if config.trailing_newline {
        writer.ensure_trailing_newline();
    }
    writer.output()
}

/// One-line summary of a node: no comments or inactive source, block
/// bodies shown as `{ ... }`.
pub fn describe(tree: &Tree, id: NodeId) -> String {
    let mut writer = StringWriter::lf();
    render_node(
        tree,
        id,
        &mut writer,
        RenderFlags::DESCRIPTION
            | RenderFlags::SUPPRESS_NEWLINES
            | RenderFlags::NO_PREFIX
            | RenderFlags::NO_EOL_COMMENTS,
    );
    writer.output()
}

#[cfg(test)]
mod tests;
