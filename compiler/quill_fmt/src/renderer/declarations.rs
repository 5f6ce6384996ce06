//! Declarations: `using`, namespaces, types, enums and members.
//!
//! Keywords, names and modifiers are written with single spaces between
//! them. Type, parameter and initializer runs keep their recorded layout.

use quill_ir::{AnnotationPosition, Modifiers, NodeId, NodeKind, TokenRun};

use super::{Lead, Renderer};
use crate::writer::CodeWriter;

impl<W: CodeWriter + ?Sized> Renderer<'_, '_, W> {
    pub(super) fn declaration(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Using(using) => {
                self.text("using");
                self.run(&using.target, Lead::Inline);
            }
            NodeKind::Namespace(ns) => {
                self.text("namespace");
                self.run(&ns.name, Lead::Inline);
                self.body(id, &ns.body);
            }
            NodeKind::TypeDecl(decl) => {
                self.modifiers(id, &decl.modifiers);
                self.word(decl.keyword.as_str());
                self.word(&decl.name);
                self.optional_run(decl.type_params.as_ref());
                self.optional_run(decl.trailer.as_ref());
                self.body(id, &decl.body);
            }
            NodeKind::EnumDecl(decl) => {
                self.modifiers(id, &decl.modifiers);
                self.word("enum");
                self.word(&decl.name);
                self.optional_run(decl.trailer.as_ref());
                self.members(&decl.members);
            }
            NodeKind::Method(method) => {
                self.modifiers(id, &method.modifiers);
                if let Some(return_type) = &method.return_type {
                    self.run(return_type, Lead::Word);
                }
                self.word(&method.name);
                self.optional_run(method.type_params.as_ref());
                self.run(&method.params, Lead::Inline);
                self.optional_run(method.trailer.as_ref());
                if let Some(body) = &method.body {
                    self.body(id, body);
                }
            }
            NodeKind::Property(prop) => {
                self.modifiers(id, &prop.modifiers);
                self.run(&prop.ty, Lead::Word);
                self.word(&prop.name);
                self.members(&prop.accessors);
                self.optional_run(prop.trailer.as_ref());
            }
            NodeKind::Variable(var) => {
                self.modifiers(id, &var.modifiers);
                self.run(&var.ty, Lead::Word);
                self.word(&var.name);
                if let Some(init) = var.init {
                    self.word("=");
                    self.operand(init);
                }
                self.optional_run(var.trailer.as_ref());
            }
            _ => {}
        }
    }

    fn optional_run(&mut self, run: Option<&TokenRun>) {
        if let Some(run) = run {
            self.run(run, Lead::Inline);
        }
    }

    /// Enum members and property accessors, braces included.
    fn members(&mut self, run: &TokenRun) {
        if self.description && run.is_multiline() {
            self.word("{ ... }");
            return;
        }
        self.run(run, Lead::Inline);
    }

    /// Modifier keywords. In a sandwiched run the conditional directives
    /// anchored between the keywords are written in place.
    fn modifiers(&mut self, id: NodeId, modifiers: &Modifiers) {
        if !modifiers.sandwiched || self.description {
            for token in modifiers.tokens() {
                self.word(token.text());
            }
            return;
        }

        let tree = self.tree;
        let directives: Vec<(NodeId, u8)> = tree
            .annotations_at(id, AnnotationPosition::Postfix)
            .into_iter()
            .filter_map(|ann| {
                let annotation = tree.annotation(ann)?;
                annotation.directive().map(|_| (ann, annotation.anchor))
            })
            .collect();
        let mut next = 0;
        for (i, token) in modifiers.tokens().iter().enumerate() {
            while let Some(&(ann, anchor)) = directives.get(next) {
                if usize::from(anchor) > i {
                    break;
                }
                self.inline_directive(ann);
                next += 1;
            }
            self.word(token.text());
        }
        for &(ann, _) in &directives[next..] {
            self.inline_directive(ann);
        }
    }

    /// A directive on its own line inside a modifier run.
    fn inline_directive(&mut self, ann: NodeId) {
        let format = self.tree.format(ann);
        self.separate(format.newlines(), false);
        self.annotation_body(ann);
        let end = format.end_newlines();
        if end > 0 {
            self.separate(end, false);
        }
    }
}
