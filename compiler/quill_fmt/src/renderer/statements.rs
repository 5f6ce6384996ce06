//! Control-flow and jump statements.

use quill_ir::{AnnotationPosition, NodeId, NodeKind};

use super::{Lead, Renderer};
use crate::flags::RenderFlags;
use crate::writer::CodeWriter;

impl<W: CodeWriter + ?Sized> Renderer<'_, '_, W> {
    pub(super) fn statement(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::If(stmt) => {
                self.text("if");
                self.operand(stmt.condition);
                self.body(id, &stmt.body);
                if let Some(else_clause) = stmt.else_clause {
                    self.node(else_clause, RenderFlags::empty());
                }
            }
            NodeKind::Else(stmt) => {
                self.text("else");
                self.body(id, &stmt.body);
            }
            NodeKind::While(stmt) => {
                self.text("while");
                self.operand(stmt.condition);
                self.body(id, &stmt.body);
            }
            NodeKind::DoWhile(stmt) => {
                self.text("do");
                self.body(id, &stmt.body);
                if !self.description {
                    for ann in self.annotations(id, AnnotationPosition::Infix) {
                        if tree.annotation(ann).is_some_and(|a| a.anchor == 1) {
                            self.separate(self.newlines(ann), self.is_tight(ann));
                            self.annotation_body(ann);
                        }
                    }
                }
                self.separate(stmt.while_newlines, false);
                self.text("while");
                self.operand(stmt.condition);
            }
            NodeKind::Compound(stmt) => {
                self.text(stmt.keyword.as_str());
                if let Some(header) = &stmt.header {
                    self.run(header, Lead::Inline);
                }
                self.body(id, &stmt.body);
            }
            NodeKind::Switch(stmt) => {
                self.text("switch");
                self.operand(stmt.value);
                self.body(id, &stmt.body);
            }
            NodeKind::Case(case) => {
                match &case.value {
                    Some(value) => {
                        self.text("case");
                        self.run(value, Lead::Inline);
                    }
                    None => self.text("default"),
                }
                self.text(":");
                self.body(id, &case.body);
            }
            NodeKind::Return(stmt) => {
                self.text("return");
                if let Some(value) = stmt.value {
                    self.operand(value);
                }
            }
            NodeKind::Break => self.text("break"),
            NodeKind::Continue => self.text("continue"),
            NodeKind::Goto(stmt) => {
                self.text("goto");
                self.run(&stmt.target, Lead::Inline);
            }
            NodeKind::Label(label) => {
                self.text(&label.name);
                self.text(":");
            }
            NodeKind::BlockStmt(block) => self.block(id, block),
            NodeKind::Empty => self.text(";"),
            _ => {}
        }
    }
}
