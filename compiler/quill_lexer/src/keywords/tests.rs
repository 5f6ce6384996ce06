use super::*;
use quill_ir::Modifier;

#[test]
fn every_modifier_keyword_resolves() {
    for modifier in Modifier::ALL {
        let kind = lookup(modifier.keyword());
        assert_eq!(
            kind.and_then(TokenKind::modifier),
            Some(modifier),
            "{}",
            modifier.keyword()
        );
    }
}

#[test]
fn statement_keywords_resolve() {
    assert_eq!(lookup("if"), Some(TokenKind::If));
    assert_eq!(lookup("foreach"), Some(TokenKind::Foreach));
    assert_eq!(lookup("namespace"), Some(TokenKind::Namespace));
    assert_eq!(lookup("goto"), Some(TokenKind::Goto));
}

#[test]
fn near_misses_are_identifiers() {
    assert_eq!(lookup("If"), None);
    assert_eq!(lookup("iff"), None);
    assert_eq!(lookup("x"), None);
    assert_eq!(lookup("var"), None);
    assert_eq!(lookup("namespaces"), None);
    assert_eq!(lookup("@class"), None);
}
