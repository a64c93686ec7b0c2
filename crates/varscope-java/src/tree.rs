// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Java tree provider backed by tree-sitter-java.
//!
//! Converts the concrete tree-sitter tree into a varscope [`SyntaxTree`]:
//! only named nodes are kept, declaration nodes get their [`NodeShape`], and
//! each node's text is its source slice with whitespace runs collapsed to one
//! space.
//!
//! # Shape mapping
//!
//! | tree-sitter kind                                   | Shape                            |
//! |----------------------------------------------------|----------------------------------|
//! | `field_declaration`, `constant_declaration`        | `FieldDeclaration`               |
//! | `formal_parameter`, `spread_parameter`, `catch_formal_parameter` | `SingleVariableDeclaration` |
//! | `enhanced_for_statement` (synthetic child)         | `SingleVariableDeclaration`      |
//! | `local_variable_declaration` under `for_statement` | `VariableDeclarationExpression`  |
//! | `local_variable_declaration` elsewhere             | `VariableDeclarationStatement`   |
//! | `resource` with a declared type                    | `VariableDeclarationExpression`  |
//! | `method_declaration`, `constructor_declaration`, `compact_constructor_declaration` | `MethodDeclaration` |
//!
//! `formal_parameters` and `resource_specification` are elided so that
//! parameters hang directly off their method and resources off their `try`.
//!
//! # Snippets
//!
//! Parse kinds other than [`ParseKind::CompilationUnit`] are wrapped in a
//! synthetic class (and method, for statements) before parsing; the arena is
//! rooted at the snippet's own node and all offsets are reported relative to
//! the caller's text. Caller text that parses outside the snippet node, such
//! as a second method or a stray closing brace, is a parse error.

use tracing::debug;
use tree_sitter::{Node, Parser};

use varscope_core::error::{Result, VarScopeError};
use varscope_core::provider::{ParseKind, TreeProvider};
use varscope_core::tree::{NodeId, NodeKind, NodeShape, Span, SyntaxTree, SyntaxTreeBuilder};

/// Kind of the synthetic node carrying an enhanced-for binding.
pub const ENHANCED_FOR_VARIABLE: NodeKind = NodeKind::new(-2, "enhanced_for_variable");

const WRAPPER_CLASS: &str = "class __VarscopeSnippet__ {\n";
const WRAPPER_METHOD: &str = "class __VarscopeSnippet__ {\nvoid __varscope__() {\n";
const WRAPPER_FIELD: &str = "class __VarscopeSnippet__ {\nObject __varscope__ =\n";

/// Parses Java source with tree-sitter-java.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaTreeProvider;

impl JavaTreeProvider {
    pub fn new() -> Self {
        JavaTreeProvider
    }
}

impl TreeProvider for JavaTreeProvider {
    fn parse_str(&self, code: &str, kind: ParseKind) -> Result<SyntaxTree> {
        let wrapped = Wrapped::new(code, kind);
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|e| VarScopeError::parse(0, format!("failed to load Java grammar: {}", e)))?;
        let ts_tree = parser
            .parse(&wrapped.source, None)
            .ok_or_else(|| VarScopeError::parse(0, "parser produced no tree"))?;

        let ts_root = ts_tree.root_node();
        if ts_root.has_error() {
            return Err(wrapped.syntax_error(ts_root));
        }
        let snippet = wrapped
            .snippet_root(ts_root)
            .ok_or_else(|| VarScopeError::parse(0, format!("source is not a {}", kind)))?;
        wrapped.ensure_contained(ts_root, snippet)?;

        let tree = Converter::new(&wrapped).convert(snippet)?;
        debug!(%kind, bytes = code.len(), nodes = tree.len(), "parsed java");
        Ok(tree)
    }
}

/// Resolve a tree provider by file suffix (`java`, `.java`, `JAVA`).
pub fn provider_for_suffix(suffix: &str) -> Result<JavaTreeProvider> {
    match suffix.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "java" => Ok(JavaTreeProvider),
        _ => Err(VarScopeError::unsupported_language(suffix)),
    }
}

// ============================================================================
// Wrapping
// ============================================================================

/// Source text as handed to tree-sitter, with the wrapper prefix length.
struct Wrapped {
    source: String,
    prefix: usize,
    code_len: usize,
    kind: ParseKind,
}

impl Wrapped {
    fn new(code: &str, kind: ParseKind) -> Self {
        let (prefix, suffix) = match kind {
            ParseKind::CompilationUnit => ("", ""),
            ParseKind::ClassBody | ParseKind::Method => (WRAPPER_CLASS, "\n}\n"),
            ParseKind::Statements => (WRAPPER_METHOD, "\n}\n}\n"),
            ParseKind::Expression => (WRAPPER_FIELD, "\n;\n}\n"),
        };
        Wrapped {
            source: format!("{}{}{}", prefix, code, suffix),
            prefix: prefix.len(),
            code_len: code.len(),
            kind,
        }
    }

    /// Offset in the caller's text for an offset in the wrapped source.
    fn offset(&self, wrapped_offset: usize) -> usize {
        wrapped_offset.saturating_sub(self.prefix).min(self.code_len)
    }

    fn span(&self, node: Node) -> Span {
        Span::new(self.offset(node.start_byte()), self.offset(node.end_byte()))
    }

    fn text(&self, node: Node) -> String {
        collapse_whitespace(&self.source[node.byte_range()])
    }

    /// The node the arena is rooted at.
    fn snippet_root<'t>(&self, program: Node<'t>) -> Option<Node<'t>> {
        if self.kind == ParseKind::CompilationUnit {
            return Some(program);
        }
        let class = first_named_child(program, |n| n.kind() == "class_declaration")?;
        let body = class.child_by_field_name("body")?;
        match self.kind {
            ParseKind::CompilationUnit | ParseKind::ClassBody => Some(body),
            ParseKind::Method => first_named_child(body, |n| {
                matches!(n.kind(), "method_declaration" | "constructor_declaration")
            }),
            ParseKind::Statements => {
                let method = first_named_child(body, |n| n.kind() == "method_declaration")?;
                method.child_by_field_name("body")
            }
            ParseKind::Expression => {
                let field = first_named_child(body, |n| n.kind() == "field_declaration")?;
                field
                    .child_by_field_name("declarator")?
                    .child_by_field_name("value")
            }
        }
    }

    /// Reject caller text that parsed outside the snippet node, such as a
    /// second method, or statements that close the synthetic method early.
    fn ensure_contained(&self, program: Node, snippet: Node) -> Result<()> {
        if self.kind == ParseKind::CompilationUnit {
            return Ok(());
        }
        let code = self.prefix..self.prefix + self.code_len;
        let inside = snippet.byte_range();
        let mut stack = vec![program];
        while let Some(node) = stack.pop() {
            let range = node.byte_range();
            if range.end <= code.start || range.start >= code.end {
                continue;
            }
            if inside.start <= range.start && range.end <= inside.end {
                continue;
            }
            if is_comment(node) {
                continue;
            }
            if node.child_count() == 0 {
                let text: String = self.text(node).chars().take(40).collect();
                return Err(VarScopeError::parse(
                    self.offset(range.start),
                    format!("'{}' lies outside the {} snippet", text, self.kind),
                ));
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// Build a parse error for the first ERROR or MISSING node.
    fn syntax_error(&self, root: Node) -> VarScopeError {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.is_missing() {
                return VarScopeError::parse(
                    self.offset(node.start_byte()),
                    format!("missing {}", node.kind()),
                );
            }
            if node.is_error() {
                let text: String = self.text(node).chars().take(40).collect();
                return VarScopeError::parse(
                    self.offset(node.start_byte()),
                    format!("unexpected '{}'", text),
                );
            }
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
        VarScopeError::parse(self.offset(root.start_byte()), "syntax error")
    }
}

fn first_named_child<'t>(node: Node<'t>, pred: impl Fn(&Node<'t>) -> bool) -> Option<Node<'t>> {
    node.named_children(&mut node.walk()).find(pred)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Conversion
// ============================================================================

struct Converter<'w> {
    wrapped: &'w Wrapped,
    builder: SyntaxTreeBuilder,
}

impl<'w> Converter<'w> {
    fn new(wrapped: &'w Wrapped) -> Self {
        Converter {
            wrapped,
            builder: SyntaxTreeBuilder::new(),
        }
    }

    /// Convert the subtree rooted at `root`, preorder with an explicit stack.
    fn convert(mut self, root: Node) -> Result<SyntaxTree> {
        let mut stack: Vec<(Node, Option<NodeId>)> = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let attach_to = if is_elided(node) && parent.is_some() {
                parent
            } else {
                let id = self.add(node, parent)?;
                if node.kind() == "enhanced_for_statement" {
                    self.add_enhanced_for_variable(node, id)?;
                }
                Some(id)
            };
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                stack.push((child, attach_to));
            }
        }
        self.builder.finish()
    }

    fn add(&mut self, node: Node, parent: Option<NodeId>) -> Result<NodeId> {
        let kind = NodeKind::new(i32::from(node.kind_id()), node.kind());
        let shape = self.shape(node);
        let text = self.wrapped.text(node);
        let span = self.wrapped.span(node);
        match parent {
            Some(parent) => self.builder.child(parent, kind, shape, text, span),
            None => self.builder.root(kind, shape, text, span),
        }
    }

    fn add_enhanced_for_variable(&mut self, node: Node, owner: NodeId) -> Result<()> {
        let (Some(ty), Some(name_node)) = (
            node.child_by_field_name("type"),
            node.child_by_field_name("name"),
        ) else {
            return Err(VarScopeError::shape_mismatch(
                node.kind(),
                "enhanced for without type or name",
            ));
        };
        let declared_type = self.wrapped.text(ty);
        let name = self.wrapped.text(name_node);
        let text = format!("{} {}", declared_type, name);
        let span = Span::new(
            self.wrapped.offset(ty.start_byte()),
            self.wrapped.offset(name_node.end_byte()),
        );
        self.builder.child(
            owner,
            ENHANCED_FOR_VARIABLE,
            NodeShape::SingleVariableDeclaration {
                declared_type,
                name,
            },
            text,
            span,
        )?;
        Ok(())
    }

    fn shape(&self, node: Node) -> NodeShape {
        let w = self.wrapped;
        let field_text = |field: &str| node.child_by_field_name(field).map(|n| w.text(n));
        match node.kind() {
            "field_declaration" | "constant_declaration" => NodeShape::FieldDeclaration {
                declared_type: field_text("type").unwrap_or_default(),
                names: self.declarator_names(node),
            },
            "local_variable_declaration" => {
                let declared_type = field_text("type").unwrap_or_default();
                let names = self.declarator_names(node);
                let in_for_init = node
                    .parent()
                    .is_some_and(|parent| parent.kind() == "for_statement");
                if in_for_init {
                    NodeShape::VariableDeclarationExpression {
                        declared_type,
                        names,
                    }
                } else {
                    NodeShape::VariableDeclarationStatement {
                        declared_type,
                        names,
                    }
                }
            }
            "formal_parameter" | "catch_formal_parameter" => NodeShape::SingleVariableDeclaration {
                declared_type: field_text("type")
                    .or_else(|| self.named_child_text(node, "catch_type"))
                    .unwrap_or_default(),
                name: field_text("name").unwrap_or_default(),
            },
            "spread_parameter" => NodeShape::SingleVariableDeclaration {
                declared_type: self.spread_type(node).unwrap_or_default(),
                name: self
                    .declarator_names(node)
                    .into_iter()
                    .next()
                    .unwrap_or_default(),
            },
            "resource" => match (field_text("type"), field_text("name")) {
                (Some(declared_type), Some(name)) => NodeShape::VariableDeclarationExpression {
                    declared_type,
                    names: vec![name],
                },
                _ => NodeShape::Other,
            },
            "method_declaration"
            | "constructor_declaration"
            | "compact_constructor_declaration" => NodeShape::MethodDeclaration,
            _ => NodeShape::Other,
        }
    }

    /// Names of every `variable_declarator` directly under `node`.
    fn declarator_names(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        let declarators: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "variable_declarator")
            .collect();
        declarators
            .into_iter()
            .filter_map(|declarator| declarator.child_by_field_name("name"))
            .map(|name| self.wrapped.text(name))
            .collect()
    }

    fn named_child_text(&self, node: Node, kind: &str) -> Option<String> {
        first_named_child(node, |child| child.kind() == kind).map(|child| self.wrapped.text(child))
    }

    /// The type of a varargs parameter: its first child that is not a
    /// modifier, annotation, or the declarator itself.
    fn spread_type(&self, node: Node) -> Option<String> {
        first_named_child(node, |child| {
            !matches!(
                child.kind(),
                "modifiers" | "annotation" | "marker_annotation" | "variable_declarator"
            )
        })
        .map(|child| self.wrapped.text(child))
    }
}

fn is_comment(node: Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment")
}

fn is_elided(node: Node) -> bool {
    matches!(node.kind(), "formal_parameters" | "resource_specification")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use varscope_core::classify::variable_scopes;
    use varscope_core::model::{ScopeKind, Variable};

    fn parse(code: &str) -> SyntaxTree {
        JavaTreeProvider.parse_str(code, ParseKind::CompilationUnit).unwrap()
    }

    fn declared(tree: &SyntaxTree) -> Vec<(String, Variable)> {
        variable_scopes(tree, tree.root())
            .entries()
            .map(|(owner, variable)| (tree.kind(owner).name.to_string(), variable.clone()))
            .collect()
    }

    mod shapes {
        use super::*;

        #[test]
        fn field_declarators_become_one_field_shape() {
            let tree = parse("class A { private int a, b = 2; }");
            let field = tree.find_kind("field_declaration").unwrap();
            assert_eq!(
                tree.shape(field),
                &NodeShape::FieldDeclaration {
                    declared_type: "int".to_string(),
                    names: vec!["a".to_string(), "b".to_string()],
                }
            );
            assert_eq!(tree.text(field), "private int a, b = 2;");
        }

        #[test]
        fn interface_constants_are_fields() {
            let tree = parse("interface I { int LIMIT = 10; }");
            let decls = declared(&tree);
            assert_eq!(decls.len(), 1);
            assert_eq!(decls[0].1, Variable::new("LIMIT", "int", ScopeKind::Class));
        }

        #[test]
        fn parameters_attach_directly_to_method() {
            let tree = parse("class A { void m(int a, String... rest) { } }");
            assert!(tree.find_kind("formal_parameters").is_none());
            let decls = declared(&tree);
            assert!(decls.contains(&(
                "method_declaration".to_string(),
                Variable::new("a", "int", ScopeKind::Method)
            )));
            assert!(decls.contains(&(
                "method_declaration".to_string(),
                Variable::new("rest", "String", ScopeKind::Method)
            )));
        }

        #[test]
        fn constructor_parameters_are_method_scoped() {
            let tree = parse("class A { A(long id) { } }");
            assert_eq!(
                declared(&tree),
                vec![(
                    "constructor_declaration".to_string(),
                    Variable::new("id", "long", ScopeKind::Method)
                )]
            );
        }

        #[test]
        fn catch_parameter_is_local_to_catch_clause() {
            let tree =
                parse("class A { void m() { try { } catch (java.io.IOException e) { } } }");
            assert!(declared(&tree).contains(&(
                "catch_clause".to_string(),
                Variable::new("e", "java.io.IOException", ScopeKind::Local)
            )));
        }

        #[test]
        fn enhanced_for_gets_synthetic_binding() {
            let tree = parse("class A { void m(int[] xs) { for (int x : xs) { } } }");
            let binding = tree.find_kind("enhanced_for_variable").unwrap();
            assert_eq!(tree.kind(binding).code, -2);
            assert_eq!(tree.text(binding), "int x");
            assert!(declared(&tree).contains(&(
                "enhanced_for_statement".to_string(),
                Variable::new("x", "int", ScopeKind::Local)
            )));
        }

        #[test]
        fn for_init_is_an_expression_declaration() {
            let tree = parse("class A { void m() { for (int i = 0, j = 1; i < j; i++) { } } }");
            let init = tree.find_kind("local_variable_declaration").unwrap();
            assert!(matches!(
                tree.shape(init),
                NodeShape::VariableDeclarationExpression { names, .. } if names.len() == 2
            ));
        }

        #[test]
        fn block_local_is_a_statement_declaration() {
            let tree = parse("class A { void m() { final String s = \"\"; } }");
            let local = tree.find_kind("local_variable_declaration").unwrap();
            assert!(matches!(
                tree.shape(local),
                NodeShape::VariableDeclarationStatement { declared_type, .. }
                    if declared_type == "String"
            ));
        }

        #[test]
        fn typed_resources_attach_to_try() {
            let tree = parse(
                "class A { void m() throws Exception { try (java.io.Reader r = open()) { } } }",
            );
            assert!(tree.find_kind("resource_specification").is_none());
            assert!(declared(&tree).contains(&(
                "try_with_resources_statement".to_string(),
                Variable::new("r", "java.io.Reader", ScopeKind::Local)
            )));
        }

        #[test]
        fn generic_types_keep_their_arguments() {
            let tree = parse("class A { java.util.Map<String, Integer> m; }");
            assert_eq!(
                declared(&tree)[0].1,
                Variable::new("m", "java.util.Map<String, Integer>", ScopeKind::Class)
            );
        }
    }

    mod text {
        use super::*;

        #[test]
        fn whitespace_is_collapsed() {
            assert_eq!(collapse_whitespace("  int\n\t x  =\n1; "), "int x = 1;");
            let a = parse("class A {\n    int x;\n}");
            let b = parse("class A { int x; }");
            assert_eq!(a.text(a.root()), b.text(b.root()));
        }

        #[test]
        fn kind_codes_come_from_the_grammar() {
            let a = parse("class A { int x; }");
            let b = parse("class B { void m() { } }");
            let a_class = a.find_kind("class_declaration").unwrap();
            let b_class = b.find_kind("class_declaration").unwrap();
            assert_eq!(a.kind(a_class).code, b.kind(b_class).code);
            assert!(a.kind(a_class).code >= 0);
        }
    }

    mod snippets {
        use super::*;

        #[test]
        fn class_body_is_rooted_at_the_body() {
            let tree = JavaTreeProvider
                .parse_str("int x; void m() { }", ParseKind::ClassBody)
                .unwrap();
            assert_eq!(tree.kind(tree.root()).name, "class_body");
            assert_eq!(tree.parent_kind_code(tree.root()), -1);
            assert_eq!(tree.node(tree.root()).span().start, 0);
        }

        #[test]
        fn method_is_rooted_at_the_declaration() {
            let tree = JavaTreeProvider
                .parse_str("int twice(int v) { return v * 2; }", ParseKind::Method)
                .unwrap();
            assert_eq!(tree.kind(tree.root()).name, "method_declaration");
            assert_eq!(tree.text(tree.root()), "int twice(int v) { return v * 2; }");
        }

        #[test]
        fn statements_are_rooted_at_the_block() {
            let tree = JavaTreeProvider
                .parse_str("int a = 1; int b = a;", ParseKind::Statements)
                .unwrap();
            assert_eq!(tree.kind(tree.root()).name, "block");
            let decls = variable_scopes(&tree, tree.root());
            assert_eq!(decls.get(tree.root()).unwrap().len(), 2);
        }

        #[test]
        fn expression_is_rooted_at_the_value() {
            let tree = JavaTreeProvider
                .parse_str("a + b", ParseKind::Expression)
                .unwrap();
            assert_eq!(tree.kind(tree.root()).name, "binary_expression");
            assert_eq!(tree.text(tree.root()), "a + b");
        }

        fn outside_offset(code: &str, kind: ParseKind) -> usize {
            match JavaTreeProvider.parse_str(code, kind).unwrap_err() {
                VarScopeError::Parse { offset, .. } => offset,
                other => panic!("expected Parse, got {:?}", other),
            }
        }

        #[test]
        fn statements_closing_the_method_are_rejected() {
            let code = "int a = 1; } int leaked; void other() { int b = 2;";
            assert_eq!(outside_offset(code, ParseKind::Statements), 13);
        }

        #[test]
        fn expression_followed_by_a_declaration_is_rejected() {
            assert_eq!(outside_offset("a + b; int q = 3", ParseKind::Expression), 5);
        }

        #[test]
        fn second_method_is_rejected() {
            let code = "void a() { int x; } void b(int y) { int z; }";
            assert_eq!(outside_offset(code, ParseKind::Method), 20);
        }

        #[test]
        fn class_body_closing_the_class_is_rejected() {
            let code = "int x; } class Other { int y;";
            assert_eq!(outside_offset(code, ParseKind::ClassBody), 9);
        }

        #[test]
        fn surrounding_comments_are_allowed() {
            let tree = JavaTreeProvider
                .parse_str("// doc\nvoid m() { } /* end */", ParseKind::Method)
                .unwrap();
            assert_eq!(tree.kind(tree.root()).name, "method_declaration");
            let tree = JavaTreeProvider
                .parse_str("  a + b  // trailing", ParseKind::Expression)
                .unwrap();
            assert_eq!(tree.text(tree.root()), "a + b");
        }

        #[test]
        fn method_kind_without_a_method_is_an_error() {
            let err = JavaTreeProvider
                .parse_str("int x;", ParseKind::Method)
                .unwrap_err();
            assert!(matches!(err, VarScopeError::Parse { .. }));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn only_java_is_supported() {
            assert!(provider_for_suffix(".java").is_ok());
            assert!(matches!(
                provider_for_suffix("kt"),
                Err(VarScopeError::UnsupportedLanguage { .. })
            ));
        }

        #[test]
        fn syntax_error_reports_offset_in_caller_text() {
            let err = JavaTreeProvider
                .parse_str("class A { int x = ; }", ParseKind::CompilationUnit)
                .unwrap_err();
            match err {
                VarScopeError::Parse { offset, .. } => assert!(offset <= 21),
                other => panic!("expected Parse, got {:?}", other),
            }
        }

        #[test]
        fn snippet_errors_are_relative_to_the_snippet() {
            let err = JavaTreeProvider
                .parse_str("int = ;", ParseKind::Statements)
                .unwrap_err();
            match err {
                VarScopeError::Parse { offset, .. } => assert!(offset <= "int = ;".len()),
                other => panic!("expected Parse, got {:?}", other),
            }
        }
    }
}
