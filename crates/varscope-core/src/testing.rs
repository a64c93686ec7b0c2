//! Hand-built trees for unit tests.

use crate::tree::{NodeId, NodeKind, NodeShape, Span, SyntaxTree, SyntaxTreeBuilder};

/// Kind codes used by sketched trees.
pub(crate) fn kind(name: &'static str) -> NodeKind {
    let code = match name {
        "class_declaration" => 1,
        "class_body" => 2,
        "field_declaration" => 3,
        "method_declaration" => 4,
        "formal_parameter" => 5,
        "block" => 6,
        "local_variable_declaration" => 7,
        "catch_clause" => 8,
        "for_statement" => 9,
        "expression_statement" => 10,
        _ => 99,
    };
    NodeKind::new(code, name)
}

/// Small builder wrapper that renders declaration text automatically.
pub(crate) struct TreeSketch {
    builder: SyntaxTreeBuilder,
    root: NodeId,
}

impl TreeSketch {
    pub(crate) fn new(root_kind: &'static str) -> Self {
        Self::with_text(root_kind, root_kind)
    }

    pub(crate) fn with_text(root_kind: &'static str, text: &str) -> Self {
        let mut builder = SyntaxTreeBuilder::new();
        let root = builder
            .root(kind(root_kind), NodeShape::Other, text, Span::default())
            .unwrap();
        TreeSketch { builder, root }
    }

    /// A tree whose root is itself a field declaration.
    pub(crate) fn field_root(declared_type: &str, names: &[&str]) -> SyntaxTree {
        let mut builder = SyntaxTreeBuilder::new();
        builder
            .root(
                kind("field_declaration"),
                NodeShape::FieldDeclaration {
                    declared_type: declared_type.to_string(),
                    names: names.iter().map(|n| n.to_string()).collect(),
                },
                format!("{} {};", declared_type, names.join(", ")),
                Span::default(),
            )
            .unwrap();
        builder.finish().unwrap()
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn other(&mut self, parent: NodeId, kind_name: &'static str) -> NodeId {
        self.other_with_text(parent, kind_name, kind_name)
    }

    pub(crate) fn other_with_text(
        &mut self,
        parent: NodeId,
        kind_name: &'static str,
        text: &str,
    ) -> NodeId {
        self.builder
            .child(parent, kind(kind_name), NodeShape::Other, text, Span::default())
            .unwrap()
    }

    pub(crate) fn method(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.builder
            .child(
                parent,
                kind("method_declaration"),
                NodeShape::MethodDeclaration,
                text,
                Span::default(),
            )
            .unwrap()
    }

    pub(crate) fn field(&mut self, parent: NodeId, declared_type: &str, names: &[&str]) -> NodeId {
        let shape = NodeShape::FieldDeclaration {
            declared_type: declared_type.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        };
        let text = format!("{} {};", declared_type, names.join(", "));
        self.builder
            .child(parent, kind("field_declaration"), shape, text, Span::default())
            .unwrap()
    }

    pub(crate) fn single(&mut self, parent: NodeId, declared_type: &str, name: &str) -> NodeId {
        let shape = NodeShape::SingleVariableDeclaration {
            declared_type: declared_type.to_string(),
            name: name.to_string(),
        };
        let text = format!("{} {}", declared_type, name);
        self.builder
            .child(parent, kind("formal_parameter"), shape, text, Span::default())
            .unwrap()
    }

    pub(crate) fn local_statement(
        &mut self,
        parent: NodeId,
        declared_type: &str,
        names: &[&str],
    ) -> NodeId {
        let shape = NodeShape::VariableDeclarationStatement {
            declared_type: declared_type.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        };
        let text = format!("{} {};", declared_type, names.join(", "));
        self.builder
            .child(
                parent,
                kind("local_variable_declaration"),
                shape,
                text,
                Span::default(),
            )
            .unwrap()
    }

    pub(crate) fn local_expression(
        &mut self,
        parent: NodeId,
        declared_type: &str,
        names: &[&str],
    ) -> NodeId {
        let shape = NodeShape::VariableDeclarationExpression {
            declared_type: declared_type.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        };
        let text = format!("{} {}", declared_type, names.join(", "));
        self.builder
            .child(
                parent,
                kind("local_variable_declaration"),
                shape,
                text,
                Span::default(),
            )
            .unwrap()
    }

    pub(crate) fn finish(self) -> SyntaxTree {
        self.builder.finish().unwrap()
    }
}

/// The class used throughout the scope tests:
///
/// ```text
/// class A {
///     int x;
///     void m(int y) { int z = 1; }
///     void n() { }
/// }
/// ```
pub(crate) struct ClassFixture {
    pub(crate) tree: SyntaxTree,
    pub(crate) class_body: NodeId,
    pub(crate) field: NodeId,
    pub(crate) method: NodeId,
    pub(crate) param: NodeId,
    pub(crate) method_body: NodeId,
    pub(crate) local: NodeId,
    pub(crate) sibling: NodeId,
    pub(crate) sibling_body: NodeId,
}

impl ClassFixture {
    pub(crate) fn build() -> Self {
        let mut sketch = TreeSketch::with_text(
            "class_declaration",
            "class A { int x; void m(int y) { int z = 1; } void n() { } }",
        );
        let root = sketch.root();
        let class_body = sketch.other_with_text(
            root,
            "class_body",
            "{ int x; void m(int y) { int z = 1; } void n() { } }",
        );
        let field = sketch.field(class_body, "int", &["x"]);
        let method = sketch.method(class_body, "void m(int y) { int z = 1; }");
        let param = sketch.single(method, "int", "y");
        let method_body = sketch.other_with_text(method, "block", "{ int z = 1; }");
        let local = sketch.local_statement(method_body, "int", &["z"]);
        let sibling = sketch.method(class_body, "void n() { }");
        let sibling_body = sketch.other_with_text(sibling, "block", "{ }");
        ClassFixture {
            tree: sketch.finish(),
            class_body,
            field,
            method,
            param,
            method_body,
            local,
            sibling,
            sibling_body,
        }
    }
}
