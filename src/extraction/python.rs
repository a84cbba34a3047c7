//! Tree-sitter based fact extraction for Python sources.
//!
//! Walks the module's top-level statements and maps grammar node kinds onto
//! the fixed [`FactRecord`] schema. Methods are collected one level deep
//! (functions directly inside a class body); nested functions only
//! contribute to the branch complexity of their enclosing definition.

use crate::core::{ClassFact, FactRecord, FunctionFact};
use crate::errors::{FragmapError, Result};
use tree_sitter::{Language, Node, Parser, Tree, TreeCursor};

/// Node kinds that add one to a function's branch complexity
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "for_statement",
    "while_statement",
    "except_clause",
    "except_group_clause",
];

fn parse_tree(source_id: &str, content: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    let language: Language = tree_sitter_python::LANGUAGE.into();
    parser
        .set_language(&language)
        .map_err(|e| FragmapError::parse(source_id, e.to_string()))?;

    parser
        .parse(content, None)
        .ok_or_else(|| FragmapError::parse(source_id, "parser produced no tree"))
}

/// Extract facts, failing on any syntax error in the source.
pub fn try_extract(source_id: &str, content: &str) -> Result<FactRecord> {
    let loc = content.lines().count();
    let tree = parse_tree(source_id, content)?;
    let root = tree.root_node();

    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(FragmapError::parse(
            source_id,
            format!("syntax error near line {line}"),
        ));
    }

    let visitor = FactVisitor::new(content);
    let mut record = FactRecord::empty(source_id, loc);

    let mut cursor = root.walk();
    for stmt in root.named_children(&mut cursor) {
        match stmt.kind() {
            "import_statement" | "import_from_statement" | "future_import_statement" => {
                record.imports.extend(visitor.import_refs(stmt));
            }
            "function_definition" => record.functions.push(visitor.function(stmt, Vec::new())),
            "class_definition" => record.classes.push(visitor.class(stmt, Vec::new())),
            "decorated_definition" => {
                let decorators = visitor.decorators(stmt);
                match stmt.child_by_field_name("definition") {
                    Some(def) if def.kind() == "function_definition" => {
                        record.functions.push(visitor.function(def, decorators))
                    }
                    Some(def) if def.kind() == "class_definition" => {
                        record.classes.push(visitor.class(def, decorators))
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    Ok(record)
}

/// Extract facts, recovering from parse failures.
///
/// Unparseable input yields a record with only `loc` populated; the failure
/// is logged and never propagated.
pub fn extract(source_id: &str, content: &str) -> FactRecord {
    match try_extract(source_id, content) {
        Ok(record) => record,
        Err(e) => {
            log::warn!("{e}; recording {source_id} without structural facts");
            FactRecord::empty(source_id, content.lines().count())
        }
    }
}

fn first_error_line(root: Node) -> Option<usize> {
    let mut cursor = root.walk();
    find_error(&mut cursor).map(|node| node.start_position().row + 1)
}

fn find_error<'t>(cursor: &mut TreeCursor<'t>) -> Option<Node<'t>> {
    let node = cursor.node();
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    if cursor.goto_first_child() {
        loop {
            if let Some(found) = find_error(cursor) {
                return Some(found);
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
    None
}

/// `async for` shares the `for_statement` kind but is not counted.
fn is_branch(node: Node) -> bool {
    if !BRANCH_KINDS.contains(&node.kind()) {
        return false;
    }
    node.kind() != "for_statement"
        || node.child(0).map_or(true, |first| first.kind() != "async")
}

/// Count branch constructs in the full subtree rooted at `node`.
pub(crate) fn count_branches(node: Node) -> u32 {
    let mut cursor = node.walk();
    let mut count = 0;

    loop {
        if is_branch(cursor.node()) {
            count += 1;
        }
        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return count;
            }
        }
    }
}

struct FactVisitor<'a> {
    source: &'a str,
}

impl<'a> FactVisitor<'a> {
    fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn text(&self, node: Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    /// One normalized reference per imported name.
    ///
    /// `import a.b as c` → `a.b`, `from x import y` → `x.y`,
    /// `from . import y` → `.y`, `from x import *` → `x`.
    fn import_refs(&self, stmt: Node) -> Vec<String> {
        let mut refs = Vec::new();
        let mut cursor = stmt.walk();

        match stmt.kind() {
            "import_statement" => {
                for name in stmt.children_by_field_name("name", &mut cursor) {
                    refs.push(self.imported_name(name).to_string());
                }
            }
            _ => {
                let module = if stmt.kind() == "future_import_statement" {
                    "__future__"
                } else {
                    stmt.child_by_field_name("module_name")
                        .map(|m| self.text(m))
                        .unwrap_or_default()
                };

                for name in stmt.children_by_field_name("name", &mut cursor) {
                    refs.push(join_module(module, self.imported_name(name)));
                }
                if refs.is_empty() {
                    // wildcard import
                    refs.push(module.to_string());
                }
            }
        }

        refs
    }

    fn imported_name(&self, node: Node) -> &'a str {
        match node.kind() {
            "aliased_import" => node
                .child_by_field_name("name")
                .map(|n| self.text(n))
                .unwrap_or_default(),
            _ => self.text(node),
        }
    }

    fn function(&self, node: Node, decorators: Vec<String>) -> FunctionFact {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let is_async = node.child(0).is_some_and(|c| c.kind() == "async");

        FunctionFact {
            name,
            args: node
                .child_by_field_name("parameters")
                .map(|p| self.parameters(p))
                .unwrap_or_default(),
            has_docstring: node
                .child_by_field_name("body")
                .is_some_and(has_docstring),
            is_async,
            decorators,
            branch_complexity: 1 + count_branches(node),
        }
    }

    fn parameters(&self, params: Node) -> Vec<String> {
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .filter_map(|param| match param.kind() {
                "identifier" => Some(self.text(param).to_string()),
                "default_parameter" | "typed_default_parameter" => param
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string()),
                "typed_parameter" => param
                    .named_child(0)
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| self.text(n).to_string()),
                _ => None,
            })
            .collect()
    }

    fn class(&self, node: Node, decorators: Vec<String>) -> ClassFact {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();

        let base_types = node
            .child_by_field_name("superclasses")
            .map(|args| {
                let mut cursor = args.walk();
                args.named_children(&mut cursor)
                    .filter(|arg| matches!(arg.kind(), "identifier" | "attribute"))
                    .map(|arg| self.text(arg).to_string())
                    .collect()
            })
            .unwrap_or_default();

        let body = node.child_by_field_name("body");
        let methods = body.map(|b| self.methods(b)).unwrap_or_default();

        ClassFact {
            name,
            base_types,
            methods,
            has_docstring: body.is_some_and(has_docstring),
            decorators,
        }
    }

    fn methods(&self, body: Node) -> Vec<FunctionFact> {
        let mut cursor = body.walk();
        body.named_children(&mut cursor)
            .filter_map(|item| match item.kind() {
                "function_definition" => Some(self.function(item, Vec::new())),
                "decorated_definition" => item
                    .child_by_field_name("definition")
                    .filter(|def| def.kind() == "function_definition")
                    .map(|def| self.function(def, self.decorators(item))),
                _ => None,
            })
            .collect()
    }

    fn decorators(&self, decorated: Node) -> Vec<String> {
        let mut cursor = decorated.walk();
        decorated
            .named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|decorator| {
                decorator
                    .named_child(0)
                    .map(|expr| self.decorator_name(expr))
                    .unwrap_or_else(|| "decorator".to_string())
            })
            .collect()
    }

    /// `@name` → `name`, `@a.b` → `a.b`, `@name(...)` → `name`
    fn decorator_name(&self, expr: Node) -> String {
        match expr.kind() {
            "identifier" | "attribute" => self.text(expr).to_string(),
            "call" => expr
                .child_by_field_name("function")
                .map(|f| self.decorator_name(f))
                .unwrap_or_else(|| "decorator".to_string()),
            _ => "decorator".to_string(),
        }
    }
}

fn join_module(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else if module.ends_with('.') {
        format!("{module}{name}")
    } else {
        format!("{module}.{name}")
    }
}

/// True when the first statement of a block is a bare string literal.
fn has_docstring(block: Node) -> bool {
    let mut cursor = block.walk();
    let first = block
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment");

    first
        .filter(|stmt| stmt.kind() == "expression_statement")
        .and_then(|stmt| stmt.named_child(0))
        .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extracts_imports_as_module_references() {
        let source = indoc! {"
            import os
            import numpy as np, pkg.sub
            from collections import OrderedDict, deque
            from . import sibling
            from ..shared import helpers as h
            from typing import *
            from __future__ import annotations
        "};
        let record = try_extract("imports.py", source).unwrap();
        assert_eq!(
            record.imports,
            vec![
                "os",
                "numpy",
                "pkg.sub",
                "collections.OrderedDict",
                "collections.deque",
                ".sibling",
                "..shared.helpers",
                "typing",
                "__future__.annotations",
            ]
        );
    }

    #[test]
    fn test_nested_imports_are_not_recorded() {
        let source = indoc! {"
            def lazy():
                import json
                return json
        "};
        let record = try_extract("lazy.py", source).unwrap();
        assert!(record.imports.is_empty());
        assert_eq!(record.functions.len(), 1);
    }

    #[test]
    fn test_function_facts() {
        let source = indoc! {r#"
            @cache
            @app.route("/x")
            async def handler(request, retries=3, *args, timeout: int = 5, **kwargs):
                """Handle it."""
                return request
        "#};
        let record = try_extract("handlers.py", source).unwrap();
        let f = &record.functions[0];
        assert_eq!(f.name, "handler");
        assert!(f.is_async);
        assert!(f.has_docstring);
        assert_eq!(f.decorators, vec!["cache", "app.route"]);
        assert_eq!(f.args, vec!["request", "retries", "timeout"]);
        assert_eq!(f.branch_complexity, 1);
    }

    #[test]
    fn test_branch_complexity_counts_if_loop_and_handlers() {
        let source = indoc! {"
            def busy(items):
                for item in items:
                    if item > 1:
                        pass
                    elif item < 0:
                        pass
                    else:
                        pass
                while False:
                    break
                try:
                    pass
                except ValueError:
                    pass
                except KeyError:
                    pass
                finally:
                    pass
                value = 1 if items else 2
                return [x for x in items if x]
        "};
        let record = try_extract("busy.py", source).unwrap();
        // 1 + for + if + elif + while + 2 except
        assert_eq!(record.functions[0].branch_complexity, 7);
    }

    #[test]
    fn test_async_for_is_not_a_branch() {
        let source = indoc! {"
            async def drain(queue):
                async for item in queue:
                    if item:
                        pass
                for other in queue.backlog:
                    pass
        "};
        let record = try_extract("drain.py", source).unwrap();
        // 1 + if + for
        assert_eq!(record.functions[0].branch_complexity, 3);
    }

    #[test]
    fn test_nested_function_branches_count_toward_outer() {
        let source = indoc! {"
            def outer(x):
                def inner(y):
                    if y:
                        return 1
                    return 0
                if x:
                    return inner(x)
        "};
        let record = try_extract("nested.py", source).unwrap();
        assert_eq!(record.functions.len(), 1);
        assert_eq!(record.functions[0].branch_complexity, 3);
    }

    #[test]
    fn test_class_facts_with_methods() {
        let source = indoc! {r#"
            @dataclass(frozen=True)
            class Repo(Base, abc.ABC, metaclass=Meta):
                """A repository."""

                def get(self, key):
                    if key:
                        return key

                @staticmethod
                def build():
                    pass

                class Inner:
                    def hidden(self):
                        pass
        "#};
        let record = try_extract("repo.py", source).unwrap();
        assert_eq!(record.classes.len(), 1);

        let class = &record.classes[0];
        assert_eq!(class.name, "Repo");
        assert_eq!(class.base_types, vec!["Base", "abc.ABC"]);
        assert_eq!(class.decorators, vec!["dataclass"]);
        assert!(class.has_docstring);

        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["get", "build"]);
        assert_eq!(class.methods[0].branch_complexity, 2);
        assert_eq!(class.methods[0].args, vec!["self", "key"]);
        assert_eq!(class.methods[1].decorators, vec!["staticmethod"]);
    }

    #[test]
    fn test_docstring_detection_ignores_comments_only_when_leading() {
        let source = indoc! {r#"
            def documented():
                # leading comment
                """Doc."""

            def undocumented():
                x = "not a docstring"
        "#};
        let record = try_extract("docs.py", source).unwrap();
        assert!(record.functions[0].has_docstring);
        assert!(!record.functions[1].has_docstring);
    }

    #[test]
    fn test_malformed_source_fails_soft() {
        let source = "def broken(:\n    pass\nclass\n";
        assert!(matches!(
            try_extract("broken.py", source),
            Err(FragmapError::ParseFailure { .. })
        ));

        let record = extract("broken.py", source);
        assert_eq!(record.loc, 3);
        assert!(record.is_empty());
        assert_eq!(record.source, "broken.py");
    }

    #[test]
    fn test_empty_source() {
        let record = extract("empty.py", "");
        assert_eq!(record.loc, 0);
        assert!(record.is_empty());
    }
}
