use crate::errors::{DepgraphError, Result};
use crate::parse::common::RawImport;
use tree_sitter::{Node, Parser};

/// The tree-sitter grammar used for Python sources.
pub fn language() -> tree_sitter::Language {
    tree_sitter_python::LANGUAGE.into()
}

/// Extract every import record from one file's source text, in source order.
///
/// Each call builds its own parser, so concurrent callers share nothing.
/// Imports nested in functions, conditionals and `try` blocks are included.
/// Fails only when the text is not valid Python; dynamic imports such as
/// `importlib.import_module(...)` are ordinary calls and produce no records.
pub fn extract_imports(source: &str) -> Result<Vec<RawImport>> {
    let mut parser = Parser::new();
    parser
        .set_language(&language())
        .map_err(|e| DepgraphError::Grammar(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| DepgraphError::Parse {
            line: 1,
            column: 1,
            message: "parser produced no syntax tree".to_string(),
        })?;

    let root = tree.root_node();
    if let Some(offending) = first_invalid_node(root, source.as_bytes()) {
        return Err(syntax_error(offending, source.as_bytes()));
    }

    let mut imports = Vec::new();
    walk_for_imports(root, source.as_bytes(), &mut imports);
    Ok(imports)
}

fn walk_for_imports(node: Node, source: &[u8], imports: &mut Vec<RawImport>) {
    match node.kind() {
        "import_statement" => {
            plain_import(node, source, imports);
            return;
        }
        "import_from_statement" => {
            from_import(node, source, imports);
            return;
        }
        "future_import_statement" => {
            imported_names(
                node,
                source,
                Some("__future__".to_string()),
                0,
                imports,
            );
            return;
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_for_imports(child, source, imports);
    }
}

/// `import a.b.c [as x], d`: one record per name, split at the last dot.
fn plain_import(node: Node, source: &[u8], imports: &mut Vec<RawImport>) {
    let line = node.start_position().row + 1;
    let mut cursor = node.walk();
    for name_node in node.children_by_field_name("name", &mut cursor) {
        let (dotted, asname) = name_and_alias(name_node, source);
        if dotted.is_empty() {
            continue;
        }
        let (module, name) = match dotted.rsplit_once('.') {
            Some((module, name)) => (Some(module.to_string()), name.to_string()),
            None => (None, dotted),
        };
        let record = RawImport {
            module,
            name,
            asname,
            level: 0,
            line,
        };
        tracing::debug!(import = %record.display_path(), line, "found import statement");
        imports.push(record);
    }
}

/// `from <dots><module> import n1 [as a1], n2`: module and level are shared.
fn from_import(node: Node, source: &[u8], imports: &mut Vec<RawImport>) {
    let (module, level) = match node.child_by_field_name("module_name") {
        Some(module_node) if module_node.kind() == "relative_import" => {
            relative_module(module_node, source)
        }
        Some(module_node) => (Some(dotted_text(module_node, source)), 0),
        None => (None, 0),
    };
    imported_names(node, source, module, level, imports);
}

fn imported_names(
    node: Node,
    source: &[u8],
    module: Option<String>,
    level: usize,
    imports: &mut Vec<RawImport>,
) {
    let line = node.start_position().row + 1;
    let module = module.filter(|m| !m.is_empty());

    let mut names: Vec<(String, Option<String>)> = Vec::new();
    let mut cursor = node.walk();
    for name_node in node.children_by_field_name("name", &mut cursor) {
        let (name, asname) = name_and_alias(name_node, source);
        if !name.is_empty() {
            names.push((name, asname));
        }
    }

    let mut cursor = node.walk();
    if node
        .children(&mut cursor)
        .any(|child| child.kind() == "wildcard_import")
    {
        names.push(("*".to_string(), None));
    }

    for (name, asname) in names {
        let record = RawImport {
            module: module.clone(),
            name,
            asname,
            level,
            line,
        };
        tracing::debug!(import = %record.display_path(), line, "found from-import statement");
        imports.push(record);
    }
}

/// Split a `relative_import` node into its dotted tail and its dot count.
fn relative_module(node: Node, source: &[u8]) -> (Option<String>, usize) {
    let mut level = 0;
    let mut module = None;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "import_prefix" => {
                level = child
                    .utf8_text(source)
                    .unwrap_or_default()
                    .chars()
                    .filter(|&c| c == '.')
                    .count();
            }
            "dotted_name" => module = Some(dotted_text(child, source)),
            _ => {}
        }
    }
    (module, level)
}

fn name_and_alias(node: Node, source: &[u8]) -> (String, Option<String>) {
    if node.kind() == "aliased_import" {
        let name = node
            .child_by_field_name("name")
            .map(|n| dotted_text(n, source))
            .unwrap_or_default();
        let alias = node
            .child_by_field_name("alias")
            .and_then(|a| a.utf8_text(source).ok())
            .map(str::to_string);
        (name, alias)
    } else {
        (dotted_text(node, source), None)
    }
}

/// Join the identifiers of a `dotted_name`, dropping any whitespace or
/// comments the source placed between segments.
fn dotted_text(node: Node, source: &[u8]) -> String {
    if node.kind() == "identifier" {
        return node.utf8_text(source).unwrap_or_default().to_string();
    }
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == "identifier")
        .filter_map(|child| child.utf8_text(source).ok())
        .collect::<Vec<_>>()
        .join(".")
}

/// Build a parse error pointing at an error, missing or Python 2 node.
fn syntax_error(offending: Node, source: &[u8]) -> DepgraphError {
    let position = offending.start_position();
    let message = if offending.is_missing() {
        format!("missing `{}`", offending.kind())
    } else if let Some(keyword) = python2_keyword(offending.kind()) {
        format!("`{keyword}` statement is Python 2 syntax")
    } else {
        let snippet: String = offending
            .utf8_text(source)
            .unwrap_or_default()
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(40)
            .collect();
        if snippet.is_empty() {
            "invalid syntax".to_string()
        } else {
            format!("invalid syntax near `{snippet}`")
        }
    };
    DepgraphError::Parse {
        line: position.row + 1,
        column: position.column + 1,
        message,
    }
}

/// The grammar still accepts the Python 2 `print` and `exec` statements.
fn python2_keyword(kind: &str) -> Option<&'static str> {
    match kind {
        "print_statement" => Some("print"),
        "exec_statement" => Some("exec"),
        _ => None,
    }
}

/// `print (x)` and `print >> f, x` also parse as statements, yet both are
/// valid Python 3 expressions (a call, a shift inside a tuple).
fn is_python2_statement(node: Node, source: &[u8]) -> bool {
    match node.kind() {
        "exec_statement" => true,
        "print_statement" => {
            let rest = node
                .utf8_text(source)
                .unwrap_or_default()
                .trim_start_matches("print")
                .trim_start();
            !(rest.starts_with('(') || rest.starts_with(">>"))
        }
        _ => false,
    }
}

/// First node, in source order, that makes the file invalid Python 3.
fn first_invalid_node<'t>(node: Node<'t>, source: &[u8]) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() || is_python2_statement(node, source) {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .find_map(|child| first_invalid_node(child, source))
}
