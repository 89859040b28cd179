//! Validation of executable cell content
//!
//! Extracted code is re-parsed on its own. Magic and shell-escape lines are checked
//! in their commented script form, so notebook-only syntax is never a syntax error.
//! The grammar also accepts Python 2 statements and does not check where `return`,
//! `yield`, `break` and `continue` appear, so those are checked on the tree.

use crate::cell::{Cell, CellKind};
use crate::extract::escape_line;
use crate::locator::{children, python_tree};
use crate::parser::{ParseError, ParseResult};
use tree_sitter::Node;

/// Check that an executable cell parses as standalone Python
///
/// Errors carry `line`, the 1-indexed line of the cell's block opener. Other cell
/// kinds always pass.
pub fn validate(cell: &Cell, line: usize) -> ParseResult<()> {
    if cell.kind() != CellKind::Executable {
        return Ok(());
    }

    let code = cell
        .content()
        .iter()
        .map(|l| escape_line(l))
        .collect::<Vec<_>>()
        .join("\n");
    let tree = python_tree(&code)?;
    let root = tree.root_node();
    if root.has_error() {
        let detail = first_error(root)
            .map(|node| describe(node, &code))
            .unwrap_or_else(|| "invalid syntax".to_string());
        return Err(ParseError::Syntax { line, detail });
    }

    match first_misplaced(root) {
        Some((node, problem)) => Err(ParseError::Syntax {
            line,
            detail: format!("{problem} on cell line {}", node.start_position().row + 1),
        }),
        None => Ok(()),
    }
}

/// Enclosing constructs that allow `return`/`yield` and `break`/`continue`
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    function: bool,
    looping: bool,
}

/// First statement that parses but is rejected by the Python 3 compiler
fn first_misplaced(root: Node<'_>) -> Option<(Node<'_>, &'static str)> {
    let mut stack = vec![(root, Scope::default())];
    while let Some((node, scope)) = stack.pop() {
        let problem = match node.kind() {
            "print_statement" => Some("Python 2 `print` statement"),
            "exec_statement" => Some("Python 2 `exec` statement"),
            "return_statement" if !scope.function => Some("`return` outside function"),
            "yield" if !scope.function => Some("`yield` outside function"),
            "break_statement" if !scope.looping => Some("`break` outside loop"),
            "continue_statement" if !scope.looping => Some("`continue` not properly in loop"),
            _ => None,
        };
        if let Some(problem) = problem {
            return Some((node, problem));
        }

        let inner = match node.kind() {
            "function_definition" | "lambda" => Scope {
                function: true,
                looping: false,
            },
            "class_definition" => Scope::default(),
            _ => scope,
        };
        // Only the loop body counts, not its condition or `else` clause
        let body = match node.kind() {
            "for_statement" | "while_statement" => node.child_by_field_name("body"),
            _ => None,
        };

        let mut kids = children(node);
        kids.reverse();
        for kid in kids {
            let looping = inner.looping || body.is_some_and(|b| b.id() == kid.id());
            stack.push((kid, Scope { looping, ..inner }));
        }
    }
    None
}

fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if node.has_error() {
            let mut kids = children(node);
            kids.reverse();
            stack.extend(kids);
        }
    }
    None
}

fn describe(node: Node<'_>, code: &str) -> String {
    let cell_line = node.start_position().row + 1;
    if node.is_missing() {
        return format!("missing `{}` on cell line {cell_line}", node.kind());
    }
    let text = code[node.start_byte()..node.end_byte()]
        .lines()
        .next()
        .unwrap_or("")
        .trim();
    if text.is_empty() {
        format!("invalid syntax on cell line {cell_line}")
    } else {
        let snippet: String = text.chars().take(40).collect();
        format!("unexpected `{snippet}` on cell line {cell_line}")
    }
}
