//! Block locator
//!
//! Walks a tree-sitter Python syntax tree and finds every cell-defining block:
//!
//! ```python
//! with herzog.Cell("python"):
//!     ...
//! with herzog.Sandbox():
//!     ...
//! ```
//!
//! Guard arguments are read from literal nodes in the tree; nothing is evaluated.

use crate::cell::CellKind;
use crate::parser::{ParseError, ParseResult};
use tree_sitter::{Node, Tree};

/// Locator options
#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// Module name the guards are called on (`<namespace>.Cell(...)`)
    pub namespace: String,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            namespace: "herzog".to_string(),
        }
    }
}

/// Location of a cell body in the script
///
/// Rows are 0-indexed, matching tree-sitter points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    /// Row of the block opener
    pub header: usize,
    /// First body row
    pub start: usize,
    /// Last body row (inclusive)
    pub end: usize,
    /// Indentation width of the body
    pub indent: usize,
}

impl SourceSpan {
    /// 1-indexed line of the block opener
    pub fn line(&self) -> usize {
        self.header + 1
    }
}

/// A located cell block
#[derive(Debug, Clone, Copy)]
pub struct LocatedBlock<'t> {
    pub kind: CellKind,
    pub span: SourceSpan,
    /// The `block` node holding the body statements
    pub body: Node<'t>,
}

/// Parse Python source into a syntax tree
pub fn python_tree(source: &str) -> ParseResult<Tree> {
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&language)?;
    parser.parse(source, None).ok_or(ParseError::Unparsable)
}

/// Syntax tree of a whole script
pub struct Locator<'s> {
    source: &'s str,
    namespace: String,
    tree: Tree,
}

impl<'s> Locator<'s> {
    pub fn new(source: &'s str, options: &LocatorOptions) -> ParseResult<Self> {
        Ok(Self {
            source,
            namespace: options.namespace.clone(),
            tree: python_tree(source)?,
        })
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Located blocks in document order
    pub fn blocks(&self) -> BlockIter<'_> {
        BlockIter {
            stack: vec![self.tree.root_node()],
            source: self.source,
            namespace: &self.namespace,
            done: false,
        }
    }
}

/// Lazy pre-order walk yielding cell blocks
///
/// The walk stops after the first error.
pub struct BlockIter<'t> {
    stack: Vec<Node<'t>>,
    source: &'t str,
    namespace: &'t str,
    done: bool,
}

enum Guard<'t> {
    Cell(Node<'t>),
    Sandbox,
}

impl<'t> Iterator for BlockIter<'t> {
    type Item = ParseResult<LocatedBlock<'t>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        while let Some(node) = self.stack.pop() {
            if node.is_error() {
                match self.error_region(node) {
                    Some(err) => return self.fail(err),
                    None => {
                        tracing::warn!(
                            line = node.start_position().row + 1,
                            "Discarding unparsable content outside of cells"
                        );
                        continue;
                    }
                }
            }

            if node.kind() == "with_statement" {
                match self.match_block(node) {
                    // A cell body belongs to the cell; don't look for cells inside it.
                    Ok(Some(block)) => return Some(Ok(block)),
                    Ok(None) => {}
                    Err(err) => return self.fail(err),
                }
            }

            let mut cursor = node.walk();
            let children: Vec<_> = node.children(&mut cursor).collect();
            self.stack.extend(children.into_iter().rev());
        }

        self.done = true;
        None
    }
}

impl<'t> BlockIter<'t> {
    fn fail(&mut self, err: ParseError) -> Option<ParseResult<LocatedBlock<'t>>> {
        self.done = true;
        Some(Err(err))
    }

    fn text(&self, node: Node<'t>) -> &'t str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    /// Match a `with` statement against the cell guard shapes
    fn match_block(&self, node: Node<'t>) -> ParseResult<Option<LocatedBlock<'t>>> {
        let Some(guard) = self.with_guard(node) else {
            return Ok(None);
        };

        let header = node.start_position().row;
        let line = header + 1;
        let kind = match guard {
            Guard::Sandbox => CellKind::Scoped,
            Guard::Cell(call) => self.cell_kind(call, line)?,
        };

        let expected_content = || ParseError::MalformedCell {
            line,
            reason: "expected cell content".to_string(),
        };
        let body = node
            .child_by_field_name("body")
            .filter(|body| !body.is_missing() && !named_children(*body).is_empty())
            .ok_or_else(expected_content)?;

        // Error recovery can keep a following opener between the colon and a body
        let parts = children(node);
        if parts.iter().any(|part| part.is_error()) {
            return Err(expected_content());
        }

        let colon_row = parts
            .iter()
            .find(|child| child.kind() == ":")
            .map_or(header, |colon| colon.end_position().row);
        if body.start_position().row == colon_row {
            return Err(ParseError::MalformedCell {
                line,
                reason: "cell content must start on the line after the block opener".to_string(),
            });
        }

        let indent = body.start_position().column;
        let mut end = last_row(body);

        // Trailing comments at body indentation may be attached after the statement
        let mut sibling = node.next_sibling();
        while let Some(next) = sibling {
            if next.kind() != "comment" || next.start_position().column < indent {
                break;
            }
            end = end.max(last_row(next));
            sibling = next.next_sibling();
        }

        let span = SourceSpan {
            header,
            start: colon_row + 1,
            end,
            indent,
        };
        tracing::debug!(line, %kind, ?span, "Located cell block");

        Ok(Some(LocatedBlock { kind, span, body }))
    }

    /// The guard of a single-item `with` statement, if it is a cell guard
    fn with_guard(&self, node: Node<'t>) -> Option<Guard<'t>> {
        let clause = children(node)
            .into_iter()
            .find(|child| child.kind() == "with_clause")?;
        let items: Vec<_> = named_children(clause)
            .into_iter()
            .filter(|item| item.kind() == "with_item")
            .collect();
        let [item] = items.as_slice() else {
            return None;
        };

        let mut value = item.child_by_field_name("value")?;
        while matches!(value.kind(), "as_pattern" | "parenthesized_expression") {
            value = named_children(value).into_iter().next()?;
        }

        self.call_guard(value)
    }

    /// Match `<namespace>.Cell(...)` or `<namespace>.Sandbox(...)`
    fn call_guard(&self, call: Node<'t>) -> Option<Guard<'t>> {
        if call.kind() != "call" {
            return None;
        }
        let function = call.child_by_field_name("function")?;
        if function.kind() != "attribute" {
            return None;
        }
        let object = function.child_by_field_name("object")?;
        if object.kind() != "identifier" || self.text(object) != self.namespace {
            return None;
        }
        match self.text(function.child_by_field_name("attribute")?) {
            "Cell" => Some(Guard::Cell(call)),
            "Sandbox" => Some(Guard::Sandbox),
            _ => None,
        }
    }

    /// Read the kind literal of a `Cell(...)` call
    fn cell_kind(&self, call: Node<'t>, line: usize) -> ParseResult<CellKind> {
        let args = call
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();

        let arg = match args.as_slice() {
            [arg] if arg.kind() == "keyword_argument" => {
                let name = arg.child_by_field_name("name").map(|n| self.text(n));
                match (name, arg.child_by_field_name("value")) {
                    (Some("cell_type"), Some(value)) => value,
                    _ => {
                        return Err(ParseError::UnknownCellKind {
                            kind: self.text(*arg).to_string(),
                            line,
                        });
                    }
                }
            }
            [arg] => *arg,
            _ => {
                return Err(ParseError::MalformedCell {
                    line,
                    reason: "expected exactly one cell kind argument".to_string(),
                });
            }
        };

        let literal = string_literal(arg, self.source).unwrap_or_else(|| self.text(arg));
        CellKind::parse(literal).ok_or_else(|| ParseError::UnknownCellKind {
            kind: literal.to_string(),
            line,
        })
    }

    /// Classify a syntax error region
    ///
    /// Regions holding a cell guard are cell errors; anything else lies outside
    /// of cells and is discarded.
    fn error_region(&self, node: Node<'t>) -> Option<ParseError> {
        let mut stack = vec![node];
        let mut guard_row = None;
        while let Some(current) = stack.pop() {
            if self.call_guard(current).is_some() {
                guard_row = Some(current.start_position().row);
                break;
            }
            let mut kids = children(current);
            kids.reverse();
            stack.extend(kids);
        }

        let guard_row = match guard_row {
            Some(row) => row,
            None => {
                let text = self.text(node);
                let ns = self.namespace;
                let offset = [format!("{ns}.Cell("), format!("{ns}.Sandbox(")]
                    .iter()
                    .filter_map(|pattern| text.find(pattern.as_str()))
                    .min()?;
                node.start_position().row + text[..offset].matches('\n').count()
            }
        };

        let line = guard_row + 1;
        let header_end = self.source[node.start_byte()..]
            .find('\n')
            .map_or(self.source.len(), |i| node.start_byte() + i);
        let after_header = self
            .source
            .get(header_end.min(node.end_byte())..node.end_byte())
            .unwrap_or("");

        if guard_row == node.start_position().row && after_header.trim().is_empty() {
            Some(ParseError::MalformedCell {
                line,
                reason: "expected cell content".to_string(),
            })
        } else {
            Some(ParseError::Syntax {
                line,
                detail: "invalid syntax in cell block".to_string(),
            })
        }
    }
}

/// Text of a plain (non-interpolated) string literal, without quotes or prefix
pub fn string_literal<'s>(node: Node<'_>, source: &'s str) -> Option<&'s str> {
    if node.kind() != "string" {
        return None;
    }
    let parts = children(node);
    if parts.iter().any(|part| part.kind() == "interpolation") {
        return None;
    }
    let start = parts.iter().find(|part| part.kind() == "string_start")?;
    let end = parts.iter().rev().find(|part| part.kind() == "string_end")?;
    source.get(start.end_byte()..end.start_byte())
}

/// All children of a node
pub(crate) fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children of a node, skipping comments
pub(crate) fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| child.kind() != "comment")
        .collect()
}

/// Last row holding content of a node
///
/// Nodes ending with a newline end at column 0 of the following row.
pub(crate) fn last_row(node: Node<'_>) -> usize {
    let start = node.start_position();
    let end = node.end_position();
    if end.column == 0 && end.row > start.row {
        end.row - 1
    } else {
        end.row
    }
}
