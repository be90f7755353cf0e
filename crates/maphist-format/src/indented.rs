//! Indented encoding: leading tabs encode depth
//!
//! ```text
//! c  <class>           <values>
//! \tf  <name> <desc>   <values>
//! \tm  <name> <desc>   <values>
//! \t\tp  <index> <name> <values>
//! \tc  <nested class>  <values>
//! \td  <doc values>
//! ```
//!
//! A `d` line documents the record one level up. `<values>` is `dst` for
//! mappings and `a\tb` for diffs; documentation lines use the same width.

use crate::error::FormatError;
use crate::record::{push_fields, unescape, Record};
use crate::{is_ignored, MappingFormat};
use maphist_tree::{
    Diagnostic, DiagnosticKind, Diagnostics, DiffTree, MappingTree, Node, NodeKey, NodePath, Tree,
};
use std::collections::HashSet;

const CLASS: &str = "c";
const FIELD: &str = "f";
const METHOD: &str = "m";
const PARAM: &str = "p";
const DOC: &str = "d";

/// Indentation-encodes-depth record encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeFormat;

impl MappingFormat for TreeFormat {
    fn name(&self) -> &'static str {
        "tree"
    }

    fn mappings_extension(&self) -> &'static str {
        ".treemap"
    }

    fn diff_extension(&self) -> &'static str {
        ".treediff"
    }

    fn decode_mappings(&self, content: &str) -> Result<(MappingTree, Diagnostics), FormatError> {
        parse(content)
    }

    fn render_mappings(&self, tree: &MappingTree) -> String {
        render(tree)
    }

    fn decode_diff(&self, content: &str) -> Result<(DiffTree, Diagnostics), FormatError> {
        let (mut tree, diagnostics): (DiffTree, _) = parse(content)?;
        tree.validate();
        Ok((tree, diagnostics))
    }

    fn render_diff(&self, tree: &DiffTree) -> String {
        render(tree)
    }
}

fn expect_fields(line: usize, tag: &str, fields: &[&str], expected: usize) -> Result<(), FormatError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(FormatError::FieldCount {
            line,
            tag: tag.to_string(),
            expected: expected.to_string(),
            found: fields.len(),
        })
    }
}

fn parse<V: Record>(content: &str) -> Result<(Tree<V>, Diagnostics), FormatError> {
    let mut tree: Tree<V> = Tree::new();
    let mut diagnostics = Diagnostics::new();
    // stack[d] is the path of the open record at depth d
    let mut stack: Vec<NodePath> = Vec::new();
    let mut seen = HashSet::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        if is_ignored(raw) {
            continue;
        }
        let depth = raw.bytes().take_while(|&b| b == b'\t').count();
        let fields: Vec<&str> = raw[depth..].split('\t').collect();
        let tag = fields[0];

        if tag == DOC {
            expect_fields(line, tag, &fields, 1 + V::WIDTH)?;
            if depth == 0 || depth > stack.len() {
                return Err(FormatError::malformed(line, "documentation without an owning record"));
            }
            stack.truncate(depth);
            if let Some(node) = tree.get_mut(&stack[depth - 1]) {
                node.value_mut().set_doc(&fields[1..]);
            }
            continue;
        }

        let key_len = match tag {
            CLASS => 1,
            FIELD | METHOD | PARAM => 2,
            other => {
                return Err(FormatError::UnknownTag {
                    line,
                    tag: other.to_string(),
                })
            }
        };
        expect_fields(line, tag, &fields, 1 + key_len + V::WIDTH)?;
        if depth > stack.len() {
            return Err(FormatError::malformed(line, "indentation skips a level"));
        }

        let key = match tag {
            CLASS => NodeKey::class(unescape(fields[1])),
            FIELD => NodeKey::field(unescape(fields[1]), unescape(fields[2])),
            METHOD => NodeKey::method(unescape(fields[1]), unescape(fields[2])),
            _ => {
                let index = fields[1].parse::<u32>().map_err(|_| {
                    FormatError::malformed(line, format!("invalid parameter index '{}'", fields[1]))
                })?;
                NodeKey::parameter(index, unescape(fields[2]))
            }
        };
        let path = match depth {
            0 => NodePath::new(vec![key]),
            d => stack[d - 1].child(key),
        };

        if !seen.insert(path.clone()) {
            diagnostics.push(Diagnostic::new(DiagnosticKind::DuplicateKey, path.clone()));
        }

        let mut value = V::default();
        value.set_dst(&fields[1 + key_len..]);
        let node = tree
            .ensure(&path)
            .map_err(|source| FormatError::Structure { line, source })?;
        *node.value_mut() = value;

        stack.truncate(depth);
        stack.push(path);
    }

    Ok((tree, diagnostics))
}

fn render<V: Record>(tree: &Tree<V>) -> String {
    let mut out = String::new();
    for class in tree.classes() {
        render_node(&mut out, class, 0);
    }
    out
}

fn render_node<V: Record>(out: &mut String, node: &Node<V>, depth: usize) {
    let indent = "\t".repeat(depth);
    out.push_str(&indent);
    match node.key() {
        NodeKey::Class { name } => {
            out.push_str(CLASS);
            push_fields(out, &[name.as_str()]);
        }
        NodeKey::Field { name, desc } => {
            out.push_str(FIELD);
            push_fields(out, &[name.as_str(), desc.as_str()]);
        }
        NodeKey::Method { name, desc } => {
            out.push_str(METHOD);
            push_fields(out, &[name.as_str(), desc.as_str()]);
        }
        NodeKey::Parameter { index, name } => {
            out.push_str(PARAM);
            push_fields(out, &[index.to_string().as_str(), name.as_str()]);
        }
    }
    let value = node.value();
    push_fields(out, &value.dst_fields());
    out.push('\n');

    if value.has_doc() {
        out.push_str(&indent);
        out.push('\t');
        out.push_str(DOC);
        push_fields(out, &value.doc_fields());
        out.push('\n');
    }

    for child in node.children() {
        render_node(out, child, depth + 1);
    }
}
