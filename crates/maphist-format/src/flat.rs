//! Flat encoding: one self-contained record per line
//!
//! ```text
//! CLASS   <classes>                                  <values>
//! FIELD   <classes>  <name>  <desc>                  <values>
//! METHOD  <classes>  <name>  <desc>                  <values>
//! PARAM   <classes>  <method> <mdesc> <index> <name> <values>
//! ```
//!
//! `<classes>` is the owner chain of the record, outermost class first,
//! joined with `.`: a class `a/A$B` nested under `a/A` is `a/A.a/A$B`, a
//! top-level class of the same name is just `a/A$B`.
//! `<values>` is `dst[\tdoc]` for mappings and `a\tb[\tdocA\tdocB]` for diffs.

use crate::error::FormatError;
use crate::record::{join_classes, push_fields, split_classes, unescape, Record};
use crate::{is_ignored, MappingFormat};
use maphist_tree::{
    Diagnostic, DiagnosticKind, Diagnostics, DiffTree, MappingTree, NodeKey, NodePath, Tree,
};
use std::collections::HashSet;

const CLASS: &str = "CLASS";
const FIELD: &str = "FIELD";
const METHOD: &str = "METHOD";
const PARAM: &str = "PARAM";

/// Flat, fully-qualified record encoding
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatFormat;

impl MappingFormat for FlatFormat {
    fn name(&self) -> &'static str {
        "flat"
    }

    fn mappings_extension(&self) -> &'static str {
        ".flatmap"
    }

    fn diff_extension(&self) -> &'static str {
        ".flatdiff"
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

fn parse<V: Record>(content: &str) -> Result<(Tree<V>, Diagnostics), FormatError> {
    let mut tree: Tree<V> = Tree::new();
    let mut diagnostics = Diagnostics::new();
    let mut seen = HashSet::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = idx + 1;
        if is_ignored(raw) {
            continue;
        }
        let fields: Vec<&str> = raw.split('\t').collect();
        let tag = fields[0];
        let key_len = match tag {
            CLASS => 2,
            FIELD | METHOD => 4,
            PARAM => 6,
            other => {
                return Err(FormatError::UnknownTag {
                    line,
                    tag: other.to_string(),
                })
            }
        };

        let values = fields.len().saturating_sub(key_len);
        if fields.len() < key_len || (values != V::WIDTH && values != 2 * V::WIDTH) {
            return Err(FormatError::FieldCount {
                line,
                tag: tag.to_string(),
                expected: format!("{} or {}", key_len + V::WIDTH, key_len + 2 * V::WIDTH),
                found: fields.len(),
            });
        }

        let class = class_path(line, fields[1])?;
        let path = match tag {
            CLASS => class,
            FIELD => class.child(NodeKey::field(unescape(fields[2]), unescape(fields[3]))),
            METHOD => class.child(NodeKey::method(unescape(fields[2]), unescape(fields[3]))),
            _ => {
                let index = fields[4].parse::<u32>().map_err(|_| {
                    FormatError::malformed(line, format!("invalid parameter index '{}'", fields[4]))
                })?;
                class
                    .child(NodeKey::method(unescape(fields[2]), unescape(fields[3])))
                    .child(NodeKey::parameter(index, unescape(fields[5])))
            }
        };

        if !seen.insert(path.clone()) {
            diagnostics.push(Diagnostic::new(DiagnosticKind::DuplicateKey, path.clone()));
        }

        let mut value = V::default();
        value.set_dst(&fields[key_len..key_len + V::WIDTH]);
        if values == 2 * V::WIDTH {
            value.set_doc(&fields[key_len + V::WIDTH..]);
        }
        let node = tree
            .ensure(&path)
            .map_err(|source| FormatError::Structure { line, source })?;
        *node.value_mut() = value;
    }

    Ok((tree, diagnostics))
}

fn class_path(line: usize, field: &str) -> Result<NodePath, FormatError> {
    let names = split_classes(field);
    if names.iter().any(String::is_empty) {
        return Err(FormatError::malformed(line, format!("empty class name in '{field}'")));
    }
    Ok(NodePath::new(names.into_iter().map(NodeKey::class).collect()))
}

fn render<V: Record>(tree: &Tree<V>) -> String {
    let mut out = String::new();
    tree.walk(|path, node| {
        let keys = path.keys();
        let mut line = String::new();
        match node.key() {
            NodeKey::Class { .. } => {
                line.push_str(CLASS);
                push_classes(&mut line, keys);
            }
            NodeKey::Field { name, desc } | NodeKey::Method { name, desc } => {
                let tag = if matches!(node.key(), NodeKey::Field { .. }) {
                    FIELD
                } else {
                    METHOD
                };
                line.push_str(tag);
                push_classes(&mut line, &keys[..keys.len() - 1]);
                push_fields(&mut line, &[name.as_str(), desc.as_str()]);
            }
            NodeKey::Parameter { index, name } => {
                let method = &keys[keys.len() - 2];
                let index = index.to_string();
                line.push_str(PARAM);
                push_classes(&mut line, &keys[..keys.len() - 2]);
                push_fields(
                    &mut line,
                    &[
                        method.name(),
                        method.desc().unwrap_or_default(),
                        index.as_str(),
                        name.as_str(),
                    ],
                );
            }
        }
        let value = node.value();
        push_fields(&mut line, &value.dst_fields());
        if value.has_doc() {
            push_fields(&mut line, &value.doc_fields());
        }
        out.push_str(&line);
        out.push('\n');
    });
    out
}

/// Append the owner chain field; walks only yield well-formed paths, so
/// `classes` holds class keys only
fn push_classes(line: &mut String, classes: &[NodeKey]) {
    line.push('\t');
    line.push_str(&join_classes(classes.iter().map(NodeKey::name)));
}
