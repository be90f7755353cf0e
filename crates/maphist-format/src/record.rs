//! Field escaping and payload ↔ field conversion shared by both encodings

use maphist_tree::{Diff, DiffEntry, Mapping};

/// Escape a text field so it contains no tab or line break
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out
}

/// Reverse of [`escape`]; unknown escapes are kept verbatim
pub(crate) fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }
    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some(CLASS_SEPARATOR) => out.push(CLASS_SEPARATOR),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Separator between the names of an owner chain held in one field
pub(crate) const CLASS_SEPARATOR: char = '.';

/// Encode class names, outermost first, as one field
pub(crate) fn join_classes<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, name) in names.into_iter().enumerate() {
        if i > 0 {
            out.push(CLASS_SEPARATOR);
        }
        for c in escape(name).chars() {
            if c == CLASS_SEPARATOR {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}

/// Reverse of [`join_classes`]
pub(crate) fn split_classes(field: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = String::new();
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            CLASS_SEPARATOR => names.push(unescape(&std::mem::take(&mut current))),
            other => current.push(other),
        }
    }
    names.push(unescape(&current));
    names
}

/// A tree payload as encoded fields
///
/// Each attribute occupies [`Record::WIDTH`] fields: one for mappings, two
/// (side A, side B) for diffs.
pub(crate) trait Record: Default {
    /// Fields per attribute
    const WIDTH: usize;

    fn dst_fields(&self) -> Vec<&str>;
    fn doc_fields(&self) -> Vec<&str>;
    fn set_dst(&mut self, fields: &[&str]);
    fn set_doc(&mut self, fields: &[&str]);

    /// Whether documentation must be written
    fn has_doc(&self) -> bool {
        self.doc_fields().iter().any(|f| !f.is_empty())
    }
}

impl Record for Mapping {
    const WIDTH: usize = 1;

    fn dst_fields(&self) -> Vec<&str> {
        vec![self.dst.as_str()]
    }

    fn doc_fields(&self) -> Vec<&str> {
        vec![self.javadoc.as_str()]
    }

    fn set_dst(&mut self, fields: &[&str]) {
        self.dst = unescape(fields[0]);
    }

    fn set_doc(&mut self, fields: &[&str]) {
        self.javadoc = unescape(fields[0]);
    }
}

impl Record for DiffEntry {
    const WIDTH: usize = 2;

    fn dst_fields(&self) -> Vec<&str> {
        vec![self.dst.a.as_str(), self.dst.b.as_str()]
    }

    fn doc_fields(&self) -> Vec<&str> {
        vec![self.javadoc.a.as_str(), self.javadoc.b.as_str()]
    }

    fn set_dst(&mut self, fields: &[&str]) {
        self.dst = Diff::new(unescape(fields[0]), unescape(fields[1]));
    }

    fn set_doc(&mut self, fields: &[&str]) {
        self.javadoc = Diff::new(unescape(fields[0]), unescape(fields[1]));
    }
}

/// Append escaped fields to `line`, each preceded by a tab
pub(crate) fn push_fields(line: &mut String, fields: &[&str]) {
    for field in fields {
        line.push('\t');
        line.push_str(&escape(field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_round_trip() {
        let text = "line one\nline\ttwo \\ done\r";
        let escaped = escape(text);
        assert!(!escaped.contains('\t'));
        assert!(!escaped.contains('\n'));
        assert_eq!(unescape(&escaped), text);
    }

    #[test]
    fn unknown_escape_kept() {
        assert_eq!(unescape("a\\qb"), "a\\qb");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn class_chains() {
        assert_eq!(join_classes(["a/A"]), "a/A");
        assert_eq!(join_classes(["a/A", "a/A$B"]), "a/A.a/A$B");
        assert_eq!(split_classes("a/A.a/A$B"), vec!["a/A", "a/A$B"]);

        let odd = join_classes(["x.y", "tab\there"]);
        assert_eq!(odd, "x\\.y.tab\\there");
        assert_eq!(split_classes(&odd), vec!["x.y", "tab\there"]);
        assert_eq!(split_classes(""), vec![String::new()]);
    }

    #[test]
    fn diff_doc_presence() {
        let mut entry = DiffEntry::dst("a", "b");
        assert!(!entry.has_doc());
        entry.set_doc(&["", "new"]);
        assert!(entry.has_doc());
        assert_eq!(entry.javadoc, Diff::new("", "new"));
    }
}
