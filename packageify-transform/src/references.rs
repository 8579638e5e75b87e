//! Cross-reference detection
//!
//! A unit references another when the other's name occurs anywhere in its
//! body after quoted literals are removed. No word boundaries, no parsing.

use crate::{definitions::DefinitionTable, types::Record};
use packageify_utils::strip_quoted_literals;

/// Records referenced from `body`, in table order
///
/// Records sharing `current`'s unit name are never reported.
pub fn detect_references<'a>(
    body: &str,
    table: &'a DefinitionTable,
    current: &Record,
) -> Vec<&'a Record> {
    let code = strip_quoted_literals(body);

    table
        .iter()
        .filter(|other| other.unit_name != current.unit_name)
        .filter(|other| code.contains(other.unit_name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(lines: &str) -> DefinitionTable {
        DefinitionTable::parse(lines, ';').unwrap()
    }

    fn names(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.qualified_name()).collect()
    }

    #[test]
    fn test_reference_outside_literal() {
        let table = table("A;p1\nB;p2\n");
        let a = table.get("A").unwrap();

        let found = detect_references("class A { B b; }", &table, a);
        assert_eq!(names(&found), vec!["p2.B"]);
    }

    #[test]
    fn test_reference_only_inside_literal_is_ignored() {
        let table = table("A;p1\nB;p2\n");
        let a = table.get("A").unwrap();

        assert!(detect_references(r#"class A { String s = "B"; char c = 'B'; }"#, &table, a).is_empty());
    }

    #[test]
    fn test_table_order_and_substring_false_positive() {
        let table = table("Main;app\nMapEditor;app.tools\nMap;app.logic\n");
        let main = table.get("Main").unwrap();

        let found = detect_references("class Main { MapEditor editor; }", &table, main);
        assert_eq!(names(&found), vec!["app.tools.MapEditor", "app.logic.Map"]);
    }

    #[test]
    fn test_same_name_records_are_not_self_references() {
        let table = table("A;p1\nA;p2\nB;p3\n");
        let first = &table.records()[0];

        let found = detect_references("class A { B b; A other; }", &table, first);
        assert_eq!(names(&found), vec!["p3.B"]);
    }
}
