//! Mapping-file parsing
//!
//! A mapping file holds one `unit;namespace.path` record per line. Blank
//! lines are skipped; every other line must yield two non-empty fields.

use crate::{
    types::{directory_path, is_plain_name, Record},
    PackageifyError, Result,
};
use std::collections::HashSet;
use std::path::Path;

/// Ordered records parsed from a mapping file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionTable {
    records: Vec<Record>,
}

impl DefinitionTable {
    /// Parse mapping-file contents, preserving line order
    ///
    /// Lines are split on every `delimiter`; fields past the second are
    /// ignored. Duplicate unit names are kept.
    pub fn parse(contents: &str, delimiter: char) -> Result<Self> {
        let mut records = Vec::new();

        for (index, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            records.push(parse_line(line, index + 1, delimiter)?);
        }

        Ok(Self { records })
    }

    /// Read and parse a mapping file
    pub fn from_file(path: &Path, delimiter: char) -> Result<Self> {
        let contents = packageify_utils::read_text_file(path)
            .map_err(PackageifyError::util_at(path))?;
        Self::parse(&contents, delimiter)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record for `unit_name`
    pub fn get(&self, unit_name: &str) -> Option<&Record> {
        self.records.iter().find(|record| record.unit_name == unit_name)
    }

    pub fn contains_unit(&self, unit_name: &str) -> bool {
        self.get(unit_name).is_some()
    }

    /// Distinct namespace paths in first-seen order
    pub fn namespaces(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|record| record.namespace_path.as_str())
            .filter(|path| seen.insert(*path))
            .collect()
    }

    /// Unit names listed more than once, in order of their second appearance
    pub fn duplicate_units(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        self.records
            .iter()
            .map(|record| record.unit_name.as_str())
            .filter(|unit| !seen.insert(*unit) && reported.insert(*unit))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DefinitionTable {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn parse_line(line: &str, line_number: usize, delimiter: char) -> Result<Record> {
    let malformed = |reason: String| PackageifyError::MalformedDefinition {
        line_number,
        line: line.to_string(),
        reason,
    };

    if !line.contains(delimiter) {
        return Err(malformed(format!("expected '{}' in definition", delimiter)));
    }

    let mut fields: Vec<&str> = line.split(delimiter).collect();
    // trailing empty fields do not count towards the two required
    while fields.last().is_some_and(|field| field.is_empty()) {
        fields.pop();
    }

    if fields.len() < 2 {
        return Err(malformed(format!("expected two strings around '{}'", delimiter)));
    }
    if fields[0].is_empty() || fields[1].is_empty() {
        return Err(malformed(format!("expected two non-empty strings around '{}'", delimiter)));
    }
    if !is_plain_name(fields[0]) {
        return Err(malformed("unit name must be a plain file name".to_string()));
    }
    if directory_path(fields[1]).is_none() {
        return Err(malformed("namespace path must map to a relative directory".to_string()));
    }

    Ok(Record::new(fields[0], fields[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use proptest::prelude::*;

    const SAMPLE: &str = "AnimatedSprite;com.marcusman.graphics\n\
                          Game;com.marcusman\n\
                          \n\
                          GameObject;com.marcusman.utils\n\
                          Rectangle;com.marcusman.utils\n";

    #[test]
    fn test_parse_preserves_order_and_skips_blank_lines() -> Result<()> {
        let table = DefinitionTable::parse(SAMPLE, ';')?;

        let units: Vec<&str> = table.iter().map(|r| r.unit_name.as_str()).collect();
        assert_eq!(units, vec!["AnimatedSprite", "Game", "GameObject", "Rectangle"]);
        assert_eq!(table.get("Game").map(|r| r.namespace_path.as_str()), Some("com.marcusman"));
        assert_eq!(
            table.namespaces(),
            vec!["com.marcusman.graphics", "com.marcusman", "com.marcusman.utils"]
        );
        Ok(())
    }

    #[test]
    fn test_crlf_lines() -> Result<()> {
        let table = DefinitionTable::parse("Game;com.marcusman\r\nMap;com.marcusman.logic\r\n", ';')?;
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1], Record::new("Map", "com.marcusman.logic"));
        Ok(())
    }

    #[test]
    fn test_extra_fields_ignored() -> Result<()> {
        let table = DefinitionTable::parse("Game;com.marcusman;ignored;also", ';')?;
        assert_eq!(table.records(), &[Record::new("Game", "com.marcusman")]);
        Ok(())
    }

    #[test]
    fn test_malformed_lines() {
        for line in ["Game", "Game;", ";com.marcusman", ";", "Game;;com.marcusman", " "] {
            let err = DefinitionTable::parse(line, ';').unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedDefinition, "line {:?}", line);
        }
    }

    #[test]
    fn test_malformed_reports_line_number() {
        let err = DefinitionTable::parse("Game;com\n\nBroken\n", ';').unwrap_err();
        match err {
            PackageifyError::MalformedDefinition { line_number, line, .. } => {
                assert_eq!(line_number, 3);
                assert_eq!(line, "Broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_path_escapes_rejected() {
        for line in ["Game;com./tmp/escaped", "Game;/etc", "/tmp/Game;com", "../Game;com", "Game;..."] {
            let err = DefinitionTable::parse(line, ';').unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedDefinition, "line {:?}", line);
        }
    }

    #[test]
    fn test_duplicates_kept_and_reported() -> Result<()> {
        let table = DefinitionTable::parse("A;p1\nB;p2\nA;p3\nA;p4\n", ';')?;
        assert_eq!(table.len(), 4);
        assert_eq!(table.duplicate_units(), vec!["A"]);
        assert_eq!(table.get("A").map(|r| r.namespace_path.as_str()), Some("p1"));
        Ok(())
    }

    #[test]
    fn test_custom_delimiter() -> Result<()> {
        let table = DefinitionTable::parse("Widget,Acme.Ui", ',')?;
        assert_eq!(table.records(), &[Record::new("Widget", "Acme.Ui")]);
        assert!(DefinitionTable::parse("Widget;Acme.Ui", ',').is_err());
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_well_formed_lines_parse_exactly(
            name in "[A-Za-z_][A-Za-z0-9_]{0,12}",
            path in "[a-z]{1,6}(\\.[a-z]{1,6}){0,4}",
        ) {
            let table = DefinitionTable::parse(&format!("{name};{path}"), ';').unwrap();
            prop_assert_eq!(table.records(), &[Record::new(name, path)][..]);
        }

        #[test]
        fn prop_lines_without_delimiter_fail(line in "[A-Za-z0-9_. ]{1,20}") {
            let err = DefinitionTable::parse(&line, ';').unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::MalformedDefinition);
        }
    }
}
