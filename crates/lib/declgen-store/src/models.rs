use serde::{Deserialize, Serialize};

use crate::schema::is_identifier;

/// A single name/value pair nested within a declaration block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConstantEntry {
    pub name: String,
    pub raw_value: String,
}

impl ConstantEntry {
    /// Builds an entry, rejecting names that are not identifiers and empty values.
    pub fn new(name: impl Into<String>, raw_value: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let raw_value = raw_value.into();
        if !is_identifier(&name) || raw_value.trim().is_empty() {
            return None;
        }
        Some(Self { name, raw_value })
    }
}

/// One `declare <kind> <name> { ... }` unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeclarationRecord {
    pub kind: String,
    pub name: String,
    /// Entries in first-seen source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<ConstantEntry>,
}

impl DeclarationRecord {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn push_member(&mut self, entry: ConstantEntry) {
        self.members.push(entry);
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A line inside an open table that matched no known pattern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the source listing.
    pub line: usize,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_entry_enforces_invariants() {
        assert!(ConstantEntry::new("RED", "1").is_some());
        assert!(ConstantEntry::new("1RED", "1").is_none());
        assert!(ConstantEntry::new("RED", "  ").is_none());
    }

    #[test]
    fn record_preserves_member_order() {
        let mut record = DeclarationRecord::new("enum", "Color");
        for (name, value) in [("RED", "1"), ("GREEN", "2"), ("BLUE", "3")] {
            record.push_member(ConstantEntry::new(name, value).expect("valid entry"));
        }

        let names: Vec<_> = record.members.iter().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, ["RED", "GREEN", "BLUE"]);
        assert_eq!(record.member_count(), 3);
        assert!(!record.is_empty());
    }
}
