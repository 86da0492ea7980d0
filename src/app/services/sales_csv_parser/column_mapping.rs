//! Column resolution for free-form export headers
//!
//! This module maps each canonical field onto one physical column using an
//! ordered policy: exact label, then substring rules, then a positional
//! fallback for the date column only. A physical column is never assigned to
//! two fields.

use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::app::models::CanonicalField;
use crate::config::{ColumnLabels, FieldLabels};
use crate::constants::HEADER_TRIM_CHARS;
use crate::{Error, Result};

/// Field order of the substring pass
///
/// Fields whose labels contain other fields' tokens ("Valor [Documentos ...]"
/// contains "doc") claim their columns first.
pub const VARIANT_PASS_ORDER: [CanonicalField; 7] = [
    CanonicalField::Amount,
    CanonicalField::CancellationReason,
    CanonicalField::Date,
    CanonicalField::Family,
    CanonicalField::Salesperson,
    CanonicalField::Customer,
    CanonicalField::DocumentCode,
];

/// Column used for the date when no label matches
pub const DATE_FALLBACK_INDEX: usize = 0;

/// How a column was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Variant,
    Positional,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchKind::Exact => "exact",
            MatchKind::Variant => "variant",
            MatchKind::Positional => "positional",
        };
        f.write_str(s)
    }
}

/// One resolved field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnAssignment {
    pub index: usize,
    pub label: String,
    pub kind: MatchKind,
}

/// Canonical field to physical column mapping for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    assignments: BTreeMap<CanonicalField, ColumnAssignment>,
}

impl ColumnMap {
    /// Resolve all canonical fields against a cleaned header
    pub fn resolve(source_name: &str, header: &[String], labels: &ColumnLabels) -> Result<Self> {
        let mut map = ColumnMap::default();
        let lowered: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();

        // Pass 1: exact canonical label
        for field in CanonicalField::ALL {
            let rules = labels.for_field(field);
            if rules.exact.is_empty() {
                continue;
            }
            if let Some(index) = header
                .iter()
                .enumerate()
                .position(|(i, h)| *h == rules.exact && !map.is_claimed(i))
            {
                map.assign(field, index, &header[index], MatchKind::Exact);
            }
        }

        // Pass 2: substring rules, leftmost unclaimed column per rule
        for field in VARIANT_PASS_ORDER {
            if map.get(field).is_some() {
                continue;
            }
            if let Some(index) = find_variant(labels.for_field(field), &lowered, &map) {
                map.assign(field, index, &header[index], MatchKind::Variant);
            }
        }

        // Pass 3: positional fallback, required date only
        if map.get(CanonicalField::Date).is_none()
            && DATE_FALLBACK_INDEX < header.len()
            && !map.is_claimed(DATE_FALLBACK_INDEX)
        {
            map.assign(
                CanonicalField::Date,
                DATE_FALLBACK_INDEX,
                &header[DATE_FALLBACK_INDEX],
                MatchKind::Positional,
            );
        }

        for field in CanonicalField::ALL {
            if field.is_required() && map.get(field).is_none() {
                return Err(Error::required_column_missing(source_name, field));
            }
        }

        for (field, assignment) in &map.assignments {
            debug!(
                "Column {} -> #{} '{}' ({})",
                field, assignment.index, assignment.label, assignment.kind
            );
        }

        Ok(map)
    }

    fn assign(&mut self, field: CanonicalField, index: usize, label: &str, kind: MatchKind) {
        self.assignments.insert(
            field,
            ColumnAssignment {
                index,
                label: label.to_string(),
                kind,
            },
        );
    }

    fn is_claimed(&self, index: usize) -> bool {
        self.assignments.values().any(|a| a.index == index)
    }

    /// Physical column of a field, `None` when absent
    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.assignments.get(&field).map(|a| a.index)
    }

    pub fn assignment(&self, field: CanonicalField) -> Option<&ColumnAssignment> {
        self.assignments.get(&field)
    }

    pub fn is_absent(&self, field: CanonicalField) -> bool {
        !self.assignments.contains_key(&field)
    }

    /// Resolved fields in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &ColumnAssignment)> {
        self.assignments.iter().map(|(f, a)| (*f, a))
    }

    /// Get statistics about the mapping: (resolved, exact, variant, positional)
    pub fn stats(&self) -> (usize, usize, usize, usize) {
        let count = |kind| self.assignments.values().filter(|a| a.kind == kind).count();
        (
            self.assignments.len(),
            count(MatchKind::Exact),
            count(MatchKind::Variant),
            count(MatchKind::Positional),
        )
    }
}

fn find_variant(rules: &FieldLabels, lowered: &[String], map: &ColumnMap) -> Option<usize> {
    rules.variants.iter().find_map(|rule| {
        lowered.iter().enumerate().position(|(i, header)| {
            !map.is_claimed(i)
                && rule
                    .iter()
                    .all(|token| header.contains(token.to_lowercase().as_str()))
        })
    })
}

/// Trim whitespace and stray quotes from a header cell
pub fn clean_header_cell(cell: &str) -> String {
    cell.trim_matches(|c: char| HEADER_TRIM_CHARS.contains(&c) || c.is_whitespace())
        .to_string()
}
