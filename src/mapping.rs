//! Mapping from source-file columns to the canonical observation fields.
//!
//! A user supplies a free-form `field -> column` dictionary; it is turned
//! into a [`ColumnMapping`] where every field is either bound to a column
//! or explicitly unbound, then resolved against the file's header row.

use crate::error::MappingError;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Vendor,
    OnTimeDeliveries,
    TotalDeliveries,
    Defects,
    TotalUnits,
    Spend,
    Compliant,
    LeadTime,
    Category,
    Region,
    Date,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Vendor,
        Field::OnTimeDeliveries,
        Field::TotalDeliveries,
        Field::Defects,
        Field::TotalUnits,
        Field::Spend,
        Field::Compliant,
        Field::LeadTime,
        Field::Category,
        Field::Region,
        Field::Date,
    ];

    /// Canonical column name.
    pub fn name(self) -> &'static str {
        match self {
            Field::Vendor => "Vendor",
            Field::OnTimeDeliveries => "OnTimeDeliveries",
            Field::TotalDeliveries => "TotalDeliveries",
            Field::Defects => "Defects",
            Field::TotalUnits => "TotalUnits",
            Field::Spend => "Spend",
            Field::Compliant => "Compliant",
            Field::LeadTime => "LeadTime",
            Field::Category => "Category",
            Field::Region => "Region",
            Field::Date => "Date",
        }
    }

    /// Aggregation cannot run without these. Category, region and date only
    /// feed filters, which pass everything when their column is absent.
    pub fn is_required(self) -> bool {
        !matches!(self, Field::Category | Field::Region | Field::Date)
    }

    pub fn from_name(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Column(String),
    Unbound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    bindings: HashMap<Field, Binding>,
}

impl ColumnMapping {
    /// Bind every field to the identically named header, if there is one.
    pub fn identity(headers: &[&str]) -> Self {
        let bindings = Field::ALL
            .into_iter()
            .map(|f| {
                let b = if headers.iter().any(|h| h.trim() == f.name()) {
                    Binding::Column(f.name().to_string())
                } else {
                    Binding::Unbound
                };
                (f, b)
            })
            .collect();
        ColumnMapping { bindings }
    }

    /// Build from a user dictionary. Fields missing from the dictionary
    /// fall back to the identity binding; `None`, `"none"`, `"(None)"` and
    /// blank values unbind the field explicitly. Two keys naming the same
    /// field are rejected.
    pub fn from_pairs(
        headers: &[&str],
        pairs: &HashMap<String, Option<String>>,
    ) -> Result<Self, MappingError> {
        let mut mapping = ColumnMapping::identity(headers);
        let mut seen = HashSet::new();
        for (field_name, column) in pairs {
            let field = Field::from_name(field_name)
                .ok_or_else(|| MappingError::UnknownField(field_name.clone()))?;
            // Keys match case-insensitively, so "vendor" and "Vendor" collide.
            if !seen.insert(field) {
                return Err(MappingError::DuplicateField(field.name()));
            }
            let binding = match column.as_deref().map(str::trim) {
                None => Binding::Unbound,
                Some(c) if c.is_empty() || c.eq_ignore_ascii_case("none") || c == "(None)" => {
                    Binding::Unbound
                }
                Some(c) => Binding::Column(c.to_string()),
            };
            mapping.bindings.insert(field, binding);
        }
        Ok(mapping)
    }

    pub fn binding(&self, field: Field) -> &Binding {
        self.bindings.get(&field).unwrap_or(&Binding::Unbound)
    }

    /// Check the mapping against a header row and return column indices.
    pub fn resolve(&self, headers: &[&str]) -> Result<ResolvedColumns, MappingError> {
        let mut indices = HashMap::new();
        for field in Field::ALL {
            match self.binding(field) {
                Binding::Unbound if field.is_required() => {
                    return Err(MappingError::RequiredFieldUnbound(field.name()));
                }
                Binding::Unbound => {}
                Binding::Column(column) => {
                    let idx = headers
                        .iter()
                        .position(|h| h.trim() == column.trim())
                        .ok_or_else(|| MappingError::ColumnNotFound {
                            field: field.name(),
                            column: column.clone(),
                        })?;
                    indices.insert(field, idx);
                }
            }
        }
        Ok(ResolvedColumns { indices })
    }
}

/// Header positions for every bound field.
#[derive(Debug, Clone)]
pub struct ResolvedColumns {
    indices: HashMap<Field, usize>,
}

impl ResolvedColumns {
    pub fn index(&self, field: Field) -> Option<usize> {
        self.indices.get(&field).copied()
    }

    pub fn is_bound(&self, field: Field) -> bool {
        self.indices.contains_key(&field)
    }

    /// Cell for `field` in `record`, or `None` when unbound or short row.
    pub fn get<'r>(&self, record: &'r csv::StringRecord, field: Field) -> Option<&'r str> {
        self.index(field).and_then(|i| record.get(i))
    }
}
