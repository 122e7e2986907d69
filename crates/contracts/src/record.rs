//! Record layouts - how a fixed-size native struct maps to host fields.

use serde::{Deserialize, Serialize};

use crate::{ContractError, Unit};

/// One host field inside a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Host-side field name, e.g. "VELOCITY BODY Z"
    pub name: String,
    /// Index for indexed host variables
    #[serde(default)]
    pub index: Option<u32>,
    /// Unit the host delivers the field in
    #[serde(default)]
    pub unit: Unit,
    /// Byte offset inside the record
    pub offset: usize,
    /// Byte size of the field
    pub size: usize,
}

impl FieldDescriptor {
    /// A field of `size` bytes at `offset`
    pub fn new(name: impl Into<String>, unit: Unit, offset: usize, size: usize) -> Self {
        Self {
            name: name.into(),
            index: None,
            unit,
            offset,
            size,
        }
    }

    /// Builder-style index setter
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    /// Byte just past the end of this field
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Lay out consecutive `f64` fields starting at offset 0
    ///
    /// Covers the common case of a `#[repr(C)]` struct made only of `f64`s.
    pub fn f64_fields<'a>(fields: impl IntoIterator<Item = (&'a str, Unit)>) -> Vec<Self> {
        const F64_SIZE: usize = std::mem::size_of::<f64>();
        fields
            .into_iter()
            .enumerate()
            .map(|(i, (name, unit))| Self::new(name, unit, i * F64_SIZE, F64_SIZE))
            .collect()
    }
}

/// Check that `fields` describe a record of `record_size` bytes.
///
/// Fields must be non-empty, non-zero sized, inside the record and must not
/// overlap each other.
pub fn validate_layout(
    name: &str,
    fields: &[FieldDescriptor],
    record_size: usize,
) -> Result<(), ContractError> {
    if fields.is_empty() {
        return Err(ContractError::invalid_layout(name, "no fields"));
    }

    let mut sorted: Vec<&FieldDescriptor> = fields.iter().collect();
    sorted.sort_by_key(|f| f.offset);

    let mut cursor = 0usize;
    for field in sorted {
        if field.size == 0 {
            return Err(ContractError::invalid_layout(
                name,
                format!("field '{}' has zero size", field.name),
            ));
        }
        if field.offset < cursor {
            return Err(ContractError::invalid_layout(
                name,
                format!("field '{}' overlaps previous field", field.name),
            ));
        }
        if field.end() > record_size {
            return Err(ContractError::invalid_layout(
                name,
                format!(
                    "field '{}' ends at byte {} past record size {}",
                    field.name,
                    field.end(),
                    record_size
                ),
            ));
        }
        cursor = field.end();
    }

    Ok(())
}
