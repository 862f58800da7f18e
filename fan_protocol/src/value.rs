/*!
Decoded parameter values.

A [`ParameterValue`] keeps the raw bytes the controller sent for one address;
integer, boolean and text views are computed on demand.
*/

use crate::catalog::{Catalog, ParameterDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterValue {
    pub address: u8,
    pub raw: Vec<u8>,
}

impl ParameterValue {
    pub fn new(address: u8, raw: Vec<u8>) -> Self {
        Self { address, raw }
    }

    /// Integer view.
    ///
    /// Empty values read as 0 and single bytes as their unsigned value. Longer
    /// values use their first two bytes as a signed 16-bit little-endian
    /// integer, which is how the controller lays out multi-byte numbers.
    pub fn as_int(&self) -> i32 {
        match self.raw.as_slice() {
            [] => 0,
            [b] => i32::from(*b),
            [lo, hi, ..] => i32::from(i16::from_le_bytes([*lo, *hi])),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.as_int() == 1
    }

    /// Text view, raw bytes as ASCII
    pub fn as_text(&self) -> String {
        self.raw
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { '?' })
            .collect()
    }

    /// Catalog entry for this value's address
    pub fn definition(&self) -> Option<&'static ParameterDefinition> {
        Catalog::standard().lookup(self.address)
    }

    /// Display label from the catalog value mapping, if the address has one
    pub fn mapped(&self) -> Option<&'static str> {
        self.definition()?.map_value(self.as_int())
    }
}

impl std::fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = self.definition().map_or("unknown", |d| d.label);
        write!(f, "{}/{:#06x} - {}: {}", self.address, self.address, label, self.as_int())?;
        match self.mapped() {
            Some(mapped) => write!(f, " ({})", mapped),
            None => write!(f, " / {}", self.as_text()),
        }
    }
}
