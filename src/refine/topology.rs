use std::fmt;
use std::ops::Range;

use indexmap::IndexMap;

use crate::raw::RawTopology;


/// Ion types and per-type counts of the calculated structure.
///
/// VASP stores atoms grouped by type, so every element occupies one
/// contiguous index range.
#[derive(Debug, Clone)]
pub struct Topology {
    ion_types        : Vec<String>,
    number_ion_types : Vec<usize>,
}

impl Topology {
    pub fn from_raw(raw: RawTopology) -> Self {
        Self {
            ion_types:        raw.ion_types,
            number_ion_types: raw.number_ion_types,
        }
    }

    pub fn elements(&self) -> &[String] {
        &self.ion_types
    }

    pub fn number_atoms(&self) -> usize {
        self.number_ion_types.iter().sum()
    }

    /// 0-based index range of the atoms of `element`, `None` for an element
    /// not present in the structure.
    pub fn atom_range(&self, element: &str) -> Option<Range<usize>> {
        let mut offset = 0usize;
        for (ty, &count) in self.ion_types.iter().zip(self.number_ion_types.iter()) {
            if ty == element {
                return Some(offset .. offset + count);
            }
            offset += count;
        }
        None
    }

    /// Element name -> 1-based inclusive atom index range, in storage order.
    pub fn to_dict(&self) -> IndexMap<String, (usize, usize)> {
        let mut ranges = IndexMap::new();
        let mut offset = 0usize;
        for (ty, &count) in self.ion_types.iter().zip(self.number_ion_types.iter()) {
            ranges.insert(ty.clone(), (offset + 1, offset + count));
            offset += count;
        }
        ranges
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (ty, &count) in self.ion_types.iter().zip(self.number_ion_types.iter()) {
            write!(f, "{}", ty)?;
            if count > 1 {
                write!(f, "{}", count)?;
            }
        }
        Ok(())
    }
}
