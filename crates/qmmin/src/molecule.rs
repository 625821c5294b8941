use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::atom::Atom;

/// The geometry and annotations extracted from a single transcript
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedMolecule {
    /// written as the first header line of the record
    pub title: String,
    pub atoms: Vec<Atom>,
    pub annotations: BTreeMap<String, String>,
}

impl ParsedMolecule {
    pub fn new(atoms: Vec<Atom>) -> Self {
        Self {
            atoms,
            ..Default::default()
        }
    }

    /// every coordinate is Cartesian 3D
    pub const fn dimension(&self) -> usize {
        3
    }

    pub fn annotate(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.annotations.insert(key.into(), value.into());
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// format `energy` as the shortest decimal string that parses back to the same
/// f64, always keeping a decimal point so that whole numbers read as `-1.0`
/// rather than `-1`
pub fn format_energy(energy: f64) -> String {
    let s = energy.to_string();
    if energy.is_finite() && !s.contains('.') {
        s + ".0"
    } else {
        s
    }
}
