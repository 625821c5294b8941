use std::{fmt::Display, str::FromStr};

use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Atom {
    pub atomic_number: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, Self::default_epsilon())
    }
}

impl AbsDiffEq for Atom {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        1e-8
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() < epsilon;
        self.atomic_number == other.atomic_number
            && close(self.x, other.x)
            && close(self.y, other.y)
            && close(self.z, other.z)
    }
}

/// The ways a single line of an atom table can fail to describe an [Atom]
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AtomError {
    /// the line did not split into exactly four fields
    FieldCount(usize),
    /// a coordinate field was not a valid f64
    Coord(String),
    /// the first field is not a symbol in [NUMBER_TO_SYMBOL]
    Symbol(String),
}

impl Display for AtomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomError::FieldCount(n) => {
                write!(f, "expected 4 fields in atom line, found {n}")
            }
            AtomError::Coord(c) => {
                write!(f, "failed to parse coordinate `{c}` as f64")
            }
            AtomError::Symbol(s) => write!(f, "unknown atomic symbol `{s}`"),
        }
    }
}

impl std::error::Error for AtomError {}

impl FromStr for Atom {
    type Err = AtomError;

    /// parse an Atom from a line like
    ///  C 1.0 1.0 1.0
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<_> = s.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(AtomError::FieldCount(fields.len()));
        }
        let mut coord = [0.0; 3];
        for (c, field) in coord.iter_mut().zip(&fields[1..]) {
            *c = field
                .parse()
                .map_err(|_| AtomError::Coord(field.to_string()))?;
        }
        let [x, y, z] = coord;
        Self::from_label(fields[0], x, y, z)
            .ok_or_else(|| AtomError::Symbol(fields[0].to_owned()))
    }
}

/// The closed table of element symbols, indexed by atomic number. Index 0 is a
/// placeholder and never resolved from a label.
pub const NUMBER_TO_SYMBOL: [&str; 119] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg",
    "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn",
    "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb",
    "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta",
    "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At",
    "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt",
    "Ds", "Rg", "Cn", "Nh", "Fl", "Mc", "Lv", "Ts", "Og",
];

fn symbol_to_number(s: &str) -> Option<usize> {
    NUMBER_TO_SYMBOL
        .iter()
        .skip(1)
        .position(|&x| x == s)
        .map(|i| i + 1)
}

fn titlecase(s: &str) -> String {
    let mut cs = s.chars();
    let Some(first) = cs.next() else {
        return String::new();
    };
    let mut ret = first.to_uppercase().to_string();
    for c in cs {
        ret.extend(c.to_lowercase());
    }
    ret
}

impl Atom {
    pub fn new(atomic_number: usize, x: f64, y: f64, z: f64) -> Self {
        Self {
            atomic_number,
            x,
            y,
            z,
        }
    }

    /// look up `atomic_symbol` in [NUMBER_TO_SYMBOL], first exactly and then in
    /// title case, so `CL` and `cl` both resolve to chlorine
    pub fn from_label(
        atomic_symbol: &str,
        x: f64,
        y: f64,
        z: f64,
    ) -> Option<Self> {
        let number = symbol_to_number(atomic_symbol)
            .or_else(|| symbol_to_number(&titlecase(atomic_symbol)))?;
        Some(Self::new(number, x, y, z))
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        NUMBER_TO_SYMBOL.get(self.atomic_number).copied().unwrap_or("X")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titlecase() {
        assert_eq!(super::titlecase("AL"), "Al");
        assert_eq!(super::titlecase("Al"), "Al");
        assert_eq!(super::titlecase("al"), "Al");
        assert_eq!(super::titlecase("H"), "H");
        assert_eq!(super::titlecase("h"), "H");
        assert_eq!(super::titlecase(""), "");
    }

    #[test]
    fn from_label() {
        let atom = |s| Atom::from_label(s, 0.0, 0.0, 0.0);
        assert_eq!(atom("O").unwrap().atomic_number, 8);
        assert_eq!(atom("CL").unwrap().label(), "Cl");
        assert_eq!(atom("Og").unwrap().atomic_number, 118);
        assert!(atom("X").is_none());
        assert!(atom("Gh").is_none());
        assert!(atom("C1").is_none());
    }

    #[test]
    fn from_str() {
        let got: Atom = "  H 0.000 -0.757 0.587 ".parse().unwrap();
        assert_eq!(got, Atom::new(1, 0.0, -0.757, 0.587));

        assert_eq!(
            "C 1.0 2.0 abc".parse::<Atom>(),
            Err(AtomError::Coord("abc".to_owned()))
        );
        assert_eq!(
            "C 1.0 2.0".parse::<Atom>(),
            Err(AtomError::FieldCount(3))
        );
        assert_eq!(
            "Q 1.0 2.0 3.0".parse::<Atom>(),
            Err(AtomError::Symbol("Q".to_owned()))
        );
    }
}
