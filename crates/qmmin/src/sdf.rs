//! Serialization of a [ParsedMolecule] as an MDL V2000 structure-data record

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use jiff::civil::DateTime;
use log::info;

use crate::{atom::Atom, molecule::ParsedMolecule, transcript::ParseError};

#[cfg(test)]
mod tests;

/// the largest atom count expressible in the three-column counts line
const MAX_ATOMS: usize = 999;

/// the width of each coordinate column in the atom block
const COORD_WIDTH: usize = 10;

/// the record delimiter ending every molecule in an SD file
pub const DELIMITER: &str = "$$$$";

#[derive(Clone, Debug)]
pub struct SdfWriter {
    program: String,
    timestamp: DateTime,
}

impl Default for SdfWriter {
    fn default() -> Self {
        Self::new("qmmin")
    }
}

impl SdfWriter {
    /// a writer stamping records with `program` and the current local time
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            timestamp: jiff::Zoned::now().datetime(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// the second header line: two spaces, the program name in eight
    /// columns, MMDDYYHHmm, and the dimensional code
    fn program_line(&self) -> String {
        let name: String = self.program.chars().take(8).collect();
        format!("  {name:<8}{}3D", self.timestamp.strftime("%m%d%y%H%M"))
    }

    /// write `mol` as a single record, including the trailing [DELIMITER], to
    /// `w`. `dest` only names the destination in the error
    pub fn write<W: Write>(
        &self,
        w: &mut W,
        mol: &ParsedMolecule,
        dest: &str,
    ) -> Result<(), ParseError> {
        let fail = |kind| ParseError::WriteFailed(dest.to_owned(), kind);
        if mol.atoms.len() > MAX_ATOMS
            || !mol.atoms.iter().all(|a| {
                [a.x, a.y, a.z].into_iter().all(fits_coord_column)
            })
        {
            return Err(fail(io::ErrorKind::InvalidInput));
        }
        self.write_record(w, mol).map_err(|e| fail(e.kind()))
    }

    fn write_record<W: Write>(
        &self,
        w: &mut W,
        mol: &ParsedMolecule,
    ) -> io::Result<()> {
        writeln!(w, "{}", mol.title.lines().next().unwrap_or_default())?;
        writeln!(w, "{}", self.program_line())?;
        writeln!(w)?;
        writeln!(
            w,
            "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
            mol.atoms.len(),
            0
        )?;
        for atom in &mol.atoms {
            writeln!(
                w,
                "{:>10.4}{:>10.4}{:>10.4} {:<3}{}",
                atom.x,
                atom.y,
                atom.z,
                atom.label(),
                " 0  0  0  0  0  0  0  0  0  0  0  0",
            )?;
        }
        writeln!(w, "M  END")?;
        for (key, value) in &mol.annotations {
            writeln!(w, "> <{key}>")?;
            writeln!(w, "{value}")?;
            writeln!(w)?;
        }
        writeln!(w, "{DELIMITER}")?;
        Ok(())
    }

    /// create the file at `path` and write `mol` into it
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
        mol: &ParsedMolecule,
    ) -> Result<(), ParseError> {
        self.write_all(path, std::slice::from_ref(mol))
    }

    /// create the file at `path` and write each of `mols` into it in order
    pub fn write_all(
        &self,
        path: impl AsRef<Path>,
        mols: &[ParsedMolecule],
    ) -> Result<(), ParseError> {
        let path = path.as_ref();
        let dest = path.display().to_string();
        info!("writing {} record(s) to {dest}", mols.len());
        let f = File::create(path)
            .map_err(|e| ParseError::WriteFailed(dest.clone(), e.kind()))?;
        let mut w = BufWriter::new(f);
        for mol in mols {
            self.write(&mut w, mol, &dest)?;
        }
        w.flush().map_err(|e| ParseError::WriteFailed(dest, e.kind()))
    }
}

/// read the first record of the SD text `s` back into a [ParsedMolecule]. Only
/// the title, atom block, and data items are recovered; bonds are skipped.
pub fn read_record(s: &str) -> Result<ParsedMolecule, ParseError> {
    let bad = |msg: &str| ParseError::MalformedRecord(msg.to_owned());
    let mut lines = s.lines();
    let title = lines.next().ok_or_else(|| bad("missing header"))?;
    // program and comment lines
    lines.next().ok_or_else(|| bad("missing header"))?;
    lines.next().ok_or_else(|| bad("missing header"))?;

    let counts = lines.next().ok_or_else(|| bad("missing counts line"))?;
    if !counts.trim_end().ends_with("V2000") {
        return Err(bad("only V2000 records are supported"));
    }
    let natoms: usize = column(counts, 0, 3)?
        .parse()
        .map_err(|_| bad("invalid atom count"))?;
    let nbonds: usize = column(counts, 3, 6)?
        .parse()
        .map_err(|_| bad("invalid bond count"))?;

    let mut mol = ParsedMolecule::default().with_title(title.trim_end());
    for _ in 0..natoms {
        let line = lines.next().ok_or_else(|| bad("missing atom line"))?;
        let coord = |start: usize| -> Result<f64, ParseError> {
            column(line, start, start + 10)?
                .parse()
                .map_err(|_| bad("invalid coordinate"))
        };
        let (x, y, z) = (coord(0)?, coord(10)?, coord(20)?);
        let symbol = line
            .get(31..)
            .and_then(|s| s.split_whitespace().next())
            .ok_or_else(|| bad("missing atom symbol"))?;
        let atom = Atom::from_label(symbol, x, y, z)
            .ok_or_else(|| bad("unknown atom symbol"))?;
        mol.atoms.push(atom);
    }
    for _ in 0..nbonds {
        lines.next().ok_or_else(|| bad("missing bond line"))?;
    }

    let mut key = None;
    for line in lines {
        if line.starts_with(DELIMITER) {
            break;
        } else if let Some(rest) = line.strip_prefix('>') {
            key = rest
                .split_once('<')
                .and_then(|(_, k)| k.split_once('>'))
                .map(|(k, _)| k.to_owned());
        } else if let Some(k) = &key {
            // single-line values only; the blank line after each ends the item
            if !line.is_empty() {
                mol.annotate(k.as_str(), line);
            }
            key = None;
        }
    }

    Ok(mol)
}

/// whether `v` can be written in the `10.4` coordinate format without
/// overflowing its column
fn fits_coord_column(v: f64) -> bool {
    v.is_finite() && format!("{v:.4}").len() <= COORD_WIDTH
}

/// the trimmed contents of the fixed-width columns `start..end` of `line`
fn column(line: &str, start: usize, end: usize) -> Result<&str, ParseError> {
    line.get(start..end)
        .map(str::trim)
        .ok_or_else(|| ParseError::MalformedRecord(String::from("short line")))
}
