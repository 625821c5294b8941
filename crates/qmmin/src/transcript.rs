//! Extraction of the final energy and optimized geometry from the console log
//! of a geometry optimization

use std::{
    error::Error,
    fmt::Display,
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use log::{debug, trace, warn};
use regex::Regex;
use serde::Serialize;

use crate::{
    atom::Atom,
    config::Config,
    molecule::{ParsedMolecule, format_energy},
};


#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// the token at the end of an energy line is not a number
    MalformedEnergy { line: usize, token: String },
    /// a line inside the atom table does not describe an atom
    MalformedGeometry { line: usize, reason: String },
    /// the transcript never contained a non-empty geometry block
    NoGeometryFound,
    /// the transcript could not be opened or read
    ReadFailed(String, io::ErrorKind),
    /// the record could not be written to its destination
    WriteFailed(String, io::ErrorKind),
    /// text handed to [crate::sdf::read_record] is not a record
    MalformedRecord(String),
}

impl ParseError {
    /// Returns `true` if the parse error is [`NoGeometryFound`].
    ///
    /// [`NoGeometryFound`]: ParseError::NoGeometryFound
    #[must_use]
    pub fn is_no_geometry(&self) -> bool {
        matches!(self, Self::NoGeometryFound)
    }

    /// Returns `true` if the parse error is [`MalformedGeometry`].
    ///
    /// [`MalformedGeometry`]: ParseError::MalformedGeometry
    #[must_use]
    pub fn is_malformed_geometry(&self) -> bool {
        matches!(self, Self::MalformedGeometry { .. })
    }

    /// Returns `true` if the parse error is [`MalformedEnergy`].
    ///
    /// [`MalformedEnergy`]: ParseError::MalformedEnergy
    #[must_use]
    pub fn is_malformed_energy(&self) -> bool {
        matches!(self, Self::MalformedEnergy { .. })
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for ParseError {}

/// A successfully parsed transcript. `success` records whether the transcript
/// ended with the expected success line, but a molecule is returned either
/// way.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Parsed {
    pub molecule: ParsedMolecule,
    pub success: bool,
}

/// Where the scan is inside the transcript
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Scan,
    /// discarding this many more header lines before the atom table
    Skip(usize),
    Geom,
}

/// A parser for one transcript layout, built once from a [Config] and reused
/// for any number of transcripts
#[derive(Clone, Debug)]
pub struct Transcript {
    energy_re: Regex,
    geom_re: Regex,
    skip_lines: usize,
    success_marker: String,
    energy_field: String,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

fn prefix_regex(marker: &str) -> Regex {
    // escaped literals always compile
    Regex::new(&format!("^{}", regex::escape(marker.trim())))
        .expect("escaped marker is a valid regex")
}

impl Transcript {
    pub fn new(config: &Config) -> Self {
        trace!("initializing transcript regexes");
        Self {
            energy_re: prefix_regex(&config.energy_marker),
            geom_re: prefix_regex(&config.geometry_marker),
            skip_lines: config.skip_lines,
            success_marker: config.success_marker.trim().to_owned(),
            energy_field: config.energy_field.clone(),
        }
    }

    /// open and parse the transcript at `path`
    pub fn read_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Parsed, ParseError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let f = File::open(path)
            .map_err(|e| ParseError::ReadFailed(name.clone(), e.kind()))?;
        self.parse_reader(BufReader::new(f), &name)
    }

    /// parse the lines of `r`, using `name` to identify the transcript in log
    /// messages and errors
    pub fn parse_reader<R: BufRead>(
        &self,
        r: R,
        name: &str,
    ) -> Result<Parsed, ParseError> {
        self.scan(r.lines(), name)
    }

    pub fn parse_str(&self, s: &str) -> Result<Parsed, ParseError> {
        self.parse_lines(s.lines())
    }

    pub fn parse_lines<I, S>(&self, lines: I) -> Result<Parsed, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scan(lines.into_iter().map(Ok::<S, io::Error>), "<lines>")
    }

    fn scan<I, S>(&self, lines: I, name: &str) -> Result<Parsed, ParseError>
    where
        I: Iterator<Item = io::Result<S>>,
        S: AsRef<str>,
    {
        let mut energy = 0.0;
        let mut state = State::Scan;
        let mut block = Vec::new();
        let mut atoms: Option<Vec<Atom>> = None;
        let mut trailing = String::new();

        for (i, line) in lines.enumerate() {
            let line = line.map_err(|e| {
                ParseError::ReadFailed(name.to_owned(), e.kind())
            })?;
            let line = line.as_ref().trim();
            let lineno = i + 1;
            if !line.is_empty() {
                trailing.clear();
                trailing.push_str(line);
            }
            match state {
                State::Skip(n) => {
                    state = if n > 1 {
                        State::Skip(n - 1)
                    } else {
                        State::Geom
                    };
                }
                State::Geom if line.is_empty() => {
                    state = State::Scan;
                    finish_block(&mut block, &mut atoms);
                }
                State::Geom => {
                    let atom = line.parse::<Atom>().map_err(|e| {
                        ParseError::MalformedGeometry {
                            line: lineno,
                            reason: e.to_string(),
                        }
                    })?;
                    block.push(atom);
                }
                State::Scan => {
                    if self.energy_re.is_match(line) {
                        energy = parse_energy(line, lineno)?;
                        trace!("energy {energy} on line {lineno}");
                    }
                    if self.geom_re.is_match(line) {
                        debug!("geometry marker on line {lineno} of {name}");
                        block.clear();
                        state = match self.skip_lines {
                            0 => State::Geom,
                            n => State::Skip(n),
                        };
                    }
                }
            }
        }
        // end of input also terminates a truncated atom table
        if state == State::Geom {
            debug!("{name} ended inside the geometry block");
            finish_block(&mut block, &mut atoms);
        }

        let Some(atoms) = atoms else {
            return Err(ParseError::NoGeometryFound);
        };

        let mut molecule = ParsedMolecule::new(atoms);
        molecule.annotate(self.energy_field.as_str(), format_energy(energy));

        let success = trailing == self.success_marker;
        if !success {
            warn!(
                "last line of {name} does not indicate success. results may \
                 not be as expected"
            );
        }

        Ok(Parsed { molecule, success })
    }
}

/// replace the captured geometry with `block`, unless the block was empty
fn finish_block(block: &mut Vec<Atom>, atoms: &mut Option<Vec<Atom>>) {
    if block.is_empty() {
        debug!("ignoring empty geometry block");
        return;
    }
    *atoms = Some(std::mem::take(block));
}

/// parses the last field of `line` into a float and returns
/// [ParseError::MalformedEnergy] if it fails
#[inline]
fn parse_energy(line: &str, lineno: usize) -> Result<f64, ParseError> {
    let token = line.split_whitespace().next_back().unwrap_or_default();
    token.parse().map_err(|_| ParseError::MalformedEnergy {
        line: lineno,
        token: token.to_owned(),
    })
}
