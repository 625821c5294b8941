use std::path::{Path, PathBuf};

pub mod atom;
pub mod config;
pub mod molecule;
pub mod sdf;
pub mod transcript;


pub use atom::Atom;
pub use config::Config;
pub use molecule::ParsedMolecule;
pub use sdf::SdfWriter;
pub use transcript::{ParseError, Parsed, Transcript};

/// print an error message to stderr and exit with status 1
#[macro_export]
macro_rules! die {
    ($($t:tt)*) => {{
        eprintln!($($t)*);
        std::process::exit(1);
    }};
}

/// call `rayon::ThreadPoolBuilder` to set `num_threads` to `n`. Discards the
/// error returned by `build_global` if the thread pool has already been
/// initialized
pub fn max_threads(n: usize) {
    let _ = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build_global();
}

/// the record written for the transcript at `infile` when no output file is
/// given: the same path with an `.sdf` extension
pub fn default_output(infile: impl AsRef<Path>) -> PathBuf {
    infile.as_ref().with_extension("sdf")
}

/// parse the transcript at `infile`, titling the molecule with the file stem
pub fn convert(
    transcript: &Transcript,
    infile: impl AsRef<Path>,
) -> Result<Parsed, ParseError> {
    let infile = infile.as_ref();
    log::info!("parsing {}", infile.display());
    let mut parsed = transcript.read_file(infile)?;
    if let Some(stem) = infile.file_stem() {
        parsed.molecule.title = stem.to_string_lossy().into_owned();
    }
    Ok(parsed)
}
