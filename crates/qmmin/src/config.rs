//! Settings describing the layout of an optimizer transcript and the records
//! written from it

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};


/// The defaults describe a Psi4 geometry optimization. Every field can be
/// overridden from a TOML file, and omitted fields keep their default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The beginning of the line reporting the final energy. The energy itself
    /// is the last whitespace-separated field on that line.
    pub energy_marker: String,

    /// The beginning of the line introducing the final optimized geometry.
    pub geometry_marker: String,

    /// The number of header lines between `geometry_marker` and the first line
    /// of the atom table.
    pub skip_lines: usize,

    /// The last non-blank line of a transcript from a successful run.
    pub success_marker: String,

    /// The name of the SD data item holding the final energy.
    pub energy_field: String,

    /// The program name written into the second header line of each record.
    pub program_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            energy_marker: String::from("Final energy is"),
            geometry_marker: String::from(
                "Final optimized geometry and variables:",
            ),
            skip_lines: 5,
            success_marker: String::from(
                "*** Psi4 exiting successfully. Buy a developer a beer!",
            ),
            energy_field: String::from("FINAL_ENERGY"),
            program_name: String::from("qmmin"),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(String, std::io::Error),
    Toml(String, toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read(file, e) => {
                write!(f, "failed to read config file '{file}' with {e}")
            }
            ConfigError::Toml(file, e) => {
                write!(f, "failed to deserialize config file '{file}' with {e}")
            }
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load<P>(filename: P) -> Result<Self, ConfigError>
    where
        P: AsRef<Path>,
    {
        let name = filename.as_ref().display().to_string();
        let contents = std::fs::read_to_string(&filename)
            .map_err(|e| ConfigError::Read(name.clone(), e))?;
        let ret: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Toml(name, e))?;

        ret.validate()?;

        Ok(ret)
    }

    /// check that the settings in `self` make any sense. an empty marker would
    /// match every line of the transcript, and the energy field name ends up
    /// between angle brackets in the record
    fn validate(&self) -> Result<(), ConfigError> {
        if self.energy_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("energy_marker is empty".into()));
        }
        if self.geometry_marker.trim().is_empty() {
            return Err(ConfigError::Invalid("geometry_marker is empty".into()));
        }
        if self.energy_field.is_empty()
            || self.energy_field.contains(['<', '>', '\n'])
        {
            return Err(ConfigError::Invalid(format!(
                "energy_field `{}` is not a valid data item name",
                self.energy_field
            )));
        }
        Ok(())
    }
}
