//! Generic parameter file loading

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs while loading a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read the parameter file: {0}")]
    FileLoadError(#[from] std::io::Error),

    #[error("Could not deserialise the parameter file: {0}")]
    DeserialiseError(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a parameter struct from the TOML file at the given path.
///
/// Any parameter struct is accepted, provided it implements
/// `serde::Deserialize`. Missing keys are filled by the struct's serde
/// defaults, so partial files are valid.
pub fn load<P, F>(param_file_path: F) -> Result<P, LoadError>
where
    P: DeserializeOwned,
    F: AsRef<Path>,
{
    let params_str = read_to_string(param_file_path)?;

    Ok(toml::from_str(params_str.as_str())?)
}
