use std::{fmt::Display, io};

use oxc::diagnostics::OxcDiagnostic;

#[derive(Debug)]
pub enum BundleError {
    IO(io::Error),
    ParseErrors(Vec<OxcDiagnostic>),
    SemanticErrors(Vec<OxcDiagnostic>),
    TransformErrors(Vec<OxcDiagnostic>),
    /// Module syntax that needs other files to be linked in.
    UnlinkedModule(Vec<OxcDiagnostic>),
}

fn write_diagnostics(
    f: &mut std::fmt::Formatter<'_>,
    heading: &str,
    diagnostics: &[OxcDiagnostic],
) -> std::fmt::Result {
    write!(f, "{}:", heading)?;
    for diagnostic in diagnostics {
        write!(f, "\n  {}", diagnostic)?;
    }
    Ok(())
}

impl Display for BundleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BundleError::IO(error) => error.fmt(f),
            BundleError::ParseErrors(diagnostics) => {
                write_diagnostics(f, "parse errors", diagnostics)
            }
            BundleError::SemanticErrors(diagnostics) => {
                write_diagnostics(f, "semantic errors", diagnostics)
            }
            BundleError::TransformErrors(diagnostics) => {
                write_diagnostics(f, "transform errors", diagnostics)
            }
            BundleError::UnlinkedModule(diagnostics) => {
                write_diagnostics(f, "unsupported module syntax", diagnostics)
            }
        }
    }
}

impl std::error::Error for BundleError {}

impl From<io::Error> for BundleError {
    fn from(value: io::Error) -> Self {
        BundleError::IO(value)
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;
