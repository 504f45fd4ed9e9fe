// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Error type shared by all the builders in the library.
//!
//! Errors only occur when a controller is configured and built. The periodic `step` functions are
//! plain numeric functions and do not return errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bad table data: {0}")]
    Table(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Wraps the error of a sub-component, so that the final message names every level that
    /// failed, e.g. "error initializing power manager: error initializing below rated torque gain
    /// table: bad table data: x values not ascending"
    #[error("error initializing {component}: {source}")]
    Component {
        component: &'static str,
        #[source]
        source: Box<Error>,
    },

    #[error("controller is not initialised")]
    NotInitialised,

    #[error("controller initialisation failed: {0}")]
    InitialisationFailed(String),
}

impl Error {
    /// Attach the name of the sub-component that failed.
    pub fn in_component(self, component: &'static str) -> Self {
        Error::Component {
            component,
            source: Box::new(self),
        }
    }
}

/// Extension used by the builders to tag errors with the component being built.
pub trait ComponentContext<T> {
    fn component(self, component: &'static str) -> Result<T, Error>;
}

impl<T> ComponentContext<T> for Result<T, Error> {
    fn component(self, component: &'static str) -> Result<T, Error> {
        self.map_err(|err| err.in_component(component))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_component_message() {
        let err = Error::Table("x values not ascending".to_string())
            .in_component("minimum pitch table")
            .in_component("power manager");

        assert_eq!(
            err.to_string(),
            "error initializing power manager: error initializing minimum pitch table: \
             bad table data: x values not ascending"
        );
    }
}
