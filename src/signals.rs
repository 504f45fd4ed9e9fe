// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Named-signal introspection.
//!
//! Every component can report its internal signals by name, using the same strings as the block
//! diagrams of the controller. Signals of a sub-component are reached with the sub-component name
//! followed by a `>` character and the signal name, e.g. `"torque control>control action"`.
//!
//! Each component keeps its signal names in a small enum, so that a name is parsed once and the
//! value is picked with a `match`.

use thiserror::Error;

use stormath::type_aliases::Float;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalError {
    #[error("invalid signal name")]
    InvalidSignal,
    #[error("invalid block name")]
    InvalidBlock,
}

impl SignalError {
    /// Integer code used by existing tooling: -1 for an unknown signal, -2 for an unknown block.
    pub fn code(&self) -> i32 {
        match self {
            SignalError::InvalidSignal => -1,
            SignalError::InvalidBlock => -2,
        }
    }
}

/// Components that expose internal values by name
pub trait SignalSource {
    fn get_output(&self, name: &str) -> Result<Float, SignalError>;
}

/// Splits `"block>signal"` into the block name and the remaining signal path. Returns `None` when
/// the name has no block separator.
pub fn split_block(name: &str) -> Option<(&str, &str)> {
    name.split_once('>')
}

/// Declares a signal enum together with its exact name strings.
macro_rules! signal_names {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

pub(crate) use signal_names;

/// Lookup for a leaf component, i.e. one without sub-blocks. A name containing a block separator
/// is reported as an invalid block, anything else as an invalid signal.
pub(crate) fn leaf_lookup<S: Copy>(
    name: &str,
    parse: impl Fn(&str) -> Option<S>,
    value: impl Fn(S) -> Float,
) -> Result<Float, SignalError> {
    if let Some(signal) = parse(name) {
        return Ok(value(signal));
    }

    if split_block(name).is_some() {
        Err(SignalError::InvalidBlock)
    } else {
        Err(SignalError::InvalidSignal)
    }
}
