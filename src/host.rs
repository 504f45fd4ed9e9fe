// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Session driven by the control-mode flag of a simulator or turbine controller.
//!
//! The host calls the controller once per sampling interval with a flag:
//! - `0` on the first call: the controller is built from the configuration, then the first cycle
//!   runs.
//! - a positive value for every normal cycle.
//! - `-1` on the last call: a final cycle runs, then the controller is shut down.
//!
//! Mapping the host's measurement array to [`ControllerInput`], including unit conversions, is
//! left to the caller.

use tracing::{info, warn};

use stormath::type_aliases::Float;

use crate::controller::prelude::*;
use crate::error::Error;

/// Flag values of the host call
pub const FLAG_INITIALISE: i32 = 0;
pub const FLAG_SHUTDOWN: i32 = -1;

#[derive(Debug, Clone)]
enum SessionState {
    Uninitialised,
    Running(Box<Controller>),
    Failed(String),
    ShutDown,
}

#[derive(Debug, Clone)]
pub struct HostSession {
    builder: ControllerBuilder,
    state: SessionState,
}

impl HostSession {
    pub fn new(builder: ControllerBuilder) -> Self {
        Self {
            builder,
            state: SessionState::Uninitialised,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running(_))
    }

    pub fn controller(&self) -> Option<&Controller> {
        match &self.state {
            SessionState::Running(controller) => Some(&**controller),
            _ => None,
        }
    }

    /// Named signal of the running controller
    pub fn get_output(&self, name: &str) -> Result<Float, SignalError> {
        match self.controller() {
            Some(controller) => controller.get_output(name),
            None => Err(SignalError::InvalidSignal),
        }
    }

    /// Handles one call from the host.
    pub fn call(&mut self, flag: i32, input: &ControllerInput) -> Result<ControllerOutput, Error> {
        if flag == FLAG_INITIALISE {
            self.initialise()?;
        } else if flag < FLAG_SHUTDOWN {
            return Err(Error::InvalidParameter(format!("unknown control mode flag: {}", flag)));
        }

        let output = self.step(input)?;

        if flag == FLAG_SHUTDOWN {
            info!("controller shut down");

            self.state = SessionState::ShutDown;
        }

        Ok(output)
    }

    fn initialise(&mut self) -> Result<(), Error> {
        match self.builder.build() {
            Ok(controller) => {
                info!("controller initialised");

                self.state = SessionState::Running(Box::new(controller));

                Ok(())
            },
            Err(err) => {
                let message = err.to_string();

                warn!(error = %message, "controller initialisation failed");

                self.state = SessionState::Failed(message.clone());

                Err(Error::InitialisationFailed(message))
            }
        }
    }

    fn step(&mut self, input: &ControllerInput) -> Result<ControllerOutput, Error> {
        match &mut self.state {
            SessionState::Running(controller) => Ok(controller.step(input)),
            SessionState::Failed(message) => {
                warn!("step called on a controller that failed to initialise");

                Err(Error::InitialisationFailed(message.clone()))
            },
            SessionState::Uninitialised | SessionState::ShutDown => {
                warn!("step called on a controller that is not initialised");

                Err(Error::NotInitialised)
            },
        }
    }
}
