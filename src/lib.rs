// Copyright (C) 2024, NTNU
// Author: Jarle Vinje Kramer <jarlekramer@gmail.com; jarle.a.kramer@ntnu.no>
// License: GPL v3.0 (see separate file LICENSE or https://www.gnu.org/licenses/gpl-3.0.html)

//! Control core for pitch-regulated, variable speed wind turbines.
//!
//! The library is called once per sampling interval with measurements and returns a generator
//! torque demand and a collective pitch demand. It contains:
//! - [`tables`]: 1D and 2D lookup tables used for all static maps
//! - [`filters`]: cascades of second-order sections, with Tustin tuning helpers
//! - [`control_loop`]: the filtered and gain scheduled error-feedback block
//! - [`power_manager`] and [`torque_pitch_manager`]: the limits given to the control loops
//! - [`estimators`]: tip-speed ratio and thrust estimation for floating turbines
//! - [`controller`]: the complete cycle, with named-signal introspection through [`signals`]
//! - [`host`]: initialise/run/shutdown handling for a host calling with a control-mode flag
//!
//! All components are configured with serde builders, normally from a JSON file through
//! [`controller::builder::ControllerBuilder`].

pub mod error;
pub mod signals;
pub mod common_utils;
pub mod tables;
pub mod filters;
pub mod control_loop;
pub mod power_manager;
pub mod torque_pitch_manager;
pub mod estimators;
pub mod controller;
pub mod host;
