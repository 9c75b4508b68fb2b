//! # rs274ngc
//!
//! An RS274/NGC (G-code) interpreter. Parses NGC source a line at a time
//! and emits canonical machining operations through the [`canon`] trait,
//! leaving what those operations *do* (drive a machine, simulate, print) to
//! whoever implements it.
//!
//! The pipeline: [`reader`] preprocesses and evaluates expressions,
//! [`block`] assembles and validates one line's words, [`executor`]
//! dispatches a validated block into [`canon::CanonicalMachine`] calls, and
//! [`interp`] wires the three together behind a `read`/`execute` session.

pub mod arc;
pub mod block;
pub mod canon;
pub mod codes;
pub mod error;
pub mod executor;
pub mod interp;
pub mod params;
pub mod paramfile;
pub mod reader;
pub mod settings;
pub mod types;

pub use block::Block;
pub use canon::CanonicalMachine;
pub use error::Error;
pub use executor::ExecStatus;
pub use interp::{Interpreter, ReadStatus};
pub use params::ParameterTable;
pub use settings::Settings;
pub use types::{
    Axis, ControlMode, CutterCompSide, DistanceMode, Direction, FeedMode, OnOff, Plane, Position,
    RetractMode, Units,
};
