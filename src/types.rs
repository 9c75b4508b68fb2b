//! Shared value types used throughout the interpreter
//!
//! Small `Copy` enums/structs with `Display` impls and `serde` derives so a
//! driver can snapshot interpreter state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Six-axis machine position (X, Y, Z, A, B, C).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X-axis position
    pub x: f64,
    /// Y-axis position
    pub y: f64,
    /// Z-axis position
    pub z: f64,
    /// A-axis (rotary) position
    pub a: f64,
    /// B-axis (rotary) position
    pub b: f64,
    /// C-axis (rotary) position
    pub c: f64,
}

impl Position {
    /// The zero position.
    pub const ZERO: Position = Position {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        a: 0.0,
        b: 0.0,
        c: 0.0,
    };

    /// Construct a position from all six axes.
    pub fn new(x: f64, y: f64, z: f64, a: f64, b: f64, c: f64) -> Self {
        Self { x, y, z, a, b, c }
    }

    /// Construct a position with only X, Y, Z set (rotary axes zero).
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        Self::new(x, y, z, 0.0, 0.0, 0.0)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ZERO
    }
}

impl std::ops::Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.a + rhs.a,
            self.b + rhs.b,
            self.c + rhs.c,
        )
    }
}

impl std::ops::Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.a - rhs.a,
            self.b - rhs.b,
            self.c - rhs.c,
        )
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X{:.4} Y{:.4} Z{:.4} A{:.4} B{:.4} C{:.4}",
            self.x, self.y, self.z, self.a, self.b, self.c
        )
    }
}

/// Length/feed measurement system, set by G20/G21.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Inches (G20)
    Imperial,
    /// Millimeters (G21)
    Metric,
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Imperial => write!(f, "inch"),
            Units::Metric => write!(f, "mm"),
        }
    }
}

/// Active plane for arcs and canned cycles, set by G17/G18/G19.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    /// G17: X-Y plane
    Xy,
    /// G18: X-Z plane
    Xz,
    /// G19: Y-Z plane
    Yz,
}

/// Distance interpretation of axis words, set by G90/G91.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceMode {
    /// G90: axis words are absolute machine/program coordinates.
    Absolute,
    /// G91: axis words are increments from the current position.
    Incremental,
}

/// Feed-rate interpretation, set by G93/G94.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedMode {
    /// G93: `f` is the reciprocal of the time the move should take.
    InverseTime,
    /// G94: `f` is in units per minute.
    UnitsPerMinute,
}

/// Cutter-radius-compensation side, set by G40/G41/G42.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutterCompSide {
    /// G40: compensation off.
    Off,
    /// G41: compensate to the left of the programmed path.
    Left,
    /// G42: compensate to the right of the programmed path.
    Right,
}

/// Path-control mode, set by G61/G61.1/G64.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlMode {
    /// G61: exact stop at the end of each move.
    ExactStop,
    /// G61.1: exact path, slow through corners.
    ExactPath,
    /// G64: continuous/blended path.
    Continuous,
}

/// Canned-cycle retract behavior, set by G98/G99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetractMode {
    /// G98: retract to the position the axis had before the cycle began.
    OldZ,
    /// G99: retract to the programmed R-plane.
    RPlane,
}

/// Spindle rotation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Spindle stopped.
    Stop,
    /// M3: clockwise.
    Clockwise,
    /// M4: counterclockwise.
    CounterClockwise,
}

/// On/off toggle, used for coolant and override flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OnOff {
    /// Feature disabled.
    Off,
    /// Feature enabled.
    On,
}

impl OnOff {
    /// `true` iff `On`.
    pub fn is_on(self) -> bool {
        matches!(self, OnOff::On)
    }
}

/// Machine axis identifier, used by canned-cycle plane permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
    /// A axis
    A,
    /// B axis
    B,
    /// C axis
    C,
}
