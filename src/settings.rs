//! Modal state and session settings
//!
//! Tracks everything the interpreter carries across lines: current position,
//! active modal codes, tool table, and feed/speed state. Grounded on
//! `setup.h`/`setup.cpp`.

use serde::{Deserialize, Serialize};

use crate::block::Block;
use crate::codes::{self, *};
use crate::types::{
    ControlMode, CutterCompSide, DistanceMode, FeedMode, OnOff, Plane, Position, RetractMode,
    Units,
};

/// Tool-table entry: identity, length offset, and diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    /// Tool identification number (not necessarily the carousel slot).
    pub id: i32,
    /// Tool length, in the session's current units.
    pub length: f64,
    /// Tool diameter, in the session's current units.
    pub diameter: f64,
}

impl Tool {
    /// An empty slot.
    pub const EMPTY: Tool = Tool {
        id: 0,
        length: 0.0,
        diameter: 0.0,
    };
}

/// Per-canned-cycle word cache, carried across repeated
/// cycle-motion lines that omit some words (modal canned-cycle words).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CycleState {
    /// `l`-value: repeat count.
    pub l: i32,
    /// `p`-value: dwell at the bottom of the cycle, seconds.
    pub p: f64,
    /// `q`-value: peck increment (G83).
    pub q: f64,
    /// `r`-value: retract plane.
    pub r: f64,
    /// Cycle-bottom depth along the plane's third axis.
    pub z: f64,
    /// `i`-value: G87 back-bore x-offset (plane-relative first axis).
    pub i: f64,
    /// `j`-value: G87 back-bore y-offset (plane-relative second axis).
    pub j: f64,
    /// `k`-value: G87 back-bore z-offset (plane-relative third axis).
    pub k: f64,
}

/// Coolant valve state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Coolant {
    /// Flood coolant on/off.
    pub flood: bool,
    /// Mist coolant on/off.
    pub mist: bool,
}

/// Full interpreter modal state, carried across `read`/`execute` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// G92 axis offset, added to program coordinates to get current coordinates.
    pub axis_offset: Position,
    /// Current tool-tip position in the active coordinate system.
    pub current: Position,
    /// Origin offset for the active coordinate system (G54-G59.3).
    pub origin_offset: Position,

    /// Path-control mode (G61/G61.1/G64).
    pub control_mode: ControlMode,
    /// Carousel slot of the currently loaded tool.
    pub current_slot: i32,
    /// Current cutter-compensation radius (from the tool table).
    pub cutter_comp_radius: f64,
    /// Cutter-compensation side (G40/G41/G42).
    pub cutter_comp_side: CutterCompSide,
    /// Modal canned-cycle words, latched across repeated cycle calls.
    pub cycle: CycleState,
    /// Absolute/incremental interpretation of axis words (G90/G91).
    pub distance_mode: DistanceMode,
    /// Absolute/incremental interpretation of I/J/K words.
    pub ijk_distance_mode: DistanceMode,
    /// Inverse-time or units-per-minute feed interpretation (G93/G94).
    pub feed_mode: FeedMode,
    /// Whether feed override is enabled.
    pub feed_override: OnOff,
    /// Current feed rate, in current units/minute (or inverse-time units).
    pub feed_rate: f64,
    /// Flood/mist coolant state.
    pub coolant: Coolant,
    /// Tool-table index used for the active length offset.
    pub length_offset_index: i32,
    /// Active length/feed measurement system (G20/G21).
    pub length_units: Units,
    /// Length of the line last read.
    pub line_length: usize,
    /// Text of the most recently read line.
    pub linetext: String,
    /// Active motion mode (sticky G-code from group 1), `None` if none yet set.
    pub motion_mode: Option<i32>,
    /// Active coordinate-system index, `1..=9` for G54..G59.3.
    pub origin_index: i32,
    /// Active plane (G17/G18/G19).
    pub plane: Plane,
    /// Whether the last motion was a successful probe.
    pub probe_flag: bool,
    /// Program (uncompensated) X, used while cutter comp is active.
    pub program_x: f64,
    /// Program (uncompensated) Y, used while cutter comp is active.
    pub program_y: f64,
    /// Canned-cycle retract behavior (G98/G99).
    pub retract_mode: RetractMode,
    /// Tool slot selected by `t` but not yet made active by `m6`.
    pub selected_tool_slot: i32,
    /// Spindle speed, RPM.
    pub speed: f64,
    /// Whether speed override is enabled.
    pub speed_override: OnOff,
    /// Spindle rotation direction.
    pub spindle_turning: crate::types::Direction,
    /// Current tool length offset.
    pub tool_length_offset: f64,
    /// Highest populated tool-table slot.
    pub tool_max: usize,
    /// Tool table, indexed by carousel slot.
    pub tool_table: Vec<Tool>,
    /// Tool-table index used with cutter compensation.
    pub tool_table_index: i32,
    /// Traverse (rapid) rate.
    pub traverse_rate: f64,

    /// Active G-codes, reported in the legacy array layout (index = modal
    /// group, value = ×10-encoded code, `-1` if unset). Size matches
    /// `RS274NGC_ACTIVE_G_CODES` (12): group 0 is non-modal and taken from
    /// the most recently parsed block.
    pub active_g_codes: [i32; 12],
    /// Active M-codes, reported in the legacy array layout. Size matches
    /// `RS274NGC_ACTIVE_M_CODES` (7).
    pub active_m_codes: [i32; 7],
    /// Active numeric settings: `[_, feed_rate, speed]`, matching
    /// `RS274NGC_ACTIVE_SETTINGS` (3).
    pub active_settings: [f64; 3],
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            axis_offset: Position::ZERO,
            current: Position::ZERO,
            origin_offset: Position::ZERO,
            control_mode: ControlMode::ExactPath,
            current_slot: 0,
            cutter_comp_radius: 0.0,
            cutter_comp_side: CutterCompSide::Off,
            cycle: CycleState::default(),
            distance_mode: DistanceMode::Absolute,
            ijk_distance_mode: DistanceMode::Incremental,
            feed_mode: FeedMode::UnitsPerMinute,
            feed_override: OnOff::On,
            feed_rate: 0.0,
            coolant: Coolant::default(),
            length_offset_index: 0,
            length_units: Units::Metric,
            line_length: 0,
            linetext: String::new(),
            motion_mode: None,
            origin_index: 1,
            plane: Plane::Xy,
            probe_flag: false,
            program_x: 0.0,
            program_y: 0.0,
            retract_mode: RetractMode::RPlane,
            selected_tool_slot: 0,
            speed: 0.0,
            speed_override: OnOff::On,
            spindle_turning: crate::types::Direction::Stop,
            tool_length_offset: 0.0,
            tool_max: 0,
            tool_table: Vec::new(),
            tool_table_index: 0,
            traverse_rate: 0.0,
            active_g_codes: [-1; 12],
            active_m_codes: [-1; 7],
            active_settings: [0.0; 3],
        }
    }
}

impl Settings {
    /// A session with conventional defaults: metric, XY plane, absolute
    /// distance mode, exact-path control.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute `active_g_codes` from current modal state and the most
    /// recently parsed block's non-modal (group 0) code. Follows
    /// `setup_t::write_g_codes` field-for-field, restricted to the 12-entry
    /// array this interpreter reports (no spindle-speed-mode group).
    pub fn write_g_codes(&mut self, block: Option<&Block>) {
        let g = &mut self.active_g_codes;
        g[0] = 0;
        g[1] = self.motion_mode.unwrap_or(-1);
        g[2] = block.map_or(-1, |b| b.g_modes[0]);
        g[3] = match self.plane {
            Plane::Xy => G17,
            Plane::Xz => G18,
            Plane::Yz => G19,
        };
        g[4] = match self.cutter_comp_side {
            CutterCompSide::Right => G42,
            CutterCompSide::Left => G41,
            CutterCompSide::Off => G40,
        };
        g[5] = match self.length_units {
            Units::Imperial => G20,
            Units::Metric => G21,
        };
        g[6] = match self.distance_mode {
            DistanceMode::Absolute => G90,
            DistanceMode::Incremental => G91,
        };
        g[7] = match self.feed_mode {
            FeedMode::UnitsPerMinute => G93,
            FeedMode::InverseTime => G94,
        };
        g[8] = if self.origin_index < 7 {
            530 + 10 * self.origin_index
        } else {
            584 + self.origin_index
        };
        g[9] = if self.tool_length_offset == 0.0 { G49 } else { G43 };
        g[10] = match self.retract_mode {
            RetractMode::OldZ => G98,
            RetractMode::RPlane => G99,
        };
        g[11] = match self.control_mode {
            ControlMode::Continuous => G64,
            ControlMode::ExactStop => G61,
            ControlMode::ExactPath => G61_1,
        };
    }

    /// Recompute `active_m_codes` from current modal state and the most
    /// recently parsed block's stopping/tool-change codes. Follows
    /// `setup_t::write_m_codes` field-for-field.
    pub fn write_m_codes(&mut self, block: Option<&Block>) {
        let m = &mut self.active_m_codes;
        m[0] = 0;
        m[1] = block.map_or(-1, |b| b.m_modes[1]); // stopping
        m[2] = match self.spindle_turning {
            crate::types::Direction::Stop => 5,
            crate::types::Direction::Clockwise => 3,
            crate::types::Direction::CounterClockwise => 4,
        };
        m[3] = block.map_or(-1, |b| b.m_modes[2]); // tool change
        m[4] = if self.coolant.mist {
            7
        } else if self.coolant.flood {
            -1
        } else {
            9
        };
        m[5] = if self.coolant.flood { 8 } else { -1 };
        m[6] = if self.feed_override.is_on() { 48 } else { 49 };
    }

    /// Recompute `active_settings` (sequence number is reported separately
    /// by the session, so only feed and speed are carried here).
    pub fn write_settings(&mut self) {
        self.active_settings[0] = 0.0;
        self.active_settings[1] = self.feed_rate;
        self.active_settings[2] = self.speed;
    }

    /// `true` if `code` names the active motion mode.
    pub fn motion_is(&self, code: i32) -> bool {
        self.motion_mode == Some(code)
    }

    /// Human-readable modal-group summary, used for logging at block boundaries.
    pub fn describe_modal_state(&self) -> String {
        format!(
            "plane={:?} units={} distance={:?} motion={}",
            self.plane,
            self.length_units,
            self.distance_mode,
            self.motion_mode.map(codes::format_gcode).unwrap_or_else(|| "-".into())
        )
    }
}
