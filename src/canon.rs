//! Canonical machining interface
//!
//! The interpreter never touches a machine, a G-code printer, or a simulator
//! directly — it calls through this trait. A driver (printing, replay,
//! in-memory test double) implements it; the executor is generic over it,
//! naming a capability trait at the seam between "decide what to do" and
//! "do it".

use crate::types::{CutterCompSide, Direction, Plane, Position, Units};

/// Spindle direction for `spindle_orient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrientDirection {
    Clockwise,
    CounterClockwise,
}

/// The abstract sink for every machine-affecting operation the interpreter
/// performs. All positions are six-axis
/// `(x, y, z, a, b, c)` in the interpreter's current units.
pub trait CanonicalMachine {
    /// Re-home position reporting to a new coordinate-system + axis offset.
    fn offset_origin(&mut self, offset: Position);
    /// G20/G21: switch the reported measurement system.
    fn units(&mut self, units: Units);
    /// G17/G18/G19: switch the active plane.
    fn plane(&mut self, plane: Plane);
    /// Set the traverse (rapid) rate.
    fn rapid_rate(&mut self, rate: f64);
    /// Rapid-traverse to `pos`.
    fn rapid(&mut self, pos: Position);
    /// Set the feed rate (units/minute, or inverse-time depending on mode).
    fn feed_rate(&mut self, rate: f64);
    /// Switch feed-rate interpretation (units-per-minute vs. inverse-time).
    fn feed_reference(&mut self, inverse_time: bool);
    /// Record the active motion mode, ×10-encoded.
    fn motion_mode(&mut self, code: i32);
    /// Set the active cutter-radius-compensation offset.
    fn cutter_radius_comp(&mut self, radius: f64);
    /// G41/G42: turn cutter-radius compensation on, to `side`.
    fn cutter_radius_comp_start(&mut self, side: CutterCompSide);
    /// G40: turn cutter-radius compensation off.
    fn cutter_radius_comp_stop(&mut self);
    /// G84/M29: begin speed-feed synchronization (rigid tapping).
    fn speed_feed_sync_start(&mut self);
    /// End speed-feed synchronization.
    fn speed_feed_sync_stop(&mut self);
    /// Emit an arc: endpoint (`e0`, `e1`) and center (`c0`, `c1`) in the
    /// active plane, `rotation` is the signed turn count (see [`crate::arc::Turn`]),
    /// `end_linear` is the out-of-plane endpoint, `a`/`b`/`c` are the rotary
    /// axis endpoints.
    #[allow(clippy::too_many_arguments)]
    fn arc(&mut self, e0: f64, e1: f64, c0: f64, c1: f64, rotation: i32, end_linear: f64, a: f64, b: f64, c: f64);
    /// Emit a straight (feed or rapid) move to `pos`.
    fn linear(&mut self, pos: Position);
    /// Emit a probe move to `pos`.
    fn probe(&mut self, pos: Position);
    /// G4: dwell for `seconds`.
    fn dwell(&mut self, seconds: f64);
    /// M3: start the spindle clockwise.
    fn spindle_start_clockwise(&mut self);
    /// M4: start the spindle counterclockwise.
    fn spindle_start_counterclockwise(&mut self);
    /// M5: stop the spindle.
    fn spindle_stop(&mut self);
    /// Set spindle speed, RPM.
    fn spindle_speed(&mut self, rpm: f64);
    /// Orient the spindle to `angle` degrees, in `direction`.
    fn spindle_orient(&mut self, angle: f64, direction: OrientDirection);
    /// Set the active tool length offset.
    fn tool_length_offset(&mut self, offset: f64);
    /// M6: change to the tool in `slot`.
    fn tool_change(&mut self, slot: i32);
    /// T word: select (but don't yet mount) the tool in `slot`.
    fn tool_select(&mut self, slot: i32);
    /// Clamp a rotary axis in place.
    fn axis_clamp(&mut self, axis: crate::types::Axis);
    /// Release a clamped rotary axis.
    fn axis_unclamp(&mut self, axis: crate::types::Axis);
    /// Emit a plain (non-message) comment.
    fn comment(&mut self, text: &str);
    /// Emit an operator-facing message (`MSG,`-prefixed comment).
    fn message(&mut self, text: &str);
    /// M48: enable feed override.
    fn feed_override_enable(&mut self);
    /// M49: disable feed override.
    fn feed_override_disable(&mut self);
    /// M48 (spindle side): enable speed override.
    fn speed_override_enable(&mut self);
    /// M49 (spindle side): disable speed override.
    fn speed_override_disable(&mut self);
    /// M8: flood coolant on.
    fn coolant_flood_on(&mut self);
    /// M9 (flood): flood coolant off.
    fn coolant_flood_off(&mut self);
    /// M7: mist coolant on.
    fn coolant_mist_on(&mut self);
    /// M9 (mist): mist coolant off.
    fn coolant_mist_off(&mut self);
    /// M60: shuttle the pallet.
    fn pallet_shuttle(&mut self);
    /// Arm the probe input.
    fn probe_on(&mut self);
    /// Disarm the probe input.
    fn probe_off(&mut self);
    /// M0/M1/M60: stop program execution.
    fn program_stop(&mut self);
    /// M1 with the optional-stop switch honored by the driver.
    fn program_optional_stop(&mut self);
    /// M2/M30: end of program.
    fn program_end(&mut self);

    /// Query the feed rate the driver currently has active.
    fn current_feed_rate(&self) -> f64;
    /// Query whether flood coolant is currently on.
    fn current_coolant_flood(&self) -> bool;
    /// Query whether mist coolant is currently on.
    fn current_coolant_mist(&self) -> bool;
    /// Query the driver's current measurement system.
    fn current_units(&self) -> Units;
    /// Query the driver's current motion mode, ×10-encoded.
    fn current_motion_mode(&self) -> i32;
    /// Query the driver's current plane.
    fn current_plane(&self) -> Plane;
    /// Query the driver's reported tool-tip position.
    fn current_position(&self) -> Position;
    /// Query the position latched at the last probe trigger.
    fn probe_position(&self) -> Position;
    /// Query the analog/digital value the probe read at trigger.
    fn probe_value(&self) -> f64;
    /// `true` once the driver's motion queue has drained.
    fn queue_empty(&self) -> bool;
    /// Query the driver's reported spindle speed, RPM.
    fn spindle_speed_feedback(&self) -> f64;
    /// Query the driver's reported spindle state.
    fn spindle_state(&self) -> Direction;
    /// Query the carousel slot the driver reports as loaded.
    fn tool_slot(&self) -> i32;
    /// Query the highest tool-table slot the driver supports.
    fn tool_max(&self) -> usize;
    /// Query the tool identity loaded in `pocket`.
    fn tool(&self, pocket: usize) -> crate::settings::Tool;
    /// Query the driver's current rapid rate.
    fn rapid_rate_feedback(&self) -> f64;
    /// Ask the driver for the parameter-file path to use at `init`.
    fn parameter_filename(&self) -> Option<String>;
}
