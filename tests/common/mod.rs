//! Shared in-memory [`CanonicalMachine`] double for integration tests.
//!
//! Mirrors `canon::test_support::RecordingMachine`'s shape, re-derived here
//! since that double is crate-private — integration tests only see the
//! public API.

#![allow(dead_code)]

use rs274ngc::{CanonicalMachine, CutterCompSide, Direction, Plane, Position, Units};

#[derive(Debug, Default)]
pub struct TestMachine {
    pub calls: Vec<String>,
    pub position: Position,
    pub units: Option<Units>,
    pub plane: Option<Plane>,
    pub feed_rate: f64,
    pub coolant_flood: bool,
    pub coolant_mist: bool,
    pub motion_mode: i32,
    pub spindle: Direction,
    pub probe_pos: Position,
    pub probe_val: f64,
}

impl CanonicalMachine for TestMachine {
    fn offset_origin(&mut self, offset: Position) {
        self.calls.push(format!("offset_origin({offset})"));
    }
    fn units(&mut self, units: Units) {
        self.units = Some(units);
        self.calls.push(format!("units({units})"));
    }
    fn plane(&mut self, plane: Plane) {
        self.plane = Some(plane);
        self.calls.push(format!("plane({plane:?})"));
    }
    fn rapid_rate(&mut self, rate: f64) {
        self.calls.push(format!("rapid_rate({rate})"));
    }
    fn rapid(&mut self, pos: Position) {
        self.position = pos;
        self.calls.push(format!("rapid({pos})"));
    }
    fn feed_rate(&mut self, rate: f64) {
        self.feed_rate = rate;
        self.calls.push(format!("feed_rate({rate})"));
    }
    fn feed_reference(&mut self, inverse_time: bool) {
        self.calls.push(format!("feed_reference({inverse_time})"));
    }
    fn motion_mode(&mut self, code: i32) {
        self.motion_mode = code;
        self.calls.push(format!("motion_mode({code})"));
    }
    fn cutter_radius_comp(&mut self, radius: f64) {
        self.calls.push(format!("cutter_radius_comp({radius})"));
    }
    fn cutter_radius_comp_start(&mut self, side: CutterCompSide) {
        self.calls.push(format!("cutter_radius_comp_start({side:?})"));
    }
    fn cutter_radius_comp_stop(&mut self) {
        self.calls.push("cutter_radius_comp_stop()".into());
    }
    fn speed_feed_sync_start(&mut self) {
        self.calls.push("speed_feed_sync_start()".into());
    }
    fn speed_feed_sync_stop(&mut self) {
        self.calls.push("speed_feed_sync_stop()".into());
    }
    fn arc(&mut self, e0: f64, e1: f64, c0: f64, c1: f64, rotation: i32, end_linear: f64, a: f64, b: f64, c: f64) {
        self.calls.push(format!("arc({e0},{e1},{c0},{c1},{rotation},{end_linear},{a},{b},{c})"));
    }
    fn linear(&mut self, pos: Position) {
        self.position = pos;
        self.calls.push(format!("linear({pos})"));
    }
    fn probe(&mut self, pos: Position) {
        self.position = pos;
        self.calls.push(format!("probe({pos})"));
    }
    fn dwell(&mut self, seconds: f64) {
        self.calls.push(format!("dwell({seconds})"));
    }
    fn spindle_start_clockwise(&mut self) {
        self.spindle = Direction::Clockwise;
        self.calls.push("spindle_start_clockwise()".into());
    }
    fn spindle_start_counterclockwise(&mut self) {
        self.spindle = Direction::CounterClockwise;
        self.calls.push("spindle_start_counterclockwise()".into());
    }
    fn spindle_stop(&mut self) {
        self.spindle = Direction::Stop;
        self.calls.push("spindle_stop()".into());
    }
    fn spindle_speed(&mut self, rpm: f64) {
        self.calls.push(format!("spindle_speed({rpm})"));
    }
    fn spindle_orient(&mut self, angle: f64, direction: rs274ngc::canon::OrientDirection) {
        self.calls.push(format!("spindle_orient({angle},{direction:?})"));
    }
    fn tool_length_offset(&mut self, offset: f64) {
        self.calls.push(format!("tool_length_offset({offset})"));
    }
    fn tool_change(&mut self, slot: i32) {
        self.calls.push(format!("tool_change({slot})"));
    }
    fn tool_select(&mut self, slot: i32) {
        self.calls.push(format!("tool_select({slot})"));
    }
    fn axis_clamp(&mut self, axis: rs274ngc::Axis) {
        self.calls.push(format!("axis_clamp({axis:?})"));
    }
    fn axis_unclamp(&mut self, axis: rs274ngc::Axis) {
        self.calls.push(format!("axis_unclamp({axis:?})"));
    }
    fn comment(&mut self, text: &str) {
        self.calls.push(format!("comment({text})"));
    }
    fn message(&mut self, text: &str) {
        self.calls.push(format!("message({text})"));
    }
    fn feed_override_enable(&mut self) {
        self.calls.push("feed_override_enable()".into());
    }
    fn feed_override_disable(&mut self) {
        self.calls.push("feed_override_disable()".into());
    }
    fn speed_override_enable(&mut self) {
        self.calls.push("speed_override_enable()".into());
    }
    fn speed_override_disable(&mut self) {
        self.calls.push("speed_override_disable()".into());
    }
    fn coolant_flood_on(&mut self) {
        self.coolant_flood = true;
        self.calls.push("coolant_flood_on()".into());
    }
    fn coolant_flood_off(&mut self) {
        self.coolant_flood = false;
        self.calls.push("coolant_flood_off()".into());
    }
    fn coolant_mist_on(&mut self) {
        self.coolant_mist = true;
        self.calls.push("coolant_mist_on()".into());
    }
    fn coolant_mist_off(&mut self) {
        self.coolant_mist = false;
        self.calls.push("coolant_mist_off()".into());
    }
    fn pallet_shuttle(&mut self) {
        self.calls.push("pallet_shuttle()".into());
    }
    fn probe_on(&mut self) {
        self.calls.push("probe_on()".into());
    }
    fn probe_off(&mut self) {
        self.calls.push("probe_off()".into());
    }
    fn program_stop(&mut self) {
        self.calls.push("program_stop()".into());
    }
    fn program_optional_stop(&mut self) {
        self.calls.push("program_optional_stop()".into());
    }
    fn program_end(&mut self) {
        self.calls.push("program_end()".into());
    }
    fn current_feed_rate(&self) -> f64 {
        self.feed_rate
    }
    fn current_coolant_flood(&self) -> bool {
        self.coolant_flood
    }
    fn current_coolant_mist(&self) -> bool {
        self.coolant_mist
    }
    fn current_units(&self) -> Units {
        self.units.unwrap_or(Units::Metric)
    }
    fn current_motion_mode(&self) -> i32 {
        self.motion_mode
    }
    fn current_plane(&self) -> Plane {
        self.plane.unwrap_or(Plane::Xy)
    }
    fn current_position(&self) -> Position {
        self.position
    }
    fn probe_position(&self) -> Position {
        self.probe_pos
    }
    fn probe_value(&self) -> f64 {
        self.probe_val
    }
    fn queue_empty(&self) -> bool {
        true
    }
    fn spindle_speed_feedback(&self) -> f64 {
        0.0
    }
    fn spindle_state(&self) -> Direction {
        self.spindle
    }
    fn tool_slot(&self) -> i32 {
        0
    }
    fn tool_max(&self) -> usize {
        0
    }
    fn tool(&self, _pocket: usize) -> rs274ngc::settings::Tool {
        rs274ngc::settings::Tool::EMPTY
    }
    fn rapid_rate_feedback(&self) -> f64 {
        0.0
    }
    fn parameter_filename(&self) -> Option<String> {
        None
    }
}

/// Write a minimal but valid parameter file (every required index present,
/// zeroed) at `path`.
pub fn write_minimal_parameter_file(path: &std::path::Path) {
    let mut table = rs274ngc::ParameterTable::new();
    for index in rs274ngc::params::required_parameters() {
        table.set(index, 0.0);
    }
    rs274ngc::paramfile::save(path, &table).unwrap();
}
