//! Semantic executor: fixed-order dispatch of a validated block into CMI
//! calls
//!
//! Grounded on `setup_t::write_g_codes`/`write_m_codes` for which modal
//! fields exist; the dispatch order below is this module's own fixed
//! sequence for applying a block's modal changes before its motion.

pub mod coords;
pub mod cycles;
pub mod motion;

use crate::block::Block;
use crate::canon::CanonicalMachine;
use crate::codes::*;
use crate::error::{Error, SemanticError};
use crate::params::ParameterTable;
use crate::settings::Settings;
use crate::types::{CutterCompSide, DistanceMode, Direction, FeedMode, OnOff, Plane, Position, RetractMode, Units};

mod stop;

/// Outcome of executing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// Execution completed normally.
    Ok,
    /// A probe move completed; the next `read` must synchronize with the
    /// CMI before continuing.
    ExecuteFinish,
    /// M2/M30 ended the program.
    Exit,
}

/// Run the fixed-order dispatch against `block`, mutating
/// `settings`/`params` and emitting through `cmi`.
pub fn execute_block(block: &Block, settings: &mut Settings, params: &mut ParameterTable, cmi: &mut impl CanonicalMachine) -> Result<ExecStatus, Error> {
    emit_comment(block, cmi);

    dispatch_feed_mode(block, settings, cmi);
    dispatch_feed_rate(block, settings, cmi);

    if let Some(s) = block.s {
        settings.speed = s;
        cmi.spindle_speed(s);
    }
    if let Some(t) = block.t {
        settings.selected_tool_slot = t as i32;
        cmi.tool_select(t as i32);
    }

    dispatch_m_codes(block, settings, cmi);

    let mut status = ExecStatus::Ok;

    if block.g_modes[0] == G4 {
        cmi.dwell(block.p.unwrap_or(0.0));
    }

    dispatch_plane(block, settings, cmi);
    dispatch_units(block, settings, cmi)?;
    dispatch_cutter_comp(block, settings, cmi)?;
    dispatch_tool_length_offset(block, settings, cmi);
    dispatch_coordinate_system(block, settings, params, cmi);
    dispatch_control_mode(block, settings);
    dispatch_distance_mode(block, settings);
    dispatch_retract_mode(block, settings);
    dispatch_group_zero(block, settings, params, cmi)?;

    if let Some(motion) = block.motion_to_be {
        status = dispatch_motion(block, motion, settings, cmi)?;
    }

    settings.write_g_codes(Some(block));
    settings.write_m_codes(Some(block));
    settings.write_settings();

    for code in [M0, M1, M2, M30, M60] {
        if block.m_modes[1] == code {
            if let Some(outcome) = stop::run(settings, params, cmi, code, code == M1) {
                if outcome == stop::StopOutcome::End {
                    return Ok(ExecStatus::Exit);
                }
            }
        }
    }

    Ok(status)
}

fn emit_comment(block: &Block, cmi: &mut impl CanonicalMachine) {
    if block.comment.is_empty() {
        return;
    }
    if let Some(message) = block.comment.strip_prefix("MSG,") {
        cmi.message(message);
    } else {
        cmi.comment(&block.comment);
    }
}

fn dispatch_feed_mode(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    match block.g_modes[5] {
        G93 => {
            settings.feed_mode = FeedMode::InverseTime;
            cmi.feed_reference(true);
        }
        G94 => {
            settings.feed_mode = FeedMode::UnitsPerMinute;
            cmi.feed_reference(false);
        }
        _ => {}
    }
}

fn dispatch_feed_rate(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    if settings.feed_mode == FeedMode::UnitsPerMinute {
        if let Some(f) = block.f {
            settings.feed_rate = f;
            cmi.feed_rate(f);
        }
    }
    // In inverse-time mode, `f` is consumed directly by the motion
    // converter instead (it's a reciprocal time, not a rate).
}

fn dispatch_m_codes(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    if block.m_modes[2] == M6 {
        cmi.tool_change(settings.selected_tool_slot);
        settings.current_slot = settings.selected_tool_slot;
        if let Some(tool) = settings.tool_table.get(settings.current_slot as usize) {
            settings.tool_length_offset = tool.length;
        }
    }
    match block.m_modes[3] {
        M3 => {
            settings.spindle_turning = Direction::Clockwise;
            cmi.spindle_start_clockwise();
        }
        M4 => {
            settings.spindle_turning = Direction::CounterClockwise;
            cmi.spindle_start_counterclockwise();
        }
        M5 => {
            settings.spindle_turning = Direction::Stop;
            cmi.spindle_stop();
        }
        _ => {}
    }
    match block.m_modes[4] {
        M7 => {
            settings.coolant.mist = true;
            cmi.coolant_mist_on();
        }
        M8 => {
            settings.coolant.flood = true;
            cmi.coolant_flood_on();
        }
        M9 => {
            settings.coolant.mist = false;
            settings.coolant.flood = false;
            cmi.coolant_mist_off();
            cmi.coolant_flood_off();
        }
        _ => {}
    }
    match block.m_modes[5] {
        M48 => {
            settings.feed_override = OnOff::On;
            settings.speed_override = OnOff::On;
            cmi.feed_override_enable();
            cmi.speed_override_enable();
        }
        M49 => {
            settings.feed_override = OnOff::Off;
            settings.speed_override = OnOff::Off;
            cmi.feed_override_disable();
            cmi.speed_override_disable();
        }
        _ => {}
    }
}

fn dispatch_plane(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    let plane = match block.g_modes[2] {
        G17 => Some(Plane::Xy),
        G18 => Some(Plane::Xz),
        G19 => Some(Plane::Yz),
        _ => None,
    };
    if let Some(plane) = plane {
        settings.plane = plane;
        cmi.plane(plane);
    }
}

fn dispatch_units(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) -> Result<(), Error> {
    let units = match block.g_modes[6] {
        G20 => Some(Units::Imperial),
        G21 => Some(Units::Metric),
        _ => None,
    };
    if let Some(units) = units {
        if settings.cutter_comp_side != CutterCompSide::Off {
            return Err(SemanticError::CannotChangeUnitsWithCutterRadiusComp.into());
        }
        settings.length_units = units;
        cmi.units(units);
    }
    Ok(())
}

fn dispatch_cutter_comp(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) -> Result<(), Error> {
    match block.g_modes[7] {
        G40 => {
            settings.cutter_comp_side = CutterCompSide::Off;
            cmi.cutter_radius_comp_stop();
        }
        G41 | G42 => {
            let side = if block.g_modes[7] == G41 { CutterCompSide::Left } else { CutterCompSide::Right };
            if let Some(d) = block.d {
                settings.tool_table_index = d as i32;
            }
            let radius = settings
                .tool_table
                .get(settings.tool_table_index as usize)
                .map(|t| t.diameter / 2.0)
                .unwrap_or(0.0);
            settings.cutter_comp_side = side;
            settings.cutter_comp_radius = radius;
            settings.program_x = motion::UNKNOWN;
            settings.program_y = motion::UNKNOWN;
            cmi.cutter_radius_comp(radius);
            cmi.cutter_radius_comp_start(side);
        }
        _ => {}
    }
    Ok(())
}

fn dispatch_tool_length_offset(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    match block.g_modes[8] {
        G43 => {
            let index = block.h.map(|h| h as i32).unwrap_or(settings.length_offset_index);
            settings.length_offset_index = index;
            let offset = settings.tool_table.get(index as usize).map(|t| t.length).unwrap_or(0.0);
            settings.tool_length_offset = offset;
            cmi.tool_length_offset(offset);
        }
        G49 => {
            settings.tool_length_offset = 0.0;
            settings.length_offset_index = 0;
            cmi.tool_length_offset(0.0);
        }
        _ => {}
    }
}

fn dispatch_coordinate_system(block: &Block, settings: &mut Settings, params: &ParameterTable, cmi: &mut impl CanonicalMachine) {
    let code = block.g_modes[12];
    if matches!(code, G54 | G55 | G56 | G57 | G58 | G59 | G59_1 | G59_2 | G59_3) {
        let index = coords::origin_index_for_code(code);
        coords::select_coordinate_system(settings, params, cmi, index);
    }
}

fn dispatch_control_mode(block: &Block, settings: &mut Settings) {
    match block.g_modes[13] {
        G61 => settings.control_mode = crate::types::ControlMode::ExactStop,
        G61_1 => settings.control_mode = crate::types::ControlMode::ExactPath,
        G64 => settings.control_mode = crate::types::ControlMode::Continuous,
        _ => {}
    }
}

fn dispatch_distance_mode(block: &Block, settings: &mut Settings) {
    match block.g_modes[3] {
        G90 => settings.distance_mode = DistanceMode::Absolute,
        G91 => settings.distance_mode = DistanceMode::Incremental,
        _ => {}
    }
}

fn dispatch_retract_mode(block: &Block, settings: &mut Settings) {
    match block.g_modes[10] {
        G98 => settings.retract_mode = RetractMode::OldZ,
        G99 => settings.retract_mode = RetractMode::RPlane,
        _ => {}
    }
}

fn axis_offset_given(block: &Block) -> ([bool; 6], Position) {
    let given = [
        block.x.is_some(),
        block.y.is_some(),
        block.z.is_some(),
        block.a.is_some(),
        block.b.is_some(),
        block.c.is_some(),
    ];
    let value = Position::new(
        block.x.unwrap_or(0.0),
        block.y.unwrap_or(0.0),
        block.z.unwrap_or(0.0),
        block.a.unwrap_or(0.0),
        block.b.unwrap_or(0.0),
        block.c.unwrap_or(0.0),
    );
    (given, value)
}

fn has_any_axis(block: &Block) -> bool {
    block.x.is_some() || block.y.is_some() || block.z.is_some() || block.a.is_some() || block.b.is_some() || block.c.is_some()
}

fn dispatch_group_zero(block: &Block, settings: &mut Settings, params: &mut ParameterTable, cmi: &mut impl CanonicalMachine) -> Result<(), Error> {
    match block.g_modes[0] {
        G10 => {
            if block.l == Some(2) {
                let p = block.p.map(|p| p.round() as i32).unwrap_or(0);
                let (given, value) = axis_offset_given(block);
                coords::set_coordinate_system_origin(settings, params, cmi, p, value, given);
            }
        }
        G92 => {
            if settings.cutter_comp_side != CutterCompSide::Off {
                return Err(SemanticError::CannotChangeAxisOffsetsWithCutterRadiusComp.into());
            }
            let (given, value) = axis_offset_given(block);
            coords::set_axis_offset(settings, params, cmi, value, given);
        }
        G92_1 => coords::clear_axis_offset_and_parameters(settings, params, cmi),
        G92_2 => coords::clear_axis_offset(settings, cmi),
        G92_3 => coords::restore_axis_offset(settings, params, cmi),
        G28 => {
            let intermediate = has_any_axis(block).then(|| resolve_end_position(block, settings));
            coords::go_to_reference_point(settings, params, cmi, coords::G28_HOME_BASE, intermediate);
        }
        G30 => {
            let intermediate = has_any_axis(block).then(|| resolve_end_position(block, settings));
            coords::go_to_reference_point(settings, params, cmi, coords::G30_HOME_BASE, intermediate);
        }
        _ => {}
    }
    Ok(())
}

fn resolve_axis(block_val: Option<f64>, current: f64, mode: DistanceMode) -> f64 {
    match (block_val, mode) {
        (Some(v), DistanceMode::Incremental) => current + v,
        (Some(v), DistanceMode::Absolute) => v,
        (None, _) => current,
    }
}

fn resolve_end_position(block: &Block, settings: &Settings) -> Position {
    let cur = settings.current;
    Position::new(
        resolve_axis(block.x, cur.x, settings.distance_mode),
        resolve_axis(block.y, cur.y, settings.distance_mode),
        resolve_axis(block.z, cur.z, settings.distance_mode),
        resolve_axis(block.a, cur.a, settings.distance_mode),
        resolve_axis(block.b, cur.b, settings.distance_mode),
        resolve_axis(block.c, cur.c, settings.distance_mode),
    )
}

fn dispatch_motion(block: &Block, motion: i32, settings: &mut Settings, cmi: &mut impl CanonicalMachine) -> Result<ExecStatus, Error> {
    if is_canned_cycle(motion) {
        return dispatch_canned_cycle(block, motion, settings, cmi).map(|_| ExecStatus::Ok);
    }

    // G53 (group 0) rides alongside G0/G1 rather than being its own motion
    // mode: it just asks this one move's axis words to be read in the
    // machine frame instead of the active coordinate system.
    if block.g_modes[0] == G53 {
        let (given, value) = axis_offset_given(block);
        let mut end = settings.current;
        let wanted = coords::to_machine_absolute(settings, value);
        for (flag, from, to) in [
            (given[0], wanted.x, &mut end.x),
            (given[1], wanted.y, &mut end.y),
            (given[2], wanted.z, &mut end.z),
            (given[3], wanted.a, &mut end.a),
            (given[4], wanted.b, &mut end.b),
            (given[5], wanted.c, &mut end.c),
        ] {
            if flag {
                *to = from;
            }
        }
        motion::straight_move(settings, cmi, end, motion == G0)?;
        return Ok(ExecStatus::Ok);
    }

    match motion {
        G0 => {
            let end = resolve_end_position(block, settings);
            motion::straight_move(settings, cmi, end, true)?;
            Ok(ExecStatus::Ok)
        }
        G1 => {
            let end = resolve_end_position(block, settings);
            apply_inverse_time_feed(block, settings, cmi, crate::arc::find_straight_length(end, settings.current));
            motion::straight_move(settings, cmi, end, false)?;
            Ok(ExecStatus::Ok)
        }
        G2 | G3 => {
            let end = resolve_end_position(block, settings);
            let turn = if motion == G2 { crate::arc::Turn::Clockwise } else { crate::arc::Turn::CounterClockwise };
            let ijk = if block.i.is_some() || block.j.is_some() {
                Some((block.i.unwrap_or(0.0), block.j.unwrap_or(0.0)))
            } else {
                None
            };
            let length = motion::arc_move(
                settings,
                cmi,
                motion::ArcInput { turn, end, ijk, r: block.r },
            )?;
            apply_inverse_time_feed(block, settings, cmi, length);
            Ok(ExecStatus::Ok)
        }
        G38_2 => {
            if settings.feed_mode == FeedMode::InverseTime {
                return Err(SemanticError::CannotProbeInInverseTimeFeedMode.into());
            }
            if block.a.is_some() || block.b.is_some() || block.c.is_some() {
                return Err(SemanticError::CannotMoveRotaryAxesDuringProbing.into());
            }
            let end = resolve_end_position(block, settings);
            cmi.probe(end);
            settings.current = end;
            settings.probe_flag = true;
            Ok(ExecStatus::ExecuteFinish)
        }
        G80 => Ok(ExecStatus::Ok),
        other => Err(Error::Bug(format!("{other} reached dispatch_motion with no handler"))),
    }
}

fn apply_inverse_time_feed(block: &Block, settings: &mut Settings, cmi: &mut impl CanonicalMachine, length: f64) {
    if settings.feed_mode != FeedMode::InverseTime {
        return;
    }
    if let Some(f) = block.f {
        if f > 0.0 && length > 0.0 {
            let rate = length * f;
            settings.feed_rate = rate;
            cmi.feed_rate(rate);
        }
    }
}

fn dispatch_canned_cycle(block: &Block, motion: i32, settings: &mut Settings, cmi: &mut impl CanonicalMachine) -> Result<(), Error> {
    let (first_in, second_in) = match settings.plane {
        Plane::Xy => (block.x, block.y),
        Plane::Xz => (block.x, block.z),
        Plane::Yz => (block.y, block.z),
    };
    let (cur_first, cur_second) = match settings.plane {
        Plane::Xy => (settings.current.x, settings.current.y),
        Plane::Xz => (settings.current.x, settings.current.z),
        Plane::Yz => (settings.current.y, settings.current.z),
    };
    let words = cycles::CycleWords {
        first: first_in.unwrap_or(cur_first),
        second: second_in.unwrap_or(cur_second),
        r: block.r.unwrap_or(settings.cycle.r),
        z: match settings.plane {
            Plane::Xy => block.z.unwrap_or(settings.cycle.z),
            Plane::Xz => block.y.unwrap_or(settings.cycle.z),
            Plane::Yz => block.x.unwrap_or(settings.cycle.z),
        },
        l: block.l.map(|l| l as i32).unwrap_or(if settings.cycle.l == 0 { 1 } else { settings.cycle.l }),
        p: block.p.unwrap_or(settings.cycle.p),
        q: block.q.unwrap_or(settings.cycle.q),
        i: block.i.unwrap_or(settings.cycle.i),
        j: block.j.unwrap_or(settings.cycle.j),
        k: block.k.unwrap_or(settings.cycle.k),
    };
    cycles::run(settings, cmi, motion, words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::test_support::RecordingMachine;
    use crate::params::ParameterTable;

    fn block_from(line: &str, params: &ParameterTable) -> Block {
        Block::parse(line, params).unwrap().0
    }

    #[test]
    fn rapid_move_sets_current_and_emits_rapid() {
        let params = ParameterTable::new();
        let mut settings = Settings::new();
        settings.motion_mode = Some(G0);
        let mut block = block_from("g0x1y2z3", &params);
        block.enhance(&settings).unwrap();
        let mut cmi = RecordingMachine::default();
        let mut params = ParameterTable::new();
        let status = execute_block(&block, &mut settings, &mut params, &mut cmi).unwrap();
        assert_eq!(status, ExecStatus::Ok);
        assert_eq!(settings.current, Position::xyz(1.0, 2.0, 3.0));
    }

    #[test]
    fn feed_then_linear_sets_feed_rate_and_current() {
        let params = ParameterTable::new();
        let mut settings = Settings::new();
        settings.motion_mode = Some(G0);
        let mut block = block_from("g1x4y5z6f10", &params);
        block.enhance(&settings).unwrap();
        let mut cmi = RecordingMachine::default();
        let mut params = ParameterTable::new();
        execute_block(&block, &mut settings, &mut params, &mut cmi).unwrap();
        assert_eq!(settings.feed_rate, 10.0);
        assert_eq!(settings.current, Position::xyz(4.0, 5.0, 6.0));
    }

    #[test]
    fn g41_d_word_selects_the_tool_table_slot_for_comp_radius() {
        let params = ParameterTable::new();
        let mut settings = Settings::new();
        settings.tool_table = vec![
            crate::settings::Tool { id: 1, length: 0.0, diameter: 1.0 },
            crate::settings::Tool { id: 2, length: 0.0, diameter: 6.0 },
        ];
        let mut block = block_from("g41d2", &params);
        block.enhance(&settings).unwrap();
        let mut cmi = RecordingMachine::default();
        let mut params = ParameterTable::new();
        execute_block(&block, &mut settings, &mut params, &mut cmi).unwrap();
        assert_eq!(settings.tool_table_index, 2);
        assert_eq!(settings.cutter_comp_radius, 3.0);
        assert!(cmi.calls.iter().any(|c| c == "cutter_radius_comp(3)"));
    }

    #[test]
    fn m30_ends_program() {
        let params = ParameterTable::new();
        let mut settings = Settings::new();
        let block = block_from("m30", &params);
        let mut cmi = RecordingMachine::default();
        let mut params = ParameterTable::new();
        let status = execute_block(&block, &mut settings, &mut params, &mut cmi).unwrap();
        assert_eq!(status, ExecStatus::Exit);
    }
}
