//! Coordinate systems and axis offsets
//!
//! G54..G59.3 select one of nine coordinate-system origins; G92 applies a
//! further axis offset on top; G10 L2 writes an origin directly; G53
//! reinterprets a block's axis words as machine-absolute. Grounded on
//! `setup.h`'s `axis_offset`/`origin_offset` fields — their exact
//! interaction follows this module's own reading of the frame rules.

use crate::canon::CanonicalMachine;
use crate::codes::*;
use crate::params::ParameterTable;
use crate::settings::Settings;
use crate::types::Position;

/// First required parameter of the 6-wide origin block for coordinate
/// system `index` (`1..=9`), matching [`crate::params::required_parameters`].
fn origin_base(index: i32) -> i32 {
    5221 + 20 * (index - 1)
}

fn read_origin(params: &ParameterTable, index: i32) -> Position {
    let base = origin_base(index);
    Position::new(
        params.get(base),
        params.get(base + 1),
        params.get(base + 2),
        params.get(base + 3),
        params.get(base + 4),
        params.get(base + 5),
    )
}

fn write_origin(params: &mut ParameterTable, index: i32, pos: Position) {
    let base = origin_base(index);
    params.set(base, pos.x);
    params.set(base + 1, pos.y);
    params.set(base + 2, pos.z);
    params.set(base + 3, pos.a);
    params.set(base + 4, pos.b);
    params.set(base + 5, pos.c);
}

/// First parameter of the G28 home-position block.
pub const G28_HOME_BASE: i32 = 5161;
/// First parameter of the G30 home-position block.
pub const G30_HOME_BASE: i32 = 5181;

fn read_block(params: &ParameterTable, base: i32) -> Position {
    Position::new(
        params.get(base),
        params.get(base + 1),
        params.get(base + 2),
        params.get(base + 3),
        params.get(base + 4),
        params.get(base + 5),
    )
}

/// G28/G30: optionally rapid to `intermediate` (the block's own axis words,
/// already resolved into the current frame), then rapid to the stored home
/// position at `base` (`G28_HOME_BASE`/`G30_HOME_BASE`), which is recorded
/// in the machine frame like a G53 target.
pub fn go_to_reference_point(settings: &mut Settings, params: &ParameterTable, cmi: &mut impl CanonicalMachine, base: i32, intermediate: Option<Position>) {
    if let Some(pt) = intermediate {
        cmi.rapid(pt);
        settings.current = pt;
    }
    let stored = read_block(params, base);
    let target = to_machine_absolute(settings, stored);
    cmi.rapid(target);
    settings.current = target;
}

/// ×10-encoded G-code to coordinate-system index, `1..=9`.
pub fn origin_index_for_code(code: i32) -> i32 {
    match code {
        G54 => 1,
        G55 => 2,
        G56 => 3,
        G57 => 4,
        G58 => 5,
        G59 => 6,
        G59_1 => 7,
        G59_2 => 8,
        G59_3 => 9,
        _ => unreachable!("caller must only pass G54..G59.3"),
    }
}

/// Activate coordinate system `new_index` (G54..G59.3).
pub fn select_coordinate_system(
    settings: &mut Settings,
    params: &ParameterTable,
    cmi: &mut impl CanonicalMachine,
    new_index: i32,
) {
    let new_offset = read_origin(params, new_index);
    settings.current = settings.current + settings.origin_offset - new_offset;
    settings.origin_offset = new_offset;
    settings.origin_index = new_index;
    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
}

/// G92: set the axis offset so the block's axis words become the new
/// current position, in every axis the block gave.
pub fn set_axis_offset(
    settings: &mut Settings,
    params: &mut ParameterTable,
    cmi: &mut impl CanonicalMachine,
    block_value: Position,
    given: [bool; 6],
) {
    let mut offset = settings.axis_offset;
    let mut current = settings.current;
    let old = [
        settings.current.x,
        settings.current.y,
        settings.current.z,
        settings.current.a,
        settings.current.b,
        settings.current.c,
    ];
    let block = [block_value.x, block_value.y, block_value.z, block_value.a, block_value.b, block_value.c];
    let mut off = [offset.x, offset.y, offset.z, offset.a, offset.b, offset.c];
    let mut cur = [current.x, current.y, current.z, current.a, current.b, current.c];
    for axis in 0..6 {
        if given[axis] {
            off[axis] = old[axis] + off[axis] - block[axis];
            cur[axis] = block[axis];
        }
    }
    offset = Position::new(off[0], off[1], off[2], off[3], off[4], off[5]);
    current = Position::new(cur[0], cur[1], cur[2], cur[3], cur[4], cur[5]);

    settings.axis_offset = offset;
    settings.current = current;
    params.set(5211, offset.x);
    params.set(5212, offset.y);
    params.set(5213, offset.z);
    params.set(5214, offset.a);
    params.set(5215, offset.b);
    params.set(5216, offset.c);
    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
}

/// G92.1: zero the axis offset and its parameters.
pub fn clear_axis_offset_and_parameters(settings: &mut Settings, params: &mut ParameterTable, cmi: &mut impl CanonicalMachine) {
    settings.axis_offset = Position::ZERO;
    for (n, index) in (5211..=5216).enumerate() {
        let _ = n;
        params.set(index, 0.0);
    }
    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
}

/// G92.2: zero the axis offset, leaving its parameters untouched.
pub fn clear_axis_offset(settings: &mut Settings, cmi: &mut impl CanonicalMachine) {
    settings.axis_offset = Position::ZERO;
    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
}

/// G92.3: restore the axis offset from its parameters.
pub fn restore_axis_offset(settings: &mut Settings, params: &ParameterTable, cmi: &mut impl CanonicalMachine) {
    settings.axis_offset = Position::new(
        params.get(5211),
        params.get(5212),
        params.get(5213),
        params.get(5214),
        params.get(5215),
        params.get(5216),
    );
    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
}

/// G10 L2 Pn: write a coordinate-system origin directly, updating live
/// state if `p` names the currently active system.
pub fn set_coordinate_system_origin(
    settings: &mut Settings,
    params: &mut ParameterTable,
    cmi: &mut impl CanonicalMachine,
    p: i32,
    block_value: Position,
    given: [bool; 6],
) {
    let mut origin = read_origin(params, p);
    let block = [block_value.x, block_value.y, block_value.z, block_value.a, block_value.b, block_value.c];
    let mut o = [origin.x, origin.y, origin.z, origin.a, origin.b, origin.c];
    for axis in 0..6 {
        if given[axis] {
            o[axis] = block[axis];
        }
    }
    origin = Position::new(o[0], o[1], o[2], o[3], o[4], o[5]);
    write_origin(params, p, origin);

    if p == settings.origin_index {
        settings.current = settings.current + settings.origin_offset - origin;
        settings.origin_offset = origin;
        cmi.offset_origin(settings.origin_offset + settings.axis_offset);
    }
}

/// G53: reinterpret `block_value` as machine-absolute by subtracting the
/// active origin and axis offsets.
pub fn to_machine_absolute(settings: &Settings, block_value: Position) -> Position {
    block_value - settings.origin_offset - settings.axis_offset
}

/// Re-home `origin_index` to 1 and clear the axis offset, as done by M2/M30.
/// Returns the new `current` position, expressed in the system-1 frame.
pub fn reset_to_system_one(settings: &mut Settings, params: &ParameterTable) {
    let machine_current = settings.current + settings.origin_offset + settings.axis_offset;
    let new_offset = read_origin(params, 1);
    settings.origin_offset = new_offset;
    settings.origin_index = 1;
    settings.axis_offset = Position::ZERO;
    settings.current = machine_current - new_offset;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::test_support::RecordingMachine;

    #[test]
    fn selecting_current_system_emits_no_offset_change() {
        let mut settings = Settings::new();
        let params = ParameterTable::new();
        let mut cmi = RecordingMachine::default();
        select_coordinate_system(&mut settings, &params, &mut cmi, 1);
        assert_eq!(settings.current, Position::ZERO);
        assert_eq!(cmi.calls.last().unwrap(), &format!("offset_origin({})", Position::ZERO));
    }

    #[test]
    fn g92_sets_axis_offset_and_current() {
        let mut settings = Settings::new();
        settings.current = Position::xyz(5.0, 5.0, 5.0);
        let mut params = ParameterTable::new();
        let mut cmi = RecordingMachine::default();
        set_axis_offset(
            &mut settings,
            &mut params,
            &mut cmi,
            Position::xyz(2.0, 0.0, 0.0),
            [true, false, false, false, false, false],
        );
        assert_eq!(settings.current.x, 2.0);
        assert_eq!(settings.axis_offset.x, 3.0);
        assert_eq!(params.get(5211), 3.0);
    }

    #[test]
    fn g92_1_zeroes_offset_and_parameters() {
        let mut settings = Settings::new();
        settings.axis_offset = Position::xyz(1.0, 2.0, 3.0);
        let mut params = ParameterTable::new();
        params.set(5211, 1.0);
        let mut cmi = RecordingMachine::default();
        clear_axis_offset_and_parameters(&mut settings, &mut params, &mut cmi);
        assert_eq!(settings.axis_offset, Position::ZERO);
        assert_eq!(params.get(5211), 0.0);
    }

    #[test]
    fn reset_to_system_one_normalises_into_machine_frame() {
        let mut settings = Settings::new();
        settings.origin_index = 3;
        settings.origin_offset = Position::xyz(10.0, 0.0, 0.0);
        settings.axis_offset = Position::xyz(1.0, 0.0, 0.0);
        settings.current = Position::xyz(0.0, 0.0, 0.0);
        let params = ParameterTable::new();
        reset_to_system_one(&mut settings, &params);
        assert_eq!(settings.origin_index, 1);
        assert_eq!(settings.axis_offset, Position::ZERO);
        assert_eq!(settings.current, Position::xyz(11.0, 0.0, 0.0));
    }
}
