//! Straight and arc motion conversion, with cutter-radius compensation
//!
//! `arc.cpp` covers only bare center/radius computation (reused via
//! [`crate::arc`]); the corner-insertion logic below that offsets a straight
//! move by the tool radius and resolves corner angles is this module's own.

use crate::arc::{self, Turn};
use crate::canon::CanonicalMachine;
use crate::codes::*;
use crate::error::{Error, GeometryError};
use crate::settings::Settings;
use crate::types::{CutterCompSide, Plane, Position};

/// Tolerance for "radius to end matches radius to start", in inches.
pub const TOLERANCE_INCH: f64 = 2e-4;
/// Same tolerance, in millimeters.
pub const TOLERANCE_MM: f64 = 2e-3;
/// Slack allowed before a compensated corner is rejected as concave.
pub const TOLERANCE_CONCAVE_CORNER: f64 = 0.01;
/// Sentinel for "`program_x`/`program_y` unknown" (first move after
/// compensation turns on), matching the legacy `UNKNOWN` constant.
pub const UNKNOWN: f64 = 1e-20;

fn tolerance(settings: &Settings) -> f64 {
    match settings.length_units {
        crate::types::Units::Imperial => TOLERANCE_INCH,
        crate::types::Units::Metric => TOLERANCE_MM,
    }
}

/// The in-plane (`first`, `second`) and out-of-plane (`third`) components of
/// a position, in the orientation the active plane puts them.
pub(crate) fn plane_split(plane: Plane, pos: Position) -> (f64, f64, f64) {
    match plane {
        Plane::Xy => (pos.x, pos.y, pos.z),
        Plane::Xz => (pos.x, pos.z, pos.y),
        Plane::Yz => (pos.y, pos.z, pos.x),
    }
}

pub(crate) fn plane_join(plane: Plane, first: f64, second: f64, third: f64, rest: Position) -> Position {
    match plane {
        Plane::Xy => Position::new(first, second, third, rest.a, rest.b, rest.c),
        Plane::Xz => Position::new(first, third, second, rest.a, rest.b, rest.c),
        Plane::Yz => Position::new(third, first, second, rest.a, rest.b, rest.c),
    }
}

fn is_comp_active(settings: &Settings) -> bool {
    settings.cutter_comp_side != CutterCompSide::Off
}

/// Execute a straight (feed or rapid) move to `end`, applying cutter-radius
/// compensation if active.
pub fn straight_move(settings: &mut Settings, cmi: &mut impl CanonicalMachine, end: Position, rapid: bool) -> Result<(), Error> {
    if !is_comp_active(settings) {
        settings.current = end;
        if rapid {
            cmi.rapid(end);
        } else {
            cmi.linear(end);
        }
        return Ok(());
    }

    let (px, py, pz) = plane_split(settings.plane, end);
    let (cx, cy, _) = plane_split(settings.plane, settings.current);
    let side = settings.cutter_comp_side;
    let radius = settings.cutter_comp_radius;

    // Zero-length in-plane move: just propagate, no geometry needed.
    if settings.program_x == px && settings.program_y == py {
        settings.current = end;
        if rapid {
            cmi.rapid(end);
        } else {
            cmi.linear(end);
        }
        return Ok(());
    }

    let sign = if side == CutterCompSide::Left { 1.0 } else { -1.0 };
    let dir = (py - settings.program_y).atan2(px - settings.program_x);
    let normal = dir + sign * std::f64::consts::FRAC_PI_2;
    let comp_end_first = px + radius * normal.cos();
    let comp_end_second = py + radius * normal.sin();

    if settings.program_x == UNKNOWN || settings.program_y == UNKNOWN {
        // First cut after compensation turned on: straight line from the
        // current (already-compensated) tool position to the offset end.
        let out = plane_join(settings.plane, comp_end_first, comp_end_second, pz, end);
        settings.current = out;
        settings.program_x = px;
        settings.program_y = py;
        if rapid {
            cmi.rapid(out);
        } else {
            cmi.linear(out);
        }
        return Ok(());
    }

    let theta = (cy - settings.program_y).atan2(cx - settings.program_x);
    let alpha = dir;
    let mut beta = theta - alpha - sign * std::f64::consts::FRAC_PI_2;
    while beta < -std::f64::consts::PI {
        beta += std::f64::consts::TAU;
    }
    while beta > std::f64::consts::PI {
        beta -= std::f64::consts::TAU;
    }
    if beta < -TOLERANCE_CONCAVE_CORNER || beta > std::f64::consts::PI + TOLERANCE_CONCAVE_CORNER {
        return Err(GeometryError::ConcaveCornerWithCutterRadiusComp.into());
    }

    if beta > TOLERANCE_CONCAVE_CORNER {
        let corner_turn = if side == CutterCompSide::Left { -1 } else { 1 };
        cmi.arc(comp_end_first, comp_end_second, px, py, corner_turn, pz, end.a, end.b, end.c);
    }

    let out = plane_join(settings.plane, comp_end_first, comp_end_second, pz, end);
    settings.current = out;
    settings.program_x = px;
    settings.program_y = py;
    if rapid {
        cmi.rapid(out);
    } else {
        cmi.linear(out);
    }
    Ok(())
}

/// Arc motion input, already permuted into the active plane's (first,
/// second) coordinates by the caller.
pub struct ArcInput {
    pub turn: Turn,
    pub end: Position,
    /// `Some` for IJK form, `None` for R form.
    pub ijk: Option<(f64, f64)>,
    pub r: Option<f64>,
}

/// Execute an arc move, computing the center from IJK or R form and applying
/// cutter-radius compensation if active. Returns the path length (for
/// inverse-time feed calculation).
pub fn arc_move(settings: &mut Settings, cmi: &mut impl CanonicalMachine, input: ArcInput) -> Result<f64, Error> {
    let tol = tolerance(settings);
    let (ex, ey, ez) = plane_split(settings.plane, input.end);
    let (cx, cy, cz) = plane_split(settings.plane, settings.current);
    let comp_active = is_comp_active(settings);

    let (center_x, center_y, turn) = if comp_active {
        match input.ijk {
            Some((i, j)) => arc::arc_data_comp_ijk(input.turn, settings.cutter_comp_side, settings.cutter_comp_radius, cx, cy, ex, ey, i, j, tol)?,
            None => {
                let r = input.r.ok_or(Error::Bug("arc with no IJK or R".into()))?;
                arc::arc_data_comp_r(input.turn, settings.cutter_comp_side, settings.cutter_comp_radius, cx, cy, ex, ey, r)?
            }
        }
    } else {
        match input.ijk {
            Some((i, j)) => arc::arc_data_ijk(input.turn, cx, cy, ex, ey, i, j, tol)?,
            None => {
                let r = input.r.ok_or(Error::Bug("arc with no IJK or R".into()))?;
                arc::arc_data_r(input.turn, cx, cy, ex, ey, r)?
            }
        }
    };

    // The center is always anchored to the tool's actual current position
    // (cx, cy), compensated or not, so the tool path never has a gap to
    // bridge at its start the way a straight move's offset line can. The
    // tool's end point is the programmed end point projected onto the same
    // circle, at the tool's own radius from that shared center.
    let (tool_x, tool_y) = if comp_active {
        let tool_radius = (center_x - cx).hypot(center_y - cy);
        let theta_end = (ey - center_y).atan2(ex - center_x);
        (center_x + tool_radius * theta_end.cos(), center_y + tool_radius * theta_end.sin())
    } else {
        (ex, ey)
    };

    let length = arc::find_arc_length(cx, cy, cz, center_x, center_y, turn, tool_x, tool_y, ez);

    let out = plane_join(settings.plane, tool_x, tool_y, ez, input.end);
    cmi.arc(tool_x, tool_y, center_x, center_y, turn, ez, out.a, out.b, out.c);
    settings.current = out;
    settings.program_x = ex;
    settings.program_y = ey;
    Ok(length)
}

/// ×10-encoded motion code to `(is_arc, is_rapid)`, used by the executor to
/// pick between [`straight_move`] and [`arc_move`].
pub fn motion_kind(code: i32) -> (bool, bool) {
    match code {
        G0 => (false, true),
        G1 => (false, false),
        G2 | G3 => (true, false),
        _ => (false, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::test_support::RecordingMachine;

    #[test]
    fn uncompensated_straight_move_updates_current_and_emits_linear() {
        let mut settings = Settings::new();
        let mut cmi = RecordingMachine::default();
        straight_move(&mut settings, &mut cmi, Position::xyz(4.0, 5.0, 6.0), false).unwrap();
        assert_eq!(settings.current, Position::xyz(4.0, 5.0, 6.0));
        assert_eq!(cmi.calls.last().unwrap(), "linear(X4.0000 Y5.0000 Z6.0000 A0.0000 B0.0000 C0.0000)");
    }

    #[test]
    fn rapid_move_uses_rapid_emission() {
        let mut settings = Settings::new();
        let mut cmi = RecordingMachine::default();
        straight_move(&mut settings, &mut cmi, Position::xyz(1.0, 2.0, 3.0), true).unwrap();
        assert!(cmi.calls.last().unwrap().starts_with("rapid("));
    }

    #[test]
    fn quarter_circle_ijk_arc_reports_center_and_turn() {
        let mut settings = Settings::new();
        settings.current = Position::xyz(1.0, 0.0, 0.0);
        let mut cmi = RecordingMachine::default();
        arc_move(
            &mut settings,
            &mut cmi,
            ArcInput {
                turn: Turn::CounterClockwise,
                end: Position::xyz(0.0, 1.0, 0.0),
                ijk: Some((-1.0, 0.0)),
                r: None,
            },
        )
        .unwrap();
        assert_eq!(settings.current, Position::xyz(0.0, 1.0, 0.0));
        assert_eq!(cmi.calls.last().unwrap(), "arc(0,1,0,0,1,0,0,0,0)");
    }

    #[test]
    fn compensated_arc_offsets_the_tool_endpoint_by_radius() {
        // Tool at (1,0), center (0,0) via I=-1,J=0 (arc radius 1). The
        // programmed end point (0,-1.5) sits 1.5 from the center; left comp
        // on a CCW arc shrinks the tool path by the 0.5 tool radius, so the
        // tool should land at (0,-1), not at the programmed point.
        let mut settings = Settings::new();
        settings.current = Position::xyz(1.0, 0.0, 0.0);
        settings.cutter_comp_side = CutterCompSide::Left;
        settings.cutter_comp_radius = 0.5;
        let mut cmi = RecordingMachine::default();
        arc_move(
            &mut settings,
            &mut cmi,
            ArcInput {
                turn: Turn::CounterClockwise,
                end: Position::xyz(0.0, -1.5, 0.0),
                ijk: Some((-1.0, 0.0)),
                r: None,
            },
        )
        .unwrap();
        assert!(settings.current.x.abs() < 1e-9);
        assert!((settings.current.y - -1.0).abs() < 1e-9);
        // The program point is tracked uncompensated, distinct from the tool tip.
        assert_eq!(settings.program_x, 0.0);
        assert_eq!(settings.program_y, -1.5);
    }

    #[test]
    fn motion_kind_classifies_rapid_feed_and_arc() {
        assert_eq!(motion_kind(G0), (false, true));
        assert_eq!(motion_kind(G1), (false, false));
        assert_eq!(motion_kind(G2), (true, false));
    }
}
