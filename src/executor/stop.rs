//! Stopping M-codes and program reset

use crate::canon::CanonicalMachine;
use crate::codes::*;
use crate::executor::coords;
use crate::params::ParameterTable;
use crate::settings::{Coolant, Settings};
use crate::types::{ControlMode, CutterCompSide, DistanceMode, Direction, FeedMode, OnOff, Plane};

/// Outcome of running a stopping M-code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// M0/M1: program-stop, resume expected. M1's optional-stop honoring is
    /// left to the driver (`program_optional_stop` vs `program_stop`).
    Stop,
    /// M2/M30: program end, interpreter state reset.
    End,
}

/// Run a stopping M-code (`M0/M1/M2/M30/M60`), resetting interpreter state
/// for M2/M30.
pub fn run(settings: &mut Settings, params: &mut ParameterTable, cmi: &mut impl CanonicalMachine, code: i32, optional: bool) -> Option<StopOutcome> {
    match code {
        M0 => {
            cmi.program_stop();
            Some(StopOutcome::Stop)
        }
        M1 => {
            if optional {
                cmi.program_optional_stop();
            } else {
                cmi.program_stop();
            }
            Some(StopOutcome::Stop)
        }
        M60 => {
            cmi.program_stop();
            cmi.pallet_shuttle();
            Some(StopOutcome::Stop)
        }
        M2 | M30 => {
            reset(settings, params, cmi);
            cmi.program_end();
            if code == M30 {
                cmi.pallet_shuttle();
            }
            Some(StopOutcome::End)
        }
        _ => None,
    }
}

fn reset(settings: &mut Settings, params: &ParameterTable, cmi: &mut impl CanonicalMachine) {
    coords::reset_to_system_one(settings, params);
    settings.plane = Plane::Xy;
    settings.distance_mode = DistanceMode::Absolute;
    settings.feed_mode = FeedMode::UnitsPerMinute;
    settings.feed_override = OnOff::On;
    settings.speed_override = OnOff::On;
    settings.cutter_comp_side = CutterCompSide::Off;
    settings.program_x = super::motion::UNKNOWN;
    settings.program_y = super::motion::UNKNOWN;
    settings.spindle_turning = Direction::Stop;
    settings.motion_mode = Some(G1);
    settings.coolant = Coolant::default();
    settings.control_mode = ControlMode::ExactPath;

    cmi.offset_origin(settings.origin_offset + settings.axis_offset);
    cmi.plane(settings.plane);
    cmi.cutter_radius_comp_stop();
    cmi.spindle_stop();
    cmi.coolant_flood_off();
    cmi.coolant_mist_off();
}
