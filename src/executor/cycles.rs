//! Canned-cycle engine, G81-G89
//!
//! One shared implementation drives all three planes (XY/YZ/ZX); plane
//! permutation goes through [`super::motion`]'s `plane_split`/`plane_join`
//! rather than a literal body closure, so the peck/bore/tap loop template
//! is expressed once and reused by every G8x code.

use crate::canon::CanonicalMachine;
use crate::codes::*;
use crate::error::{Error, SemanticError};
use crate::settings::{CycleState, Settings};
use crate::types::{ControlMode, DistanceMode, Plane, Position, RetractMode};

const RAPID_RETRACT_DELTA_IN: f64 = 0.010;
const RAPID_RETRACT_DELTA_MM: f64 = 0.254;

fn rapid_retract_delta(settings: &Settings) -> f64 {
    match settings.length_units {
        crate::types::Units::Imperial => RAPID_RETRACT_DELTA_IN,
        crate::types::Units::Metric => RAPID_RETRACT_DELTA_MM,
    }
}

fn plane_name(plane: Plane) -> &'static str {
    match plane {
        Plane::Xy => "XY",
        Plane::Xz => "XZ",
        Plane::Yz => "YZ",
    }
}

/// Block-level inputs to a canned cycle, already defaulted to sticky state
/// for any word the block omitted.
#[derive(Debug, Clone, Copy)]
pub struct CycleWords {
    pub first: f64,
    pub second: f64,
    pub r: f64,
    pub z: f64,
    pub l: i32,
    pub p: f64,
    pub q: f64,
    pub i: f64,
    pub j: f64,
    pub k: f64,
}

/// Run the canned cycle named by `code` (`G81..=G89`) `words.l` times,
/// permuting through `settings.plane`.
pub fn run(settings: &mut Settings, cmi: &mut impl CanonicalMachine, code: i32, mut words: CycleWords) -> Result<(), Error> {
    let (start_first, start_second, start_third) = super::motion::plane_split(settings.plane, settings.current);

    let mut r = words.r;
    let mut z = words.z;
    let (mut first, mut second) = (words.first, words.second);
    let (delta_first, delta_second) = (first, second);

    if settings.distance_mode == DistanceMode::Incremental {
        r += start_third;
        z = r + z;
        first += start_first;
        second += start_second;
    }

    if r < z {
        return Err(SemanticError::RBelowZInCannedCycle { plane_name: plane_name(settings.plane) }.into());
    }

    if start_third < r {
        let rapid_to = super::motion::plane_join(settings.plane, start_first, start_second, r, settings.current);
        cmi.rapid(rapid_to);
        settings.current = rapid_to;
    }

    let old_control_mode = settings.control_mode;
    settings.control_mode = ControlMode::ExactPath;

    let mut old_clear = match settings.retract_mode {
        RetractMode::OldZ => start_third,
        RetractMode::RPlane => r,
    };

    for iteration in 0..words.l.max(1) {
        // Incremental repeats translate by the programmed delta each pass;
        // absolute-mode repeats stay at the same in-plane position.
        let (this_first, this_second) = if settings.distance_mode == DistanceMode::Incremental {
            (first + iteration as f64 * delta_first, second + iteration as f64 * delta_second)
        } else {
            (first, second)
        };

        let (cur_first, cur_second, cur_third) = super::motion::plane_split(settings.plane, settings.current);
        if cur_first != this_first || cur_second != this_second {
            let to = super::motion::plane_join(settings.plane, this_first, this_second, old_clear, settings.current);
            cmi.rapid(to);
            settings.current = to;
        }
        if cur_third < r {
            let to = super::motion::plane_join(settings.plane, this_first, this_second, r, settings.current);
            cmi.rapid(to);
            settings.current = to;
        }

        run_body(settings, cmi, code, &words, this_first, this_second, r, z)?;

        old_clear = match settings.retract_mode {
            RetractMode::OldZ => start_third,
            RetractMode::RPlane => r,
        };
    }

    settings.control_mode = old_control_mode;
    words.r = r;
    words.z = z;
    settings.cycle = CycleState {
        l: words.l,
        p: words.p,
        q: words.q,
        r: words.r,
        z: words.z,
        i: words.i,
        j: words.j,
        k: words.k,
    };
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_body(
    settings: &mut Settings,
    cmi: &mut impl CanonicalMachine,
    code: i32,
    words: &CycleWords,
    first: f64,
    second: f64,
    r: f64,
    z: f64,
) -> Result<(), Error> {
    let feed = |settings: &mut Settings, cmi: &mut impl CanonicalMachine, third: f64| {
        let to = super::motion::plane_join(settings.plane, first, second, third, settings.current);
        cmi.linear(to);
        settings.current = to;
    };
    let rapid = |settings: &mut Settings, cmi: &mut impl CanonicalMachine, third: f64| {
        let to = super::motion::plane_join(settings.plane, first, second, third, settings.current);
        cmi.rapid(to);
        settings.current = to;
    };

    match code {
        G81 => {
            feed(settings, cmi, z);
            rapid(settings, cmi, r);
        }
        G82 => {
            feed(settings, cmi, z);
            cmi.dwell(words.p);
            rapid(settings, cmi, r);
        }
        G83 => {
            let delta = rapid_retract_delta(settings);
            let mut depth = r;
            loop {
                depth -= words.q;
                let bottomed = depth <= z;
                let this_depth = if bottomed { z } else { depth };
                feed(settings, cmi, this_depth);
                if bottomed {
                    break;
                }
                rapid(settings, cmi, r);
                rapid(settings, cmi, this_depth + delta);
            }
            rapid(settings, cmi, r);
        }
        G84 => {
            if settings.spindle_turning != crate::types::Direction::Clockwise {
                return Err(SemanticError::SpindleNotTurningClockwiseInG84.into());
            }
            cmi.speed_feed_sync_start();
            feed(settings, cmi, z);
            cmi.spindle_stop();
            cmi.spindle_start_counterclockwise();
            feed(settings, cmi, r);
            cmi.speed_feed_sync_stop();
            cmi.spindle_stop();
            cmi.spindle_start_clockwise();
            settings.spindle_turning = crate::types::Direction::Clockwise;
        }
        G85 => {
            feed(settings, cmi, z);
            feed(settings, cmi, r);
        }
        G86 => {
            feed(settings, cmi, z);
            cmi.dwell(words.p);
            cmi.spindle_stop();
            rapid(settings, cmi, r);
            match settings.spindle_turning {
                crate::types::Direction::CounterClockwise => cmi.spindle_start_counterclockwise(),
                _ => cmi.spindle_start_clockwise(),
            }
        }
        G87 => {
            let offset_first = first + words.i;
            let offset_second = second + words.j;
            let middle = z + words.k;
            let offset_to = super::motion::plane_join(settings.plane, offset_first, offset_second, r, settings.current);
            cmi.rapid(offset_to);
            settings.current = offset_to;
            cmi.spindle_stop();
            cmi.spindle_orient(0.0, crate::canon::OrientDirection::Clockwise);
            let bottom_to = super::motion::plane_join(settings.plane, offset_first, offset_second, z, settings.current);
            cmi.rapid(bottom_to);
            settings.current = bottom_to;
            let to_cut = super::motion::plane_join(settings.plane, first, second, z, settings.current);
            cmi.rapid(to_cut);
            settings.current = to_cut;
            cmi.spindle_start_clockwise();
            feed(settings, cmi, middle);
            feed(settings, cmi, z);
            cmi.spindle_stop();
            cmi.spindle_orient(0.0, crate::canon::OrientDirection::Clockwise);
            let back_offset = super::motion::plane_join(settings.plane, offset_first, offset_second, z, settings.current);
            cmi.rapid(back_offset);
            settings.current = back_offset;
            rapid(settings, cmi, r);
            let clear_to = super::motion::plane_join(settings.plane, first, second, r, settings.current);
            cmi.rapid(clear_to);
            settings.current = clear_to;
            cmi.spindle_start_clockwise();
        }
        G88 => {
            feed(settings, cmi, z);
            cmi.dwell(words.p);
            cmi.spindle_stop();
            cmi.program_stop();
            cmi.spindle_start_clockwise();
        }
        G89 => {
            feed(settings, cmi, z);
            cmi.dwell(words.p);
            feed(settings, cmi, r);
        }
        other => return Err(Error::Bug(format!("{other} is not a canned-cycle code"))),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::test_support::RecordingMachine;

    fn words(first: f64, second: f64, r: f64, z: f64, l: i32) -> CycleWords {
        CycleWords { first, second, r, z, l, p: 0.0, q: 1.0, i: 0.0, j: 0.0, k: 0.0 }
    }

    #[test]
    fn g81_drills_to_z_and_retracts_to_r() {
        let mut settings = Settings::new();
        settings.current = Position::xyz(0.0, 0.0, 10.0);
        settings.distance_mode = DistanceMode::Absolute;
        let mut cmi = RecordingMachine::default();
        run(&mut settings, &mut cmi, G81, words(10.0, 0.0, 2.0, -5.0, 1)).unwrap();
        assert_eq!(settings.current.z, 2.0);
        assert!(cmi.calls.iter().any(|c| c.contains("linear") && c.contains("Z-5")));
    }

    #[test]
    fn r_below_z_is_rejected() {
        let mut settings = Settings::new();
        settings.current = Position::xyz(0.0, 0.0, 10.0);
        let mut cmi = RecordingMachine::default();
        let err = run(&mut settings, &mut cmi, G81, words(0.0, 0.0, -5.0, 2.0, 1)).unwrap_err();
        assert!(matches!(err, Error::Semantic(SemanticError::RBelowZInCannedCycle { .. })));
    }

    #[test]
    fn incremental_repeats_translate_each_iteration() {
        let mut settings = Settings::new();
        settings.current = Position::xyz(0.0, 0.0, 10.0);
        settings.distance_mode = DistanceMode::Incremental;
        let mut cmi = RecordingMachine::default();
        run(&mut settings, &mut cmi, G81, words(10.0, 0.0, 2.0, -5.0, 3)).unwrap();
        assert_eq!(settings.current.x, 30.0);
    }
}
