//! Arc-center geometry and path-length formulas
//!
//! All functions here treat their first two coordinates as "first
//! coordinate"/"second coordinate" of whichever plane is active — callers
//! permute X/Y/Z into that order before calling and permute back after.
//! Grounded on `arc.cpp`.

use std::f64::consts::PI;

use crate::error::{Error, GeometryError};
use crate::types::{CutterCompSide, Position};

const TWO_PI: f64 = 2.0 * PI;
const HALF_PI: f64 = PI / 2.0;
/// Matches the legacy `TINY`: allowed slack when a semicircle's radius
/// calculation would otherwise reject on floating-point rounding.
const TINY: f64 = 1e-12;

/// Arc turn direction: clockwise (G2) sweeps negative, counterclockwise
/// (G3) sweeps positive, matching the legacy `turn` sign convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

impl Turn {
    fn as_i32(self) -> i32 {
        match self {
            Turn::Clockwise => -1,
            Turn::CounterClockwise => 1,
        }
    }
}

/// Center and direction of a cutter-compensated IJK-format arc.
///
/// # Errors
/// [`GeometryError::RadiusToEndDiffersFromRadiusToStart`] if the
/// tool-radius-adjusted distance to the end point doesn't match the I/J
/// radius within `tolerance`.
#[allow(clippy::too_many_arguments)]
pub fn arc_data_comp_ijk(
    turn: Turn,
    side: CutterCompSide,
    tool_radius: f64,
    current_x: f64,
    current_y: f64,
    end_x: f64,
    end_y: f64,
    i_number: f64,
    j_number: f64,
    tolerance: f64,
) -> Result<(f64, f64, i32), Error> {
    let center_x = current_x + i_number;
    let center_y = current_y + j_number;
    let arc_radius = i_number.hypot(j_number);
    let mut radius2 = (center_x - end_x).hypot(center_y - end_y);

    let shrink = (side == CutterCompSide::Left && turn == Turn::CounterClockwise)
        || (side == CutterCompSide::Right && turn == Turn::Clockwise);
    radius2 = if shrink { radius2 - tool_radius } else { radius2 + tool_radius };

    if (arc_radius - radius2).abs() > tolerance {
        return Err(GeometryError::RadiusToEndDiffersFromRadiusToStart.into());
    }
    Ok((center_x, center_y, turn.as_i32()))
}

/// Center and direction of a cutter-compensated R-format arc.
///
/// # Errors
/// [`GeometryError::ToolRadiusNotLessThanArcRadiusWithComp`],
/// [`GeometryError::ArcRadiusTooSmallToReachEndPoint`], or
/// [`GeometryError::BugInToolRadiusComp`].
#[allow(clippy::too_many_arguments)]
pub fn arc_data_comp_r(
    turn: Turn,
    side: CutterCompSide,
    tool_radius: f64,
    current_x: f64,
    current_y: f64,
    end_x: f64,
    end_y: f64,
    big_radius: f64,
) -> Result<(f64, f64, i32), Error> {
    let abs_radius = big_radius.abs();
    let needs_shrink_check = (side == CutterCompSide::Left && turn == Turn::CounterClockwise)
        || (side == CutterCompSide::Right && turn == Turn::Clockwise);
    if needs_shrink_check && abs_radius <= tool_radius {
        return Err(GeometryError::ToolRadiusNotLessThanArcRadiusWithComp.into());
    }

    let distance = (end_x - current_x).hypot(end_y - current_y);
    let alpha = (end_y - current_y).atan2(end_x - current_x);
    let theta = if (turn == Turn::CounterClockwise && big_radius > 0.0)
        || (turn == Turn::Clockwise && big_radius < 0.0)
    {
        alpha + HALF_PI
    } else {
        alpha - HALF_PI
    };
    let radius2 = if needs_shrink_check { abs_radius - tool_radius } else { abs_radius + tool_radius };
    if distance > radius2 + abs_radius {
        return Err(GeometryError::ArcRadiusTooSmallToReachEndPoint.into());
    }
    let mid_length = (radius2 * radius2 + distance * distance - abs_radius * abs_radius) / (2.0 * distance);
    let mid_x = current_x + mid_length * alpha.cos();
    let mid_y = current_y + mid_length * alpha.sin();
    if radius2 * radius2 <= mid_length * mid_length {
        return Err(GeometryError::BugInToolRadiusComp.into());
    }
    let offset = (radius2 * radius2 - mid_length * mid_length).sqrt();

    let center_x = mid_x + offset * theta.cos();
    let center_y = mid_y + offset * theta.sin();
    Ok((center_x, center_y, turn.as_i32()))
}

/// Center and direction of an uncompensated IJK-format arc.
///
/// # Errors
/// [`GeometryError::ZeroRadiusArc`] if either radius is zero, or
/// [`GeometryError::RadiusToEndDiffersFromRadiusToStart`] if they differ by
/// more than `tolerance`.
#[allow(clippy::too_many_arguments)]
pub fn arc_data_ijk(
    turn: Turn,
    current_x: f64,
    current_y: f64,
    end_x: f64,
    end_y: f64,
    i_number: f64,
    j_number: f64,
    tolerance: f64,
) -> Result<(f64, f64, i32), Error> {
    let center_x = current_x + i_number;
    let center_y = current_y + j_number;
    let radius = (center_x - current_x).hypot(center_y - current_y);
    let radius2 = (center_x - end_x).hypot(center_y - end_y);
    if radius == 0.0 || radius2 == 0.0 {
        return Err(GeometryError::ZeroRadiusArc.into());
    }
    if (radius - radius2).abs() > tolerance {
        return Err(GeometryError::RadiusToEndDiffersFromRadiusToStart.into());
    }
    Ok((center_x, center_y, turn.as_i32()))
}

/// Center and direction of an uncompensated R-format arc.
///
/// # Errors
/// [`GeometryError::CurrentPointSameAsEndPointOfArc`] or
/// [`GeometryError::ArcRadiusTooSmallToReachEndPoint`].
pub fn arc_data_r(
    turn: Turn,
    current_x: f64,
    current_y: f64,
    end_x: f64,
    end_y: f64,
    radius: f64,
) -> Result<(f64, f64, i32), Error> {
    if end_x == current_x && end_y == current_y {
        return Err(GeometryError::CurrentPointSameAsEndPointOfArc.into());
    }
    let abs_radius = radius.abs();
    let mid_x = (end_x + current_x) / 2.0;
    let mid_y = (end_y + current_y) / 2.0;
    let mut half_length = (mid_x - end_x).hypot(mid_y - end_y);
    if half_length / abs_radius > 1.0 + TINY {
        return Err(GeometryError::ArcRadiusTooSmallToReachEndPoint.into());
    }
    if half_length / abs_radius > 1.0 - TINY {
        half_length = abs_radius;
    }

    let theta = if (turn == Turn::Clockwise && radius > 0.0) || (turn == Turn::CounterClockwise && radius < 0.0) {
        (end_y - current_y).atan2(end_x - current_x) - HALF_PI
    } else {
        (end_y - current_y).atan2(end_x - current_x) + HALF_PI
    };

    let half_turn = (half_length / abs_radius).asin();
    let offset = abs_radius * half_turn.cos();
    let center_x = mid_x + offset * theta.cos();
    let center_y = mid_y + offset * theta.sin();
    Ok((center_x, center_y, turn.as_i32()))
}

/// Angle swept CCW-positive, in radians, by an arc of `turn` full/partial
/// circles from `(x1, y1)` to `(x2, y2)` around `(center_x, center_y)`.
/// Returns `0.0` when `turn == 0`.
pub fn find_turn(x1: f64, y1: f64, center_x: f64, center_y: f64, turn: i32, x2: f64, y2: f64) -> f64 {
    if turn == 0 {
        return 0.0;
    }
    let mut alpha = (y1 - center_y).atan2(x1 - center_x);
    let mut beta = (y2 - center_y).atan2(x2 - center_x);
    if turn > 0 {
        if beta <= alpha {
            beta += TWO_PI;
        }
        (beta - alpha) + (turn - 1) as f64 * TWO_PI
    } else {
        if alpha <= beta {
            alpha += TWO_PI;
        }
        (beta - alpha) + (turn + 1) as f64 * TWO_PI
    }
}

/// Path length of a (possibly helical) arc, for inverse-time feed-rate
/// calculation.
pub fn find_arc_length(x1: f64, y1: f64, z1: f64, center_x: f64, center_y: f64, turn: i32, x2: f64, y2: f64, z2: f64) -> f64 {
    let radius = (center_x - x1).hypot(center_y - y1);
    let theta = find_turn(x1, y1, center_x, center_y, turn, x2, y2);
    if z2 == z1 {
        radius * theta.abs()
    } else {
        (radius * theta).hypot(z2 - z1)
    }
}

/// Path length of a straight (possibly multi-axis) move, for inverse-time
/// feed-rate calculation. If any of X/Y/Z move, rotary-axis motion is
/// ignored; otherwise the rotary axes alone determine the length.
pub fn find_straight_length(end: Position, start: Position) -> f64 {
    let linear_moves = start.x != end.x || start.y != end.y || start.z != end.z;
    let rotary_still = end.a == start.a && end.b == start.b && end.c == start.c;
    if linear_moves || rotary_still {
        ((end.x - start.x).powi(2) + (end.y - start.y).powi(2) + (end.z - start.z).powi(2)).sqrt()
    } else {
        ((end.a - start.a).powi(2) + (end.b - start.b).powi(2) + (end.c - start.c).powi(2)).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ijk_arc_quarter_circle() {
        let (cx, cy, turn) = arc_data_ijk(Turn::CounterClockwise, 1.0, 0.0, 0.0, 1.0, -1.0, 0.0, 1e-4).unwrap();
        assert!((cx - 0.0).abs() < 1e-9);
        assert!((cy - 0.0).abs() < 1e-9);
        assert_eq!(turn, 1);
    }

    #[test]
    fn ijk_arc_mismatched_radius_errors() {
        let err = arc_data_ijk(Turn::Clockwise, 1.0, 0.0, 0.0, 2.0, -1.0, 0.0, 1e-6).unwrap_err();
        assert_eq!(err, GeometryError::RadiusToEndDiffersFromRadiusToStart.into());
    }

    #[test]
    fn r_arc_same_point_errors() {
        let err = arc_data_r(Turn::Clockwise, 1.0, 1.0, 1.0, 1.0, 5.0).unwrap_err();
        assert_eq!(err, GeometryError::CurrentPointSameAsEndPointOfArc.into());
    }

    #[test]
    fn find_turn_zero_is_zero() {
        assert_eq!(find_turn(0.0, 0.0, 1.0, 0.0, 0, 1.0, 1.0), 0.0);
    }

    #[test]
    fn find_turn_quarter_circle_ccw() {
        let theta = find_turn(1.0, 0.0, 0.0, 0.0, 1, 0.0, 1.0);
        assert!((theta - HALF_PI).abs() < 1e-9);
    }

    #[test]
    fn straight_length_ignores_rotary_when_linear_moves() {
        let start = Position::new(0.0, 0.0, 0.0, 5.0, 0.0, 0.0);
        let end = Position::new(3.0, 4.0, 0.0, 10.0, 0.0, 0.0);
        assert!((find_straight_length(end, start) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn straight_length_uses_rotary_when_linear_still() {
        let start = Position::new(1.0, 1.0, 1.0, 0.0, 0.0, 0.0);
        let end = Position::new(1.0, 1.0, 1.0, 3.0, 4.0, 0.0);
        assert!((find_straight_length(end, start) - 5.0).abs() < 1e-9);
    }
}
