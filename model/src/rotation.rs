use std::f64::consts::PI;

const FULL_TURN: f64 = 2.0 * PI;

/// Turns a compass heading (degrees, clockwise from north) into a rotation in radians that
/// continues from `previous` without ever changing by more than half a turn. The result isn't
/// wrapped into `[0, 2π)`, so interpolating between two consecutive rotations never sweeps the
/// long way around.
///
/// Without a heading, the previous rotation is kept (or 0 if there's nothing yet).
pub fn resolve(previous: Option<f64>, heading_degrees: Option<f64>) -> f64 {
    let heading = match heading_degrees.filter(|h| h.is_finite()) {
        Some(h) => h.to_radians().rem_euclid(FULL_TURN),
        None => return previous.unwrap_or(0.0),
    };
    let previous = match previous {
        Some(r) => r,
        None => return heading,
    };

    let mut delta = heading - previous.rem_euclid(FULL_TURN);
    if delta.abs() > PI {
        delta = -delta.signum() * (FULL_TURN - delta.abs());
    }
    previous + delta
}
