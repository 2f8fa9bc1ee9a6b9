//! Push-based angle-cone decimation.
//!
//! A [`Sampler`] keeps a pivot (the last retained point) and the cone of
//! bearings from that pivot along which a single straight line stays within
//! `tol` of every point seen since. Each pushed point narrows the cone; a
//! point whose bearing leaves the cone ends the segment, and the last point
//! that still fit becomes the new pivot and is emitted.

use crate::{Error, Point, Result};

/// The permissible range of bearings from a pivot, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub min: f64,
    pub max: f64,
}

impl Cone {
    /// Bearings from `pivot` that keep `p` within `tol` vertically.
    pub fn around(pivot: &Point, p: &Point, tol: f64) -> Self {
        let (dx, dy) = (p.x - pivot.x, p.y - pivot.y);
        Cone {
            min: (dy - tol).atan2(dx),
            max: (dy + tol).atan2(dx),
        }
    }

    // NaN never falls inside.
    pub fn contains(&self, angle: f64) -> bool {
        angle >= self.min && angle <= self.max
    }

    pub fn narrow(&mut self, other: &Cone) {
        self.min = self.min.max(other.min);
        self.max = self.max.min(other.max);
    }

    /// Slope of the line bisecting the cone in tangent space.
    pub fn mid_slope(&self) -> f64 {
        (self.max.tan() + self.min.tan()) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Empty,
    Anchored {
        pivot: Point,
    },
    Tracking {
        pivot: Point,
        trailing: Point,
        cone: Cone,
    },
}

/// Streaming decimator fed one point at a time.
///
/// The first pushed point is emitted immediately. Every later breakpoint
/// emits the new pivot. [`Sampler::finish`] emits the last pushed point.
#[derive(Debug, Clone)]
pub struct Sampler {
    tol: f64,
    interpolate: bool,
    state: State,
}

impl Sampler {
    pub fn new(tol: f64) -> Result<Self> {
        if tol.is_nan() || tol < 0.0 {
            return Err(Error::invalid(format!(
                "tolerance must be a non-negative number, got {tol}"
            )));
        }
        Ok(Sampler {
            tol,
            interpolate: false,
            state: State::Empty,
        })
    }

    /// Recenter emitted points on the cone's midline instead of reusing the
    /// raw sample. Emitted y values then no longer coincide with the input.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tol
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    pub(crate) fn set_interpolate(&mut self, interpolate: bool) {
        self.interpolate = interpolate;
    }

    /// True until the first point is pushed, and again after `finish`.
    pub fn is_empty(&self) -> bool {
        self.state == State::Empty
    }

    /// The current cone, once at least two points have been pushed.
    pub fn cone(&self) -> Option<Cone> {
        match self.state {
            State::Tracking { cone, .. } => Some(cone),
            _ => None,
        }
    }

    /// Feeds the next point of the curve and returns the retained point it
    /// produced, if any.
    ///
    /// On error the sampler is left untouched, so the same point fails again
    /// if pushed again.
    pub fn push(&mut self, p: Point) -> Result<Option<Point>> {
        match self.state {
            State::Empty => {
                if !p.x.is_finite() || !p.y.is_finite() {
                    return Err(Error::DegenerateGeometry { x: p.x, y: p.y });
                }
                self.state = State::Anchored { pivot: p };
                Ok(Some(p))
            }
            State::Anchored { pivot } => {
                self.check_bearing(&pivot, &p)?;
                self.state = State::Tracking {
                    pivot,
                    trailing: p,
                    cone: Cone::around(&pivot, &p, self.tol),
                };
                Ok(None)
            }
            State::Tracking {
                pivot,
                trailing,
                mut cone,
            } => {
                let angle = self.check_bearing(&pivot, &p)?;
                if cone.contains(angle) {
                    cone.narrow(&Cone::around(&pivot, &p, self.tol));
                    self.state = State::Tracking {
                        pivot,
                        trailing: p,
                        cone,
                    };
                    return Ok(None);
                }

                let y = if self.interpolate {
                    pivot.y + (trailing.x - pivot.x) * cone.mid_slope()
                } else {
                    trailing.y
                };
                let next = Point::new(trailing.x, y);
                self.check_bearing(&next, &p)?;
                tracing::trace!(x = next.x, y = next.y, "breakpoint");
                self.state = State::Tracking {
                    pivot: next,
                    trailing: p,
                    cone: Cone::around(&next, &p, self.tol),
                };
                Ok(Some(next))
            }
        }
    }

    /// Ends the stream. Returns the last pushed point unless it was already
    /// emitted, and resets the sampler for a new stream.
    pub fn finish(&mut self) -> Option<Point> {
        let last = match self.state {
            State::Tracking { trailing, .. } => Some(trailing),
            _ => None,
        };
        self.state = State::Empty;
        last
    }

    fn check_bearing(&self, origin: &Point, p: &Point) -> Result<f64> {
        p.bearing_from(origin)
            .ok_or(Error::DegenerateGeometry { x: p.x, y: p.y })
    }
}
