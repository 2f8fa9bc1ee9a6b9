use serde::{Deserialize, Serialize};

/// A single sample of a curve.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Bearing of `self` as seen from `origin`, in radians.
    ///
    /// Returns `None` when the bearing is undefined: both points share the
    /// same x, or either carries a non-finite coordinate.
    pub fn bearing_from(&self, origin: &Point) -> Option<f64> {
        let (dx, dy) = (self.x - origin.x, self.y - origin.y);
        if dx == 0.0 || !dx.is_finite() || !dy.is_finite() {
            return None;
        }
        let angle = dy.atan2(dx);
        angle.is_finite().then_some(angle)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point { x, y }
    }
}

impl From<Point> for (f64, f64) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

// PointSource is an ordered, read-only, indexable sequence of points with
// monotonically increasing x.
pub trait PointSource {
    fn len(&self) -> usize;

    // point returns the point at index i. Callers guarantee i < len().
    fn point(&self, i: usize) -> Point;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PointSource for [Point] {
    fn len(&self) -> usize {
        <[Point]>::len(self)
    }

    fn point(&self, i: usize) -> Point {
        self[i]
    }
}

impl PointSource for Vec<Point> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn point(&self, i: usize) -> Point {
        self[i]
    }
}

impl PointSource for [(f64, f64)] {
    fn len(&self) -> usize {
        <[(f64, f64)]>::len(self)
    }

    fn point(&self, i: usize) -> Point {
        self[i].into()
    }
}

impl PointSource for Vec<(f64, f64)> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn point(&self, i: usize) -> Point {
        self[i].into()
    }
}

impl<T: PointSource + ?Sized> PointSource for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn point(&self, i: usize) -> Point {
        (**self).point(i)
    }
}

/// Two parallel columns of x and y values, the shape a delimited file takes
/// once a pair of its columns has been parsed.
#[derive(Debug, Clone, Copy)]
pub struct Columns<'a> {
    xs: &'a [f64],
    ys: &'a [f64],
}

impl<'a> Columns<'a> {
    /// Pairs up `xs` and `ys`. Extra trailing values in the longer column are
    /// ignored.
    pub fn new(xs: &'a [f64], ys: &'a [f64]) -> Self {
        let n = xs.len().min(ys.len());
        Columns {
            xs: &xs[..n],
            ys: &ys[..n],
        }
    }
}

impl PointSource for Columns<'_> {
    fn len(&self) -> usize {
        self.xs.len()
    }

    fn point(&self, i: usize) -> Point {
        Point::new(self.xs[i], self.ys[i])
    }
}
