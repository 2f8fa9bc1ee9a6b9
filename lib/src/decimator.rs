use std::iter::FusedIterator;

use crate::{Error, Point, PointSource, Result, Sampler};

/// Minimum number of points a source needs to be decimated.
pub const MIN_POINTS: usize = 3;

/// Pull-based decimation over a [`PointSource`].
///
/// Each call to [`Iterator::next`] yields exactly one retained point, an
/// error, or `None` once the last point of the source has been emitted. The
/// first and last points of the source are always retained.
///
/// An error ends the stream: the call that fails yields the error and every
/// later call yields `None` until [`Decimator::reset`].
#[derive(Debug, Clone)]
pub struct Decimator<S> {
    source: S,
    sampler: Sampler,
    cursor: usize,
    done: bool,
}

impl<S: PointSource> Decimator<S> {
    pub fn new(source: S, tol: f64) -> Result<Self> {
        if source.len() < MIN_POINTS {
            return Err(Error::invalid(format!(
                "need at least {MIN_POINTS} points to decimate, got {}",
                source.len()
            )));
        }
        Ok(Decimator {
            source,
            sampler: Sampler::new(tol)?,
            cursor: 0,
            done: false,
        })
    }

    /// Sets interpolating mode and rewinds to the first point, so the mode
    /// never changes in the middle of a stream.
    pub fn with_interpolation(mut self, interpolate: bool) -> Self {
        self.reset();
        self.sampler.set_interpolate(interpolate);
        self
    }

    pub fn interpolate(&self) -> bool {
        self.sampler.interpolate()
    }

    /// Switches interpolating mode. Refused once streaming has started;
    /// call [`Decimator::reset`] first.
    pub fn set_interpolate(&mut self, interpolate: bool) -> Result<()> {
        if self.started() {
            return Err(Error::invalid(
                "interpolation mode cannot change mid-stream",
            ));
        }
        self.sampler.set_interpolate(interpolate);
        Ok(())
    }

    pub fn tolerance(&self) -> f64 {
        self.sampler.tolerance()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Rewinds to the first point of the source.
    pub fn reset(&mut self) {
        self.sampler.finish();
        self.cursor = 0;
        self.done = false;
    }

    fn started(&self) -> bool {
        self.cursor > 0 || self.done
    }

    /// Rewinds and drains the decimator into a new point source.
    pub fn materialize(&mut self) -> Result<Vec<Point>> {
        self.reset();
        let points = self.by_ref().collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            input = self.source.len(),
            retained = points.len(),
            tolerance = self.tolerance(),
            "decimated"
        );
        Ok(points)
    }

    fn advance(&mut self) -> Result<Option<Point>> {
        let step = self.step();
        if step.is_err() {
            self.done = true;
        }
        step
    }

    fn step(&mut self) -> Result<Option<Point>> {
        if self.done {
            return Ok(None);
        }

        if self.cursor == 0 {
            // The anchor is only handed out once its cone has a defined
            // bearing, so a degenerate head fails the very first call.
            let first = self.source.point(0);
            let second = self.source.point(1);
            let anchor = self.sampler.push(first)?;
            if let Err(err) = self.sampler.push(second) {
                self.sampler.finish();
                return Err(err);
            }
            self.cursor = 2;
            return Ok(anchor);
        }

        let n = self.source.len();
        while self.cursor < n {
            let kept = self.sampler.push(self.source.point(self.cursor))?;
            self.cursor += 1;
            if kept.is_some() {
                return Ok(kept);
            }
        }

        self.done = true;
        Ok(self.sampler.finish())
    }
}

impl<S: PointSource> Iterator for Decimator<S> {
    type Item = Result<Point>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

impl<S: PointSource> FusedIterator for Decimator<S> {}

/// Decimates `source` with tolerance `tol` and collects the retained points.
pub fn decimate<S: PointSource>(source: S, tol: f64, interpolate: bool) -> Result<Vec<Point>> {
    Decimator::new(source, tol)?
        .with_interpolation(interpolate)
        .materialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Columns;

    fn pts(data: &[(f64, f64)]) -> Vec<Point> {
        data.iter().map(|&p| p.into()).collect()
    }

    // Every dropped point must sit within tol of the segment joining the
    // retained points around it.
    fn assert_within_tolerance(source: &[Point], kept: &[Point], tol: f64) {
        let mut seg = 0;
        for p in source {
            while seg + 1 < kept.len() && kept[seg + 1].x < p.x {
                seg += 1;
            }
            if seg + 1 >= kept.len() {
                break;
            }
            let (a, b) = (kept[seg], kept[seg + 1]);
            let line = a.y + (b.y - a.y) * (p.x - a.x) / (b.x - a.x);
            assert!(
                (p.y - line).abs() <= tol + 1e-9,
                "({}, {}) is {} away from segment {:?}-{:?}",
                p.x,
                p.y,
                (p.y - line).abs(),
                a,
                b
            );
        }
    }

    fn signal(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 0.05;
                Point::new(x, (x * 1.7).sin() * 3.0 + (x * 11.0).cos() * 0.2)
            })
            .collect()
    }

    #[test]
    fn too_few_points_is_invalid_input() {
        let two = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(
            Decimator::new(&two, 0.1),
            Err(Error::InvalidInput(_))
        ));
        let none: Vec<Point> = Vec::new();
        assert!(matches!(
            Decimator::new(&none, 0.1),
            Err(Error::InvalidInput(_))
        ));
        let three = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(Decimator::new(&three, 0.1).is_ok());
    }

    #[test]
    fn negative_tolerance_is_invalid_input() {
        let three = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        assert!(matches!(
            Decimator::new(&three, -1.0),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn collinear_triple_keeps_endpoints() {
        let source = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]);
        let mut d = Decimator::new(&source, 0.01).unwrap();
        assert_eq!(d.next().unwrap().unwrap(), Point::new(0.0, 0.0));
        assert_eq!(d.next().unwrap().unwrap(), Point::new(2.0, 2.0));
        assert!(d.next().is_none());
        assert!(d.next().is_none());
    }

    #[test]
    fn jump_at_the_end() {
        let source = pts(&[(0.0, 0.0), (1.0, 0.01), (2.0, -0.01), (3.0, 5.0)]);
        let kept = decimate(&source, 0.1, false).unwrap();
        assert_eq!(
            kept,
            pts(&[(0.0, 0.0), (2.0, -0.01), (3.0, 5.0)])
        );
        assert_within_tolerance(&source, &kept, 0.1);
    }

    #[test]
    fn endpoints_are_preserved() {
        let source = signal(400);
        for interpolate in [false, true] {
            let kept = decimate(&source, 0.05, interpolate).unwrap();
            assert_eq!(kept.first(), source.first());
            assert_eq!(kept.last(), source.last());
        }
    }

    #[test]
    fn output_never_grows() {
        let source = signal(400);
        let kept = decimate(&source, 0.05, false).unwrap();
        assert!(kept.len() < source.len());
        assert!(kept.windows(2).all(|w| w[0].x < w[1].x));
    }

    #[test]
    fn zig_zag_keeps_everything() {
        let source: Vec<Point> = (0..9)
            .map(|i| Point::new(i as f64, (i % 2) as f64))
            .collect();
        let kept = decimate(&source, 0.1, false).unwrap();
        assert_eq!(kept, source);
    }

    #[test]
    fn dropped_points_within_tolerance() {
        let source = signal(1000);
        for tol in [0.01, 0.1, 0.5] {
            let kept = decimate(&source, tol, false).unwrap();
            assert_within_tolerance(&source, &kept, tol);
        }
    }

    #[test]
    fn interpolated_points_within_tolerance() {
        let source = signal(1000);
        for tol in [0.01, 0.1, 0.5] {
            let kept = decimate(&source, tol, true).unwrap();
            assert_within_tolerance(&source, &kept, tol);
            assert!(kept
                .iter()
                .all(|k| source.iter().any(|p| p.x == k.x)));
        }
    }

    #[test]
    fn redecimation_is_stable() {
        let source = pts(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (3.0, 5.0),
            (4.0, 5.0),
            (5.0, 5.0),
        ]);
        let once = decimate(&source, 0.1, false).unwrap();
        assert_eq!(once, pts(&[(0.0, 0.0), (2.0, 0.0), (3.0, 5.0), (5.0, 5.0)]));
        let twice = decimate(&once, 0.1, false).unwrap();
        assert_eq!(twice, once);
    }

    #[test]
    fn duplicate_leading_x_is_degenerate() {
        let source = pts(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)]);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        assert!(matches!(
            d.next(),
            Some(Err(Error::DegenerateGeometry { .. }))
        ));
        assert!(d.next().is_none());
        assert!(d.next().is_none());
    }

    #[test]
    fn reset_after_error_replays_it() {
        let source = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 3.0), (2.0, 0.0)]);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        assert_eq!(d.next().unwrap().unwrap(), Point::new(0.0, 0.0));
        assert!(matches!(
            d.next(),
            Some(Err(Error::DegenerateGeometry { x, y })) if x == 1.0 && y == 3.0
        ));
        assert!(d.next().is_none());

        d.reset();
        assert_eq!(d.next().unwrap().unwrap(), Point::new(0.0, 0.0));
        assert!(matches!(
            d.next(),
            Some(Err(Error::DegenerateGeometry { .. }))
        ));
    }

    #[test]
    fn error_terminates_adapters() {
        let source = pts(&[(0.0, 0.0), (1.0, 0.0), (1.0, 3.0), (2.0, 0.0)]);
        let d = Decimator::new(&source, 0.1).unwrap();
        let items: Vec<Result<Point>> = d.take(100).collect();
        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());

        let d = Decimator::new(&source, 0.1).unwrap();
        let ok: Vec<Point> = d.filter_map(|r| r.ok()).collect();
        assert_eq!(ok, pts(&[(0.0, 0.0)]));
    }

    #[test]
    fn degenerate_point_mid_stream() {
        let source = pts(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (2.0, 3.0), (3.0, 0.0)]);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        assert_eq!(d.next().unwrap().unwrap(), Point::new(0.0, 0.0));
        let err = d.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::DegenerateGeometry { x, y } if x == 2.0 && y == 3.0));
        assert!(decimate(&source, 0.1, false).is_err());
    }

    #[test]
    fn reset_replays_the_stream() {
        let source = signal(200);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        let first: Vec<Point> = d.by_ref().map(|p| p.unwrap()).collect();
        assert!(d.next().is_none());
        d.reset();
        let second: Vec<Point> = d.by_ref().map(|p| p.unwrap()).collect();
        assert_eq!(first, second);
        assert_eq!(d.materialize().unwrap(), first);
    }

    #[test]
    fn interpolation_is_fixed_once_started() {
        let source = signal(10);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        assert!(!d.interpolate());
        d.set_interpolate(true).unwrap();
        assert!(d.interpolate());
        d.next();
        assert!(matches!(
            d.set_interpolate(false),
            Err(Error::InvalidInput(_))
        ));
        d.reset();
        d.set_interpolate(false).unwrap();
    }

    #[test]
    fn builder_rewinds_before_switching_mode() {
        let source = signal(50);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        d.next();
        d.next();
        let mut d = d.with_interpolation(true);
        assert!(d.interpolate());
        assert_eq!(d.next().unwrap().unwrap(), source[0]);
        let rest: Vec<Point> = d.map(|p| p.unwrap()).collect();
        let mut expected = decimate(&source, 0.1, true).unwrap();
        expected.remove(0);
        assert_eq!(rest, expected);
    }

    #[test]
    fn mode_is_locked_after_a_failed_first_call() {
        let source = pts(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]);
        let mut d = Decimator::new(&source, 0.1).unwrap();
        assert!(d.next().unwrap().is_err());
        assert!(d.set_interpolate(true).is_err());
    }

    #[test]
    fn column_source() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 1.0, 1.0, 1.0];
        let kept = decimate(Columns::new(&xs, &ys), 0.0, false).unwrap();
        assert_eq!(kept, pts(&[(0.0, 1.0), (3.0, 1.0)]));
    }
}
