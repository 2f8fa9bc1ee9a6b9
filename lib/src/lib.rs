//! Tolerance-bounded decimation of sampled 2-D curves.
//!
//! Points are consumed in order of increasing x. A point is dropped when a
//! straight line between the retained points around it passes within `tol`
//! (vertically) of it. The first and last points are always retained.
//!
//! ```
//! use decimate::{decimate, Point};
//!
//! let curve = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)];
//! let kept = decimate(&curve[..], 0.01, false).unwrap();
//! assert_eq!(kept, vec![Point::new(0.0, 0.0), Point::new(2.0, 2.0)]);
//! ```

mod codec;
mod decimator;
mod error;
mod format;
mod point;
mod sampler;

pub use codec::*;
pub use decimator::*;
pub use error::*;
pub use format::*;
pub use point::*;
pub use sampler::*;
