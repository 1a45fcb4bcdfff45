//! Lattice driver and record assembly.

mod error;
mod lattice;
mod observer;
mod params;
mod pipeline;
mod record;
mod summary;

pub use error::TrackError;
pub use lattice::LatticeSpec;
pub use observer::{CancelToken, NoopObserver, TrackObserver};
pub use params::TrackParams;
pub use pipeline::{ElevationPair, FeatureTracker, TrackInputs, TrackOutput};
pub use record::{DisplacementRecord, Elevation3d};
pub use summary::{RejectionCounts, TrackSummary};
