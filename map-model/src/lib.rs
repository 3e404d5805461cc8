//! Shared state and interaction logic for the transit map. Everything the
//! browser frontend decides — which viewport to open with, which features a
//! pointer event highlights, which filter expression the style layers carry,
//! where the schedule animation clock stands — lives here, free of any
//! rendering engine, so it can be exercised natively.
//!
//! The rendering surface itself (mapbox-gl on the site) is only reachable
//! through the [`highlight::FeatureQuery`] trait; the frontend provides the
//! one implementation that talks to the real map.

pub mod attribution;
pub mod clock;
pub mod constants;
pub mod feature;
pub mod filter;
pub mod highlight;
pub mod operators;
pub mod schedule;
pub mod style;
pub mod viewport;
