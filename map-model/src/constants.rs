//! Behavioural constants for the map. These are properties of the site and
//! its bundled data extract, not of the user's session.

/// radius in pixels to use for selecting map objects
pub const PICKING_RADIUS: f64 = 10.0;

/// Minimum zoom to allow highlighting routes on hover
pub const MIN_HIGHLIGHT_ZOOM: f64 = 11.0;

/// Minimum zoom to show the schedule animation
pub const MIN_SCHEDULE_ANIMATION_ZOOM: f64 = 11.0;

/// Minimum zoom at which to find operators in view
pub const MIN_OPERATOR_INFO_ZOOM: f64 = 9.0;

/// Max zoom for which schedule animation data exists
pub const MAX_SCHEDULE_ANIMATION_ZOOM: f64 = 13.0;
