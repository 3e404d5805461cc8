//! Offline data-prep for the transit map: the schedule-stop-pair extract
//! filters and the attribution build. The interactive logic lives in the
//! `map-model` crate, shared with the browser frontend.

pub mod ssp;
