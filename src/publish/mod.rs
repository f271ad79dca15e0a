//! Upload of rendered videos to a hosting platform.
//!
//! [`youtube::YouTubePublisher`] drives the resumable upload protocol in [`resumable`] over an
//! HTTP transport; tests drive the same state machine with a scripted transport.

pub(crate) mod credentials;
pub(crate) mod resumable;
pub(crate) mod youtube;
