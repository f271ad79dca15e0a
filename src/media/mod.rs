//! Media sources: probing/decoding, edit-list clips, the asset library and the resolver.

pub(crate) mod clip;
pub(crate) mod decode;
pub(crate) mod library;
pub(crate) mod probe;
pub(crate) mod resolve;
