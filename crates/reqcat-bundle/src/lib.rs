//! Document bundling: order discovered documents by their `require`
//! declarations and concatenate them into a single artifact.
//!
//! [`pipeline`] runs discovery, resolution, graph construction and sorting;
//! [`sink`] persists the ordered contents without ever leaving a partial file.

pub mod pipeline;
pub mod sink;
