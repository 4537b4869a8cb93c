//! Masked, NoData-aware raster operators.
//!
//! Every function here is a pure transformation from input buffers to a
//! freshly allocated output buffer; the [`crate::Pipeline`] layer does the
//! name resolution, locking and store writes around them.

pub mod arith;
pub mod contour;
pub mod morphology;
pub mod plane_map;
pub mod window;
