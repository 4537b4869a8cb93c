//! Core data model for the benthoscan landing-area detection pipeline.
//!
//! This crate holds everything the raster pipeline engine is built on:
//! the masked [`RasterBuffer`], the affine [`GeoTransform`], the tagged
//! [`Layer`] variants (raster / vector / kernel), the concurrent
//! [`LayerStore`], structuring-element construction and rotation, and the
//! least-squares plane fit used by the windowed filters.

mod error;
mod geo;
mod kernel;
mod layer;
mod plane;
mod raster;
mod store;

pub use error::{CoreError, Result};
pub use geo::GeoTransform;
pub use kernel::{build_structuring_element, rotate_structuring_element, KernelShape};
pub use layer::{CoordinateSpace, KernelData, Layer, LayerData, LayerKind, VectorData};
pub use plane::{fit_plane, plane_slope_deg, Plane};
pub use raster::RasterBuffer;
pub use store::{LayerRef, LayerStore};

/// Default NoData sentinel used for every derived raster layer.
pub const DEFAULT_NODATA: f64 = -9999.0;
