use crate::kernel::rotate_structuring_element;
use crate::{CoreError, RasterBuffer, Result};

/// Discriminant of the three layer variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
	Raster,
	Vector,
	Kernel,
}

impl LayerKind {
	pub fn as_str(self) -> &'static str {
		match self {
			LayerKind::Raster => "raster",
			LayerKind::Vector => "vector",
			LayerKind::Kernel => "kernel",
		}
	}
}

/// Coordinate system of the points stored in a vector layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateSpace {
	Pixel,
	World,
}

/// Ordered sequence of 2D points, e.g. a boundary polyline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VectorData {
	pub points: Vec<(f64, f64)>,
	pub space: CoordinateSpace,
}

impl Default for CoordinateSpace {
	fn default() -> Self {
		CoordinateSpace::Pixel
	}
}

/// Binary structuring element plus its rotated derivation.
///
/// `rotated` is kept consistent with `rotation_deg` at all times: both
/// `set_rotation` and `set_base` rebuild it eagerly, so concurrent readers
/// holding a shared layer lock always observe a coherent pair.
#[derive(Clone, Debug)]
pub struct KernelData {
	base: RasterBuffer,
	rotation_deg: f64,
	rotated: RasterBuffer,
}

impl KernelData {
	pub fn new(base: RasterBuffer) -> KernelData {
		let rotated = base.clone();
		KernelData {
			base,
			rotation_deg: 0.0,
			rotated,
		}
	}

	pub fn base(&self) -> &RasterBuffer {
		&self.base
	}

	pub fn rotated(&self) -> &RasterBuffer {
		&self.rotated
	}

	pub fn rotation_deg(&self) -> f64 {
		self.rotation_deg
	}

	/// Records the angle and rebuilds the rotated element. Idempotent for
	/// equal angles; zero degrees leaves `rotated` equal to `base`.
	pub fn set_rotation(&mut self, rotation_deg: f64) {
		self.rotation_deg = rotation_deg;
		self.rotated = rotate_structuring_element(&self.base, rotation_deg);
	}

	/// Replaces the base element, re-deriving `rotated` at the current angle.
	pub fn set_base(&mut self, base: RasterBuffer) {
		self.base = base;
		self.rotated = rotate_structuring_element(&self.base, self.rotation_deg);
	}
}

/// Payload of a layer.
#[derive(Clone, Debug)]
pub enum LayerData {
	Raster(RasterBuffer),
	Vector(VectorData),
	Kernel(KernelData),
}

impl LayerData {
	pub fn kind(&self) -> LayerKind {
		match self {
			LayerData::Raster(_) => LayerKind::Raster,
			LayerData::Vector(_) => LayerKind::Vector,
			LayerData::Kernel(_) => LayerKind::Kernel,
		}
	}
}

/// A named, uniquely identified layer owned by a single store.
#[derive(Clone, Debug)]
pub struct Layer {
	pub name: String,
	pub id: u32,
	pub data: LayerData,
}

impl Layer {
	pub fn kind(&self) -> LayerKind {
		self.data.kind()
	}

	fn type_mismatch(&self, expected: LayerKind) -> CoreError {
		CoreError::LayerTypeMismatch {
			name: self.name.clone(),
			expected: expected.as_str(),
			actual: self.kind().as_str(),
		}
	}

	pub fn as_raster(&self) -> Result<&RasterBuffer> {
		match &self.data {
			LayerData::Raster(buffer) => Ok(buffer),
			_ => Err(self.type_mismatch(LayerKind::Raster)),
		}
	}

	pub fn as_raster_mut(&mut self) -> Result<&mut RasterBuffer> {
		// the error is built from fields disjoint from `data`, so the
		// returned borrow does not conflict with it
		let actual = self.kind().as_str();
		match &mut self.data {
			LayerData::Raster(buffer) => Ok(buffer),
			_ => Err(CoreError::LayerTypeMismatch {
				name: self.name.clone(),
				expected: LayerKind::Raster.as_str(),
				actual,
			}),
		}
	}

	pub fn as_vector(&self) -> Result<&VectorData> {
		match &self.data {
			LayerData::Vector(vector) => Ok(vector),
			_ => Err(self.type_mismatch(LayerKind::Vector)),
		}
	}

	pub fn as_vector_mut(&mut self) -> Result<&mut VectorData> {
		let actual = self.kind().as_str();
		match &mut self.data {
			LayerData::Vector(vector) => Ok(vector),
			_ => Err(CoreError::LayerTypeMismatch {
				name: self.name.clone(),
				expected: LayerKind::Vector.as_str(),
				actual,
			}),
		}
	}

	pub fn as_kernel(&self) -> Result<&KernelData> {
		match &self.data {
			LayerData::Kernel(kernel) => Ok(kernel),
			_ => Err(self.type_mismatch(LayerKind::Kernel)),
		}
	}

	pub fn as_kernel_mut(&mut self) -> Result<&mut KernelData> {
		let actual = self.kind().as_str();
		match &mut self.data {
			LayerData::Kernel(kernel) => Ok(kernel),
			_ => Err(CoreError::LayerTypeMismatch {
				name: self.name.clone(),
				expected: LayerKind::Kernel.as_str(),
				actual,
			}),
		}
	}
}
