use crate::ops::{arith, arith::CompareOp, contour, morphology, plane_map, window, window::WindowFilter};
use crate::{names, PipelineParams};
use benthoscan_core::{
	build_structuring_element, CoordinateSpace, CoreError, GeoTransform, KernelData, KernelShape,
	LayerData, LayerKind, LayerStore, Plane, RasterBuffer, Result, VectorData, DEFAULT_NODATA,
};
use log::debug;

/// Named-layer raster pipeline.
///
/// Owns the layer store plus the process-wide geo-transform/projection
/// template that operators stamp onto derived rasters. All operators take
/// layer names, auto-create missing raster destinations, and never touch
/// the destination when they fail.
///
/// Operators snapshot their inputs under shared layer locks, compute on
/// the snapshots, and only then take the destination lock, so no thread
/// ever holds a write lock while acquiring another lock.
#[derive(Debug)]
pub struct Pipeline {
	store: LayerStore,
	geo_transform: GeoTransform,
	projection: String,
	pub verbosity: u8,
	pub use_nodata_mask: bool,
	default_nodata: f64,
}

impl Default for Pipeline {
	fn default() -> Self {
		Pipeline {
			store: LayerStore::new(),
			geo_transform: GeoTransform::default(),
			projection: String::new(),
			verbosity: 0,
			use_nodata_mask: true,
			default_nodata: DEFAULT_NODATA,
		}
	}
}

impl Pipeline {
	pub fn new() -> Pipeline {
		Pipeline::default()
	}

	pub fn from_params(params: &PipelineParams) -> Pipeline {
		Pipeline {
			verbosity: params.scheduling.verbosity,
			use_nodata_mask: params.map.use_nodata_mask,
			default_nodata: params.map.default_nodata,
			..Pipeline::default()
		}
	}

	pub fn store(&self) -> &LayerStore {
		&self.store
	}

	pub fn geo_transform(&self) -> GeoTransform {
		self.geo_transform
	}

	pub fn projection(&self) -> &str {
		&self.projection
	}

	/// Seeds the raw bathymetry and its derived valid-data mask
	/// (`M1_RAW_Bathymetry`, `M1_VALID_DataMask`) and adopts the raster's
	/// geo properties as the pipeline template.
	pub fn seed_bathymetry(&mut self, mut raster: RasterBuffer) -> Result<()> {
		raster.update_mask();

		let mut valid = RasterBuffer::like(&raster);
		valid.nodata = self.default_nodata;
		for (i, m) in raster.mask.iter().enumerate() {
			valid.data[i] = if *m != 0 { 255.0 } else { 0.0 };
			valid.mask[i] = 255;
		}

		self.store.insert(names::RAW_BATHYMETRY, LayerData::Raster(raster))?;
		self.store.insert(names::VALID_DATA_MASK, LayerData::Raster(valid))?;
		self.set_template(names::RAW_BATHYMETRY)
	}

	/// Adopts the geo-transform and projection of an existing raster layer
	/// as the pipeline-wide template.
	pub fn set_template(&mut self, name: &str) -> Result<()> {
		let layer = self.store.get(name)?;
		let guard = layer.read();
		let raster = guard.as_raster()?;
		self.geo_transform = raster.geo_transform;
		self.projection = raster.projection_wkt.clone();
		Ok(())
	}

	/// Snapshot of a raster layer's buffer.
	pub fn raster(&self, name: &str) -> Result<RasterBuffer> {
		let layer = self.store.get(name)?;
		let guard = layer.read();
		Ok(guard.as_raster()?.clone())
	}

	/// Snapshot of a kernel layer's rotated (or base) element.
	pub(crate) fn kernel_buffer(&self, name: &str, use_rotated: bool) -> Result<RasterBuffer> {
		let layer = self.store.get(name)?;
		let guard = layer.read();
		let kernel = guard.as_kernel()?;
		Ok(if use_rotated {
			kernel.rotated().clone()
		} else {
			kernel.base().clone()
		})
	}

	/// Writes a buffer into a raster destination, creating the layer when
	/// absent. The pipeline projection is stamped on if the buffer carries
	/// none.
	pub(crate) fn write_raster(&self, name: &str, mut buffer: RasterBuffer) -> Result<()> {
		if buffer.projection_wkt.is_empty() {
			buffer.projection_wkt = self.projection.clone();
		}
		let layer = self.store.ensure_raster(name)?;
		let mut guard = layer.write();
		*guard.as_raster_mut()? = buffer;
		Ok(())
	}

	pub fn remove_layer(&self, name: &str) -> Result<()> {
		self.store.remove(name)
	}

	/// Creates a kernel layer holding a `width_m x length_m` structuring
	/// element of the given shape, sized by the template pixel resolution.
	pub fn create_kernel_template(
		&self,
		name: &str,
		width_m: f64,
		length_m: f64,
		shape: KernelShape,
	) -> Result<u32> {
		if width_m <= 0.0 || length_m <= 0.0 {
			return Err(CoreError::WrongArgument(format!(
				"kernel template '{name}' needs positive dimensions, got {width_m} x {length_m}"
			)));
		}
		let sx = self.geo_transform.pixel_width();
		let sy = self.geo_transform.pixel_height();
		if sx * sy == 0.0 {
			return Err(CoreError::WrongArgument(format!(
				"kernel template '{name}' needs a non-zero pixel resolution, got {sx} x {sy}"
			)));
		}
		// windowed filters need at least three samples, so a footprint is
		// never materialised below 3 px per side
		let ncols = ((width_m / sx).ceil() as usize).max(3);
		let nrows = ((length_m / sy).ceil() as usize).max(3);
		debug!("kernel template '{name}': {nrows} x {ncols} px, shape {shape:?}");
		let base = build_structuring_element(shape, nrows, ncols)?;
		self.store.insert(name, LayerData::Kernel(KernelData::new(base)))
	}

	/// Sets the heading of a kernel layer, rebuilding its rotated element.
	pub fn set_kernel_rotation(&self, name: &str, rotation_deg: f64) -> Result<()> {
		let layer = self.store.get(name)?;
		let mut guard = layer.write();
		guard.as_kernel_mut()?.set_rotation(rotation_deg);
		Ok(())
	}

	/// Binary erosion of `base` by the kernel's rotated element: the
	/// coverage exclusion map for the kernel's heading.
	pub fn compute_exclusion_map(&self, base: &str, kernel: &str, dst: &str) -> Result<()> {
		let src = self.raster(base)?;
		let element = self.kernel_buffer(kernel, true)?;
		self.write_raster(dst, morphology::erode(&src, &element))
	}

	/// Generic windowed filter under the kernel's rotated element.
	pub fn apply_window_filter(
		&self,
		raster: &str,
		kernel: &str,
		mask: &str,
		dst: &str,
		filter: WindowFilter,
	) -> Result<()> {
		let src = self.raster(raster)?;
		let element = self.kernel_buffer(kernel, true)?;
		let mask = self.raster(mask)?;
		if mask.rows != src.rows || mask.cols != src.cols {
			return Err(CoreError::WrongArgument(format!(
				"mask shape {} x {} does not match raster {} x {}",
				mask.rows, mask.cols, src.rows, src.cols
			)));
		}
		let sx = self.geo_transform.pixel_width();
		let sy = self.geo_transform.pixel_height();
		let out = window::apply_window_filter(&src, &element, &mask, sx, sy, filter);
		self.write_raster(dst, out)
	}

	pub fn lowpass_filter(&self, raster: &str, kernel: &str, mask: &str, dst: &str) -> Result<()> {
		self.apply_window_filter(raster, kernel, mask, dst, WindowFilter::Mean)
	}

	/// Direct box-mean low-pass over a `w x h` pixel window.
	pub fn box_lowpass_filter(&self, raster: &str, dst: &str, w: usize, h: usize) -> Result<()> {
		if w == 0 || h == 0 {
			return Err(CoreError::WrongArgument(format!(
				"box filter window must be positive, got {w} x {h}"
			)));
		}
		let src = self.raster(raster)?;
		self.write_raster(dst, window::box_mean(&src, w, h))
	}

	pub fn compute_mean_slope_map(&self, raster: &str, kernel: &str, mask: &str, dst: &str) -> Result<()> {
		self.apply_window_filter(raster, kernel, mask, dst, WindowFilter::Slope)
	}

	pub fn compute_measurability_map(&self, raster: &str, kernel: &str, mask: &str, dst: &str) -> Result<()> {
		self.apply_window_filter(raster, kernel, mask, dst, WindowFilter::Measurability)
	}

	/// Elevation difference `-raw + filtered` (see
	/// [`arith::height_difference`]).
	pub fn compute_height(&self, raw: &str, filtered: &str, dst: &str) -> Result<()> {
		let raw = self.raster(raw)?;
		let filtered = self.raster(filtered)?;
		self.write_raster(dst, arith::height_difference(&raw, &filtered)?)
	}

	/// Elementwise threshold comparison to a 0/255 raster.
	pub fn compare_layer(&self, src: &str, dst: &str, threshold: f64, op: CompareOp) -> Result<()> {
		let src = self.raster(src)?;
		self.write_raster(dst, arith::compare(&src, threshold, op))
	}

	/// Copies `src` where `mask` is non-zero, sentinel elsewhere. A kernel
	/// mask contributes its rotated or base element per `use_rotated`.
	pub fn mask_layer(&self, src: &str, mask: &str, dst: &str, use_rotated: bool) -> Result<()> {
		let src = self.raster(src)?;
		let mask_layer = self.store.get(mask)?;
		let mask_buffer = {
			let guard = mask_layer.read();
			match guard.kind() {
				LayerKind::Raster => guard.as_raster()?.clone(),
				LayerKind::Kernel => {
					let kernel = guard.as_kernel()?;
					if use_rotated {
						kernel.rotated().clone()
					} else {
						kernel.base().clone()
					}
				}
				LayerKind::Vector => {
					return Err(CoreError::LayerTypeMismatch {
						name: guard.name.clone(),
						expected: "raster",
						actual: "vector",
					});
				}
			}
		};
		self.write_raster(dst, arith::mask_apply(&src, &mask_buffer)?)
	}

	/// Restricts the validity of `dst` to the valid cells of `src`; the
	/// values of `src` are ignored.
	pub fn copy_mask(&self, src: &str, dst: &str) -> Result<()> {
		let src = self.raster(src)?;
		let layer = self.store.get(dst)?;
		let mut guard = layer.write();
		arith::restrict_mask(guard.as_raster_mut()?, &src)
	}

	/// Restricts the validity of `dst` to the valid, non-zero footprint of
	/// the binary coverage map `src`.
	pub fn mask_by_coverage(&self, src: &str, dst: &str) -> Result<()> {
		let src = self.raster(src)?;
		let layer = self.store.get(dst)?;
		let mut guard = layer.write();
		arith::restrict_to_coverage(guard.as_raster_mut()?, &src)
	}

	/// Extracts the longest external contour of a binary raster into a
	/// pixel-space vector layer.
	pub fn extract_contours(&self, raster: &str, dst: &str) -> Result<()> {
		let src = self.raster(raster)?;
		let points = contour::longest_external_contour(&src)?;
		debug!("contour of '{raster}': {} vertices", points.len());
		let payload = VectorData {
			points,
			space: CoordinateSpace::Pixel,
		};
		if self.store.contains(dst) {
			self.store.upload(dst, LayerData::Vector(payload))
		} else {
			self.store.insert(dst, LayerData::Vector(payload)).map(|_| ())
		}
	}

	/// Rasterises an analytic plane over the template layer's grid.
	pub fn generate_plane_map(&self, dst: &str, plane: &Plane, template: &str) -> Result<()> {
		let template = self.raster(template)?;
		let sx = self.geo_transform.pixel_width();
		let sy = self.geo_transform.pixel_height();
		self.write_raster(dst, plane_map::generate_plane_map(plane, &template, sx, sy)?)
	}

	/// Per-cell mean of equally weighted rasters; `scale` is applied to
	/// every input first (`1.0 / 255.0` for binary maps).
	pub fn blend_mean(&self, srcs: &[String], dst: &str, scale: f64) -> Result<()> {
		let buffers = srcs
			.iter()
			.map(|name| self.raster(name))
			.collect::<Result<Vec<_>>>()?;
		self.write_raster(dst, arith::blend_mean(&buffers, scale)?)
	}

	/// M3 composition: landable where no exclusion map fires.
	pub fn compute_landability_map(&self, slope_excl: &str, lo_prot: &str, hi_prot: &str, dst: &str) -> Result<()> {
		let slope_excl = self.raster(slope_excl)?;
		let lo_prot = self.raster(lo_prot)?;
		let hi_prot = self.raster(hi_prot)?;
		self.write_raster(dst, arith::landability(&slope_excl, &lo_prot, &hi_prot)?)
	}

	/// M4 composition: measurability scores zeroed outside the landable
	/// area.
	pub fn compute_blend_measurability(&self, landability: &str, measurability: &str, dst: &str) -> Result<()> {
		let landability = self.raster(landability)?;
		let measurability = self.raster(measurability)?;
		self.write_raster(dst, arith::measurability_product(&measurability, &landability)?)
	}

	/// Snapshot of a vector layer.
	pub fn vector(&self, name: &str) -> Result<VectorData> {
		let layer = self.store.get(name)?;
		let guard = layer.read();
		Ok(guard.as_vector()?.clone())
	}
}
