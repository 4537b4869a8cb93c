use crate::{CoreError, Layer, LayerData, LayerKind, RasterBuffer, Result, VectorData, DEFAULT_NODATA};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Shared handle to a layer. Readers take the inner lock shared, the one
/// writer of a destination layer takes it exclusive.
pub type LayerRef = Arc<RwLock<Layer>>;

/// Named-layer store backing a pipeline.
///
/// A coarse lock guards name resolution and membership changes only;
/// layer contents live behind their own per-layer locks, so operators on
/// distinct layers proceed in parallel. Layers never leave the store or
/// get shared across stores; operator arguments are names resolved at
/// call time.
#[derive(Debug, Default)]
pub struct LayerStore {
	layers: RwLock<HashMap<String, LayerRef>>,
	next_id: AtomicU32,
}

fn validate_name(name: &str) -> Result<()> {
	let ok = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
	if ok {
		Ok(())
	} else {
		Err(CoreError::InvalidLayerName(name.to_string()))
	}
}

fn empty_payload(kind: LayerKind) -> LayerData {
	match kind {
		LayerKind::Raster => LayerData::Raster(
			RasterBuffer::new(1, 1, DEFAULT_NODATA).expect("1x1 raster is valid"),
		),
		LayerKind::Vector => LayerData::Vector(VectorData::default()),
		LayerKind::Kernel => LayerData::Kernel(crate::KernelData::new(
			RasterBuffer::filled(1, 1, 1.0, DEFAULT_NODATA).expect("1x1 raster is valid"),
		)),
	}
}

impl LayerStore {
	pub fn new() -> LayerStore {
		LayerStore::default()
	}

	/// Creates an empty layer of the given kind and returns its id.
	pub fn create(&self, name: &str, kind: LayerKind) -> Result<u32> {
		self.insert(name, empty_payload(kind))
	}

	/// Inserts a layer with the given payload and returns its id.
	pub fn insert(&self, name: &str, data: LayerData) -> Result<u32> {
		validate_name(name)?;
		let mut layers = self.layers.write();
		if layers.contains_key(name) {
			return Err(CoreError::DuplicatedLayerName(name.to_string()));
		}
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		debug!("creating {} layer '{name}' (id {id})", data.kind().as_str());
		layers.insert(
			name.to_string(),
			Arc::new(RwLock::new(Layer {
				name: name.to_string(),
				id,
				data,
			})),
		);
		Ok(id)
	}

	/// Resolves a layer by name.
	pub fn get(&self, name: &str) -> Result<LayerRef> {
		self.layers
			.read()
			.get(name)
			.cloned()
			.ok_or_else(|| CoreError::LayerNotFound(name.to_string()))
	}

	pub fn contains(&self, name: &str) -> bool {
		self.layers.read().contains_key(name)
	}

	/// Resolves a raster layer, creating it when absent.
	///
	/// This is the create-if-absent entry point operators use for their
	/// destinations; safe under contention because the membership lock is
	/// held across the lookup-or-insert.
	pub fn ensure_raster(&self, name: &str) -> Result<LayerRef> {
		validate_name(name)?;
		let mut layers = self.layers.write();
		if let Some(layer) = layers.get(name) {
			return Ok(layer.clone());
		}
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let layer = Arc::new(RwLock::new(Layer {
			name: name.to_string(),
			id,
			data: empty_payload(LayerKind::Raster),
		}));
		layers.insert(name.to_string(), layer.clone());
		Ok(layer)
	}

	pub fn remove(&self, name: &str) -> Result<()> {
		debug!("removing layer '{name}'");
		self.layers
			.write()
			.remove(name)
			.map(|_| ())
			.ok_or_else(|| CoreError::LayerNotFound(name.to_string()))
	}

	/// Renames the layer carrying `id`.
	pub fn rename(&self, id: u32, new_name: &str) -> Result<()> {
		validate_name(new_name)?;
		let mut layers = self.layers.write();
		if layers.contains_key(new_name) {
			return Err(CoreError::DuplicatedLayerName(new_name.to_string()));
		}
		let old_name = layers
			.iter()
			.find(|(_, layer)| layer.read().id == id)
			.map(|(name, _)| name.clone())
			.ok_or_else(|| CoreError::LayerNotFound(format!("id {id}")))?;
		let layer = layers.remove(&old_name).expect("key found above");
		layer.write().name = new_name.to_string();
		layers.insert(new_name.to_string(), layer);
		Ok(())
	}

	/// Names of all layers of the given kind, sorted for stable output.
	pub fn list_by_kind(&self, kind: LayerKind) -> Vec<String> {
		let mut names: Vec<String> = self
			.layers
			.read()
			.iter()
			.filter(|(_, layer)| layer.read().kind() == kind)
			.map(|(name, _)| name.clone())
			.collect();
		names.sort();
		names
	}

	pub fn names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.layers.read().keys().cloned().collect();
		names.sort();
		names
	}

	pub fn len(&self) -> usize {
		self.layers.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.layers.read().is_empty()
	}

	/// Deep-copies a payload into an existing layer of the same kind.
	///
	/// Kernel uploads replace the base element and re-derive the rotated
	/// one at the layer's current angle.
	pub fn upload(&self, name: &str, data: LayerData) -> Result<()> {
		let layer = self.get(name)?;
		let mut guard = layer.write();
		let layer = &mut *guard;
		match (&mut layer.data, data) {
			(LayerData::Raster(dst), LayerData::Raster(src)) => *dst = src,
			(LayerData::Vector(dst), LayerData::Vector(src)) => *dst = src,
			(LayerData::Kernel(dst), LayerData::Kernel(src)) => dst.set_base(src.base().clone()),
			(LayerData::Kernel(dst), LayerData::Raster(src)) => dst.set_base(src),
			(current, payload) => {
				return Err(CoreError::LayerTypeMismatch {
					name: layer.name.clone(),
					expected: current.kind().as_str(),
					actual: payload.kind().as_str(),
				});
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{build_structuring_element, KernelShape};
	use pretty_assertions::assert_eq;

	#[test]
	fn create_validates_names() {
		let store = LayerStore::new();
		assert!(matches!(
			store.create("", LayerKind::Raster),
			Err(CoreError::InvalidLayerName(_))
		));
		assert!(matches!(
			store.create("has space", LayerKind::Raster),
			Err(CoreError::InvalidLayerName(_))
		));
		assert!(store.create("M1_RAW_Bathymetry", LayerKind::Raster).is_ok());
		assert!(matches!(
			store.create("M1_RAW_Bathymetry", LayerKind::Vector),
			Err(CoreError::DuplicatedLayerName(_))
		));
	}

	#[test]
	fn ids_are_unique_and_monotonic() {
		let store = LayerStore::new();
		let a = store.create("a", LayerKind::Raster).unwrap();
		let b = store.create("b", LayerKind::Vector).unwrap();
		let c = store.create("c", LayerKind::Kernel).unwrap();
		assert!(a < b && b < c);
	}

	#[test]
	fn rename_by_id() {
		let store = LayerStore::new();
		let id = store.create("old", LayerKind::Raster).unwrap();
		store.create("taken", LayerKind::Raster).unwrap();

		assert!(matches!(
			store.rename(id, "taken"),
			Err(CoreError::DuplicatedLayerName(_))
		));
		store.rename(id, "new").unwrap();
		assert!(!store.contains("old"));
		assert_eq!(store.get("new").unwrap().read().id, id);
		assert_eq!(store.get("new").unwrap().read().name, "new");
	}

	#[test]
	fn list_by_kind_is_sorted() {
		let store = LayerStore::new();
		store.create("b_raster", LayerKind::Raster).unwrap();
		store.create("a_raster", LayerKind::Raster).unwrap();
		store.create("kernel", LayerKind::Kernel).unwrap();
		assert_eq!(store.list_by_kind(LayerKind::Raster), vec!["a_raster", "b_raster"]);
		assert_eq!(store.list_by_kind(LayerKind::Kernel), vec!["kernel"]);
		assert!(store.list_by_kind(LayerKind::Vector).is_empty());
	}

	#[test]
	fn ensure_raster_reuses_existing() {
		let store = LayerStore::new();
		let first = store.ensure_raster("dst").unwrap();
		let second = store.ensure_raster("dst").unwrap();
		assert_eq!(first.read().id, second.read().id);
		assert_eq!(store.len(), 1);
	}

	#[test]
	fn upload_replaces_kernel_base() {
		let store = LayerStore::new();
		store.create("k", LayerKind::Kernel).unwrap();
		store
			.get("k")
			.unwrap()
			.write()
			.as_kernel_mut()
			.unwrap()
			.set_rotation(90.0);

		let base = build_structuring_element(KernelShape::Rect, 2, 6).unwrap();
		store.upload("k", LayerData::Raster(base)).unwrap();

		let layer = store.get("k").unwrap();
		let guard = layer.read();
		let kernel = guard.as_kernel().unwrap();
		assert_eq!(kernel.rotation_deg(), 90.0);
		assert_eq!((kernel.rotated().rows, kernel.rotated().cols), (6, 2));
	}

	#[test]
	fn upload_rejects_kind_mismatch() {
		let store = LayerStore::new();
		store.create("v", LayerKind::Vector).unwrap();
		let err = store
			.upload("v", LayerData::Raster(RasterBuffer::new(1, 1, -9999.0).unwrap()))
			.unwrap_err();
		assert!(matches!(err, CoreError::LayerTypeMismatch { .. }));
	}
}
