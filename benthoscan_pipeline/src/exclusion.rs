use std::sync::Arc;

/// Pluggable curve estimating the exclusion-disk radius (metres) needed
/// around a low protrusion of height `h` metres. Implementations must be
/// monotonically increasing in `h`.
pub type ExclusionSizeFn = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Default exclusion-size fit.
///
/// A clamped affine curve; see `CALIBRATION.md` for the rationale and for
/// how to supply a vehicle-specific calibration instead.
pub fn default_exclusion_size() -> ExclusionSizeFn {
	Arc::new(|h: f64| 0.25 + 0.5 * h.max(0.0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_curve_is_monotonic() {
		let e = default_exclusion_size();
		let mut prev = e(0.0);
		assert!(prev > 0.0);
		for i in 1..100 {
			let h = f64::from(i) * 0.05;
			let r = e(h);
			assert!(r >= prev);
			prev = r;
		}
	}
}
