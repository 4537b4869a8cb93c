//! Fixed layer names of the processing graph.
//!
//! Rotation-independent layers use these names verbatim; rotation-dependent
//! layers append the `_rNNN` heading suffix produced by
//! [`crate::heading_suffix`].

pub const RAW_BATHYMETRY: &str = "M1_RAW_Bathymetry";
pub const VALID_DATA_MASK: &str = "M1_VALID_DataMask";
pub const CONTOUR_MASK: &str = "M1_CONTOUR_Mask";
pub const PROTRUSIONS: &str = "M2_Protrusions";
pub const LANDABILITY_MAP: &str = "M3_LandabilityMap";
pub const LANDABILITY_BLEND: &str = "M3_LandabilityMap_BLEND";
pub const FINAL_MEASURABILITY: &str = "M4_FinalMeasurability";

pub const KERNEL_AUV: &str = "KernelAUV";
pub const KERNEL_SLOPE: &str = "KernelSlope";
pub const KERNEL_DIAG: &str = "KernelDiag";

pub const DETAILED_SLOPE: &str = "A1_DetailedSlope";
pub const HI_SLOPE_EXCL: &str = "A2_HiSlopeExcl";
pub const FILT_BATHYMETRY: &str = "B0_FILT_Bathymetry";
pub const HEIGHT_BATHYMETRY: &str = "B1_HEIGHT_Bathymetry";
pub const EXCLUSION_MAP: &str = "C1_ExclusionMap";
pub const MEAN_SLOPE_MAP: &str = "C2_MeanSlopeMap";
pub const MEAN_SLOPE_EXCL: &str = "C3_MeanSlopeExcl";
pub const LO_PROT_MASK: &str = "D1_LoProtMask";
pub const LO_PROT_ELEV: &str = "D1_LoProtElev";
pub const LO_PROT_EXCL: &str = "D2_LoProtExcl";
pub const HI_PROT_MASK: &str = "D3_HiProtMask";
pub const HI_PROT_EXCL: &str = "D4_HiProtExcl";
pub const MEASURABILITY_MAP: &str = "X1_MeasurabilityMap";
