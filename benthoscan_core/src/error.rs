//! Error types shared by every crate in the workspace.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

/// Error taxonomy of the pipeline engine.
///
/// Configuration and argument errors are fatal before any compute; layer
/// errors surface misuse of the store; `NumericDegenerate` covers
/// operations that have no solution for the given inputs (e.g. a plane
/// with a null z coefficient). NoData cells are never an error.
#[derive(Clone, Debug, Error)]
pub enum CoreError {
	#[error("missing argument: {0}")]
	MissingArgument(String),

	#[error("wrong argument: {0}")]
	WrongArgument(String),

	#[error("raster i/o failure on '{path}': {reason}")]
	RasterIo { path: String, reason: String },

	#[error("invalid layer name '{0}': names are non-empty ASCII alphanumerics plus '_'")]
	InvalidLayerName(String),

	#[error("layer name '{0}' is already taken")]
	DuplicatedLayerName(String),

	#[error("layer '{0}' not found")]
	LayerNotFound(String),

	#[error("layer '{name}' is of kind {actual}, expected {expected}")]
	LayerTypeMismatch {
		name: String,
		expected: &'static str,
		actual: &'static str,
	},

	#[error("no contours found in layer '{0}'")]
	ContoursNotFound(String),

	#[error("numerically degenerate operation: {0}")]
	NumericDegenerate(String),
}

impl CoreError {
	/// Process exit code associated with this error kind.
	pub fn exit_code(&self) -> i32 {
		match self {
			CoreError::MissingArgument(_) => 1,
			CoreError::RasterIo { .. } => 3,
			_ => 2,
		}
	}
}
