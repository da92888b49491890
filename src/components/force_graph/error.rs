//! Error types for loading the graph document.

/// Why the graph could not be loaded. Shown to the user in place of the graph.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LoadError {
	/// The request itself failed (network, CORS, no window).
	#[error("request failed: {0}")]
	Fetch(String),

	/// The server answered with a non-success status.
	#[error("HTTP error: {0}")]
	Http(u16),

	/// The body was not valid JSON for a graph document.
	#[error("invalid JSON: {0}")]
	Parse(String),

	/// The document is missing one of its top-level arrays.
	#[error("graph document is missing `{0}`")]
	MissingField(&'static str),
}

impl From<serde_json::Error> for LoadError {
	fn from(e: serde_json::Error) -> Self {
		LoadError::Parse(e.to_string())
	}
}
