pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Lookup error: {message}")]
	Lookup { message: String },
	#[error("Session {session_id} is disposed.")]
	Disposed { session_id: String },
	#[error("Search cancelled.")]
	Cancelled,
}
impl From<scout_providers::Error> for Error {
	fn from(err: scout_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Provider { message: format!("Invalid provider payload: {err}") }
	}
}
