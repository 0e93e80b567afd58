//! The host-facing error taxonomy. Two layers below this one (`raw::Error`,
//! `read::Error`) already exist for container- and metadata-graph-level
//! failures; this is the public enum a caller of [`crate::Generator`] matches on.

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
	/// The caller explicitly requested a forbidden API — currently only
	/// `GetLastError`. Non-recoverable for that request; other requests on the
	/// same generator remain valid.
	#[error("'{0}' is not a supported generation target")]
	NotSupported(String),

	/// The reader rejected the input file. Fatal: the generator that produced
	/// this is poisoned and every further call short-circuits to this error
	/// without re-reading the file.
	#[error("metadata is corrupt or malformed: {0}")]
	MetadataCorrupt(#[from] crate::read::Error),

	/// Cooperative cancellation was observed. Partially accumulated fragments
	/// remain reachable via `Generator::take_units`, but the caller must treat
	/// the session as incomplete.
	#[error("generation was cancelled")]
	Cancelled,
	//
	// `DownstreamDiagnostic` is not a variant this crate raises — by
	// definition it is raised by the host's own compiler once it re-parses the
	// generated units, not by this generator. No variant is added for it.
}
