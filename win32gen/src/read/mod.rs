//! The Metadata Index: loads a `.winmd` file's raw tables through
//! [`crate::raw`] and materializes them into the typed entity graph defined in
//! [`crate::schema`]. Everything above this module (projection, handle policy,
//! emission) works purely in terms of [`MetadataIndex`] lookups and never
//! touches a [`crate::raw::ByteStream`] again.

mod attributes;
mod blob;
mod index;
mod signature;

pub use blob::BlobReader;
pub use index::MetadataIndex;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
	#[error("failed to read metadata file {path}: {source}")]
	Io {
		path: std::path::PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed PE/CLI container: {0}")]
	Container(#[from] crate::raw::Error),

	#[error("malformed signature or custom attribute blob: {0}")]
	InvalidBlob(&'static str),

	#[error("metadata references a row that does not exist: {0}")]
	DanglingReference(&'static str),
}
