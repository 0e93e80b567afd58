mod heaps;
mod header;
mod indices;
pub(crate) mod tables;

pub use heaps::*;
pub use header::*;
pub use tables::*;
pub use indices::*;

pub(crate) use heaps::private::MetadataHeap;
pub(crate) use tables::private::MetadataTableImpl;
