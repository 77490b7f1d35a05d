pub mod common;
pub mod python;

pub use common::{RawImport, PACKAGE_MARKER, SOURCE_EXTENSION};
pub use python::extract_imports;
