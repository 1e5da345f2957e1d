//! Metadata derivation
//!
//! - [`resolver`] - primary/secondary metadata and registry lookup
//! - [`product`] - deterministic product identifiers
//! - [`barcode`] - barcode numbers and primers from file names

pub mod barcode;
pub mod product;
pub mod resolver;

pub use barcode::{barcode_number, primer_for};
pub use product::product_id;
pub use resolver::{MetadataResolver, RegistryMatch};
