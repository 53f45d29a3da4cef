//! Meshline Desc - MeSH descriptor XML to typed records
//!
//! Streams NCBI MeSH descriptor files (`desc2025.xml`, plain or gzip)
//! and produces one [`DescriptorRecord`] per `<DescriptorRecord>`.
//!
//! # Features
//!
//! - Streaming XML parsing with quick-xml, one record in memory at a time
//! - Ancestor tree numbers derived from dotted tree-number notation
//! - Optional conversion of the stream to a Parquet table
//!
//! # Example
//!
//! ```ignore
//! use meshline_desc::parse_mesh;
//!
//! for rec in parse_mesh("data/desc2025.xml")? {
//!     let rec = rec?;
//!     println!("{} {} ({} trees)", rec.ui, rec.name, rec.tree_numbers.len());
//! }
//! ```

pub mod config;
pub mod date;
pub mod error;
pub mod parser;
pub mod record;
pub mod runner;
pub mod schema;
pub mod stream;
pub mod transform;
pub mod tree;

// Re-exports
pub use config::Config;
pub use error::ParseError;
pub use record::{
    AllowableQualifier, AncestorTreeNumber, Concept, DescriptorRecord, PharmacologicalAction,
    SemanticType, Term,
};
pub use runner::{Summary, run};
pub use stream::{DescriptorStream, FileStream, parse_mesh, parse_mesh_str};
pub use tree::ancestor_tree_numbers;
