//! # yamlschema
//!
//! Compiles a JSON-Schema shaped document (YAML or JSON) into a standalone
//! C++ validator class. The generated class checks parsed configuration
//! documents against the schema and reports line-accurate diagnostics for
//! every violation.
//!
//! ```
//! use yamlschema::{load_str, CodeGenerator};
//!
//! let schema = load_str("type: object\nrequired: [name]\n").unwrap();
//! let rv = CodeGenerator::new(&schema, "Schema", "Schema.h").run();
//! assert!(rv.is_ok());
//! let artifact = rv.value().as_ref().unwrap();
//! assert!(artifact.source.contains("is_object_type(node)"));
//! ```

mod catalog;
mod emit;
mod errata;
mod loader;
mod node;

pub mod compiler;

pub use catalog::{Property, PropertySet, SchemaType, TypeSet};
pub use compiler::{refs, Artifact, CodeGenerator};
pub use errata::{Annotation, Errata, Rv, Severity};
pub use loader::{load_str, LoadError};
pub use node::{NodeKind, Pos, SchemaNode};
