// Security module for path confinement
//
// Resource files are only ever served from inside the configured content
// root. Every backing path is canonicalized and checked against the
// canonical root, both when the index is built and again on each read.

pub mod path_validator;

pub use path_validator::{PathSecurityError, validate_path};
