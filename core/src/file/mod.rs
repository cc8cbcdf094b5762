//! Filesystem helpers. Missing paths surface as `NotFound` tagged errors;
//! other I/O failures are returned as raw [`std::io::Error`]s.

pub mod archive;
pub mod dir;
pub mod hash;
pub mod lines;
pub mod ops;
pub mod path;
pub mod search;
