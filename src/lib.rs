//! Byte-exact parser and encoder for JVM class files
//!
//! Parsing a class file and encoding it again without changes gives back the original bytes.
//! See [`jvm`] for an overview.

pub mod jvm;
pub mod util;
