//! Read, edit, and write JVM class files
//!
//! ### Example
//!
//! Rename the source file recorded in a class and write it back out:
//!
//! ```no_run
//! use jclassfile::jvm::class_file::{ClassFile, SourceFile};
//! use jclassfile::jvm::Error;
//!
//! # fn rename_source() -> Result<(), Error> {
//! let mut class = ClassFile::load_from_path("Point.class")?;
//! if let Some(source_file) = class.get_attribute::<SourceFile>()? {
//!     source_file.set_source_file(&mut class.constant_pool, "Point.kt")?;
//! }
//! class.save_to_path("out/Point.class", true)?;
//! # Ok(())
//! # }
//! ```
//!
//! Constant pool indices are plain integers. Editing the pool through
//! [`class_file::ClassFile::insert_constant`], [`class_file::ClassFile::remove_constant`], or
//! [`class_file::ClassFile::replace_constant`] keeps them consistent; the lower level operations
//! on [`class_file::ConstantPool`] leave that to the caller.

mod access_flags;
mod binary_format;
pub mod class_file;
mod errors;
mod version;

pub use access_flags::*;
pub use binary_format::*;
pub use errors::*;
pub use version::*;
