//! Decode, inspect, and re-encode JVM classes
//!
//! ### Simple example
//!
//! Parsing a class, dropping its private methods, and serializing it back:
//!
//! ```no_run
//! use jarstrip::jvm::class_file::{ClassFile, Serialize};
//! use jarstrip::jvm::MethodAccessFlags;
//!
//! # fn rewrite_class(bytes: &[u8]) -> Result<Vec<u8>, jarstrip::jvm::Error> {
//! let mut class = ClassFile::parse(&mut std::io::Cursor::new(bytes))?;
//! class
//!     .methods
//!     .retain(|method| !method.access_flags.contains(MethodAccessFlags::PRIVATE));
//! let mut out: Vec<u8> = vec![];
//! class.serialize(&mut out)?;
//! # Ok(out)
//! # }
//! ```

mod access_flags;
pub mod class_file;
mod descriptors;
mod errors;
mod names;

pub use access_flags::*;
pub use descriptors::*;
pub use errors::*;
pub use names::*;
