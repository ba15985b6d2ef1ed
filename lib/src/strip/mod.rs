//! Rewrite compiled classes into API-only stand-ins
//!
//! The pieces compose one way: [`strip_jar`] walks the input archive entry by
//! entry, [`strip_class`] rewrites a single [`ClassFile`] in place (filtering
//! members through the policy in [`member`] and stubbing bodies via
//! [`stub_method`]), and the surviving classes are written out as one jar.
//! Each class is processed independently; a class that fails is reported and
//! skipped without affecting the rest of the run.
//!
//! [`ClassFile`]: crate::jvm::class_file::ClassFile

mod class;
mod classpath;
mod errors;
mod jar;
pub mod member;
mod method;
mod settings;

pub use class::*;
pub use classpath::*;
pub use errors::*;
pub use jar::*;
pub use method::*;
pub use settings::*;
