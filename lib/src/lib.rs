//! Strip compiled jars down to their API surface
//!
//! Given a jar of compiled classes, [`strip::strip_jar`] rewrites every class
//! so that method bodies are replaced with minimal verifiable stubs, compiler
//! generated members are removed, and (optionally) everything that is not
//! `public` is removed too. The output jar still loads, verifies, and can be
//! compiled against, but carries none of the original implementation logic.
//!
//! The [`jvm`] module is a self-contained class file codec: it decodes a
//! class into a structured [`jvm::class_file::ClassFile`] and encodes it back
//! without understanding more of the format than the stripper needs.

pub mod jvm;
pub mod strip;
