use thiserror::Error;

/// Errors raised while decoding or re-encoding a class file
///
/// Everything here is scoped to a single class: the jar-level driver catches
/// these per entry and keeps going.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The first four bytes were not `0xCAFEBABE`
    #[error("not a class file (magic bytes {0:#010x})")]
    BadMagic(u32),

    /// An index pointed outside the constant pool or at the unusable slot
    /// following an 8-byte constant
    #[error("constant pool index {0} is not a usable constant")]
    BadConstantIndex(u16),

    /// An index resolved to a constant of the wrong kind
    #[error("constant pool index {index} is not a {expected} constant")]
    UnexpectedConstant { index: u16, expected: &'static str },

    /// No room left in the constant pool for a new constant
    #[error("constant pool overflow at offset {offset}")]
    ConstantPoolOverflow { offset: u16 },

    /// A field or method descriptor that does not parse
    #[error("malformed descriptor '{descriptor}': {message}")]
    BadDescriptor { descriptor: String, message: String },
}
