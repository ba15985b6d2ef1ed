use crate::jvm;
use thiserror::Error;

/// Errors raised while stripping a jar
///
/// Variants wrapping a single class's failure ([`Error::ClassFile`],
/// [`Error::MissingCode`], [`Error::Unresolved`]) are caught at the archive
/// loop and reported per entry; the rest abort the run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ClassFile(#[from] jvm::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),

    /// A method that should have a body (not `abstract`, not `native`) has no
    /// `Code` attribute to replace
    #[error("method {class}.{method} is concrete but has no Code attribute")]
    MissingCode { class: String, method: String },

    /// The class refers to a supertype that no classpath source provides
    #[error("cannot resolve supertype {missing} of {class}")]
    Unresolved { class: String, missing: String },

    /// Every entry of the input jar was skipped or failed, so there is
    /// nothing to write
    #[error("no classes were included in the output ({skipped} class entries skipped)")]
    NoClassesIncluded { skipped: usize },
}
