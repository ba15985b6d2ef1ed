use std::path::PathBuf;

/// Options controlling one stripping run
///
/// This is the whole configuration surface: everything else about the
/// rewrite (dropping `<clinit>`, dropping bridge/synthetic members, stubbing
/// bodies) is unconditional.
#[derive(Debug, Default, Clone)]
pub struct Settings {
    /// Also drop fields and methods that are not `public`
    pub remove_non_public: bool,

    /// Extra jars consulted (beyond the input jar itself) when checking that
    /// a class's superclass and interfaces resolve
    pub classpath: Vec<PathBuf>,
}

impl Settings {
    pub fn new() -> Settings {
        Settings::default()
    }
}
