use crate::jvm::class_file::ClassFile;
use crate::strip::Error;
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Namespaces assumed to live in the platform library
///
/// The JVM tool this replaces consults the system class loader for these;
/// a self-contained stripper cannot, so classes under the standard prefixes
/// are taken on faith instead of failing every class that extends
/// `java/lang/Object`.
const PLATFORM_PACKAGES: [&str; 5] = ["java/", "javax/", "jdk/", "sun/", "com/sun/"];

/// Read-only index of which classes the run can see
///
/// Built once when the run starts (from the input jar plus every
/// `--classpath` jar) and consulted for each class's direct superclass and
/// interfaces. Only entry names are indexed; the referenced classes are
/// never parsed.
pub struct ClassPath {
    known: HashSet<String>,
}

impl ClassPath {
    /// Collect the class entry names of every source jar
    pub fn open(sources: &[PathBuf]) -> Result<ClassPath, Error> {
        let mut known = HashSet::new();
        for source in sources {
            let file = File::open(source)?;
            let mut archive = zip::ZipArchive::new(BufReader::new(file))?;
            for index in 0..archive.len() {
                let entry = archive.by_index_raw(index)?;
                if let Some(class_name) = entry.name().strip_suffix(".class") {
                    known.insert(class_name.to_owned());
                }
            }
        }
        Ok(ClassPath { known })
    }

    /// Can a class with this binary name be resolved?
    pub fn resolves(&self, binary_name: &str) -> bool {
        self.known.contains(binary_name) || Self::is_platform_class(binary_name)
    }

    /// Check a class's direct supertype references, returning the first
    /// binary name that resolves nowhere
    pub fn first_unresolved(&self, class: &ClassFile) -> Result<Option<String>, Error> {
        if let Some(super_name) = class.super_class_name()? {
            if !self.resolves(super_name) {
                return Ok(Some(super_name.to_owned()));
            }
        }
        for interface_name in class.interface_names()? {
            if !self.resolves(interface_name) {
                return Ok(Some(interface_name.to_owned()));
            }
        }
        Ok(None)
    }

    fn is_platform_class(binary_name: &str) -> bool {
        PLATFORM_PACKAGES
            .iter()
            .any(|package| binary_name.starts_with(package))
    }
}

impl std::fmt::Debug for ClassPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ClassPath({} known classes)", self.known.len())
    }
}
