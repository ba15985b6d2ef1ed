use crate::jvm::class_file::ClassFile;
use crate::strip::{strip_class, ClassPath, Error, Settings};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Encoded classes accumulated during a run, in processing order
///
/// Built up one entry at a time by [`strip_jar`] and consumed exactly once
/// when the output jar is written.
#[derive(Debug, Default)]
pub struct OutputBundle {
    classes: Vec<(String, Vec<u8>)>,
}

impl OutputBundle {
    pub fn new() -> OutputBundle {
        OutputBundle::default()
    }

    /// Add one encoded class, keyed by its binary name
    pub fn include(&mut self, binary_name: String, class_bytes: Vec<u8>) {
        self.classes.push((binary_name, class_bytes));
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }
}

/// What one run did, for the completion report
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Classes written to the output jar
    pub included: usize,

    /// Class entries that were skipped or failed
    pub skipped: usize,
}

/// Strip every class of `input` into an API-only jar at `output`
///
/// Entries are processed in the archive's own order. Non-class entries
/// (resources, manifest) are never copied. A class that fails to parse,
/// resolve, or transform is reported on the log's error channel and skipped;
/// one bad class never aborts the run. Only three things do: an unreadable
/// input jar, an unwritable output, and an empty result. If every entry was
/// skipped there is nothing worth writing and [`Error::NoClassesIncluded`]
/// is returned instead of an empty artifact.
pub fn strip_jar(input: &Path, output: &Path, settings: &Settings) -> Result<Summary, Error> {
    let file = File::open(input)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut sources: Vec<PathBuf> = vec![input.to_path_buf()];
    sources.extend(settings.classpath.iter().cloned());
    let class_path = ClassPath::open(&sources)?;

    let mut bundle = OutputBundle::new();
    let mut skipped = 0usize;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !entry.name().ends_with(".class") {
            continue;
        }
        let entry_name = entry.name().to_owned();

        let mut class_bytes = Vec::with_capacity(entry.size() as usize);
        let stripped = entry
            .read_to_end(&mut class_bytes)
            .map_err(Error::from)
            .and_then(|_| strip_entry(&class_bytes, &class_path, settings));
        match stripped {
            Ok((binary_name, encoded)) => {
                log::info!("Including {}", entry_name);
                bundle.include(binary_name, encoded);
            }
            Err(err) => {
                log::error!("Unable to include {}: {}", entry_name, err);
                skipped += 1;
            }
        }
    }

    if bundle.is_empty() {
        return Err(Error::NoClassesIncluded { skipped });
    }

    let included = bundle.len();
    write_jar(output, bundle)?;
    Ok(Summary { included, skipped })
}

/// Parse, resolve, and strip one class entry
fn strip_entry(
    class_bytes: &[u8],
    class_path: &ClassPath,
    settings: &Settings,
) -> Result<(String, Vec<u8>), Error> {
    let mut class = ClassFile::parse(&mut std::io::Cursor::new(class_bytes))?;

    if let Some(missing) = class_path.first_unresolved(&class)? {
        return Err(Error::Unresolved {
            class: class.this_class_name()?.to_owned(),
            missing,
        });
    }

    strip_class(&mut class, settings)?;

    let binary_name = class.this_class_name()?.to_owned();
    let encoded = class.encode()?;
    Ok((binary_name, encoded))
}

/// Write the accumulated classes out as a single jar
fn write_jar(output: &Path, bundle: OutputBundle) -> Result<(), Error> {
    let file = File::create(output)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (binary_name, class_bytes) in bundle.classes {
        writer.start_file(format!("{}.class", binary_name), options)?;
        writer.write_all(&class_bytes)?;
    }

    let mut inner = writer.finish()?;
    inner.flush()?;
    Ok(())
}
