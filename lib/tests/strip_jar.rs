//! End-to-end runs over real (if tiny) jars
//!
//! Input classes are assembled with the crate's own class file writer,
//! packed into a jar on disk, stripped, and the output jar is parsed back.

use jarstrip::jvm::class_file::{
    AttributeLike, BytecodeArray, ClassFile, Code, ConstantPool, Field, Method, Version,
};
use jarstrip::jvm::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use jarstrip::strip::{self, Settings};
use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use tempfile::TempDir;

struct MethodSpec {
    name: &'static str,
    descriptor: &'static str,
    access_flags: MethodAccessFlags,
}

/// Assemble a class with the given members
///
/// Every non-abstract method gets a plausible-looking body (`bipush 42;
/// ireturn` style filler) so that there is something real to strip.
fn class_bytes(
    name: &str,
    super_name: &str,
    fields: &[(&'static str, &'static str, FieldAccessFlags)],
    methods: &[MethodSpec],
) -> Vec<u8> {
    let mut constants = ConstantPool::new();
    let this_class = constants.push_class(name).unwrap();
    let super_class = constants.push_class(super_name).unwrap();

    let fields = fields
        .iter()
        .map(|(field_name, descriptor, access_flags)| Field {
            access_flags: *access_flags,
            name_index: constants.push_utf8(field_name).unwrap(),
            descriptor_index: constants.push_utf8(descriptor).unwrap(),
            attributes: vec![],
        })
        .collect();

    let methods = methods
        .iter()
        .map(|spec| {
            let attributes = if spec.access_flags.contains(MethodAccessFlags::ABSTRACT) {
                vec![]
            } else {
                let body = Code {
                    max_stack: 2,
                    max_locals: 4,
                    bytecode: BytecodeArray(vec![0x10, 0x2a, 0xac]),
                    exception_table: vec![],
                    attributes: vec![],
                };
                vec![constants.get_attribute(body).unwrap()]
            };
            Method {
                access_flags: spec.access_flags,
                name_index: constants.push_utf8(spec.name).unwrap(),
                descriptor_index: constants.push_utf8(spec.descriptor).unwrap(),
                attributes,
            }
        })
        .collect();

    let class = ClassFile {
        version: Version::JAVA8,
        constants,
        access_flags: ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER,
        this_class,
        super_class,
        interfaces: vec![],
        fields,
        methods,
        attributes: vec![],
    };
    class.encode().unwrap()
}

/// The running example: a public method worth keeping, a private field, and
/// a package-private helper
fn sample_class_bytes() -> Vec<u8> {
    class_bytes(
        "Sample",
        "java/lang/Object",
        &[("x", "I", FieldAccessFlags::PRIVATE)],
        &[
            MethodSpec {
                name: "compute",
                descriptor: "(I)I",
                access_flags: MethodAccessFlags::PUBLIC,
            },
            MethodSpec {
                name: "helper",
                descriptor: "()V",
                access_flags: MethodAccessFlags::empty(),
            },
        ],
    )
}

fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (entry_name, bytes) in entries {
        writer.start_file(*entry_name, options).unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap();
}

fn read_class(jar: &Path, entry_name: &str) -> ClassFile {
    let mut archive = zip::ZipArchive::new(File::open(jar).unwrap()).unwrap();
    let mut entry = archive.by_name(entry_name).unwrap();
    let mut bytes = vec![];
    entry.read_to_end(&mut bytes).unwrap();
    ClassFile::parse(&mut Cursor::new(&bytes[..])).unwrap()
}

fn entry_names(jar: &Path) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(jar).unwrap()).unwrap();
    (0..archive.len())
        .map(|index| archive.by_index_raw(index).unwrap().name().to_owned())
        .collect()
}

fn method_names(class: &ClassFile) -> Vec<String> {
    class
        .methods
        .iter()
        .map(|method| class.constants.utf8(method.name_index).unwrap().to_owned())
        .collect()
}

fn field_names(class: &ClassFile) -> Vec<String> {
    class
        .fields
        .iter()
        .map(|field| class.constants.utf8(field.name_index).unwrap().to_owned())
        .collect()
}

fn code_bytes(class: &ClassFile, method_name: &str) -> Vec<u8> {
    let method = class
        .methods
        .iter()
        .find(|method| class.constants.utf8(method.name_index).unwrap() == method_name)
        .unwrap();
    method
        .attributes
        .iter()
        .find(|attribute| class.constants.utf8(attribute.name_index).unwrap() == Code::NAME)
        .unwrap()
        .info
        .clone()
}

#[test]
fn public_method_survives_with_stubbed_body() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    write_jar(&input, &[("Sample.class", &sample_class_bytes())]);

    let summary = strip::strip_jar(&input, &output, &Settings::new()).unwrap();
    assert_eq!(summary.included, 1);
    assert_eq!(summary.skipped, 0);

    let class = read_class(&output, "Sample.class");
    assert_eq!(method_names(&class), vec!["compute", "helper"]);
    assert_eq!(field_names(&class), vec!["x"]);

    // compute: max_stack 1, max_locals 2 (this + int), iconst_0; ireturn
    assert_eq!(
        code_bytes(&class, "compute"),
        vec![0, 1, 0, 2, 0, 0, 0, 2, 0x03, 0xac, 0, 0, 0, 0]
    );
    // helper: void return, still sized for its `this` slot
    assert_eq!(
        code_bytes(&class, "helper"),
        vec![0, 0, 0, 1, 0, 0, 0, 1, 0xb1, 0, 0, 0, 0]
    );
}

#[test]
fn remove_non_public_drops_private_members() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    write_jar(&input, &[("Sample.class", &sample_class_bytes())]);

    let settings = Settings {
        remove_non_public: true,
        ..Settings::new()
    };
    strip::strip_jar(&input, &output, &settings).unwrap();

    let class = read_class(&output, "Sample.class");
    assert_eq!(method_names(&class), vec!["compute"]);
    assert!(field_names(&class).is_empty());
}

#[test]
fn resources_are_never_copied() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    write_jar(
        &input,
        &[
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".as_slice()),
            ("Sample.class", &sample_class_bytes()),
            ("data.txt", b"not a class".as_slice()),
        ],
    );

    strip::strip_jar(&input, &output, &Settings::new()).unwrap();
    assert_eq!(entry_names(&output), vec!["Sample.class"]);
}

#[test]
fn empty_result_writes_no_jar() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    write_jar(
        &input,
        &[("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".as_slice())],
    );

    match strip::strip_jar(&input, &output, &Settings::new()) {
        Err(strip::Error::NoClassesIncluded { skipped }) => assert_eq!(skipped, 0),
        other => panic!("expected NoClassesIncluded, got {:?}", other),
    }
    assert!(!output.exists());
}

#[test]
fn unresolvable_supertype_skips_only_that_class() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    let good = class_bytes("Good", "java/lang/Object", &[], &[]);
    let orphan = class_bytes("Orphan", "com/example/Missing", &[], &[]);
    write_jar(
        &input,
        &[("Good.class", &good), ("Orphan.class", &orphan)],
    );

    let summary = strip::strip_jar(&input, &output, &Settings::new()).unwrap();
    assert_eq!(summary.included, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(entry_names(&output), vec!["Good.class"]);
}

#[test]
fn classpath_jars_resolve_supertypes() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let extra = dir.path().join("extra.jar");
    let output = dir.path().join("output.jar");

    let orphan = class_bytes("Orphan", "com/example/Missing", &[], &[]);
    write_jar(&input, &[("Orphan.class", &orphan)]);

    let missing = class_bytes("com/example/Missing", "java/lang/Object", &[], &[]);
    write_jar(&extra, &[("com/example/Missing.class", &missing)]);

    let settings = Settings {
        classpath: vec![extra],
        ..Settings::new()
    };
    let summary = strip::strip_jar(&input, &output, &settings).unwrap();
    assert_eq!(summary.included, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(entry_names(&output), vec!["Orphan.class"]);
}

#[test]
fn supertypes_inside_the_input_jar_resolve() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");

    let base = class_bytes("app/Base", "java/lang/Object", &[], &[]);
    let derived = class_bytes("app/Derived", "app/Base", &[], &[]);
    write_jar(
        &input,
        &[("app/Base.class", &base), ("app/Derived.class", &derived)],
    );

    let summary = strip::strip_jar(&input, &output, &Settings::new()).unwrap();
    assert_eq!(summary.included, 2);
    assert_eq!(
        entry_names(&output),
        vec!["app/Base.class", "app/Derived.class"]
    );
}

#[test]
fn corrupt_class_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.jar");
    let output = dir.path().join("output.jar");
    let good = class_bytes("Good", "java/lang/Object", &[], &[]);
    write_jar(
        &input,
        &[
            ("Bad.class", b"\xCA\xFE\xBA\xBEtruncated".as_slice()),
            ("Good.class", &good),
        ],
    );

    let summary = strip::strip_jar(&input, &output, &Settings::new()).unwrap();
    assert_eq!(summary.included, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(entry_names(&output), vec!["Good.class"]);
}

#[test]
fn missing_input_jar_is_fatal() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("does-not-exist.jar");
    let output = dir.path().join("output.jar");
    assert!(strip::strip_jar(&input, &output, &Settings::new()).is_err());
}
