use crate::jvm::class_file::{Attribute, AttributeLike, Deserialize, Serialize};
use crate::jvm::Error;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io;

/// Parsed constant pool of one class
///
/// The pool is kept in its original order so that every index in the rest of
/// the class file stays valid, even after members referencing some entries
/// are dropped (dead entries are harmless and the verifier never looks at
/// them). New `Utf8` entries can be appended at the end.
#[derive(Debug)]
pub struct ConstantPool {
    /// Slot 0 is unusable and the slot following an 8-byte constant is
    /// `None`, exactly matching the format's indexing
    slots: Vec<Option<Constant>>,
}

impl ConstantPool {
    /// Largest slot index addressable by a `u16` pool index
    const MAX_SLOTS: usize = u16::MAX as usize;

    /// Make a fresh pool with no usable entries
    pub fn new() -> ConstantPool {
        ConstantPool { slots: vec![None] }
    }

    /// Look up any constant by index
    pub fn get(&self, index: ConstantIndex) -> Result<&Constant, Error> {
        match self.slots.get(index.0 as usize) {
            Some(Some(constant)) => Ok(constant),
            _ => Err(Error::BadConstantIndex(index.0)),
        }
    }

    /// Look up the string behind a `CONSTANT_Utf8_info` entry
    pub fn utf8(&self, index: Utf8ConstantIndex) -> Result<&str, Error> {
        match self.get(index.0)? {
            Constant::Utf8(string) => Ok(string),
            _ => Err(Error::UnexpectedConstant {
                index: index.0 .0,
                expected: "Utf8",
            }),
        }
    }

    /// Look up the binary name behind a `CONSTANT_Class_info` entry
    pub fn class_name(&self, index: ClassConstantIndex) -> Result<&str, Error> {
        match self.get(index.0)? {
            Constant::Class(name) => self.utf8(*name),
            _ => Err(Error::UnexpectedConstant {
                index: index.0 .0,
                expected: "Class",
            }),
        }
    }

    /// Append a constant to the pool, provided there is space for it
    pub fn push(&mut self, constant: Constant) -> Result<ConstantIndex, Error> {
        let offset = self.slots.len();
        if offset + constant.width() > Self::MAX_SLOTS {
            return Err(Error::ConstantPoolOverflow {
                offset: offset as u16,
            });
        }
        let wide = constant.width() == 2;
        self.slots.push(Some(constant));
        if wide {
            self.slots.push(None);
        }
        Ok(ConstantIndex(offset as u16))
    }

    /// Get or insert a utf8 constant
    ///
    /// Pools are small enough that a linear scan beats carrying a side table
    /// for the one or two strings the stripper ever adds.
    pub fn push_utf8(&mut self, value: &str) -> Result<Utf8ConstantIndex, Error> {
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(Constant::Utf8(existing)) = slot {
                if existing == value {
                    return Ok(Utf8ConstantIndex(ConstantIndex(index as u16)));
                }
            }
        }
        let index = self.push(Constant::Utf8(value.to_owned()))?;
        Ok(Utf8ConstantIndex(index))
    }

    /// Get or insert a class constant (and its utf8 name)
    pub fn push_class(&mut self, name: &str) -> Result<ClassConstantIndex, Error> {
        let name_index = self.push_utf8(name)?;
        for (index, slot) in self.slots.iter().enumerate() {
            if let Some(Constant::Class(existing)) = slot {
                if *existing == name_index {
                    return Ok(ClassConstantIndex(ConstantIndex(index as u16)));
                }
            }
        }
        let index = self.push(Constant::Class(name_index))?;
        Ok(ClassConstantIndex(index))
    }

    /// Render a typed attribute into its raw form, interning its name
    pub fn get_attribute<A: AttributeLike>(&mut self, attribute: A) -> Result<Attribute, Error> {
        let name_index = self.push_utf8(A::NAME)?;
        let mut info = vec![];
        attribute.serialize(&mut info)?;
        Ok(Attribute { name_index, info })
    }
}

impl Default for ConstantPool {
    fn default() -> ConstantPool {
        ConstantPool::new()
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        (self.slots.len() as u16).serialize(writer)?;
        for slot in &self.slots[1..] {
            if let Some(constant) = slot {
                constant.serialize(writer)?;
            }
        }
        Ok(())
    }
}

impl Deserialize for ConstantPool {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        let count = u16::deserialize(reader)? as usize;
        let mut slots: Vec<Option<Constant>> = vec![None];
        while slots.len() < count {
            let constant = Constant::deserialize(reader)?;
            let wide = constant.width() == 2;
            slots.push(Some(constant));
            if wide {
                slots.push(None);
            }
        }
        if slots.len() != count {
            return Err(invalid_data(format!(
                "constant pool contains {} slots but declares {}",
                slots.len(),
                count
            )));
        }
        Ok(ConstantPool { slots })
    }
}

/// Constants as in the constant pool
///
/// All tags defined through Java 17 are covered, since arbitrary input
/// classes must round-trip even when the stripper has no interest in the
/// constant itself.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Constant UTF-8 encoded raw string value
    ///
    /// Despite the name, the encoding is not quite UTF-8 (the encoding of the
    /// null character `\u{0000}` and the encoding of supplementary characters
    /// is different).
    Utf8(String),

    /// Constant primitive of type `int`
    Integer(i32),

    /// Constant primitive of type `float`
    Float(f32),

    /// Constant primitive of type `long`
    Long(i64),

    /// Constant primitive of type `double`
    Double(f64),

    /// Class or an interface
    Class(Utf8ConstantIndex),

    /// Constant object of type `java.lang.String`
    String(Utf8ConstantIndex),

    /// Field
    FieldRef(ClassConstantIndex, NameAndTypeConstantIndex),

    /// Method (this combines `Methodref` and `InterfaceMethodref`)
    MethodRef {
        class: ClassConstantIndex,
        name_and_type: NameAndTypeConstantIndex,
        is_interface: bool,
    },

    /// Name and a type (eg. for a field or a method)
    NameAndType {
        name: Utf8ConstantIndex,
        descriptor: Utf8ConstantIndex,
    },

    /// Constant object of type `java.lang.invoke.MethodHandle`
    MethodHandle {
        handle_kind: HandleKind,

        /// Depending on the handle kind, this points to a `FieldRef` or a
        /// `MethodRef`
        member: ConstantIndex,
    },

    /// Method type
    MethodType { descriptor: Utf8ConstantIndex },

    /// Dynamically-computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Dynamically-computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap_method: u16,
        name_and_type: NameAndTypeConstantIndex,
    },

    /// Module (only in `module-info` classes)
    Module(Utf8ConstantIndex),

    /// Package (only in `module-info` classes)
    Package(Utf8ConstantIndex),
}

/// Almost all constants have width 1, except for `Constant::Long` and
/// `Constant::Double`. Quoting the spec:
///
/// > All 8-byte constants take up two entries in the constant_pool table of
/// > the class file. [...] In retrospect, making 8-byte constants take two
/// > constant pool entries was a poor choice.
impl Constant {
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }
}

impl Serialize for Constant {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Constant::Utf8(string) => {
                1u8.serialize(writer)?;
                let buffer: Vec<u8> = encode_modified_utf8(string);
                (buffer.len() as u16).serialize(writer)?;
                writer.write_all(&buffer)?;
            }
            Constant::Integer(integer) => {
                3u8.serialize(writer)?;
                integer.serialize(writer)?;
            }
            Constant::Float(float) => {
                4u8.serialize(writer)?;
                float.serialize(writer)?;
            }
            Constant::Long(long) => {
                5u8.serialize(writer)?;
                long.serialize(writer)?;
            }
            Constant::Double(double) => {
                6u8.serialize(writer)?;
                double.serialize(writer)?;
            }
            Constant::Class(name) => {
                7u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::String(utf8) => {
                8u8.serialize(writer)?;
                utf8.serialize(writer)?;
            }
            Constant::FieldRef(class, name_and_type) => {
                9u8.serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::MethodRef {
                class,
                name_and_type,
                is_interface,
            } => {
                (if !is_interface { 10u8 } else { 11u8 }).serialize(writer)?;
                class.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::NameAndType { name, descriptor } => {
                12u8.serialize(writer)?;
                name.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::MethodHandle {
                handle_kind,
                member,
            } => {
                15u8.serialize(writer)?;
                handle_kind.serialize(writer)?;
                member.serialize(writer)?;
            }
            Constant::MethodType { descriptor } => {
                16u8.serialize(writer)?;
                descriptor.serialize(writer)?;
            }
            Constant::Dynamic {
                bootstrap_method,
                name_and_type,
            } => {
                17u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::InvokeDynamic {
                bootstrap_method,
                name_and_type,
            } => {
                18u8.serialize(writer)?;
                bootstrap_method.serialize(writer)?;
                name_and_type.serialize(writer)?;
            }
            Constant::Module(name) => {
                19u8.serialize(writer)?;
                name.serialize(writer)?;
            }
            Constant::Package(name) => {
                20u8.serialize(writer)?;
                name.serialize(writer)?;
            }
        };
        Ok(())
    }
}

impl Deserialize for Constant {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        let constant = match u8::deserialize(reader)? {
            1 => {
                let length = u16::deserialize(reader)? as usize;
                let mut buffer = vec![0u8; length];
                reader.read_exact(&mut buffer)?;
                Constant::Utf8(decode_modified_utf8(&buffer).map_err(invalid_data)?)
            }
            3 => Constant::Integer(i32::deserialize(reader)?),
            4 => Constant::Float(f32::deserialize(reader)?),
            5 => Constant::Long(i64::deserialize(reader)?),
            6 => Constant::Double(f64::deserialize(reader)?),
            7 => Constant::Class(Utf8ConstantIndex::deserialize(reader)?),
            8 => Constant::String(Utf8ConstantIndex::deserialize(reader)?),
            9 => Constant::FieldRef(
                ClassConstantIndex::deserialize(reader)?,
                NameAndTypeConstantIndex::deserialize(reader)?,
            ),
            tag @ (10 | 11) => Constant::MethodRef {
                class: ClassConstantIndex::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
                is_interface: tag == 11,
            },
            12 => Constant::NameAndType {
                name: Utf8ConstantIndex::deserialize(reader)?,
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            15 => Constant::MethodHandle {
                handle_kind: HandleKind::deserialize(reader)?,
                member: ConstantIndex::deserialize(reader)?,
            },
            16 => Constant::MethodType {
                descriptor: Utf8ConstantIndex::deserialize(reader)?,
            },
            17 => Constant::Dynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            18 => Constant::InvokeDynamic {
                bootstrap_method: u16::deserialize(reader)?,
                name_and_type: NameAndTypeConstantIndex::deserialize(reader)?,
            },
            19 => Constant::Module(Utf8ConstantIndex::deserialize(reader)?),
            20 => Constant::Package(Utf8ConstantIndex::deserialize(reader)?),
            tag => {
                return Err(invalid_data(format!("unknown constant pool tag {}", tag)));
            }
        };
        Ok(constant)
    }
}

/// Type of method handle
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-5.html#jvms-5.4.3.5
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl Serialize for HandleKind {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        let byte: u8 = match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        };
        byte.serialize(writer)
    }
}

impl Deserialize for HandleKind {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        let kind = match u8::deserialize(reader)? {
            1 => HandleKind::GetField,
            2 => HandleKind::GetStatic,
            3 => HandleKind::PutField,
            4 => HandleKind::PutStatic,
            5 => HandleKind::InvokeVirtual,
            6 => HandleKind::InvokeStatic,
            7 => HandleKind::InvokeSpecial,
            8 => HandleKind::NewInvokeSpecial,
            9 => HandleKind::InvokeInterface,
            byte => {
                return Err(invalid_data(format!("unknown method handle kind {}", byte)));
            }
        };
        Ok(kind)
    }
}

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ConstantIndex(pub u16);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct Utf8ConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct ClassConstantIndex(pub ConstantIndex);

#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
pub struct NameAndTypeConstantIndex(pub ConstantIndex);

impl ClassConstantIndex {
    /// Only valid as the superclass of `java/lang/Object` and in handler
    /// `catch_type` slots
    pub const ZERO: ClassConstantIndex = ClassConstantIndex(ConstantIndex(0));
}

impl From<Utf8ConstantIndex> for ConstantIndex {
    fn from(index: Utf8ConstantIndex) -> ConstantIndex {
        index.0
    }
}
impl From<ClassConstantIndex> for ConstantIndex {
    fn from(index: ClassConstantIndex) -> ConstantIndex {
        index.0
    }
}
impl From<NameAndTypeConstantIndex> for ConstantIndex {
    fn from(index: NameAndTypeConstantIndex) -> ConstantIndex {
        index.0
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for Utf8ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for ClassConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        self.0.serialize(writer)
    }
}
impl Serialize for NameAndTypeConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        Ok(ConstantIndex(u16::deserialize(reader)?))
    }
}
impl Deserialize for Utf8ConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        Ok(Utf8ConstantIndex(ConstantIndex::deserialize(reader)?))
    }
}
impl Deserialize for ClassConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        Ok(ClassConstantIndex(ConstantIndex::deserialize(reader)?))
    }
}
impl Deserialize for NameAndTypeConstantIndex {
    fn deserialize<R: ReadBytesExt>(reader: &mut R) -> io::Result<Self> {
        Ok(NameAndTypeConstantIndex(ConstantIndex::deserialize(
            reader,
        )?))
    }
}

fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u{0000}` is encoded in 2-byte format rather than 1-byte, so that the encoded
/// >    strings never have embedded nulls.
/// >  * Only the 1-byte, 2-byte, and 3-byte formats are used.
/// >  * Supplementary characters are represented in the form of surrogate pairs.
///
/// [0]: https://docs.oracle.com/en/java/javase/17/docs/api/java.base/java/io/DataInput.html#modified-utf-8
pub fn encode_modified_utf8(string: &str) -> Vec<u8> {
    let mut buffer: Vec<u8> = vec![];
    for c in string.chars() {
        // Handle the exception for how `\u{0000}` is represented
        let len: usize = if c == '\u{0000}' { 2 } else { c.len_utf8() };
        let code: u32 = c as u32;

        match len {
            1 => buffer.push(code as u8),
            2 => {
                buffer.push((code >> 6 & 0x1F) as u8 | 0b1100_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
            3 => {
                buffer.push((code >> 12 & 0x0F) as u8 | 0b1110_0000);
                buffer.push((code >> 6 & 0x3F) as u8 | 0b1000_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }

            // Supplementary characters: main divergence from unicode
            _ => {
                let high = 0xD800 + ((code - 0x10000) >> 10);
                let low = 0xDC00 + ((code - 0x10000) & 0x3FF);
                for surrogate in [high, low] {
                    buffer.push((surrogate >> 12 & 0x0F) as u8 | 0b1110_0000);
                    buffer.push((surrogate >> 6 & 0x3F) as u8 | 0b1000_0000);
                    buffer.push((surrogate & 0x3F) as u8 | 0b1000_0000);
                }
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`]
///
/// Surrogate halves that don't pair up are rejected; the JVM is more lenient
/// here, but a name or descriptor containing a lone surrogate is garbage the
/// stripper has no business preserving.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String, String> {
    fn continuation(bytes: &[u8], at: usize) -> Result<u32, String> {
        match bytes.get(at) {
            Some(b) if b & 0b1100_0000 == 0b1000_0000 => Ok(u32::from(b & 0x3F)),
            _ => Err(format!("invalid continuation byte at offset {}", at)),
        }
    }

    let mut string = String::new();
    let mut i = 0;
    while i < bytes.len() {
        let byte = bytes[i];
        let code: u32 = if byte & 0b1000_0000 == 0 {
            i += 1;
            u32::from(byte)
        } else if byte & 0b1110_0000 == 0b1100_0000 {
            let code = u32::from(byte & 0x1F) << 6 | continuation(bytes, i + 1)?;
            i += 2;
            code
        } else if byte & 0b1111_0000 == 0b1110_0000 {
            let code = u32::from(byte & 0x0F) << 12
                | continuation(bytes, i + 1)? << 6
                | continuation(bytes, i + 2)?;
            i += 3;

            // A high surrogate must begin a six byte surrogate pair
            if (0xD800..0xDC00).contains(&code) {
                let next = bytes.get(i).copied().unwrap_or(0);
                if next & 0b1111_0000 != 0b1110_0000 {
                    return Err(format!("unpaired high surrogate at offset {}", i - 3));
                }
                let low = u32::from(next & 0x0F) << 12
                    | continuation(bytes, i + 1)? << 6
                    | continuation(bytes, i + 2)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(format!("unpaired high surrogate at offset {}", i - 3));
                }
                i += 3;
                0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
            } else if (0xDC00..0xE000).contains(&code) {
                return Err(format!("unpaired low surrogate at offset {}", i - 3));
            } else {
                code
            }
        } else {
            return Err(format!("invalid leading byte {:#04x} at offset {}", byte, i));
        };

        match char::from_u32(code) {
            Some(c) => string.push(c),
            None => return Err(format!("invalid code point {:#x}", code)),
        }
    }
    Ok(string)
}


#[cfg(test)]
mod pool_tests {
    use super::*;

    #[test]
    fn push_utf8_interns() {
        let mut pool = ConstantPool::new();
        let first = pool.push_utf8("Code").unwrap();
        let second = pool.push_utf8("Code").unwrap();
        assert_eq!(first, second);
        assert_eq!(pool.utf8(first).unwrap(), "Code");
    }

    #[test]
    fn wide_constants_take_two_slots() {
        let mut pool = ConstantPool::new();
        let long = pool.push(Constant::Long(42)).unwrap();
        let after = pool.push_utf8("next").unwrap();
        assert_eq!(long, ConstantIndex(1));
        assert_eq!(ConstantIndex::from(after), ConstantIndex(3));

        // The phantom slot is not addressable
        assert!(pool.get(ConstantIndex(2)).is_err());
    }

    #[test]
    fn round_trip() {
        let mut pool = ConstantPool::new();
        pool.push(Constant::Long(-1)).unwrap();
        pool.push(Constant::Integer(7)).unwrap();
        let object = pool.push_class("java/lang/Object").unwrap();
        pool.push(Constant::Double(1.5)).unwrap();

        let mut bytes = vec![];
        pool.serialize(&mut bytes).unwrap();
        let reparsed = ConstantPool::deserialize(&mut std::io::Cursor::new(bytes)).unwrap();
        assert_eq!(reparsed.class_name(object).unwrap(), "java/lang/Object");
        assert_eq!(reparsed.slots, pool.slots);
    }
}
