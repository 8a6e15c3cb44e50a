use crate::jvm::{ByteCursor, Deserialize, Error, Serialize};
use crate::util::Width;
use byteorder::WriteBytesExt;
use std::borrow::Cow;
use std::fmt;
use std::io;

/// Index into the constant pool
///
/// Indexing starts at 1. Index 0 is used by a couple of fields (eg. `super_class` of
/// `java/lang/Object`) to mean "no constant" and is never touched by relocation.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Debug, Default)]
pub struct ConstantIndex(pub u16);

impl ConstantIndex {
    pub const NONE: ConstantIndex = ConstantIndex(0);

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    /// Shift the index by `diff` if it points at or past `from`
    ///
    /// The result saturates to `1..=u16::MAX`, so a dangling index never wraps around or turns
    /// into "no constant".
    pub fn relocate(&mut self, diff: i32, from: u16) {
        if self.0 != 0 && self.0 >= from {
            let shifted = (i32::from(self.0) + diff).clamp(1, i32::from(u16::MAX));
            self.0 = u16::try_from(shifted).unwrap_or(u16::MAX);
        }
    }
}

impl From<u16> for ConstantIndex {
    fn from(index: u16) -> Self {
        ConstantIndex(index)
    }
}

impl fmt::Display for ConstantIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serialize for ConstantIndex {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        self.0.serialize(writer)
    }
}

impl Deserialize for ConstantIndex {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(ConstantIndex(cursor.read_u2()?))
    }
}

/// Tag byte identifying the kind of a constant pool entry
///
/// `Empty` never appears on the wire: it marks slot 0 and the slot after a `Long` or `Double`.
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum Tag {
    Empty = 0,
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Fieldref = 9,
    Methodref = 10,
    InterfaceMethodref = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    InvokeDynamic = 18,
}

impl Tag {
    /// Decode a tag read from a class file (so `Empty` is not accepted)
    pub fn from_u8(tag: u8) -> Option<Tag> {
        match tag {
            1 => Some(Tag::Utf8),
            3 => Some(Tag::Integer),
            4 => Some(Tag::Float),
            5 => Some(Tag::Long),
            6 => Some(Tag::Double),
            7 => Some(Tag::Class),
            8 => Some(Tag::String),
            9 => Some(Tag::Fieldref),
            10 => Some(Tag::Methodref),
            11 => Some(Tag::InterfaceMethodref),
            12 => Some(Tag::NameAndType),
            15 => Some(Tag::MethodHandle),
            16 => Some(Tag::MethodType),
            18 => Some(Tag::InvokeDynamic),
            _ => None,
        }
    }
}

/// Method handle kinds
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-5.html#jvms-5.4.3.5
#[derive(Copy, Clone, Hash, Eq, PartialEq, Debug)]
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

impl HandleKind {
    pub fn from_u8(kind: u8) -> Option<HandleKind> {
        match kind {
            1 => Some(HandleKind::GetField),
            2 => Some(HandleKind::GetStatic),
            3 => Some(HandleKind::PutField),
            4 => Some(HandleKind::PutStatic),
            5 => Some(HandleKind::InvokeVirtual),
            6 => Some(HandleKind::InvokeStatic),
            7 => Some(HandleKind::InvokeSpecial),
            8 => Some(HandleKind::NewInvokeSpecial),
            9 => Some(HandleKind::InvokeInterface),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            HandleKind::GetField => 1,
            HandleKind::GetStatic => 2,
            HandleKind::PutField => 3,
            HandleKind::PutStatic => 4,
            HandleKind::InvokeVirtual => 5,
            HandleKind::InvokeStatic => 6,
            HandleKind::InvokeSpecial => 7,
            HandleKind::NewInvokeSpecial => 8,
            HandleKind::InvokeInterface => 9,
        }
    }

    /// Name used by the JVM specification (and `javap`)
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::GetField => "REF_getField",
            HandleKind::GetStatic => "REF_getStatic",
            HandleKind::PutField => "REF_putField",
            HandleKind::PutStatic => "REF_putStatic",
            HandleKind::InvokeVirtual => "REF_invokeVirtual",
            HandleKind::InvokeStatic => "REF_invokeStatic",
            HandleKind::InvokeSpecial => "REF_invokeSpecial",
            HandleKind::NewInvokeSpecial => "REF_newInvokeSpecial",
            HandleKind::InvokeInterface => "REF_invokeInterface",
        }
    }
}

/// Class or an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassInfo {
    pub name_index: ConstantIndex,
}

/// Field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldrefInfo {
    pub class_index: ConstantIndex,
    pub name_and_type_index: ConstantIndex,
}

/// Method of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodrefInfo {
    pub class_index: ConstantIndex,
    pub name_and_type_index: ConstantIndex,
}

/// Method of an interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethodrefInfo {
    pub class_index: ConstantIndex,
    pub name_and_type_index: ConstantIndex,
}

/// Constant object of type `java.lang.String`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringInfo {
    pub string_index: ConstantIndex,
}

/// Constant primitive of type `int`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerInfo {
    pub bytes: u32,
}

impl IntegerInfo {
    pub fn from_value(value: i32) -> IntegerInfo {
        IntegerInfo {
            bytes: value as u32,
        }
    }

    pub fn value(&self) -> i32 {
        self.bytes as i32
    }
}

/// Constant primitive of type `float`
///
/// The raw bits are kept so that NaN payloads survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatInfo {
    pub bytes: u32,
}

impl FloatInfo {
    pub fn from_value(value: f32) -> FloatInfo {
        FloatInfo {
            bytes: value.to_bits(),
        }
    }

    pub fn value(&self) -> f32 {
        f32::from_bits(self.bytes)
    }
}

/// Constant primitive of type `long`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongInfo {
    pub high_bytes: u32,
    pub low_bytes: u32,
}

impl LongInfo {
    pub fn from_value(value: i64) -> LongInfo {
        let bits = value as u64;
        LongInfo {
            high_bytes: (bits >> 32) as u32,
            low_bytes: bits as u32,
        }
    }

    pub fn value(&self) -> i64 {
        ((u64::from(self.high_bytes) << 32) | u64::from(self.low_bytes)) as i64
    }
}

/// Constant primitive of type `double`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleInfo {
    pub high_bytes: u32,
    pub low_bytes: u32,
}

impl DoubleInfo {
    pub fn from_value(value: f64) -> DoubleInfo {
        let bits = value.to_bits();
        DoubleInfo {
            high_bytes: (bits >> 32) as u32,
            low_bytes: bits as u32,
        }
    }

    pub fn value(&self) -> f64 {
        f64::from_bits((u64::from(self.high_bytes) << 32) | u64::from(self.low_bytes))
    }
}

/// Name and a type (eg. for a field or a method)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameAndTypeInfo {
    pub name_index: ConstantIndex,
    pub descriptor_index: ConstantIndex,
}

/// Constant string value
///
/// Despite the name, the encoding is not quite UTF-8 (the encoding of the null character
/// `\u{0000}` and the encoding of supplementary characters is different). The bytes are stored
/// exactly as they appeared in the class file and are not validated on parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utf8Info {
    pub bytes: Vec<u8>,
}

impl Utf8Info {
    pub fn new(string: &str) -> Utf8Info {
        Utf8Info {
            bytes: encode_modified_utf8(string),
        }
    }

    /// Decoded text, with malformed sequences replaced by `U+FFFD`
    pub fn as_str(&self) -> Cow<'_, str> {
        if let Ok(string) = std::str::from_utf8(&self.bytes) {
            return Cow::Borrowed(string);
        }
        match decode_modified_utf8(&self.bytes) {
            Some(string) => Cow::Owned(string),
            None => String::from_utf8_lossy(&self.bytes),
        }
    }

    /// Decoded text, or `None` if the bytes are not well-formed modified UTF-8
    pub fn decode(&self) -> Option<String> {
        decode_modified_utf8(&self.bytes)
    }
}

/// Constant object of type `java.lang.invoke.MethodHandle`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodHandleInfo {
    /// Raw kind byte, see [`HandleKind`]
    pub reference_kind: u8,
    pub reference_index: ConstantIndex,
}

impl MethodHandleInfo {
    pub fn handle_kind(&self) -> Option<HandleKind> {
        HandleKind::from_u8(self.reference_kind)
    }
}

/// Method type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTypeInfo {
    pub descriptor_index: ConstantIndex,
}

/// Dynamically-computed call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeDynamicInfo {
    /// Index into the `BootstrapMethods` attribute (not the constant pool)
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: ConstantIndex,
}

/// Entry in the constant pool
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.4
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantPoolEntry {
    /// Slot 0 of the pool, and the unusable slot following a `Long` or `Double`
    Empty,
    Class(ClassInfo),
    Fieldref(FieldrefInfo),
    Methodref(MethodrefInfo),
    InterfaceMethodref(InterfaceMethodrefInfo),
    String(StringInfo),
    Integer(IntegerInfo),
    Float(FloatInfo),
    Long(LongInfo),
    Double(DoubleInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(Utf8Info),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
}

impl Default for ConstantPoolEntry {
    fn default() -> Self {
        ConstantPoolEntry::Empty
    }
}

impl ConstantPoolEntry {
    pub fn tag(&self) -> Tag {
        match self {
            ConstantPoolEntry::Empty => Tag::Empty,
            ConstantPoolEntry::Class(_) => Tag::Class,
            ConstantPoolEntry::Fieldref(_) => Tag::Fieldref,
            ConstantPoolEntry::Methodref(_) => Tag::Methodref,
            ConstantPoolEntry::InterfaceMethodref(_) => Tag::InterfaceMethodref,
            ConstantPoolEntry::String(_) => Tag::String,
            ConstantPoolEntry::Integer(_) => Tag::Integer,
            ConstantPoolEntry::Float(_) => Tag::Float,
            ConstantPoolEntry::Long(_) => Tag::Long,
            ConstantPoolEntry::Double(_) => Tag::Double,
            ConstantPoolEntry::NameAndType(_) => Tag::NameAndType,
            ConstantPoolEntry::Utf8(_) => Tag::Utf8,
            ConstantPoolEntry::MethodHandle(_) => Tag::MethodHandle,
            ConstantPoolEntry::MethodType(_) => Tag::MethodType,
            ConstantPoolEntry::InvokeDynamic(_) => Tag::InvokeDynamic,
        }
    }

    /// `Long` and `Double` take up two slots of the pool
    pub fn is_wide_entry(&self) -> bool {
        matches!(self, ConstantPoolEntry::Long(_) | ConstantPoolEntry::Double(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConstantPoolEntry::Empty)
    }

    /// Shortcut for `ConstantPoolEntry::Utf8(Utf8Info::new(string))`
    pub fn utf8(string: &str) -> ConstantPoolEntry {
        ConstantPoolEntry::Utf8(Utf8Info::new(string))
    }

    /// Pool indices held by this entry (the bootstrap method index of `InvokeDynamic` is not one)
    pub fn references(&self) -> Vec<ConstantIndex> {
        match self {
            ConstantPoolEntry::Class(info) => vec![info.name_index],
            ConstantPoolEntry::Fieldref(info) => vec![info.class_index, info.name_and_type_index],
            ConstantPoolEntry::Methodref(info) => vec![info.class_index, info.name_and_type_index],
            ConstantPoolEntry::InterfaceMethodref(info) => {
                vec![info.class_index, info.name_and_type_index]
            }
            ConstantPoolEntry::String(info) => vec![info.string_index],
            ConstantPoolEntry::NameAndType(info) => vec![info.name_index, info.descriptor_index],
            ConstantPoolEntry::MethodHandle(info) => vec![info.reference_index],
            ConstantPoolEntry::MethodType(info) => vec![info.descriptor_index],
            ConstantPoolEntry::InvokeDynamic(info) => vec![info.name_and_type_index],
            ConstantPoolEntry::Empty
            | ConstantPoolEntry::Integer(_)
            | ConstantPoolEntry::Float(_)
            | ConstantPoolEntry::Long(_)
            | ConstantPoolEntry::Double(_)
            | ConstantPoolEntry::Utf8(_) => vec![],
        }
    }

    /// Shift every pool index held by this entry which is at or past `from` by `diff`
    pub fn relocate(&mut self, diff: i32, from: u16) {
        match self {
            ConstantPoolEntry::Class(info) => info.name_index.relocate(diff, from),
            ConstantPoolEntry::Fieldref(info) => {
                info.class_index.relocate(diff, from);
                info.name_and_type_index.relocate(diff, from);
            }
            ConstantPoolEntry::Methodref(info) => {
                info.class_index.relocate(diff, from);
                info.name_and_type_index.relocate(diff, from);
            }
            ConstantPoolEntry::InterfaceMethodref(info) => {
                info.class_index.relocate(diff, from);
                info.name_and_type_index.relocate(diff, from);
            }
            ConstantPoolEntry::String(info) => info.string_index.relocate(diff, from),
            ConstantPoolEntry::NameAndType(info) => {
                info.name_index.relocate(diff, from);
                info.descriptor_index.relocate(diff, from);
            }
            ConstantPoolEntry::MethodHandle(info) => info.reference_index.relocate(diff, from),
            ConstantPoolEntry::MethodType(info) => info.descriptor_index.relocate(diff, from),
            ConstantPoolEntry::InvokeDynamic(info) => {
                info.name_and_type_index.relocate(diff, from)
            }
            ConstantPoolEntry::Empty
            | ConstantPoolEntry::Integer(_)
            | ConstantPoolEntry::Float(_)
            | ConstantPoolEntry::Long(_)
            | ConstantPoolEntry::Double(_)
            | ConstantPoolEntry::Utf8(_) => (),
        }
    }
}

/// Almost all constants have width 1, except for `Long` and `Double`. Quoting JVMS §4.4.5:
///
/// > All 8-byte constants take up two entries in the constant_pool table of the class file. If a
/// > CONSTANT_Long_info or CONSTANT_Double_info structure is the item in the constant_pool table
/// > at index n, then the next usable item in the pool is located at index n+2. The constant_pool
/// > index n+1 must be valid but is considered unusable.
/// >
/// > In retrospect, making 8-byte constants take two constant pool entries was a poor choice.
impl Width for ConstantPoolEntry {
    fn width(&self) -> usize {
        if self.is_wide_entry() {
            2
        } else {
            1
        }
    }
}

impl Deserialize for ConstantPoolEntry {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let raw_tag = cursor.read_u1()?;
        let tag = match Tag::from_u8(raw_tag) {
            Some(tag) => tag,
            None => {
                return Err(Error::UnknownTag {
                    tag: raw_tag,
                    offset: cursor.prev_offset(),
                })
            }
        };

        let entry = match tag {
            Tag::Empty => ConstantPoolEntry::Empty,
            Tag::Class => ConstantPoolEntry::Class(ClassInfo {
                name_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::Fieldref => ConstantPoolEntry::Fieldref(FieldrefInfo {
                class_index: ConstantIndex::deserialize(cursor)?,
                name_and_type_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::Methodref => ConstantPoolEntry::Methodref(MethodrefInfo {
                class_index: ConstantIndex::deserialize(cursor)?,
                name_and_type_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::InterfaceMethodref => {
                ConstantPoolEntry::InterfaceMethodref(InterfaceMethodrefInfo {
                    class_index: ConstantIndex::deserialize(cursor)?,
                    name_and_type_index: ConstantIndex::deserialize(cursor)?,
                })
            }
            Tag::String => ConstantPoolEntry::String(StringInfo {
                string_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::Integer => ConstantPoolEntry::Integer(IntegerInfo {
                bytes: cursor.read_u4()?,
            }),
            Tag::Float => ConstantPoolEntry::Float(FloatInfo {
                bytes: cursor.read_u4()?,
            }),
            Tag::Long => ConstantPoolEntry::Long(LongInfo {
                high_bytes: cursor.read_u4()?,
                low_bytes: cursor.read_u4()?,
            }),
            Tag::Double => ConstantPoolEntry::Double(DoubleInfo {
                high_bytes: cursor.read_u4()?,
                low_bytes: cursor.read_u4()?,
            }),
            Tag::NameAndType => ConstantPoolEntry::NameAndType(NameAndTypeInfo {
                name_index: ConstantIndex::deserialize(cursor)?,
                descriptor_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::Utf8 => {
                let length = cursor.read_u2()? as usize;
                ConstantPoolEntry::Utf8(Utf8Info {
                    bytes: cursor.read_bytes(length)?.to_vec(),
                })
            }
            Tag::MethodHandle => ConstantPoolEntry::MethodHandle(MethodHandleInfo {
                reference_kind: cursor.read_u1()?,
                reference_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::MethodType => ConstantPoolEntry::MethodType(MethodTypeInfo {
                descriptor_index: ConstantIndex::deserialize(cursor)?,
            }),
            Tag::InvokeDynamic => ConstantPoolEntry::InvokeDynamic(InvokeDynamicInfo {
                bootstrap_method_attr_index: cursor.read_u2()?,
                name_and_type_index: ConstantIndex::deserialize(cursor)?,
            }),
        };

        Ok(entry)
    }
}

/// `Empty` entries produce no output at all (not even a tag)
impl Serialize for ConstantPoolEntry {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        (self.tag() as u8).serialize(writer)?;

        match self {
            ConstantPoolEntry::Empty => (),
            ConstantPoolEntry::Class(info) => info.name_index.serialize(writer)?,
            ConstantPoolEntry::Fieldref(info) => {
                info.class_index.serialize(writer)?;
                info.name_and_type_index.serialize(writer)?;
            }
            ConstantPoolEntry::Methodref(info) => {
                info.class_index.serialize(writer)?;
                info.name_and_type_index.serialize(writer)?;
            }
            ConstantPoolEntry::InterfaceMethodref(info) => {
                info.class_index.serialize(writer)?;
                info.name_and_type_index.serialize(writer)?;
            }
            ConstantPoolEntry::String(info) => info.string_index.serialize(writer)?,
            ConstantPoolEntry::Integer(info) => info.bytes.serialize(writer)?,
            ConstantPoolEntry::Float(info) => info.bytes.serialize(writer)?,
            ConstantPoolEntry::Long(info) => {
                info.high_bytes.serialize(writer)?;
                info.low_bytes.serialize(writer)?;
            }
            ConstantPoolEntry::Double(info) => {
                info.high_bytes.serialize(writer)?;
                info.low_bytes.serialize(writer)?;
            }
            ConstantPoolEntry::NameAndType(info) => {
                info.name_index.serialize(writer)?;
                info.descriptor_index.serialize(writer)?;
            }
            ConstantPoolEntry::Utf8(info) => {
                let length = u16::try_from(info.bytes.len()).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("utf8 constant of {} bytes is too long", info.bytes.len()),
                    )
                })?;
                length.serialize(writer)?;
                writer.write_all(&info.bytes)?;
            }
            ConstantPoolEntry::MethodHandle(info) => {
                info.reference_kind.serialize(writer)?;
                info.reference_index.serialize(writer)?;
            }
            ConstantPoolEntry::MethodType(info) => info.descriptor_index.serialize(writer)?,
            ConstantPoolEntry::InvokeDynamic(info) => {
                info.bootstrap_method_attr_index.serialize(writer)?;
                info.name_and_type_index.serialize(writer)?;
            }
        }
        Ok(())
    }
}

/// Single line rendering, close to what `javap -v` prints
impl fmt::Display for ConstantPoolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantPoolEntry::Empty => write!(f, "<empty>"),
            ConstantPoolEntry::Class(info) => write!(f, "Class {}", info.name_index),
            ConstantPoolEntry::Fieldref(info) => write!(
                f,
                "Fieldref {}.{}",
                info.class_index, info.name_and_type_index
            ),
            ConstantPoolEntry::Methodref(info) => write!(
                f,
                "Methodref {}.{}",
                info.class_index, info.name_and_type_index
            ),
            ConstantPoolEntry::InterfaceMethodref(info) => write!(
                f,
                "InterfaceMethodref {}.{}",
                info.class_index, info.name_and_type_index
            ),
            ConstantPoolEntry::String(info) => write!(f, "String {}", info.string_index),
            ConstantPoolEntry::Integer(info) => write!(f, "Integer {}", info.value()),
            ConstantPoolEntry::Float(info) => write!(f, "Float {}f", info.value()),
            ConstantPoolEntry::Long(info) => write!(f, "Long {}l", info.value()),
            ConstantPoolEntry::Double(info) => write!(f, "Double {}d", info.value()),
            ConstantPoolEntry::NameAndType(info) => write!(
                f,
                "NameAndType {}:{}",
                info.name_index, info.descriptor_index
            ),
            ConstantPoolEntry::Utf8(info) => write!(f, "Utf8 {}", info.as_str().escape_debug()),
            ConstantPoolEntry::MethodHandle(info) => match info.handle_kind() {
                Some(kind) => write!(f, "MethodHandle {}:{}", kind.name(), info.reference_index),
                None => write!(
                    f,
                    "MethodHandle {}:{}",
                    info.reference_kind, info.reference_index
                ),
            },
            ConstantPoolEntry::MethodType(info) => {
                write!(f, "MethodType {}", info.descriptor_index)
            }
            ConstantPoolEntry::InvokeDynamic(info) => write!(
                f,
                "InvokeDynamic #{}:{}",
                info.bootstrap_method_attr_index, info.name_and_type_index
            ),
        }
    }
}

/// Payload types which can be pulled out of a [`ConstantPoolEntry`] by kind
pub trait PoolEntryInfo: Sized {
    const TAG: Tag;

    fn from_entry(entry: &ConstantPoolEntry) -> Option<&Self>;

    fn from_entry_mut(entry: &mut ConstantPoolEntry) -> Option<&mut Self>;
}

macro_rules! pool_entry_info {
    ($($variant:ident($info:ident)),* $(,)?) => {
        $(
            impl From<$info> for ConstantPoolEntry {
                fn from(info: $info) -> Self {
                    ConstantPoolEntry::$variant(info)
                }
            }

            impl PoolEntryInfo for $info {
                const TAG: Tag = Tag::$variant;

                fn from_entry(entry: &ConstantPoolEntry) -> Option<&Self> {
                    match entry {
                        ConstantPoolEntry::$variant(info) => Some(info),
                        _ => None,
                    }
                }

                fn from_entry_mut(entry: &mut ConstantPoolEntry) -> Option<&mut Self> {
                    match entry {
                        ConstantPoolEntry::$variant(info) => Some(info),
                        _ => None,
                    }
                }
            }
        )*
    };
}

pool_entry_info! {
    Class(ClassInfo),
    Fieldref(FieldrefInfo),
    Methodref(MethodrefInfo),
    InterfaceMethodref(InterfaceMethodrefInfo),
    String(StringInfo),
    Integer(IntegerInfo),
    Float(FloatInfo),
    Long(LongInfo),
    Double(DoubleInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(Utf8Info),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    InvokeDynamic(InvokeDynamicInfo),
}

/// Modified UTF-8 format used in class files.
///
/// See [this `DataInput` section for details][0]. Quoting from that section:
///
/// > The differences between this format and the standard UTF-8 format are the following:
/// >
/// >  * The null byte `\u0000` is encoded in 2-byte format rather than 1-byte, so that the encoded
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
                buffer.push(0b1110_1101);
                buffer.push(((code >> 16 & 0x0F) as u8).wrapping_sub(1) & 0x0F | 0b1010_0000);
                buffer.push((code >> 10 & 0x3F) as u8 | 0b1000_0000);

                buffer.push(0b1110_1101);
                buffer.push(((code >> 6 & 0x1F) as u8) | 0b1011_0000);
                buffer.push((code & 0x3F) as u8 | 0b1000_0000);
            }
        }
    }
    buffer
}

/// Inverse of [`encode_modified_utf8`]
///
/// Returns `None` on truncated or invalid sequences, raw null bytes, 4-byte forms, and unpaired
/// surrogates.
pub fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let continuation = |idx: usize| -> Option<u16> {
        let byte = *bytes.get(idx)?;
        if byte & 0b1100_0000 == 0b1000_0000 {
            Some(u16::from(byte & 0x3F))
        } else {
            None
        }
    };

    let mut idx = 0;
    while idx < bytes.len() {
        let lead = bytes[idx];
        if lead == 0 {
            return None;
        } else if lead & 0b1000_0000 == 0 {
            units.push(u16::from(lead));
            idx += 1;
        } else if lead & 0b1110_0000 == 0b1100_0000 {
            units.push(u16::from(lead & 0x1F) << 6 | continuation(idx + 1)?);
            idx += 2;
        } else if lead & 0b1111_0000 == 0b1110_0000 {
            units.push(
                u16::from(lead & 0x0F) << 12
                    | continuation(idx + 1)? << 6
                    | continuation(idx + 2)?,
            );
            idx += 3;
        } else {
            return None;
        }
    }

    String::from_utf16(&units).ok()
}
