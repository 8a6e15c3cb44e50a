use crate::jvm::class_file::{ConstantIndex, ConstantPool, ConstantPoolEntry};
use crate::jvm::{ByteCursor, Deserialize, Error, Serialize};
use byteorder::WriteBytesExt;
use std::io;

/// Attributes (used in classes, fields, methods, and even on some attributes)
///
/// The payload is kept as opaque bytes: parsing never looks inside it, and encoding writes it
/// back unchanged. Pool indices inside the payload are therefore *not* relocated when the pool
/// is edited; only `name_index` is.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name_index: ConstantIndex,
    pub info: Vec<u8>,
}

impl Attribute {
    /// Encode a typed attribute into its raw form
    pub fn from_view<A: AttributeLike>(
        name_index: ConstantIndex,
        view: &A,
    ) -> std::io::Result<Attribute> {
        let mut info = vec![];
        view.serialize(&mut info)?;
        Ok(Attribute { name_index, info })
    }

    /// Interpret the payload as a typed attribute
    ///
    /// The whole payload must be consumed. The attribute name is not checked: use
    /// [`Attribute::name`] or the lookups on `ClassFile`, `Field` and `Method` for that.
    pub fn decode<A: AttributeLike>(&self) -> Result<A, Error> {
        let mut cursor = ByteCursor::new(&self.info);
        let view = A::deserialize(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(Error::TrailingBytes {
                offset: cursor.offset(),
                remaining: cursor.remaining(),
            });
        }
        Ok(view)
    }

    /// Name of the attribute, looked up in the pool
    pub fn name(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.get_utf8(self.name_index)
    }

    pub fn relocate(&mut self, diff: i32, from: u16) {
        self.name_index.relocate(diff, from);
    }
}

impl Serialize for Attribute {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.name_index.serialize(writer)?;

        // Attribute info length is 4 bytes
        info_length(self.info.len())?.serialize(writer)?;
        writer.write_all(&self.info)?;

        Ok(())
    }
}

fn info_length(length: usize) -> io::Result<u32> {
    u32::try_from(length).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("attribute payload of {} bytes does not fit a u32 length", length),
        )
    })
}

impl Deserialize for Attribute {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let name_index = ConstantIndex::deserialize(cursor)?;
        let length = cursor.read_u4()? as usize;
        let info = cursor.read_bytes(length)?.to_vec();
        Ok(Attribute { name_index, info })
    }
}

/// Find the first attribute whose name in the pool is `name`
///
/// Attributes whose name does not resolve to a `Utf8` constant are skipped.
pub(crate) fn find_by_name<'a>(
    attributes: &'a [Attribute],
    constants: &ConstantPool,
    name: &str,
) -> Option<&'a Attribute> {
    attributes
        .iter()
        .find(|attribute| has_name(attribute, constants, name))
}

pub(crate) fn find_by_name_mut<'a>(
    attributes: &'a mut [Attribute],
    constants: &ConstantPool,
    name: &str,
) -> Option<&'a mut Attribute> {
    attributes
        .iter_mut()
        .find(|attribute| has_name(attribute, constants, name))
}

fn has_name(attribute: &Attribute, constants: &ConstantPool, name: &str) -> bool {
    constants
        .get_utf8(attribute.name_index)
        .map_or(false, |found| found == name)
}

/// Decode the first attribute called `A::NAME`, if there is one
pub(crate) fn get_by_view<A: AttributeLike>(
    attributes: &[Attribute],
    constants: &ConstantPool,
) -> Result<Option<A>, Error> {
    find_by_name(attributes, constants, A::NAME)
        .map(Attribute::decode::<A>)
        .transpose()
}

/// Attributes are all stored in the same way (see `Attribute`), but internally
/// they represent very different things. This trait is implemented by things
/// which can be turned into attributes (and read back out of them).
pub trait AttributeLike: Serialize + Deserialize {
    /// Name of the attribute
    const NAME: &'static str;
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.10
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub sourcefile_index: ConstantIndex,
}

impl SourceFile {
    /// Name of the source file
    pub fn source_file(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.get_utf8(self.sourcefile_index)
    }

    /// Overwrite the `Utf8` constant holding the source file name
    ///
    /// The constant is replaced in place, so any other user of that constant sees the new name
    /// too.
    pub fn set_source_file(&self, constants: &mut ConstantPool, name: &str) -> Result<(), Error> {
        constants.replace_entry(self.sourcefile_index, ConstantPoolEntry::utf8(name))?;
        Ok(())
    }
}

impl AttributeLike for SourceFile {
    const NAME: &'static str = "SourceFile";
}

impl Serialize for SourceFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.sourcefile_index.serialize(writer)
    }
}

impl Deserialize for SourceFile {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(SourceFile {
            sourcefile_index: ConstantIndex::deserialize(cursor)?,
        })
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantValue {
    pub constantvalue_index: ConstantIndex,
}

impl AttributeLike for ConstantValue {
    const NAME: &'static str = "ConstantValue";
}

impl Serialize for ConstantValue {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.constantvalue_index.serialize(writer)
    }
}

impl Deserialize for ConstantValue {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(ConstantValue {
            constantvalue_index: ConstantIndex::deserialize(cursor)?,
        })
    }
}

/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.9
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub signature_index: ConstantIndex,
}

impl Signature {
    pub fn signature(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.get_utf8(self.signature_index)
    }
}

impl AttributeLike for Signature {
    const NAME: &'static str = "Signature";
}

impl Serialize for Signature {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.signature_index.serialize(writer)
    }
}

impl Deserialize for Signature {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(Signature {
            signature_index: ConstantIndex::deserialize(cursor)?,
        })
    }
}

/// Checked exceptions a method may throw
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.7.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exceptions {
    pub exception_index_table: Vec<ConstantIndex>,
}

impl Exceptions {
    /// Names of the exception classes
    pub fn exception_names(&self, constants: &ConstantPool) -> Result<Vec<String>, Error> {
        self.exception_index_table
            .iter()
            .map(|index| Ok(constants.get_class_name(*index)?.into_owned()))
            .collect()
    }
}

impl AttributeLike for Exceptions {
    const NAME: &'static str = "Exceptions";
}

impl Serialize for Exceptions {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.exception_index_table.serialize(writer)
    }
}

impl Deserialize for Exceptions {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(Exceptions {
            exception_index_table: Vec::deserialize(cursor)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::ClassInfo;

    fn sample_pool() -> ConstantPool {
        let mut pool = ConstantPool::new();
        pool.push_entry(ConstantPoolEntry::utf8("SourceFile")).unwrap(); // #1
        pool.push_entry(ConstantPoolEntry::utf8("Foo.java")).unwrap(); // #2
        pool.push_entry(ConstantPoolEntry::utf8("Exceptions")).unwrap(); // #3
        pool.push_entry(ConstantPoolEntry::utf8("java/io/IOException")).unwrap(); // #4
        pool.push_entry(ClassInfo { name_index: ConstantIndex(4) }.into())
            .unwrap(); // #5
        pool
    }

    #[test]
    fn raw_attribute_codec() {
        let bytes = vec![0, 1, 0, 0, 0, 2, 0, 2];
        let mut cursor = ByteCursor::new(&bytes);
        let attribute = Attribute::deserialize(&mut cursor).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(attribute.name_index, ConstantIndex(1));
        assert_eq!(attribute.info, vec![0, 2]);

        let mut buffer = vec![];
        attribute.serialize(&mut buffer).unwrap();
        assert_eq!(buffer, bytes);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn payload_length_must_fit_u32() {
        assert_eq!(info_length(u32::MAX as usize).unwrap(), u32::MAX);
        match info_length(u32::MAX as usize + 1) {
            Err(err) if err.kind() == io::ErrorKind::InvalidInput => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_payload() {
        let bytes = vec![0, 1, 0, 0, 0, 9, 1, 2];
        match Attribute::deserialize(&mut ByteCursor::new(&bytes)) {
            Err(Error::NotEnoughBytes {
                offset: 6,
                needed: 9,
                available: 2,
            }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn source_file_view() {
        let mut pool = sample_pool();
        let attribute = Attribute {
            name_index: ConstantIndex(1),
            info: vec![0, 2],
        };
        assert_eq!(attribute.name(&pool).unwrap(), "SourceFile");

        let view = attribute.decode::<SourceFile>().unwrap();
        assert_eq!(view.source_file(&pool).unwrap(), "Foo.java");

        view.set_source_file(&mut pool, "Bar.kt").unwrap();
        assert_eq!(view.source_file(&pool).unwrap(), "Bar.kt");
        assert_eq!(pool.count(), sample_pool().count());

        let rebuilt = Attribute::from_view(ConstantIndex(1), &view).unwrap();
        assert_eq!(rebuilt, attribute);
    }

    #[test]
    fn exceptions_view() {
        let pool = sample_pool();
        let view = Exceptions {
            exception_index_table: vec![ConstantIndex(5)],
        };
        let attribute = Attribute::from_view(ConstantIndex(3), &view).unwrap();
        assert_eq!(attribute.info, vec![0, 1, 0, 5]);
        assert_eq!(attribute.decode::<Exceptions>().unwrap(), view);
        assert_eq!(
            view.exception_names(&pool).unwrap(),
            vec![String::from("java/io/IOException")]
        );

        let attributes = vec![
            Attribute {
                name_index: ConstantIndex(1),
                info: vec![0, 2],
            },
            attribute,
        ];
        assert_eq!(
            get_by_view::<Exceptions>(&attributes, &pool).unwrap(),
            Some(view)
        );
        assert_eq!(get_by_view::<Signature>(&attributes, &pool).unwrap(), None);
    }

    #[test]
    fn decode_rejects_leftover_bytes() {
        let attribute = Attribute {
            name_index: ConstantIndex(1),
            info: vec![0, 2, 0xFF],
        };
        match attribute.decode::<SourceFile>() {
            Err(Error::TrailingBytes {
                offset: 2,
                remaining: 1,
            }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn relocate_moves_name_only() {
        let mut attribute = Attribute {
            name_index: ConstantIndex(4),
            info: vec![0, 4],
        };
        attribute.relocate(1, 3);
        assert_eq!(attribute.name_index, ConstantIndex(5));
        assert_eq!(attribute.info, vec![0, 4]);
    }
}
