use crate::jvm::class_file::attribute::{find_by_name, find_by_name_mut, get_by_view};
use crate::jvm::class_file::{
    Attribute, AttributeLike, ConstantIndex, ConstantPool, ConstantPoolEntry, Field, Method,
};
use crate::jvm::{ByteCursor, ClassAccessFlags, Deserialize, Error, Serialize, Version};
use crate::util::Width;
use byteorder::WriteBytesExt;
use std::fs;
use std::path::Path;

/// Representation of the [`class` file format of the JVM][0]
///
/// Parsing keeps everything needed to re-encode the file byte for byte: unknown access flag
/// bits, malformed `Utf8` constants, and attribute payloads are all stored as they were read.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub version: Version,
    pub constant_pool: ConstantPool,
    pub access_flags: ClassAccessFlags,
    pub this_class: ConstantIndex,
    pub super_class: ConstantIndex,
    pub interfaces: Vec<ConstantIndex>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub attributes: Vec<Attribute>,
}

impl ClassFile {
    /// Magic header that goes at the front of the serialized class file
    pub const MAGIC: u32 = 0xCAFE_BABE;

    /// Parse a class file from the start of `bytes`
    ///
    /// Bytes after the end of the class file are ignored.
    pub fn parse(bytes: &[u8]) -> Result<ClassFile, Error> {
        ClassFile::deserialize(&mut ByteCursor::new(bytes))
    }

    /// Parse a class file, refusing to read past the first `max_length` bytes
    pub fn parse_with_limit(bytes: &[u8], max_length: usize) -> Result<ClassFile, Error> {
        ClassFile::deserialize(&mut ByteCursor::with_limit(bytes, max_length))
    }

    /// Encode the class file
    ///
    /// Every count and length is recomputed from the current contents.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut buffer = vec![];
        self.serialize(&mut buffer)?;
        Ok(buffer)
    }

    /// Read and parse a class file from disk
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ClassFile, Error> {
        let bytes = fs::read(path)?;
        ClassFile::parse(&bytes)
    }

    /// Save the class file to disk
    pub fn save_to_path<P: AsRef<Path>>(
        &self,
        path: P,
        create_missing_directories: bool,
    ) -> std::io::Result<()> {
        let path = path.as_ref();
        if create_missing_directories {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut class_file = fs::File::create(path)?;
        self.serialize(&mut class_file)
    }

    /// Name of this class (eg. `java/lang/String`)
    pub fn this_class_name(&self) -> Result<String, Error> {
        Ok(self
            .constant_pool
            .get_class_name(self.this_class)?
            .into_owned())
    }

    /// Name of the superclass, or `None` for `java/lang/Object` (whose `super_class` is 0)
    pub fn super_class_name(&self) -> Result<Option<String>, Error> {
        if self.super_class.is_none() {
            return Ok(None);
        }
        let name = self.constant_pool.get_class_name(self.super_class)?;
        Ok(Some(name.into_owned()))
    }

    pub fn interface_names(&self) -> Result<Vec<String>, Error> {
        self.interfaces
            .iter()
            .map(|index| Ok(self.constant_pool.get_class_name(*index)?.into_owned()))
            .collect()
    }

    /// Names of the class-level attributes, in order
    pub fn get_attribute_names(&self) -> Result<Vec<String>, Error> {
        self.attributes
            .iter()
            .map(|attribute| attribute.name(&self.constant_pool))
            .collect()
    }

    /// First class-level attribute with the given name
    pub fn find_attribute(&self, name: &str) -> Option<&Attribute> {
        find_by_name(&self.attributes, &self.constant_pool, name)
    }

    pub fn find_attribute_mut(&mut self, name: &str) -> Option<&mut Attribute> {
        find_by_name_mut(&mut self.attributes, &self.constant_pool, name)
    }

    /// Decode the first class-level attribute of type `A` (eg. `SourceFile`)
    pub fn get_attribute<A: AttributeLike>(&self) -> Result<Option<A>, Error> {
        get_by_view(&self.attributes, &self.constant_pool)
    }

    /// Shift every pool index in the class file which is at or past `from` by `diff`
    ///
    /// This covers the pool's own entries and the indices held by the class, its fields, its
    /// methods, and the names of all attributes. Attribute payloads are left untouched.
    pub fn relocate(&mut self, diff: i32, from: u16) {
        self.constant_pool.relocate(diff, from);
        self.this_class.relocate(diff, from);
        self.super_class.relocate(diff, from);
        for interface in &mut self.interfaces {
            interface.relocate(diff, from);
        }
        for field in &mut self.fields {
            field.relocate(diff, from);
        }
        for method in &mut self.methods {
            method.relocate(diff, from);
        }
        for attribute in &mut self.attributes {
            attribute.relocate(diff, from);
        }
    }

    /// Insert a constant at `index`, keeping every existing reference pointing at the same
    /// constant as before
    ///
    /// References inside the new entry are taken as they are (they already refer to the pool
    /// after the insertion). As with [`ClassFile::relocate`], attribute payloads are not
    /// rewritten.
    pub fn insert_constant(
        &mut self,
        index: ConstantIndex,
        entry: ConstantPoolEntry,
    ) -> Result<(), Error> {
        self.constant_pool.check_insert(index, &entry)?;
        let width = entry.width() as i32;

        // Shift first so the new entry's own references stay put
        self.relocate(width, index.0);
        self.constant_pool.insert_entry(index, entry)?;
        log::debug!("Inserted constant at {}, shifting later constants by {}", index, width);
        Ok(())
    }

    /// Remove the constant at `index`, shifting references to later constants back down
    ///
    /// If `index` is the placeholder of a wide entry, the wide entry is removed. References to
    /// the removed constant itself are left dangling, and a warning is logged if there are any.
    pub fn remove_constant(&mut self, index: ConstantIndex) -> Result<ConstantPoolEntry, Error> {
        let start = self.constant_pool.entry_start(index)?;
        let still_referenced = self.is_referenced(ConstantIndex(start));

        let entry = self.constant_pool.remove_entry(ConstantIndex(start))?;
        let width = entry.width() as u16;
        if still_referenced {
            log::warn!(
                "Removed constant #{} ({}) is still referenced from the class file",
                start,
                entry
            );
        }

        self.relocate(-i32::from(width), start + width);
        log::debug!("Removed constant #{}, shifting later constants by -{}", start, width);
        Ok(entry)
    }

    /// Overwrite the constant at `index`, keeping every reference pointing at the same constant
    /// even if the width changes
    pub fn replace_constant(
        &mut self,
        index: ConstantIndex,
        entry: ConstantPoolEntry,
    ) -> Result<ConstantPoolEntry, Error> {
        let new_width = entry.width() as i32;
        let old_entry = self.constant_pool.replace_entry(index, entry)?;
        let diff = new_width - old_entry.width() as i32;
        if diff != 0 {
            // The pool has already relocated its own entries
            let constant_pool = std::mem::take(&mut self.constant_pool);
            self.relocate(diff, index.0 + 1);
            self.constant_pool = constant_pool;
        }
        Ok(old_entry)
    }

    /// Whether anything in the class file (pool entries included) refers to `index`
    pub fn is_referenced(&self, index: ConstantIndex) -> bool {
        let mut file_level = vec![self.this_class, self.super_class];
        file_level.extend(self.interfaces.iter().copied());
        for field in &self.fields {
            file_level.push(field.name_index);
            file_level.push(field.descriptor_index);
            file_level.extend(field.attributes.iter().map(|attribute| attribute.name_index));
        }
        for method in &self.methods {
            file_level.push(method.name_index);
            file_level.push(method.descriptor_index);
            file_level.extend(method.attributes.iter().map(|attribute| attribute.name_index));
        }
        file_level.extend(self.attributes.iter().map(|attribute| attribute.name_index));

        file_level.contains(&index) || self.constant_pool.is_referenced(index)
    }
}

impl Serialize for ClassFile {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        ClassFile::MAGIC.serialize(writer)?;
        self.version.serialize(writer)?;
        self.constant_pool.serialize(writer)?;
        self.access_flags.serialize(writer)?;
        self.this_class.serialize(writer)?;
        self.super_class.serialize(writer)?;
        self.interfaces.serialize(writer)?;
        self.fields.serialize(writer)?;
        self.methods.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for ClassFile {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let magic = cursor.read_u4()?;
        if magic != ClassFile::MAGIC {
            return Err(Error::WrongMagic {
                magic,
                offset: cursor.prev_offset(),
            });
        }

        let class = ClassFile {
            version: Version::deserialize(cursor)?,
            constant_pool: ConstantPool::deserialize(cursor)?,
            access_flags: ClassAccessFlags::deserialize(cursor)?,
            this_class: ConstantIndex::deserialize(cursor)?,
            super_class: ConstantIndex::deserialize(cursor)?,
            interfaces: Vec::deserialize(cursor)?,
            fields: Vec::deserialize(cursor)?,
            methods: Vec::deserialize(cursor)?,
            attributes: Vec::deserialize(cursor)?,
        };

        log::debug!(
            "Parsed class file version {} with {} constant pool slots, {} fields, {} methods, \
             and {} attributes ({} bytes)",
            class.version,
            class.constant_pool.count(),
            class.fields.len(),
            class.methods.len(),
            class.attributes.len(),
            cursor.offset(),
        );
        if !cursor.is_empty() {
            log::debug!("Ignoring {} bytes after the class file", cursor.remaining());
        }
        Ok(class)
    }
}
