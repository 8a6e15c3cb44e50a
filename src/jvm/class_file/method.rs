use crate::jvm::class_file::attribute::{find_by_name, find_by_name_mut, get_by_view};
use crate::jvm::class_file::{Attribute, AttributeLike, ConstantIndex, ConstantPool};
use crate::jvm::{ByteCursor, Deserialize, Error, MethodAccessFlags, Serialize};
use byteorder::WriteBytesExt;

/// Method declared by a class or interface
///
/// The `Code` attribute is kept as an opaque attribute like any other.
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.6
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub access_flags: MethodAccessFlags,
    pub name_index: ConstantIndex,
    pub descriptor_index: ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Method {
    pub fn name(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.get_utf8(self.name_index)
    }

    pub fn descriptor(&self, constants: &ConstantPool) -> Result<String, Error> {
        constants.get_utf8(self.descriptor_index)
    }

    pub fn find_attribute(&self, constants: &ConstantPool, name: &str) -> Option<&Attribute> {
        find_by_name(&self.attributes, constants, name)
    }

    pub fn find_attribute_mut(
        &mut self,
        constants: &ConstantPool,
        name: &str,
    ) -> Option<&mut Attribute> {
        find_by_name_mut(&mut self.attributes, constants, name)
    }

    /// Decode the attribute of type `A`, if the method has one (eg. `Exceptions`)
    pub fn get_attribute<A: AttributeLike>(
        &self,
        constants: &ConstantPool,
    ) -> Result<Option<A>, Error> {
        get_by_view(&self.attributes, constants)
    }

    pub fn relocate(&mut self, diff: i32, from: u16) {
        self.name_index.relocate(diff, from);
        self.descriptor_index.relocate(diff, from);
        for attribute in &mut self.attributes {
            attribute.relocate(diff, from);
        }
    }
}

impl Serialize for Method {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Method {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(Method {
            access_flags: MethodAccessFlags::deserialize(cursor)?,
            name_index: ConstantIndex::deserialize(cursor)?,
            descriptor_index: ConstantIndex::deserialize(cursor)?,
            attributes: Vec::deserialize(cursor)?,
        })
    }
}
