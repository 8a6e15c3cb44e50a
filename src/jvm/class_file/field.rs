use crate::jvm::class_file::attribute::{find_by_name, find_by_name_mut, get_by_view};
use crate::jvm::class_file::{Attribute, AttributeLike, ConstantIndex, ConstantPool};
use crate::jvm::{ByteCursor, Deserialize, Error, FieldAccessFlags, Serialize};
use byteorder::WriteBytesExt;

/// Field declared by a class or interface
///
/// [0]: https://docs.oracle.com/javase/specs/jvms/se15/html/jvms-4.html#jvms-4.5
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub access_flags: FieldAccessFlags,
    pub name_index: ConstantIndex,
    pub descriptor_index: ConstantIndex,
    pub attributes: Vec<Attribute>,
}

impl Field {
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

    /// Decode the attribute of type `A`, if the field has one (eg. `ConstantValue`)
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

impl Serialize for Field {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> std::io::Result<()> {
        self.access_flags.serialize(writer)?;
        self.name_index.serialize(writer)?;
        self.descriptor_index.serialize(writer)?;
        self.attributes.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Field {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        Ok(Field {
            access_flags: FieldAccessFlags::deserialize(cursor)?,
            name_index: ConstantIndex::deserialize(cursor)?,
            descriptor_index: ConstantIndex::deserialize(cursor)?,
            attributes: Vec::deserialize(cursor)?,
        })
    }
}
