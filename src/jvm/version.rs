use super::{ByteCursor, Deserialize, Error, Serialize};
use byteorder::WriteBytesExt;
use std::fmt;
use std::io::Result;

/// Version of the class file, which is used to verify that the JVM has the
/// necessary features to interpret the class
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Copy)]
pub struct Version {
    pub major_version: u16,
    pub minor_version: u16,
}

impl Version {
    /// JVM class file version corresponding to Java SE 1.1 (and 1.0.2)
    pub const JAVA1_1: Version = Version::major(45);

    /// JVM class file version corresponding to Java SE 5.0
    pub const JAVA5: Version = Version::major(49);

    /// JVM class file version corresponding to Java SE 7
    pub const JAVA7: Version = Version::major(51);

    /// JVM class file version corresponding to Java SE 8 (released March 2014)
    pub const JAVA8: Version = Version::major(52);

    /// JVM class file version corresponding to Java SE 11
    pub const JAVA11: Version = Version::major(55);

    /// JVM class file version corresponding to Java SE 17
    pub const JAVA17: Version = Version::major(61);

    /// JVM class file version corresponding to Java SE 21
    pub const JAVA21: Version = Version::major(65);

    const fn major(major_version: u16) -> Version {
        Version {
            major_version,
            minor_version: 0,
        }
    }

    /// Java SE release matching the major version, if it is one we know about
    ///
    /// Releases before 1.2 all share major version 45, which is reported as `"1.1"`.
    pub fn java_release(&self) -> Option<String> {
        match self.major_version {
            45 => Some(String::from("1.1")),
            46..=48 => Some(format!("1.{}", self.major_version - 44)),
            49..=99 => Some((self.major_version - 44).to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major_version, self.minor_version)
    }
}

/// On the wire the minor version comes first
impl Serialize for Version {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> Result<()> {
        self.minor_version.serialize(writer)?;
        self.major_version.serialize(writer)?;
        Ok(())
    }
}

impl Deserialize for Version {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> std::result::Result<Self, Error> {
        let minor_version = cursor.read_u2()?;
        let major_version = cursor.read_u2()?;
        Ok(Version {
            major_version,
            minor_version,
        })
    }
}
