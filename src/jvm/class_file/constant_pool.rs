use crate::jvm::class_file::{ClassInfo, ConstantIndex, ConstantPoolEntry, PoolEntryInfo, Tag, Utf8Info};
use crate::jvm::{ByteCursor, Deserialize, Error, Serialize};
use crate::util::Width;
use byteorder::WriteBytesExt;
use std::borrow::Cow;
use std::fmt;
use std::io;

/// Class file constant pool
///
/// Slots are stored exactly as the class file numbers them: slot 0 is an `Empty` entry that is
/// never addressed, and every `Long` or `Double` is followed by an `Empty` placeholder. That
/// way the position of an entry in the vector is its constant pool index, and the number of
/// stored slots is the `constant_pool_count` that goes on the wire.
///
/// Pool indices held inside entries (and elsewhere in the class file) are plain integers, so
/// inserting or removing slots shifts what they point at. Only [`ConstantPool::replace_entry`]
/// fixes up references on its own; after [`ConstantPool::insert_entry`] or
/// [`ConstantPool::remove_entry`] the caller decides whether to call
/// [`ConstantPool::relocate`]. `ClassFile` offers versions of these that always relocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl Default for ConstantPool {
    fn default() -> Self {
        ConstantPool::new()
    }
}

impl ConstantPool {
    /// Largest number of slots a pool can have (the count is a `u16`)
    pub const MAX_SLOTS: usize = u16::MAX as usize;

    /// Make a fresh pool holding only the reserved slot 0
    pub fn new() -> ConstantPool {
        ConstantPool {
            entries: vec![ConstantPoolEntry::Empty],
        }
    }

    /// Wrap pre-laid-out slots (including slot 0 and placeholders)
    ///
    /// The layout must be one a parse could produce: no slots at all, or slot 0 `Empty` followed
    /// by entries where every wide entry is followed by its `Empty` placeholder and no other slot
    /// is `Empty`.
    pub fn from_entries(entries: Vec<ConstantPoolEntry>) -> Result<ConstantPool, Error> {
        if entries.len() > ConstantPool::MAX_SLOTS {
            return Err(Error::ConstantPoolOverflow {
                slots: entries.len(),
            });
        }
        if let Some(first) = entries.first() {
            if !first.is_empty() {
                return Err(Error::InvalidConstantIndex { index: 0 });
            }
        }

        let mut idx = 1;
        while idx < entries.len() {
            let entry = &entries[idx];
            if entry.is_empty() {
                return Err(Error::EmptyEntry { index: idx as u16 });
            }
            if entry.is_wide_entry() {
                idx += 1;
                match entries.get(idx) {
                    Some(placeholder) if placeholder.is_empty() => (),
                    _ => return Err(Error::InvalidConstantIndex { index: idx as u16 }),
                }
            }
            idx += 1;
        }

        Ok(ConstantPool { entries })
    }

    /// Number of stored slots, placeholders included
    ///
    /// This is the `constant_pool_count` of the class file. Every way of building a pool keeps
    /// this below `MAX_SLOTS`.
    pub fn count(&self) -> u16 {
        u16::try_from(self.entries.len()).unwrap_or(u16::MAX)
    }

    pub fn entries(&self) -> &[ConstantPoolEntry] {
        &self.entries
    }

    /// Addressable entries and their indices (slot 0 and placeholders are skipped)
    pub fn iter(&self) -> impl Iterator<Item = (ConstantIndex, &ConstantPoolEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.is_empty())
            .map(|(index, entry)| (ConstantIndex(index as u16), entry))
    }

    pub fn get_tag(&self, index: ConstantIndex) -> Option<Tag> {
        self.get_entry(index).map(ConstantPoolEntry::tag)
    }

    pub fn get_entry(&self, index: ConstantIndex) -> Option<&ConstantPoolEntry> {
        self.entries.get(index.0 as usize)
    }

    pub fn get_entry_mut(&mut self, index: ConstantIndex) -> Option<&mut ConstantPoolEntry> {
        self.entries.get_mut(index.0 as usize)
    }

    /// Get the payload of a constant, checking that it is of the expected kind
    pub fn get<T: PoolEntryInfo>(&self, index: ConstantIndex) -> Result<&T, Error> {
        let entry = self
            .get_entry(index)
            .ok_or(Error::InvalidConstantIndex { index: index.0 })?;
        T::from_entry(entry).ok_or(Error::UnexpectedConstant {
            index: index.0,
            expected: T::TAG,
            found: entry.tag(),
        })
    }

    pub fn get_mut<T: PoolEntryInfo>(&mut self, index: ConstantIndex) -> Result<&mut T, Error> {
        let entry = self
            .entries
            .get_mut(index.0 as usize)
            .ok_or(Error::InvalidConstantIndex { index: index.0 })?;
        let found = entry.tag();
        T::from_entry_mut(entry).ok_or(Error::UnexpectedConstant {
            index: index.0,
            expected: T::TAG,
            found,
        })
    }

    /// Strictly decoded text of a `Utf8` constant
    pub fn get_utf8(&self, index: ConstantIndex) -> Result<String, Error> {
        self.get::<Utf8Info>(index)?
            .decode()
            .ok_or(Error::InvalidText { index: index.0 })
    }

    /// Text of a `Utf8` constant, decoded lossily
    pub fn get_str(&self, index: ConstantIndex) -> Result<Cow<'_, str>, Error> {
        Ok(self.get::<Utf8Info>(index)?.as_str())
    }

    /// Name of the class denoted by a `Class` constant
    pub fn get_class_name(&self, index: ConstantIndex) -> Result<Cow<'_, str>, Error> {
        let class = self.get::<ClassInfo>(index)?;
        self.get_str(class.name_index)
    }

    /// Index of the first `Utf8` constant whose bytes encode `string`
    pub fn find_utf8(&self, string: &str) -> Option<ConstantIndex> {
        let encoded = Utf8Info::new(string);
        self.iter()
            .find(|(_, entry)| matches!(entry, ConstantPoolEntry::Utf8(info) if *info == encoded))
            .map(|(index, _)| index)
    }

    /// Whether any entry of the pool refers to `index`
    pub fn is_referenced(&self, index: ConstantIndex) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.references().contains(&index))
    }

    fn check_capacity(&self, extra: usize) -> Result<(), Error> {
        let slots = self.entries.len() + extra;
        if slots > ConstantPool::MAX_SLOTS {
            Err(Error::ConstantPoolOverflow { slots })
        } else {
            Ok(())
        }
    }

    /// Whether the slot is the unusable one right after a `Long` or `Double`
    fn is_placeholder(&self, index: usize) -> bool {
        index > 0
            && self
                .entries
                .get(index - 1)
                .map_or(false, ConstantPoolEntry::is_wide_entry)
    }

    /// Check that `index` addresses a live entry (not slot 0, not a placeholder)
    fn check_addressable(&self, index: ConstantIndex) -> Result<usize, Error> {
        let idx = index.0 as usize;
        if idx == 0 || idx >= self.entries.len() || self.is_placeholder(idx) {
            Err(Error::InvalidConstantIndex { index: index.0 })
        } else {
            Ok(idx)
        }
    }

    /// Check that `entry` could be inserted at `index` without changing anything
    pub(crate) fn check_insert(
        &self,
        index: ConstantIndex,
        entry: &ConstantPoolEntry,
    ) -> Result<(), Error> {
        let idx = index.0 as usize;
        if idx == 0 || idx > self.entries.len() || self.is_placeholder(idx) {
            return Err(Error::InvalidConstantIndex { index: index.0 });
        }
        if entry.is_empty() {
            return Err(Error::EmptyEntry { index: index.0 });
        }
        self.check_capacity(entry.width())
    }

    /// Index of the entry occupying slot `index` (the wide entry, for a placeholder slot)
    pub(crate) fn entry_start(&self, index: ConstantIndex) -> Result<u16, Error> {
        let idx = index.0 as usize;
        if idx == 0 || idx >= self.entries.len() {
            Err(Error::InvalidConstantIndex { index: index.0 })
        } else if self.is_placeholder(idx) {
            Ok(index.0 - 1)
        } else {
            Ok(index.0)
        }
    }

    /// Append an entry (and its placeholder, if wide), returning the index it ends up at
    pub fn push_entry(&mut self, entry: ConstantPoolEntry) -> Result<ConstantIndex, Error> {
        // A pool parsed from a count of 0 has no slot 0 yet
        let index = self.entries.len().max(1) as u16;
        if entry.is_empty() {
            return Err(Error::EmptyEntry { index });
        }
        let slot_zero = usize::from(self.entries.is_empty());
        self.check_capacity(slot_zero + entry.width())?;
        if self.entries.is_empty() {
            self.entries.push(ConstantPoolEntry::Empty);
        }

        let wide = entry.is_wide_entry();
        self.entries.push(entry);
        if wide {
            self.entries.push(ConstantPoolEntry::Empty);
        }
        Ok(ConstantIndex(index))
    }

    /// Remove the last entry
    ///
    /// A trailing placeholder goes together with its wide entry, so this always removes exactly
    /// one addressable entry. Slot 0 is never removed.
    pub fn pop_entry(&mut self) -> Option<ConstantPoolEntry> {
        let len = self.entries.len();
        if len <= 1 {
            return None;
        }
        if len > 2 && self.entries[len - 2].is_wide_entry() {
            self.entries.pop();
        }
        self.entries.pop()
    }

    /// Insert an entry so that it ends up at `index`, shifting later slots right by its width
    ///
    /// References are *not* updated: follow up with `relocate(width, index)` (before or after
    /// the insertion, but taking care not to shift the new entry's own references) if they must
    /// stay valid.
    pub fn insert_entry(
        &mut self,
        index: ConstantIndex,
        entry: ConstantPoolEntry,
    ) -> Result<(), Error> {
        self.check_insert(index, &entry)?;
        let idx = index.0 as usize;
        if entry.is_wide_entry() {
            self.entries.insert(idx, ConstantPoolEntry::Empty);
        }
        self.entries.insert(idx, entry);
        Ok(())
    }

    /// Remove the entry at `index`, shifting later slots left by its width
    ///
    /// If `index` is the placeholder of a wide entry, the wide entry itself is removed. References
    /// are *not* updated: anything still pointing at or past `index` is now off, unless the caller
    /// follows up with `relocate(-width, index)`. Prefer [`ConstantPool::replace_entry`] when the
    /// slot is still referenced.
    pub fn remove_entry(&mut self, index: ConstantIndex) -> Result<ConstantPoolEntry, Error> {
        let idx = self.entry_start(index)? as usize;
        let entry = self.entries.remove(idx);
        if entry.is_wide_entry() && idx < self.entries.len() {
            self.entries.remove(idx);
        }
        Ok(entry)
    }

    /// Overwrite the entry at `index`, returning the old one
    ///
    /// When the width changes, the placeholder after the slot is added or dropped and every
    /// reference in the pool past `index` is relocated, so references keep denoting the same
    /// entries.
    pub fn replace_entry(
        &mut self,
        index: ConstantIndex,
        entry: ConstantPoolEntry,
    ) -> Result<ConstantPoolEntry, Error> {
        let idx = self.check_addressable(index)?;
        if entry.is_empty() {
            return Err(Error::EmptyEntry { index: index.0 });
        }

        let new_wide = entry.is_wide_entry();
        let old_wide = self.entries[idx].is_wide_entry();
        if new_wide && !old_wide {
            self.check_capacity(1)?;
        }

        let old_entry = std::mem::replace(&mut self.entries[idx], entry);
        if new_wide && !old_wide {
            self.entries.insert(idx + 1, ConstantPoolEntry::Empty);
            self.relocate(1, index.0 + 1);
        } else if old_wide && !new_wide && idx + 1 < self.entries.len() {
            self.entries.remove(idx + 1);
            self.relocate(-1, index.0 + 1);
        }

        Ok(old_entry)
    }

    /// Shift every reference held by pool entries which is at or past `from` by `diff`
    pub fn relocate(&mut self, diff: i32, from: u16) {
        for entry in &mut self.entries {
            entry.relocate(diff, from);
        }
    }
}

impl Deserialize for ConstantPool {
    fn deserialize(cursor: &mut ByteCursor<'_>) -> Result<Self, Error> {
        let count = cursor.read_u2()?;
        let mut entries = Vec::with_capacity(count as usize);
        if count == 0 {
            return Ok(ConstantPool { entries });
        }

        entries.push(ConstantPoolEntry::Empty);
        let mut index = 1;
        while index < count {
            let offset = cursor.offset();
            let entry = ConstantPoolEntry::deserialize(cursor)?;
            log::trace!("#{} = {}", index, entry);

            let wide = entry.is_wide_entry();
            if wide && index + 1 >= count {
                return Err(Error::WideEntryPastPoolEnd { index, offset });
            }
            entries.push(entry);
            if wide {
                entries.push(ConstantPoolEntry::Empty);
                index += 1;
            }
            index += 1;
        }

        log::debug!(
            "Parsed constant pool with {} slots, ending at byte {}",
            entries.len(),
            cursor.offset()
        );
        Ok(ConstantPool { entries })
    }
}

impl Serialize for ConstantPool {
    fn serialize<W: WriteBytesExt>(&self, writer: &mut W) -> io::Result<()> {
        let count = u16::try_from(self.entries.len()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("constant pool of {} slots is too large", self.entries.len()),
            )
        })?;
        count.serialize(writer)?;
        for entry in &self.entries {
            entry.serialize(writer)?;
        }
        Ok(())
    }
}

/// One `#index = entry` line per addressable entry
impl fmt::Display for ConstantPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.iter() {
            writeln!(f, "{:>6} = {}", index.to_string(), entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_file::{
        DoubleInfo, IntegerInfo, LongInfo, MethodrefInfo, NameAndTypeInfo, StringInfo,
    };

    /// Pool laid out as
    ///
    /// ```text
    /// #1 = Utf8 Foo
    /// #2 = Class #1
    /// #3 = Utf8 bar
    /// #4 = Utf8 ()V
    /// #5 = NameAndType #3:#4
    /// #6 = Methodref #2.#5
    /// #7 = String #3
    /// ```
    fn sample_pool() -> ConstantPool {
        let mut pool = ConstantPool::new();
        pool.push_entry(ConstantPoolEntry::utf8("Foo")).unwrap();
        pool.push_entry(ClassInfo { name_index: ConstantIndex(1) }.into())
            .unwrap();
        pool.push_entry(ConstantPoolEntry::utf8("bar")).unwrap();
        pool.push_entry(ConstantPoolEntry::utf8("()V")).unwrap();
        pool.push_entry(
            NameAndTypeInfo {
                name_index: ConstantIndex(3),
                descriptor_index: ConstantIndex(4),
            }
            .into(),
        )
        .unwrap();
        pool.push_entry(
            MethodrefInfo {
                class_index: ConstantIndex(2),
                name_and_type_index: ConstantIndex(5),
            }
            .into(),
        )
        .unwrap();
        pool.push_entry(StringInfo { string_index: ConstantIndex(3) }.into())
            .unwrap();
        pool
    }

    fn encode(pool: &ConstantPool) -> Vec<u8> {
        let mut buffer = vec![];
        pool.serialize(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn push_and_pop_wide_entry() {
        let mut pool = sample_pool();
        assert_eq!(pool.count(), 8);

        let index = pool
            .push_entry(LongInfo::from_value(1 << 40).into())
            .unwrap();
        assert_eq!(index, ConstantIndex(8));
        assert_eq!(pool.count(), 10);
        assert_eq!(pool.iter().count(), 8);
        assert_eq!(pool.get_tag(ConstantIndex(8)), Some(Tag::Long));
        assert_eq!(pool.get_tag(ConstantIndex(9)), Some(Tag::Empty));

        let popped = pool.pop_entry().unwrap();
        assert_eq!(popped, ConstantPoolEntry::from(LongInfo::from_value(1 << 40)));
        assert_eq!(pool.count(), 8);
        assert_eq!(pool, sample_pool());
    }

    #[test]
    fn pop_never_removes_slot_zero() {
        let mut pool = ConstantPool::new();
        pool.push_entry(DoubleInfo::from_value(1.0).into()).unwrap();
        assert_eq!(pool.count(), 3);
        assert!(pool.pop_entry().unwrap().is_wide_entry());
        assert_eq!(pool.count(), 1);
        assert_eq!(pool.pop_entry(), None);
        assert_eq!(pool.count(), 1);
    }

    #[test]
    fn typed_access() {
        let pool = sample_pool();
        assert_eq!(
            pool.get::<ClassInfo>(ConstantIndex(2)).unwrap().name_index,
            ConstantIndex(1)
        );
        assert_eq!(pool.get_class_name(ConstantIndex(2)).unwrap(), "Foo");
        assert_eq!(pool.get_utf8(ConstantIndex(4)).unwrap(), "()V");
        assert_eq!(pool.find_utf8("bar"), Some(ConstantIndex(3)));
        assert_eq!(pool.find_utf8("baz"), None);

        match pool.get::<ClassInfo>(ConstantIndex(1)) {
            Err(Error::UnexpectedConstant {
                index: 1,
                expected: Tag::Class,
                found: Tag::Utf8,
            }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            pool.get::<ClassInfo>(ConstantIndex(99)),
            Err(Error::InvalidConstantIndex { index: 99 })
        ));
    }

    #[test]
    fn strict_utf8_reports_invalid_text() {
        let mut pool = ConstantPool::new();
        let index = pool
            .push_entry(ConstantPoolEntry::Utf8(Utf8Info { bytes: vec![0xFF] }))
            .unwrap();
        assert!(matches!(
            pool.get_utf8(index),
            Err(Error::InvalidText { index: 1 })
        ));
        assert_eq!(pool.get_str(index).unwrap(), "\u{FFFD}");
    }

    #[test]
    fn insert_relocate_remove_relocate_is_identity() {
        let original = sample_pool();

        for entry in [
            ConstantPoolEntry::utf8("inserted"),
            LongInfo::from_value(-5).into(),
        ] {
            let mut pool = original.clone();
            let width = entry.width() as i32;

            pool.relocate(width, 3);
            pool.insert_entry(ConstantIndex(3), entry.clone()).unwrap();
            assert_eq!(pool.count(), original.count() + width as u16);
            assert_eq!(pool.get_entry(ConstantIndex(3)), Some(&entry));
            assert_eq!(pool.get_utf8(ConstantIndex(3 + width as u16)).unwrap(), "bar");
            assert_eq!(
                pool.get::<NameAndTypeInfo>(ConstantIndex(5 + width as u16))
                    .unwrap()
                    .name_index,
                ConstantIndex(3 + width as u16)
            );

            assert_eq!(pool.remove_entry(ConstantIndex(3)).unwrap(), entry);
            pool.relocate(-width, 3);
            assert_eq!(pool, original);
            assert_eq!(encode(&pool), encode(&original));
        }
    }

    #[test]
    fn remove_via_placeholder_removes_wide_entry() {
        let mut pool = sample_pool();
        pool.insert_entry(ConstantIndex(2), DoubleInfo::from_value(3.5).into())
            .unwrap();
        assert_eq!(pool.get_tag(ConstantIndex(3)), Some(Tag::Empty));

        let removed = pool.remove_entry(ConstantIndex(3)).unwrap();
        assert_eq!(removed, ConstantPoolEntry::from(DoubleInfo::from_value(3.5)));
        assert_eq!(pool.count(), sample_pool().count());
    }

    #[test]
    fn mutations_reject_bad_indices() {
        let mut pool = sample_pool();
        pool.push_entry(LongInfo::from_value(0).into()).unwrap();

        let entry = ConstantPoolEntry::from(IntegerInfo::from_value(1));
        assert!(pool.insert_entry(ConstantIndex(0), entry.clone()).is_err());
        assert!(pool.insert_entry(ConstantIndex(9), entry.clone()).is_err());
        assert!(pool.insert_entry(ConstantIndex(11), entry.clone()).is_err());
        assert!(pool.remove_entry(ConstantIndex(0)).is_err());
        assert!(pool.remove_entry(ConstantIndex(10)).is_err());
        assert!(pool.replace_entry(ConstantIndex(9), entry.clone()).is_err());
        assert!(matches!(
            pool.replace_entry(ConstantIndex(1), ConstantPoolEntry::Empty),
            Err(Error::EmptyEntry { index: 1 })
        ));
        assert!(matches!(
            pool.push_entry(ConstantPoolEntry::Empty),
            Err(Error::EmptyEntry { .. })
        ));

        // Appending at the very end is allowed
        pool.insert_entry(ConstantIndex(10), entry).unwrap();
        assert_eq!(pool.get_tag(ConstantIndex(10)), Some(Tag::Integer));
    }

    #[test]
    fn replace_narrow_with_wide_and_back_keeps_references() {
        let original = sample_pool();
        let mut pool = original.clone();

        // #4 (`()V`) becomes a long, pushing everything after it up by one
        let old = pool
            .replace_entry(ConstantIndex(4), LongInfo::from_value(9).into())
            .unwrap();
        assert_eq!(old, ConstantPoolEntry::utf8("()V"));
        assert_eq!(pool.count(), original.count() + 1);
        assert_eq!(pool.get_tag(ConstantIndex(5)), Some(Tag::Empty));

        let method = pool.get::<MethodrefInfo>(ConstantIndex(7)).unwrap();
        assert_eq!(method.class_index, ConstantIndex(2));
        assert_eq!(method.name_and_type_index, ConstantIndex(6));
        let name_and_type = pool.get::<NameAndTypeInfo>(ConstantIndex(6)).unwrap();
        assert_eq!(name_and_type.name_index, ConstantIndex(3));
        assert_eq!(name_and_type.descriptor_index, ConstantIndex(4));

        // And back again
        let old = pool.replace_entry(ConstantIndex(4), old).unwrap();
        assert_eq!(old, ConstantPoolEntry::from(LongInfo::from_value(9)));
        assert_eq!(pool, original);
    }

    #[test]
    fn replace_wide_with_wide_keeps_layout() {
        let mut pool = sample_pool();
        pool.push_entry(LongInfo::from_value(1).into()).unwrap();
        pool.push_entry(ConstantPoolEntry::utf8("after")).unwrap();
        let before = pool.count();

        pool.replace_entry(ConstantIndex(8), DoubleInfo::from_value(2.0).into())
            .unwrap();
        assert_eq!(pool.count(), before);
        assert_eq!(pool.get_tag(ConstantIndex(9)), Some(Tag::Empty));
        assert_eq!(pool.get_utf8(ConstantIndex(10)).unwrap(), "after");
    }

    #[test]
    fn parse_and_encode() {
        let bytes: Vec<u8> = vec![
            0, 5, // count
            1, 0, 1, b'x', // #1 Utf8 x
            5, 0, 0, 0, 0, 0, 0, 0, 42, // #2 Long 42 (+ #3 placeholder)
            7, 0, 1, // #4 Class #1
        ];
        let mut cursor = ByteCursor::new(&bytes);
        let pool = ConstantPool::deserialize(&mut cursor).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(pool.count(), 5);
        assert_eq!(pool.get::<LongInfo>(ConstantIndex(2)).unwrap().value(), 42);
        assert_eq!(pool.get_tag(ConstantIndex(3)), Some(Tag::Empty));
        assert_eq!(pool.get_class_name(ConstantIndex(4)).unwrap(), "x");
        assert_eq!(encode(&pool), bytes);

        assert_eq!(
            pool.to_string(),
            "    #1 = Utf8 x\n    #2 = Long 42l\n    #4 = Class #1\n"
        );
    }

    #[test]
    fn parse_empty_pool() {
        let mut cursor = ByteCursor::new(&[0, 0]);
        let pool = ConstantPool::deserialize(&mut cursor).unwrap();
        assert_eq!(pool.count(), 0);
        assert_eq!(encode(&pool), vec![0, 0]);
    }

    #[test]
    fn wide_entry_in_last_slot_is_rejected() {
        let bytes: Vec<u8> = vec![
            0, 3, // count
            1, 0, 1, b'x', // #1 Utf8 x
            5, 0, 0, 0, 0, 0, 0, 0, 1, // #2 Long 1, but #3 is past the count
        ];
        match ConstantPool::deserialize(&mut ByteCursor::new(&bytes)) {
            Err(Error::WideEntryPastPoolEnd {
                index: 2,
                offset: 6,
            }) => (),
            other => panic!("unexpected {:?}", other),
        }

        // One more slot and the same entries are fine
        let mut bytes = bytes;
        bytes[1] = 4;
        let pool = ConstantPool::deserialize(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(pool.count(), 4);
        assert_eq!(encode(&pool), bytes);
    }

    #[test]
    fn failed_push_leaves_slotless_pool_alone() {
        let mut pool = ConstantPool::deserialize(&mut ByteCursor::new(&[0, 0])).unwrap();
        match pool.push_entry(ConstantPoolEntry::Empty) {
            Err(Error::EmptyEntry { index: 1 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(pool.count(), 0);
        assert_eq!(encode(&pool), vec![0, 0]);

        assert_eq!(
            pool.push_entry(ConstantPoolEntry::utf8("x")).unwrap(),
            ConstantIndex(1)
        );
        assert_eq!(pool.count(), 2);
    }

    #[test]
    fn from_entries_checks_layout() {
        let pool = ConstantPool::from_entries(sample_pool().entries().to_vec()).unwrap();
        assert_eq!(pool, sample_pool());
        assert_eq!(ConstantPool::from_entries(vec![]).unwrap().count(), 0);

        let long = ConstantPoolEntry::from(LongInfo::from_value(1));
        match ConstantPool::from_entries(vec![ConstantPoolEntry::Empty, long.clone()]) {
            Err(Error::InvalidConstantIndex { index: 2 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        match ConstantPool::from_entries(vec![
            ConstantPoolEntry::Empty,
            long.clone(),
            ConstantPoolEntry::utf8("x"),
        ]) {
            Err(Error::InvalidConstantIndex { index: 2 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        match ConstantPool::from_entries(vec![ConstantPoolEntry::utf8("x")]) {
            Err(Error::InvalidConstantIndex { index: 0 }) => (),
            other => panic!("unexpected {:?}", other),
        }
        match ConstantPool::from_entries(vec![ConstantPoolEntry::Empty, ConstantPoolEntry::Empty]) {
            Err(Error::EmptyEntry { index: 1 }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn from_entries_rejects_more_slots_than_the_count_can_hold() {
        let mut entries = vec![ConstantPoolEntry::Empty];
        entries.resize(ConstantPool::MAX_SLOTS + 1, ConstantPoolEntry::utf8("x"));
        match ConstantPool::from_entries(entries) {
            Err(Error::ConstantPoolOverflow { slots: 65536 }) => (),
            other => panic!("unexpected {:?}", other),
        }

        let mut entries = vec![ConstantPoolEntry::Empty];
        entries.resize(ConstantPool::MAX_SLOTS, ConstantPoolEntry::utf8("x"));
        let pool = ConstantPool::from_entries(entries).unwrap();
        assert_eq!(pool.count(), u16::MAX);
    }

    #[test]
    fn replace_wide_entry_without_placeholder_does_not_panic() {
        let mut pool = ConstantPool::new();
        pool.push_entry(ConstantPoolEntry::utf8("x")).unwrap();
        *pool.get_entry_mut(ConstantIndex(1)).unwrap() = LongInfo::from_value(1).into();

        let old = pool
            .replace_entry(ConstantIndex(1), ConstantPoolEntry::utf8("y"))
            .unwrap();
        assert_eq!(old, ConstantPoolEntry::from(LongInfo::from_value(1)));
        assert_eq!(pool.count(), 2);
        assert_eq!(pool.get_str(ConstantIndex(1)).unwrap(), "y");
    }

    #[test]
    fn parse_propagates_entry_error() {
        // Second entry is cut off inside its name_index
        let bytes: Vec<u8> = vec![0, 3, 1, 0, 1, b'x', 7, 0];
        match ConstantPool::deserialize(&mut ByteCursor::new(&bytes)) {
            Err(Error::NotEnoughBytes { offset: 7, .. }) => (),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn references_are_tracked() {
        let pool = sample_pool();
        assert!(pool.is_referenced(ConstantIndex(3)));
        assert!(pool.is_referenced(ConstantIndex(5)));
        assert!(!pool.is_referenced(ConstantIndex(6)));
    }
}
