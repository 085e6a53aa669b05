//! Insert, update, delete, and read: the crash-safe mutation algorithms.
//!
//! Every mutation follows the same shape: new bytes are staged at their
//! final offset before anything live can reach them, and exactly one
//! trailing write flips visibility. What that trailing write is differs by
//! mutation, because recovery only ever trusts slots `0..numRecords`:
//!
//! - Insert's new slot sits *at* index `numRecords`, outside the range
//!   recovery scans, so writing it is still prepare — `numRecords`'s own
//!   increment is what brings it into view. That increment is the commit.
//! - Update and delete touch a slot already inside `0..numRecords`, so
//!   rewriting that slot's content (with a freshly computed CRC) is itself
//!   the commit — a half-written rewrite fails its CRC and is rejected.
//! - Index growth adds a slot beyond the current `dataStartPtr`; moving
//!   `dataStartPtr` to cover it is the commit.

use crate::crc32::crc32;
use crate::free_space::{self, Placement};
use crate::header::Header;
use crate::record;
use crate::slot::{self, RecordHeader};
use crate::store::Store;
use crate::StoreError;
use slotkv_io::FileOps;
use tracing::debug;

impl<F: FileOps> Store<F> {
    /// Inserts `value` under `key`. Fails with [`StoreError::KeyExists`] if
    /// the key is already present.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.check_key_len(key)?;
        if self.index.contains(key) {
            return Err(StoreError::KeyExists);
        }

        self.ensure_free_slot()?;
        let slot_num = self.num_records as u32;

        let needed = value.len() as i64;
        let file_len = self.ops.len()? as i64;
        let placement = free_space::find_free_gap(&self.index, needed, self.data_start_ptr, file_len);
        let data_pointer = self.place(placement, needed + 4)?;

        // Prepare: the payload and the new slot, which sits at `numRecords`,
        // outside the range recovery trusts.
        record::write_payload(&mut self.ops, data_pointer, value)?;
        let header = RecordHeader {
            data_pointer,
            data_capacity: (needed + 4) as i32,
            data_count: (needed + 4) as i32,
            payload_crc32: self.payload_crc(value),
            index_position: slot_num,
        };
        slot::write_slot(&mut self.ops, slot_num, self.max_key_len, key, &header)?;

        // Commit: numRecords' increment brings slot_num into view.
        let new_num_records = self.num_records + 1;
        Header::write_num_records(&mut self.ops, new_num_records)?;
        self.num_records = new_num_records;
        self.index.insert(key.to_vec(), header);

        debug!(slot_num, len = value.len(), "inserted");
        Ok(())
    }

    /// Replaces the value stored under `key`. Fails with
    /// [`StoreError::KeyAbsent`] if the key isn't present.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.check_key_len(key)?;
        let existing = self.index.get(key).cloned().ok_or(StoreError::KeyAbsent)?;

        let needed = value.len() as i64;
        let usable_in_place = free_space::in_place_slack(&existing) + i64::from(existing.data_count);

        let mut header = existing.clone();
        if needed <= usable_in_place {
            // Case A/B: fits (with room to spare, or exactly) in the
            // record's existing capacity — no relocation needed.
            record::write_payload(&mut self.ops, existing.data_pointer, value)?;
            header.data_count = (needed + 4) as i32;
            header.payload_crc32 = self.payload_crc(value);
        } else {
            // Case C: grown past its capacity, relocate to a wider spot.
            let file_len = self.ops.len()? as i64;
            let index_without_self = self.index.clone_without(key);
            let placement =
                free_space::find_free_gap(&index_without_self, needed, self.data_start_ptr, file_len);
            let data_pointer = self.place(placement, needed + 4)?;
            record::write_payload(&mut self.ops, data_pointer, value)?;
            header.data_pointer = data_pointer;
            header.data_capacity = (needed + 4) as i32;
            header.data_count = (needed + 4) as i32;
            header.payload_crc32 = self.payload_crc(value);
        }

        // Commit: this slot already sits inside 0..numRecords, so rewriting
        // it in place (new dataCount/crc, possibly new dataPointer) is
        // itself what makes the new value visible — a half-written rewrite
        // simply fails its CRC.
        slot::write_slot(&mut self.ops, header.index_position, self.max_key_len, key, &header)?;
        self.index.insert(key.to_vec(), header);
        debug!(len = value.len(), "updated");
        Ok(())
    }

    /// Removes `key`. Fails with [`StoreError::KeyAbsent`] if absent.
    ///
    /// No explicit free list is kept: a deleted record's data-region bytes
    /// are handed to its neighbour (or the file is truncated, if it was the
    /// last record in data-pointer order) and its index slot is filled by
    /// moving the current highest live slot into it, keeping live slots the
    /// compact prefix `0..numRecords` that recovery depends on.
    pub fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.ensure_open()?;
        let header = self.index.get(key).cloned().ok_or(StoreError::KeyAbsent)?;
        let slot_num = header.index_position;

        // Give away R's data-region bytes: extend the preceding live record's
        // capacity if one exists, otherwise shrink the file if R was the
        // last record in data-pointer order.
        let prev = self
            .index
            .prev_by_pointer(header.data_pointer)
            .map(|(ptr, h)| (ptr, h.clone()));
        if let Some((prev_ptr, mut prev_header)) = prev {
            let prev_key = self
                .index
                .key_at_pointer(prev_ptr)
                .expect("prev_by_pointer returned a live pointer")
                .clone();
            prev_header.data_capacity += header.data_capacity;
            slot::write_slot(
                &mut self.ops,
                prev_header.index_position,
                self.max_key_len,
                &prev_key,
                &prev_header,
            )?;
            self.index.insert(prev_key, prev_header);
        } else {
            let file_len = self.ops.len()? as i64;
            if header.data_pointer + i64::from(header.data_capacity) == file_len {
                self.ops.set_len(header.data_pointer as u64)?;
            }
        }

        // Keep live slots the compact prefix 0..numRecords: unless R already
        // held the highest live slot, move that slot's record down into R's
        // now-vacated slot.
        let last_slot = self.num_records as u32 - 1;
        if slot_num != last_slot {
            let moved_key = self
                .index
                .key_at_slot(last_slot)
                .expect("last_slot is live")
                .clone();
            let mut moved_header = self
                .index
                .get(&moved_key)
                .expect("just looked up by slot")
                .clone();
            moved_header.index_position = slot_num;
            slot::write_slot(&mut self.ops, slot_num, self.max_key_len, &moved_key, &moved_header)?;
            self.index.insert(moved_key, moved_header);
        }

        // Commit: numRecords' decrement drops the vacated highest slot out
        // of the range recovery trusts.
        let new_num_records = self.num_records - 1;
        Header::write_num_records(&mut self.ops, new_num_records)?;
        self.num_records = new_num_records;
        self.index.remove(key);

        debug!(slot_num, "deleted");
        Ok(())
    }

    /// Reads the value stored under `key`. Fails with
    /// [`StoreError::KeyAbsent`] if absent, or [`StoreError::CorruptPayload`]
    /// if payload CRC checking is enabled and the checksum doesn't match.
    pub fn read(&mut self, key: &[u8]) -> Result<Vec<u8>, StoreError> {
        self.ensure_open()?;
        let header = self.index.get(key).cloned().ok_or(StoreError::KeyAbsent)?;
        let payload = record::read_payload(&mut self.ops, header.data_pointer, header.data_count, key)?;
        if self.payload_crc_enabled && crc32(&payload) != header.payload_crc32 {
            return Err(StoreError::CorruptPayload { key: key.to_vec() });
        }
        Ok(payload)
    }

    fn payload_crc(&self, value: &[u8]) -> u32 {
        if self.payload_crc_enabled {
            crc32(value)
        } else {
            0
        }
    }

    fn place(&mut self, placement: Placement, capacity: i64) -> Result<i64, StoreError> {
        match placement {
            Placement::Gap { data_pointer } => Ok(data_pointer),
            Placement::EndOfFile { data_pointer } => {
                self.ops.set_len((data_pointer + capacity) as u64)?;
                Ok(data_pointer)
            }
        }
    }

    fn ensure_free_slot(&mut self) -> Result<(), StoreError> {
        if (self.num_records as u32) < self.total_slots {
            return Ok(());
        }
        self.grow_index()
    }

    /// Grows the index region by one slot. Since the new slot occupies
    /// exactly the byte range immediately after the current index — i.e.
    /// the first bytes of the data region — any live record whose
    /// `dataPointer` falls inside that range is relocated to end of file
    /// first.
    fn grow_index(&mut self) -> Result<(), StoreError> {
        let slot_width = slot::slot_size(self.max_key_len) as i64;
        let new_data_start = self.data_start_ptr + slot_width;

        while let Some((ptr, _)) = self.index.first_by_pointer() {
            if ptr >= new_data_start {
                break;
            }
            self.relocate_to_end_of_file(ptr)?;
        }

        let new_slot_num = self.total_slots;
        // Prepare: a valid, empty slot sitting where the data region used to
        // start. Invisible until dataStartPtr below moves past it.
        slot::write_empty_slot(&mut self.ops, new_slot_num, self.max_key_len)?;
        // Commit: dataStartPtr's move brings the new slot into the index
        // region and past the data it used to occupy.
        Header::write_data_start_ptr(&mut self.ops, new_data_start)?;

        self.data_start_ptr = new_data_start;
        self.total_slots += 1;
        debug!(total_slots = self.total_slots, "grew index region");
        Ok(())
    }

    fn relocate_to_end_of_file(&mut self, old_pointer: i64) -> Result<(), StoreError> {
        let key = self
            .index
            .key_at_pointer(old_pointer)
            .expect("caller verified a live record at old_pointer")
            .clone();
        let header = self.index.get(&key).expect("just looked up by pointer").clone();

        let payload = record::read_payload(&mut self.ops, old_pointer, header.data_count, &key)?;
        let new_pointer = self.ops.len()? as i64;
        self.ops
            .set_len((new_pointer + i64::from(header.data_capacity)) as u64)?;

        // Prepare: copy to the new location, old copy still authoritative.
        record::write_payload(&mut self.ops, new_pointer, &payload)?;
        // Commit: the slot rewrite repoints dataPointer.
        slot::rewrite_data_pointer(
            &mut self.ops,
            header.index_position,
            self.max_key_len,
            &key,
            header.clone(),
            new_pointer,
        )?;

        let mut updated = header;
        updated.data_pointer = new_pointer;
        self.index.insert(key, updated);
        Ok(())
    }
}
