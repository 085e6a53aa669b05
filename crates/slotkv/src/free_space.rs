//! Free-space derivation over the data region.
//!
//! There is no on-disk free list: gaps are derived on demand by walking live
//! records in `dataPointer` order and looking at the slack between one
//! record's occupied bytes (`dataCount`'s prefix plus any unused tail of its
//! `dataCapacity`) and the next record's `dataPointer`.

use crate::mem_index::MemIndex;
use crate::slot::RecordHeader;

/// A candidate location to place `needed` bytes of record capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A gap between two live records (or before the first / after the
    /// last), wide enough to hold `needed` bytes plus its own length prefix.
    Gap { data_pointer: i64 },
    /// No existing gap is wide enough; the record must be appended past the
    /// current end of the data region.
    EndOfFile { data_pointer: i64 },
}

const LEN_PREFIX_SIZE: i64 = 4;

fn record_span(header: &RecordHeader) -> i64 {
    i64::from(header.data_capacity)
}

/// Finds the lowest-`dataPointer` gap that can hold `needed` bytes of
/// payload (plus its length prefix), ties broken toward the earliest offset.
///
/// `data_start` is the first byte of the data region (`Header.dataStartPtr`);
/// `file_len` is the current file length, i.e. the implicit end-of-file gap.
pub fn find_free_gap(index: &MemIndex, needed: i64, data_start: i64, file_len: i64) -> Placement {
    let required = needed + LEN_PREFIX_SIZE;

    let Some((first_ptr, _)) = index.first_by_pointer() else {
        return Placement::Gap {
            data_pointer: data_start,
        };
    };

    if first_ptr - data_start >= required {
        return Placement::Gap {
            data_pointer: data_start,
        };
    }

    let mut cursor = first_ptr;
    loop {
        let header = index.get_at_pointer(cursor).expect("cursor tracks a live record");
        let occupied_end = cursor + record_span(header);
        match index.next_by_pointer(cursor) {
            Some((next_ptr, _)) => {
                if next_ptr - occupied_end >= required {
                    return Placement::Gap {
                        data_pointer: occupied_end,
                    };
                }
                cursor = next_ptr;
            }
            None => {
                if file_len - occupied_end >= required {
                    return Placement::Gap {
                        data_pointer: occupied_end,
                    };
                }
                return Placement::EndOfFile {
                    data_pointer: occupied_end,
                };
            }
        }
    }
}

/// Bytes of capacity still unused at the tail of `header` beyond its current
/// payload — the room available to grow a record in place without moving it.
pub fn in_place_slack(header: &RecordHeader) -> i64 {
    i64::from(header.data_capacity) - LEN_PREFIX_SIZE - i64::from(header.data_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::RecordHeader;

    fn header(ptr: i64, capacity: i32, count: i32, slot: u32) -> RecordHeader {
        RecordHeader {
            data_pointer: ptr,
            data_capacity: capacity,
            data_count: count,
            payload_crc32: 0,
            index_position: slot,
        }
    }

    #[test]
    fn empty_index_places_at_data_start() {
        let index = MemIndex::new();
        let placement = find_free_gap(&index, 10, 100, 100);
        assert_eq!(placement, Placement::Gap { data_pointer: 100 });
    }

    #[test]
    fn gap_before_first_record_is_used_when_wide_enough() {
        let mut index = MemIndex::new();
        index.insert(b"a".to_vec(), header(120, 20, 5, 0));
        // [100, 120) is a 20-byte gap; needed=10 + prefix(4) = 14, fits.
        let placement = find_free_gap(&index, 10, 100, 200);
        assert_eq!(placement, Placement::Gap { data_pointer: 100 });
    }

    #[test]
    fn gap_between_records_is_found() {
        let mut index = MemIndex::new();
        index.insert(b"a".to_vec(), header(100, 16, 4, 0));
        index.insert(b"b".to_vec(), header(150, 16, 4, 1));
        // a occupies [100,116); gap [116,150) is 34 bytes, room for needed=20+4.
        let placement = find_free_gap(&index, 20, 100, 200);
        assert_eq!(placement, Placement::Gap { data_pointer: 116 });
    }

    #[test]
    fn falls_back_to_end_of_file_when_no_gap_fits() {
        let mut index = MemIndex::new();
        index.insert(b"a".to_vec(), header(100, 16, 4, 0));
        let placement = find_free_gap(&index, 1000, 100, 116);
        assert_eq!(placement, Placement::EndOfFile { data_pointer: 116 });
    }

    #[test]
    fn in_place_slack_accounts_for_length_prefix() {
        let h = header(100, 32, 10, 0);
        assert_eq!(in_place_slack(&h), 32 - 4 - 10);
    }
}
