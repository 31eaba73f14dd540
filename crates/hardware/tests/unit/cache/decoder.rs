//! Address Decoder Unit Tests.
//!
//! Verifies field extraction, address reconstruction, and the geometry
//! preconditions enforced at construction.

use csim_core::cache::decoder::{AddressDecoder, CacheGeometry};
use proptest::prelude::*;
use rstest::rstest;

use crate::common::harness::SMALL;

fn geometry(size_bytes: usize, line_bytes: usize, ways: usize, addr_bits: u32) -> CacheGeometry {
    CacheGeometry {
        size_bytes,
        line_bytes,
        ways,
        addr_bits,
    }
}

// ══════════════════════════════════════════════════════════
// 1. Field widths
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::small(SMALL, 3, 1, 4)]
#[case::default_config(geometry(1024, 64, 4, 32), 6, 2, 24)]
#[case::direct_mapped(geometry(4096, 64, 1, 32), 6, 6, 20)]
#[case::fully_associative(geometry(512, 64, 8, 16), 6, 0, 10)]
#[case::full_width(geometry(1 << 15, 64, 8, 64), 6, 6, 52)]
fn field_widths(
    #[case] geometry: CacheGeometry,
    #[case] line_bits: u32,
    #[case] index_bits: u32,
    #[case] tag_bits: u32,
) {
    let decoder = AddressDecoder::new(&geometry);
    assert_eq!(decoder.line_bits(), line_bits);
    assert_eq!(decoder.index_bits(), index_bits);
    assert_eq!(decoder.tag_bits(), tag_bits);
    assert_eq!(line_bits + index_bits + tag_bits, geometry.addr_bits);
    assert_eq!(decoder.sets(), geometry.sets());
}

// ══════════════════════════════════════════════════════════
// 2. Field extraction
// ══════════════════════════════════════════════════════════

/// 0xB5 = 1011_0101: tag 1011, index 0, offset 101.
#[test]
fn small_geometry_fields() {
    let decoder = AddressDecoder::new(&SMALL);
    assert_eq!(decoder.tag(0xB5), 0xB);
    assert_eq!(decoder.index(0xB5), 0);
    assert_eq!(decoder.offset(0xB5), 5);

    assert_eq!(decoder.tag(0x0F), 0);
    assert_eq!(decoder.index(0x0F), 1);
    assert_eq!(decoder.offset(0x0F), 7);
}

#[test]
fn block_address_clears_offset() {
    let decoder = AddressDecoder::new(&SMALL);
    assert_eq!(decoder.block_address(0x17), 0x10);
    assert_eq!(decoder.block_address(0x10), 0x10);
}

#[test]
fn line_index_is_set_major() {
    let decoder = AddressDecoder::new(&SMALL);
    assert_eq!(decoder.line_index(0, 0), 0);
    assert_eq!(decoder.line_index(0, 1), 1);
    assert_eq!(decoder.line_index(1, 0), 2);
    assert_eq!(decoder.line_index(1, 1), 3);
}

#[test]
fn in_range_respects_address_width() {
    let decoder = AddressDecoder::new(&SMALL);
    assert!(decoder.in_range(0xFF));
    assert!(!decoder.in_range(0x100));

    let wide = AddressDecoder::new(&geometry(1 << 15, 64, 8, 64));
    assert!(wide.in_range(u64::MAX));
}

/// With a single set and no tag bits beyond the offset, the tag is the whole
/// block number.
#[test]
fn single_set_uses_whole_block_number_as_tag() {
    let decoder = AddressDecoder::new(&geometry(64, 8, 8, 8));
    assert_eq!(decoder.sets(), 1);
    assert_eq!(decoder.index(0xF8), 0);
    assert_eq!(decoder.tag(0xF8), 0x1F);
}

// ══════════════════════════════════════════════════════════
// 3. Round trip
// ══════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn compose_inverts_decomposition_small(addr in 0u64..0x100) {
        let decoder = AddressDecoder::new(&SMALL);
        let rebuilt = decoder.compose(decoder.tag(addr), decoder.index(addr), decoder.offset(addr));
        prop_assert_eq!(rebuilt, addr);
    }

    #[test]
    fn compose_inverts_decomposition_32bit(addr in 0u64..(1 << 32)) {
        let decoder = AddressDecoder::new(&geometry(1024, 64, 4, 32));
        let rebuilt = decoder.compose(decoder.tag(addr), decoder.index(addr), decoder.offset(addr));
        prop_assert_eq!(rebuilt, addr);
    }

    #[test]
    fn compose_inverts_decomposition_64bit(addr in any::<u64>()) {
        let decoder = AddressDecoder::new(&geometry(1 << 15, 64, 8, 64));
        let rebuilt = decoder.compose(decoder.tag(addr), decoder.index(addr), decoder.offset(addr));
        prop_assert_eq!(rebuilt, addr);
    }

    /// Writebacks rebuild the block address from the stored tag and set.
    #[test]
    fn compose_with_zero_offset_is_block_address(addr in 0u64..(1 << 32)) {
        let decoder = AddressDecoder::new(&geometry(1024, 64, 4, 32));
        prop_assert_eq!(
            decoder.compose(decoder.tag(addr), decoder.index(addr), 0),
            decoder.block_address(addr)
        );
    }
}

// ══════════════════════════════════════════════════════════
// 4. Construction preconditions
// ══════════════════════════════════════════════════════════

#[test]
#[should_panic(expected = "at least one way")]
fn zero_ways_panics() {
    let _ = AddressDecoder::new(&geometry(32, 8, 0, 8));
}

#[test]
#[should_panic(expected = "not a power of two")]
fn non_power_of_two_line_panics() {
    let _ = AddressDecoder::new(&geometry(48, 12, 2, 8));
}

#[test]
#[should_panic(expected = "whole number")]
fn partial_line_capacity_panics() {
    let _ = AddressDecoder::new(&geometry(36, 8, 2, 8));
}

#[test]
#[should_panic(expected = "cannot be realized")]
fn ways_not_dividing_lines_panics() {
    let _ = AddressDecoder::new(&geometry(32, 8, 3, 8));
}

#[test]
#[should_panic(expected = "sets is not a power of two")]
fn non_power_of_two_sets_panics() {
    let _ = AddressDecoder::new(&geometry(48, 8, 2, 8));
}

#[test]
#[should_panic(expected = "cannot hold")]
fn narrow_address_panics() {
    let _ = AddressDecoder::new(&geometry(1024, 64, 1, 8));
}
