//! Memory Controller Unit Tests.
//!
//! Verifies SimpleController (fixed latency), DramController (row-buffer-aware
//! latency with CAS/RAS/precharge), and selection from configuration.

use csim_core::config::{MemoryConfig, MemoryController as ControllerKind};
use csim_core::soc::memory::controller::{
    self, DramController, MemoryController, SimpleController,
};

// ══════════════════════════════════════════════════════════
// 1. SimpleController
// ══════════════════════════════════════════════════════════

#[test]
fn simple_controller_is_address_independent() {
    let mut ctrl = SimpleController::new(10);
    assert_eq!(ctrl.access_latency(0x1000), 10);
    assert_eq!(ctrl.access_latency(0x2000), 10);
    assert_eq!(ctrl.access_latency(u64::MAX), 10);
}

// ══════════════════════════════════════════════════════════
// 2. DramController
// ══════════════════════════════════════════════════════════

#[test]
fn dram_cold_start_opens_row() {
    let mut ctrl = DramController::new(5, 10, 8);
    // No row open: t_ras + t_cas.
    assert_eq!(ctrl.access_latency(0x1000), 15);
}

#[test]
fn dram_row_buffer_hit() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x2000);
    // Rows are 2 KiB: 0x2000..0x2800.
    assert_eq!(ctrl.access_latency(0x2040), 5);
    assert_eq!(ctrl.access_latency(0x27C0), 5);
}

#[test]
fn dram_row_buffer_miss_precharges() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x1000);
    // Different row: t_pre + t_ras + t_cas.
    assert_eq!(ctrl.access_latency(0x2800), 23);
    // The new row is now open.
    assert_eq!(ctrl.access_latency(0x2840), 5);
}

#[test]
fn dram_alternating_rows_always_miss() {
    let mut ctrl = DramController::new(5, 10, 8);
    let _ = ctrl.access_latency(0x0000);
    for _ in 0..4 {
        assert_eq!(ctrl.access_latency(0x0800), 23);
        assert_eq!(ctrl.access_latency(0x0000), 23);
    }
}

// ══════════════════════════════════════════════════════════
// 3. Selection from configuration
// ══════════════════════════════════════════════════════════

#[test]
fn from_config_selects_simple() {
    let config = MemoryConfig {
        latency: 42,
        ..MemoryConfig::default()
    };
    let mut ctrl = controller::from_config(&config);
    assert_eq!(ctrl.access_latency(0), 42);
}

#[test]
fn from_config_selects_dram() {
    let config = MemoryConfig {
        controller: ControllerKind::Dram,
        t_cas: 3,
        t_ras: 4,
        t_pre: 5,
        ..MemoryConfig::default()
    };
    let mut ctrl = controller::from_config(&config);
    assert_eq!(ctrl.access_latency(0x0000), 7);
    assert_eq!(ctrl.access_latency(0x0040), 3);
    assert_eq!(ctrl.access_latency(0x1000), 12);
}
