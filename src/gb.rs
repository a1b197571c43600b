//! Top-level aggregate wiring the CPU, MMU, PPU, timer, pad, and
//! interrupt controller into one owned instance and driving the
//! `step` loop the host calls into.

use crate::{
    cartridge::{Cartridge, CartridgeBus},
    error::Error,
    host::{ErrorSink, LcdHook},
    mmu::Mmu,
    pad::PadKey,
};
pub use crate::cpu::Cpu;

/// Cross-cutting feature toggles an embedding host can flip without
/// reaching into `Cpu`/`Mmu` internals. Reduced, relative to the
/// teacher's `GameBoyConfig`, to what a DMG/MBC1-only core actually
/// has an axis for: there is no mode/speed/APU/DMA-enable knob here.
#[derive(Clone, Copy, Debug, Default)]
pub struct GbConfig {
    /// Gates the extra `debug_assert!`-style invariant checks behind
    /// the `pedantic` Cargo feature (see `macros.rs`).
    pub pedantic: bool,
}

/// One Sharp LR35902 system: CPU, MMU (and, through it, PPU/timer/pad/
/// interrupt controller), and the cartridge's bank-switching state.
///
/// Single-owner, single-threaded: every subsystem is reached through
/// one `&mut GameBoy`, matching the core's single scheduling quantum
/// (one `step()` per call, no suspension mid-step).
pub struct GameBoy {
    cpu: Cpu,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, bus: Box<dyn CartridgeBus>) -> Self {
        let mmu = Mmu::new(cartridge, bus);
        Self { cpu: Cpu::new(mmu) }
    }

    /// Applies a `GbConfig`, e.g. toggling `pedantic` checks on an
    /// already-constructed instance.
    pub fn set_config(&mut self, config: GbConfig) {
        self.cpu.set_pedantic(config.pedantic);
    }

    /// Resets all architectural and hardware state to the documented
    /// post-boot-ROM values. No boot ROM is emulated; execution
    /// resumes at PC=0x0100.
    pub fn reset(&mut self) {
        self.cpu.reset();
    }

    /// Executes exactly one instruction, servicing at most one pending
    /// interrupt first. On a core-raised error the host's `ErrorSink`
    /// is notified and the core ceases — the caller is expected to
    /// stop calling `step` after an `Err`.
    pub fn step(&mut self, lcd: &mut dyn LcdHook, errors: &mut dyn ErrorSink) -> Result<u8, Error> {
        match self.cpu.step(lcd) {
            Ok(cycles) => Ok(cycles),
            Err(err) => {
                errors.on_error(&err);
                Err(err)
            }
        }
    }

    /// Consumes the frame-complete edge latch: true exactly once per
    /// frame, on the step during which LY transitions to 144.
    pub fn frame_complete(&mut self) -> bool {
        self.cpu.mmu.consume_frame_complete()
    }

    pub fn key_press(&mut self, key: PadKey) {
        self.cpu.mmu.pad.key_press(key);
    }

    pub fn key_lift(&mut self, key: PadKey) {
        self.cpu.mmu.pad.key_lift(key);
    }

    #[inline(always)]
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    #[inline(always)]
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    #[inline(always)]
    pub fn mmu(&self) -> &Mmu {
        &self.cpu.mmu
    }

    #[inline(always)]
    pub fn mmu_mut(&mut self) -> &mut Mmu {
        &mut self.cpu.mmu
    }
}
