//! Implementation of the core CPU ([Sharp LR35902](https://en.wikipedia.org/wiki/Game_Boy)) logic
//! for the Game Boy. Does not include the instruction set implementation itself, only the
//! register file, flag accessors, stack helpers and the fetch-decode-execute loop; see `inst.rs`.

use crate::{
    consts::{BOOT_AF, BOOT_BC, BOOT_DE, BOOT_HL, BOOT_PC, BOOT_SP, FLAG_CARRY, FLAG_HALF_CARRY, FLAG_SUB, FLAG_ZERO},
    debug_assert_pedantic, debugln,
    error::Error,
    host::LcdHook,
    inst::{decode_execute, PREFIX},
    mmu::Mmu,
};

pub struct Cpu {
    pub a: u8,
    f: u8,
    pub b: u8,
    pub c: u8,
    pub d: u8,
    pub e: u8,
    pub h: u8,
    pub l: u8,
    pub sp: u16,
    pub pc: u16,

    ime: bool,
    halted: bool,

    /// Previous PC, kept for `Display`/trace output.
    ppc: u16,
    /// Extra cycles added by a taken conditional branch in the
    /// instruction that just ran; reset before every fetch.
    extra_cycles: u8,
    /// Set by the decode step when the fetched opcode has no defined
    /// behavior; consumed by `step()` to produce an `InvalidOpcode`.
    invalid_opcode: Option<u16>,

    pub mmu: Mmu,

    /// Total machine cycles executed, wrapping; diagnostic only.
    cycles: u64,

    /// Mnemonic of the instruction executed by the last `step()`,
    /// kept for the `cpulog`-gated trace `Display` impl below.
    last_mnemonic: &'static str,

    /// Gates extra `debug_assert!`-style invariant checks (register
    /// pair / flag-nibble consistency) when the `pedantic` feature is
    /// enabled. Plain field rather than a cargo-feature-only path so a
    /// host can flip it per-instance instead of at compile time.
    pedantic: bool,
}

impl Cpu {
    pub fn new(mmu: Mmu) -> Self {
        let mut cpu = Self {
            a: 0,
            f: 0,
            b: 0,
            c: 0,
            d: 0,
            e: 0,
            h: 0,
            l: 0,
            sp: 0,
            pc: 0,
            ime: false,
            halted: false,
            ppc: 0,
            extra_cycles: 0,
            invalid_opcode: None,
            mmu,
            cycles: 0,
            last_mnemonic: "NOP",
            pedantic: false,
        };
        cpu.reset();
        cpu
    }

    /// Enables or disables the extra invariant checks gated by
    /// `debug_assert_pedantic!` (see `macros.rs`). Has no effect
    /// unless the `pedantic` feature is also compiled in.
    pub fn set_pedantic(&mut self, value: bool) {
        self.pedantic = value;
    }

    #[inline(always)]
    pub fn pedantic(&self) -> bool {
        self.pedantic
    }

    /// Resets architectural state to the documented post-boot-ROM
    /// values; no boot ROM is emulated, execution starts at 0x0100.
    pub fn reset(&mut self) {
        self.set_af(BOOT_AF);
        self.set_bc(BOOT_BC);
        self.set_de(BOOT_DE);
        self.set_hl(BOOT_HL);
        self.sp = BOOT_SP;
        self.pc = BOOT_PC;
        self.ime = false;
        self.halted = false;
        self.ppc = BOOT_PC;
        self.extra_cycles = 0;
        self.invalid_opcode = None;
        self.cycles = 0;
        self.mmu.reset();
    }

    /// Executes exactly one instruction (servicing at most one
    /// pending interrupt first) and returns the number of machine
    /// cycles consumed.
    pub fn step(&mut self, lcd: &mut dyn LcdHook) -> Result<u8, Error> {
        let if_reg = self.mmu.if_reg();
        if let Some((mask, vector)) = self.mmu.interrupts.service(if_reg) {
            self.halted = false;
            if self.ime {
                self.ime = false;
                self.mmu.clear_if_bit(mask);
                let pc = self.pc;
                self.push_word(pc);
                self.pc = vector;
                let cycles = 20;
                self.mmu.tick(cycles, lcd);
                self.cycles = self.cycles.wrapping_add(cycles as u64);
                return Ok(cycles);
            }
        }

        if self.halted {
            let cycles = 4;
            self.mmu.tick(cycles, lcd);
            self.cycles = self.cycles.wrapping_add(cycles as u64);
            return Ok(cycles);
        }

        self.ppc = self.pc;
        self.extra_cycles = 0;
        self.invalid_opcode = None;

        let opcode = self.read_u8();
        let (base_cycles, name) = decode_execute(self, opcode);
        self.last_mnemonic = name;

        if let Some(addr) = self.invalid_opcode.take() {
            return Err(Error::InvalidOpcode(addr));
        }

        debug_assert_pedantic!(self, self.f & 0x0f == 0, "low nibble of F must stay zero");

        let cycles = base_cycles.wrapping_add(self.extra_cycles);
        debugln!("[0x{:04x}] opcode=0x{:02x} ({} cycles)", self.ppc, opcode, cycles);
        #[cfg(feature = "cpulog")]
        println!("{}", self);
        self.mmu.tick(cycles, lcd);
        self.cycles = self.cycles.wrapping_add(cycles as u64);
        Ok(cycles)
    }

    pub(crate) fn mark_invalid_opcode(&mut self) {
        self.invalid_opcode = Some(self.ppc);
    }

    pub(crate) fn add_branch_penalty(&mut self, cycles: u8) {
        self.extra_cycles = self.extra_cycles.wrapping_add(cycles);
    }

    // -- operand fetch -----------------------------------------------

    pub(crate) fn read_u8(&mut self) -> u8 {
        let value = self.mmu.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(crate) fn read_u16(&mut self) -> u16 {
        let lo = self.read_u8() as u16;
        let hi = self.read_u8() as u16;
        (hi << 8) | lo
    }

    // -- stack ---------------------------------------------------------

    pub(crate) fn push_byte(&mut self, value: u8) {
        self.sp = self.sp.wrapping_sub(1);
        self.mmu.write(self.sp, value);
    }

    pub(crate) fn pop_byte(&mut self) -> u8 {
        let value = self.mmu.read(self.sp);
        self.sp = self.sp.wrapping_add(1);
        value
    }

    pub(crate) fn push_word(&mut self, value: u16) {
        self.push_byte((value >> 8) as u8);
        self.push_byte(value as u8);
    }

    pub(crate) fn pop_word(&mut self) -> u16 {
        let lo = self.pop_byte() as u16;
        let hi = self.pop_byte() as u16;
        (hi << 8) | lo
    }

    // -- register pairs --------------------------------------------------

    #[inline(always)]
    pub fn af(&self) -> u16 {
        ((self.a as u16) << 8) | self.f as u16
    }

    #[inline(always)]
    pub fn set_af(&mut self, value: u16) {
        self.a = (value >> 8) as u8;
        self.set_f(value as u8);
    }

    #[inline(always)]
    pub fn bc(&self) -> u16 {
        ((self.b as u16) << 8) | self.c as u16
    }

    #[inline(always)]
    pub fn set_bc(&mut self, value: u16) {
        self.b = (value >> 8) as u8;
        self.c = value as u8;
    }

    #[inline(always)]
    pub fn de(&self) -> u16 {
        ((self.d as u16) << 8) | self.e as u16
    }

    #[inline(always)]
    pub fn set_de(&mut self, value: u16) {
        self.d = (value >> 8) as u8;
        self.e = value as u8;
    }

    #[inline(always)]
    pub fn hl(&self) -> u16 {
        ((self.h as u16) << 8) | self.l as u16
    }

    #[inline(always)]
    pub fn set_hl(&mut self, value: u16) {
        self.h = (value >> 8) as u8;
        self.l = value as u8;
    }

    // -- flags -----------------------------------------------------------

    #[inline(always)]
    pub fn f(&self) -> u8 {
        self.f
    }

    #[inline(always)]
    pub fn set_f(&mut self, value: u8) {
        self.f = value & 0xf0;
    }

    #[inline(always)]
    pub fn zero(&self) -> bool {
        self.f & FLAG_ZERO != 0
    }

    #[inline(always)]
    pub fn set_zero(&mut self, value: bool) {
        if value {
            self.f |= FLAG_ZERO;
        } else {
            self.f &= !FLAG_ZERO;
        }
    }

    #[inline(always)]
    pub fn sub(&self) -> bool {
        self.f & FLAG_SUB != 0
    }

    #[inline(always)]
    pub fn set_sub(&mut self, value: bool) {
        if value {
            self.f |= FLAG_SUB;
        } else {
            self.f &= !FLAG_SUB;
        }
    }

    #[inline(always)]
    pub fn half_carry(&self) -> bool {
        self.f & FLAG_HALF_CARRY != 0
    }

    #[inline(always)]
    pub fn set_half_carry(&mut self, value: bool) {
        if value {
            self.f |= FLAG_HALF_CARRY;
        } else {
            self.f &= !FLAG_HALF_CARRY;
        }
    }

    #[inline(always)]
    pub fn carry(&self) -> bool {
        self.f & FLAG_CARRY != 0
    }

    #[inline(always)]
    pub fn set_carry(&mut self, value: bool) {
        if value {
            self.f |= FLAG_CARRY;
        } else {
            self.f &= !FLAG_CARRY;
        }
    }

    // -- control ------------------------------------------------------

    #[inline(always)]
    pub fn ime(&self) -> bool {
        self.ime
    }

    #[inline(always)]
    pub fn set_ime(&mut self, value: bool) {
        self.ime = value;
    }

    #[inline(always)]
    pub fn halted(&self) -> bool {
        self.halted
    }

    #[inline(always)]
    pub fn set_halted(&mut self, value: bool) {
        self.halted = value;
    }

    /// HALT: the outer step loop keeps calling `step`, but no further
    /// instruction side effects occur until an interrupt is pending.
    #[inline(always)]
    pub fn halt(&mut self) {
        self.halted = true;
    }

    /// STOP is treated identically to HALT: no low-power/speed switch
    /// modeling, no button-wake edge case.
    #[inline(always)]
    pub fn stop(&mut self) {
        self.halted = true;
    }

    #[inline(always)]
    pub fn enable_int(&mut self) {
        self.ime = true;
    }

    #[inline(always)]
    pub fn disable_int(&mut self) {
        self.ime = false;
    }

    #[inline(always)]
    pub fn ppc(&self) -> u16 {
        self.ppc
    }

    #[inline(always)]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

pub const CB_PREFIX: u8 = PREFIX;

#[cfg(feature = "cpulog")]
impl std::fmt::Display for Cpu {
    /// One-line instruction trace: `[0xPPPP] MNEMONIC (n cycles) [registers]`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[0x{:04x}] {} ({} cycles) [a={:02x} f={:02x} bc={:04x} de={:04x} hl={:04x} sp={:04x}]",
            self.ppc,
            self.last_mnemonic,
            self.extra_cycles,
            self.a,
            self.f,
            self.bc(),
            self.de(),
            self.hl(),
            self.sp,
        )
    }
}
