// Wires the interpreter, timers and DMAC to a host-supplied bus and peer
// collaborators, and drives them in the cooperative round spec §5 describes:
// one interpreter instruction, one timer tick, one DMAC quantum per `step`.

use crate::bus::{Bus, GraphicsInterface, SubsystemInterface};
use crate::config::CoreConfig;
use crate::cpu::Cpu;
use crate::dmac::Dmac;
use crate::error::CoreError;
use crate::intc::InterruptController;
use crate::timers::Timers;

pub struct Machine {
    pub cpu: Cpu,
    pub dmac: Dmac,
    pub timers: Timers,
    boot_pc: u32,
}

impl Default for Machine {
    fn default() -> Self {
        Machine::new(&CoreConfig::default())
    }
}

impl Machine {
    pub fn new(config: &CoreConfig) -> Self {
        let mut m = Machine {
            cpu: Cpu::default(),
            dmac: Dmac::default(),
            timers: Timers::with_hsync_cycles(config.hsync_cycles),
            boot_pc: config.boot_pc,
        };
        m.reset();
        m
    }

    /// resets every subsystem; `master_disable` starts DMAC-inhibited per
    /// spec §3's hardware-observed `0x1201` initial value.
    pub fn reset(&mut self) {
        self.cpu.reset(self.boot_pc);
        self.dmac.reset();
        self.timers.reset();
    }

    /// one cooperative driver round: advance the interpreter by one
    /// instruction, tick the timers, give the DMAC one quantum of work.
    pub fn step(
        &mut self,
        bus: &mut impl Bus,
        gif: &mut impl GraphicsInterface,
        sif: &mut impl SubsystemInterface,
        intc: &mut impl InterruptController,
    ) -> Result<(), CoreError> {
        self.cpu.step(bus);
        self.timers.run(intc);
        self.dmac.run(bus, gif, sif, intc)
    }

    /// MMIO dispatch for the addresses spec §6 assigns to timers and DMAC.
    /// Anything else is a logged diagnostic, not an error (spec §7).
    pub fn read32(&self, addr: u32) -> u32 {
        match addr {
            0x1000_0000..=0x1000_1FFF => self.timers.read32(addr),
            0x1000_A000..=0x1000_A0FF | 0x1000_C000..=0x1000_C4FF | 0x1000_E000..=0x1000_E0FF => {
                self.dmac.read32(addr)
            }
            _ => {
                log::warn!("machine: unrecognized MMIO read32 from ${:08x}", addr);
                0
            }
        }
    }

    pub fn write32(&mut self, addr: u32, value: u32, intc: &mut impl InterruptController) {
        match addr {
            0x1000_0000..=0x1000_1FFF => self.timers.write32(addr, value),
            0x1000_A000..=0x1000_A0FF | 0x1000_C000..=0x1000_C4FF | 0x1000_E000..=0x1000_E0FF => {
                self.dmac.write32(addr, value, intc)
            }
            _ => log::warn!("machine: unrecognized MMIO write32 of ${:08x} to ${:08x}", value, addr),
        }
    }
}

#[cfg(test)]
#[path = "./machine_test.rs"]
mod machine_test;
