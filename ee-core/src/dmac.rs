// EE-side DMA controller (spec §4.4, §6). Ten channels exist; only GIF,
// SIF0, SIF1 have handlers here, grounded 1:1 on
// `original_source/src/core/ee/dmac.cpp`.

use crate::bus::{Bus, GraphicsInterface, SubsystemInterface};
use crate::error::CoreError;
use crate::intc::InterruptController;

const CHANNEL_COUNT: usize = 10;
const GIF: usize = 2;
const SIF0: usize = 5;
const SIF1: usize = 6;

const GIF_CHCR: u32 = 0x1000_A000;
const GIF_MADR: u32 = 0x1000_A010;
const GIF_QWC: u32 = 0x1000_A020;
const GIF_TADR: u32 = 0x1000_A030;
const SIF0_CHCR: u32 = 0x1000_C000;
const SIF0_QWC: u32 = 0x1000_C020;
const SIF0_TADR: u32 = 0x1000_C030;
const SIF1_CHCR: u32 = 0x1000_C400;
const SIF1_QWC: u32 = 0x1000_C420;
const SIF1_TADR: u32 = 0x1000_C430;
const D_CTRL: u32 = 0x1000_E000;
const D_STAT: u32 = 0x1000_E010;

#[derive(Clone, Copy, Default)]
struct Channel {
    control: u32,
    address: u32,
    tag_address: u32,
    quadword_count: u16,
    tag_end: bool,
}

#[derive(Clone, Copy, Default)]
struct Control {
    master_enable: bool,
    cycle_stealing: bool,
    mem_drain_channel: u32,
    stall_source_channel: u32,
    stall_dest_channel: u32,
    release_cycle: u32,
}

#[derive(Clone, Copy, Default)]
struct InterruptStat {
    channel_stat: [bool; CHANNEL_COUNT],
    channel_mask: [bool; CHANNEL_COUNT],
    stall_stat: bool,
    mfifo_stat: bool,
    bus_stat: bool,
    stall_mask: bool,
    mfifo_mask: bool,
}

/// drives chained-descriptor transfers between main memory and the GIF/SIF
/// FIFOs, one quadword (or one tag) per `run` call.
pub struct Dmac {
    channels: [Channel; CHANNEL_COUNT],
    control: Control,
    master_disable: u32,
    interrupt_stat: InterruptStat,
}

impl Default for Dmac {
    fn default() -> Self {
        let mut d = Dmac {
            channels: [Channel::default(); CHANNEL_COUNT],
            control: Control::default(),
            master_disable: 0,
            interrupt_stat: InterruptStat::default(),
        };
        d.reset();
        d
    }
}

impl Dmac {
    pub fn reset(&mut self) {
        self.master_disable = 0x1201;
        self.control = Control::default();
        self.channels = [Channel::default(); CHANNEL_COUNT];
        self.interrupt_stat = InterruptStat::default();
    }

    /// services every channel with its start bit set, one quadword (or tag)
    /// each, per spec §5's "one DMAC quantum" driver contract.
    pub fn run(
        &mut self,
        bus: &mut impl Bus,
        gif: &mut impl GraphicsInterface,
        sif: &mut impl SubsystemInterface,
        intc: &mut impl InterruptController,
    ) -> Result<(), CoreError> {
        if !self.control.master_enable || self.master_disable & (1 << 16) != 0 {
            return Ok(());
        }
        for i in 0..CHANNEL_COUNT {
            if self.channels[i].control & 0x100 == 0 {
                continue;
            }
            match i {
                GIF => self.process_gif(bus, gif, intc)?,
                SIF0 => self.process_sif0(bus, sif, intc)?,
                SIF1 => self.process_sif1(bus, sif, intc)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn transfer_end(&mut self, index: usize, intc: &mut impl InterruptController) {
        log::debug!("dmac: transfer end on channel {}", index);
        self.channels[index].control &= !0x100;
        self.interrupt_stat.channel_stat[index] = true;
        self.int1_check(intc);
    }

    fn int1_check(&self, intc: &mut impl InterruptController) {
        let signal = (0..CHANNEL_COUNT)
            .any(|i| self.interrupt_stat.channel_stat[i] && self.interrupt_stat.channel_mask[i]);
        intc.set_int1_signal(signal);
    }

    fn process_gif(
        &mut self,
        bus: &mut impl Bus,
        gif: &mut impl GraphicsInterface,
        intc: &mut impl InterruptController,
    ) -> Result<(), CoreError> {
        if self.channels[GIF].quadword_count > 0 {
            let addr = self.channels[GIF].address;
            let quad = [bus.read64(addr), bus.read64(addr + 8)];
            gif.send_path3(quad);
            self.channels[GIF].address = addr.wrapping_add(16);
            self.channels[GIF].quadword_count -= 1;
        } else if self.channels[GIF].tag_end {
            self.transfer_end(GIF, intc);
        } else {
            self.handle_source_chain(GIF, bus)?;
        }
        Ok(())
    }

    fn process_sif0(
        &mut self,
        bus: &mut impl Bus,
        sif: &mut impl SubsystemInterface,
        intc: &mut impl InterruptController,
    ) -> Result<(), CoreError> {
        if self.channels[SIF0].quadword_count > 0 {
            if sif.get_sif0_size() >= 4 {
                let addr = self.channels[SIF0].address;
                for i in 0..4 {
                    let word = sif.read_sif0();
                    bus.write32(addr.wrapping_add(i * 4), word);
                }
                self.channels[SIF0].address = addr.wrapping_add(16);
                self.channels[SIF0].quadword_count -= 1;
            }
        } else if self.channels[SIF0].tag_end {
            self.transfer_end(SIF0, intc);
        } else if sif.get_sif0_size() >= 2 {
            let lo = sif.read_sif0() as u64;
            let hi = sif.read_sif0() as u64;
            let tag = lo | (hi << 32);

            self.channels[SIF0].quadword_count = (tag & 0xFFFF) as u16;
            self.channels[SIF0].address = (tag >> 32) as u32;
            self.channels[SIF0].tag_address = self.channels[SIF0].tag_address.wrapping_add(16);

            let mode = ((tag >> 28) & 0x7) as u8;
            let irq = tag & (1 << 31) != 0;
            let tie = self.channels[SIF0].control & (1 << 7) != 0;
            if mode == 7 || (irq && tie) {
                self.channels[SIF0].tag_end = true;
            }

            self.channels[SIF0].control &= 0xFFFF;
            self.channels[SIF0].control |= (tag as u32) & 0xFFFF_0000;
        }
        Ok(())
    }

    fn process_sif1<S: SubsystemInterface>(
        &mut self,
        bus: &mut impl Bus,
        sif: &mut S,
        intc: &mut impl InterruptController,
    ) -> Result<(), CoreError> {
        if self.channels[SIF1].quadword_count > 0 {
            if sif.get_sif1_size() <= S::MAX_FIFO_SIZE - 4 {
                let addr = self.channels[SIF1].address;
                let quad = [bus.read64(addr), bus.read64(addr + 8)];
                sif.write_sif1(quad);
                self.channels[SIF1].address = addr.wrapping_add(16);
                self.channels[SIF1].quadword_count -= 1;
            }
        } else if self.channels[SIF1].tag_end {
            self.transfer_end(SIF1, intc);
        } else {
            self.handle_source_chain(SIF1, bus)?;
        }
        Ok(())
    }

    fn handle_source_chain(&mut self, index: usize, bus: &mut impl Bus) -> Result<(), CoreError> {
        let tag_address = self.channels[index].tag_address;
        let tag = bus.read64(tag_address);
        log::debug!("dmac: channel {} source DMAtag ${:016x} at ${:08x}", index, tag, tag_address);

        self.channels[index].control &= 0xFFFF;
        self.channels[index].control |= (tag as u32) & 0xFFFF_0000;

        let quadword_count = (tag & 0xFFFF) as u16;
        let id = ((tag >> 28) & 0x7) as u8;
        let addr = ((tag >> 32) as u32) & 0x7FFF_FFF0;
        let irq_after_transfer = tag & (1 << 31) != 0;
        let tie = self.channels[index].control & (1 << 7) != 0;
        self.channels[index].quadword_count = quadword_count;

        match id {
            0 => {
                // refe
                self.channels[index].address = addr;
                self.channels[index].tag_address = tag_address.wrapping_add(16);
                self.channels[index].tag_end = true;
            }
            1 => {
                // cnt
                self.channels[index].address = tag_address.wrapping_add(16);
                self.channels[index].tag_address =
                    self.channels[index].address.wrapping_add(quadword_count as u32 * 16);
            }
            2 => {
                // next
                let prev_tag_address = tag_address;
                self.channels[index].tag_address = addr;
                self.channels[index].address = prev_tag_address.wrapping_add(16);
            }
            3 => {
                // ref
                self.channels[index].address = addr;
                self.channels[index].tag_address = tag_address.wrapping_add(16);
            }
            7 => {
                // end
                self.channels[index].address = tag_address.wrapping_add(16);
                self.channels[index].tag_end = true;
            }
            _ => return Err(CoreError::UnknownDmaTagId(index, id)),
        }

        if irq_after_transfer && tie {
            self.channels[index].tag_end = true;
        }
        Ok(())
    }

    fn start_dma(&mut self, index: usize) {
        let mode = (self.channels[index].control >> 2) & 0x3;
        log::debug!(
            "dmac: D{} started ctrl=${:08x} addr=${:08x} mode={}",
            index,
            self.channels[index].control,
            self.channels[index].address,
            mode
        );
        self.channels[index].tag_end = mode == 0;
    }

    pub fn read32(&self, addr: u32) -> u32 {
        match addr {
            GIF_CHCR => self.channels[GIF].control,
            SIF0_CHCR => self.channels[SIF0].control,
            SIF1_CHCR => self.channels[SIF1].control,
            0x1000_C420 => self.channels[SIF1].quadword_count as u32,
            0x1000_C430 => self.channels[SIF1].tag_address,
            D_CTRL => {
                (self.control.master_enable as u32)
                    | ((self.control.cycle_stealing as u32) << 1)
                    | (self.control.mem_drain_channel << 2)
                    | (self.control.stall_source_channel << 4)
                    | (self.control.stall_dest_channel << 6)
                    | (self.control.release_cycle << 8)
            }
            D_STAT => {
                let mut reg = 0u32;
                for i in 0..CHANNEL_COUNT {
                    reg |= (self.interrupt_stat.channel_stat[i] as u32) << i;
                    reg |= (self.interrupt_stat.channel_mask[i] as u32) << (i + 16);
                }
                reg |= (self.interrupt_stat.stall_stat as u32) << 13;
                reg |= (self.interrupt_stat.mfifo_stat as u32) << 14;
                reg |= (self.interrupt_stat.bus_stat as u32) << 15;
                reg |= (self.interrupt_stat.stall_mask as u32) << 29;
                reg |= (self.interrupt_stat.mfifo_mask as u32) << 30;
                reg
            }
            _ => {
                log::warn!("dmac: unrecognized read32 from ${:08x}", addr);
                0
            }
        }
    }

    pub fn write32(&mut self, addr: u32, value: u32, intc: &mut impl InterruptController) {
        match addr {
            GIF_CHCR => {
                self.channels[GIF].control = value;
                if value & 0x100 != 0 {
                    self.start_dma(GIF);
                }
            }
            GIF_MADR => self.channels[GIF].address = value & !0xF,
            GIF_QWC => self.channels[GIF].quadword_count = (value & 0xFFFF) as u16,
            GIF_TADR => self.channels[GIF].tag_address = value & !0xF,
            SIF0_CHCR => {
                self.channels[SIF0].control = value;
                if value & 0x100 != 0 {
                    self.start_dma(SIF0);
                }
            }
            SIF0_QWC => self.channels[SIF0].quadword_count = (value & 0xFFFF) as u16,
            SIF0_TADR => self.channels[SIF0].tag_address = value & !0xF,
            SIF1_CHCR => {
                self.channels[SIF1].control = value;
                if value & 0x100 != 0 {
                    self.start_dma(SIF1);
                }
            }
            0x1000_C420 => self.channels[SIF1].quadword_count = (value & 0xFFFF) as u16,
            0x1000_C430 => self.channels[SIF1].tag_address = value & !0xF,
            D_CTRL => {
                log::debug!("dmac: write32 D_CTRL ${:08x}", value);
                self.control.master_enable = value & 0x1 != 0;
                self.control.cycle_stealing = value & 0x2 != 0;
                self.control.mem_drain_channel = (value >> 2) & 0x3;
                self.control.stall_source_channel = (value >> 4) & 0x3;
                self.control.stall_dest_channel = (value >> 6) & 0x3;
                self.control.release_cycle = (value >> 8) & 0x7;
            }
            D_STAT => {
                log::debug!("dmac: write32 D_STAT ${:08x}", value);
                for i in 0..CHANNEL_COUNT {
                    if value & (1 << i) != 0 {
                        self.interrupt_stat.channel_stat[i] = false;
                    }
                    if value & (1 << (i + 16)) != 0 {
                        self.interrupt_stat.channel_mask[i] = !self.interrupt_stat.channel_mask[i];
                    }
                }
                if value & (1 << 13) != 0 {
                    self.interrupt_stat.stall_stat = false;
                }
                if value & (1 << 14) != 0 {
                    self.interrupt_stat.mfifo_stat = false;
                }
                if value & (1 << 15) != 0 {
                    self.interrupt_stat.bus_stat = false;
                }
                if value & (1 << 29) != 0 {
                    self.interrupt_stat.stall_mask = !self.interrupt_stat.stall_mask;
                }
                if value & (1 << 30) != 0 {
                    self.interrupt_stat.mfifo_mask = !self.interrupt_stat.mfifo_mask;
                }
                self.int1_check(intc);
            }
            _ => log::warn!("dmac: unrecognized write32 of ${:08x} to ${:08x}", value, addr),
        }
    }
}

#[cfg(test)]
#[path = "./dmac_test.rs"]
mod dmac_test;
