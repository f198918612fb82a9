// Timers (spec §4.5, §6). Four free-running 16-bit counters with
// mode-dependent thresholds, grounded 1:1 on
// `original_source/src/core/ee/timers.cpp`.

use crate::config::DEFAULT_HSYNC_CYCLES;
use crate::intc::{Interrupt, InterruptController};

const T0_COUNTER: u32 = 0x1000_0000;
const T0_CONTROL: u32 = 0x1000_0010;
const T1_CONTROL: u32 = 0x1000_0810;
const T2_CONTROL: u32 = 0x1000_1010;
const T3_CONTROL: u32 = 0x1000_1810;
const T3_COMPARE: u32 = 0x1000_1820;

#[derive(Clone, Copy, Default)]
struct Control {
    mode: u32,
    gate_enable: bool,
    gate_vblank: bool,
    gate_mode: u32,
    clear_on_reference: bool,
    enabled: bool,
    compare_int_enable: bool,
    overflow_int_enable: bool,
    compare_int: bool,
    overflow_int: bool,
}

#[derive(Clone, Copy, Default)]
struct Timer {
    counter: u32,
    compare: u16,
    clocks: i64,
    control: Control,
}

/// the EE's four independent timers, each incrementing its `counter` once
/// every `threshold(mode)` driver ticks.
pub struct Timers {
    timers: [Timer; 4],
    hsync_cycles: i64,
}

impl Default for Timers {
    fn default() -> Self {
        Timers::with_hsync_cycles(DEFAULT_HSYNC_CYCLES)
    }
}

impl Timers {
    pub fn with_hsync_cycles(hsync_cycles: u32) -> Self {
        Timers {
            timers: [Timer::default(); 4],
            hsync_cycles: hsync_cycles as i64,
        }
    }

    fn threshold(&self, mode: u32) -> i64 {
        match mode {
            0 => 2,
            3 => self.hsync_cycles,
            _ => 2,
        }
    }

    pub fn reset(&mut self) {
        self.timers = [Timer::default(); 4];
    }

    /// advances every enabled timer by one driver tick (spec §5: "one timer
    /// tick" per driver iteration).
    pub fn run(&mut self, intc: &mut impl InterruptController) {
        for i in 0..4 {
            if !self.timers[i].control.enabled {
                continue;
            }
            self.timers[i].clocks += 1;
            let limit = self.threshold(self.timers[i].control.mode);
            if self.timers[i].clocks >= limit {
                self.count_up(i, limit, intc);
            }
        }
    }

    fn count_up(&mut self, index: usize, cycles_per_count: i64, intc: &mut impl InterruptController) {
        self.timers[index].clocks -= cycles_per_count;
        self.timers[index].counter += 1;

        if self.timers[index].counter > 0xFFFF {
            log::warn!("timers: timer {} overflow", index);
            self.timers[index].counter = 0;
            if self.timers[index].control.overflow_int_enable {
                self.timers[index].control.overflow_int = true;
                intc.assert_irq(Interrupt::timer(index));
            }
        }
    }

    pub fn read32(&self, addr: u32) -> u32 {
        match addr {
            T0_COUNTER => self.timers[0].counter,
            _ => {
                log::warn!("timers: unrecognized read32 from ${:08x}", addr);
                0
            }
        }
    }

    pub fn write32(&mut self, addr: u32, value: u32) {
        match addr {
            T0_CONTROL => self.write_control(0, value),
            T1_CONTROL => self.write_control(1, value),
            T2_CONTROL => self.write_control(2, value),
            T3_CONTROL => self.write_control(3, value),
            T3_COMPARE => {
                log::debug!("timers: timer 3 compare ${:04x}", value & 0xFFFF);
                self.timers[3].compare = (value & 0xFFFF) as u16;
            }
            _ => log::warn!("timers: unrecognized write32 to ${:08x} of ${:08x}", addr, value),
        }
    }

    fn write_control(&mut self, index: usize, value: u32) {
        log::debug!("timers: write32 timer {} control ${:08x}", index, value);
        let t = &mut self.timers[index].control;
        t.mode = value & 0x3;
        t.gate_enable = value & (1 << 2) != 0;
        t.gate_vblank = value & (1 << 3) != 0;
        t.gate_mode = (value >> 4) & 0x3;
        t.clear_on_reference = value & (1 << 6) != 0;
        t.enabled = value & (1 << 7) != 0;
        t.compare_int_enable = value & (1 << 8) != 0;
        t.overflow_int_enable = value & (1 << 9) != 0;
        if value & (1 << 10) != 0 {
            t.compare_int = false;
        }
        if value & (1 << 11) != 0 {
            t.overflow_int = false;
        }
    }
}
