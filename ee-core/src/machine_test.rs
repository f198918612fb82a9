use super::*;
use crate::bus::FlatBus;
use crate::intc::RecordingIntc;

#[derive(Default)]
struct NullGif;
impl GraphicsInterface for NullGif {
    fn send_path3(&mut self, _quad: [u64; 2]) {}
}

#[derive(Default)]
struct NullSif;
impl SubsystemInterface for NullSif {
    const MAX_FIFO_SIZE: u32 = 16;
    fn read_sif0(&mut self) -> u32 {
        0
    }
    fn write_sif1(&mut self, _quad: [u64; 2]) {}
    fn get_sif0_size(&self) -> u32 {
        0
    }
    fn get_sif1_size(&self) -> u32 {
        0
    }
}

#[test]
fn reset_sets_cpu_pc_to_configured_boot_address() {
    let cfg = CoreConfig {
        boot_pc: 0x1234_0000,
        ..CoreConfig::default()
    };
    let machine = Machine::new(&cfg);
    assert_eq!(machine.cpu.pc(), 0x1234_0000);
}

#[test]
fn step_advances_cpu_timers_and_dmac_together() {
    let cfg = CoreConfig::default();
    let mut machine = Machine::new(&cfg);
    let mut bus = FlatBus::new(0x10000);
    let mut gif = NullGif::default();
    let mut sif = NullSif::default();
    let mut intc = RecordingIntc::default();

    let start_pc = machine.cpu.pc();
    machine.step(&mut bus, &mut gif, &mut sif, &mut intc).unwrap();
    assert_eq!(machine.cpu.pc(), start_pc.wrapping_add(4));
}

#[test]
fn mmio_read_write_routes_to_timers_and_dmac() {
    let mut machine = Machine::default();
    let mut intc = RecordingIntc::default();
    machine.write32(0x1000_0010, 1 << 7, &mut intc); // T0 control, enabled
    assert_eq!(machine.read32(0x1000_0000), 0); // T0 counter starts at 0

    machine.write32(0x1000_E000, 0x1, &mut intc); // D_CTRL master_enable
    assert_eq!(machine.read32(0x1000_E000) & 0x1, 1);
}

#[test]
fn unrecognized_mmio_is_diagnostic_not_fatal() {
    let machine = Machine::default();
    assert_eq!(machine.read32(0xDEAD_0000), 0);
}
