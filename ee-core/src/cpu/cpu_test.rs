use super::*;
use crate::bus::{Bus, FlatBus};

fn enc(opcode: u32, rs: u32, rt: u32, rd: u32, sa: u32, funct: u32) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (rd << 11) | (sa << 6) | funct
}

fn enc_i(opcode: u32, rs: u32, rt: u32, imm: u16) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | imm as u32
}

fn program(words: &[u32]) -> FlatBus {
    let mut bus = FlatBus::new(0x10000);
    for (i, w) in words.iter().enumerate() {
        bus.write32((i * 4) as u32, *w);
    }
    bus
}

#[test]
fn zero_register_discards_every_write_path() {
    let mut cpu = Cpu::default();
    cpu.reset(0);
    let mut bus = program(&[enc_i(0x08, 0, 0, 5)]); // addi zero, zero, 5
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u64(ZERO), 0);
}

#[test]
fn branch_delay_slot_executes_before_target_takes_effect() {
    // addiu $t0, $zero, 1   ; pc=0
    // beq   $zero, $zero, +2 (skips one word, target = pc+4+8=0xC) ; pc=4
    // addiu $t1, $zero, 2   ; pc=8 (delay slot, must execute)
    // addiu $t2, $zero, 3   ; pc=0xC (branch target)
    let mut bus = program(&[
        enc_i(0x09, 0, 8, 1),
        enc_i(0x04, 0, 0, 2),
        enc_i(0x09, 0, 9, 2),
        enc_i(0x09, 0, 10, 3),
    ]);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.step(&mut bus); // addiu t0
    cpu.step(&mut bus); // beq (schedules branch)
    assert_eq!(cpu.pc(), 8);
    cpu.step(&mut bus); // delay slot: addiu t1 executes
    assert_eq!(cpu.rf.gpr_u64(9), 2);
    assert_eq!(cpu.pc(), 0xC);
    cpu.step(&mut bus); // addiu t2 at branch target
    assert_eq!(cpu.rf.gpr_u64(10), 3);
}

#[test]
fn branch_likely_false_skips_the_delay_slot() {
    // beql $zero, $t0, +4  ; t0 != 0 so predicate false, skip delay slot
    // addiu $t1, $zero, 0x1111  ; delay slot, must NOT execute
    // addiu $t2, $zero, 7       ; reached directly at pc+8
    let mut bus = program(&[
        enc_i(0x14, 0, 8, 4),
        enc_i(0x09, 0, 9, 0x1111),
        enc_i(0x09, 0, 10, 7),
    ]);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u64(8, 1);
    cpu.step(&mut bus); // beql, predicate false
    assert_eq!(cpu.pc(), 8);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u64(9), 0);
    assert_eq!(cpu.rf.gpr_u64(10), 7);
}

#[test]
fn jalr_links_pc_plus_8_and_jumps_to_register() {
    // addiu $t0, $zero, 0x100
    // jalr  $ra, $t0
    // nop
    let mut bus = program(&[enc_i(0x09, 0, 8, 0x100), enc(0x00, 8, 0, 31, 0, 0x09), 0]);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u64(31), 12);
    cpu.step(&mut bus); // delay slot
    assert_eq!(cpu.pc(), 0x100);
}

#[test]
fn div_by_zero_is_deterministic_not_a_panic() {
    let mut bus = program(&[enc(0x00, 8, 9, 0, 0, 0x1A)]); // div $t0, $t1
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, 10);
    cpu.rf.set_gpr_u32_sext(9, 0);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.lo[0] as i32, -1);
    assert_eq!(cpu.rf.hi[0] as i32, 10);
}

#[test]
fn div_int_min_by_minus_one_does_not_panic() {
    let mut bus = program(&[enc(0x00, 8, 9, 0, 0, 0x1A)]);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, i32::MIN as u32);
    cpu.rf.set_gpr_u32_sext(9, -1i32 as u32);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.lo[0] as i32, i32::MIN);
    assert_eq!(cpu.rf.hi[0] as i32, 0);
}

#[test]
fn signed_overflow_on_add_wraps_and_does_not_trap() {
    let mut bus = program(&[enc(0x00, 8, 9, 10, 0, 0x20)]); // add $t2, $t0, $t1
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, i32::MAX as u32);
    cpu.rf.set_gpr_u32_sext(9, 1);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_i32(10), i32::MIN);
}

#[test]
fn lwl_lwr_merge_unaligned_word() {
    let mut bus = program(&[]);
    bus.write32(0x100, 0x1234_5678);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, 0x100);

    // lwr $t1, 1($t0) merges bytes [aligned+1 .. aligned+4) into the low bytes
    let lwr = enc_i(0x26, 8, 9, 1);
    bus.write32(0, lwr);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u32(9) & 0x00FF_FFFF, 0x00_1234_56 & 0x00FF_FFFF);
}

#[test]
fn sign_extends_word_loads_to_64_bits() {
    let mut bus = program(&[]);
    bus.write32(0x200, 0xFFFF_FFFE);
    let lw = enc_i(0x23, 8, 9, 0x200);
    bus.write32(0, lw);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u64(9), 0xFFFF_FFFF_FFFF_FFFE);
}

#[test]
fn mult_writes_hi_lo_and_optionally_rd() {
    let mut bus = program(&[enc(0x00, 8, 9, 10, 0, 0x18)]); // mult $t2, $t0, $t1
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, 6);
    cpu.rf.set_gpr_u32_sext(9, 7);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.lo[0], 42);
    assert_eq!(cpu.rf.hi[0], 0);
    assert_eq!(cpu.rf.gpr_u64(10), 42);
}

#[test]
fn mtc1_mfc1_round_trip_raw_bits_through_gpr() {
    let mut bus = program(&[
        enc(0x11, 0x04, 8, 1, 0, 0), // mtc1 $t0, f1
        enc(0x11, 0x00, 9, 1, 0, 0), // mfc1 $t1, f1
    ]);
    let mut cpu = Cpu::default();
    cpu.reset(0);
    cpu.rf.set_gpr_u32_sext(8, 0x3F80_0000);
    cpu.step(&mut bus);
    cpu.step(&mut bus);
    assert_eq!(cpu.rf.gpr_u32(9), 0x3F80_0000);
}
