use super::*;
use crate::cpu::op::Op;

fn enc(opcode: u32, rs: u32, rt: u32, rd: u32, sa: u32, funct: u32) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | (rd << 11) | (sa << 6) | funct
}

fn enc_i(opcode: u32, rs: u32, rt: u32, imm: u16) -> u32 {
    (opcode << 26) | (rs << 21) | (rt << 16) | imm as u32
}

#[test]
fn all_zero_word_is_nop() {
    let i = decode(0, 0x1000);
    assert_eq!(i.op, Op::Nop);
}

#[test]
fn decodes_special_add() {
    let word = enc(0x00, 8, 9, 10, 0, 0x20);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Add);
    assert_eq!(i.rs, 8);
    assert_eq!(i.rt, 9);
    assert_eq!(i.rd, 10);
}

#[test]
fn ori_with_zero_immediate_is_move() {
    let word = enc_i(0x0D, 8, 9, 0);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Move);
}

#[test]
fn ori_with_nonzero_immediate_stays_ori() {
    let word = enc_i(0x0D, 8, 9, 1);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Ori);
}

#[test]
fn daddu_with_zero_rt_is_move() {
    let word = enc(0x00, 8, 0, 10, 0, 0x2D);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Move);
}

#[test]
fn daddu_with_nonzero_rt_stays_daddu() {
    let word = enc(0x00, 8, 9, 10, 0, 0x2D);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Daddu);
}

#[test]
fn decodes_dsra_supplemented_beyond_original_switch() {
    let word = enc(0x00, 0, 9, 10, 5, 0x3B);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Dsra);
}

#[test]
fn decodes_bgtzl_supplemented_beyond_original_switch() {
    let word = enc_i(0x17, 8, 0, 0x10);
    let i = decode(word, 0);
    assert_eq!(i.op, Op::Bgtzl);
}

#[test]
fn decodes_regimm_branches() {
    assert_eq!(decode(enc_i(0x01, 8, 0x00, 0), 0).op, Op::Bltz);
    assert_eq!(decode(enc_i(0x01, 8, 0x01, 0), 0).op, Op::Bgez);
    assert_eq!(decode(enc_i(0x01, 8, 0x02, 0), 0).op, Op::Bltzl);
    assert_eq!(decode(enc_i(0x01, 8, 0x03, 0), 0).op, Op::Bgezl);
}

#[test]
fn decodes_mfc_mtc_cfc_ctc_generic_across_all_coprocessors() {
    for cop in 0u32..=3 {
        let opcode = 0x10 | cop;
        assert_eq!(decode(enc(opcode, 0x00, 9, 8, 0, 0), 0).op, Op::Mfc(cop as u8));
        assert_eq!(decode(enc(opcode, 0x04, 9, 8, 0, 0), 0).op, Op::Mtc(cop as u8));
        assert_eq!(decode(enc(opcode, 0x02, 9, 8, 0, 0), 0).op, Op::Cfc(cop as u8));
        assert_eq!(decode(enc(opcode, 0x06, 9, 8, 0, 0), 0).op, Op::Ctc(cop as u8));
    }
}

#[test]
fn decodes_cop0_function_block() {
    let word = enc(0x10, 0x10, 0, 0, 0, 0x18);
    assert_eq!(decode(word, 0).op, Op::Eret);
}

#[test]
fn decodes_bc1_variants() {
    assert_eq!(decode(enc_i(0x11, 0x08, 0, 0), 0).op, Op::Bc1f);
    assert_eq!(decode(enc_i(0x11, 0x08, 1, 0), 0).op, Op::Bc1fl);
    assert_eq!(decode(enc_i(0x11, 0x08, 2, 0), 0).op, Op::Bc1t);
    assert_eq!(decode(enc_i(0x11, 0x08, 3, 0), 0).op, Op::Bc1tl);
}

#[test]
fn decodes_fpu_s_arithmetic() {
    let word = enc(0x11, 0x10, 0, 2, 0, 0x00);
    assert_eq!(decode(word, 0).op, Op::AddS);
}

#[test]
fn decodes_cvt_s_w_on_rs_0x14() {
    let word = enc(0x11, 0x14, 0, 0, 0, 0);
    assert_eq!(decode(word, 0).op, Op::CvtSW);
}

#[test]
fn decodes_cop2_qmfc2_and_special() {
    let qmfc2 = enc(0x12, 0x01, 9, 8, 0, 0);
    assert_eq!(decode(qmfc2, 0).op, Op::Qmfc2);

    let vsub = enc(0x12, 0x10, 0, 0, 3, 0x2C);
    assert_eq!(decode(vsub, 0).op, Op::Vsub(0));
}

#[test]
fn decodes_mmi_block() {
    let mult1 = enc(0x1C, 8, 9, 10, 0, 0x18);
    assert_eq!(decode(mult1, 0).op, Op::Mult1);

    let padduw = enc(0x1C, 8, 9, 10, 0x10, 0x28);
    assert_eq!(decode(padduw, 0).op, Op::Padduw);
}

#[test]
fn unrecognized_special_funct_is_unknown() {
    let word = enc(0x00, 0, 0, 0, 0, 0x3D);
    let i = decode(word, 0);
    assert!(i.op.is_unknown());
}

#[test]
fn unrecognized_normal_opcode_is_unknown() {
    let word = enc_i(0x30, 0, 0, 0);
    let i = decode(word, 0);
    assert!(i.op.is_unknown());
}

#[test]
fn loads_and_stores_decode_to_distinct_ops() {
    assert_eq!(decode(enc_i(0x20, 0, 0, 0), 0).op, Op::Lb);
    assert_eq!(decode(enc_i(0x23, 0, 0, 0), 0).op, Op::Lw);
    assert_eq!(decode(enc_i(0x37, 0, 0, 0), 0).op, Op::Ld);
    assert_eq!(decode(enc_i(0x28, 0, 0, 0), 0).op, Op::Sb);
    assert_eq!(decode(enc_i(0x2B, 0, 0, 0), 0).op, Op::Sw);
    assert_eq!(decode(enc_i(0x3F, 0, 0, 0), 0).op, Op::Sd);
}

#[test]
fn decoded_fields_preserve_raw_bit_positions() {
    let word = enc_i(0x08, 5, 6, 0x1234);
    let i = decode(word, 0x4000);
    assert_eq!(i.rs, 5);
    assert_eq!(i.rt, 6);
    assert_eq!(i.imm, 0x1234);
    assert_eq!(i.pc, 0x4000);
    assert_eq!(i.word, word);
}

#[test]
fn jump_target_field_is_low_26_bits() {
    let word = enc_i(0x02, 0, 0, 0) | 0x03FF_FFFF;
    let i = decode(word, 0);
    assert_eq!(i.target, 0x03FF_FFFF);
    assert_eq!(i.op, Op::J);
}
