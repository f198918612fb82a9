// Pure decode of a 32-bit instruction word (spec §4.2). This is the single
// authoritative opcode table: both the disassembler and the interpreter
// decode through `decode()`, so they can never drift apart (spec §1: "any
// correct interpreter must mirror" the disassembler's decode table).
//
// Dispatch mirrors `original_source/src/core/ee/emotiondisasm.cpp`'s
// `disasm_instr` and its sub-dispatchers function-for-function.

use crate::cpu::instruction::Instruction;
use crate::cpu::op::Op;

#[inline]
fn rs(word: u32) -> u8 {
    ((word >> 21) & 0x1F) as u8
}
#[inline]
fn rt(word: u32) -> u8 {
    ((word >> 16) & 0x1F) as u8
}
#[inline]
fn rd(word: u32) -> u8 {
    ((word >> 11) & 0x1F) as u8
}
#[inline]
fn sa(word: u32) -> u8 {
    ((word >> 6) & 0x1F) as u8
}
#[inline]
fn funct(word: u32) -> u8 {
    (word & 0x3F) as u8
}
#[inline]
fn imm(word: u32) -> u16 {
    (word & 0xFFFF) as u16
}
#[inline]
fn target26(word: u32) -> u32 {
    word & 0x3FF_FFFF
}

fn base(word: u32, pc: u32, op: Op) -> Instruction {
    Instruction {
        word,
        pc,
        op,
        rs: rs(word),
        rt: rt(word),
        rd: rd(word),
        sa: sa(word),
        funct: funct(word),
        imm: imm(word),
        target: target26(word),
    }
}

pub fn decode(word: u32, pc: u32) -> Instruction {
    if word == 0 {
        return base(word, pc, Op::Nop);
    }
    let opcode = word >> 26;
    match opcode {
        0x00 => decode_special(word, pc),
        0x01 => decode_regimm(word, pc),
        0x02 => base(word, pc, Op::J),
        0x03 => base(word, pc, Op::Jal),
        0x04 => base(word, pc, Op::Beq),
        0x05 => base(word, pc, Op::Bne),
        0x06 => base(word, pc, Op::Blez),
        0x07 => base(word, pc, Op::Bgtz),
        0x08 => base(word, pc, Op::Addi),
        0x09 => base(word, pc, Op::Addiu),
        0x0A => base(word, pc, Op::Slti),
        0x0B => base(word, pc, Op::Sltiu),
        0x0C => base(word, pc, Op::Andi),
        0x0D => {
            if imm(word) == 0 {
                base(word, pc, Op::Move)
            } else {
                base(word, pc, Op::Ori)
            }
        }
        0x0E => base(word, pc, Op::Xori),
        0x0F => base(word, pc, Op::Lui),
        0x10..=0x13 => decode_cop(word, pc),
        0x14 => base(word, pc, Op::Beql),
        0x15 => base(word, pc, Op::Bnel),
        0x16 => base(word, pc, Op::Blezl),
        0x17 => base(word, pc, Op::Bgtzl),
        0x19 => base(word, pc, Op::Daddiu),
        0x1A => base(word, pc, Op::Ldl),
        0x1B => base(word, pc, Op::Ldr),
        0x1C => decode_mmi(word, pc),
        0x1E => base(word, pc, Op::Lq),
        0x1F => base(word, pc, Op::Sq),
        0x20 => base(word, pc, Op::Lb),
        0x21 => base(word, pc, Op::Lh),
        0x22 => base(word, pc, Op::Lwl),
        0x23 => base(word, pc, Op::Lw),
        0x24 => base(word, pc, Op::Lbu),
        0x25 => base(word, pc, Op::Lhu),
        0x26 => base(word, pc, Op::Lwr),
        0x27 => base(word, pc, Op::Lwu),
        0x28 => base(word, pc, Op::Sb),
        0x29 => base(word, pc, Op::Sh),
        0x2A => base(word, pc, Op::Swl),
        0x2B => base(word, pc, Op::Sw),
        0x2C => base(word, pc, Op::Sdl),
        0x2D => base(word, pc, Op::Sdr),
        0x2E => base(word, pc, Op::Swr),
        0x2F => base(word, pc, Op::Cache),
        0x31 => base(word, pc, Op::Lwc1),
        0x36 => base(word, pc, Op::Todo("lqc2")),
        0x37 => base(word, pc, Op::Ld),
        0x39 => base(word, pc, Op::Swc1),
        0x3E => base(word, pc, Op::Todo("sqc2")),
        0x3F => base(word, pc, Op::Sd),
        _ => base(word, pc, Op::Unknown { class: "normal", op: opcode }),
    }
}

fn decode_special(word: u32, pc: u32) -> Instruction {
    let op = match funct(word) {
        0x00 => Op::Sll,
        0x02 => Op::Srl,
        0x03 => Op::Sra,
        0x04 => Op::Sllv,
        0x06 => Op::Srlv,
        0x07 => Op::Srav,
        0x08 => Op::Jr,
        0x09 => Op::Jalr,
        0x0A => Op::Movz,
        0x0B => Op::Movn,
        0x0C => Op::Syscall,
        0x0F => Op::Sync,
        0x10 => Op::Mfhi,
        0x11 => Op::Mthi,
        0x12 => Op::Mflo,
        0x13 => Op::Mtlo,
        0x14 => Op::Dsllv,
        0x16 => Op::Dsrlv,
        0x17 => Op::Dsrav,
        0x18 => Op::Mult,
        0x19 => Op::Multu,
        0x1A => Op::Div,
        0x1B => Op::Divu,
        0x20 => Op::Add,
        0x21 => Op::Addu,
        0x22 => Op::Sub,
        0x23 => Op::Subu,
        0x24 => Op::And,
        0x25 => Op::Or,
        0x26 => Op::Xor,
        0x27 => Op::Nor,
        0x28 => Op::Mfsa,
        0x29 => Op::Mtsa,
        0x2A => Op::Slt,
        0x2B => Op::Sltu,
        0x2C => Op::Dadd,
        0x2D => {
            if rt(word) == 0 {
                Op::Move
            } else {
                Op::Daddu
            }
        }
        0x2F => Op::Dsubu,
        0x38 => Op::Dsll,
        0x3A => Op::Dsrl,
        0x3B => Op::Dsra,
        0x3C => Op::Dsll32,
        0x3E => Op::Dsrl32,
        0x3F => Op::Dsra32,
        f => Op::Unknown { class: "special", op: f as u32 },
    };
    base(word, pc, op)
}

fn decode_regimm(word: u32, pc: u32) -> Instruction {
    let op = match rt(word) {
        0x00 => Op::Bltz,
        0x01 => Op::Bgez,
        0x02 => Op::Bltzl,
        0x03 => Op::Bgezl,
        0x19 => Op::Mtsah,
        r => Op::Unknown { class: "regimm", op: r as u32 },
    };
    base(word, pc, op)
}

fn decode_cop(word: u32, pc: u32) -> Instruction {
    let cop_id = ((word >> 26) & 0x3) as u8;
    let sub = rs(word) as u32;
    match (sub, cop_id) {
        (0x00, _) => base(word, pc, Op::Mfc(cop_id)),
        (0x04, _) => base(word, pc, Op::Mtc(cop_id)),
        (0x02, _) => base(word, pc, Op::Cfc(cop_id)),
        (0x06, _) => base(word, pc, Op::Ctc(cop_id)),
        (0x10, 0) => decode_cop0_function(word, pc),
        (0x08, 1) => decode_bc1(word, pc),
        (0x10, 1) => decode_fpu_s(word, pc),
        (0x14, 1) => base(word, pc, Op::CvtSW),
        (0x01, 2) => base(word, pc, Op::Qmfc2),
        (s, 2) if s >= 0x10 => decode_cop2_special(word, pc),
        _ => base(word, pc, Op::Unknown { class: "cop", op: sub }),
    }
}

fn decode_cop0_function(word: u32, pc: u32) -> Instruction {
    let op = match funct(word) {
        0x02 => Op::Tlbwi,
        0x18 => Op::Eret,
        0x38 => Op::Ei,
        0x39 => Op::Di,
        f => Op::Unknown { class: "cop0x010", op: f as u32 },
    };
    base(word, pc, op)
}

fn decode_bc1(word: u32, pc: u32) -> Instruction {
    let op = match rt(word) {
        0 => Op::Bc1f,
        1 => Op::Bc1fl,
        2 => Op::Bc1t,
        3 => Op::Bc1tl,
        r => Op::Unknown { class: "BC1", op: r as u32 },
    };
    base(word, pc, op)
}

fn decode_fpu_s(word: u32, pc: u32) -> Instruction {
    let op = match funct(word) {
        0x00 => Op::AddS,
        0x01 => Op::SubS,
        0x02 => Op::MulS,
        0x03 => Op::DivS,
        0x06 => Op::MovS,
        0x07 => Op::NegS,
        0x18 => Op::AddaS,
        0x1C => Op::MaddS,
        0x24 => Op::CvtWS,
        0x05 => Op::AbsS,
        0x32 => Op::CEqS,
        0x34 => Op::CLtS,
        f => Op::Unknown { class: "FPU-S", op: f as u32 },
    };
    base(word, pc, op)
}

fn decode_cop2_special(word: u32, pc: u32) -> Instruction {
    let op = funct(word) as u32;
    if op >= 0x3C {
        return decode_cop2_special2(word, pc);
    }
    match op {
        0x2C => base(word, pc, Op::Vsub((word >> 21 & 0xF) as u8)),
        _ => base(word, pc, Op::Unknown { class: "cop2 special", op }),
    }
}

fn decode_cop2_special2(word: u32, pc: u32) -> Instruction {
    let op = (word & 0x3) | ((word >> 4) & 0x7C);
    match op {
        0x3F => base(word, pc, Op::Viswr((word >> 21 & 0xF) as u8)),
        _ => base(word, pc, Op::Unknown { class: "cop2 special2", op }),
    }
}

fn decode_mmi(word: u32, pc: u32) -> Instruction {
    let op = match funct(word) {
        0x04 => Op::Plzcw,
        0x08 => return decode_mmi0(word, pc),
        0x09 => return decode_mmi2(word, pc),
        0x10 => Op::Mfhi1,
        0x11 => Op::Mthi1,
        0x12 => Op::Mflo1,
        0x13 => Op::Mtlo1,
        0x18 => Op::Mult1,
        0x1A => Op::Div1,
        0x1B => Op::Divu1,
        0x28 => return decode_mmi1(word, pc),
        0x29 => return decode_mmi3(word, pc),
        f => Op::Unknown { class: "mmi", op: f as u32 },
    };
    base(word, pc, op)
}

fn decode_mmi0(word: u32, pc: u32) -> Instruction {
    let op = match sa(word) {
        0x09 => Op::Psubb,
        0x12 => Op::Pcgtb,
        s => Op::Unknown { class: "mmi0", op: s as u32 },
    };
    base(word, pc, op)
}

fn decode_mmi1(word: u32, pc: u32) -> Instruction {
    let op = match sa(word) {
        0x10 => Op::Padduw,
        s => Op::Unknown { class: "mmi1", op: s as u32 },
    };
    base(word, pc, op)
}

fn decode_mmi2(word: u32, pc: u32) -> Instruction {
    let op = match sa(word) {
        0x0E => Op::Pcpyld,
        0x12 => Op::Pand,
        s => Op::Unknown { class: "mmi2", op: s as u32 },
    };
    base(word, pc, op)
}

fn decode_mmi3(word: u32, pc: u32) -> Instruction {
    let op = match sa(word) {
        0x0E => Op::Pcpyud,
        0x12 => Op::Por,
        0x13 => Op::Pnor,
        0x1B => Op::Pcpyh,
        s => Op::Unknown { class: "mmi3", op: s as u32 },
    };
    base(word, pc, op)
}

#[cfg(test)]
#[path = "./decoder_test.rs"]
mod decoder_test;
