// Mnemonic classes the decode table recognizes (spec §4.2/§4.3). The enum
// carries no operands — `Instruction` holds the decoded fields and formats
// them per-variant — mirroring the teacher's separation between `Op` (what
// to do) and `Parameter`/`Instruction` (what it operates on).

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// instruction word `0x00000000`.
    Nop,

    // -- jumps / branches --
    J,
    Jal,
    Jr,
    Jalr,
    Beq,
    Bne,
    Blez,
    Bgtz,
    Beql,
    Bnel,
    Blezl,
    Bgtzl,
    Bltz,
    Bgez,
    Bltzl,
    Bgezl,

    // -- immediate arithmetic / logic --
    Addi,
    Addiu,
    Daddiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Move, // rewrite of `ori rt, rs, 0` / `daddu rd, rs, 0`
    Xori,
    Lui,

    // -- SPECIAL arithmetic / logic --
    Add,
    Addu,
    Sub,
    Subu,
    Dadd,
    Daddu,
    Dsubu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    Movz,
    Movn,
    Mfsa,
    Mtsa,

    // -- shifts --
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    Dsll,
    Dsrl,
    Dsra,
    Dsll32,
    Dsrl32,
    Dsra32,
    Dsllv,
    Dsrlv,
    Dsrav,

    // -- multiply / divide, pipeline 0 --
    Mult,
    Multu,
    Div,
    Divu,
    Mfhi,
    Mflo,
    Mthi,
    Mtlo,

    // -- multiply / divide, pipeline 1 --
    Mult1,
    Div1,
    Divu1,
    Mfhi1,
    Mflo1,
    Mthi1,
    Mtlo1,

    Syscall,
    Sync,

    Mtsah,

    // -- loads / stores --
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Lwu,
    Ld,
    Lq,
    Sb,
    Sh,
    Sw,
    Sd,
    Sq,
    Lwl,
    Lwr,
    Ldl,
    Ldr,
    Swl,
    Swr,
    Sdl,
    Sdr,
    Cache,
    Lwc1,
    Swc1,

    // -- coprocessor moves --
    Mfc(u8),
    Mtc(u8),
    Cfc(u8),
    Ctc(u8),

    // -- cop0 --
    Tlbwi,
    Eret,
    Ei,
    Di,

    // -- FPU (cop1) --
    AddS,
    SubS,
    MulS,
    DivS,
    MovS,
    NegS,
    AbsS,
    AddaS,
    MaddS,
    CvtWS,
    CvtSW,
    CEqS,
    CLtS,
    Bc1f,
    Bc1t,
    Bc1fl,
    Bc1tl,

    // -- cop2 decode recognition only --
    Qmfc2,
    Vsub(u8),
    Viswr(u8),

    // -- MMI (multimedia integer) --
    Plzcw,
    Psubb,
    Pcgtb,
    Padduw,
    Pcpyld,
    Pand,
    Pcpyud,
    Por,
    Pnor,
    Pcpyh,

    /// a TODO stub the decoder does not fault on (spec §4.3: lqc2/sqc2).
    Todo(&'static str),

    /// unrecognized opcode/function; formats as
    /// `"Unrecognized <class> op $<hex>"` (spec §4.2).
    Unknown { class: &'static str, op: u32 },
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Op::Unknown { class, op } => write!(f, "Unrecognized {} op ${:02x}", class, op),
            Op::Todo(name) => write!(f, "TODO: {}", name),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl Op {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Op::Unknown { .. })
    }
}
