// these modules are re-exported as a single module

pub use self::cpu::*;
mod cpu;

pub use self::decoder::*;
mod decoder;

pub use self::fpu::*;
mod fpu;

pub use self::instruction::*;
mod instruction;

pub use self::op::*;
mod op;

pub use self::register::*;
mod register;
