// Cop1: the EE's deliberately non-IEEE-754-compliant single-precision FPU
// (spec §4.1). Grounded on `original_source/src/core/ee/cop1.cpp`.

/// revision register value `cfc1 0` reads (spec §3, §4.1).
pub const FPU_REVISION: u32 = 0x2E00;

#[derive(Clone, Copy, Debug, Default)]
pub struct Cop1Control {
    pub condition: bool,
}

pub struct Cop1 {
    regs: [u32; 32],
    accumulator: u32,
    pub control: Cop1Control,
}

impl Default for Cop1 {
    fn default() -> Self {
        Cop1 {
            regs: [0; 32],
            accumulator: 0,
            control: Cop1Control::default(),
        }
    }
}

/// replaces any bit pattern whose biased exponent is `0xFF` (would be NaN or
/// ±Inf under IEEE 754) with the same-sign maximum finite value. Every
/// binary arithmetic entry point converts its operands through this first;
/// `mov.s`/`neg.s`/`abs.s` and the compares do not.
pub fn convert(value: u32) -> u32 {
    if value & 0x7F80_0000 == 0x7F80_0000 {
        (value & 0x8000_0000) | 0x7F7F_FFFF
    } else {
        value
    }
}

impl Cop1 {
    pub fn reset(&mut self) {
        self.regs = [0; 32];
        self.accumulator = 0;
        self.control = Cop1Control::default();
    }

    pub fn get(&self, index: usize) -> u32 {
        self.regs[index & 0x1F]
    }

    pub fn set(&mut self, index: usize, value: u32) {
        self.regs[index & 0x1F] = value;
    }

    pub fn accumulator(&self) -> u32 {
        self.accumulator
    }

    /// `mtc1`/`mfc1`: raw 32-bit pattern copies, no conversion.
    pub fn mtc1(&mut self, index: usize, value: u32) {
        log::trace!("fpu: mtc1 f{}, ${:08X}", index, value);
        self.set(index, value);
    }

    pub fn mfc1(&self, index: usize) -> u32 {
        self.get(index)
    }

    pub fn cfc1(&self, index: usize) -> u32 {
        match index {
            0 => FPU_REVISION,
            31 => (self.control.condition as u32) << 23,
            _ => 0,
        }
    }

    /// `ctc1` writes are accepted but discarded for fields outside the
    /// condition bit; the original core discards them unconditionally, and
    /// nothing in this core's scope needs other control fields.
    pub fn ctc1(&mut self, _index: usize, value: u32) {
        log::trace!("fpu: ctc1 discarded ${:08X}", value);
    }

    fn binop(&self, reg1: usize, reg2: usize) -> (f32, f32) {
        let a = f32::from_bits(convert(self.get(reg1)));
        let b = f32::from_bits(convert(self.get(reg2)));
        (a, b)
    }

    pub fn add_s(&mut self, dest: usize, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        self.set(dest, (a + b).to_bits());
    }

    pub fn sub_s(&mut self, dest: usize, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        self.set(dest, (a - b).to_bits());
    }

    pub fn mul_s(&mut self, dest: usize, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        self.set(dest, (a * b).to_bits());
    }

    pub fn div_s(&mut self, dest: usize, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        self.set(dest, (a / b).to_bits());
    }

    pub fn adda_s(&mut self, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        self.accumulator = (a + b).to_bits();
    }

    pub fn madd_s(&mut self, dest: usize, reg1: usize, reg2: usize) {
        let (a, b) = self.binop(reg1, reg2);
        let acc = f32::from_bits(convert(self.accumulator));
        self.set(dest, (acc + a * b).to_bits());
    }

    /// raw copy, no conversion.
    pub fn mov_s(&mut self, dest: usize, source: usize) {
        let v = self.get(source);
        self.set(dest, v);
    }

    /// flips the sign bit of the raw pattern (spec §4.1), not a float
    /// negation — see DESIGN.md for why this differs from the reference
    /// implementation.
    pub fn neg_s(&mut self, dest: usize, source: usize) {
        let v = self.get(source) ^ 0x8000_0000;
        self.set(dest, v);
    }

    /// clears the sign bit of the raw pattern.
    pub fn abs_s(&mut self, dest: usize, source: usize) {
        let v = self.get(source) & 0x7FFF_FFFF;
        self.set(dest, v);
    }

    /// compares read the stored bit pattern directly, without the input
    /// conversion (spec §4.1: "matches hardware: denormals/anomalous
    /// patterns compare bit-exact against the already-stored form").
    pub fn c_lt_s(&mut self, reg1: usize, reg2: usize) {
        let a = f32::from_bits(self.get(reg1));
        let b = f32::from_bits(self.get(reg2));
        self.control.condition = a < b;
    }

    pub fn c_eq_s(&mut self, reg1: usize, reg2: usize) {
        let a = f32::from_bits(self.get(reg1));
        let b = f32::from_bits(self.get(reg2));
        self.control.condition = a == b;
    }

    /// truncate-toward-zero `f32 -> i32`.
    pub fn cvt_w_s(&mut self, dest: usize, source: usize) {
        let f = f32::from_bits(self.get(source));
        self.set(dest, (f.trunc() as i32) as u32);
    }

    /// round-to-nearest `i32 -> f32`.
    pub fn cvt_s_w(&mut self, dest: usize, source: usize) {
        let i = self.get(source) as i32;
        self.set(dest, (i as f32).to_bits());
    }
}

#[cfg(test)]
mod fpu_test {
    use super::*;

    #[test]
    fn convert_saturates_infinities_and_nans_to_max_finite() {
        assert_eq!(convert(0x7F80_0000), 0x7F7F_FFFF); // +inf
        assert_eq!(convert(0xFF80_0000), 0xFF7F_FFFF); // -inf
        assert_eq!(convert(0x7FC0_0000), 0x7F7F_FFFF); // a NaN pattern
        assert_eq!(convert(0x3F80_0000), 0x3F80_0000); // 1.0f, untouched
    }

    #[test]
    fn add_s_of_two_saturated_infinities_stays_max_finite() {
        let mut fpu = Cop1::default();
        fpu.mtc1(0, 0x7F80_0000);
        fpu.add_s(2, 0, 0);
        assert_eq!(fpu.get(2), 0x7F7F_FFFF);
    }

    #[test]
    fn mov_and_abs_and_neg_are_raw_bit_operations() {
        let mut fpu = Cop1::default();
        fpu.mtc1(0, 0x7F80_0000); // +inf pattern, not converted by mov/neg/abs
        fpu.mov_s(1, 0);
        assert_eq!(fpu.get(1), 0x7F80_0000);
        fpu.neg_s(2, 0);
        assert_eq!(fpu.get(2), 0xFF80_0000);
        fpu.abs_s(3, 2);
        assert_eq!(fpu.get(3), 0x7F80_0000);
    }

    #[test]
    fn cfc1_revision_and_condition() {
        let mut fpu = Cop1::default();
        assert_eq!(fpu.cfc1(0), 0x2E00);
        assert_eq!(fpu.cfc1(1), 0);
        fpu.control.condition = true;
        assert_eq!(fpu.cfc1(31), 1 << 23);
    }

    #[test]
    fn cvt_w_s_truncates_toward_zero() {
        let mut fpu = Cop1::default();
        fpu.mtc1(0, 2.9f32.to_bits());
        fpu.cvt_w_s(1, 0);
        assert_eq!(fpu.get(1) as i32, 2);

        fpu.mtc1(0, (-2.9f32).to_bits());
        fpu.cvt_w_s(1, 0);
        assert_eq!(fpu.get(1) as i32, -2);
    }

    #[test]
    fn cvt_s_w_round_trips_small_integers() {
        let mut fpu = Cop1::default();
        fpu.mtc1(0, (-7i32) as u32);
        fpu.cvt_s_w(1, 0);
        assert_eq!(f32::from_bits(fpu.get(1)), -7.0f32);
    }

    #[test]
    fn compares_read_raw_pattern_without_conversion() {
        let mut fpu = Cop1::default();
        fpu.mtc1(0, 1.0f32.to_bits());
        fpu.mtc1(1, 2.0f32.to_bits());
        fpu.c_lt_s(0, 1);
        assert!(fpu.control.condition);
        fpu.c_eq_s(0, 1);
        assert!(!fpu.control.condition);
    }
}
