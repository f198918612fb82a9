// Core tunables, loaded from a TOML file the way the teacher's CLI tooling
// expects a `toml`-backed configuration surface.

use std::fs;
use std::io;

/// boot PC used by [`crate::cpu::Cpu::reset`] when no override is given.
pub const DEFAULT_BOOT_PC: u32 = 0xBFC0_0000;

/// hardware-observed initial value of DMAC `master_disable` (bit 16 set,
/// i.e. the DMAC starts out globally inhibited).
pub const DEFAULT_MASTER_DISABLE: u32 = 0x1201;

/// approximate HSYNC divisor used by timer mode 3 (spec §4.5).
pub const DEFAULT_HSYNC_CYCLES: u32 = 15000;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    pub boot_pc: u32,
    pub master_disable: u32,
    pub hsync_cycles: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        CoreConfig {
            boot_pc: DEFAULT_BOOT_PC,
            master_disable: DEFAULT_MASTER_DISABLE,
            hsync_cycles: DEFAULT_HSYNC_CYCLES,
        }
    }
}

impl CoreConfig {
    pub fn from_toml_str(data: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(data)
    }

    pub fn from_file(path: &str) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_toml_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn defaults_match_hardware_observed_values() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.boot_pc, 0xBFC0_0000);
        assert_eq!(cfg.master_disable, 0x1201);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = CoreConfig::from_toml_str("hsync_cycles = 30000\n").unwrap();
        assert_eq!(cfg.hsync_cycles, 30000);
        assert_eq!(cfg.boot_pc, DEFAULT_BOOT_PC);
    }
}
