//! Linear counter: the triangle channel's fine-grained duration counter

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearCounter {
    pub(crate) counter: u8,
    pub(crate) reload_value: u8,
    /// Control flag; while set the reload flag is never cleared
    pub(crate) control_flag: bool,
    pub(crate) reload_flag: bool,
}

impl LinearCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarter-frame clock
    pub fn clock(&mut self) {
        if self.reload_flag {
            self.counter = self.reload_value;
        } else if self.counter > 0 {
            self.counter -= 1;
        }

        if !self.control_flag {
            self.reload_flag = false;
        }
    }

    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    /// $4008: CRRR RRRR
    pub fn write_control(&mut self, data: u8) {
        self.control_flag = data & 0x80 != 0;
        self.reload_value = data & 0x7F;
    }

    pub fn set_reload_flag(&mut self) {
        self.reload_flag = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_then_count_down() {
        let mut lc = LinearCounter::new();
        lc.write_control(0x05);
        lc.set_reload_flag();

        lc.clock();
        assert_eq!(lc.counter, 5);
        assert!(!lc.reload_flag);
        lc.clock();
        assert_eq!(lc.counter, 4);
    }

    #[test]
    fn test_control_flag_keeps_reloading() {
        let mut lc = LinearCounter::new();
        lc.write_control(0x85);
        lc.set_reload_flag();

        lc.clock();
        lc.clock();
        assert_eq!(lc.counter, 5);
        assert!(lc.reload_flag);
    }
}
