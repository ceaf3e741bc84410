use bitflags::bitflags;

bitflags! {
    pub struct RegexFlags: u32 {
        const NO_FLAG = 0;
        const IGNORECASE = 1 << 1;
        const NO_EARLY_EXIT = 1 << 2;
    }
}

impl RegexFlags {
    /// Symbol comparison used by literal nodes.
    pub fn symbols_equal(&self, expected: char, actual: char) -> bool {
        if self.intersects(RegexFlags::IGNORECASE) {
            expected.eq_ignore_ascii_case(&actual)
        } else {
            expected == actual
        }
    }
}
