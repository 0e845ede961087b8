/// Built-in macros allowed inside trigger expressions
pub trait BuiltinMacroAllowList: Send + Sync {
    fn contains(&self, name: &str) -> bool;
}

pub const TRIGGER_MACROS: &[&str] = &["TRIGGER.VALUE"];

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMacroAllowList;

impl BuiltinMacroAllowList for StandardMacroAllowList {
    fn contains(&self, name: &str) -> bool {
        TRIGGER_MACROS.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list() {
        assert!(StandardMacroAllowList.contains("TRIGGER.VALUE"));
        assert!(!StandardMacroAllowList.contains("HOST.NAME"));
        assert!(!StandardMacroAllowList.contains("trigger.value"));
    }
}
