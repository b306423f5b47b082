//! Hints: lossy notifications describing configuration side effects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known hint groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HintGroup {
    /// Whole-request renderings.
    Meta,
    /// Physical interface to Ethernet endpoint mappings.
    InterfaceMap,
}

impl HintGroup {
    pub const fn as_str(&self) -> &'static str {
        match self {
            HintGroup::Meta => "meta",
            HintGroup::InterfaceMap => "interface_map",
        }
    }
}

impl fmt::Display for HintGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single hint. The group is free-form so that embedders can define
/// their own; [`HintGroup`] names the ones this server emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hint {
    pub group: String,
    pub key: String,
    pub value: String,
}

impl Hint {
    pub fn new(group: HintGroup, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            group: group.as_str().to_string(),
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn is_group(&self, group: HintGroup) -> bool {
        self.group == group.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_group() {
        let hint = Hint::new(HintGroup::InterfaceMap, "eth0", "dut.eth0");
        assert_eq!(hint.group, "interface_map");
        assert!(hint.is_group(HintGroup::InterfaceMap));
        assert!(!hint.is_group(HintGroup::Meta));
    }
}
