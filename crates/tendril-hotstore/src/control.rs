//! Control-channel messages (§6.2, §4.4 "Control messages").

use serde::{Deserialize, Serialize};
use tendril_core::PairId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ControlMessage {
    /// Broadcast (no `pair_id`) or directed at a single pair.
    #[serde(rename = "SHUTDOWN")]
    Shutdown { pair_id: Option<PairId> },
    #[serde(rename = "RESTART")]
    Restart { pair_id: PairId },
    #[serde(rename = "CONFIG_CHANGED")]
    ConfigChanged,
}

impl ControlMessage {
    /// Whether this message applies to `pair_id` (broadcasts apply to all).
    pub fn applies_to(&self, pair_id: &PairId) -> bool {
        match self {
            Self::Shutdown { pair_id: Some(p) } => p == pair_id,
            Self::Shutdown { pair_id: None } => true,
            Self::Restart { pair_id: p } => p == pair_id,
            Self::ConfigChanged => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_shutdown_applies_to_any_pair() {
        let msg = ControlMessage::Shutdown { pair_id: None };
        assert!(msg.applies_to(&PairId::new("USDC-USDT")));
    }

    #[test]
    fn test_directed_restart_only_applies_to_target() {
        let msg = ControlMessage::Restart {
            pair_id: PairId::new("USDC-USDT"),
        };
        assert!(msg.applies_to(&PairId::new("USDC-USDT")));
        assert!(!msg.applies_to(&PairId::new("DAI-USDC")));
    }

    #[test]
    fn test_serde_roundtrip() {
        let msg = ControlMessage::Restart {
            pair_id: PairId::new("USDC-USDT"),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("RESTART"));
        let parsed: ControlMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, msg);
    }
}
