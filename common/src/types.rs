use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
    Bread,
    Chicken,
    Potatoes,
    Pizza,
    Rice,
    Other,
}

impl FoodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bread => "bread",
            Self::Chicken => "chicken",
            Self::Potatoes => "potatoes",
            Self::Pizza => "pizza",
            Self::Rice => "rice",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionMode {
    Idle,
    Timer,
    Manual,
}

impl SessionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Timer => "TIMER",
            Self::Manual => "MANUAL",
        }
    }

    pub fn is_running(self) -> bool {
        matches!(self, Self::Timer | Self::Manual)
    }
}

/// One poll's worth of device-reported fields. Every field defaults so a
/// partial or stale payload still decodes; a missing field reads as the
/// device's off/zero state rather than failing the poll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    #[serde(default)]
    pub relay: bool,
    #[serde(rename = "manualMode", default)]
    pub manual_mode: bool,
    #[serde(default)]
    pub cooking: bool,
    #[serde(rename = "timeLeft", default, deserialize_with = "non_negative_seconds")]
    pub time_left: u32,
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// Some firmware builds report a negative `timeLeft` around the end of a
/// cycle; floor it instead of failing the whole snapshot decode.
fn non_negative_seconds<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, i64::from(u32::MAX)) as u32)
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub mode: &'static str,
    #[serde(rename = "relayOn")]
    pub relay_on: bool,
    #[serde(rename = "displaySeconds")]
    pub display_seconds: Option<u32>,
    pub temperature: Option<f64>,
    #[serde(rename = "pendingCommand")]
    pub pending_command: bool,
    #[serde(rename = "deviceReachable")]
    pub device_reachable: bool,
    #[serde(rename = "nowEpoch")]
    pub now_epoch: i64,
}
