//! Messages exchanged with the host application.
//!
//! Keys match the host's app-message dictionary exactly.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::StopId;

/// Update request sent by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HostRequest {
    /// Stop to show arrivals for; `None` means "nearest".
    #[serde(
        rename = "REQ_BUS_STOP_ID",
        default,
        deserialize_with = "deserialize_stop_id"
    )]
    pub bus_stop_id: Option<StopId>,

    /// Whether the host wants the nearby-stop list refreshed.
    #[serde(
        rename = "REQ_UPDATE_BUS_STOP_LIST",
        default,
        deserialize_with = "deserialize_flag"
    )]
    pub update_bus_stop_list: bool,
}

impl HostRequest {
    /// Request for the nearest stop.
    pub fn nearest() -> Self {
        Self::default()
    }

    /// Request for a specific stop.
    pub fn for_stop(id: impl Into<StopId>) -> Self {
        Self {
            bus_stop_id: Some(id.into()),
            update_bus_stop_list: false,
        }
    }
}

/// The host sends ids as integers or strings; `0` and `""` mean "nearest".
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStopId {
    Number(u64),
    Text(String),
}

fn deserialize_stop_id<'de, D>(deserializer: D) -> Result<Option<StopId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawStopId>::deserialize(deserializer)?;
    let id = match raw {
        None | Some(RawStopId::Number(0)) => None,
        Some(RawStopId::Number(n)) => Some(n.to_string()),
        Some(RawStopId::Text(s)) => {
            let s = s.trim();
            (!s.is_empty() && s != "0").then(|| s.to_string())
        }
    };
    Ok(id.map(StopId::new))
}

/// Flags arrive as booleans or as `uint8` values.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFlag {
    Bool(bool),
    Number(i64),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawFlag>::deserialize(deserializer)? {
        None => false,
        Some(RawFlag::Bool(b)) => b,
        Some(RawFlag::Number(n)) => n != 0,
    })
}

/// Reply sent to the host after a pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostReply {
    #[serde(rename = "BUS_STOP_DATA", skip_serializing_if = "Option::is_none")]
    pub bus_stop_data: Option<String>,

    #[serde(rename = "BUS_STOP_NAME", skip_serializing_if = "Option::is_none")]
    pub bus_stop_name: Option<String>,

    #[serde(rename = "BUS_DATA", skip_serializing_if = "Option::is_none")]
    pub bus_data: Option<String>,

    /// Set only when the run failed.
    #[serde(rename = "BUS_ERROR", skip_serializing_if = "Option::is_none")]
    pub bus_error: Option<String>,
}

impl HostReply {
    /// Successful update.
    pub fn update(bus_stop_data: String, bus_stop_name: String, bus_data: String) -> Self {
        Self {
            bus_stop_data: Some(bus_stop_data),
            bus_stop_name: Some(bus_stop_name),
            bus_data: Some(bus_data),
            bus_error: None,
        }
    }

    /// Failed run.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            bus_error: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn is_failure(&self) -> bool {
        self.bus_error.is_some()
    }
}
