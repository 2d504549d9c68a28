// SPDX-License-Identifier: Apache-2.0

use serde_json::Map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WifiMode {
    Infrastructure,
    Adhoc,
    Ap,
}

impl Default for WifiMode {
    fn default() -> Self {
        Self::Infrastructure
    }
}

impl WifiMode {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "infrastructure" => Some(Self::Infrastructure),
            "adhoc" => Some(Self::Adhoc),
            "ap" => Some(Self::Ap),
            _ => None,
        }
    }
}

impl std::fmt::Display for WifiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Infrastructure => "infrastructure",
                Self::Adhoc => "adhoc",
                Self::Ap => "ap",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiBand {
    Band5G,
    Band24G,
}

impl WifiBand {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "5GHz" | "5G" => Some(Self::Band5G),
            "2.4GHz" | "2.4G" => Some(Self::Band24G),
            _ => None,
        }
    }
}

impl std::fmt::Display for WifiBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Band5G => "5GHz",
                Self::Band24G => "2.4GHz",
            }
        )
    }
}

/// One entry of a wifi netdef's `access-points:` mapping, keyed by SSID.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct WifiAccessPoint {
    pub ssid: String,
    pub mode: WifiMode,
    pub bssid: Option<String>,
    pub band: Option<WifiBand>,
    pub channel: Option<u32>,
    pub hidden: bool,
    pub auth: Option<super::auth::AuthenticationSettings>,
    /// NetworkManager `group.key` entries belonging to this SSID's
    /// keyfile connection.
    pub passthrough: Map<String, serde_json::Value>,
}

impl WifiAccessPoint {
    pub fn new(ssid: &str) -> Self {
        Self {
            ssid: ssid.to_string(),
            ..Default::default()
        }
    }
}
