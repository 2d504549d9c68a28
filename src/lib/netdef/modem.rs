// SPDX-License-Identifier: Apache-2.0

/// GSM/CDMA parameters of a modem netdef. All handled by the
/// NetworkManager backend only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct ModemParameters {
    pub apn: Option<String>,
    pub auto_config: bool,
    pub device_id: Option<String>,
    pub network_id: Option<String>,
    pub number: Option<String>,
    pub password: Option<String>,
    pub pin: Option<String>,
    pub sim_id: Option<String>,
    pub sim_operator_id: Option<String>,
    pub username: Option<String>,
}

impl ModemParameters {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// GSM if any GSM-only property is present, else treated as CDMA.
    pub fn is_gsm(&self) -> bool {
        self.apn.is_some()
            || self.auto_config
            || self.device_id.is_some()
            || self.network_id.is_some()
            || self.pin.is_some()
            || self.sim_id.is_some()
            || self.sim_operator_id.is_some()
    }
}
