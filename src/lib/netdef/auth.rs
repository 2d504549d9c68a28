// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeyManagementType {
    None,
    Psk,
    Eap,
    EapSha256,
    EapSuiteB192,
    Sae,
    Dot1x,
}

impl KeyManagementType {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "psk" => Some(Self::Psk),
            "eap" => Some(Self::Eap),
            "eap-sha256" => Some(Self::EapSha256),
            "eap-suite-b-192" => Some(Self::EapSuiteB192),
            "sae" => Some(Self::Sae),
            "802.1x" => Some(Self::Dot1x),
            _ => None,
        }
    }
}

impl std::fmt::Display for KeyManagementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::None => "none",
                Self::Psk => "psk",
                Self::Eap => "eap",
                Self::EapSha256 => "eap-sha256",
                Self::EapSuiteB192 => "eap-suite-b-192",
                Self::Sae => "sae",
                Self::Dot1x => "802.1x",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EapMethod {
    Tls,
    Peap,
    Ttls,
    Leap,
    Pwd,
}

impl EapMethod {
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s {
            "tls" => Some(Self::Tls),
            "peap" => Some(Self::Peap),
            "ttls" => Some(Self::Ttls),
            "leap" => Some(Self::Leap),
            "pwd" => Some(Self::Pwd),
            _ => None,
        }
    }
}

impl std::fmt::Display for EapMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Tls => "tls",
                Self::Peap => "peap",
                Self::Ttls => "ttls",
                Self::Leap => "leap",
                Self::Pwd => "pwd",
            }
        )
    }
}

/// Protected management frames mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmfMode {
    Disabled,
    Optional,
    Required,
}

/// `auth:` block, used both on the netdef (wired 802.1x) and inside an
/// access point (WPA/EAP).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub struct AuthenticationSettings {
    pub key_management: Option<KeyManagementType>,
    pub eap_method: Option<EapMethod>,
    pub identity: Option<String>,
    pub anonymous_identity: Option<String>,
    /// WPA passphrase or EAP password, depending on key management.
    pub password: Option<String>,
    pub ca_certificate: Option<String>,
    pub client_certificate: Option<String>,
    pub client_key: Option<String>,
    pub client_key_password: Option<String>,
    pub phase2_auth: Option<String>,
    pub pmf_mode: Option<PmfMode>,
}

impl AuthenticationSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pre-shared passphrase without EAP configured.
    pub fn is_psk_only(&self) -> bool {
        self.eap_method.is_none()
            && matches!(
                self.key_management,
                None | Some(KeyManagementType::Psk)
                    | Some(KeyManagementType::Sae)
            )
    }
}
