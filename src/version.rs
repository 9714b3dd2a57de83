//! Protocol version tables.
//!
//! Each version is a closed enumeration with a lookup table of the constants
//! it implies (namespaces, fault names, wire names).

use crate::mode::{closed_enum, ClosedEnum};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SOAP namespace URIs.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const SOAP_12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const WSA_10_NS: &str = "http://www.w3.org/2005/08/addressing";
pub const WSA_AUGUST_2004_NS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
pub const WSA_NONE_NS: &str = "http://schemas.microsoft.com/ws/2005/05/addressing/none";
pub const WSSE_10_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSSE_11_NS: &str = "http://docs.oasis-open.org/wss/oasis-wss-wssecurity-secext-1.1.xsd";

/// SOAP envelope version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EnvelopeVersion {
    /// No envelope (plain XML or raw messages).
    None = 0,
    /// SOAP 1.1
    Soap11 = 1,
    /// SOAP 1.2
    Soap12 = 2,
}

closed_enum!(EnvelopeVersion, "EnvelopeVersion", [None, Soap11, Soap12]);

impl EnvelopeVersion {
    /// Envelope namespace, empty for [`EnvelopeVersion::None`].
    pub fn namespace(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Soap11 => SOAP_11_NS,
            Self::Soap12 => SOAP_12_NS,
        }
    }

    /// Look up the version owning `namespace`.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            SOAP_11_NS => Some(Self::Soap11),
            SOAP_12_NS => Some(Self::Soap12),
            _ => None,
        }
    }

    pub fn sender_fault_name(self) -> &'static str {
        match self {
            Self::Soap11 => "Client",
            Self::Soap12 | Self::None => "Sender",
        }
    }

    pub fn receiver_fault_name(self) -> &'static str {
        match self {
            Self::Soap11 => "Server",
            Self::Soap12 | Self::None => "Receiver",
        }
    }

    pub fn must_understand_fault_name(self) -> &'static str {
        "MustUnderstand"
    }

    /// Whether the envelope can carry `NotUnderstood` headers.
    pub fn supports_not_understood_header(self) -> bool {
        self == Self::Soap12
    }

    /// Content type used for a fault body in this envelope.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Soap12 => "application/soap+xml; charset=utf-8",
            Self::Soap11 | Self::None => "text/xml; charset=utf-8",
        }
    }
}

/// WS-Addressing version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum AddressingVersion {
    None = 0,
    WsAddressingAugust2004 = 1,
    WsAddressing10 = 2,
}

closed_enum!(
    AddressingVersion,
    "AddressingVersion",
    [None, WsAddressingAugust2004, WsAddressing10]
);

impl AddressingVersion {
    pub fn namespace(self) -> &'static str {
        match self {
            Self::None => WSA_NONE_NS,
            Self::WsAddressingAugust2004 => WSA_AUGUST_2004_NS,
            Self::WsAddressing10 => WSA_10_NS,
        }
    }

    /// Action for faults raised by the addressing layer itself.
    pub fn fault_action(self) -> &'static str {
        match self {
            Self::None => "",
            Self::WsAddressingAugust2004 => "http://schemas.xmlsoap.org/ws/2004/08/addressing/fault",
            Self::WsAddressing10 => "http://www.w3.org/2005/08/addressing/fault",
        }
    }

    /// Action for SOAP-level faults (such as MustUnderstand).
    pub fn default_fault_action(self) -> &'static str {
        match self {
            Self::None => "",
            Self::WsAddressingAugust2004 => "http://schemas.xmlsoap.org/ws/2004/08/addressing/fault",
            Self::WsAddressing10 => "http://www.w3.org/2005/08/addressing/soap/fault",
        }
    }
}

/// Envelope plus addressing version negotiated for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageVersion {
    pub envelope: EnvelopeVersion,
    pub addressing: AddressingVersion,
}

impl MessageVersion {
    pub const NONE: Self = Self::new(EnvelopeVersion::None, AddressingVersion::None);
    pub const SOAP11: Self = Self::new(EnvelopeVersion::Soap11, AddressingVersion::None);
    pub const SOAP11_WSADDRESSING10: Self =
        Self::new(EnvelopeVersion::Soap11, AddressingVersion::WsAddressing10);
    pub const SOAP12_WSADDRESSING_AUGUST2004: Self =
        Self::new(EnvelopeVersion::Soap12, AddressingVersion::WsAddressingAugust2004);
    pub const SOAP12_WSADDRESSING10: Self =
        Self::new(EnvelopeVersion::Soap12, AddressingVersion::WsAddressing10);

    pub const fn new(envelope: EnvelopeVersion, addressing: AddressingVersion) -> Self {
        Self {
            envelope,
            addressing,
        }
    }
}

impl fmt::Display for MessageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.envelope, self.addressing)
    }
}

/// Combination of WS-Security, WS-Trust, WS-SecureConversation and
/// WS-SecurityPolicy revisions used by a message security element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum MessageSecurityVersion {
    WsSecurity10WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11BasicSecurityProfile10 = 0,
    WsSecurity11WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11 = 1,
    WsSecurity10WsTrust13WsSecureConversation13WsSecurityPolicy12BasicSecurityProfile10 = 2,
    WsSecurity11WsTrust13WsSecureConversation13WsSecurityPolicy12 = 3,
}

closed_enum!(
    MessageSecurityVersion,
    "MessageSecurityVersion",
    [
        WsSecurity10WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11BasicSecurityProfile10,
        WsSecurity11WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11,
        WsSecurity10WsTrust13WsSecureConversation13WsSecurityPolicy12BasicSecurityProfile10,
        WsSecurity11WsTrust13WsSecureConversation13WsSecurityPolicy12,
    ]
);

struct SecurityVersionEntry {
    wss_namespace: &'static str,
    trust_namespace: &'static str,
    secure_conversation_namespace: &'static str,
    policy_namespace: &'static str,
    basic_security_profile: bool,
}

const TRUST_FEB_2005: &str = "http://schemas.xmlsoap.org/ws/2005/02/trust";
const TRUST_13: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";
const SC_FEB_2005: &str = "http://schemas.xmlsoap.org/ws/2005/02/sc";
const SC_13: &str = "http://docs.oasis-open.org/ws-sx/ws-secureconversation/200512";
const SP_11: &str = "http://schemas.xmlsoap.org/ws/2005/07/securitypolicy";
const SP_12: &str = "http://docs.oasis-open.org/ws-sx/ws-securitypolicy/200702";

static SECURITY_VERSIONS: [SecurityVersionEntry; 4] = [
    SecurityVersionEntry {
        wss_namespace: WSSE_10_NS,
        trust_namespace: TRUST_FEB_2005,
        secure_conversation_namespace: SC_FEB_2005,
        policy_namespace: SP_11,
        basic_security_profile: true,
    },
    SecurityVersionEntry {
        wss_namespace: WSSE_11_NS,
        trust_namespace: TRUST_FEB_2005,
        secure_conversation_namespace: SC_FEB_2005,
        policy_namespace: SP_11,
        basic_security_profile: false,
    },
    SecurityVersionEntry {
        wss_namespace: WSSE_10_NS,
        trust_namespace: TRUST_13,
        secure_conversation_namespace: SC_13,
        policy_namespace: SP_12,
        basic_security_profile: true,
    },
    SecurityVersionEntry {
        wss_namespace: WSSE_11_NS,
        trust_namespace: TRUST_13,
        secure_conversation_namespace: SC_13,
        policy_namespace: SP_12,
        basic_security_profile: false,
    },
];

impl MessageSecurityVersion {
    fn entry(self) -> &'static SecurityVersionEntry {
        &SECURITY_VERSIONS[self as usize]
    }

    pub fn wss_namespace(self) -> &'static str {
        self.entry().wss_namespace
    }

    pub fn trust_namespace(self) -> &'static str {
        self.entry().trust_namespace
    }

    pub fn secure_conversation_namespace(self) -> &'static str {
        self.entry().secure_conversation_namespace
    }

    pub fn policy_namespace(self) -> &'static str {
        self.entry().policy_namespace
    }

    pub fn is_basic_security_profile(self) -> bool {
        self.entry().basic_security_profile
    }

    /// WS-Security 1.0 (as opposed to 1.1).
    pub fn is_ws_security_10(self) -> bool {
        self.wss_namespace() == WSSE_10_NS
    }
}

/// Default for Basic HTTP and Basic HTTPS message security.
pub const BASIC_HTTP_MESSAGE_SECURITY_VERSION: MessageSecurityVersion =
    MessageSecurityVersion::WsSecurity10WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11BasicSecurityProfile10;

/// Default for TCP and federation message security.
pub const DEFAULT_MESSAGE_SECURITY_VERSION: MessageSecurityVersion =
    MessageSecurityVersion::WsSecurity11WsTrustFebruary2005WsSecureConversationFebruary2005WsSecurityPolicy11;

/// Cryptographic algorithm suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum AlgorithmSuite {
    #[default]
    Basic256 = 0,
    Basic192 = 1,
    Basic128 = 2,
    TripleDes = 3,
    Basic256Sha256 = 4,
    Basic128Sha256 = 5,
}

closed_enum!(
    AlgorithmSuite,
    "SecurityAlgorithmSuite",
    [Basic256, Basic192, Basic128, TripleDes, Basic256Sha256, Basic128Sha256]
);

impl AlgorithmSuite {
    /// Policy assertion name.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Basic256 => "Basic256",
            Self::Basic192 => "Basic192",
            Self::Basic128 => "Basic128",
            Self::TripleDes => "TripleDes",
            Self::Basic256Sha256 => "Basic256Sha256",
            Self::Basic128Sha256 => "Basic128Sha256",
        }
    }

    /// Symmetric key length in bits.
    pub fn default_symmetric_key_length(self) -> u32 {
        match self {
            Self::Basic256 | Self::Basic256Sha256 => 256,
            Self::Basic192 | Self::TripleDes => 192,
            Self::Basic128 | Self::Basic128Sha256 => 128,
        }
    }
}

/// Transaction flow protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TransactionProtocol {
    #[default]
    OleTransactions = 0,
    WsAtomicTransactionOctober2004 = 1,
    WsAtomicTransaction11 = 2,
}

closed_enum!(
    TransactionProtocol,
    "TransactionProtocol",
    [OleTransactions, WsAtomicTransactionOctober2004, WsAtomicTransaction11]
);

static TRANSACTION_PROTOCOLS: [(&str, &str); 3] = [
    ("OleTransactions", "http://schemas.microsoft.com/ws/2006/02/tx/oletx"),
    (
        "WSAtomicTransactionOctober2004",
        "http://schemas.xmlsoap.org/ws/2004/10/wsat",
    ),
    (
        "WSAtomicTransaction11",
        "http://docs.oasis-open.org/ws-tx/wsat/2006/06",
    ),
];

impl TransactionProtocol {
    pub fn wire_name(self) -> &'static str {
        TRANSACTION_PROTOCOLS[self as usize].0
    }

    pub fn namespace(self) -> &'static str {
        TRANSACTION_PROTOCOLS[self as usize].1
    }

    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::VARIANTS.iter().copied().find(|p| p.wire_name() == name)
    }
}

/// WS-ReliableMessaging revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ReliableMessagingVersion {
    #[default]
    WsReliableMessagingFebruary2005 = 0,
    WsReliableMessaging11 = 1,
}

closed_enum!(
    ReliableMessagingVersion,
    "ReliableMessagingVersion",
    [WsReliableMessagingFebruary2005, WsReliableMessaging11]
);

impl ReliableMessagingVersion {
    pub fn namespace(self) -> &'static str {
        match self {
            Self::WsReliableMessagingFebruary2005 => "http://schemas.xmlsoap.org/ws/2005/02/rm",
            Self::WsReliableMessaging11 => "http://docs.oasis-open.org/ws-rx/wsrm/200702",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.namespace() == namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ClosedEnum;

    #[test]
    fn test_fault_names_per_envelope() {
        assert_eq!(EnvelopeVersion::Soap11.sender_fault_name(), "Client");
        assert_eq!(EnvelopeVersion::Soap11.receiver_fault_name(), "Server");
        assert_eq!(EnvelopeVersion::Soap12.sender_fault_name(), "Sender");
        assert_eq!(EnvelopeVersion::Soap12.receiver_fault_name(), "Receiver");
    }

    #[test]
    fn test_envelope_from_namespace() {
        assert_eq!(
            EnvelopeVersion::from_namespace(SOAP_12_NS),
            Some(EnvelopeVersion::Soap12)
        );
        assert_eq!(
            EnvelopeVersion::from_namespace(SOAP_11_NS),
            Some(EnvelopeVersion::Soap11)
        );
        assert_eq!(EnvelopeVersion::from_namespace("urn:other"), None);
    }

    #[test]
    fn test_addressing_actions() {
        assert_eq!(
            AddressingVersion::WsAddressing10.fault_action(),
            "http://www.w3.org/2005/08/addressing/fault"
        );
        assert_eq!(
            AddressingVersion::WsAddressing10.default_fault_action(),
            "http://www.w3.org/2005/08/addressing/soap/fault"
        );
        assert_eq!(AddressingVersion::None.fault_action(), "");
    }

    #[test]
    fn test_security_version_table() {
        let v = BASIC_HTTP_MESSAGE_SECURITY_VERSION;
        assert!(v.is_ws_security_10());
        assert!(v.is_basic_security_profile());
        assert_eq!(v.trust_namespace(), "http://schemas.xmlsoap.org/ws/2005/02/trust");

        let v = MessageSecurityVersion::WsSecurity11WsTrust13WsSecureConversation13WsSecurityPolicy12;
        assert!(!v.is_ws_security_10());
        assert_eq!(
            v.secure_conversation_namespace(),
            "http://docs.oasis-open.org/ws-sx/ws-secureconversation/200512"
        );
        assert_eq!(MessageSecurityVersion::VARIANTS.len(), SECURITY_VERSIONS.len());
    }

    #[test]
    fn test_algorithm_suite() {
        assert_eq!(AlgorithmSuite::default().wire_name(), "Basic256");
        assert_eq!(AlgorithmSuite::TripleDes.default_symmetric_key_length(), 192);
        assert!(!AlgorithmSuite::is_defined(6));
    }

    #[test]
    fn test_transaction_protocol_table() {
        assert_eq!(TransactionProtocol::VARIANTS.len(), TRANSACTION_PROTOCOLS.len());
        assert_eq!(
            TransactionProtocol::from_wire_name("WSAtomicTransaction11"),
            Some(TransactionProtocol::WsAtomicTransaction11)
        );
        assert_eq!(TransactionProtocol::from_wire_name("WSAT"), None);
        assert_eq!(
            TransactionProtocol::default().namespace(),
            "http://schemas.microsoft.com/ws/2006/02/tx/oletx"
        );
        assert!(TransactionProtocol::validate(3).is_err());
    }

    #[test]
    fn test_reliable_messaging_namespaces() {
        for version in ReliableMessagingVersion::VARIANTS.iter().copied() {
            assert_eq!(
                ReliableMessagingVersion::from_namespace(version.namespace()),
                Some(version)
            );
        }
        assert!(!ReliableMessagingVersion::is_defined(2));
    }
}
