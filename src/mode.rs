//! Security mode taxonomy.
//!
//! Each binding family owns a closed security mode enumeration. The
//! [`UnifiedSecurityMode`] bit set spans all of them and is only used as an
//! intermediate value when translating between families.

use crate::error::{BindingError, Result};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A closed enumeration with explicit numeric discriminants.
pub trait ClosedEnum: Copy + Debug + PartialEq + Sized + 'static {
    /// Type name cited in validation errors.
    const TYPE_NAME: &'static str;
    /// Every defined member, in declaration order.
    const VARIANTS: &'static [Self];

    /// Numeric discriminant of this member.
    fn raw(self) -> i32;

    /// Whether `raw` is the discriminant of a defined member.
    fn is_defined(raw: i64) -> bool {
        Self::VARIANTS.iter().any(|v| i64::from(v.raw()) == raw)
    }

    /// Convert a raw discriminant, failing on undefined values.
    fn from_raw(raw: i64) -> Result<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| i64::from(v.raw()) == raw)
            .ok_or(BindingError::InvalidEnumValue {
                value: raw,
                type_name: Self::TYPE_NAME,
            })
    }

    /// Fail with an invalid-value error when `raw` is not defined.
    fn validate(raw: i64) -> Result<()> {
        Self::from_raw(raw).map(|_| ())
    }
}

macro_rules! closed_enum {
    ($ty:ty, $name:literal, [$($variant:ident),+ $(,)?]) => {
        impl $crate::mode::ClosedEnum for $ty {
            const TYPE_NAME: &'static str = $name;
            const VARIANTS: &'static [Self] = &[$(Self::$variant),+];

            fn raw(self) -> i32 {
                self as i32
            }
        }
    };
}
pub(crate) use closed_enum;

bitflags! {
    /// Superset of every family's security modes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct UnifiedSecurityMode: u32 {
        const NONE = 0x001;
        const TRANSPORT = 0x004;
        const MESSAGE = 0x008;
        const BOTH = 0x010;
        const TRANSPORT_WITH_MESSAGE_CREDENTIAL = 0x020;
        const TRANSPORT_CREDENTIAL_ONLY = 0x040;
    }
}

impl UnifiedSecurityMode {
    /// Bits whose modes carry a message security element.
    pub const MESSAGE_BEARING: Self = Self::MESSAGE
        .union(Self::BOTH)
        .union(Self::TRANSPORT_WITH_MESSAGE_CREDENTIAL);
}

/// What a security mode asks of the transport element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportPosture {
    /// No transport security at all.
    Unsecured,
    /// Integrity and confidentiality, no client authentication.
    ProtectionOnly,
    /// Integrity, confidentiality and client authentication.
    ProtectionAndAuthentication,
    /// Client authentication over an unprotected transport.
    AuthenticationOnly,
}

impl TransportPosture {
    /// Posture implied by a single unified mode bit.
    pub fn of(mode: UnifiedSecurityMode) -> Self {
        if mode.intersects(UnifiedSecurityMode::TRANSPORT | UnifiedSecurityMode::BOTH) {
            Self::ProtectionAndAuthentication
        } else if mode.contains(UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL) {
            Self::ProtectionOnly
        } else if mode.contains(UnifiedSecurityMode::TRANSPORT_CREDENTIAL_ONLY) {
            Self::AuthenticationOnly
        } else {
            Self::Unsecured
        }
    }

    /// Whether the transport must provide protection (TLS or stream security).
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            Self::ProtectionOnly | Self::ProtectionAndAuthentication
        )
    }

    /// Whether the transport carries client authentication.
    pub fn authenticates_client(self) -> bool {
        matches!(
            self,
            Self::ProtectionAndAuthentication | Self::AuthenticationOnly
        )
    }
}

/// A per-family security mode enumeration.
pub trait FamilySecurityMode: ClosedEnum {
    /// Unified bits this family can represent.
    const UNIFIED_MASK: UnifiedSecurityMode;

    /// Widen into the unified bit set.
    fn to_unified(self) -> UnifiedSecurityMode;

    /// Project a unified value onto this family.
    ///
    /// Bits outside [`Self::UNIFIED_MASK`] are masked out first. The residual
    /// must name exactly one member; anything else is an error.
    fn from_unified(mode: UnifiedSecurityMode) -> Result<Self> {
        let masked = mode & Self::UNIFIED_MASK;
        Self::VARIANTS
            .iter()
            .copied()
            .find(|v| v.to_unified() == masked)
            .ok_or(BindingError::UnmappedUnifiedMode {
                bits: mode.bits(),
                type_name: Self::TYPE_NAME,
            })
    }

    fn posture(self) -> TransportPosture {
        TransportPosture::of(self.to_unified())
    }

    fn requires_message_security(self) -> bool {
        self.to_unified()
            .intersects(UnifiedSecurityMode::MESSAGE_BEARING)
    }

    /// Message security bound to a secure transport (mixed mode).
    fn is_transport_bound(self) -> bool {
        self.to_unified() == UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
    }

    /// Members admitted by `mask`, in declaration order.
    fn candidates(mask: UnifiedSecurityMode) -> Vec<Self> {
        Self::VARIANTS
            .iter()
            .copied()
            .filter(|v| mask.contains(v.to_unified()))
            .collect()
    }
}

/// Security modes of the Basic HTTP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BasicHttpSecurityMode {
    #[default]
    None = 0,
    Transport = 1,
    Message = 2,
    TransportWithMessageCredential = 3,
    TransportCredentialOnly = 4,
}

closed_enum!(
    BasicHttpSecurityMode,
    "BasicHttpSecurityMode",
    [None, Transport, Message, TransportWithMessageCredential, TransportCredentialOnly]
);

impl FamilySecurityMode for BasicHttpSecurityMode {
    const UNIFIED_MASK: UnifiedSecurityMode = UnifiedSecurityMode::NONE
        .union(UnifiedSecurityMode::TRANSPORT)
        .union(UnifiedSecurityMode::MESSAGE)
        .union(UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL)
        .union(UnifiedSecurityMode::TRANSPORT_CREDENTIAL_ONLY);

    fn to_unified(self) -> UnifiedSecurityMode {
        match self {
            Self::None => UnifiedSecurityMode::NONE,
            Self::Transport => UnifiedSecurityMode::TRANSPORT,
            Self::Message => UnifiedSecurityMode::MESSAGE,
            Self::TransportWithMessageCredential => {
                UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
            }
            Self::TransportCredentialOnly => UnifiedSecurityMode::TRANSPORT_CREDENTIAL_ONLY,
        }
    }
}

/// Security modes of the Basic HTTPS binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BasicHttpsSecurityMode {
    #[default]
    Transport = 0,
    TransportWithMessageCredential = 1,
}

closed_enum!(
    BasicHttpsSecurityMode,
    "BasicHttpsSecurityMode",
    [Transport, TransportWithMessageCredential]
);

impl FamilySecurityMode for BasicHttpsSecurityMode {
    const UNIFIED_MASK: UnifiedSecurityMode = UnifiedSecurityMode::TRANSPORT
        .union(UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL);

    fn to_unified(self) -> UnifiedSecurityMode {
        match self {
            Self::Transport => UnifiedSecurityMode::TRANSPORT,
            Self::TransportWithMessageCredential => {
                UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
            }
        }
    }
}

impl From<BasicHttpsSecurityMode> for BasicHttpSecurityMode {
    fn from(mode: BasicHttpsSecurityMode) -> Self {
        match mode {
            BasicHttpsSecurityMode::Transport => Self::Transport,
            BasicHttpsSecurityMode::TransportWithMessageCredential => {
                Self::TransportWithMessageCredential
            }
        }
    }
}

/// Security modes of the Net TCP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum SecurityMode {
    None = 0,
    #[default]
    Transport = 1,
    Message = 2,
    TransportWithMessageCredential = 3,
}

closed_enum!(
    SecurityMode,
    "SecurityMode",
    [None, Transport, Message, TransportWithMessageCredential]
);

impl FamilySecurityMode for SecurityMode {
    const UNIFIED_MASK: UnifiedSecurityMode = UnifiedSecurityMode::NONE
        .union(UnifiedSecurityMode::TRANSPORT)
        .union(UnifiedSecurityMode::MESSAGE)
        .union(UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL);

    fn to_unified(self) -> UnifiedSecurityMode {
        match self {
            Self::None => UnifiedSecurityMode::NONE,
            Self::Transport => UnifiedSecurityMode::TRANSPORT,
            Self::Message => UnifiedSecurityMode::MESSAGE,
            Self::TransportWithMessageCredential => {
                UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
            }
        }
    }
}

/// Security modes of the Net Named Pipe binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum NetNamedPipeSecurityMode {
    None = 0,
    #[default]
    Transport = 1,
}

closed_enum!(NetNamedPipeSecurityMode, "NetNamedPipeSecurityMode", [None, Transport]);

impl FamilySecurityMode for NetNamedPipeSecurityMode {
    const UNIFIED_MASK: UnifiedSecurityMode =
        UnifiedSecurityMode::NONE.union(UnifiedSecurityMode::TRANSPORT);

    fn to_unified(self) -> UnifiedSecurityMode {
        match self {
            Self::None => UnifiedSecurityMode::NONE,
            Self::Transport => UnifiedSecurityMode::TRANSPORT,
        }
    }
}

/// Security modes of the WS-Federation HTTP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum WsFederationHttpSecurityMode {
    None = 0,
    #[default]
    Message = 1,
    TransportWithMessageCredential = 2,
}

closed_enum!(
    WsFederationHttpSecurityMode,
    "WSFederationHttpSecurityMode",
    [None, Message, TransportWithMessageCredential]
);

impl FamilySecurityMode for WsFederationHttpSecurityMode {
    const UNIFIED_MASK: UnifiedSecurityMode = UnifiedSecurityMode::NONE
        .union(UnifiedSecurityMode::MESSAGE)
        .union(UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL);

    fn to_unified(self) -> UnifiedSecurityMode {
        match self {
            Self::None => UnifiedSecurityMode::NONE,
            Self::Message => UnifiedSecurityMode::MESSAGE,
            Self::TransportWithMessageCredential => {
                UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
            }
        }
    }
}

/// Transport protection level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum ProtectionLevel {
    None = 0,
    Sign = 1,
    #[default]
    EncryptAndSign = 2,
}

closed_enum!(ProtectionLevel, "ProtectionLevel", [None, Sign, EncryptAndSign]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_defined_bounds() {
        assert!(BasicHttpSecurityMode::is_defined(0));
        assert!(BasicHttpSecurityMode::is_defined(4));
        assert!(!BasicHttpSecurityMode::is_defined(5));
        assert!(!BasicHttpSecurityMode::is_defined(-1));
        assert!(SecurityMode::is_defined(3));
        assert!(!SecurityMode::is_defined(4));
        assert!(!NetNamedPipeSecurityMode::is_defined(2));
        assert!(ProtectionLevel::is_defined(2));
        assert!(!ProtectionLevel::is_defined(3));
    }

    #[test]
    fn test_from_raw_rejects_undefined() {
        assert_eq!(
            SecurityMode::from_raw(2).unwrap(),
            SecurityMode::Message
        );
        let err = SecurityMode::from_raw(9).unwrap_err();
        match err {
            BindingError::InvalidEnumValue { value, type_name } => {
                assert_eq!(value, 9);
                assert_eq!(type_name, "SecurityMode");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ProtectionLevel::validate(1).is_ok());
        assert!(ProtectionLevel::validate(-3).is_err());
    }

    #[test]
    fn test_unified_round_trip_for_every_member() {
        for mode in BasicHttpSecurityMode::VARIANTS {
            let unified = mode.to_unified();
            assert_eq!(BasicHttpSecurityMode::from_unified(unified).unwrap(), *mode);
        }
        for mode in WsFederationHttpSecurityMode::VARIANTS {
            let unified = mode.to_unified();
            assert_eq!(
                WsFederationHttpSecurityMode::from_unified(unified).unwrap(),
                *mode
            );
        }
    }

    #[test]
    fn test_projection_masks_foreign_bits() {
        // BOTH is not representable by the TCP family and is masked away.
        let mode = UnifiedSecurityMode::MESSAGE | UnifiedSecurityMode::BOTH;
        assert_eq!(SecurityMode::from_unified(mode).unwrap(), SecurityMode::Message);
    }

    #[test]
    fn test_projection_residual_is_error() {
        let ambiguous =
            UnifiedSecurityMode::MESSAGE | UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL;
        assert!(matches!(
            BasicHttpSecurityMode::from_unified(ambiguous),
            Err(BindingError::UnmappedUnifiedMode { .. })
        ));
        // Nothing left after masking.
        assert!(NetNamedPipeSecurityMode::from_unified(UnifiedSecurityMode::MESSAGE).is_err());
    }

    #[test]
    fn test_postures() {
        assert_eq!(
            BasicHttpSecurityMode::None.posture(),
            TransportPosture::Unsecured
        );
        assert_eq!(
            BasicHttpSecurityMode::Message.posture(),
            TransportPosture::Unsecured
        );
        assert_eq!(
            BasicHttpSecurityMode::TransportWithMessageCredential.posture(),
            TransportPosture::ProtectionOnly
        );
        assert_eq!(
            BasicHttpSecurityMode::TransportCredentialOnly.posture(),
            TransportPosture::AuthenticationOnly
        );
        assert_eq!(
            SecurityMode::Transport.posture(),
            TransportPosture::ProtectionAndAuthentication
        );
    }

    #[test]
    fn test_message_security_requirements() {
        assert!(SecurityMode::Message.requires_message_security());
        assert!(SecurityMode::TransportWithMessageCredential.requires_message_security());
        assert!(!SecurityMode::Transport.requires_message_security());
        assert!(SecurityMode::TransportWithMessageCredential.is_transport_bound());
        assert!(!SecurityMode::Message.is_transport_bound());
    }

    #[test]
    fn test_candidates_respect_mask() {
        let mask = UnifiedSecurityMode::MESSAGE
            | UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL;
        assert_eq!(
            BasicHttpSecurityMode::candidates(mask),
            vec![
                BasicHttpSecurityMode::Message,
                BasicHttpSecurityMode::TransportWithMessageCredential
            ]
        );
    }

    #[test]
    fn test_https_mode_widens_to_basic_http() {
        assert_eq!(
            BasicHttpSecurityMode::from(BasicHttpsSecurityMode::TransportWithMessageCredential),
            BasicHttpSecurityMode::TransportWithMessageCredential
        );
    }
}
