//! Binding elements and the ordered sequence consumed by channel construction.
//!
//! A sequence is always `security? -> encoding -> transport`.

use crate::error::{BindingError, Result};
use crate::message::SecurityBindingElement;
use crate::mode::closed_enum;
use crate::transport::TransportElement;
use crate::version::MessageVersion;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message encoder kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EncodingKind {
    #[default]
    Text = 0,
    Binary = 1,
    Mtom = 2,
}

closed_enum!(EncodingKind, "EncodingKind", [Text, Binary, Mtom]);

impl EncodingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Mtom => "mtom",
        }
    }
}

/// Encoding binding element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingElement {
    pub kind: EncodingKind,
    pub message_version: MessageVersion,
}

/// One stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "element", rename_all = "snake_case")]
pub enum BindingElement {
    Security(SecurityBindingElement),
    Encoding(EncodingElement),
    Transport(TransportElement),
}

impl BindingElement {
    pub fn kind(&self) -> BindingElementKind {
        match self {
            Self::Security(_) => BindingElementKind::Security,
            Self::Encoding(_) => BindingElementKind::Encoding,
            Self::Transport(_) => BindingElementKind::Transport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingElementKind {
    Security,
    Encoding,
    Transport,
}

impl fmt::Display for BindingElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Security => "security",
            Self::Encoding => "encoding",
            Self::Transport => "transport",
        };
        f.write_str(name)
    }
}

/// Ordered binding elements with a validated shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<BindingElement>", into = "Vec<BindingElement>")]
pub struct BindingElementSequence {
    elements: Vec<BindingElement>,
}

impl BindingElementSequence {
    /// Validate the shape of `elements`: two or three entries, an optional
    /// leading security element, exactly one encoding, transport last.
    pub fn new(elements: Vec<BindingElement>) -> Result<Self> {
        let kinds: Vec<BindingElementKind> = elements.iter().map(BindingElement::kind).collect();
        let valid = matches!(
            kinds.as_slice(),
            [BindingElementKind::Encoding, BindingElementKind::Transport]
                | [
                    BindingElementKind::Security,
                    BindingElementKind::Encoding,
                    BindingElementKind::Transport
                ]
        );
        if !valid {
            let shape = kinds
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(BindingError::unsupported(format!(
                "binding element sequence must be security? -> encoding -> transport, got [{shape}]"
            )));
        }
        Ok(Self { elements })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BindingElement> {
        self.elements.iter()
    }

    pub fn kinds(&self) -> Vec<BindingElementKind> {
        self.elements.iter().map(BindingElement::kind).collect()
    }

    pub fn security(&self) -> Option<&SecurityBindingElement> {
        match self.elements.first() {
            Some(BindingElement::Security(security)) => Some(security),
            _ => None,
        }
    }

    pub fn encoding(&self) -> &EncodingElement {
        self.elements
            .iter()
            .find_map(|element| match element {
                BindingElement::Encoding(encoding) => Some(encoding),
                _ => None,
            })
            .unwrap_or_else(|| unreachable!("validated sequence has an encoding element"))
    }

    pub fn transport(&self) -> &TransportElement {
        match self.elements.last() {
            Some(BindingElement::Transport(transport)) => transport,
            _ => unreachable!("validated sequence ends with a transport element"),
        }
    }

    pub fn into_elements(self) -> Vec<BindingElement> {
        self.elements
    }
}

impl TryFrom<Vec<BindingElement>> for BindingElementSequence {
    type Error = BindingError;

    fn try_from(elements: Vec<BindingElement>) -> Result<Self> {
        Self::new(elements)
    }
}

impl From<BindingElementSequence> for Vec<BindingElement> {
    fn from(sequence: BindingElementSequence) -> Self {
        sequence.elements
    }
}

impl<'a> IntoIterator for &'a BindingElementSequence {
    type Item = &'a BindingElement;
    type IntoIter = std::slice::Iter<'a, BindingElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Standard binding families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingFamily {
    BasicHttp,
    BasicHttps,
    WsFederationHttp,
    NetTcp,
    NetNamedPipe,
}

impl BindingFamily {
    pub const ALL: [Self; 5] = [
        Self::BasicHttp,
        Self::BasicHttps,
        Self::WsFederationHttp,
        Self::NetTcp,
        Self::NetNamedPipe,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::BasicHttp => "BasicHttp",
            Self::BasicHttps => "BasicHttps",
            Self::WsFederationHttp => "WSFederationHttp",
            Self::NetTcp => "NetTcp",
            Self::NetNamedPipe => "NetNamedPipe",
        }
    }

    pub fn supported_encodings(self) -> &'static [EncodingKind] {
        match self {
            Self::BasicHttp | Self::BasicHttps | Self::WsFederationHttp => {
                &[EncodingKind::Text, EncodingKind::Mtom]
            }
            Self::NetTcp | Self::NetNamedPipe => &[EncodingKind::Binary, EncodingKind::Text],
        }
    }

    pub fn default_encoding(self) -> EncodingKind {
        self.supported_encodings()[0]
    }

    pub fn supports_encoding(self, kind: EncodingKind) -> bool {
        self.supported_encodings().contains(&kind)
    }

    pub fn message_version(self) -> MessageVersion {
        match self {
            Self::BasicHttp | Self::BasicHttps => MessageVersion::SOAP11,
            Self::WsFederationHttp | Self::NetTcp | Self::NetNamedPipe => {
                MessageVersion::SOAP12_WSADDRESSING10
            }
        }
    }

    /// Fail when `kind` is not declared by this family.
    pub fn check_encoding(self, kind: EncodingKind) -> Result<()> {
        if self.supports_encoding(kind) {
            Ok(())
        } else {
            Err(BindingError::UnsupportedEncoding {
                encoding: kind.as_str(),
                family: self.name(),
            })
        }
    }

    pub fn encoding_element(self, kind: EncodingKind) -> Result<EncodingElement> {
        self.check_encoding(kind)?;
        Ok(EncodingElement {
            kind,
            message_version: self.message_version(),
        })
    }
}

impl fmt::Display for BindingFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{AuthenticationMode, SecurityBindingElement};
    use crate::transport::HttpTransportElement;
    use crate::version::{AlgorithmSuite, BASIC_HTTP_MESSAGE_SECURITY_VERSION};

    fn encoding() -> BindingElement {
        BindingElement::Encoding(EncodingElement {
            kind: EncodingKind::Text,
            message_version: MessageVersion::SOAP11,
        })
    }

    fn transport() -> BindingElement {
        BindingElement::Transport(TransportElement::Http(HttpTransportElement::http()))
    }

    fn security() -> BindingElement {
        BindingElement::Security(SecurityBindingElement::new(
            AuthenticationMode::MutualCertificate,
            BASIC_HTTP_MESSAGE_SECURITY_VERSION,
            AlgorithmSuite::Basic256,
        ))
    }

    #[test]
    fn test_sequence_accepts_valid_shapes() {
        let short = BindingElementSequence::new(vec![encoding(), transport()]).unwrap();
        assert_eq!(short.len(), 2);
        assert!(short.security().is_none());

        let full = BindingElementSequence::new(vec![security(), encoding(), transport()]).unwrap();
        assert_eq!(
            full.kinds(),
            vec![
                BindingElementKind::Security,
                BindingElementKind::Encoding,
                BindingElementKind::Transport
            ]
        );
        assert!(full.security().is_some());
        assert_eq!(full.encoding().kind, EncodingKind::Text);
        assert_eq!(full.transport().scheme(), "http");
    }

    #[test]
    fn test_sequence_rejects_bad_shapes() {
        assert!(BindingElementSequence::new(vec![transport()]).is_err());
        assert!(BindingElementSequence::new(vec![transport(), encoding()]).is_err());
        assert!(BindingElementSequence::new(vec![encoding(), security(), transport()]).is_err());
        assert!(BindingElementSequence::new(vec![
            security(),
            encoding(),
            encoding(),
            transport()
        ])
        .is_err());
    }

    #[test]
    fn test_sequence_deserialize_validates() {
        let json = serde_json::to_string(&vec![transport(), encoding()]).unwrap();
        assert!(serde_json::from_str::<BindingElementSequence>(&json).is_err());

        let json = serde_json::to_string(&vec![encoding(), transport()]).unwrap();
        let sequence: BindingElementSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(sequence.len(), 2);
    }

    #[test]
    fn test_family_encodings() {
        assert!(BindingFamily::BasicHttp.supports_encoding(EncodingKind::Mtom));
        assert!(!BindingFamily::BasicHttp.supports_encoding(EncodingKind::Binary));
        assert!(BindingFamily::NetTcp.supports_encoding(EncodingKind::Binary));
        assert_eq!(BindingFamily::NetTcp.default_encoding(), EncodingKind::Binary);

        let err = BindingFamily::NetNamedPipe
            .check_encoding(EncodingKind::Mtom)
            .unwrap_err();
        assert!(matches!(
            err,
            BindingError::UnsupportedEncoding {
                encoding: "mtom",
                family: "NetNamedPipe"
            }
        ));
    }

    #[test]
    fn test_family_message_versions() {
        assert_eq!(
            BindingFamily::BasicHttps.message_version(),
            MessageVersion::SOAP11
        );
        assert_eq!(
            BindingFamily::WsFederationHttp.message_version(),
            MessageVersion::SOAP12_WSADDRESSING10
        );
    }
}
