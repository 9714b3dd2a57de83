//! Binding families: synthesis of element sequences and recognition of
//! sequences recovered from metadata.

use crate::error::{BindingError, Result};
use crate::message::{
    BasicHttpMessageSecurity, FederatedMessageSecurityOverHttp, MessageSecurityDescriptor,
    MessageSecurityOverTcp, SecurityBindingElement,
};
use crate::mode::{
    BasicHttpSecurityMode, BasicHttpsSecurityMode, FamilySecurityMode, NetNamedPipeSecurityMode,
    SecurityMode, TransportPosture, UnifiedSecurityMode, WsFederationHttpSecurityMode,
};
use crate::pipeline::{BindingElement, BindingElementSequence, BindingFamily, EncodingKind};
use crate::transport::{
    HttpTransportElement, HttpTransportSecurity, NamedPipeTransportElement,
    NamedPipeTransportSecurity, TcpTransportElement, TcpTransportSecurity, TransportElement,
    TransportSecurityDescriptor,
};
use serde::Serialize;
use tracing::{debug, trace, warn};

/// A binding family that can synthesize and recognize element sequences.
pub trait SecurityBinding: Sized {
    type Mode: FamilySecurityMode;

    const FAMILY: BindingFamily;

    fn security_mode(&self) -> Self::Mode;

    /// Build the `security? -> encoding -> transport` sequence.
    ///
    /// An unsupported encoding fails before any element is built.
    fn create_elements(&self) -> Result<BindingElementSequence>;

    /// Reconstruct a configuration from `sequence`, accepting only modes
    /// whose unified bit is in `mask`.
    fn try_recover_with(sequence: &BindingElementSequence, mask: UnifiedSecurityMode)
        -> Option<Self>;

    fn try_recover(sequence: &BindingElementSequence) -> Option<Self> {
        Self::try_recover_with(sequence, Self::Mode::UNIFIED_MASK)
    }

    /// Reset settings the current mode never writes onto an element.
    fn normalized(&self) -> Self;
}

fn assemble<M, S>(
    family: BindingFamily,
    mode: M,
    encoding: EncodingKind,
    message: Option<&S>,
    transport: impl FnOnce(TransportPosture) -> Result<TransportElement>,
) -> Result<BindingElementSequence>
where
    M: FamilySecurityMode,
    S: MessageSecurityDescriptor,
{
    let encoding = family.encoding_element(encoding)?;

    let mut elements = Vec::with_capacity(3);
    if mode.requires_message_security() {
        let message = message.ok_or_else(|| {
            BindingError::unsupported(format!("{family} has no message security for {mode:?}"))
        })?;
        let security = message.create_security_element(mode.is_transport_bound())?;
        elements.push(BindingElement::Security(security));
    }
    elements.push(BindingElement::Encoding(encoding));
    elements.push(BindingElement::Transport(transport(mode.posture())?));

    BindingElementSequence::new(elements)
}

fn synthesize<M, S>(
    family: BindingFamily,
    mode: M,
    encoding: EncodingKind,
    message: Option<&S>,
    transport: impl FnOnce(TransportPosture) -> Result<TransportElement>,
) -> Result<BindingElementSequence>
where
    M: FamilySecurityMode,
    S: MessageSecurityDescriptor,
{
    match assemble(family, mode, encoding, message, transport) {
        Ok(sequence) => {
            debug!(
                %family,
                ?mode,
                encoding = encoding.as_str(),
                elements = sequence.len(),
                "Synthesized binding elements"
            );
            Ok(sequence)
        }
        Err(err) => {
            warn!(%family, ?mode, error = %err, "Binding configuration rejected");
            Err(err)
        }
    }
}

fn recover_encoding(family: BindingFamily, sequence: &BindingElementSequence) -> Option<EncodingKind> {
    let encoding = sequence.encoding();
    if !family.supports_encoding(encoding.kind) || encoding.message_version != family.message_version()
    {
        trace!(
            %family,
            kind = encoding.kind.as_str(),
            version = %encoding.message_version,
            "Encoding not expressible by family"
        );
        return None;
    }
    Some(encoding.kind)
}

/// Pick the first non-message mode whose posture the transport matches.
fn recover_transport_only<M, T>(mask: UnifiedSecurityMode, element: &T::Element) -> Option<(M, T)>
where
    M: FamilySecurityMode,
    T: TransportSecurityDescriptor,
{
    M::candidates(mask & M::UNIFIED_MASK)
        .into_iter()
        .filter(|mode| !mode.requires_message_security())
        .find_map(|mode| T::recognize(mode.posture(), element).map(|transport| (mode, transport)))
}

fn recover_with_message<M, T, S>(
    mask: UnifiedSecurityMode,
    security: &SecurityBindingElement,
    transport: &TransportElement,
    element: &T::Element,
) -> Option<(M, T, S)>
where
    M: FamilySecurityMode,
    T: TransportSecurityDescriptor,
    S: MessageSecurityDescriptor,
{
    let mask = mask & M::UNIFIED_MASK;
    let recognized = S::try_recognize(security, mask & UnifiedSecurityMode::MESSAGE_BEARING, transport)?;
    let mode = M::candidates(mask).into_iter().find(|mode| {
        mode.requires_message_security() && mode.is_transport_bound() == recognized.is_transport_bound
    })?;
    let transport = T::recognize(mode.posture(), element)?;
    Some((mode, transport, recognized.descriptor))
}

fn normalized_message<M, S>(mode: M, message: &S) -> S
where
    M: FamilySecurityMode,
    S: MessageSecurityDescriptor + Default,
{
    if mode.requires_message_security() {
        message.normalized(mode.is_transport_bound())
    } else {
        S::default()
    }
}

fn http_transport(
    security: &HttpTransportSecurity,
    posture: TransportPosture,
) -> Result<TransportElement> {
    let mut http = HttpTransportElement::http();
    security.configure(posture, &mut http)?;
    Ok(TransportElement::Http(http))
}

/// Basic HTTP binding (SOAP 1.1, no addressing).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BasicHttpBinding {
    pub mode: BasicHttpSecurityMode,
    pub transport: HttpTransportSecurity,
    pub message: BasicHttpMessageSecurity,
    pub encoding: EncodingKind,
}

impl BasicHttpBinding {
    pub fn new(mode: BasicHttpSecurityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: HttpTransportSecurity) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_message(mut self, message: BasicHttpMessageSecurity) -> Self {
        self.message = message;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl SecurityBinding for BasicHttpBinding {
    type Mode = BasicHttpSecurityMode;

    const FAMILY: BindingFamily = BindingFamily::BasicHttp;

    fn security_mode(&self) -> Self::Mode {
        self.mode
    }

    fn create_elements(&self) -> Result<BindingElementSequence> {
        synthesize(Self::FAMILY, self.mode, self.encoding, Some(&self.message), |posture| {
            http_transport(&self.transport, posture)
        })
    }

    fn try_recover_with(
        sequence: &BindingElementSequence,
        mask: UnifiedSecurityMode,
    ) -> Option<Self> {
        let encoding = recover_encoding(Self::FAMILY, sequence)?;
        let TransportElement::Http(http) = sequence.transport() else {
            return None;
        };
        match sequence.security() {
            None => {
                let (mode, transport) = recover_transport_only(mask, http)?;
                Some(Self {
                    mode,
                    transport,
                    message: BasicHttpMessageSecurity::default(),
                    encoding,
                })
            }
            Some(security) => {
                let (mode, transport, message) =
                    recover_with_message(mask, security, sequence.transport(), http)?;
                Some(Self {
                    mode,
                    transport,
                    message,
                    encoding,
                })
            }
        }
    }

    fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            transport: self.transport.normalized(self.mode.posture()),
            message: normalized_message(self.mode, &self.message),
            encoding: self.encoding,
        }
    }
}

/// Basic HTTPS binding: Basic HTTP restricted to secure transports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct BasicHttpsBinding {
    pub mode: BasicHttpsSecurityMode,
    pub transport: HttpTransportSecurity,
    pub message: BasicHttpMessageSecurity,
    pub encoding: EncodingKind,
}

impl BasicHttpsBinding {
    pub fn new(mode: BasicHttpsSecurityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: HttpTransportSecurity) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_message(mut self, message: BasicHttpMessageSecurity) -> Self {
        self.message = message;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl From<BasicHttpsBinding> for BasicHttpBinding {
    fn from(binding: BasicHttpsBinding) -> Self {
        Self {
            mode: binding.mode.into(),
            transport: binding.transport,
            message: binding.message,
            encoding: binding.encoding,
        }
    }
}

impl SecurityBinding for BasicHttpsBinding {
    type Mode = BasicHttpsSecurityMode;

    const FAMILY: BindingFamily = BindingFamily::BasicHttps;

    fn security_mode(&self) -> Self::Mode {
        self.mode
    }

    fn create_elements(&self) -> Result<BindingElementSequence> {
        synthesize(Self::FAMILY, self.mode, self.encoding, Some(&self.message), |posture| {
            let mut https = HttpTransportElement::https();
            self.transport.configure(posture, &mut https)?;
            Ok(TransportElement::Http(https))
        })
    }

    fn try_recover_with(
        sequence: &BindingElementSequence,
        mask: UnifiedSecurityMode,
    ) -> Option<Self> {
        let encoding = recover_encoding(Self::FAMILY, sequence)?;
        let TransportElement::Http(http) = sequence.transport() else {
            return None;
        };
        match sequence.security() {
            None => {
                let (mode, transport) = recover_transport_only(mask, http)?;
                Some(Self {
                    mode,
                    transport,
                    message: BasicHttpMessageSecurity::default(),
                    encoding,
                })
            }
            Some(security) => {
                let (mode, transport, message) =
                    recover_with_message(mask, security, sequence.transport(), http)?;
                Some(Self {
                    mode,
                    transport,
                    message,
                    encoding,
                })
            }
        }
    }

    fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            transport: self.transport.normalized(self.mode.posture()),
            message: normalized_message(self.mode, &self.message),
            encoding: self.encoding,
        }
    }
}

/// WS-Federation HTTP binding. Transport settings are fixed; only the
/// scheme follows the security mode.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WsFederationHttpBinding {
    pub mode: WsFederationHttpSecurityMode,
    pub message: FederatedMessageSecurityOverHttp,
    pub encoding: EncodingKind,
}

impl WsFederationHttpBinding {
    pub fn new(mode: WsFederationHttpSecurityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: FederatedMessageSecurityOverHttp) -> Self {
        self.message = message;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl SecurityBinding for WsFederationHttpBinding {
    type Mode = WsFederationHttpSecurityMode;

    const FAMILY: BindingFamily = BindingFamily::WsFederationHttp;

    fn security_mode(&self) -> Self::Mode {
        self.mode
    }

    fn create_elements(&self) -> Result<BindingElementSequence> {
        synthesize(Self::FAMILY, self.mode, self.encoding, Some(&self.message), |posture| {
            http_transport(&HttpTransportSecurity::default(), posture)
        })
    }

    fn try_recover_with(
        sequence: &BindingElementSequence,
        mask: UnifiedSecurityMode,
    ) -> Option<Self> {
        let encoding = recover_encoding(Self::FAMILY, sequence)?;
        let TransportElement::Http(http) = sequence.transport() else {
            return None;
        };
        let (mode, transport, message): (_, HttpTransportSecurity, _) = match sequence.security() {
            None => {
                let (mode, transport) = recover_transport_only(mask, http)?;
                (mode, transport, FederatedMessageSecurityOverHttp::default())
            }
            Some(security) => recover_with_message(mask, security, sequence.transport(), http)?,
        };
        if transport != HttpTransportSecurity::default() {
            trace!("federation binding cannot carry HTTP authentication settings");
            return None;
        }
        Some(Self {
            mode,
            message,
            encoding,
        })
    }

    fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            message: normalized_message(self.mode, &self.message),
            encoding: self.encoding,
        }
    }
}

/// Net TCP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetTcpBinding {
    pub mode: SecurityMode,
    pub transport: TcpTransportSecurity,
    pub message: MessageSecurityOverTcp,
    pub encoding: EncodingKind,
}

impl Default for NetTcpBinding {
    fn default() -> Self {
        Self {
            mode: SecurityMode::default(),
            transport: TcpTransportSecurity::default(),
            message: MessageSecurityOverTcp::default(),
            encoding: Self::FAMILY.default_encoding(),
        }
    }
}

impl NetTcpBinding {
    pub fn new(mode: SecurityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: TcpTransportSecurity) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_message(mut self, message: MessageSecurityOverTcp) -> Self {
        self.message = message;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl SecurityBinding for NetTcpBinding {
    type Mode = SecurityMode;

    const FAMILY: BindingFamily = BindingFamily::NetTcp;

    fn security_mode(&self) -> Self::Mode {
        self.mode
    }

    fn create_elements(&self) -> Result<BindingElementSequence> {
        synthesize(Self::FAMILY, self.mode, self.encoding, Some(&self.message), |posture| {
            let mut tcp = TcpTransportElement::default();
            self.transport.configure(posture, &mut tcp)?;
            Ok(TransportElement::Tcp(tcp))
        })
    }

    fn try_recover_with(
        sequence: &BindingElementSequence,
        mask: UnifiedSecurityMode,
    ) -> Option<Self> {
        let encoding = recover_encoding(Self::FAMILY, sequence)?;
        let TransportElement::Tcp(tcp) = sequence.transport() else {
            return None;
        };
        let (mode, transport, message): (SecurityMode, TcpTransportSecurity, _) = match sequence
            .security()
        {
            None => {
                let (mode, transport) = recover_transport_only(mask, tcp)?;
                (mode, transport, MessageSecurityOverTcp::default())
            }
            Some(security) => recover_with_message(mask, security, sequence.transport(), tcp)?,
        };
        Some(Self {
            mode,
            transport,
            message,
            encoding,
        })
    }

    fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            transport: self.transport.normalized(self.mode.posture()),
            message: normalized_message(self.mode, &self.message),
            encoding: self.encoding,
        }
    }
}

/// Net named pipe binding. Never carries message security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetNamedPipeBinding {
    pub mode: NetNamedPipeSecurityMode,
    pub transport: NamedPipeTransportSecurity,
    pub encoding: EncodingKind,
}

impl Default for NetNamedPipeBinding {
    fn default() -> Self {
        Self {
            mode: NetNamedPipeSecurityMode::default(),
            transport: NamedPipeTransportSecurity::default(),
            encoding: Self::FAMILY.default_encoding(),
        }
    }
}

impl NetNamedPipeBinding {
    pub fn new(mode: NetNamedPipeSecurityMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_transport(mut self, transport: NamedPipeTransportSecurity) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingKind) -> Self {
        self.encoding = encoding;
        self
    }
}

impl SecurityBinding for NetNamedPipeBinding {
    type Mode = NetNamedPipeSecurityMode;

    const FAMILY: BindingFamily = BindingFamily::NetNamedPipe;

    fn security_mode(&self) -> Self::Mode {
        self.mode
    }

    fn create_elements(&self) -> Result<BindingElementSequence> {
        synthesize(
            Self::FAMILY,
            self.mode,
            self.encoding,
            None::<&MessageSecurityOverTcp>,
            |posture| {
                let mut pipe = NamedPipeTransportElement::default();
                self.transport.configure(posture, &mut pipe)?;
                Ok(TransportElement::NamedPipe(pipe))
            },
        )
    }

    fn try_recover_with(
        sequence: &BindingElementSequence,
        mask: UnifiedSecurityMode,
    ) -> Option<Self> {
        if sequence.security().is_some() {
            trace!("named pipe binding never carries message security");
            return None;
        }
        let encoding = recover_encoding(Self::FAMILY, sequence)?;
        let TransportElement::NamedPipe(pipe) = sequence.transport() else {
            return None;
        };
        let (mode, transport) = recover_transport_only(mask, pipe)?;
        Some(Self {
            mode,
            transport,
            encoding,
        })
    }

    fn normalized(&self) -> Self {
        Self {
            mode: self.mode,
            transport: self.transport.normalized(self.mode.posture()),
            encoding: self.encoding,
        }
    }
}

/// A configuration of any standard binding family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum BindingConfiguration {
    BasicHttp(BasicHttpBinding),
    BasicHttps(BasicHttpsBinding),
    WsFederationHttp(WsFederationHttpBinding),
    NetTcp(NetTcpBinding),
    NetNamedPipe(NetNamedPipeBinding),
}

impl BindingConfiguration {
    pub fn family(&self) -> BindingFamily {
        match self {
            Self::BasicHttp(_) => BindingFamily::BasicHttp,
            Self::BasicHttps(_) => BindingFamily::BasicHttps,
            Self::WsFederationHttp(_) => BindingFamily::WsFederationHttp,
            Self::NetTcp(_) => BindingFamily::NetTcp,
            Self::NetNamedPipe(_) => BindingFamily::NetNamedPipe,
        }
    }

    /// Unified form of the configured security mode.
    pub fn unified_mode(&self) -> UnifiedSecurityMode {
        match self {
            Self::BasicHttp(b) => b.security_mode().to_unified(),
            Self::BasicHttps(b) => b.security_mode().to_unified(),
            Self::WsFederationHttp(b) => b.security_mode().to_unified(),
            Self::NetTcp(b) => b.security_mode().to_unified(),
            Self::NetNamedPipe(b) => b.security_mode().to_unified(),
        }
    }

    pub fn create_elements(&self) -> Result<BindingElementSequence> {
        match self {
            Self::BasicHttp(b) => b.create_elements(),
            Self::BasicHttps(b) => b.create_elements(),
            Self::WsFederationHttp(b) => b.create_elements(),
            Self::NetTcp(b) => b.create_elements(),
            Self::NetNamedPipe(b) => b.create_elements(),
        }
    }

    pub fn normalized(&self) -> Self {
        match self {
            Self::BasicHttp(b) => Self::BasicHttp(b.normalized()),
            Self::BasicHttps(b) => Self::BasicHttps(b.normalized()),
            Self::WsFederationHttp(b) => Self::WsFederationHttp(b.normalized()),
            Self::NetTcp(b) => Self::NetTcp(b.normalized()),
            Self::NetNamedPipe(b) => Self::NetNamedPipe(b.normalized()),
        }
    }

    /// Recognize `sequence` as a configuration of `family`.
    pub fn recover(family: BindingFamily, sequence: &BindingElementSequence) -> Option<Self> {
        match family {
            BindingFamily::BasicHttp => BasicHttpBinding::try_recover(sequence).map(Self::BasicHttp),
            BindingFamily::BasicHttps => {
                BasicHttpsBinding::try_recover(sequence).map(Self::BasicHttps)
            }
            BindingFamily::WsFederationHttp => {
                WsFederationHttpBinding::try_recover(sequence).map(Self::WsFederationHttp)
            }
            BindingFamily::NetTcp => NetTcpBinding::try_recover(sequence).map(Self::NetTcp),
            BindingFamily::NetNamedPipe => {
                NetNamedPipeBinding::try_recover(sequence).map(Self::NetNamedPipe)
            }
        }
    }

    /// Try every family in [`BindingFamily::ALL`] order and return the first
    /// that recognizes `sequence`.
    pub fn probe(sequence: &BindingElementSequence) -> Option<Self> {
        let found = BindingFamily::ALL.iter().find_map(|family| {
            let recovered = Self::recover(*family, sequence);
            if recovered.is_none() {
                trace!(%family, "Family does not recognize sequence");
            }
            recovered
        });
        match &found {
            Some(config) => debug!(family = %config.family(), "Recognized binding elements"),
            None => debug!(kinds = ?sequence.kinds(), "No family recognizes binding elements"),
        }
        found
    }
}

macro_rules! binding_configuration_from {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        $(
            impl From<$ty> for BindingConfiguration {
                fn from(binding: $ty) -> Self {
                    Self::$variant(binding)
                }
            }
        )+
    };
}

binding_configuration_from!(
    BasicHttp(BasicHttpBinding),
    BasicHttps(BasicHttpsBinding),
    WsFederationHttp(WsFederationHttpBinding),
    NetTcp(NetTcpBinding),
    NetNamedPipe(NetNamedPipeBinding),
);
