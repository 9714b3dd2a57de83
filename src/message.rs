//! Message security binding elements and the descriptors that create and
//! recognize them.

use crate::error::{validate_namespace, BindingError, Result};
use crate::mode::{closed_enum, UnifiedSecurityMode};
use crate::transport::TransportElement;
use crate::version::{
    AlgorithmSuite, MessageSecurityVersion, BASIC_HTTP_MESSAGE_SECURITY_VERSION,
    DEFAULT_MESSAGE_SECURITY_VERSION,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Key type requested for an issued token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum SecurityKeyType {
    #[default]
    SymmetricKey = 0,
    AsymmetricKey = 1,
    BearerKey = 2,
}

closed_enum!(SecurityKeyType, "SecurityKeyType", [SymmetricKey, AsymmetricKey, BearerKey]);

/// Parameters of a token issued by a security token service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IssuedTokenParameters {
    pub token_type: Option<String>,
    pub key_type: SecurityKeyType,
    pub issuer_address: Option<String>,
}

/// How a message security element authenticates the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AuthenticationMode {
    UserNameOverTransport,
    CertificateOverTransport,
    IssuedTokenOverTransport,
    SspiNegotiatedOverTransport,
    MutualCertificate,
    SslNegotiated { require_client_certificate: bool },
    UserNameForSslNegotiated,
    SspiNegotiated,
    IssuedTokenForSslNegotiated,
    IssuedTokenForCertificate,
    /// A secure conversation session bootstrapped by another element.
    SecureConversation { bootstrap: Box<SecurityBindingElement> },
}

impl AuthenticationMode {
    /// Whether the mode relies on transport protection.
    pub fn is_transport_bound(&self) -> bool {
        match self {
            Self::UserNameOverTransport
            | Self::CertificateOverTransport
            | Self::IssuedTokenOverTransport
            | Self::SspiNegotiatedOverTransport => true,
            Self::SecureConversation { bootstrap } => bootstrap.is_transport_bound(),
            _ => false,
        }
    }

    /// Whether the mode presents an issued (federated) token.
    pub fn uses_issued_token(&self) -> bool {
        match self {
            Self::IssuedTokenOverTransport
            | Self::IssuedTokenForSslNegotiated
            | Self::IssuedTokenForCertificate => true,
            Self::SecureConversation { bootstrap } => bootstrap.authentication_mode.uses_issued_token(),
            _ => false,
        }
    }
}

/// Shape of a security binding element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityElementKind {
    Transport,
    Symmetric,
    Asymmetric,
}

/// Message security binding element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityBindingElement {
    pub authentication_mode: AuthenticationMode,
    pub message_security_version: MessageSecurityVersion,
    pub algorithm_suite: AlgorithmSuite,
    pub include_timestamp: bool,
    pub issued_token: Option<IssuedTokenParameters>,
}

impl SecurityBindingElement {
    pub fn new(
        authentication_mode: AuthenticationMode,
        message_security_version: MessageSecurityVersion,
        algorithm_suite: AlgorithmSuite,
    ) -> Self {
        Self {
            authentication_mode,
            message_security_version,
            algorithm_suite,
            include_timestamp: true,
            issued_token: None,
        }
    }

    pub fn with_issued_token(mut self, issued_token: IssuedTokenParameters) -> Self {
        self.issued_token = Some(issued_token);
        self
    }

    /// Wrap `bootstrap` in a secure conversation element with the same
    /// version and algorithm suite.
    pub fn secure_conversation(bootstrap: Self) -> Self {
        Self {
            message_security_version: bootstrap.message_security_version,
            algorithm_suite: bootstrap.algorithm_suite,
            include_timestamp: bootstrap.include_timestamp,
            issued_token: None,
            authentication_mode: AuthenticationMode::SecureConversation {
                bootstrap: Box::new(bootstrap),
            },
        }
    }

    pub fn is_transport_bound(&self) -> bool {
        self.authentication_mode.is_transport_bound()
    }

    pub fn kind(&self) -> SecurityElementKind {
        if self.is_transport_bound() {
            return SecurityElementKind::Transport;
        }
        match self.authentication_mode {
            AuthenticationMode::MutualCertificate => SecurityElementKind::Asymmetric,
            _ => SecurityElementKind::Symmetric,
        }
    }

    /// The bootstrap element when this element establishes secure conversation.
    pub fn bootstrap(&self) -> Option<&SecurityBindingElement> {
        match &self.authentication_mode {
            AuthenticationMode::SecureConversation { bootstrap } => Some(bootstrap),
            _ => None,
        }
    }
}

/// A successfully recognized message security descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recognized<T> {
    pub descriptor: T,
    /// Mixed mode (transport protection plus message credentials).
    pub is_transport_bound: bool,
}

/// Settings that create and recognize a message security element.
pub trait MessageSecurityDescriptor: Sized {
    /// Whether this family establishes secure conversation by default.
    const ESTABLISH_SECURITY_CONTEXT_DEFAULT: bool;

    fn create_security_element(&self, is_transport_bound: bool) -> Result<SecurityBindingElement>;

    /// Recognize `element` under the unified bits admitted by `mask`.
    ///
    /// Transport-bound elements require the TransportWithMessageCredential
    /// bit and a secure `transport`; the rest require the Message bit.
    fn try_recognize(
        element: &SecurityBindingElement,
        mask: UnifiedSecurityMode,
        transport: &TransportElement,
    ) -> Option<Recognized<Self>>;

    /// Reset the fields that do not reach the element when `is_transport_bound`.
    fn normalized(&self, is_transport_bound: bool) -> Self;
}

/// Check that `mask` and `transport` admit an element.
fn admits(
    is_transport_bound: bool,
    mask: UnifiedSecurityMode,
    transport: &TransportElement,
) -> bool {
    let required = if is_transport_bound {
        UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
    } else {
        UnifiedSecurityMode::MESSAGE
    };
    if !mask.contains(required) {
        trace!(?mask, is_transport_bound, "message security excluded by mask");
        return false;
    }
    if is_transport_bound && !transport.is_secure() {
        trace!(scheme = transport.scheme(), "mixed mode needs a secure transport");
        return false;
    }
    true
}

/// Credential presented in Basic HTTP message security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum BasicHttpMessageCredentialType {
    #[default]
    UserName = 0,
    Certificate = 1,
}

closed_enum!(
    BasicHttpMessageCredentialType,
    "BasicHttpMessageCredentialType",
    [UserName, Certificate]
);

/// Message security for the Basic HTTP and Basic HTTPS bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BasicHttpMessageSecurity {
    client_credential_type: BasicHttpMessageCredentialType,
    algorithm_suite: AlgorithmSuite,
    message_security_version: MessageSecurityVersion,
}

impl Default for BasicHttpMessageSecurity {
    fn default() -> Self {
        Self {
            client_credential_type: BasicHttpMessageCredentialType::default(),
            algorithm_suite: AlgorithmSuite::default(),
            message_security_version: BASIC_HTTP_MESSAGE_SECURITY_VERSION,
        }
    }
}

impl BasicHttpMessageSecurity {
    pub fn new(
        client_credential_type: BasicHttpMessageCredentialType,
        algorithm_suite: AlgorithmSuite,
    ) -> Self {
        Self {
            client_credential_type,
            algorithm_suite,
            ..Self::default()
        }
    }

    /// Basic profile bindings only speak WS-Security 1.0.
    pub fn with_message_security_version(mut self, version: MessageSecurityVersion) -> Result<Self> {
        if !version.is_ws_security_10() {
            return Err(BindingError::unsupported(format!(
                "Basic HTTP message security requires WS-Security 1.0, got {version:?}"
            )));
        }
        self.message_security_version = version;
        Ok(self)
    }

    pub fn client_credential_type(&self) -> BasicHttpMessageCredentialType {
        self.client_credential_type
    }

    pub fn algorithm_suite(&self) -> AlgorithmSuite {
        self.algorithm_suite
    }

    pub fn message_security_version(&self) -> MessageSecurityVersion {
        self.message_security_version
    }
}

impl MessageSecurityDescriptor for BasicHttpMessageSecurity {
    const ESTABLISH_SECURITY_CONTEXT_DEFAULT: bool = false;

    fn create_security_element(&self, is_transport_bound: bool) -> Result<SecurityBindingElement> {
        let mode = match (is_transport_bound, self.client_credential_type) {
            (true, BasicHttpMessageCredentialType::UserName) => {
                AuthenticationMode::UserNameOverTransport
            }
            (true, BasicHttpMessageCredentialType::Certificate) => {
                AuthenticationMode::CertificateOverTransport
            }
            (false, BasicHttpMessageCredentialType::Certificate) => {
                AuthenticationMode::MutualCertificate
            }
            (false, BasicHttpMessageCredentialType::UserName) => {
                return Err(BindingError::unsupported(
                    "Basic HTTP message security requires Certificate client credentials",
                ))
            }
        };
        Ok(SecurityBindingElement::new(
            mode,
            self.message_security_version,
            self.algorithm_suite,
        ))
    }

    fn try_recognize(
        element: &SecurityBindingElement,
        mask: UnifiedSecurityMode,
        transport: &TransportElement,
    ) -> Option<Recognized<Self>> {
        if element.issued_token.is_some() || !element.include_timestamp {
            return None;
        }
        let credential = match element.authentication_mode {
            AuthenticationMode::UserNameOverTransport => BasicHttpMessageCredentialType::UserName,
            AuthenticationMode::CertificateOverTransport | AuthenticationMode::MutualCertificate => {
                BasicHttpMessageCredentialType::Certificate
            }
            _ => {
                trace!(mode = ?element.authentication_mode, "not a basic profile element");
                return None;
            }
        };
        let is_transport_bound = element.is_transport_bound();
        if !admits(is_transport_bound, mask, transport) {
            return None;
        }
        let descriptor = Self::new(credential, element.algorithm_suite)
            .with_message_security_version(element.message_security_version)
            .ok()?;
        Some(Recognized {
            descriptor,
            is_transport_bound,
        })
    }

    fn normalized(&self, _is_transport_bound: bool) -> Self {
        *self
    }
}

/// Credential presented in message security for TCP (and other duplex)
/// bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum MessageCredentialType {
    None = 0,
    #[default]
    Windows = 1,
    UserName = 2,
    Certificate = 3,
    IssuedToken = 4,
}

closed_enum!(
    MessageCredentialType,
    "MessageCredentialType",
    [None, Windows, UserName, Certificate, IssuedToken]
);

/// Message security for the Net TCP binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSecurityOverTcp {
    client_credential_type: MessageCredentialType,
    algorithm_suite: AlgorithmSuite,
    message_security_version: MessageSecurityVersion,
}

impl Default for MessageSecurityOverTcp {
    fn default() -> Self {
        Self {
            client_credential_type: MessageCredentialType::default(),
            algorithm_suite: AlgorithmSuite::default(),
            message_security_version: DEFAULT_MESSAGE_SECURITY_VERSION,
        }
    }
}

impl MessageSecurityOverTcp {
    pub fn new(client_credential_type: MessageCredentialType, algorithm_suite: AlgorithmSuite) -> Self {
        Self {
            client_credential_type,
            algorithm_suite,
            ..Self::default()
        }
    }

    pub fn with_message_security_version(mut self, version: MessageSecurityVersion) -> Self {
        self.message_security_version = version;
        self
    }

    pub fn client_credential_type(&self) -> MessageCredentialType {
        self.client_credential_type
    }

    pub fn algorithm_suite(&self) -> AlgorithmSuite {
        self.algorithm_suite
    }

    pub fn message_security_version(&self) -> MessageSecurityVersion {
        self.message_security_version
    }
}

impl MessageSecurityDescriptor for MessageSecurityOverTcp {
    const ESTABLISH_SECURITY_CONTEXT_DEFAULT: bool = true;

    fn create_security_element(&self, is_transport_bound: bool) -> Result<SecurityBindingElement> {
        let mode = if is_transport_bound {
            match self.client_credential_type {
                MessageCredentialType::None => {
                    return Err(BindingError::unsupported(
                        "a message client credential type must be specified for mixed mode",
                    ))
                }
                MessageCredentialType::UserName => AuthenticationMode::UserNameOverTransport,
                MessageCredentialType::Certificate => AuthenticationMode::CertificateOverTransport,
                MessageCredentialType::Windows => AuthenticationMode::SspiNegotiatedOverTransport,
                MessageCredentialType::IssuedToken => AuthenticationMode::IssuedTokenOverTransport,
            }
        } else {
            match self.client_credential_type {
                MessageCredentialType::None => AuthenticationMode::SslNegotiated {
                    require_client_certificate: false,
                },
                MessageCredentialType::UserName => AuthenticationMode::UserNameForSslNegotiated,
                MessageCredentialType::Certificate => AuthenticationMode::SslNegotiated {
                    require_client_certificate: true,
                },
                MessageCredentialType::Windows => AuthenticationMode::SspiNegotiated,
                MessageCredentialType::IssuedToken => AuthenticationMode::IssuedTokenForSslNegotiated,
            }
        };

        let mut bootstrap =
            SecurityBindingElement::new(mode, self.message_security_version, self.algorithm_suite);
        if self.client_credential_type == MessageCredentialType::IssuedToken {
            bootstrap = bootstrap.with_issued_token(IssuedTokenParameters::default());
        }

        if Self::ESTABLISH_SECURITY_CONTEXT_DEFAULT {
            Ok(SecurityBindingElement::secure_conversation(bootstrap))
        } else {
            Ok(bootstrap)
        }
    }

    fn try_recognize(
        element: &SecurityBindingElement,
        mask: UnifiedSecurityMode,
        transport: &TransportElement,
    ) -> Option<Recognized<Self>> {
        let Some(bootstrap) = element.bootstrap() else {
            trace!("TCP message security always establishes secure conversation");
            return None;
        };
        let credential = match bootstrap.authentication_mode {
            AuthenticationMode::UserNameOverTransport | AuthenticationMode::UserNameForSslNegotiated => {
                MessageCredentialType::UserName
            }
            AuthenticationMode::CertificateOverTransport
            | AuthenticationMode::SslNegotiated {
                require_client_certificate: true,
            } => MessageCredentialType::Certificate,
            AuthenticationMode::SspiNegotiatedOverTransport | AuthenticationMode::SspiNegotiated => {
                MessageCredentialType::Windows
            }
            AuthenticationMode::IssuedTokenOverTransport
            | AuthenticationMode::IssuedTokenForSslNegotiated => MessageCredentialType::IssuedToken,
            AuthenticationMode::SslNegotiated {
                require_client_certificate: false,
            } => MessageCredentialType::None,
            _ => return None,
        };

        let expected_token = (credential == MessageCredentialType::IssuedToken)
            .then(IssuedTokenParameters::default);
        if bootstrap.issued_token != expected_token {
            trace!("issued token parameters cannot be expressed by TCP message security");
            return None;
        }

        let is_transport_bound = bootstrap.is_transport_bound();
        if !admits(is_transport_bound, mask, transport) {
            return None;
        }

        let descriptor = Self::new(credential, bootstrap.algorithm_suite)
            .with_message_security_version(bootstrap.message_security_version);
        let expected = descriptor.create_security_element(is_transport_bound).ok()?;
        if &expected != element {
            return None;
        }
        Some(Recognized {
            descriptor,
            is_transport_bound,
        })
    }

    fn normalized(&self, _is_transport_bound: bool) -> Self {
        *self
    }
}

/// Message security for the WS-Federation HTTP binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FederatedMessageSecurityOverHttp {
    issued_token_type: Option<String>,
    issued_key_type: SecurityKeyType,
    issuer_address: Option<String>,
    negotiate_service_credential: bool,
    establish_security_context: bool,
    algorithm_suite: AlgorithmSuite,
    message_security_version: MessageSecurityVersion,
}

impl Default for FederatedMessageSecurityOverHttp {
    fn default() -> Self {
        Self {
            issued_token_type: None,
            issued_key_type: SecurityKeyType::default(),
            issuer_address: None,
            negotiate_service_credential: true,
            establish_security_context: Self::ESTABLISH_SECURITY_CONTEXT_DEFAULT,
            algorithm_suite: AlgorithmSuite::default(),
            message_security_version: DEFAULT_MESSAGE_SECURITY_VERSION,
        }
    }
}

impl FederatedMessageSecurityOverHttp {
    pub fn builder() -> FederatedMessageSecurityBuilder {
        FederatedMessageSecurityBuilder::default()
    }

    pub fn issued_token_type(&self) -> Option<&str> {
        self.issued_token_type.as_deref()
    }

    pub fn issued_key_type(&self) -> SecurityKeyType {
        self.issued_key_type
    }

    pub fn issuer_address(&self) -> Option<&str> {
        self.issuer_address.as_deref()
    }

    pub fn negotiate_service_credential(&self) -> bool {
        self.negotiate_service_credential
    }

    pub fn establish_security_context(&self) -> bool {
        self.establish_security_context
    }

    pub fn algorithm_suite(&self) -> AlgorithmSuite {
        self.algorithm_suite
    }

    pub fn message_security_version(&self) -> MessageSecurityVersion {
        self.message_security_version
    }

    fn issued_token_parameters(&self) -> IssuedTokenParameters {
        IssuedTokenParameters {
            token_type: self.issued_token_type.clone(),
            key_type: self.issued_key_type,
            issuer_address: self.issuer_address.clone(),
        }
    }
}

/// Validating builder for [`FederatedMessageSecurityOverHttp`].
#[derive(Debug, Clone, Default)]
pub struct FederatedMessageSecurityBuilder {
    inner: FederatedMessageSecurityOverHttp,
}

impl FederatedMessageSecurityBuilder {
    pub fn issued_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.inner.issued_token_type = Some(token_type.into());
        self
    }

    pub fn issued_key_type(mut self, key_type: SecurityKeyType) -> Self {
        self.inner.issued_key_type = key_type;
        self
    }

    pub fn issuer_address(mut self, address: impl Into<String>) -> Self {
        self.inner.issuer_address = Some(address.into());
        self
    }

    pub fn negotiate_service_credential(mut self, value: bool) -> Self {
        self.inner.negotiate_service_credential = value;
        self
    }

    pub fn establish_security_context(mut self, value: bool) -> Self {
        self.inner.establish_security_context = value;
        self
    }

    pub fn algorithm_suite(mut self, suite: AlgorithmSuite) -> Self {
        self.inner.algorithm_suite = suite;
        self
    }

    pub fn message_security_version(mut self, version: MessageSecurityVersion) -> Self {
        self.inner.message_security_version = version;
        self
    }

    pub fn build(self) -> Result<FederatedMessageSecurityOverHttp> {
        if let Some(token_type) = &self.inner.issued_token_type {
            if token_type.is_empty() {
                return Err(BindingError::EmptyArgument("issued_token_type"));
            }
        }
        if let Some(address) = &self.inner.issuer_address {
            if address.is_empty() {
                return Err(BindingError::EmptyArgument("issuer_address"));
            }
            validate_namespace(address)?;
        }
        Ok(self.inner)
    }
}

impl MessageSecurityDescriptor for FederatedMessageSecurityOverHttp {
    const ESTABLISH_SECURITY_CONTEXT_DEFAULT: bool = true;

    fn create_security_element(&self, is_transport_bound: bool) -> Result<SecurityBindingElement> {
        let mode = if is_transport_bound {
            AuthenticationMode::IssuedTokenOverTransport
        } else if self.negotiate_service_credential {
            AuthenticationMode::IssuedTokenForSslNegotiated
        } else {
            AuthenticationMode::IssuedTokenForCertificate
        };
        let bootstrap =
            SecurityBindingElement::new(mode, self.message_security_version, self.algorithm_suite)
                .with_issued_token(self.issued_token_parameters());

        if self.establish_security_context {
            Ok(SecurityBindingElement::secure_conversation(bootstrap))
        } else {
            Ok(bootstrap)
        }
    }

    fn try_recognize(
        element: &SecurityBindingElement,
        mask: UnifiedSecurityMode,
        transport: &TransportElement,
    ) -> Option<Recognized<Self>> {
        let (bootstrap, establish_security_context) = match element.bootstrap() {
            Some(bootstrap) => (bootstrap, true),
            None => (element, false),
        };
        let negotiate_service_credential = match bootstrap.authentication_mode {
            AuthenticationMode::IssuedTokenOverTransport
            | AuthenticationMode::IssuedTokenForSslNegotiated => true,
            AuthenticationMode::IssuedTokenForCertificate => false,
            _ => {
                trace!(mode = ?bootstrap.authentication_mode, "not a federated element");
                return None;
            }
        };
        let issued = bootstrap.issued_token.as_ref()?;

        let is_transport_bound = bootstrap.is_transport_bound();
        if !admits(is_transport_bound, mask, transport) {
            return None;
        }

        let descriptor = Self {
            issued_token_type: issued.token_type.clone(),
            issued_key_type: issued.key_type,
            issuer_address: issued.issuer_address.clone(),
            negotiate_service_credential,
            establish_security_context,
            algorithm_suite: bootstrap.algorithm_suite,
            message_security_version: bootstrap.message_security_version,
        };
        let expected = descriptor.create_security_element(is_transport_bound).ok()?;
        if &expected != element {
            return None;
        }
        Some(Recognized {
            descriptor,
            is_transport_bound,
        })
    }

    fn normalized(&self, is_transport_bound: bool) -> Self {
        let mut normalized = self.clone();
        if is_transport_bound {
            normalized.negotiate_service_credential = true;
        }
        normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HttpTransportElement;

    fn https() -> TransportElement {
        TransportElement::Http(HttpTransportElement::https())
    }

    fn http() -> TransportElement {
        TransportElement::Http(HttpTransportElement::http())
    }

    fn all_modes() -> UnifiedSecurityMode {
        UnifiedSecurityMode::MESSAGE | UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL
    }

    #[test]
    fn test_basic_http_mixed_mode_elements() {
        let security = BasicHttpMessageSecurity::default();
        let element = security.create_security_element(true).unwrap();
        assert_eq!(
            element.authentication_mode,
            AuthenticationMode::UserNameOverTransport
        );
        assert_eq!(element.kind(), SecurityElementKind::Transport);
        assert!(element.message_security_version.is_ws_security_10());
    }

    #[test]
    fn test_basic_http_message_mode_requires_certificate() {
        let security = BasicHttpMessageSecurity::default();
        assert!(matches!(
            security.create_security_element(false),
            Err(BindingError::UnsupportedCombination(_))
        ));

        let certificate = BasicHttpMessageSecurity::new(
            BasicHttpMessageCredentialType::Certificate,
            AlgorithmSuite::Basic128,
        );
        let element = certificate.create_security_element(false).unwrap();
        assert_eq!(element.kind(), SecurityElementKind::Asymmetric);
        assert!(element.bootstrap().is_none());
    }

    #[test]
    fn test_basic_http_rejects_ws_security_11() {
        let result = BasicHttpMessageSecurity::default()
            .with_message_security_version(DEFAULT_MESSAGE_SECURITY_VERSION);
        assert!(result.is_err());
    }

    #[test]
    fn test_basic_http_recognize_reports_transport_binding() {
        let security = BasicHttpMessageSecurity::new(
            BasicHttpMessageCredentialType::Certificate,
            AlgorithmSuite::Basic256Sha256,
        );
        let element = security.create_security_element(true).unwrap();
        let recognized =
            BasicHttpMessageSecurity::try_recognize(&element, all_modes(), &https()).unwrap();
        assert!(recognized.is_transport_bound);
        assert_eq!(recognized.descriptor, security);
    }

    #[test]
    fn test_mixed_mode_needs_secure_transport() {
        let element = BasicHttpMessageSecurity::default()
            .create_security_element(true)
            .unwrap();
        assert!(BasicHttpMessageSecurity::try_recognize(&element, all_modes(), &http()).is_none());
    }

    #[test]
    fn test_mask_gates_recognition() {
        let element = BasicHttpMessageSecurity::new(
            BasicHttpMessageCredentialType::Certificate,
            AlgorithmSuite::Basic256,
        )
        .create_security_element(false)
        .unwrap();
        let mask = UnifiedSecurityMode::TRANSPORT_WITH_MESSAGE_CREDENTIAL;
        assert!(BasicHttpMessageSecurity::try_recognize(&element, mask, &http()).is_none());
        assert!(BasicHttpMessageSecurity::try_recognize(&element, all_modes(), &http()).is_some());
    }

    #[test]
    fn test_tcp_establishes_secure_conversation() {
        let security = MessageSecurityOverTcp::default();
        let element = security.create_security_element(false).unwrap();
        let bootstrap = element.bootstrap().expect("secure conversation wrapper");
        assert_eq!(
            bootstrap.authentication_mode,
            AuthenticationMode::SspiNegotiated
        );
        assert_eq!(element.kind(), SecurityElementKind::Symmetric);
    }

    #[test]
    fn test_tcp_mixed_mode_requires_credential() {
        let security = MessageSecurityOverTcp::new(MessageCredentialType::None, AlgorithmSuite::Basic256);
        assert!(security.create_security_element(true).is_err());
        assert!(security.create_security_element(false).is_ok());
    }

    #[test]
    fn test_tcp_recognize_every_credential() {
        let tcp = TransportElement::Tcp(crate::transport::TcpTransportElement {
            stream_upgrade: Some(crate::transport::StreamUpgrade::Ssl {
                require_client_certificate: false,
                ssl_protocols: Default::default(),
            }),
        });
        for credential in [
            MessageCredentialType::Windows,
            MessageCredentialType::UserName,
            MessageCredentialType::Certificate,
            MessageCredentialType::IssuedToken,
        ] {
            let security = MessageSecurityOverTcp::new(credential, AlgorithmSuite::Basic192);
            for transport_bound in [false, true] {
                let element = security.create_security_element(transport_bound).unwrap();
                let recognized =
                    MessageSecurityOverTcp::try_recognize(&element, all_modes(), &tcp).unwrap();
                assert_eq!(recognized.descriptor, security);
                assert_eq!(recognized.is_transport_bound, transport_bound);
            }
        }
    }

    #[test]
    fn test_tcp_rejects_federated_element_with_issuer() {
        let element = FederatedMessageSecurityOverHttp::builder()
            .issued_token_type("urn:oasis:names:tc:SAML:2.0:assertion")
            .issuer_address("https://sts.example.org/trust")
            .build()
            .unwrap()
            .create_security_element(false)
            .unwrap();
        assert!(MessageSecurityOverTcp::try_recognize(&element, all_modes(), &http()).is_none());
    }

    #[test]
    fn test_parameterless_federated_element_reads_as_tcp_issued_token() {
        // Without STS parameters both descriptors build the same element;
        // the binding's transport tells them apart.
        let federated = FederatedMessageSecurityOverHttp::default()
            .create_security_element(false)
            .unwrap();
        let tcp = MessageSecurityOverTcp::new(MessageCredentialType::IssuedToken, AlgorithmSuite::default())
            .create_security_element(false)
            .unwrap();
        assert_eq!(federated, tcp);

        let recognized =
            MessageSecurityOverTcp::try_recognize(&federated, all_modes(), &http()).unwrap();
        assert_eq!(
            recognized.descriptor.client_credential_type(),
            MessageCredentialType::IssuedToken
        );
    }

    #[test]
    fn test_federated_defaults() {
        let security = FederatedMessageSecurityOverHttp::default();
        assert!(security.establish_security_context());
        assert!(security.negotiate_service_credential());
        let element = security.create_security_element(false).unwrap();
        assert!(element.authentication_mode.uses_issued_token());
        let bootstrap = element.bootstrap().unwrap();
        assert_eq!(
            bootstrap.authentication_mode,
            AuthenticationMode::IssuedTokenForSslNegotiated
        );
    }

    #[test]
    fn test_federated_round_trip_without_secure_conversation() {
        let security = FederatedMessageSecurityOverHttp::builder()
            .issued_token_type("urn:oasis:names:tc:SAML:2.0:assertion")
            .issuer_address("https://sts.example.org/trust")
            .issued_key_type(SecurityKeyType::BearerKey)
            .negotiate_service_credential(false)
            .establish_security_context(false)
            .build()
            .unwrap();
        let element = security.create_security_element(false).unwrap();
        assert_eq!(
            element.authentication_mode,
            AuthenticationMode::IssuedTokenForCertificate
        );
        let recognized =
            FederatedMessageSecurityOverHttp::try_recognize(&element, all_modes(), &http()).unwrap();
        assert_eq!(recognized.descriptor, security);
        assert!(!recognized.is_transport_bound);
    }

    #[test]
    fn test_federated_builder_validates_issuer() {
        assert!(FederatedMessageSecurityOverHttp::builder()
            .issuer_address("not a uri")
            .build()
            .is_err());
        assert!(matches!(
            FederatedMessageSecurityOverHttp::builder()
                .issued_token_type("")
                .build(),
            Err(BindingError::EmptyArgument("issued_token_type"))
        ));
    }

    #[test]
    fn test_federated_element_rejected_by_basic_http() {
        let element = FederatedMessageSecurityOverHttp::default()
            .create_security_element(true)
            .unwrap();
        assert!(BasicHttpMessageSecurity::try_recognize(&element, all_modes(), &https()).is_none());
    }
}
