//! Transport binding elements and the transport security descriptors that
//! configure and recognize them.

use crate::error::{BindingError, Result};
use crate::mode::{closed_enum, ProtectionLevel, TransportPosture};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

bitflags! {
    /// TLS protocol versions an SSL stream upgrade may negotiate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct SslProtocols: u32 {
        const TLS = 1 << 0;
        const TLS11 = 1 << 1;
        const TLS12 = 1 << 2;
        const TLS13 = 1 << 3;
    }
}

impl Default for SslProtocols {
    fn default() -> Self {
        Self::TLS12 | Self::TLS13
    }
}

/// HTTP authentication scheme written onto an HTTP transport element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationScheme {
    #[default]
    Anonymous,
    Basic,
    Digest,
    Ntlm,
    Negotiate,
    /// Defer to the hosting environment.
    InheritedFromHost,
}

/// HTTP transport binding element (http or https).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpTransportElement {
    pub https: bool,
    pub authentication_scheme: AuthenticationScheme,
    pub proxy_authentication_scheme: AuthenticationScheme,
    pub realm: String,
    pub require_client_certificate: bool,
}

impl HttpTransportElement {
    pub fn http() -> Self {
        Self::default()
    }

    pub fn https() -> Self {
        Self {
            https: true,
            ..Self::default()
        }
    }
}

/// Security upgrade applied to a stream-oriented transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamUpgrade {
    /// Windows (SSPI) stream security.
    Windows { protection_level: ProtectionLevel },
    /// SSL/TLS stream security.
    Ssl {
        require_client_certificate: bool,
        ssl_protocols: SslProtocols,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamedPipeTransportElement {
    pub stream_upgrade: Option<StreamUpgrade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TcpTransportElement {
    pub stream_upgrade: Option<StreamUpgrade>,
}

/// Last element of every binding element sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransportElement {
    Http(HttpTransportElement),
    NamedPipe(NamedPipeTransportElement),
    Tcp(TcpTransportElement),
}

impl TransportElement {
    /// URI scheme served by this transport.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Http(http) if http.https => "https",
            Self::Http(_) => "http",
            Self::NamedPipe(_) => "net.pipe",
            Self::Tcp(_) => "net.tcp",
        }
    }

    /// Whether the transport provides integrity and confidentiality.
    pub fn is_secure(&self) -> bool {
        match self {
            Self::Http(http) => http.https,
            Self::NamedPipe(pipe) => pipe.stream_upgrade.is_some(),
            Self::Tcp(tcp) => tcp.stream_upgrade.is_some(),
        }
    }
}

/// Settings that configure and recognize one kind of transport element.
pub trait TransportSecurityDescriptor: Sized {
    type Element;

    /// Write authentication and protection settings onto `element`.
    ///
    /// Either succeeds completely or leaves `element` untouched.
    fn configure(&self, posture: TransportPosture, element: &mut Self::Element) -> Result<()>;

    /// Read settings back off `element`.
    ///
    /// Returns `None` when the element cannot be expressed by this
    /// descriptor under `posture`.
    fn recognize(posture: TransportPosture, element: &Self::Element) -> Option<Self>;

    /// Reset the fields that `posture` never writes to their defaults.
    fn normalized(&self, posture: TransportPosture) -> Self;
}

/// Client credential for HTTP transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum HttpClientCredentialType {
    #[default]
    None = 0,
    Basic = 1,
    Digest = 2,
    Ntlm = 3,
    Windows = 4,
    Certificate = 5,
    InheritedFromHost = 6,
}

closed_enum!(
    HttpClientCredentialType,
    "HttpClientCredentialType",
    [None, Basic, Digest, Ntlm, Windows, Certificate, InheritedFromHost]
);

impl HttpClientCredentialType {
    fn to_scheme(self) -> (AuthenticationScheme, bool) {
        match self {
            Self::None => (AuthenticationScheme::Anonymous, false),
            Self::Basic => (AuthenticationScheme::Basic, false),
            Self::Digest => (AuthenticationScheme::Digest, false),
            Self::Ntlm => (AuthenticationScheme::Ntlm, false),
            Self::Windows => (AuthenticationScheme::Negotiate, false),
            Self::Certificate => (AuthenticationScheme::Anonymous, true),
            Self::InheritedFromHost => (AuthenticationScheme::InheritedFromHost, false),
        }
    }

    fn from_scheme(scheme: AuthenticationScheme, client_certificate: bool) -> Option<Self> {
        match (scheme, client_certificate) {
            (AuthenticationScheme::Anonymous, true) => Some(Self::Certificate),
            (_, true) => None,
            (AuthenticationScheme::Anonymous, false) => Some(Self::None),
            (AuthenticationScheme::Basic, false) => Some(Self::Basic),
            (AuthenticationScheme::Digest, false) => Some(Self::Digest),
            (AuthenticationScheme::Ntlm, false) => Some(Self::Ntlm),
            (AuthenticationScheme::Negotiate, false) => Some(Self::Windows),
            (AuthenticationScheme::InheritedFromHost, false) => Some(Self::InheritedFromHost),
        }
    }
}

/// Proxy credential for HTTP transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum HttpProxyCredentialType {
    #[default]
    None = 0,
    Basic = 1,
    Digest = 2,
    Ntlm = 3,
    Windows = 4,
}

closed_enum!(
    HttpProxyCredentialType,
    "HttpProxyCredentialType",
    [None, Basic, Digest, Ntlm, Windows]
);

impl HttpProxyCredentialType {
    fn to_scheme(self) -> AuthenticationScheme {
        match self {
            Self::None => AuthenticationScheme::Anonymous,
            Self::Basic => AuthenticationScheme::Basic,
            Self::Digest => AuthenticationScheme::Digest,
            Self::Ntlm => AuthenticationScheme::Ntlm,
            Self::Windows => AuthenticationScheme::Negotiate,
        }
    }

    fn from_scheme(scheme: AuthenticationScheme) -> Option<Self> {
        match scheme {
            AuthenticationScheme::Anonymous => Some(Self::None),
            AuthenticationScheme::Basic => Some(Self::Basic),
            AuthenticationScheme::Digest => Some(Self::Digest),
            AuthenticationScheme::Ntlm => Some(Self::Ntlm),
            AuthenticationScheme::Negotiate => Some(Self::Windows),
            AuthenticationScheme::InheritedFromHost => None,
        }
    }
}

/// HTTP transport security settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HttpTransportSecurity {
    client_credential_type: HttpClientCredentialType,
    proxy_credential_type: HttpProxyCredentialType,
    realm: String,
}

impl HttpTransportSecurity {
    pub fn new(
        client_credential_type: HttpClientCredentialType,
        proxy_credential_type: HttpProxyCredentialType,
        realm: impl Into<String>,
    ) -> Self {
        Self {
            client_credential_type,
            proxy_credential_type,
            realm: realm.into(),
        }
    }

    pub fn with_client_credential_type(mut self, value: HttpClientCredentialType) -> Self {
        self.client_credential_type = value;
        self
    }

    pub fn with_proxy_credential_type(mut self, value: HttpProxyCredentialType) -> Self {
        self.proxy_credential_type = value;
        self
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn client_credential_type(&self) -> HttpClientCredentialType {
        self.client_credential_type
    }

    pub fn proxy_credential_type(&self) -> HttpProxyCredentialType {
        self.proxy_credential_type
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    fn check(&self, posture: TransportPosture) -> Result<()> {
        match (posture, self.client_credential_type) {
            (
                TransportPosture::ProtectionAndAuthentication,
                HttpClientCredentialType::InheritedFromHost,
            ) => Err(BindingError::unsupported(
                "InheritedFromHost client credentials cannot be used with transport security",
            )),
            (TransportPosture::AuthenticationOnly, HttpClientCredentialType::None) => {
                Err(BindingError::unsupported(
                    "TransportCredentialOnly requires an HTTP client credential type",
                ))
            }
            (TransportPosture::AuthenticationOnly, HttpClientCredentialType::Certificate) => {
                Err(BindingError::unsupported(
                    "Certificate client credentials require HTTPS",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl TransportSecurityDescriptor for HttpTransportSecurity {
    type Element = HttpTransportElement;

    fn configure(&self, posture: TransportPosture, http: &mut HttpTransportElement) -> Result<()> {
        self.check(posture)?;

        http.https = posture.is_protected();
        http.authentication_scheme = AuthenticationScheme::Anonymous;
        http.require_client_certificate = false;
        http.proxy_authentication_scheme = AuthenticationScheme::Anonymous;
        http.realm.clear();

        if posture == TransportPosture::Unsecured {
            return Ok(());
        }

        http.proxy_authentication_scheme = self.proxy_credential_type.to_scheme();
        if posture.authenticates_client() {
            let (scheme, client_certificate) = self.client_credential_type.to_scheme();
            http.authentication_scheme = scheme;
            http.require_client_certificate = client_certificate;
            http.realm = self.realm.clone();
        }
        Ok(())
    }

    fn recognize(posture: TransportPosture, http: &HttpTransportElement) -> Option<Self> {
        if http.https != posture.is_protected() {
            trace!(https = http.https, ?posture, "HTTP scheme does not match posture");
            return None;
        }

        if posture == TransportPosture::Unsecured {
            let unauthenticated = http.authentication_scheme == AuthenticationScheme::Anonymous
                && http.proxy_authentication_scheme == AuthenticationScheme::Anonymous
                && http.realm.is_empty()
                && !http.require_client_certificate;
            return unauthenticated.then(Self::default);
        }

        let proxy = HttpProxyCredentialType::from_scheme(http.proxy_authentication_scheme)?;

        if !posture.authenticates_client() {
            let unauthenticated = http.authentication_scheme == AuthenticationScheme::Anonymous
                && http.realm.is_empty()
                && !http.require_client_certificate;
            return unauthenticated.then(|| Self::default().with_proxy_credential_type(proxy));
        }

        let client = HttpClientCredentialType::from_scheme(
            http.authentication_scheme,
            http.require_client_certificate,
        )?;
        let security = Self::new(client, proxy, http.realm.clone());
        security.check(posture).ok()?;
        Some(security)
    }

    fn normalized(&self, posture: TransportPosture) -> Self {
        match posture {
            TransportPosture::Unsecured => Self::default(),
            TransportPosture::ProtectionOnly => {
                Self::default().with_proxy_credential_type(self.proxy_credential_type)
            }
            TransportPosture::ProtectionAndAuthentication
            | TransportPosture::AuthenticationOnly => self.clone(),
        }
    }
}

/// Named pipe transport security settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NamedPipeTransportSecurity {
    protection_level: ProtectionLevel,
}

impl NamedPipeTransportSecurity {
    pub fn new(protection_level: ProtectionLevel) -> Self {
        Self { protection_level }
    }

    pub fn protection_level(&self) -> ProtectionLevel {
        self.protection_level
    }
}

impl TransportSecurityDescriptor for NamedPipeTransportSecurity {
    type Element = NamedPipeTransportElement;

    fn configure(
        &self,
        posture: TransportPosture,
        pipe: &mut NamedPipeTransportElement,
    ) -> Result<()> {
        pipe.stream_upgrade = match posture {
            TransportPosture::Unsecured => None,
            TransportPosture::ProtectionAndAuthentication => Some(StreamUpgrade::Windows {
                protection_level: self.protection_level,
            }),
            other => {
                return Err(BindingError::unsupported(format!(
                    "named pipe transport cannot provide {other:?}"
                )))
            }
        };
        Ok(())
    }

    fn recognize(posture: TransportPosture, pipe: &NamedPipeTransportElement) -> Option<Self> {
        match (posture, pipe.stream_upgrade) {
            (TransportPosture::Unsecured, None) => Some(Self::default()),
            (
                TransportPosture::ProtectionAndAuthentication,
                Some(StreamUpgrade::Windows { protection_level }),
            ) => Some(Self::new(protection_level)),
            _ => None,
        }
    }

    fn normalized(&self, posture: TransportPosture) -> Self {
        match posture {
            TransportPosture::Unsecured => Self::default(),
            _ => *self,
        }
    }
}

/// Client credential for TCP transport security.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum TcpClientCredentialType {
    None = 0,
    #[default]
    Windows = 1,
    Certificate = 2,
}

closed_enum!(TcpClientCredentialType, "TcpClientCredentialType", [None, Windows, Certificate]);

/// TCP transport security settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TcpTransportSecurity {
    client_credential_type: TcpClientCredentialType,
    protection_level: ProtectionLevel,
    ssl_protocols: SslProtocols,
}

impl TcpTransportSecurity {
    pub fn new(
        client_credential_type: TcpClientCredentialType,
        protection_level: ProtectionLevel,
        ssl_protocols: SslProtocols,
    ) -> Self {
        Self {
            client_credential_type,
            protection_level,
            ssl_protocols,
        }
    }

    pub fn with_client_credential_type(mut self, value: TcpClientCredentialType) -> Self {
        self.client_credential_type = value;
        self
    }

    pub fn with_protection_level(mut self, value: ProtectionLevel) -> Self {
        self.protection_level = value;
        self
    }

    pub fn with_ssl_protocols(mut self, value: SslProtocols) -> Self {
        self.ssl_protocols = value;
        self
    }

    pub fn client_credential_type(&self) -> TcpClientCredentialType {
        self.client_credential_type
    }

    pub fn protection_level(&self) -> ProtectionLevel {
        self.protection_level
    }

    pub fn ssl_protocols(&self) -> SslProtocols {
        self.ssl_protocols
    }

    fn ssl(&self, require_client_certificate: bool) -> Result<StreamUpgrade> {
        if self.ssl_protocols.is_empty() {
            return Err(BindingError::unsupported(
                "SSL stream security requires at least one TLS protocol",
            ));
        }
        Ok(StreamUpgrade::Ssl {
            require_client_certificate,
            ssl_protocols: self.ssl_protocols,
        })
    }
}

impl TransportSecurityDescriptor for TcpTransportSecurity {
    type Element = TcpTransportElement;

    fn configure(&self, posture: TransportPosture, tcp: &mut TcpTransportElement) -> Result<()> {
        let upgrade = match posture {
            TransportPosture::Unsecured => None,
            // Message credentials own client authentication here.
            TransportPosture::ProtectionOnly => Some(self.ssl(false)?),
            TransportPosture::ProtectionAndAuthentication => match self.client_credential_type {
                TcpClientCredentialType::Windows => Some(StreamUpgrade::Windows {
                    protection_level: self.protection_level,
                }),
                credential => {
                    if self.protection_level != ProtectionLevel::EncryptAndSign {
                        return Err(BindingError::unsupported(format!(
                            "SSL stream security requires EncryptAndSign, got {:?}",
                            self.protection_level
                        )));
                    }
                    Some(self.ssl(credential == TcpClientCredentialType::Certificate)?)
                }
            },
            TransportPosture::AuthenticationOnly => {
                return Err(BindingError::unsupported(
                    "TCP transport cannot authenticate without protection",
                ))
            }
        };
        tcp.stream_upgrade = upgrade;
        Ok(())
    }

    fn recognize(posture: TransportPosture, tcp: &TcpTransportElement) -> Option<Self> {
        let defaults = Self::default();
        match (posture, tcp.stream_upgrade) {
            (TransportPosture::Unsecured, None) => Some(defaults),
            (
                TransportPosture::ProtectionOnly,
                Some(StreamUpgrade::Ssl {
                    require_client_certificate: false,
                    ssl_protocols,
                }),
            ) => Some(defaults.with_ssl_protocols(ssl_protocols)),
            (
                TransportPosture::ProtectionAndAuthentication,
                Some(StreamUpgrade::Windows { protection_level }),
            ) => Some(defaults.with_protection_level(protection_level)),
            (
                TransportPosture::ProtectionAndAuthentication,
                Some(StreamUpgrade::Ssl {
                    require_client_certificate,
                    ssl_protocols,
                }),
            ) => {
                let credential = if require_client_certificate {
                    TcpClientCredentialType::Certificate
                } else {
                    TcpClientCredentialType::None
                };
                Some(
                    defaults
                        .with_client_credential_type(credential)
                        .with_ssl_protocols(ssl_protocols),
                )
            }
            _ => None,
        }
    }

    fn normalized(&self, posture: TransportPosture) -> Self {
        let defaults = Self::default();
        match posture {
            TransportPosture::Unsecured | TransportPosture::AuthenticationOnly => defaults,
            TransportPosture::ProtectionOnly => defaults.with_ssl_protocols(self.ssl_protocols),
            TransportPosture::ProtectionAndAuthentication => match self.client_credential_type {
                TcpClientCredentialType::Windows => {
                    defaults.with_protection_level(self.protection_level)
                }
                _ => *self,
            },
        }
    }
}
