//! YAML binding descriptions.

use crate::binding::{
    BasicHttpBinding, BasicHttpsBinding, BindingConfiguration, NetNamedPipeBinding, NetTcpBinding,
    WsFederationHttpBinding,
};
use crate::error::{BindingError, Result};
use crate::message::{
    BasicHttpMessageCredentialType, BasicHttpMessageSecurity, FederatedMessageSecurityOverHttp,
    MessageCredentialType, MessageSecurityOverTcp, SecurityKeyType,
};
use crate::mode::{
    BasicHttpSecurityMode, BasicHttpsSecurityMode, NetNamedPipeSecurityMode, ProtectionLevel,
    SecurityMode, WsFederationHttpSecurityMode,
};
use crate::pipeline::{BindingFamily, EncodingKind};
use crate::transport::{
    HttpClientCredentialType, HttpProxyCredentialType, HttpTransportSecurity,
    NamedPipeTransportSecurity, SslProtocols, TcpClientCredentialType, TcpTransportSecurity,
};
use crate::version::{AlgorithmSuite, MessageSecurityVersion};
use serde::{Deserialize, Serialize};

const SUPPORTED_VERSION: &str = "1";

/// A binding description loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingDescriptionConfig {
    /// Config version
    pub version: String,

    /// General settings
    pub settings: SettingsConfig,

    /// The binding to synthesize
    pub binding: BindingSpec,
}

impl Default for BindingDescriptionConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_VERSION.to_string(),
            settings: SettingsConfig::default(),
            binding: BindingSpec::default(),
        }
    }
}

impl BindingDescriptionConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| BindingError::Config(e.to_string()))
    }

    /// Validate the description and build the typed binding.
    pub fn into_binding(&self) -> Result<BindingConfiguration> {
        if self.version != SUPPORTED_VERSION {
            return Err(BindingError::Config(format!(
                "unsupported config version '{}'",
                self.version
            )));
        }
        self.binding.build()
    }
}

/// General settings, fixed once at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Culture used to select fault reason translations
    pub culture: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            culture: "en-US".to_string(),
        }
    }
}

/// Binding section, tagged by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum BindingSpec {
    BasicHttp(BasicHttpConfig),
    BasicHttps(BasicHttpsConfig),
    WsFederationHttp(WsFederationHttpConfig),
    NetTcp(NetTcpConfig),
    NetNamedPipe(NetNamedPipeConfig),
}

impl Default for BindingSpec {
    fn default() -> Self {
        Self::BasicHttp(BasicHttpConfig::default())
    }
}

impl BindingSpec {
    pub fn family(&self) -> BindingFamily {
        match self {
            Self::BasicHttp(_) => BindingFamily::BasicHttp,
            Self::BasicHttps(_) => BindingFamily::BasicHttps,
            Self::WsFederationHttp(_) => BindingFamily::WsFederationHttp,
            Self::NetTcp(_) => BindingFamily::NetTcp,
            Self::NetNamedPipe(_) => BindingFamily::NetNamedPipe,
        }
    }

    fn build(&self) -> Result<BindingConfiguration> {
        let family = self.family();
        let binding: BindingConfiguration = match self {
            Self::BasicHttp(c) => BasicHttpBinding::new(c.mode)
                .with_transport(c.transport.build())
                .with_message(c.message.build()?)
                .with_encoding(c.encoding.unwrap_or(family.default_encoding()))
                .into(),
            Self::BasicHttps(c) => BasicHttpsBinding::new(c.mode)
                .with_transport(c.transport.build())
                .with_message(c.message.build()?)
                .with_encoding(c.encoding.unwrap_or(family.default_encoding()))
                .into(),
            Self::WsFederationHttp(c) => WsFederationHttpBinding::new(c.mode)
                .with_message(c.message.build()?)
                .with_encoding(c.encoding.unwrap_or(family.default_encoding()))
                .into(),
            Self::NetTcp(c) => NetTcpBinding::new(c.mode)
                .with_transport(c.transport.build())
                .with_message(c.message.build())
                .with_encoding(c.encoding.unwrap_or(family.default_encoding()))
                .into(),
            Self::NetNamedPipe(c) => NetNamedPipeBinding::new(c.mode)
                .with_transport(NamedPipeTransportSecurity::new(c.transport.protection_level))
                .with_encoding(c.encoding.unwrap_or(family.default_encoding()))
                .into(),
        };
        Ok(binding)
    }
}

/// HTTP transport security settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    pub client_credential_type: HttpClientCredentialType,
    pub proxy_credential_type: HttpProxyCredentialType,
    pub realm: String,
}

impl HttpTransportConfig {
    fn build(&self) -> HttpTransportSecurity {
        HttpTransportSecurity::new(
            self.client_credential_type,
            self.proxy_credential_type,
            self.realm.clone(),
        )
    }
}

/// Basic profile message security settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicHttpMessageConfig {
    pub client_credential_type: BasicHttpMessageCredentialType,
    pub algorithm_suite: AlgorithmSuite,
    /// Must be a WS-Security 1.0 version when set
    pub message_security_version: Option<MessageSecurityVersion>,
}

impl BasicHttpMessageConfig {
    fn build(&self) -> Result<BasicHttpMessageSecurity> {
        let security = BasicHttpMessageSecurity::new(self.client_credential_type, self.algorithm_suite);
        match self.message_security_version {
            Some(version) => security.with_message_security_version(version),
            None => Ok(security),
        }
    }
}

/// Basic HTTP binding description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicHttpConfig {
    pub mode: BasicHttpSecurityMode,
    /// Defaults to the family's first supported encoding
    pub encoding: Option<EncodingKind>,
    pub transport: HttpTransportConfig,
    pub message: BasicHttpMessageConfig,
}

/// Basic HTTPS binding description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicHttpsConfig {
    pub mode: BasicHttpsSecurityMode,
    pub encoding: Option<EncodingKind>,
    pub transport: HttpTransportConfig,
    pub message: BasicHttpMessageConfig,
}

/// Federated message security settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FederatedMessageConfig {
    pub issued_token_type: Option<String>,
    pub issued_key_type: SecurityKeyType,
    /// Security token service address (absolute URI)
    pub issuer_address: Option<String>,
    pub negotiate_service_credential: bool,
    pub establish_security_context: bool,
    pub algorithm_suite: AlgorithmSuite,
    pub message_security_version: Option<MessageSecurityVersion>,
}

impl Default for FederatedMessageConfig {
    fn default() -> Self {
        let defaults = FederatedMessageSecurityOverHttp::default();
        Self {
            issued_token_type: None,
            issued_key_type: defaults.issued_key_type(),
            issuer_address: None,
            negotiate_service_credential: defaults.negotiate_service_credential(),
            establish_security_context: defaults.establish_security_context(),
            algorithm_suite: defaults.algorithm_suite(),
            message_security_version: None,
        }
    }
}

impl FederatedMessageConfig {
    fn build(&self) -> Result<FederatedMessageSecurityOverHttp> {
        let mut builder = FederatedMessageSecurityOverHttp::builder()
            .issued_key_type(self.issued_key_type)
            .negotiate_service_credential(self.negotiate_service_credential)
            .establish_security_context(self.establish_security_context)
            .algorithm_suite(self.algorithm_suite);
        if let Some(token_type) = &self.issued_token_type {
            builder = builder.issued_token_type(token_type.clone());
        }
        if let Some(address) = &self.issuer_address {
            builder = builder.issuer_address(address.clone());
        }
        if let Some(version) = self.message_security_version {
            builder = builder.message_security_version(version);
        }
        builder.build()
    }
}

/// WS-Federation HTTP binding description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WsFederationHttpConfig {
    pub mode: WsFederationHttpSecurityMode,
    pub encoding: Option<EncodingKind>,
    pub message: FederatedMessageConfig,
}

/// TCP transport security settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpTransportConfig {
    pub client_credential_type: TcpClientCredentialType,
    pub protection_level: ProtectionLevel,
    pub ssl_protocols: SslProtocols,
}

impl TcpTransportConfig {
    fn build(&self) -> TcpTransportSecurity {
        TcpTransportSecurity::new(
            self.client_credential_type,
            self.protection_level,
            self.ssl_protocols,
        )
    }
}

/// TCP message security settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpMessageConfig {
    pub client_credential_type: MessageCredentialType,
    pub algorithm_suite: AlgorithmSuite,
    pub message_security_version: Option<MessageSecurityVersion>,
}

impl TcpMessageConfig {
    fn build(&self) -> MessageSecurityOverTcp {
        let security = MessageSecurityOverTcp::new(self.client_credential_type, self.algorithm_suite);
        match self.message_security_version {
            Some(version) => security.with_message_security_version(version),
            None => security,
        }
    }
}

/// Net TCP binding description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetTcpConfig {
    pub mode: SecurityMode,
    pub encoding: Option<EncodingKind>,
    pub transport: TcpTransportConfig,
    pub message: TcpMessageConfig,
}

/// Named pipe transport security settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedPipeTransportConfig {
    pub protection_level: ProtectionLevel,
}

/// Net named pipe binding description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetNamedPipeConfig {
    pub mode: NetNamedPipeSecurityMode,
    pub encoding: Option<EncodingKind>,
    pub transport: NamedPipeTransportConfig,
}
