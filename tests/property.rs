//! Property tests for enum ranges and build/recover round trips.

use proptest::prelude::*;
use zentinel_soap_binding::binding::{BasicHttpBinding, NetTcpBinding};
use zentinel_soap_binding::message::{
    BasicHttpMessageCredentialType, BasicHttpMessageSecurity, MessageCredentialType,
    MessageSecurityOverTcp,
};
use zentinel_soap_binding::mode::{
    BasicHttpSecurityMode, ClosedEnum, NetNamedPipeSecurityMode, ProtectionLevel, SecurityMode,
};
use zentinel_soap_binding::pipeline::EncodingKind;
use zentinel_soap_binding::transport::{
    HttpClientCredentialType, HttpProxyCredentialType, HttpTransportSecurity,
    TcpClientCredentialType, TcpTransportSecurity,
};
use zentinel_soap_binding::version::AlgorithmSuite;
use zentinel_soap_binding::{BindingError, SecurityBinding};

fn pick<T: ClosedEnum>() -> impl Strategy<Value = T> {
    prop::sample::select(T::VARIANTS.to_vec())
}

proptest! {
    #[test]
    fn security_mode_defined_exactly_in_range(raw in any::<i64>()) {
        prop_assert_eq!(SecurityMode::is_defined(raw), (0..=3).contains(&raw));
        prop_assert_eq!(BasicHttpSecurityMode::is_defined(raw), (0..=4).contains(&raw));
        prop_assert_eq!(NetNamedPipeSecurityMode::is_defined(raw), (0..=1).contains(&raw));
        prop_assert_eq!(ProtectionLevel::is_defined(raw), (0..=2).contains(&raw));
    }

    #[test]
    fn undefined_values_fail_validation(raw in prop_oneof![i64::MIN..0i64, 4i64..i64::MAX]) {
        let err = SecurityMode::validate(raw).unwrap_err();
        prop_assert!(
            matches!(err, BindingError::InvalidEnumValue { value, type_name: "SecurityMode" } if value == raw),
            "unexpected error"
        );
    }

    #[test]
    fn basic_http_build_then_recover(
        mode in pick::<BasicHttpSecurityMode>(),
        client in pick::<HttpClientCredentialType>(),
        proxy in pick::<HttpProxyCredentialType>(),
        suite in pick::<AlgorithmSuite>(),
        mtom in any::<bool>(),
        realm in "[a-z]{0,8}",
    ) {
        let binding = BasicHttpBinding::new(mode)
            .with_transport(HttpTransportSecurity::new(client, proxy, realm))
            .with_message(BasicHttpMessageSecurity::new(
                BasicHttpMessageCredentialType::Certificate,
                suite,
            ))
            .with_encoding(if mtom { EncodingKind::Mtom } else { EncodingKind::Text });

        match binding.create_elements() {
            Ok(sequence) => {
                prop_assert!((2..=3).contains(&sequence.len()));
                prop_assert_eq!(BasicHttpBinding::try_recover(&sequence), Some(binding.normalized()));
            }
            Err(err) => prop_assert!(matches!(err, BindingError::UnsupportedCombination(_))),
        }
    }

    #[test]
    fn net_tcp_build_then_recover(
        mode in pick::<SecurityMode>(),
        transport_client in pick::<TcpClientCredentialType>(),
        protection in pick::<ProtectionLevel>(),
        message_client in pick::<MessageCredentialType>(),
        suite in pick::<AlgorithmSuite>(),
    ) {
        let binding = NetTcpBinding::new(mode)
            .with_transport(
                TcpTransportSecurity::default()
                    .with_client_credential_type(transport_client)
                    .with_protection_level(protection),
            )
            .with_message(MessageSecurityOverTcp::new(message_client, suite));

        match binding.create_elements() {
            Ok(sequence) => {
                prop_assert_eq!(sequence.transport().scheme(), "net.tcp");
                prop_assert_eq!(NetTcpBinding::try_recover(&sequence), Some(binding.normalized()));
            }
            Err(err) => prop_assert!(matches!(err, BindingError::UnsupportedCombination(_))),
        }
    }
}
