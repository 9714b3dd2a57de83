//! Rendering of fault messages as SOAP envelopes.

use crate::error::{BindingError, Result};
use crate::fault::{FaultCode, FaultDetail, FaultMessage, MessageFault};
use crate::version::{AddressingVersion, EnvelopeVersion};
use quick_xml::escape::escape;

const ENV: &str = "s";
const WSA: &str = "a";

/// Prefix bookkeeping for one rendered envelope.
struct Prefixes {
    envelope: &'static str,
    addressing: Option<&'static str>,
}

impl Prefixes {
    fn new(message: &FaultMessage) -> Self {
        let addressing = match message.version.addressing {
            AddressingVersion::None => None,
            addressing => Some(addressing.namespace()),
        };
        Self {
            envelope: message.version.envelope.namespace(),
            addressing,
        }
    }

    /// Render `namespace:name` as a QName, with an extra declaration when
    /// the namespace is not bound on the envelope.
    fn qname(&self, name: &str, namespace: &str) -> (String, String) {
        if namespace.is_empty() || namespace == self.envelope {
            (format!("{ENV}:{name}"), String::new())
        } else if Some(namespace) == self.addressing {
            (format!("{WSA}:{name}"), String::new())
        } else {
            (
                format!("q:{name}"),
                format!(r#" xmlns:q="{}""#, escape(namespace)),
            )
        }
    }
}

/// Render `message` as a SOAP envelope, picking the reason translation for
/// `culture` where the envelope carries a single reason.
pub fn render_fault(message: &FaultMessage, culture: &str) -> Result<String> {
    let prefixes = Prefixes::new(message);
    let body = match message.version.envelope {
        EnvelopeVersion::Soap11 => soap_11_fault(&message.fault, &prefixes, culture),
        EnvelopeVersion::Soap12 => soap_12_fault(&message.fault, &prefixes),
        EnvelopeVersion::None => {
            return Err(BindingError::unsupported(
                "cannot render a fault without a SOAP envelope",
            ))
        }
    };

    let mut namespaces = format!(r#"xmlns:{ENV}="{}""#, prefixes.envelope);
    if let Some(wsa) = prefixes.addressing {
        namespaces.push_str(&format!(r#" xmlns:{WSA}="{wsa}""#));
    }

    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<{ENV}:Envelope {namespaces}>
  <{ENV}:Header>{header}
  </{ENV}:Header>
  <{ENV}:Body>
{body}
  </{ENV}:Body>
</{ENV}:Envelope>"#,
        header = header_blocks(message, &prefixes),
    ))
}

fn header_blocks(message: &FaultMessage, prefixes: &Prefixes) -> String {
    let mut header = String::new();
    if let (Some(action), Some(_)) = (&message.action, prefixes.addressing) {
        header.push_str(&format!(
            r#"
    <{WSA}:Action {ENV}:mustUnderstand="1">{}</{WSA}:Action>"#,
            escape(action.as_str())
        ));
    }
    for not_understood in &message.not_understood {
        header.push_str(&format!(
            r#"
    <{ENV}:NotUnderstood qname="h:{}" xmlns:h="{}"/>"#,
            escape(not_understood.name.as_str()),
            escape(not_understood.namespace.as_str())
        ));
    }
    header
}

/// SOAP 1.1 has no sub codes; a predefined code refined by a sub code is
/// sent as the sub code itself.
fn soap_11_code(code: &FaultCode) -> (String, String) {
    match code.sub_code() {
        Some(sub) if code.is_predefined_fault() && code.namespace().is_empty() => {
            (sub.name().to_string(), sub.namespace().to_string())
        }
        _ if code.namespace().is_empty() && code.is_sender_fault() => (
            EnvelopeVersion::Soap11.sender_fault_name().to_string(),
            String::new(),
        ),
        _ if code.namespace().is_empty() && code.is_receiver_fault() => (
            EnvelopeVersion::Soap11.receiver_fault_name().to_string(),
            String::new(),
        ),
        _ => (code.name().to_string(), code.namespace().to_string()),
    }
}

fn soap_11_fault(fault: &MessageFault, prefixes: &Prefixes, culture: &str) -> String {
    let (name, namespace) = soap_11_code(&fault.code);
    let (code, declaration) = prefixes.qname(&name, &namespace);
    let reason = fault.reason.matching_translation(culture);

    let mut out = format!(
        r#"    <{ENV}:Fault>
      <faultcode{declaration}>{code}</faultcode>
      <faultstring xml:lang="{lang}">{text}</faultstring>"#,
        lang = escape(reason.xml_lang.as_str()),
        text = escape(reason.text.as_str()),
    );
    if let Some(actor) = &fault.actor {
        out.push_str(&format!(
            "\n      <faultactor>{}</faultactor>",
            escape(actor.as_str())
        ));
    }
    if let Some(detail) = &fault.detail {
        out.push_str(&format!(
            "\n      <detail>{}</detail>",
            detail_xml(detail, prefixes)
        ));
    }
    out.push_str(&format!("\n    </{ENV}:Fault>"));
    out
}

fn soap_12_code(code: &FaultCode, prefixes: &Prefixes, indent: usize) -> String {
    let pad = " ".repeat(indent);
    let (value, declaration) = prefixes.qname(code.name(), code.namespace());
    let mut out = format!("\n{pad}  <{ENV}:Value{declaration}>{value}</{ENV}:Value>");
    if let Some(sub) = code.sub_code() {
        out.push_str(&format!(
            "\n{pad}  <{ENV}:Subcode>{}\n{pad}  </{ENV}:Subcode>",
            soap_12_code(sub, prefixes, indent + 2)
        ));
    }
    out
}

fn soap_12_fault(fault: &MessageFault, prefixes: &Prefixes) -> String {
    let reasons: String = fault
        .reason
        .translations()
        .iter()
        .map(|t| {
            format!(
                "\n        <{ENV}:Text xml:lang=\"{}\">{}</{ENV}:Text>",
                escape(t.xml_lang.as_str()),
                escape(t.text.as_str())
            )
        })
        .collect();

    let mut out = format!(
        r#"    <{ENV}:Fault>
      <{ENV}:Code>{code}
      </{ENV}:Code>
      <{ENV}:Reason>{reasons}
      </{ENV}:Reason>"#,
        code = soap_12_code(&fault.code, prefixes, 6),
    );
    if let Some(node) = &fault.node {
        out.push_str(&format!(
            "\n      <{ENV}:Node>{}</{ENV}:Node>",
            escape(node.as_str())
        ));
    }
    if let Some(actor) = &fault.actor {
        out.push_str(&format!(
            "\n      <{ENV}:Role>{}</{ENV}:Role>",
            escape(actor.as_str())
        ));
    }
    if let Some(detail) = &fault.detail {
        out.push_str(&format!(
            "\n      <{ENV}:Detail>{}</{ENV}:Detail>",
            detail_xml(detail, prefixes)
        ));
    }
    out.push_str(&format!("\n    </{ENV}:Fault>"));
    out
}

fn detail_xml(detail: &FaultDetail, prefixes: &Prefixes) -> String {
    // Details are addressing-specific; fall back to the 1.0 namespace for an
    // envelope without addressing.
    let wsa_decl = match prefixes.addressing {
        Some(_) => String::new(),
        None => format!(
            r#" xmlns:{WSA}="{}""#,
            AddressingVersion::WsAddressing10.namespace()
        ),
    };
    match detail {
        FaultDetail::ProblemHeaderQName { name, namespace } => format!(
            r#"<{WSA}:ProblemHeaderQName{wsa_decl} xmlns:p="{}">p:{}</{WSA}:ProblemHeaderQName>"#,
            escape(namespace.as_str()),
            escape(name.as_str())
        ),
        FaultDetail::ProblemAction { action } => format!(
            r#"<{WSA}:ProblemAction{wsa_decl}><{WSA}:Action>{}</{WSA}:Action></{WSA}:ProblemAction>"#,
            escape(action.as_str())
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::{
        must_understand_fault, AddressingFault, FaultReason, FaultReasonText, NotUnderstoodHeader,
    };
    use crate::version::{MessageVersion, SOAP_11_NS, SOAP_12_NS, WSA_10_NS};
    use quick_xml::events::Event;
    use quick_xml::Reader;

    /// Parse `xml` and collect element local names, failing on malformed XML.
    fn element_names(xml: &str) -> Vec<String> {
        let mut reader = Reader::from_str(xml);
        let mut names = Vec::new();
        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    names.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => panic!("malformed envelope: {e}"),
            }
        }
        names
    }

    fn headers() -> Vec<NotUnderstoodHeader> {
        vec![
            NotUnderstoodHeader::new("Security", "urn:example:security").unwrap(),
            NotUnderstoodHeader::new("Session", "urn:example:session").unwrap(),
        ]
    }

    #[test]
    fn test_soap_12_must_understand_envelope() {
        let message =
            must_understand_fault(&headers(), MessageVersion::SOAP12_WSADDRESSING10, "en-US").unwrap();
        let xml = render_fault(&message, "en-US").unwrap();
        assert!(xml.contains(SOAP_12_NS));
        assert!(xml.contains("<s:Value>s:MustUnderstand</s:Value>"));
        assert!(xml.contains("http://www.w3.org/2005/08/addressing/soap/fault"));

        let names = element_names(&xml);
        assert_eq!(names.iter().filter(|n| *n == "NotUnderstood").count(), 2);
        assert!(names.contains(&"Reason".to_string()));
    }

    #[test]
    fn test_soap_11_must_understand_envelope() {
        let message = must_understand_fault(&headers(), MessageVersion::SOAP11, "en").unwrap();
        let xml = render_fault(&message, "en").unwrap();
        assert!(xml.contains(SOAP_11_NS));
        assert!(xml.contains("<faultcode>s:MustUnderstand</faultcode>"));
        assert!(!xml.contains("NotUnderstood"));
        assert!(!xml.contains("Action"));
        element_names(&xml);
    }

    #[test]
    fn test_soap_11_collapses_sub_code() {
        let message = AddressingFault::MessageAddressingHeaderRequired {
            header: "To".to_string(),
        }
        .to_message(MessageVersion::SOAP11_WSADDRESSING10, "en")
        .unwrap();
        let xml = render_fault(&message, "en").unwrap();
        assert!(xml.contains("<faultcode>a:MessageAddressingHeaderRequired</faultcode>"));
        assert!(xml.contains(WSA_10_NS));
        let names = element_names(&xml);
        assert!(names.contains(&"ProblemHeaderQName".to_string()));
    }

    #[test]
    fn test_soap_12_nested_sub_codes() {
        let message = AddressingFault::InvalidCardinality {
            header: "MessageID".to_string(),
        }
        .to_message(MessageVersion::SOAP12_WSADDRESSING10, "en")
        .unwrap();
        let xml = render_fault(&message, "en").unwrap();
        assert!(xml.contains("<s:Value>s:Sender</s:Value>"));
        assert!(xml.contains("<s:Value>a:InvalidAddressingHeader</s:Value>"));
        assert!(xml.contains("<s:Value>a:InvalidCardinality</s:Value>"));
        let names = element_names(&xml);
        assert_eq!(names.iter().filter(|n| *n == "Subcode").count(), 2);
    }

    #[test]
    fn test_soap_11_picks_matching_translation() {
        let reason = FaultReason::new(vec![
            FaultReasonText::new("hola", "es"),
            FaultReasonText::new("hello & goodbye", "en"),
        ])
        .unwrap();
        let code = FaultCode::create_receiver_fault_code(
            FaultCode::with_namespace("Busy", "urn:example:faults").unwrap(),
        );
        let fault = MessageFault::new(code, reason).with_actor("urn:example:actor");
        let message = FaultMessage::new(MessageVersion::SOAP11, fault, None).unwrap();
        let xml = render_fault(&message, "en-GB").unwrap();
        assert!(xml.contains(r#"<faultstring xml:lang="en">hello &amp; goodbye</faultstring>"#));
        assert!(xml.contains(r#"<faultcode xmlns:q="urn:example:faults">q:Busy</faultcode>"#));
        assert!(xml.contains("<faultactor>urn:example:actor</faultactor>"));
        element_names(&xml);
    }

    #[test]
    fn test_soap_11_plain_receiver_code() {
        let fault = MessageFault::new(
            FaultCode::new("Receiver").unwrap(),
            FaultReason::from_text("down", "en"),
        );
        let message = FaultMessage::new(MessageVersion::SOAP11, fault, None).unwrap();
        let xml = render_fault(&message, "en").unwrap();
        assert!(xml.contains("<faultcode>s:Server</faultcode>"));
    }

    #[test]
    fn test_soap_12_all_translations_rendered() {
        let reason = FaultReason::new(vec![
            FaultReasonText::new("hola", "es"),
            FaultReasonText::new("hello", "en"),
        ])
        .unwrap();
        let fault = MessageFault::new(FaultCode::new("Receiver").unwrap(), reason)
            .with_node("urn:example:node");
        let message =
            FaultMessage::new(MessageVersion::SOAP12_WSADDRESSING10, fault, None).unwrap();
        let xml = render_fault(&message, "en").unwrap();
        assert!(xml.contains(r#"<s:Text xml:lang="es">hola</s:Text>"#));
        assert!(xml.contains(r#"<s:Text xml:lang="en">hello</s:Text>"#));
        assert!(xml.contains("<s:Node>urn:example:node</s:Node>"));
    }
}
