//! SOAP fault codes, reasons and the protocol faults sent back to a peer.

use crate::error::{require_non_empty, validate_namespace, BindingError, Result};
use crate::version::{AddressingVersion, EnvelopeVersion, MessageVersion, SOAP_11_NS, SOAP_12_NS};
use serde::Serialize;
use tracing::debug;

const SENDER: &str = "Sender";
const RECEIVER: &str = "Receiver";

/// A fault code, optionally refined by a nested sub code.
///
/// An empty namespace means "the envelope's own namespace", resolved when
/// the fault is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultCode {
    name: String,
    namespace: String,
    sub_code: Option<Box<FaultCode>>,
}

impl FaultCode {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_namespace(name, "")
    }

    pub fn with_namespace(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let namespace = namespace.into();
        require_non_empty("name", &name)?;
        validate_namespace(&namespace)?;
        Ok(Self {
            name,
            namespace,
            sub_code: None,
        })
    }

    pub fn with_sub_code(mut self, sub_code: FaultCode) -> Self {
        self.sub_code = Some(Box::new(sub_code));
        self
    }

    /// `Sender` code refined by `sub_code`.
    pub fn create_sender_fault_code(sub_code: FaultCode) -> Self {
        Self::predefined(SENDER, sub_code)
    }

    /// `Receiver` code refined by `sub_code`.
    pub fn create_receiver_fault_code(sub_code: FaultCode) -> Self {
        Self::predefined(RECEIVER, sub_code)
    }

    fn predefined(name: &str, sub_code: FaultCode) -> Self {
        Self {
            name: name.to_string(),
            namespace: String::new(),
            sub_code: Some(Box::new(sub_code)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn sub_code(&self) -> Option<&FaultCode> {
        self.sub_code.as_deref()
    }

    /// Whether the code lives in an envelope namespace (or the empty one).
    pub fn is_predefined_fault(&self) -> bool {
        self.namespace.is_empty() || self.namespace == SOAP_11_NS || self.namespace == SOAP_12_NS
    }

    pub fn is_sender_fault(&self) -> bool {
        self.matches_predefined(EnvelopeVersion::sender_fault_name)
    }

    pub fn is_receiver_fault(&self) -> bool {
        self.matches_predefined(EnvelopeVersion::receiver_fault_name)
    }

    fn matches_predefined(&self, fault_name: fn(EnvelopeVersion) -> &'static str) -> bool {
        if !self.is_predefined_fault() {
            return false;
        }
        // Only the SOAP 1.1 namespace uses Client/Server.
        let version = EnvelopeVersion::from_namespace(&self.namespace).unwrap_or(EnvelopeVersion::Soap12);
        self.name == fault_name(version)
    }
}

/// One translation of a fault reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultReasonText {
    pub text: String,
    pub xml_lang: String,
}

impl FaultReasonText {
    pub fn new(text: impl Into<String>, xml_lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            xml_lang: xml_lang.into(),
        }
    }

    pub fn matches(&self, culture: &str) -> bool {
        self.xml_lang.eq_ignore_ascii_case(culture)
    }
}

/// Human-readable fault reason in one or more languages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultReason {
    translations: Vec<FaultReasonText>,
}

impl FaultReason {
    pub fn new(translations: Vec<FaultReasonText>) -> Result<Self> {
        if translations.is_empty() {
            return Err(BindingError::EmptyArgument("translations"));
        }
        Ok(Self { translations })
    }

    pub fn from_text(text: impl Into<String>, xml_lang: impl Into<String>) -> Self {
        Self {
            translations: vec![FaultReasonText::new(text, xml_lang)],
        }
    }

    pub fn translations(&self) -> &[FaultReasonText] {
        &self.translations
    }

    /// Select the translation for `culture`.
    ///
    /// A sole translation always wins. Otherwise the culture tag is matched
    /// exactly, then with trailing subtags stripped one at a time
    /// (`en-US` then `en`). With no match the first translation is used.
    pub fn matching_translation(&self, culture: &str) -> &FaultReasonText {
        if let [only] = self.translations.as_slice() {
            return only;
        }

        let mut tag = culture;
        loop {
            if let Some(found) = self.translations.iter().find(|t| t.matches(tag)) {
                return found;
            }
            match tag.rfind('-') {
                Some(end) => tag = &tag[..end],
                None => break,
            }
        }

        &self.translations[0]
    }
}

/// Structured fault detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaultDetail {
    /// Qualified name of the addressing header that caused the fault.
    ProblemHeaderQName { name: String, namespace: String },
    /// Action the receiver could not process.
    ProblemAction { action: String },
}

/// A header the receiver was required to understand but could not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotUnderstoodHeader {
    pub name: String,
    pub namespace: String,
}

impl NotUnderstoodHeader {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let namespace = namespace.into();
        require_non_empty("name", &name)?;
        require_non_empty("namespace", &namespace)?;
        validate_namespace(&namespace)?;
        Ok(Self { name, namespace })
    }
}

/// Body of a SOAP fault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageFault {
    pub code: FaultCode,
    pub reason: FaultReason,
    pub node: Option<String>,
    pub actor: Option<String>,
    pub detail: Option<FaultDetail>,
}

impl MessageFault {
    pub fn new(code: FaultCode, reason: FaultReason) -> Self {
        Self {
            code,
            reason,
            node: None,
            actor: None,
            detail: None,
        }
    }

    pub fn with_node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_detail(mut self, detail: FaultDetail) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// An outbound fault message addressed to the sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaultMessage {
    pub version: MessageVersion,
    pub action: Option<String>,
    pub not_understood: Vec<NotUnderstoodHeader>,
    pub fault: MessageFault,
}

impl FaultMessage {
    /// Wrap `fault` for `version`. Envelope-less messages cannot carry faults.
    pub fn new(version: MessageVersion, fault: MessageFault, action: Option<String>) -> Result<Self> {
        if version.envelope == EnvelopeVersion::None {
            return Err(BindingError::unsupported(
                "faults require a SOAP envelope version",
            ));
        }
        let action = match version.addressing {
            AddressingVersion::None => None,
            _ => action,
        };
        Ok(Self {
            version,
            action,
            not_understood: Vec::new(),
            fault,
        })
    }
}

/// Build the MustUnderstand fault for headers the receiver did not process.
///
/// The reason cites the first header; SOAP 1.2 also lists every header in
/// its own `NotUnderstood` header block.
pub fn must_understand_fault(
    headers: &[NotUnderstoodHeader],
    version: MessageVersion,
    culture: &str,
) -> Result<FaultMessage> {
    let Some(first) = headers.first() else {
        return Err(BindingError::EmptyArgument("headers"));
    };

    let envelope = version.envelope;
    let code = FaultCode::with_namespace(envelope.must_understand_fault_name(), envelope.namespace())?;
    let reason = FaultReason::from_text(
        format!(
            "The header '{}' from the namespace '{}' was not understood by the recipient of this message, causing the message to not be processed.  This error typically indicates that the sender of this message has enabled a communication protocol that the receiver cannot process.  Please ensure that the configuration of the client's binding is consistent with the service's binding.",
            first.name, first.namespace
        ),
        culture,
    );

    let action = version.addressing.default_fault_action().to_string();
    let mut message = FaultMessage::new(version, MessageFault::new(code, reason), Some(action))?;
    if envelope.supports_not_understood_header() {
        message.not_understood = headers.to_vec();
    }

    debug!(
        headers = headers.len(),
        first = %first.name,
        %version,
        "Built MustUnderstand fault"
    );
    Ok(message)
}

/// WS-Addressing protocol faults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressingFault {
    /// A header was present but malformed.
    InvalidAddressingHeader { header: String },
    /// A header appeared more times than allowed.
    InvalidCardinality { header: String },
    /// A required header was missing.
    MessageAddressingHeaderRequired { header: String },
    /// The WS-Addressing action disagrees with the transport action.
    ActionMismatch {
        soap_action: String,
        http_action: String,
    },
    ActionNotSupported { action: String },
    DestinationUnreachable { to: String },
}

impl AddressingFault {
    /// Sub code wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddressingHeader { .. } => "InvalidAddressingHeader",
            Self::InvalidCardinality { .. } => "InvalidCardinality",
            Self::MessageAddressingHeaderRequired { .. } => "MessageAddressingHeaderRequired",
            Self::ActionMismatch { .. } => "ActionMismatch",
            Self::ActionNotSupported { .. } => "ActionNotSupported",
            Self::DestinationUnreachable { .. } => "DestinationUnreachable",
        }
    }

    /// Whether the fault carries a ProblemHeaderQName detail.
    pub fn has_problem_header(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddressingHeader { .. }
                | Self::InvalidCardinality { .. }
                | Self::MessageAddressingHeaderRequired { .. }
                | Self::ActionMismatch { .. }
        )
    }

    fn reason_text(&self) -> String {
        match self {
            Self::InvalidAddressingHeader { header } => {
                format!("A header representing a Message Addressing Property is not valid and the message cannot be processed: '{header}'.")
            }
            Self::InvalidCardinality { header } => {
                format!("Multiple '{header}' headers were found; at most one is allowed.")
            }
            Self::MessageAddressingHeaderRequired { header } => {
                format!("A required header representing a Message Addressing Property is not present: '{header}'.")
            }
            Self::ActionMismatch {
                soap_action,
                http_action,
            } => format!(
                "The SOAP action specified on the message, '{soap_action}', does not match the HTTP SOAP Action, '{http_action}'."
            ),
            Self::ActionNotSupported { action } => format!(
                "The message with Action '{action}' cannot be processed at the receiver."
            ),
            Self::DestinationUnreachable { to } => format!(
                "The message with To '{to}' cannot be processed at the receiver."
            ),
        }
    }

    fn problem_header(&self) -> Option<&str> {
        match self {
            Self::InvalidAddressingHeader { header }
            | Self::InvalidCardinality { header }
            | Self::MessageAddressingHeaderRequired { header } => Some(header),
            Self::ActionMismatch { .. } => Some("Action"),
            Self::ActionNotSupported { .. } | Self::DestinationUnreachable { .. } => None,
        }
    }

    /// Build the fault message for a session negotiated at `version`.
    ///
    /// # Panics
    ///
    /// Problem-header faults are only defined for WS-Addressing 1.0; building
    /// one under any other addressing version panics.
    pub fn to_message(&self, version: MessageVersion, culture: &str) -> Result<FaultMessage> {
        if self.has_problem_header() {
            assert_eq!(
                version.addressing,
                AddressingVersion::WsAddressing10,
                "{} faults require WS-Addressing 1.0",
                self.as_str()
            );
        }
        if version.addressing == AddressingVersion::None {
            return Err(BindingError::unsupported(format!(
                "{} faults require a WS-Addressing version",
                self.as_str()
            )));
        }

        let wsa = version.addressing.namespace();
        let sub_code = match self {
            Self::InvalidCardinality { .. } => {
                FaultCode::with_namespace("InvalidAddressingHeader", wsa)?
                    .with_sub_code(FaultCode::with_namespace(self.as_str(), wsa)?)
            }
            _ => FaultCode::with_namespace(self.as_str(), wsa)?,
        };
        let code = FaultCode::create_sender_fault_code(sub_code);
        let mut fault = MessageFault::new(code, FaultReason::from_text(self.reason_text(), culture));

        if let Some(header) = self.problem_header() {
            fault = fault.with_detail(FaultDetail::ProblemHeaderQName {
                name: header.to_string(),
                namespace: wsa.to_string(),
            });
        } else if let Self::ActionNotSupported { action } = self {
            fault = fault.with_detail(FaultDetail::ProblemAction {
                action: action.clone(),
            });
        }

        FaultMessage::new(version, fault, Some(version.addressing.fault_action().to_string()))
    }
}
