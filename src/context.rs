//! The input bundle for one evaluation.
//!
//! An [`AnalysisContext`] is built once per message and then only read. Each
//! signal module selects its own typed slice from it; no module sees the
//! whole bundle as loosely-shaped data.

use crate::signal::Unevaluable;
use crate::types::Channel;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Links found in the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlInput {
    pub urls: Vec<String>,
}

impl UrlInput {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sender-related headers of the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderInput {
    /// Raw `From` value, e.g. `"PayPal Support" <help@paypa1.example>`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_path: Option<String>,
    /// Raw `Authentication-Results` value (spf/dkim/dmarc verdicts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_results: Option<String>,
}

impl HeaderInput {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            ..Self::default()
        }
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn with_return_path(mut self, return_path: impl Into<String>) -> Self {
        self.return_path = Some(return_path.into());
        self
    }

    pub fn with_authentication_results(mut self, results: impl Into<String>) -> Self {
        self.authentication_results = Some(results.into());
        self
    }
}

/// Human-readable text of the message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub body: String,
}

impl ContentInput {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            subject: None,
            body: body.into(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

/// One module's slice as supplied by the caller.
///
/// A slice of the wrong shape is kept as [`ModuleInput::Malformed`] instead of
/// failing the whole context, so only the module that owns it is affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleInput<T> {
    Provided(T),
    Malformed { value: Value, error: String },
}

impl<T> ModuleInput<T> {
    /// The decoded slice, if it had the expected shape.
    pub fn provided(&self) -> Option<&T> {
        match self {
            Self::Provided(input) => Some(input),
            Self::Malformed { .. } => None,
        }
    }

    /// The decoded slice, or the decode error as an [`Unevaluable`].
    pub fn decoded(&self) -> Result<&T, Unevaluable> {
        match self {
            Self::Provided(input) => Ok(input),
            Self::Malformed { error, .. } => Err(Unevaluable::malformed(error.as_str())),
        }
    }
}

impl<T> From<T> for ModuleInput<T> {
    fn from(input: T) -> Self {
        Self::Provided(input)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ModuleInput<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&value) {
            Ok(input) => Self::Provided(input),
            Err(e) => Self::Malformed {
                error: e.to_string(),
                value,
            },
        })
    }
}

impl<T: Serialize> Serialize for ModuleInput<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Provided(input) => input.serialize(serializer),
            Self::Malformed { value, .. } => value.serialize(serializer),
        }
    }
}

/// Per-module inputs, keyed by module name in serialized form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<ModuleInput<UrlInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<ModuleInput<HeaderInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<ModuleInput<ContentInput>>,
}

/// Immutable input bundle for one message under evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisContext {
    #[serde(default)]
    channel: Channel,
    #[serde(default)]
    modules: ModuleInputs,
}

impl AnalysisContext {
    /// Create a context for a message delivered over `channel`.
    pub fn new(channel: impl Into<Channel>) -> Self {
        Self {
            channel: channel.into(),
            modules: ModuleInputs::default(),
        }
    }

    pub fn with_channel(mut self, channel: impl Into<Channel>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn with_url(mut self, input: UrlInput) -> Self {
        self.modules.url = Some(input.into());
        self
    }

    pub fn with_header(mut self, input: HeaderInput) -> Self {
        self.modules.header = Some(input.into());
        self
    }

    pub fn with_content(mut self, input: ContentInput) -> Self {
        self.modules.content = Some(input.into());
        self
    }

    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    pub fn modules(&self) -> &ModuleInputs {
        &self.modules
    }

    /// The url slice, if supplied with the expected shape.
    pub fn url(&self) -> Option<&UrlInput> {
        self.modules.url.as_ref().and_then(ModuleInput::provided)
    }

    pub fn header(&self) -> Option<&HeaderInput> {
        self.modules.header.as_ref().and_then(ModuleInput::provided)
    }

    pub fn content(&self) -> Option<&ContentInput> {
        self.modules.content.as_ref().and_then(ModuleInput::provided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = AnalysisContext::new("SMS")
            .with_url(UrlInput::new(["https://bit.ly/x"]))
            .with_content(ContentInput::new("hello").with_subject("hi"));

        assert_eq!(ctx.channel().as_str(), "sms");
        assert_eq!(ctx.url().unwrap().urls, vec!["https://bit.ly/x"]);
        assert_eq!(ctx.content().unwrap().subject.as_deref(), Some("hi"));
        assert!(ctx.header().is_none());
    }

    #[test]
    fn test_context_default_has_no_channel() {
        let ctx = AnalysisContext::default();
        assert!(ctx.channel().is_empty());
        assert_eq!(ctx.modules(), &ModuleInputs::default());
    }

    #[test]
    fn test_context_deserialize_full() {
        let json = r#"{
            "channel": "Email",
            "modules": {
                "url": { "urls": ["http://192.168.0.1/login"] },
                "header": {
                    "from": "Support <help@example.com>",
                    "reply_to": "attacker@evil.example",
                    "authentication_results": "spf=fail"
                },
                "content": { "subject": "Urgent", "body": "Verify your account" }
            }
        }"#;
        let ctx: AnalysisContext = serde_json::from_str(json).unwrap();

        assert_eq!(ctx.channel().as_str(), "email");
        assert_eq!(ctx.url().unwrap().urls.len(), 1);
        let header = ctx.header().unwrap();
        assert_eq!(header.reply_to.as_deref(), Some("attacker@evil.example"));
        assert!(header.return_path.is_none());
        assert_eq!(ctx.content().unwrap().body, "Verify your account");
    }

    #[test]
    fn test_context_deserialize_missing_and_null_channel() {
        let ctx: AnalysisContext = serde_json::from_str("{}").unwrap();
        assert!(ctx.channel().is_empty());
        assert!(ctx.url().is_none());

        let ctx: AnalysisContext = serde_json::from_str(r#"{"channel": null}"#).unwrap();
        assert!(ctx.channel().is_empty());
    }

    #[test]
    fn test_header_input_builder() {
        let header = HeaderInput::new("a@example.com")
            .with_reply_to("b@example.org")
            .with_return_path("<bounce@example.net>")
            .with_authentication_results("dkim=pass");

        assert_eq!(header.from.as_deref(), Some("a@example.com"));
        assert_eq!(header.reply_to.as_deref(), Some("b@example.org"));
        assert_eq!(header.return_path.as_deref(), Some("<bounce@example.net>"));
        assert_eq!(header.authentication_results.as_deref(), Some("dkim=pass"));
    }

    #[test]
    fn test_context_keeps_wrongly_typed_slice() {
        let json = r#"{
            "channel": "sms",
            "modules": {
                "url": { "urls": ["https://bit.ly/x"] },
                "header": { "from": 42 }
            }
        }"#;
        let ctx: AnalysisContext = serde_json::from_str(json).unwrap();

        assert_eq!(ctx.url().unwrap().urls, vec!["https://bit.ly/x"]);
        assert!(ctx.header().is_none());
        let header = ctx.modules().header.as_ref().unwrap();
        match header.decoded() {
            Err(Unevaluable::Malformed(reason)) => assert!(reason.contains("invalid type")),
            other => panic!("expected malformed header, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_slice_serializes_original_value() {
        let json = r#"{"channel":"email","modules":{"url":{"urls":"x"}}}"#;
        let ctx: AnalysisContext = serde_json::from_str(json).unwrap();

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["modules"]["url"]["urls"], "x");
    }

    #[test]
    fn test_null_slice_is_missing() {
        let ctx: AnalysisContext =
            serde_json::from_str(r#"{"modules":{"content":null}}"#).unwrap();
        assert!(ctx.modules().content.is_none());
    }
}
