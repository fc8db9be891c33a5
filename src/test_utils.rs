#[cfg(test)]
pub mod fixtures {
    use crate::context::{AnalysisContext, ContentInput, HeaderInput, UrlInput};
    use crate::signal::{DynSignalModule, ModuleResult, Unevaluable};
    use crate::types::ModuleId;

    /// Module that returns a canned outcome regardless of input.
    pub struct StubModule {
        pub id: ModuleId,
        pub outcome: Result<ModuleResult, Unevaluable>,
    }

    impl StubModule {
        pub fn scoring(id: ModuleId, score: i32) -> Self {
            Self {
                id,
                outcome: Ok(ModuleResult::new(score)),
            }
        }

        /// Bypasses the clamping constructor to simulate a buggy module.
        pub fn raw(id: ModuleId, score: i32) -> Self {
            let mut result = ModuleResult::new(0);
            result.score = score;
            Self {
                id,
                outcome: Ok(result),
            }
        }

        pub fn flagging(id: ModuleId, score: i32, flags: &[&str]) -> Self {
            Self {
                id,
                outcome: Ok(ModuleResult::new(score).with_flags(flags.iter().copied())),
            }
        }

        pub fn failing(id: ModuleId, reason: Unevaluable) -> Self {
            Self {
                id,
                outcome: Err(reason),
            }
        }
    }

    impl DynSignalModule for StubModule {
        fn id(&self) -> ModuleId {
            self.id
        }

        fn run(&self, _context: &AnalysisContext) -> Result<ModuleResult, Unevaluable> {
            self.outcome.clone()
        }
    }

    pub struct PanickingModule(pub ModuleId);

    impl DynSignalModule for PanickingModule {
        fn id(&self) -> ModuleId {
            self.0
        }

        fn run(&self, _context: &AnalysisContext) -> Result<ModuleResult, Unevaluable> {
            panic!("detector exploded")
        }
    }

    /// Textbook SMS phish: shortened link, urgency and a credential ask.
    pub fn sms_phish() -> AnalysisContext {
        AnalysisContext::new("SMS")
            .with_url(UrlInput::new(["https://bit.ly/3xYz"]))
            .with_content(ContentInput::new(
                "URGENT: your account will be suspended. Verify your password now at the link.",
            ))
    }

    /// Benign internal email with consistent headers.
    pub fn benign_email() -> AnalysisContext {
        AnalysisContext::new("email")
            .with_url(UrlInput::new(["https://docs.example.com/handbook"]))
            .with_header(
                HeaderInput::new("Alice Smith <alice@example.com>")
                    .with_reply_to("alice@example.com")
                    .with_authentication_results(
                        "mx.example.com; spf=pass smtp.mailfrom=example.com; dkim=pass; dmarc=pass",
                    ),
            )
            .with_content(
                ContentInput::new("Hi Bob, the notes from today's meeting are attached.")
                    .with_subject("Meeting notes"),
            )
    }

    /// Spoofed email with failing authentication and a mismatched reply path.
    pub fn spoofed_email() -> AnalysisContext {
        AnalysisContext::new("email")
            .with_header(
                HeaderInput::new("\"IT Support <helpdesk@corp.com>\" <it.support.desk@gmail.com>")
                    .with_reply_to("collect@harvest.example.net")
                    .with_authentication_results("mx.corp.com; spf=softfail; dkim=fail; dmarc=fail"),
            )
            .with_content(ContentInput::new("Dear customer, please confirm your login."))
    }
}
