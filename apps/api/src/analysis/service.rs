//! Résumé analysis — extraction → prompt → chat completion → flat critique text.

use std::sync::Arc;

use tracing::info;

use crate::analysis::prompt_builder::PromptBuilder;
use crate::analysis::prompts::REVIEW_SYSTEM;
use crate::errors::AppError;
use crate::extraction::{extract_text, UploadedDocument};
use crate::llm_client::{ChatCompletion, LlmError};

#[derive(Clone)]
pub struct AnalysisService {
    llm: Arc<dyn ChatCompletion>,
    prompts: PromptBuilder,
}

impl AnalysisService {
    pub fn new(llm: Arc<dyn ChatCompletion>, prompts: PromptBuilder) -> Self {
        Self { llm, prompts }
    }

    /// Returns the model's critique of `document` for `job_role` (may be empty).
    pub async fn analyze(
        &self,
        document: &UploadedDocument,
        job_role: &str,
    ) -> Result<String, AppError> {
        let resume_text = extract_text(document)?;
        if resume_text.trim().is_empty() {
            return Err(AppError::UnreadableFile);
        }

        let prompt = self.prompts.build(&resume_text, job_role);
        info!(
            chars = resume_text.chars().count(),
            prompt_chars = prompt.chars().count(),
            "Sending resume for review"
        );

        let response = self.llm.complete(REVIEW_SYSTEM, &prompt).await?;
        let analysis = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(analysis.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use bytes::Bytes;

    use super::*;
    use crate::analysis::prompts::{GENERAL_ROLE, RESUME_START};
    use crate::llm_client::ChatResponse;

    /// Records prompts and replies with a fixed body.
    struct StubLlm {
        reply: serde_json::Value,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl StubLlm {
        fn replying(reply: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatCompletion for StubLlm {
        async fn complete(&self, system: &str, prompt: &str) -> Result<ChatResponse, LlmError> {
            self.prompts
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            Ok(serde_json::from_value(self.reply.clone())?)
        }
    }

    fn content(text: &str) -> serde_json::Value {
        serde_json::json!({ "choices": [{ "message": { "content": text } }] })
    }

    fn text_upload(body: &'static str) -> UploadedDocument {
        UploadedDocument::new(Bytes::from_static(body.as_bytes()), "text/plain", "resume.txt")
    }

    #[tokio::test]
    async fn test_analysis_returns_first_choice_content() {
        let llm = StubLlm::replying(content("Quantify your impact."));
        let service = AnalysisService::new(llm.clone(), PromptBuilder::default());

        let analysis = service
            .analyze(&text_upload("Jane Doe\nRust developer"), "Backend Engineer")
            .await
            .unwrap();

        assert_eq!(analysis, "Quantify your impact.");
        let prompts = llm.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, REVIEW_SYSTEM);
        assert!(prompts[0].1.contains(RESUME_START));
        assert!(prompts[0].1.contains("Backend Engineer"));
    }

    #[tokio::test]
    async fn test_blank_role_falls_back_to_general() {
        let llm = StubLlm::replying(content("ok"));
        let service = AnalysisService::new(llm.clone(), PromptBuilder::default());

        service.analyze(&text_upload("Jane Doe"), "").await.unwrap();

        assert!(llm.prompts.lock().unwrap()[0].1.contains(GENERAL_ROLE));
    }

    #[tokio::test]
    async fn test_whitespace_resume_is_unreadable_and_skips_llm() {
        let llm = StubLlm::replying(content("unused"));
        let service = AnalysisService::new(llm.clone(), PromptBuilder::default());

        let err = service.analyze(&text_upload(" \n\t "), "").await.unwrap_err();

        assert!(matches!(err, AppError::UnreadableFile));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_type_skips_llm() {
        let llm = StubLlm::replying(content("unused"));
        let service = AnalysisService::new(llm.clone(), PromptBuilder::default());
        let image = UploadedDocument::new(Bytes::from_static(b"\x89PNG"), "image/png", "me.png");

        let err = service.analyze(&image, "").await.unwrap_err();

        assert!(matches!(err, AppError::UnsupportedMediaType(t) if t == "image/png"));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_choices_is_empty_content() {
        let llm = StubLlm::replying(serde_json::json!({ "choices": [] }));
        let service = AnalysisService::new(llm, PromptBuilder::default());

        let err = service.analyze(&text_upload("Jane Doe"), "").await.unwrap_err();

        assert!(matches!(err, AppError::Llm(LlmError::EmptyContent)));
    }
}
