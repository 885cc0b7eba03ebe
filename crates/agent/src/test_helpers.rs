//! Scripted providers for loop and session tests.

use cortex_core::error::ProviderError;
use cortex_core::message::Message;
use cortex_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

/// Returns scripted responses in order and records every request.
///
/// With `repeating`, the single response is returned forever. Otherwise
/// panics when the script runs out.
pub struct SequentialMockProvider {
    responses: Vec<ProviderResponse>,
    repeat: bool,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses,
            repeat: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            responses: vec![response],
            repeat: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: &str) -> ProviderResponse {
        ProviderResponse {
            message: Message::assistant(text),
            usage: Some(Usage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            }),
            model: "mock-model".into(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let index = if self.repeat { 0 } else { requests.len() };
        let Some(response) = self.responses.get(index).cloned() else {
            panic!(
                "SequentialMockProvider: no more responses (call #{}, have {})",
                requests.len(),
                self.responses.len()
            );
        };
        requests.push(request);
        Ok(response)
    }
}

/// Always fails like an unreachable server.
pub struct FailingProvider;

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::Network("connection refused".into()))
    }
}

pub fn act(action: &str, input: &str) -> ProviderResponse {
    SequentialMockProvider::text(&format!(
        " I should use {action}.\nAction: {action}\nAction Input: {input}"
    ))
}

pub fn final_answer(answer: &str) -> ProviderResponse {
    SequentialMockProvider::text(&format!(" I now know the final answer\nFinal Answer: {answer}"))
}
