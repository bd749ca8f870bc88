//! Sequential, fail-fast fan-out of generation calls over chunks.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::core::Chunk;
use crate::error::{GenerationError, OrchestratorError};
use crate::ollama::Generator;
use crate::query::prompt::PromptTemplate;

/// Default deadline for one chunk's generation call.
pub const DEFAULT_CHUNK_TIMEOUT: Duration = Duration::from_secs(60);

/// Separator placed between consecutive chunk answers.
const ANSWER_SEPARATOR: &str = "\n";

/// Lifecycle of one chunk within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// Not yet sent.
    Pending,
    /// Generation call in progress.
    InFlight,
    /// Answer received.
    Succeeded,
    /// Generation call failed.
    Failed,
    /// Generation call exceeded the chunk deadline.
    TimedOut,
}

impl ChunkState {
    /// Returns the state name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for ChunkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The assembled answer of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    /// Chunk answers in chunk order, newline separated.
    pub text: String,
    /// Model that produced the answers.
    pub model: String,
    /// Number of chunks queried.
    pub chunks: usize,
}

/// Drives one generation call per chunk, in order, and stops at the first
/// failure.
///
/// The orchestrator borrows its collaborators and holds no state between
/// runs, so one instance may serve any number of sequential calls.
pub struct ChunkOrchestrator<'a> {
    generator: &'a dyn Generator,
    template: &'a PromptTemplate,
    chunk_timeout: Option<Duration>,
}

impl<'a> ChunkOrchestrator<'a> {
    /// Creates an orchestrator with the default chunk deadline.
    #[must_use]
    pub const fn new(generator: &'a dyn Generator, template: &'a PromptTemplate) -> Self {
        Self {
            generator,
            template,
            chunk_timeout: Some(DEFAULT_CHUNK_TIMEOUT),
        }
    }

    /// Overrides the per-chunk deadline. `None` leaves only the client's own
    /// timeout in effect.
    #[must_use]
    pub const fn with_chunk_timeout(mut self, chunk_timeout: Option<Duration>) -> Self {
        self.chunk_timeout = chunk_timeout;
        self
    }

    /// Returns the per-chunk deadline.
    #[must_use]
    pub const fn chunk_timeout(&self) -> Option<Duration> {
        self.chunk_timeout
    }

    /// Queries every chunk with `question` and joins the answers.
    ///
    /// # Arguments
    ///
    /// * `chunks` - Chunks in the order their answers should appear.
    /// * `question` - The user's question, inserted into every prompt.
    /// * `model` - Model identifier passed to the generator.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::NoChunks`] for an empty chunk list and
    /// [`OrchestratorError::ChunkFailed`] for the first chunk whose call
    /// fails or times out. Answers gathered before the failure are dropped.
    pub async fn answer(
        &self,
        chunks: &[Chunk],
        question: &str,
        model: &str,
    ) -> Result<Answer, OrchestratorError> {
        if chunks.is_empty() {
            return Err(OrchestratorError::NoChunks);
        }

        let total = chunks.len();
        let mut answers: Vec<String> = Vec::with_capacity(total);

        tracing::info!(
            model,
            chunks = total,
            question_len = question.len(),
            "starting chunked query"
        );

        for (index, chunk) in chunks.iter().enumerate() {
            log_state(index, total, ChunkState::Pending);
            let prompt = self.template.render(question, &chunk.content);

            log_state(index, total, ChunkState::InFlight);
            match self.generate(model, &prompt).await {
                Ok(text) => {
                    tracing::debug!(
                        chunk = index,
                        total,
                        state = %ChunkState::Succeeded,
                        answer_len = text.len(),
                        "chunk state"
                    );
                    answers.push(text);
                }
                Err(source) => {
                    let state = if source.is_timeout() {
                        ChunkState::TimedOut
                    } else {
                        ChunkState::Failed
                    };
                    tracing::warn!(
                        chunk = index,
                        total,
                        processed = answers.len(),
                        model,
                        state = %state,
                        error = %source,
                        "chunk failed, aborting query"
                    );
                    return Err(OrchestratorError::ChunkFailed {
                        index,
                        total,
                        processed: answers.len(),
                        model: model.to_string(),
                        source,
                    });
                }
            }
        }

        let text = answers.join(ANSWER_SEPARATOR);
        tracing::info!(model, chunks = total, answer_len = text.len(), "chunked query complete");

        Ok(Answer {
            text,
            model: model.to_string(),
            chunks: total,
        })
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let call = self.generator.generate(model, prompt);
        match self.chunk_timeout {
            // Elapsed drops `call`, which aborts the in-flight request
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(GenerationError::Timeout(limit))),
            None => call.await,
        }
    }
}

fn log_state(index: usize, total: usize, state: ChunkState) {
    tracing::trace!(chunk = index, total, state = %state, "chunk state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::chunk_text;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Answers each call from a script and records the prompts it saw.
    struct ScriptedGenerator {
        script: Vec<Result<String, ()>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(script: Vec<Result<&str, ()>>) -> Self {
            Self {
                script: script.into_iter().map(|r| r.map(str::to_string)).collect(),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
            let call = {
                let mut prompts = self.prompts.lock().unwrap();
                prompts.push(prompt.to_string());
                prompts.len() - 1
            };
            match &self.script[call] {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(GenerationError::Upstream {
                    status: 500,
                    body: "server overload".to_string(),
                }),
            }
        }
    }

    /// Sleeps before answering and flags whether it ever finished.
    struct SlowGenerator {
        delay: Duration,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl Generator for SlowGenerator {
        async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
            tokio::time::sleep(self.delay).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok("late".to_string())
        }
    }

    fn three_chunks() -> Vec<Chunk> {
        chunk_text("aaabbbccc", 3)
    }

    #[tokio::test]
    async fn test_answers_joined_with_newline() {
        let generator = ScriptedGenerator::new(vec![Ok("A"), Ok("B")]);
        let template = PromptTemplate::default();
        let chunks = chunk_text("xxyy", 2);

        let answer = ChunkOrchestrator::new(&generator, &template)
            .answer(&chunks, "q", "gemma2:2b")
            .await
            .unwrap();

        assert_eq!(answer.text, "A\nB");
        assert_eq!(answer.model, "gemma2:2b");
        assert_eq!(answer.chunks, 2);
    }

    #[tokio::test]
    async fn test_single_chunk_has_no_separator() {
        let generator = ScriptedGenerator::new(vec![Ok("only")]);
        let template = PromptTemplate::default();
        let chunks = chunk_text("short text", 100);

        let answer = ChunkOrchestrator::new(&generator, &template)
            .answer(&chunks, "what?", "m")
            .await
            .unwrap();

        assert_eq!(answer.text, "only");
        assert_eq!(answer.chunks, 1);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompts_follow_chunk_order() {
        let generator = ScriptedGenerator::new(vec![Ok("1"), Ok("2"), Ok("3")]);
        let template = PromptTemplate::parse("{chunk}:{question}").unwrap();

        ChunkOrchestrator::new(&generator, &template)
            .answer(&three_chunks(), "q", "m")
            .await
            .unwrap();

        let prompts = generator.prompts.lock().unwrap().clone();
        assert_eq!(prompts, vec!["aaa:q", "bbb:q", "ccc:q"]);
    }

    #[tokio::test]
    async fn test_fail_fast_on_second_chunk() {
        let generator = ScriptedGenerator::new(vec![Ok("A"), Err(()), Ok("C")]);
        let template = PromptTemplate::default();

        let err = ChunkOrchestrator::new(&generator, &template)
            .answer(&three_chunks(), "q", "gemma2:2b")
            .await
            .unwrap_err();

        match err {
            OrchestratorError::ChunkFailed {
                index,
                total,
                processed,
                model,
                source,
            } => {
                assert_eq!(index, 1);
                assert_eq!(total, 3);
                assert_eq!(processed, 1);
                assert_eq!(model, "gemma2:2b");
                assert!(matches!(source, GenerationError::Upstream { status: 500, .. }));
            }
            OrchestratorError::NoChunks => panic!("expected ChunkFailed"),
        }
        // Third chunk never requested
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_first_chunk_failure_processed_zero() {
        let generator = ScriptedGenerator::new(vec![Err(())]);
        let template = PromptTemplate::default();

        let err = ChunkOrchestrator::new(&generator, &template)
            .answer(&three_chunks(), "q", "m")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OrchestratorError::ChunkFailed {
                index: 0,
                processed: 0,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_chunk_list_rejected() {
        let generator = ScriptedGenerator::new(vec![]);
        let template = PromptTemplate::default();

        let err = ChunkOrchestrator::new(&generator, &template)
            .answer(&[], "q", "m")
            .await
            .unwrap_err();

        assert!(matches!(err, OrchestratorError::NoChunks));
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_slow_chunk_times_out_and_is_cancelled() {
        let finished = Arc::new(AtomicBool::new(false));
        let generator = SlowGenerator {
            delay: Duration::from_millis(300),
            finished: Arc::clone(&finished),
        };
        let template = PromptTemplate::default();
        let chunks = chunk_text("text", 0);

        let err = ChunkOrchestrator::new(&generator, &template)
            .with_chunk_timeout(Some(Duration::from_millis(20)))
            .answer(&chunks, "q", "m")
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(matches!(
            err,
            OrchestratorError::ChunkFailed {
                source: GenerationError::Timeout(_),
                processed: 0,
                ..
            }
        ));

        // The abandoned call must not keep running
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_no_chunk_timeout() {
        let finished = Arc::new(AtomicBool::new(false));
        let generator = SlowGenerator {
            delay: Duration::from_millis(30),
            finished: Arc::clone(&finished),
        };
        let template = PromptTemplate::default();
        let orchestrator = ChunkOrchestrator::new(&generator, &template).with_chunk_timeout(None);
        assert_eq!(orchestrator.chunk_timeout(), None);

        let answer = orchestrator
            .answer(&chunk_text("t", 0), "q", "m")
            .await
            .unwrap();
        assert_eq!(answer.text, "late");
        assert!(finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_chunk_state_names() {
        assert_eq!(ChunkState::InFlight.to_string(), "in_flight");
        assert_eq!(ChunkState::TimedOut.as_str(), "timed_out");
        assert_eq!(ChunkState::Succeeded.to_string(), "succeeded");
    }
}
