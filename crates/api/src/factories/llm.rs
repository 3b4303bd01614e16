//! Request builders for the chat-completion checks

use serde_json::{json, Value};
use std::time::Duration;

use shopcheck_common::next_id;

use crate::models::{ChatMessage, CompletionRequest};

/// A named request with the behaviour it is meant to exercise
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: &'static str,
    pub request: CompletionRequest,
    pub expected_behavior: &'static str,
    /// Slowest acceptable answer
    pub time_limit: Duration,
}

/// Generous bound for a local model on modest hardware
const SLOW_ANSWER: Duration = Duration::from_secs(30);

/// A raw payload and the status a strict server answers with
#[derive(Debug, Clone)]
pub struct ValidationCase {
    pub name: &'static str,
    pub payload: Value,
    pub expected_status: u16,
}

const SAMPLE_PROMPTS: [&str; 10] = [
    "What is the capital of France?",
    "Explain machine learning in simple terms",
    "Write a haiku about nature",
    "What are the benefits of exercise?",
    "Describe the color blue",
    "How do computers work?",
    "Give me a recipe for pancakes",
    "What is the meaning of life?",
    "Tell me a joke",
    "Explain blockchain technology",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct LlmDataFactory;

impl LlmDataFactory {
    pub fn basic_request(model: &str, content: &str) -> CompletionRequest {
        CompletionRequest::new(model, vec![ChatMessage::user(content)])
            .max_tokens(50)
            .temperature(0.7)
    }

    pub fn with_system_prompt(model: &str, system: &str, user: &str) -> CompletionRequest {
        CompletionRequest::new(model, vec![ChatMessage::system(system), ChatMessage::user(user)])
            .max_tokens(100)
            .temperature(0.5)
    }

    /// A seeded exchange followed by `turns` question/answer pairs
    pub fn conversation(model: &str, turns: usize) -> CompletionRequest {
        let mut messages = vec![
            ChatMessage::system("You are a helpful assistant"),
            ChatMessage::user("My name is TestUser"),
            ChatMessage::assistant("Hello TestUser! How can I help you today?"),
        ];
        for i in 1..=turns {
            messages.push(ChatMessage::user(format!("Question {}", i)));
            messages.push(ChatMessage::assistant(format!("Answer {}", i)));
        }

        CompletionRequest::new(model, messages)
            .max_tokens(100)
            .temperature(0.7)
    }

    pub fn edge_case_scenarios(model: &str) -> Vec<Scenario> {
        let single = |content: &str, max_tokens| {
            CompletionRequest::new(model, vec![ChatMessage::user(content)]).max_tokens(max_tokens)
        };

        vec![
            Scenario {
                name: "Empty content",
                request: single("", 10),
                expected_behavior: "Handle gracefully or return error",
                time_limit: SLOW_ANSWER,
            },
            Scenario {
                name: "Very long content",
                request: single(&"A".repeat(2000), 10),
                expected_behavior: "Process without timeout",
                time_limit: SLOW_ANSWER,
            },
            Scenario {
                name: "Special characters",
                request: single("Test: @#$%^&*()_+-=[]{}|;':\",./<>?", 10),
                expected_behavior: "Handle special chars correctly",
                time_limit: SLOW_ANSWER,
            },
            Scenario {
                name: "Unicode content",
                request: single("Hello 你好 नमस्ते مرحبا 🌍", 20),
                expected_behavior: "Support multilingual input",
                time_limit: SLOW_ANSWER,
            },
            Scenario {
                name: "Code snippet",
                request: single(
                    "```python\ndef hello():\n    return \"world\"\n```\nWhat does this do?",
                    50,
                ),
                expected_behavior: "Process code blocks",
                time_limit: SLOW_ANSWER,
            },
        ]
    }

    pub fn temperature_variations(model: &str) -> Vec<CompletionRequest> {
        [0.0, 0.3, 0.5, 0.7, 1.0]
            .into_iter()
            .map(|temperature| {
                let prompt = ChatMessage::user("Describe a color in one word");
                CompletionRequest::new(model, vec![prompt])
                    .max_tokens(15)
                    .temperature(temperature)
            })
            .collect()
    }

    pub fn max_tokens_tests(model: &str) -> Vec<CompletionRequest> {
        [1, 5, 10, 50, 100]
            .into_iter()
            .map(|limit| {
                CompletionRequest::new(
                    model,
                    vec![ChatMessage::user("Write a long story about space exploration")],
                )
                .max_tokens(limit)
                .temperature(0.7)
            })
            .collect()
    }

    /// `count` requests whose prompts never repeat
    pub fn stress_test_batch(model: &str, count: usize) -> Vec<CompletionRequest> {
        (1..=count)
            .map(|i| {
                let prompt = format!("Stress test request {} at {}", i, next_id());
                CompletionRequest::new(model, vec![ChatMessage::user(prompt)])
                    .max_tokens(20)
                    .temperature(0.5)
            })
            .collect()
    }

    pub fn validation_cases() -> Vec<ValidationCase> {
        vec![
            ValidationCase {
                name: "Valid request",
                payload: json!({
                    "model": "test-model",
                    "messages": [{"role": "user", "content": "Hello"}]
                }),
                expected_status: 200,
            },
            ValidationCase {
                name: "Missing model",
                payload: json!({"messages": [{"role": "user", "content": "Hello"}]}),
                expected_status: 400,
            },
            ValidationCase {
                name: "Missing messages",
                payload: json!({"model": "test-model"}),
                expected_status: 400,
            },
            ValidationCase {
                name: "Empty messages array",
                payload: json!({"model": "test-model", "messages": []}),
                expected_status: 400,
            },
            ValidationCase {
                name: "Invalid role",
                payload: json!({
                    "model": "test-model",
                    "messages": [{"role": "invalid", "content": "Hello"}]
                }),
                expected_status: 400,
            },
        ]
    }

    pub fn performance_scenarios(model: &str) -> Vec<Scenario> {
        let request = |content: &str, max_tokens, temperature| {
            CompletionRequest::new(model, vec![ChatMessage::user(content)])
                .max_tokens(max_tokens)
                .temperature(temperature)
        };

        vec![
            Scenario {
                name: "Quick response",
                request: request("Hi", 10, 0.1),
                expected_behavior: "Response under 5 seconds",
                time_limit: Duration::from_secs(5),
            },
            Scenario {
                name: "Long generation",
                request: request("Write a poem", 200, 0.7),
                expected_behavior: "Complete within token limit",
                time_limit: SLOW_ANSWER,
            },
            Scenario {
                name: "Complex reasoning",
                request: request("Explain quantum computing step by step", 150, 0.3),
                expected_behavior: "Structured, coherent response",
                time_limit: SLOW_ANSWER,
            },
        ]
    }

    pub fn sample_prompts() -> &'static [&'static str] {
        &SAMPLE_PROMPTS
    }
}
