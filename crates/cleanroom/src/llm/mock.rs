//! Mock LLM provider for testing and dry runs.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::EnrichmentError;

use super::prompts::{self, LOYALTY_COLUMN, MISSING, PERSONA_COLUMN};
use super::provider::{LlmConfig, LlmProvider};

/// How the mock answers.
#[derive(Debug)]
enum Behavior {
    /// Return the queued responses in order, then fail.
    Scripted(Mutex<VecDeque<String>>),
    /// Fill every placeholder in the prompt's table and append the two
    /// derived columns.
    Echo,
    /// Always fail with a transport error.
    Failing(String),
}

/// Mock LLM provider that returns predictable responses for testing.
#[derive(Debug)]
pub struct MockProvider {
    config: LlmConfig,
    behavior: Behavior,
    prompts: Mutex<Vec<String>>,
}

impl MockProvider {
    /// A mock that enriches the table it is given.
    pub fn new() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// A mock that returns `responses` one per call.
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses.into_iter().map(Into::into).collect();
        Self::with_behavior(Behavior::Scripted(Mutex::new(queue)))
    }

    /// A mock whose every call fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Failing(message.into()))
    }

    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            config: LlmConfig::with_model("mock"),
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    pub fn received(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Number of calls made.
    pub fn calls(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LlmProvider for MockProvider {
    fn generate(&self, prompt: &str) -> Result<String, EnrichmentError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.behavior {
            Behavior::Scripted(queue) => queue
                .lock()
                .ok()
                .and_then(|mut q| q.pop_front())
                .ok_or_else(|| EnrichmentError::Transport("mock script exhausted".to_string())),
            Behavior::Echo => echo(prompt),
            Behavior::Failing(message) => Err(EnrichmentError::Transport(message.clone())),
        }
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Fill the prompt's table and answer it inside a code fence.
fn echo(prompt: &str) -> Result<String, EnrichmentError> {
    let table = prompts::extract_table(prompt)
        .ok_or_else(|| EnrichmentError::Parse("no table in prompt".to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(table.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| EnrichmentError::Parse(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    let mut out_headers = headers.clone();
    out_headers.push(LOYALTY_COLUMN.to_string());
    out_headers.push(PERSONA_COLUMN.to_string());
    writer
        .write_record(&out_headers)
        .map_err(|e| EnrichmentError::Parse(e.to_string()))?;

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| EnrichmentError::Parse(e.to_string()))?;
        let mut fields: Vec<String> = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| {
                if value == MISSING {
                    filler(column, row)
                } else {
                    value.to_string()
                }
            })
            .collect();

        let points = headers
            .iter()
            .position(|h| h == "loyalty_points")
            .and_then(|i| fields.get(i))
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);
        let loyal = points >= 500.0;
        fields.push(if loyal { "Yes" } else { "No" }.to_string());
        fields.push(
            if loyal {
                "Repeat buyer. Values rewards and brand familiarity."
            } else {
                "Occasional shopper. Compares prices before buying."
            }
            .to_string(),
        );

        writer
            .write_record(&fields)
            .map_err(|e| EnrichmentError::Parse(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EnrichmentError::Parse(e.to_string()))?;
    let body = String::from_utf8(bytes).map_err(|e| EnrichmentError::Parse(e.to_string()))?;
    Ok(format!("```csv\n{}```", body))
}

/// A plausible value for a placeholder in `column`.
fn filler(column: &str, row: usize) -> String {
    match column {
        "email" => format!("customer{}@example.com", row),
        "phone" => "0555-0100".to_string(),
        "age" => "35".to_string(),
        "loyalty_points" => "100".to_string(),
        "gender" => "Other".to_string(),
        "marital_status" => "Single".to_string(),
        "country" => "United States".to_string(),
        "city" => "Springfield".to_string(),
        "first_name" => "Alex".to_string(),
        "last_name" => "Morgan".to_string(),
        "full_name" => "Alex Morgan".to_string(),
        _ => "Not provided".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_responses_in_order() {
        let provider = MockProvider::scripted(["one", "two"]);
        assert_eq!(provider.generate("a").unwrap(), "one");
        assert_eq!(provider.generate("b").unwrap(), "two");
        assert!(provider.generate("c").is_err());
        assert_eq!(provider.calls(), 3);
    }

    #[test]
    fn test_failing() {
        let provider = MockProvider::failing("connection refused");
        let err = provider.generate("x").unwrap_err();
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_echo_fills_placeholders() {
        let prompt = prompts::enrichment_prompt(
            "\"email\",\"loyalty_points\"\n\"MISSING\",\"900\"\n\"a@x.com\",\"MISSING\"\n",
        );
        let response = MockProvider::new().generate(&prompt).unwrap();

        assert!(response.starts_with("```csv\n"));
        assert!(response.contains("\"customer0@example.com\",\"900\",\"Yes\""));
        assert!(response.contains("\"a@x.com\",\"100\",\"No\""));
        assert!(!response.contains(MISSING));
    }

    #[test]
    fn test_echo_without_table() {
        let err = MockProvider::new().generate("hello").unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
