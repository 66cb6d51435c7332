use regex::Regex;

/// One function-call intent recovered from model output.
///
/// `message` is only populated for the `console` sink, which carries the
/// text to surface to the user. Every other function takes no arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCall {
    pub name: String,
    pub message: Option<String>,
}

impl ParsedCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: None,
        }
    }

    pub fn with_message(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: Some(message.into()),
        }
    }
}

/// One textual convention a model may use to denote a function call.
pub trait CallPattern: Send + Sync {
    fn describe(&self) -> &str;
    fn find_calls(&self, text: &str) -> Vec<ParsedCall>;
}

/// Regex-backed pattern with a capture group for the function name and an
/// optional capture group for the brace-delimited argument blob.
struct RegexCallPattern {
    label: &'static str,
    regex: Regex,
    decoder: ArgumentDecoder,
}

impl RegexCallPattern {
    fn new(label: &'static str, pattern: &str) -> Self {
        Self {
            label,
            regex: Regex::new(pattern).unwrap(),
            decoder: ArgumentDecoder::new(),
        }
    }
}

impl CallPattern for RegexCallPattern {
    fn describe(&self) -> &str {
        self.label
    }

    fn find_calls(&self, text: &str) -> Vec<ParsedCall> {
        self.regex
            .captures_iter(text)
            .map(|caps| {
                let name = caps[1].to_string();
                let message = caps
                    .get(2)
                    .and_then(|blob| self.decoder.decode_message(blob.as_str()));
                ParsedCall { name, message }
            })
            .collect()
    }
}

/// Decodes the single supported argument field (`message`) out of an
/// argument blob. The blob is never evaluated; anything that is not one of
/// the two known message encodings degrades to no argument.
struct ArgumentDecoder {
    escape_form: Regex,
    json_form: Regex,
}

impl ArgumentDecoder {
    fn new() -> Self {
        Self {
            // FunctionGemma wraps free text between <escape> sentinels so it
            // can carry quotes and braces.
            escape_form: Regex::new(r"(?s)message:<escape>(.*?)<escape>").unwrap(),
            json_form: Regex::new(r#""message"\s*:\s*"([^"]*)""#).unwrap(),
        }
    }

    fn decode_message(&self, blob: &str) -> Option<String> {
        if let Some(caps) = self.escape_form.captures(blob) {
            return Some(caps[1].trim().to_string());
        }
        if let Some(caps) = self.json_form.captures(blob) {
            return Some(caps[1].to_string());
        }
        None
    }
}

/// Extracts function-call intents from raw model output.
///
/// Patterns are tried strictly in priority order and the first pattern that
/// matches anywhere in the text wins outright: all of its non-overlapping
/// matches are returned in order of appearance, and looser patterns are not
/// consulted. A model that emits the fully bracketed form must not have its
/// text accidentally re-matched by the bare form.
pub struct IntentExtractor {
    patterns: Vec<Box<dyn CallPattern>>,
}

impl IntentExtractor {
    pub fn new() -> Self {
        let patterns: Vec<Box<dyn CallPattern>> = vec![
            Box::new(RegexCallPattern::new(
                "bracketed",
                r"(?s)<start_function_call>call:(\w+)(\{.*?\})?<end_function_call>",
            )),
            Box::new(RegexCallPattern::new(
                "bare",
                r"(?s)call:(\w+)(\{.*?\})?",
            )),
            Box::new(RegexCallPattern::new(
                "spaced",
                r"(?s)call\s+(\w+)(\{.*?\})?",
            )),
        ];
        Self { patterns }
    }

    /// Returns every call found by the highest-priority matching pattern,
    /// left to right. An empty vec means "no function call intended" and is
    /// a valid outcome, not a failure.
    pub fn extract(&self, model_output: &str) -> Vec<ParsedCall> {
        for pattern in &self.patterns {
            let calls = pattern.find_calls(model_output);
            if !calls.is_empty() {
                tracing::debug!(
                    pattern = pattern.describe(),
                    count = calls.len(),
                    "parsed function calls"
                );
                return calls;
            }
        }
        tracing::debug!("no function calls matched in model output");
        Vec::new()
    }
}

impl Default for IntentExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the fully bracketed call form, the same convention the extractor
/// recognizes at highest priority. Used when synthesizing training examples.
pub fn encode_call(name: &str) -> String {
    format!("<start_function_call>call:{}<end_function_call>", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_single_call() {
        let extractor = IntentExtractor::new();
        let calls =
            extractor.extract("<start_function_call>call:get_memory_info<end_function_call>");
        assert_eq!(calls, vec![ParsedCall::new("get_memory_info")]);
    }

    #[test]
    fn bare_call_with_trailing_text() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract("call:get_cpu_info and that's what I'd check first");
        assert_eq!(calls, vec![ParsedCall::new("get_cpu_info")]);
    }

    #[test]
    fn multiple_bare_calls_preserve_order() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract("call:get_cpu_info call:get_memory_info");
        assert_eq!(
            calls,
            vec![
                ParsedCall::new("get_cpu_info"),
                ParsedCall::new("get_memory_info"),
            ]
        );
    }

    #[test]
    fn spaced_form_matches() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract("I will call get_disk_info now");
        assert_eq!(calls, vec![ParsedCall::new("get_disk_info")]);
    }

    #[test]
    fn no_marker_yields_empty() {
        let extractor = IntentExtractor::new();
        assert!(extractor.extract("The system looks healthy to me.").is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn bracketed_wins_over_bare() {
        // The bare pattern would also match inside the bracketed text; the
        // first matching pattern must win outright.
        let extractor = IntentExtractor::new();
        let calls = extractor.extract(
            "<start_function_call>call:get_uptime_info<end_function_call> call:get_cpu_info",
        );
        assert_eq!(calls, vec![ParsedCall::new("get_uptime_info")]);
    }

    #[test]
    fn escape_delimited_message_is_decoded_and_trimmed() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract("call:console{message:<escape> All good <escape>}");
        assert_eq!(calls, vec![ParsedCall::with_message("console", "All good")]);
    }

    #[test]
    fn json_message_is_decoded() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract(r#"call:console{"message": "Memory is at 42%"}"#);
        assert_eq!(
            calls,
            vec![ParsedCall::with_message("console", "Memory is at 42%")]
        );
    }

    #[test]
    fn unrecognized_argument_blob_degrades_to_no_argument() {
        let extractor = IntentExtractor::new();
        let calls = extractor.extract("call:console{__import__('os').system('rm -rf')}");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "console");
        assert_eq!(calls[0].message, None);
    }

    #[test]
    fn encode_then_extract_round_trips_the_name() {
        let extractor = IntentExtractor::new();
        let encoded = encode_call("get_network_info");
        let calls = extractor.extract(&encoded);
        assert_eq!(calls, vec![ParsedCall::new("get_network_info")]);
    }

    #[test]
    fn extraction_is_idempotent() {
        let extractor = IntentExtractor::new();
        let text = "call:get_cpu_info call:console{message:<escape>done<escape>}";
        let first = extractor.extract(text);
        let second = extractor.extract(text);
        assert_eq!(first, second);
    }
}
