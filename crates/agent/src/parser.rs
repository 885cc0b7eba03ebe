//! Parses backend output in the ReAct text format.
//!
//! A well-formed reply carries exactly one of:
//! - `Action: <name>` followed by `Action Input: <text>`
//! - `Final Answer: <text>`
//!
//! Anything else, including a reply with both, is [`ParsedOutput::Malformed`].

use regex_lite::Regex;
use std::sync::OnceLock;

const FINAL_ANSWER: &str = "Final Answer:";

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedOutput {
    Final { thought: String, answer: String },
    Act { thought: String, action: String, input: String },
    Malformed { thought: String, reason: String },
}

fn action_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[ \t]*(.*?)\s*Action\s*\d*\s*Input\s*\d*\s*:[ \t]*(.*)").ok()
    })
    .as_ref()
}

fn bare_action_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*Action\s*\d*\s*:").ok())
        .as_ref()
}

pub fn parse(text: &str) -> ParsedOutput {
    let action = action_re().and_then(|re| re.captures(text));
    let final_at = text.find(FINAL_ANSWER);

    match (action, final_at) {
        (Some(_), Some(_)) => ParsedOutput::Malformed {
            thought: thought_before(text, first_marker(text)),
            reason: "reply contains both an Action and a Final Answer".into(),
        },
        (Some(caps), None) => {
            let whole = caps.get(0).map_or(0, |m| m.start());
            let action = clean(caps.get(1).map_or("", |m| m.as_str()));
            let input = clean(truncate_observation(caps.get(2).map_or("", |m| m.as_str())));
            let thought = thought_before(text, Some(whole));
            if action.is_empty() {
                return ParsedOutput::Malformed {
                    thought,
                    reason: "Action is empty".into(),
                };
            }
            ParsedOutput::Act {
                thought,
                action,
                input,
            }
        }
        (None, Some(at)) => ParsedOutput::Final {
            thought: thought_before(text, Some(at)),
            answer: text[at + FINAL_ANSWER.len()..].trim().to_string(),
        },
        (None, None) => {
            let reason = if bare_action_re().is_some_and(|re| re.is_match(text)) {
                "missing 'Action Input:' after 'Action:'"
            } else {
                "missing 'Action:' after 'Thought:'"
            };
            ParsedOutput::Malformed {
                thought: thought_before(text, None),
                reason: reason.into(),
            }
        }
    }
}

fn first_marker(text: &str) -> Option<usize> {
    let action = bare_action_re().and_then(|re| re.find(text)).map(|m| m.start());
    let fin = text.find(FINAL_ANSWER);
    match (action, fin) {
        (Some(a), Some(f)) => Some(a.min(f)),
        (a, f) => a.or(f),
    }
}

/// The text before `end`, without a leading `Thought:` label.
fn thought_before(text: &str, end: Option<usize>) -> String {
    let head = &text[..end.unwrap_or(text.len())];
    let head = head.trim();
    head.strip_prefix("Thought:").unwrap_or(head).trim().to_string()
}

/// Drop anything the backend hallucinated after the input.
fn truncate_observation(input: &str) -> &str {
    input.split("\nObservation:").next().unwrap_or(input)
}

fn clean(s: &str) -> String {
    s.trim().trim_matches(|c| c == '"' || c == '`' || c == '\'').trim().to_string()
}
