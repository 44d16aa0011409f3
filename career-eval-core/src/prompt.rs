use serde_json::Value;

use crate::provider::ChatMessage;

/// Instruction that pins the model to the `Score:` / `Explanation:` grammar.
pub const SYSTEM_PROMPT: &str = "You are a career risk assessment AI. Analyze the candidate's profile and provide:
1. A risk score (0-100, higher means MORE RISK)
2. A brief, robotic explanation of the risk factors considering the current job market and technology trends.

Format your response EXACTLY as:
Score: [number]
Explanation: [1 robotic sentences about user role and industry. 2 robotic sentences about risk factors considering the current job market and technology trends]";

const USER_PROMPT_PREFIX: &str = "Career profile to analyze:\n";

/// The questionnaire answers, forwarded to the model without interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile(Value);

impl Profile {
    /// `None` for an absent payload or a blank one: `null`, `false`, `""`
    /// or numeric zero.
    pub fn from_answers(answers: Option<Value>) -> Option<Self> {
        answers.filter(|value| !is_blank(value)).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        _ => false,
    }
}

pub fn user_prompt(profile: &Profile) -> String {
    // Serializing a `Value` cannot fail.
    let body = serde_json::to_string_pretty(profile.as_value()).unwrap_or_default();
    format!("{USER_PROMPT_PREFIX}{body}")
}

pub fn build_messages(profile: &Profile) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(user_prompt(profile)),
    ]
}
