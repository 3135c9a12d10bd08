//! System prompt and week context sent upstream by the relay.

use crate::types::ChatMessage;
use serde::Serialize;
use stride_core::types::{Category, Week};

pub const SYSTEM_PROMPT: &str = "\
You are the planning assistant of a weekly study tracker. The user follows a \
multi-year plan that combines Japanese study, AI/ML work, college coursework \
and personal goals on the way to graduate school in Japan.

You can:
1. Add a task to the current week: ADD_TASK|category|task text|schedule|priority
2. Remove a task from the current week: REMOVE_TASK|part of the task id or text
3. Suggest priority changes
4. Give study advice and encouragement

Categories: japanese, aiml, college, goals
Priority levels: critical (exams, deadlines), high (daily habits), medium \
(regular practice), low (optional)

Put each ADD_TASK or REMOVE_TASK command on its own line, then reply to the \
user in plain text.

Example:
User: Add kanji practice
Reply:
ADD_TASK|japanese|Kanji practice with WaniKani (20 min)|Daily|high
Added kanji practice to this week's Japanese tasks.

Example:
User: Drop Duolingo
Reply:
REMOVE_TASK|duolingo
Removed Duolingo from this week.

Keep the plan sustainable and avoid overloading the week.";

/// Context block describing `week`, appended to the system prompt.
pub fn week_context(week: &Week) -> String {
    let mut out = String::from("\n\nCurrent week context:\n");
    out.push_str(&format!(
        "- Week {}: {} - {}\n",
        week.week_number, week.start_date, week.end_date
    ));
    out.push_str(&format!("- Phase: {}\n", week.phase));
    out.push_str(&format!("- Focus: {}\n", week.focus));
    for &category in Category::all() {
        let texts: Vec<&str> = week.tasks(category).iter().map(|t| t.text.as_str()).collect();
        out.push_str(&format!("- {}: {}\n", category.label(), texts.join(", ")));
    }
    out
}

/// Body of an OpenAI-compatible streaming chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
}

/// Prepend the system prompt (with week context when known) to the
/// conversation.
pub fn gateway_request(
    model: &str,
    conversation: Vec<ChatMessage>,
    week: Option<&Week>,
) -> GatewayRequest {
    let mut system = SYSTEM_PROMPT.to_string();
    if let Some(week) = week {
        system.push_str(&week_context(week));
    }
    let mut messages = Vec::with_capacity(conversation.len() + 1);
    messages.push(ChatMessage::system(system));
    messages.extend(conversation);
    GatewayRequest {
        model: model.to_string(),
        messages,
        stream: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::curriculum::{BuiltinCurriculum, CurriculumSource};

    #[test]
    fn context_lists_tasks_per_category() {
        let curriculum = BuiltinCurriculum::default();
        let week = curriculum.week(1).unwrap();
        let ctx = week_context(week);
        assert!(ctx.contains("- Week 1: 1 December - 7 December"));
        assert!(ctx.contains("- Phase: Foundations"));
        assert!(ctx.contains("Japanese Learning: Anki review (15 min/day), "));
    }

    #[test]
    fn system_message_comes_first() {
        let req = gateway_request("m", vec![ChatMessage::user("hi")], None);
        assert!(req.stream);
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, crate::types::Role::System);
        assert!(!req.messages[0].content.contains("Current week context"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
