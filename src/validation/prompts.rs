use crate::{services::llm::Message, tasks::TaskKind, templates::Template};

const RATING_INSTRUCTION: &str = "End your report with a line of the form 'Rating: <1-5>'.";

fn validation_system_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Summarize => "You are an AI assistant that validates summaries of medical texts.",
        TaskKind::WriteArticle => "You are an AI assistant that validates research articles.",
        TaskKind::Sanitize => {
            "You are an AI that checks if medical data is correctly sanitized (all PHI removed or masked)."
        }
    }
}

fn validation_template(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Summarize => {
            "Given the original text and its summary, assess whether the summary accurately and \
concisely captures the key points.\n\
Provide a brief analysis and rate the summary on a scale of 1 to 5, where 5 indicates excellent quality.\n\
{{rating_instruction}}\n\n\
Original Text:\n{{original}}\n\n\
Summary:\n{{output}}\n\n\
Validation Report:"
        }
        TaskKind::WriteArticle => {
            "Given the topic and the article, assess whether the article comprehensively covers the \
topic, follows a logical structure, and maintains academic standards.\n\
Provide a brief analysis and rate the article on a scale of 1 to 5, where 5 indicates excellent quality.\n\
{{rating_instruction}}\n\n\
Topic: {{original}}\n\n\
Article:\n{{output}}\n\n\
Validation:"
        }
        TaskKind::Sanitize => {
            "Evaluate the following:\n\n\
Original:\n{{original}}\n\n\
Sanitized:\n{{output}}\n\n\
Make sure the sanitized version replaces PHI using tags like [PATIENT_NAME], [DATE], [LOCATION], etc.\n\
Report if any PHI remains and rate the sanitization from 1 to 5 (5 = perfect masking).\n\
{{rating_instruction}}\n\n\
Validation Report:"
        }
    }
}

/// System and user messages asking the model to grade `output` against `original`.
pub fn validation_messages(kind: TaskKind, original: &str, output: &str) -> Vec<Message> {
    let user = Template::simple(validation_template(kind)).render([
        ("original", original),
        ("output", output),
        ("rating_instruction", RATING_INSTRUCTION),
    ]);
    vec![
        Message::system(validation_system_prompt(kind)),
        Message::user(user),
    ]
}

fn improvement_system_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Summarize => "You are a medical summarization improver.",
        TaskKind::WriteArticle => "You are a research article improver.",
        TaskKind::Sanitize => "You are a medical data sanitizer improver.",
    }
}

fn improvement_template(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Summarize => {
            "Improve the following medical summary based on the original text. \
Make it more concise, clear, and medically accurate.\n\n\
Original Text:\n{{original}}\n\nSummary:\n{{output}}"
        }
        TaskKind::WriteArticle => {
            "Improve the following research article based on the original. \
Ensure it's more concise, accurate, and medically appropriate.\n\n\
Original Article:\n{{original}}\n\nRefined Article:\n{{output}}"
        }
        TaskKind::Sanitize => {
            "Improve the following sanitized medical data based on the original. \
Ensure all PHI is masked and the data is more accurate.\n\n\
Original Data:\n{{original}}\n\nSanitized Data:\n{{output}}"
        }
    }
}

/// Messages asking the model for a better version of a poorly rated output.
pub fn improvement_messages(kind: TaskKind, original: &str, output: &str) -> Vec<Message> {
    let user = Template::simple(improvement_template(kind))
        .render([("original", original), ("output", output)]);
    vec![
        Message::system(improvement_system_prompt(kind)),
        Message::user(user),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::Role;

    #[test]
    fn summary_validation_prompt_layout() {
        let msgs = validation_messages(TaskKind::Summarize, "Long text.", "Short.");
        assert_eq!(msgs[0].role, Role::System);
        assert!(msgs[1].content.starts_with("Given the original text and its summary"));
        assert!(msgs[1]
            .content
            .ends_with("Original Text:\nLong text.\n\nSummary:\nShort.\n\nValidation Report:"));
        assert!(msgs[1].content.contains("'Rating: <1-5>'"));
    }

    #[test]
    fn article_validation_ends_with_validation_trailer() {
        let msgs = validation_messages(TaskKind::WriteArticle, "Sepsis", "Body");
        assert!(msgs[1].content.ends_with("Topic: Sepsis\n\nArticle:\nBody\n\nValidation:"));
    }

    #[test]
    fn sanitize_validation_mentions_tags() {
        let msgs = validation_messages(TaskKind::Sanitize, "John", "[PATIENT_NAME]");
        assert!(msgs[0].content.contains("correctly sanitized"));
        assert!(msgs[1].content.starts_with("Evaluate the following:\n\nOriginal:\nJohn\n\nSanitized:\n[PATIENT_NAME]\n\n"));
    }

    #[test]
    fn improvement_prompts_are_task_specific() {
        for kind in TaskKind::ALL {
            let msgs = improvement_messages(kind, "orig", "out");
            assert!(msgs[0].content.ends_with("improver."));
            assert!(msgs[1].content.contains("orig"));
            assert!(msgs[1].content.ends_with("out"));
        }
    }
}
