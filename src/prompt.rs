use crate::error::Result;
use crate::models::Mode;

const GENERAL_TEMPLATE: &str = "Answer based on context: {context}\n\nQuestion: {input}\n\nAnswer:";

const TEACHER_TEMPLATE: &str = "You are a helpful University Professor. Use the following notes to explain the concept.
Use analogies, keep it encouraging, and end with a 'knowledge check' question.

Context: {context}
Student Question: {input}

Answer:";

const EXAM_PREP_TEMPLATE: &str = "You are an Exam Coach. Based on the notes, identify the most important definitions
and potential exam questions related to this topic.

Context: {context}
Student Question: {input}

Answer:";

/// Template for a mode, with `{context}` and `{input}` placeholders
pub fn template(mode: Mode) -> &'static str {
    match mode {
        Mode::General => GENERAL_TEMPLATE,
        Mode::Teacher => TEACHER_TEMPLATE,
        Mode::ExamPrep => EXAM_PREP_TEMPLATE,
    }
}

/// Build the completion prompt for `query` grounded on `context`
pub fn build(mode: Mode, context: &str, query: &str) -> String {
    render(template(mode), context, query)
}

/// Build a prompt from a mode name, rejecting unknown modes with `Error::UnknownMode`
pub fn build_from_str(mode: &str, context: &str, query: &str) -> Result<String> {
    Ok(build(mode.parse()?, context, query))
}

/// Single-pass placeholder substitution; substituted values are never rescanned.
fn render(template: &str, context: &str, input: &str) -> String {
    let mut out = String::with_capacity(template.len() + context.len() + input.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{context}") {
            out.push_str(context);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{input}") {
            out.push_str(input);
            rest = after;
        } else {
            out.push('{');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_prompt_layout() {
        let prompt = build(Mode::General, "Cells have walls.", "Do cells have walls?");
        assert_eq!(
            prompt,
            "Answer based on context: Cells have walls.\n\nQuestion: Do cells have walls?\n\nAnswer:"
        );
    }

    #[test]
    fn test_teacher_prompt_asks_for_knowledge_check() {
        let prompt = build(Mode::Teacher, "ctx", "q");
        assert!(prompt.contains("knowledge check"));
        assert!(prompt.contains("analogies"));
        assert!(prompt.contains("Context: ctx"));
        assert!(prompt.contains("Student Question: q"));
    }

    #[test]
    fn test_exam_prep_prompt_asks_for_exam_questions() {
        let prompt = build(Mode::ExamPrep, "ctx", "q");
        assert!(prompt.contains("exam questions"));
        assert!(prompt.contains("definitions"));
    }

    #[test]
    fn test_placeholders_in_values_are_not_expanded() {
        let prompt = build(Mode::General, "literal {input} in notes", "what is {context}?");
        assert!(prompt.contains("literal {input} in notes"));
        assert!(prompt.contains("Question: what is {context}?"));
    }

    #[test]
    fn test_every_template_has_both_placeholders() {
        for mode in Mode::ALL {
            let t = template(mode);
            assert!(t.contains("{context}"), "{mode} template lacks context");
            assert!(t.contains("{input}"), "{mode} template lacks input");
        }
    }

    #[test]
    fn test_unknown_mode_name_rejected() {
        let err = build_from_str("BogusMode", "ctx", "q").unwrap_err();
        assert!(matches!(err, crate::error::Error::UnknownMode(_)));
        assert!(build_from_str("Exam Prep", "ctx", "q").unwrap().contains("Exam Coach"));
    }

    #[test]
    fn test_stray_braces_survive() {
        assert_eq!(render("a {b} {input}", "c", "d"), "a {b} d");
    }
}
