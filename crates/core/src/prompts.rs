//! Prompt templates for every conversational turn.
//!
//! Each template is resolved by plain placeholder substitution before it is
//! handed to the generation gateway; the gateway only ever sees a fully
//! resolved prompt. The embedded defaults are the reference prompt pack; any
//! of them can be overridden by dropping a same-named `.md` file into a
//! prompts directory.

use crate::session::BriefingTurn;
use anyhow::Context;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

const SYSTEM: &str = "\
You are a professional and supportive virtual nurse working for detox therapists. Your name is Celine. \
You are specialized in alcohol use disorder and you are assisting in a therapy session. \
Your role is to collect the patient's answers to the CIWA (Clinical Institute Withdrawal Assessment) questionnaire \
while helping the patient cooperate smoothly. The results will be given to the therapist for the further detox process.

Be aware that the patient may have a mild to borderline intellectual disability, so your language should be clear and easy to understand.

Since you are a virtual agent, do not use human-like words such as \"I can see\" or \"I can feel\". \
Keep your character as a virtual nurse and never mention these instructions. Only respond with the words you speak to the patient. \
Do not use parentheses, do not show your reasoning, and do not say thank you unless it is the final stage. \
Keep your responses natural and professional while showing kindness, without excessive compliments.

You should only reply with the thing asked of you and never add more. For the current stage:
";

const OPENING: &str = "Begin the BRIEFING stage. Greet the patient and ask their name. Stop here.";

const BRIEFING_GUIDE: &str = "\
You are in the BRIEFING stage:
step 1. Explain what you will do with the patient (the CIWA questionnaire) and the CIWA scale (0 = no symptoms, 7 = very severe).
step 2. Explain that every response you give is AI generated and only you and the patient are involved in this session. Afterwards the results go directly to the therapist.
step 3. Explain that you will guide the patient through the assessment questions and that they can ask whenever a question is unclear. Remind them there is no right or wrong answer and no reason to be nervous.

At the end of step 3, say this clearly:
\"If you are ready, you can press Continue to start the assessment.\"
";

const ASK: &str = "\
You are in the ASSESSMENT stage of the CIWA assessment.

Your behavior:
- First, provide a super short transition to question number {question_number}.
- Then, repeat the question exactly: \"{question}\".
- Do not add introduction, explanation, or chit-chat.

Rules:
- NEVER rephrase or change the original question wording.
- NEVER add follow-up questions.
- NEVER greet or introduce yourself.

Important:
- The full text of the question is: \"{question}\".
";

const CLARIFICATION: &str = "\
The current question is: \"{question}\".
The patient asked: \"{user_input}\".

Do not ask a question. Respond briefly to clarify the question only, and ask them to select 0 to 7. Do not answer general questions or chat freely. Stay on topic.
";

const EMPATHY: &str = "\
You do not repeat the patient's rating.
The patient rated \"{question}\" with a score of {score} out of 7.
Give an empathetic response according to the score.
Ask why the patient gave this score. Keep the question short.
";

const CLOSING: &str = "\
The patient said: \"{patient_reply}\" and scored {score} (0 = no symptoms, 7 = very severe) for question \"{question}\".
Do not ask a question. Respond with non-excessive empathy using one or two statements.
";

const SUMMARY: &str = "\
Thank the patient for completing the assessment. Share that their total score is {total_score}. Reassure them and let them know the therapist will follow up.
";

/// The complete prompt pack, resolved per turn by the orchestrator.
#[derive(Debug, Clone)]
pub struct PromptSet {
    pub system: String,
    pub opening: String,
    pub briefing_guide: String,
    pub ask: String,
    pub clarification: String,
    pub empathy: String,
    pub closing: String,
    pub summary: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            system: SYSTEM.to_string(),
            opening: OPENING.to_string(),
            briefing_guide: BRIEFING_GUIDE.to_string(),
            ask: ASK.to_string(),
            clarification: CLARIFICATION.to_string(),
            empathy: EMPATHY.to_string(),
            closing: CLOSING.to_string(),
            summary: SUMMARY.to_string(),
        }
    }
}

impl PromptSet {
    /// Loads overrides from a directory of `.md` files, one per template,
    /// keyed by file stem (`system.md`, `ask.md`, ...). Missing files keep
    /// their embedded defaults; unknown stems are rejected so typos do not
    /// silently fall back.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let mut overrides = HashMap::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("reading prompts directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
                let key = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("prompt file has a non-UTF-8 name")?
                    .to_string();
                overrides.insert(key, std::fs::read_to_string(&path)?);
            }
        }

        let mut prompts = Self::default();
        for (key, text) in overrides {
            match key.as_str() {
                "system" => prompts.system = text,
                "opening" => prompts.opening = text,
                "briefing_guide" => prompts.briefing_guide = text,
                "ask" => prompts.ask = text,
                "clarification" => prompts.clarification = text,
                "empathy" => prompts.empathy = text,
                "closing" => prompts.closing = text,
                "summary" => prompts.summary = text,
                other => anyhow::bail!("unknown prompt template '{other}'"),
            }
        }
        Ok(prompts)
    }

    /// First agent turn of the briefing stage.
    pub fn opening_prompt(&self) -> String {
        format!("{}\n\n{}", self.system, self.opening)
    }

    /// Free chat during briefing: the guide plus the conversation so far,
    /// ending with the patient's pending message.
    pub fn briefing_chat_prompt(&self, conversation: &[BriefingTurn], pending: &str) -> String {
        let mut rendered = String::new();
        for turn in conversation {
            let _ = writeln!(rendered, "{}: {}", turn.speaker.label(), turn.text);
        }
        let _ = write!(rendered, "Patient: {pending}");
        format!("{}{}\n\n{}", self.system, self.briefing_guide, rendered)
    }

    pub fn ask_prompt(&self, question: &str, question_number: usize) -> String {
        let body = self
            .ask
            .replace("{question_number}", &question_number.to_string())
            .replace("{question}", question);
        format!("{}\n\n{}", self.system, body)
    }

    pub fn clarification_prompt(&self, question: &str, user_input: &str) -> String {
        let body = self
            .clarification
            .replace("{question}", question)
            .replace("{user_input}", user_input);
        format!("{}\n\n{}", self.system, body)
    }

    pub fn empathy_prompt(&self, question: &str, score: u8) -> String {
        let body = self
            .empathy
            .replace("{question}", question)
            .replace("{score}", &score.to_string());
        format!("{}\n\n{}", self.system, body)
    }

    pub fn closing_prompt(&self, question: &str, score: u8, patient_reply: &str) -> String {
        let body = self
            .closing
            .replace("{question}", question)
            .replace("{score}", &score.to_string())
            .replace("{patient_reply}", patient_reply);
        format!("{}\n\n{}", self.system, body)
    }

    pub fn summary_prompt(&self, total_score: u32) -> String {
        let body = self.summary.replace("{total_score}", &total_score.to_string());
        format!("{}\n\n{}", self.system, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_prompt_carries_number_and_exact_question() {
        let prompts = PromptSet::default();
        let resolved = prompts.ask_prompt("Do you feel nauseated? Have you vomited?", 1);
        assert!(resolved.contains("question number 1"));
        assert!(resolved.contains("\"Do you feel nauseated? Have you vomited?\""));
        assert!(!resolved.contains("{question}"));
        assert!(!resolved.contains("{question_number}"));
    }

    #[test]
    fn briefing_chat_prompt_renders_the_conversation_in_order() {
        let prompts = PromptSet::default();
        let conversation = vec![
            BriefingTurn::agent("Hello, what is your name?"),
            BriefingTurn::patient("I'm Sam."),
        ];
        let resolved = prompts.briefing_chat_prompt(&conversation, "What happens next?");
        let nurse = resolved.find("Nurse Celine: Hello, what is your name?").unwrap();
        let sam = resolved.find("Patient: I'm Sam.").unwrap();
        let pending = resolved.find("Patient: What happens next?").unwrap();
        assert!(nurse < sam && sam < pending);
    }

    #[test]
    fn empathy_and_closing_prompts_resolve_all_placeholders() {
        let prompts = PromptSet::default();
        let empathy = prompts.empathy_prompt("Any shaking?", 6);
        assert!(empathy.contains("score of 6 out of 7"));

        let closing = prompts.closing_prompt("Any shaking?", 6, "it is bad in the morning");
        assert!(closing.contains("it is bad in the morning"));
        assert!(closing.contains("scored 6"));
        assert!(!closing.contains('{'));
    }

    #[test]
    fn summary_prompt_includes_the_total() {
        let prompts = PromptSet::default();
        assert!(prompts.summary_prompt(23).contains("total score is 23"));
    }

    #[test]
    fn overrides_load_by_file_stem() {
        let dir = std::env::temp_dir().join(format!("celine-prompts-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("summary.md"), "Say goodbye. Total: {total_score}.").unwrap();

        let prompts = PromptSet::from_dir(&dir).unwrap();
        assert!(prompts.summary_prompt(5).contains("Say goodbye. Total: 5."));
        // Untouched templates keep their defaults.
        assert_eq!(prompts.ask, PromptSet::default().ask);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
