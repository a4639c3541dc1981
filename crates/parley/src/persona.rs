//! Persona selection: a closed set of conversational styles, each bound to
//! one prompt template.
//!
//! Selection is pure and total over the enum: [`Persona::template`] is an
//! exhaustive match, so adding a persona without a template is a compile
//! error. Every template contains exactly one `{input}` slot for the latest
//! user message; nothing else is substituted.
//!
//! Unrecognized persona names are a configuration error and fail parsing;
//! there is no silent default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The substitution slot every template carries exactly once.
pub const INPUT_SLOT: &str = "{input}";

/// A named conversational style.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Persona {
    GeneralAssistant,
    Philosophical,
    Witty,
}

/// All personas, in UI dropdown order.
pub const PERSONAS: [Persona; 3] = [
    Persona::GeneralAssistant,
    Persona::Philosophical,
    Persona::Witty,
];

const GENERAL_ASSISTANT_TEMPLATE: &str = "\
You are a general assistant chatbot with the primary goal of assisting the \
user based on their input.

USER INPUT: {input}";

const PHILOSOPHICAL_TEMPLATE: &str = "\
As a philosophical chatbot, your purpose is to engage in deep and insightful \
conversations, exploring a wide variety of philosophical views. Provide \
profound and thought-provoking feedback on the user's input, inviting them to \
ponder the complexities of existence and the fundamental questions of human \
experience, spanning metaphysics, ethics, epistemology, morality, and the \
nature of reality. Respond to the user input with that in mind.

USER INPUT: {input}";

const WITTY_TEMPLATE: &str = "\
As a witty and comedic chatbot, your purpose is to engage in humorous \
conversations. Provide original and funny feedback on the user's input, \
inviting the user to think differently about it in an original and witty way. \
Respond to the user input with that in mind.

USER INPUT: {input}";

impl Persona {
    /// The template string bound to this persona.
    ///
    /// Total over the enum; every arm returns a non-empty template containing
    /// exactly one [`INPUT_SLOT`].
    pub fn template(self) -> &'static str {
        match self {
            Persona::GeneralAssistant => GENERAL_ASSISTANT_TEMPLATE,
            Persona::Philosophical => PHILOSOPHICAL_TEMPLATE,
            Persona::Witty => WITTY_TEMPLATE,
        }
    }

    /// Render the template with the user's input substituted into the slot.
    ///
    /// Exactly one substitution; occurrences of the slot text inside the
    /// user input itself are left alone.
    ///
    /// ```
    /// use parley::persona::Persona;
    ///
    /// let prompt = Persona::Witty.render("tell me a joke");
    /// assert!(prompt.ends_with("USER INPUT: tell me a joke"));
    /// assert!(!prompt.contains("{input}"));
    /// ```
    pub fn render(self, input: &str) -> String {
        self.template().replacen(INPUT_SLOT, input, 1)
    }

    /// The wire/dropdown name of this persona.
    pub fn name(self) -> &'static str {
        match self {
            Persona::GeneralAssistant => "general-assistant",
            Persona::Philosophical => "philosophical",
            Persona::Witty => "witty",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PERSONAS
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown persona: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_template_has_exactly_one_input_slot() {
        for persona in PERSONAS {
            let template = persona.template();
            assert!(!template.is_empty(), "{persona} template is empty");
            assert_eq!(
                template.matches(INPUT_SLOT).count(),
                1,
                "{persona} template must contain exactly one input slot"
            );
        }
    }

    #[test]
    fn render_substitutes_the_slot() {
        let prompt = Persona::GeneralAssistant.render("what is creatine?");
        assert!(prompt.contains("USER INPUT: what is creatine?"));
        assert!(!prompt.contains(INPUT_SLOT));
    }

    #[test]
    fn render_substitutes_only_once() {
        // A slot-shaped string inside the user input must survive verbatim.
        let prompt = Persona::Witty.render("explain {input} to me");
        assert_eq!(prompt.matches(INPUT_SLOT).count(), 1);
        assert!(prompt.contains("USER INPUT: explain {input} to me"));
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for persona in PERSONAS {
            assert_eq!(persona.name().parse::<Persona>().unwrap(), persona);
        }
    }

    #[test]
    fn unknown_persona_fails_fast() {
        let err = "sarcastic".parse::<Persona>().unwrap_err();
        assert!(err.contains("unknown persona"));
    }

    #[test]
    fn serde_uses_kebab_case_names() {
        let json = serde_json::to_string(&Persona::GeneralAssistant).unwrap();
        assert_eq!(json, r#""general-assistant""#);

        let parsed: Persona = serde_json::from_str(r#""witty""#).unwrap();
        assert_eq!(parsed, Persona::Witty);

        assert!(serde_json::from_str::<Persona>(r#""sarcastic""#).is_err());
    }
}
