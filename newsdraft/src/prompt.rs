//! Style resolution and prompt assembly.
//!
//! The prompt comes in two mutually exclusive shapes: one grounded in the
//! extracted article corpus, and a fallback used when no article text survived
//! extraction. Which one is built depends only on whether the corpus is empty.

use std::fmt;

/// Tone applied to the generated post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    EasyToRead,
    ExcitingRead,
    TechnicalRead,
    MarketingPurpose,
    Upskilling,
}

impl Style {
    pub const ALL: [Style; 5] = [
        Style::EasyToRead,
        Style::ExcitingRead,
        Style::TechnicalRead,
        Style::MarketingPurpose,
        Style::Upskilling,
    ];

    /// Map a form style code ("1".."5") to a style.
    /// Anything else, including no code at all, means [`Style::EasyToRead`].
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("1") => Style::EasyToRead,
            Some("2") => Style::ExcitingRead,
            Some("3") => Style::TechnicalRead,
            Some("4") => Style::MarketingPurpose,
            Some("5") => Style::Upskilling,
            _ => Style::EasyToRead,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Style::EasyToRead => "1",
            Style::ExcitingRead => "2",
            Style::TechnicalRead => "3",
            Style::MarketingPurpose => "4",
            Style::Upskilling => "5",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Style::EasyToRead => "easy to read",
            Style::ExcitingRead => "exciting read",
            Style::TechnicalRead => "technical read",
            Style::MarketingPurpose => "marketing purpose",
            Style::Upskilling => "upskilling",
        }
    }

    /// Writing guidance given to the generator for this style.
    pub fn guidance(self) -> &'static str {
        match self {
            Style::EasyToRead => "Ensure the post can be read in about 10 minutes.",
            Style::ExcitingRead => "Highlight the opportunities and potential the articles present.",
            Style::TechnicalRead => {
                "Use precise technical language and include mathematical descriptions where applicable."
            }
            Style::MarketingPurpose => {
                "Write in a persuasive tone that positions the author as the first point of contact."
            }
            Style::Upskilling => "Adopt an educational tone that informs and teaches.",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which template a prompt was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Sourced,
    Fallback,
}

/// A built prompt, ready for the generation client.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub text: String,
}

/// Join article texts in order, separated by a blank line.
pub fn build_corpus<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Build the generation prompt. An empty `texts` selects the fallback template.
pub fn build_prompt<S: AsRef<str>>(texts: &[S], topic: &str, audience: &str, style: Style) -> Prompt {
    if texts.is_empty() {
        return Prompt {
            kind: PromptKind::Fallback,
            text: fallback_prompt(topic, audience, style),
        };
    }

    let corpus = build_corpus(texts);
    let guidelines: String = Style::ALL
        .iter()
        .map(|s| format!("- For \"{}\": {}\n", s.label(), s.guidance()))
        .collect();

    let text = format!(
        r#"
You are an expert content creator. Based on the following aggregated article texts:

{corpus}

Generate an HTML formatted post on the topic "{topic}" tailored for the audience "{audience}" in a style that is "{label}". Follow these guidelines:
{guidelines}
Please produce the final post as HTML formatted text.
"#,
        label = style.label(),
    );

    Prompt {
        kind: PromptKind::Sourced,
        text,
    }
}

fn fallback_prompt(topic: &str, audience: &str, style: Style) -> String {
    format!(
        r#"
You are an expert content creator. Using your expertise, generate an HTML formatted post on the topic "{topic}" tailored for the audience "{audience}" in a style that is "{label}". Please include background, insights, and recommendations based solely on the topic.
"#,
        label = style.label(),
    )
}
