//! The step vocabulary: a fixed table of phrase patterns and what each one does.
//!
//! Quoted arguments are captured verbatim, so `I fill in "Name" with ""` fills
//! with an empty value rather than failing.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// A phrase matched against the table, with its arguments extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepCall {
    /// Open the launch URL.
    VisitHomepage,
    /// Open the launch URL with `path` appended.
    Visit(String),
    Forward,
    Back,
    Reload,
    Press(String),
    Follow(String),
    Fill { field: String, value: String },
    /// Fill `field` with the step's doc string, or with nothing.
    FillBlock(String),
    /// Fill every `| field | value |` row of the step's table.
    FillTable,
    Select { option: String, field: String },
    Check(String),
    Uncheck(String),
    AssertText {
        expected: String,
        negate: bool,
        element: Option<String>,
    },
    AssertHomepage,
    AssertPath(String),
}

/// Which row of the table matched; turned into a [`StepCall`] by [`build`].
#[derive(Debug, Clone, Copy)]
enum Phrase {
    Homepage,
    Visit,
    ElementText,
    PageText,
    ResponseText,
    Forward,
    Back,
    Press,
    Follow,
    Reload,
    FillWith,
    FillBlock,
    FillFor,
    FillTable,
    Select,
    Check,
    Uncheck,
    OnHomepage,
    OnPath,
}

const PHRASES: &[(&str, Phrase)] = &[
    (r#"^I am on( the)* homepage$"#, Phrase::Homepage),
    (r#"^I go to( the)* homepage$"#, Phrase::Homepage),
    (r#"^I am on "([^"]*)?"$"#, Phrase::Visit),
    (r#"^I go to "([^"]*)?"$"#, Phrase::Visit),
    (
        r#"^I should( not)* see "([^"]*)?" in the "([^"]*)?" element$"#,
        Phrase::ElementText,
    ),
    (r#"^I should( not)* see "([^"]*)?"$"#, Phrase::PageText),
    (
        r#"^the response should( not)* contain "([^"]*)?"$"#,
        Phrase::ResponseText,
    ),
    (r#"^I move forward one page$"#, Phrase::Forward),
    (r#"^I move backward one page$"#, Phrase::Back),
    (r#"^I press "([^"]*)?"$"#, Phrase::Press),
    (r#"^I follow "([^"]*)?"$"#, Phrase::Follow),
    (r#"^I reload( the)* page$"#, Phrase::Reload),
    (r#"^I fill in "([^"]*)?" with "([^"]*)?"$"#, Phrase::FillWith),
    (r#"^I fill in "([^"]*)?" with:$"#, Phrase::FillBlock),
    (r#"^I fill in "([^"]*)?" for "([^"]*)?"$"#, Phrase::FillFor),
    (r#"^I fill in the following:$"#, Phrase::FillTable),
    (r#"^I select "([^"]*)?" from "([^"]*)?"$"#, Phrase::Select),
    (r#"^I check "([^"]*)?"$"#, Phrase::Check),
    (r#"^I uncheck "([^"]*)?"$"#, Phrase::Uncheck),
    (r#"^I should be on( the)* homepage$"#, Phrase::OnHomepage),
    (r#"^I should be on "([^"]*)?"$"#, Phrase::OnPath),
];

lazy_static! {
    static ref STEP_TABLE: Vec<(Regex, Phrase)> = PHRASES
        .iter()
        .map(|(pattern, phrase)| (Regex::new(pattern).unwrap(), *phrase))
        .collect();
}

fn arg(caps: &Captures, i: usize) -> String {
    caps.get(i).map(|m| m.as_str().to_string()).unwrap_or_default()
}

fn negated(caps: &Captures, i: usize) -> bool {
    caps.get(i).is_some()
}

fn build(phrase: Phrase, c: &Captures) -> StepCall {
    match phrase {
        Phrase::Homepage => StepCall::VisitHomepage,
        Phrase::Visit => StepCall::Visit(arg(c, 1)),
        Phrase::ElementText => StepCall::AssertText {
            expected: arg(c, 2),
            negate: negated(c, 1),
            element: Some(arg(c, 3)),
        },
        Phrase::PageText | Phrase::ResponseText => StepCall::AssertText {
            expected: arg(c, 2),
            negate: negated(c, 1),
            element: None,
        },
        Phrase::Forward => StepCall::Forward,
        Phrase::Back => StepCall::Back,
        Phrase::Press => StepCall::Press(arg(c, 1)),
        Phrase::Follow => StepCall::Follow(arg(c, 1)),
        Phrase::Reload => StepCall::Reload,
        Phrase::FillWith => StepCall::Fill {
            field: arg(c, 1),
            value: arg(c, 2),
        },
        Phrase::FillBlock => StepCall::FillBlock(arg(c, 1)),
        Phrase::FillFor => StepCall::Fill {
            field: arg(c, 2),
            value: arg(c, 1),
        },
        Phrase::FillTable => StepCall::FillTable,
        Phrase::Select => StepCall::Select {
            option: arg(c, 1),
            field: arg(c, 2),
        },
        Phrase::Check => StepCall::Check(arg(c, 1)),
        Phrase::Uncheck => StepCall::Uncheck(arg(c, 1)),
        Phrase::OnHomepage => StepCall::AssertHomepage,
        Phrase::OnPath => StepCall::AssertPath(arg(c, 1)),
    }
}

/// Match a step phrase (without its Given/When/Then keyword) against the table.
pub fn match_step(text: &str) -> Option<StepCall> {
    let text = text.trim();
    STEP_TABLE
        .iter()
        .find_map(|(regex, phrase)| regex.captures(text).map(|caps| build(*phrase, &caps)))
}

/// Every pattern in the table, for listing in the REPL.
pub fn patterns() -> impl Iterator<Item = &'static str> {
    STEP_TABLE.iter().map(|(regex, _)| regex.as_str())
}
