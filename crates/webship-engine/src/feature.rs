//! Line-oriented reader for `.feature` files.
//!
//! Understands `Feature:`, `Background:` and `Scenario:` headings, keyword-prefixed
//! steps, `|`-delimited tables and `"""` doc strings. Tag lines are skipped.
//! Anything else is a parse error with its line.

use std::path::Path;
use thiserror::Error;

const STEP_KEYWORDS: [&str; 6] = ["Given", "When", "Then", "And", "But", "*"];

const DOC_STRING_DELIMITERS: [&str; 2] = ["\"\"\"", "```"];

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub keyword: String,
    /// Phrase without its keyword.
    pub text: String,
    pub table: Option<Vec<Vec<String>>>,
    pub doc_string: Option<String>,
    /// 1-based line in the source file.
    pub line: usize,
}

impl Step {
    pub fn new(keyword: &str, text: &str, line: usize) -> Self {
        Self {
            keyword: keyword.to_string(),
            text: text.to_string(),
            table: None,
            doc_string: None,
            line,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.keyword, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feature {
    pub name: Option<String>,
    pub scenarios: Vec<Scenario>,
}

#[derive(Clone, Copy)]
enum Section {
    Preamble,
    Background,
    Scenario,
}

impl Feature {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, FeatureError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    pub fn parse(source: &str) -> Result<Self, FeatureError> {
        let mut feature = Feature::default();
        let mut background: Vec<Step> = Vec::new();
        let mut section = Section::Preamble;

        let mut lines = source.lines().enumerate();
        while let Some((i, raw)) = lines.next() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('@') {
                continue;
            }

            if let Some(name) = heading(trimmed, "Feature") {
                feature.name = Some(name.to_string());
                continue;
            }
            if heading(trimmed, "Background").is_some() {
                section = Section::Background;
                continue;
            }
            if let Some(name) = heading(trimmed, "Scenario") {
                feature.scenarios.push(Scenario {
                    name: name.to_string(),
                    steps: Vec::new(),
                });
                section = Section::Scenario;
                continue;
            }

            if let Some(delimiter) = DOC_STRING_DELIMITERS
                .iter()
                .find(|d| trimmed.starts_with(**d))
            {
                let indent = raw.len() - raw.trim_start().len();
                let mut body: Vec<&str> = Vec::new();
                let mut closed = false;
                for (_, content) in lines.by_ref() {
                    if content.trim() == *delimiter {
                        closed = true;
                        break;
                    }
                    body.push(strip_indent(content, indent));
                }
                if !closed {
                    return Err(FeatureError::Syntax {
                        line,
                        message: "unterminated doc string".into(),
                    });
                }
                let Some(step) = last_step(section, &mut background, &mut feature) else {
                    return Err(FeatureError::Syntax {
                        line,
                        message: "doc string without a step".into(),
                    });
                };
                step.doc_string = Some(body.join("\n"));
                continue;
            }

            if trimmed.starts_with('|') {
                let row = table_row(trimmed);
                let Some(step) = last_step(section, &mut background, &mut feature) else {
                    return Err(FeatureError::Syntax {
                        line,
                        message: "table row without a step".into(),
                    });
                };
                step.table.get_or_insert_with(Vec::new).push(row);
                continue;
            }

            if let Some((keyword, text)) = split_keyword(trimmed) {
                let step = Step::new(keyword, text, line);
                match section {
                    Section::Background => background.push(step),
                    Section::Scenario => {
                        if let Some(scenario) = feature.scenarios.last_mut() {
                            scenario.steps.push(step);
                        }
                    }
                    Section::Preamble => {
                        return Err(FeatureError::Syntax {
                            line,
                            message: "step outside of a scenario".into(),
                        });
                    }
                }
                continue;
            }

            // Free text under the Feature heading is its description.
            if matches!(section, Section::Preamble) && feature.name.is_some() {
                continue;
            }

            return Err(FeatureError::Syntax {
                line,
                message: format!("unexpected line: {}", trimmed),
            });
        }

        if !background.is_empty() {
            for scenario in &mut feature.scenarios {
                let mut steps = background.clone();
                steps.append(&mut scenario.steps);
                scenario.steps = steps;
            }
        }

        Ok(feature)
    }
}

fn heading<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    line.strip_prefix(keyword)?.strip_prefix(':').map(str::trim)
}

fn split_keyword(line: &str) -> Option<(&'static str, &str)> {
    STEP_KEYWORDS.iter().find_map(|keyword| {
        let rest = line.strip_prefix(keyword)?;
        if rest.starts_with(char::is_whitespace) {
            Some((*keyword, rest.trim()))
        } else {
            None
        }
    })
}

/// The step a table row or doc string attaches to.
fn last_step<'a>(
    section: Section,
    background: &'a mut [Step],
    feature: &'a mut Feature,
) -> Option<&'a mut Step> {
    match section {
        Section::Background => background.last_mut(),
        Section::Scenario => feature
            .scenarios
            .last_mut()
            .and_then(|s| s.steps.last_mut()),
        Section::Preamble => None,
    }
}

/// Drop up to `indent` leading whitespace characters.
fn strip_indent(line: &str, indent: usize) -> &str {
    let cut = line
        .char_indices()
        .take(indent)
        .take_while(|(_, c)| c.is_whitespace())
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);
    &line[cut..]
}

/// Split `| a | b |` into trimmed cells. `\|` is a literal pipe, `\\` a
/// backslash and `\n` a newline.
fn table_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('|') => cell.push('|'),
                Some('n') => cell.push('\n'),
                Some('\\') => cell.push('\\'),
                Some(other) => {
                    cell.push('\\');
                    cell.push(other);
                }
                None => cell.push('\\'),
            },
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }
    // The closing pipe is optional.
    if !cell.trim().is_empty() {
        cells.push(cell.trim().to_string());
    }
    cells
}
