use nu_ansi_term::Style;

use super::repl::Command;
use crate::cli::ColorMode;
use crate::color;

/// Known commands are highlighted as they are typed; everything else is a message
#[derive(Default)]
pub(crate) struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> reedline::StyledText {
        let style = match (color::color_mode(), Command::parse(line)) {
            (ColorMode::On, Some(Ok(_))) => *color::USER_PROMPT,
            _ => Style::new(),
        };

        reedline::StyledText {
            buffer: vec![(style, line.to_string())],
        }
    }
}
