use nu_ansi_term::AnsiGenericString;
use reedline::{self, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode};
use std::borrow::Cow;

use crate::color::{self, MaybePaint};

const VI_NORMAL_PROMPT: &str = "[=] ";
const COMPLETION_MARKER: &str = "[/] ";
const MULTILINE_PROMPT: &str = "::: ";

/// The prompt is labelled with the name of the person typing
pub(crate) fn user_prompt(me_name: &str) -> String {
    color::USER_PROMPT
        .maybe_paint(format!("[{}] ", me_name))
        .to_string()
}

pub(crate) fn completion_marker() -> AnsiGenericString<'static, str> {
    color::USER_PROMPT.maybe_paint(COMPLETION_MARKER)
}

pub(crate) struct Prompt {
    user_prompt: String,
    vi_normal_prompt: String,
    multiline_prompt: String,
}

impl Prompt {
    pub(crate) fn new(me_name: &str) -> Prompt {
        Prompt {
            user_prompt: user_prompt(me_name),
            vi_normal_prompt: color::USER_PROMPT.maybe_paint(VI_NORMAL_PROMPT).to_string(),
            multiline_prompt: color::USER_PROMPT.maybe_paint(MULTILINE_PROMPT).to_string(),
        }
    }
}

impl reedline::Prompt for Prompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<str> {
        match prompt_mode {
            PromptEditMode::Vi(PromptViMode::Normal) => Cow::Borrowed(&self.vi_normal_prompt),
            _ => Cow::Borrowed(&self.user_prompt),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed(&self.multiline_prompt)
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
