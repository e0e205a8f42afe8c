use std::path::PathBuf;

use reedline::{
    default_emacs_keybindings, default_vi_insert_keybindings, default_vi_normal_keybindings,
    ColumnarMenu, DefaultCompleter, EditCommand, EditMode, Emacs, KeyCode, KeyModifiers,
    MenuBuilder, Reedline, ReedlineEvent, ReedlineMenu, Signal, Vi,
};
use thiserror::Error;

use crate::config;
use nu_ansi_term::{Color, Style};

use super::highlighter::Highlighter;
use super::prompt::{completion_marker, Prompt};

const COMMANDS: [&str; 4] = ["/regenerate", "/save", "/clear", "/exit"];

#[derive(Debug, PartialEq)]
pub(crate) enum Command {
    /// Replace the transcript with a fresh generation
    Regenerate,
    /// Write the transcript as JSON
    Save(PathBuf),
    Clear,
    Exit,
}

#[derive(Error, Debug, PartialEq)]
pub(crate) enum CommandError {
    #[error("unknown command \"{0}\", expected /regenerate, /save, /clear or /exit")]
    Unknown(String),
    #[error("usage: /save <path>")]
    MissingPath,
    #[error("\"{0}\" does not take arguments")]
    UnexpectedArgument(&'static str),
}

impl Command {
    /// Returns `None` when the line is a chat message rather than a command
    pub(crate) fn parse(line: &str) -> Option<Result<Command, CommandError>> {
        let line = line.trim();

        if !line.starts_with('/') {
            return None;
        }

        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let no_arg = |cmd: Command, name: &'static str| {
            if arg.is_empty() {
                Ok(cmd)
            } else {
                Err(CommandError::UnexpectedArgument(name))
            }
        };

        Some(match name {
            "/regenerate" => no_arg(Command::Regenerate, "/regenerate"),
            "/clear" => no_arg(Command::Clear, "/clear"),
            "/exit" => no_arg(Command::Exit, "/exit"),
            "/save" if arg.is_empty() => Err(CommandError::MissingPath),
            "/save" => Ok(Command::Save(PathBuf::from(arg))),
            _ => Err(CommandError::Unknown(name.to_string())),
        })
    }
}

/// What the user asked for at the prompt
#[derive(Debug, PartialEq)]
pub(crate) enum Input {
    Message(String),
    Command(Command),
    Invalid(CommandError),
    /// Ctrl-D, or the terminal went away
    Eof,
}

fn completion_binding() -> ReedlineEvent {
    ReedlineEvent::UntilFound(vec![
        ReedlineEvent::Menu("completion_menu".to_string()),
        ReedlineEvent::MenuNext,
    ])
}

fn edit_mode(keybindings: config::Keybindings) -> Box<dyn EditMode> {
    match keybindings {
        config::Keybindings::Vi => {
            let mut insert_bindings = default_vi_insert_keybindings();

            insert_bindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, completion_binding());

            Box::new(Vi::new(insert_bindings, default_vi_normal_keybindings()))
        }
        config::Keybindings::Emacs => {
            let mut keybindings = default_emacs_keybindings();

            keybindings.add_binding(KeyModifiers::NONE, KeyCode::Tab, completion_binding());

            keybindings.add_binding(
                KeyModifiers::CONTROL,
                KeyCode::Char('j'),
                ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
            );

            Box::new(Emacs::new(keybindings))
        }
    }
}

pub(crate) struct Repl {
    line_editor: Reedline,
    prompt: Prompt,
}

impl Repl {
    pub(crate) fn new(keybindings: config::Keybindings, me_name: &str) -> Repl {
        let commands = COMMANDS.iter().map(|c| c.to_string()).collect();

        let mut completer = Box::new(DefaultCompleter::with_inclusions(&['/']));

        completer.insert(commands);

        let completion_menu = Box::new(
            ColumnarMenu::default()
                .with_name("completion_menu")
                .with_marker(&completion_marker().to_string())
                .with_text_style(Style::new().fg(Color::Default))
                .with_selected_text_style(Style::new().fg(Color::Blue).on(Color::DarkGray))
                .with_selected_match_text_style(
                    Style::new().fg(Color::Blue).bold().on(Color::DarkGray),
                ),
        );

        let line_editor = Reedline::create()
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(edit_mode(keybindings))
            .with_highlighter(Box::new(Highlighter));

        Repl {
            line_editor,
            prompt: Prompt::new(me_name),
        }
    }

    /// Blocks until the user submits a non-blank line
    pub(crate) fn read(&mut self) -> Input {
        loop {
            match self.line_editor.read_line(&self.prompt) {
                Ok(Signal::Success(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    return match Command::parse(&line) {
                        Some(Ok(command)) => Input::Command(command),
                        Some(Err(err)) => Input::Invalid(err),
                        None => Input::Message(line),
                    };
                }
                Ok(Signal::CtrlC) => continue,
                Ok(Signal::CtrlD) => return Input::Eof,
                Err(err) => {
                    tracing::debug!(error = %err, "line editor failed");

                    return Input::Eof;
                }
            }
        }
    }
}
