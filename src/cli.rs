use std::io::{self, IsTerminal};

use crate::die;
use crate::providers::ChatProvider;
use crate::registry::registry::{resolve_once, Registry};
use crate::RequestedColorMode;

pub(crate) mod chat;
pub(crate) mod generate;
pub(crate) mod list;
pub(crate) mod output;
pub(crate) mod send;

#[derive(Clone, Copy, PartialEq, Eq, Debug, strum_macros::Display)]
pub(crate) enum ColorMode {
    On,
    Off,
}

impl ColorMode {
    /// An explicit `--color` wins. Under `auto`, color is used only when stdout is a
    /// terminal and `NO_COLOR` is unset.
    pub(crate) fn resolve_auto(cm: RequestedColorMode) -> ColorMode {
        match cm {
            RequestedColorMode::Auto => {
                let disable_color =
                    std::env::var_os("NO_COLOR").is_some() || !io::stdout().is_terminal();

                if disable_color {
                    ColorMode::Off
                } else {
                    ColorMode::On
                }
            }
            RequestedColorMode::On => ColorMode::On,
            RequestedColorMode::Off => ColorMode::Off,
        }
    }
}

/// Whether both ends of the session are a person at a terminal
pub(crate) fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Resolves the model for a command, exiting with a diagnostic if none can be used
pub(crate) async fn resolve_model_or_die<'r>(
    registry: &'r Registry,
    spec: Option<&str>,
) -> (&'r dyn ChatProvider, String) {
    match resolve_once(registry, spec).await {
        Ok(resolved) => resolved,
        Err(err) => {
            // Point first-time users at the credentials they are missing
            if registry.empty() {
                die!("none of the providers are active, set GEMINI_API_KEY, OPENAI_API_KEY, or start ollama");
            }

            die!("failed to resolve model: {}", err);
        }
    }
}
