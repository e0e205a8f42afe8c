use std::time::Duration;

use crate::cli::chat::{Session, SessionSettings};
use crate::cli::output::{OutputFormat, Presentation};
use crate::cli::{is_interactive_terminal, resolve_model_or_die};
use crate::config::Config;
use crate::generate::ConversationGenerator;
use crate::registry::registry::Registry;
use crate::GenerateArgs;

pub(crate) async fn generate_cmd(config: &Config, registry: &Registry, args: &GenerateArgs) {
    let platform = args.platform.unwrap_or(config.defaults.platform);
    let theme = args.theme.unwrap_or(config.defaults.theme);

    let presentation = Presentation {
        platform,
        contact_name: args
            .contact
            .as_deref()
            .unwrap_or(&config.defaults.contact_name),
        me_name: args.me.as_deref().unwrap_or(&config.defaults.me_name),
        width: args.width,
    };

    // An explicit output format means the caller wants a document, not a session
    let interactive = args.interactive || (args.format.is_none() && is_interactive_terminal());

    let spec = args.model.as_deref().or(config.default_model.as_deref());
    let (provider, model) = resolve_model_or_die(registry, spec).await;

    tracing::info!(
        provider = %provider.id(),
        model = %model,
        platform = %platform,
        theme = %theme,
        interactive,
        "generating conversation"
    );

    if interactive {
        let settings = SessionSettings {
            platform,
            theme,
            presentation,
            keybindings: config.keybindings,
            reply_delay: Duration::from_millis(config.request.reply_delay_ms),
        };

        Session::new(settings, provider, &model).run().await;

        return;
    }

    let transcript = ConversationGenerator::new(provider, &model)
        .generate(platform, theme, presentation.contact_name)
        .await;

    presentation.print(&transcript, OutputFormat::resolve(args.format));
}
