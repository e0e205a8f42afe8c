use strum::IntoEnumIterator;
use table::{IntoTable, Table};
mod table;

use crate::{
    die,
    platform::PlatformKind,
    providers::providers::ProviderIdentifier,
    registry::registry::Registry,
    theme::ThemeKind,
    ListArgs, ListObject, ListingFormat,
};

fn context_cell(context: Option<u64>) -> String {
    match context {
        Some(context) => context.to_string(),
        None => "unknown".to_string(),
    }
}

#[derive(serde::Serialize)]
struct Model {
    model_id: String,
    context: Option<u64>,
}

impl From<Vec<Model>> for Table {
    fn from(value: Vec<Model>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["MODEL", "CONTEXT"]);

        for model in value {
            tab.add_row(vec![model.model_id, context_cell(model.context)]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
struct ProvidedModel {
    model_id: String,
    provider: ProviderIdentifier,
    context: Option<u64>,
}

impl From<Vec<ProvidedModel>> for Table {
    fn from(value: Vec<ProvidedModel>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["MODEL", "PROVIDER", "CONTEXT"]);

        for model in value {
            tab.add_row(vec![
                model.model_id,
                model.provider.to_string(),
                context_cell(model.context),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
struct Provider {
    provider: ProviderIdentifier,
    enabled: bool,
    priority: u8,
}

impl From<Vec<Provider>> for Table {
    fn from(value: Vec<Provider>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["PROVIDER", "ENABLED", "PRIORITY"]);

        for provider in value {
            tab.add_row(vec![
                provider.provider.to_string(),
                if provider.enabled {
                    "enabled".to_string()
                } else {
                    "disabled".to_string()
                },
                provider.priority.to_string(),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
struct Platform {
    platform: PlatformKind,
    name: &'static str,
    style: &'static str,
}

impl From<Vec<Platform>> for Table {
    fn from(value: Vec<Platform>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["PLATFORM", "NAME", "STYLE"]);

        for platform in value {
            tab.add_row(vec![
                platform_id(platform.platform),
                platform.name.to_string(),
                platform.style.to_string(),
            ]);
        }

        tab
    }
}

#[derive(serde::Serialize)]
struct Theme {
    theme: ThemeKind,
    label: &'static str,
    guideline: &'static str,
}

impl From<Vec<Theme>> for Table {
    fn from(value: Vec<Theme>) -> Self {
        let mut tab = Table::new();

        tab.set_header(vec!["THEME", "LABEL", "GUIDELINE"]);

        for theme in value {
            tab.add_row(vec![
                theme_id(theme.theme),
                theme.label.to_string(),
                theme.guideline.to_string(),
            ]);
        }

        tab
    }
}

/// The name accepted on the command line and in the config
fn platform_id(kind: PlatformKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| kind.to_string())
}

fn theme_id(kind: ThemeKind) -> String {
    serde_json::to_value(kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| kind.to_string())
}

fn get_providers(registry: &Registry) -> Vec<Provider> {
    ProviderIdentifier::iter()
        .map(|id| Provider {
            provider: id,
            enabled: registry.provider(id).is_some(),
            priority: registry.priority(id),
        })
        .collect()
}

fn get_platforms() -> Vec<Platform> {
    PlatformKind::all()
        .iter()
        .map(|profile| Platform {
            platform: profile.kind,
            name: profile.name,
            style: profile.style_rule,
        })
        .collect()
}

fn get_themes() -> Vec<Theme> {
    ThemeKind::all()
        .iter()
        .map(|profile| Theme {
            theme: profile.kind,
            label: profile.label,
            guideline: profile.guideline,
        })
        .collect()
}

async fn get_registered_models(registry: &Registry) -> Vec<ProvidedModel> {
    match registry.registered_models().await {
        Ok(models) => models
            .into_iter()
            .map(|pm| ProvidedModel {
                model_id: pm.model.id,
                provider: pm.provider,
                context: pm.model.context_length,
            })
            .collect(),
        Err(err) => {
            die!("failed to list models: {}", err);
        }
    }
}

async fn get_models_for_provider(registry: &Registry, id: ProviderIdentifier) -> Vec<Model> {
    let provider = match registry.provider(id) {
        Some(provider) => provider,
        None => {
            die!("failed to list models: provider \"{0}\" is not enabled", id);
        }
    };

    let models = match provider.models().await {
        Ok(models) => models,
        Err(err) => die!("failed to list models: {}", err),
    };

    models
        .into_iter()
        .map(|m| Model {
            model_id: m.id,
            context: m.context_length,
        })
        .collect()
}

fn format_output<O: IntoTable + serde::Serialize>(object: O, format: ListingFormat) {
    match format {
        ListingFormat::Json => match serde_json::to_string_pretty(&object) {
            Ok(output) => println!("{}", output),
            Err(err) => die!("failed to serialize listing: {}", err),
        },
        ListingFormat::Table => {
            let tab = object.into_table();

            print!("{}", tab);
        }
        ListingFormat::HeaderlessTable => {
            let mut tab = object.into_table();

            tab.print_header(false);

            print!("{}", tab);
        }
    }
}

pub(crate) async fn list_cmd(registry: &Registry, args: &ListArgs) {
    let format = args.format;

    match &args.object {
        ListObject::Models(args) => {
            if let Some(id) = args.provider {
                let models = get_models_for_provider(registry, id).await;
                format_output(models, format);
            } else {
                let models = get_registered_models(registry).await;
                format_output(models, format);
            }
        }
        ListObject::Providers => format_output(get_providers(registry), format),
        ListObject::Platforms => format_output(get_platforms(), format),
        ListObject::Themes => format_output(get_themes(), format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_match_cli_names() {
        assert_eq!(platform_id(PlatformKind::WhatsApp), "whatsapp");
        assert_eq!(theme_id(ThemeKind::RedFlag), "red-flag");
    }

    #[test]
    fn test_platform_table() {
        let tab: Table = get_platforms().into();
        let text = tab.to_string();
        let mut lines = text.lines();

        assert!(lines.next().unwrap().starts_with("PLATFORM"));
        assert_eq!(lines.count(), 4);
        assert!(text.contains("tiktok     TikTok"));
    }

    #[test]
    fn test_theme_listing_json() {
        let json = serde_json::to_value(get_themes()).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 14);
        assert_eq!(json[8]["theme"], "red-flag");
        assert_eq!(json[8]["label"], "Red Flag");
    }

    #[test]
    fn test_providers_listing() {
        let registry = Registry::new();
        let providers = get_providers(&registry);

        assert_eq!(providers.len(), 3);
        assert!(providers.iter().all(|p| !p.enabled));
    }
}
