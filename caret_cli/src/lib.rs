//! # Caret CLI
//!
//! Loads a type model and runtime configuration, then reports the type of
//! the fragment before a caret or the members to complete there.

pub mod args;
pub mod render;

pub use args::Cli;

use caret_analyzer::config::RuntimeConfig;
use caret_analyzer::logging::codes;
use caret_analyzer::types::builtin;
use caret_analyzer::{
    log_info, log_success, CaretAnalyzer, CompletionProvider, StringLiteralParsing, TypeModel,
    TypeRef, TypeRegistry,
};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;

pub type CliResult<T> = Result<T, Box<dyn Error>>;

/// `--config` file or environment defaults, with command-line overrides applied
pub fn load_config(cli: &Cli) -> CliResult<RuntimeConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let config = RuntimeConfig::load(path)?;
            log_success!(codes::success::CONFIG_LOADED, "Runtime configuration loaded",
                "path" => path.display()
            );
            config
        }
        None => RuntimeConfig::default(),
    };
    if cli.double_quote_escapes {
        config.parsing.string_literal_parsing = StringLiteralParsing::EscapeDoubleQuoteByTwoDoubleQuotes;
    }
    Ok(config)
}

/// Registry from `--model` and the type bound to `it`
///
/// `--context` wins over the model's context; with neither, `it` is `System.Object`.
pub fn load_registry(cli: &Cli) -> CliResult<(Arc<TypeRegistry>, TypeRef)> {
    let (registry, model_context) = match &cli.model {
        Some(path) => {
            let loaded = TypeModel::load(path)?.into_registry()?;
            (loaded.registry, loaded.context)
        }
        None => (TypeRegistry::new(), None),
    };

    let context = match (&cli.context, model_context) {
        (Some(name), _) => find_context(&registry, name)
            .ok_or_else(|| format!("Unknown context type '{}'", name))?,
        (None, Some(context)) => context,
        (None, None) => registry
            .get(builtin::OBJECT)
            .ok_or("System.Object is not registered")?,
    };
    Ok((Arc::new(registry), context))
}

fn find_context(registry: &TypeRegistry, name: &str) -> Option<TypeRef> {
    registry.get(name).or_else(|| {
        registry
            .custom_types()
            .iter()
            .find(|t| t.name == name)
            .cloned()
    })
}

pub fn read_text(cli: &Cli) -> CliResult<String> {
    match (&cli.text, &cli.file) {
        (Some(text), _) => Ok(text.clone()),
        (None, Some(path)) => read_file(path),
        (None, None) => Err("Provide the expression as TEXT or with --file".into()),
    }
}

fn read_file(path: &Path) -> CliResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e).into())
}

/// Analyze or complete as the arguments ask, returning the rendered output
pub fn run(cli: &Cli, config: &RuntimeConfig) -> CliResult<String> {
    let (registry, context) = load_registry(cli)?;
    let text = read_text(cli)?;
    let caret = cli.caret.unwrap_or(text.len());

    log_info!("Analyzing expression",
        "context" => context.full_name(),
        "caret" => caret,
        "complete" => cli.complete
    );

    if cli.complete {
        let provider = CompletionProvider::with_registry(
            registry,
            config.parsing.clone(),
            config.completion.clone(),
        );
        let list = provider.complete(&context, &text, caret)?;
        return render::completion(list.as_ref(), &config.completion, cli.json);
    }

    let analyzer = CaretAnalyzer::with_registry(registry, config.parsing.clone());
    let analysis = analyzer.analyze(&context, &text, caret)?;
    render::analysis(&analysis.report(), cli.json)
}
