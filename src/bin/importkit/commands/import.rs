//! `importkit import` command

use std::time::UNIX_EPOCH;

use anyhow::Result;

use crate::cli::ImportArgs;
use crate::commands::{block_on, config_with_node, parse_cache};
use importkit::loader::ParentRef;
use importkit::util::diagnostic::{emit, Diagnostic};
use importkit::{module_info, ImportError, ImportOptions, Importer};

fn bypassed_note(error: &ImportError, path: &str) -> Diagnostic {
    Diagnostic::note(format!("validation bypassed: {}", error))
        .with_location(path)
        .with_context("the engine runs anyway and may not honor the request")
}

pub fn execute(args: ImportArgs, color: bool) -> Result<()> {
    let config = config_with_node(args.node);
    let cache = parse_cache(args.cache.as_deref(), &config)?;

    let parent = match args.parent {
        Some(ref parent) => ParentRef::parse(parent),
        None => ParentRef::cwd(),
    };

    let mut options = ImportOptions::from_config(parent, &config.import).with_cache(cache);
    if let Some(loader) = args.loader {
        options = options.with_loader(loader);
    }
    if args.list_dependencies {
        options = options.with_list_dependencies(true);
    }
    if args.force {
        options = options.with_bypass_validation(true);
    }

    let importer = Importer::from_config(&config);
    let result = block_on(async {
        if options.bypass_validation {
            let strict = options.clone().with_bypass_validation(false);
            if let Err(e) = importer.resolve_strategy(&args.path, &strict).await {
                if e.is_validation() {
                    emit(&bypassed_note(&e, &args.path), color);
                }
            }
        }
        importer.import(&args.path, options).await
    })?;

    let module = match result {
        Ok(module) => module,
        Err(e) => {
            emit(&e.to_diagnostic(), color);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(module.exports())?);

    if let Some(info) = module_info(&module) {
        let millis = |t: std::time::SystemTime| {
            t.duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default()
        };

        tracing::info!("strategy: {}", info.strategy);
        tracing::info!("cache:    {}", info.cache);
        tracing::info!(
            "loaded in {} ms",
            millis(info.timestamp_load).saturating_sub(millis(info.timestamp_init))
        );
        if let Some(dependencies) = info.dependencies {
            for dependency in dependencies {
                tracing::info!("depends on {}", dependency.display());
            }
        }
    }

    Ok(())
}
