//! Fetch command - bring a module into the cache

use super::target::Target;
use crate::cache::{CacheOutcome, MirrorDownloader, ModuleCache, SymfileDownloader};
use crate::cli::args::{FetchArgs, OutputFormat};
use crate::config::Config;
use crate::error::{ModCacheError, ModCacheResult};
use console::style;
use tracing::debug;

/// Execute the fetch command
pub async fn execute(args: FetchArgs, config: &Config) -> ModCacheResult<()> {
    let target = Target::resolve(&args.module, config)?;

    let mut downloader = MirrorDownloader::new();
    for mirror in args.mirror.iter().chain(config.cache.mirrors.iter()) {
        if !downloader.add_mirror(mirror) {
            debug!("Ignoring duplicate mirror {}", mirror.display());
        }
    }
    if downloader.mirrors().is_empty() {
        return Err(ModCacheError::User(
            "No mirrors configured. Pass --mirror <DIR> or set cache.mirrors".to_string(),
        ));
    }
    let with_symbols = config.cache.symbols && !args.no_symbols;

    let outcome = {
        let target = target.clone();
        tokio::task::spawn_blocking(move || {
            let symbols: Option<&dyn SymfileDownloader> =
                with_symbols.then_some(&downloader as &dyn SymfileDownloader);
            ModuleCache::new().get_and_put(
                &target.root,
                &target.hostname,
                &target.spec,
                &downloader,
                symbols,
            )
        })
        .await
        .map_err(|e| ModCacheError::Internal(format!("fetch task failed: {}", e)))??
    };

    match args.module.format {
        OutputFormat::Text => print_text(&target, &outcome),
        OutputFormat::Json => print_json(&target, &outcome)?,
    }

    Ok(())
}

fn print_text(target: &Target, outcome: &CacheOutcome) {
    let status = if outcome.created {
        style("fetched").green()
    } else {
        style("cached").cyan()
    };
    println!("{} {}", status, target.spec);
    println!("{:<14} {}", style("uuid:").bold(), outcome.module.uuid());
    println!(
        "{:<14} {}",
        style("uuid view:").bold(),
        outcome.module.file().display()
    );
    println!(
        "{:<14} {}",
        style("sysroot view:").bold(),
        target.sysroot_view().display()
    );
    if let Some(symbols) = outcome.module.symbol_file() {
        println!("{:<14} {}", style("symbols:").bold(), symbols.display());
    }
    for warning in &outcome.warnings {
        eprintln!("{} {}", style("Warning:").yellow(), warning);
    }
}

fn print_json(target: &Target, outcome: &CacheOutcome) -> ModCacheResult<()> {
    let json = serde_json::json!({
        "module": target.spec.path,
        "uuid": outcome.module.uuid().to_string(),
        "created": outcome.created,
        "uuid_view": outcome.module.file(),
        "sysroot_view": target.sysroot_view(),
        "symbol_file": outcome.module.symbol_file(),
        "warnings": outcome
            .warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
