//! Paths command - show where a module lives in the cache

use super::target::Target;
use crate::cli::args::{OutputFormat, PathsArgs};
use crate::config::Config;
use crate::error::ModCacheResult;
use console::style;

/// Execute the paths command
pub async fn execute(args: PathsArgs, config: &Config) -> ModCacheResult<()> {
    let target = Target::resolve(&args.module, config)?;
    let uuid_view = target.uuid_view()?;
    let sysroot_view = target.sysroot_view();

    match args.module.format {
        OutputFormat::Text => {
            match &uuid_view {
                Some(path) => println!("{:<14} {}", style("uuid view:").bold(), path.display()),
                None => println!(
                    "{:<14} {}",
                    style("uuid view:").bold(),
                    style("(resolved after fetch)").dim()
                ),
            }
            println!("{:<14} {}", style("sysroot view:").bold(), sysroot_view.display());
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "uuid_view": uuid_view,
                "sysroot_view": sysroot_view,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}
