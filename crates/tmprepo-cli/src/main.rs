use std::path::Path;

use clap::Parser;
use cli::Args;
use logging::setup_logging;
use tmprepo_core::{
    config::PluginConfig, host::StandardHost, plugin::TmpRepoPlugin, TmpRepoResult,
};
use tracing::info;
use utils::COLOR;

mod cli;
mod logging;
mod utils;

fn handle_cli() -> TmpRepoResult<()> {
    let args = Args::parse();

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }
    setup_logging(&args);

    let config = PluginConfig::load(args.config.as_deref().map(Path::new))?;
    let mut host = StandardHost::new(config.cache_dir());
    let mut plugin = TmpRepoPlugin::new(config);

    // The shutdown hook has to run even when registration fails part-way.
    let result = plugin.pre_repo_setup(&mut host, &args.tmprepo, args.tmprepo_keep_created);

    if result.is_ok() {
        for repo in host.repos() {
            info!("Enabled temporary repository {} ({})", repo.id, repo.baseurl);
        }
    }

    plugin.close();
    result
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
