use clap::Parser;
use fs_err as fs;
use std::path::Path;
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod log;
mod pipeline;
mod prefs;
mod prompt;
mod provider;
mod ux;
mod validate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    let mut cfg = config::Config::load(args.config.as_deref())?;
    args.overlay(&mut cfg);

    let txid = Uuid::new_v4();
    if args.debug {
        println!("debug: flag enabled");
        log::print_planned_paths(Path::new(&cfg.artifact_dir), txid);
    }

    // Both input checks happen before any client exists or any call is made.
    let creds = match config::SessionCredentials::resolve(args.openai_key.clone(), args.serp_key.clone())
    {
        Ok(c) => c,
        Err(e) => {
            ux::print_failure(&e);
            std::process::exit(1);
        }
    };
    let garden_prefs = match cli::collect_preferences(&args).and_then(|p| {
        p.validate()?;
        Ok(p)
    }) {
        Ok(p) => p,
        Err(e) => {
            ux::print_failure(&e);
            std::process::exit(1);
        }
    };

    ux::show_preferences(&garden_prefs);

    let backend = provider::make_backend(creds, &cfg, args.debug);
    let mut run = pipeline::Pipeline::new(backend.as_ref(), &cfg)
        .with_observer(Box::new(ux::StageSpinner::new()));

    let report = match run.generate_report(&garden_prefs).await {
        Ok(report) => report,
        Err(e) => {
            ux::print_failure(&e);
            std::process::exit(1);
        }
    };

    log::save_manifest(txid, &garden_prefs, &cfg)?;
    for record in &report.trail {
        let saved = log::save_stage(record, txid, &cfg, args.save_request, args.save_response)?;
        if args.debug {
            log::print_saved_paths(record.stage.slug(), &saved);
        }
    }

    ux::print_report(&report.markdown);
    fs::write(&cfg.output_path, &report.markdown)?;
    ux::print_saved_report(&cfg.output_path);

    Ok(())
}
