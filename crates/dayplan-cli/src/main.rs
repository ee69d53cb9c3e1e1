// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;
mod shell;

use anyhow::{Context, Result};
use config::Config;
use dayplan_app::{KeyboardHub, ScreenController};
use runtime::{Exit, FlowRuntime, ShellNavigator};
use shell::Shell;
use std::env;
use std::io;
use std::path::PathBuf;
use tracing::{Level, debug};

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `dayplan --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_logging(config.log_level()?);

    let runtime = if options.demo {
        FlowRuntime::Demo
    } else {
        let client = dayplan_api::Client::new(&config.api_base_url(), config.api_timeout()?)
            .with_context(|| {
                format!(
                    "invalid [api] config in {}; fix base_url/timeout values",
                    options.config_path.display()
                )
            })?
            .with_token(config.api_token());
        FlowRuntime::Api(client)
    };
    let screen_options = config.screen_options()?;
    let load_budget = config.load_budget()?;
    if options.check_only {
        return Ok(());
    }

    debug!(
        next_route = %screen_options.next_route,
        demo = options.demo,
        "mounting selection screen"
    );
    let hub = KeyboardHub::global();
    let mut screen = ScreenController::mount(
        runtime.catalog_source(),
        runtime,
        ShellNavigator::default(),
        hub.clone(),
        screen_options,
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let exit = Shell::new(&hub, load_budget).run(&mut screen, stdin.lock(), &mut stdout)?;
    match screen.navigator().exit() {
        Some(Exit::Forward(route)) => println!("next: {route}"),
        Some(Exit::Back) => println!("went back"),
        None => debug!(?exit, "left selection screen without navigating"),
    }
    Ok(())
}

fn init_logging(level: Level) {
    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("dayplan: pick the essential activities for your trip");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Use a built-in activity catalog instead of the API");
    println!("  --check                  Validate config and API settings, then exit");
    println!("  --help                   Show this help");
}
