use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blogcast::build::{self, Error};
use blogcast::config::{PrepareSettings, PublishSettings, SiteConfig, DEFAULT_CONFIG_FILE};
use blogcast::publish::{DryRun, Publisher, TwitterClient};
use blogcast::url::{compose_url, DEFAULT_BASE_URL};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let matches = App::new("blogcast")
        .version(clap::crate_version!())
        .about("Announces newly published blog posts on social media")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Log at debug level unless RUST_LOG is set"),
        )
        .subcommand(
            SubCommand::with_name("prepare")
                .about("Composes the announcement for a post and writes it as a step output")
                .arg(
                    Arg::with_name("post")
                        .index(1)
                        .help("The post source file (defaults to $LATEST_POST_FILE)"),
                )
                .arg(
                    Arg::with_name("config")
                        .long("config")
                        .takes_value(true)
                        .default_value(DEFAULT_CONFIG_FILE)
                        .help("The site configuration file"),
                ),
        )
        .subcommand(
            SubCommand::with_name("publish")
                .about("Publishes $TWEET_TEXT using the credentials in the environment")
                .arg(
                    Arg::with_name("dry-run")
                        .long("dry-run")
                        .help("Log the text instead of publishing it"),
                ),
        )
        .subcommand(
            SubCommand::with_name("url")
                .about("Prints the announcement URL for a post file name")
                .arg(Arg::with_name("identifier").index(1).required(true))
                .arg(
                    Arg::with_name("base-url")
                        .long("base-url")
                        .takes_value(true)
                        .default_value(DEFAULT_BASE_URL),
                ),
        )
        .get_matches();

    let verbose = matches.is_present("verbose")
        || matches
            .subcommand()
            .1
            .map_or(false, |m| m.is_present("verbose"));
    init_tracing(verbose);

    let result = match matches.subcommand() {
        ("prepare", Some(m)) => prepare(m),
        ("publish", Some(m)) => publish(m),
        ("url", Some(m)) => {
            // both arguments are required or defaulted
            println!(
                "{}",
                compose_url(
                    m.value_of("identifier").unwrap_or_default(),
                    m.value_of("base-url").unwrap_or(DEFAULT_BASE_URL),
                )
            );
            Ok(())
        }
        _ => Ok(()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn prepare(matches: &ArgMatches) -> Result<(), Error> {
    let settings = PrepareSettings::from_env();
    let post_file = match matches.value_of("post").map(PathBuf::from).or(settings.post_file) {
        Some(path) => path,
        None => {
            info!("no post given and LATEST_POST_FILE is not set; nothing to announce");
            return Ok(());
        }
    };
    let config_file = matches.value_of("config").unwrap_or(DEFAULT_CONFIG_FILE);
    let site = SiteConfig::from_path(Path::new(config_file))?;
    build::prepare(&post_file, &site, settings.output_file.as_deref())?;
    Ok(())
}

fn publish(matches: &ArgMatches) -> Result<(), Error> {
    let settings = PublishSettings::from_env()?;
    let publisher: Box<dyn Publisher> = if matches.is_present("dry-run") {
        Box::new(DryRun)
    } else {
        Box::new(TwitterClient::new(settings.credentials)?)
    };
    build::publish(publisher.as_ref(), &settings.text)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
    {
        eprintln!("failed to initialize logging: {}", e);
    }
}
