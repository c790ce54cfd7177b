//! # treefig demo application
//!
//! A sample CLI that loads a configuration through treefig. It exists to
//! demonstrate and manually verify the library, not to mirror anything.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example treefig_demo -- run
//! cargo run --example treefig_demo -- run --server.ftp.host=test.rebex.net
//! TREEFIG_DEMO_SERVER_FTP_SOURCES=/a,/b cargo run --example treefig_demo -- run
//! cargo run --example treefig_demo -- config env
//! cargo run --example treefig_demo -- config flags
//! cargo run --example treefig_demo -- config --set notif.mail=true show
//! RUST_LOG=treefig=trace cargo run --example treefig_demo -- run
//! ```
//!
//! A `treefig-demo.toml` or `treefig-demo.json` in the working directory is
//! picked up automatically.

mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use treefig::{ConfigArgs, Treefig, TreefigBuilder};

use config::DemoConfig;

/// treefig demo: a sample CLI app for showcasing treefig integration.
#[derive(Parser, Debug)]
#[command(name = "treefig-demo")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load the configuration and print it.
    Run {
        /// Config flags, e.g. --server.ftp.host=localhost.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        flags: Vec<String>,
    },
    /// Inspect the configuration (show, env, flags).
    Config(ConfigArgs),
}

fn make_builder() -> TreefigBuilder {
    Treefig::builder().app_name("treefig-demo")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { flags } => {
            let mut config = DemoConfig::default();
            let report = make_builder()
                .args(flags)
                .load_into(&mut config)
                .unwrap_or_else(|e| {
                    eprintln!("Failed to load config:\n{e}");
                    std::process::exit(1);
                });
            match &report.file {
                Some(path) => println!("config file: {}", path.display()),
                None => println!("config file: none"),
            }
            println!("sources: {}", report.found.join(", "));
            println!("{config:#?}");
        }
        Commands::Config(args) => {
            let builder = args.apply(make_builder());
            let action = args.into_action();
            builder
                .handle_and_print::<DemoConfig>(&action)
                .unwrap_or_else(|e| {
                    eprintln!("Config error:\n{e}");
                    std::process::exit(1);
                });
        }
    }
}
