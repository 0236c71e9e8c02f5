use clap::{Parser, Subcommand};
use serde::Serialize;

mod commands;
mod output;

use commands::{apply, rules, scan};
use navmig::report::render_report;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "navmig")]
#[command(version = VERSION)]
#[command(about = "Migrate Unreal Engine C++ projects to the standalone NavigationSystem module")]
struct Cli {
    /// Emit a JSON envelope instead of the text report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Preview the migration without modifying any file
    Scan(scan::ScanArgs),
    /// Rewrite files in place, backing originals up as .bak
    Apply(apply::ApplyArgs),
    /// List the builtin rename table
    Rules(rules::RulesArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => finish(scan::run(args), cli.json, render_report),
        Commands::Apply(args) => finish(apply::run(args), cli.json, render_report),
        Commands::Rules(args) => finish(rules::run(args), cli.json, rules::render),
    }
}

fn finish<T: Serialize>(
    result: navmig::Result<T>,
    json: bool,
    render: impl Fn(&T) -> String,
) -> std::process::ExitCode {
    if json {
        let code = match &result {
            Ok(_) => 0,
            Err(err) => output::exit_code_for_error(err.code),
        };
        output::print_json_result(&result);
        return std::process::ExitCode::from(code);
    }

    match result {
        Ok(data) => {
            print!("{}", render(&data));
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            let code = output::exit_code_for_error(err.code);
            output::print_text_error(&err);
            std::process::ExitCode::from(code)
        }
    }
}
