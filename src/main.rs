use clap::{Parser, Subcommand};

mod cmd;
mod core;
mod export;
mod input;

#[derive(Parser, Debug)]
#[command(
    name = "eqtax",
    version,
    about = "Calculate capital gains tax on listed equity sales (Budget 2024 rules)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate tax for each sale and optionally export the results
    Report(cmd::report::ReportCommand),
    /// Check input rows for errors and warnings
    Validate(cmd::validate::ValidateCommand),
    /// Print the expected input columns or the rules file schema
    Schema(cmd::schema::SchemaCommand),
    /// Show the tax rate schedule
    Rules(cmd::rules::RulesCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Report(report) => report.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Schema(schema) => schema.exec(),
        Command::Rules(rules) => rules.exec(),
    }
}
