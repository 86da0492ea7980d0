use anyhow::Context;
use clap::Parser;
use sales_processor::cli::{
    args::{Args, Commands},
    commands,
};
use std::process;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    let Some(command) = args.command else {
        show_help_and_commands();
        process::exit(0);
    };

    match run(command) {
        Ok(()) => process::exit(0),
        Err(error) => {
            // Error occurred - print to stderr and exit with error code
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(command: Commands) -> anyhow::Result<()> {
    let context = match &command {
        Commands::Process(args) => format!("Processing {} input(s) failed", args.inputs.len()),
        Commands::Inspect(args) => format!("Inspecting {} failed", args.file.display()),
        Commands::Sample(_) => "Generating sample export failed".to_string(),
    };

    commands::run(command).context(context)
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("Sales Processor - Legacy Accounting Export Reader");
    println!("=================================================");
    println!();
    println!("Normalize CSV sales exports from a legacy accounting system into");
    println!("clean, signed sales totals.");
    println!();
    println!("USAGE:");
    println!("    sales-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Parse exports and report sales totals (main command)");
    println!("    inspect     Show how a single export is read");
    println!("    sample      Write a synthetic export for trying things out");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    # Report all exports in a directory, grouped by family:");
    println!("    sales-processor process exports/ --group-by family");
    println!();
    println!("    # First quarter only, as JSON:");
    println!("    sales-processor process vendas.csv --from 2024-01-01 --to 2024-03-31 \\");
    println!("                            --output-format json");
    println!();
    println!("    # Check delimiter and column detection of one file:");
    println!("    sales-processor inspect vendas.csv -v");
    println!();
    println!("    # Generate 500 synthetic sales and report them:");
    println!("    sales-processor sample -o demo.csv --rows 500");
    println!("    sales-processor process demo.csv --group-by salesperson");
    println!();
    println!("For detailed help on any command, use:");
    println!("    sales-processor <COMMAND> --help");
}
