use colored::Colorize;
use commands::command_argument_builder;
use connector::handlers::{handle_flush, handle_links, handle_run, init_logging};

mod commands;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();

    let Some((name, sub_matches)) = chosen_command.subcommand() else {
        unreachable!("clap should ensure we don't get here")
    };
    init_logging(sub_matches.get_flag("verbose"), sub_matches.get_flag("quiet"));

    let result = match name {
        "run" => handle_run(sub_matches).await,
        "links" => handle_links(sub_matches),
        "flush" => handle_flush(sub_matches),
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
