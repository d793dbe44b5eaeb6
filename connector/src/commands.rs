use crate::CLAP_STYLING;
use clap::{arg, command};
use connector::handlers::DEFAULT_DB_PATH;
use connector_fetch::client::DEFAULT_BASE_URL;
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("connector")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("connector")
        .about("Derives connected location pairs from a router link graph")
        .styles(CLAP_STYLING)
        .arg(
            arg!(-d --"db" <PATH>)
                .required(false)
                .global(true)
                .help("Location of the connector database")
                .env("CONNECTOR_DB")
                .default_value(DEFAULT_DB_PATH),
        )
        .arg(
            arg!(-q --"quiet" "Suppress progress and non-essential output")
                .required(false)
                .global(true)
                .conflicts_with("verbose"),
        )
        .arg(
            arg!(-v --"verbose" "Log debug output to stderr")
                .required(false)
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            command!("run")
                .about(
                    "Fetch router location data, store it and print every connected location \
                pair once.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The router location data API")
                        .value_parser(clap::value_parser!(Url))
                        .env("CONNECTOR_BASE_URL")
                        .default_value(DEFAULT_BASE_URL),
                )
                .arg(
                    arg!(-F --"file" <PATH>)
                        .required(false)
                        .help("Read the router location payload from a JSON file instead")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-r --"retries" <NUM>)
                        .required(false)
                        .help("Max retries for the API request")
                        .value_parser(clap::value_parser!(u32))
                        .default_value("3"),
                )
                .arg(
                    arg!(-t --"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("20"),
                )
                .arg(
                    arg!(--"persist-data")
                        .required(false)
                        .help("Keep router location data in the database between runs")
                        .action(clap::ArgAction::SetTrue),
                ),
        )
        .subcommand(command!("links").about("Print every location link in the database"))
        .subcommand(command!("flush").about("Remove every record from the database"))
}
