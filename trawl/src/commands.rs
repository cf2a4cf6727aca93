use clap::{arg, value_parser};

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);

pub fn command_argument_builder() -> clap::Command {
    clap::Command::new("trawl")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("trawl")
        .about(
            "Breadth-first crawl from a seed URL over TLS, listing every page reached and its \
            link depth.",
        )
        .styles(CLAP_STYLING)
        .arg(arg!(<URL>).help("Absolute URL to start crawling from"))
        .arg(
            arg!(<MAX_DEPTH>)
                .help("Maximum number of link hops from the seed to follow")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            arg!(--"timeout" <SECONDS>)
                .required(false)
                .help("Connect and read timeout in seconds")
                .value_parser(value_parser!(u64).range(1..))
                .default_value("5"),
        )
        .arg(
            arg!(--"lenient-status")
                .required(false)
                .help("Accept any HTTP 200 status line, not only \"HTTP/1.1 200 OK\"")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            arg!(-f --"format" <FORMAT>)
                .required(false)
                .help("Report format: text, json")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(arg!(-q --"quiet" "Suppress progress output, print only the report").required(false))
}
