pub mod logging;
pub mod site;

use crate::clinic::DEFAULT_API_URL;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_API_URL: &str = "api-url";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("wellfare")
        .about("TF Wellfare web front")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("WELLFARE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_API_URL)
                .short('a')
                .long(ARG_API_URL)
                .help("Clinic backend API base URL")
                .long_help(
                    "Clinic backend API base URL. Credentials, token checks and bookings are forwarded to it.",
                )
                .env("WELLFARE_API_URL")
                .default_value(DEFAULT_API_URL),
        );

    let command = site::with_args(command);
    logging::with_args(command)
}
