use clap::{App, Arg, ArgMatches};
use etaapi::EtaClient;
use std::process::exit;

mod config;
mod get;
mod list;
mod parser;

/// Connects using the --host/--show-io/--timeout flags, falling back to the
/// environment and ~/.etactrl.
pub(crate) fn connect(args: &ArgMatches) -> anyhow::Result<EtaClient> {
    let env = config::EnvConfig::new().unwrap_or_else(|err| {
        log::warn!("cannot read config: {}", err);
        config::EnvConfig::default()
    });
    let settings =
        config::Settings::resolve(args.value_of("host"), args.is_present("show-io"), env)?;

    let mut builder =
        EtaClient::builder(&settings.host).hide_io_variables(settings.hide_io_variables);
    if let Some(timeout) = args.value_of("timeout").and_then(parser::parse_timeout) {
        builder = builder.timeout(timeout);
    }
    Ok(builder.connect()?)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let host = Arg::with_name("host")
        .long("host")
        .short("H")
        .takes_value(true)
        .help("DNS name or ip of the heating system. Defaults to $ETA_HOST.");

    let show_io = Arg::with_name("show-io")
        .long("show-io")
        .help("Include the I/O interface variables.");

    let timeout = Arg::with_name("timeout")
        .long("timeout")
        .takes_value(true)
        .validator(parser::valid_timeout)
        .help("Timeout of each request, e.g. 10s");

    let json = Arg::with_name("json").long("json").help("Print as JSON.");

    let mut app = App::new(env!("CARGO_PKG_NAME"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .subcommand(
            App::new("nodes")
                .about("Lists the top level nodes (the tabs of the ETAtouch display).")
                .arg(host.clone())
                .arg(timeout.clone()),
        )
        .subcommand(
            App::new("tree")
                .about("Prints the menu tree.")
                .arg(host.clone())
                .arg(show_io.clone())
                .arg(timeout.clone())
                .arg(json.clone())
                .arg(Arg::with_name("node")
                     .long("node")
                     .takes_value(true)
                     .help("Only print the tree of this top level node.")),
        )
        .subcommand(
            App::new("get")
                .about("Updates and prints a variable or all variables below a node.")
                .arg(host)
                .arg(show_io)
                .arg(timeout)
                .arg(json)
                .arg(Arg::with_name("path")
                     .required(true)
                     .index(1)
                     .validator(parser::valid_path)
                     .help("Slash separated names, e.g. \"Kessel/Zählerstände\""))
                .arg(Arg::with_name("types")
                     .long("types")
                     .takes_value(true)
                     .validator(parser::valid_types)
                     .help("Comma separated list of the variable types to show. Possible values: default, text, timeslot")),
        );

    let args = app.clone().get_matches();

    let result = match args.subcommand() {
        ("nodes", Some(args)) => list::nodes(args),
        ("tree", Some(args)) => list::tree(args),
        ("get", Some(args)) => get::get(args),
        _ => {
            app.print_help().ok();
            println!();
            exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {:#}", err);
        exit(2);
    }
}
