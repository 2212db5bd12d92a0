//! The memctx executable manages saved memcached contexts and looks up keys on them.
//!
//! `memctx [--config PATH] list`
//!
//!     Print the saved contexts, one per line, as `INDEX: NAME (HOST:PORT)`.
//!
//! `memctx add <NAME> <HOST> [PORT]` / `memctx edit <INDEX> <NAME> <HOST> [PORT]` / `memctx rm <INDEX>`
//!
//!     Change the saved contexts. PORT defaults to 11211.
//!
//! `memctx get <INDEX> <KEY> [--timeout SECS]`
//!
//!     Connect to the context at INDEX and print the value of KEY, or "Key not found".
//!
//! `memctx shell [--timeout SECS]`
//!
//!     Start an interactive prompt. Type `help` for its commands.
//!
//! The contexts are kept in `contexts.json` in the current directory unless `--config` is given.
//! Errors are printed to stderr and the process exits with a non-zero status.

use std::io::{self, BufRead, Write};
use std::process::exit;
use std::time::Duration;

use clap::{crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use memctx::{
    ClientOptions, Console, ContextInput, ContextRegistry, LoadError, Lookup, MemcachedSession,
    MemctxError, RemoteClient, Result, SessionState,
};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_CONFIG_FILE: &str = "contexts.json";
const DEFAULT_TIMEOUT_SECS: &str = "3";

const SHELL_HELP: &str = "\
commands:
  list                              show saved contexts
  use <INDEX>                       select a context
  connect                           connect to (or disconnect from) the selected context
  disconnect                        close the connection
  get <KEY>                         retrieve a key
  add <NAME> <HOST> [PORT]          save a new context
  edit <INDEX> <NAME> <HOST> [PORT] replace a context
  rm <INDEX>                        delete a context
  log                               show the protocol transcript
  help                              show this help
  quit                              leave the shell";

fn main() {
    let timeout_arg = Arg::with_name("timeout")
        .long("timeout")
        .value_name("SECS")
        .help("connect and read/write timeout for memcached requests")
        .default_value(DEFAULT_TIMEOUT_SECS);

    let matches = App::new("memctx")
        .version(crate_version!())
        .author("strohs <strohs1@gmail.com>")
        .about("manage memcached contexts and look up keys")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("config")
            .long("config")
            .value_name("PATH")
            .help("the file that stores the contexts")
            .default_value(DEFAULT_CONFIG_FILE))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .help("log more, repeat for more detail"))
        .subcommands(vec![
            SubCommand::with_name("list")
                .about("List the saved contexts"),
            SubCommand::with_name("add")
                .about("Save a new context")
                .arg(Arg::with_name("NAME").required(true).index(1))
                .arg(Arg::with_name("HOST").required(true).index(2))
                .arg(Arg::with_name("PORT").index(3)),
            SubCommand::with_name("edit")
                .about("Replace the context at an index")
                .arg(Arg::with_name("INDEX").required(true).index(1))
                .arg(Arg::with_name("NAME").required(true).index(2))
                .arg(Arg::with_name("HOST").required(true).index(3))
                .arg(Arg::with_name("PORT").index(4)),
            SubCommand::with_name("rm")
                .about("Delete the context at an index")
                .arg(Arg::with_name("INDEX").required(true).index(1)),
            SubCommand::with_name("get")
                .about("Get the value of a key from a context")
                .arg(Arg::with_name("INDEX").required(true).index(1))
                .arg(Arg::with_name("KEY").required(true).index(2))
                .arg(timeout_arg.clone()),
            SubCommand::with_name("shell")
                .about("Start an interactive prompt")
                .arg(timeout_arg),
        ])
        .get_matches();

    subscriber_config(matches.occurrences_of("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<()> {
    let config = matches.value_of("config").unwrap_or(DEFAULT_CONFIG_FILE);

    match matches.subcommand() {
        ("list", Some(_)) => {
            let registry = ContextRegistry::open(config)?;
            print_contexts(&registry, &mut io::stdout())?;
        }
        ("add", Some(args)) => {
            let mut registry = ContextRegistry::open(config)?;
            registry.add(&context_input(args))?;
            registry.save()?;
        }
        ("edit", Some(args)) => {
            let mut registry = ContextRegistry::open(config)?;
            let index = parse_index(args.value_of("INDEX").unwrap_or_default())?;
            registry.edit(index, &context_input(args))?;
            registry.save()?;
        }
        ("rm", Some(args)) => {
            let mut registry = ContextRegistry::open(config)?;
            let index = parse_index(args.value_of("INDEX").unwrap_or_default())?;
            registry.remove(index)?;
            registry.save()?;
        }
        ("get", Some(args)) => {
            let registry = ContextRegistry::open(config)?;
            let index = parse_index(args.value_of("INDEX").unwrap_or_default())?;
            let record = registry.get(index)?;
            let mut session = MemcachedSession::new(RemoteClient::new(client_options(args)?));
            session.connect(record.host(), record.port())?;
            let lookup = session.get(args.value_of("KEY").unwrap_or_default());
            session.close();
            print_lookup(&lookup?);
        }
        ("shell", Some(args)) => {
            let registry = load_or_warn(config);
            let session = MemcachedSession::new(RemoteClient::new(client_options(args)?));
            let mut console = Console::new(registry, session);
            let stdin = io::stdin();
            let result = shell(&mut console, stdin.lock(), &mut io::stdout());
            console.close();
            result?;
        }
        _ => return Err(MemctxError::Parsing("unknown command received".to_string())),
    }
    Ok(())
}

/// loads the registry for the shell. A corrupt file is reported and the shell starts empty.
fn load_or_warn(config: &str) -> ContextRegistry {
    let mut registry = ContextRegistry::new(config);
    match registry.load() {
        Ok(()) => {}
        Err(LoadError::Parse(msg)) => {
            warn!("ignoring invalid context file {}: {}", config, msg);
            eprintln!("warning: could not load {}: {}", config, msg);
        }
        Err(e) => {
            warn!("ignoring unreadable context file {}: {}", config, e);
            eprintln!("warning: {}", e);
        }
    }
    registry
}

/// runs the interactive prompt until `quit` or end of input
fn shell<C, R, W>(console: &mut Console<C>, input: R, out: &mut W) -> Result<()>
where
    C: memctx::CacheClient,
    R: BufRead,
    W: Write,
{
    write!(out, "> ")?;
    out.flush()?;
    for line in input.lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => {}
            ["quit"] | ["exit"] => break,
            words => {
                if let Err(e) = shell_command(console, words, out) {
                    writeln!(out, "error: {}", e)?;
                }
            }
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    writeln!(out)?;
    Ok(())
}

/// executes one shell command. Errors are reported to the user by the caller.
fn shell_command<C, W>(console: &mut Console<C>, words: &[&str], out: &mut W) -> Result<()>
where
    C: memctx::CacheClient,
    W: Write,
{
    match words {
        ["help"] => writeln!(out, "{}", SHELL_HELP)?,
        ["list"] => print_contexts(console.registry(), out)?,
        ["use", index] => {
            let record = console.select(parse_index(index)?)?;
            writeln!(out, "selected {}", record)?;
        }
        ["connect"] => match console.connect()? {
            SessionState::Connected => {
                let endpoint = console.session().endpoint().map(|e| e.to_string());
                writeln!(out, "connected to {}", endpoint.unwrap_or_default())?;
            }
            SessionState::Disconnected => writeln!(out, "disconnected")?,
        },
        ["disconnect"] => {
            console.disconnect();
            writeln!(out, "disconnected")?;
        }
        ["get", key] => print_lookup_to(&console.retrieve(key)?, out)?,
        ["add", name, host] => console.add(&ContextInput::with_default_port(*name, *host))?,
        ["add", name, host, port] => console.add(&ContextInput::new(*name, *host, port))?,
        ["edit", index, name, host] => {
            console.edit(parse_index(index)?, &ContextInput::with_default_port(*name, *host))?
        }
        ["edit", index, name, host, port] => {
            console.edit(parse_index(index)?, &ContextInput::new(*name, *host, port))?
        }
        ["rm", index] => {
            let removed = console.remove(parse_index(index)?)?;
            writeln!(out, "removed {}", removed)?;
        }
        ["log"] => {
            for line in console.transcript() {
                writeln!(out, "{}", line)?;
            }
        }
        _ => writeln!(out, "unknown command, type `help` for a list")?,
    }
    Ok(())
}

fn context_input(args: &ArgMatches) -> ContextInput {
    ContextInput::new(
        args.value_of("NAME").unwrap_or_default(),
        args.value_of("HOST").unwrap_or_default(),
        args.value_of("PORT").unwrap_or_default(),
    )
}

/// parses the `--timeout` value of a subcommand into [`ClientOptions`]
fn client_options(args: &ArgMatches) -> Result<ClientOptions> {
    let raw = args.value_of("timeout").unwrap_or(DEFAULT_TIMEOUT_SECS);
    let secs: f64 = raw
        .parse()
        .ok()
        .filter(|s: &f64| s.is_finite() && *s > 0.0)
        .ok_or_else(|| MemctxError::Parsing(format!("could not parse {} into a timeout in seconds", raw)))?;
    Ok(ClientOptions {
        timeout: Duration::from_secs_f64(secs),
    })
}

fn parse_index(raw: &str) -> Result<usize> {
    raw.parse()
        .map_err(|_| MemctxError::Parsing(format!("could not parse {} into a context index", raw)))
}

fn print_contexts<W: Write>(registry: &ContextRegistry, out: &mut W) -> Result<()> {
    if registry.is_empty() {
        writeln!(out, "no contexts")?;
    }
    for (index, record) in registry.list().iter().enumerate() {
        writeln!(out, "{}: {}", index, record)?;
    }
    Ok(())
}

fn print_lookup(lookup: &Lookup) {
    match lookup.as_text() {
        Some(value) => println!("{}", value),
        None => println!("Key not found"),
    }
}

fn print_lookup_to<W: Write>(lookup: &Lookup, out: &mut W) -> Result<()> {
    match lookup.as_text() {
        Some(value) => writeln!(out, "{}", value)?,
        None => writeln!(out, "Key not found")?,
    }
    Ok(())
}

/// configures a tracing subscriber that will log to STDERR
fn subscriber_config(verbosity: u64) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        // log to stderr instead of stdout
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not set the tracing subscriber: {}", e);
    }
}
