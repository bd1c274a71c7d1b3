use crate::transport::TransportOptions;
use clap::{Arg, ArgAction, ArgMatches, Command};

/// Adds the HTTP transport flags to a subcommand.
pub fn augment_command(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("http_header")
            .long("header")
            .help_heading("HTTP")
            .help("Extra HTTP header (repeatable), e.g. --header 'X-Request-Source: cli'")
            .action(ArgAction::Append)
            .num_args(1),
    )
    .arg(
        Arg::new("http_user_agent")
            .long("user-agent")
            .help_heading("HTTP")
            .help("HTTP User-Agent")
            .num_args(1),
    )
    .arg(
        Arg::new("http_timeout_secs")
            .long("timeout-secs")
            .help_heading("HTTP")
            .help("Request timeout in seconds (default: none)")
            .num_args(1),
    )
}

pub fn apply_matches(matches: &ArgMatches, opts: &mut TransportOptions) -> anyhow::Result<()> {
    if let Some(ua) = matches.get_one::<String>("http_user_agent") {
        opts.user_agent = ua.clone();
    }
    if let Some(s) = matches.get_one::<String>("http_timeout_secs") {
        opts.timeout_secs = Some(s.parse()?);
    }

    if let Some(values) = matches.get_many::<String>("http_header") {
        for h in values {
            let (k, v) = h
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("invalid header format: {}", h))?;
            opts.headers.insert(k.trim().to_string(), v.trim().to_string());
        }
    }

    Ok(())
}
