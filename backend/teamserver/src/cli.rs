use clap::Parser;
use std::net::SocketAddr;

/// Team server: operator API front door
#[derive(Parser)]
#[command(name = "teamserver", version, about)]
pub struct Cli {
    /// Operator password. Every token this process issues is derived from it.
    #[arg(value_name = "PASSWORD", env = "TEAMSERVER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Listen address, overriding TEAMSERVER_HOST and TEAMSERVER_PORT
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,
}
