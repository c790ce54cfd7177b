//! Configuration structs for the treefig demo application.
//!
//! A small FTP mirroring tool: a server section, an optional notification
//! section and a log level.
//!
//! | Env var | Flag |
//! |---------|------|
//! | `TREEFIG_DEMO_LOGLEVEL` | `--logLevel` |
//! | `TREEFIG_DEMO_SERVER_FTP_HOST` | `--server.ftp.host` |
//! | `TREEFIG_DEMO_SERVER_FTP_SOURCES` | `--server.ftp.sources` |
//! | `TREEFIG_DEMO_NOTIF_MAIL` | `--notif.mail` |
//! | `TREEFIG_DEMO_NOTIF_WEBHOOK_HEADERS_<NAME>` | `--notif.webhook.headers.<NAME>` |

use std::collections::BTreeMap;
use std::time::Duration;

use treefig::record;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub log_level: String,
    pub server: Server,
    pub notif: Option<Notif>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
            server: Server::default(),
            notif: None,
        }
    }
}

record!(DemoConfig {
    log_level => "Log level (trace, debug, info, warn, error)",
    server => "Servers to mirror from",
    notif => "Notifications sent after each run",
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Server {
    pub ftp: Option<ServerFtp>,
}

record!(Server { ftp });

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFtp {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sources: Vec<String>,
    pub timeout: Duration,
    pub disable_epsv: Option<bool>,
}

impl Default for ServerFtp {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 21,
            username: String::new(),
            password: String::new(),
            sources: Vec::new(),
            timeout: Duration::from_secs(5),
            disable_epsv: Some(false),
        }
    }
}

record!(ServerFtp {
    host => "FTP host",
    port => "FTP port",
    username,
    password,
    sources => "Comma-separated remote directories",
    timeout => "Connection timeout (e.g. 30s, 1m)",
    disable_epsv as "disableEPSV" => "Disable EPSV",
});

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Notif {
    pub mail: Option<Mail>,
    pub webhook: Option<Webhook>,
}

record!(Notif {
    mail [allow_empty] => "Enable mail notifications",
    webhook,
});

#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub host: String,
    pub port: u16,
    pub to: Vec<String>,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 25,
            to: Vec::new(),
        }
    }
}

record!(Mail { host, port, to });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Webhook {
    pub endpoint: String,
    pub headers: BTreeMap<String, String>,
}

record!(Webhook {
    endpoint,
    headers => "Extra HTTP headers",
});
