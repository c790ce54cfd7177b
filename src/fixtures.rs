#[cfg(test)]
pub mod test {
    use std::collections::{BTreeMap, HashMap};
    use std::time::Duration;

    use crate::raw::RawValue;
    use crate::record;

    // -- Server / FTP scenario --------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Config {
        pub log_level: String,
        pub server: Server,
        pub notif: Option<Notif>,
        pub internal: String,
    }

    record!(Config {
        log_level => "Log verbosity",
        server => "Server settings",
        notif,
        internal [ignore],
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
        pub timeout: Duration,
        pub sources: Vec<String>,
        pub ports: Vec<u16>,
        pub disable_epsv: Option<bool>,
    }

    impl Default for ServerFtp {
        fn default() -> Self {
            Self {
                host: String::new(),
                port: 21,
                timeout: Duration::from_secs(5),
                sources: Vec::new(),
                ports: Vec::new(),
                disable_epsv: None,
            }
        }
    }

    record!(ServerFtp {
        host => "FTP server host",
        port => "FTP server port",
        timeout => "Connection timeout",
        sources => "Directories to mirror",
        ports,
        disable_epsv as "disableEPSV" => "Disable EPSV mode",
    });

    // -- Optional sections ------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Notif {
        pub mail: Option<Mail>,
        pub webhook: Option<Webhook>,
    }

    record!(Notif {
        mail [allow_empty] => "Enable mail notifications",
        webhook,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Mail {
        pub from: String,
        pub to: Vec<String>,
    }

    record!(Mail { from, to });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Webhook {
        pub url: String,
    }

    record!(Webhook { url });

    // -- Maps -------------------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Tomato {
        pub name: String,
        pub meta: BTreeMap<String, Potato>,
    }

    record!(Tomato { name, meta });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Potato {
        pub name: String,
        pub weight: u32,
    }

    record!(Potato { name, weight });

    // -- Untyped values ---------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RawMeta {
        pub name: String,
        pub meta: BTreeMap<String, RawValue>,
    }

    record!(RawMeta {
        name,
        meta => "Free-form metadata",
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct NestedRawMeta {
        pub name: String,
        pub meta: BTreeMap<String, BTreeMap<String, RawValue>>,
    }

    record!(NestedRawMeta { name, meta });

    // -- Mixed shapes -----------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Yo {
        pub foo: String,
        pub fii: bool,
        pub fuu: Vec<String>,
        pub yi: Yi,
        pub yu: Vec<Yu>,
    }

    record!(Yo {
        foo => "Foo value",
        fii,
        fuu => "Comma-separated list",
        yi,
        yu,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Yi {
        pub aaa: String,
        pub ccc: HashMap<String, HashMap<String, String>>,
        pub tags: Option<Vec<String>>,
    }

    record!(Yi { aaa, ccc, tags });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Yu {
        pub aaa: String,
        pub bbb: i64,
    }

    record!(Yu { aaa, bbb });

    /// Every field ignored.
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Ignored {
        pub secret: String,
        pub cache: HashMap<String, String>,
    }

    record!(Ignored {
        secret [ignore],
        cache [ignore],
    });

    // -- Flattened fields -------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Base {
        pub foo: String,
        pub fii: bool,
        pub fuu: Vec<String>,
    }

    record!(Base {
        foo => "Foo value",
        fii,
        fuu,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Embedded {
        pub base: Base,
        pub name: String,
    }

    record!(Embedded {
        base [flatten],
        name,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct EmbeddedOpt {
        pub base: Option<Base>,
    }

    record!(EmbeddedOpt { base [flatten] });

    // -- KV sample ----------------------------------------------------------------

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Sample {
        pub field_a: String,
        pub field_b: i64,
        pub field_c: bool,
        pub field_d: Vec<i32>,
        pub field_e: Option<SampleItem>,
        pub field_f: HashMap<String, String>,
        pub field_g: Vec<SampleItem>,
    }

    record!(Sample {
        field_a,
        field_b,
        field_c,
        field_d,
        field_e [allow_empty],
        field_f,
        field_g,
    });

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct SampleItem {
        pub name: String,
    }

    record!(SampleItem { name });

    // -- Custom scalar ------------------------------------------------------------

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub enum Mode {
        #[default]
        Fast,
        Slow,
    }

    impl std::str::FromStr for Mode {
        type Err = String;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            match s.to_ascii_lowercase().as_str() {
                "fast" => Ok(Mode::Fast),
                "slow" => Ok(Mode::Slow),
                other => Err(format!("unknown mode '{other}'")),
            }
        }
    }

    impl std::fmt::Display for Mode {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(match self {
                Mode::Fast => "fast",
                Mode::Slow => "slow",
            })
        }
    }

    crate::scalar!(Mode);

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct ModeConfig {
        pub mode: Mode,
        pub modes: Vec<Mode>,
    }

    record!(ModeConfig { mode, modes });

    #[test]
    fn record_names_follow_declarations() {
        use crate::shape::RecordValue;

        let names: Vec<_> = ServerFtp::default()
            .fields()
            .iter()
            .map(|f| f.config_name().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["host", "port", "timeout", "sources", "ports", "disableEPSV"]
        );
    }

    #[test]
    fn custom_scalar_parses() {
        use crate::shape::ScalarValue;

        let mut mode = Mode::default();
        mode.set_str("SLOW").unwrap();
        assert_eq!(mode, Mode::Slow);
        assert_eq!(mode.render(), "slow");
        assert!(mode.set_str("medium").is_err());
    }
}
