use clap::{Parser, ValueEnum};
use grl_core::{IdEncoding, ShortenMode, DEFAULT_MIN_LENGTH};
use grl_storage::CollectionPolicy;
use grl_telemetry::{LogFormat, TelemetrySettings};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const PORT_ENV: &str = "PORT";
pub const BIND_ENV: &str = "GRL_BIND";
pub const DB_PATH_ENV: &str = "GRL_DB_PATH";
pub const COLLECTION_ENV: &str = "GRL_COLLECTION";
pub const ID_ENCODING_ENV: &str = "GRL_ID_ENCODING";
pub const MODE_ENV: &str = "GRL_MODE";
pub const MIN_LENGTH_ENV: &str = "GRL_MIN_LENGTH";
pub const STRICT_COLLECTION_ENV: &str = "GRL_STRICT_COLLECTION";
pub const LOG_FORMAT_ENV: &str = "GRL_LOG_FORMAT";
pub const OTLP_ENDPOINT_ENV: &str = "GRL_OTLP_ENDPOINT";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_DB_PATH: &str = "grl.db";
pub const DEFAULT_COLLECTION: &str = "Urls";

pub const SERVICE_NAME: &str = "grl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Replace every long enough URL found in the body.
    #[value(name = "scan")]
    Scan,
    /// Shorten the whole body as one URL.
    #[value(name = "whole-body")]
    WholeBody,
}

impl Display for ModeArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeArg::Scan => write!(f, "scan"),
            ModeArg::WholeBody => write!(f, "whole-body"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "grl", about = "URL shortener for the command line")]
pub struct Config {
    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = BIND_ENV, default_value = DEFAULT_BIND)]
    pub bind: IpAddr,

    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(long, env = COLLECTION_ENV, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// `hex` or `decimal`; lookups only match codes minted with the same encoding.
    #[arg(long, env = ID_ENCODING_ENV, default_value_t = IdEncoding::Hex)]
    pub id_encoding: IdEncoding,

    #[arg(long, env = MODE_ENV, value_enum, default_value_t = ModeArg::Scan)]
    pub mode: ModeArg,

    /// URLs shorter than this are left untouched in scan mode.
    #[arg(long, env = MIN_LENGTH_ENV, default_value_t = DEFAULT_MIN_LENGTH)]
    pub min_length: usize,

    /// Refuse to start if the collection already exists in the store.
    #[arg(long, env = STRICT_COLLECTION_ENV)]
    pub strict_collection: bool,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[arg(long, env = OTLP_ENDPOINT_ENV)]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn encoding(&self) -> IdEncoding {
        self.id_encoding
    }

    pub fn shorten_mode(&self) -> ShortenMode {
        match self.mode {
            ModeArg::Scan => ShortenMode::Scan {
                min_length: self.min_length,
            },
            ModeArg::WholeBody => ShortenMode::WholeBody,
        }
    }

    pub fn collection_policy(&self) -> CollectionPolicy {
        if self.strict_collection {
            CollectionPolicy::MustNotExist
        } else {
            CollectionPolicy::CreateIfMissing
        }
    }

    pub fn telemetry_settings(&self) -> TelemetrySettings {
        let format = match self.log_format {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        };

        TelemetrySettings::builder()
            .service_name(SERVICE_NAME)
            .format(format)
            .otlp_endpoint(self.otlp_endpoint.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ENV: [&str; 10] = [
        PORT_ENV,
        BIND_ENV,
        DB_PATH_ENV,
        COLLECTION_ENV,
        ID_ENCODING_ENV,
        MODE_ENV,
        MIN_LENGTH_ENV,
        STRICT_COLLECTION_ENV,
        LOG_FORMAT_ENV,
        OTLP_ENDPOINT_ENV,
    ];

    /// Parses `args` with none of the config variables set, so the
    /// environment of the test runner cannot leak in.
    fn parse(args: &[&str]) -> Config {
        for name in ALL_ENV {
            std::env::remove_var(name);
        }
        Config::try_parse_from(std::iter::once("grl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = parse(&[]);

        assert_eq!(config.listen_addr().port(), DEFAULT_PORT);
        assert_eq!(config.db_path, PathBuf::from("grl.db"));
        assert_eq!(config.collection, "Urls");
        assert_eq!(config.encoding(), IdEncoding::Hex);
        assert_eq!(
            config.shorten_mode(),
            ShortenMode::Scan {
                min_length: DEFAULT_MIN_LENGTH
            }
        );
        assert_eq!(config.collection_policy(), CollectionPolicy::CreateIfMissing);
    }

    #[test]
    fn explicit_flags() {
        let config = parse(&[
            "--port",
            "9000",
            "--id-encoding",
            "decimal",
            "--mode",
            "whole-body",
            "--strict-collection",
            "--log-format",
            "json",
        ]);

        assert_eq!(config.port, 9000);
        assert_eq!(config.encoding(), IdEncoding::Decimal);
        assert_eq!(config.shorten_mode(), ShortenMode::WholeBody);
        assert_eq!(config.collection_policy(), CollectionPolicy::MustNotExist);
        assert_eq!(config.telemetry_settings().format, LogFormat::Json);
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = Config::try_parse_from(["grl", "--id-encoding", "base58"]).unwrap_err();
        assert!(err.to_string().contains("unknown id encoding 'base58'"));
    }

    #[test]
    fn encoding_names_are_case_insensitive() {
        let config = parse(&["--id-encoding", "DECIMAL"]);
        assert_eq!(config.encoding(), IdEncoding::Decimal);
    }

    #[test]
    fn min_length_applies_to_scan_mode() {
        let config = parse(&["--min-length", "0"]);
        assert_eq!(config.shorten_mode(), ShortenMode::Scan { min_length: 0 });
    }
}
