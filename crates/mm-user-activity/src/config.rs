use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mattermost_ox::{PER_PAGE_MAXIMUM, UserSort};
use strum::Display;
use url::Url;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Scheme {
    Http,
    #[default]
    Https,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortField {
    #[value(name = "create_at")]
    CreateAt,
    #[default]
    #[value(name = "last_activity_at")]
    LastActivityAt,
}

impl From<SortField> for UserSort {
    fn from(field: SortField) -> Self {
        match field {
            SortField::CreateAt => UserSort::CreateAt,
            SortField::LastActivityAt => UserSort::LastActivityAt,
        }
    }
}

/// Raw command line, before any file system checks.
#[derive(Debug, Parser)]
#[command(name = "mm-user-activity", version)]
#[command(about = "Export Mattermost user accounts and their last activity to a text file")]
pub struct Args {
    /// Host name of the Mattermost server, without scheme or path
    #[arg(long)]
    pub siteurl: String,

    #[arg(long, default_value_t = 443)]
    pub port: u16,

    #[arg(long, value_enum, default_value_t = Scheme::Https)]
    pub scheme: Scheme,

    /// File to write the report to; must not exist yet
    #[arg(long)]
    pub outfile: PathBuf,

    /// File whose first line is a personal access token of a system admin
    #[arg(long)]
    pub tokenfile: PathBuf,

    /// URL-friendly team name to restrict the export to
    #[arg(long)]
    pub team: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub pagesize: u32,

    /// Maximum number of users to export; defaults to all of them
    #[arg(long = "num_users")]
    pub num_users: Option<u64>,

    /// Sort order of team-scoped listings
    #[arg(long, value_enum, default_value = "last_activity_at")]
    pub sort: SortField,

    /// Text written for fields the server did not return
    #[arg(long, default_value = "null")]
    pub null_marker: String,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub site_url: String,
    pub port: u16,
    pub scheme: Scheme,
    pub token_file: PathBuf,
    pub out_file: PathBuf,
    pub team: Option<String>,
    pub page_size: u32,
    pub num_users: Option<u64>,
    pub sort: UserSort,
    pub null_marker: String,
    pub log_level: String,
}

impl Config {
    /// Parse and validate a full command line (program name first).
    pub fn parse_from<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = Args::try_parse_from(args)?;
        Self::from_args(args)
    }

    /// Validate parsed arguments. Checks only; no file is opened here.
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        if args.port == 0 {
            return Err(ConfigError::InvalidPort(args.port));
        }
        let site_url = validate_site_url(&args.siteurl, args.scheme, args.port)?;

        if !args.tokenfile.exists() {
            return Err(ConfigError::TokenFileMissing(args.tokenfile));
        }
        if !args.tokenfile.is_file() {
            return Err(ConfigError::TokenFileNotAFile(args.tokenfile));
        }

        if args.outfile.exists() {
            return Err(ConfigError::OutputExists(args.outfile));
        }

        if args.pagesize == 0 {
            return Err(ConfigError::InvalidPageSize(args.pagesize));
        }
        if args.pagesize > PER_PAGE_MAXIMUM {
            return Err(ConfigError::PageSizeTooLarge {
                size: args.pagesize,
                max: PER_PAGE_MAXIMUM,
            });
        }
        if args.num_users == Some(0) {
            return Err(ConfigError::InvalidUserCap(0));
        }

        let team = args
            .team
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(ref slug) = team {
            if !is_team_slug(slug) {
                return Err(ConfigError::InvalidTeamName(slug.clone()));
            }
        }

        Ok(Self {
            site_url,
            port: args.port,
            scheme: args.scheme,
            token_file: args.tokenfile,
            out_file: args.outfile,
            team,
            page_size: args.pagesize,
            num_users: args.num_users,
            sort: args.sort.into(),
            null_marker: args.null_marker,
            log_level: args.log_level,
        })
    }

    /// `{scheme}://{siteurl}:{port}`
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.site_url, self.port)
    }
}

fn validate_site_url(siteurl: &str, scheme: Scheme, port: u16) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidSiteUrl {
        siteurl: siteurl.to_string(),
        reason: reason.to_string(),
    };

    let host = siteurl.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if host.contains("://") {
        return Err(invalid("give the host name only, use --scheme for the scheme"));
    }
    if host.contains('/') {
        return Err(invalid("must not contain a path"));
    }

    let url = Url::parse(&format!("{scheme}://{host}:{port}"))
        .map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().is_none() {
        return Err(invalid("no host name"));
    }

    Ok(host.to_string())
}

/// Team names end up as a URL path segment, so only slug characters pass.
fn is_team_slug(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// File handles acquired after validation and before any network call.
/// Both are closed when the value is dropped.
pub struct Resources {
    pub token: String,
    pub output: File,
}

impl Resources {
    pub fn acquire(config: &Config) -> Result<Self, ConfigError> {
        let token = read_token(config)?;

        let output = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&config.out_file)
            .map_err(|source| match source.kind() {
                ErrorKind::AlreadyExists => ConfigError::OutputExists(config.out_file.clone()),
                _ => ConfigError::OutputUnwritable {
                    path: config.out_file.clone(),
                    source,
                },
            })?;

        Ok(Self { token, output })
    }
}

fn read_token(config: &Config) -> Result<String, ConfigError> {
    let unreadable = |source| ConfigError::TokenFileUnreadable {
        path: config.token_file.clone(),
        source,
    };

    let file = File::open(&config.token_file).map_err(unreadable)?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(unreadable)?;

    let token = first_line.trim();
    if token.is_empty() {
        return Err(ConfigError::EmptyToken(config.token_file.clone()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
        token: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let token = dir.path().join("token.txt");
            let mut file = File::create(&token).expect("token file");
            writeln!(file, "  abc123  ").expect("write token");
            writeln!(file, "ignored second line").expect("write token");
            Self { dir, token }
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("users.csv")
        }

        fn args(&self, extra: &[&str]) -> Vec<String> {
            let mut args = vec![
                "mm-user-activity".to_string(),
                "--siteurl".to_string(),
                "chat.example.com".to_string(),
                "--tokenfile".to_string(),
                self.token.display().to_string(),
                "--outfile".to_string(),
                self.out().display().to_string(),
            ];
            args.extend(extra.iter().map(ToString::to_string));
            args
        }
    }

    #[test]
    fn defaults() {
        let fx = Fixture::new();
        let config = Config::parse_from(fx.args(&[])).expect("valid config");

        assert_eq!(config.port, 443);
        assert_eq!(config.scheme, Scheme::Https);
        assert_eq!(config.page_size, 100);
        assert_eq!(config.num_users, None);
        assert_eq!(config.sort, UserSort::LastActivityAt);
        assert_eq!(config.team, None);
        assert_eq!(config.null_marker, "null");
        assert_eq!(config.base_url(), "https://chat.example.com:443");
    }

    #[test]
    fn all_flags() {
        let fx = Fixture::new();
        let config = Config::parse_from(fx.args(&[
            "--port",
            "8065",
            "--scheme",
            "http",
            "--team",
            "engineering",
            "--pagesize",
            "50",
            "--num_users",
            "120",
            "--sort",
            "create_at",
        ]))
        .expect("valid config");

        assert_eq!(config.base_url(), "http://chat.example.com:8065");
        assert_eq!(config.team.as_deref(), Some("engineering"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.num_users, Some(120));
        assert_eq!(config.sort, UserSort::CreateAt);
    }

    #[test]
    fn missing_required_flag_is_argument_error() {
        let err = Config::parse_from(["mm-user-activity", "--siteurl", "x"]).unwrap_err();
        assert!(matches!(err, ConfigError::Args(_)));
    }

    #[test]
    fn unknown_sort_is_argument_error() {
        let fx = Fixture::new();
        let err = Config::parse_from(fx.args(&["--sort", "username"])).unwrap_err();
        assert!(matches!(err, ConfigError::Args(_)));
    }

    #[test]
    fn existing_outfile_is_refused() {
        let fx = Fixture::new();
        File::create(fx.out()).expect("pre-existing output");

        let err = Config::parse_from(fx.args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::OutputExists(ref p) if *p == fx.out()));
    }

    #[test]
    fn missing_tokenfile_is_refused() {
        let fx = Fixture::new();
        std::fs::remove_file(&fx.token).expect("remove token");

        let err = Config::parse_from(fx.args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::TokenFileMissing(_)));
    }

    #[test]
    fn tokenfile_directory_is_refused() {
        let fx = Fixture::new();
        let mut args = fx.args(&[]);
        args[4] = fx.dir.path().display().to_string();

        let err = Config::parse_from(args).unwrap_err();
        assert!(matches!(err, ConfigError::TokenFileNotAFile(_)));
    }

    #[test]
    fn zero_pagesize_and_cap_are_refused() {
        let fx = Fixture::new();
        let err = Config::parse_from(fx.args(&["--pagesize", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPageSize(0)));

        let err = Config::parse_from(fx.args(&["--num_users", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUserCap(0)));
    }

    #[test]
    fn pagesize_is_capped_at_server_maximum() {
        let fx = Fixture::new();
        let config = Config::parse_from(fx.args(&["--pagesize", "200"])).expect("200 is allowed");
        assert_eq!(config.page_size, PER_PAGE_MAXIMUM);

        let err = Config::parse_from(fx.args(&["--pagesize", "201"])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PageSizeTooLarge {
                size: 201,
                max: 200
            }
        ));
    }

    #[test]
    fn team_must_be_a_slug() {
        let fx = Fixture::new();
        for bad in ["eng/../users", "eng?x=1", "eng#frag", "eng team"] {
            let err = Config::parse_from(fx.args(&["--team", bad])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTeamName(_)), "{bad}");
        }

        let config =
            Config::parse_from(fx.args(&["--team", " dev-ops_2 "])).expect("slug is allowed");
        assert_eq!(config.team.as_deref(), Some("dev-ops_2"));
    }

    #[test]
    fn siteurl_with_scheme_or_path_is_refused() {
        let fx = Fixture::new();
        let mut args = fx.args(&[]);
        args[2] = "https://chat.example.com".to_string();
        assert!(matches!(
            Config::parse_from(args.clone()).unwrap_err(),
            ConfigError::InvalidSiteUrl { .. }
        ));

        args[2] = "chat.example.com/mattermost".to_string();
        assert!(matches!(
            Config::parse_from(args).unwrap_err(),
            ConfigError::InvalidSiteUrl { .. }
        ));
    }

    #[test]
    fn port_zero_is_refused() {
        let fx = Fixture::new();
        let err = Config::parse_from(fx.args(&["--port", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort(0)));
    }

    #[test]
    fn acquire_reads_trimmed_first_line_and_creates_output() {
        let fx = Fixture::new();
        let config = Config::parse_from(fx.args(&[])).expect("valid config");

        let resources = Resources::acquire(&config).expect("resources");
        assert_eq!(resources.token, "abc123");
        assert!(fx.out().exists());
    }

    #[test]
    fn acquire_refuses_output_created_after_validation() {
        let fx = Fixture::new();
        let config = Config::parse_from(fx.args(&[])).expect("valid config");
        File::create(fx.out()).expect("late output");

        let err = Resources::acquire(&config).err().expect("must fail");
        assert!(matches!(err, ConfigError::OutputExists(_)));
    }

    #[test]
    fn acquire_rejects_blank_token() {
        let fx = Fixture::new();
        std::fs::write(&fx.token, "   \nsecond\n").expect("rewrite token");
        let config = Config::parse_from(fx.args(&[])).expect("valid config");

        let err = Resources::acquire(&config).err().expect("must fail");
        assert!(matches!(err, ConfigError::EmptyToken(_)));
    }
}
