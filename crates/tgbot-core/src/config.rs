use std::{
    collections::HashMap,
    env, fs,
    io::ErrorKind,
    path::Path,
    sync::OnceLock,
    time::Duration,
};

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{errors::Error, Result};

pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Bot client configuration.
///
/// Immutable once built; the client takes ownership of it.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub token: SecretString,
    /// Per-request timeout. `None` keeps the HTTP transport's default.
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn new(api_url: &str, token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        validate_token(&token)?;
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            token: SecretString::from(token),
            request_timeout: None,
        })
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load from the process environment, falling back to `.env` in the
    /// working directory for variables that are not set.
    ///
    /// The process environment is only read, never written.
    pub fn load() -> Result<Self> {
        let dotenv = read_dotenv(Path::new(".env"))?;
        Self::from_vars(|key| env::var(key).ok().or_else(|| dotenv.get(key).cloned()))
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let token = set("TELEGRAM_BOT_TOKEN").ok_or_else(|| {
            Error::Config("TELEGRAM_BOT_TOKEN environment variable is required".to_string())
        })?;
        let api_url = set("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut cfg = Self::new(&api_url, token.trim())?;
        if let Some(raw) = set("TELEGRAM_REQUEST_TIMEOUT_MS") {
            let ms = raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("TELEGRAM_REQUEST_TIMEOUT_MS is not a number: {raw}"))
            })?;
            cfg.request_timeout = Some(Duration::from_millis(ms));
        }
        Ok(cfg)
    }

    /// Full endpoint for an API method: `<api_url>/bot<token>/<method>`.
    ///
    /// Accepts the method with or without a leading `/`. The returned URL
    /// contains the token; keep it out of logs.
    pub fn method_url(&self, method: &str) -> Result<Url> {
        let method = method.trim_start_matches('/');
        if method.is_empty() {
            return Err(Error::Request("empty method name".to_string()));
        }
        let mut url = self.api_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!(
            "{base}/bot{}/{method}",
            self.token.expose_secret()
        ));
        Ok(url)
    }
}

fn validate_token(token: &str) -> Result<()> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN_RE.get_or_init(|| Regex::new(r"^[0-9]+:[A-Za-z0-9_-]+$").expect("valid regex"));
    if re.is_match(token) {
        Ok(())
    } else {
        Err(Error::Config(
            "bot token must look like `<bot id>:<secret>`".to_string(),
        ))
    }
}

fn parse_api_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid api url {raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "api url must be http or https, got {other}"
        ))),
    }
}

/// Parse a `KEY=value` file. A missing file is an empty set; any other read
/// failure is an error.
fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => return Err(Error::Io(e)),
    };

    let mut vars = HashMap::new();
    for line in contents.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, val)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }
        vars.insert(key.to_string(), unquote(val.trim()).to_string());
    }
    Ok(vars)
}

fn unquote(val: &str) -> &str {
    for q in ['"', '\''] {
        if val.len() >= 2 && val.starts_with(q) && val.ends_with(q) {
            return &val[1..val.len() - 1];
        }
    }
    val
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "123456:TEST-token_x";

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn builds_method_urls() {
        let cfg = Config::new(DEFAULT_API_URL, TOKEN).unwrap();
        assert_eq!(
            cfg.method_url("/getMe").unwrap().as_str(),
            "https://api.telegram.org/bot123456:TEST-token_x/getMe"
        );
        assert_eq!(
            cfg.method_url("sendMessage").unwrap().as_str(),
            "https://api.telegram.org/bot123456:TEST-token_x/sendMessage"
        );
    }

    #[test]
    fn keeps_base_path_of_api_url() {
        let cfg = Config::new("http://127.0.0.1:8081/proxy/", TOKEN).unwrap();
        assert_eq!(
            cfg.method_url("getUpdates").unwrap().as_str(),
            "http://127.0.0.1:8081/proxy/bot123456:TEST-token_x/getUpdates"
        );
    }

    #[test]
    fn rejects_empty_method() {
        let cfg = Config::new(DEFAULT_API_URL, TOKEN).unwrap();
        assert!(matches!(cfg.method_url("/"), Err(Error::Request(_))));
    }

    #[test]
    fn rejects_bad_token_and_url() {
        assert!(matches!(
            Config::new(DEFAULT_API_URL, "not a token"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::new("ftp://api.telegram.org", TOKEN),
            Err(Error::Config(_))
        ));
        assert!(matches!(Config::new("::", TOKEN), Err(Error::Config(_))));
    }

    #[test]
    fn debug_hides_token() {
        let cfg = Config::new(DEFAULT_API_URL, TOKEN).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains(TOKEN), "{dbg}");
        assert!(!dbg.contains("TEST-token_x"), "{dbg}");
    }

    #[test]
    fn timeout_is_unset_by_default() {
        let cfg = Config::new(DEFAULT_API_URL, TOKEN).unwrap();
        assert!(cfg.request_timeout.is_none());
        let cfg = cfg.with_request_timeout(Duration::from_secs(5));
        assert_eq!(cfg.request_timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn loads_defaults_from_vars() {
        let cfg = Config::from_vars(vars(&[("TELEGRAM_BOT_TOKEN", TOKEN)])).unwrap();
        assert_eq!(cfg.api_url.as_str(), "https://api.telegram.org/");
        assert_eq!(cfg.token.expose_secret(), TOKEN);
        assert!(cfg.request_timeout.is_none());
    }

    #[test]
    fn missing_or_blank_token_is_config_error() {
        assert!(matches!(
            Config::from_vars(vars(&[])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_vars(vars(&[("TELEGRAM_BOT_TOKEN", "  ")])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn parses_request_timeout_and_api_url() {
        let cfg = Config::from_vars(vars(&[
            ("TELEGRAM_BOT_TOKEN", TOKEN),
            ("TELEGRAM_API_URL", "http://localhost:8081"),
            ("TELEGRAM_REQUEST_TIMEOUT_MS", "2500"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://localhost:8081/");
        assert_eq!(cfg.request_timeout, Some(Duration::from_millis(2500)));

        let err = Config::from_vars(vars(&[
            ("TELEGRAM_BOT_TOKEN", TOKEN),
            ("TELEGRAM_REQUEST_TIMEOUT_MS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("soon")), "{err:?}");
    }

    #[test]
    fn reads_dotenv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "# comment\nTELEGRAM_BOT_TOKEN=\"123456:from-file\"\nexport TELEGRAM_API_URL='http://file.test'\nnot a pair\n",
        )
        .unwrap();

        let vars = read_dotenv(&path).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["TELEGRAM_BOT_TOKEN"], "123456:from-file");
        assert_eq!(vars["TELEGRAM_API_URL"], "http://file.test");
    }

    #[test]
    fn dotenv_never_overrides_set_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(
            &path,
            "TELEGRAM_BOT_TOKEN=111:from-file\nTELEGRAM_REQUEST_TIMEOUT_MS=100\n",
        )
        .unwrap();
        let dotenv = read_dotenv(&path).unwrap();
        let process = vars(&[("TELEGRAM_BOT_TOKEN", TOKEN)]);

        // Same lookup order as `Config::load`.
        let cfg =
            Config::from_vars(|key| process(key).or_else(|| dotenv.get(key).cloned())).unwrap();
        assert_eq!(cfg.token.expose_secret(), TOKEN);
        assert_eq!(cfg.request_timeout, Some(Duration::from_millis(100)));
    }

    #[test]
    fn missing_dotenv_is_empty_but_unreadable_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_dotenv(&dir.path().join("absent.env")).unwrap().is_empty());

        // A directory cannot be read as a file.
        assert!(matches!(read_dotenv(dir.path()), Err(Error::Io(_))));
    }
}
