//! Loads the site configuration (`_config.yml`) and the environment-supplied
//! settings for each pipeline step. Environment lookups happen only here;
//! everything downstream receives explicit values.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::announce::{Composer, DEFAULT_HEADLINE};
use crate::oauth::Credentials;

/// The site configuration file, relative to the repository root.
pub const DEFAULT_CONFIG_FILE: &str = "_config.yml";

pub const ENV_API_KEY: &str = "TWITTER_API_KEY";
pub const ENV_API_KEY_SECRET: &str = "TWITTER_API_KEY_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "TWITTER_ACCESS_TOKEN";
pub const ENV_ACCESS_TOKEN_SECRET: &str = "TWITTER_ACCESS_TOKEN_SECRET";
pub const ENV_TWEET_TEXT: &str = "TWEET_TEXT";
pub const ENV_LATEST_POST_FILE: &str = "LATEST_POST_FILE";
pub const ENV_GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Which URL the announcement links to.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Permalink {
    /// `{base}/posts/{stem}/`
    Posts,

    /// `{base}/{category}/{yyyy}/{mm}/{dd}/{slug}.html`
    Category,
}

impl Default for Permalink {
    fn default() -> Self {
        Permalink::Posts
    }
}

fn default_headline() -> String {
    DEFAULT_HEADLINE.to_owned()
}

/// The `announcement` section of the site configuration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AnnouncementConfig {
    #[serde(default = "default_headline")]
    pub headline: String,

    #[serde(default)]
    pub permalink: Permalink,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        AnnouncementConfig {
            headline: default_headline(),
            permalink: Permalink::default(),
        }
    }
}

#[derive(Deserialize)]
struct Site {
    #[serde(default)]
    url: Option<String>,

    #[serde(default)]
    baseurl: Option<String>,

    #[serde(default)]
    announcement: Option<AnnouncementConfig>,
}

/// The parts of the site configuration this tool reads. Other keys are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteConfig {
    /// The site origin, e.g. `https://tonosama.github.io`.
    pub url: String,

    /// The path the site is served under, e.g. `/blog`. May be empty.
    pub baseurl: String,

    pub announcement: AnnouncementConfig,
}

impl SiteConfig {
    pub fn from_path(path: &Path) -> Result<SiteConfig> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let site: Site = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        SiteConfig::from_site(site)
    }

    pub fn from_yaml(yaml: &str) -> Result<SiteConfig> {
        let site: Site = serde_yaml::from_str(yaml).map_err(|err| Error::Parse {
            path: PathBuf::from("<inline>"),
            err,
        })?;
        SiteConfig::from_site(site)
    }

    fn from_site(site: Site) -> Result<SiteConfig> {
        let url = match site.url {
            Some(url) if !url.trim().is_empty() => url.trim().to_owned(),
            _ => return Err(Error::Missing("url")),
        };
        let config = SiteConfig {
            url,
            baseurl: site.baseurl.unwrap_or_default().trim().to_owned(),
            announcement: site.announcement.unwrap_or_default(),
        };
        config.composer()?;
        Ok(config)
    }

    /// `url` followed by `baseurl`, without a trailing slash, e.g.
    /// `https://tonosama.github.io/blog`.
    pub fn base_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        let baseurl = self.baseurl.trim_matches('/');
        if baseurl.is_empty() {
            url.to_owned()
        } else {
            format!("{}/{}", url, baseurl)
        }
    }

    /// A composer using the configured headline.
    pub fn composer(&self) -> Result<Composer> {
        Composer::with_headline(&self.announcement.headline).ok_or_else(|| Error::Invalid {
            key: "announcement.headline",
            reason: "too long to leave room for a title".to_owned(),
        })
    }
}

/// Settings for the `publish` step.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub credentials: Credentials,

    /// May be empty, in which case publishing is skipped.
    pub text: String,
}

impl PublishSettings {
    pub fn from_env() -> Result<PublishSettings> {
        PublishSettings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the settings through `lookup`. Credentials that are unset or
    /// empty are missing (CI systems expand undefined secrets to the empty
    /// string); the text only needs to be set.
    pub fn from_lookup<F>(lookup: F) -> Result<PublishSettings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = |key: &'static str| match lookup(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Error::Missing(key)),
        };
        Ok(PublishSettings {
            credentials: Credentials {
                consumer_key: secret(ENV_API_KEY)?,
                consumer_secret: secret(ENV_API_KEY_SECRET)?,
                access_token: secret(ENV_ACCESS_TOKEN)?,
                access_token_secret: secret(ENV_ACCESS_TOKEN_SECRET)?,
            },
            text: lookup(ENV_TWEET_TEXT).ok_or(Error::Missing(ENV_TWEET_TEXT))?,
        })
    }
}

/// Settings for the `prepare` step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrepareSettings {
    /// The post to announce. `None` means there is nothing to do.
    pub post_file: Option<PathBuf>,

    /// Where the composed text is appended. `None` means stdout.
    pub output_file: Option<PathBuf>,
}

impl PrepareSettings {
    pub fn from_env() -> PrepareSettings {
        PrepareSettings::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> PrepareSettings
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str| lookup(key).filter(|v| !v.is_empty()).map(PathBuf::from);
        PrepareSettings {
            post_file: path(ENV_LATEST_POST_FILE),
            output_file: path(ENV_GITHUB_OUTPUT),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for configuration problems.
#[derive(Debug)]
pub enum Error {
    /// Returned when a required environment variable or configuration key is
    /// absent.
    Missing(&'static str),

    /// Returned when a configuration value is present but unusable.
    Invalid { key: &'static str, reason: String },

    /// Returned when the configuration file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the configuration file isn't valid YAML.
    Parse { path: PathBuf, err: serde_yaml::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Missing(key) => {
                write!(f, "required setting `{}` is not set", key)
            }
            Error::Invalid { key, reason } => {
                write!(f, "setting `{}` is invalid: {}", key, reason)
            }
            Error::Open { path, err } => {
                write!(f, "Opening config file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Parsing config file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Missing(_) => None,
            Error::Invalid { .. } => None,
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
        }
    }
}
