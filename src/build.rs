//! Exports the [`prepare`] and [`publish`] functions which stitch together the
//! high-level steps of announcing a post: reading the post
//! ([`crate::post`]), composing its URL ([`crate::url`]) and announcement
//! text ([`crate::announce`]), handing the text to the next pipeline step
//! ([`crate::output`]), and finally publishing it ([`crate::publish`]).

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::announce::Announcement;
use crate::config::{Error as ConfigError, Permalink, SiteConfig};
use crate::output;
use crate::post::{Error as PostError, Post};
use crate::publish::{Error as PublishError, PostId, Publisher};
use crate::url::{category_url, compose_url};

/// Reads the post at `post_path` and composes its announcement using the
/// site's base URL, permalink style, and headline.
pub fn compose(post_path: &Path, site: &SiteConfig) -> Result<Announcement> {
    let post = Post::from_path(post_path)?;
    let base_url = site.base_url();
    let post_url = match site.announcement.permalink {
        Permalink::Posts => compose_url(&post_path.to_string_lossy(), &base_url),
        Permalink::Category => {
            category_url(&base_url, post.frontmatter.category(), &post.file_name)
        }
    };
    let announcement = site.composer()?.compose(
        post.frontmatter.title(),
        post.frontmatter.category(),
        &post.frontmatter.tags[..],
        &post_url,
    );
    info!(
        post = %post_path.display(),
        url = %post_url,
        weighted_len = announcement.weighted_len(),
        "composed announcement"
    );
    Ok(announcement)
}

/// Composes the announcement for `post_path` and appends it to `output_file`
/// as the [`output::TWEET_TEXT`] step output, or prints the block to stdout
/// when there is no output file.
pub fn prepare(
    post_path: &Path,
    site: &SiteConfig,
    output_file: Option<&Path>,
) -> Result<Announcement> {
    let announcement = compose(post_path, site)?;
    match output_file {
        Some(path) => {
            output::append_output(path, output::TWEET_TEXT, announcement.text()).map_err(
                |err| Error::Output {
                    path: path.to_owned(),
                    err,
                },
            )?;
            info!(output = %path.display(), "wrote step output");
        }
        None => {
            output::write_output(std::io::stdout().lock(), output::TWEET_TEXT, announcement.text())
                .map_err(|err| Error::Output {
                    path: PathBuf::from("<stdout>"),
                    err,
                })?
        }
    }
    Ok(announcement)
}

/// Publishes `text`. Empty text is a deliberate no-op and returns `None`.
pub fn publish<P: Publisher + ?Sized>(publisher: &P, text: &str) -> Result<Option<PostId>> {
    if text.is_empty() {
        info!("announcement text is empty; skipping publish");
        return Ok(None);
    }
    info!("publishing announcement:\n{}", text);
    let id = publisher.publish(text)?;
    info!(id = %id, "published announcement");
    Ok(Some(id))
}

pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the announcement pipeline: configuration, post
/// parsing, step output, or publishing.
#[derive(Debug)]
pub enum Error {
    /// Returned for missing or invalid configuration and environment.
    Config(ConfigError),

    /// Returned for errors reading the post.
    Post(PostError),

    /// Returned for I/O problems writing the step output.
    Output { path: PathBuf, err: std::io::Error },

    /// Returned when publishing fails.
    Publish(PublishError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Config(err) => err.fmt(f),
            Error::Post(err) => err.fmt(f),
            Error::Output { path, err } => {
                write!(f, "Writing step output '{}': {}", path.display(), err)
            }
            Error::Publish(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(err) => Some(err),
            Error::Post(err) => Some(err),
            Error::Output { path: _, err } => Some(err),
            Error::Publish(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    /// Converts [`ConfigError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ConfigError) -> Error {
        Error::Config(err)
    }
}

impl From<PostError> for Error {
    /// Converts [`PostError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PostError) -> Error {
        Error::Post(err)
    }
}

impl From<PublishError> for Error {
    /// Converts [`PublishError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PublishError) -> Error {
        Error::Publish(err)
    }
}
