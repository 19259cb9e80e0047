//! Composes the announcement text for a post: a headline, the bracketed
//! title, the post URL, and a block of hashtags. The title is shortened so
//! that the whole message fits the platform's character limit, with the URL
//! charged at the platform's fixed shortened length.
//!
//! Lengths are counted in Unicode scalar values.

use std::borrow::Cow;
use std::fmt;

use tracing::debug;

/// The platform's maximum message length.
pub const CHARACTER_LIMIT: usize = 280;

/// Every URL is charged this many characters regardless of its real length.
pub const SHORTENED_URL_LENGTH: usize = 23;

/// The phrase that opens every announcement unless the site overrides it.
pub const DEFAULT_HEADLINE: &str = "ブログを更新しました！";

const ELLIPSIS: &str = "...";
const OPEN_TITLE: char = '『';
const CLOSE_TITLE: char = '』';
const SEPARATOR: &str = "\n\n";

/// A finished announcement.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    text: String,
    url_len: usize,
}

impl Announcement {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// The length the platform charges for this text: its character count
    /// with the URL counted as [`SHORTENED_URL_LENGTH`]. Never exceeds
    /// [`CHARACTER_LIMIT`].
    pub fn weighted_len(&self) -> usize {
        self.text.chars().count() - self.url_len + SHORTENED_URL_LENGTH
    }
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Composes announcements with a fixed headline.
#[derive(Debug, Clone)]
pub struct Composer {
    headline: String,

    /// Characters taken by the headline, the title brackets, and the two
    /// separators.
    boilerplate_len: usize,
}

impl Default for Composer {
    fn default() -> Self {
        Composer {
            headline: DEFAULT_HEADLINE.to_owned(),
            boilerplate_len: boilerplate_len(DEFAULT_HEADLINE),
        }
    }
}

impl Composer {
    /// Returns `None` if `headline` leaves no room for at least an ellipsis
    /// in place of the title.
    pub fn with_headline(headline: &str) -> Option<Composer> {
        let boilerplate_len = boilerplate_len(headline);
        if boilerplate_len + SHORTENED_URL_LENGTH + ELLIPSIS.len() > CHARACTER_LIMIT {
            return None;
        }
        Some(Composer {
            headline: headline.to_owned(),
            boilerplate_len,
        })
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    /// Builds the announcement. `category` doesn't appear in the text.
    /// `post_url` must be the post's public URL; it isn't validated.
    ///
    /// A title that fits is kept whole along with every hashtag. A title that
    /// must be cut ends in `...`; if the hashtags leave less than an
    /// ellipsis' worth of room for it, trailing hashtags are dropped until
    /// the ellipsis fits.
    pub fn compose<S: AsRef<str>>(
        &self,
        title: &str,
        category: &str,
        tags: &[S],
        post_url: &str,
    ) -> Announcement {
        let title_len = title.chars().count() as isize;
        let mut hashtags = hashtags(tags);
        let mut available = self.available_title_len(&hashtags);
        while title_len > available
            && available < ELLIPSIS.len() as isize
            && hashtags.pop().is_some()
        {
            available = self.available_title_len(&hashtags);
        }
        // a fitting title or `with_headline` keeps this non-negative
        let available = available.max(0) as usize;
        let hashtags = hashtags.join(" ");

        let title = truncate(title, available);
        debug!(category, available, title = %title, "composing announcement");

        let mut text = String::with_capacity(
            self.headline.len() + title.len() + post_url.len() + hashtags.len() + 16,
        );
        text.push_str(&self.headline);
        text.push_str(SEPARATOR);
        text.push(OPEN_TITLE);
        text.push_str(&title);
        text.push(CLOSE_TITLE);
        text.push_str(SEPARATOR);
        text.push_str(post_url);
        if !hashtags.is_empty() {
            text.push_str(SEPARATOR);
            text.push_str(&hashtags);
        }
        Announcement {
            text,
            url_len: post_url.chars().count(),
        }
    }

    /// `CHARACTER_LIMIT` less the boilerplate, the shortened URL, and the
    /// hashtag block (the joined hashtags plus their separator). Negative
    /// when the hashtags overrun the limit.
    fn available_title_len(&self, hashtags: &[String]) -> isize {
        CHARACTER_LIMIT as isize
            - self.boilerplate_len as isize
            - SHORTENED_URL_LENGTH as isize
            - hashtag_block_len(hashtags) as isize
    }
}

fn boilerplate_len(headline: &str) -> usize {
    headline.chars().count() + 2 + 2 * SEPARATOR.len()
}

fn hashtag_block_len(hashtags: &[String]) -> usize {
    if hashtags.is_empty() {
        return 0;
    }
    let joined: usize = hashtags.iter().map(|h| h.chars().count()).sum();
    joined + (hashtags.len() - 1) + SEPARATOR.len()
}

/// Converts tags into hashtags: whitespace (including the full-width space
/// U+3000) is removed, tags left empty are dropped, and the rest are
/// prefixed with `#`.
pub fn hashtags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            tag.as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
        })
        .filter(|tag| !tag.is_empty())
        .map(|tag| format!("#{}", tag))
        .collect()
}

/// Cuts `title` to `available` characters, replacing its tail with `...`
/// when it's too long. A title that doesn't fit always has at least the
/// ellipsis length to work with.
fn truncate(title: &str, available: usize) -> Cow<str> {
    if title.chars().count() <= available {
        return Cow::Borrowed(title);
    }
    let keep = available.saturating_sub(ELLIPSIS.len());
    Cow::Owned(title.chars().take(keep).chain(ELLIPSIS.chars()).collect())
}

/// Composes an announcement with the default headline. See
/// [`Composer::compose`].
pub fn compose_announcement<S: AsRef<str>>(
    title: &str,
    category: &str,
    tags: &[S],
    post_url: &str,
) -> Announcement {
    Composer::default().compose(title, category, tags, post_url)
}
