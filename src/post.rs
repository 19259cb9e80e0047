//! Defines the [`Post`], [`Frontmatter`], [`PostFileName`], and [`Error`]
//! types along with the logic for reading a post source file from disk.

use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use chrono::NaiveDate;
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// The category used when a post's frontmatter doesn't name one.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

const FENCE: &str = "---";

/// `YYYY-MM-DD-<slug>.<ext>`; the slug is everything between the date and the
/// final extension.
const FILE_NAME_PATTERN: &str = r"^(\d{4})-(\d{2})-(\d{2})-(.+)\.([A-Za-z0-9]+)$";

/// A post source file: its validated file name, its frontmatter, and the
/// unparsed body that follows the frontmatter.
#[derive(Debug)]
pub struct Post {
    pub path: PathBuf,
    pub file_name: PostFileName,
    pub frontmatter: Frontmatter,
    pub body: String,
}

impl Post {
    /// Reads and parses the post at `path`. Errors are annotated with the
    /// path.
    pub fn from_path(path: &Path) -> Result<Post> {
        use std::io::Read;
        let annotate =
            |e: Error| Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e));
        let mut contents = String::new();
        File::open(path)
            .and_then(|mut f| f.read_to_string(&mut contents))
            .map_err(|e| annotate(Error::Io(e)))?;
        Post::parse(path, &contents).map_err(annotate)
    }

    /// Parses a post from its `path` and already-loaded `input`. The
    /// frontmatter is checked before the file name.
    pub fn parse(path: &Path, input: &str) -> Result<Post> {
        let (yaml, body) = split_frontmatter(input)?;
        let frontmatter = Frontmatter::from_yaml(yaml)?;
        let file_name = PostFileName::parse(&path.to_string_lossy())?;
        Ok(Post {
            path: path.to_owned(),
            file_name,
            frontmatter,
            body: body.to_owned(),
        })
    }
}

/// Splits `input` on its first two `---` fences and returns the region
/// between them (the YAML) and everything after the second fence (the
/// body). Leading text before the first fence is discarded.
pub fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    let yaml_start = match input.find(FENCE) {
        None => return Err(Error::FrontmatterMissingStartFence),
        Some(offset) => offset + FENCE.len(),
    };
    match input[yaml_start..].find(FENCE) {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => {
            let yaml_stop = yaml_start + offset;
            Ok((&input[yaml_start..yaml_stop], &input[yaml_stop + FENCE.len()..]))
        }
    }
}

/// The post metadata consumed by the announcement. Every field is optional
/// in the source file.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
pub struct Frontmatter {
    #[serde(default, deserialize_with = "scalar")]
    title: Option<String>,

    #[serde(default, deserialize_with = "scalar")]
    category: Option<String>,

    /// A YAML list, or a single string of whitespace-separated tags.
    #[serde(default, deserialize_with = "tag_list")]
    pub tags: Vec<String>,
}

impl Frontmatter {
    /// Parses the YAML between the fences. An empty block yields the
    /// defaults.
    pub fn from_yaml(yaml: &str) -> Result<Frontmatter> {
        if yaml.trim().is_empty() {
            return Ok(Frontmatter::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The post title, or the empty string.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// The post category, or [`DEFAULT_CATEGORY`].
    pub fn category(&self) -> &str {
        self.category.as_deref().unwrap_or(DEFAULT_CATEGORY)
    }
}

fn scalar_text(value: Value) -> std::result::Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s)),
        other => Err(format!("expected a string, found {:?}", other)),
    }
}

fn scalar<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    scalar_text(Value::deserialize(deserializer)?).map_err(D::Error::custom)
}

fn tag_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Sequence(items) => {
            let mut tags = Vec::with_capacity(items.len());
            for item in items {
                if let Some(tag) = scalar_text(item).map_err(D::Error::custom)? {
                    tags.push(tag);
                }
            }
            Ok(tags)
        }
        Value::String(s) => Ok(s.split_whitespace().map(str::to_owned).collect()),
        other => Ok(scalar_text(other)
            .map_err(D::Error::custom)?
            .into_iter()
            .collect()),
    }
}

/// The components of a post file name of the form `YYYY-MM-DD-<slug>.<ext>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFileName {
    pub date: NaiveDate,
    pub slug: String,

    /// The file name less its extension, e.g. `2025-11-14-pm-05`.
    pub stem: String,
}

impl PostFileName {
    /// Parses the basename of `path`. Directory components are ignored. The
    /// date must be a real calendar date.
    pub fn parse(path: &str) -> Result<PostFileName> {
        let invalid = || Error::InvalidFileName(InvalidFileNameError(PathBuf::from(path)));
        let basename = path.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(path);

        let caps = file_name_regex()
            .captures(basename)
            .ok_or_else(invalid)?;
        let number = |i: usize| caps[i].parse::<u32>().map_err(|_| invalid());
        let date = NaiveDate::from_ymd_opt(number(1)? as i32, number(2)?, number(3)?)
            .ok_or_else(invalid)?;
        let extension = &caps[5];
        Ok(PostFileName {
            date,
            slug: caps[4].to_owned(),
            stem: basename[..basename.len() - extension.len() - 1].to_owned(),
        })
    }
}

fn file_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FILE_NAME_PATTERN).expect("file name pattern is valid"))
}

#[derive(Debug)]
pub struct InvalidFileNameError(PathBuf);

impl fmt::Display for InvalidFileNameError {
    /// Displays an [`InvalidFileNameError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "file name {:?} does not match expected format YYYY-MM-DD-slug.md",
            &self.0
        )
    }
}

impl std::error::Error for InvalidFileNameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error reading a [`Post`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file contains no `---` fence at all.
    FrontmatterMissingStartFence,

    /// Returned when only one `---` fence was found.
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the file name isn't `YYYY-MM-DD-<slug>.<ext>`.
    InvalidFileName(InvalidFileNameError),

    /// Returned for I/O errors reading the source file.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl Error {
    /// True for the document-structure errors (fences and YAML), as opposed
    /// to file-name or I/O errors.
    pub fn is_malformed_document(&self) -> bool {
        match self {
            Error::FrontmatterMissingStartFence
            | Error::FrontmatterMissingEndFence
            | Error::DeserializeYaml(_) => true,
            Error::Annotated(_, err) => err.is_malformed_document(),
            _ => false,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "malformed document: no `---` frontmatter fence")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "malformed document: missing closing `---`")
            }
            Error::DeserializeYaml(err) => {
                write!(f, "malformed document: {}", err)
            }
            Error::InvalidFileName(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidFileName(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
