//! Builds the public URLs for posts. [`compose_url`] produces the short
//! `posts/` URL used in announcements and [`category_url`] produces the
//! category-dated permalink that the site generator itself renders.

use crate::post::PostFileName;

/// The site the announcement workflow was first written for. Used by the
/// `url` subcommand when no `--base-url` is given.
pub const DEFAULT_BASE_URL: &str = "https://tonosama.github.io/blog";

const POSTS_PREFIX: &str = "posts";

/// Returns `{base_url}/posts/{stem}/` where `stem` is the basename of
/// `identifier` less its final extension. `base_url` is concatenated as-is
/// and any string is accepted for either argument.
pub fn compose_url(identifier: &str, base_url: &str) -> String {
    format!("{}/{}/{}/", base_url, POSTS_PREFIX, stem(identifier))
}

/// Strips leading directory components (either separator) and the final
/// extension from `identifier`. A leading dot does not start an extension,
/// so `.draft` is its own stem.
pub fn stem(identifier: &str) -> &str {
    let basename = identifier
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(identifier);
    match basename.rfind('.') {
        Some(i) if i > 0 => &basename[..i],
        _ => basename,
    }
}

/// Returns the category-dated permalink for a post:
/// `{base_url}/{category}/{yyyy}/{mm}/{dd}/{slug}.html`. The category is
/// trimmed and percent-encoded segment by segment so nested categories keep
/// their slashes.
pub fn category_url(
    base_url: &str,
    category: &str,
    file_name: &PostFileName,
) -> String {
    let category = category
        .trim()
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<String>>()
        .join("/");
    format!(
        "{}/{}/{}/{}.html",
        base_url,
        category,
        file_name.date.format("%Y/%m/%d"),
        file_name.slug,
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_compose_url_md_file_name() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05/",
            "2025-11-14-pm-05.md",
        )
    }

    #[test]
    fn test_compose_url_posts_directory() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05/",
            "_posts/2025-11-14-pm-05.md",
        )
    }

    #[test]
    fn test_compose_url_absolute_path() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05/",
            "/Users/tonosama/work/ブログ/startbootstrap-clean-blog-jekyll/_posts/2025-11-14-pm-05.md",
        )
    }

    #[test]
    fn test_compose_url_windows_path() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05/",
            "C:\\blog\\_posts\\2025-11-14-pm-05.md",
        )
    }

    #[test]
    fn test_compose_url_other_date() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-01-01-new-year/",
            "2025-01-01-new-year.md",
        )
    }

    #[test]
    fn test_compose_url_custom_base() {
        assert_eq!(
            "https://example.com/posts/2025-11-14-pm-05/",
            compose_url("2025-11-14-pm-05.md", "https://example.com"),
        )
    }

    #[test]
    fn test_compose_url_missing_extension() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05/",
            "2025-11-14-pm-05",
        )
    }

    #[test]
    fn test_compose_url_many_hyphens() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-pm-05-extended-version/",
            "2025-11-14-pm-05-extended-version.md",
        )
    }

    #[test]
    fn test_compose_url_only_final_extension_stripped() {
        fixture_default(
            "https://tonosama.github.io/blog/posts/2025-11-14-notes.v2/",
            "drafts/2025-11-14-notes.v2.markdown",
        )
    }

    #[test]
    fn test_compose_url_matches_stem_for_arbitrary_input() {
        for (identifier, base) in &[
            ("a/b/c.txt", "x"),
            ("", ""),
            ("no-extension", "https://example.org/blog"),
            (".hidden", "base"),
            ("dir/", "base"),
        ] {
            assert_eq!(
                format!("{}/posts/{}/", base, stem(identifier)),
                compose_url(identifier, base),
            );
        }
    }

    #[test]
    fn test_stem() {
        assert_eq!("2025-11-14-pm-05", stem("_posts/2025-11-14-pm-05.md"));
        assert_eq!(".hidden", stem(".hidden"));
        assert_eq!("", stem("dir/"));
    }

    #[test]
    fn test_category_url() {
        let file_name = PostFileName::parse("_posts/2025-11-14-pm-05.md")
            .expect("valid file name");
        assert_eq!(
            "https://example.com/tech/2025/11/14/pm-05.html",
            category_url("https://example.com", " tech ", &file_name),
        );
        assert_eq!(
            "https://example.com/%E6%97%A5%E8%A8%98/life/2025/11/14/pm-05.html",
            category_url("https://example.com", "日記/life", &file_name),
        );
    }

    fn fixture_default(wanted: &str, identifier: &str) {
        assert_eq!(wanted, compose_url(identifier, DEFAULT_BASE_URL));
    }
}
