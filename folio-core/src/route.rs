/// The pages the site knows how to render.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    About,
    Gallery(String),
    NotFound,
}

impl Route {
    /// Resolve a request path. Trailing slashes and `index.html` are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if segments.last() == Some(&"index.html") {
            segments.pop();
        }

        match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["gallery", slug] if is_slug(slug) => Route::Gallery(slug.to_string()),
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::About => "/about".to_string(),
            Route::Gallery(slug) => format!("/gallery/{slug}"),
            Route::NotFound => "/404".to_string(),
        }
    }

    /// Where a static export writes this route, relative to the output directory.
    pub fn out_path(&self) -> std::path::PathBuf {
        match self {
            Route::Home => "index.html".into(),
            Route::NotFound => "404.html".into(),
            other => std::path::Path::new(other.path().trim_start_matches('/')).join("index.html"),
        }
    }
}

/// Slugs are URL-safe: ASCII alphanumerics, `-` and `_`.
pub fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_parse() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/index.html"), Route::Home);
        assert_eq!(Route::parse("/about/"), Route::About);
        assert_eq!(Route::parse("/gallery/nature"), Route::Gallery("nature".into()));
        assert_eq!(Route::parse("/gallery/nature/?ref=x"), Route::Gallery("nature".into()));
        assert_eq!(Route::parse("/gallery"), Route::NotFound);
        assert_eq!(Route::parse("/gallery/a/b"), Route::NotFound);
        assert_eq!(Route::parse("/gallery/..%2f"), Route::NotFound);
        assert_eq!(Route::parse("/contact"), Route::NotFound);
    }

    #[test]
    fn test_parse_index_html_only_as_a_segment() {
        assert_eq!(Route::parse("/about/index.html"), Route::About);
        assert_eq!(
            Route::parse("/gallery/nature/index.html"),
            Route::Gallery("nature".into())
        );
        assert_eq!(Route::parse("/gallery/myindex.html"), Route::NotFound);
        assert_eq!(Route::parse("/aboutindex.html"), Route::NotFound);
    }

    #[test]
    fn test_out_path() {
        assert_eq!(Route::Home.out_path(), PathBuf::from("index.html"));
        assert_eq!(Route::About.out_path(), PathBuf::from("about/index.html"));
        assert_eq!(
            Route::Gallery("travel".into()).out_path(),
            PathBuf::from("gallery/travel/index.html")
        );
        assert_eq!(Route::NotFound.out_path(), PathBuf::from("404.html"));
    }
}
