//! 请求路径的解码与词法规范化。

use std::fmt;

use crate::error::ApiError;

pub const FAVICON_PATH: &str = "/favicon.ico";

/// 经过词法清理的请求路径，总是以 `/` 开头，不含 `.`、`..` 或空段。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestPath(String);

impl RequestPath {
    /// 解码 URL 路径中的百分号编码，然后做词法清理。
    pub fn from_uri_path(raw: &str) -> Result<Self, ApiError> {
        let decoded = urlencoding::decode(raw)
            .map_err(|_| ApiError::BadRequest("invalid path encoding".into()))?;
        if decoded.contains('\0') {
            return Err(ApiError::BadRequest("invalid path".into()));
        }
        Ok(Self::clean(&decoded))
    }

    /// 纯字面清理路径，不访问文件系统；根目录下的 `..` 仍停留在根目录。
    pub fn clean(raw: &str) -> Self {
        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        Self(format!("/{}", segments.join("/")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    pub fn is_favicon(&self) -> bool {
        self.0 == FAVICON_PATH
    }

    /// 相对于基础目录的部分（去掉开头的 `/`）。
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.relative().split('/').filter(|s| !s.is_empty())
    }

    pub fn join(&self, name: &str) -> Self {
        if self.is_root() {
            Self(format!("/{name}"))
        } else {
            Self(format!("{}/{name}", self.0))
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) | None => Some(Self("/".into())),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// 生成可放入链接的 URL，逐段做百分号编码。
    pub fn to_href(&self) -> String {
        let encoded = self
            .segments()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!("/{encoded}")
    }
}

impl fmt::Display for RequestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_cleans_to_root() {
        assert_eq!(RequestPath::clean("").as_str(), "/");
        assert!(RequestPath::clean("").is_root());
    }

    #[test]
    fn clean_resolves_dots_and_separators() {
        assert_eq!(RequestPath::clean("/a//b/./c/").as_str(), "/a/b/c");
        assert_eq!(RequestPath::clean("/a/b/../c").as_str(), "/a/c");
        assert_eq!(RequestPath::clean("a/b").as_str(), "/a/b");
    }

    #[test]
    fn parent_segments_cannot_climb_above_root() {
        assert_eq!(RequestPath::clean("/../../etc/passwd").as_str(), "/etc/passwd");
        assert_eq!(RequestPath::clean("/a/../../..").as_str(), "/");
    }

    #[test]
    fn favicon_is_detected_after_cleaning() {
        assert!(RequestPath::clean("/favicon.ico").is_favicon());
        assert!(RequestPath::clean("/x/../favicon.ico").is_favicon());
        assert!(!RequestPath::clean("/x/favicon.ico").is_favicon());
    }

    #[test]
    fn from_uri_path_decodes_percent_encoding() {
        let path = RequestPath::from_uri_path("/comics/My%20Book/%2E%2E/x.cbz").unwrap();
        assert_eq!(path.as_str(), "/comics/x.cbz");
    }

    #[test]
    fn from_uri_path_rejects_invalid_utf8() {
        assert!(matches!(
            RequestPath::from_uri_path("/%FF%FE"),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            RequestPath::from_uri_path("/a%00b"),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn join_and_parent() {
        let root = RequestPath::clean("/");
        assert_eq!(root.join("a.png").as_str(), "/a.png");
        assert_eq!(root.parent(), None);

        let nested = RequestPath::clean("/books/vol 1");
        assert_eq!(nested.join("p.jpg").as_str(), "/books/vol 1/p.jpg");
        assert_eq!(nested.parent().unwrap().as_str(), "/books");
        assert_eq!(RequestPath::clean("/books").parent().unwrap().as_str(), "/");
    }

    #[test]
    fn href_encodes_each_segment() {
        let path = RequestPath::clean("/my books/a#1.cbz");
        assert_eq!(path.to_href(), "/my%20books/a%231.cbz");
        assert_eq!(RequestPath::clean("/").to_href(), "/");
    }
}
