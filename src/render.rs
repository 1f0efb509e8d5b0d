//! HTML 页面渲染：目录列表与登录表单。

use chrono::{DateTime, Local, Utc};
use maud::{DOCTYPE, Markup, html};

use crate::listing::{DirectoryEntry, PageView};
use crate::path::RequestPath;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#222}\
table{border-collapse:collapse;width:100%}\
th,td{text-align:left;padding:.3rem .6rem;border-bottom:1px solid #eee}\
td.num{text-align:right;font-variant-numeric:tabular-nums}\
a{text-decoration:none;color:#1a4f8b}\
footer{margin-top:2rem;color:#888;font-size:.8rem}";

fn layout(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="icon" type="image/png" href="/favicon.ico";
                style { (STYLE) }
            }
            body {
                (body)
                footer { "axo-shelf " (crate::build::PKG_VERSION) }
            }
        }
    }
}

/// 渲染目录列表页。
pub fn render_listing(page: &PageView) -> Markup {
    let body = html! {
        h1 { (breadcrumb(&page.current_path)) }
        table {
            thead {
                tr { th { "Name" } th { "Date" } th { "Size" } }
            }
            tbody {
                @if let Some(parent) = page.current_path.parent() {
                    tr {
                        td { a href=(parent.to_href()) { "../" } }
                        td {}
                        td {}
                    }
                }
                @for entry in &page.entries {
                    (entry_row(entry))
                }
            }
        }
        @if page.entries.is_empty() {
            p { "Nothing here." }
        }
    };
    layout(page.current_path.as_str(), body)
}

fn breadcrumb(path: &RequestPath) -> Markup {
    let mut current = RequestPath::clean("/");
    let crumbs = path
        .segments()
        .map(|segment| {
            current = current.join(segment);
            (current.to_href(), segment)
        })
        .collect::<Vec<_>>();
    html! {
        a href="/" { "/" }
        @for (href, segment) in &crumbs {
            a href=(href) { (segment) }
            " / "
        }
    }
}

fn entry_row(entry: &DirectoryEntry) -> Markup {
    html! {
        tr {
            td {
                @if entry.is_dir {
                    a href=(format!("{}/", entry.path.to_href())) { (entry.name) "/" }
                } @else {
                    a href=(entry.path.to_href()) { (entry.name) }
                }
            }
            td { (format_book_date(entry.book_date)) }
            td.num {
                @if !entry.is_dir { (format_size(entry.size)) }
            }
        }
    }
}

/// 渲染 401 时的登录表单，提交方式为 GET 查询参数。
pub fn render_login_page() -> Markup {
    let body = html! {
        h1 { "Sign in" }
        form method="get" {
            p {
                label { "Username " input type="text" name="username" autocomplete="username"; }
            }
            p {
                label { "Password " input type="password" name="password" autocomplete="current-password"; }
            }
            button type="submit" { "Sign in" }
        }
    };
    layout("Sign in", body)
}

fn format_book_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|utc| {
            utc.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_default()
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool, base: &RequestPath) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            path: base.join(name),
            is_dir,
            size: 2048,
            book_date: 0,
        }
    }

    #[test]
    fn listing_links_entries_and_parent() {
        let base = RequestPath::clean("/comics");
        let page = PageView {
            entries: vec![entry("vol 1", true, &base), entry("a&b.cbz", false, &base)],
            current_path: base.clone(),
        };
        let html = render_listing(&page).into_string();

        assert!(html.contains(r#"href="/comics/vol%201/""#));
        assert!(html.contains(r#"href="/comics/a%26b.cbz""#));
        assert!(html.contains("a&amp;b.cbz"));
        assert!(html.contains(r#"href="/""#));
        assert!(html.contains("2.0 KiB"));
        assert!(html.find("vol 1").unwrap() < html.find("a&amp;b.cbz").unwrap());
    }

    #[test]
    fn root_listing_has_no_parent_link() {
        let page = PageView {
            entries: Vec::new(),
            current_path: RequestPath::clean("/"),
        };
        let html = render_listing(&page).into_string();
        assert!(!html.contains("../"));
        assert!(html.contains("Nothing here."));
    }

    #[test]
    fn login_page_submits_query_fields() {
        let html = render_login_page().into_string();
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"name="password""#));
        assert!(html.contains(r#"method="get""#));
    }

    #[test]
    fn sizes_are_human_readable() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }
}
