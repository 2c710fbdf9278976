//! Text renderings of stored links.

use crate::core::LinkEntry;
use crate::errors::SourceSaverError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Clipboard-style export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    /// `- [title](url)` per line.
    Markdown,
    /// `title<TAB>url<TAB>description` per line.
    Tsv,
    /// Bare URLs, one per line.
    UrlList,
}

impl ExportFormat {
    /// Every format, in menu order.
    pub const ALL: [Self; 3] = [Self::Markdown, Self::Tsv, Self::UrlList];

    /// Name accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::Tsv => "tsv",
            Self::UrlList => "urls",
        }
    }

    /// Renders `links` as newline-separated text without a trailing newline.
    #[must_use]
    pub fn render(&self, links: &[LinkEntry]) -> String {
        links
            .iter()
            .map(|link| self.render_line(link))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_line(&self, link: &LinkEntry) -> String {
        match self {
            Self::Markdown => {
                let label = if link.title.is_empty() { &link.url } else { &link.title };
                format!("- [{label}]({})", link.url)
            }
            Self::Tsv => format!("{}\t{}\t{}", link.title, link.url, link.description),
            Self::UrlList => link.url.clone(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = SourceSaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "tsv" => Ok(Self::Tsv),
            "urls" | "url_list" => Ok(Self::UrlList),
            _ => Err(SourceSaverError::UnknownExportFormat(s.to_string())),
        }
    }
}

/// Normalises one URL for replay: trimmed, one trailing slash removed.
#[must_use]
pub fn normalize_url(url: &str) -> &str {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed)
}

/// URLs to feed into another site's import box, in order.
///
/// URLs are normalised with [`normalize_url`]; empties and repeats are dropped.
#[must_use]
pub fn replay_queue(links: &[LinkEntry]) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .map(|link| normalize_url(&link.url))
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .map(str::to_string)
        .collect()
}

/// The toast shown after a response yielded `count` searches.
#[must_use]
pub fn summary_message(count: usize) -> String {
    format!("✅ Найдено поисков: {count}")
}
