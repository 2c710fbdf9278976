//! Test assertions for extracted blocks.

use crate::core::Block;

/// Asserts that a block for `query` exists and returns it.
pub fn assert_has_query<'a>(blocks: &'a [Block], query: &str) -> &'a Block {
    match blocks.iter().find(|block| block.query == query) {
        Some(block) => block,
        None => panic!(
            "Expected a block for query '{}', got queries: {:?}",
            query,
            blocks.iter().map(|b| b.query.as_str()).collect::<Vec<_>>()
        ),
    }
}

/// Asserts that no block for `query` exists.
pub fn assert_no_query(blocks: &[Block], query: &str) {
    assert!(
        blocks.iter().all(|block| block.query != query),
        "Expected no block for query '{}', but one was extracted",
        query
    );
}

/// Asserts that `block` carries exactly `urls`, in order.
pub fn assert_block_urls(block: &Block, urls: &[&str]) {
    let actual: Vec<&str> = block.urls().collect();
    assert_eq!(
        actual, urls,
        "Unexpected links for query '{}'",
        block.query
    );
}

/// Asserts that every link URL starts with `http://` or `https://`.
pub fn assert_http_links_only(blocks: &[Block]) {
    for block in blocks {
        for url in block.urls() {
            assert!(
                url.starts_with("http://") || url.starts_with("https://"),
                "Non-HTTP link '{}' in block '{}'",
                url,
                block.query
            );
        }
    }
}

/// Asserts that no block repeats a URL.
pub fn assert_unique_links(blocks: &[Block]) {
    for block in blocks {
        let mut urls: Vec<&str> = block.urls().collect();
        let total = urls.len();
        urls.sort_unstable();
        urls.dedup();
        assert_eq!(
            urls.len(),
            total,
            "Duplicate links in block '{}'",
            block.query
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::LinkEntry;

    fn sample() -> Vec<Block> {
        vec![Block::new(
            "q",
            vec![LinkEntry::new("https://a", "A"), LinkEntry::new("http://b", "B")],
        )]
    }

    #[test]
    fn test_assert_has_query() {
        let blocks = sample();
        let block = assert_has_query(&blocks, "q");
        assert_block_urls(block, &["https://a", "http://b"]);
    }

    #[test]
    #[should_panic(expected = "Expected a block for query")]
    fn test_assert_has_query_fails() {
        assert_has_query(&sample(), "missing");
    }

    #[test]
    fn test_assert_no_query() {
        assert_no_query(&sample(), "other");
    }

    #[test]
    #[should_panic(expected = "Non-HTTP link")]
    fn test_assert_http_links_only_fails() {
        let blocks = vec![Block {
            query: "q".to_string(),
            links: vec![LinkEntry::new("ftp://a", "A")],
        }];
        assert_http_links_only(&blocks);
    }

    #[test]
    #[should_panic(expected = "Duplicate links")]
    fn test_assert_unique_links_fails() {
        let blocks = vec![Block {
            query: "q".to_string(),
            links: vec![LinkEntry::new("https://a", "A"), LinkEntry::new("https://a", "B")],
        }];
        assert_unique_links(&blocks);
    }

    #[test]
    fn test_assert_unique_links_passes() {
        assert_unique_links(&sample());
        assert_http_links_only(&sample());
    }
}
