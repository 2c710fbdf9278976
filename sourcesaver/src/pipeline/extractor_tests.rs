//! End-to-end extraction tests over captured and synthetic responses.

#[cfg(test)]
mod tests {
    use crate::config::ExtractionConfig;
    use crate::core::{Block, LinkEntry, StageKind};
    use crate::events::{self, CollectingEventSink};
    use crate::pipeline::Extractor;
    use crate::stages::merge;
    use crate::testing::{
        assert_block_urls, assert_has_query, assert_http_links_only, assert_no_query,
        assert_unique_links, blacklist_response, search_payload, ResponseBuilder, SAMPLE_QUERY,
        SAMPLE_RESPONSE, SAMPLE_URLS,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_sample_response_yields_single_block() {
        let blocks = Extractor::default().extract(SAMPLE_RESPONSE);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, SAMPLE_QUERY);
        assert_block_urls(&blocks[0], &SAMPLE_URLS);
        assert_eq!(
            blocks[0].links[0],
            LinkEntry::new("http://a.example/x.pdf", "Title A").with_description("Desc A")
        );
    }

    #[test]
    fn test_sample_response_report() {
        let report = Extractor::default().extract_with_report(SAMPLE_RESPONSE);

        assert!(report.stats.whole_text);
        assert_eq!(report.stats.fragments_accepted, 1);
        assert_eq!(report.stats.expansions, 1);
        assert_eq!(report.stats.candidates, 1);
        assert_eq!(report.stats.blocks, 1);

        let kinds: Vec<StageKind> = report.stages.iter().map(|s| s.stage).collect();
        assert_eq!(kinds, StageKind::ALL.to_vec());
        assert!(report.stages.iter().all(|s| s.duration_ms.is_some()));
        assert_eq!(report.stages[3].output_count, 1);
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = Extractor::default();
        let body = ResponseBuilder::new()
            .search("first", &[("https://a.example", "A", "")])
            .search("second", &[("https://b.example", "B", "d")])
            .with_truncated_head()
            .build();

        assert_eq!(extractor.extract(&body), extractor.extract(&body));
        assert_eq!(extractor.extract(SAMPLE_RESPONSE), extractor.extract(SAMPLE_RESPONSE));
    }

    #[test]
    fn test_blacklisted_query_yields_nothing() {
        let blocks = Extractor::default().extract(&blacklist_response());
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_every_blacklisted_label_is_excluded() {
        let extractor = Extractor::default();
        for label in crate::config::DEFAULT_BLACKLIST {
            let body = ResponseBuilder::new()
                .search(label, &[("https://a.example", "A", "")])
                .build();
            assert_no_query(&extractor.extract(&body), label);
        }
    }

    #[test]
    fn test_non_http_links_never_appear() {
        let payload = json!([
            [["turn", ["mixed", 1], [["ftp://x.example", "X"], ["https://y.example", "Y"]]]],
            [["turn", ["clean", 1], [["https://z.example", "Z"]]]]
        ]);
        let body = ResponseBuilder::new().payload(payload).build();
        let blocks = Extractor::default().extract(&body);

        assert_http_links_only(&blocks);
        assert_no_query(&blocks, "mixed");
        assert_block_urls(assert_has_query(&blocks, "clean"), &["https://z.example"]);
    }

    #[test]
    fn test_sibling_queries_keep_their_own_links() {
        let second: Vec<_> = (1..=3)
            .map(|i| json!([format!("https://second.example/{i}"), "S"]))
            .collect();
        let payload = json!([
            ["a", ["first", 1], [["https://first.example/1", "F"]]],
            ["b", ["second", 1], second]
        ]);
        let body = ResponseBuilder::new().payload(payload).build();
        let blocks = Extractor::default().extract(&body);

        assert_eq!(blocks.len(), 2);
        assert_block_urls(assert_has_query(&blocks, "first"), &["https://first.example/1"]);
        assert_block_urls(
            assert_has_query(&blocks, "second"),
            &[
                "https://second.example/1",
                "https://second.example/2",
                "https://second.example/3",
            ],
        );
    }

    #[test]
    fn test_largest_link_list_wins() {
        let small: Vec<_> = (0..2)
            .map(|i| json!([format!("https://small.example/{i}"), "S"]))
            .collect();
        let large: Vec<_> = (0..5)
            .map(|i| json!([format!("https://large.example/{i}"), "L"]))
            .collect();
        let payload = json!([["turn", ["query", 1], small, [large]]]);
        let body = ResponseBuilder::new().payload(payload).build();

        let blocks = Extractor::default().extract(&body);
        let block = assert_has_query(&blocks, "query");
        assert_eq!(block.len(), 5);
    }

    #[test]
    fn test_garbage_after_prefix_yields_nothing() {
        let extractor = Extractor::default();
        assert!(extractor.extract(")]}'\nthis is not json at all").is_empty());
        assert!(extractor.extract(")]}'").is_empty());
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract(")]}'\n\n12\n[[[[[").is_empty());
    }

    #[test]
    fn test_per_line_fallback_reads_every_chunk() {
        let body = ResponseBuilder::new()
            .search("first", &[("https://a.example/1", "A", "")])
            .search("second", &[("https://b.example/1", "B", ""), ("https://b.example/2", "B2", "")])
            .with_truncated_head()
            .build();
        let report = Extractor::default().extract_with_report(&body);

        assert!(!report.stats.whole_text);
        let queries: Vec<&str> = report.blocks.iter().map(|b| b.query.as_str()).collect();
        assert_eq!(queries, vec!["first", "second"]);
        assert_eq!(report.blocks[1].len(), 2);
    }

    #[test]
    fn test_whole_text_keeps_only_first_chunk() {
        let body = ResponseBuilder::new()
            .search("first", &[("https://a.example/1", "A", "")])
            .search("second", &[("https://b.example/1", "B", "")])
            .build();
        let blocks = Extractor::default().extract(&body);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].query, "first");
    }

    #[test]
    fn test_repeated_query_keeps_larger_block() {
        let payload = json!([
            search_payload("same", &[("https://a.example", "A", "")]),
            search_payload(
                "same",
                &[("https://a.example", "A", ""), ("https://b.example", "B", "")]
            ),
        ]);
        let body = ResponseBuilder::new().payload(payload).build();
        let report = Extractor::default().extract_with_report(&body);

        assert_eq!(report.blocks.len(), 1);
        assert_block_urls(&report.blocks[0], &["https://a.example", "https://b.example"]);
        assert!(report.stats.duplicates_removed >= 1);
    }

    #[test]
    fn test_duplicate_urls_within_list_are_removed() {
        let payload = json!([[
            "turn",
            ["dups", 1],
            [["https://a.example", "first"], ["https://a.example", "second"], ["https://b.example", "B"]]
        ]]);
        let body = ResponseBuilder::new().payload(payload).build();
        let blocks = Extractor::default().extract(&body);

        assert_unique_links(&blocks);
        let block = assert_has_query(&blocks, "dups");
        assert_eq!(block.links[0].title, "first");
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_blocks_inside_objects_are_found() {
        let payload = json!({
            "meta": {"version": 2},
            "turns": [{"body": ["turn", ["object query", 1], [["https://o.example", "O"]]]}]
        });
        let body = ResponseBuilder::new().payload(payload).build();
        let blocks = Extractor::default().extract(&body);

        assert_block_urls(assert_has_query(&blocks, "object query"), &["https://o.example"]);
    }

    #[test]
    fn test_doubly_embedded_document_is_decoded() {
        let inner = search_payload("deep", &[("https://d.example", "D", "")]).to_string();
        let body = ResponseBuilder::new().payload(json!(["wrapper", inner])).build();
        let report = Extractor::default().extract_with_report(&body);

        assert_eq!(report.stats.expansions, 2);
        assert_has_query(&report.blocks, "deep");
    }

    #[test]
    fn test_events_reported_to_sink() {
        let sink = Arc::new(CollectingEventSink::new());
        let extractor = Extractor::default().with_event_sink(sink.clone());
        extractor.extract(&blacklist_response());

        let names: Vec<String> = sink.events().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names.first().map(String::as_str), Some(events::EXTRACT_STARTED));
        assert_eq!(names.last().map(String::as_str), Some(events::EXTRACT_COMPLETED));
        assert_eq!(sink.events_of_type(events::BLOCK_BLACKLISTED).len(), 1);

        let stages = sink.events_of_type(events::STAGE_COMPLETED);
        let names: Vec<serde_json::Value> = stages
            .iter()
            .map(|(_, data)| data.as_ref().unwrap()["stage.name"].clone())
            .collect();
        assert_eq!(
            names,
            vec![json!("normalize"), json!("decode"), json!("match"), json!("aggregate")]
        );
        let aggregate = stages[3].1.as_ref().unwrap();
        assert_eq!(aggregate["stage.output_count"], json!("0"));
        assert!(aggregate.get("stage.duration_ms").is_some());
    }

    #[test]
    fn test_custom_config_is_applied() {
        let config = ExtractionConfig::default().with_blacklisted(SAMPLE_QUERY);
        let extractor = Extractor::new(config).unwrap();
        assert!(extractor.extract(SAMPLE_RESPONSE).is_empty());
    }

    #[test]
    fn test_config_cannot_drop_fixed_labels() {
        let config = ExtractionConfig::from_json_str(r#"{"blacklist": ["Only this"]}"#).unwrap();
        let extractor = Extractor::new(config).unwrap();

        assert!(extractor.extract(&blacklist_response()).is_empty());
        let body = ResponseBuilder::new()
            .search("Only this", &[("https://a.example", "A", "")])
            .build();
        assert!(extractor.extract(&body).is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ExtractionConfig::default().with_max_expansions(0);
        assert!(Extractor::new(config).is_err());
    }

    #[test]
    fn test_small_length_ceiling_degrades_gracefully() {
        let config = ExtractionConfig::default().with_max_embedded_len(8);
        let report = Extractor::new(config).unwrap().extract_with_report(SAMPLE_RESPONSE);

        assert!(report.blocks.is_empty());
        assert_eq!(report.stats.embedded_rejected, 1);
    }

    #[test]
    fn test_merge_with_stored_block() {
        let stored = Block::new("q", vec![LinkEntry::new("u1", "original")]);
        let incoming = Block::new(
            "q",
            vec![LinkEntry::new("u1", "new"), LinkEntry::new("u2", "second")],
        );

        let merged = merge(&stored, &incoming);
        assert_eq!(merged.links[0].title, "original");
        assert_eq!(merged.urls().collect::<Vec<_>>(), vec!["u1", "u2"]);
    }

    #[test]
    fn test_extractor_is_shareable_across_threads() {
        let extractor = Arc::new(Extractor::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let extractor = Arc::clone(&extractor);
                std::thread::spawn(move || extractor.extract(SAMPLE_RESPONSE))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
    }
}
