mod common;

use common::{happy_path_response, Behavior, MockBackend, TEST_API_KEY};
use serde_json::json;
use websearch::search::{
    create_search_service, Error, ErrorCode, ReasoningEffort, SearchError, SearchOptions,
    SearchService,
};

#[tokio::test]
async fn test_end_to_end_happy_path() {
    let backend = MockBackend::responding(happy_path_response());
    let service = SearchService::with_backend(backend.clone());

    let result = service.search("test query", None).await.unwrap();

    assert_eq!(result.query, "test query");
    assert_eq!(result.text, "Answer.");
    assert_eq!(result.citations.len(), 1);
    assert_eq!(result.citations[0].url, "https://a.com");
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].url, "https://a.com");
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_search_rejects_invalid_queries_before_backend() {
    let backend = MockBackend::responding(happy_path_response());
    let service = SearchService::with_backend(backend.clone());

    for query in [String::new(), "   ".to_string(), "x".repeat(5001)] {
        let err = service.search(&query, None).await.unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput(_)),
            "expected invalid input for query of len {}",
            query.len()
        );
    }

    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_search_accepts_query_at_length_limit() {
    let backend = MockBackend::responding(happy_path_response());
    let service = SearchService::with_backend(backend.clone());

    service.search(&"x".repeat(5000), None).await.unwrap();
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_search_defaults_options_when_none() {
    let backend = MockBackend::responding(happy_path_response());
    let service = SearchService::with_backend(backend.clone());

    service.search("q", None).await.unwrap();
    assert_eq!(backend.last_options(), Some(SearchOptions::default()));
}

#[tokio::test]
async fn test_search_forwards_options() {
    let backend = MockBackend::responding(happy_path_response());
    let service = SearchService::with_backend(backend.clone());
    let options = SearchOptions::default()
        .with_model("gpt-5")
        .with_reasoning_effort(ReasoningEffort::Medium);

    service.search("q", Some(options.clone())).await.unwrap();
    assert_eq!(backend.last_options(), Some(options));
}

#[tokio::test]
async fn test_typed_backend_error_propagates_unchanged() {
    let original = SearchError::new(ErrorCode::RateLimit, "API rate limit exceeded")
        .with_detail("retry_after", 20);
    let backend = MockBackend::new(Behavior::FailTyped(original.clone()));
    let service = SearchService::with_backend(backend);

    match service.search("q", None).await {
        Err(Error::Search(e)) => assert_eq!(e, original),
        other => panic!("expected search error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_untyped_backend_error_is_wrapped_as_unknown() {
    let backend = MockBackend::new(Behavior::FailUntyped("sdk exploded".to_string()));
    let service = SearchService::with_backend(backend);

    let err = service.search("q", None).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::UnknownError));

    let Error::Search(e) = err else {
        panic!("expected search error");
    };
    assert!(e.message.contains("sdk exploded"));
    assert_eq!(e.detail("original_error"), Some(&json!("sdk exploded")));
}

#[tokio::test]
async fn test_undecodable_mock_response_is_wrapped_as_unknown() {
    // `output` must be a list; the decode error is not a typed search error.
    let backend = MockBackend::responding(json!({ "output": "oops" }));
    let service = SearchService::with_backend(backend);

    let err = service.search("q", None).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::UnknownError));
}

#[tokio::test]
async fn test_empty_output_surfaces_as_malformed_response() {
    let backend = MockBackend::responding(json!({ "output": [] }));
    let service = SearchService::with_backend(backend);

    let err = service.search("q", None).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::MalformedResponse));
}

#[test]
fn test_validate_query() {
    let service = SearchService::demo();
    assert!(service.validate_query("What is Rust?"));
    assert!(!service.validate_query(""));
    assert!(!service.validate_query(" \t\n"));
    assert!(!service.validate_query(&"x".repeat(5001)));
}

#[test]
fn test_apply_domain_filters_accepts_bare_domains() {
    let service = SearchService::demo();
    let options = service.apply_domain_filters(&["example.com"]).unwrap();

    assert_eq!(options.allowed_domains, Some(vec!["example.com".to_string()]));
    assert_eq!(options.model, SearchOptions::default().model);
}

#[test]
fn test_apply_domain_filters_rejects_scheme() {
    let service = SearchService::demo();
    for domain in ["https://example.com", "http://example.com"] {
        let err = service.apply_domain_filters(&[domain]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("Invalid domain")));
    }
}

#[test]
fn test_apply_domain_filters_rejects_too_many() {
    let service = SearchService::demo();
    let domains = vec!["example.com".to_string(); 21];

    let err = service.apply_domain_filters(&domains).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("Too many domains")));

    assert!(service.apply_domain_filters(&domains[..20]).is_ok());
}

#[test]
fn test_apply_domain_filters_rejects_blank_and_spaced() {
    let service = SearchService::demo();
    assert!(service.apply_domain_filters(&[""]).is_err());
    assert!(service.apply_domain_filters(&["exa mple.com"]).is_err());
}

#[tokio::test]
async fn test_demo_service_returns_canned_answer() {
    let result = SearchService::demo().search("rust", None).await.unwrap();

    assert_eq!(result.text, "Demo answer for: rust");
    assert_eq!(result.search_id, "demo-search-1");
    assert_eq!(result.citations[0].title, "Example Domain");
    assert_eq!(result.sources[0].url, "https://example.com");
}

#[test]
fn test_create_search_service_selection() {
    assert!(create_search_service(Some(TEST_API_KEY), false, |c| c).is_ok());
    assert!(create_search_service(None, true, |c| c).is_ok());
    assert!(matches!(
        create_search_service(None, false, |c| c),
        Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
        create_search_service(Some("  "), false, |c| c),
        Err(Error::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_create_search_service_demo_skips_client_configuration() {
    let service = create_search_service(None, true, |_| panic!("no client in demo mode")).unwrap();

    let result = service.search("rust", None).await.unwrap();
    assert_eq!(result.search_id, "demo-search-1");
}

#[test]
fn test_service_new_requires_key() {
    assert!(SearchService::new(TEST_API_KEY).is_ok());
    assert!(matches!(SearchService::new(""), Err(Error::InvalidInput(_))));
}
