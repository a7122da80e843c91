use articlemap_core::{
    ArticleId, ArticleSource, ExplorerConfig, GatewayError, HttpGateway, LoadError,
    QueryGateway, SearchHits,
};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Request line and body captured by the canned responder.
struct Captured {
    request_line: String,
    body: String,
}

/// Serves exactly one HTTP exchange with a canned status and body.
fn serve_once(status: u16, body: &'static str) -> (String, Receiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());

        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        let mut content_length = 0usize;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut body_bytes = vec![0u8; content_length];
        reader.read_exact(&mut body_bytes).unwrap();

        let mut stream = stream;
        write!(
            stream,
            "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .unwrap();
        stream.flush().unwrap();

        let _ = tx.send(Captured {
            request_line: request_line.trim_end().to_string(),
            body: String::from_utf8(body_bytes).unwrap(),
        });
    });

    (address, rx)
}

fn gateway_for(address: &str, contract: &str) -> HttpGateway {
    let address = address.to_string();
    let contract = contract.to_string();
    let config = ExplorerConfig::from_lookup(move |key| match key {
        "ARTICLEMAP_BASE_URL" => Some(address.clone()),
        "ARTICLEMAP_SEARCH_CONTRACT" => Some(contract.clone()),
        "ARTICLEMAP_TIMEOUT_MS" => Some("3000".to_string()),
        _ => None,
    })
    .unwrap();
    HttpGateway::new(&config).unwrap()
}

#[test]
fn search_posts_normalized_query_and_decodes_ids() {
    let (address, captured) = serve_once(200, r#"{"results": [3, {"id": 1, "title": "t"}]}"#);
    let gateway = gateway_for(&address, "ids");

    let hits = gateway.search("  graph \n neural  ").unwrap();
    assert_eq!(
        hits,
        SearchHits::Ids(vec![ArticleId::from(3), ArticleId::from(1)])
    );

    let request = captured.recv().unwrap();
    assert_eq!(request.request_line, "POST /search HTTP/1.1");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body, serde_json::json!({"query": "graph neural"}));
}

#[test]
fn search_in_label_contract_returns_labels() {
    let (address, _captured) = serve_once(200, r#"{"results": ["cats", "dogs"]}"#);
    let gateway = gateway_for(&address, "labels");

    let hits = gateway.search("pets").unwrap();
    assert_eq!(
        hits,
        SearchHits::Labels(vec!["cats".to_string(), "dogs".to_string()])
    );
}

#[test]
fn similar_requests_id_path_and_maps_status_failures() {
    let (address, captured) = serve_once(404, r#"{"detail": "Article 7 not found"}"#);
    let gateway = gateway_for(&address, "ids");

    let err = gateway.find_similar(&ArticleId::from(7)).unwrap_err();
    match err {
        GatewayError::Response {
            status, message, ..
        } => {
            assert_eq!(status, Some(404));
            assert!(message.contains("not found"));
        }
        other => panic!("expected response failure, got {other:?}"),
    }
    assert_eq!(
        captured.recv().unwrap().request_line,
        "GET /similar/7 HTTP/1.1"
    );
}

#[test]
fn malformed_payload_is_a_response_failure() {
    let (address, _captured) = serve_once(200, r#"{"results": "nope"}"#);
    let gateway = gateway_for(&address, "ids");

    let err = gateway.search("anything").unwrap_err();
    assert_eq!(err.code(), "response_malformed");
}

#[test]
fn unreachable_backend_is_a_network_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let gateway = gateway_for(&address, "ids");

    let err = gateway.search("anything").unwrap_err();
    assert!(matches!(err, GatewayError::Network { .. }), "{err:?}");
}

#[test]
fn raw_data_loads_through_article_source() {
    let (address, captured) = serve_once(
        200,
        r#"[{"id": 1, "title": "One", "x": 0.0, "y": 0.0}, {"id": 2, "x": 1.0, "y": 1.0}]"#,
    );
    let gateway = gateway_for(&address, "ids");

    let fetched = gateway.fetch_articles().unwrap();
    assert_eq!(fetched.articles.len(), 1);
    assert_eq!(fetched.skipped, 1);
    assert_eq!(
        captured.recv().unwrap().request_line,
        "GET /raw-data HTTP/1.1"
    );
}

#[test]
fn raw_data_status_failure_is_a_load_error() {
    let (address, _captured) = serve_once(503, "");
    let gateway = gateway_for(&address, "ids");

    let err = gateway.fetch_articles().unwrap_err();
    assert!(matches!(
        err,
        LoadError::Gateway(GatewayError::Response {
            status: Some(503),
            ..
        })
    ));
}
