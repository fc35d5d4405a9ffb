//! Blocking HTTP implementation of [`ConnectionApi`]

use std::path::Path;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::Context;
use crate::domain::{Connection, ConnectionPage, NewConnection, PageRequest};
use crate::infrastructure::traits::{ApiError, ApiResult, ConnectionApi};
use crate::infrastructure::{InfraError, InfraResult};

/// Connection collection path on the platform server.
pub const CONNECTIONS_PATH: &str = "/api/integrations/connections";

/// Talks to the platform server of one configuration context.
#[derive(Debug)]
pub struct HttpConnectionApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpConnectionApi {
    /// Build a client for the given context, reading its token file if configured.
    pub fn new(context: &Context) -> InfraResult<Self> {
        let token = match &context.token_file {
            Some(path) => Some(read_token(path)?),
            None => None,
        };

        let client = Client::builder()
            .timeout(context.timeout)
            .user_agent(concat!("meshconn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InfraError::Http {
                message: e.to_string(),
            })?;

        debug!(
            "http client: context={} platform={} endpoint={} token={}",
            context.name,
            context.platform,
            context.endpoint,
            token.is_some()
        );

        Ok(Self::with_client(client, &context.endpoint, token))
    }

    /// Use a prepared client against `endpoint`.
    pub fn with_client(client: Client, endpoint: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: connections_url(endpoint),
            token,
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

impl ConnectionApi for HttpConnectionApi {
    fn list(&self, request: &PageRequest) -> ApiResult<ConnectionPage> {
        let query = list_query(request);
        trace!("GET {} {:?}", self.base_url, query);
        let response = self
            .authorize(self.client.get(&self.base_url).query(&query))
            .send()
            .map_err(transport_err)?;
        check_status(response, "connections")?
            .json::<ConnectionPage>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn delete(&self, id: Uuid) -> ApiResult<()> {
        let url = format!("{}/{}", self.base_url, id);
        trace!("DELETE {}", url);
        let response = self
            .authorize(self.client.delete(&url))
            .send()
            .map_err(transport_err)?;
        check_status(response, &format!("connection {id}"))?;
        Ok(())
    }

    fn create(&self, connection: &NewConnection) -> ApiResult<Connection> {
        trace!("POST {} name={}", self.base_url, connection.name);
        let response = self
            .authorize(self.client.post(&self.base_url).json(connection))
            .send()
            .map_err(transport_err)?;
        check_status(response, "connections")?
            .json::<Connection>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Collection URL for an endpoint (trailing slashes are ignored).
pub fn connections_url(endpoint: &str) -> String {
    format!("{}{}", endpoint.trim_end_matches('/'), CONNECTIONS_PATH)
}

/// Query parameters for a list request; the API pages from zero.
pub fn list_query(request: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", request.api_page().to_string()),
        ("pagesize", request.page_size.to_string()),
    ];
    if let Some(search) = request.search.as_deref().filter(|s| !s.is_empty()) {
        query.push(("search", search.to_string()));
    }
    query
}

/// Extract the token from a token file.
///
/// Accepts either a JSON object with a `token` field or the bare token.
pub fn parse_token(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(trimmed) {
        return map
            .get("token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
    }
    Some(trimmed.to_string())
}

fn read_token(path: &Path) -> InfraResult<String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read token file {}", path.display()), e))?;
    parse_token(&content).ok_or_else(|| InfraError::Token {
        path: path.to_path_buf(),
        message: "no token found".into(),
    })
}

fn transport_err(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

fn check_status(response: Response, what: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(what.to_string())),
        _ => {
            let body = response.text().unwrap_or_default();
            Err(ApiError::Status {
                code: status.as_u16(),
                body: body.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    /// Answer one request with `status` and `body`; the join handle yields the raw request head.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&head).to_lowercase()
        });
        (endpoint, handle)
    }

    fn api(endpoint: &str, token: Option<&str>) -> HttpConnectionApi {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpConnectionApi::with_client(client, endpoint, token.map(String::from))
    }

    #[test]
    fn given_token_when_listing_then_sends_bearer_and_zero_based_page() {
        let body = r#"{"connections": [], "total_count": 0, "page": 1, "page_size": 10}"#;
        let (endpoint, server) = serve_once("200 OK", body);

        let page = api(&endpoint, Some("abc123"))
            .list(&PageRequest::new(2, 10))
            .unwrap();

        let request = server.join().unwrap();
        assert_eq!(page.total_count, 0);
        assert!(
            request.starts_with("get /api/integrations/connections?page=1&pagesize=10 "),
            "{request}"
        );
        assert!(request.contains("authorization: bearer abc123"), "{request}");
    }

    #[test]
    fn given_no_token_when_listing_then_sends_no_authorization() {
        let (endpoint, server) = serve_once("200 OK", "{}");

        api(&endpoint, None).list(&PageRequest::new(1, 10)).unwrap();

        let request = server.join().unwrap();
        assert!(!request.contains("authorization:"), "{request}");
    }

    #[test]
    fn given_401_or_403_when_listing_then_unauthorized() {
        for status in ["401 Unauthorized", "403 Forbidden"] {
            let (endpoint, server) = serve_once(status, "");

            let err = api(&endpoint, Some("stale"))
                .list(&PageRequest::new(1, 10))
                .unwrap_err();

            server.join().unwrap();
            assert_eq!(err, ApiError::Unauthorized, "{status}");
        }
    }

    #[test]
    fn given_404_when_deleting_then_not_found_names_connection() {
        let id = Uuid::new_v4();
        let (endpoint, server) = serve_once("404 Not Found", "");

        let err = api(&endpoint, None).delete(id).unwrap_err();

        let request = server.join().unwrap();
        assert!(request.starts_with(&format!("delete /api/integrations/connections/{id} ")));
        assert_eq!(err, ApiError::NotFound(format!("connection {id}")));
    }

    #[test]
    fn given_204_when_deleting_then_ok() {
        let (endpoint, server) = serve_once("204 No Content", "");

        let result = api(&endpoint, None).delete(Uuid::new_v4());

        server.join().unwrap();
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn given_server_error_when_listing_then_status_with_trimmed_body() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "  boom\n");

        let err = api(&endpoint, None)
            .list(&PageRequest::new(1, 10))
            .unwrap_err();

        server.join().unwrap();
        assert_eq!(
            err,
            ApiError::Status {
                code: 500,
                body: "boom".into()
            }
        );
    }

    #[test]
    fn given_endpoint_with_trailing_slash_when_building_url_then_no_double_slash() {
        assert_eq!(
            connections_url("http://localhost:9081/"),
            "http://localhost:9081/api/integrations/connections"
        );
    }

    #[test]
    fn given_page_request_when_building_query_then_page_is_zero_based() {
        let query = list_query(&PageRequest::new(3, 25));
        assert_eq!(
            query,
            vec![("page", "2".to_string()), ("pagesize", "25".to_string())]
        );
    }

    #[test]
    fn given_search_all_when_building_query_then_includes_search_and_all() {
        let query = list_query(&PageRequest::all().with_search("prod"));
        assert!(query.contains(&("pagesize", "all".to_string())));
        assert!(query.contains(&("search", "prod".to_string())));
    }

    #[test]
    fn given_json_token_file_when_parsing_then_reads_token_field() {
        let content = r#"{"meshery-provider": "Layer5", "token": "abc123"}"#;
        assert_eq!(parse_token(content), Some("abc123".to_string()));
    }

    #[test]
    fn given_bare_token_when_parsing_then_trims() {
        assert_eq!(parse_token("  abc123\n"), Some("abc123".to_string()));
        assert_eq!(parse_token("\n"), None);
    }

    #[test]
    fn given_missing_token_file_when_creating_client_then_io_error() {
        let context = Context {
            name: "local".into(),
            endpoint: "http://localhost:9081".into(),
            platform: "docker".into(),
            token_file: Some("/nonexistent/meshconn/token".into()),
            timeout: Duration::from_secs(1),
        };
        let result = HttpConnectionApi::new(&context);
        assert!(matches!(result, Err(InfraError::Io { .. })));
    }
}
