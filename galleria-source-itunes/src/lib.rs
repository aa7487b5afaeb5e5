use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use galleria_core::error::{GalleryError, Result};
use galleria_core::models::{MediaType, SearchResultRecord};
use galleria_core::query::SearchQuery;
use galleria_core::sources::ArtworkSource;

const API_BASE: &str = "https://itunes.apple.com/search";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItunesConfig {
    pub endpoint: String,
    pub default_media: MediaType,
}

impl Default for ItunesConfig {
    fn default() -> Self {
        Self {
            endpoint: API_BASE.into(),
            default_media: MediaType::Music,
        }
    }
}

impl ItunesConfig {
    /// Reads `[sources.itunes]`; a missing or malformed section yields defaults.
    pub fn from_table(table: &toml::Table) -> Self {
        table
            .get("itunes")
            .and_then(|val| val.clone().try_into().ok())
            .unwrap_or_default()
    }
}

pub fn create_source(table: &toml::Table, client: reqwest::Client) -> ItunesClient {
    ItunesClient::new(ItunesConfig::from_table(table), client)
}

pub struct ItunesClient {
    config: ItunesConfig,
    client: reqwest::Client,
}

impl ItunesClient {
    pub fn new(config: ItunesConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &ItunesConfig {
        &self.config
    }
}

#[async_trait]
impl ArtworkSource for ItunesClient {
    fn name(&self) -> &str {
        "iTunes"
    }

    fn query_url(&self, query: &SearchQuery) -> String {
        query.url(&self.config.endpoint)
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultRecord>> {
        let url = self.query_url(query);
        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let records = parse_response(&body)?;
        debug!(url = %url, count = records.len(), "itunes search returned");
        Ok(records)
    }

    async fn download(&self, url: &str) -> Result<bytes::Bytes> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes)
    }
}

/// Turns a response body into result records. An empty list is a valid
/// response; an empty, `null` or unparseable body, or an object without a
/// `results` list, is not.
fn parse_response(body: &str) -> Result<Vec<SearchResultRecord>> {
    if body.trim().is_empty() {
        return Err(GalleryError::MalformedResponse("empty body".into()));
    }
    let resp: Option<ItunesResponse> = serde_json::from_str(body)
        .map_err(|e| GalleryError::MalformedResponse(e.to_string()))?;
    let Some(resp) = resp else {
        return Err(GalleryError::MalformedResponse("null body".into()));
    };
    Ok(resp
        .results
        .into_iter()
        .filter_map(|r| r.artwork_url100)
        .map(SearchResultRecord::new)
        .collect())
}

// -- API response types --

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    results: Vec<ItunesResult>,
}

#[derive(Debug, Deserialize)]
struct ItunesResult {
    #[serde(rename = "artworkUrl100")]
    artwork_url100: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const MOCK_RESPONSE: &str = r##"{
        "resultCount": 3,
        "results": [
            {
                "wrapperType": "track",
                "kind": "song",
                "artistName": "The Beatles",
                "collectionName": "Abbey Road",
                "trackName": "Come Together",
                "artworkUrl30": "https://is1.mzstatic.com/image/thumb/abbey/30x30bb.jpg",
                "artworkUrl60": "https://is1.mzstatic.com/image/thumb/abbey/60x60bb.jpg",
                "artworkUrl100": "https://is1.mzstatic.com/image/thumb/abbey/100x100bb.jpg",
                "trackPrice": 1.29
            },
            {
                "wrapperType": "track",
                "kind": "song",
                "trackName": "Something",
                "artworkUrl100": "https://is1.mzstatic.com/image/thumb/abbey/100x100bb.jpg"
            },
            {
                "wrapperType": "audiobook",
                "collectionName": "No Artwork"
            }
        ]
    }"##;

    #[test]
    fn test_parse_itunes_response() {
        let records = parse_response(MOCK_RESPONSE).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].artwork_url,
            "https://is1.mzstatic.com/image/thumb/abbey/100x100bb.jpg"
        );
        // duplicates are left for the selector
        assert_eq!(records[0], records[1]);
    }

    #[test]
    fn test_empty_result_list_is_valid() {
        let records = parse_response(r#"{"resultCount": 0, "results": []}"#).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_malformed_bodies() {
        for body in [
            "",
            "   \n",
            "null",
            "{not json",
            "<html></html>",
            "{}",
            r#"{"errorMessage":"Invalid value(s) for key(s): [mediaType]"}"#,
            r#"{"resultCount": 0, "results": null}"#,
        ] {
            let err = parse_response(body).unwrap_err();
            assert!(
                matches!(err, GalleryError::MalformedResponse(_)),
                "body {body:?} gave {err}"
            );
        }
        assert!(matches!(
            parse_response("null"),
            Err(GalleryError::MalformedResponse(m)) if m == "null body"
        ));
    }

    #[test]
    fn test_config_from_table() {
        let table: toml::Table = toml::from_str(
            r#"
[itunes]
endpoint = "http://localhost:8080/search"
default_media = "tvShow"
"#,
        )
        .unwrap();
        let config = ItunesConfig::from_table(&table);
        assert_eq!(config.endpoint, "http://localhost:8080/search");
        assert_eq!(config.default_media, MediaType::TvShow);

        let defaults = ItunesConfig::from_table(&toml::Table::new());
        assert_eq!(defaults.endpoint, API_BASE);
        assert_eq!(defaults.default_media, MediaType::Music);
    }

    #[test]
    fn test_query_url_uses_endpoint() {
        let client = ItunesClient::new(ItunesConfig::default(), reqwest::Client::new());
        let q = SearchQuery::new("abbey road", MediaType::Music);
        assert_eq!(
            client.query_url(&q),
            "https://itunes.apple.com/search?term=abbey+road&limit=200&media=music"
        );
    }

    /// Serves one canned HTTP response and returns the endpoint URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = sock.read(&mut buf).await;
            let resp = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = sock.write_all(resp.as_bytes()).await;
        });
        format!("http://{addr}/search")
    }

    #[tokio::test]
    async fn test_search_against_local_server() {
        let endpoint = serve_once("200 OK", MOCK_RESPONSE).await;
        let client = ItunesClient::new(
            ItunesConfig {
                endpoint,
                ..Default::default()
            },
            reqwest::Client::new(),
        );
        let records = client
            .search(&SearchQuery::new("beatles", MediaType::Music))
            .await
            .unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_transport_error() {
        let endpoint = serve_once("503 Service Unavailable", "{}").await;
        let client = ItunesClient::new(
            ItunesConfig {
                endpoint,
                ..Default::default()
            },
            reqwest::Client::new(),
        );
        let err = client
            .search(&SearchQuery::new("beatles", MediaType::Music))
            .await
            .unwrap_err();
        assert!(matches!(err, GalleryError::Transport(_)));
    }
}
