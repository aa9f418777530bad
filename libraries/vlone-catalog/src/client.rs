//! HTTP catalog client.

use crate::error::{CatalogClientError, Result};
use crate::types::{ApiSong, ApiSongPage, CatalogConfig, CatalogStats, Category, Era};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;
use vlone_core::{CatalogClient, SearchPage, SearchQuery, Track, TrackId};

/// Client for the JSON catalog API.
///
/// Implements [`CatalogClient`] for the playback engine and exposes the
/// browse endpoints (stats, eras, categories) used by views.
///
/// # Example
///
/// ```no_run
/// use vlone_catalog::{CatalogConfig, HttpCatalogClient};
/// use vlone_core::CatalogClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpCatalogClient::new(CatalogConfig::default())?;
/// let track = client.fetch_random_track().await?;
/// println!("Radio: {} by {}", track.title, track.artist);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: Client,
    config: CatalogConfig,
    base: Url,
}

impl HttpCatalogClient {
    /// Create a new client with the given configuration.
    pub fn new(config: CatalogConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(CatalogClientError::InvalidUrl("URL cannot be empty".into()));
        }
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(CatalogClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }

        // Trailing slash so relative joins keep any base path
        let base = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("VlonePlayer/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config, base })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Fetch a song by id.
    pub async fn get_song(&self, id: &TrackId) -> Result<Track> {
        let mut url = self.endpoint("songs/")?;
        url.path_segments_mut()
            .map_err(|()| CatalogClientError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .push(id.as_str());

        let song: Option<ApiSong> = self.get_json_or_missing(url).await?;
        let song = song.ok_or_else(|| CatalogClientError::NotFound(id.to_string()))?;
        self.to_track(song)
    }

    /// Fetch one random song (radio endpoint).
    pub async fn get_random_song(&self) -> Result<Track> {
        let url = self.endpoint("radio/random/")?;
        let song: ApiSong = self.get_json(url).await?;
        let track = self.to_track(song)?;

        debug!(track_id = %track.id, "Fetched radio track");
        Ok(track)
    }

    /// Search songs, one page at a time.
    pub async fn search_songs(&self, query: &SearchQuery) -> Result<SearchPage> {
        let mut url = self.endpoint("songs/")?;
        {
            let mut params = url.query_pairs_mut();
            if let Some(search) = &query.search {
                params.append_pair("search", search);
            }
            if let Some(category) = &query.category {
                params.append_pair("category", category);
            }
            if let Some(era) = &query.era {
                params.append_pair("era", era);
            }
            // Producers are only matched by the catch-all search
            if let Some(producer) = &query.producer {
                params.append_pair("searchall", producer);
            }
            if let Some(page) = query.page {
                params.append_pair("page", &page.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        let page: ApiSongPage = self.get_json(url).await?;
        let items: Vec<Track> = page
            .results
            .into_iter()
            .filter_map(|song| {
                let track = song.into_track(&self.config);
                if track.is_none() {
                    warn!("Skipping search result without an id");
                }
                track
            })
            .collect();

        debug!(items = items.len(), total = page.count, "Search completed");
        Ok(SearchPage {
            items,
            total: page.count,
        })
    }

    /// Catalog-wide statistics.
    pub async fn get_stats(&self) -> Result<CatalogStats> {
        self.get_json(self.endpoint("stats")?).await
    }

    pub async fn get_eras(&self) -> Result<Vec<Era>> {
        self.get_json(self.endpoint("eras")?).await
    }

    pub async fn get_categories(&self) -> Result<Vec<Category>> {
        self.get_json(self.endpoint("categories")?).await
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    fn to_track(&self, song: ApiSong) -> Result<Track> {
        song.into_track(&self.config)
            .ok_or_else(|| CatalogClientError::ParseError("song has no id".into()))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let display = url.to_string();
        self.get_json_or_missing(url)
            .await?
            .ok_or_else(|| CatalogClientError::ServerError {
                status: StatusCode::NOT_FOUND.as_u16(),
                message: format!("{} not found", display),
            })
    }

    /// GET and decode, with 404 mapped to `None`
    async fn get_json_or_missing<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        debug!(url = %url, "Catalog request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(CatalogClientError::from_transport)?;

        let status = response.status();

        if status.is_success() {
            let body = response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    CatalogClientError::ServerUnreachable(e.to_string())
                } else {
                    CatalogClientError::ParseError(e.to_string())
                }
            })?;
            Ok(Some(body))
        } else if status == StatusCode::NOT_FOUND {
            Ok(None)
        } else {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Catalog request failed");
            Err(CatalogClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_track(&self, id: &TrackId) -> vlone_core::Result<Track> {
        Ok(self.get_song(id).await?)
    }

    async fn fetch_random_track(&self) -> vlone_core::Result<Track> {
        Ok(self.get_random_song().await?)
    }

    async fn search_tracks(&self, query: &SearchQuery) -> vlone_core::Result<SearchPage> {
        Ok(self.search_songs(query).await?)
    }
}
