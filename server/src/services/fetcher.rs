use areamap_shared::{Area, AreaCollection, User, UserList};
use reqwest::StatusCode;

const BODY_PREVIEW_CHARS: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream status {status}; body preview: {preview}")]
    Status { status: StatusCode, preview: String },
    #[error("failed to decode payload: {source}; body preview: {preview}")]
    Decode {
        #[source]
        source: serde_json::Error,
        preview: String,
    },
}

pub async fn fetch_areas(client: &reqwest::Client, url: &str) -> Result<Vec<Area>, FetchError> {
    let bytes = fetch_body(client, url).await?;
    parse_area_payload(&bytes)
}

pub async fn fetch_users(client: &reqwest::Client, url: &str) -> Result<Vec<User>, FetchError> {
    let bytes = fetch_body(client, url).await?;
    parse_user_payload(&bytes)
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<bytes::Bytes, FetchError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            preview: body_preview(&bytes),
        });
    }
    Ok(bytes)
}

pub(crate) fn parse_area_payload(bytes: &[u8]) -> Result<Vec<Area>, FetchError> {
    serde_json::from_slice::<AreaCollection>(bytes)
        .map(AreaCollection::into_areas)
        .map_err(|source| FetchError::Decode {
            source,
            preview: body_preview(bytes),
        })
}

pub(crate) fn parse_user_payload(bytes: &[u8]) -> Result<Vec<User>, FetchError> {
    serde_json::from_slice::<UserList>(bytes)
        .map(|list| list.users)
        .map_err(|source| FetchError::Decode {
            source,
            preview: body_preview(bytes),
        })
}

fn body_preview(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .take(BODY_PREVIEW_CHARS)
        .collect()
}
