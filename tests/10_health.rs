mod common;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("access-control-allow-origin").and_then(|v| v.to_str().ok()),
        Some("*")
    );

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["status"], "healthy", "unexpected body: {}", body);
    assert_eq!(body["service"], "weather-api");
    assert_eq!(body["database"], "connected");
    Ok(())
}

#[tokio::test]
async fn preflight_returns_empty_object() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .request(reqwest::Method::OPTIONS, format!("{}/weather/statistics", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await?, "{}");
    Ok(())
}
