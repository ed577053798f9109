use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;

const FALLBACK_SAMPLE_MIME: &str = "image/webp";

#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageArtifact {
    pub fn from_path(path: &Path) -> Result<ImageArtifact> {
        let bytes = fs::read(path)
            .with_context(|| format!("Could not read selected image {}", path.display()))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_from_extension(path)
            .unwrap_or("application/octet-stream")
            .to_string();
        Ok(ImageArtifact { name, mime, bytes })
    }

    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sample {
    pub label: &'static str,
    pub locator: &'static str,
    pub suggested_name: &'static str,
}

pub const SAMPLES: [Sample; 2] = [
    Sample {
        label: "Gangatiri sample",
        locator: "https://upload.wikimedia.org/wikipedia/commons/d/d2/Gangatiri_cattle.jpg",
        suggested_name: "gangatiri-cattle.webp",
    },
    Sample {
        label: "Gir sample",
        locator: "https://upload.wikimedia.org/wikipedia/commons/8/81/Gir_cow.jpg",
        suggested_name: "gir-cow.webp",
    },
];

pub fn fetch_sample(sample: &Sample) -> Result<ImageArtifact> {
    let client = build_http_client()?;
    let response = client
        .get(sample.locator)
        .send()
        .with_context(|| format!("HTTP request failed for {}", sample.locator))?;
    let status = response.status();
    if !status.is_success() {
        bail!("HTTP {status} for {}", sample.locator);
    }

    let mime = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(mime_from_content_type)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_SAMPLE_MIME.to_string());
    let bytes = response
        .bytes()
        .with_context(|| format!("Could not read sample body from {}", sample.locator))?
        .to_vec();

    Ok(ImageArtifact {
        name: sample.suggested_name.to_string(),
        mime,
        bytes,
    })
}

fn build_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .context("Could not initialize HTTP client for sample fetch")
}

fn mime_from_content_type(header: &str) -> String {
    header
        .split(';')
        .next()
        .unwrap_or(header)
        .trim()
        .to_string()
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_string_lossy().to_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}
