//! Stability AI REST text-to-image.

use crate::{check, decode_image, Error, Result};
use frame_geometry::ceiling_multiple;
use image::DynamicImage;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str =
    "https://api.stability.ai/v1/generation/stable-diffusion-v1-6/text-to-image";
pub const MULTIPLE: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextToImage {
    pub width: u32,
    pub height: u32,
    pub steps: u32,
    pub seed: u32,
    pub cfg_scale: f32,
    pub samples: u32,
    pub style_preset: String,
    pub text_prompts: Vec<TextPrompt>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextPrompt {
    pub text: String,
    pub weight: f32,
}

impl TextToImage {
    pub fn new(prompt: &str, (width, height): (u32, u32)) -> Self {
        Self {
            width: ceiling_multiple(width, MULTIPLE),
            height: ceiling_multiple(height, MULTIPLE),
            steps: 50,
            seed: 0,
            cfg_scale: 7.0,
            samples: 1,
            style_preset: "enhance".to_owned(),
            text_prompts: vec![TextPrompt {
                text: prompt.to_owned(),
                weight: 1.0,
            }],
        }
    }
}

#[derive(Deserialize)]
struct Artifacts {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: String,
}

#[derive(Debug, Clone)]
pub struct Stability {
    client: Client,
    host: String,
    key: String,
}

impl Stability {
    pub fn new(host: impl Into<String>, key: impl Into<String>) -> Self {
        Self::with_client(Client::new(), host, key)
    }

    pub fn with_client(client: Client, host: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
            key: key.into(),
        }
    }

    pub async fn generate(&self, prompt: &str, size: (u32, u32)) -> Result<DynamicImage> {
        let body = TextToImage::new(prompt, size);
        log::info!("Requesting {}x{} image from {}", body.width, body.height, self.host);
        let response = self
            .client
            .post(&self.host)
            .bearer_auth(&self.key)
            .header(header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;
        let response: Artifacts = check(response).await?.json().await?;
        let artifact = response.artifacts.last().ok_or(Error::EmptyResponse)?;
        decode_image(&artifact.base64)
    }
}
