//! Stable Diffusion web UI (`AUTOMATIC1111`) running with `--api`.

use crate::{check, decode_image, Error, Result};
use frame_geometry::ceiling_multiple;
use image::DynamicImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;
/// Sizes the web UI accepts are multiples of this.
pub const MULTIPLE: u32 = 64;

const STEPS: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Txt2Img {
    pub prompt: String,
    pub steps: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Txt2Img {
    /// Request for at least `width` × `height`. A zero side leaves the size to
    /// the web UI.
    pub fn new(prompt: &str, (width, height): (u32, u32)) -> Self {
        let sized = width != 0 && height != 0;
        Self {
            prompt: prompt.to_owned(),
            steps: STEPS,
            width: sized.then(|| ceiling_multiple(width, MULTIPLE)),
            height: sized.then(|| ceiling_multiple(height, MULTIPLE)),
        }
    }
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Automatic {
    client: Client,
    url: String,
}

impl Automatic {
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_client(Client::new(), host, port)
    }

    pub fn with_client(client: Client, host: &str, port: u16) -> Self {
        Self {
            client,
            url: format!("http://{host}:{port}/sdapi/v1/txt2img"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn generate(&self, prompt: &str, size: (u32, u32)) -> Result<DynamicImage> {
        let request = Txt2Img::new(prompt, size);
        log::info!(
            "Requesting {:?}x{:?} image from {}",
            request.width,
            request.height,
            self.url
        );
        let response = self.client.post(&self.url).json(&request).send().await?;
        let response: Txt2ImgResponse = check(response).await?.json().await?;
        let image = response.images.first().ok_or(Error::EmptyResponse)?;
        decode_image(image)
    }
}
