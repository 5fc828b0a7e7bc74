//! OpenAI images API: square generations and outpainting edits.

use crate::{check, decode_image, encode_png, fetch_image, Error, Result};
use frame_geometry::ops::{infill_canvas, shrink_by_percent};
use image::{DynamicImage, GenericImageView};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOST: &str = "https://api.openai.com/v1";
/// Square sides the service can produce, smallest first.
pub const SIZES: [u32; 3] = [256, 512, 1024];

/// Smallest available side covering both `width` and `height`, or the
/// largest one if none does.
pub fn square_size(width: u32, height: u32) -> u32 {
    let side = width.max(height);
    SIZES
        .into_iter()
        .find(|&size| size >= side)
        .unwrap_or(SIZES[SIZES.len() - 1])
}

/// Smallest available side strictly larger than both `width` and `height`,
/// leaving room around the image for an edit to paint.
pub fn infill_size(width: u32, height: u32) -> Option<u32> {
    let side = width.max(height);
    SIZES.into_iter().find(|&size| size > side)
}

pub fn size_name(side: u32) -> String {
    format!("{side}x{side}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Generation {
    pub prompt: String,
    pub n: u32,
    pub size: String,
}

impl Generation {
    pub fn new(prompt: &str, (width, height): (u32, u32)) -> Self {
        Self {
            prompt: prompt.to_owned(),
            n: 1,
            size: size_name(square_size(width, height)),
        }
    }
}

#[derive(Deserialize)]
struct Images {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Dalle {
    client: Client,
    host: String,
    key: String,
}

impl Dalle {
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
        let body = Generation::new(prompt, size);
        log::info!("Requesting {} image from OpenAI", body.size);
        let response = self
            .client
            .post(format!("{}/images/generations", self.host))
            .bearer_auth(&self.key)
            .json(&body)
            .send()
            .await?;
        self.first_image(response).await
    }

    /// Extend `image` outwards on every side, then shrink the result by
    /// `infill_percent` percent.
    ///
    /// `image` sits in the middle of the next square size up; the transparent
    /// border around it is what gets painted. Images already at the largest
    /// size come back unchanged.
    pub async fn infill(
        &self,
        prompt: &str,
        image: &DynamicImage,
        infill_percent: f64,
    ) -> Result<DynamicImage> {
        let (width, height) = image.dimensions();
        let Some(side) = infill_size(width, height) else {
            log::warn!("No size above {}x{} to infill to, skipping", width, height);
            return Ok(image.clone());
        };
        log::info!("Infilling {}x{} image to {}", width, height, size_name(side));
        let canvas = encode_png(&infill_canvas(image, side))?;
        let form = Form::new()
            .text("prompt", prompt.to_owned())
            .text("n", "1")
            .text("size", size_name(side))
            .part(
                "image",
                Part::bytes(canvas.clone())
                    .file_name("image.png")
                    .mime_str("image/png")?,
            )
            .part(
                "mask",
                Part::bytes(canvas)
                    .file_name("mask.png")
                    .mime_str("image/png")?,
            );
        let response = self
            .client
            .post(format!("{}/images/edits", self.host))
            .bearer_auth(&self.key)
            .multipart(form)
            .send()
            .await?;
        let image = self.first_image(response).await?;
        Ok(shrink_by_percent(&image, infill_percent))
    }

    async fn first_image(&self, response: Response) -> Result<DynamicImage> {
        let images: Images = check(response).await?.json().await?;
        let data = images.data.into_iter().next().ok_or(Error::EmptyResponse)?;
        match (data.b64_json, data.url) {
            (Some(encoded), _) => decode_image(&encoded),
            (None, Some(url)) => fetch_image(&self.client, &url).await,
            (None, None) => Err(Error::EmptyResponse),
        }
    }
}
