//! Clients for the text-to-image services a frame can draw from.
//!
//! Every client hands back the image as the service produced it; fitting it
//! to a display is left to the caller.

mod error;

pub mod automatic;
pub mod dalle;
pub mod stability;

pub use crate::{
    automatic::Automatic,
    dalle::Dalle,
    error::{ApiError as Error, Result},
    stability::Stability,
};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use reqwest::{Client, Response};
use std::io::Cursor;

/// Decode an image sent inline as base64, with or without a `data:` prefix.
pub fn decode_image(data: &str) -> Result<DynamicImage> {
    let data = data.split_once(',').map_or(data, |(_, payload)| payload);
    let bytes = BASE64.decode(data.trim())?;
    Ok(image::load_from_memory(&bytes)?)
}

pub async fn fetch_image(client: &Client, url: &str) -> Result<DynamicImage> {
    log::info!("Fetching {}", url);
    let data = check(client.get(url).send().await?).await?.bytes().await?;
    Ok(image::load_from_memory(&data)?)
}

/// Turn a non-2xx response into [`Error::Status`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        body,
    })
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn png_round_trip_through_base64() {
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        let encoded = BASE64.encode(assert_ok!(encode_png(&image)));
        let decoded = assert_ok!(decode_image(&encoded));
        assert_eq!(decoded.to_rgba8(), image);

        let uri = format!("data:image/png;base64,{encoded}");
        assert_eq!(assert_ok!(decode_image(&uri)).to_rgba8(), image);
    }

    #[test]
    fn bad_payloads() {
        assert!(matches!(assert_err!(decode_image("%%%")), Error::Decode(_)));
        assert!(matches!(
            assert_err!(decode_image(&BASE64.encode(b"not an image"))),
            Error::Image(_)
        ));
    }
}
