use anyhow::Error;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use opencv::core::{Mat, MatTraitConst, Vector};
use opencv::imgcodecs::{imdecode, imencode, IMREAD_COLOR};
use opencv::imgproc::{COLOR_BGR2RGB, cvt_color};

const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// strip_data_uri returns the payload of a `data:<mime>;base64,<payload>` string.
///
/// Strings without a comma are returned untouched so bare base64 is accepted too.
pub fn strip_data_uri(image_data: &str) -> &str {
    match image_data.split_once(',') {
        Some((_, payload)) => payload,
        None => image_data,
    }
}

/// decode_base64_payload decodes the base64 part of a data URI into raw bytes.
///
/// Whitespace inside the payload is ignored, MIME encoders wrap lines at 76 columns.
///
/// # Arguments
/// * `image_data` - data URI or bare base64 string
///
/// # Returns
/// * `Result<Vec<u8>, Error>`
pub fn decode_base64_payload(image_data: &str) -> Result<Vec<u8>, Error> {
    let payload: String = strip_data_uri(image_data)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD.decode(payload)?;
    Ok(bytes)
}

/// decode_image decodes encoded image bytes into a BGR matrix.
///
/// Returns `None` when the bytes are not an image OpenCV can read.
///
/// # Arguments
/// * `im_bytes` - encoded image bytes (jpeg, png, ...)
///
/// # Returns
/// * `Result<Option<Mat>, Error>`
pub fn decode_image(im_bytes: &[u8]) -> Result<Option<Mat>, Error> {
    if im_bytes.is_empty() {
        return Ok(None)
    }

    let buf = Vector::<u8>::from_slice(im_bytes);
    let img = imdecode(&buf, IMREAD_COLOR)?;
    if img.empty() {
        return Ok(None)
    }
    Ok(Some(img))
}

/// convert_bgr_to_rgb swaps the channel order of a decoded image.
pub fn convert_bgr_to_rgb(img: &Mat) -> Result<Mat, Error> {
    let mut img_rgb = Mat::default();
    cvt_color(img, &mut img_rgb, COLOR_BGR2RGB, 0)?;
    Ok(img_rgb)
}

/// encode_jpeg_data_uri encodes a BGR matrix as a `data:image/jpeg;base64,` string.
///
/// # Arguments
/// * `img` - OpenCV matrix
///
/// # Returns
/// * `Result<String, Error>`
pub fn encode_jpeg_data_uri(img: &Mat) -> Result<String, Error> {
    let mut buf = Vector::<u8>::new();
    let encoded = imencode(".jpg", img, &mut buf, &Vector::new())?;
    if !encoded {
        return Err(Error::msg("image - jpeg encoding failed"))
    }
    Ok(format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(buf.as_slice())))
}
