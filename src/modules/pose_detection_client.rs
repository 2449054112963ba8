use anyhow::Error;
use async_trait::async_trait;
use ndarray::{Array, Array3, Array4, ArrayView2, Axis, IxDyn};
use opencv::core::{Mat, MatTraitConst, Rect, Scalar, Size, Vec3b};
use opencv::imgproc;
use opencv::imgproc::resize;
use tracing::debug;
use crate::config::config::PoseDetectionConfig;
use crate::pose::detector::PoseDetector;
use crate::pose::landmark::{Landmark, LandmarkSet, NUM_POSE_LANDMARKS, PoseLandmark};
use crate::triton_client::client::triton::{InferTensorContents, ModelInferRequest, ModelInferResponse};
use crate::triton_client::client::triton::model_infer_request::{InferInputTensor, InferRequestedOutputTensor};
use crate::triton_client::client::TritonInferenceClient;
use crate::utils::image::convert_bgr_to_rgb;
use crate::utils::utils::{sigmoid, u8_to_f32_vec, u8_to_i32_vec};

/// Size of the resized image inside the model input, before padding.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Letterbox {
    pub width: i32,
    pub height: i32,
}

/// Pose landmark model served by Triton.
///
/// The model takes a `[1, 3, H, W]` FP32 image and answers with a landmark
/// tensor `[1, 33, D]` (`x`, `y` in input pixels, `z`, visibility logit, ...)
/// and a `[1, 1]` person presence logit.
#[derive(Debug, Clone)]
pub struct PoseDetectionClient {
    triton_infer_client: TritonInferenceClient,
    model_name: String,
    mean: f32,
    scale: f32,
    imsize: (i32, i32),
    input_name: String,
    landmarks_output: String,
    score_output: String,
    min_detection_confidence: f32,
    min_landmark_visibility: f32,
}

impl PoseDetectionClient {
    pub fn new(triton_infer_client: TritonInferenceClient, config: PoseDetectionConfig) -> Self {
        PoseDetectionClient {
            triton_infer_client,
            model_name: config.model_name,
            mean: config.mean,
            scale: config.scale,
            imsize: config.imsize,
            input_name: config.input_name,
            landmarks_output: config.landmarks_output,
            score_output: config.score_output,
            min_detection_confidence: config.min_detection_confidence,
            min_landmark_visibility: config.min_landmark_visibility,
        }
    }

    pub(crate) fn letterbox(&self, img_w: i32, img_h: i32) -> Letterbox {
        let (in_w, in_h) = self.imsize;
        let im_ratio = img_w as f32 / img_h as f32;
        let model_ratio = in_w as f32 / in_h as f32;

        let (new_width, new_height) = if im_ratio > model_ratio {
            (in_w, (in_w as f32 / im_ratio) as i32)
        } else {
            ((in_h as f32 * im_ratio) as i32, in_h)
        };
        Letterbox { width: new_width.max(1), height: new_height.max(1) }
    }

    /// preprocess letterboxes a BGR image into a normalized NCHW tensor.
    ///
    /// # Arguments
    /// * `img` - BGR OpenCV matrix
    ///
    /// # Returns
    /// * `Result<(Array4<f32>, Letterbox), Error>`
    pub(crate) fn preprocess(&self, img: &Mat) -> Result<(Array4<f32>, Letterbox), Error> {
        let (in_w, in_h) = self.imsize;
        if img.empty() {
            return Err(Error::msg("pose_detection_client - input image is empty"))
        }

        let img_rgb = convert_bgr_to_rgb(img)?;
        let letterbox = self.letterbox(img_rgb.cols(), img_rgb.rows());

        let mut img_resized = Mat::default();
        resize(
            &img_rgb,
            &mut img_resized,
            Size::new(letterbox.width, letterbox.height),
            0.0,
            0.0,
            imgproc::INTER_LINEAR,
        )?;

        let mut img_scaled = Mat::new_rows_cols_with_default(
            in_h,
            in_w,
            opencv::core::CV_8UC3,
            Scalar::all(0.0),
        )?;
        {
            let mut roi = Mat::roi_mut(
                &mut img_scaled,
                Rect::new(0, 0, letterbox.width, letterbox.height),
            )?;
            img_resized.copy_to(&mut roi)?;
        }

        let mut im_tensor = Array3::<f32>::zeros((in_h as usize, in_w as usize, 3usize));
        for y in 0..in_h {
            for x in 0..in_w {
                let pixel = img_scaled.at_2d::<Vec3b>(y, x)?;
                for c in 0..3 {
                    im_tensor[[y as usize, x as usize, c]] = (pixel[c] as f32 - self.mean) * self.scale;
                }
            }
        }

        let transposed_tensor = im_tensor.permuted_axes([2, 0, 1]);
        Ok((transposed_tensor.insert_axis(Axis(0)), letterbox))
    }

    fn build_request(&self, input_tensor: &Array4<f32>) -> ModelInferRequest {
        let model_input = InferInputTensor {
            name: self.input_name.to_owned(),
            datatype: "FP32".to_string(),
            shape: input_tensor.shape().iter().map(|&x| x as i64).collect(),
            contents: Some(InferTensorContents {
                fp32_contents: input_tensor.iter().copied().collect(),
                ..Default::default()
            }),
        };

        ModelInferRequest {
            model_name: self.model_name.to_owned(),
            model_version: "".to_string(),
            id: "".to_string(),
            inputs: vec![model_input],
            outputs: vec![
                InferRequestedOutputTensor { name: self.landmarks_output.to_owned() },
                InferRequestedOutputTensor { name: self.score_output.to_owned() },
            ],
            raw_input_contents: vec![],
        }
    }

    /// output_tensor extracts a named output of the response as an f32 array.
    fn output_tensor(&self, response: &ModelInferResponse, name: &str) -> Result<Array<f32, IxDyn>, Error> {
        let (oidx, output) = response.outputs
            .iter()
            .enumerate()
            .find(|(_, output)| output.name == name)
            .ok_or_else(|| Error::msg(format!("pose_detection_client - output `{}` is missing", name)))?;

        let dimensions: Vec<usize> = output.shape.iter().map(|&dim| dim.max(0) as usize).collect();
        let values: Vec<f32> = match response.raw_output_contents.get(oidx) {
            Some(raw) if !raw.is_empty() => match output.datatype.as_str() {
                "FP32" => u8_to_f32_vec(raw),
                "INT32" => u8_to_i32_vec(raw).iter().map(|&x| x as f32).collect(),
                other => {
                    return Err(Error::msg(format!("pose_detection_client - unsupported datatype {}", other)))
                }
            },
            _ => output.contents
                .as_ref()
                .map(|contents| contents.fp32_contents.clone())
                .unwrap_or_default(),
        };

        let f_arr = Array::from_shape_vec(IxDyn(&dimensions), values)?;
        Ok(f_arr)
    }

    /// postprocess turns the model answer into landmarks normalized to the source image.
    ///
    /// # Arguments
    /// * `response` - Triton inference response
    /// * `letterbox` - size of the resized image inside the model input
    ///
    /// # Returns
    /// * `Result<Option<LandmarkSet>, Error>`
    pub(crate) fn postprocess(&self, response: &ModelInferResponse, letterbox: Letterbox) -> Result<Option<LandmarkSet>, Error> {
        let score = self.output_tensor(response, &self.score_output)?;
        let presence = match score.iter().next() {
            None => return Err(Error::msg("pose_detection_client - presence score is empty")),
            Some(logit) => sigmoid(*logit),
        };
        debug!(presence, "pose presence score");
        if presence < self.min_detection_confidence {
            return Ok(None)
        }

        let landmarks = self.output_tensor(response, &self.landmarks_output)?;
        let total = landmarks.len();
        if total == 0 || total % NUM_POSE_LANDMARKS != 0 || total / NUM_POSE_LANDMARKS < 4 {
            return Err(Error::msg(format!(
                "pose_detection_client - unexpected landmark tensor shape {:?}", landmarks.shape()
            )))
        }
        let landmarks = landmarks
            .into_shape_with_order((NUM_POSE_LANDMARKS, total / NUM_POSE_LANDMARKS))?;

        Ok(Some(decode_landmarks(landmarks.view(), letterbox, self.min_landmark_visibility)))
    }
}

/// decode_landmarks maps model-input pixel coordinates back to normalized image coordinates.
pub(crate) fn decode_landmarks(landmarks: ArrayView2<f32>, letterbox: Letterbox, min_visibility: f32) -> LandmarkSet {
    let mut set = LandmarkSet::new();
    for (idx, row) in landmarks.axis_iter(Axis(0)).enumerate() {
        let kind = match PoseLandmark::from_index(idx) {
            None => break,
            Some(kind) => kind,
        };
        let visibility = sigmoid(row[3]);
        if visibility < min_visibility {
            continue
        }
        set.insert(kind, Landmark {
            x: row[0] / letterbox.width as f32,
            y: row[1] / letterbox.height as f32,
            z: row[2] / letterbox.width as f32,
            visibility,
        });
    }
    set
}

#[async_trait]
impl PoseDetector for PoseDetectionClient {
    async fn detect(&self, img: Mat) -> Result<Option<LandmarkSet>, Error> {
        let (input_tensor, letterbox) = self.preprocess(&img)?;
        drop(img);

        let request = self.build_request(&input_tensor);
        let response = self.triton_infer_client.model_infer(request).await?;
        self.postprocess(&response, letterbox)
    }

    async fn is_ready(&self) -> Result<bool, Error> {
        if !self.triton_infer_client.server_live().await? {
            return Ok(false)
        }
        self.triton_infer_client.model_ready(&self.model_name).await
    }
}


#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use opencv::core::{CV_8UC3, Mat, Scalar};
    use crate::config::config::PoseDetectionConfig;
    use crate::modules::pose_detection_client::{decode_landmarks, Letterbox, PoseDetectionClient};
    use crate::pose::landmark::{NUM_POSE_LANDMARKS, PoseLandmark};
    use crate::triton_client::client::TritonInferenceClient;
    use crate::triton_client::client::triton::ModelInferResponse;
    use crate::triton_client::client::triton::model_infer_response::InferOutputTensor;

    fn client() -> PoseDetectionClient {
        let config = PoseDetectionConfig::new();
        let triton = TritonInferenceClient::new(&config.triton_url, config.timeout).unwrap();
        PoseDetectionClient::new(triton, config)
    }

    fn response(landmarks: &[f32], presence_logit: f32) -> ModelInferResponse {
        let config = PoseDetectionConfig::new();
        ModelInferResponse {
            outputs: vec![
                InferOutputTensor {
                    name: config.landmarks_output,
                    datatype: "FP32".to_string(),
                    shape: vec![1, NUM_POSE_LANDMARKS as i64, (landmarks.len() / NUM_POSE_LANDMARKS) as i64],
                    contents: None,
                },
                InferOutputTensor {
                    name: config.score_output,
                    datatype: "FP32".to_string(),
                    shape: vec![1, 1],
                    contents: None,
                },
            ],
            raw_output_contents: vec![
                landmarks.iter().flat_map(|v| v.to_le_bytes()).collect(),
                presence_logit.to_le_bytes().to_vec(),
            ],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_letterbox() {
        let client = client();
        assert_eq!(client.letterbox(200, 100), Letterbox { width: 256, height: 128 });
        assert_eq!(client.letterbox(100, 200), Letterbox { width: 128, height: 256 });
        assert_eq!(client.letterbox(512, 512), Letterbox { width: 256, height: 256 });
    }

    #[tokio::test]
    async fn test_preprocess_pads_with_zeros() {
        let client = client();
        let img = Mat::new_rows_cols_with_default(100, 200, CV_8UC3, Scalar::new(0.0, 0.0, 255.0, 0.0)).unwrap();
        let (tensor, letterbox) = client.preprocess(&img).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 256, 256]);
        assert_eq!(letterbox, Letterbox { width: 256, height: 128 });
        // red in BGR lands in the first channel once converted to RGB
        assert!((tensor[[0, 0, 10, 10]] - 1.0).abs() < 1e-6);
        assert_eq!(tensor[[0, 2, 10, 10]], 0.0);
        assert_eq!(tensor[[0, 0, 200, 10]], 0.0);
    }

    #[tokio::test]
    async fn test_preprocess_rejects_empty_image() {
        assert!(client().preprocess(&Mat::default()).is_err());
    }

    #[tokio::test]
    async fn test_postprocess_absent_figure() {
        let landmarks = vec![0.0f32; NUM_POSE_LANDMARKS * 5];
        let result = client().postprocess(&response(&landmarks, -5.0), Letterbox { width: 256, height: 256 }).unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_postprocess_unletterboxes() {
        let mut landmarks = vec![0.0f32; NUM_POSE_LANDMARKS * 5];
        let nose = PoseLandmark::Nose.index() * 5;
        landmarks[nose] = 128.0;
        landmarks[nose + 1] = 32.0;
        landmarks[nose + 3] = 10.0;

        let result = client()
            .postprocess(&response(&landmarks, 5.0), Letterbox { width: 256, height: 128 })
            .unwrap()
            .unwrap();

        assert_eq!(result.len(), NUM_POSE_LANDMARKS);
        let lmk = result.get(PoseLandmark::Nose).unwrap();
        assert_eq!(lmk.x, 0.5);
        assert_eq!(lmk.y, 0.25);
        assert!(lmk.visibility > 0.99);
    }

    #[tokio::test]
    async fn test_postprocess_rejects_bad_shape() {
        let landmarks = vec![0.0f32; 10];
        assert!(client().postprocess(&response(&landmarks, 5.0), Letterbox { width: 256, height: 256 }).is_err());
    }

    #[test]
    fn test_decode_landmarks_drops_invisible_points() {
        let mut landmarks = Array2::<f32>::zeros((NUM_POSE_LANDMARKS, 4));
        landmarks[[PoseLandmark::LeftAnkle.index(), 3]] = -10.0;
        for idx in 0..NUM_POSE_LANDMARKS {
            if idx != PoseLandmark::LeftAnkle.index() {
                landmarks[[idx, 3]] = 10.0;
            }
        }

        let set = decode_landmarks(landmarks.view(), Letterbox { width: 256, height: 256 }, 0.5);
        assert_eq!(set.len(), NUM_POSE_LANDMARKS - 1);
        assert!(set.get(PoseLandmark::LeftAnkle).is_none());
    }
}
