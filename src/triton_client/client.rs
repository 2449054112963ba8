use std::time::Duration;
use anyhow::{Context, Error};
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};

/// Subset of the KServe v2 `inference.GRPCInferenceService` messages used by the pipeline.
pub mod triton {

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ServerLiveRequest {}

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ServerLiveResponse {
        #[prost(bool, tag = "1")]
        pub live: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelReadyRequest {
        #[prost(string, tag = "1")]
        pub name: String,
        #[prost(string, tag = "2")]
        pub version: String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelReadyResponse {
        #[prost(bool, tag = "1")]
        pub ready: bool,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct InferTensorContents {
        #[prost(bool, repeated, tag = "1")]
        pub bool_contents: Vec<bool>,
        #[prost(int32, repeated, tag = "2")]
        pub int_contents: Vec<i32>,
        #[prost(int64, repeated, tag = "3")]
        pub int64_contents: Vec<i64>,
        #[prost(uint32, repeated, tag = "4")]
        pub uint_contents: Vec<u32>,
        #[prost(uint64, repeated, tag = "5")]
        pub uint64_contents: Vec<u64>,
        #[prost(float, repeated, tag = "6")]
        pub fp32_contents: Vec<f32>,
        #[prost(double, repeated, tag = "7")]
        pub fp64_contents: Vec<f64>,
        #[prost(bytes = "vec", repeated, tag = "8")]
        pub bytes_contents: Vec<Vec<u8>>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelInferRequest {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(message, repeated, tag = "5")]
        pub inputs: Vec<model_infer_request::InferInputTensor>,
        #[prost(message, repeated, tag = "6")]
        pub outputs: Vec<model_infer_request::InferRequestedOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "7")]
        pub raw_input_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_request {

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferInputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferRequestedOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
        }
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ModelInferResponse {
        #[prost(string, tag = "1")]
        pub model_name: String,
        #[prost(string, tag = "2")]
        pub model_version: String,
        #[prost(string, tag = "3")]
        pub id: String,
        #[prost(message, repeated, tag = "5")]
        pub outputs: Vec<model_infer_response::InferOutputTensor>,
        #[prost(bytes = "vec", repeated, tag = "6")]
        pub raw_output_contents: Vec<Vec<u8>>,
    }

    pub mod model_infer_response {

        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct InferOutputTensor {
            #[prost(string, tag = "1")]
            pub name: String,
            #[prost(string, tag = "2")]
            pub datatype: String,
            #[prost(int64, repeated, tag = "3")]
            pub shape: Vec<i64>,
            #[prost(message, optional, tag = "5")]
            pub contents: Option<super::InferTensorContents>,
        }
    }
}

const SERVER_LIVE: &str = "/inference.GRPCInferenceService/ServerLive";
const MODEL_READY: &str = "/inference.GRPCInferenceService/ModelReady";
const MODEL_INFER: &str = "/inference.GRPCInferenceService/ModelInfer";

/// gRPC client of a Triton inference server.
///
/// Cloning is cheap, clones share the underlying channel.
#[derive(Debug, Clone)]
pub struct TritonInferenceClient {
    inner: tonic::client::Grpc<Channel>,
    timeout: Duration,
}

impl TritonInferenceClient {

    /// new builds a client over a lazily connected channel.
    ///
    /// # Arguments
    /// * `url` - server address, e.g. `http://127.0.0.1:8001`
    /// * `timeout` - per call deadline, in seconds
    ///
    /// # Returns
    /// * `Result<TritonInferenceClient, Error>`
    pub fn new(url: &str, timeout: i32) -> Result<Self, Error> {
        let timeout = Duration::from_secs(timeout.max(1) as u64);
        let channel = Endpoint::from_shared(url.to_string())
            .with_context(|| format!("triton_client - invalid url {}", url))?
            .connect_timeout(timeout)
            .connect_lazy();

        Ok(TritonInferenceClient {
            inner: tonic::client::Grpc::new(channel),
            timeout,
        })
    }

    async fn unary<Req, Resp>(&self, path: &'static str, message: Req) -> Result<Resp, Error>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = self.inner.clone();
        grpc.ready().await.context("triton_client - service was not ready")?;

        let mut request = tonic::Request::new(message);
        request.set_timeout(self.timeout);

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
            .with_context(|| format!("triton_client - {} failed", path))?;
        Ok(response.into_inner())
    }

    pub async fn server_live(&self) -> Result<bool, Error> {
        let response: triton::ServerLiveResponse = self.unary(SERVER_LIVE, triton::ServerLiveRequest {}).await?;
        Ok(response.live)
    }

    pub async fn model_ready(&self, model_name: &str) -> Result<bool, Error> {
        let request = triton::ModelReadyRequest {
            name: model_name.to_string(),
            version: String::new(),
        };
        let response: triton::ModelReadyResponse = self.unary(MODEL_READY, request).await?;
        Ok(response.ready)
    }

    pub async fn model_infer(&self, request: triton::ModelInferRequest) -> Result<triton::ModelInferResponse, Error> {
        self.unary(MODEL_INFER, request).await
    }
}


#[cfg(test)]
mod tests {
    use prost::Message;
    use crate::triton_client::client::TritonInferenceClient;
    use crate::triton_client::client::triton::{InferTensorContents, ModelInferRequest};
    use crate::triton_client::client::triton::model_infer_request::InferInputTensor;

    #[test]
    fn test_infer_request_wire_format() {
        let request = ModelInferRequest {
            model_name: "pose_landmark".to_string(),
            inputs: vec![InferInputTensor {
                name: "input_1".to_string(),
                datatype: "FP32".to_string(),
                shape: vec![1, 3, 2, 2],
                contents: Some(InferTensorContents {
                    fp32_contents: vec![0.0; 12],
                    ..Default::default()
                }),
            }],
            ..Default::default()
        };

        let bytes = request.encode_to_vec();
        // field 1, length delimited
        assert_eq!(bytes[0], 0x0a);
        assert_eq!(ModelInferRequest::decode(bytes.as_slice()).unwrap(), request);
    }

    #[tokio::test]
    async fn test_invalid_url() {
        assert!(TritonInferenceClient::new("not a url", 5).is_err());
    }

    #[tokio::test]
    async fn test_lazy_connection() {
        assert!(TritonInferenceClient::new("http://127.0.0.1:8001", 5).is_ok());
    }
}
