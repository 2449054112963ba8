pub mod pose_detection_client;
