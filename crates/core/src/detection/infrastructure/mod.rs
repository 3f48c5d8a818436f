pub mod null_face_detector;
