mod cusum_detector;

pub use cusum_detector::CusumDetector;
