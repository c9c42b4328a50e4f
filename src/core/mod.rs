mod sample;

pub use sample::Sample;
