pub mod amplitude;
pub mod decimate;
pub mod resample;
pub mod stft;
