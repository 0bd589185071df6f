//! Buffers, matrices and sample conversion shared by the engines.

mod sample;
mod sample_buffer;
mod signal_ext;
mod square_matrix;

pub use sample::{to_sample, to_working, Sample};
pub use sample_buffer::SampleBuffer;
pub use signal_ext::SignalExt;
pub use square_matrix::SquareMatrix;
