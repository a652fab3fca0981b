#[cfg(test)]
use crate::Tensor;
#[cfg(test)]
use std::io::Write;
#[cfg(test)]
use tempfile::NamedTempFile;

/// Asserts that two floating point values are approximately equal
///
/// # Arguments
/// * `a` - First value
/// * `b` - Second value
/// * `epsilon` - Maximum allowed difference
#[cfg(test)]
pub fn assert_close(a: f32, b: f32, epsilon: f32) {
    assert!((a - b).abs() <= epsilon, "{} != {} (eps {})", a, b, epsilon);
}

/// Asserts that two tensors are exactly equal in both shape and values
///
/// # Arguments
/// * `a` - First tensor
/// * `b` - Second tensor
#[cfg(test)]
pub fn assert_tensors_eq(a: &Tensor, b: &Tensor) {
    assert_eq!(a.shape, b.shape);
    for (x, y) in a.data.iter().zip(b.data.iter()) {
        assert_eq!(x, y)
    }
}

/// Writes `contents` to a fresh temporary file, removed when dropped
#[cfg(test)]
pub fn write_data_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
