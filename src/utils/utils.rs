use std::convert::TryInto;

pub fn u8_to_f32_vec(v: &[u8]) -> Vec<f32> {
    v.chunks_exact(4)
        .filter_map(|chunk| chunk.try_into().ok())
        .map(f32::from_le_bytes)
        .collect()
}

pub fn u8_to_i32_vec(v: &[u8]) -> Vec<i32> {
    v.chunks_exact(4)
        .filter_map(|chunk| chunk.try_into().ok())
        .map(i32::from_le_bytes)
        .collect()
}

/// round_to rounds `value` to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
