use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color, serialized as `[r, g, b, a]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 4]", into = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self {
            r: 128,
            g: 128,
            b: 128,
            a: 255,
        }
    }
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(c: Rgba) -> Self {
        c.to_array()
    }
}

/// Interleave four channel columns into a flat RGBA buffer.
///
/// Callers are expected to have checked that all four columns share a length;
/// the shortest column wins otherwise.
pub fn interleave_rgba(r: &[u8], g: &[u8], b: &[u8], a: &[u8]) -> Vec<u8> {
    let n = r.len().min(g.len()).min(b.len()).min(a.len());
    let mut out = Vec::with_capacity(n * 4);
    for i in 0..n {
        out.extend_from_slice(&[r[i], g[i], b[i], a[i]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interleave() {
        let out = interleave_rgba(&[1, 5], &[2, 6], &[3, 7], &[4, 8]);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_serde_as_array() {
        let c: Rgba = serde_json::from_str("[250, 250, 250, 128]").unwrap();
        assert_eq!(c, Rgba::new(250, 250, 250, 128));
        assert_eq!(serde_json::to_string(&c).unwrap(), "[250,250,250,128]");
    }

    #[test]
    fn test_f32_conversion() {
        let c = Rgba::new(255, 0, 0, 255).to_f32_array();
        assert!((c[0] - 1.0).abs() < 1e-6);
        assert!(c[1].abs() < 1e-6);
    }
}
