#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self::new(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 hash the same.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    pub(crate) fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// `round(x * y / 255)` for 8-bit channel values.
pub(crate) fn mul_div255(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

// Shading-language helpers. Semantics match their GLSL/WGSL namesakes.

/// `0.0` below `edge`, `1.0` otherwise.
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Hermite ramp from `edge0` to `edge1`, clamped to `[0, 1]`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// `x - floor(x)`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// Linear blend, `a` at `t = 0` and `b` at `t = 1`.
pub fn mix(a: glam::Vec3, b: glam::Vec3, t: f32) -> glam::Vec3 {
    a * (1.0 - t) + b * t
}

/// Reduces `value` to `levels` discrete steps: `floor(value * levels) / levels`.
pub fn quantize(value: f32, levels: f32) -> f32 {
    (value * levels).floor() / levels
}

/// `reflect(i, n)` for a normalized `n`.
pub fn reflect(i: glam::Vec3, n: glam::Vec3) -> glam::Vec3 {
    i - 2.0 * n.dot(i) * n
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
