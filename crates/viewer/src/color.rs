#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const GREY: Self = Self::rgb(0.45, 0.45, 0.45);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Colours handed out to new lines, in order.
    pub const PALETTE: [Self; 8] = [
        Self::rgb(0.12, 0.47, 0.71),
        Self::rgb(1.0, 0.5, 0.05),
        Self::rgb(0.17, 0.63, 0.17),
        Self::rgb(0.84, 0.15, 0.16),
        Self::rgb(0.58, 0.4, 0.74),
        Self::rgb(0.55, 0.34, 0.29),
        Self::rgb(0.89, 0.47, 0.76),
        Self::rgb(0.74, 0.74, 0.13),
    ];

    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub fn palette(index: usize) -> Self {
        Self::PALETTE[index % Self::PALETTE.len()]
    }

    #[must_use]
    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}
