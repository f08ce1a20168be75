//! Color-field texture construction

use super::map::ColorField;

/// CPU-side RGBA8 image handed to the rendering collaborator
#[derive(Clone, Debug, PartialEq)]
pub struct TextureArtifact {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

/// Flatten a color field into a tightly packed RGBA8 pixel buffer
pub fn build_color_texture(colors: &ColorField) -> TextureArtifact {
    let mut rgba = Vec::with_capacity(colors.width() * colors.height() * 4);
    for color in colors.pixels() {
        rgba.extend_from_slice(&[color.r, color.g, color.b, color.a]);
    }
    TextureArtifact {
        width: colors.width(),
        height: colors.height(),
        rgba,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::generation::map::MapGenerator;

    #[test]
    fn test_texture_dimensions_and_packing() {
        let data = MapGenerator::with_defaults(11).generate_at(Vec2::ZERO);
        let texture = build_color_texture(&data.color_field);

        assert_eq!(texture.width, data.color_field.width());
        assert_eq!(texture.height, data.color_field.height());
        assert_eq!(texture.rgba.len(), texture.width * texture.height * 4);

        // Spot-check the first pixel round-trips
        let first = data.color_field.get(0, 0);
        assert_eq!(&texture.rgba[0..4], &[first.r, first.g, first.b, first.a]);
    }
}
