use glam::UVec2;

use super::Terrain;
use crate::error::TerrainError;

/// Parses a plain graymap. Column `c` of row `r` becomes cell `(c, r)`.
pub(super) fn terrain_from_pgm(text: &str, scaling: f32) -> Result<Terrain, TerrainError> {
    let mut tokens = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .flat_map(str::split_whitespace);

    let magic = tokens.next().ok_or(TerrainError::MissingHeader("magic"))?;
    if magic != "P2" {
        return Err(TerrainError::BadMagic(magic.to_string()));
    }
    let width = parse_header(tokens.next(), "width")?;
    let height = parse_header(tokens.next(), "height")?;
    let maxval = parse_header(tokens.next(), "maxval")?;
    if width == 0 || height == 0 {
        return Err(TerrainError::EmptyDimensions { width, height });
    }
    if maxval == 0 {
        return Err(TerrainError::ZeroMaxval);
    }

    let expected = (width as usize)
        .checked_mul(height as usize)
        .ok_or(TerrainError::TooLarge { width, height })?;
    // The header is untrusted; let the sample count decide the size.
    let mut samples = Vec::with_capacity(expected.min(text.len() / 2 + 1));
    for token in tokens {
        let sample = parse_number(token, "sample")?;
        if sample > maxval {
            return Err(TerrainError::SampleOutOfRange { sample, maxval });
        }
        samples.push(sample);
    }
    if samples.len() != expected {
        return Err(TerrainError::SampleCount {
            expected,
            actual: samples.len(),
        });
    }

    // Samples arrive row by row; the grid wants y varying fastest.
    let mut heights = vec![0.0; expected];
    for (i, sample) in samples.into_iter().enumerate() {
        let (row, column) = (i / width as usize, i % width as usize);
        heights[column * height as usize + row] = sample as f32 / maxval as f32 * scaling;
    }
    Terrain::from_heights(heights, UVec2::new(width, height))
}

fn parse_header(token: Option<&str>, field: &'static str) -> Result<u32, TerrainError> {
    parse_number(token.ok_or(TerrainError::MissingHeader(field))?, field)
}

fn parse_number(token: &str, field: &'static str) -> Result<u32, TerrainError> {
    token.parse::<u32>().map_err(|_| TerrainError::InvalidNumber {
        field,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;

    #[test]
    fn parses_with_comments() {
        let pgm = "P2\n# made by hand\n3 2\n4\n0 1 2 # first row\n3 4 4\n";
        let terrain = terrain_from_pgm(pgm, 2.0).unwrap();
        assert_eq!(terrain.dimensions(), UVec2::new(3, 2));
        assert_eq!(terrain.heights().get(IVec2::new(2, 0)), Some(&1.0));
        assert_eq!(terrain.heights().get(IVec2::new(0, 1)), Some(&1.5));
        assert_eq!(terrain.heights().get(IVec2::new(2, 1)), Some(&2.0));
    }

    #[test]
    fn rejects_binary_magic() {
        assert_eq!(
            terrain_from_pgm("P5 1 1 255 0", 1.0).unwrap_err(),
            TerrainError::BadMagic("P5".into())
        );
    }

    #[test]
    fn rejects_short_data() {
        assert_eq!(
            terrain_from_pgm("P2 2 2 9 1 2 3", 1.0).unwrap_err(),
            TerrainError::SampleCount {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn rejects_samples_above_maxval() {
        assert_eq!(
            terrain_from_pgm("P2 1 1 9 10", 1.0).unwrap_err(),
            TerrainError::SampleOutOfRange {
                sample: 10,
                maxval: 9
            }
        );
    }

    #[test]
    fn oversized_header_is_a_count_error() {
        assert_eq!(
            terrain_from_pgm("P2 65535 65535 1 0", 1.0).unwrap_err(),
            TerrainError::SampleCount {
                expected: 65535 * 65535,
                actual: 1
            }
        );
        assert!(matches!(
            terrain_from_pgm("P2 4294967295 4294967295 1 0", 1.0).unwrap_err(),
            TerrainError::SampleCount { actual: 1, .. } | TerrainError::TooLarge { .. }
        ));
    }

    #[test]
    fn rejects_degenerate_headers() {
        assert_eq!(
            terrain_from_pgm("P2 1 1 0 0", 1.0).unwrap_err(),
            TerrainError::ZeroMaxval
        );
        assert_eq!(
            terrain_from_pgm("P2 0 3 9", 1.0).unwrap_err(),
            TerrainError::EmptyDimensions {
                width: 0,
                height: 3
            }
        );
        assert_eq!(
            terrain_from_pgm("P2 2 0 9", 1.0).unwrap_err(),
            TerrainError::EmptyDimensions {
                width: 2,
                height: 0
            }
        );
    }

    #[test]
    fn rejects_bad_samples_and_encoding() {
        assert_eq!(
            terrain_from_pgm("P2 2 1 9 4 x", 1.0).unwrap_err(),
            TerrainError::InvalidNumber {
                field: "sample",
                value: "x".into()
            }
        );
        assert_eq!(
            Terrain::from_pgm(&[0xff], 1.0).unwrap_err(),
            TerrainError::InvalidUtf8
        );
    }

    #[test]
    fn rejects_garbage_header() {
        assert!(matches!(
            terrain_from_pgm("P2 two 2 9", 1.0).unwrap_err(),
            TerrainError::InvalidNumber { field: "width", .. }
        ));
        assert_eq!(
            terrain_from_pgm("P2 2", 1.0).unwrap_err(),
            TerrainError::MissingHeader("height")
        );
    }
}
