use glam::{IVec2, UVec2};

use crate::error::TerrainError;

/// Dense 2D storage indexed by `(x, y)`, laid out with `y` varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    dimensions: UVec2,
}

impl<T> Grid<T> {
    /// Wraps `data` as a grid, rejecting buffers that do not match the dimensions.
    pub fn from_vec(data: Vec<T>, dimensions: UVec2) -> Result<Self, TerrainError> {
        let expected = dimensions.x as usize * dimensions.y as usize;
        if data.len() != expected {
            return Err(TerrainError::ShapeMismatch {
                width: dimensions.x,
                height: dimensions.y,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, dimensions })
    }

    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    pub fn get(&self, coordinate: IVec2) -> Option<&T> {
        self.index(coordinate).map(|index| &self.data[index])
    }

    pub fn get_mut(&mut self, coordinate: IVec2) -> Option<&mut T> {
        self.index(coordinate).map(move |index| &mut self.data[index])
    }

    /// Reads the cell nearest to `coordinate`, clamping both axes into the grid.
    ///
    /// Panics on an empty grid.
    pub fn get_clamped(&self, coordinate: IVec2) -> &T {
        let max = self.dimensions.as_ivec2() - IVec2::ONE;
        let clamped = coordinate.clamp(IVec2::ZERO, max.max(IVec2::ZERO));
        &self.data[self.linear(clamped.x as usize, clamped.y as usize)]
    }

    fn index(&self, coordinate: IVec2) -> Option<usize> {
        if coordinate.x < 0 || coordinate.y < 0 {
            return None;
        }
        let (x, y) = (coordinate.x as usize, coordinate.y as usize);
        if x >= self.dimensions.x as usize || y >= self.dimensions.y as usize {
            return None;
        }
        Some(self.linear(x, y))
    }

    fn linear(&self, x: usize, y: usize) -> usize {
        x * self.dimensions.y as usize + y
    }
}

impl<T: Clone> Grid<T> {
    pub fn filled(value: T, dimensions: UVec2) -> Self {
        Self {
            data: vec![value; dimensions.x as usize * dimensions.y as usize],
            dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffers() {
        let err = Grid::from_vec(vec![0.0f32; 5], UVec2::new(2, 3)).unwrap_err();
        assert_eq!(
            err,
            TerrainError::ShapeMismatch {
                width: 2,
                height: 3,
                expected: 6,
                actual: 5
            }
        );
    }

    #[test]
    fn indexes_with_y_fastest() {
        let grid = Grid::from_vec((0..6).collect::<Vec<i32>>(), UVec2::new(2, 3)).unwrap();
        assert_eq!(grid.get(IVec2::new(0, 2)), Some(&2));
        assert_eq!(grid.get(IVec2::new(1, 0)), Some(&3));
        assert_eq!(grid.get(IVec2::new(2, 0)), None);
        assert_eq!(grid.get(IVec2::new(0, -1)), None);
    }

    #[test]
    fn clamped_reads_stay_in_bounds() {
        let grid = Grid::from_vec((0..4).collect::<Vec<i32>>(), UVec2::new(2, 2)).unwrap();
        assert_eq!(*grid.get_clamped(IVec2::new(-5, 0)), 0);
        assert_eq!(*grid.get_clamped(IVec2::new(9, 9)), 3);
    }

    #[test]
    fn get_mut_writes_through() {
        let mut grid = Grid::filled(0u8, UVec2::new(3, 3));
        *grid.get_mut(IVec2::new(1, 2)).unwrap() = 7;
        assert_eq!(grid.data()[5], 7);
    }
}
