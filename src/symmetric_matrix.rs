use crate::error::{Result, TourError};

/// Lower-triangular storage for a symmetric `size x size` matrix addressed by
/// 1-based ids. Holds `size * (size + 1) / 2` slots; `(i, j)` and `(j, i)`
/// share one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricMatrix<T> {
    size: usize,
    values: Vec<T>,
}

impl<T: Copy> SymmetricMatrix<T> {
    pub fn new(size: usize, initial: T) -> Self {
        Self {
            size,
            values: vec![initial; size * (size + 1) / 2],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn index(&self, i: usize, j: usize) -> Result<usize> {
        for id in [i, j] {
            if id == 0 || id > self.size {
                return Err(TourError::OutOfRange {
                    id,
                    size: self.size,
                });
            }
        }
        let (row, col) = if i >= j { (i - 1, j - 1) } else { (j - 1, i - 1) };
        Ok(row * (row + 1) / 2 + col)
    }

    pub fn get(&self, i: usize, j: usize) -> Result<T> {
        let index = self.index(i, j)?;
        Ok(self.values[index])
    }

    pub fn set(&mut self, i: usize, j: usize, value: T) -> Result<()> {
        let index = self.index(i, j)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn get_mut(&mut self, i: usize, j: usize) -> Result<&mut T> {
        let index = self.index(i, j)?;
        Ok(&mut self.values[index])
    }

    /// Visits every stored slot exactly once.
    pub fn for_each_slot(&mut self, mut f: impl FnMut(&mut T)) {
        self.values.iter_mut().for_each(|value| f(value));
    }

    /// Off-diagonal entries as `(i, j, value)` with `i < j`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        (2..=self.size).flat_map(move |row| {
            let base = (row - 1) * row / 2;
            (1..row).map(move |col| (col, row, self.values[base + col - 1]))
        })
    }
}
