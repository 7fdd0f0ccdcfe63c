//! scratch arrays shared by the shortest path searches

use std::ops::Index;

pub trait ArrayStructure<T: Clone + Copy + Eq>: Index<usize> {

    fn reset(&mut self);
    fn set(&mut self, index: usize, value: T);
}

/// ValidFlags stores one value per vertex and invalidates all of them in constant time
/// every entry that was not set since the last reset reads as the default value
pub struct ValidFlags<T: Clone + Copy + Eq> {
    valid_flags: Vec<usize>,
    valid_flag: usize,
    default_value: T,
    data: Vec<T>
}

impl<T: Clone + Copy + Eq> Index<usize> for ValidFlags<T> {

    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        if self.valid_flags[index] == self.valid_flag {
            return &self.data[index];
        }
        
        &self.default_value
    }
}

impl<T: Clone + Copy + Eq> ArrayStructure<T> for ValidFlags<T> {

    fn reset(&mut self) {
        if self.valid_flag == usize::MAX {
            // flag space exhausted, start over with fresh flags
            self.valid_flag = 1;
            self.valid_flags.iter_mut().for_each(|flag| *flag = 0);
        }
        else {
            self.valid_flag += 1;
        }
    }

    fn set(&mut self, index: usize, value: T) {
        self.data[index] = value;
        self.valid_flags[index] = self.valid_flag;
    }
}

impl<T: Clone + Copy + Eq> ValidFlags<T> {

    pub fn new(size: usize, default_value: T) -> Self {
        ValidFlags {
            valid_flags: vec![0; size],
            valid_flag: 1,
            default_value,
            data: vec![default_value; size]
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.valid_flags[index] == self.valid_flag
    }

    /// copies the current values, invalid entries as the default value
    pub fn to_vec(&self) -> Vec<T> {
        (0..self.len()).map(|index| self[index]).collect()
    }
}
