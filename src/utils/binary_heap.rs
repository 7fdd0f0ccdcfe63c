use std::{ops::Range, cmp};

/// indexed binary min heap with decrease key
///
/// every element maps to a unique index below the capacity given to `new`, which allows
/// updating an element in place instead of pushing a second copy of it
pub struct MinBinaryHeap<T: HeapElement + Ord> {
    data: Vec<T>,
    indices: Vec<usize>
}

pub trait HeapElement {

    fn unique_index(&self) -> usize;
}

const INVALID_POSITION: usize = usize::MAX;

impl<T: HeapElement + Ord> MinBinaryHeap<T> {

    pub fn new(size: usize) -> Self {
        MinBinaryHeap { 
            data: Vec::new(), 
            indices: vec![INVALID_POSITION; size]
        }
    } 

    pub fn len(&self) -> usize {
        self.data.len()    
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, entry: T) {
        let initial_index = self.data.len();
        let entry_unique_id = entry.unique_index();
        self.data.push(entry);
        self.indices[entry_unique_id] = initial_index;

        self.sift_up(initial_index);
    }

    /// inserts the entry or, if an entry with the same unique index is queued, replaces it
    /// the replacement must not be larger than the queued entry
    pub fn insert_or_decrease(&mut self, entry: T) {
        if self.contains_unique_index(entry.unique_index()) {
            self.decrease(entry);
        }
        else {
            self.insert(entry);
        }
    }

    pub fn decrease(&mut self, entry: T) {
        let position = self.indices[entry.unique_index()];

        self.data[position] = entry;
        self.sift_up(position);
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    pub fn clear(&mut self) {
        for element in &self.data {
            self.indices[element.unique_index()] = INVALID_POSITION;
        }

        self.data.clear();
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let last_index = self.len() - 1;
        self.swap(0, last_index); // move first element to the back
        let min_element = self.data.pop()?;
        self.indices[min_element.unique_index()] = INVALID_POSITION;

        if !self.is_empty() {
            self.sift_down(0);
        }

        Some(min_element)
    } 

    pub fn contains_unique_index(&self, unique_index: usize) -> bool {
        self.indices[unique_index] != INVALID_POSITION
    }

    fn sift_up(&mut self, index: usize) {
        let mut current_index = index;

        while 0 < current_index {
            let parent_index = (current_index - 1) / 2;

            if self.data[parent_index] <= self.data[current_index] {
                break;
            }
            
            self.swap(parent_index, current_index);
            current_index = parent_index;
        }
    }

    fn sift_down(&mut self, index: usize) {
        let mut current_index = index;

        loop {
            let mut min_entry_index: usize = current_index;

            for child_index in self.children_indices(current_index) {
                if self.data[child_index] < self.data[min_entry_index] {
                    min_entry_index = child_index;
                }
            }

            if min_entry_index == current_index {
                break;
            }

            self.swap(min_entry_index, current_index);
            current_index = min_entry_index;
        }
    }

    fn children_indices(&self, index: usize) -> Range<usize> {
        let first_child = cmp::min(self.len(), 2 * index + 1);
        let last_child = cmp::min(self.len(), 2 * index + 3);

        first_child..last_child
    }

    fn swap(&mut self, first: usize, second: usize) {
        self.indices[self.data[first].unique_index()] = second;
        self.indices[self.data[second].unique_index()] = first;

        self.data.swap(first, second);
    }
}
