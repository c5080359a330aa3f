// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Contiguous colormap over the labels of one volume

/// Sorted unique labels and their normalized RGB colors
///
/// Index `i` of [`colors`](Self::colors) belongs to label `labels()[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelColormap {
    labels: Vec<u32>,
    colors: Vec<[f32; 3]>,
}

impl LabelColormap {
    pub(crate) fn new(labels: Vec<u32>, colors: Vec<[f32; 3]>) -> Self {
        Self { labels, colors }
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Contiguous index of a label, if the label is part of the map
    pub fn index_of(&self, label: u32) -> Option<usize> {
        self.labels.binary_search(&label).ok()
    }

    /// Replace every voxel label by its contiguous index
    ///
    /// Labels missing from the map become `None`.
    pub fn map_volume(&self, volume: &[u32]) -> Vec<Option<usize>> {
        volume.iter().map(|&label| self.index_of(label)).collect()
    }
}
