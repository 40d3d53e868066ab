//! The fixed 16-slot working palette.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::colour::Color;

/// Number of slots in every palette
pub const PALETTE_SIZE: usize = 16;

/// Ordered set of exactly 16 colours, indices 0-15.
///
/// Serialises as a `color0`..`color15` map, the shape terminal tooling reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Palette([Color; PALETTE_SIZE]);

impl Palette {
    pub fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self(colors)
    }

    /// Palette with every slot set to `color`
    pub fn uniform(color: Color) -> Self {
        Self([color; PALETTE_SIZE])
    }

    /// Build a palette from an arbitrary-length list.
    ///
    /// Extra colours are dropped. A short list is repeated until all 16 slots
    /// are filled, and the returned flag is `true` when that happened. Returns
    /// `None` for an empty list.
    pub fn fill_from(colors: &[Color]) -> Option<(Self, bool)> {
        if colors.is_empty() {
            return None;
        }
        let padded = colors.len() < PALETTE_SIZE;
        let mut slots = [Color::BLACK; PALETTE_SIZE];
        for (slot, color) in slots.iter_mut().zip(colors.iter().cycle()) {
            *slot = *color;
        }
        Some((Self(slots), padded))
    }

    pub fn colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Color> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Color> {
        self.0.iter_mut()
    }

    /// Slot name used in serialised schemes
    pub fn slot_name(index: usize) -> String {
        format!("color{}", index)
    }
}

impl Index<usize> for Palette {
    type Output = Color;

    fn index(&self, index: usize) -> &Color {
        &self.0[index]
    }
}

impl IndexMut<usize> for Palette {
    fn index_mut(&mut self, index: usize) -> &mut Color {
        &mut self.0[index]
    }
}

impl Serialize for Palette {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PALETTE_SIZE))?;
        for (i, color) in self.0.iter().enumerate() {
            map.serialize_entry(&Self::slot_name(i), color)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Palette {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let named = HashMap::<String, Color>::deserialize(deserializer)?;
        let mut slots = [Color::BLACK; PALETTE_SIZE];
        for (i, slot) in slots.iter_mut().enumerate() {
            let name = Self::slot_name(i);
            *slot = *named
                .get(&name)
                .ok_or_else(|| D::Error::custom(format!("missing palette slot {}", name)))?;
        }
        Ok(Self(slots))
    }
}
