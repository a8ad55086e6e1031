//! Pick ids, pick colors and window-to-framebuffer coordinate conversion
//!
//! Pickable primitives register themselves with a [`PickIdRegistry`] and draw
//! their id, encoded as an RGBA8 color, into the pick framebuffer. Reading
//! back a single texel and decoding it yields the object under the cursor.

use std::collections::HashMap;

use geoscene_math::{Cartesian2, Cartesian3};

/// Identifier of a pickable object; zero is reserved for "nothing"
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PickId(u32);

impl PickId {
    /// Wrap a raw id, rejecting the reserved zero value
    pub fn new(raw: u32) -> Option<Self> {
        (raw != 0).then_some(Self(raw))
    }

    /// The raw id value
    pub fn get(self) -> u32 {
        self.0
    }

    /// The color this id is drawn with in the pick pass
    pub fn color(self) -> PickColor {
        PickColor::from_id(self)
    }
}

/// RGBA8 color encoding a [`PickId`] (little-endian: red holds the low byte)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PickColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PickColor {
    /// Color of the pick framebuffer's cleared background
    pub const NONE: Self = Self { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Encode an id
    pub fn from_id(id: PickId) -> Self {
        let [r, g, b, a] = id.get().to_le_bytes();
        Self { r, g, b, a }
    }

    /// Decode the id, `None` for the background color
    pub fn to_id(self) -> Option<PickId> {
        PickId::new(u32::from_le_bytes([self.r, self.g, self.b, self.a]))
    }

    /// Normalized float color for shaders and clear values
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl From<[u8; 4]> for PickColor {
    fn from(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }
}

/// What a successful pick reports back
#[derive(Clone, Debug, PartialEq)]
pub struct PickedObject {
    /// Display name of the object
    pub name: String,
    /// Representative world position, if the object has one
    pub position: Option<Cartesian3>,
}

impl PickedObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
        }
    }

    /// Set the representative position
    pub fn with_position(mut self, position: Cartesian3) -> Self {
        self.position = Some(position);
        self
    }
}

/// Allocates pick ids and maps them back to objects
#[derive(Debug)]
pub struct PickIdRegistry {
    next: u32,
    objects: HashMap<PickId, PickedObject>,
}

impl Default for PickIdRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PickIdRegistry {
    pub fn new() -> Self {
        Self {
            next: 1,
            objects: HashMap::new(),
        }
    }

    /// Register an object and return its id
    pub fn allocate(&mut self, object: PickedObject) -> PickId {
        let id = loop {
            let candidate = PickId(self.next);
            self.next = self.next.wrapping_add(1).max(1);
            if !self.objects.contains_key(&candidate) {
                break candidate;
            }
        };
        self.objects.insert(id, object);
        id
    }

    /// Look up the object registered under an id
    pub fn get(&self, id: PickId) -> Option<&PickedObject> {
        self.objects.get(&id)
    }

    /// Forget an id, returning its object
    pub fn release(&mut self, id: PickId) -> Option<PickedObject> {
        self.objects.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// A texel position in framebuffer space (origin bottom-left)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPosition {
    pub x: u32,
    pub y: u32,
}

impl PixelPosition {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Convert a window position (origin top-left) to a framebuffer texel
///
/// Returns `None` when the position lies outside the drawing buffer.
pub fn window_to_framebuffer(window_position: Cartesian2, size: (u32, u32)) -> Option<PixelPosition> {
    let (width, height) = size;
    let (x, y) = (window_position.x.floor(), window_position.y.floor());
    if !(x >= 0.0 && y >= 0.0 && x < width as f64 && y < height as f64) {
        return None;
    }
    Some(PixelPosition::new(x as u32, height - 1 - y as u32))
}
