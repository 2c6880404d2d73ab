//! Width/height form state with an optional aspect-ratio lock.
//!
//! The ratio comes from the selected image's natural dimensions and is
//! fixed at decode time; edits never recompute it.

/// Height that keeps `ratio` (width / height) for `width`, rounded.
pub fn height_for_width(width: u32, ratio: f64) -> u32 {
    (width as f64 / ratio).round() as u32
}

/// Width that keeps `ratio` (width / height) for `height`, rounded.
pub fn width_for_height(height: u32, ratio: f64) -> u32 {
    (height as f64 * ratio).round() as u32
}

/// The width, height and lock controls of the resize form.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionForm {
    width: Option<u32>,
    height: Option<u32>,
    lock_aspect: bool,
    ratio: Option<f64>,
}

impl Default for DimensionForm {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DimensionForm {
    pub fn new(lock_aspect: bool) -> Self {
        Self {
            width: None,
            height: None,
            lock_aspect,
            ratio: None,
        }
    }

    /// Fill the fields from an image's natural size and adopt its ratio.
    pub fn seed(&mut self, width: u32, height: u32, ratio: f64) {
        self.width = Some(width);
        self.height = Some(height);
        self.ratio = Some(ratio);
    }

    /// Set the width field; with the lock on, the height follows.
    pub fn set_width(&mut self, width: Option<u32>) {
        self.width = width;
        if let (Some(w), true, Some(ratio)) = (width, self.lock_aspect, self.ratio) {
            self.height = Some(height_for_width(w, ratio));
        }
    }

    /// Set the height field; with the lock on, the width follows.
    pub fn set_height(&mut self, height: Option<u32>) {
        self.height = height;
        if let (Some(h), true, Some(ratio)) = (height, self.lock_aspect, self.ratio) {
            self.width = Some(width_for_height(h, ratio));
        }
    }

    /// Toggle the lock. Does not touch the current values.
    pub fn set_lock_aspect(&mut self, locked: bool) {
        self.lock_aspect = locked;
    }

    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn height(&self) -> Option<u32> {
        self.height
    }

    pub fn lock_aspect(&self) -> bool {
        self.lock_aspect
    }

    pub fn ratio(&self) -> Option<f64> {
        self.ratio
    }

    /// Both fields, if both are filled in and non-zero.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.width, self.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => Some((w, h)),
            _ => None,
        }
    }

    /// Empty both fields and forget the ratio; the lock setting stays.
    pub fn clear(&mut self) {
        self.width = None;
        self.height = None;
        self.ratio = None;
    }
}
