use uuid::Uuid;

use crate::models::{ImagePlaceholder, Language, USER_IMAGE_ID_PREFIX};
use crate::seed::{BUILTIN_IMAGES, DEFAULT_BACKGROUND_COLOR, DEFAULT_BACKGROUND_OPACITY};

const HEADER_OPACITY_OFFSET: f32 = 0.3;
const HEADER_MIN_OPACITY: f32 = 0.1;

/// Background styling and the other scalar UI preferences.
///
/// Image and color are mutually exclusive: setting a non-empty value for
/// one clears the other. Opacity is independent of both.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundStore {
    image_ref: Option<String>,
    color: String,
    opacity: f32,
    images: Vec<ImagePlaceholder>,
    language: Language,
}

impl Default for BackgroundStore {
    fn default() -> Self {
        Self {
            image_ref: None,
            color: DEFAULT_BACKGROUND_COLOR.to_string(),
            opacity: DEFAULT_BACKGROUND_OPACITY,
            images: BUILTIN_IMAGES.clone(),
            language: Language::default(),
        }
    }
}

impl BackgroundStore {
    pub fn new(
        image_ref: Option<String>,
        color: String,
        opacity: f32,
        images: Vec<ImagePlaceholder>,
        language: Language,
    ) -> Self {
        Self {
            image_ref: image_ref.filter(|r| !r.is_empty()),
            color,
            opacity,
            images,
            language,
        }
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.image_ref.as_deref()
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn images(&self) -> &[ImagePlaceholder] {
        &self.images
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// An empty reference clears the background image.
    pub fn set_background_image(&mut self, image_ref: &str) {
        if image_ref.is_empty() {
            self.image_ref = None;
        } else {
            self.image_ref = Some(image_ref.to_string());
            self.color.clear();
        }
    }

    pub fn set_background_color(&mut self, color: &str) {
        self.color = color.to_string();
        if !color.is_empty() {
            self.image_ref = None;
        }
    }

    pub fn set_background_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Prepends an uploaded image to the collection.
    pub fn add_uploaded_image(&mut self, image_url: String, description: &str) -> &ImagePlaceholder {
        let image = ImagePlaceholder {
            id: format!("{USER_IMAGE_ID_PREFIX}{}", Uuid::new_v4()),
            description: description.to_string(),
            image_url,
            image_hint: "user uploaded".to_string(),
        };
        self.images.insert(0, image);
        &self.images[0]
    }

    /// Removes an image and clears the active background if it pointed at it.
    /// `None` when no image has that id, otherwise whether the background was cleared.
    pub fn delete_image(&mut self, id: &str) -> Option<bool> {
        let position = self.images.iter().position(|image| image.id == id)?;
        let removed = self.images.remove(position);
        let was_active = self.image_ref.as_deref() == Some(removed.image_url.as_str());
        if was_active {
            self.image_ref = None;
        }
        Some(was_active)
    }

    pub fn overlay_color(&self) -> Option<String> {
        if self.color.is_empty() {
            return None;
        }
        Some(color_to_rgba(&self.color, self.opacity))
    }

    pub fn header_overlay_color(&self) -> Option<String> {
        if self.color.is_empty() {
            return None;
        }
        let alpha = if self.opacity > HEADER_OPACITY_OFFSET {
            self.opacity - HEADER_OPACITY_OFFSET
        } else {
            HEADER_MIN_OPACITY
        };
        Some(color_to_rgba(&self.color, alpha))
    }
}

/// Applies `alpha` to a CSS color. Handles `rgba(...)`, `#rrggbb` and
/// `hsl(h s% l%)`; anything else is returned unchanged.
pub fn color_to_rgba(color: &str, alpha: f32) -> String {
    let alpha = format_alpha(alpha);
    let color = color.trim();

    if let Some(inner) = color.strip_prefix("rgba(").and_then(|c| c.strip_suffix(')')) {
        if let Some((channels, _)) = inner.rsplit_once(',') {
            return format!("rgba({}, {alpha})", channels.trim());
        }
        return color.to_string();
    }

    if let Some((r, g, b)) = parse_hex(color) {
        return format!("rgba({r}, {g}, {b}, {alpha})");
    }

    if let Some((r, g, b)) = parse_hsl(color) {
        return format!("rgba({r}, {g}, {b}, {alpha})");
    }

    color.to_string()
}

fn format_alpha(alpha: f32) -> String {
    ((alpha * 1000.0).round() / 1000.0).to_string()
}

fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn parse_hsl(color: &str) -> Option<(u8, u8, u8)> {
    let inner = color.strip_prefix("hsl(")?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    let h: f32 = parts.next()?.parse().ok()?;
    let s: f32 = parts.next()?.strip_suffix('%')?.parse().ok()?;
    let l: f32 = parts.next()?.strip_suffix('%')?.parse().ok()?;
    if parts.next().is_some() || !(0.0..360.0).contains(&h) {
        return None;
    }
    let (s, l) = (s / 100.0, l / 100.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h {
        h if h < 60.0 => (c, x, 0.0),
        h if h < 120.0 => (x, c, 0.0),
        h if h < 180.0 => (0.0, c, x),
        h if h < 240.0 => (0.0, x, c),
        h if h < 300.0 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let to_byte = |v: f32| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Some((to_byte(r), to_byte(g), to_byte(b)))
}
