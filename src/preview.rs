use anyhow::{Context, Result};
use eframe::egui::{self, ColorImage, TextureHandle, TextureOptions};

/// Holds the one live preview texture. Replacing the preview revokes the
/// previous handle before the next one is allocated, so two handles never
/// coexist.
pub struct PreviewSlot {
    handle: Option<TextureHandle>,
    nonce: u64,
    allocations: u64,
    revocations: u64,
}

impl Default for PreviewSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSlot {
    pub fn new() -> Self {
        PreviewSlot {
            handle: None,
            nonce: 0,
            allocations: 0,
            revocations: 0,
        }
    }

    pub fn set(&mut self, ctx: &egui::Context, image: ColorImage) {
        self.clear();
        self.nonce = self.nonce.saturating_add(1);
        let name = format!("cattle-preview-{}", self.nonce);
        self.handle = Some(ctx.load_texture(name, image, TextureOptions::LINEAR));
        self.allocations += 1;
    }

    /// Idempotent; doubles as teardown on app exit.
    pub fn clear(&mut self) {
        if self.handle.take().is_some() {
            self.revocations += 1;
        }
    }

    pub fn handle(&self) -> Option<&TextureHandle> {
        self.handle.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.handle.is_some()
    }

    pub fn allocations(&self) -> u64 {
        self.allocations
    }

    pub fn revocations(&self) -> u64 {
        self.revocations
    }
}

pub fn decode_color_image(bytes: &[u8]) -> Result<ColorImage> {
    let decoded = image::load_from_memory(bytes).context("Could not decode image bytes")?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}
