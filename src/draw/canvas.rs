//! Shared raster surface for annotations.

use anyhow::{Context as _, Result};

/// The one shared raster surface all devices draw into.
///
/// There is no separate model/view copy: this surface *is* the visible
/// painted output, and the undo snapshots are its only other representation.
/// It is mutated only through the rendering functions and undo restore, and
/// only ever from the single control thread.
pub struct Canvas {
    surface: cairo::ImageSurface,
    width: i32,
    height: i32,
}

impl Canvas {
    /// Allocates a transparent ARGB surface of the given size.
    ///
    /// Allocation failure is fatal for the caller; nothing can run without a
    /// canvas.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let surface = cairo::ImageSurface::create(cairo::Format::ARgb32, width, height)
            .with_context(|| format!("Failed to allocate {width}x{height} canvas surface"))?;
        Ok(Self {
            surface,
            width,
            height,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Runs a drawing closure with a fresh Cairo context for this surface.
    ///
    /// Contexts are created per call so no borrow outlives the operation;
    /// pixel access in tests needs the surface unborrowed.
    pub fn with_context<R>(&self, f: impl FnOnce(&cairo::Context) -> R) -> Result<R> {
        let ctx = cairo::Context::new(&self.surface).context("Failed to create cairo context")?;
        Ok(f(&ctx))
    }

    /// Copies the full canvas contents into a new surface.
    pub fn snapshot(&self) -> Result<cairo::ImageSurface> {
        let copy = cairo::ImageSurface::create(cairo::Format::ARgb32, self.width, self.height)
            .context("Failed to allocate snapshot surface")?;
        let ctx = cairo::Context::new(&copy).context("Failed to create snapshot context")?;
        ctx.set_source_surface(&self.surface, 0.0, 0.0)
            .context("Failed to source canvas for snapshot")?;
        ctx.set_operator(cairo::Operator::Source);
        ctx.paint().context("Failed to copy canvas into snapshot")?;
        Ok(copy)
    }

    /// Replaces the canvas contents with a previously taken snapshot.
    ///
    /// Uses Operator::Source so erased (transparent) regions restore exactly.
    pub fn restore(&mut self, snapshot: &cairo::ImageSurface) -> Result<()> {
        let ctx = cairo::Context::new(&self.surface).context("Failed to create restore context")?;
        ctx.set_source_surface(snapshot, 0.0, 0.0)
            .context("Failed to source snapshot for restore")?;
        ctx.set_operator(cairo::Operator::Source);
        ctx.paint().context("Failed to restore canvas from snapshot")?;
        Ok(())
    }

    /// Clears the whole canvas to fully transparent.
    pub fn clear(&mut self) -> Result<()> {
        let ctx = cairo::Context::new(&self.surface).context("Failed to create clear context")?;
        ctx.set_operator(cairo::Operator::Clear);
        ctx.paint().context("Failed to clear canvas")?;
        Ok(())
    }

    /// Copies out the raw ARGB pixel bytes.
    ///
    /// Intended for tests and debugging; flushes pending drawing first.
    pub fn pixel_bytes(&mut self) -> Result<Vec<u8>> {
        self.surface.flush();
        let data = self
            .surface
            .data()
            .context("Canvas surface is borrowed, cannot read pixels")?;
        Ok(data.to_vec())
    }

    /// Alpha value of a single pixel, 0-255.
    ///
    /// Returns 0 for out-of-bounds coordinates.
    pub fn alpha_at(&mut self, x: i32, y: i32) -> Result<u8> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Ok(0);
        }
        self.surface.flush();
        let stride = self.surface.stride();
        let data = self
            .surface
            .data()
            .context("Canvas surface is borrowed, cannot read pixels")?;
        // ARgb32 is native-endian packed; alpha is byte 3 on little-endian.
        let offset = (y * stride + x * 4) as usize;
        Ok(data[offset + 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_canvas_is_fully_transparent() {
        let mut canvas = Canvas::new(16, 16).unwrap();
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn snapshot_and_restore_round_trip_pixels() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        canvas
            .with_context(|ctx| {
                ctx.set_source_rgba(1.0, 0.0, 0.0, 1.0);
                ctx.rectangle(2.0, 2.0, 4.0, 4.0);
                ctx.fill().unwrap();
            })
            .unwrap();
        let painted = canvas.pixel_bytes().unwrap();

        let snap = canvas.snapshot().unwrap();
        canvas.clear().unwrap();
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));

        canvas.restore(&snap).unwrap();
        assert_eq!(canvas.pixel_bytes().unwrap(), painted);
    }

    #[test]
    fn alpha_at_out_of_bounds_is_zero() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        assert_eq!(canvas.alpha_at(-1, 0).unwrap(), 0);
        assert_eq!(canvas.alpha_at(0, 99).unwrap(), 0);
    }
}
