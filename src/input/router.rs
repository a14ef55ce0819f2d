//! Top-level event dispatcher.
//!
//! The router owns the per-device state table and the undo history, resolves
//! which tool applies to each incoming event, and sequences the drawing
//! calls. All handlers run on one control thread in strict arrival order;
//! every canvas and undo mutation serializes through this path.

use super::device::{DeviceId, DeviceInfo, DeviceState};
use super::events::{ButtonEvent, ButtonMask, MotionEvent};
use crate::draw::{self, Canvas, ToolContext, ToolKind, UndoStack};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool selection policy: a pure function of device identity and button
/// state. Owned by the configuration layer; the router only caches its
/// results per device until the mask or source changes.
pub trait ToolResolver {
    fn resolve(&self, device_name: &str, mask: ButtonMask) -> Option<Arc<ToolContext>>;
}

/// Computes the effective stroke width for a pressure reading.
///
/// `clamp(pressure + thickener, 0, 1)` spans the tool's width range, and the
/// result is capped at the tool's maximum. Applied identically at
/// button-down and on every motion sample.
pub fn pressure_width(tool: &ToolContext, pressure: f64, thickener: f64) -> f64 {
    let width =
        (pressure + thickener).clamp(0.0, 1.0) * (tool.max_width - tool.min_width) + tool.min_width;
    width.min(tool.max_width)
}

/// Routes raw pointer events into drawing operations.
pub struct InputRouter {
    devices: HashMap<DeviceId, DeviceState>,
    undo: UndoStack,
    resolver: Box<dyn ToolResolver>,
    /// Transient user-adjustable offset applied to all pressure readings.
    /// Floor -1, no ceiling; the asymmetry is deliberate.
    thickener: f64,
    next_index: u32,
}

impl InputRouter {
    pub fn new(resolver: Box<dyn ToolResolver>) -> Self {
        Self {
            devices: HashMap::new(),
            undo: UndoStack::new(),
            resolver,
            thickener: 0.0,
            next_index: 0,
        }
    }

    // ------------------------------------------------------------------
    // Device table
    // ------------------------------------------------------------------

    /// Registers a device reported by the environment.
    ///
    /// Devices without positional capability (fewer than two axes) are
    /// ignored entirely.
    pub fn handle_device_added(&mut self, info: DeviceInfo) {
        if !info.can_draw() {
            log::debug!("Ignoring device '{}' with {} axes", info.name, info.num_axes);
            return;
        }
        log::debug!("Device '{}' added", info.name);
        self.next_index = self.next_index.max(info.index + 1);
        self.devices
            .entry(info.id)
            .or_insert_with(|| DeviceState::new(info));
    }

    /// Drops all session state for a removed device.
    pub fn handle_device_removed(&mut self, id: DeviceId) {
        if let Some(state) = self.devices.remove(&id) {
            log::debug!("Device '{}' removed", state.info.name);
        }
    }

    /// Resyncs the device table against a fresh enumeration snapshot.
    ///
    /// Devices no longer present are dropped; new ones are added; surviving
    /// devices keep their grab and tool state.
    pub fn reload_devices(&mut self, current: &[DeviceInfo]) {
        let keep: Vec<DeviceId> = current
            .iter()
            .filter(|info| info.can_draw())
            .map(|info| info.id)
            .collect();
        self.devices.retain(|id, state| {
            let keep = keep.contains(id);
            if !keep {
                log::debug!("Device '{}' gone after reload", state.info.name);
            }
            keep
        });
        for info in current {
            self.handle_device_added(info.clone());
        }
    }

    /// Flips drawing mode for one device, or for every device at once.
    ///
    /// Broadcast semantics invert each device independently: mixed grab
    /// states stay mixed, just inverted.
    pub fn toggle_grab(&mut self, device: Option<DeviceId>) {
        match device {
            Some(id) => {
                if let Some(state) = self.devices.get_mut(&id) {
                    state.is_grabbed = !state.is_grabbed;
                    log::debug!(
                        "Device '{}' grab -> {}",
                        state.info.name,
                        state.is_grabbed
                    );
                } else {
                    log::debug!("Grab toggle for unknown device {id:?}");
                }
            }
            None => {
                for state in self.devices.values_mut() {
                    state.is_grabbed = !state.is_grabbed;
                }
                log::debug!("Toggled grab on all {} devices", self.devices.len());
            }
        }
    }

    /// Grab toggle addressed by the remote protocol's device index.
    ///
    /// Returns false when no device has that index.
    pub fn toggle_grab_index(&mut self, index: u32) -> bool {
        let id = self
            .devices
            .values()
            .find(|state| state.info.index == index)
            .map(|state| state.info.id);
        match id {
            Some(id) => {
                self.toggle_grab(Some(id));
                true
            }
            None => {
                log::warn!("No device at index {index}");
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Stroke lifecycle
    // ------------------------------------------------------------------

    /// Begins a stroke. Returns false (unhandled) for ungrabbed devices.
    pub fn handle_button_down(&mut self, canvas: &mut Canvas, ev: &ButtonEvent) -> Result<bool> {
        let thickener = self.thickener;
        // Devices are created lazily on their first event; the environment
        // usually announces them first, but events can race ahead of the
        // notification. Synthesized entries start ungrabbed and stay inert
        // until toggled.
        let next_index = &mut self.next_index;
        let state = self.devices.entry(ev.device).or_insert_with(|| {
            let index = *next_index;
            *next_index += 1;
            log::debug!("Creating state for unannounced device {:?}", ev.device);
            DeviceState::new(DeviceInfo {
                id: ev.device,
                index,
                name: format!("device-{}", ev.device.0),
                num_axes: 2,
            })
        });
        log::debug!(
            "Device '{}': button {} down at ({:.2}, {:.2})",
            state.info.name,
            ev.button,
            ev.x,
            ev.y
        );
        if !state.is_grabbed {
            return Ok(false);
        }

        // Fold the pressed button into the mask so tool lookup keys on the
        // full combination.
        let mask = ev.mask.with_button(ev.button);
        if mask != state.button_state || state.last_source != Some(ev.source) {
            state.tool = self.resolver.resolve(&state.info.name, mask);
            state.button_state = mask;
            state.last_source = Some(ev.source);
        }
        let Some(tool) = state.tool.clone() else {
            log::debug!("No tool resolves for mask {:#x}", mask.0);
            return Ok(false);
        };

        state.last_x = ev.x;
        state.last_y = ev.y;
        state.motion_time = ev.time;

        self.undo.snapshot(canvas)?;

        let width = pressure_width(&tool, ev.pressure, thickener);
        state.stroke_width = width;
        state.stroke_active = true;

        // Buttons above 5 (wheel/extra) still resolve a tool but don't
        // anchor a stroke or leave a tap mark.
        if ev.button <= 5 {
            draw::draw_segment(canvas, &tool, ev.x, ev.y, ev.x, ev.y, width)?;
            state.start_x = ev.x;
            state.start_y = ev.y;
        }

        state.stroke.push(ev.x, ev.y, width);
        Ok(true)
    }

    /// Extends a stroke. Shape tools erase and redraw their live preview;
    /// freehand tools paint incrementally, replaying any coalesced samples.
    pub fn handle_motion(&mut self, canvas: &mut Canvas, ev: &MotionEvent) -> Result<bool> {
        let thickener = self.thickener;
        let Some(state) = self.devices.get_mut(&ev.device) else {
            return Ok(false);
        };
        if !state.is_grabbed || !state.stroke_active {
            return Ok(false);
        }
        log::debug!(
            "Device '{}': motion to ({:.2}, {:.2})",
            state.info.name,
            ev.x,
            ev.y
        );

        if ev.mask != state.button_state || state.last_source != Some(ev.source) {
            state.tool = self.resolver.resolve(&state.info.name, ev.mask);
            state.button_state = ev.mask;
            state.last_source = Some(ev.source);
        }
        let Some(tool) = state.tool.clone() else {
            return Ok(false);
        };

        if tool.kind.is_shape() {
            // Erase the previous preview without consuming undo history,
            // then redraw the whole shape to the new endpoint.
            self.undo.restore_top_without_pop(canvas)?;
            if ev.pressure > 0.0 {
                let width = pressure_width(&tool, ev.pressure, thickener);
                state.stroke_width = width;
                match tool.kind {
                    ToolKind::Line => draw::draw_segment(
                        canvas,
                        &tool,
                        state.start_x,
                        state.start_y,
                        ev.x,
                        ev.y,
                        width,
                    )?,
                    ToolKind::Rect => draw::draw_rect_outline(
                        canvas,
                        &tool,
                        state.start_x,
                        state.start_y,
                        ev.x,
                        ev.y,
                        width,
                    )?,
                    _ => unreachable!("is_shape covers Line and Rect"),
                }
                state.stroke.push(ev.x, ev.y, width);
            }
        } else {
            // Replay buffered intermediate samples so fast motion isn't
            // flattened into one long segment.
            for sample in &ev.history {
                if sample.pressure <= 0.0 {
                    continue;
                }
                let width = pressure_width(&tool, sample.pressure, thickener);
                draw::draw_segment(
                    canvas,
                    &tool,
                    state.last_x,
                    state.last_y,
                    sample.x,
                    sample.y,
                    width,
                )?;
                state.stroke.push(sample.x, sample.y, width);
                state.stroke_width = width;
                state.last_x = sample.x;
                state.last_y = sample.y;
            }

            // Always paint to the current event coordinate, unless the
            // device reports it is no longer touching.
            if ev.pressure > 0.0 {
                let width = pressure_width(&tool, ev.pressure, thickener);
                state.stroke_width = width;
                draw::draw_segment(canvas, &tool, state.last_x, state.last_y, ev.x, ev.y, width)?;
                state.stroke.push(ev.x, ev.y, width);
            }
        }

        state.last_x = ev.x;
        state.last_y = ev.y;
        state.motion_time = ev.time;
        Ok(true)
    }

    /// Ends a stroke: final shape redraw, optional arrowhead, history reset.
    pub fn handle_button_up(&mut self, canvas: &mut Canvas, ev: &ButtonEvent) -> Result<bool> {
        // If the release lands away from the last processed point, run one
        // final motion first so the stroke reaches the endpoint.
        let needs_motion = self.devices.get(&ev.device).is_some_and(|state| {
            state.is_grabbed
                && state.stroke_active
                && (state.last_x != ev.x || state.last_y != ev.y)
        });
        if needs_motion {
            let synthesized = MotionEvent {
                device: ev.device,
                source: ev.source,
                x: ev.x,
                y: ev.y,
                mask: ev.mask,
                pressure: ev.pressure,
                time: ev.time,
                history: Vec::new(),
            };
            self.handle_motion(canvas, &synthesized)?;
        }

        let Some(state) = self.devices.get_mut(&ev.device) else {
            return Ok(false);
        };
        if !state.is_grabbed || !state.stroke_active {
            return Ok(false);
        }
        let Some(tool) = state.tool.clone() else {
            return Ok(false);
        };

        if tool.arrow_size > 0.0 {
            let base = tool.arrow_size * tool.max_width / 2.0;
            if let Some(params) = state.stroke.arrow_params(base * 3.0) {
                draw::draw_arrowhead(canvas, &tool, ev.x, ev.y, params.width, params.direction)?;
            }
        }

        match tool.kind {
            ToolKind::Line => draw::draw_segment(
                canvas,
                &tool,
                state.start_x,
                state.start_y,
                ev.x,
                ev.y,
                state.stroke_width,
            )?,
            ToolKind::Rect => draw::draw_rect_outline(
                canvas,
                &tool,
                state.start_x,
                state.start_y,
                ev.x,
                ev.y,
                state.stroke_width,
            )?,
            ToolKind::Pen | ToolKind::Eraser => {}
        }

        state.stroke.clear();
        state.stroke_active = false;
        state.motion_time = 0;
        state.last_x = ev.x;
        state.last_y = ev.y;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Canvas-wide operations
    // ------------------------------------------------------------------

    /// Restores the canvas to the state before the last undoable action.
    pub fn undo(&mut self, canvas: &mut Canvas) -> Result<bool> {
        self.undo.undo(canvas)
    }

    /// Re-applies the last undone action.
    pub fn redo(&mut self, canvas: &mut Canvas) -> Result<bool> {
        self.undo.redo(canvas)
    }

    /// Clears the whole canvas as one undoable action.
    pub fn clear_canvas(&mut self, canvas: &mut Canvas) -> Result<()> {
        self.undo.snapshot(canvas)?;
        canvas.clear()
    }

    /// Drops undo history; called when the surface is replaced and old
    /// snapshots no longer match its geometry.
    pub fn reset_history(&mut self) {
        self.undo.clear();
    }

    /// Thickens all subsequent strokes by one step.
    pub fn thicken_lines(&mut self) {
        self.thickener += 0.1;
    }

    /// Thins all subsequent strokes by one step, floored at -1.
    pub fn thin_lines(&mut self) {
        self.thickener -= 0.1;
        if self.thickener < -1.0 {
            self.thickener = -1.0;
        }
    }

    pub fn thickener(&self) -> f64 {
        self.thickener
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.undo_depth()
    }

    pub fn device(&self, id: DeviceId) -> Option<&DeviceState> {
        self.devices.get(&id)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::{BLUE, RED};
    use crate::input::device::SourceId;
    use crate::input::events::HistorySample;

    /// Button 1 draws with a pen, button 2 with a line, button 3 with a
    /// rectangle; anything else resolves nothing.
    struct TestResolver {
        pen: Arc<ToolContext>,
        line: Arc<ToolContext>,
        rect: Arc<ToolContext>,
    }

    impl TestResolver {
        fn new() -> Self {
            Self {
                pen: Arc::new(ToolContext::new(ToolKind::Pen, RED, 0.0, 10.0, 0.0)),
                line: Arc::new(ToolContext::new(ToolKind::Line, BLUE, 0.0, 4.0, 0.0)),
                rect: Arc::new(ToolContext::new(ToolKind::Rect, BLUE, 0.0, 4.0, 0.0)),
            }
        }
    }

    impl ToolResolver for TestResolver {
        fn resolve(&self, _device: &str, mask: ButtonMask) -> Option<Arc<ToolContext>> {
            match mask.top_button() {
                Some(1) => Some(self.pen.clone()),
                Some(2) => Some(self.line.clone()),
                Some(3) => Some(self.rect.clone()),
                _ => None,
            }
        }
    }

    fn router() -> InputRouter {
        InputRouter::new(Box::new(TestResolver::new()))
    }

    fn device_info(id: u64, index: u32) -> DeviceInfo {
        DeviceInfo {
            id: DeviceId(id),
            index,
            name: format!("test-pointer-{id}"),
            num_axes: 2,
        }
    }

    fn press(device: u64, button: u32, x: f64, y: f64) -> ButtonEvent {
        ButtonEvent {
            device: DeviceId(device),
            source: SourceId(device),
            x,
            y,
            button,
            mask: ButtonMask::default(),
            pressure: 1.0,
            time: 100,
        }
    }

    fn release(device: u64, button: u32, x: f64, y: f64) -> ButtonEvent {
        ButtonEvent {
            time: 300,
            ..press(device, button, x, y)
        }
    }

    fn motion(device: u64, button: u32, x: f64, y: f64) -> MotionEvent {
        MotionEvent {
            device: DeviceId(device),
            source: SourceId(device),
            x,
            y,
            mask: ButtonMask::default().with_button(button),
            pressure: 1.0,
            time: 200,
            history: Vec::new(),
        }
    }

    fn grabbed_router_with(ids: &[(u64, u32)]) -> InputRouter {
        let mut r = router();
        for &(id, index) in ids {
            r.handle_device_added(device_info(id, index));
        }
        r.toggle_grab(None);
        r
    }

    #[test]
    fn ungrabbed_device_never_touches_canvas_or_history() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = router();
        r.handle_device_added(device_info(1, 0));

        assert!(!r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 10.0)).unwrap());
        assert!(!r.handle_motion(&mut canvas, &motion(1, 1, 20.0, 20.0)).unwrap());
        assert!(!r.handle_button_up(&mut canvas, &release(1, 1, 20.0, 20.0)).unwrap());

        assert_eq!(r.undo_depth(), 0);
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn tap_leaves_a_pressure_sized_dot_and_one_snapshot() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        assert!(r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 10.0)).unwrap());

        // Pen range [0, 10] at full pressure: a dot of diameter 10.
        assert!(canvas.alpha_at(10, 10).unwrap() > 0);
        assert!(canvas.alpha_at(14, 10).unwrap() > 0);
        assert_eq!(canvas.alpha_at(10, 17).unwrap(), 0);
        assert_eq!(r.undo_depth(), 1);

        let state = r.device(DeviceId(1)).unwrap();
        assert!(state.stroke_active);
        assert_eq!(state.stroke.len(), 1);
    }

    #[test]
    fn freehand_stroke_draws_and_clears_history_on_release() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 5.0, 32.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 1, 40.0, 32.0)).unwrap();
        r.handle_button_up(&mut canvas, &release(1, 1, 55.0, 32.0)).unwrap();

        assert!(canvas.alpha_at(20, 32).unwrap() > 0);
        assert!(canvas.alpha_at(50, 32).unwrap() > 0);
        let state = r.device(DeviceId(1)).unwrap();
        assert!(state.stroke.is_empty());
        assert!(!state.stroke_active);
        assert_eq!(r.undo_depth(), 1);
    }

    #[test]
    fn coalesced_history_samples_are_replayed() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 0.0, 0.0)).unwrap();
        let mut ev = motion(1, 1, 60.0, 60.0);
        ev.history = vec![
            HistorySample { x: 20.0, y: 0.0, pressure: 1.0 },
            HistorySample { x: 20.0, y: 40.0, pressure: 1.0 },
        ];
        r.handle_motion(&mut canvas, &ev).unwrap();

        // The replayed corner is on the path; a straight 0,0 -> 60,60
        // diagonal would have missed it.
        assert!(canvas.alpha_at(20, 20).unwrap() > 0);
        let state = r.device(DeviceId(1)).unwrap();
        assert_eq!(state.stroke.len(), 4);
    }

    #[test]
    fn zero_pressure_samples_are_skipped() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 5.0, 5.0)).unwrap();
        let mut ev = motion(1, 1, 50.0, 5.0);
        ev.pressure = 0.0;
        assert!(r.handle_motion(&mut canvas, &ev).unwrap());

        // Handled, but nothing painted at the lifted position.
        assert_eq!(canvas.alpha_at(50, 5).unwrap(), 0);
        assert_eq!(r.device(DeviceId(1)).unwrap().stroke.len(), 1);
    }

    #[test]
    fn rectangle_preview_keeps_undo_depth_at_one() {
        let mut canvas = Canvas::new(80, 80).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 3, 0.0, 0.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 3, 50.0, 0.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 3, 50.0, 20.0)).unwrap();
        r.handle_button_up(&mut canvas, &release(1, 3, 50.0, 50.0)).unwrap();

        // Final outline spans (0,0)-(50,50); edges painted, interior not.
        assert!(canvas.alpha_at(25, 0).unwrap() > 0);
        assert!(canvas.alpha_at(25, 50).unwrap() > 0);
        assert!(canvas.alpha_at(50, 25).unwrap() > 0);
        assert_eq!(canvas.alpha_at(25, 25).unwrap(), 0);
        // Intermediate previews never accumulated history.
        assert_eq!(r.undo_depth(), 1);

        // Undoing removes the whole stroke in one step.
        assert!(r.undo(&mut canvas).unwrap());
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn line_preview_erases_previous_endpoint() {
        let mut canvas = Canvas::new(80, 80).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 2, 10.0, 10.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 2, 70.0, 10.0)).unwrap();
        assert!(canvas.alpha_at(60, 10).unwrap() > 0);

        // Dragging down: the old horizontal preview must vanish.
        r.handle_motion(&mut canvas, &motion(1, 2, 10.0, 70.0)).unwrap();
        assert_eq!(canvas.alpha_at(60, 10).unwrap(), 0);
        assert!(canvas.alpha_at(10, 50).unwrap() > 0);
    }

    #[test]
    fn undo_then_redo_round_trips_a_stroke() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 10.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 1, 40.0, 40.0)).unwrap();
        r.handle_button_up(&mut canvas, &release(1, 1, 40.0, 40.0)).unwrap();
        let drawn = canvas.pixel_bytes().unwrap();

        assert!(r.undo(&mut canvas).unwrap());
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));
        assert!(r.redo(&mut canvas).unwrap());
        assert_eq!(canvas.pixel_bytes().unwrap(), drawn);
    }

    #[test]
    fn clear_canvas_is_undoable() {
        let mut canvas = Canvas::new(32, 32).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 16.0, 16.0)).unwrap();
        r.handle_button_up(&mut canvas, &release(1, 1, 16.0, 16.0)).unwrap();
        let drawn = canvas.pixel_bytes().unwrap();

        r.clear_canvas(&mut canvas).unwrap();
        assert!(canvas.pixel_bytes().unwrap().iter().all(|&b| b == 0));
        assert!(r.undo(&mut canvas).unwrap());
        assert_eq!(canvas.pixel_bytes().unwrap(), drawn);
    }

    #[test]
    fn broadcast_toggle_inverts_each_device_independently() {
        let mut r = router();
        r.handle_device_added(device_info(1, 0));
        r.handle_device_added(device_info(2, 1));
        r.toggle_grab(Some(DeviceId(1)));
        assert!(r.device(DeviceId(1)).unwrap().is_grabbed);
        assert!(!r.device(DeviceId(2)).unwrap().is_grabbed);

        r.toggle_grab(None);
        assert!(!r.device(DeviceId(1)).unwrap().is_grabbed);
        assert!(r.device(DeviceId(2)).unwrap().is_grabbed);
    }

    #[test]
    fn toggle_by_index_addresses_the_right_device() {
        let mut r = router();
        r.handle_device_added(device_info(1, 0));
        r.handle_device_added(device_info(2, 1));

        assert!(r.toggle_grab_index(1));
        assert!(r.device(DeviceId(2)).unwrap().is_grabbed);
        assert!(!r.device(DeviceId(1)).unwrap().is_grabbed);
        assert!(!r.toggle_grab_index(7));
    }

    #[test]
    fn interleaved_devices_keep_independent_state() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0), (2, 1)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 10.0)).unwrap();
        r.handle_button_down(&mut canvas, &press(2, 1, 30.0, 30.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 1, 12.0, 12.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(2, 1, 5.0, 5.0)).unwrap();

        let a = r.device(DeviceId(1)).unwrap();
        assert_eq!((a.last_x, a.last_y), (12.0, 12.0));
        assert_eq!((a.start_x, a.start_y), (10.0, 10.0));

        let b = r.device(DeviceId(2)).unwrap();
        assert_eq!((b.last_x, b.last_y), (5.0, 5.0));
        assert_eq!((b.start_x, b.start_y), (30.0, 30.0));
    }

    #[test]
    fn tool_re_resolves_when_mask_or_source_changes() {
        let mut canvas = Canvas::new(64, 64).unwrap();
        let mut r = grabbed_router_with(&[(1, 0)]);

        r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 10.0)).unwrap();
        assert_eq!(
            r.device(DeviceId(1)).unwrap().tool.as_ref().unwrap().kind,
            ToolKind::Pen
        );
        r.handle_button_up(&mut canvas, &release(1, 1, 10.0, 10.0)).unwrap();

        r.handle_button_down(&mut canvas, &press(1, 3, 10.0, 10.0)).unwrap();
        assert_eq!(
            r.device(DeviceId(1)).unwrap().tool.as_ref().unwrap().kind,
            ToolKind::Rect
        );
    }

    #[test]
    fn arrow_tool_draws_a_head_at_the_endpoint() {
        let arrow_pen = Arc::new(ToolContext::new(ToolKind::Pen, RED, 0.0, 4.0, 2.0));
        struct ArrowResolver(Arc<ToolContext>);
        impl ToolResolver for ArrowResolver {
            fn resolve(&self, _d: &str, _m: ButtonMask) -> Option<Arc<ToolContext>> {
                Some(self.0.clone())
            }
        }
        let mut r = InputRouter::new(Box::new(ArrowResolver(arrow_pen)));
        r.handle_device_added(device_info(1, 0));
        r.toggle_grab(None);

        let mut canvas = Canvas::new(100, 100).unwrap();
        r.handle_button_down(&mut canvas, &press(1, 1, 10.0, 50.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 1, 40.0, 50.0)).unwrap();
        r.handle_motion(&mut canvas, &motion(1, 1, 70.0, 50.0)).unwrap();

        // Off-axis pixels near the tip are clean before release.
        assert_eq!(canvas.alpha_at(74, 46).unwrap(), 0);
        assert_eq!(canvas.alpha_at(74, 53).unwrap(), 0);
        r.handle_button_up(&mut canvas, &release(1, 1, 80.0, 50.0)).unwrap();
        // The chevron sweeps backwards and off-axis from the tip.
        assert!(canvas.alpha_at(74, 46).unwrap() > 0 || canvas.alpha_at(74, 53).unwrap() > 0);
    }

    #[test]
    fn width_formula_hits_range_endpoints() {
        let tool = ToolContext::new(ToolKind::Pen, RED, 0.0, 10.0, 0.0);
        assert_eq!(pressure_width(&tool, 1.0, 0.0), 10.0);
        assert_eq!(pressure_width(&tool, 0.0, 0.0), 0.0);

        let tool = ToolContext::new(ToolKind::Pen, RED, 2.0, 8.0, 0.0);
        assert_eq!(pressure_width(&tool, 0.0, 0.0), 2.0);
        // Thickener pushes past the cap; the result stays at max.
        assert_eq!(pressure_width(&tool, 1.0, 5.0), 8.0);
    }

    #[test]
    fn thickener_floors_at_minus_one_with_no_ceiling() {
        let mut r = router();
        for _ in 0..20 {
            r.thin_lines();
        }
        assert_eq!(r.thickener(), -1.0);
        for _ in 0..30 {
            r.thicken_lines();
        }
        assert!(r.thickener() > 1.5);
    }

    #[test]
    fn reload_drops_vanished_devices_and_keeps_grabs() {
        let mut r = router();
        r.handle_device_added(device_info(1, 0));
        r.handle_device_added(device_info(2, 1));
        r.toggle_grab(Some(DeviceId(1)));

        r.reload_devices(&[device_info(1, 0), device_info(3, 2)]);
        assert!(r.device(DeviceId(1)).unwrap().is_grabbed);
        assert!(r.device(DeviceId(2)).is_none());
        assert!(r.device(DeviceId(3)).is_some());
    }

    #[test]
    fn axis_poor_devices_are_never_registered() {
        let mut r = router();
        r.handle_device_added(DeviceInfo {
            id: DeviceId(5),
            index: 0,
            name: "keyboard".into(),
            num_axes: 0,
        });
        assert_eq!(r.device_count(), 0);
    }
}
