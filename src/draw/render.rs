//! Stroke rendering primitives.
//!
//! Every function here is stateless and idempotent per call: it mutates the
//! shared canvas and nothing else. Live preview for shape tools is achieved
//! entirely by the router's erase-then-redraw protocol, not by any state kept
//! here.

use super::canvas::Canvas;
use super::tool::ToolContext;
use anyhow::Result;

/// Draws one line segment with the tool's color and compositing mode.
///
/// Round caps and joins; a zero-length segment still leaves a visible dot
/// (the round cap is drawn for degenerate paths), which is what makes a tap
/// produce a mark.
pub fn draw_segment(
    canvas: &mut Canvas,
    tool: &ToolContext,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    width: f64,
) -> Result<()> {
    canvas.with_context(|ctx| {
        ctx.set_operator(tool.operator());
        ctx.set_source_rgba(tool.color.r, tool.color.g, tool.color.b, tool.color.a);
        ctx.set_line_width(width.max(1.0));
        ctx.set_line_cap(cairo::LineCap::Round);
        ctx.set_line_join(cairo::LineJoin::Round);

        ctx.move_to(x0, y0);
        if (x0 - x1).abs() < f64::EPSILON && (y0 - y1).abs() < f64::EPSILON {
            // Cairo drops empty subpaths; nudge by a hair so the round cap
            // renders as a dot.
            ctx.line_to(x1 + 0.1, y1);
        } else {
            ctx.line_to(x1, y1);
        }
        ctx.stroke()
    })??;
    Ok(())
}

/// Draws a two-stroke chevron arrowhead rooted at the tip.
///
/// `size` scales the chevron arms, `direction` is the stroke direction in
/// radians at the endpoint (the chevron opens backwards along it).
pub fn draw_arrowhead(
    canvas: &mut Canvas,
    tool: &ToolContext,
    tip_x: f64,
    tip_y: f64,
    size: f64,
    direction: f64,
) -> Result<()> {
    let [(lx, ly), (rx, ry)] = crate::util::chevron_points(tip_x, tip_y, size, direction);
    let width = (size / 2.0).max(1.0);
    draw_segment(canvas, tool, tip_x, tip_y, lx, ly, width)?;
    draw_segment(canvas, tool, tip_x, tip_y, rx, ry, width)?;
    Ok(())
}

/// Draws a rectangle outline as four segments between opposite corners.
///
/// Segment-based (rather than `ctx.rectangle`) so the outline composes with
/// the same caps, operator, and width logic as every other stroke.
pub fn draw_rect_outline(
    canvas: &mut Canvas,
    tool: &ToolContext,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    width: f64,
) -> Result<()> {
    draw_segment(canvas, tool, x0, y0, x0, y1, width)?;
    draw_segment(canvas, tool, x0, y1, x1, y1, width)?;
    draw_segment(canvas, tool, x0, y0, x1, y0, width)?;
    draw_segment(canvas, tool, x1, y0, x1, y1, width)?;
    Ok(())
}
