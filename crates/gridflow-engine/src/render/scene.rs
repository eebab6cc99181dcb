//! GPU-free scene description: draw commands, the car sprite, tessellation
//! and the pixel-space camera.
//!
//! Everything in this module is plain math over simulator state, so it is
//! compiled with or without the `renderer` feature and is tested headlessly.
//! Coordinates are window pixels with `(0, 0)` at the top-left and `y`
//! growing downward.
//!
//! # Color Mapping
//!
//! | Element | Color |
//! |---------|-------|
//! | Background | #1E1E1E |
//! | Car body | #C83232 |
//! | Wheels | #141414 |
//! | Road cell | #3C3C3C |
//! | Intersection | #505050 with green/red axis bars |

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use gridflow_sim::grid::{Axis, Direction};
use gridflow_sim::intersection::LightColor;
use gridflow_sim::simulator::Simulator;

// ---------------------------------------------------------------------------
// Colors and sprite dimensions
// ---------------------------------------------------------------------------

/// Convert 8-bit sRGB channels to an opaque RGBA color in `0.0..=1.0`.
pub fn rgb(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

/// #1E1E1E
pub const BACKGROUND: [f32; 4] = [0.117_647, 0.117_647, 0.117_647, 1.0];
/// #C83232
pub const CAR_COLOR: [f32; 4] = [0.784_314, 0.196_078, 0.196_078, 1.0];
/// #141414
pub const WHEEL_COLOR: [f32; 4] = [0.078_431, 0.078_431, 0.078_431, 1.0];
/// #3C3C3C
pub const ROAD_COLOR: [f32; 4] = [0.235_294, 0.235_294, 0.235_294, 1.0];
/// #505050
pub const INTERSECTION_COLOR: [f32; 4] = [0.313_725, 0.313_725, 0.313_725, 1.0];
/// #28C846
pub const GREEN_LIGHT: [f32; 4] = [0.156_863, 0.784_314, 0.274_510, 1.0];
/// #DC2828
pub const RED_LIGHT: [f32; 4] = [0.862_745, 0.156_863, 0.156_863, 1.0];
/// #EBEBEB
const WINDSHIELD_COLOR: [f32; 4] = [0.921_569, 0.921_569, 0.921_569, 1.0];

/// Car body extent in sprite units (pixels at scale 1).
pub const CAR_WIDTH: f32 = 60.0;
pub const CAR_HEIGHT: f32 = 30.0;
const CAR_CORNER_RADIUS: f32 = 8.0;
const WHEEL_RADIUS: f32 = 7.0;
/// Wheel centers sit this far in from the body's short edges.
const WHEEL_INSET: f32 = 15.0;

/// Segments used to approximate a full circle.
pub const CIRCLE_SEGMENTS: usize = 24;
const CORNER_SEGMENTS: usize = CIRCLE_SEGMENTS / 4;

/// Fraction of a cell the car sprite's long side occupies.
const CAR_CELL_FILL: f32 = 0.8;

// ---------------------------------------------------------------------------
// DrawCommand
// ---------------------------------------------------------------------------

/// Outline of a draw command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rect,
    /// Rectangle with circular corners of the given radius.
    RoundedRect { radius: f32 },
    /// Circle inscribed in the command's bounds (diameter `width`).
    Circle,
}

/// One filled shape. `(x, y)` is the center; `width`/`height` are full
/// extents in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// sRGB color, each channel `0.0..=1.0`.
    pub color: [f32; 4],
    pub shape: Shape,
}

impl DrawCommand {
    /// Rectangle from its top-left corner.
    pub fn rect(left: f32, top: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x: left + width / 2.0,
            y: top + height / 2.0,
            width,
            height,
            color,
            shape: Shape::Rect,
        }
    }

    pub fn circle(cx: f32, cy: f32, radius: f32, color: [f32; 4]) -> Self {
        Self {
            x: cx,
            y: cy,
            width: radius * 2.0,
            height: radius * 2.0,
            color,
            shape: Shape::Circle,
        }
    }
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub clear_color: [f32; 4],
    /// Painted in order; later commands cover earlier ones.
    pub commands: Vec<DrawCommand>,
}

// ---------------------------------------------------------------------------
// Car sprite
// ---------------------------------------------------------------------------

/// The car sprite with its body's top-left corner at `(left, top)`.
///
/// At `scale` 1 and `Axis::EastWest` this is a 60x30 body with 8-pixel
/// rounded corners and two radius-7 wheels centered on the bottom edge,
/// 15 pixels in from each end. `Axis::NorthSouth` rotates it upright, with
/// the wheels on the left edge.
pub fn car_commands(left: f32, top: f32, scale: f32, axis: Axis) -> [DrawCommand; 3] {
    let (w, h) = match axis {
        Axis::EastWest => (CAR_WIDTH * scale, CAR_HEIGHT * scale),
        Axis::NorthSouth => (CAR_HEIGHT * scale, CAR_WIDTH * scale),
    };
    let body = DrawCommand {
        x: left + w / 2.0,
        y: top + h / 2.0,
        width: w,
        height: h,
        color: CAR_COLOR,
        shape: Shape::RoundedRect {
            radius: CAR_CORNER_RADIUS * scale,
        },
    };

    let inset = WHEEL_INSET * scale;
    let long = CAR_WIDTH * scale;
    let r = WHEEL_RADIUS * scale;
    let (front, rear) = match axis {
        Axis::EastWest => ((left + inset, top + h), (left + long - inset, top + h)),
        Axis::NorthSouth => ((left, top + inset), (left, top + long - inset)),
    };

    [
        body,
        DrawCommand::circle(front.0, front.1, r, WHEEL_COLOR),
        DrawCommand::circle(rear.0, rear.1, r, WHEEL_COLOR),
    ]
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// The placeholder window: a dark background with one car in the middle.
///
/// The car's top-left corner is at `(width / 2 - 30, height / 2 - 15)`
/// using integer halving.
pub fn scaffold_scene(width: u32, height: u32) -> Scene {
    let left = (width / 2) as f32 - CAR_WIDTH / 2.0;
    let top = (height / 2) as f32 - CAR_HEIGHT / 2.0;
    Scene {
        clear_color: BACKGROUND,
        commands: car_commands(left, top, 1.0, Axis::EastWest).to_vec(),
    }
}

/// Square cell size and top-left origin that center the grid in the
/// viewport.
pub fn grid_layout(grid_size: u32, width: u32, height: u32) -> (f32, f32, f32) {
    let grid_size = grid_size.max(1) as f32;
    let cell = width.min(height) as f32 / grid_size;
    let origin_x = (width as f32 - cell * grid_size) / 2.0;
    let origin_y = (height as f32 - cell * grid_size) / 2.0;
    (cell, origin_x, origin_y)
}

/// Draw commands for the current simulator state.
///
/// Road cells are drawn first, then intersections with a vertical bar
/// showing the north-south light and a horizontal bar showing east-west,
/// then cars oriented along their heading.
pub fn simulation_scene(sim: &Simulator, width: u32, height: u32) -> Scene {
    let (cell, ox, oy) = grid_layout(sim.grid_size(), width, height);
    let gap = (cell * 0.05).max(0.5);
    let cell_left = |x: i32| ox + x as f32 * cell;
    let cell_top = |y: i32| oy + y as f32 * cell;

    let mut commands = Vec::with_capacity(
        sim.road_network().len() + sim.intersections().len() * 3 + sim.cars().len() * 4,
    );

    for pos in sim.road_network().cells() {
        commands.push(DrawCommand::rect(
            cell_left(pos.x) + gap,
            cell_top(pos.y) + gap,
            cell - 2.0 * gap,
            cell - 2.0 * gap,
            ROAD_COLOR,
        ));
    }

    let bar = cell * 0.12;
    for light in sim.intersections() {
        let (left, top) = (cell_left(light.position.x), cell_top(light.position.y));
        let (ns, ew) = light.light_state();
        commands.push(DrawCommand::rect(
            left + gap,
            top + gap,
            cell - 2.0 * gap,
            cell - 2.0 * gap,
            INTERSECTION_COLOR,
        ));
        commands.push(DrawCommand::rect(
            left + (cell - bar) / 2.0,
            top + gap,
            bar,
            cell - 2.0 * gap,
            light_color(ns),
        ));
        commands.push(DrawCommand::rect(
            left + gap,
            top + (cell - bar) / 2.0,
            cell - 2.0 * gap,
            bar,
            light_color(ew),
        ));
    }

    let scale = cell * CAR_CELL_FILL / CAR_WIDTH;
    for car in sim.cars().iter().filter(|c| sim.in_bounds(c.position)) {
        let axis = car.direction.axis();
        let (w, h) = match axis {
            Axis::EastWest => (CAR_WIDTH * scale, CAR_HEIGHT * scale),
            Axis::NorthSouth => (CAR_HEIGHT * scale, CAR_WIDTH * scale),
        };
        let left = cell_left(car.position.x) + (cell - w) / 2.0;
        let top = cell_top(car.position.y) + (cell - h) / 2.0;
        commands.extend(car_commands(left, top, scale, axis));
        commands.push(heading_marker(left, top, w, h, car.direction));
    }

    Scene {
        clear_color: BACKGROUND,
        commands,
    }
}

fn light_color(color: LightColor) -> [f32; 4] {
    match color {
        LightColor::Green => GREEN_LIGHT,
        LightColor::Red => RED_LIGHT,
    }
}

/// Small windshield block on the leading edge of a car body.
fn heading_marker(left: f32, top: f32, w: f32, h: f32, direction: Direction) -> DrawCommand {
    let color = WINDSHIELD_COLOR;
    let thick = w.min(h) * 0.2;
    let (x, y, width, height) = match direction {
        Direction::E => (left + w - 2.0 * thick, top + thick, thick, h - 2.0 * thick),
        Direction::W => (left + thick, top + thick, thick, h - 2.0 * thick),
        Direction::N => (left + thick, top + thick, w - 2.0 * thick, thick),
        Direction::S => (left + thick, top + h - 2.0 * thick, w - 2.0 * thick, thick),
    };
    DrawCommand::rect(x, y, width, height, color)
}

// ---------------------------------------------------------------------------
// Tessellation
// ---------------------------------------------------------------------------

/// A colored triangle-list vertex in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePoint {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

/// Turn draw commands into a triangle list, preserving paint order.
pub fn tessellate(commands: &[DrawCommand]) -> Vec<ScenePoint> {
    let mut out = Vec::with_capacity(commands.len() * 6);
    for cmd in commands {
        let (x0, y0) = (cmd.x - cmd.width / 2.0, cmd.y - cmd.height / 2.0);
        let (x1, y1) = (cmd.x + cmd.width / 2.0, cmd.y + cmd.height / 2.0);
        match cmd.shape {
            Shape::Rect => push_rect(&mut out, x0, y0, x1, y1, cmd.color),
            Shape::Circle => push_fan(
                &mut out,
                cmd.x,
                cmd.y,
                cmd.width / 2.0,
                0.0,
                TAU,
                CIRCLE_SEGMENTS,
                cmd.color,
            ),
            Shape::RoundedRect { radius } => {
                let r = radius.clamp(0.0, (cmd.width.min(cmd.height)) / 2.0);
                let c = cmd.color;
                // Center column, full height.
                push_rect(&mut out, x0 + r, y0, x1 - r, y1, c);
                // Side strips between the corners.
                push_rect(&mut out, x0, y0 + r, x0 + r, y1 - r, c);
                push_rect(&mut out, x1 - r, y0 + r, x1, y1 - r, c);
                // Corners, angles measured with y pointing down.
                push_fan(&mut out, x0 + r, y0 + r, r, PI, PI + FRAC_PI_2, CORNER_SEGMENTS, c);
                push_fan(&mut out, x1 - r, y0 + r, r, PI + FRAC_PI_2, TAU, CORNER_SEGMENTS, c);
                push_fan(&mut out, x1 - r, y1 - r, r, 0.0, FRAC_PI_2, CORNER_SEGMENTS, c);
                push_fan(&mut out, x0 + r, y1 - r, r, FRAC_PI_2, PI, CORNER_SEGMENTS, c);
            }
        }
    }
    out
}

fn push_rect(out: &mut Vec<ScenePoint>, x0: f32, y0: f32, x1: f32, y1: f32, color: [f32; 4]) {
    let p = |x: f32, y: f32| ScenePoint {
        position: [x, y],
        color,
    };
    out.extend([p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y0), p(x1, y1), p(x0, y1)]);
}

#[allow(clippy::too_many_arguments)]
fn push_fan(
    out: &mut Vec<ScenePoint>,
    cx: f32,
    cy: f32,
    radius: f32,
    start: f32,
    end: f32,
    segments: usize,
    color: [f32; 4],
) {
    let step = (end - start) / segments as f32;
    let point = |angle: f32| ScenePoint {
        position: [cx + radius * angle.cos(), cy + radius * angle.sin()],
        color,
    };
    let center = ScenePoint {
        position: [cx, cy],
        color,
    };
    for i in 0..segments {
        let a0 = start + step * i as f32;
        out.extend([center, point(a0), point(a0 + step)]);
    }
}

// ---------------------------------------------------------------------------
// Camera2D
// ---------------------------------------------------------------------------

/// A 2D orthographic camera over pixel space, `y` pointing down.
///
/// [`orthographic_matrix`](Self::orthographic_matrix) produces a
/// column-major 4x4 matrix mapping the visible area to clip space
/// `[-1, 1]`, with the top edge of the view at clip `y = +1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    /// Width of the visible area in pixels.
    pub width: f32,
    /// Height of the visible area in pixels.
    pub height: f32,
    /// Camera center X.
    pub x: f32,
    /// Camera center Y.
    pub y: f32,
}

impl Camera2D {
    /// A camera showing exactly `width` x `height` pixels from the origin.
    pub fn for_viewport(width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        Self {
            width,
            height,
            x: width / 2.0,
            y: height / 2.0,
        }
    }

    pub fn orthographic_matrix(&self) -> [f32; 16] {
        let sx = 2.0 / self.width;
        let sy = -2.0 / self.height;
        let tx = -2.0 * self.x / self.width;
        let ty = 2.0 * self.y / self.height;

        // Column-major.
        [
            sx, 0.0, 0.0, 0.0, // column 0
            0.0, sy, 0.0, 0.0, // column 1
            0.0, 0.0, 1.0, 0.0, // column 2
            tx, ty, 0.0, 1.0, // column 3
        ]
    }

    /// Apply the projection to a pixel-space point.
    pub fn project(&self, point: [f32; 2]) -> [f32; 2] {
        let m = self.orthographic_matrix();
        [
            m[0] * point[0] + m[4] * point[1] + m[12],
            m[1] * point[0] + m[5] * point[1] + m[13],
        ]
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self::for_viewport(800, 600)
    }
}
