//! First-person visualization of a raywall map.
//!
//! Renders the z-buffer one vertical stripe per screen column, with wall
//! heights scaled by incidence-corrected distance. Movement probes the
//! BSP tree so solid walls block the player while immaterial edges
//! (doorways) let them through.

use std::hash::{Hash, Hasher};

use macroquad::prelude::*;
use nalgebra::{Point2, Vector2};
use raywall::{
    BspTree, Column, Edge, EdgeId, Material, Polygon, PolygonId, Ray, Vertex, VertexId, ZBuffer,
};

const PLAYER_RADIUS: f32 = 1.5;
const MOVE_SPEED: f32 = 30.0;
const TURN_SPEED: f32 = 2.2;
const WALL_SCALE: f32 = 40.0;

/// Builds the demo map: an outer room, a brick pillar, a glass partition
/// and an alcove whose south side is an immaterial doorway.
pub fn sample_map() -> Vec<Polygon> {
    let room = Polygon::from_points(
        PolygonId(0),
        &[
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(100.0, 100.0),
            Point2::new(0.0, 100.0),
        ],
    )
    .with_front_material(Material::solid("plaster"));

    // Counter-clockwise winding puts the outward faces on the back side
    let pillar = Polygon::from_points(
        PolygonId(1),
        &[
            Point2::new(20.0, 60.0),
            Point2::new(30.0, 60.0),
            Point2::new(30.0, 70.0),
            Point2::new(20.0, 70.0),
        ],
    )
    .with_back_material(Material::solid("brick"));

    let glass = Polygon::from_points(
        PolygonId(2),
        &[
            Point2::new(60.0, 20.0),
            Point2::new(80.0, 20.0),
            Point2::new(80.0, 22.0),
            Point2::new(60.0, 22.0),
        ],
    )
    .with_front_material(Material::translucent("glass", 0.4))
    .with_back_material(Material::translucent("glass", 0.4));

    vec![room, pillar, glass, alcove()]
}

/// A walled alcove open to the south: edge 0 carries no material and is
/// immaterial, so it neither renders nor blocks movement.
fn alcove() -> Polygon {
    let points = [
        Point2::new(60.0, 60.0),
        Point2::new(85.0, 60.0),
        Point2::new(85.0, 85.0),
        Point2::new(60.0, 85.0),
    ];
    let vertices: Vec<Vertex> = points
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex::new(VertexId(i as u64), *p))
        .collect();
    let edges: Vec<Edge> = (0..vertices.len())
        .map(|i| {
            let edge = Edge::new(
                EdgeId(i as u64),
                vertices[i],
                vertices[(i + 1) % vertices.len()],
            );
            if i == 0 {
                edge.with_immaterial(true)
            } else {
                edge.with_back(Material::solid("wood"))
            }
        })
        .collect();
    Polygon::new(PolygonId(3), edges)
}

/// Deterministic color for a material, hashed from its texture name so
/// every wall with the same texture matches across frames.
pub fn material_color(material: &Material) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    material.texture.hash(&mut hasher);
    let hash = hasher.finish();

    let r = (((hash >> 16) & 0xFF) as u8).max(60);
    let g = (((hash >> 8) & 0xFF) as u8).max(60);
    let b = ((hash & 0xFF) as u8).max(60);
    Color::from_rgba(r, g, b, 255)
}

/// Darkens a wall color by its edge luminosity and distance falloff.
pub fn shade(color: Color, luminosity: f32, distance: f32) -> Color {
    let brightness = luminosity / (1.0 + distance * 0.01);
    Color::new(
        color.r * brightness,
        color.g * brightness,
        color.b * brightness,
        color.a,
    )
}

/// Nearest solid hit along a ray; immaterial edges don't count.
pub fn solid_distance(tree: &BspTree, ray: &Ray) -> f32 {
    let (hits, _) = tree.raycast(ray, |found| {
        found.iter().any(|h| !h.edge.is_immaterial())
    });
    hits.iter()
        .filter(|h| !h.edge.is_immaterial())
        .map(|h| h.distance)
        .fold(f32::INFINITY, f32::min)
}

/// WASD/arrow-key viewpoint with wall collision.
pub struct Player {
    position: Point2<f32>,
    heading: f32,
}

impl Player {
    pub fn new(position: Point2<f32>, heading: f32) -> Self {
        Self { position, heading }
    }

    #[inline]
    pub fn position(&self) -> Point2<f32> {
        self.position
    }

    pub fn forward(&self) -> Vector2<f32> {
        Vector2::new(self.heading.cos(), self.heading.sin())
    }

    /// The raywall camera for the current pose. The screen sits 10 units
    /// out with a half-width of 6.6, roughly a 67 degree field of view.
    pub fn camera(&self) -> raywall::Camera {
        let forward = self.forward();
        let half_plane = Vector2::new(-forward.y, forward.x) * 6.6;
        raywall::Camera::new(self.position, forward * 10.0, half_plane)
    }

    /// Applies one frame of input. Movement is attempted per axis, so
    /// sliding along a wall works without a dedicated response step.
    pub fn update(&mut self, tree: &BspTree, dt: f32) {
        if is_key_down(KeyCode::Left) {
            self.heading += TURN_SPEED * dt;
        }
        if is_key_down(KeyCode::Right) {
            self.heading -= TURN_SPEED * dt;
        }

        let forward = self.forward();
        let strafe = Vector2::new(-forward.y, forward.x);
        let mut step = Vector2::zeros();
        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            step += forward;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            step -= forward;
        }
        if is_key_down(KeyCode::A) {
            step += strafe;
        }
        if is_key_down(KeyCode::D) {
            step -= strafe;
        }
        if step.norm() <= f32::EPSILON {
            return;
        }

        let step = step.normalize() * MOVE_SPEED * dt;
        self.try_move(tree, Vector2::new(step.x, 0.0));
        self.try_move(tree, Vector2::new(0.0, step.y));
    }

    fn try_move(&mut self, tree: &BspTree, step: Vector2<f32>) {
        let length = step.norm();
        if length <= f32::EPSILON {
            return;
        }
        let probe = Ray::new(self.position, step);
        if solid_distance(tree, &probe) > length + PLAYER_RADIUS {
            self.position += step;
        }
    }
}

/// Draws the z-buffer as vertical wall stripes, farthest span first so
/// translucent walls blend over what's behind them.
pub fn draw_view(buffer: &ZBuffer) {
    let width = screen_width();
    let height = screen_height();
    let columns = buffer.columns();
    let stripe = width / (columns.len() - 1) as f32;

    for (i, column) in columns.iter().enumerate() {
        let x = i as f32 * stripe;
        for span in column.spans().iter().rev() {
            let wall_height = (height * WALL_SCALE / span.distance).min(height);
            let top = (height - wall_height) / 2.0;
            let mut color = shade(
                material_color(&span.material),
                span.luminosity,
                span.distance,
            );
            color.a = span.opacity();
            draw_rectangle(x, top, stripe.max(1.0), wall_height, color);
        }
    }
}

/// Top-down overlay: wall edges colored by material, the player's
/// position, and the view cone.
pub fn draw_minimap(polygons: &[Polygon], player: &Player, origin: Vec2, scale: f32) {
    let to_screen =
        |p: Point2<f32>| vec2(origin.x + p.x * scale, origin.y + (100.0 - p.y) * scale);

    for polygon in polygons {
        for edge in polygon.edges() {
            let color = if edge.is_immaterial() {
                DARKGRAY
            } else {
                match edge.front_material().or(edge.back_material()) {
                    Some(material) => material_color(material),
                    None => GRAY,
                }
            };
            let a = to_screen(edge.start().point);
            let b = to_screen(edge.end().point);
            draw_line(a.x, a.y, b.x, b.y, 1.0, color);
        }
    }

    let at = to_screen(player.position());
    let camera = player.camera();
    let screen = camera.screen();
    for target in [screen.start, screen.end] {
        let tip = to_screen(target);
        draw_line(at.x, at.y, tip.x, tip.y, 1.0, YELLOW);
    }
    draw_circle(at.x, at.y, 2.0, RED);
}

/// Blended color of one column for debugging single stripes.
pub fn column_color(column: &Column) -> Color {
    let mut blended = Color::new(0.0, 0.0, 0.0, 1.0);
    for (span, weight) in column.spans().iter().zip(column.weights()) {
        let color = shade(
            material_color(&span.material),
            span.luminosity,
            span.distance,
        );
        blended.r += color.r * weight;
        blended.g += color.g * weight;
        blended.b += color.b * weight;
    }
    blended
}
