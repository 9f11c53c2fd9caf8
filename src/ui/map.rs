//! Map canvas with zoom/pan and marker hit-testing
//!
//! Renders the region map image (or a flat backdrop when the asset is
//! missing) with one marker per visible location and an optional translucent
//! sighting circle. Dragging pans, the wheel zooms, a click on a marker
//! opens its popup.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::Message;

/// Default map-image dimensions (width, height) used until the real asset
/// dimensions are known.
pub const DEFAULT_MAP_SIZE: (f32, f32) = (6388.0, 7502.0);

/// Marker dot radius in screen pixels.
const MARKER_RADIUS: f32 = 6.0;
/// Sighting-circle radius in image pixels.
const SIGHTING_RADIUS: f32 = 120.0;
/// Extra slack around a marker for click hit-testing, in screen pixels.
const HIT_SLACK: f32 = 4.0;
/// A press/release pair within this distance counts as a click, not a drag.
const CLICK_TOLERANCE: f32 = 4.0;

const MIN_ZOOM: f32 = 0.02;
const MAX_ZOOM: f32 = 4.0;

/// One renderable marker: a location that survived the filters.
#[derive(Debug, Clone)]
pub struct Marker {
    pub location_id: String,
    pub name: String,
    /// Position in map-image pixel space (x = column, y = row).
    pub position: Point,
    pub selected: bool,
}

/// The map viewport: image handle, markers, and the view transform.
///
/// The transform is anchored on `center` (image space) so jumping to a
/// location never needs to know the widget bounds: a point maps to
/// `widget_center + (point - center) * zoom`.
pub struct MapView {
    pub image: Option<Handle>,
    /// Map image dimensions (width, height) in pixels.
    pub image_size: (f32, f32),
    pub markers: Vec<Marker>,
    /// Image-space point shown at the middle of the widget.
    pub center: Point,
    /// Scale in screen pixels per image pixel.
    pub zoom: f32,
    pub show_circles: bool,
}

impl Default for MapView {
    fn default() -> Self {
        MapView {
            image: None,
            image_size: DEFAULT_MAP_SIZE,
            markers: Vec::new(),
            center: Point::new(DEFAULT_MAP_SIZE.0 / 2.0, DEFAULT_MAP_SIZE.1 / 2.0),
            zoom: 0.08,
            show_circles: true,
        }
    }
}

impl MapView {
    /// Apply a wheel-zoom delta, clamped to sane bounds.
    pub fn apply_zoom(&mut self, delta: f32) {
        self.zoom = (self.zoom * (1.0 + delta)).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Apply a drag-pan delta given in screen pixels.
    pub fn apply_pan(&mut self, delta: cgmath::Vector2<f32>) {
        self.center.x -= delta.x / self.zoom;
        self.center.y -= delta.y / self.zoom;
    }

    /// Center the viewport on an image-space point (jump-to-location).
    pub fn focus_on(&mut self, position: Point) {
        self.center = position;
        if self.zoom < 0.25 {
            self.zoom = 0.25;
        }
    }

    fn to_screen(&self, point: Point, bounds: Rectangle) -> Point {
        Point::new(
            bounds.width / 2.0 + (point.x - self.center.x) * self.zoom,
            bounds.height / 2.0 + (point.y - self.center.y) * self.zoom,
        )
    }

    /// The marker under a widget-local cursor position, if any.
    fn hit_marker(&self, cursor: Point, bounds: Rectangle) -> Option<&Marker> {
        self.markers.iter().find(|marker| {
            let screen = self.to_screen(marker.position, bounds);
            let dx = screen.x - cursor.x;
            let dy = screen.y - cursor.y;
            (dx * dx + dy * dy).sqrt() <= MARKER_RADIUS + HIT_SLACK
        })
    }
}

/// State for drag interactions
#[derive(Debug, Clone, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub last_position: Option<Point>,
    pub pressed_at: Option<Point>,
}

impl Program<Message> for MapView {
    type State = DragState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        // Backdrop behind (and instead of) the map image.
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.12, 0.14, 0.16),
        );

        let top_left = self.to_screen(Point::ORIGIN, bounds);
        let map_size = Size::new(
            self.image_size.0 * self.zoom,
            self.image_size.1 * self.zoom,
        );

        match &self.image {
            Some(handle) => {
                frame.draw_image(
                    Rectangle::new(top_left, map_size),
                    canvas::Image::new(handle.clone()),
                );
            }
            None => {
                // Missing asset is cosmetic: paint the map extent instead.
                frame.fill_rectangle(top_left, map_size, Color::from_rgb(0.20, 0.24, 0.20));
            }
        }

        for marker in &self.markers {
            let screen = self.to_screen(marker.position, bounds);

            if self.show_circles {
                frame.fill(
                    &Path::circle(screen, SIGHTING_RADIUS * self.zoom),
                    Color::from_rgba(0.95, 0.35, 0.25, 0.12),
                );
            }

            frame.fill(
                &Path::circle(screen, MARKER_RADIUS),
                Color::from_rgb(0.95, 0.35, 0.25),
            );

            if marker.selected {
                frame.stroke(
                    &Path::circle(screen, MARKER_RADIUS + 3.0),
                    Stroke::default()
                        .with_color(Color::from_rgb(1.0, 0.9, 0.3))
                        .with_width(2.0),
                );
            }
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            // Mouse wheel for zooming
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                let zoom_delta = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => y * 0.1,
                    mouse::ScrollDelta::Pixels { y, .. } => y * 0.01,
                };
                return (
                    canvas::event::Status::Captured,
                    Some(Message::MapZoomed(zoom_delta)),
                );
            }

            // Mouse button press - start dragging, remember the press point
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(pos) = cursor.position() {
                    state.is_dragging = true;
                    state.last_position = Some(pos);
                    state.pressed_at = Some(pos);
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Mouse button release - a short press is a click on a marker
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                let pressed_at = state.pressed_at.take();
                state.is_dragging = false;
                state.last_position = None;

                if let (Some(pressed), Some(released)) = (pressed_at, cursor.position()) {
                    let moved =
                        ((released.x - pressed.x).powi(2) + (released.y - pressed.y).powi(2)).sqrt();
                    if moved <= CLICK_TOLERANCE {
                        if let Some(local) = cursor.position_in(bounds) {
                            if let Some(marker) = self.hit_marker(local, bounds) {
                                return (
                                    canvas::event::Status::Captured,
                                    Some(Message::LocationClicked(marker.location_id.clone())),
                                );
                            }
                        }
                    }
                }
                return (canvas::event::Status::Captured, None);
            }

            // Mouse move - pan if dragging
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.is_dragging {
                    if let Some(current_pos) = cursor.position() {
                        if let Some(last_pos) = state.last_position {
                            let delta = cgmath::Vector2::new(
                                current_pos.x - last_pos.x,
                                current_pos.y - last_pos.y,
                            );

                            state.last_position = Some(current_pos);
                            return (
                                canvas::event::Status::Captured,
                                Some(Message::MapPanned(delta)),
                            );
                        }
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = MapView::default();
        for _ in 0..100 {
            view.apply_zoom(1.0);
        }
        assert!(view.zoom <= MAX_ZOOM);
        for _ in 0..100 {
            view.apply_zoom(-0.9);
        }
        assert!(view.zoom >= MIN_ZOOM);
    }

    #[test]
    fn test_pan_moves_center_against_drag() {
        let mut view = MapView::default();
        view.zoom = 1.0;
        let before = view.center;
        view.apply_pan(cgmath::Vector2::new(10.0, -20.0));
        assert_eq!(view.center, Point::new(before.x - 10.0, before.y + 20.0));
    }

    #[test]
    fn test_focus_centers_and_zooms_in() {
        let mut view = MapView::default();
        view.focus_on(Point::new(100.0, 200.0));
        assert_eq!(view.center, Point::new(100.0, 200.0));
        assert!(view.zoom >= 0.25);
    }

    #[test]
    fn test_hit_marker_at_widget_center() {
        let mut view = MapView::default();
        view.zoom = 1.0;
        view.center = Point::new(50.0, 60.0);
        view.markers = vec![Marker {
            location_id: "route-1".into(),
            name: "Route 1".into(),
            position: Point::new(50.0, 60.0),
            selected: false,
        }];

        let bounds = Rectangle::new(Point::ORIGIN, Size::new(800.0, 600.0));
        let hit = view.hit_marker(Point::new(400.0, 300.0), bounds);
        assert_eq!(hit.map(|m| m.location_id.as_str()), Some("route-1"));

        let miss = view.hit_marker(Point::new(450.0, 300.0), bounds);
        assert!(miss.is_none());
    }
}
