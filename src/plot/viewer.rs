use std::f32::consts::FRAC_PI_2;

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

use super::axes::{PanelTransform, Rect, tick_label};
use super::contour::dashes;
use super::figure::{Figure, Panel, PanelKind};
use super::quiver::Arrow;
use crate::grid::Point;

const WINDOW_WIDTH: f32 = 1000.0;
const WINDOW_HEIGHT: f32 = 500.0;
/// Room around each panel for ticks and labels
const MARGIN: f32 = 50.0;

const DASH_ON: f64 = 5.0;
const DASH_OFF: f64 = 4.0;
const ARROW_HEAD: f64 = 6.0;
const MARKER_SIZE: f32 = 8.0;
const POINT_RADIUS: f32 = 1.5;

fn grid_color() -> Color {
    Color::srgb(0.85, 0.85, 0.85)
}

fn dodger_blue(alpha: f32) -> Color {
    Color::srgba(0.118, 0.565, 1.0, alpha)
}

fn stream_color() -> Color {
    Color::srgba(0.2, 0.0, 0.7, 0.4)
}

fn lime_green() -> Color {
    Color::srgb(0.196, 0.804, 0.196)
}

fn crimson() -> Color {
    Color::srgb(0.863, 0.078, 0.235)
}

#[derive(Resource)]
struct FigureResource {
    figure: Figure,
}

/// A polyline in screen coordinates
#[derive(Debug, Clone, PartialEq)]
struct Strip {
    points: Vec<Vec2>,
    color: Color,
}

/// Every line and dot of the figure, redrawn with gizmos each frame
#[derive(Resource, Debug, Default)]
struct Scene {
    strips: Vec<Strip>,
    dots: Vec<(Vec2, Color)>,
}

/// Open a window showing the figure; returns when the window is closed
pub fn run_viewer(figure: Figure, title: &str) {
    tracing::info!("Opening viewer with {} panels", figure.panels.len());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: title.to_string(),
                resolution: (WINDOW_WIDTH as u32, WINDOW_HEIGHT as u32).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(FigureResource { figure })
        .add_systems(Startup, setup)
        .add_systems(Update, draw_scene)
        .run();
}

fn panel_rect(index: usize) -> Rect {
    let width = WINDOW_WIDTH / 2.0;
    Rect {
        cx: f64::from(-WINDOW_WIDTH / 2.0 + width * (index as f32 + 0.5)),
        cy: f64::from(MARGIN / 4.0),
        width: f64::from(width - 2.0 * MARGIN),
        height: f64::from(WINDOW_HEIGHT - 2.0 * MARGIN),
    }
}

fn setup(
    mut commands: Commands,
    mut images: ResMut<Assets<Image>>,
    resource: Res<FigureResource>,
) {
    commands.spawn(Camera2d);

    let mut scene = Scene::default();
    let mut hazard_image: Option<Handle<Image>> = None;

    for (index, panel) in resource.figure.panels.iter().enumerate() {
        let transform = PanelTransform::new(panel.axes.limits, panel_rect(index));

        let field = &panel.hazard.field;
        let image = hazard_image
            .get_or_insert_with(|| {
                images.add(Image::new(
                    Extent3d {
                        width: field.cols() as u32,
                        height: field.rows() as u32,
                        depth_or_array_layers: 1,
                    },
                    TextureDimension::D2,
                    field.to_rgba(),
                    TextureFormat::Rgba8UnormSrgb,
                    RenderAssetUsages::RENDER_WORLD,
                ))
            })
            .clone();

        let area = transform.map_box(field.size());
        commands.spawn((
            Sprite {
                image,
                custom_size: Some(Vec2::new(area.width as f32, area.height as f32)),
                ..default()
            },
            Transform::from_xyz(area.cx as f32, area.cy as f32, 0.0),
        ));

        spawn_labels(&mut commands, panel, &transform);
        add_panel(&mut scene, panel, &transform);
    }

    tracing::debug!(
        "Scene: {} strips, {} dots",
        scene.strips.len(),
        scene.dots.len()
    );
    commands.insert_resource(scene);
}

fn draw_scene(scene: Res<Scene>, mut gizmos: Gizmos) {
    for strip in &scene.strips {
        gizmos.linestrip_2d(strip.points.iter().copied(), strip.color);
    }
    for &(center, color) in &scene.dots {
        gizmos.circle_2d(center, POINT_RADIUS, color);
    }
}

fn to_vec2((x, y): Point) -> Vec2 {
    Vec2::new(x as f32, y as f32)
}

fn add_panel(scene: &mut Scene, panel: &Panel, transform: &PanelTransform) {
    let limits = &panel.axes.limits;
    let screen = |p: Point| to_vec2(transform.map(p));
    let mut line = |points: Vec<Vec2>, color: Color| scene.strips.push(Strip { points, color });

    for &x in &panel.axes.x_ticks {
        line(
            vec![screen((x, limits.ymin)), screen((x, limits.ymax))],
            grid_color(),
        );
    }
    for &y in &panel.axes.y_ticks {
        line(
            vec![screen((limits.xmin, y)), screen((limits.xmax, y))],
            grid_color(),
        );
    }

    for contour in &panel.hazard.contours {
        let mapped: Vec<Point> = contour.points.iter().map(|&p| transform.map(p)).collect();
        for dash in dashes(&mapped, DASH_ON, DASH_OFF) {
            line(dash.into_iter().map(to_vec2).collect(), Color::BLACK);
        }
    }

    match panel.kind {
        PanelKind::Field => {
            for arrow in &panel.arrows {
                let mapped = Arrow {
                    tail: transform.map(arrow.tail),
                    tip: transform.map(arrow.tip),
                };
                line(
                    vec![to_vec2(mapped.tail), to_vec2(mapped.tip)],
                    dodger_blue(0.7),
                );
                for (from, to) in mapped.head(ARROW_HEAD).into_iter().flatten() {
                    line(vec![to_vec2(from), to_vec2(to)], dodger_blue(0.7));
                }
            }
        }
        PanelKind::Stream => {
            for streamline in &panel.streamlines {
                line(
                    streamline.points.iter().map(|&p| screen(p)).collect(),
                    stream_color(),
                );
                if let Some((from, to)) = streamline.arrow {
                    for (a, b) in midpoint_head(transform.map(from), transform.map(to)) {
                        line(vec![to_vec2(a), to_vec2(b)], stream_color());
                    }
                }
            }
        }
    }

    for (position, color) in [(panel.start, lime_green()), (panel.goal, crimson())] {
        let c = screen(position);
        let d = Vec2::splat(MARKER_SIZE);
        let e = Vec2::new(MARKER_SIZE, -MARKER_SIZE);
        line(vec![c - d, c + d], color);
        line(vec![c - e, c + e], color);
    }

    let (x0, y0) = transform.map((limits.xmin, limits.ymin));
    let (x1, y1) = transform.map((limits.xmax, limits.ymax));
    line(
        [(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]
            .into_iter()
            .map(to_vec2)
            .collect(),
        Color::BLACK,
    );

    if panel.kind == PanelKind::Field {
        for &p in &panel.points {
            scene.dots.push((screen(p), dodger_blue(0.5)));
        }
    }
}

/// Fixed-size head at `to`, pointing along `from -> to` (screen coordinates)
fn midpoint_head(from: Point, to: Point) -> Vec<(Point, Point)> {
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    if !(length.is_finite() && length > 0.0) {
        return Vec::new();
    }
    let reach = 10.0 * ARROW_HEAD;
    let tail = (
        to.0 - (to.0 - from.0) / length * reach,
        to.1 - (to.1 - from.1) / length * reach,
    );
    Arrow { tail, tip: to }
        .head(ARROW_HEAD)
        .map(Vec::from)
        .unwrap_or_default()
}

fn spawn_labels(commands: &mut Commands, panel: &Panel, transform: &PanelTransform) {
    let limits = &panel.axes.limits;
    let (left, bottom) = transform.map((limits.xmin, limits.ymin));
    let (right, _) = transform.map((limits.xmax, limits.ymin));
    let (_, top) = transform.map((limits.xmin, limits.ymax));
    let font = || TextFont {
        font_size: 10.0,
        ..default()
    };

    let mut label = |text: String, x: f64, y: f64, rotation: f32| {
        commands.spawn((
            Text2d::new(text),
            font(),
            TextColor(Color::BLACK),
            Transform::from_xyz(x as f32, y as f32, 1.0)
                .with_rotation(Quat::from_rotation_z(rotation)),
        ));
    };

    for &x in &panel.axes.x_ticks {
        let (sx, _) = transform.map((x, limits.ymin));
        label(tick_label(x), sx, bottom - 10.0, 0.0);
    }
    for &y in &panel.axes.y_ticks {
        let (_, sy) = transform.map((limits.xmin, y));
        label(tick_label(y), left - 14.0, sy, 0.0);
    }

    label(
        panel.axes.x_label.to_string(),
        0.5 * (left + right),
        bottom - 26.0,
        0.0,
    );
    label(
        panel.axes.y_label.to_string(),
        left - 34.0,
        0.5 * (bottom + top),
        FRAC_PI_2,
    );
}
