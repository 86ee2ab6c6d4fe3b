//! Style codes to drawing recipes.
//!
//! [`resolve`] is total over its input: every declared style code maps to a recipe and
//! every out-of-domain code maps to the documented fallback (mouth → smile arc,
//! accessory → nothing). Geometry is expressed in avatar space: origin at the monster's
//! center, y pointing down, one unit per pixel at scale 1.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::avatar::config::{Accessory, AvatarConfig, HexColor, MouthType};
use crate::foundation::core::{BezPath, Point, Rgb, Vec2};

/// Radius of the body disc.
pub const BODY_RADIUS: f64 = 40.0;
/// Radius of each eye white.
pub const EYE_WHITE_RADIUS: f64 = 12.0;
/// Radius of each pupil.
pub const PUPIL_RADIUS: f64 = 6.0;
/// Radius of the highlight dot on each pupil.
pub const SHINE_RADIUS: f64 = 2.0;
/// Radius of each arm disc.
pub const ARM_RADIUS: f64 = 8.0;

const MOUTH_PINK: Rgb = Rgb::from_u24(0xFF69B4);
const CAP_RED: Rgb = Rgb::from_u24(0xFF0000);
const HAT_BROWN: Rgb = Rgb::from_u24(0x8B4513);
const CROWN_GOLD: Rgb = Rgb::from_u24(0xFFD700);
const JEWEL_RED: Rgb = Rgb::from_u24(0xFF0000);

const JEWEL_NAMES: [&str; 5] = [
    "crown_jewel_0",
    "crown_jewel_1",
    "crown_jewel_2",
    "crown_jewel_3",
    "crown_jewel_4",
];

/// Geometry of a primitive, in avatar space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Filled or stroked circle.
    Circle {
        /// Center point.
        center: Point,
        /// Radius.
        radius: f64,
    },
    /// Axis-aligned ellipse.
    Ellipse {
        /// Center point.
        center: Point,
        /// Horizontal and vertical radius.
        radii: Vec2,
    },
    /// Closed polygon.
    Polygon {
        /// Vertices in drawing order.
        points: Vec<Point>,
    },
    /// Regular star polygon with its first point straight up.
    Star {
        /// Center point.
        center: Point,
        /// Number of tips.
        points: u32,
        /// Distance from the center to each tip.
        outer_radius: f64,
        /// Distance from the center to each notch between tips.
        inner_radius: f64,
    },
    /// Open circular arc drawn clockwise on screen from `start_angle` to `end_angle`;
    /// an end at or before the start wraps a full turn forward.
    Arc {
        /// Center of the circle the arc lies on.
        center: Point,
        /// Radius.
        radius: f64,
        /// Start angle in radians; 0 points right.
        start_angle: f64,
        /// End angle in radians.
        end_angle: f64,
    },
    /// Straight segment.
    Line {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
    },
}

impl Shape {
    /// Short lowercase name of the variant, e.g. `"circle"`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Polygon { .. } => "polygon",
            Shape::Star { .. } => "star",
            Shape::Arc { .. } => "arc",
            Shape::Line { .. } => "line",
        }
    }

    /// Outline of the shape as a path in the shape's local space.
    pub fn to_path(&self, tolerance: f64) -> BezPath {
        use kurbo::Shape as _;

        match self {
            Shape::Circle { center, radius } => kurbo::Circle::new(*center, *radius).to_path(tolerance),
            Shape::Ellipse { center, radii } => {
                kurbo::Ellipse::new(*center, *radii, 0.0).to_path(tolerance)
            }
            Shape::Polygon { points } => closed_polygon(points),
            Shape::Star {
                center,
                points,
                outer_radius,
                inner_radius,
            } => closed_polygon(&star_vertices(*center, *points, *outer_radius, *inner_radius)),
            Shape::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let mut sweep = end_angle - start_angle;
                if sweep <= 0.0 {
                    sweep += TAU;
                }
                kurbo::Arc::new(*center, Vec2::new(*radius, *radius), *start_angle, sweep, 0.0)
                    .into_path(tolerance)
            }
            Shape::Line { from, to } => {
                let mut p = BezPath::new();
                p.move_to(*from);
                p.line_to(*to);
                p
            }
        }
    }

    /// Whether the shape encloses an area a fill can cover.
    pub fn is_closed(&self) -> bool {
        !matches!(self, Shape::Arc { .. } | Shape::Line { .. })
    }
}

fn closed_polygon(points: &[Point]) -> BezPath {
    let mut p = BezPath::new();
    let mut it = points.iter();
    if let Some(first) = it.next() {
        p.move_to(*first);
        for pt in it {
            p.line_to(*pt);
        }
        p.close_path();
    }
    p
}

/// Vertices alternate outer/inner radius, starting at the top.
pub fn star_vertices(center: Point, points: u32, outer: f64, inner: f64) -> Vec<Point> {
    let n = points.max(2) * 2;
    let step = PI / f64::from(points.max(2));
    (0..n)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = -FRAC_PI_2 + f64::from(i) * step;
            Point::new(center.x + r * a.cos(), center.y + r * a.sin())
        })
        .collect()
}

/// Outline drawn along a shape.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    /// Line width in avatar units.
    pub width: f64,
    /// Line color.
    pub color: Rgb,
}

/// How a shape is painted. Fill is drawn before stroke.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Paint {
    /// Interior color; `None` leaves the interior empty.
    pub fill: Option<Rgb>,
    /// Outline; `None` draws no outline.
    pub stroke: Option<StrokeStyle>,
}

impl Paint {
    /// Solid fill and no stroke.
    pub fn fill(c: Rgb) -> Self {
        Self {
            fill: Some(c),
            stroke: None,
        }
    }

    /// Stroke only.
    pub fn stroke(width: f64, color: Rgb) -> Self {
        Self {
            fill: None,
            stroke: Some(StrokeStyle { width, color }),
        }
    }
}

/// A painted shape.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Primitive {
    /// Geometry.
    pub shape: Shape,
    /// Fill and stroke.
    pub paint: Paint,
}

impl Primitive {
    fn new(shape: Shape, paint: Paint) -> Self {
        Self { shape, paint }
    }

    fn disc(radius: f64, color: Rgb) -> Self {
        Self::new(
            Shape::Circle {
                center: Point::ORIGIN,
                radius,
            },
            Paint::fill(color),
        )
    }
}

/// The five parts an avatar is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    /// The body disc.
    Body,
    /// Both eyes with their pupils and shines.
    Eyes,
    /// The mouth shape.
    Mouth,
    /// Both arm discs.
    Arms,
    /// The optional accessory.
    Accessory,
}

impl PartKind {
    /// Name of the scene node this part becomes.
    pub fn node_name(self) -> &'static str {
        match self {
            PartKind::Body => "body",
            PartKind::Eyes => "eyes",
            PartKind::Mouth => "mouth",
            PartKind::Arms => "arms",
            PartKind::Accessory => "accessory",
        }
    }
}

/// One drawable element of a part, positioned relative to the part.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PieceRecipe {
    /// Scene node name of the piece.
    pub name: &'static str,
    /// Position relative to the part.
    pub offset: Vec2,
    /// What the piece draws.
    pub primitive: Primitive,
}

impl PieceRecipe {
    fn new(name: &'static str, offset: Vec2, primitive: Primitive) -> Self {
        Self {
            name,
            offset,
            primitive,
        }
    }
}

/// Declarative description of one avatar part before it is placed into a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct PartRecipe {
    /// Which part this is.
    pub kind: PartKind,
    /// Position relative to the monster's center.
    pub offset: Vec2,
    /// Drawable elements in draw order.
    pub pieces: Vec<PieceRecipe>,
}

/// Maps a configuration to its part recipes in draw order: body, eyes, mouth, arms,
/// then the accessory when one is drawable.
#[tracing::instrument(level = "debug", skip(config), fields(body = %config.body_type, mouth = %config.mouth_type, accessory = %config.accessory))]
pub fn resolve(config: &AvatarConfig) -> Vec<PartRecipe> {
    let primary = color_or_black("primaryColor", &config.primary_color);
    let accent = color_or_black("accentColor", &config.accent_color);

    let mut parts = vec![
        body_part(primary),
        eyes_part(),
        mouth_part(&config.mouth_type),
        arms_part(accent),
    ];
    if let Some(acc) = accessory_part(&config.accessory) {
        parts.push(acc);
    }
    parts
}

// A color with no leading hex digit has no defined value. It renders black and is
// reported; see `AvatarConfig::validate` for upstream checking.
pub(crate) fn color_or_black(field: &'static str, c: &HexColor) -> Rgb {
    c.to_rgb().unwrap_or_else(|| {
        tracing::warn!(field, value = %c.0, "malformed color has no numeric value; drawing black");
        Rgb::BLACK
    })
}

fn body_part(primary: Rgb) -> PartRecipe {
    PartRecipe {
        kind: PartKind::Body,
        offset: Vec2::new(0.0, 5.0),
        pieces: vec![PieceRecipe::new(
            "body",
            Vec2::ZERO,
            Primitive::disc(BODY_RADIUS, primary),
        )],
    }
}

fn eyes_part() -> PartRecipe {
    let mut pieces = Vec::with_capacity(6);
    for (x, [white, pupil, shine]) in [
        (-15.0, ["left_eye_white", "left_eye_pupil", "left_eye_shine"]),
        (15.0, ["right_eye_white", "right_eye_pupil", "right_eye_shine"]),
    ] {
        pieces.push(PieceRecipe::new(
            white,
            Vec2::new(x, 0.0),
            Primitive::disc(EYE_WHITE_RADIUS, Rgb::WHITE),
        ));
        pieces.push(PieceRecipe::new(
            pupil,
            Vec2::new(x, 0.0),
            Primitive::disc(PUPIL_RADIUS, Rgb::BLACK),
        ));
        pieces.push(PieceRecipe::new(
            shine,
            Vec2::new(x - 2.0, -2.0),
            Primitive::disc(SHINE_RADIUS, Rgb::WHITE),
        ));
    }
    PartRecipe {
        kind: PartKind::Eyes,
        offset: Vec2::new(0.0, -15.0),
        pieces,
    }
}

fn smile_arc(radius: f64) -> Primitive {
    Primitive::new(
        Shape::Arc {
            center: Point::ORIGIN,
            radius,
            start_angle: PI,
            end_angle: 0.0,
        },
        Paint::stroke(2.0, Rgb::BLACK),
    )
}

fn mouth_part(mouth: &MouthType) -> PartRecipe {
    let primitive = match mouth {
        MouthType::Smile => smile_arc(10.0),
        MouthType::Grin => smile_arc(15.0),
        MouthType::Open => Primitive::new(
            Shape::Ellipse {
                center: Point::new(0.0, 5.0),
                radii: Vec2::new(8.0, 12.0),
            },
            Paint {
                fill: Some(MOUTH_PINK),
                stroke: Some(StrokeStyle {
                    width: 2.0,
                    color: Rgb::BLACK,
                }),
            },
        ),
        MouthType::Neutral => Primitive::new(
            Shape::Line {
                from: Point::new(-8.0, 0.0),
                to: Point::new(8.0, 0.0),
            },
            Paint::stroke(2.0, Rgb::BLACK),
        ),
        MouthType::Tongue | MouthType::Unknown(_) => smile_arc(10.0),
    };
    PartRecipe {
        kind: PartKind::Mouth,
        offset: Vec2::new(0.0, 20.0),
        pieces: vec![PieceRecipe::new("mouth", Vec2::ZERO, primitive)],
    }
}

fn arms_part(accent: Rgb) -> PartRecipe {
    PartRecipe {
        kind: PartKind::Arms,
        offset: Vec2::ZERO,
        pieces: vec![
            PieceRecipe::new(
                "left_arm",
                Vec2::new(-50.0, 0.0),
                Primitive::disc(ARM_RADIUS, accent),
            ),
            PieceRecipe::new(
                "right_arm",
                Vec2::new(50.0, 0.0),
                Primitive::disc(ARM_RADIUS, accent),
            ),
        ],
    }
}

fn accessory_part(accessory: &Accessory) -> Option<PartRecipe> {
    let pieces = match accessory {
        Accessory::Cap => vec![PieceRecipe::new(
            "cap",
            Vec2::ZERO,
            Primitive::new(
                Shape::Polygon {
                    points: vec![
                        Point::new(-30.0, -40.0),
                        Point::new(30.0, -40.0),
                        Point::new(20.0, -50.0),
                        Point::new(-20.0, -50.0),
                    ],
                },
                Paint::fill(CAP_RED),
            ),
        )],
        Accessory::Hat => vec![PieceRecipe::new(
            "hat",
            Vec2::ZERO,
            Primitive::new(
                Shape::Polygon {
                    points: vec![
                        Point::new(-40.0, -45.0),
                        Point::new(40.0, -45.0),
                        Point::new(35.0, -65.0),
                        Point::new(-35.0, -65.0),
                    ],
                },
                Paint::fill(HAT_BROWN),
            ),
        )],
        Accessory::Crown => {
            let center = Vec2::new(0.0, -50.0);
            let mut pieces = vec![PieceRecipe::new(
                "crown_star",
                center,
                Primitive::new(
                    Shape::Star {
                        center: Point::ORIGIN,
                        points: 5,
                        outer_radius: 20.0,
                        inner_radius: 15.0,
                    },
                    Paint::fill(CROWN_GOLD),
                ),
            )];
            for (i, name) in JEWEL_NAMES.into_iter().enumerate() {
                let a = i as f64 * TAU / 5.0;
                pieces.push(PieceRecipe::new(
                    name,
                    center + Vec2::new(a.cos() * 15.0, a.sin() * 15.0),
                    Primitive::disc(3.0, JEWEL_RED),
                ));
            }
            pieces
        }
        Accessory::Glasses => {
            let lens = || {
                Primitive::new(
                    Shape::Circle {
                        center: Point::ORIGIN,
                        radius: 8.0,
                    },
                    Paint::stroke(3.0, Rgb::BLACK),
                )
            };
            vec![
                PieceRecipe::new("left_lens", Vec2::new(-10.0, -5.0), lens()),
                PieceRecipe::new("right_lens", Vec2::new(10.0, -5.0), lens()),
                PieceRecipe::new(
                    "bridge",
                    Vec2::ZERO,
                    Primitive::new(
                        Shape::Line {
                            from: Point::new(-2.0, -5.0),
                            to: Point::new(2.0, -5.0),
                        },
                        Paint::stroke(3.0, Rgb::BLACK),
                    ),
                ),
            ]
        }
        Accessory::None | Accessory::Bow | Accessory::Unknown(_) => return None,
    };
    Some(PartRecipe {
        kind: PartKind::Accessory,
        offset: Vec2::ZERO,
        pieces,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/avatar/resolve.rs"]
mod tests;
