// src/transform/affine.rs

//! Alignment transforms and their textual form.
//!
//! The alignment step describes how the candidate drawing maps onto the base
//! drawing with a CSS-like string:
//!
//! ```text
//! translate(X%, Y%) rotate(Rdeg) scale(S)
//! ```
//!
//! Translation is a percentage of the *source* surface size, rotation is an
//! angle, and scale is a uniform factor. The components are applied in that
//! textual order, i.e. the pixel-space matrix is `T * R * S`.
//!
//! Two parsers are provided. [`AffineTransform::from_str`] is strict and
//! rejects anything it does not understand. [`AffineTransform::parse_lenient`]
//! looks for each component independently and falls back to its identity
//! value when a component is missing or malformed; the overlay uses the
//! lenient form so a bad alignment string degrades to "no alignment".

use crate::utils::error::{DiffError, Result};
use std::f64::consts::PI;
use std::fmt;
use std::ops::Mul;
use std::str::FromStr;

/// Translate / rotate / scale, as produced by the alignment feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Horizontal offset, in percent of the source width.
    pub translate_x: f64,
    /// Vertical offset, in percent of the source height.
    pub translate_y: f64,
    /// Rotation in radians (clockwise on a y-down surface).
    pub rotation: f64,
    /// Uniform scale factor.
    pub scale: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub const fn identity() -> Self {
        AffineTransform {
            translate_x: 0.0,
            translate_y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }

    pub fn new(translate_x: f64, translate_y: f64, rotation: f64, scale: f64) -> Self {
        AffineTransform {
            translate_x,
            translate_y,
            rotation,
            scale,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// Parses each component on its own; anything missing or malformed keeps
    /// its identity value. `None` yields the identity transform.
    pub fn parse_lenient(input: Option<&str>) -> Self {
        let Some(input) = input else {
            return Self::identity();
        };

        let mut transform = Self::identity();

        match find_call(input, "translate").map(|args| parse_translate(&args)) {
            Some(Ok((x, y))) => {
                transform.translate_x = x;
                transform.translate_y = y;
            }
            Some(Err(err)) => log::debug!("ignoring translate component: {err}"),
            None => {}
        }

        match find_call(input, "rotate").map(|args| parse_rotate(&args)) {
            Some(Ok(rotation)) => transform.rotation = rotation,
            Some(Err(err)) => log::debug!("ignoring rotate component: {err}"),
            None => {}
        }

        match find_call(input, "scale").map(|args| parse_scale(&args)) {
            Some(Ok(scale)) => transform.scale = scale,
            Some(Err(err)) => log::debug!("ignoring scale component: {err}"),
            None => {}
        }

        transform
    }

    /// Pixel-space matrix for a source surface of `source_width x source_height`.
    pub fn to_matrix(&self, source_width: u32, source_height: u32) -> Matrix {
        let px = self.translate_x / 100.0 * source_width as f64;
        let py = self.translate_y / 100.0 * source_height as f64;
        Matrix::translation(px, py) * Matrix::rotation(self.rotation) * Matrix::scale(self.scale)
    }
}

impl fmt::Display for AffineTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}%, {}%) rotate({}deg) scale({})",
            self.translate_x,
            self.translate_y,
            self.rotation.to_degrees(),
            self.scale
        )
    }
}

impl FromStr for AffineTransform {
    type Err = DiffError;

    fn from_str(input: &str) -> Result<Self> {
        let mut transform = Self::identity();
        let mut seen: Vec<&str> = Vec::new();

        for call in split_calls(input)? {
            if seen.contains(&call.name) {
                return Err(DiffError::TransformParse(format!(
                    "{}() given more than once",
                    call.name
                )));
            }
            seen.push(call.name);

            match call.name {
                "translate" => {
                    (transform.translate_x, transform.translate_y) = parse_translate(&call.args)?
                }
                "rotate" => transform.rotation = parse_rotate(&call.args)?,
                "scale" => transform.scale = parse_scale(&call.args)?,
                other => {
                    return Err(DiffError::TransformParse(format!(
                        "unknown function {other}()"
                    )));
                }
            }
        }

        Ok(transform)
    }
}

// --- Grammar ---

#[derive(Debug)]
struct Call<'a> {
    name: &'a str,
    args: Vec<&'a str>,
}

/// `call*` where `call = ident '(' arg (',' arg)* ')'`, separated by whitespace.
fn split_calls(input: &str) -> Result<Vec<Call<'_>>> {
    let mut calls = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let name_len = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        if name_len == 0 {
            return Err(DiffError::TransformParse(format!(
                "expected a function name at '{rest}'"
            )));
        }
        let name = &rest[..name_len];
        let after_name = &rest[name_len..];

        let Some(body) = after_name.strip_prefix('(') else {
            return Err(DiffError::TransformParse(format!("expected '(' after {name}")));
        };
        let Some(close) = body.find(')') else {
            return Err(DiffError::TransformParse(format!("unterminated {name}(")));
        };

        calls.push(Call {
            name,
            args: split_args(&body[..close]),
        });
        rest = body[close + 1..].trim_start();
    }

    Ok(calls)
}

fn split_args(body: &str) -> Vec<&str> {
    body.split(',').map(str::trim).collect()
}

/// Locates `name(...)` anywhere in `input` and returns its arguments.
fn find_call<'a>(input: &'a str, name: &str) -> Option<Vec<&'a str>> {
    let mut search_from = 0;
    while let Some(offset) = input[search_from..].find(name) {
        let start = search_from + offset;
        let after = &input[start + name.len()..];
        let preceded_by_ident = input[..start]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric());

        if !preceded_by_ident {
            if let Some(body) = after.trim_start().strip_prefix('(') {
                return body.find(')').map(|close| split_args(&body[..close]));
            }
        }
        search_from = start + name.len();
    }
    None
}

fn parse_number(text: &str) -> Result<f64> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(DiffError::TransformParse(format!("'{text}' is not a number"))),
    }
}

fn parse_percentage(text: &str) -> Result<f64> {
    match text.trim().strip_suffix('%') {
        Some(number) => parse_number(number),
        None => Err(DiffError::TransformParse(format!(
            "'{text}' is not a percentage"
        ))),
    }
}

fn parse_angle(text: &str) -> Result<f64> {
    let text = text.trim();
    if let Some(deg) = text.strip_suffix("deg") {
        Ok(parse_number(deg)?.to_radians())
    } else if let Some(rad) = text.strip_suffix("rad") {
        parse_number(rad)
    } else if let Some(turn) = text.strip_suffix("turn") {
        Ok(parse_number(turn)? * 2.0 * PI)
    } else if parse_number(text)? == 0.0 {
        Ok(0.0)
    } else {
        Err(DiffError::TransformParse(format!("'{text}' has no angle unit")))
    }
}

fn parse_translate(args: &[&str]) -> Result<(f64, f64)> {
    match args {
        [x] => Ok((parse_percentage(x)?, 0.0)),
        [x, y] => Ok((parse_percentage(x)?, parse_percentage(y)?)),
        _ => Err(DiffError::TransformParse(format!(
            "translate() takes one or two arguments, got {}",
            args.len()
        ))),
    }
}

fn parse_rotate(args: &[&str]) -> Result<f64> {
    match args {
        [angle] => parse_angle(angle),
        _ => Err(DiffError::TransformParse(format!(
            "rotate() takes one argument, got {}",
            args.len()
        ))),
    }
}

fn parse_scale(args: &[&str]) -> Result<f64> {
    match args {
        [s] => parse_number(s),
        [sx, sy] => {
            let (sx, sy) = (parse_number(sx)?, parse_number(sy)?);
            if sx == sy {
                Ok(sx)
            } else {
                Err(DiffError::TransformParse(
                    "only uniform scale is supported".to_string(),
                ))
            }
        }
        _ => Err(DiffError::TransformParse(format!(
            "scale() takes one argument, got {}",
            args.len()
        ))),
    }
}

// --- Matrix ---

/// A 2D affine matrix.
///
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// | 0  0  1  |
/// ```
///
/// `m1 * m2` applies `m2` first, then `m1`, matching how nested canvas
/// transforms compose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Coefficients [a, b, tx, c, d, ty]
    coeffs: [f64; 6],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    pub fn identity() -> Self {
        Self {
            coeffs: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            coeffs: [1.0, 0.0, tx, 0.0, 1.0, ty],
        }
    }

    /// Rotation about the origin; positive angles turn clockwise on a y-down surface.
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            coeffs: [cos, -sin, 0.0, sin, cos, 0.0],
        }
    }

    pub fn scale(s: f64) -> Self {
        Self {
            coeffs: [s, 0.0, 0.0, 0.0, s, 0.0],
        }
    }

    /// The inverse matrix, or `None` when the matrix collapses the plane.
    pub fn inverse(&self) -> Option<Self> {
        let [a, b, tx, c, d, ty] = self.coeffs;

        let det = a * d - b * c;
        if !det.is_finite() || det.abs() < 1e-12 {
            return None;
        }

        let inv_det = 1.0 / det;
        let a_inv = d * inv_det;
        let b_inv = -b * inv_det;
        let c_inv = -c * inv_det;
        let d_inv = a * inv_det;

        Some(Self {
            coeffs: [
                a_inv,
                b_inv,
                -(a_inv * tx + b_inv * ty),
                c_inv,
                d_inv,
                -(c_inv * tx + d_inv * ty),
            ],
        })
    }

    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let [a, b, tx, c, d, ty] = self.coeffs;
        (a * x + b * y + tx, c * x + d * y + ty)
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Matrix) -> Matrix {
        let [a1, b1, tx1, c1, d1, ty1] = self.coeffs;
        let [a2, b2, tx2, c2, d2, ty2] = rhs.coeffs;

        Matrix {
            coeffs: [
                a1 * a2 + b1 * c2,
                a1 * b2 + b1 * d2,
                a1 * tx2 + b1 * ty2 + tx1,
                c1 * a2 + d1 * c2,
                c1 * b2 + d1 * d2,
                c1 * tx2 + d1 * ty2 + ty1,
            ],
        }
    }
}
