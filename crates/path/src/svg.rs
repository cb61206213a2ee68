//! Serialization of path segments to SVG.
//!
//! ```
//! use pathway_path::math::point;
//! use pathway_path::svg::to_svg_path_data;
//! use pathway_path::{PathSegment, Verb};
//!
//! let a = point(0.0, 0.0);
//! let b = point(10.0, 0.0);
//! let c = point(10.0, 10.0);
//! let segments = vec![
//!     PathSegment::new(Verb::Move, &[a], None),
//!     PathSegment::new(Verb::Line, &[a, b], None),
//!     PathSegment::new(Verb::Line, &[b, c], None),
//!     PathSegment::close(),
//! ];
//!
//! assert_eq!(to_svg_path_data(segments), "M0 0L10 0 10 10Z");
//! ```

use crate::math::Box2D;
use crate::segment::PathSegment;
use crate::verb::Verb;
use crate::FillRule;

use std::fmt::{self, Write};

fn command_letter(verb: Verb) -> Option<char> {
    match verb {
        Verb::Move => Some('M'),
        Verb::Line => Some('L'),
        Verb::Quadratic => Some('Q'),
        Verb::Cubic => Some('C'),
        Verb::Close => Some('Z'),
        Verb::Conic | Verb::Done => None,
    }
}

/// Writes the `d` attribute of an SVG path describing `segments`.
///
/// The command letter is only written when it differs from the previous one.
/// Conics have no SVG equivalent and are skipped: iterate with
/// `ConicEvaluation::AsQuadratics` to keep them.
pub fn write_svg_path_data<W, I>(output: &mut W, segments: I) -> fmt::Result
where
    W: Write,
    I: IntoIterator<Item = PathSegment>,
{
    let mut previous = Verb::Done;
    for segment in segments {
        let letter = match command_letter(segment.verb) {
            Some(letter) => letter,
            None => continue,
        };

        if segment.verb != previous || segment.verb == Verb::Close {
            output.write_char(letter)?;
        } else {
            output.write_char(' ')?;
        }

        // Everything but the start point, which the previous command already wrote.
        let skip = segment.verb.has_implicit_start() as usize;
        for (i, p) in segment.points.iter().skip(skip).enumerate() {
            if i > 0 {
                output.write_char(' ')?;
            }
            write!(output, "{} {}", p.x, p.y)?;
        }

        previous = segment.verb;
    }

    Ok(())
}

/// Returns the `d` attribute of an SVG path describing `segments`.
///
/// See [`write_svg_path_data`](fn.write_svg_path_data.html).
pub fn to_svg_path_data<I>(segments: I) -> String
where
    I: IntoIterator<Item = PathSegment>,
{
    let mut data = String::new();
    // Writing into a String doesn't fail.
    let _ = write_svg_path_data(&mut data, segments);

    data
}

/// Returns an SVG document containing a single path made of `segments`.
///
/// Paths without segments produce an empty document.
pub fn to_svg_document<I>(segments: I, view_box: &Box2D, fill_rule: FillRule) -> String
where
    I: IntoIterator<Item = PathSegment>,
{
    let data = to_svg_path_data(segments);
    let size = view_box.size();

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{} {} {} {}\">",
        view_box.min.x, view_box.min.y, size.width, size.height,
    );
    if !data.is_empty() {
        let fill_rule = match fill_rule {
            FillRule::EvenOdd => " fill-rule=\"evenodd\"",
            FillRule::NonZero => "",
        };
        let _ = writeln!(svg, "  <path{} d=\"{}\"/>", fill_rule, data);
    }
    svg.push_str("</svg>\n");

    svg
}
