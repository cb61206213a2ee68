//! Reading the raw arrays of a host path.

use crate::layout::{LayoutDescriptor, VerbDirection};
use crate::math::Point;
use crate::memory::{
    encode_points, encode_weights, HostMemory, MemoryImage, PointView, VerbView, WeightView,
};
use crate::verb::Verb;
use crate::{Error, Result};

/// The address of a host `Path` object.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PathHandle(pub u64);

impl PathHandle {
    pub const NULL: PathHandle = PathHandle(0);

    #[inline]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn address(self) -> u64 {
        self.0
    }
}

/// The arrays of a host path, borrowed from the host's memory.
///
/// `verbs` is in physical order. Use [`verb_code`](#method.verb_code) to read verbs in
/// path order.
#[derive(Copy, Clone, Debug)]
pub struct RawPath<'l> {
    pub points: PointView<'l>,
    pub verbs: VerbView<'l>,
    pub conic_weights: WeightView<'l>,
    /// Number of verbs.
    pub count: usize,
    pub direction: VerbDirection,
}

impl<'l> RawPath<'l> {
    pub fn new(
        points: PointView<'l>,
        verbs: VerbView<'l>,
        conic_weights: WeightView<'l>,
        direction: VerbDirection,
    ) -> Self {
        RawPath {
            points,
            verbs,
            conic_weights,
            count: verbs.len(),
            direction,
        }
    }

    pub fn empty() -> Self {
        RawPath::new(
            PointView::empty(),
            VerbView::empty(),
            WeightView::empty(),
            VerbDirection::Forward,
        )
    }

    /// The code of the verb at a given position in path order.
    pub fn verb_code(&self, index: usize) -> Option<u8> {
        if index >= self.count {
            return None;
        }

        match self.direction {
            VerbDirection::Forward => self.verbs.get(index),
            VerbDirection::Backward => self.verbs.get(self.verbs.len().checked_sub(index + 1)?),
        }
    }
}

fn read_count<M: HostMemory + ?Sized>(memory: &M, address: u64) -> Result<usize> {
    let count = memory.read_i32(address).ok_or(Error::InvalidHandle)?;
    if count < 0 {
        log::warn!("Negative element count {} at {:#x}.", count, address);
        return Err(Error::InvalidHandle);
    }

    Ok(count as usize)
}

fn read_array<M: HostMemory + ?Sized>(memory: &M, address: u64, len: usize) -> Result<&[u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    if address == 0 {
        return Err(Error::InvalidHandle);
    }

    memory.bytes(address, len).ok_or(Error::InvalidHandle)
}

fn field(path_ref: u64, offset: usize) -> Result<u64> {
    path_ref
        .checked_add(offset as u64)
        .ok_or(Error::InvalidHandle)
}

/// Reads the arrays of the host path at `handle`, interpreting its memory according to
/// `layout`.
///
/// Nothing is copied: the returned views borrow `memory`.
pub fn extract<'l, M: HostMemory + ?Sized>(
    memory: &'l M,
    handle: PathHandle,
    layout: &LayoutDescriptor,
) -> Result<RawPath<'l>> {
    if handle.is_null() {
        return Err(Error::InvalidHandle);
    }

    let width = layout.pointer_width;
    let path_ref = memory
        .read_pointer(field(handle.address(), layout.path_ref_offset)?, width)
        .ok_or(Error::InvalidHandle)?;
    if path_ref == 0 {
        return Err(Error::InvalidHandle);
    }

    let pointer = |offset: usize| -> Result<u64> {
        memory
            .read_pointer(field(path_ref, offset)?, width)
            .ok_or(Error::InvalidHandle)
    };

    let point_count = read_count(memory, field(path_ref, layout.point_count_offset)?)?;
    let verb_count = read_count(memory, field(path_ref, layout.verb_count_offset)?)?;
    let weight_count = read_count(memory, field(path_ref, layout.weight_count_offset)?)?;

    let points_address = pointer(layout.points_offset)?;
    let verbs_address = pointer(layout.verbs_offset)?;
    let weights_address = pointer(layout.weights_offset)?;

    let points_len = point_count
        .checked_mul(PointView::ELEMENT_SIZE)
        .ok_or(Error::InvalidHandle)?;
    let weights_len = weight_count
        .checked_mul(WeightView::ELEMENT_SIZE)
        .ok_or(Error::InvalidHandle)?;

    let verbs_start = match layout.direction {
        VerbDirection::Forward => verbs_address,
        VerbDirection::Backward if verb_count == 0 => verbs_address,
        VerbDirection::Backward => verbs_address
            .checked_sub(verb_count as u64)
            .ok_or(Error::InvalidHandle)?,
    };

    let points = PointView::new(read_array(memory, points_address, points_len)?);
    let verbs = VerbView::new(read_array(memory, verbs_start, verb_count)?);
    let conic_weights = WeightView::new(read_array(memory, weights_address, weights_len)?);

    Ok(RawPath::new(points, verbs, conic_weights, layout.direction))
}

/// Writes a host path object of the given layout into `image` and returns its handle.
///
/// Empty arrays are stored as null pointers.
pub fn write_path(
    image: &mut MemoryImage,
    layout: &LayoutDescriptor,
    verbs: &[Verb],
    points: &[Point],
    conic_weights: &[f32],
) -> PathHandle {
    let codes: Vec<u8> = verbs.iter().map(|verb| verb.code()).collect();

    write_raw_path(image, layout, &codes, points, conic_weights)
}

/// Same as [`write_path`](fn.write_path.html) with verbs given as raw codes, which
/// allows writing malformed paths.
pub fn write_raw_path(
    image: &mut MemoryImage,
    layout: &LayoutDescriptor,
    verb_codes: &[u8],
    points: &[Point],
    conic_weights: &[f32],
) -> PathHandle {
    let width = layout.pointer_width;
    let align = width.size();

    let points_address = if points.is_empty() {
        0
    } else {
        image.push(&encode_points(points), 4)
    };

    let weights_address = if conic_weights.is_empty() {
        0
    } else {
        image.push(&encode_weights(conic_weights), 4)
    };

    let verbs_address = if verb_codes.is_empty() {
        0
    } else {
        match layout.direction {
            VerbDirection::Forward => image.push(verb_codes, 1),
            VerbDirection::Backward => {
                let reversed: Vec<u8> = verb_codes.iter().rev().copied().collect();
                image.push(&reversed, 1) + verb_codes.len() as u64
            }
        }
    };

    let mut path_ref = vec![0u8; layout.size];
    width.encode(points_address, &mut path_ref[layout.points_offset..]);
    width.encode(verbs_address, &mut path_ref[layout.verbs_offset..]);
    width.encode(weights_address, &mut path_ref[layout.weights_offset..]);
    for &(offset, count) in &[
        (layout.point_count_offset, points.len()),
        (layout.verb_count_offset, verb_codes.len()),
        (layout.weight_count_offset, conic_weights.len()),
    ] {
        path_ref[offset..offset + 4].copy_from_slice(&(count as i32).to_ne_bytes());
    }
    let path_ref_address = image.push(&path_ref, align);

    let mut path = vec![0u8; layout.path_ref_offset + align];
    width.encode(path_ref_address, &mut path[layout.path_ref_offset..]);

    PathHandle(image.push(&path, align))
}
