//! Bounds-checked access to the memory of the host that owns the paths.
//!
//! Host objects are never reinterpreted as Rust structures. Fields are read one at a
//! time, at offsets given by a [`LayoutDescriptor`](../layout/struct.LayoutDescriptor.html),
//! through the [`HostMemory`](trait.HostMemory.html) trait, and arrays are exposed as
//! views that decode their elements from bytes on access.

use crate::math::{point, Point};

use core::convert::TryFrom;

/// Size of a pointer in the host process.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PointerWidth {
    Bits32,
    Bits64,
}

impl PointerWidth {
    #[cfg(target_pointer_width = "64")]
    pub const NATIVE: PointerWidth = PointerWidth::Bits64;
    #[cfg(not(target_pointer_width = "64"))]
    pub const NATIVE: PointerWidth = PointerWidth::Bits32;

    #[inline]
    pub fn size(self) -> usize {
        match self {
            PointerWidth::Bits32 => 4,
            PointerWidth::Bits64 => 8,
        }
    }

    /// Encodes an address as a host pointer.
    pub fn encode(self, address: u64, out: &mut [u8]) {
        match self {
            PointerWidth::Bits32 => out[..4].copy_from_slice(&(address as u32).to_ne_bytes()),
            PointerWidth::Bits64 => out[..8].copy_from_slice(&address.to_ne_bytes()),
        }
    }
}

/// Read-only access to the memory holding host objects.
///
/// `bytes` must return `None` rather than a partial slice when any byte of the
/// requested range is not readable.
pub trait HostMemory {
    fn bytes(&self, address: u64, len: usize) -> Option<&[u8]>;

    fn read_i32(&self, address: u64) -> Option<i32> {
        let bytes = self.bytes(address, 4)?;
        Some(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn read_pointer(&self, address: u64, width: PointerWidth) -> Option<u64> {
        let bytes = self.bytes(address, width.size())?;
        Some(match width {
            PointerWidth::Bits32 => {
                u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64
            }
            PointerWidth::Bits64 => {
                let mut word = [0; 8];
                word.copy_from_slice(&bytes[..8]);
                u64::from_ne_bytes(word)
            }
        })
    }
}

impl<'l, M: HostMemory + ?Sized> HostMemory for &'l M {
    fn bytes(&self, address: u64, len: usize) -> Option<&[u8]> {
        (**self).bytes(address, len)
    }
}

/// The memory of the current process, for hosts that live in the same address space.
///
/// This is the only place where the crate dereferences raw addresses.
#[derive(Debug)]
pub struct ProcessMemory {
    _private: (),
}

impl ProcessMemory {
    /// # Safety
    ///
    /// Every path handle later used with this object must be the address of a live host
    /// path object of the resolved layout, and the host must not mutate or free that
    /// object while anything read through this object is alive.
    pub unsafe fn new() -> Self {
        ProcessMemory { _private: () }
    }
}

impl HostMemory for ProcessMemory {
    fn bytes(&self, address: u64, len: usize) -> Option<&[u8]> {
        if address == 0 {
            return None;
        }
        if len > isize::MAX as usize {
            return None;
        }
        let start = usize::try_from(address).ok()?;
        start.checked_add(len)?;

        // Safety: the creator of this object guarantees that the addresses reachable
        // from the handles it is used with are live and immutable (see `new`).
        Some(unsafe { core::slice::from_raw_parts(start as *const u8, len) })
    }
}

/// An owned, relocatable copy of host memory.
///
/// Addresses start at `base` and grow with each allocation. Useful to build host
/// objects from scratch or to analyze memory dumped from another process.
#[derive(Clone, Debug)]
pub struct MemoryImage {
    base: u64,
    data: Vec<u8>,
}

impl MemoryImage {
    /// Creates an empty image whose first byte lives at `base`.
    ///
    /// Address zero is never readable, so a `base` of zero is bumped to one.
    pub fn new(base: u64) -> Self {
        MemoryImage {
            base: base.max(1),
            data: Vec::new(),
        }
    }

    /// Wraps existing bytes (for example a memory dump) located at `base`.
    pub fn from_bytes(base: u64, data: Vec<u8>) -> Self {
        MemoryImage {
            base: base.max(1),
            data,
        }
    }

    #[inline]
    pub fn base(&self) -> u64 {
        self.base
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Address one past the last byte of the image.
    #[inline]
    pub fn end(&self) -> u64 {
        self.base + self.data.len() as u64
    }

    /// Appends `bytes` at the next address aligned to `align` and returns that address.
    pub fn push(&mut self, bytes: &[u8], align: usize) -> u64 {
        let align = align.max(1) as u64;
        let padding = (align - self.end() % align) % align;
        self.data.resize(self.data.len() + padding as usize, 0);

        let address = self.end();
        self.data.extend_from_slice(bytes);

        address
    }
}

impl HostMemory for MemoryImage {
    fn bytes(&self, address: u64, len: usize) -> Option<&[u8]> {
        let start = usize::try_from(address.checked_sub(self.base)?).ok()?;
        let end = start.checked_add(len)?;
        self.data.get(start..end)
    }
}

/// A non-owning view over an array of host points (pairs of `f32`).
#[derive(Copy, Clone, Debug)]
pub struct PointView<'l> {
    bytes: &'l [u8],
}

impl<'l> PointView<'l> {
    pub const ELEMENT_SIZE: usize = 8;

    pub fn new(bytes: &'l [u8]) -> Self {
        PointView { bytes }
    }

    pub fn empty() -> Self {
        PointView { bytes: &[] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / Self::ELEMENT_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        if index >= self.len() {
            return None;
        }
        let b = &self.bytes[index * Self::ELEMENT_SIZE..(index + 1) * Self::ELEMENT_SIZE];
        let x = f32::from_ne_bytes([b[0], b[1], b[2], b[3]]);
        let y = f32::from_ne_bytes([b[4], b[5], b[6], b[7]]);

        Some(point(x, y))
    }

    pub fn iter(&self) -> impl Iterator<Item = Point> + 'l {
        let view = *self;
        (0..view.len()).filter_map(move |i| view.get(i))
    }
}

/// A non-owning view over an array of host verb codes, in physical storage order.
#[derive(Copy, Clone, Debug)]
pub struct VerbView<'l> {
    bytes: &'l [u8],
}

impl<'l> VerbView<'l> {
    pub fn new(bytes: &'l [u8]) -> Self {
        VerbView { bytes }
    }

    pub fn empty() -> Self {
        VerbView { bytes: &[] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }
}

/// A non-owning view over an array of host conic weights.
#[derive(Copy, Clone, Debug)]
pub struct WeightView<'l> {
    bytes: &'l [u8],
}

impl<'l> WeightView<'l> {
    pub const ELEMENT_SIZE: usize = 4;

    pub fn new(bytes: &'l [u8]) -> Self {
        WeightView { bytes }
    }

    pub fn empty() -> Self {
        WeightView { bytes: &[] }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() / Self::ELEMENT_SIZE
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        if index >= self.len() {
            return None;
        }
        let b = &self.bytes[index * Self::ELEMENT_SIZE..(index + 1) * Self::ELEMENT_SIZE];

        Some(f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Encodes points the way the host stores them.
pub fn encode_points(points: &[Point]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(points.len() * PointView::ELEMENT_SIZE);
    for p in points {
        bytes.extend_from_slice(&p.x.to_ne_bytes());
        bytes.extend_from_slice(&p.y.to_ne_bytes());
    }

    bytes
}

/// Encodes conic weights the way the host stores them.
pub fn encode_weights(weights: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(weights.len() * WeightView::ELEMENT_SIZE);
    for w in weights {
        bytes.extend_from_slice(&w.to_ne_bytes());
    }

    bytes
}

#[test]
fn image_allocations_are_aligned() {
    let mut image = MemoryImage::new(0x1001);

    let a = image.push(&[1, 2, 3], 1);
    let b = image.push(&[4; 8], 8);
    let c = image.push(&[], 4);

    assert_eq!(a, 0x1001);
    assert_eq!(b % 8, 0);
    assert!(b >= a + 3);
    assert_eq!(c % 4, 0);
    assert_eq!(image.bytes(b, 8), Some(&[4u8; 8][..]));
}

#[test]
fn image_reads_are_bounds_checked() {
    let mut image = MemoryImage::new(0x100);
    let address = image.push(&7i32.to_ne_bytes(), 4);

    assert_eq!(image.read_i32(address), Some(7));
    assert_eq!(image.read_i32(address + 1), None);
    assert_eq!(image.bytes(0x0ff, 1), None);
    assert_eq!(image.bytes(0, 4), None);
    assert_eq!(image.bytes(address, usize::MAX), None);
    assert_eq!(image.bytes(image.end(), 0), Some(&[][..]));
}

#[test]
fn pointers_of_both_widths() {
    let mut image = MemoryImage::new(0x40);
    let mut buffer = [0u8; 12];
    PointerWidth::Bits32.encode(0xdead_beef, &mut buffer[0..4]);
    PointerWidth::Bits64.encode(0x1234_5678_9abc, &mut buffer[4..12]);
    let address = image.push(&buffer, 4);

    assert_eq!(image.read_pointer(address, PointerWidth::Bits32), Some(0xdead_beef));
    assert_eq!(image.read_pointer(address + 4, PointerWidth::Bits64), Some(0x1234_5678_9abc));
}

#[test]
fn views_decode_elements() {
    let points = [point(1.0, 2.0), point(-3.5, 4.25)];
    let point_bytes = encode_points(&points);
    let weight_bytes = encode_weights(&[0.5, 2.0]);

    let view = PointView::new(&point_bytes);
    assert_eq!(view.len(), 2);
    assert_eq!(view.get(1), Some(point(-3.5, 4.25)));
    assert_eq!(view.get(2), None);
    assert_eq!(view.iter().collect::<Vec<_>>(), points.to_vec());

    let weights = WeightView::new(&weight_bytes);
    assert_eq!(weights.len(), 2);
    assert_eq!(weights.get(0), Some(0.5));
    assert_eq!(weights.get(2), None);

    let verbs = VerbView::new(&[0, 1, 5]);
    assert_eq!(verbs.get(2), Some(5));
    assert_eq!(verbs.get(3), None);
    assert!(VerbView::empty().is_empty());
    assert!(PointView::empty().is_empty());
}

#[test]
fn process_memory_reads_live_objects() {
    use crate::extract::{extract, write_path};
    use crate::layout::LayoutDescriptor;
    use crate::Verb;

    let layout = LayoutDescriptor::for_version(30, PointerWidth::NATIVE).unwrap();
    let mut buffer = vec![0u8; 4096];
    let base = buffer.as_ptr() as u64;

    // Lay the path out at the buffer's own address, then copy it there.
    let mut image = MemoryImage::new(base);
    let handle = write_path(
        &mut image,
        layout,
        &[Verb::Move, Verb::Line, Verb::Close],
        &[point(1.0, 2.0), point(3.0, 4.0)],
        &[],
    );
    assert_eq!(image.base(), base);
    assert!(image.len() <= buffer.len());
    buffer[..image.len()].copy_from_slice(image.bytes(base, image.len()).unwrap());

    let memory = unsafe { ProcessMemory::new() };
    assert_eq!(memory.bytes(base, 4), Some(&buffer[..4]));
    assert_eq!(memory.bytes(0, 4), None);
    assert_eq!(memory.bytes(usize::MAX as u64, 2), None);
    assert_eq!(memory.bytes(base, usize::MAX), None);

    let path = extract(&memory, handle, layout).unwrap();
    assert_eq!(path.count, 3);
    assert_eq!(path.points.get(1), Some(point(3.0, 4.0)));
    assert_eq!(path.verb_code(2), Some(Verb::Close.code()));
}
