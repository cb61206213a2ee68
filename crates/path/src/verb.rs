/// The commands stored in a host path, with the numeric codes the host uses for them.
///
/// The codes are also what the binding layer hands over to its callers, see
/// [`Verb::code`](#method.code).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Verb {
    Move = 0,
    Line = 1,
    Quadratic = 2,
    Conic = 3,
    Cubic = 4,
    Close = 5,
    Done = 6,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Move,
        Verb::Line,
        Verb::Quadratic,
        Verb::Conic,
        Verb::Cubic,
        Verb::Close,
        Verb::Done,
    ];

    pub fn from_code(code: u8) -> Option<Verb> {
        Verb::ALL.get(code as usize).copied()
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Number of points this verb takes from the points array.
    ///
    /// This does not include the start point of curves, which is the last point
    /// consumed by the previous verb.
    #[inline]
    pub fn consumed_points(self) -> usize {
        match self {
            Verb::Move | Verb::Line => 1,
            Verb::Quadratic | Verb::Conic => 2,
            Verb::Cubic => 3,
            Verb::Close | Verb::Done => 0,
        }
    }

    /// Whether the verb starts at the previous verb's last point.
    #[inline]
    pub fn has_implicit_start(self) -> bool {
        match self {
            Verb::Line | Verb::Quadratic | Verb::Conic | Verb::Cubic => true,
            _ => false,
        }
    }

    /// Number of points describing the segment, implicit start point included.
    #[inline]
    pub fn segment_point_count(self) -> usize {
        self.consumed_points() + self.has_implicit_start() as usize
    }

    #[inline]
    pub fn consumes_weight(self) -> bool {
        self == Verb::Conic
    }
}

#[test]
fn codes_round_trip() {
    for verb in &Verb::ALL {
        assert_eq!(Verb::from_code(verb.code()), Some(*verb));
    }
    assert_eq!(Verb::from_code(7), None);
    assert_eq!(Verb::from_code(255), None);
    assert_eq!(Verb::Cubic.code(), 4);
    assert_eq!(Verb::Done.code(), 6);
}

#[test]
fn point_consumption() {
    let expected = [
        (Verb::Move, 1, 1),
        (Verb::Line, 1, 2),
        (Verb::Quadratic, 2, 3),
        (Verb::Conic, 2, 3),
        (Verb::Cubic, 3, 4),
        (Verb::Close, 0, 0),
        (Verb::Done, 0, 0),
    ];

    for &(verb, consumed, segment) in &expected {
        assert_eq!(verb.consumed_points(), consumed, "{:?}", verb);
        assert_eq!(verb.segment_point_count(), segment, "{:?}", verb);
    }

    assert!(Verb::Conic.consumes_weight());
    assert!(!Verb::Quadratic.consumes_weight());
}
