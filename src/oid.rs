//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` so typical MIB-2 identifiers never
//! touch the heap.

use crate::error::internal::DecodeErrorKind;
use crate::error::{Error, OidErrorKind, Result};
use smallvec::SmallVec;
use std::fmt;

/// Maximum number of arcs in an OID (RFC 2578 Section 3.5).
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create an OID from any iterator of arcs.
    ///
    /// ```
    /// use snmp_core::Oid;
    ///
    /// let oid = Oid::new([1, 3, 6, 1, 2, 1]);
    /// assert_eq!(oid.len(), 6);
    /// ```
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse dotted notation such as `"1.3.6.1.2.1.1.1.0"`.
    ///
    /// A single leading dot (`".1.3.6.1"`) is accepted. Arc constraints are
    /// not checked here; see [`validate`](Self::validate).
    ///
    /// ```
    /// use snmp_core::Oid;
    ///
    /// let oid: Oid = ".1.3.6.1.2.1.1.5.0".parse().unwrap();
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.5.0");
    ///
    /// assert!(Oid::parse("1.3..6").is_err());
    /// assert!(Oid::parse("1.3.six").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::TooShort, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::invalid_oid_with_input(
                    OidErrorKind::TooManyArcs {
                        count: body.split('.').count(),
                        max: MAX_OID_LEN,
                    },
                    s,
                ));
            }
        }

        Ok(Self { arcs })
    }

    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// True if `other` is a prefix of `self` (every OID starts with itself).
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.starts_with(&other.arcs)
    }

    /// All arcs except the last, or `None` for the empty OID.
    pub fn parent(&self) -> Option<Oid> {
        let (_, head) = self.arcs.split_last()?;
        Some(Oid::from_slice(head))
    }

    /// Append one arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Check that this OID can be BER-encoded (X.690 Section 8.19.4):
    /// at least two arcs, first arc 0..=2, second arc below 40 unless the first
    /// is 2, and no more than [`MAX_OID_LEN`] arcs.
    ///
    /// ```
    /// use snmp_core::oid;
    ///
    /// assert!(oid!(1, 3, 6, 1).validate().is_ok());
    /// assert!(oid!(2, 999).validate().is_ok());
    /// assert!(oid!(3, 0).validate().is_err());
    /// assert!(oid!(1, 40).validate().is_err());
    /// assert!(oid!(1).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.arcs.len() < 2 {
            return Err(Error::invalid_oid(OidErrorKind::TooShort));
        }
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }

        let (first, second) = (self.arcs[0], self.arcs[1]);
        if first > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(first)));
        }
        // first * 40 + second must also fit the u32 subidentifier
        if (first < 2 && second >= 40) || (first == 2 && second > u32::MAX - 80) {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first,
                second,
            }));
        }
        Ok(())
    }

    /// BER content octets (X.690 Section 8.19).
    ///
    /// The first two arcs share one subidentifier (`first * 40 + second`),
    /// every later arc is base-128 with continuation bits. Call
    /// [`validate`](Self::validate) first; invalid OIDs encode to garbage.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();
        match self.arcs.as_slice() {
            [] => {}
            [first] => push_subidentifier(&mut bytes, first.wrapping_mul(40)),
            [first, second, rest @ ..] => {
                push_subidentifier(&mut bytes, first.wrapping_mul(40).wrapping_add(*second));
                for &arc in rest {
                    push_subidentifier(&mut bytes, arc);
                }
            }
        }
        bytes
    }

    /// Decode BER content octets, enforcing [`MAX_OID_LEN`].
    pub(crate) fn from_ber(data: &[u8]) -> std::result::Result<Self, DecodeErrorKind> {
        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        let mut rest = data;

        while !rest.is_empty() {
            let (value, consumed) = read_subidentifier(rest)?;
            rest = &rest[consumed..];

            if arcs.is_empty() {
                let first = (value / 40).min(2);
                arcs.push(first);
                arcs.push(value - first * 40);
            } else {
                arcs.push(value);
            }

            if arcs.len() > MAX_OID_LEN {
                return Err(DecodeErrorKind::OidTooLong {
                    count: arcs.len(),
                    max: MAX_OID_LEN,
                });
            }
        }

        Ok(Self { arcs })
    }
}

#[inline]
fn push_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = (32 - value.leading_zeros()).div_ceil(7).max(1);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Returns `(value, bytes_consumed)`.
fn read_subidentifier(data: &[u8]) -> std::result::Result<(u32, usize), DecodeErrorKind> {
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(DecodeErrorKind::IntegerOverflow);
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeErrorKind::InvalidOid)
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut arcs = self.arcs.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
            for arc in arcs {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic by arc, the order agents use for GETNEXT.
impl Ord for Oid {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.arcs.cmp(&other.arcs)
    }
}

/// Build an [`Oid`] from literal arcs.
///
/// ```
/// use snmp_core::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert!(sys_descr.starts_with(&oid!(1, 3, 6, 1, 2, 1, 1)));
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}
