//! Type definitions for the marshaling engine
//!
//! Defines the closed set of argument kinds the native formatter accepts
//! and the record layout generations it has shipped with.

/// Type tag identifying one argument kind on the wire
///
/// The numeric codes are part of the native ABI and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum TypeTag {
    Text = 0x01,
    Binary = 0x02,
    Long = 0x03,
    ULong = 0x04,
    /// Declared in the ABI, carried as a pre-encoded unsigned word by an
    /// external codec. No encoder exists for it here.
    Decimal = 0x05,
    Float = 0x06,
    Double = 0x07,
    Reference = 0x08,
}

impl TypeTag {
    /// Wire code for this tag
    #[inline]
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Recover a tag from its wire code
    #[inline]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0x01 => Some(Self::Text),
            0x02 => Some(Self::Binary),
            0x03 => Some(Self::Long),
            0x04 => Some(Self::ULong),
            0x05 => Some(Self::Decimal),
            0x06 => Some(Self::Float),
            0x07 => Some(Self::Double),
            0x08 => Some(Self::Reference),
            _ => None,
        }
    }

    /// Kind name used in diagnostics and error messages
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::Reference => "reference",
        }
    }

    /// Whether records of this kind point at pinned payload memory
    #[inline]
    pub const fn carries_payload(self) -> bool {
        matches!(self, Self::Text | Self::Binary)
    }
}

/// Composite reference to an external entity (not a memory pointer)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefValue {
    pub id: u64,
    pub refnum: u64,
}

impl RefValue {
    #[inline]
    pub const fn new(id: u64, refnum: u64) -> Self {
        Self { id, refnum }
    }
}

/// One typed argument value, borrowed from the caller for the call's scope
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    Text(&'a str),
    Binary(&'a [u8]),
    Reference(RefValue),
    /// Pre-encoded decimal word. Constructible, but no encoder is
    /// registered for it; see the registry.
    Decimal(u64),
}

impl Value<'_> {
    /// Wire tag for this value's kind
    #[inline]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Long(_) => TypeTag::Long,
            Self::ULong(_) => TypeTag::ULong,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::Text(_) => TypeTag::Text,
            Self::Binary(_) => TypeTag::Binary,
            Self::Reference(_) => TypeTag::Reference,
            Self::Decimal(_) => TypeTag::Decimal,
        }
    }

    #[inline]
    pub const fn kind_name(&self) -> &'static str {
        self.tag().name()
    }
}

/// Record layout generation, fixed per native binary build
///
/// The two generations share the five-word record shape but assign the
/// unsigned word differently. A builder is constructed for exactly one
/// generation; layouts are never mixed within a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    /// Earlier layout: integer and unsigned slots share the integer word.
    /// Unsigned values are stored bit-reinterpreted as signed and read
    /// back as unsigned by the native side. Pin bookkeeping is kept
    /// out-of-band.
    V1,
    /// Later layout: the unsigned word is a dedicated slot. For payload
    /// records the otherwise-unused unsigned word carries a 32-bit
    /// pin-handle token (zero-padded), letting a builder re-read the
    /// filled buffer after the call to locate the pins it created. The
    /// native side ignores that word for payload tags.
    V2,
}

impl Generation {
    /// Unsigned values share the integer word in this layout
    #[inline]
    pub const fn shares_int_word(self) -> bool {
        matches!(self, Self::V1)
    }

    /// Payload records carry an embedded pin-handle token in this layout
    #[inline]
    pub const fn embeds_pin_token(self) -> bool {
        matches!(self, Self::V2)
    }
}

impl Default for Generation {
    #[inline]
    fn default() -> Self {
        Self::V2
    }
}
