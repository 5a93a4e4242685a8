use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The number of characters in the address field of a trace line
pub const ADDRESS_WIDTH: usize = 8;

/// An address exactly as it appears in a trace, one character per position
///
/// Addresses are never parsed as numbers. Index and tag are taken by slicing the characters, so
/// two addresses map to the same block whenever the relevant characters match
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Address([u8; ADDRESS_WIDTH]);

impl Address {
    pub fn new(chars: [u8; ADDRESS_WIDTH]) -> Self {
        Self(chars)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: [u8; ADDRESS_WIDTH] = s.as_bytes()
            .try_into()
            .map_err(|_| format!("Address {s:?} must be exactly {ADDRESS_WIDTH} characters long"))?;
        Ok(Self(chars))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// The set index of an address, packed from the characters selecting the set
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Index(u64);

/// The tag of an address, packed from the characters after the index
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct Tag(u64);

/// Where the index and tag fields start within an address for one cache
///
/// The block offset occupies the first `log2(block_size)` characters and is otherwise unused.
/// It is followed by `log2(capacity / (associativity * block_size))` index characters, and the
/// tag is whatever remains. Fields are clamped to the address width, so with the default
/// geometries the tag is empty and the index is the last three characters
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Geometry {
    index_start: usize,
    tag_start: usize,
}

impl Geometry {
    /// Creates a geometry, checking that the derived field widths are integral
    ///
    /// # Arguments
    ///
    /// * `capacity`: Total size of the cache
    /// * `associativity`: Lines per set, 1 for direct mapped
    /// * `block_size`: Size of a block, must be a power of two
    ///
    /// returns: Result<Geometry, String>
    ///
    /// # Examples
    ///
    /// ```
    /// use mesilib::address::{Address, Geometry};
    /// let l1 = Geometry::new(16384, 2, 32).unwrap();
    /// let a: Address = "7fff0abc".parse().unwrap();
    /// let b: Address = "00000abc".parse().unwrap();
    /// assert_eq!(l1.split(&a), l1.split(&b));
    /// ```
    pub fn new(capacity: u64, associativity: u64, block_size: u64) -> Result<Self, String> {
        if !block_size.is_power_of_two() {
            return Err(format!("Block size {block_size} must be a power of two"));
        }
        if associativity == 0 {
            return Err("Associativity must be at least one".to_string());
        }
        let set_span = associativity
            .checked_mul(block_size)
            .ok_or_else(|| format!("Associativity {associativity} times block size {block_size} overflows"))?;
        if capacity % set_span != 0 || !(capacity / set_span).is_power_of_two() {
            return Err(format!(
                "Capacity {capacity} must be a power of two multiple of associativity times block size ({set_span})"
            ));
        }
        let index_start = block_size.trailing_zeros() as usize;
        let tag_start = index_start + (capacity / set_span).trailing_zeros() as usize;
        Ok(Self { index_start, tag_start })
    }

    pub fn index(&self, address: &Address) -> Index {
        Index(pack(address, self.index_start, self.tag_start))
    }

    pub fn tag(&self, address: &Address) -> Tag {
        Tag(pack(address, self.tag_start, ADDRESS_WIDTH))
    }

    /// Converts an address into its set index and tag
    pub fn split(&self, address: &Address) -> (Index, Tag) {
        (self.index(address), self.tag(address))
    }
}

// Each character takes one byte of the result, the widest field is ADDRESS_WIDTH characters
fn pack(address: &Address, start: usize, end: usize) -> u64 {
    let end = end.min(ADDRESS_WIDTH);
    let start = start.min(end);
    address.as_bytes()[start..end]
        .iter()
        .fold(0u64, |acc, c| acc << 8 | *c as u64)
}
