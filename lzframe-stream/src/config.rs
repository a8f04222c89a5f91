//! Decoder configuration.

/// Default multiple of the compressed size used as the first capacity guess.
pub const DEFAULT_CAPACITY_MULTIPLIER: usize = 10;

/// Default ceiling for a single decoded block (the largest LZ4 block size).
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Frame decoder configuration parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Reject headers with reserved bits set or an undefined block max size code.
    pub strict_reserved_bits: bool,
    /// Verify the header checksum byte against the descriptor.
    pub verify_header_checksum: bool,
    /// Verify per-block checksums when the frame carries them.
    ///
    /// The checksum bytes are consumed either way.
    pub verify_block_checksums: bool,
    /// Verify the content checksum trailer when the frame carries one.
    pub verify_content_checksum: bool,
    /// Compare the decoded length with the declared content size.
    pub verify_content_size: bool,
    /// First capacity guess is `compressed_len * capacity_multiplier`.
    pub capacity_multiplier: usize,
    /// Upper bound for one block, compressed or decoded.
    ///
    /// The header's block max size lowers this further when it is defined.
    pub max_block_size: usize,
}

impl DecoderConfig {
    /// Accepts everything the reference reader accepts.
    ///
    /// - Reserved bits and undefined block size codes are ignored
    /// - The header checksum is not checked
    /// - Block and content checksums present in the frame are verified
    pub const LENIENT: Self = Self {
        strict_reserved_bits: false,
        verify_header_checksum: false,
        verify_block_checksums: true,
        verify_content_checksum: true,
        verify_content_size: true,
        capacity_multiplier: DEFAULT_CAPACITY_MULTIPLIER,
        max_block_size: DEFAULT_MAX_BLOCK_SIZE,
    };

    /// Rejects any header the frame format does not define.
    ///
    /// - Reserved bits must be zero
    /// - Block size code must be 4-7
    /// - The header checksum must match
    pub const STRICT: Self = Self {
        strict_reserved_bits: true,
        verify_header_checksum: true,
        ..Self::LENIENT
    };

    /// Create the default (lenient) configuration.
    pub fn new() -> Self {
        Self::LENIENT
    }

    /// Set reserved bit checking.
    pub fn with_strict_reserved_bits(mut self, enabled: bool) -> Self {
        self.strict_reserved_bits = enabled;
        self
    }

    /// Set header checksum verification.
    pub fn with_header_checksum(mut self, enabled: bool) -> Self {
        self.verify_header_checksum = enabled;
        self
    }

    /// Set block checksum verification.
    pub fn with_block_checksums(mut self, enabled: bool) -> Self {
        self.verify_block_checksums = enabled;
        self
    }

    /// Set content checksum verification.
    pub fn with_content_checksum(mut self, enabled: bool) -> Self {
        self.verify_content_checksum = enabled;
        self
    }

    /// Set content size verification.
    pub fn with_content_size(mut self, enabled: bool) -> Self {
        self.verify_content_size = enabled;
        self
    }

    /// Set the initial capacity multiplier (clamped to at least 1).
    pub fn with_capacity_multiplier(mut self, multiplier: usize) -> Self {
        self.capacity_multiplier = multiplier.max(1);
        self
    }

    /// Set the block size ceiling (clamped to at least 1).
    pub fn with_max_block_size(mut self, size: usize) -> Self {
        self.max_block_size = size.max(1);
        self
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::LENIENT
    }
}
