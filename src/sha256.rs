use crate::digest::{Digest, DigestEngine};

const BLOCK_LEN: usize = 64;

/// Room left at the end of the final block for the big-endian bit length.
const LENGTH_FIELD_LEN: usize = 8;

const INITIAL_STATE: [u32; 8] = [
    0x6a09_e667, 0xbb67_ae85, 0x3c6e_f372, 0xa54f_f53a,
    0x510e_527f, 0x9b05_688c, 0x1f83_d9ab, 0x5be0_cd19,
];

/// First 32 bits of the fractional parts of the cube roots of the first 64 primes.
const ROUND_CONSTANTS: [u32; 64] = [
    0x428a_2f98, 0x7137_4491, 0xb5c0_fbcf, 0xe9b5_dba5, 0x3956_c25b, 0x59f1_11f1, 0x923f_82a4, 0xab1c_5ed5,
    0xd807_aa98, 0x1283_5b01, 0x2431_85be, 0x550c_7dc3, 0x72be_5d74, 0x80de_b1fe, 0x9bdc_06a7, 0xc19b_f174,
    0xe49b_69c1, 0xefbe_4786, 0x0fc1_9dc6, 0x240c_a1cc, 0x2de9_2c6f, 0x4a74_84aa, 0x5cb0_a9dc, 0x76f9_88da,
    0x983e_5152, 0xa831_c66d, 0xb003_27c8, 0xbf59_7fc7, 0xc6e0_0bf3, 0xd5a7_9147, 0x06ca_6351, 0x1429_2967,
    0x27b7_0a85, 0x2e1b_2138, 0x4d2c_6dfc, 0x5338_0d13, 0x650a_7354, 0x766a_0abb, 0x81c2_c92e, 0x9272_2c85,
    0xa2bf_e8a1, 0xa81a_664b, 0xc24b_8b70, 0xc76c_51a3, 0xd192_e819, 0xd699_0624, 0xf40e_3585, 0x106a_a070,
    0x19a4_c116, 0x1e37_6c08, 0x2748_774c, 0x34b0_bcb5, 0x391c_0cb3, 0x4ed8_aa4a, 0x5b9c_ca4f, 0x682e_6ff3,
    0x748f_82ee, 0x78a5_636f, 0x84c8_7814, 0x8cc7_0208, 0x90be_fffa, 0xa450_6ceb, 0xbef9_a3f7, 0xc671_78f2,
];

/// Fixed-capacity holder for the bytes of a not-yet-complete block.
#[derive(Clone)]
struct BlockBuffer {
    bytes: [u8; BLOCK_LEN],
    len: usize,
}

impl BlockBuffer {
    const fn new() -> Self {
        Self {
            bytes: [0; BLOCK_LEN],
            len: 0,
        }
    }

    fn clear(&mut self) {
        self.bytes = [0; BLOCK_LEN];
        self.len = 0;
    }

    /// Copies as much of `input` as fits and returns how many bytes were taken.
    fn fill(&mut self, input: &[u8]) -> usize {
        let taken = input.len().min(BLOCK_LEN - self.len);
        self.bytes[self.len..self.len + taken].copy_from_slice(&input[..taken]);
        self.len += taken;
        taken
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == BLOCK_LEN
    }

    fn filled(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Reference scalar SHA-256 engine.
#[derive(Clone)]
pub struct Sha256 {
    state: [u32; 8],
    buffer: BlockBuffer,
    /// Bytes absorbed since the last reset.
    total_len: u64,
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sha256 {
    pub fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            buffer: BlockBuffer::new(),
            total_len: 0,
        }
    }
}

impl DigestEngine for Sha256 {
    /// Restores the initial hash values and forgets all absorbed input.
    fn reset(&mut self) {
        self.state = INITIAL_STATE;
        self.buffer.clear();
        self.total_len = 0;
    }

    /// Feeds `input` into the accumulator, compressing every complete block.
    fn absorb(&mut self, mut input: &[u8]) {
        self.total_len = self.total_len.wrapping_add(input.len() as u64);

        if !self.buffer.is_empty() {
            let taken = self.buffer.fill(input);
            input = &input[taken..];
            if !self.buffer.is_full() {
                return;
            }
            compress(&mut self.state, &self.buffer.bytes);
            self.buffer.clear();
        }

        let blocks = input.chunks_exact(BLOCK_LEN);
        let rest = blocks.remainder();
        for block in blocks {
            compress(&mut self.state, block);
        }
        self.buffer.fill(rest);
    }

    /// Pads the message, compresses the final block(s) and returns the digest.
    ///
    /// The registers are left holding the final chaining value, so the
    /// engine has to be [`reset`](DigestEngine::reset) before hashing another input.
    fn finish(&mut self) -> Digest {
        let bit_len = self.total_len.wrapping_mul(8);
        let pending = self.buffer.len;

        let mut tail = [0u8; 2 * BLOCK_LEN];
        tail[..pending].copy_from_slice(self.buffer.filled());
        tail[pending] = 0x80;
        let tail_len = if pending + 1 + LENGTH_FIELD_LEN <= BLOCK_LEN {
            BLOCK_LEN
        } else {
            2 * BLOCK_LEN
        };
        tail[tail_len - LENGTH_FIELD_LEN..tail_len].copy_from_slice(&bit_len.to_be_bytes());

        for block in tail[..tail_len].chunks_exact(BLOCK_LEN) {
            compress(&mut self.state, block);
        }
        self.buffer.clear();

        let mut out = [0u8; Digest::LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Digest::from_bytes(out)
    }
}

/// One-shot SHA-256 of `input`.
pub fn digest(input: &[u8]) -> Digest {
    Sha256::new().digest_of(input)
}

#[inline]
fn choose(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline]
fn majority(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

#[inline]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

/// Runs the 64-round compression function over one 64-byte block.
fn compress(state: &mut [u32; 8], block: &[u8]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);

    let mut schedule = [0u32; 64];
    for (word, bytes) in schedule.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    for t in 16..64 {
        schedule[t] = small_sigma1(schedule[t - 2])
            .wrapping_add(schedule[t - 7])
            .wrapping_add(small_sigma0(schedule[t - 15]))
            .wrapping_add(schedule[t - 16]);
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;
    for (k, w) in ROUND_CONSTANTS.iter().zip(schedule.iter()) {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(choose(e, f, g))
            .wrapping_add(*k)
            .wrapping_add(*w);
        let t2 = big_sigma0(a).wrapping_add(majority(a, b, c));
        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    for (register, value) in state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
        *register = register.wrapping_add(value);
    }
}
