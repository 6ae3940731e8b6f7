//! Interframe block video decoding ("codec 37").
//!
//! Each animation owns one decoder session. The session keeps two delta
//! buffers inside a single allocation; every frame writes the current slot
//! while motion codes read 4x4 blocks out of the other, so frame N is
//! reconstructed against frame N-1 without copying whole surfaces around.
//! The slot roles swap between continuation frames according to the
//! sequence-parity rule in [`Codec37Decoder::decode_frame`].

use tracing::warn;

use retrodec_core::BitReader;

use crate::error::{AnimError, Result};
use crate::frame::{Frame, FrameHeader, FRAME_HEADER_LEN};
use crate::motion::{motion_table, MOTION_CODES};
use crate::rle;

// Delta allocation geometry. Both slots carry slack around the frame so
// motion references near the edges stay inside the allocation.
const DELTA_MARGIN: usize = 0x13600;
const SLOT0_OFFSET: usize = 0x4D80;
const SLOT1_EXTRA: usize = 0xE880;

const BLOCK: usize = 4;
const BLOCK_PIXELS: usize = BLOCK * BLOCK;

const CODE_LITERAL: u8 = 0xFF;
const CODE_ROW_FILL: u8 = 0xFE;
const CODE_COL_FILL: u8 = 0xFD;

/// Continuation frames with this bit keep the current slot on odd
/// sequence numbers.
const FLAG_RETAIN: u8 = 1 << 0;
/// Enables the 0xFD/0xFE fill codes in the block procedures.
const FLAG_LARGE_FILLS: u8 = 1 << 2;

/// What one block code tells a block procedure to do.
#[derive(Clone, Copy)]
enum BlockOp {
    /// 16 literal pixels.
    Literal([u8; BLOCK_PIXELS]),
    /// Every row of the block is the 4-byte pattern.
    RowFill([u8; BLOCK]),
    /// Row `i` of the block is `pattern[i]` repeated.
    ColFill([u8; BLOCK]),
    /// Copy the block from the reference slot at this pixel offset.
    Motion(i32),
}

/// Decoder session for one animation.
pub struct Codec37Decoder {
    width: usize,
    height: usize,
    frame_size: usize,
    blocks_w: usize,
    blocks_h: usize,
    pitch: usize,
    delta: Vec<u8>,
    slots: [usize; 2],
    curtable: usize,
    started: bool,
    table_index: u8,
    offsets: [i32; MOTION_CODES],
    prev_seq: u16,
}

impl Codec37Decoder {
    /// Create a session for frames of the given dimensions.
    ///
    /// The block procedures tile the frame into 4x4 blocks, so both
    /// dimensions must be multiples of 4.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 || width % 4 != 0 || height % 4 != 0 {
            return Err(AnimError::InvalidDimensions { width, height });
        }

        let w = width as usize;
        let h = height as usize;
        let frame_size = w * h;

        Ok(Codec37Decoder {
            width: w,
            height: h,
            frame_size,
            blocks_w: w / BLOCK,
            blocks_h: h / BLOCK,
            pitch: w,
            delta: vec![0u8; frame_size * 3 + DELTA_MARGIN],
            slots: [SLOT0_OFFSET, frame_size + SLOT1_EXTRA],
            curtable: 0,
            started: false,
            table_index: 0,
            offsets: motion_table(w as i32),
            prev_seq: 0,
        })
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width as u32
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// Drop all scene state and zero the delta buffers, as at session start.
    pub fn reset(&mut self) {
        self.delta.fill(0);
        self.curtable = 0;
        self.started = false;
        self.table_index = 0;
        self.prev_seq = 0;
    }

    /// Decode one compressed frame.
    ///
    /// `seq == 0` starts a new scene: the scene configuration is captured
    /// and the frame decodes into the current slot at its declared size.
    /// Any other sequence number continues the scene: the slot flips unless
    /// the sequence parity and [`FLAG_RETAIN`] say otherwise, and the frame
    /// must decode to exactly `width * height` bytes. Every block procedure
    /// is held to the declared size; a mismatch is fatal, never padded or
    /// truncated.
    pub fn decode_frame(&mut self, src: &[u8]) -> Result<Frame> {
        let header = FrameHeader::parse(src)?;
        if header.opcode > 4 {
            return Err(AnimError::UnknownOpcode {
                opcode: header.opcode,
            });
        }
        let payload = &src[FRAME_HEADER_LEN..];
        let decoded_size = header.decoded_size as usize;

        if header.seq == 0 {
            if decoded_size > self.frame_size {
                return Err(AnimError::OversizeFrame {
                    declared: decoded_size,
                    capacity: self.frame_size,
                });
            }
            self.started = true;
            self.table_index = header.table_index;
            self.offsets = motion_table(self.pitch as i32);
        } else {
            if !self.started {
                return Err(AnimError::StrayContinuation { seq: header.seq });
            }
            if header.table_index != self.table_index {
                return Err(AnimError::SceneMismatch(format!(
                    "motion table index {} does not match scene index {}",
                    header.table_index, self.table_index
                )));
            }
            if decoded_size != self.frame_size {
                return Err(AnimError::SceneMismatch(format!(
                    "continuation frame declares {} bytes, frame is {}",
                    decoded_size, self.frame_size
                )));
            }

            // Preserved swap rule: flip unless an odd sequence number
            // carries the retain bit.
            let odd = header.seq & 1 == 1;
            let retain = header.mask_flags & FLAG_RETAIN != 0;
            if odd && !retain {
                self.curtable ^= 1;
            }

            if header.seq != self.prev_seq.wrapping_add(1) {
                warn!(
                    seq = header.seq,
                    prev = self.prev_seq,
                    "sequence gap in animation stream"
                );
            }
        }
        self.prev_seq = header.seq;

        let written = match header.opcode {
            0 => self.proc_copy(payload, decoded_size)?,
            1 => self.proc_packed(payload, decoded_size)?,
            2 => self.proc_rle(payload, decoded_size)?,
            3 => self.proc_blocks(payload, decoded_size, header.mask_flags, false, 3)?,
            4 => self.proc_blocks(payload, decoded_size, header.mask_flags, true, 4)?,
            opcode => return Err(AnimError::UnknownOpcode { opcode }),
        };

        if written != decoded_size {
            return Err(AnimError::DecodeLengthMismatch {
                opcode: header.opcode,
                expected: decoded_size,
                actual: written,
            });
        }

        let cur = self.slots[self.curtable];
        Ok(Frame {
            data: self.delta[cur..cur + decoded_size].to_vec(),
            width: self.width as u32,
            height: self.height as u32,
        })
    }

    /// Procedure 0: the payload is the frame, byte for byte.
    fn proc_copy(&mut self, payload: &[u8], decoded_size: usize) -> Result<usize> {
        let src = payload
            .get(..decoded_size)
            .ok_or(AnimError::UnexpectedEnd {
                needed: decoded_size,
                available: payload.len(),
            })?;
        let cur = self.slots[self.curtable];
        self.delta[cur..cur + decoded_size].copy_from_slice(src);
        Ok(decoded_size)
    }

    /// Procedure 1: a bit-packed run/fill stream over the 16 sub-positions
    /// of each 4x4 block, runs continuing across block boundaries.
    fn proc_packed(&mut self, payload: &[u8], decoded_size: usize) -> Result<usize> {
        let mut reader = BitReader::new(payload);
        let cur = self.slots[self.curtable];
        let pitch = self.pitch;
        let mut written = 0usize;
        let mut run_left = 0usize;
        let mut fill: Option<u8> = None;

        let short = |written| AnimError::DecodeLengthMismatch {
            opcode: 1,
            expected: decoded_size,
            actual: written,
        };

        'blocks: for by in 0..self.blocks_h {
            for bx in 0..self.blocks_w {
                for p in 0..BLOCK_PIXELS {
                    if written == decoded_size {
                        break 'blocks;
                    }
                    if run_left == 0 {
                        let is_fill = reader.read_bit().map_err(|_| short(written))?;
                        run_left = reader.read_bits(4).map_err(|_| short(written))? as usize + 1;
                        fill = if is_fill {
                            Some(reader.read_byte().map_err(|_| short(written))?)
                        } else {
                            None
                        };
                    }
                    let value = match fill {
                        Some(f) => f,
                        None => reader.read_byte().map_err(|_| short(written))?,
                    };
                    let dst = cur + (by * BLOCK + p / BLOCK) * pitch + bx * BLOCK + p % BLOCK;
                    self.delta[dst] = value;
                    run_left -= 1;
                    written += 1;
                }
            }
        }

        Ok(written)
    }

    /// Procedure 2: the whole frame is one run-length stream.
    fn proc_rle(&mut self, payload: &[u8], decoded_size: usize) -> Result<usize> {
        let cur = self.slots[self.curtable];
        rle::decode_into(payload, &mut self.delta[cur..cur + decoded_size])?;
        Ok(decoded_size)
    }

    /// Procedures 3 and 4: one code per 4x4 block, motion-compensated
    /// against the reference slot. Procedure 4 adds the repeat marker
    /// (code 0x00: count byte, then one code for `count + 1` blocks).
    fn proc_blocks(
        &mut self,
        payload: &[u8],
        decoded_size: usize,
        mask_flags: u8,
        with_repeat: bool,
        opcode: u8,
    ) -> Result<usize> {
        let large_fills = mask_flags & FLAG_LARGE_FILLS != 0;
        let total = self.blocks_w * self.blocks_h;
        let mut pos = 0usize;
        let mut written = 0usize;
        let mut block = 0usize;

        while block < total {
            let code = take(payload, &mut pos, 1)?[0];
            if with_repeat && code == 0x00 {
                let count = take(payload, &mut pos, 1)?[0] as usize + 1;
                let repeated = take(payload, &mut pos, 1)?[0];
                if repeated == 0x00 || repeated == CODE_LITERAL {
                    return Err(AnimError::InvalidRepeat { code: repeated });
                }
                let op = self.read_op(repeated, payload, &mut pos, large_fills)?;
                for _ in 0..count {
                    if block == total {
                        return Err(AnimError::DecodeLengthMismatch {
                            opcode,
                            expected: decoded_size,
                            actual: written + BLOCK_PIXELS,
                        });
                    }
                    self.apply_op(op, block)?;
                    block += 1;
                    written += BLOCK_PIXELS;
                }
            } else {
                let op = self.read_op(code, payload, &mut pos, large_fills)?;
                self.apply_op(op, block)?;
                block += 1;
                written += BLOCK_PIXELS;
            }
        }

        Ok(written)
    }

    fn read_op(
        &self,
        code: u8,
        payload: &[u8],
        pos: &mut usize,
        large_fills: bool,
    ) -> Result<BlockOp> {
        match code {
            CODE_LITERAL => {
                let mut pixels = [0u8; BLOCK_PIXELS];
                pixels.copy_from_slice(take(payload, pos, BLOCK_PIXELS)?);
                Ok(BlockOp::Literal(pixels))
            }
            CODE_ROW_FILL if large_fills => {
                let mut pattern = [0u8; BLOCK];
                pattern.copy_from_slice(take(payload, pos, BLOCK)?);
                Ok(BlockOp::RowFill(pattern))
            }
            CODE_COL_FILL if large_fills => {
                let mut pattern = [0u8; BLOCK];
                pattern.copy_from_slice(take(payload, pos, BLOCK)?);
                Ok(BlockOp::ColFill(pattern))
            }
            code => Ok(BlockOp::Motion(self.offsets[code as usize])),
        }
    }

    fn apply_op(&mut self, op: BlockOp, block: usize) -> Result<()> {
        let bx = block % self.blocks_w;
        let by = block / self.blocks_w;
        let block_offset = by * BLOCK * self.pitch + bx * BLOCK;
        let dst = self.slots[self.curtable] + block_offset;

        match op {
            BlockOp::Literal(pixels) => {
                for row in 0..BLOCK {
                    let line = dst + row * self.pitch;
                    self.delta[line..line + BLOCK]
                        .copy_from_slice(&pixels[row * BLOCK..(row + 1) * BLOCK]);
                }
            }
            BlockOp::RowFill(pattern) => {
                for row in 0..BLOCK {
                    let line = dst + row * self.pitch;
                    self.delta[line..line + BLOCK].copy_from_slice(&pattern);
                }
            }
            BlockOp::ColFill(pattern) => {
                for row in 0..BLOCK {
                    let line = dst + row * self.pitch;
                    self.delta[line..line + BLOCK].fill(pattern[row]);
                }
            }
            BlockOp::Motion(offset) => {
                let src_base = self.slots[self.curtable ^ 1] + block_offset;
                let src = src_base as i64 + i64::from(offset);
                let span = (BLOCK - 1) * self.pitch + BLOCK;
                if src < 0 || src as usize + span > self.delta.len() {
                    return Err(AnimError::ReferenceOutOfBounds { offset: src });
                }
                let src = src as usize;
                let mut pixels = [0u8; BLOCK_PIXELS];
                for row in 0..BLOCK {
                    let line = src + row * self.pitch;
                    pixels[row * BLOCK..(row + 1) * BLOCK]
                        .copy_from_slice(&self.delta[line..line + BLOCK]);
                }
                for row in 0..BLOCK {
                    let line = dst + row * self.pitch;
                    self.delta[line..line + BLOCK]
                        .copy_from_slice(&pixels[row * BLOCK..(row + 1) * BLOCK]);
                }
            }
        }
        Ok(())
    }
}

fn take<'a>(src: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let slice = src
        .get(*pos..*pos + len)
        .ok_or(AnimError::UnexpectedEnd {
            needed: len,
            available: src.len().saturating_sub(*pos),
        })?;
    *pos += len;
    Ok(slice)
}
