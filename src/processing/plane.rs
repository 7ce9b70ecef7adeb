//! Strided plane copy
//!
//! Camera HALs hand out planes whose rows are padded (`row_stride > width`),
//! whose samples are spread out (`pixel_stride > 1` for semi-planar chroma),
//! and whose last rows are sometimes cut short. [`normalize_plane`] turns any
//! of those into a tightly packed plane of exactly `width` bytes per row.

use crate::error::{Error, Result};
use crate::types::Plane;

/// Neutral fill for a missing luma row
pub const LUMA_PAD: u8 = 0;
/// Neutral fill for a missing chroma row (no color shift)
pub const CHROMA_PAD: u8 = 128;

/// Copy `src` into `dst` as a `width` x `height` plane with rows
/// `dst_row_stride` bytes apart.
///
/// Source rows that are entirely past the end of the source slice are filled
/// with `pad`. Rows that are present but short are edge-extended: the last
/// sample copied is repeated to the end of the row. Source shortfall is never
/// an error; only a destination too small for the requested plane is.
pub fn normalize_plane(
    src: &Plane<'_>,
    dst: &mut [u8],
    dst_row_stride: usize,
    width: usize,
    height: usize,
    pad: u8,
) -> Result<()> {
    if width == 0 || height == 0 {
        return Ok(());
    }
    if dst_row_stride < width {
        return Err(Error::InvalidDimensions(format!(
            "destination row stride {} is narrower than plane width {}",
            dst_row_stride, width
        )));
    }
    let required = (height - 1)
        .checked_mul(dst_row_stride)
        .and_then(|n| n.checked_add(width))
        .ok_or_else(|| {
            Error::InvalidDimensions(format!(
                "{} rows {} bytes apart overflow usize",
                height, dst_row_stride
            ))
        })?;
    if dst.len() < required {
        return Err(Error::too_small("plane", required, dst.len()));
    }

    let data = src.data();
    let row_stride = src.row_stride();
    let pixel_stride = src.pixel_stride();
    let mut truncated_rows = 0usize;

    for row in 0..height {
        let d_base = row * dst_row_stride;
        let d_row = &mut dst[d_base..d_base + width];

        let available = row
            .checked_mul(row_stride)
            .filter(|&base| base < data.len())
            .map(|base| (base, row_stride.min(data.len() - base)))
            .filter(|&(_, avail)| avail > 0);

        let Some((s_base, avail)) = available else {
            // Row missing entirely
            d_row.fill(pad);
            truncated_rows += 1;
            continue;
        };

        let written = if pixel_stride == 1 {
            let n = width.min(avail);
            d_row[..n].copy_from_slice(&data[s_base..s_base + n]);
            n
        } else {
            let cols = width.min(avail.div_ceil(pixel_stride));
            let s_row = &data[s_base..s_base + avail];
            for (d, s) in d_row[..cols]
                .iter_mut()
                .zip(s_row.iter().step_by(pixel_stride))
            {
                *d = *s;
            }
            cols
        };

        if written < width {
            let tail = d_row[written - 1];
            d_row[written..].fill(tail);
            truncated_rows += 1;
        }
    }

    if truncated_rows > 0 {
        tracing::debug!(
            "Padded {} of {} rows ({}x{}, row stride {}, pixel stride {}, {} source bytes)",
            truncated_rows,
            height,
            width,
            height,
            row_stride,
            pixel_stride,
            data.len()
        );
    }

    Ok(())
}
