use rayon::prelude::*;

use crate::foundation::error::{SpotDiffError, SpotDiffResult};
use crate::foundation::math::mul_div255_u8;

pub type PremulRgba8 = [u8; 4];

/// Read-only view of a tightly packed premultiplied RGBA8 image.
#[derive(Clone, Copy, Debug)]
pub struct Pixels<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Mutable view of a tightly packed premultiplied RGBA8 image.
#[derive(Debug)]
pub struct PixelsMut<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a mut [u8],
}

/// Source-over for one premultiplied pixel, with `src` scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Fill every pixel of `dst` with `px`.
pub fn fill(dst: &mut [u8], px: PremulRgba8) {
    dst.par_chunks_exact_mut(4)
        .for_each(|d| d.copy_from_slice(&px));
}

/// Composite `src` over `dst` with its top-left corner at `(x, y)`.
///
/// Parts of `src` falling outside `dst` are clipped. Rows are processed in parallel.
pub fn blit_over(
    dst: PixelsMut<'_>,
    src: Pixels<'_>,
    x: i64,
    y: i64,
    opacity: f32,
) -> SpotDiffResult<()> {
    check_len("blit destination", dst.width, dst.height, dst.data.len())?;
    check_len("blit source", src.width, src.height, src.data.len())?;
    if opacity <= 0.0 {
        return Ok(());
    }

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(src.width)).min(i64::from(dst.width));
    let y1 = (y + i64::from(src.height)).min(i64::from(dst.height));
    if x0 >= x1 || y0 >= y1 {
        return Ok(());
    }

    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;
    let span = (x1 - x0) as usize * 4;
    let dst_col = x0 as usize * 4;
    let src_col = (x0 - x) as usize * 4;
    let src_row0 = (y0 - y) as usize;

    dst.data
        .par_chunks_exact_mut(dst_stride)
        .enumerate()
        .skip(y0 as usize)
        .take((y1 - y0) as usize)
        .for_each(|(dy, row)| {
            let sy = src_row0 + (dy - y0 as usize);
            let s_off = sy * src_stride + src_col;
            let s = &src.data[s_off..s_off + span];
            let d = &mut row[dst_col..dst_col + span];
            for (dp, sp) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                let out = over([dp[0], dp[1], dp[2], dp[3]], [sp[0], sp[1], sp[2], sp[3]], opacity);
                dp.copy_from_slice(&out);
            }
        });
    Ok(())
}

fn check_len(what: &str, width: u32, height: u32, len: usize) -> SpotDiffResult<()> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SpotDiffError::render(format!("{what} size overflow")))?;
    if expected != len {
        return Err(SpotDiffError::render(format!(
            "{what} expects {width}x{height} rgba8 ({expected} bytes), got {len}"
        )));
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
