//! Filter chain decoding for stream payloads.
//!
//! Reverses the transforms named by `/Filter` in order, applying
//! `/DecodeParms` predictors after Flate and LZW stages. Image codecs and
//! anything not listed in [`decode_filter`] are reported as unsupported.

use std::io::Read;

use weezl::{decode::Decoder as LzwDecoder, BitOrder, LzwStatus};

use crate::error::DecodeError;
use crate::model::{MetadataNode, MetadataValue};

/// Default cap on decoded output per stream (256 MiB).
pub const DEFAULT_MAX_DECODED_LEN: usize = 256 * 1024 * 1024;

const MAX_DECODE_PARM: i64 = 100_000;

type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DecodeParms {
    predictor: i64,
    colors: i64,
    bits_per_component: i64,
    columns: i64,
    early_change: bool,
}

impl Default for DecodeParms {
    fn default() -> Self {
        Self {
            predictor: 1,
            colors: 1,
            bits_per_component: 8,
            columns: 1,
            early_change: true,
        }
    }
}

/// Decode `raw` through every filter declared in `dict`.
///
/// A stream without `/Filter` decodes to its raw bytes.
pub fn decode_stream(dict: &MetadataNode, raw: &[u8], max_out: usize) -> DecodeResult<Vec<u8>> {
    let filters = stream_filters(dict)?;
    let parms = stream_decode_parms(dict, filters.len());

    let mut data = raw.to_vec();
    for (idx, filter) in filters.iter().enumerate() {
        let parm = parms.get(idx).copied().flatten().unwrap_or_default();
        data = decode_filter(&data, filter, parm, max_out)?;
        if uses_predictor(filter) && parm.predictor > 1 {
            data = apply_predictor(&data, parm)?;
        }
        if data.len() > max_out {
            return Err(DecodeError::OutputLimit(max_out));
        }
    }
    Ok(data)
}

/// Filter names declared by a stream dictionary, in application order.
pub fn stream_filters(dict: &MetadataNode) -> DecodeResult<Vec<String>> {
    match dict.get("Filter") {
        None => Ok(Vec::new()),
        Some(MetadataValue::Name(name)) => Ok(vec![name.clone()]),
        Some(MetadataValue::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_name()
                    .map(str::to_string)
                    .ok_or(DecodeError::MalformedFilter)
            })
            .collect(),
        Some(_) => Err(DecodeError::MalformedFilter),
    }
}

fn stream_decode_parms(dict: &MetadataNode, filter_count: usize) -> Vec<Option<DecodeParms>> {
    let mut out = vec![None; filter_count.max(1)];
    match dict.get("DecodeParms").or_else(|| dict.get("DP")) {
        Some(MetadataValue::Dictionary(d)) => out[0] = Some(parms_from_dict(d)),
        Some(MetadataValue::Array(items)) => {
            for (slot, item) in out.iter_mut().zip(items) {
                *slot = item.as_dictionary().map(parms_from_dict);
            }
        }
        _ => {}
    }
    out
}

fn parms_from_dict(dict: &MetadataNode) -> DecodeParms {
    let int = |key: &str, default: i64| {
        dict.get(key)
            .and_then(MetadataValue::as_number)
            .map(|n| n as i64)
            .unwrap_or(default)
    };
    DecodeParms {
        predictor: int("Predictor", 1),
        colors: int("Colors", 1),
        bits_per_component: int("BitsPerComponent", 8),
        columns: int("Columns", 1),
        early_change: int("EarlyChange", 1) != 0,
    }
}

fn uses_predictor(filter: &str) -> bool {
    matches!(filter, "FlateDecode" | "Fl" | "LZWDecode" | "LZW")
}

fn decode_filter(
    data: &[u8],
    filter: &str,
    parms: DecodeParms,
    max_out: usize,
) -> DecodeResult<Vec<u8>> {
    match filter {
        "FlateDecode" | "Fl" => decode_flate(data, max_out),
        "LZWDecode" | "LZW" => decode_lzw(data, parms.early_change, max_out),
        "ASCIIHexDecode" | "AHx" => decode_ascii_hex(data),
        "ASCII85Decode" | "A85" => decode_ascii85(data),
        "RunLengthDecode" | "RL" => decode_run_length(data, max_out),
        other => Err(DecodeError::UnsupportedFilter(other.to_string())),
    }
}

fn decode_flate(data: &[u8], max_out: usize) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::new();
    flate2::read::ZlibDecoder::new(data)
        .take(max_out as u64 + 1)
        .read_to_end(&mut out)
        .map_err(|e| DecodeError::corrupt("FlateDecode", e.to_string()))?;
    if out.len() > max_out {
        return Err(DecodeError::OutputLimit(max_out));
    }
    Ok(out)
}

fn decode_lzw(data: &[u8], early_change: bool, max_out: usize) -> DecodeResult<Vec<u8>> {
    let mut decoder = if early_change {
        LzwDecoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        LzwDecoder::new(BitOrder::Msb, 8)
    };
    let mut out = Vec::new();
    let mut buf = [0u8; 8192];
    let mut input = data;
    loop {
        let result = decoder.decode_bytes(input, &mut buf);
        input = &input[result.consumed_in..];
        out.extend_from_slice(&buf[..result.consumed_out]);
        if out.len() > max_out {
            return Err(DecodeError::OutputLimit(max_out));
        }
        match result.status {
            Ok(LzwStatus::Ok) => continue,
            Ok(LzwStatus::Done) | Ok(LzwStatus::NoProgress) => break,
            Err(e) => return Err(DecodeError::corrupt("LZWDecode", e.to_string())),
        }
    }
    Ok(out)
}

fn decode_ascii_hex(data: &[u8]) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len() / 2);
    let mut high: Option<u8> = None;
    for &b in data {
        if b == b'>' {
            break;
        }
        if b.is_ascii_whitespace() {
            continue;
        }
        let nibble = hex_val(b).ok_or_else(|| {
            DecodeError::corrupt("ASCIIHexDecode", format!("invalid character 0x{:02x}", b))
        })?;
        match high.take() {
            Some(h) => out.push((h << 4) | nibble),
            None => high = Some(nibble),
        }
    }
    if let Some(h) = high {
        out.push(h << 4);
    }
    Ok(out)
}

fn decode_ascii85(data: &[u8]) -> DecodeResult<Vec<u8>> {
    let body = data.strip_prefix(b"<~").unwrap_or(data);
    let mut out = Vec::with_capacity(body.len() * 4 / 5);
    let mut group = [0u8; 5];
    let mut len = 0usize;

    let mut i = 0usize;
    while i < body.len() {
        let b = body[i];
        i += 1;
        match b {
            b'~' => break,
            b'z' if len == 0 => out.extend_from_slice(&[0; 4]),
            b'z' => return Err(DecodeError::corrupt("ASCII85Decode", "'z' inside a group")),
            b'!'..=b'u' => {
                group[len] = b - b'!';
                len += 1;
                if len == 5 {
                    out.extend_from_slice(&ascii85_group(&group)?);
                    len = 0;
                }
            }
            _ if b.is_ascii_whitespace() || b == 0 => {}
            _ => {
                return Err(DecodeError::corrupt(
                    "ASCII85Decode",
                    format!("invalid character 0x{:02x}", b),
                ))
            }
        }
    }

    match len {
        0 => {}
        1 => return Err(DecodeError::corrupt("ASCII85Decode", "dangling final byte")),
        n => {
            group[n..].fill(84);
            let bytes = ascii85_group(&group)?;
            out.extend_from_slice(&bytes[..n - 1]);
        }
    }
    Ok(out)
}

fn ascii85_group(group: &[u8; 5]) -> DecodeResult<[u8; 4]> {
    let value = group
        .iter()
        .fold(0u64, |acc, &digit| acc * 85 + u64::from(digit));
    u32::try_from(value)
        .map(u32::to_be_bytes)
        .map_err(|_| DecodeError::corrupt("ASCII85Decode", "group overflows 32 bits"))
}

fn decode_run_length(data: &[u8], max_out: usize) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut i = 0usize;
    while i < data.len() {
        let n = data[i] as usize;
        i += 1;
        match n {
            128 => break,
            0..=127 => {
                let count = n + 1;
                let run = data
                    .get(i..i + count)
                    .ok_or_else(|| DecodeError::corrupt("RunLengthDecode", "truncated literal run"))?;
                out.extend_from_slice(run);
                i += count;
            }
            _ => {
                let b = *data
                    .get(i)
                    .ok_or_else(|| DecodeError::corrupt("RunLengthDecode", "truncated repeat run"))?;
                out.resize(out.len() + 257 - n, b);
                i += 1;
            }
        }
        if out.len() > max_out {
            return Err(DecodeError::OutputLimit(max_out));
        }
    }
    Ok(out)
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(10 + b - b'a'),
        b'A'..=b'F' => Some(10 + b - b'A'),
        _ => None,
    }
}

fn apply_predictor(data: &[u8], parms: DecodeParms) -> DecodeResult<Vec<u8>> {
    validate_decode_parms(parms)?;
    let bits_per_pixel = (parms.colors * parms.bits_per_component) as usize;
    let bpp = bits_per_pixel.div_ceil(8).max(1);
    let row_len = (parms.columns as usize * bits_per_pixel).div_ceil(8);

    match parms.predictor {
        2 if parms.bits_per_component == 8 => Ok(apply_tiff_predictor(data, bpp, row_len)),
        2 => Err(DecodeError::InvalidParameters(format!(
            "TIFF predictor with {} bits per component",
            parms.bits_per_component
        ))),
        10..=15 => apply_png_predictor(data, bpp, row_len),
        other => Err(DecodeError::InvalidParameters(format!(
            "unknown predictor {}",
            other
        ))),
    }
}

fn validate_decode_parms(parms: DecodeParms) -> DecodeResult<()> {
    if !matches!(parms.bits_per_component, 1 | 2 | 4 | 8 | 16) {
        return Err(DecodeError::InvalidParameters(format!(
            "BitsPerComponent {}",
            parms.bits_per_component
        )));
    }
    for (key, value) in [("Colors", parms.colors), ("Columns", parms.columns)] {
        if !(1..=MAX_DECODE_PARM).contains(&value) {
            return Err(DecodeError::InvalidParameters(format!("{} {}", key, value)));
        }
    }
    Ok(())
}

fn apply_tiff_predictor(data: &[u8], bpp: usize, row_len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks(row_len) {
        let mut row = chunk.to_vec();
        for i in bpp..row.len() {
            row[i] = row[i].wrapping_add(row[i - bpp]);
        }
        out.extend_from_slice(&row);
    }
    out
}

fn apply_png_predictor(data: &[u8], bpp: usize, row_len: usize) -> DecodeResult<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = vec![0u8; row_len];
    // Each encoded row carries a leading filter-type byte; a short final row is dropped.
    for encoded in data.chunks_exact(row_len + 1) {
        let mut row = encoded[1..].to_vec();
        match encoded[0] {
            0 => {}
            1 => {
                for j in bpp..row_len {
                    row[j] = row[j].wrapping_add(row[j - bpp]);
                }
            }
            2 => {
                for j in 0..row_len {
                    row[j] = row[j].wrapping_add(prev[j]);
                }
            }
            3 => {
                for j in 0..row_len {
                    let left = if j >= bpp { row[j - bpp] } else { 0 };
                    let avg = ((u16::from(left) + u16::from(prev[j])) / 2) as u8;
                    row[j] = row[j].wrapping_add(avg);
                }
            }
            4 => {
                for j in 0..row_len {
                    let left = if j >= bpp { row[j - bpp] } else { 0 };
                    let up_left = if j >= bpp { prev[j - bpp] } else { 0 };
                    row[j] = row[j].wrapping_add(paeth(left, prev[j], up_left));
                }
            }
            other => {
                return Err(DecodeError::corrupt(
                    "FlateDecode",
                    format!("unknown PNG row filter {}", other),
                ))
            }
        }
        out.extend_from_slice(&row);
        prev = row;
    }
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let (a, b, c) = (i16::from(a), i16::from(b), i16::from(c));
    let p = a + b - c;
    let pa = (p - a).abs();
    let pb = (p - b).abs();
    let pc = (p - c).abs();
    if pa <= pb && pa <= pc {
        a as u8
    } else if pb <= pc {
        b as u8
    } else {
        c as u8
    }
}
