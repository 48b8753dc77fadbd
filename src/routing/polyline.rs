//! Encoded polyline format (signed varint deltas at 1e-5 precision).

use crate::geo::Coordinate;
use crate::http::ProviderError;

const PRECISION: f64 = 1e5;

/// Decode an encoded polyline string into coordinates.
pub fn decode(encoded: &str) -> Result<Vec<Coordinate>, ProviderError> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut coordinates = Vec::new();

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        lng += next_value(bytes, &mut index)?;
        coordinates.push(Coordinate::new(
            lat as f64 / PRECISION,
            lng as f64 / PRECISION,
        ));
    }

    Ok(coordinates)
}

fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64, ProviderError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or_else(|| {
            ProviderError::InvalidResponse("truncated polyline".to_string())
        })?;
        *index += 1;

        if !(63..=126).contains(&byte) || shift > 60 {
            return Err(ProviderError::InvalidResponse(format!(
                "invalid polyline byte {:#x} at {}",
                byte,
                *index - 1
            )));
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

/// Encode coordinates into a polyline string.
pub fn encode(coordinates: &[Coordinate]) -> String {
    let mut out = String::new();
    let mut prev_lat = 0i64;
    let mut prev_lng = 0i64;

    for coord in coordinates {
        let lat = (coord.latitude * PRECISION).round() as i64;
        let lng = (coord.longitude * PRECISION).round() as i64;
        push_value(&mut out, lat - prev_lat);
        push_value(&mut out, lng - prev_lng);
        prev_lat = lat;
        prev_lng = lng;
    }

    out
}

fn push_value(out: &mut String, value: i64) {
    let mut v = if value < 0 { !(value << 1) } else { value << 1 };
    while v >= 0x20 {
        out.push((((v & 0x1f) | 0x20) as u8 + 63) as char);
        v >>= 5;
    }
    out.push((v as u8 + 63) as char);
}
